use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::decimal::Decimal;
use crate::types::FeedSubmission;

pub const FEED_HASH_LEN: usize = 32;
pub const ORACLE_KEY_LEN: usize = 32;
pub const QUEUE_KEY_LEN: usize = 32;
pub const SLOTHASH_LEN: usize = 32;
pub const MR_ENCLAVE_LEN: usize = 32;
pub const SECP256K1_KEY_LEN: usize = 64;

/// Errors from canonical message assembly. Every fixed-width component has
/// its own length variant; a digest over mis-sized input would silently
/// invalidate all signatures.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MessageError {
    #[error("feed hash must be {FEED_HASH_LEN} bytes, got {got}")]
    WrongFeedHashLength { got: usize },

    #[error("oracle key must be {ORACLE_KEY_LEN} bytes, got {got}")]
    WrongOracleKeyLength { got: usize },

    #[error("queue key must be {QUEUE_KEY_LEN} bytes, got {got}")]
    WrongQueueKeyLength { got: usize },

    #[error("slothash must be {SLOTHASH_LEN} bytes, got {got}")]
    WrongSlothashLength { got: usize },

    #[error("mr_enclave must be {MR_ENCLAVE_LEN} bytes, got {got}")]
    WrongMrEnclaveLength { got: usize },

    #[error("secp256k1 key must be {SECP256K1_KEY_LEN} bytes, got {got}")]
    WrongSecp256k1KeyLength { got: usize },
}

/// Append-only byte buffer with typed pushers. `finalize` consumes the
/// buffer, so a hasher cannot be reused across messages.
#[derive(Debug)]
pub struct MessageBuffer {
    buf: Vec<u8>,
}

impl MessageBuffer {
    pub fn new() -> Self {
        MessageBuffer { buf: Vec::new() }
    }

    pub fn push_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn push_u32_le(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn push_u64_le(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// 16 bytes, i128 little-endian two's-complement.
    pub fn push_decimal(&mut self, value: &Decimal) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// SHA-256 over the assembled buffer.
    pub fn finalize(self) -> [u8; 32] {
        Sha256::digest(&self.buf).into()
    }
}

impl Default for MessageBuffer {
    fn default() -> Self {
        MessageBuffer::new()
    }
}

/// Canonical committee message:
///
/// ```text
/// slot (u64 LE) ‖ timestamp_seconds (u64 LE)
/// then per feed: feed_id (32) ‖ value (i128 LE, 16) ‖ min_oracle_samples (1)
/// ```
///
/// Total length `16 + N·49`.
pub fn consensus_message(
    slot: u64,
    timestamp_seconds: u64,
    feeds: &[FeedSubmission],
) -> Result<MessageBuffer, MessageError> {
    let mut msg = MessageBuffer::new();
    msg.push_u64_le(slot);
    msg.push_u64_le(timestamp_seconds);
    for feed in feeds {
        if feed.feed_id.len() != FEED_HASH_LEN {
            return Err(MessageError::WrongFeedHashLength {
                got: feed.feed_id.len(),
            });
        }
        msg.push_bytes(&feed.feed_id);
        msg.push_decimal(&feed.value);
        msg.push_u8(feed.min_oracle_samples);
    }
    Ok(msg)
}

/// SHA-256 digest of the canonical committee message. This is the byte
/// string oracles sign; any deviation invalidates every signature in the
/// submission.
pub fn consensus_digest(
    slot: u64,
    timestamp_seconds: u64,
    feeds: &[FeedSubmission],
) -> Result<[u8; 32], MessageError> {
    Ok(consensus_message(slot, timestamp_seconds, feeds)?.finalize())
}

/// Canonical single-oracle update message:
///
/// ```text
/// queue_key (32) ‖ feed_hash (32) ‖ value (i128 LE, 16) ‖ slothash (32)
/// ‖ max_variance (u64 LE) ‖ min_responses (u32 LE) ‖ timestamp (u64 LE)
/// ```
///
/// Total length 132. The slothash is zero-filled on this chain.
#[allow(clippy::too_many_arguments)]
pub fn update_message(
    queue_key: &[u8],
    feed_hash: &[u8],
    value: &Decimal,
    slothash: &[u8],
    max_variance: u64,
    min_responses: u32,
    timestamp_seconds: u64,
) -> Result<MessageBuffer, MessageError> {
    if queue_key.len() != QUEUE_KEY_LEN {
        return Err(MessageError::WrongQueueKeyLength {
            got: queue_key.len(),
        });
    }
    if feed_hash.len() != FEED_HASH_LEN {
        return Err(MessageError::WrongFeedHashLength {
            got: feed_hash.len(),
        });
    }
    if slothash.len() != SLOTHASH_LEN {
        return Err(MessageError::WrongSlothashLength {
            got: slothash.len(),
        });
    }
    let mut msg = MessageBuffer::new();
    msg.push_bytes(queue_key);
    msg.push_bytes(feed_hash);
    msg.push_decimal(value);
    msg.push_bytes(slothash);
    msg.push_u64_le(max_variance);
    msg.push_u32_le(min_responses);
    msg.push_u64_le(timestamp_seconds);
    Ok(msg)
}

/// SHA-256 digest of the canonical update message.
#[allow(clippy::too_many_arguments)]
pub fn update_digest(
    queue_key: &[u8],
    feed_hash: &[u8],
    value: &Decimal,
    slothash: &[u8],
    max_variance: u64,
    min_responses: u32,
    timestamp_seconds: u64,
) -> Result<[u8; 32], MessageError> {
    Ok(update_message(
        queue_key,
        feed_hash,
        value,
        slothash,
        max_variance,
        min_responses,
        timestamp_seconds,
    )?
    .finalize())
}

/// Length guard for stored oracle keys (32 bytes).
pub fn check_oracle_key(key: &[u8]) -> Result<(), MessageError> {
    if key.len() != ORACLE_KEY_LEN {
        return Err(MessageError::WrongOracleKeyLength { got: key.len() });
    }
    Ok(())
}

/// Length guard for feed hashes (32 bytes).
pub fn check_feed_hash(hash: &[u8]) -> Result<(), MessageError> {
    if hash.len() != FEED_HASH_LEN {
        return Err(MessageError::WrongFeedHashLength { got: hash.len() });
    }
    Ok(())
}

/// Length guard for queue keys (32 bytes).
pub fn check_queue_key(key: &[u8]) -> Result<(), MessageError> {
    if key.len() != QUEUE_KEY_LEN {
        return Err(MessageError::WrongQueueKeyLength { got: key.len() });
    }
    Ok(())
}

/// Length guard for enclave measurements (32 bytes).
pub fn check_mr_enclave(mr_enclave: &[u8]) -> Result<(), MessageError> {
    if mr_enclave.len() != MR_ENCLAVE_LEN {
        return Err(MessageError::WrongMrEnclaveLength {
            got: mr_enclave.len(),
        });
    }
    Ok(())
}

/// Length guard for stored secp256k1 public keys (64 bytes, X‖Y without
/// the 0x04 prefix).
pub fn check_secp256k1_key(key: &[u8]) -> Result<(), MessageError> {
    if key.len() != SECP256K1_KEY_LEN {
        return Err(MessageError::WrongSecp256k1KeyLength { got: key.len() });
    }
    Ok(())
}
