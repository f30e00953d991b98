use cosmwasm_schema::cw_serde;

use crate::decimal::Decimal;

/// One feed's entry in a committee submission. The canonical consensus
/// message serializes these in submission order.
#[cw_serde]
pub struct FeedSubmission {
    /// 32-byte feed identifier (sha256 of the job definition).
    pub feed_id: Vec<u8>,
    pub value: Decimal,
    /// Minimum committee size required to admit this feed.
    pub min_oracle_samples: u8,
}

/// A verified (feed, value, timestamp, slot) record. Immutable once
/// created; the slot breaks ties between quotes with equal timestamps.
#[cw_serde]
pub struct Quote {
    pub feed_id: Vec<u8>,
    pub result: Decimal,
    pub timestamp_ms: u64,
    pub slot: u64,
}
