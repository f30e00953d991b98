use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use thiserror::Error;

/// r ‖ s ‖ v, where v is the recovery id.
pub const SIGNATURE_LEN: usize = 65;

/// Errors from secp256k1 public-key recovery.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerifyError {
    #[error("signature must be {SIGNATURE_LEN} bytes (r||s||v), got {got}")]
    WrongSignatureLength { got: usize },

    #[error("invalid recovery id {id}")]
    InvalidRecoveryId { id: u8 },

    #[error("malformed signature scalars")]
    MalformedSignature,

    #[error("public key recovery failed")]
    RecoveryFailed,
}

/// Recover the signer's uncompressed secp256k1 public key from a 65-byte
/// signature over a 32-byte message digest.
///
/// Returns the 64-byte X‖Y form (no 0x04 prefix), matching the key layout
/// stored on oracle records. The recovery id is taken from the signature's
/// final octet; Ethereum-style 27/28 values are normalized to 0/1.
pub fn recover_pubkey(digest: &[u8; 32], signature: &[u8]) -> Result<[u8; 64], VerifyError> {
    if signature.len() != SIGNATURE_LEN {
        return Err(VerifyError::WrongSignatureLength {
            got: signature.len(),
        });
    }

    let v = signature[64];
    let v = if v >= 27 { v - 27 } else { v };
    let recovery_id =
        RecoveryId::from_byte(v).ok_or(VerifyError::InvalidRecoveryId { id: signature[64] })?;

    let sig =
        Signature::from_slice(&signature[..64]).map_err(|_| VerifyError::MalformedSignature)?;

    let key = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
        .map_err(|_| VerifyError::RecoveryFailed)?;

    // SEC1 uncompressed: 0x04 ‖ X(32) ‖ Y(32); stored keys drop the prefix
    let point = key.to_encoded_point(false);
    let mut out = [0u8; 64];
    out.copy_from_slice(&point.as_bytes()[1..65]);
    Ok(out)
}
