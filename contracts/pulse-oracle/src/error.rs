use cosmwasm_std::StdError;
use pulse_common::MessageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error(transparent)]
    Message(#[from] MessageError),

    #[error("invalid hex input: {field}")]
    InvalidHex { field: String },

    #[error("invalid authority: {reason}")]
    InvalidAuthority { reason: String },

    #[error("queue {queue_id} not found")]
    QueueNotFound { queue_id: u64 },

    #[error("oracle {oracle_id} not found")]
    OracleNotFound { oracle_id: u64 },

    #[error("verifier {verifier_id} not found")]
    VerifierNotFound { verifier_id: u64 },

    #[error("oracle {oracle_id} belongs to queue {got}, expected {expected}")]
    QueueMismatch {
        oracle_id: u64,
        expected: u64,
        got: u64,
    },

    #[error("oracle {oracle_id} is not a valid queue member (expired or never attested)")]
    OracleInvalid { oracle_id: u64 },

    #[error("submission queue {got} does not match verifier queue {expected}")]
    InvalidQueue { expected: u64, got: u64 },

    #[error("committee size {got} outside 1..={max}")]
    CommitteeSize { got: usize, max: usize },

    #[error("length mismatch: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("min_attestations must be positive, got {got}")]
    InvalidMinAttestations { got: u32 },

    #[error("oracle_validity_length_ms must be positive")]
    InvalidOracleValidityLength {},

    #[error("expiration {expiration_time_ms} is not after current time {now_ms}")]
    ExpirationInPast {
        expiration_time_ms: u64,
        now_ms: u64,
    },
}
