use cosmwasm_std::{StdError, Uint128};
use pulse_common::{MessageError, VerifyError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error(transparent)]
    Message(#[from] MessageError),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error("invalid hex input: {field}")]
    InvalidHex { field: String },

    #[error("invalid authority: {reason}")]
    InvalidAuthority { reason: String },

    #[error("aggregator {aggregator_id} not found")]
    AggregatorNotFound { aggregator_id: u64 },

    #[error("oracle {oracle_id} belongs to queue {got}, expected {expected}")]
    QueueMismatch {
        oracle_id: u64,
        expected: u64,
        got: u64,
    },

    #[error("oracle {oracle_id} is expired")]
    OracleInvalid { oracle_id: u64 },

    #[error("update timestamp {timestamp_ms} is ahead of block time {now_ms}")]
    FutureTimestamp { timestamp_ms: u64, now_ms: u64 },

    #[error("recovered key does not match oracle {oracle_id}")]
    SignatureMismatch { oracle_id: u64 },

    #[error("no fee sent with update")]
    NoFundsSent,

    #[error("must send exactly one fee coin")]
    InvalidFunds,

    #[error("denom {denom} is not an approved fee type for this queue")]
    FeeType { denom: String },

    #[error("fee amount {sent} does not match required fee {required}")]
    FeeAmount { sent: Uint128, required: Uint128 },

    #[error("min_sample_size must be in 1..={max}, got {got}")]
    InvalidMinSampleSize { got: u32, max: u32 },

    #[error("min_responses must be positive, got {got}")]
    InvalidMinResponses { got: u32 },

    #[error("value magnitude outside the signed 128-bit domain")]
    ValueOutOfRange,
}
