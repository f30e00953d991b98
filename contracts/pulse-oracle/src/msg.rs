use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::Uint128;
use pulse_common::{Decimal, Quote};

use crate::state::{DeploymentConfig, Oracle, Queue, VerifierInfo};

#[cw_serde]
pub struct InstantiateMsg {
    /// Defaults to the instantiating sender.
    pub authority: Option<String>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Register a new oracle queue. The sender becomes its authority
    /// unless one is given.
    CreateQueue(CreateQueueParams),
    /// Update queue parameters. Queue authority only.
    QueueSetConfigs {
        queue_id: u64,
        name: Option<String>,
        fee: Option<Uint128>,
        fee_recipient: Option<String>,
        min_attestations: Option<u32>,
        oracle_validity_length_ms: Option<u64>,
    },
    /// Rotate the queue authority. Queue authority only.
    QueueSetAuthority { queue_id: u64, authority: String },
    /// Approve a fee denom. Queue authority only.
    QueueAddFeeDenom { queue_id: u64, denom: String },
    /// Revoke a fee denom. Queue authority only.
    QueueRemoveFeeDenom { queue_id: u64, denom: String },
    /// Re-attest an oracle: the only path that changes its secp256k1 key,
    /// enclave measurement, and expiry, and the only path that registers
    /// it as a queue member. Queue authority only.
    QueueOverrideOracle {
        queue_id: u64,
        oracle_id: u64,
        /// Hex-encoded 64-byte uncompressed key (X‖Y)
        secp256k1_key: String,
        /// Hex-encoded 32-byte enclave measurement
        mr_enclave: String,
        expiration_time_ms: u64,
    },
    /// Create a fresh oracle bound to a queue. Unusable until overridden.
    OracleInit {
        queue_id: u64,
        /// Hex-encoded 32-byte oracle identifier
        oracle_key: String,
    },
    /// Create a quote verifier owned by the sender.
    CreateVerifier { queue_id: u64 },
    /// Delete a verifier and its stored quotes. Owner only.
    DeleteVerifier { verifier_id: u64 },
    /// Verify a committee submission and admit the surviving quotes into
    /// the named verifier. Owner only.
    SubmitQuotes(SubmitQuotesParams),
    /// Update the deployment config. Contract authority only.
    UpdateConfig {
        authority: Option<String>,
        oracle_queue_id: Option<u64>,
        guardian_queue_id: Option<u64>,
    },
}

#[cw_serde]
pub struct CreateQueueParams {
    /// Hex-encoded 32-byte queue identifier
    pub queue_key: String,
    pub name: String,
    pub authority: Option<String>,
    pub fee: Uint128,
    pub fee_recipient: String,
    pub min_attestations: u32,
    pub oracle_validity_length_ms: u64,
    pub guardian_queue_id: Option<u64>,
    pub is_guardian: bool,
    pub fee_denoms: Vec<String>,
}

#[cw_serde]
pub struct SubmitQuotesParams {
    pub verifier_id: u64,
    /// Must match the verifier's queue.
    pub queue_id: u64,
    pub feeds: Vec<FeedInput>,
    /// Hex-encoded 65-byte signatures (r‖s‖v), one per oracle, in
    /// committee order.
    pub signatures: Vec<String>,
    pub slot: u64,
    pub timestamp_seconds: u64,
    /// Committee oracle ids, 1 to 6, positionally matched to signatures.
    pub oracle_ids: Vec<u64>,
}

#[cw_serde]
pub struct FeedInput {
    /// Hex-encoded 32-byte feed identifier
    pub feed_id: String,
    pub value: Decimal,
    pub min_oracle_samples: u8,
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(DeploymentConfig)]
    Config {},

    #[returns(Queue)]
    Queue { queue_id: u64 },

    #[returns(QueuesResponse)]
    Queues {
        start_after: Option<u64>,
        limit: Option<u32>,
    },

    #[returns(Oracle)]
    Oracle { oracle_id: u64 },

    #[returns(VerifierInfo)]
    Verifier { verifier_id: u64 },

    #[returns(Quote)]
    Quote {
        verifier_id: u64,
        /// Hex-encoded 32-byte feed identifier
        feed_id: String,
    },

    #[returns(bool)]
    QuoteExists { verifier_id: u64, feed_id: String },
}

#[cw_serde]
pub struct QueuesResponse {
    pub queues: Vec<Queue>,
}
