use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Uint128};
use cw_storage_plus::{Item, Map};
use pulse_common::Decimal;

pub const CONFIG: Item<AggregatorContractConfig> = Item::new("config");
pub const AGGREGATORS: Map<u64, Aggregator> = Map::new("aggregators");
pub const NEXT_AGGREGATOR_ID: Item<u64> = Item::new("next_aggregator_id");

#[cw_serde]
pub struct AggregatorContractConfig {
    pub authority: Addr,
    /// The pulse-oracle contract holding queues and oracles.
    pub registry: Addr,
}

#[cw_serde]
pub struct Aggregator {
    pub id: u64,
    pub authority: Addr,
    pub queue_id: u64,
    /// 32-byte feed identifier, part of the signed update message.
    pub feed_hash: Vec<u8>,
    pub name: String,
    pub created_at_ms: u64,
    /// Ring capacity; fixed at creation.
    pub min_sample_size: u32,
    /// Stored for consumers; reads are not gated on it here.
    pub max_staleness_seconds: u64,
    /// Divergence tolerance signed into every update message. Applied as
    /// a filter off-chain.
    pub max_variance: u64,
    /// Populated-count threshold below which the current result is not
    /// considered valid.
    pub min_responses: u32,
    pub current_result: Summary,
    pub update_state: UpdateState,
}

/// Rolling statistics over the populated ring entries.
#[cw_serde]
pub struct Summary {
    /// Median (lower median for an even sample count).
    pub result: Decimal,
    pub mean: Decimal,
    pub range: Decimal,
    /// Population standard deviation.
    pub stdev: Decimal,
    pub min_result: Decimal,
    pub max_result: Decimal,
    pub min_timestamp_ms: u64,
    pub max_timestamp_ms: u64,
}

impl Summary {
    pub fn zero() -> Self {
        Summary {
            result: Decimal::zero(),
            mean: Decimal::zero(),
            range: Decimal::zero(),
            stdev: Decimal::zero(),
            min_result: Decimal::zero(),
            max_result: Decimal::zero(),
            min_timestamp_ms: 0,
            max_timestamp_ms: 0,
        }
    }
}

#[cw_serde]
pub struct UpdateState {
    /// Next ring slot to write, advancing modulo capacity.
    pub curr_idx: u32,
    pub results: Vec<Option<UpdateEntry>>,
}

#[cw_serde]
pub struct UpdateEntry {
    pub oracle_id: u64,
    pub result: Decimal,
    pub timestamp_ms: u64,
}

/// Mirror of the pulse-oracle `Queue` record, field for field: the
/// registry serializes the full struct and `#[cw_serde]` rejects unknown
/// fields.
#[cw_serde]
pub struct QueueResponse {
    pub id: u64,
    pub queue_key: Vec<u8>,
    pub authority: Addr,
    pub name: String,
    pub fee: Uint128,
    pub fee_recipient: Addr,
    pub min_attestations: u32,
    pub oracle_validity_length_ms: u64,
    pub guardian_queue_id: Option<u64>,
    pub is_guardian: bool,
    pub fee_denoms: Vec<String>,
    pub last_queue_override_ms: u64,
}

/// Mirror of the pulse-oracle `Oracle` record.
#[cw_serde]
pub struct OracleResponse {
    pub id: u64,
    pub queue_id: u64,
    pub oracle_key: Vec<u8>,
    pub secp256k1_key: Vec<u8>,
    pub mr_enclave: Vec<u8>,
    pub expiration_time_ms: u64,
    pub valid_attestations: Vec<AttestationResponse>,
}

#[cw_serde]
pub struct AttestationResponse {
    pub secp256k1_key: Vec<u8>,
    pub mr_enclave: Vec<u8>,
    pub expiration_time_ms: u64,
    pub attested_at_ms: u64,
}
