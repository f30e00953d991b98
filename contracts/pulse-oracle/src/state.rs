use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Uint128};
use cw_storage_plus::{Item, Map};
use pulse_common::Quote;

pub const CONFIG: Item<DeploymentConfig> = Item::new("config");
pub const QUEUES: Map<u64, Queue> = Map::new("queues");
pub const ORACLES: Map<u64, Oracle> = Map::new("oracles");
/// (queue_id, oracle_id) → oracle_key. Membership here is the admission
/// criterion for oracle signatures; only `queue_override_oracle` writes it.
pub const QUEUE_MEMBERS: Map<(u64, u64), Vec<u8>> = Map::new("queue_members");
pub const VERIFIERS: Map<u64, VerifierInfo> = Map::new("verifiers");
/// (verifier_id, feed_id) → latest admitted quote.
pub const VERIFIER_QUOTES: Map<(u64, &[u8]), Quote> = Map::new("verifier_quotes");

pub const NEXT_QUEUE_ID: Item<u64> = Item::new("next_queue_id");
pub const NEXT_ORACLE_ID: Item<u64> = Item::new("next_oracle_id");
pub const NEXT_VERIFIER_ID: Item<u64> = Item::new("next_verifier_id");

/// Deployment singleton: contract authority plus the default queue ids
/// consumers resolve at startup.
#[cw_serde]
pub struct DeploymentConfig {
    pub authority: Addr,
    pub oracle_queue_id: Option<u64>,
    pub guardian_queue_id: Option<u64>,
}

#[cw_serde]
pub struct Queue {
    pub id: u64,
    /// 32-byte queue identifier, part of the signed update message.
    pub queue_key: Vec<u8>,
    pub authority: Addr,
    pub name: String,
    /// Fee charged per aggregator update, in any approved denom.
    pub fee: Uint128,
    pub fee_recipient: Addr,
    pub min_attestations: u32,
    pub oracle_validity_length_ms: u64,
    pub guardian_queue_id: Option<u64>,
    pub is_guardian: bool,
    /// Denoms accepted for fee payment.
    pub fee_denoms: Vec<String>,
    pub last_queue_override_ms: u64,
}

#[cw_serde]
pub struct Oracle {
    pub id: u64,
    pub queue_id: u64,
    /// 32-byte oracle identifier, stable across re-attestations.
    pub oracle_key: Vec<u8>,
    /// 64-byte uncompressed secp256k1 key (X‖Y). All zeroes until the
    /// first override.
    pub secp256k1_key: Vec<u8>,
    /// 32-byte attested enclave measurement.
    pub mr_enclave: Vec<u8>,
    pub expiration_time_ms: u64,
    pub valid_attestations: Vec<Attestation>,
}

/// One re-attestation applied through `queue_override_oracle`.
#[cw_serde]
pub struct Attestation {
    pub secp256k1_key: Vec<u8>,
    pub mr_enclave: Vec<u8>,
    pub expiration_time_ms: u64,
    pub attested_at_ms: u64,
}

#[cw_serde]
pub struct VerifierInfo {
    pub id: u64,
    pub queue_id: u64,
    pub owner: Addr,
}
