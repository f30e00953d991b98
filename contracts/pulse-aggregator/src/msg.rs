use cosmwasm_schema::{cw_serde, QueryResponses};
use pulse_common::Decimal;

use crate::state::{Aggregator, AggregatorContractConfig, Summary};

#[cw_serde]
pub struct InstantiateMsg {
    /// Address of the pulse-oracle registry contract.
    pub registry: String,
    /// Defaults to the instantiating sender.
    pub authority: Option<String>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Create an aggregator for a single feed on a queue.
    CreateAggregator(CreateAggregatorParams),
    /// Update aggregator parameters. Aggregator authority only. The ring
    /// capacity (`min_sample_size`) is fixed at creation.
    SetConfigs {
        aggregator_id: u64,
        name: Option<String>,
        max_staleness_seconds: Option<u64>,
        max_variance: Option<u64>,
        min_responses: Option<u32>,
    },
    /// Rotate the aggregator authority. Aggregator authority only.
    SetAuthority {
        aggregator_id: u64,
        authority: String,
    },
    /// Submit one signed oracle update. The attached funds pay the queue
    /// fee and are forwarded whole to the queue's fee recipient.
    SubmitResult(SubmitResultParams),
    /// Update the contract config. Contract authority only.
    UpdateConfig {
        authority: Option<String>,
        registry: Option<String>,
    },
}

#[cw_serde]
pub struct CreateAggregatorParams {
    pub queue_id: u64,
    /// Hex-encoded 32-byte feed identifier
    pub feed_hash: String,
    pub name: String,
    pub authority: Option<String>,
    pub min_sample_size: u32,
    pub max_staleness_seconds: u64,
    pub max_variance: u64,
    pub min_responses: u32,
}

#[cw_serde]
pub struct SubmitResultParams {
    pub aggregator_id: u64,
    pub value: Decimal,
    pub timestamp_seconds: u64,
    pub oracle_id: u64,
    /// Hex-encoded 65-byte signature (r‖s‖v) over the canonical update
    /// message.
    pub signature: String,
}

/// Query message for the pulse-oracle registry contract.
#[cw_serde]
pub enum RegistryQueryMsg {
    Queue { queue_id: u64 },
    Oracle { oracle_id: u64 },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(AggregatorContractConfig)]
    Config {},

    #[returns(Aggregator)]
    Aggregator { aggregator_id: u64 },

    #[returns(AggregatorsResponse)]
    Aggregators {
        start_after: Option<u64>,
        limit: Option<u32>,
    },

    #[returns(CurrentResultResponse)]
    CurrentResult { aggregator_id: u64 },
}

#[cw_serde]
pub struct AggregatorsResponse {
    pub aggregators: Vec<Aggregator>,
}

#[cw_serde]
pub struct CurrentResultResponse {
    pub aggregator_id: u64,
    /// `None` until the populated window reaches `min_responses`.
    pub result: Option<Summary>,
    pub populated: u32,
    pub min_responses: u32,
}
