use cosmwasm_std::{to_json_binary, Binary, Deps, Order, StdResult};
use cw_storage_plus::Bound;

use crate::msg::{AggregatorsResponse, CurrentResultResponse};
use crate::state::{AGGREGATORS, CONFIG};

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_aggregator(deps: Deps, aggregator_id: u64) -> StdResult<Binary> {
    let aggregator = AGGREGATORS.load(deps.storage, aggregator_id)?;
    to_json_binary(&aggregator)
}

pub fn query_aggregators(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(20).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let aggregators: Vec<_> = AGGREGATORS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(_, aggregator)| aggregator)
        .collect();

    to_json_binary(&AggregatorsResponse { aggregators })
}

/// The latest summary, exposed only once the populated window reaches
/// `min_responses`. Staleness checks are the consumer's concern.
pub fn query_current_result(deps: Deps, aggregator_id: u64) -> StdResult<Binary> {
    let aggregator = AGGREGATORS.load(deps.storage, aggregator_id)?;
    let populated = aggregator
        .update_state
        .results
        .iter()
        .filter(|r| r.is_some())
        .count() as u32;
    let result = if populated >= aggregator.min_responses {
        Some(aggregator.current_result)
    } else {
        None
    };
    to_json_binary(&CurrentResultResponse {
        aggregator_id,
        result,
        populated,
        min_responses: aggregator.min_responses,
    })
}
