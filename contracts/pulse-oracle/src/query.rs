use cosmwasm_std::{to_json_binary, Binary, Deps, Order, StdError, StdResult};
use cw_storage_plus::Bound;

use crate::msg::QueuesResponse;
use crate::state::{CONFIG, ORACLES, QUEUES, VERIFIERS, VERIFIER_QUOTES};

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_queue(deps: Deps, queue_id: u64) -> StdResult<Binary> {
    let queue = QUEUES.load(deps.storage, queue_id)?;
    to_json_binary(&queue)
}

pub fn query_queues(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(20).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let queues: Vec<_> = QUEUES
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(_, queue)| queue)
        .collect();

    to_json_binary(&QueuesResponse { queues })
}

pub fn query_oracle(deps: Deps, oracle_id: u64) -> StdResult<Binary> {
    let oracle = ORACLES.load(deps.storage, oracle_id)?;
    to_json_binary(&oracle)
}

pub fn query_verifier(deps: Deps, verifier_id: u64) -> StdResult<Binary> {
    let verifier = VERIFIERS.load(deps.storage, verifier_id)?;
    to_json_binary(&verifier)
}

pub fn query_quote(deps: Deps, verifier_id: u64, feed_id: String) -> StdResult<Binary> {
    let feed_id = hex::decode(&feed_id)
        .map_err(|_| StdError::generic_err("invalid hex input: feed_id"))?;
    let quote = VERIFIER_QUOTES
        .may_load(deps.storage, (verifier_id, feed_id.as_slice()))?
        .ok_or_else(|| StdError::not_found("quote for feed"))?;
    to_json_binary(&quote)
}

pub fn query_quote_exists(deps: Deps, verifier_id: u64, feed_id: String) -> StdResult<Binary> {
    let feed_id = hex::decode(&feed_id)
        .map_err(|_| StdError::generic_err("invalid hex input: feed_id"))?;
    let exists = VERIFIER_QUOTES.has(deps.storage, (verifier_id, feed_id.as_slice()));
    to_json_binary(&exists)
}
