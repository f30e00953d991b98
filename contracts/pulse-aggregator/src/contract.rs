use cosmwasm_std::{entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult};
use cw2::set_contract_version;

use crate::error::ContractError;
use crate::execute;
use crate::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};
use crate::query;
use crate::state::{AggregatorContractConfig, CONFIG, NEXT_AGGREGATOR_ID};

const CONTRACT_NAME: &str = "crates.io:pulse-aggregator";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let registry = deps.api.addr_validate(&msg.registry)?;
    let authority = match &msg.authority {
        Some(a) => deps.api.addr_validate(a)?,
        None => info.sender.clone(),
    };

    let config = AggregatorContractConfig {
        authority: authority.clone(),
        registry: registry.clone(),
    };
    CONFIG.save(deps.storage, &config)?;
    NEXT_AGGREGATOR_ID.save(deps.storage, &0u64)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "pulse-aggregator")
        .add_attribute("registry", registry.to_string())
        .add_attribute("authority", authority.to_string()))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::CreateAggregator(params) => {
            execute::create_aggregator(deps, env, info, params)
        }
        ExecuteMsg::SetConfigs {
            aggregator_id,
            name,
            max_staleness_seconds,
            max_variance,
            min_responses,
        } => execute::set_configs(
            deps,
            env,
            info,
            aggregator_id,
            name,
            max_staleness_seconds,
            max_variance,
            min_responses,
        ),
        ExecuteMsg::SetAuthority {
            aggregator_id,
            authority,
        } => execute::set_authority(deps, env, info, aggregator_id, authority),
        ExecuteMsg::SubmitResult(params) => execute::submit_result(deps, env, info, params),
        ExecuteMsg::UpdateConfig {
            authority,
            registry,
        } => execute::update_config(deps, env, info, authority, registry),
    }
}

#[entry_point]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::Aggregator { aggregator_id } => query::query_aggregator(deps, aggregator_id),
        QueryMsg::Aggregators { start_after, limit } => {
            query::query_aggregators(deps, start_after, limit)
        }
        QueryMsg::CurrentResult { aggregator_id } => {
            query::query_current_result(deps, aggregator_id)
        }
    }
}
