use cosmwasm_std::{entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult};
use cw2::set_contract_version;

use crate::error::ContractError;
use crate::execute;
use crate::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};
use crate::query;
use crate::state::{DeploymentConfig, CONFIG, NEXT_ORACLE_ID, NEXT_QUEUE_ID, NEXT_VERIFIER_ID};

const CONTRACT_NAME: &str = "crates.io:pulse-oracle";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let authority = match &msg.authority {
        Some(a) => deps.api.addr_validate(a)?,
        None => info.sender.clone(),
    };

    let config = DeploymentConfig {
        authority: authority.clone(),
        oracle_queue_id: None,
        guardian_queue_id: None,
    };
    CONFIG.save(deps.storage, &config)?;
    NEXT_QUEUE_ID.save(deps.storage, &0u64)?;
    NEXT_ORACLE_ID.save(deps.storage, &0u64)?;
    NEXT_VERIFIER_ID.save(deps.storage, &0u64)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "pulse-oracle")
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
        ExecuteMsg::CreateQueue(params) => execute::create_queue(deps, env, info, params),
        ExecuteMsg::QueueSetConfigs {
            queue_id,
            name,
            fee,
            fee_recipient,
            min_attestations,
            oracle_validity_length_ms,
        } => execute::queue_set_configs(
            deps,
            env,
            info,
            queue_id,
            name,
            fee,
            fee_recipient,
            min_attestations,
            oracle_validity_length_ms,
        ),
        ExecuteMsg::QueueSetAuthority {
            queue_id,
            authority,
        } => execute::queue_set_authority(deps, env, info, queue_id, authority),
        ExecuteMsg::QueueAddFeeDenom { queue_id, denom } => {
            execute::queue_add_fee_denom(deps, env, info, queue_id, denom)
        }
        ExecuteMsg::QueueRemoveFeeDenom { queue_id, denom } => {
            execute::queue_remove_fee_denom(deps, env, info, queue_id, denom)
        }
        ExecuteMsg::QueueOverrideOracle {
            queue_id,
            oracle_id,
            secp256k1_key,
            mr_enclave,
            expiration_time_ms,
        } => execute::queue_override_oracle(
            deps,
            env,
            info,
            queue_id,
            oracle_id,
            secp256k1_key,
            mr_enclave,
            expiration_time_ms,
        ),
        ExecuteMsg::OracleInit {
            queue_id,
            oracle_key,
        } => execute::oracle_init(deps, env, info, queue_id, oracle_key),
        ExecuteMsg::CreateVerifier { queue_id } => {
            execute::create_verifier(deps, env, info, queue_id)
        }
        ExecuteMsg::DeleteVerifier { verifier_id } => {
            execute::delete_verifier(deps, env, info, verifier_id)
        }
        ExecuteMsg::SubmitQuotes(params) => execute::submit_quotes(deps, env, info, params),
        ExecuteMsg::UpdateConfig {
            authority,
            oracle_queue_id,
            guardian_queue_id,
        } => execute::update_config(deps, env, info, authority, oracle_queue_id, guardian_queue_id),
    }
}

#[entry_point]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::Queue { queue_id } => query::query_queue(deps, queue_id),
        QueryMsg::Queues { start_after, limit } => query::query_queues(deps, start_after, limit),
        QueryMsg::Oracle { oracle_id } => query::query_oracle(deps, oracle_id),
        QueryMsg::Verifier { verifier_id } => query::query_verifier(deps, verifier_id),
        QueryMsg::Quote {
            verifier_id,
            feed_id,
        } => query::query_quote(deps, verifier_id, feed_id),
        QueryMsg::QuoteExists {
            verifier_id,
            feed_id,
        } => query::query_quote_exists(deps, verifier_id, feed_id),
    }
}
