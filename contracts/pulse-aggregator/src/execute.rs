use cosmwasm_std::{
    to_json_binary, BankMsg, Coin, DepsMut, Env, Event, MessageInfo, QueryRequest, Response,
    WasmQuery,
};
use pulse_common::message::check_feed_hash;
use pulse_common::{recover_pubkey, update_digest, Decimal};

use crate::error::ContractError;
use crate::msg::{CreateAggregatorParams, RegistryQueryMsg, SubmitResultParams};
use crate::state::{
    Aggregator, OracleResponse, QueueResponse, Summary, UpdateEntry, UpdateState, AGGREGATORS,
    CONFIG, NEXT_AGGREGATOR_ID,
};
use crate::stats::compute_summary;

/// Upper bound on the ring capacity.
pub const MAX_SAMPLE_SIZE: u32 = 128;

const ZERO_SLOTHASH: [u8; 32] = [0u8; 32];

fn decode_hex(field: &str, s: &str) -> Result<Vec<u8>, ContractError> {
    hex::decode(s).map_err(|_| ContractError::InvalidHex {
        field: field.to_string(),
    })
}

fn now_ms(env: &Env) -> u64 {
    env.block.time.nanos() / 1_000_000
}

fn load_aggregator(deps: &DepsMut, aggregator_id: u64) -> Result<Aggregator, ContractError> {
    AGGREGATORS
        .may_load(deps.storage, aggregator_id)?
        .ok_or(ContractError::AggregatorNotFound { aggregator_id })
}

fn ensure_aggregator_authority(
    aggregator: &Aggregator,
    info: &MessageInfo,
) -> Result<(), ContractError> {
    if info.sender != aggregator.authority {
        return Err(ContractError::InvalidAuthority {
            reason: format!(
                "only the aggregator authority can modify aggregator {}",
                aggregator.id
            ),
        });
    }
    Ok(())
}

/// Create an aggregator. The ring capacity equals `min_sample_size` and
/// never changes afterwards.
pub fn create_aggregator(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    params: CreateAggregatorParams,
) -> Result<Response, ContractError> {
    let feed_hash = decode_hex("feed_hash", &params.feed_hash)?;
    check_feed_hash(&feed_hash)?;

    if params.min_sample_size == 0 || params.min_sample_size > MAX_SAMPLE_SIZE {
        return Err(ContractError::InvalidMinSampleSize {
            got: params.min_sample_size,
            max: MAX_SAMPLE_SIZE,
        });
    }
    if params.min_responses == 0 {
        return Err(ContractError::InvalidMinResponses {
            got: params.min_responses,
        });
    }

    let authority = match &params.authority {
        Some(a) => deps.api.addr_validate(a)?,
        None => info.sender.clone(),
    };

    let id = NEXT_AGGREGATOR_ID.load(deps.storage)?;
    NEXT_AGGREGATOR_ID.save(deps.storage, &(id + 1))?;

    let aggregator = Aggregator {
        id,
        authority: authority.clone(),
        queue_id: params.queue_id,
        feed_hash,
        name: params.name.clone(),
        created_at_ms: now_ms(&env),
        min_sample_size: params.min_sample_size,
        max_staleness_seconds: params.max_staleness_seconds,
        max_variance: params.max_variance,
        min_responses: params.min_responses,
        current_result: Summary::zero(),
        update_state: UpdateState {
            curr_idx: 0,
            results: vec![None; params.min_sample_size as usize],
        },
    };
    AGGREGATORS.save(deps.storage, id, &aggregator)?;

    Ok(Response::new()
        .add_attribute("action", "create_aggregator")
        .add_attribute("aggregator_id", id.to_string())
        .add_event(
            Event::new("pulse_aggregator_created")
                .add_attribute("aggregator_id", id.to_string())
                .add_attribute("queue_id", params.queue_id.to_string())
                .add_attribute("feed_hash", params.feed_hash)
                .add_attribute("name", params.name)
                .add_attribute("authority", authority.to_string()),
        ))
}

/// Update aggregator parameters. Aggregator authority only.
pub fn set_configs(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    aggregator_id: u64,
    name: Option<String>,
    max_staleness_seconds: Option<u64>,
    max_variance: Option<u64>,
    min_responses: Option<u32>,
) -> Result<Response, ContractError> {
    let mut aggregator = load_aggregator(&deps, aggregator_id)?;
    ensure_aggregator_authority(&aggregator, &info)?;

    if let Some(name) = name {
        aggregator.name = name;
    }
    if let Some(staleness) = max_staleness_seconds {
        aggregator.max_staleness_seconds = staleness;
    }
    if let Some(variance) = max_variance {
        aggregator.max_variance = variance;
    }
    if let Some(min_responses) = min_responses {
        if min_responses == 0 {
            return Err(ContractError::InvalidMinResponses { got: 0 });
        }
        aggregator.min_responses = min_responses;
    }
    AGGREGATORS.save(deps.storage, aggregator_id, &aggregator)?;

    Ok(Response::new()
        .add_attribute("action", "set_configs")
        .add_attribute("aggregator_id", aggregator_id.to_string()))
}

/// Rotate the aggregator authority. Aggregator authority only.
pub fn set_authority(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    aggregator_id: u64,
    authority: String,
) -> Result<Response, ContractError> {
    let mut aggregator = load_aggregator(&deps, aggregator_id)?;
    ensure_aggregator_authority(&aggregator, &info)?;

    let new_authority = deps.api.addr_validate(&authority)?;
    aggregator.authority = new_authority.clone();
    AGGREGATORS.save(deps.storage, aggregator_id, &aggregator)?;

    Ok(Response::new()
        .add_attribute("action", "set_authority")
        .add_attribute("aggregator_id", aggregator_id.to_string())
        .add_event(
            Event::new("pulse_aggregator_authority_updated")
                .add_attribute("aggregator_id", aggregator_id.to_string())
                .add_attribute("authority", new_authority.to_string()),
        ))
}

/// Submit one signed oracle update into the aggregator's ring.
///
/// Unlike the committee path, a recovery mismatch here is fatal: a
/// single-signer update has no valid subset to fall back on.
pub fn submit_result(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    params: SubmitResultParams,
) -> Result<Response, ContractError> {
    let SubmitResultParams {
        aggregator_id,
        value,
        timestamp_seconds,
        oracle_id,
        signature,
    } = params;

    let mut aggregator = load_aggregator(&deps, aggregator_id)?;
    let config = CONFIG.load(deps.storage)?;

    // re-normalize and bound to the signed domain used by the encoding
    let (magnitude, neg) = value.unpack();
    let value = Decimal::new(magnitude, neg);
    if value.to_i128().is_none() {
        return Err(ContractError::ValueOutOfRange);
    }

    let oracle: OracleResponse = deps.querier.query(&QueryRequest::Wasm(WasmQuery::Smart {
        contract_addr: config.registry.to_string(),
        msg: to_json_binary(&RegistryQueryMsg::Oracle { oracle_id })?,
    }))?;
    let queue: QueueResponse = deps.querier.query(&QueryRequest::Wasm(WasmQuery::Smart {
        contract_addr: config.registry.to_string(),
        msg: to_json_binary(&RegistryQueryMsg::Queue {
            queue_id: aggregator.queue_id,
        })?,
    }))?;

    if oracle.queue_id != aggregator.queue_id {
        return Err(ContractError::QueueMismatch {
            oracle_id,
            expected: aggregator.queue_id,
            got: oracle.queue_id,
        });
    }

    let now = now_ms(&env);
    if oracle.expiration_time_ms <= now {
        return Err(ContractError::OracleInvalid { oracle_id });
    }

    let timestamp_ms = timestamp_seconds.saturating_mul(1000);
    if timestamp_ms > now {
        return Err(ContractError::FutureTimestamp {
            timestamp_ms,
            now_ms: now,
        });
    }

    let fee_msg = collect_fee(&info, &queue)?;

    let digest = update_digest(
        &queue.queue_key,
        &aggregator.feed_hash,
        &value,
        &ZERO_SLOTHASH,
        aggregator.max_variance,
        aggregator.min_responses,
        timestamp_seconds,
    )?;
    let signature = decode_hex("signature", &signature)?;
    let recovered = recover_pubkey(&digest, &signature)?;
    if recovered[..] != oracle.secp256k1_key[..] {
        return Err(ContractError::SignatureMismatch { oracle_id });
    }

    // write the ring slot and advance
    let capacity = aggregator.update_state.results.len() as u32;
    let idx = aggregator.update_state.curr_idx;
    aggregator.update_state.results[idx as usize] = Some(UpdateEntry {
        oracle_id,
        result: value,
        timestamp_ms,
    });
    aggregator.update_state.curr_idx = (idx + 1) % capacity;

    let populated: Vec<UpdateEntry> = aggregator
        .update_state
        .results
        .iter()
        .flatten()
        .cloned()
        .collect();
    if populated.len() >= aggregator.min_sample_size as usize {
        if let Some(summary) = compute_summary(&populated) {
            aggregator.current_result = summary;
        }
    }
    AGGREGATORS.save(deps.storage, aggregator_id, &aggregator)?;

    let mut response = Response::new()
        .add_attribute("action", "submit_result")
        .add_attribute("aggregator_id", aggregator_id.to_string())
        .add_attribute("oracle_id", oracle_id.to_string())
        .add_event(
            Event::new("pulse_result_submitted")
                .add_attribute("aggregator_id", aggregator_id.to_string())
                .add_attribute("oracle_id", oracle_id.to_string())
                .add_attribute("value", value.value().to_string())
                .add_attribute("neg", value.is_neg().to_string())
                .add_attribute("timestamp_ms", timestamp_ms.to_string()),
        );
    if let Some(msg) = fee_msg {
        response = response.add_message(msg);
    }
    Ok(response)
}

/// Validate the attached fee and build the forward to the queue's fee
/// recipient. A zero-fee queue takes no funds.
fn collect_fee(info: &MessageInfo, queue: &QueueResponse) -> Result<Option<BankMsg>, ContractError> {
    if queue.fee.is_zero() {
        return Ok(None);
    }
    if info.funds.is_empty() {
        return Err(ContractError::NoFundsSent);
    }
    if info.funds.len() != 1 {
        return Err(ContractError::InvalidFunds);
    }
    let sent = &info.funds[0];
    if !queue.fee_denoms.contains(&sent.denom) {
        return Err(ContractError::FeeType {
            denom: sent.denom.clone(),
        });
    }
    if sent.amount != queue.fee {
        return Err(ContractError::FeeAmount {
            sent: sent.amount,
            required: queue.fee,
        });
    }
    Ok(Some(BankMsg::Send {
        to_address: queue.fee_recipient.to_string(),
        amount: vec![Coin {
            denom: sent.denom.clone(),
            amount: sent.amount,
        }],
    }))
}

/// Update the contract config. Contract authority only.
pub fn update_config(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    authority: Option<String>,
    registry: Option<String>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    if info.sender != config.authority {
        return Err(ContractError::InvalidAuthority {
            reason: "only the contract authority can update the config".to_string(),
        });
    }

    if let Some(authority) = authority {
        config.authority = deps.api.addr_validate(&authority)?;
    }
    if let Some(registry) = registry {
        config.registry = deps.api.addr_validate(&registry)?;
    }
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_config")
        .add_attribute("authority", config.authority.to_string()))
}
