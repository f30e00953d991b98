use cosmwasm_std::{
    DepsMut, Env, Event, MessageInfo, Order, Response, StdResult, Storage, Uint128,
};
use pulse_common::message::{
    check_mr_enclave, check_oracle_key, check_queue_key, check_secp256k1_key,
};
use pulse_common::{consensus_digest, recover_pubkey, Decimal, FeedSubmission, Quote};

use crate::error::ContractError;
use crate::msg::{CreateQueueParams, FeedInput, SubmitQuotesParams};
use crate::state::{
    Attestation, Oracle, Queue, VerifierInfo, CONFIG, NEXT_ORACLE_ID, NEXT_QUEUE_ID,
    NEXT_VERIFIER_ID, ORACLES, QUEUES, QUEUE_MEMBERS, VERIFIERS, VERIFIER_QUOTES,
};

/// Upper bound on committee size. Bounds signature-recovery work per call.
pub const MAX_COMMITTEE: usize = 6;

fn decode_hex(field: &str, s: &str) -> Result<Vec<u8>, ContractError> {
    hex::decode(s).map_err(|_| ContractError::InvalidHex {
        field: field.to_string(),
    })
}

fn now_ms(env: &Env) -> u64 {
    env.block.time.nanos() / 1_000_000
}

fn load_queue(deps: &DepsMut, queue_id: u64) -> Result<Queue, ContractError> {
    QUEUES
        .may_load(deps.storage, queue_id)?
        .ok_or(ContractError::QueueNotFound { queue_id })
}

fn ensure_queue_authority(queue: &Queue, info: &MessageInfo) -> Result<(), ContractError> {
    if info.sender != queue.authority {
        return Err(ContractError::InvalidAuthority {
            reason: format!("only the queue authority can modify queue {}", queue.id),
        });
    }
    Ok(())
}

/// Register a new queue.
pub fn create_queue(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    params: CreateQueueParams,
) -> Result<Response, ContractError> {
    let queue_key = decode_hex("queue_key", &params.queue_key)?;
    check_queue_key(&queue_key)?;
    if params.min_attestations == 0 {
        return Err(ContractError::InvalidMinAttestations { got: 0 });
    }
    if params.oracle_validity_length_ms == 0 {
        return Err(ContractError::InvalidOracleValidityLength {});
    }

    let authority = match &params.authority {
        Some(a) => deps.api.addr_validate(a)?,
        None => info.sender.clone(),
    };
    let fee_recipient = deps.api.addr_validate(&params.fee_recipient)?;

    let id = NEXT_QUEUE_ID.load(deps.storage)?;
    NEXT_QUEUE_ID.save(deps.storage, &(id + 1))?;

    let queue = Queue {
        id,
        queue_key,
        authority: authority.clone(),
        name: params.name.clone(),
        fee: params.fee,
        fee_recipient,
        min_attestations: params.min_attestations,
        oracle_validity_length_ms: params.oracle_validity_length_ms,
        guardian_queue_id: params.guardian_queue_id,
        is_guardian: params.is_guardian,
        fee_denoms: params.fee_denoms,
        last_queue_override_ms: 0,
    };
    QUEUES.save(deps.storage, id, &queue)?;

    Ok(Response::new()
        .add_attribute("action", "create_queue")
        .add_attribute("queue_id", id.to_string())
        .add_event(
            Event::new("pulse_queue_created")
                .add_attribute("queue_id", id.to_string())
                .add_attribute("queue_key", params.queue_key)
                .add_attribute("name", params.name)
                .add_attribute("authority", authority.to_string())
                .add_attribute("is_guardian", queue.is_guardian.to_string()),
        ))
}

/// Update queue parameters. Queue authority only.
#[allow(clippy::too_many_arguments)]
pub fn queue_set_configs(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    queue_id: u64,
    name: Option<String>,
    fee: Option<Uint128>,
    fee_recipient: Option<String>,
    min_attestations: Option<u32>,
    oracle_validity_length_ms: Option<u64>,
) -> Result<Response, ContractError> {
    let mut queue = load_queue(&deps, queue_id)?;
    ensure_queue_authority(&queue, &info)?;

    if let Some(name) = name {
        queue.name = name;
    }
    if let Some(fee) = fee {
        queue.fee = fee;
    }
    if let Some(recipient) = fee_recipient {
        queue.fee_recipient = deps.api.addr_validate(&recipient)?;
    }
    if let Some(min_attestations) = min_attestations {
        if min_attestations == 0 {
            return Err(ContractError::InvalidMinAttestations { got: 0 });
        }
        queue.min_attestations = min_attestations;
    }
    if let Some(validity) = oracle_validity_length_ms {
        if validity == 0 {
            return Err(ContractError::InvalidOracleValidityLength {});
        }
        queue.oracle_validity_length_ms = validity;
    }
    QUEUES.save(deps.storage, queue_id, &queue)?;

    Ok(Response::new()
        .add_attribute("action", "queue_set_configs")
        .add_attribute("queue_id", queue_id.to_string()))
}

/// Rotate the queue authority. Queue authority only.
pub fn queue_set_authority(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    queue_id: u64,
    authority: String,
) -> Result<Response, ContractError> {
    let mut queue = load_queue(&deps, queue_id)?;
    ensure_queue_authority(&queue, &info)?;

    let new_authority = deps.api.addr_validate(&authority)?;
    queue.authority = new_authority.clone();
    QUEUES.save(deps.storage, queue_id, &queue)?;

    Ok(Response::new()
        .add_attribute("action", "queue_set_authority")
        .add_attribute("queue_id", queue_id.to_string())
        .add_event(
            Event::new("pulse_queue_authority_updated")
                .add_attribute("queue_id", queue_id.to_string())
                .add_attribute("authority", new_authority.to_string()),
        ))
}

/// Approve a fee denom. Queue authority only.
pub fn queue_add_fee_denom(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    queue_id: u64,
    denom: String,
) -> Result<Response, ContractError> {
    let mut queue = load_queue(&deps, queue_id)?;
    ensure_queue_authority(&queue, &info)?;

    if !queue.fee_denoms.contains(&denom) {
        queue.fee_denoms.push(denom.clone());
    }
    QUEUES.save(deps.storage, queue_id, &queue)?;

    Ok(Response::new()
        .add_attribute("action", "queue_add_fee_denom")
        .add_attribute("queue_id", queue_id.to_string())
        .add_event(
            Event::new("pulse_queue_fee_type_added")
                .add_attribute("queue_id", queue_id.to_string())
                .add_attribute("denom", denom),
        ))
}

/// Revoke a fee denom. Queue authority only.
pub fn queue_remove_fee_denom(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    queue_id: u64,
    denom: String,
) -> Result<Response, ContractError> {
    let mut queue = load_queue(&deps, queue_id)?;
    ensure_queue_authority(&queue, &info)?;

    queue.fee_denoms.retain(|d| d != &denom);
    QUEUES.save(deps.storage, queue_id, &queue)?;

    Ok(Response::new()
        .add_attribute("action", "queue_remove_fee_denom")
        .add_attribute("queue_id", queue_id.to_string())
        .add_event(
            Event::new("pulse_queue_fee_type_removed")
                .add_attribute("queue_id", queue_id.to_string())
                .add_attribute("denom", denom),
        ))
}

/// Re-attest an oracle. Queue authority only. The sole mutation path for
/// the oracle's key material and expiry, and the sole path that registers
/// queue membership.
pub fn queue_override_oracle(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    queue_id: u64,
    oracle_id: u64,
    secp256k1_key: String,
    mr_enclave: String,
    expiration_time_ms: u64,
) -> Result<Response, ContractError> {
    let mut queue = load_queue(&deps, queue_id)?;
    ensure_queue_authority(&queue, &info)?;

    let mut oracle = ORACLES
        .may_load(deps.storage, oracle_id)?
        .ok_or(ContractError::OracleNotFound { oracle_id })?;
    if oracle.queue_id != queue_id {
        return Err(ContractError::QueueMismatch {
            oracle_id,
            expected: queue_id,
            got: oracle.queue_id,
        });
    }

    let secp256k1_key = decode_hex("secp256k1_key", &secp256k1_key)?;
    check_secp256k1_key(&secp256k1_key)?;
    let mr_enclave = decode_hex("mr_enclave", &mr_enclave)?;
    check_mr_enclave(&mr_enclave)?;

    let now = now_ms(&env);
    if expiration_time_ms <= now {
        return Err(ContractError::ExpirationInPast {
            expiration_time_ms,
            now_ms: now,
        });
    }

    oracle.secp256k1_key = secp256k1_key.clone();
    oracle.mr_enclave = mr_enclave.clone();
    oracle.expiration_time_ms = expiration_time_ms;
    oracle.valid_attestations.push(Attestation {
        secp256k1_key,
        mr_enclave,
        expiration_time_ms,
        attested_at_ms: now,
    });
    ORACLES.save(deps.storage, oracle_id, &oracle)?;

    // oracle_key is preserved across overrides
    QUEUE_MEMBERS.save(deps.storage, (queue_id, oracle_id), &oracle.oracle_key)?;

    queue.last_queue_override_ms = now;
    QUEUES.save(deps.storage, queue_id, &queue)?;

    Ok(Response::new()
        .add_attribute("action", "queue_override_oracle")
        .add_attribute("queue_id", queue_id.to_string())
        .add_attribute("oracle_id", oracle_id.to_string())
        .add_event(
            Event::new("pulse_oracle_overridden")
                .add_attribute("queue_id", queue_id.to_string())
                .add_attribute("oracle_id", oracle_id.to_string())
                .add_attribute("expiration_time_ms", expiration_time_ms.to_string()),
        ))
}

/// Create a fresh oracle bound to a queue: zero expiry, empty attestation
/// list, not yet a queue member. Unusable until overridden.
pub fn oracle_init(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    queue_id: u64,
    oracle_key: String,
) -> Result<Response, ContractError> {
    load_queue(&deps, queue_id)?;

    let oracle_key = decode_hex("oracle_key", &oracle_key)?;
    check_oracle_key(&oracle_key)?;

    let id = NEXT_ORACLE_ID.load(deps.storage)?;
    NEXT_ORACLE_ID.save(deps.storage, &(id + 1))?;

    let oracle = Oracle {
        id,
        queue_id,
        oracle_key,
        secp256k1_key: vec![0u8; 64],
        mr_enclave: vec![0u8; 32],
        expiration_time_ms: 0,
        valid_attestations: vec![],
    };
    ORACLES.save(deps.storage, id, &oracle)?;

    Ok(Response::new()
        .add_attribute("action", "oracle_init")
        .add_attribute("oracle_id", id.to_string())
        .add_attribute("queue_id", queue_id.to_string()))
}

/// Create a quote verifier owned by the sender.
pub fn create_verifier(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    queue_id: u64,
) -> Result<Response, ContractError> {
    load_queue(&deps, queue_id)?;

    let id = NEXT_VERIFIER_ID.load(deps.storage)?;
    NEXT_VERIFIER_ID.save(deps.storage, &(id + 1))?;

    let verifier = VerifierInfo {
        id,
        queue_id,
        owner: info.sender.clone(),
    };
    VERIFIERS.save(deps.storage, id, &verifier)?;

    Ok(Response::new()
        .add_attribute("action", "create_verifier")
        .add_attribute("verifier_id", id.to_string())
        .add_attribute("owner", info.sender.to_string()))
}

/// Delete a verifier and its quotes. Owner only.
pub fn delete_verifier(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    verifier_id: u64,
) -> Result<Response, ContractError> {
    let verifier = VERIFIERS
        .may_load(deps.storage, verifier_id)?
        .ok_or(ContractError::VerifierNotFound { verifier_id })?;
    if info.sender != verifier.owner {
        return Err(ContractError::InvalidAuthority {
            reason: "only the verifier owner can delete it".to_string(),
        });
    }

    let feed_ids: Vec<Vec<u8>> = VERIFIER_QUOTES
        .prefix(verifier_id)
        .keys(deps.storage, None, None, Order::Ascending)
        .collect::<StdResult<_>>()?;
    for feed_id in &feed_ids {
        VERIFIER_QUOTES.remove(deps.storage, (verifier_id, feed_id.as_slice()));
    }
    VERIFIERS.remove(deps.storage, verifier_id);

    Ok(Response::new()
        .add_attribute("action", "delete_verifier")
        .add_attribute("verifier_id", verifier_id.to_string())
        .add_attribute("quotes_removed", feed_ids.len().to_string()))
}

/// Ordered committee entry: the stored key the recovered one must match.
struct OracleData {
    oracle_id: u64,
    secp256k1_key: Vec<u8>,
}

/// Verify a committee submission and admit the surviving quotes.
///
/// Signature recovery failures are evidentiary: each emits a
/// `pulse_signature_invalid` event and drops that oracle from the valid
/// set. A feed whose `min_oracle_samples` exceeds the valid set is dropped
/// silently, as is any future-dated quote.
pub fn submit_quotes(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    params: SubmitQuotesParams,
) -> Result<Response, ContractError> {
    let SubmitQuotesParams {
        verifier_id,
        queue_id,
        feeds,
        signatures,
        slot,
        timestamp_seconds,
        oracle_ids,
    } = params;

    let verifier = VERIFIERS
        .may_load(deps.storage, verifier_id)?
        .ok_or(ContractError::VerifierNotFound { verifier_id })?;
    if info.sender != verifier.owner {
        return Err(ContractError::InvalidAuthority {
            reason: "only the verifier owner can submit quotes".to_string(),
        });
    }
    if queue_id != verifier.queue_id {
        return Err(ContractError::InvalidQueue {
            expected: verifier.queue_id,
            got: queue_id,
        });
    }
    let queue = load_queue(&deps, queue_id)?;

    if oracle_ids.is_empty() || oracle_ids.len() > MAX_COMMITTEE {
        return Err(ContractError::CommitteeSize {
            got: oracle_ids.len(),
            max: MAX_COMMITTEE,
        });
    }
    if signatures.len() != oracle_ids.len() {
        return Err(ContractError::InvalidLength {
            expected: oracle_ids.len(),
            got: signatures.len(),
        });
    }
    if feeds.is_empty() {
        return Err(ContractError::InvalidLength {
            expected: 1,
            got: 0,
        });
    }

    let now = now_ms(&env);

    // assemble the ordered committee
    let mut committee = Vec::with_capacity(oracle_ids.len());
    for oracle_id in &oracle_ids {
        let oracle = ORACLES
            .may_load(deps.storage, *oracle_id)?
            .ok_or(ContractError::OracleNotFound {
                oracle_id: *oracle_id,
            })?;
        if oracle.queue_id != queue.id {
            return Err(ContractError::QueueMismatch {
                oracle_id: *oracle_id,
                expected: queue.id,
                got: oracle.queue_id,
            });
        }
        if !QUEUE_MEMBERS.has(deps.storage, (queue.id, oracle.id)) {
            return Err(ContractError::OracleInvalid {
                oracle_id: *oracle_id,
            });
        }
        if oracle.expiration_time_ms <= now {
            return Err(ContractError::OracleInvalid {
                oracle_id: *oracle_id,
            });
        }
        committee.push(OracleData {
            oracle_id: oracle.id,
            secp256k1_key: oracle.secp256k1_key,
        });
    }

    let feeds = decode_feeds(&feeds)?;
    let digest = consensus_digest(slot, timestamp_seconds, &feeds)?;

    // pairwise recovery at matching indices; order is load-bearing
    let mut valid_oracles: Vec<u64> = Vec::with_capacity(committee.len());
    let mut events: Vec<Event> = Vec::new();
    for (oracle, sig_hex) in committee.iter().zip(signatures.iter()) {
        let signature = decode_hex("signatures", sig_hex)?;
        let matched = match recover_pubkey(&digest, &signature) {
            Ok(recovered) => recovered[..] == oracle.secp256k1_key[..],
            Err(_) => false,
        };
        if matched {
            valid_oracles.push(oracle.oracle_id);
        } else {
            events.push(
                Event::new("pulse_signature_invalid")
                    .add_attribute("signature", sig_hex.clone())
                    .add_attribute("oracle_id", oracle.oracle_id.to_string()),
            );
        }
    }

    let timestamp_ms = timestamp_seconds.saturating_mul(1000);
    let oracles_attr = valid_oracles
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");

    let mut produced = 0usize;
    let mut admitted = 0usize;
    for feed in &feeds {
        if usize::from(feed.min_oracle_samples) > valid_oracles.len() {
            continue;
        }
        produced += 1;
        events.push(
            Event::new("pulse_quote_verified")
                .add_attribute("timestamp_ms", timestamp_ms.to_string())
                .add_attribute("slot", slot.to_string())
                .add_attribute("feed_id", hex::encode(&feed.feed_id))
                .add_attribute("oracles", oracles_attr.clone())
                .add_attribute("queue_id", queue.id.to_string()),
        );

        let quote = Quote {
            feed_id: feed.feed_id.clone(),
            result: feed.value,
            timestamp_ms,
            slot,
        };
        if admit_quote(deps.storage, verifier_id, &quote, now)? {
            admitted += 1;
        }
    }

    Ok(Response::new()
        .add_attribute("action", "submit_quotes")
        .add_attribute("verifier_id", verifier_id.to_string())
        .add_attribute("valid_oracles", valid_oracles.len().to_string())
        .add_attribute("quotes_produced", produced.to_string())
        .add_attribute("quotes_admitted", admitted.to_string())
        .add_events(events))
}

fn decode_feeds(feeds: &[FeedInput]) -> Result<Vec<FeedSubmission>, ContractError> {
    feeds
        .iter()
        .map(|f| {
            let feed_id = decode_hex("feed_id", &f.feed_id)?;
            let (magnitude, neg) = f.value.unpack();
            Ok(FeedSubmission {
                feed_id,
                // re-normalize: serde does not run the -0 check
                value: Decimal::new(magnitude, neg),
                min_oracle_samples: f.min_oracle_samples,
            })
        })
        .collect()
}

/// Admit one quote under the replacement rule: insert if absent, replace
/// iff (timestamp_ms, slot) is lexicographically greater. Future-dated
/// quotes are dropped without error.
fn admit_quote(
    storage: &mut dyn Storage,
    verifier_id: u64,
    quote: &Quote,
    now_ms: u64,
) -> Result<bool, ContractError> {
    if quote.timestamp_ms > now_ms {
        return Ok(false);
    }
    let key = (verifier_id, quote.feed_id.as_slice());
    let replace = match VERIFIER_QUOTES.may_load(storage, key)? {
        None => true,
        Some(existing) => {
            quote.timestamp_ms > existing.timestamp_ms
                || (quote.timestamp_ms == existing.timestamp_ms && quote.slot > existing.slot)
        }
    };
    if replace {
        VERIFIER_QUOTES.save(storage, key, quote)?;
    }
    Ok(replace)
}

/// Update the deployment config. Contract authority only.
pub fn update_config(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    authority: Option<String>,
    oracle_queue_id: Option<u64>,
    guardian_queue_id: Option<u64>,
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
    if let Some(id) = oracle_queue_id {
        config.oracle_queue_id = Some(id);
    }
    if let Some(id) = guardian_queue_id {
        config.guardian_queue_id = Some(id);
    }
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_config")
        .add_attribute("authority", config.authority.to_string()))
}
