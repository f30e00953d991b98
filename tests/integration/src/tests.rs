//! Integration tests for the Pulse oracle core.
//!
//! These tests exercise the contract entry points directly using
//! `cosmwasm_std::testing` mocks. Each contract is tested via its
//! `instantiate` / `execute` / `query` entry points.
//!
//! For cross-contract interactions (the aggregator querying the registry
//! for queue and oracle records), we mock the querier using
//! `MockQuerier::update_wasm` — fed with the *real* registry contract's
//! query responses, so the aggregator's mirror types are checked against
//! the actual serialization.
//!
//! Run:
//! ```bash
//! cargo test -p pulse-integration-tests
//! ```

use cosmwasm_std::testing::{message_info, mock_dependencies, mock_env, MockApi, MockQuerier};
use cosmwasm_std::{
    from_json, Coin, ContractResult, MemoryStorage, OwnedDeps, SystemError, SystemResult, Uint128,
    WasmQuery,
};
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use pulse_common::{consensus_digest, update_digest, Decimal, FeedSubmission, Quote};

type TestDeps = OwnedDeps<MemoryStorage, MockApi, MockQuerier>;

// ─── Constants ───

const QUEUE_KEY: [u8; 32] = [0x86; 32];
const FEED_A: [u8; 32] = [0x01; 32];
const FEED_B: [u8; 32] = [0x02; 32];
const ORACLE_SK_1: [u8; 32] = [7u8; 32];
const ORACLE_SK_2: [u8; 32] = [9u8; 32];
const FEE: u128 = 100;
const MAX_VARIANCE: u64 = 5_000_000_000;

// ─── Signing helpers ───

fn pubkey_hex(sk_bytes: [u8; 32]) -> String {
    let sk = SigningKey::from_slice(&sk_bytes).unwrap();
    let point = sk.verifying_key().to_encoded_point(false);
    hex::encode(&point.as_bytes()[1..65])
}

fn sign_hex(sk_bytes: [u8; 32], digest: &[u8; 32]) -> String {
    let sk = SigningKey::from_slice(&sk_bytes).unwrap();
    let (sig, recid) = sk.sign_prehash_recoverable(digest).unwrap();
    let mut sig65 = [0u8; 65];
    sig65[..64].copy_from_slice(&sig.to_bytes());
    sig65[64] = recid.to_byte();
    hex::encode(sig65)
}

fn now_ms() -> u64 {
    mock_env().block.time.nanos() / 1_000_000
}

fn past_ts() -> u64 {
    mock_env().block.time.seconds() - 60
}

// ─── Registry helpers ───

fn setup_registry(deps: &mut TestDeps) {
    let admin = deps.api.addr_make("admin");
    let msg = pulse_oracle::msg::InstantiateMsg { authority: None };
    let info = message_info(&admin, &[]);
    pulse_oracle::contract::instantiate(deps.as_mut(), mock_env(), info, msg).unwrap();
}

fn create_queue(deps: &mut TestDeps) -> u64 {
    let authority = deps.api.addr_make("queue_authority");
    let fee_recipient = deps.api.addr_make("fee_recipient");
    let msg = pulse_oracle::msg::ExecuteMsg::CreateQueue(pulse_oracle::msg::CreateQueueParams {
        queue_key: hex::encode(QUEUE_KEY),
        name: "mainnet-queue".to_string(),
        authority: None,
        fee: Uint128::new(FEE),
        fee_recipient: fee_recipient.to_string(),
        min_attestations: 1,
        oracle_validity_length_ms: 7 * 24 * 3_600_000,
        guardian_queue_id: None,
        is_guardian: false,
        fee_denoms: vec!["untrn".to_string()],
    });
    let info = message_info(&authority, &[]);
    let res = pulse_oracle::contract::execute(deps.as_mut(), mock_env(), info, msg).unwrap();
    attr(&res.attributes, "queue_id").parse().unwrap()
}

fn add_oracle(deps: &mut TestDeps, queue_id: u64, sk_bytes: [u8; 32]) -> u64 {
    let anyone = deps.api.addr_make("anyone");
    let msg = pulse_oracle::msg::ExecuteMsg::OracleInit {
        queue_id,
        oracle_key: hex::encode([0xAB; 32]),
    };
    let info = message_info(&anyone, &[]);
    let res = pulse_oracle::contract::execute(deps.as_mut(), mock_env(), info, msg).unwrap();
    let oracle_id: u64 = attr(&res.attributes, "oracle_id").parse().unwrap();

    let authority = deps.api.addr_make("queue_authority");
    let msg = pulse_oracle::msg::ExecuteMsg::QueueOverrideOracle {
        queue_id,
        oracle_id,
        secp256k1_key: pubkey_hex(sk_bytes),
        mr_enclave: hex::encode([0xEE; 32]),
        expiration_time_ms: now_ms() + 3_600_000,
    };
    let info = message_info(&authority, &[]);
    pulse_oracle::contract::execute(deps.as_mut(), mock_env(), info, msg).unwrap();
    oracle_id
}

fn attr(attributes: &[cosmwasm_std::Attribute], key: &str) -> String {
    attributes
        .iter()
        .find(|a| a.key == key)
        .unwrap_or_else(|| panic!("missing attribute {key}"))
        .value
        .clone()
}

fn feed_input(
    feed_id: [u8; 32],
    value: Decimal,
    min_oracle_samples: u8,
) -> pulse_oracle::msg::FeedInput {
    pulse_oracle::msg::FeedInput {
        feed_id: hex::encode(feed_id),
        value,
        min_oracle_samples,
    }
}

fn committee_digest(
    slot: u64,
    timestamp_seconds: u64,
    feeds: &[pulse_oracle::msg::FeedInput],
) -> [u8; 32] {
    let submissions: Vec<FeedSubmission> = feeds
        .iter()
        .map(|f| FeedSubmission {
            feed_id: hex::decode(&f.feed_id).unwrap(),
            value: f.value,
            min_oracle_samples: f.min_oracle_samples,
        })
        .collect();
    consensus_digest(slot, timestamp_seconds, &submissions).unwrap()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_quote_flow_end_to_end() {
    // Queue + two attested oracles + verifier, a committee submission,
    // and the replacement rule across a second submission.

    let mut deps = mock_dependencies();
    setup_registry(&mut deps);
    let queue_id = create_queue(&mut deps);
    let oracle_1 = add_oracle(&mut deps, queue_id, ORACLE_SK_1);
    let oracle_2 = add_oracle(&mut deps, queue_id, ORACLE_SK_2);

    let consumer = deps.api.addr_make("consumer");
    let info = message_info(&consumer, &[]);
    let res = pulse_oracle::contract::execute(
        deps.as_mut(),
        mock_env(),
        info,
        pulse_oracle::msg::ExecuteMsg::CreateVerifier { queue_id },
    )
    .unwrap();
    let verifier_id: u64 = attr(&res.attributes, "verifier_id").parse().unwrap();

    // 1. Committee of two over two feeds; feed B needs both oracles
    let ts = past_ts();
    let value_a = Decimal::new(66_681_990_000_000_000_000_000u128, false);
    let value_b = Decimal::new(12345, true);
    let feeds = vec![
        feed_input(FEED_A, value_a, 1),
        feed_input(FEED_B, value_b, 2),
    ];
    let digest = committee_digest(1234567890, ts, &feeds);

    let info = message_info(&consumer, &[]);
    let res = pulse_oracle::contract::execute(
        deps.as_mut(),
        mock_env(),
        info,
        pulse_oracle::msg::ExecuteMsg::SubmitQuotes(pulse_oracle::msg::SubmitQuotesParams {
            verifier_id,
            queue_id,
            feeds: feeds.clone(),
            signatures: vec![
                sign_hex(ORACLE_SK_1, &digest),
                sign_hex(ORACLE_SK_2, &digest),
            ],
            slot: 1234567890,
            timestamp_seconds: ts,
            oracle_ids: vec![oracle_1, oracle_2],
        }),
    )
    .unwrap();
    assert_eq!(attr(&res.attributes, "valid_oracles"), "2");
    assert_eq!(attr(&res.attributes, "quotes_admitted"), "2");

    // 2. Both quotes are readable
    let res = pulse_oracle::contract::query(
        deps.as_ref(),
        mock_env(),
        pulse_oracle::msg::QueryMsg::Quote {
            verifier_id,
            feed_id: hex::encode(FEED_B),
        },
    )
    .unwrap();
    let quote: Quote = from_json(res).unwrap();
    assert_eq!(quote.result, value_b);
    assert_eq!(quote.timestamp_ms, ts * 1000);
    assert_eq!(quote.slot, 1234567890);

    // 3. An older single-oracle submission cannot displace feed A
    let stale_feeds = vec![feed_input(FEED_A, Decimal::new(1, false), 1)];
    let stale_digest = committee_digest(5, ts - 10, &stale_feeds);
    let info = message_info(&consumer, &[]);
    let res = pulse_oracle::contract::execute(
        deps.as_mut(),
        mock_env(),
        info,
        pulse_oracle::msg::ExecuteMsg::SubmitQuotes(pulse_oracle::msg::SubmitQuotesParams {
            verifier_id,
            queue_id,
            feeds: stale_feeds,
            signatures: vec![sign_hex(ORACLE_SK_1, &stale_digest)],
            slot: 5,
            timestamp_seconds: ts - 10,
            oracle_ids: vec![oracle_1],
        }),
    )
    .unwrap();
    assert_eq!(attr(&res.attributes, "quotes_admitted"), "0");

    let res = pulse_oracle::contract::query(
        deps.as_ref(),
        mock_env(),
        pulse_oracle::msg::QueryMsg::Quote {
            verifier_id,
            feed_id: hex::encode(FEED_A),
        },
    )
    .unwrap();
    let quote: Quote = from_json(res).unwrap();
    assert_eq!(quote.result, value_a);

    eprintln!("test_quote_flow_end_to_end passed");
}

#[test]
fn test_registry_mirror_types_match_serialization() {
    // The aggregator deserializes the registry's Queue/Oracle responses
    // into locally mirrored structs; `#[cw_serde]` rejects unknown fields,
    // so any drift between the two contracts breaks this test.

    let mut deps = mock_dependencies();
    setup_registry(&mut deps);
    let queue_id = create_queue(&mut deps);
    let oracle_id = add_oracle(&mut deps, queue_id, ORACLE_SK_1);

    let res = pulse_oracle::contract::query(
        deps.as_ref(),
        mock_env(),
        pulse_oracle::msg::QueryMsg::Queue { queue_id },
    )
    .unwrap();
    let queue: pulse_aggregator::state::QueueResponse = from_json(res).unwrap();
    assert_eq!(queue.id, queue_id);
    assert_eq!(queue.queue_key, QUEUE_KEY.to_vec());
    assert_eq!(queue.fee, Uint128::new(FEE));

    let res = pulse_oracle::contract::query(
        deps.as_ref(),
        mock_env(),
        pulse_oracle::msg::QueryMsg::Oracle { oracle_id },
    )
    .unwrap();
    let oracle: pulse_aggregator::state::OracleResponse = from_json(res).unwrap();
    assert_eq!(oracle.id, oracle_id);
    assert_eq!(hex::encode(&oracle.secp256k1_key), pubkey_hex(ORACLE_SK_1));

    eprintln!("test_registry_mirror_types_match_serialization passed");
}

#[test]
fn test_aggregator_flow_against_real_registry_responses() {
    // ── Step 1: build real registry state and capture its query responses ──
    let mut registry_deps = mock_dependencies();
    setup_registry(&mut registry_deps);
    let queue_id = create_queue(&mut registry_deps);
    let oracle_id = add_oracle(&mut registry_deps, queue_id, ORACLE_SK_1);

    let queue_binary = pulse_oracle::contract::query(
        registry_deps.as_ref(),
        mock_env(),
        pulse_oracle::msg::QueryMsg::Queue { queue_id },
    )
    .unwrap();
    let oracle_binary = pulse_oracle::contract::query(
        registry_deps.as_ref(),
        mock_env(),
        pulse_oracle::msg::QueryMsg::Oracle { oracle_id },
    )
    .unwrap();

    // ── Step 2: aggregator with a querier answering from those responses ──
    let mut agg_deps = mock_dependencies();
    agg_deps.querier.update_wasm(move |query| match query {
        WasmQuery::Smart { msg, .. } => {
            match from_json::<pulse_aggregator::msg::RegistryQueryMsg>(msg) {
                Ok(pulse_aggregator::msg::RegistryQueryMsg::Queue { .. }) => {
                    SystemResult::Ok(ContractResult::Ok(queue_binary.clone()))
                }
                Ok(pulse_aggregator::msg::RegistryQueryMsg::Oracle { .. }) => {
                    SystemResult::Ok(ContractResult::Ok(oracle_binary.clone()))
                }
                Err(_) => SystemResult::Err(SystemError::InvalidRequest {
                    error: "unknown query".to_string(),
                    request: Default::default(),
                }),
            }
        }
        _ => SystemResult::Err(SystemError::InvalidRequest {
            error: "only smart queries supported".to_string(),
            request: Default::default(),
        }),
    });

    let admin = agg_deps.api.addr_make("admin");
    let registry = agg_deps.api.addr_make("registry");
    let info = message_info(&admin, &[]);
    pulse_aggregator::contract::instantiate(
        agg_deps.as_mut(),
        mock_env(),
        info,
        pulse_aggregator::msg::InstantiateMsg {
            registry: registry.to_string(),
            authority: None,
        },
    )
    .unwrap();

    let feed_authority = agg_deps.api.addr_make("feed_authority");
    let info = message_info(&feed_authority, &[]);
    let res = pulse_aggregator::contract::execute(
        agg_deps.as_mut(),
        mock_env(),
        info,
        pulse_aggregator::msg::ExecuteMsg::CreateAggregator(
            pulse_aggregator::msg::CreateAggregatorParams {
                queue_id,
                feed_hash: hex::encode(FEED_A),
                name: "btc/usd".to_string(),
                authority: None,
                min_sample_size: 1,
                max_staleness_seconds: 120,
                max_variance: MAX_VARIANCE,
                min_responses: 1,
            },
        ),
    )
    .unwrap();
    let aggregator_id: u64 = attr(&res.attributes, "aggregator_id").parse().unwrap();

    // ── Step 3: signed update flows through verification into the window ──
    let ts = past_ts();
    let value = Decimal::new(66_681_990_000_000_000_000_000u128, false);
    let digest = update_digest(
        &QUEUE_KEY,
        &FEED_A,
        &value,
        &[0u8; 32],
        MAX_VARIANCE,
        1,
        ts,
    )
    .unwrap();

    let payer = agg_deps.api.addr_make("payer");
    let info = message_info(&payer, &[Coin::new(FEE, "untrn")]);
    let res = pulse_aggregator::contract::execute(
        agg_deps.as_mut(),
        mock_env(),
        info,
        pulse_aggregator::msg::ExecuteMsg::SubmitResult(
            pulse_aggregator::msg::SubmitResultParams {
                aggregator_id,
                value,
                timestamp_seconds: ts,
                oracle_id,
                signature: sign_hex(ORACLE_SK_1, &digest),
            },
        ),
    )
    .unwrap();
    // fee forwarded to the queue's recipient
    assert_eq!(res.messages.len(), 1);

    let query_res = pulse_aggregator::contract::query(
        agg_deps.as_ref(),
        mock_env(),
        pulse_aggregator::msg::QueryMsg::CurrentResult { aggregator_id },
    )
    .unwrap();
    let current: pulse_aggregator::msg::CurrentResultResponse = from_json(query_res).unwrap();
    assert_eq!(current.populated, 1);
    let summary = current.result.unwrap();
    assert_eq!(summary.result, value);
    assert_eq!(summary.min_timestamp_ms, ts * 1000);

    // ── Step 4: a signature from a different key is rejected outright ──
    let info = message_info(&payer, &[Coin::new(FEE, "untrn")]);
    let err = pulse_aggregator::contract::execute(
        agg_deps.as_mut(),
        mock_env(),
        info,
        pulse_aggregator::msg::ExecuteMsg::SubmitResult(
            pulse_aggregator::msg::SubmitResultParams {
                aggregator_id,
                value,
                timestamp_seconds: ts,
                oracle_id,
                signature: sign_hex(ORACLE_SK_2, &digest),
            },
        ),
    )
    .unwrap_err();
    assert!(
        format!("{err:?}").contains("SignatureMismatch"),
        "expected signature mismatch, got: {err:?}"
    );

    eprintln!("test_aggregator_flow_against_real_registry_responses passed");
}
