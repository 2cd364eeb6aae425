//! Selector-layer behavior: reference-stable client memoization, keyed
//! result memoization, request coalescing, failure policy, and change
//! notifications. All remote traffic goes through a scripted querier that
//! counts calls per (contract, payload) pair.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio::sync::broadcast::error::TryRecvError;

use outpost_client::{
    ClientError, ClientResult, ConnectionProvider, ContractQuerier, FactorySelectors,
    SelectorEvent,
};
use outpost_types::{ContractAddr, ContractState, FactoryQueryMsg};

#[derive(Debug)]
enum Scripted {
    Value(Value),
    Failure(String),
    FailOnceThen(Value),
}

/// Test double for the chain connection. Responses are scripted per
/// (contract, payload) pair and every call is counted under the same key.
#[derive(Debug, Default)]
struct MockQuerier {
    latency: Duration,
    responses: HashMap<(String, String), Scripted>,
    calls: Mutex<HashMap<(String, String), usize>>,
}

impl MockQuerier {
    fn new() -> Self {
        Self::default()
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn respond(mut self, contract: &str, msg: Value, response: Value) -> Self {
        self.responses
            .insert((contract.to_string(), msg.to_string()), Scripted::Value(response));
        self
    }

    fn fail(mut self, contract: &str, msg: Value, detail: &str) -> Self {
        self.responses.insert(
            (contract.to_string(), msg.to_string()),
            Scripted::Failure(detail.to_string()),
        );
        self
    }

    fn fail_once_then(mut self, contract: &str, msg: Value, response: Value) -> Self {
        self.responses.insert(
            (contract.to_string(), msg.to_string()),
            Scripted::FailOnceThen(response),
        );
        self
    }

    fn calls(&self, contract: &str, msg: &Value) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&(contract.to_string(), msg.to_string()))
            .copied()
            .unwrap_or(0)
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl ContractQuerier for MockQuerier {
    async fn query_smart(&self, contract: &ContractAddr, msg: Value) -> ClientResult<Value> {
        let key = (contract.as_str().to_string(), msg.to_string());
        let count = {
            let mut calls = self.calls.lock().unwrap();
            let entry = calls.entry(key.clone()).or_insert(0);
            *entry += 1;
            *entry
        };

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match self.responses.get(&key) {
            Some(Scripted::Value(value)) => Ok(value.clone()),
            Some(Scripted::Failure(detail)) => Err(ClientError::query(contract.clone(), detail.clone())),
            Some(Scripted::FailOnceThen(value)) => {
                if count == 1 {
                    Err(ClientError::query(contract.clone(), "transient failure"))
                } else {
                    Ok(value.clone())
                }
            }
            None => Err(ClientError::query(
                contract.clone(),
                format!("unscripted query: {}", key.1),
            )),
        }
    }
}

fn selectors_over(mock: Arc<MockQuerier>) -> FactorySelectors {
    FactorySelectors::new(Arc::new(ConnectionProvider::with_querier(mock)))
}

fn user_query(user: &str) -> Value {
    json!({"get_user_outpost_address": {"user_address": user}})
}

#[tokio::test]
async fn client_lookup_is_reference_stable_per_address() {
    let selectors = selectors_over(Arc::new(MockQuerier::new()));
    let addr1 = ContractAddr::from("addr1");
    let addr2 = ContractAddr::from("addr2");

    let first = selectors.client(&addr1);
    let second = selectors.client(&addr1);
    let other = selectors.client(&addr2);

    assert!(Arc::ptr_eq(&first, &second));
    assert!(!Arc::ptr_eq(&first, &other));
    assert_eq!(other.contract(), &addr2);
}

#[tokio::test]
async fn memoized_result_skips_the_second_remote_call() {
    let mock = Arc::new(MockQuerier::new().respond("addr1", user_query("user1"), json!("outpost1")));
    let selectors = selectors_over(Arc::clone(&mock));
    let addr = ContractAddr::from("addr1");

    let first = selectors.user_outpost_address(&addr, "user1").await.unwrap();
    let second = selectors.user_outpost_address(&addr, "user1").await.unwrap();

    assert_eq!(first, "outpost1");
    assert_eq!(second, "outpost1");
    assert_eq!(mock.calls("addr1", &user_query("user1")), 1);
}

#[tokio::test]
async fn concurrent_identical_requests_coalesce_into_one_call() {
    let mock = Arc::new(
        MockQuerier::new()
            .with_latency(Duration::from_millis(20))
            .respond("addr1", user_query("user1"), json!("outpost1")),
    );
    let selectors = selectors_over(Arc::clone(&mock));
    let addr = ContractAddr::from("addr1");

    let (a, b) = tokio::join!(
        selectors.user_outpost_address(&addr, "user1"),
        selectors.user_outpost_address(&addr, "user1"),
    );

    assert_eq!(a.unwrap(), "outpost1");
    assert_eq!(b.unwrap(), "outpost1");
    assert_eq!(mock.calls("addr1", &user_query("user1")), 1);
}

#[tokio::test]
async fn a_wide_fan_out_still_performs_one_call() {
    let mock = Arc::new(
        MockQuerier::new()
            .with_latency(Duration::from_millis(20))
            .respond("addr1", user_query("user1"), json!("outpost1")),
    );
    let selectors = Arc::new(selectors_over(Arc::clone(&mock)));
    let addr = ContractAddr::from("addr1");

    let requests = (0..16).map(|_| {
        let selectors = Arc::clone(&selectors);
        let addr = addr.clone();
        async move { selectors.user_outpost_address(&addr, "user1").await }
    });
    let results = futures::future::join_all(requests).await;

    for result in results {
        assert_eq!(result.unwrap(), "outpost1");
    }
    assert_eq!(mock.calls("addr1", &user_query("user1")), 1);
}

#[tokio::test]
async fn distinct_parameters_resolve_independently() {
    let mock = Arc::new(
        MockQuerier::new()
            .respond("addr1", user_query("user1"), json!("outpost1"))
            .respond("addr1", user_query("user2"), json!("outpost2")),
    );
    let selectors = selectors_over(Arc::clone(&mock));
    let addr = ContractAddr::from("addr1");

    let first = selectors.user_outpost_address(&addr, "user1").await.unwrap();
    assert_eq!(first, "outpost1");
    // Resolving user1 must not have touched user2's entry.
    assert_eq!(mock.calls("addr1", &user_query("user2")), 0);

    let second = selectors.user_outpost_address(&addr, "user2").await.unwrap();
    assert_eq!(second, "outpost2");
    assert_eq!(mock.calls("addr1", &user_query("user1")), 1);
    assert_eq!(mock.calls("addr1", &user_query("user2")), 1);
}

#[tokio::test]
async fn distinct_contracts_resolve_independently() {
    let mock = Arc::new(
        MockQuerier::new()
            .respond("addr1", json!({"get_ica_count": {}}), json!(3))
            .respond("addr2", json!({"get_ica_count": {}}), json!(9)),
    );
    let selectors = selectors_over(Arc::clone(&mock));

    let a = selectors.ica_count(&ContractAddr::from("addr1")).await.unwrap();
    let b = selectors.ica_count(&ContractAddr::from("addr2")).await.unwrap();

    assert_eq!(a, 3);
    assert_eq!(b, 9);
    assert_eq!(mock.total_calls(), 2);
}

#[tokio::test]
async fn every_operation_memoizes_its_own_key() {
    let mock = Arc::new(
        MockQuerier::new()
            .respond(
                "addr1",
                json!({"get_contract_state": {}}),
                json!({"storage_outpost_code_id": 42}),
            )
            .respond(
                "addr1",
                json!({"get_ica_contract_state": {"ica_id": 7}}),
                json!({
                    "contract_addr": "wasm1outpost",
                    "ica_state": {"ica_id": 7, "ica_addr": "host1abc", "channel_id": "channel-3"}
                }),
            )
            .respond("addr1", json!({"get_ica_count": {}}), json!(8))
            .respond("addr1", json!({"get_callback_count": {}}), json!(5))
            .respond("addr1", user_query("user1"), json!("outpost1")),
    );
    let selectors = selectors_over(Arc::clone(&mock));
    let addr = ContractAddr::from("addr1");

    for _ in 0..2 {
        let state = selectors.contract_state(&addr).await.unwrap();
        assert_eq!(state, ContractState { storage_outpost_code_id: 42 });

        let ica = selectors.ica_contract_state(&addr, 7).await.unwrap();
        assert_eq!(ica.contract_addr, "wasm1outpost");
        assert_eq!(ica.ica_state.as_ref().unwrap().channel_id, "channel-3");

        assert_eq!(selectors.ica_count(&addr).await.unwrap(), 8);
        assert_eq!(selectors.callback_count(&addr).await.unwrap(), 5);
        assert_eq!(
            selectors.user_outpost_address(&addr, "user1").await.unwrap(),
            "outpost1"
        );
    }

    // Second sweep was served entirely from the cache.
    assert_eq!(mock.total_calls(), 5);
}

#[tokio::test]
async fn query_failures_propagate_and_are_not_memoized() {
    let mock = Arc::new(MockQuerier::new().fail("addr1", user_query("bad"), "no outpost for user"));
    let selectors = selectors_over(Arc::clone(&mock));
    let addr = ContractAddr::from("addr1");

    let first = selectors.user_outpost_address(&addr, "bad").await;
    let second = selectors.user_outpost_address(&addr, "bad").await;

    for result in [first, second] {
        match result {
            Err(ClientError::Query { contract, detail }) => {
                assert_eq!(contract, addr);
                assert_eq!(detail, "no outpost for user");
            }
            other => panic!("expected query rejection, got {other:?}"),
        }
    }
    // Each attempt reached the contract: failures do not occupy cache slots.
    assert_eq!(mock.calls("addr1", &user_query("bad")), 2);
}

#[tokio::test]
async fn transient_failure_recovers_on_the_next_request() {
    let mock = Arc::new(MockQuerier::new().fail_once_then(
        "addr1",
        user_query("user1"),
        json!("outpost1"),
    ));
    let selectors = selectors_over(Arc::clone(&mock));
    let addr = ContractAddr::from("addr1");

    assert!(selectors.user_outpost_address(&addr, "user1").await.is_err());

    let recovered = selectors.user_outpost_address(&addr, "user1").await.unwrap();
    assert_eq!(recovered, "outpost1");
    assert_eq!(mock.calls("addr1", &user_query("user1")), 2);

    // The recovered value is memoized like any other success.
    selectors.user_outpost_address(&addr, "user1").await.unwrap();
    assert_eq!(mock.calls("addr1", &user_query("user1")), 2);
}

#[tokio::test]
async fn coalesced_waiters_share_the_same_failure() {
    let mock = Arc::new(
        MockQuerier::new()
            .with_latency(Duration::from_millis(20))
            .fail("addr1", user_query("bad"), "no outpost for user"),
    );
    let selectors = selectors_over(Arc::clone(&mock));
    let addr = ContractAddr::from("addr1");

    let (a, b) = tokio::join!(
        selectors.user_outpost_address(&addr, "bad"),
        selectors.user_outpost_address(&addr, "bad"),
    );

    assert!(a.is_err());
    assert!(b.is_err());
    assert_eq!(mock.calls("addr1", &user_query("bad")), 1);
}

#[tokio::test]
async fn fresh_resolutions_emit_events_and_cache_hits_do_not() {
    let mock = Arc::new(MockQuerier::new().respond("addr1", user_query("user1"), json!("outpost1")));
    let selectors = selectors_over(Arc::clone(&mock));
    let addr = ContractAddr::from("addr1");
    let mut events = selectors.subscribe();

    selectors.user_outpost_address(&addr, "user1").await.unwrap();

    match events.try_recv().unwrap() {
        SelectorEvent::Resolved { key } => {
            assert_eq!(key.contract, addr);
            assert_eq!(
                key.query,
                FactoryQueryMsg::GetUserOutpostAddress {
                    user_address: "user1".to_string()
                }
            );
        }
        other => panic!("unexpected event: {other:?}"),
    }

    selectors.user_outpost_address(&addr, "user1").await.unwrap();
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn failed_resolutions_emit_no_events() {
    let mock = Arc::new(MockQuerier::new().fail("addr1", user_query("bad"), "boom"));
    let selectors = selectors_over(Arc::clone(&mock));
    let addr = ContractAddr::from("addr1");
    let mut events = selectors.subscribe();

    assert!(selectors.user_outpost_address(&addr, "bad").await.is_err());
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn bound_client_calls_bypass_the_cache() {
    let mock = Arc::new(MockQuerier::new().respond("addr1", json!({"get_ica_count": {}}), json!(4)));
    let selectors = selectors_over(Arc::clone(&mock));
    let client = selectors.client(&ContractAddr::from("addr1"));

    assert_eq!(client.ica_count().await.unwrap(), 4);
    assert_eq!(client.ica_count().await.unwrap(), 4);

    // The bound client is the uncached layer; only selectors memoize.
    assert_eq!(mock.calls("addr1", &json!({"get_ica_count": {}})), 2);
}

#[tokio::test]
async fn undecodable_responses_surface_as_decode_errors() {
    let mock = Arc::new(MockQuerier::new().respond(
        "addr1",
        json!({"get_contract_state": {}}),
        json!({"unexpected": true}),
    ));
    let selectors = selectors_over(Arc::clone(&mock));

    let result = selectors.contract_state(&ContractAddr::from("addr1")).await;
    assert!(matches!(result, Err(ClientError::Decode(_))));
}
