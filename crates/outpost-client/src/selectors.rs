//! Memoized, parameter-keyed query selectors.
//!
//! [`FactorySelectors`] is the surface consumers hold on to. It owns three
//! things:
//!
//! - a registry of bound clients, memoized per contract address
//! - a keyed cache of query outcomes, memoized per (address, operation,
//!   parameters) with single-flight resolution
//! - a broadcast channel announcing fresh resolutions to reactive consumers
//!
//! Concurrent requests for the same key converge on one remote call and
//! share its outcome. Requests for different keys are fully independent.
//! Failures are never memoized: the next identical request issues a fresh
//! remote call, so transient outages heal on their own.

use std::sync::Arc;

use dashmap::DashMap;
use moka::future::Cache;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;

use outpost_types::{ContractAddr, ContractState, FactoryQueryMsg, IcaContractState};

use crate::client::FactoryQueryClient;
use crate::config::SelectorConfig;
use crate::connection::ConnectionProvider;
use crate::error::{ClientError, ClientResult};

/// The cache key of one memoized read.
///
/// Equality is structural over the address and the full query message
/// (operation plus ordered parameters). Keys own their data, so a caller
/// can never mutate a parameter value out from under the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    /// The contract the query is addressed to.
    pub contract: ContractAddr,
    /// The operation and its parameters.
    pub query: FactoryQueryMsg,
}

impl QueryKey {
    /// Create a key from its components.
    pub fn new(contract: ContractAddr, query: FactoryQueryMsg) -> Self {
        Self { contract, query }
    }
}

/// Change notifications emitted by a selector set.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SelectorEvent {
    /// A cache miss completed successfully and its value is now memoized.
    ///
    /// Cache hits do not emit; a reactive layer re-rendering on this event
    /// sees each value change exactly once.
    Resolved {
        /// The key that resolved.
        key: QueryKey,
    },
}

/// Memoized read accessors over outpost factory contracts.
///
/// One selector set serves any number of factory instances: every accessor
/// takes the contract address alongside the operation's parameters, and the
/// cache keys entries by both.
///
/// `FactorySelectors` is `Send + Sync`; share it behind an `Arc` and call
/// it from as many tasks as needed.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use serde_json::{json, Value};
/// use outpost_client::{ClientResult, ConnectionProvider, ContractQuerier, FactorySelectors};
/// use outpost_types::ContractAddr;
///
/// #[derive(Debug)]
/// struct ChainRpc;
///
/// #[async_trait]
/// impl ContractQuerier for ChainRpc {
///     async fn query_smart(&self, _contract: &ContractAddr, _msg: Value) -> ClientResult<Value> {
///         Ok(json!({"storage_outpost_code_id": 1}))
///     }
/// }
///
/// # async fn example() -> ClientResult<()> {
/// let provider = Arc::new(ConnectionProvider::new(|| async {
///     Ok(Arc::new(ChainRpc) as Arc<dyn ContractQuerier>)
/// }));
/// let selectors = FactorySelectors::new(provider);
///
/// let factory = ContractAddr::from("wasm1factory");
/// let state = selectors.contract_state(&factory).await?;
/// let again = selectors.contract_state(&factory).await?; // served from cache
/// assert_eq!(state, again);
/// # Ok(())
/// # }
/// ```
pub struct FactorySelectors {
    provider: Arc<ConnectionProvider>,
    clients: DashMap<ContractAddr, Arc<FactoryQueryClient>>,
    cache: Cache<QueryKey, Value>,
    events: broadcast::Sender<SelectorEvent>,
}

impl FactorySelectors {
    /// Create a selector set with the default configuration.
    pub fn new(provider: Arc<ConnectionProvider>) -> Self {
        Self::with_config(provider, SelectorConfig::default())
    }

    /// Create a selector set with the given configuration.
    pub fn with_config(provider: Arc<ConnectionProvider>, config: SelectorConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(config.max_entries);
        if let Some(ttl) = config.time_to_live {
            builder = builder.time_to_live(ttl);
        }
        let (events, _) = broadcast::channel(config.event_capacity);

        Self {
            provider,
            clients: DashMap::new(),
            cache: builder.build(),
            events,
        }
    }

    /// Get the client bound to the given contract, creating it on first use.
    ///
    /// Memoized per address: repeated calls with an equal address return the
    /// identical `Arc`, so downstream code may rely on pointer identity.
    /// Construction is local and infallible; connection errors surface on
    /// the first query the client actually makes.
    pub fn client(&self, contract: &ContractAddr) -> Arc<FactoryQueryClient> {
        self.clients
            .entry(contract.clone())
            .or_insert_with(|| {
                Arc::new(FactoryQueryClient::new(
                    Arc::clone(&self.provider),
                    contract.clone(),
                ))
            })
            .clone()
    }

    /// Subscribe to change notifications.
    ///
    /// The receiver observes every fresh resolution from the moment of
    /// subscription; a slow consumer that falls behind the channel capacity
    /// sees a lag error rather than blocking resolution.
    pub fn subscribe(&self) -> broadcast::Receiver<SelectorEvent> {
        self.events.subscribe()
    }

    /// Memoized read of the factory's stored configuration.
    pub async fn contract_state(&self, contract: &ContractAddr) -> ClientResult<ContractState> {
        self.resolve(contract, FactoryQueryMsg::GetContractState {})
            .await
    }

    /// Memoized read of the ICA bookkeeping for the given ICA ID.
    pub async fn ica_contract_state(
        &self,
        contract: &ContractAddr,
        ica_id: u64,
    ) -> ClientResult<IcaContractState> {
        self.resolve(contract, FactoryQueryMsg::GetIcaContractState { ica_id })
            .await
    }

    /// Memoized read of the number of interchain accounts created.
    pub async fn ica_count(&self, contract: &ContractAddr) -> ClientResult<u64> {
        self.resolve(contract, FactoryQueryMsg::GetIcaCount {}).await
    }

    /// Memoized read of the number of callbacks delivered to the factory.
    pub async fn callback_count(&self, contract: &ContractAddr) -> ClientResult<u64> {
        self.resolve(contract, FactoryQueryMsg::GetCallbackCount {})
            .await
    }

    /// Memoized read of the outpost address owned by the given user.
    pub async fn user_outpost_address(
        &self,
        contract: &ContractAddr,
        user_address: impl Into<String>,
    ) -> ClientResult<String> {
        self.resolve(
            contract,
            FactoryQueryMsg::GetUserOutpostAddress {
                user_address: user_address.into(),
            },
        )
        .await
    }

    /// Resolve one key through the cache.
    ///
    /// On a miss the remote call runs in a detached task: once initiated it
    /// completes even if every waiter is dropped mid-flight. Concurrent
    /// requests for the same key share the single in-flight call and its
    /// outcome. Errors are returned to all waiters and not memoized.
    async fn resolve<R>(&self, contract: &ContractAddr, query: FactoryQueryMsg) -> ClientResult<R>
    where
        R: DeserializeOwned,
    {
        let key = QueryKey::new(contract.clone(), query);
        let client = self.client(contract);
        let events = self.events.clone();

        let init = {
            let key = key.clone();
            async move {
                let task = tokio::spawn(async move {
                    let value = client.query_raw(&key.query).await?;
                    tracing::debug!(
                        contract = %key.contract,
                        operation = key.query.operation(),
                        "memoizing fresh query result"
                    );
                    let _ = events.send(SelectorEvent::Resolved { key });
                    Ok::<_, ClientError>(value)
                });
                task.await
                    .map_err(|err| ClientError::Internal(err.to_string()))?
            }
        };

        let raw = self
            .cache
            .try_get_with_by_ref(&key, init)
            .await
            .map_err(|shared| (*shared).clone())?;

        serde_json::from_value(raw).map_err(|err| ClientError::Decode(err.to_string()))
    }
}

impl std::fmt::Debug for FactorySelectors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactorySelectors")
            .field("clients", &self.clients.len())
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}
