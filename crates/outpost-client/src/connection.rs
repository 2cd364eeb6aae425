//! The consumed connection seam and the lazy shared handle.
//!
//! Two pieces live here:
//!
//! - [`ContractQuerier`]: the trait the chain connection must implement.
//!   This SDK never opens sockets itself; an RPC client (or a test double)
//!   is supplied from outside.
//! - [`ConnectionProvider`]: owns the shared handle and the async factory
//!   that produces it. The handle is created at most once, on first use,
//!   and every bound client reuses it.
//!
//! The provider is injected into each selector set rather than living in a
//! process-wide global, so its lifecycle is the application context's
//! lifecycle.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::OnceCell;

use outpost_types::ContractAddr;

use crate::error::ClientResult;

/// A connection capable of executing smart queries against contracts.
///
/// One method is enough: the contract address selects the instance, the
/// message value carries the operation and its parameters, and the response
/// is the contract's JSON answer. Implementations must be safe to share
/// across tasks; all client state above this seam is read-only.
#[async_trait]
pub trait ContractQuerier: Send + Sync + fmt::Debug {
    /// Execute a smart query and return the raw JSON response.
    async fn query_smart(&self, contract: &ContractAddr, msg: Value) -> ClientResult<Value>;
}

type ConnectFuture = Pin<Box<dyn Future<Output = ClientResult<Arc<dyn ContractQuerier>>> + Send>>;
type ConnectFn = dyn Fn() -> ConnectFuture + Send + Sync;

/// Lazily initialized, shared access to one [`ContractQuerier`].
///
/// The connect closure runs on the first [`connection`](Self::connection)
/// call; a success is memoized for the lifetime of the provider. A failure
/// is returned to the caller that drove the attempt and to everyone queued
/// behind it, and the next call starts a fresh attempt - so callers keep
/// failing until an initialization succeeds, and recover without any
/// explicit reset once the dependency is healthy again.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use serde_json::Value;
/// use outpost_client::{ClientResult, ConnectionProvider, ContractQuerier};
/// use outpost_types::ContractAddr;
///
/// #[derive(Debug)]
/// struct ChainRpc { /* endpoint, http client, ... */ }
///
/// #[async_trait]
/// impl ContractQuerier for ChainRpc {
///     async fn query_smart(&self, contract: &ContractAddr, msg: Value) -> ClientResult<Value> {
///         todo!("dispatch to the chain's smart-query endpoint")
///     }
/// }
///
/// # async fn example() -> ClientResult<()> {
/// let provider = ConnectionProvider::new(|| async {
///     Ok(Arc::new(ChainRpc {}) as Arc<dyn ContractQuerier>)
/// });
///
/// // First call connects; later calls reuse the handle.
/// let handle = provider.connection().await?;
/// # Ok(())
/// # }
/// ```
pub struct ConnectionProvider {
    connect: Box<ConnectFn>,
    handle: OnceCell<Arc<dyn ContractQuerier>>,
}

impl ConnectionProvider {
    /// Create a provider from an async connect closure.
    pub fn new<F, Fut>(connect: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<Arc<dyn ContractQuerier>>> + Send + 'static,
    {
        Self {
            connect: Box::new(move || -> ConnectFuture { Box::pin(connect()) }),
            handle: OnceCell::new(),
        }
    }

    /// Create a provider around an already-established connection.
    ///
    /// Useful when the application owns the RPC client and merely wants the
    /// selector layer on top; the connect path is never exercised.
    pub fn with_querier(querier: Arc<dyn ContractQuerier>) -> Self {
        Self {
            connect: Box::new(|| -> ConnectFuture {
                Box::pin(async {
                    Err(crate::error::ClientError::connection(
                        "provider was constructed without a connector",
                    ))
                })
            }),
            handle: OnceCell::new_with(Some(querier)),
        }
    }

    /// Get the shared connection, initializing it on first use.
    ///
    /// Concurrent first callers are serialized: exactly one connect attempt
    /// runs at a time, and a successful handle is stored for everyone.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Connection`](crate::ClientError::Connection)
    /// when the connect closure fails; the handle stays unset so a later
    /// call can retry.
    pub async fn connection(&self) -> ClientResult<Arc<dyn ContractQuerier>> {
        let handle = self
            .handle
            .get_or_try_init(|| {
                tracing::debug!("initializing shared contract connection");
                (self.connect)()
            })
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "contract connection initialization failed");
                err
            })?;
        Ok(Arc::clone(handle))
    }

    /// `true` once a connect attempt has succeeded.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.handle.initialized()
    }
}

impl fmt::Debug for ConnectionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProvider")
            .field("connected", &self.handle.initialized())
            .finish_non_exhaustive()
    }
}
