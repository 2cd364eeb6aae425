//! # Outpost Client
//!
//! Memoized query selectors over a shared outpost contract connection.
//!
//! This crate is the read path of the outpost SDK. It layers three pieces
//! over an injected chain connection:
//!
//! - [`ConnectionProvider`]: lazily initializes the shared
//!   [`ContractQuerier`] handle, exactly once on success
//! - [`FactoryQueryClient`]: a client bound to one contract address, with
//!   one typed async method per read operation
//! - [`FactorySelectors`]: accessors memoized by (address, operation,
//!   parameters), with single-flight coalescing of concurrent identical
//!   requests and change notifications for reactive consumers
//!
//! ## Guarantees
//!
//! - A bound client is constructed at most once per address per selector
//!   set, and lookups are reference-stable
//! - A given (address, operation, parameters) key performs its remote call
//!   at most once while memoized; concurrent requests share one in-flight
//!   call and its outcome
//! - Failures propagate to every waiter and are never memoized, so the next
//!   identical request retries
//! - An initiated remote call runs to completion; dropping waiters does not
//!   cancel it
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use serde_json::{json, Value};
//! use outpost_client::{ClientResult, ConnectionProvider, ContractQuerier, FactorySelectors};
//! use outpost_types::ContractAddr;
//!
//! #[derive(Debug)]
//! struct ChainRpc { /* endpoint, http client, ... */ }
//!
//! #[async_trait]
//! impl ContractQuerier for ChainRpc {
//!     async fn query_smart(&self, contract: &ContractAddr, msg: Value) -> ClientResult<Value> {
//!         todo!("dispatch to the chain's smart-query endpoint")
//!     }
//! }
//!
//! # async fn example() -> ClientResult<()> {
//! let provider = Arc::new(ConnectionProvider::new(|| async {
//!     Ok(Arc::new(ChainRpc {}) as Arc<dyn ContractQuerier>)
//! }));
//! let selectors = FactorySelectors::new(provider);
//!
//! let factory = ContractAddr::from("wasm1factory");
//! let outpost = selectors.user_outpost_address(&factory, "wasm1user").await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod selectors;

// Re-export the main types at the crate root
pub use client::FactoryQueryClient;
pub use config::SelectorConfig;
pub use connection::{ConnectionProvider, ContractQuerier};
pub use error::{ClientError, ClientResult};
pub use selectors::{FactorySelectors, QueryKey, SelectorEvent};
