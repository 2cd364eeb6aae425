//! # Outpost Types
//!
//! Contract wire types for the outpost selector SDK.
//!
//! This crate provides the shared types used across the workspace:
//!
//! - **Addressing**: [`ContractAddr`] identifies one deployed contract instance
//! - **Query messages**: [`FactoryQueryMsg`], one variant per read operation
//! - **Query responses**: [`ContractState`], [`IcaContractState`], [`IcaState`]
//!
//! All types serialize to the JSON the contract speaks on chain: enum
//! variants are snake_case keys wrapping their named parameters, so a
//! message round-trips byte-compatible with the contract's own schema.
//!
//! ## Quick Start
//!
//! ```rust
//! use outpost_types::{ContractAddr, FactoryQueryMsg};
//!
//! let contract = ContractAddr::from("wasm1factory");
//! let query = FactoryQueryMsg::GetUserOutpostAddress {
//!     user_address: "wasm1user".to_string(),
//! };
//!
//! let wire = serde_json::to_string(&query).unwrap();
//! assert_eq!(
//!     wire,
//!     r#"{"get_user_outpost_address":{"user_address":"wasm1user"}}"#
//! );
//! assert_eq!(contract.as_str(), "wasm1factory");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod addr;
pub mod factory;

// Re-export everything at the crate root for convenience
pub use addr::*;
pub use factory::*;

/// Version of the outpost types crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
