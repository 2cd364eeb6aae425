//! Client error types.

use outpost_types::ContractAddr;
use thiserror::Error;

/// A specialized `Result` type for client operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Represents errors that can occur while resolving a contract query.
///
/// The type is `Clone` because a single failure may be shared by every
/// request that coalesced onto the same in-flight call.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum ClientError {
    /// The shared connection could not be established.
    ///
    /// Every caller waiting on the connection observes this error, and so
    /// does every later caller until an initialization attempt succeeds.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The contract rejected the query or the transport failed mid-call.
    #[error("Query rejected by {contract}: {detail}")]
    Query {
        /// The contract the query was addressed to.
        contract: ContractAddr,
        /// What the remote side reported.
        detail: String,
    },

    /// Failed to serialize a query message.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Failed to deserialize a query response.
    #[error("Decoding failed: {0}")]
    Decode(String),

    /// An unexpected internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Create a connection error.
    pub fn connection(detail: impl Into<String>) -> Self {
        Self::Connection(detail.into())
    }

    /// Create a query-rejection error for the given contract.
    pub fn query(contract: ContractAddr, detail: impl Into<String>) -> Self {
        Self::Query {
            contract,
            detail: detail.into(),
        }
    }

    /// `true` if the error originated in connection establishment.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}
