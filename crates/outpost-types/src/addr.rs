//! Contract addressing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The bech32 address of one deployed contract instance.
///
/// The address is opaque to this SDK: it is never parsed, only forwarded to
/// the connection layer and used as a cache-key component. Validation is the
/// chain's job and surfaces as a query error when an address does not exist.
///
/// `ContractAddr` is immutable once constructed, and hashing/equality are
/// structural over the underlying string, which is exactly what keyed
/// memoization needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractAddr(String);

impl ContractAddr {
    /// Create an address from any string-like value.
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// View the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the address, returning the underlying string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for ContractAddr {
    fn from(addr: String) -> Self {
        Self(addr)
    }
}

impl From<&str> for ContractAddr {
    fn from(addr: &str) -> Self {
        Self(addr.to_string())
    }
}

impl fmt::Display for ContractAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContractAddr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
