//! # Factory Messages
//!
//! Query messages and responses for the outpost factory contract.
//!
//! The factory instantiates one storage outpost per user and keeps the
//! bookkeeping this module's responses expose: its own configuration, the
//! per-outpost interchain account state, and the user-to-outpost address map.

use serde::{Deserialize, Serialize};

/// The read operations the factory contract answers.
///
/// One variant per operation; the variant name and its named parameters are
/// the wire form (`{"get_ica_count":{}}`). Equality and hashing cover the
/// operation *and* its parameters, so a value of this type doubles as the
/// operation half of a memoization key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum FactoryQueryMsg {
    /// Returns the factory's own [`ContractState`].
    GetContractState {},
    /// Returns the [`IcaContractState`] recorded for the given ICA ID.
    GetIcaContractState {
        /// Sequence number assigned to the outpost when it was instantiated.
        ica_id: u64,
    },
    /// Returns the number of interchain accounts the factory has created.
    GetIcaCount {},
    /// Returns the number of callbacks outposts have delivered to the factory.
    GetCallbackCount {},
    /// Returns the outpost address owned by the given user address.
    GetUserOutpostAddress {
        /// The owner whose outpost is being looked up.
        user_address: String,
    },
}

impl FactoryQueryMsg {
    /// The wire name of the operation, without its parameters.
    ///
    /// Used for logging and event labels; the full message (operation plus
    /// parameters) is what cache keys compare.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::GetContractState {} => "get_contract_state",
            Self::GetIcaContractState { .. } => "get_ica_contract_state",
            Self::GetIcaCount {} => "get_ica_count",
            Self::GetCallbackCount {} => "get_callback_count",
            Self::GetUserOutpostAddress { .. } => "get_user_outpost_address",
        }
    }
}

/// The factory contract's stored configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractState {
    /// The code ID the factory instantiates new storage outposts from.
    pub storage_outpost_code_id: u64,
}

/// Interchain-account bookkeeping for one instantiated outpost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IcaContractState {
    /// Address of the outpost contract this record belongs to.
    pub contract_addr: String,
    /// Channel/account state, present once the ICA handshake completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ica_state: Option<IcaState>,
}

/// The established interchain account behind an outpost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IcaState {
    /// Sequence number of the account within the factory.
    pub ica_id: u64,
    /// The account's address on the host chain.
    pub ica_addr: String,
    /// The IBC channel the account communicates over.
    pub channel_id: String,
}
