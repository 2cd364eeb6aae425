//! The bound factory query client.
//!
//! A [`FactoryQueryClient`] is one contract address plus the shared
//! connection provider. It carries no other state: every read operation is
//! a pure function of the client and its parameters, which is what makes
//! the selector layer's memoization sound.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use outpost_types::{ContractAddr, ContractState, FactoryQueryMsg, IcaContractState};

use crate::connection::ConnectionProvider;
use crate::error::{ClientError, ClientResult};

/// A query client bound to one outpost factory contract.
///
/// Construction is infallible and touches nothing remote; the shared
/// connection is resolved on the first query and reused afterwards, so
/// connection problems surface where they belong - on the call that needed
/// the connection.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use outpost_client::{ConnectionProvider, FactoryQueryClient};
/// use outpost_types::ContractAddr;
///
/// # async fn example(provider: Arc<ConnectionProvider>) -> outpost_client::ClientResult<()> {
/// let client = FactoryQueryClient::new(provider, ContractAddr::from("wasm1factory"));
///
/// let state = client.contract_state().await?;
/// let outpost = client.user_outpost_address("wasm1user").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FactoryQueryClient {
    provider: Arc<ConnectionProvider>,
    contract: ContractAddr,
}

impl FactoryQueryClient {
    /// Bind a client to the given contract address.
    pub fn new(provider: Arc<ConnectionProvider>, contract: ContractAddr) -> Self {
        Self { provider, contract }
    }

    /// The contract this client is bound to.
    #[must_use]
    pub fn contract(&self) -> &ContractAddr {
        &self.contract
    }

    /// Query the factory's stored configuration.
    pub async fn contract_state(&self) -> ClientResult<ContractState> {
        self.query(FactoryQueryMsg::GetContractState {}).await
    }

    /// Query the ICA bookkeeping recorded for the given ICA ID.
    pub async fn ica_contract_state(&self, ica_id: u64) -> ClientResult<IcaContractState> {
        self.query(FactoryQueryMsg::GetIcaContractState { ica_id })
            .await
    }

    /// Query how many interchain accounts the factory has created.
    pub async fn ica_count(&self) -> ClientResult<u64> {
        self.query(FactoryQueryMsg::GetIcaCount {}).await
    }

    /// Query how many callbacks outposts have delivered to the factory.
    pub async fn callback_count(&self) -> ClientResult<u64> {
        self.query(FactoryQueryMsg::GetCallbackCount {}).await
    }

    /// Query the outpost address owned by the given user address.
    pub async fn user_outpost_address(
        &self,
        user_address: impl Into<String>,
    ) -> ClientResult<String> {
        self.query(FactoryQueryMsg::GetUserOutpostAddress {
            user_address: user_address.into(),
        })
        .await
    }

    /// Send a query and return the raw JSON response.
    ///
    /// The selector layer funnels through this so that memoized values stay
    /// in wire form and decode per accessor.
    pub(crate) async fn query_raw(&self, msg: &FactoryQueryMsg) -> ClientResult<Value> {
        let payload = serde_json::to_value(msg).map_err(|err| ClientError::Encode(err.to_string()))?;
        let connection = self.provider.connection().await?;
        tracing::debug!(
            contract = %self.contract,
            operation = msg.operation(),
            "dispatching smart query"
        );
        connection.query_smart(&self.contract, payload).await
    }

    async fn query<R: DeserializeOwned>(&self, msg: FactoryQueryMsg) -> ClientResult<R> {
        let raw = self.query_raw(&msg).await?;
        serde_json::from_value(raw).map_err(|err| ClientError::Decode(err.to_string()))
    }
}
