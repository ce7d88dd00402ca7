use alloy::{
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::client::RpcClient,
    transports::http::{reqwest, Http},
};
use async_trait::async_trait;
use num_bigint::BigUint;
use std::str::FromStr;
use std::time::Duration;

use super::{BalanceFetcher, FetchError};
use crate::units::parse_hex_quantity;

/// Native balance over Ethereum JSON-RPC (`eth_getBalance`)
pub struct EvmFetcher<P> {
    provider: P,
    timeout: Duration,
}

impl<P: Provider> EvmFetcher<P> {
    pub fn new(provider: P, timeout: Duration) -> Self {
        Self { provider, timeout }
    }
}

impl EvmFetcher<DynProvider> {
    /// HTTP provider for `rpc_url`.
    ///
    /// The client, built on alloy's re-exported reqwest, only bounds
    /// connection setup; each balance call is bounded by `timeout`.
    pub fn connect(rpc_url: &str, connect_timeout: Duration, timeout: Duration) -> Result<Self, FetchError> {
        let url = reqwest::Url::parse(rpc_url).map_err(|e| FetchError::InvalidEndpoint {
            url: rpc_url.to_string(),
            reason: e.to_string(),
        })?;
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| FetchError::ClientSetup(e.to_string()))?;
        let transport = Http::with_client(client, url);
        let rpc_client = RpcClient::builder().transport(transport, false);
        let provider = ProviderBuilder::new().connect_client(rpc_client).erased();
        Ok(Self::new(provider, timeout))
    }
}

#[async_trait]
impl<P: Provider> BalanceFetcher for EvmFetcher<P> {
    async fn fetch_balance(&self, address: &str) -> Result<BigUint, FetchError> {
        let account = Address::from_str(address.trim()).map_err(|e| FetchError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })?;

        let request = self
            .provider
            .raw_request::<_, String>("eth_getBalance".into(), (account, "latest"));
        let quantity = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))?
            .map_err(|e| FetchError::Rpc(e.to_string()))?;

        parse_hex_quantity(&quantity).ok_or(FetchError::InvalidQuantity(quantity))
    }
}
