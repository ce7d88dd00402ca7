pub mod cosmos;
pub mod evm;
pub mod icon;

pub use cosmos::CosmosFetcher;
pub use evm::EvmFetcher;
pub use icon::IconFetcher;

use async_trait::async_trait;
use num_bigint::BigUint;
use std::time::Duration;
use thiserror::Error;

use crate::config::{ChainType, NetworkConfig, Settings};

/// Errors raised while setting up a fetcher or reading a balance
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid endpoint {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("failed to build client: {0}")]
    ClientSetup(String),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rpc call failed: {0}")]
    Rpc(String),

    #[error("rpc error {code}: {message}")]
    RpcResponse { code: i64, message: String },

    #[error("unexpected status code: {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("failed to parse balance {0:?}")]
    InvalidQuantity(String),

    #[error("no balance found for {denom}")]
    NoBalanceFound { denom: String },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// Reads the native balance of an address in smallest units
#[async_trait]
pub trait BalanceFetcher: Send + Sync {
    async fn fetch_balance(&self, address: &str) -> Result<BigUint, FetchError>;
}

/// Build the fetcher for a network's chain type
pub fn connect(
    network: &NetworkConfig,
    settings: &Settings,
) -> Result<Box<dyn BalanceFetcher>, FetchError> {
    let fetcher: Box<dyn BalanceFetcher> = match network.chain {
        ChainType::Evm => Box::new(EvmFetcher::connect(
            &network.rpc,
            settings.connect_timeout,
            settings.rpc_timeout,
        )?),
        ChainType::Icon => Box::new(IconFetcher::new(&network.rpc, http_client(settings)?)?),
        ChainType::Cosmos => Box::new(CosmosFetcher::new(
            &network.rpc,
            network.denom(),
            http_client(settings)?,
        )?),
    };

    Ok(fetcher)
}

/// HTTP client for the REST and JSON-RPC fetchers
pub fn http_client(settings: &Settings) -> Result<reqwest::Client, FetchError> {
    let client = reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.rpc_timeout)
        .build()?;
    Ok(client)
}

pub(crate) fn parse_endpoint(url: &str) -> Result<reqwest::Url, FetchError> {
    reqwest::Url::parse(url).map_err(|e| FetchError::InvalidEndpoint {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
