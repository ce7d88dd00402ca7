use async_trait::async_trait;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use super::{parse_endpoint, BalanceFetcher, FetchError};
use crate::units::parse_hex_quantity;

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: AddressParam<'a>,
}

#[derive(Debug, Serialize)]
struct AddressParam<'a> {
    address: &'a str,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<String>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Native ICX balance over the ICON JSON-RPC v3 API (`icx_getBalance`)
pub struct IconFetcher {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    next_id: AtomicU64,
}

impl IconFetcher {
    pub fn new(endpoint: &str, client: reqwest::Client) -> Result<Self, FetchError> {
        Ok(Self {
            client,
            endpoint: parse_endpoint(endpoint)?,
            next_id: AtomicU64::new(1),
        })
    }
}

/// `hx` (account) or `cx` (contract) followed by 20 bytes of hex
fn validate_address(address: &str) -> Result<(), FetchError> {
    let invalid = |reason: &str| FetchError::InvalidAddress {
        address: address.to_string(),
        reason: reason.to_string(),
    };

    let body = address
        .strip_prefix("hx")
        .or_else(|| address.strip_prefix("cx"))
        .ok_or_else(|| invalid("expected hx or cx prefix"))?;
    if body.len() != 40 || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid("expected 40 hex digits"));
    }
    Ok(())
}

#[async_trait]
impl BalanceFetcher for IconFetcher {
    async fn fetch_balance(&self, address: &str) -> Result<BigUint, FetchError> {
        let address = address.trim();
        validate_address(address)?;

        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method: "icx_getBalance",
            params: AddressParam { address },
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        // Errors come back as non-2xx with a JSON-RPC error object
        let parsed = serde_json::from_str::<JsonRpcResponse>(&body);
        if let Ok(JsonRpcResponse { error: Some(error), .. }) = &parsed {
            return Err(FetchError::RpcResponse {
                code: error.code,
                message: error.message.clone(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let quantity = parsed
            .map_err(|e| FetchError::Decode(e.to_string()))?
            .result
            .ok_or_else(|| FetchError::Decode("missing result".to_string()))?;

        parse_hex_quantity(&quantity).ok_or(FetchError::InvalidQuantity(quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_format() {
        assert!(validate_address("hx0b047c751658f7ce1b2595da34d57a0e7dad357d").is_ok());
        assert!(validate_address("cx0000000000000000000000000000000000000001").is_ok());
        assert!(validate_address("0x0b047c751658f7ce1b2595da34d57a0e7dad357d").is_err());
        assert!(validate_address("hx0b047c").is_err());
        assert!(validate_address("hxzz047c751658f7ce1b2595da34d57a0e7dad357d").is_err());
    }

    #[test]
    fn request_shape() {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 7,
            method: "icx_getBalance",
            params: AddressParam { address: "hx0b047c751658f7ce1b2595da34d57a0e7dad357d" },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["method"], "icx_getBalance");
        assert_eq!(value["params"]["address"], "hx0b047c751658f7ce1b2595da34d57a0e7dad357d");
        assert_eq!(value["id"], 7);
    }
}
