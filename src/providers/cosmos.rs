use async_trait::async_trait;
use num_bigint::BigUint;
use serde::Deserialize;

use super::{parse_endpoint, BalanceFetcher, FetchError};
use crate::units::parse_integer_amount;

/// Upper bound on pages walked for one address
const MAX_PAGES: usize = 100;

#[derive(Debug, Deserialize)]
struct Coin {
    denom: String,
    amount: String,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    next_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BalancesResponse {
    balances: Vec<Coin>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

impl BalancesResponse {
    fn parse(body: &str) -> Result<Self, FetchError> {
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    /// Amount of `denom` on this page, matched case-insensitively
    fn find_denom(&self, denom: &str) -> Option<Result<BigUint, FetchError>> {
        self.balances
            .iter()
            .find(|c| c.denom.eq_ignore_ascii_case(denom))
            .map(|c| {
                parse_integer_amount(&c.amount).ok_or_else(|| FetchError::InvalidQuantity(c.amount.clone()))
            })
    }

    fn next_key(&self) -> Option<&str> {
        self.pagination
            .as_ref()
            .and_then(|p| p.next_key.as_deref())
            .filter(|k| !k.is_empty())
    }
}

/// Bank balance over the Cosmos SDK REST (LCD) API
pub struct CosmosFetcher {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    denom: String,
}

impl CosmosFetcher {
    pub fn new(endpoint: &str, denom: &str, client: reqwest::Client) -> Result<Self, FetchError> {
        let endpoint = parse_endpoint(endpoint)?;
        if endpoint.cannot_be_a_base() {
            return Err(FetchError::InvalidEndpoint {
                url: endpoint.to_string(),
                reason: "not a base url".to_string(),
            });
        }
        Ok(Self {
            client,
            endpoint,
            denom: denom.to_string(),
        })
    }

    /// `{endpoint}/cosmos/bank/v1beta1/balances/{address}` with the address escaped
    fn balances_url(&self, address: &str) -> reqwest::Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["cosmos", "bank", "v1beta1", "balances", address]);
        }
        url
    }

    async fn fetch_page(&self, address: &str, key: Option<&str>) -> Result<BalancesResponse, FetchError> {
        let mut request = self.client.get(self.balances_url(address));
        if let Some(key) = key {
            request = request.query(&[("pagination.key", key)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let body = response.text().await?;
        BalancesResponse::parse(&body)
    }
}

#[async_trait]
impl BalanceFetcher for CosmosFetcher {
    async fn fetch_balance(&self, address: &str) -> Result<BigUint, FetchError> {
        let address = address.trim();
        let mut key: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let page = self.fetch_page(address, key.as_deref()).await?;
            if let Some(amount) = page.find_denom(&self.denom) {
                return amount;
            }
            match page.next_key() {
                Some(next) if key.as_deref() != Some(next) => key = Some(next.to_string()),
                _ => break,
            }
        }

        Err(FetchError::NoBalanceFound {
            denom: self.denom.clone(),
        })
    }
}
