use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;

use wrb_core::{
    config::DEFAULT_COINGECKO_API_URL,
    domain::{AssetId, Price},
    errors::Error,
    ports::PriceSource,
    Result,
};

const PROVIDER: &str = "coingecko";
const VS_CURRENCY: &str = "usd";

/// CoinGecko `simple/price` client.
#[derive(Clone, Debug)]
pub struct CoinGeckoClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new(DEFAULT_COINGECKO_API_URL)
    }
}

impl CoinGeckoClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn fetch_price(&self, asset: &AssetId) -> Result<Price> {
        tracing::debug!(asset = %asset, "fetching coingecko price");
        let resp = self
            .http
            .get(format!("{}/simple/price", self.base_url))
            .query(&[("ids", asset.as_str()), ("vs_currencies", VS_CURRENCY)])
            .send()
            .await
            .map_err(|e| Error::lookup(PROVIDER, format!("request error: {e}")))?;

        if !resp.status().is_success() {
            return Err(Error::lookup(
                PROVIDER,
                format!("failed to get data from CoinGecko: HTTP {}", resp.status()),
            ));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| Error::lookup(PROVIDER, format!("invalid json: {e}")))?;

        parse_price(&body, asset)
    }
}

/// Extract `body[asset]["usd"]` from a `simple/price` response.
pub fn parse_price(body: &Value, asset: &AssetId) -> Result<Price> {
    let quote = body
        .get(asset.as_str())
        .and_then(|q| q.get(VS_CURRENCY))
        .ok_or_else(|| Error::lookup(PROVIDER, format!("no {VS_CURRENCY} quote for {asset}")))?;

    decimal_from_json(quote)
        .map(Price::new)
        .ok_or_else(|| Error::lookup(PROVIDER, format!("unreadable price for {asset}: {quote}")))
}

fn decimal_from_json(v: &Value) -> Option<Decimal> {
    let Value::Number(n) = v else {
        return None;
    };
    let s = n.to_string();
    Decimal::from_str(&s)
        .or_else(|_| Decimal::from_scientific(&s))
        .ok()
}
