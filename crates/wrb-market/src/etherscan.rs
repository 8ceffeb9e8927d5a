use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use wrb_core::{
    address::WalletAddress,
    config::DEFAULT_ETHERSCAN_API_URL,
    domain::Balance,
    errors::Error,
    ports::BalanceSource,
    Result,
};

const PROVIDER: &str = "etherscan";
const STATUS_OK: &str = "1";

/// Etherscan `account/balance` client.
#[derive(Clone, Debug)]
pub struct EtherscanClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl EtherscanClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_ETHERSCAN_API_URL)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }
}

/// Envelope shared by every Etherscan endpoint.
#[derive(Debug, Deserialize)]
pub struct EtherscanResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: Value,
}

#[async_trait]
impl BalanceSource for EtherscanClient {
    async fn fetch_balance(&self, address: &WalletAddress) -> Result<Balance> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(Error::lookup(PROVIDER, "ETHERSCAN_API_KEY is not set"));
        };

        tracing::debug!(address = %address, "fetching etherscan balance");
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[
                ("module", "account"),
                ("action", "balance"),
                ("address", address.as_str()),
                ("tag", "latest"),
                ("apikey", api_key),
            ])
            .send()
            .await
            .map_err(|e| Error::lookup(PROVIDER, format!("request error: {e}")))?;

        if !resp.status().is_success() {
            return Err(Error::lookup(
                PROVIDER,
                format!("failed to get data from Etherscan: HTTP {}", resp.status()),
            ));
        }

        let body: EtherscanResponse = resp
            .json()
            .await
            .map_err(|e| Error::lookup(PROVIDER, format!("invalid json: {e}")))?;

        parse_balance(&body)
    }
}

/// Convert a balance response into ether.
///
/// `status != "1"` carries the provider's error in `message` / `result`.
pub fn parse_balance(body: &EtherscanResponse) -> Result<Balance> {
    if body.status != STATUS_OK {
        let detail = match &body.result {
            Value::String(s) if !s.is_empty() => format!("{}: {s}", body.message),
            _ => body.message.clone(),
        };
        return Err(Error::lookup(PROVIDER, format!("Etherscan API error: {detail}")));
    }

    let wei = match &body.result {
        Value::String(s) => s.trim().parse::<u128>().ok(),
        Value::Number(n) => n.as_u64().map(u128::from),
        _ => None,
    }
    .ok_or_else(|| Error::lookup(PROVIDER, format!("unreadable balance: {}", body.result)))?;

    Balance::from_wei(wei)
        .ok_or_else(|| Error::lookup(PROVIDER, format!("balance out of range: {wei}")))
}
