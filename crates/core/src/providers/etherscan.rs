use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use super::http::ensure_success;
use super::traits::ChainExplorer;
use crate::errors::CoreError;
use crate::models::wallet::{Chain, GasPrices, Transaction, TxStatus, WalletBalance};

pub const BASE_URL: &str = "https://api.etherscan.io/v2/api";
const PROVIDER: &str = "Etherscan";
const ETHEREUM_MAINNET: &str = "1";
const WEI_PER_ETH: f64 = 1e18;
const WEI_PER_GWEI: f64 = 1e9;

/// Etherscan API v2 explorer for Ethereum mainnet.
///
/// - **Free tier**: 5 calls/second with a key; keyless calls are throttled harder.
/// - **Endpoints**: `module=account` (`balance`, `txlist`), `module=gastracker` (`gasoracle`)
///
/// Every response is wrapped in `{status, message, result}`; `status == "1"`
/// is success, anything else carries the reason in `result`.
pub struct EtherscanProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl EtherscanProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    async fn call(&self, params: &[(&str, String)]) -> Result<Envelope, CoreError> {
        let mut query: Vec<(&str, String)> = vec![("chainid", ETHEREUM_MAINNET.to_string())];
        query.extend(params.iter().cloned());
        if let Some(key) = &self.api_key {
            query.push(("apikey", key.clone()));
        }

        tracing::debug!(provider = PROVIDER, "calling {:?}", params.first());
        let resp = self.client.get(&self.base_url).query(&query).send().await?;
        let resp = ensure_success(resp, PROVIDER).await?;
        resp.json()
            .await
            .map_err(|e| CoreError::api(PROVIDER, format!("Failed to parse response: {e}")))
    }
}

impl Default for EtherscanProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

// ── Etherscan API response types ────────────────────────────────────

#[derive(Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: String,
    /// A string, an array or an object depending on the action and outcome
    result: serde_json::Value,
}

impl Envelope {
    fn is_ok(&self) -> bool {
        self.status == "1"
    }

    fn failure(&self) -> CoreError {
        let detail = self.result.as_str().unwrap_or(&self.message);
        CoreError::api(PROVIDER, format!("{}: {detail}", self.message))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransaction {
    hash: String,
    from: String,
    #[serde(default)]
    to: String,
    value: String,
    time_stamp: String,
    #[serde(default)]
    is_error: String,
    #[serde(default)]
    gas_used: String,
    #[serde(default)]
    gas_price: String,
}

impl RawTransaction {
    fn into_transaction(self) -> Transaction {
        let timestamp = self
            .time_stamp
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .unwrap_or_default();
        Transaction {
            hash: self.hash,
            from: self.from,
            to: self.to,
            value: parse_f64(&self.value) / WEI_PER_ETH,
            timestamp,
            status: if self.is_error == "0" || self.is_error.is_empty() {
                TxStatus::Success
            } else {
                TxStatus::Failed
            },
            gas_used: self.gas_used.parse().ok(),
            gas_price: self.gas_price.parse::<f64>().ok().map(|wei| wei / WEI_PER_GWEI),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GasOracle {
    safe_gas_price: String,
    propose_gas_price: String,
    fast_gas_price: String,
}

fn parse_f64(raw: &str) -> f64 {
    raw.parse().unwrap_or(0.0)
}

#[async_trait]
impl ChainExplorer for EtherscanProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn supported_chains(&self) -> Vec<Chain> {
        vec![Chain::Ethereum]
    }

    async fn get_balance(&self, address: &str) -> Result<WalletBalance, CoreError> {
        let env = self
            .call(&[
                ("module", "account".into()),
                ("action", "balance".into()),
                ("address", address.to_string()),
                ("tag", "latest".into()),
            ])
            .await?;
        if !env.is_ok() {
            return Err(env.failure());
        }

        let wei = env
            .result
            .as_str()
            .map(parse_f64)
            .ok_or_else(|| CoreError::api(PROVIDER, "Balance is not a string"))?;

        Ok(WalletBalance {
            address: address.to_string(),
            balance: wei / WEI_PER_ETH,
            chain: Chain::Ethereum,
            usd_value: None,
        })
    }

    async fn get_transactions(
        &self,
        address: &str,
        limit: u32,
    ) -> Result<Vec<Transaction>, CoreError> {
        let env = self
            .call(&[
                ("module", "account".into()),
                ("action", "txlist".into()),
                ("address", address.to_string()),
                ("startblock", "0".into()),
                ("endblock", "99999999".into()),
                ("page", "1".into()),
                ("offset", limit.to_string()),
                ("sort", "desc".into()),
            ])
            .await?;

        // "No transactions found" comes back as status "0"
        if !env.is_ok() {
            tracing::debug!(provider = PROVIDER, "empty tx list: {}", env.message);
            return Ok(Vec::new());
        }

        let raw: Vec<RawTransaction> = serde_json::from_value(env.result)?;
        Ok(raw.into_iter().map(RawTransaction::into_transaction).collect())
    }

    async fn get_gas_prices(&self) -> Result<GasPrices, CoreError> {
        let env = self
            .call(&[
                ("module", "gastracker".into()),
                ("action", "gasoracle".into()),
            ])
            .await?;
        if !env.is_ok() {
            return Err(env.failure());
        }

        let oracle: GasOracle = serde_json::from_value(env.result)?;
        Ok(GasPrices {
            low: parse_f64(&oracle.safe_gas_price),
            average: parse_f64(&oracle.propose_gas_price),
            high: parse_f64(&oracle.fast_gas_price),
        })
    }
}
