use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use super::http::ensure_success;
use super::traits::ChainExplorer;
use crate::errors::CoreError;
use crate::models::wallet::{Chain, Transaction, TxStatus, WalletBalance};

pub const BASE_URL: &str = "https://blockchain.info";
const PROVIDER: &str = "blockchain.info";
const SATOSHI_PER_BTC: f64 = 1e8;

/// blockchain.info explorer for Bitcoin. No API key.
pub struct BlockchainInfoProvider {
    client: Client,
    base_url: String,
}

impl BlockchainInfoProvider {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for BlockchainInfoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct RawAddress {
    #[serde(default)]
    txs: Vec<RawTx>,
}

#[derive(Deserialize)]
struct RawTx {
    hash: String,
    time: i64,
    #[serde(default)]
    inputs: Vec<RawInput>,
    #[serde(default)]
    out: Vec<RawOutput>,
}

#[derive(Deserialize)]
struct RawInput {
    prev_out: Option<RawOutput>,
}

#[derive(Deserialize)]
struct RawOutput {
    addr: Option<String>,
    #[serde(default)]
    value: u64,
}

impl RawTx {
    /// Only the first input and first output are reported.
    fn into_transaction(self) -> Transaction {
        let from = self
            .inputs
            .first()
            .and_then(|i| i.prev_out.as_ref())
            .and_then(|o| o.addr.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let first_out = self.out.first();
        Transaction {
            hash: self.hash,
            from,
            to: first_out
                .and_then(|o| o.addr.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            value: first_out.map(|o| o.value as f64 / SATOSHI_PER_BTC).unwrap_or(0.0),
            timestamp: DateTime::<Utc>::from_timestamp(self.time, 0).unwrap_or_default(),
            status: TxStatus::Success,
            gas_used: None,
            gas_price: None,
        }
    }
}

#[async_trait]
impl ChainExplorer for BlockchainInfoProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn supported_chains(&self) -> Vec<Chain> {
        vec![Chain::Bitcoin]
    }

    async fn get_balance(&self, address: &str) -> Result<WalletBalance, CoreError> {
        let url = format!("{}/q/addressbalance/{address}", self.base_url);
        tracing::debug!(provider = PROVIDER, "fetching balance of {address}");

        let resp = ensure_success(self.client.get(&url).send().await?, PROVIDER).await?;
        // Plain-text satoshi count
        let body = resp.text().await?;
        let satoshi: f64 = body.trim().parse().map_err(|_| {
            CoreError::api(PROVIDER, format!("Unexpected balance body: {}", body.trim()))
        })?;

        Ok(WalletBalance {
            address: address.to_string(),
            balance: satoshi / SATOSHI_PER_BTC,
            chain: Chain::Bitcoin,
            usd_value: None,
        })
    }

    async fn get_transactions(
        &self,
        address: &str,
        limit: u32,
    ) -> Result<Vec<Transaction>, CoreError> {
        let url = format!("{}/rawaddr/{address}", self.base_url);
        tracing::debug!(provider = PROVIDER, "fetching transactions of {address}");

        let resp = self
            .client
            .get(&url)
            .query(&[("limit", limit)])
            .send()
            .await?;
        let raw: RawAddress = ensure_success(resp, PROVIDER)
            .await?
            .json()
            .await
            .map_err(|e| CoreError::api(PROVIDER, format!("Failed to parse transactions: {e}")))?;

        Ok(raw.txs.into_iter().map(RawTx::into_transaction).collect())
    }
}
