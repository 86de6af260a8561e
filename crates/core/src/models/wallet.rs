use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Chains the explorers can answer for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum,
    Bitcoin,
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Chain::Ethereum => write!(f, "ethereum"),
            Chain::Bitcoin => write!(f, "bitcoin"),
        }
    }
}

impl std::str::FromStr for Chain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ethereum" | "eth" => Ok(Chain::Ethereum),
            "bitcoin" | "btc" => Ok(Chain::Bitcoin),
            other => Err(other.to_string()),
        }
    }
}

impl Chain {
    /// Ticker of the chain's native token.
    pub fn native_symbol(&self) -> &'static str {
        match self {
            Chain::Ethereum => "ETH",
            Chain::Bitcoin => "BTC",
        }
    }
}

/// Native-token balance of an address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    pub address: String,
    /// In whole tokens (ETH, BTC), not base units
    pub balance: f64,
    pub chain: Chain,
    #[serde(default)]
    pub usd_value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Success,
    Failed,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,
    pub from: String,
    pub to: String,
    /// In whole tokens
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    pub status: TxStatus,
    #[serde(default)]
    pub gas_used: Option<u64>,
    /// In Gwei
    #[serde(default)]
    pub gas_price: Option<f64>,
}

/// Ethereum gas oracle tiers, in Gwei.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GasPrices {
    pub low: f64,
    pub average: f64,
    pub high: f64,
}
