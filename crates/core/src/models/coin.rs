use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// CoinGecko sends `null` for numbers it has no data for (fresh listings,
/// delisted coins). Treat those as zero instead of failing the whole page.
pub(crate) fn nullable_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Market snapshot of one coin (`/coins/markets` row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinData {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub current_price: f64,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub market_cap: f64,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub fully_diluted_valuation: Option<f64>,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub total_volume: f64,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub high_24h: f64,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub low_24h: f64,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub price_change_24h: f64,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub price_change_percentage_24h: f64,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub market_cap_change_24h: f64,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub market_cap_change_percentage_24h: f64,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub circulating_supply: f64,
    #[serde(default)]
    pub total_supply: Option<f64>,
    #[serde(default)]
    pub max_supply: Option<f64>,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub ath: f64,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub ath_change_percentage: f64,
    #[serde(default)]
    pub ath_date: Option<String>,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub atl: f64,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub atl_change_percentage: f64,
    #[serde(default)]
    pub atl_date: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Historical series: `[unix_ms, value]` pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinMarketChart {
    pub prices: Vec<(f64, f64)>,
    #[serde(default)]
    pub market_caps: Vec<(f64, f64)>,
    #[serde(default)]
    pub total_volumes: Vec<(f64, f64)>,
}

/// Entry of `/coins/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinListEntry {
    pub id: String,
    pub symbol: String,
    pub name: String,
}

/// Entry of `/search` results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSearchResult {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

/// Entry of `/search/trending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub price_btc: Option<f64>,
    #[serde(default)]
    pub score: Option<u32>,
}

/// Aggregates from `/global`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalMarketData {
    #[serde(default)]
    pub active_cryptocurrencies: u64,
    #[serde(default)]
    pub markets: u64,
    #[serde(default)]
    pub total_market_cap: HashMap<String, f64>,
    #[serde(default)]
    pub total_volume: HashMap<String, f64>,
    #[serde(default)]
    pub market_cap_percentage: HashMap<String, f64>,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub market_cap_change_percentage_24h_usd: f64,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

/// Quote from `/simple/price` for one coin in one currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimplePrice {
    pub price: f64,
    pub change_24h: Option<f64>,
    pub market_cap: Option<f64>,
}

/// Best and worst 24h performers from one market page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopMovers {
    pub gainers: Vec<CoinData>,
    pub losers: Vec<CoinData>,
}

impl TopMovers {
    /// Rank `coins` by 24h change and keep `limit` on each side.
    pub fn from_market(coins: &[CoinData], limit: usize) -> Self {
        let mut gainers = coins.to_vec();
        gainers.sort_by(|a, b| {
            b.price_change_percentage_24h
                .total_cmp(&a.price_change_percentage_24h)
        });
        gainers.truncate(limit);

        let mut losers = coins.to_vec();
        losers.sort_by(|a, b| {
            a.price_change_percentage_24h
                .total_cmp(&b.price_change_percentage_24h)
        });
        losers.truncate(limit);

        Self { gainers, losers }
    }
}
