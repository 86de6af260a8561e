use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

use super::http::ensure_success;
use super::traits::MarketDataProvider;
use crate::errors::CoreError;
use crate::models::coin::{
    CoinData, CoinListEntry, CoinMarketChart, CoinSearchResult, GlobalMarketData, SimplePrice,
    TrendingCoin,
};

pub const BASE_URL: &str = "https://api.coingecko.com/api/v3";
const PROVIDER: &str = "CoinGecko";

/// CoinGecko API provider for market data.
///
/// - **Free**: works without a key (10-30 calls/minute); a demo key raises the limit.
/// - **Endpoints**: `/coins/markets`, `/coins/{id}/market_chart`, `/search`,
///   `/search/trending`, `/global`, `/simple/price`, `/coins/list`
///
/// CoinGecko identifies coins by lowercase ids ("bitcoin", "ethereum"),
/// never by ticker.
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(BASE_URL, api_key)
    }

    /// Point the provider at another host (proxies, tests).
    pub fn with_base_url(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let req = self.client.get(format!("{}{path}", self.base_url));
        match &self.api_key {
            Some(key) => req.header("x-cg-demo-api-key", key),
            None => req,
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T, CoreError> {
        tracing::debug!(provider = PROVIDER, "fetching {what}");
        let resp = ensure_success(req.send().await?, PROVIDER).await?;
        resp.json().await.map_err(|e| {
            CoreError::api(PROVIDER, format!("Failed to parse {what}: {e}"))
        })
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

// ── CoinGecko API response types ────────────────────────────────────

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    coins: Vec<CoinSearchResult>,
}

#[derive(Deserialize)]
struct TrendingResponse {
    #[serde(default)]
    coins: Vec<TrendingEntry>,
}

#[derive(Deserialize)]
struct TrendingEntry {
    item: TrendingCoin,
}

#[derive(Deserialize)]
struct GlobalResponse {
    data: GlobalMarketData,
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn list_coins(&self) -> Result<Vec<CoinListEntry>, CoreError> {
        self.fetch(self.get("/coins/list"), "coins list").await
    }

    async fn get_markets(
        &self,
        currency: &str,
        per_page: u32,
        page: u32,
    ) -> Result<Vec<CoinData>, CoreError> {
        let req = self.get("/coins/markets").query(&[
            ("vs_currency", currency.to_lowercase()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
            ("sparkline", "false".to_string()),
        ]);
        self.fetch(req, "market data").await
    }

    async fn get_coin(&self, coin_id: &str) -> Result<CoinData, CoreError> {
        let req = self
            .get("/coins/markets")
            .query(&[("vs_currency", "usd"), ("ids", coin_id)]);
        let coins: Vec<CoinData> = self.fetch(req, &format!("coin {coin_id}")).await?;
        coins
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::CoinNotFound(coin_id.to_string()))
    }

    async fn get_market_chart(
        &self,
        coin_id: &str,
        days: u32,
        currency: &str,
    ) -> Result<CoinMarketChart, CoreError> {
        let req = self
            .get(&format!("/coins/{coin_id}/market_chart"))
            .query(&[
                ("vs_currency", currency.to_lowercase()),
                ("days", days.to_string()),
            ]);
        let resp = req.send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(CoreError::CoinNotFound(coin_id.to_string()));
        }
        let resp = ensure_success(resp, PROVIDER).await?;
        resp.json().await.map_err(|e| {
            CoreError::api(PROVIDER, format!("Failed to parse chart for {coin_id}: {e}"))
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<CoinSearchResult>, CoreError> {
        let req = self.get("/search").query(&[("query", query)]);
        let resp: SearchResponse = self.fetch(req, "search results").await?;
        Ok(resp.coins)
    }

    async fn trending(&self) -> Result<Vec<TrendingCoin>, CoreError> {
        let resp: TrendingResponse = self.fetch(self.get("/search/trending"), "trending coins").await?;
        Ok(resp.coins.into_iter().map(|entry| entry.item).collect())
    }

    async fn global(&self) -> Result<GlobalMarketData, CoreError> {
        let resp: GlobalResponse = self.fetch(self.get("/global"), "global data").await?;
        Ok(resp.data)
    }

    async fn simple_prices(
        &self,
        coin_ids: &[String],
        currencies: &[String],
    ) -> Result<HashMap<String, HashMap<String, SimplePrice>>, CoreError> {
        if coin_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let currencies: Vec<String> = if currencies.is_empty() {
            vec!["usd".to_string()]
        } else {
            currencies.iter().map(|c| c.to_lowercase()).collect()
        };

        let req = self.get("/simple/price").query(&[
            ("ids", coin_ids.join(",")),
            ("vs_currencies", currencies.join(",")),
            ("include_24hr_change", "true".to_string()),
            ("include_market_cap", "true".to_string()),
        ]);
        // {"bitcoin": {"usd": 1.0, "usd_24h_change": 0.5, "usd_market_cap": 2.0}}
        let raw: HashMap<String, HashMap<String, Option<f64>>> =
            self.fetch(req, "simple prices").await?;

        let quotes = raw
            .into_iter()
            .map(|(coin_id, fields)| {
                let per_currency = currencies
                    .iter()
                    .filter_map(|cur| {
                        let price = fields.get(cur).copied().flatten()?;
                        Some((
                            cur.clone(),
                            SimplePrice {
                                price,
                                change_24h: fields.get(&format!("{cur}_24h_change")).copied().flatten(),
                                market_cap: fields.get(&format!("{cur}_market_cap")).copied().flatten(),
                            },
                        ))
                    })
                    .collect();
                (coin_id, per_currency)
            })
            .collect();

        Ok(quotes)
    }
}
