use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::coin::{
    CoinData, CoinMarketChart, CoinSearchResult, GlobalMarketData, TopMovers, TrendingCoin,
};
use crate::models::market_cache::MarketCache;
use crate::providers::traits::MarketDataProvider;

/// Page size of the cached market overview.
pub const OVERVIEW_PAGE_SIZE: u32 = 100;
/// Largest page the market-data API serves.
pub const MAX_PAGE_SIZE: u32 = 250;

/// Market data with a one-minute snapshot cache for the overview page.
///
/// Cache strategy: one `MarketCache` holds the last overview page. While it
/// is younger than a minute, `market_overview` serves it without a request;
/// everything else goes straight to the provider.
pub struct MarketService {
    provider: Arc<dyn MarketDataProvider>,
}

impl MarketService {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Top coins by market cap in USD, from `cache` when still valid.
    pub async fn market_overview(
        &self,
        cache: &mut MarketCache,
        now: DateTime<Utc>,
    ) -> Result<Vec<CoinData>, CoreError> {
        if cache.is_cache_valid(now) && !cache.is_empty() {
            return Ok(cache.snapshot());
        }

        let coins = self
            .provider
            .get_markets("usd", OVERVIEW_PAGE_SIZE, 1)
            .await?;
        cache.update_cache(&coins, now);
        Ok(coins)
    }

    /// One page of the market listing; `per_page` is clamped to 1..=250.
    pub async fn get_markets(
        &self,
        currency: &str,
        per_page: u32,
        page: u32,
    ) -> Result<Vec<CoinData>, CoreError> {
        self.provider
            .get_markets(currency, per_page.clamp(1, MAX_PAGE_SIZE), page.max(1))
            .await
    }

    pub async fn get_coin(&self, coin_id: &str) -> Result<CoinData, CoreError> {
        self.provider.get_coin(coin_id).await
    }

    pub async fn get_market_chart(
        &self,
        coin_id: &str,
        days: u32,
        currency: &str,
    ) -> Result<CoinMarketChart, CoreError> {
        if days == 0 {
            return Err(CoreError::ValidationError("Days must be at least 1".into()));
        }
        self.provider.get_market_chart(coin_id, days, currency).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<CoinSearchResult>, CoreError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CoreError::ValidationError("Search query must not be empty".into()));
        }
        self.provider.search(query).await
    }

    pub async fn trending(&self) -> Result<Vec<TrendingCoin>, CoreError> {
        self.provider.trending().await
    }

    pub async fn global(&self) -> Result<GlobalMarketData, CoreError> {
        self.provider.global().await
    }

    /// Best and worst 24h performers among the top 250 coins.
    pub async fn top_movers(&self, limit: usize) -> Result<TopMovers, CoreError> {
        let coins = self.provider.get_markets("usd", MAX_PAGE_SIZE, 1).await?;
        Ok(TopMovers::from_market(&coins, limit))
    }

    /// USD price per coin id. Coins the provider does not quote are absent.
    pub async fn usd_prices(&self, coin_ids: &[String]) -> Result<HashMap<String, f64>, CoreError> {
        if coin_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let quotes = self
            .provider
            .simple_prices(coin_ids, &["usd".to_string()])
            .await?;

        Ok(quotes
            .into_iter()
            .filter_map(|(id, per_currency)| per_currency.get("usd").map(|q| (id, q.price)))
            .collect())
    }
}
