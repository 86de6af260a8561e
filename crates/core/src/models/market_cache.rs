use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use super::coin::CoinData;

/// How long a market snapshot is served before it is refetched.
pub const CACHE_DURATION_SECS: i64 = 60;

/// Last market page fetched, keyed by coin id.
///
/// One timestamp for the whole snapshot: either everything is fresh or
/// nothing is. Not persisted; market data is always refetched on startup.
#[derive(Debug, Clone, Default)]
pub struct MarketCache {
    cached_coins: HashMap<String, CoinData>,
    /// Preserves market-cap order for `snapshot()`.
    order: Vec<String>,
    cache_timestamp: Option<DateTime<Utc>>,
}

impl MarketCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with `coins`, stamped at `now`.
    pub fn update_cache(&mut self, coins: &[CoinData], now: DateTime<Utc>) {
        self.cached_coins = coins.iter().map(|c| (c.id.clone(), c.clone())).collect();
        self.order = coins.iter().map(|c| c.id.clone()).collect();
        self.cache_timestamp = Some(now);
    }

    pub fn get_cached_coin(&self, coin_id: &str) -> Option<&CoinData> {
        self.cached_coins.get(coin_id)
    }

    pub fn is_cache_valid(&self, now: DateTime<Utc>) -> bool {
        self.cache_timestamp
            .is_some_and(|ts| now - ts < Duration::seconds(CACHE_DURATION_SECS))
    }

    /// Cached coins in the order they were fetched.
    pub fn snapshot(&self) -> Vec<CoinData> {
        self.order
            .iter()
            .filter_map(|id| self.cached_coins.get(id).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.cached_coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cached_coins.is_empty()
    }

    pub fn clear(&mut self) {
        self.cached_coins.clear();
        self.order.clear();
        self.cache_timestamp = None;
    }
}
