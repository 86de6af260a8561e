use crate::errors::CoreError;

/// Ordered set of coin ids the user follows.
pub struct WatchlistService;

impl WatchlistService {
    pub fn new() -> Self {
        Self
    }

    /// Append `coin_id` unless it is already present. Returns whether it was added.
    pub fn add(&self, watchlist: &mut Vec<String>, coin_id: &str) -> Result<bool, CoreError> {
        let coin_id = coin_id.trim();
        if coin_id.is_empty() {
            return Err(CoreError::ValidationError("Coin id must not be empty".into()));
        }
        if watchlist.iter().any(|id| id == coin_id) {
            return Ok(false);
        }
        watchlist.push(coin_id.to_string());
        Ok(true)
    }

    /// Returns whether anything was removed.
    pub fn remove(&self, watchlist: &mut Vec<String>, coin_id: &str) -> bool {
        let before = watchlist.len();
        watchlist.retain(|id| id != coin_id);
        watchlist.len() != before
    }

    pub fn clear(&self, watchlist: &mut Vec<String>) {
        watchlist.clear();
    }
}

impl Default for WatchlistService {
    fn default() -> Self {
        Self::new()
    }
}
