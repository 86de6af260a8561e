use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// API key slots understood by `ProviderSet::from_keys`.
pub const COHERE_KEY: &str = "cohere";
pub const COINGECKO_KEY: &str = "coingecko";
pub const ETHERSCAN_KEY: &str = "etherscan";
pub const CRYPTOPANIC_KEY: &str = "cryptopanic";

/// Settings stored inside the encrypted state file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Provider name (see the `*_KEY` constants) → API key.
    /// Empty strings are treated as absent.
    pub api_keys: HashMap<String, String>,
}

impl Settings {
    pub fn api_key(&self, provider: &str) -> Option<&str> {
        self.api_keys
            .get(provider)
            .map(String::as_str)
            .filter(|k| !k.trim().is_empty())
    }

    pub fn set_api_key(&mut self, provider: impl Into<String>, key: impl Into<String>) {
        self.api_keys.insert(provider.into(), key.into());
    }
}
