use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crypto_assistant_core::models::settings::{
    COHERE_KEY, COINGECKO_KEY, CRYPTOPANIC_KEY, ETHERSCAN_KEY,
};
use crypto_assistant_core::providers::blockchain_info::BlockchainInfoProvider;
use crypto_assistant_core::providers::coingecko::CoinGeckoProvider;
use crypto_assistant_core::providers::cohere::CohereClient;
use crypto_assistant_core::providers::cryptopanic::CryptoPanicProvider;
use crypto_assistant_core::providers::etherscan::EtherscanProvider;
use crypto_assistant_core::providers::registry::{ExplorerRegistry, ProviderSet};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Outcome of reading `.env`. Loaded before the subscriber exists so that
/// `RUST_LOG` may live there, and reported with [`DotenvStatus::log`] once it does.
#[derive(Debug)]
pub enum DotenvStatus {
    Loaded(PathBuf),
    Missing(String),
}

impl DotenvStatus {
    pub fn load() -> Self {
        Self::from_result(dotenvy::dotenv())
    }

    pub fn from_result(result: Result<PathBuf, dotenvy::Error>) -> Self {
        match result {
            Ok(path) => DotenvStatus::Loaded(path),
            Err(e) => DotenvStatus::Missing(e.to_string()),
        }
    }

    pub fn log(&self) {
        match self {
            DotenvStatus::Loaded(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            DotenvStatus::Missing(reason) => tracing::debug!("no .env loaded: {reason}"),
        }
    }
}

/// Environment variable holding each provider's key.
const KEY_VARS: [(&str, &str); 4] = [
    (COHERE_KEY, "COHERE_API_KEY"),
    (COINGECKO_KEY, "COINGECKO_API_KEY"),
    (ETHERSCAN_KEY, "ETHERSCAN_API_KEY"),
    (CRYPTOPANIC_KEY, "CRYPTOPANIC_API_KEY"),
];

/// Upstream base URL overrides (proxies, test doubles).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseUrls {
    pub coingecko: Option<String>,
    pub etherscan: Option<String>,
    pub blockchain_info: Option<String>,
    pub cryptopanic: Option<String>,
    pub cohere: Option<String>,
}

#[derive(Clone, Default, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Provider name (`cohere`, `coingecko`, ...) → key. Blank values never land here.
    pub api_keys: HashMap<String, String>,
    pub base_urls: BaseUrls,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut configured: Vec<&str> = self.api_keys.keys().map(String::as_str).collect();
        configured.sort_unstable();
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("api_keys", &configured)
            .field("base_urls", &self.base_urls)
            .finish()
    }
}

impl ServerConfig {
    /// Read the process environment. Load `.env` first with [`DotenvStatus::load`].
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Empty values count as absent.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_keys = KEY_VARS
            .iter()
            .filter_map(|(provider, var)| get(var).map(|key| (provider.to_string(), key)))
            .collect();

        Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            api_keys,
            base_urls: BaseUrls {
                coingecko: get("COINGECKO_BASE_URL"),
                etherscan: get("ETHERSCAN_BASE_URL"),
                blockchain_info: get("BLOCKCHAIN_INFO_BASE_URL"),
                cryptopanic: get("CRYPTOPANIC_BASE_URL"),
                cohere: get("COHERE_BASE_URL"),
            },
        }
    }

    fn key(&self, provider: &str) -> Option<String> {
        self.api_keys.get(provider).cloned()
    }

    /// Production adapters, pointed at the overridden base URLs where set.
    pub fn providers(&self) -> ProviderSet {
        if self.base_urls == BaseUrls::default() {
            return ProviderSet::from_keys(&self.api_keys);
        }
        let urls = &self.base_urls;

        let market = match &urls.coingecko {
            Some(url) => CoinGeckoProvider::with_base_url(url, self.key(COINGECKO_KEY)),
            None => CoinGeckoProvider::new(self.key(COINGECKO_KEY)),
        };

        let mut explorers = ExplorerRegistry::new();
        explorers.register(Box::new(match &urls.etherscan {
            Some(url) => EtherscanProvider::with_base_url(url, self.key(ETHERSCAN_KEY)),
            None => EtherscanProvider::new(self.key(ETHERSCAN_KEY)),
        }));
        explorers.register(Box::new(match &urls.blockchain_info {
            Some(url) => BlockchainInfoProvider::with_base_url(url),
            None => BlockchainInfoProvider::new(),
        }));

        let news = match &urls.cryptopanic {
            Some(url) => CryptoPanicProvider::with_base_url(url, self.key(CRYPTOPANIC_KEY)),
            None => CryptoPanicProvider::new(self.key(CRYPTOPANIC_KEY)),
        };

        let llm = match &urls.cohere {
            Some(url) => CohereClient::with_base_url(url, self.key(COHERE_KEY)),
            None => CohereClient::new(self.key(COHERE_KEY)),
        };

        ProviderSet {
            market: Arc::new(market),
            explorers: Arc::new(explorers),
            news: Arc::new(news),
            llm: Arc::new(llm),
        }
    }
}
