use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::settings::{COINGECKO_KEY, COHERE_KEY, CRYPTOPANIC_KEY, ETHERSCAN_KEY};
use crate::models::wallet::Chain;

use super::blockchain_info::BlockchainInfoProvider;
use super::coingecko::CoinGeckoProvider;
use super::cohere::CohereClient;
use super::cryptopanic::CryptoPanicProvider;
use super::etherscan::EtherscanProvider;
use super::traits::{ChainExplorer, LanguageModel, MarketDataProvider, NewsProvider};

/// Registry of block explorers.
///
/// Routes requests to the correct explorer based on `Chain`.
pub struct ExplorerRegistry {
    explorers: Vec<Box<dyn ChainExplorer>>,
}

impl ExplorerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            explorers: Vec::new(),
        }
    }

    /// Etherscan for Ethereum, blockchain.info for Bitcoin.
    pub fn new_with_defaults(api_keys: &HashMap<String, String>) -> Self {
        let mut registry = Self::new();
        let etherscan_key = api_keys
            .get(ETHERSCAN_KEY)
            .filter(|k| !k.trim().is_empty())
            .cloned();
        registry.register(Box::new(EtherscanProvider::new(etherscan_key)));
        registry.register(Box::new(BlockchainInfoProvider::new()));
        registry
    }

    pub fn register(&mut self, explorer: Box<dyn ChainExplorer>) {
        self.explorers.push(explorer);
    }

    /// First registered explorer that supports `chain`.
    pub fn get_explorer_for(&self, chain: Chain) -> Option<&dyn ChainExplorer> {
        self.explorers
            .iter()
            .find(|e| e.supported_chains().contains(&chain))
            .map(|e| e.as_ref())
    }

    /// Like [`ExplorerRegistry::get_explorer_for`], but an error when nothing matches.
    pub fn explorer(&self, chain: Chain) -> Result<&dyn ChainExplorer, CoreError> {
        self.get_explorer_for(chain)
            .ok_or_else(|| CoreError::UnsupportedChain(chain.to_string()))
    }
}

impl Default for ExplorerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Every upstream the assistant talks to, behind its trait.
///
/// Shared handles: the router, the chat service and the market service
/// all hold the same adapters.
#[derive(Clone)]
pub struct ProviderSet {
    pub market: Arc<dyn MarketDataProvider>,
    pub explorers: Arc<ExplorerRegistry>,
    pub news: Arc<dyn NewsProvider>,
    pub llm: Arc<dyn LanguageModel>,
}

impl ProviderSet {
    /// Production adapters; keys are looked up by provider name
    /// (`cohere`, `coingecko`, `etherscan`, `cryptopanic`). Blank keys count as absent.
    pub fn from_keys(api_keys: &HashMap<String, String>) -> Self {
        let key = |name: &str| {
            api_keys
                .get(name)
                .filter(|k| !k.trim().is_empty())
                .cloned()
        };
        Self {
            market: Arc::new(CoinGeckoProvider::new(key(COINGECKO_KEY))),
            explorers: Arc::new(ExplorerRegistry::new_with_defaults(api_keys)),
            news: Arc::new(CryptoPanicProvider::new(key(CRYPTOPANIC_KEY))),
            llm: Arc::new(CohereClient::new(key(COHERE_KEY))),
        }
    }
}
