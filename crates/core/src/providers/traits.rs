use async_trait::async_trait;
use futures::stream::BoxStream;
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::chat::ChatMessage;
use crate::models::coin::{
    CoinData, CoinListEntry, CoinMarketChart, CoinSearchResult, GlobalMarketData, SimplePrice,
    TrendingCoin,
};
use crate::models::news::{NewsFilter, NewsItem};
use crate::models::wallet::{Chain, GasPrices, Transaction, WalletBalance};

/// Fragments of a streamed completion, in arrival order.
pub type TextStream = BoxStream<'static, Result<String, CoreError>>;

/// Market data source (CoinGecko in production, mocks in tests).
///
/// The intent router, the market service and the HTTP routes only talk to
/// this trait, so swapping the upstream touches one file.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Every coin the provider knows about (id, symbol, name).
    async fn list_coins(&self) -> Result<Vec<CoinListEntry>, CoreError>;

    /// One page of coins ordered by market cap, descending.
    async fn get_markets(
        &self,
        currency: &str,
        per_page: u32,
        page: u32,
    ) -> Result<Vec<CoinData>, CoreError>;

    /// Market snapshot of a single coin, in USD.
    async fn get_coin(&self, coin_id: &str) -> Result<CoinData, CoreError>;

    /// Price/market-cap/volume series over the last `days` days.
    async fn get_market_chart(
        &self,
        coin_id: &str,
        days: u32,
        currency: &str,
    ) -> Result<CoinMarketChart, CoreError>;

    /// Free-text search over coin names and symbols, best match first.
    async fn search(&self, query: &str) -> Result<Vec<CoinSearchResult>, CoreError>;

    async fn trending(&self) -> Result<Vec<TrendingCoin>, CoreError>;

    async fn global(&self) -> Result<GlobalMarketData, CoreError>;

    /// Quotes for several coins at once: coin id → currency → quote.
    async fn simple_prices(
        &self,
        coin_ids: &[String],
        currencies: &[String],
    ) -> Result<HashMap<String, HashMap<String, SimplePrice>>, CoreError>;
}

/// Block explorer for one or more chains.
#[async_trait]
pub trait ChainExplorer: Send + Sync {
    fn name(&self) -> &str;

    /// Which chains this explorer can answer for.
    fn supported_chains(&self) -> Vec<Chain>;

    async fn get_balance(&self, address: &str) -> Result<WalletBalance, CoreError>;

    /// Most recent transactions first.
    async fn get_transactions(
        &self,
        address: &str,
        limit: u32,
    ) -> Result<Vec<Transaction>, CoreError>;

    /// Fee tiers, for chains that have a gas oracle.
    async fn get_gas_prices(&self) -> Result<GasPrices, CoreError> {
        Err(CoreError::api(
            self.name(),
            "Gas prices are not available for this chain",
        ))
    }
}

/// Crypto news aggregator.
///
/// Implementations never fail: without credentials or connectivity they
/// fall back to a canned feed.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn latest_news(&self, filter: NewsFilter, currencies: &[String]) -> Vec<NewsItem>;
}

/// Chat-completion backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn name(&self) -> &str;

    /// Whether credentials are present. Calls fail with
    /// [`CoreError::MissingApiKey`] when this is false.
    fn is_configured(&self) -> bool;

    /// Complete `prompt` given the prior conversation.
    async fn generate(&self, prompt: &str, history: &[ChatMessage]) -> Result<String, CoreError>;

    /// Same as [`LanguageModel::generate`], but yields text as it arrives.
    async fn generate_stream(
        &self,
        prompt: &str,
        history: &[ChatMessage],
    ) -> Result<TextStream, CoreError>;
}
