pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::Utc;
use futures::stream::BoxStream;
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

use errors::CoreError;
use models::{
    alert::{PriceAlert, TriggeredAlert},
    chat::{ChatContext, ChatMessage},
    coin::{CoinData, TopMovers},
    dca::{DcaRequest, DcaResult},
    education::EducationalTopic,
    market_cache::MarketCache,
    portfolio::{Portfolio, PortfolioHolding},
    preferences::{PreferencesUpdate, UserPreferences},
    settings::Settings,
    state::AppState,
};
use providers::registry::ProviderSet;
use services::{
    alert_service::{AlertService, AlertUpdate},
    chat_service::{ChatReply, ChatService},
    chat_tools::ChatTools,
    dca_service::DcaService,
    export_service::{ExportFormat, ExportService, ExportedFile},
    market_service::MarketService,
    portfolio_service::{HoldingUpdate, PortfolioService},
    watchlist_service::WatchlistService,
};
use storage::manager::StorageManager;

/// How often a client should call [`CryptoAssistant::refresh_portfolio_prices`]
/// and [`CryptoAssistant::refresh_alerts`]. The library runs no timer itself.
pub const REFRESH_INTERVAL_SECS: u64 = 60;

/// Number of coins on each side of [`CryptoAssistant::top_movers`].
const TOP_MOVERS_LIMIT: usize = 5;

/// Main entry point for the crypto assistant core library.
/// Holds the client state and all services needed to operate on it.
#[must_use]
pub struct CryptoAssistant {
    state: AppState,
    providers: ProviderSet,
    chat_service: ChatService,
    market_service: MarketService,
    market_cache: MarketCache,
    portfolio_service: PortfolioService,
    alert_service: AlertService,
    watchlist_service: WatchlistService,
    /// Tracks whether any mutation has occurred since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for CryptoAssistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoAssistant")
            .field("messages", &self.state.messages.len())
            .field(
                "holdings",
                &self.state.portfolio.as_ref().map_or(0, |p| p.holdings.len()),
            )
            .field("alerts", &self.state.alerts.len())
            .field("watchlist", &self.state.watchlist)
            .field("cached_coins", &self.market_cache.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl CryptoAssistant {
    /// Fresh state with default preferences and no API keys.
    pub fn create_new() -> Self {
        Self::build(AppState::default())
    }

    /// Use explicit adapters instead of the production ones (tests, proxies).
    /// Changing API keys later rebuilds the production adapters.
    pub fn with_providers(state: AppState, providers: ProviderSet) -> Self {
        Self::assemble(state, providers)
    }

    /// Load state from encrypted bytes (password required).
    pub fn load_from_bytes(encrypted: &[u8], password: &str) -> Result<Self, CoreError> {
        let state = StorageManager::load_from_bytes(encrypted, password)?;
        Ok(Self::build(state))
    }

    /// Save the state to encrypted bytes. Clears the unsaved-changes flag.
    pub fn save_to_bytes(&mut self, password: &str) -> Result<Vec<u8>, CoreError> {
        let bytes = StorageManager::save_to_bytes(&self.state, password)?;
        self.dirty = false;
        Ok(bytes)
    }

    pub fn load_from_file(path: impl AsRef<Path>, password: &str) -> Result<Self, CoreError> {
        let state = StorageManager::load_from_file(path, password)?;
        Ok(Self::build(state))
    }

    pub fn save_to_file(&mut self, path: impl AsRef<Path>, password: &str) -> Result<(), CoreError> {
        StorageManager::save_to_file(&self.state, path, password)?;
        self.dirty = false;
        Ok(())
    }

    /// Re-encrypt with a new password after verifying the current one
    /// against the last saved bytes.
    pub fn change_password(
        &mut self,
        last_saved_bytes: &[u8],
        current_password: &str,
        new_password: &str,
    ) -> Result<Vec<u8>, CoreError> {
        StorageManager::load_from_bytes(last_saved_bytes, current_password)?;
        let bytes = StorageManager::save_to_bytes(&self.state, new_password)?;
        self.dirty = false;
        Ok(bytes)
    }

    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Unencrypted JSON snapshot of the state, for debugging/display.
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.state)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize state: {e}")))
    }

    // ── Chat ────────────────────────────────────────────────────────

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.state.messages
    }

    pub fn add_message(&mut self, message: ChatMessage) {
        self.state.messages.push(message);
        self.dirty = true;
    }

    pub fn clear_messages(&mut self) {
        self.state.messages.clear();
        self.dirty = true;
    }

    /// What the chat pipeline gets to see: history, portfolio, watchlist, preferences.
    #[must_use]
    pub fn chat_context(&self) -> ChatContext {
        ChatContext {
            messages: self.state.messages.clone(),
            current_portfolio: self.state.portfolio.clone(),
            watchlist: self.state.watchlist.clone(),
            user_preferences: self.state.preferences.clone(),
        }
    }

    /// Ask the assistant. Both the question and the answer are appended to
    /// the history; the history sent to the model is the one before this turn.
    pub async fn send_message(&mut self, text: &str) -> Result<ChatReply, CoreError> {
        let context = self.chat_context();
        let reply = self.chat_service.reply(text, Some(&context)).await?;
        self.add_message(ChatMessage::user(text));
        self.add_message(ChatMessage::assistant(reply.response.clone()));
        Ok(reply)
    }

    /// Streamed variant of [`CryptoAssistant::send_message`]. Only the
    /// question is recorded; pass the assembled answer to
    /// [`CryptoAssistant::record_assistant_reply`] once the stream ends.
    pub async fn stream_message(&mut self, text: &str) -> Result<BoxStream<'static, String>, CoreError> {
        let context = self.chat_context();
        let stream = self.chat_service.reply_stream(text, Some(&context)).await?;
        self.add_message(ChatMessage::user(text));
        Ok(stream)
    }

    pub fn record_assistant_reply(&mut self, text: impl Into<String>) {
        self.add_message(ChatMessage::assistant(text));
    }

    pub fn export_conversation(&self, format: ExportFormat) -> Result<ExportedFile, CoreError> {
        ExportService::export(&self.state.messages, format, Utc::now())
    }

    pub async fn explain_topic(&self, topic: &EducationalTopic) -> Result<String, CoreError> {
        self.chat_service.explain_topic(topic).await
    }

    /// Educational commentary on the current portfolio for the saved risk profile.
    pub async fn investment_insights(&self) -> Result<String, CoreError> {
        let portfolio = self.state.portfolio.clone().unwrap_or_default();
        self.chat_service
            .investment_insights(&portfolio, self.state.preferences.risk_profile)
            .await
    }

    // ── Portfolio ───────────────────────────────────────────────────

    #[must_use]
    pub fn portfolio(&self) -> Option<&Portfolio> {
        self.state.portfolio.as_ref()
    }

    pub fn add_holding(&mut self, holding: PortfolioHolding) -> Result<Uuid, CoreError> {
        let id = holding.id;
        self.portfolio_service
            .add_holding(&mut self.state.portfolio, holding)?;
        self.dirty = true;
        Ok(id)
    }

    pub fn remove_holding(&mut self, holding_id: Uuid) -> Result<PortfolioHolding, CoreError> {
        let removed = self
            .portfolio_service
            .remove_holding(&mut self.state.portfolio, holding_id)?;
        self.dirty = true;
        Ok(removed)
    }

    pub fn update_holding(&mut self, holding_id: Uuid, update: HoldingUpdate) -> Result<(), CoreError> {
        self.portfolio_service
            .update_holding(&mut self.state.portfolio, holding_id, update)?;
        self.dirty = true;
        Ok(())
    }

    /// Apply already-fetched prices (coin id → USD).
    pub fn update_portfolio_values(&mut self, prices: &HashMap<String, f64>) {
        self.portfolio_service
            .update_portfolio_values(&mut self.state.portfolio, prices);
        self.dirty = true;
    }

    pub fn clear_portfolio(&mut self) {
        self.portfolio_service.clear_portfolio(&mut self.state.portfolio);
        self.dirty = true;
    }

    /// Fetch current USD prices for every held coin and revalue the portfolio.
    pub async fn refresh_portfolio_prices(&mut self) -> Result<(), CoreError> {
        let Some(portfolio) = &self.state.portfolio else {
            return Ok(());
        };
        let prices = self.market_service.usd_prices(&portfolio.coin_ids()).await?;
        self.update_portfolio_values(&prices);
        Ok(())
    }

    // ── Alerts ──────────────────────────────────────────────────────

    #[must_use]
    pub fn alerts(&self) -> &[PriceAlert] {
        &self.state.alerts
    }

    pub fn add_alert(&mut self, alert: PriceAlert) -> Result<Uuid, CoreError> {
        let id = alert.id;
        self.alert_service.add_alert(&mut self.state.alerts, alert)?;
        self.dirty = true;
        Ok(id)
    }

    pub fn remove_alert(&mut self, alert_id: Uuid) -> Result<PriceAlert, CoreError> {
        let removed = self.alert_service.remove_alert(&mut self.state.alerts, alert_id)?;
        self.dirty = true;
        Ok(removed)
    }

    pub fn update_alert(&mut self, alert_id: Uuid, update: AlertUpdate) -> Result<(), CoreError> {
        self.alert_service
            .update_alert(&mut self.state.alerts, alert_id, update)?;
        self.dirty = true;
        Ok(())
    }

    /// Run the trigger check against already-fetched prices.
    pub fn check_alerts(&mut self, prices: &HashMap<String, f64>) -> Vec<TriggeredAlert> {
        let triggered = self.alert_service.check_alerts(&mut self.state.alerts, prices);
        self.dirty = true;
        triggered
    }

    /// Fetch prices for the coins of active alerts, then check them.
    pub async fn refresh_alerts(&mut self) -> Result<Vec<TriggeredAlert>, CoreError> {
        let mut coin_ids: Vec<String> = Vec::new();
        for alert in self.state.alerts.iter().filter(|a| a.active) {
            if !coin_ids.contains(&alert.coin_id) {
                coin_ids.push(alert.coin_id.clone());
            }
        }
        if coin_ids.is_empty() {
            return Ok(Vec::new());
        }
        let prices = self.market_service.usd_prices(&coin_ids).await?;
        Ok(self.check_alerts(&prices))
    }

    // ── Watchlist & Preferences ─────────────────────────────────────

    #[must_use]
    pub fn watchlist(&self) -> &[String] {
        &self.state.watchlist
    }

    pub fn add_to_watchlist(&mut self, coin_id: &str) -> Result<bool, CoreError> {
        let added = self.watchlist_service.add(&mut self.state.watchlist, coin_id)?;
        self.dirty |= added;
        Ok(added)
    }

    pub fn remove_from_watchlist(&mut self, coin_id: &str) -> bool {
        let removed = self.watchlist_service.remove(&mut self.state.watchlist, coin_id);
        self.dirty |= removed;
        removed
    }

    pub fn clear_watchlist(&mut self) {
        self.watchlist_service.clear(&mut self.state.watchlist);
        self.dirty = true;
    }

    #[must_use]
    pub fn preferences(&self) -> &UserPreferences {
        &self.state.preferences
    }

    pub fn update_preferences(&mut self, update: PreferencesUpdate) {
        self.state.preferences.apply(update);
        self.dirty = true;
    }

    // ── Market ──────────────────────────────────────────────────────

    /// Top coins by market cap, served from the one-minute cache when fresh.
    pub async fn market_overview(&mut self) -> Result<Vec<CoinData>, CoreError> {
        self.market_service
            .market_overview(&mut self.market_cache, Utc::now())
            .await
    }

    /// Coin from the last overview snapshot, if it is still there.
    #[must_use]
    pub fn cached_coin(&self, coin_id: &str) -> Option<&CoinData> {
        self.market_cache.get_cached_coin(coin_id)
    }

    pub async fn top_movers(&self) -> Result<TopMovers, CoreError> {
        self.market_service.top_movers(TOP_MOVERS_LIMIT).await
    }

    pub async fn calculate_dca(&self, request: &DcaRequest) -> Result<DcaResult, CoreError> {
        DcaService::calculate(self.providers.market.as_ref(), request).await
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    /// Set an API key (`cohere`, `coingecko`, `etherscan`, `cryptopanic`).
    /// Rebuilds the adapters so the new key takes effect immediately.
    pub fn set_api_key(&mut self, provider: &str, key: &str) {
        self.state.settings.set_api_key(provider, key);
        self.rebuild_providers();
        self.dirty = true;
    }

    pub fn remove_api_key(&mut self, provider: &str) -> bool {
        let removed = self.state.settings.api_keys.remove(provider).is_some();
        if removed {
            self.rebuild_providers();
            self.dirty = true;
        }
        removed
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(state: AppState) -> Self {
        let providers = ProviderSet::from_keys(&state.settings.api_keys);
        Self::assemble(state, providers)
    }

    fn assemble(state: AppState, providers: ProviderSet) -> Self {
        let (chat_service, market_service) = Self::services_for(&providers);
        Self {
            state,
            providers,
            chat_service,
            market_service,
            market_cache: MarketCache::new(),
            portfolio_service: PortfolioService::new(),
            alert_service: AlertService::new(),
            watchlist_service: WatchlistService::new(),
            dirty: false,
        }
    }

    fn services_for(providers: &ProviderSet) -> (ChatService, MarketService) {
        let tools = ChatTools::new(
            providers.market.clone(),
            providers.explorers.clone(),
            providers.news.clone(),
        );
        (
            ChatService::new(tools, providers.llm.clone()),
            MarketService::new(providers.market.clone()),
        )
    }

    fn rebuild_providers(&mut self) {
        self.providers = ProviderSet::from_keys(&self.state.settings.api_keys);
        let (chat_service, market_service) = Self::services_for(&self.providers);
        self.chat_service = chat_service;
        self.market_service = market_service;
        self.market_cache.clear();
    }
}
