// ═══════════════════════════════════════════════════════════════════
// Integration Tests — CryptoAssistant facade end to end with mocked
// upstreams: chat history, stores, refresh cycle, persistence
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crypto_assistant_core::errors::CoreError;
use crypto_assistant_core::models::alert::{AlertCondition, PriceAlert};
use crypto_assistant_core::models::chat::{ChatMessage, Role};
use crypto_assistant_core::models::coin::{
    CoinData, CoinListEntry, CoinMarketChart, CoinSearchResult, GlobalMarketData, SimplePrice,
    TrendingCoin,
};
use crypto_assistant_core::models::dca::{DcaFrequency, DcaRequest};
use crypto_assistant_core::models::news::{NewsFilter, NewsItem};
use crypto_assistant_core::models::portfolio::PortfolioHolding;
use crypto_assistant_core::models::preferences::{PreferencesUpdate, RiskProfile, Theme};
use crypto_assistant_core::models::state::AppState;
use crypto_assistant_core::providers::registry::{ExplorerRegistry, ProviderSet};
use crypto_assistant_core::providers::traits::{
    LanguageModel, MarketDataProvider, NewsProvider, TextStream,
};
use crypto_assistant_core::services::alert_service::AlertUpdate;
use crypto_assistant_core::services::chat_tools::ToolType;
use crypto_assistant_core::services::export_service::ExportFormat;
use crypto_assistant_core::services::portfolio_service::HoldingUpdate;
use crypto_assistant_core::{CryptoAssistant, REFRESH_INTERVAL_SECS};

// ═══════════════════════════════════════════════════════════════════
// Mock Providers
// ═══════════════════════════════════════════════════════════════════

/// Market where every coin trades at a settable USD price.
struct MockMarket {
    prices: Mutex<HashMap<String, f64>>,
    market_calls: AtomicUsize,
}

impl MockMarket {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            prices: Mutex::new(HashMap::from([
                ("bitcoin".to_string(), 50_000.0),
                ("ethereum".to_string(), 3_000.0),
            ])),
            market_calls: AtomicUsize::new(0),
        })
    }

    fn set_price(&self, coin_id: &str, price: f64) {
        self.prices.lock().unwrap().insert(coin_id.to_string(), price);
    }

    fn coin(&self, id: &str, price: f64) -> CoinData {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "symbol": &id[..3],
            "name": id,
            "current_price": price,
            "price_change_percentage_24h": price / 10_000.0,
        }))
        .unwrap()
    }

    fn all(&self) -> Vec<CoinData> {
        let prices = self.prices.lock().unwrap();
        let mut ids: Vec<&String> = prices.keys().collect();
        ids.sort();
        ids.into_iter().map(|id| self.coin(id, prices[id])).collect()
    }
}

#[async_trait]
impl MarketDataProvider for MockMarket {
    fn name(&self) -> &str {
        "MockMarket"
    }

    async fn list_coins(&self) -> Result<Vec<CoinListEntry>, CoreError> {
        Ok(Vec::new())
    }

    async fn get_markets(&self, _c: &str, _per_page: u32, _page: u32) -> Result<Vec<CoinData>, CoreError> {
        self.market_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.all())
    }

    async fn get_coin(&self, coin_id: &str) -> Result<CoinData, CoreError> {
        self.all()
            .into_iter()
            .find(|c| c.id == coin_id)
            .ok_or_else(|| CoreError::CoinNotFound(coin_id.to_string()))
    }

    async fn get_market_chart(&self, coin_id: &str, _days: u32, _c: &str) -> Result<CoinMarketChart, CoreError> {
        let price = self.get_coin(coin_id).await?.current_price;
        Ok(CoinMarketChart {
            prices: vec![(1.7e12, price / 2.0), (1.7e12 + 8.64e7, price)],
            ..Default::default()
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<CoinSearchResult>, CoreError> {
        Ok(self
            .all()
            .into_iter()
            .filter(|c| c.id.contains(query))
            .map(|c| CoinSearchResult {
                id: c.id,
                name: c.name,
                symbol: c.symbol,
                market_cap_rank: None,
                thumb: None,
                large: None,
            })
            .collect())
    }

    async fn trending(&self) -> Result<Vec<TrendingCoin>, CoreError> {
        Ok(Vec::new())
    }

    async fn global(&self) -> Result<GlobalMarketData, CoreError> {
        Ok(GlobalMarketData::default())
    }

    async fn simple_prices(
        &self,
        coin_ids: &[String],
        _currencies: &[String],
    ) -> Result<HashMap<String, HashMap<String, SimplePrice>>, CoreError> {
        let prices = self.prices.lock().unwrap();
        Ok(coin_ids
            .iter()
            .filter_map(|id| {
                let price = *prices.get(id)?;
                let quote = SimplePrice {
                    price,
                    change_24h: None,
                    market_cap: None,
                };
                Some((id.clone(), HashMap::from([("usd".to_string(), quote)])))
            })
            .collect())
    }
}

struct NoNews;

#[async_trait]
impl NewsProvider for NoNews {
    fn name(&self) -> &str {
        "NoNews"
    }

    async fn latest_news(&self, _filter: NewsFilter, _currencies: &[String]) -> Vec<NewsItem> {
        Vec::new()
    }
}

/// Answers "ok" and records how much history each call carried.
struct RecordingLlm {
    configured: bool,
    history_lens: Mutex<Vec<usize>>,
}

impl RecordingLlm {
    fn new(configured: bool) -> Arc<Self> {
        Arc::new(Self {
            configured,
            history_lens: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LanguageModel for RecordingLlm {
    fn name(&self) -> &str {
        "RecordingLlm"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn generate(&self, _prompt: &str, history: &[ChatMessage]) -> Result<String, CoreError> {
        self.history_lens.lock().unwrap().push(history.len());
        Ok("ok".into())
    }

    async fn generate_stream(&self, _prompt: &str, history: &[ChatMessage]) -> Result<TextStream, CoreError> {
        self.history_lens.lock().unwrap().push(history.len());
        Ok(stream::iter(vec![Ok("o".to_string()), Ok("k".to_string())]).boxed())
    }
}

fn assistant_with(market: Arc<MockMarket>, llm: Arc<RecordingLlm>) -> CryptoAssistant {
    let providers = ProviderSet {
        market,
        explorers: Arc::new(ExplorerRegistry::new()),
        news: Arc::new(NoNews),
        llm,
    };
    CryptoAssistant::with_providers(AppState::default(), providers)
}

fn assistant() -> CryptoAssistant {
    assistant_with(MockMarket::new(), RecordingLlm::new(true))
}

fn btc_holding(quantity: f64, purchase_price: f64) -> PortfolioHolding {
    PortfolioHolding::new(
        "bitcoin",
        "btc",
        "Bitcoin",
        quantity,
        purchase_price,
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
    )
}

// ═══════════════════════════════════════════════════════════════════
// Lifecycle & persistence
// ═══════════════════════════════════════════════════════════════════

mod lifecycle {
    use super::*;

    #[test]
    fn fresh_assistant_is_clean() {
        let app = CryptoAssistant::create_new();
        assert!(!app.has_unsaved_changes());
        assert!(app.messages().is_empty());
        assert!(app.portfolio().is_none());
        assert!(app.alerts().is_empty());
        assert!(app.watchlist().is_empty());
        assert_eq!(REFRESH_INTERVAL_SECS, 60);
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut app = assistant();
        app.add_holding(btc_holding(0.5, 40_000.0)).unwrap();
        app.add_to_watchlist("ethereum").unwrap();
        app.add_message(ChatMessage::user("hello"));
        assert!(app.has_unsaved_changes());

        let bytes = app.save_to_bytes("pw").unwrap();
        assert!(!app.has_unsaved_changes());

        let loaded = CryptoAssistant::load_from_bytes(&bytes, "pw").unwrap();
        assert!(!loaded.has_unsaved_changes());
        assert_eq!(loaded.portfolio(), app.portfolio());
        assert_eq!(loaded.watchlist(), ["ethereum"]);
        assert_eq!(loaded.messages().len(), 1);

        assert!(matches!(
            CryptoAssistant::load_from_bytes(&bytes, "wrong"),
            Err(CoreError::Decryption)
        ));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assistant.crai");
        let mut app = assistant();
        app.add_to_watchlist("bitcoin").unwrap();
        app.save_to_file(&path, "pw").unwrap();

        let loaded = CryptoAssistant::load_from_file(&path, "pw").unwrap();
        assert_eq!(loaded.watchlist(), ["bitcoin"]);
    }

    #[test]
    fn change_password_requires_current_one() {
        let mut app = assistant();
        app.add_to_watchlist("bitcoin").unwrap();
        let old = app.save_to_bytes("old").unwrap();

        assert!(app.change_password(&old, "bad", "new").is_err());
        let new = app.change_password(&old, "old", "new").unwrap();
        assert!(CryptoAssistant::load_from_bytes(&new, "old").is_err());
        assert_eq!(
            CryptoAssistant::load_from_bytes(&new, "new").unwrap().watchlist(),
            ["bitcoin"]
        );
    }

    #[test]
    fn api_keys_persist_and_can_be_removed() {
        let mut app = CryptoAssistant::create_new();
        app.set_api_key("cohere", "co-key");
        assert!(app.has_unsaved_changes());
        assert_eq!(app.settings().api_key("cohere"), Some("co-key"));

        assert!(app.remove_api_key("cohere"));
        assert!(!app.remove_api_key("cohere"));
        assert_eq!(app.settings().api_key("cohere"), None);
    }

    #[test]
    fn json_snapshot() {
        let mut app = assistant();
        app.add_to_watchlist("solana").unwrap();
        let json: serde_json::Value = serde_json::from_str(&app.to_json().unwrap()).unwrap();
        assert_eq!(json["watchlist"][0], "solana");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Chat
// ═══════════════════════════════════════════════════════════════════

mod chat {
    use super::*;

    #[tokio::test]
    async fn send_message_records_both_turns() {
        let llm = RecordingLlm::new(true);
        let mut app = assistant_with(MockMarket::new(), llm.clone());

        let reply = app.send_message("What is the price of Bitcoin?").await.unwrap();
        assert_eq!(reply.response, "ok");
        assert_eq!(reply.tool_type, Some(ToolType::Price));

        app.send_message("thanks").await.unwrap();
        let roles: Vec<Role> = app.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, [Role::User, Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(app.messages()[0].content, "What is the price of Bitcoin?");
        // history excludes the turn being asked
        assert_eq!(*llm.history_lens.lock().unwrap(), vec![0, 2]);
    }

    #[tokio::test]
    async fn missing_model_key_leaves_history_untouched() {
        let mut app = assistant_with(MockMarket::new(), RecordingLlm::new(false));
        let err = app.send_message("hi").await.unwrap_err();
        assert!(matches!(err, CoreError::MissingApiKey { .. }));
        assert!(app.messages().is_empty());
        assert!(!app.has_unsaved_changes());
    }

    #[tokio::test]
    async fn streamed_reply_is_recorded_by_caller() {
        let mut app = assistant();
        let text: String = app.stream_message("hi").await.unwrap().collect::<Vec<_>>().await.concat();
        assert_eq!(text, "ok");
        assert_eq!(app.messages().len(), 1);

        app.record_assistant_reply(text);
        assert_eq!(app.messages()[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn portfolio_question_uses_saved_portfolio() {
        let mut app = assistant();
        app.add_holding(btc_holding(1.0, 30_000.0)).unwrap();
        let reply = app.send_message("How is my portfolio doing?").await.unwrap();
        assert_eq!(reply.tool_type, Some(ToolType::Portfolio));
    }

    #[test]
    fn export_and_clear() {
        let mut app = assistant();
        let empty = app.export_conversation(ExportFormat::Json).unwrap();
        let json: serde_json::Value = serde_json::from_str(&empty.content).unwrap();
        assert_eq!(json["messageCount"], 0);
        assert!(empty.filename.ends_with(".json"));

        app.add_message(ChatMessage::user("one"));
        let text = app.export_conversation(ExportFormat::Text).unwrap();
        assert!(text.content.contains("Total Messages: 1"));

        app.clear_messages();
        assert!(app.messages().is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Stores & refresh cycle
// ═══════════════════════════════════════════════════════════════════

mod stores {
    use super::*;

    #[tokio::test]
    async fn refresh_revalues_portfolio() {
        let market = MockMarket::new();
        let mut app = assistant_with(market.clone(), RecordingLlm::new(true));
        let id = app.add_holding(btc_holding(0.5, 40_000.0)).unwrap();

        app.refresh_portfolio_prices().await.unwrap();
        let p = app.portfolio().unwrap();
        assert_eq!(p.total_value, 25_000.0);
        assert_eq!(p.total_profit_loss, 5_000.0);

        market.set_price("bitcoin", 30_000.0);
        app.refresh_portfolio_prices().await.unwrap();
        assert_eq!(app.portfolio().unwrap().total_profit_loss, -5_000.0);

        app.update_holding(
            id,
            HoldingUpdate {
                quantity: Some(2.0),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(app.portfolio().unwrap().total_value, 60_000.0);

        app.remove_holding(id).unwrap();
        assert!(app.portfolio().unwrap().holdings.is_empty());
        app.clear_portfolio();
        assert!(app.portfolio().is_none());
    }

    #[tokio::test]
    async fn refresh_without_portfolio_is_noop() {
        let mut app = assistant();
        app.refresh_portfolio_prices().await.unwrap();
        assert!(app.portfolio().is_none());
    }

    #[tokio::test]
    async fn alert_fires_on_refresh_once() {
        let market = MockMarket::new();
        let mut app = assistant_with(market.clone(), RecordingLlm::new(true));
        market.set_price("bitcoin", 45_000.0);
        app.add_alert(PriceAlert::new("bitcoin", "btc", AlertCondition::Above, 50_000.0, 45_000.0))
            .unwrap();

        assert!(app.refresh_alerts().await.unwrap().is_empty());

        market.set_price("bitcoin", 51_000.0);
        let fired = app.refresh_alerts().await.unwrap();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].title, "Price Alert: BTC");
        assert!(!app.alerts()[0].active);

        assert!(app.refresh_alerts().await.unwrap().is_empty());
    }

    #[test]
    fn alert_crud() {
        let mut app = assistant();
        let id = app
            .add_alert(PriceAlert::new("ethereum", "eth", AlertCondition::Below, 2_000.0, 3_000.0))
            .unwrap();
        app.update_alert(
            id,
            AlertUpdate {
                active: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(!app.alerts()[0].active);
        assert_eq!(app.remove_alert(id).unwrap().coin_id, "ethereum");
        assert!(matches!(app.remove_alert(id), Err(CoreError::AlertNotFound(_))));
    }

    #[test]
    fn watchlist_and_preferences() {
        let mut app = assistant();
        assert!(app.add_to_watchlist("bitcoin").unwrap());
        assert!(!app.add_to_watchlist("bitcoin").unwrap());
        assert!(app.remove_from_watchlist("bitcoin"));
        assert!(!app.remove_from_watchlist("bitcoin"));

        app.update_preferences(PreferencesUpdate {
            theme: Some(Theme::Light),
            risk_profile: Some(RiskProfile::Conservative),
            ..Default::default()
        });
        assert_eq!(app.preferences().theme, Theme::Light);
        assert_eq!(app.chat_context().user_preferences.risk_profile, RiskProfile::Conservative);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Market
// ═══════════════════════════════════════════════════════════════════

mod market {
    use super::*;

    #[tokio::test]
    async fn overview_is_served_from_cache() {
        let market = MockMarket::new();
        let mut app = assistant_with(market.clone(), RecordingLlm::new(true));

        let first = app.market_overview().await.unwrap();
        let second = app.market_overview().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(market.market_calls.load(Ordering::SeqCst), 1);
        assert_eq!(app.cached_coin("bitcoin").unwrap().current_price, 50_000.0);
    }

    #[tokio::test]
    async fn movers_and_dca() {
        let app = assistant();
        let movers = app.top_movers().await.unwrap();
        assert_eq!(movers.gainers[0].id, "bitcoin");

        let result = app
            .calculate_dca(&DcaRequest {
                coin_id: "bitcoin".into(),
                investment_amount: 100.0,
                frequency: DcaFrequency::Monthly,
                duration_months: 1,
            })
            .await
            .unwrap();
        assert_eq!(result.total_invested, 100.0);
        assert_eq!(result.current_value, 200.0);
    }
}
