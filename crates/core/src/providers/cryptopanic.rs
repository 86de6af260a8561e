use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;

use super::http::ensure_success;
use super::traits::NewsProvider;
use crate::errors::CoreError;
use crate::models::news::{NewsFilter, NewsItem, Sentiment};

pub const BASE_URL: &str = "https://cryptopanic.com/api/v1";
const PROVIDER: &str = "CryptoPanic";
const REQUEST_TIMEOUT_SECS: u64 = 5;

/// CryptoPanic news aggregator.
///
/// Never fails: without an `auth_token`, or when the API is unreachable,
/// [`CryptoPanicProvider::fallback_news`] is served instead.
pub struct CryptoPanicProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CryptoPanicProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    async fn fetch_posts(
        &self,
        api_key: &str,
        filter: NewsFilter,
        currencies: &[String],
    ) -> Result<Vec<NewsItem>, CoreError> {
        let mut query = vec![
            ("auth_token", api_key.to_string()),
            ("filter", filter.as_str().to_string()),
        ];
        if !currencies.is_empty() {
            query.push(("currencies", currencies.join(",")));
        }

        let resp = self
            .client
            .get(format!("{}/posts/", self.base_url))
            .query(&query)
            .send()
            .await?;
        let posts: PostsResponse = ensure_success(resp, PROVIDER)
            .await?
            .json()
            .await
            .map_err(|e| CoreError::api(PROVIDER, format!("Failed to parse posts: {e}")))?;

        Ok(posts.results.into_iter().map(RawPost::into_item).collect())
    }

    /// Five canned headlines, newest first, one hour apart.
    pub fn fallback_news() -> Vec<NewsItem> {
        let now = Utc::now();
        let item = |id: &str,
                    title: &str,
                    description: &str,
                    source: &str,
                    hours_ago: i64,
                    sentiment: Sentiment,
                    coins: &[&str]| NewsItem {
            id: id.to_string(),
            title: title.to_string(),
            description: Some(description.to_string()),
            url: "#".to_string(),
            source: source.to_string(),
            published_at: now - Duration::hours(hours_ago),
            sentiment: Some(sentiment),
            coins: coins.iter().map(|c| c.to_string()).collect(),
        };

        vec![
            item(
                "1",
                "Bitcoin Reaches New All-Time High",
                "Bitcoin surpasses previous records amid institutional adoption",
                "CryptoNews",
                0,
                Sentiment::Positive,
                &["BTC"],
            ),
            item(
                "2",
                "Ethereum 2.0 Upgrade Shows Promising Results",
                "Network efficiency improves following latest upgrade",
                "CoinDesk",
                1,
                Sentiment::Positive,
                &["ETH"],
            ),
            item(
                "3",
                "Regulatory Updates Impact Crypto Markets",
                "New regulations announced in major markets",
                "Bloomberg Crypto",
                2,
                Sentiment::Neutral,
                &["BTC", "ETH"],
            ),
            item(
                "4",
                "DeFi Protocol Launches New Features",
                "Popular DeFi platform introduces innovative staking options",
                "DeFi Pulse",
                3,
                Sentiment::Positive,
                &["ETH"],
            ),
            item(
                "5",
                "Market Analysis: Altcoin Season Approaching?",
                "Analysts predict potential altcoin rally based on market indicators",
                "CryptoSlate",
                4,
                Sentiment::Neutral,
                &["BTC", "ETH", "SOL"],
            ),
        ]
    }
}

impl Default for CryptoPanicProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

// ── CryptoPanic API response types ──────────────────────────────────

#[derive(Deserialize)]
struct PostsResponse {
    #[serde(default)]
    results: Vec<RawPost>,
}

#[derive(Deserialize)]
struct RawPost {
    /// Numeric upstream
    id: serde_json::Value,
    title: String,
    #[serde(default)]
    url: String,
    source: Option<RawSource>,
    published_at: DateTime<Utc>,
    #[serde(default)]
    currencies: Vec<RawCurrency>,
}

#[derive(Deserialize)]
struct RawSource {
    title: String,
}

#[derive(Deserialize)]
struct RawCurrency {
    code: String,
}

impl RawPost {
    fn into_item(self) -> NewsItem {
        let id = match self.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        NewsItem {
            id,
            title: self.title,
            description: None,
            url: self.url,
            source: self.source.map(|s| s.title).unwrap_or_default(),
            published_at: self.published_at,
            sentiment: None,
            coins: self.currencies.into_iter().map(|c| c.code).collect(),
        }
    }
}

#[async_trait]
impl NewsProvider for CryptoPanicProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn latest_news(&self, filter: NewsFilter, currencies: &[String]) -> Vec<NewsItem> {
        let Some(api_key) = &self.api_key else {
            tracing::info!("No CryptoPanic API key configured, serving fallback news");
            return Self::fallback_news();
        };

        match self.fetch_posts(api_key, filter, currencies).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("CryptoPanic unavailable, serving fallback news: {e}");
                Self::fallback_news()
            }
        }
    }
}
