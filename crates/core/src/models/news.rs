use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Feed selector understood by the news aggregator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsFilter {
    Rising,
    Hot,
    Bullish,
    Bearish,
    Important,
    #[default]
    All,
}

impl NewsFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsFilter::Rising => "rising",
            NewsFilter::Hot => "hot",
            NewsFilter::Bullish => "bullish",
            NewsFilter::Bearish => "bearish",
            NewsFilter::Important => "important",
            NewsFilter::All => "all",
        }
    }
}

impl std::str::FromStr for NewsFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rising" => Ok(NewsFilter::Rising),
            "hot" => Ok(NewsFilter::Hot),
            "bullish" => Ok(NewsFilter::Bullish),
            "bearish" => Ok(NewsFilter::Bearish),
            "important" => Ok(NewsFilter::Important),
            "all" => Ok(NewsFilter::All),
            other => Err(format!("Unknown news filter: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub coins: Vec<String>,
}

/// Result of asking the language model to classify an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub sentiment: Sentiment,
    pub summary: String,
}
