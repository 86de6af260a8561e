use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction in which the price has to cross the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCondition {
    Above,
    Below,
}

impl std::fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertCondition::Above => write!(f, "above"),
            AlertCondition::Below => write!(f, "below"),
        }
    }
}

impl AlertCondition {
    /// Whether `price` satisfies this condition for `target` (inclusive).
    pub fn is_met(self, price: f64, target: f64) -> bool {
        match self {
            AlertCondition::Above => price >= target,
            AlertCondition::Below => price <= target,
        }
    }
}

/// A user-defined price alert.
///
/// Deactivated in place once triggered; removal is always a user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAlert {
    pub id: Uuid,
    pub coin_id: String,
    pub symbol: String,
    pub condition: AlertCondition,
    pub target_price: f64,
    /// Last price observed for `coin_id`
    pub current_price: f64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl PriceAlert {
    pub fn new(
        coin_id: impl Into<String>,
        symbol: impl Into<String>,
        condition: AlertCondition,
        target_price: f64,
        current_price: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            coin_id: coin_id.into(),
            symbol: symbol.into(),
            condition,
            target_price,
            current_price,
            active: true,
            created_at: Utc::now(),
        }
    }
}

/// An alert that fired during a price check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggeredAlert {
    pub alert_id: Uuid,
    pub symbol: String,
    pub condition: AlertCondition,
    pub target_price: f64,
    pub price: f64,
    /// Notification title, e.g. "Price Alert: BTC"
    pub title: String,
    /// Notification body
    pub message: String,
}
