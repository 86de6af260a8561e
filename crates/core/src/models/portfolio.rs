use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default id/name of the portfolio created on the first holding.
pub const DEFAULT_PORTFOLIO_ID: &str = "default";
pub const DEFAULT_PORTFOLIO_NAME: &str = "My Portfolio";

/// One position in the portfolio.
///
/// `current_price` stays `None` until the first price refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioHolding {
    pub id: Uuid,

    /// Market-data id (e.g. "bitcoin"), used to look prices up
    pub coin_id: String,

    pub symbol: String,

    pub name: String,

    /// Units held (always positive)
    pub quantity: f64,

    /// Price paid per unit, in USD
    pub purchase_price: f64,

    pub purchase_date: NaiveDate,

    #[serde(default)]
    pub current_price: Option<f64>,
}

impl PortfolioHolding {
    pub fn new(
        coin_id: impl Into<String>,
        symbol: impl Into<String>,
        name: impl Into<String>,
        quantity: f64,
        purchase_price: f64,
        purchase_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            coin_id: coin_id.into(),
            symbol: symbol.into(),
            name: name.into(),
            quantity,
            purchase_price,
            purchase_date,
            current_price: None,
        }
    }

    /// Amount paid for this holding.
    pub fn cost(&self) -> f64 {
        self.purchase_price * self.quantity
    }

    /// Market value at the last known price; unpriced holdings count as zero.
    pub fn value(&self) -> f64 {
        self.current_price.unwrap_or(0.0) * self.quantity
    }

    pub fn profit_loss(&self) -> f64 {
        self.value() - self.cost()
    }
}

/// The user's holdings plus derived totals.
///
/// Totals are never edited directly: `PortfolioService` recomputes them
/// with a fold over `holdings` after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub name: String,
    pub holdings: Vec<PortfolioHolding>,
    pub total_value: f64,
    pub total_cost: f64,
    pub total_profit_loss: f64,
    pub total_profit_loss_percentage: f64,
    pub last_updated: DateTime<Utc>,
}

impl Default for Portfolio {
    fn default() -> Self {
        Self {
            id: DEFAULT_PORTFOLIO_ID.to_string(),
            name: DEFAULT_PORTFOLIO_NAME.to_string(),
            holdings: Vec::new(),
            total_value: 0.0,
            total_cost: 0.0,
            total_profit_loss: 0.0,
            total_profit_loss_percentage: 0.0,
            last_updated: Utc::now(),
        }
    }
}

impl Portfolio {
    /// Distinct coin ids held, in first-seen order.
    pub fn coin_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for holding in &self.holdings {
            if !ids.contains(&holding.coin_id) {
                ids.push(holding.coin_id.clone());
            }
        }
        ids
    }
}
