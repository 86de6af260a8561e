use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::portfolio::{Portfolio, PortfolioHolding};

/// Partial edit of a holding. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingUpdate {
    pub quantity: Option<f64>,
    pub purchase_price: Option<f64>,
    pub purchase_date: Option<NaiveDate>,
    pub current_price: Option<f64>,
}

/// Manages portfolio holdings and keeps the derived totals consistent.
///
/// Pure business logic: no I/O, no API calls.
///
/// The portfolio is `None` until the first holding is added; the first
/// `add_holding` creates the default portfolio.
pub struct PortfolioService;

impl PortfolioService {
    pub fn new() -> Self {
        Self
    }

    /// Add a holding, creating the default portfolio if there is none yet.
    pub fn add_holding(
        &self,
        portfolio: &mut Option<Portfolio>,
        holding: PortfolioHolding,
    ) -> Result<(), CoreError> {
        Self::validate_holding(&holding)?;
        let portfolio = portfolio.get_or_insert_with(Portfolio::default);
        portfolio.holdings.push(holding);
        Self::recalculate(portfolio);
        Ok(())
    }

    /// Remove a holding by id and return it.
    pub fn remove_holding(
        &self,
        portfolio: &mut Option<Portfolio>,
        holding_id: Uuid,
    ) -> Result<PortfolioHolding, CoreError> {
        let not_found = || CoreError::HoldingNotFound(holding_id.to_string());
        let portfolio = portfolio.as_mut().ok_or_else(not_found)?;
        let idx = portfolio
            .holdings
            .iter()
            .position(|h| h.id == holding_id)
            .ok_or_else(not_found)?;

        let removed = portfolio.holdings.remove(idx);
        Self::recalculate(portfolio);
        Ok(removed)
    }

    /// Apply a partial update. Validates the merged holding before committing.
    pub fn update_holding(
        &self,
        portfolio: &mut Option<Portfolio>,
        holding_id: Uuid,
        update: HoldingUpdate,
    ) -> Result<(), CoreError> {
        let not_found = || CoreError::HoldingNotFound(holding_id.to_string());
        let portfolio = portfolio.as_mut().ok_or_else(not_found)?;
        let holding = portfolio
            .holdings
            .iter_mut()
            .find(|h| h.id == holding_id)
            .ok_or_else(not_found)?;

        let mut merged = holding.clone();
        if let Some(quantity) = update.quantity {
            merged.quantity = quantity;
        }
        if let Some(price) = update.purchase_price {
            merged.purchase_price = price;
        }
        if let Some(date) = update.purchase_date {
            merged.purchase_date = date;
        }
        if let Some(price) = update.current_price {
            merged.current_price = Some(price);
        }
        Self::validate_holding(&merged)?;

        *holding = merged;
        Self::recalculate(portfolio);
        Ok(())
    }

    /// Set `current_price` of every holding from `prices` (coin id → USD).
    ///
    /// Holdings whose coin is missing from `prices`, or quoted at a
    /// non-positive price, keep their previous price. No-op without a portfolio.
    pub fn update_portfolio_values(
        &self,
        portfolio: &mut Option<Portfolio>,
        prices: &HashMap<String, f64>,
    ) {
        let Some(portfolio) = portfolio.as_mut() else {
            return;
        };
        for holding in &mut portfolio.holdings {
            if let Some(&price) = prices.get(&holding.coin_id) {
                if price.is_finite() && price > 0.0 {
                    holding.current_price = Some(price);
                }
            }
        }
        Self::recalculate(portfolio);
    }

    pub fn clear_portfolio(&self, portfolio: &mut Option<Portfolio>) {
        *portfolio = None;
    }

    /// Recompute the totals from the holdings and stamp `last_updated`.
    pub fn recalculate(portfolio: &mut Portfolio) {
        let (total_value, total_cost) = portfolio
            .holdings
            .iter()
            .fold((0.0, 0.0), |(value, cost), h| (value + h.value(), cost + h.cost()));

        portfolio.total_value = total_value;
        portfolio.total_cost = total_cost;
        portfolio.total_profit_loss = total_value - total_cost;
        portfolio.total_profit_loss_percentage = if total_cost > 0.0 {
            portfolio.total_profit_loss / total_cost * 100.0
        } else {
            0.0
        };
        portfolio.last_updated = Utc::now();
    }

    fn validate_holding(holding: &PortfolioHolding) -> Result<(), CoreError> {
        if holding.coin_id.trim().is_empty() {
            return Err(CoreError::ValidationError("Coin id must not be empty".into()));
        }
        if !holding.quantity.is_finite() || holding.quantity <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Quantity must be positive, got {}",
                holding.quantity
            )));
        }
        if !holding.purchase_price.is_finite() || holding.purchase_price < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Purchase price must be a non-negative number, got {}",
                holding.purchase_price
            )));
        }
        if let Some(price) = holding.current_price {
            if !price.is_finite() || price < 0.0 {
                return Err(CoreError::ValidationError(format!(
                    "Current price must be a non-negative number, got {price}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for PortfolioService {
    fn default() -> Self {
        Self::new()
    }
}
