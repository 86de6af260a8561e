use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::alert::{AlertCondition, PriceAlert, TriggeredAlert};
use crate::services::chat_tools::format_usd;

/// Partial edit of an alert. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertUpdate {
    pub condition: Option<AlertCondition>,
    pub target_price: Option<f64>,
    pub current_price: Option<f64>,
    pub active: Option<bool>,
}

/// Price alerts: CRUD plus the trigger check run on every price refresh.
pub struct AlertService;

impl AlertService {
    pub fn new() -> Self {
        Self
    }

    pub fn add_alert(&self, alerts: &mut Vec<PriceAlert>, alert: PriceAlert) -> Result<(), CoreError> {
        Self::validate_target(alert.target_price)?;
        alerts.push(alert);
        Ok(())
    }

    pub fn remove_alert(
        &self,
        alerts: &mut Vec<PriceAlert>,
        alert_id: Uuid,
    ) -> Result<PriceAlert, CoreError> {
        let idx = alerts
            .iter()
            .position(|a| a.id == alert_id)
            .ok_or_else(|| CoreError::AlertNotFound(alert_id.to_string()))?;
        Ok(alerts.remove(idx))
    }

    pub fn update_alert(
        &self,
        alerts: &mut [PriceAlert],
        alert_id: Uuid,
        update: AlertUpdate,
    ) -> Result<(), CoreError> {
        let alert = alerts
            .iter_mut()
            .find(|a| a.id == alert_id)
            .ok_or_else(|| CoreError::AlertNotFound(alert_id.to_string()))?;

        if let Some(target) = update.target_price {
            Self::validate_target(target)?;
            alert.target_price = target;
        }
        if let Some(condition) = update.condition {
            alert.condition = condition;
        }
        if let Some(price) = update.current_price {
            alert.current_price = price;
        }
        if let Some(active) = update.active {
            alert.active = active;
        }
        Ok(())
    }

    /// Compare every active alert with `prices` (coin id → USD).
    ///
    /// Records the observed price on each alert that has a quote. Alerts
    /// whose condition is met are deactivated in place and reported;
    /// inactive alerts are never re-triggered.
    pub fn check_alerts(
        &self,
        alerts: &mut [PriceAlert],
        prices: &HashMap<String, f64>,
    ) -> Vec<TriggeredAlert> {
        let mut triggered = Vec::new();

        for alert in alerts.iter_mut().filter(|a| a.active) {
            let Some(&price) = prices.get(&alert.coin_id) else {
                continue;
            };
            alert.current_price = price;

            if alert.condition.is_met(price, alert.target_price) {
                alert.active = false;
                tracing::info!(
                    symbol = %alert.symbol,
                    condition = %alert.condition,
                    target = alert.target_price,
                    price,
                    "price alert triggered"
                );
                triggered.push(Self::notification(alert, price));
            }
        }

        triggered
    }

    fn notification(alert: &PriceAlert, price: f64) -> TriggeredAlert {
        let symbol = alert.symbol.to_uppercase();
        TriggeredAlert {
            alert_id: alert.id,
            symbol: symbol.clone(),
            condition: alert.condition,
            target_price: alert.target_price,
            price,
            title: format!("Price Alert: {symbol}"),
            message: format!(
                "{symbol} is now {} {}. Current price: {}",
                alert.condition,
                format_usd(alert.target_price),
                format_usd(price)
            ),
        }
    }

    fn validate_target(target: f64) -> Result<(), CoreError> {
        if !target.is_finite() || target <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Target price must be positive, got {target}"
            )));
        }
        Ok(())
    }
}

impl Default for AlertService {
    fn default() -> Self {
        Self::new()
    }
}
