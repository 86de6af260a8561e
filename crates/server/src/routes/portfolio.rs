use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;

use crypto_assistant_core::models::alert::{PriceAlert, TriggeredAlert};
use crypto_assistant_core::models::portfolio::Portfolio;
use crypto_assistant_core::services::alert_service::AlertService;
use crypto_assistant_core::services::portfolio_service::PortfolioService;

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::{data, AppContext, Data};

#[derive(Debug, Serialize)]
pub struct AlertCheck {
    /// The submitted alerts, with current prices and `active` updated
    pub alerts: Vec<PriceAlert>,
    pub triggered: Vec<TriggeredAlert>,
}

pub fn router() -> Router<Arc<AppContext>> {
    Router::new()
        .route("/api/portfolio/revalue", post(revalue))
        .route("/api/alerts/check", post(check_alerts))
}

/// Price every holding at the current USD quote and recompute the totals.
async fn revalue(
    State(ctx): State<Arc<AppContext>>,
    ApiJson(portfolio): ApiJson<Portfolio>,
) -> ApiResult<Json<Data<Portfolio>>> {
    let prices = ctx.market.usd_prices(&portfolio.coin_ids()).await?;
    let mut portfolio = Some(portfolio);
    PortfolioService::new().update_portfolio_values(&mut portfolio, &prices);
    Ok(data(portfolio.unwrap_or_default()))
}

async fn check_alerts(
    State(ctx): State<Arc<AppContext>>,
    ApiJson(mut alerts): ApiJson<Vec<PriceAlert>>,
) -> ApiResult<Json<Data<AlertCheck>>> {
    let mut coin_ids: Vec<String> = Vec::new();
    for alert in alerts.iter().filter(|a| a.active) {
        if !coin_ids.contains(&alert.coin_id) {
            coin_ids.push(alert.coin_id.clone());
        }
    }
    let prices = ctx.market.usd_prices(&coin_ids).await?;
    let triggered = AlertService::new().check_alerts(&mut alerts, &prices);
    Ok(data(AlertCheck { alerts, triggered }))
}
