use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crypto_assistant_core::models::coin::{
    CoinData, CoinMarketChart, CoinSearchResult, GlobalMarketData, TrendingCoin,
};

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiQuery;
use crate::{data, AppContext, Data};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketQuery {
    pub currency: String,
    pub per_page: u32,
    pub page: u32,
}

impl Default for MarketQuery {
    fn default() -> Self {
        Self {
            currency: "usd".into(),
            per_page: 100,
            page: 1,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ChartQuery {
    pub days: u32,
    pub currency: String,
}

impl Default for ChartQuery {
    fn default() -> Self {
        Self {
            days: 7,
            currency: "usd".into(),
        }
    }
}

pub fn router() -> Router<Arc<AppContext>> {
    // static segments take priority over `{coin_id}`
    Router::new()
        .route("/api/market", get(markets))
        .route("/api/market/search", get(search))
        .route("/api/market/trending", get(trending))
        .route("/api/market/global", get(global))
        .route("/api/market/{coin_id}", get(coin))
        .route("/api/market/{coin_id}/chart", get(chart))
}

async fn markets(
    State(ctx): State<Arc<AppContext>>,
    ApiQuery(q): ApiQuery<MarketQuery>,
) -> ApiResult<Json<Data<Vec<CoinData>>>> {
    let coins = ctx.market.get_markets(&q.currency, q.per_page, q.page).await?;
    Ok(data(coins))
}

async fn search(
    State(ctx): State<Arc<AppContext>>,
    ApiQuery(q): ApiQuery<SearchQuery>,
) -> ApiResult<Json<Data<Vec<CoinSearchResult>>>> {
    let query = q
        .q
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Search query is required"))?;
    Ok(data(ctx.market.search(&query).await?))
}

async fn trending(State(ctx): State<Arc<AppContext>>) -> ApiResult<Json<Data<Vec<TrendingCoin>>>> {
    Ok(data(ctx.market.trending().await?))
}

async fn global(State(ctx): State<Arc<AppContext>>) -> ApiResult<Json<Data<GlobalMarketData>>> {
    Ok(data(ctx.market.global().await?))
}

async fn coin(
    State(ctx): State<Arc<AppContext>>,
    Path(coin_id): Path<String>,
) -> ApiResult<Json<Data<CoinData>>> {
    Ok(data(ctx.market.get_coin(&coin_id).await?))
}

async fn chart(
    State(ctx): State<Arc<AppContext>>,
    Path(coin_id): Path<String>,
    ApiQuery(q): ApiQuery<ChartQuery>,
) -> ApiResult<Json<Data<CoinMarketChart>>> {
    let chart = ctx.market.get_market_chart(&coin_id, q.days, &q.currency).await?;
    Ok(data(chart))
}
