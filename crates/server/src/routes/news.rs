use std::sync::Arc;

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crypto_assistant_core::models::news::{NewsFilter, NewsItem};

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiQuery;
use crate::{data, AppContext, Data};

#[derive(Debug, Default, Deserialize)]
pub struct NewsQuery {
    pub filter: Option<String>,
    /// Comma separated tickers, e.g. `BTC,ETH`
    pub currencies: Option<String>,
}

pub fn router() -> Router<Arc<AppContext>> {
    Router::new().route("/api/news", get(news))
}

async fn news(
    State(ctx): State<Arc<AppContext>>,
    ApiQuery(q): ApiQuery<NewsQuery>,
) -> ApiResult<Json<Data<Vec<NewsItem>>>> {
    let filter = match q.filter.as_deref() {
        None | Some("") => NewsFilter::All,
        Some(name) => name.parse().map_err(ApiError::bad_request)?,
    };
    let currencies: Vec<String> = q
        .currencies
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    Ok(data(ctx.providers.news.latest_news(filter, &currencies).await))
}
