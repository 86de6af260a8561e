pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crypto_assistant_core::providers::registry::ProviderSet;
use crypto_assistant_core::services::chat_service::ChatService;
use crypto_assistant_core::services::chat_tools::ChatTools;
use crypto_assistant_core::services::market_service::MarketService;

/// Shared by every handler. The server keeps no per-user state: portfolios,
/// alerts and history travel in the request bodies.
pub struct AppContext {
    pub providers: ProviderSet,
    pub chat: ChatService,
    pub market: MarketService,
}

impl AppContext {
    pub fn new(providers: ProviderSet) -> Self {
        let tools = ChatTools::new(
            providers.market.clone(),
            providers.explorers.clone(),
            providers.news.clone(),
        );
        Self {
            chat: ChatService::new(tools, providers.llm.clone()),
            market: MarketService::new(providers.market.clone()),
            providers,
        }
    }
}

/// Success envelope `{ "data": ... }`.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

pub fn data<T>(value: T) -> axum::Json<Data<T>> {
    axum::Json(Data { data: value })
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::chat::router())
        .merge(routes::market::router())
        .merge(routes::blockchain::router())
        .merge(routes::news::router())
        .merge(routes::portfolio::router())
        .merge(routes::tools::router())
        .merge(routes::education::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
