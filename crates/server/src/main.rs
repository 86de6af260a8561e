use std::sync::Arc;

use anyhow::Context;

use crypto_assistant_server::config::{DotenvStatus, ServerConfig};
use crypto_assistant_server::{build_router, logging, AppContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = DotenvStatus::load();
    logging::init();
    dotenv.log();
    let config = ServerConfig::from_env();
    tracing::info!(?config, "starting crypto assistant server");

    let ctx = Arc::new(AppContext::new(config.providers()));
    if !ctx.chat.is_configured() {
        tracing::warn!("COHERE_API_KEY not set: chat routes will answer 500");
    }

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("listening on http://{}", config.bind_addr);

    axum::serve(listener, build_router(ctx))
        .await
        .context("server error")?;
    Ok(())
}
