use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    response::sse::{Event, Sse},
    routing::post,
    Json, Router,
};
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

use crypto_assistant_core::models::chat::ChatContext;
use crypto_assistant_core::services::chat_service::ChatReply;

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::AppContext;

/// Terminates every chat stream.
pub const DONE_MARKER: &str = "[DONE]";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "message_text")]
    pub message: String,
    #[serde(default)]
    pub context: Option<ChatContext>,
}

/// A non-string `message` reads as empty so it fails validation like a missing one.
fn message_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_owned).unwrap_or_default())
}

impl ChatRequest {
    fn validate(&self) -> ApiResult<()> {
        if self.message.trim().is_empty() {
            return Err(ApiError::bad_request("Message is required"));
        }
        Ok(())
    }
}

pub fn router() -> Router<Arc<AppContext>> {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/chat/stream", post(chat_stream))
}

async fn chat(
    State(ctx): State<Arc<AppContext>>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> ApiResult<Json<ChatReply>> {
    request.validate()?;
    let reply = ctx
        .chat
        .reply(&request.message, request.context.as_ref())
        .await?;
    Ok(Json(reply))
}

/// `data: {"chunk":"..."}` per fragment, then `data: [DONE]`.
async fn chat_stream(
    State(ctx): State<Arc<AppContext>>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    request.validate()?;
    let fragments = ctx
        .chat
        .reply_stream(&request.message, request.context.as_ref())
        .await?;

    let events = fragments
        .map(|chunk| Event::default().data(json!({ "chunk": chunk }).to_string()))
        .chain(stream::once(async { Event::default().data(DONE_MARKER) }))
        .map(Ok);
    Ok(Sse::new(events))
}
