use reqwest::{Response, StatusCode};

use crate::errors::{redact_query, CoreError};

/// Turn a non-2xx upstream response into the matching `CoreError`.
///
/// 429 and 401/403 get their own variants so callers can pick a canned
/// message; everything else keeps the status and a bounded body excerpt.
pub(crate) async fn ensure_success(resp: Response, provider: &str) -> Result<Response, CoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let excerpt: String = body.chars().take(200).collect();
    tracing::warn!(provider, %status, "upstream call failed: {excerpt}");

    Err(match status {
        StatusCode::TOO_MANY_REQUESTS => CoreError::RateLimited(provider.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            CoreError::Unauthorized(provider.to_string())
        }
        _ => CoreError::api(provider, format!("HTTP {status}: {}", redact_query(&excerpt))),
    })
}
