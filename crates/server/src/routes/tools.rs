use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};

use crypto_assistant_core::models::dca::{DcaRequest, DcaResult};
use crypto_assistant_core::services::dca_service::DcaService;

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::{data, AppContext, Data};

pub fn router() -> Router<Arc<AppContext>> {
    Router::new().route("/api/tools/dca", post(dca))
}

async fn dca(
    State(ctx): State<Arc<AppContext>>,
    ApiJson(request): ApiJson<DcaRequest>,
) -> ApiResult<Json<Data<DcaResult>>> {
    let result = DcaService::calculate(ctx.providers.market.as_ref(), &request).await?;
    Ok(data(result))
}
