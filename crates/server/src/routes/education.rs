use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde::Deserialize;

use crypto_assistant_core::models::education::{EducationalTopic, GlossaryTerm};
use crypto_assistant_core::services::education_service::{EducationService, TopicFilter};

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiQuery;
use crate::{data, AppContext, Data};

#[derive(Debug, Default, Deserialize)]
pub struct TopicQuery {
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub q: Option<String>,
}

impl TopicQuery {
    fn into_filter(self) -> ApiResult<TopicFilter> {
        Ok(TopicFilter {
            category: self
                .category
                .map(|c| c.parse())
                .transpose()
                .map_err(ApiError::bad_request)?,
            difficulty: self
                .difficulty
                .map(|d| d.parse())
                .transpose()
                .map_err(ApiError::bad_request)?,
            query: self.q.filter(|s| !s.trim().is_empty()),
        })
    }
}

pub fn router() -> Router<Arc<AppContext>> {
    Router::new()
        .route("/api/education/topics", get(topics))
        .route("/api/education/glossary", get(glossary))
}

async fn topics(ApiQuery(q): ApiQuery<TopicQuery>) -> ApiResult<Json<Data<Vec<&'static EducationalTopic>>>> {
    let filter = q.into_filter()?;
    Ok(data(EducationService::filter_topics(&filter)))
}

async fn glossary() -> Json<Data<&'static [GlossaryTerm]>> {
    data(EducationService::glossary())
}
