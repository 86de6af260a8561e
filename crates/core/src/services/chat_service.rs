use futures::stream::{self, BoxStream, StreamExt};
use serde::Serialize;
use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::chat::{ChatContext, ChatMessage};
use crate::models::education::{Difficulty, EducationalTopic};
use crate::models::news::{Sentiment, SentimentAnalysis};
use crate::models::portfolio::Portfolio;
use crate::models::preferences::RiskProfile;
use crate::providers::cohere::SIGNUP_URL;
use crate::providers::traits::LanguageModel;

use super::chat_tools::{ChatTools, ToolData, ToolType};
use super::education_service::EducationService;

pub const RATE_LIMIT_REPLY: &str =
    "I'm currently experiencing high demand. Please try again in a moment.";
pub const AUTH_REPLY: &str =
    "I'm having trouble connecting to the AI service. Please verify your Cohere API key is valid.";
pub const GENERIC_REPLY: &str =
    "I encountered an error processing your request. Please try again.";

/// A complete (non-streamed) assistant answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub response: String,
    pub tool_data: Option<ToolData>,
    pub tool_type: Option<ToolType>,
}

/// Canned user-facing text for a failed model call.
pub fn fallback_reply(error: &CoreError, streamed: bool) -> String {
    if error.is_rate_limited() {
        RATE_LIMIT_REPLY.to_string()
    } else if error.is_unauthorized() {
        if streamed {
            format!("{AUTH_REPLY} Get a free key at: {SIGNUP_URL}")
        } else {
            AUTH_REPLY.to_string()
        }
    } else {
        GENERIC_REPLY.to_string()
    }
}

/// Chat pipeline: route the message through [`ChatTools`], then hand the
/// (possibly enhanced) prompt and the prior conversation to the model.
///
/// Only a missing model key is reported as an error. Every other upstream
/// failure becomes one of the canned replies above.
pub struct ChatService {
    tools: ChatTools,
    llm: Arc<dyn LanguageModel>,
}

impl ChatService {
    pub fn new(tools: ChatTools, llm: Arc<dyn LanguageModel>) -> Self {
        Self { tools, llm }
    }

    pub fn is_configured(&self) -> bool {
        self.llm.is_configured()
    }

    fn ensure_configured(&self) -> Result<(), CoreError> {
        if self.llm.is_configured() {
            Ok(())
        } else {
            Err(CoreError::MissingApiKey {
                provider: self.llm.name().to_string(),
                signup_url: SIGNUP_URL.to_string(),
            })
        }
    }

    pub async fn reply(
        &self,
        message: &str,
        context: Option<&ChatContext>,
    ) -> Result<ChatReply, CoreError> {
        self.ensure_configured()?;

        let outcome = self.tools.process_user_message(message, context).await;
        let history = history_of(context);

        let response = match self.llm.generate(&outcome.enhanced_message, history).await {
            Ok(text) => text,
            Err(e @ CoreError::MissingApiKey { .. }) => return Err(e),
            Err(e) => {
                tracing::error!("language model call failed: {e}");
                fallback_reply(&e, false)
            }
        };

        Ok(ChatReply {
            response,
            tool_data: outcome.tool_data,
            tool_type: outcome.tool_type,
        })
    }

    /// Stream the answer as it is generated.
    ///
    /// Fragments arrive in order. A failure, before the first fragment or in
    /// the middle, yields a single apology fragment and ends the stream.
    /// Dropping the returned stream stops reading from the model.
    pub async fn reply_stream(
        &self,
        message: &str,
        context: Option<&ChatContext>,
    ) -> Result<BoxStream<'static, String>, CoreError> {
        self.ensure_configured()?;

        let outcome = self.tools.process_user_message(message, context).await;
        let history = history_of(context);

        let upstream = match self.llm.generate_stream(&outcome.enhanced_message, history).await {
            Ok(upstream) => upstream,
            Err(e @ CoreError::MissingApiKey { .. }) => return Err(e),
            Err(e) => {
                tracing::error!("language model stream failed to start: {e}");
                return Ok(stream::once(async move { fallback_reply(&e, true) }).boxed());
            }
        };

        let fragments = stream::unfold(Some(upstream), |state| async move {
            let mut upstream = state?;
            match upstream.next().await {
                Some(Ok(text)) => Some((text, Some(upstream))),
                Some(Err(e)) => {
                    tracing::error!("language model stream broke off: {e}");
                    Some((fallback_reply(&e, true), None))
                }
                None => None,
            }
        });
        Ok(fragments.boxed())
    }

    /// Short explanation of a crypto concept at the given level.
    pub async fn explain_concept(
        &self,
        concept: &str,
        difficulty: Difficulty,
    ) -> Result<String, CoreError> {
        let prompt = format!(
            "Explain the cryptocurrency concept \"{concept}\" at a {difficulty} level.\n\n\
             Keep it concise (2-3 paragraphs), use clear language, and include a practical example if relevant."
        );
        self.llm.generate(&prompt, &[]).await
    }

    /// Lesson text for one entry of the educational catalog.
    pub async fn explain_topic(&self, topic: &EducationalTopic) -> Result<String, CoreError> {
        self.llm
            .generate(&EducationService::topic_prompt(topic), &[])
            .await
    }

    /// Classify a news article. Never fails; falls back to neutral.
    pub async fn analyze_news_sentiment(&self, title: &str, content: &str) -> SentimentAnalysis {
        let prompt = format!(
            "Analyze the sentiment of this crypto news article and provide a brief summary:\n\n\
             Title: {title}\n\
             Content: {content}\n\n\
             Respond in JSON format:\n\
             {{\n  \"sentiment\": \"positive\" | \"negative\" | \"neutral\",\n  \"summary\": \"Brief 1-2 sentence summary\"\n}}"
        );

        let text = match self.llm.generate(&prompt, &[]).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("sentiment analysis failed: {e}");
                return neutral("Sentiment analysis unavailable");
            }
        };

        let Some(json) = first_json_object(&text) else {
            return neutral("Unable to analyze sentiment");
        };
        serde_json::from_str(json).unwrap_or_else(|e| {
            tracing::warn!("unparseable sentiment JSON: {e}");
            neutral("Sentiment analysis unavailable")
        })
    }

    /// Educational diversification/risk commentary on a portfolio.
    pub async fn investment_insights(
        &self,
        portfolio: &Portfolio,
        risk_profile: RiskProfile,
    ) -> Result<String, CoreError> {
        let data = serde_json::to_string_pretty(portfolio)?;
        let prompt = format!(
            "Based on this portfolio data and {risk_profile} risk profile, provide educational insights about diversification and risk management:\n\n\
             {data}\n\n\
             Focus on:\n\
             1. Portfolio diversification analysis\n\
             2. Risk assessment\n\
             3. Educational suggestions for improvement\n\
             4. General market considerations\n\n\
             Remember: This is educational content, not financial advice."
        );
        self.llm.generate(&prompt, &[]).await
    }
}

fn history_of(context: Option<&ChatContext>) -> &[ChatMessage] {
    context.map(|c| c.messages.as_slice()).unwrap_or(&[])
}

fn neutral(summary: &str) -> SentimentAnalysis {
    SentimentAnalysis {
        sentiment: Sentiment::Neutral,
        summary: summary.to_string(),
    }
}

/// Outermost `{...}` span of `text`, if any.
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
