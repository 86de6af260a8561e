use async_trait::async_trait;
use futures::Stream;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};

use super::http::ensure_success;
use super::traits::{LanguageModel, TextStream};
use crate::errors::CoreError;
use crate::models::chat::{ChatMessage, Role};

pub const BASE_URL: &str = "https://api.cohere.com";
pub const MODEL: &str = "command-r7b-12-2024";
pub const SIGNUP_URL: &str = "https://dashboard.cohere.com/api-keys";
const PROVIDER: &str = "Cohere";
const TEMPERATURE: f64 = 0.7;

/// System prompt sent with every chat request.
pub const CRYPTO_PREAMBLE: &str = "You are CryptoAI, an expert cryptocurrency and blockchain assistant. You provide accurate, helpful information about:
- Cryptocurrency prices, market data, and trends
- Blockchain technology and how it works
- DeFi (Decentralized Finance) concepts and protocols
- NFTs and digital assets
- Trading strategies and technical analysis
- Wallet security and best practices
- Crypto news and market sentiment

Important guidelines:
- Always provide educational, informative responses
- Never give specific financial advice or tell users to buy/sell specific assets
- Include disclaimers when discussing investments
- Explain complex concepts in simple terms
- Be helpful, friendly, and professional
- If you don't know something, admit it rather than guessing
- Focus on facts and avoid speculation

Remember: You are an educational assistant, not a financial advisor.";

/// Cohere chat API (`/v1/chat`), blocking and streamed.
pub struct CohereClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CohereClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    fn api_key(&self) -> Result<&str, CoreError> {
        self.api_key.as_deref().ok_or_else(|| CoreError::MissingApiKey {
            provider: PROVIDER.to_string(),
            signup_url: SIGNUP_URL.to_string(),
        })
    }

    async fn send(
        &self,
        prompt: &str,
        history: &[ChatMessage],
        stream: bool,
    ) -> Result<reqwest::Response, CoreError> {
        let api_key = self.api_key()?;
        let body = ChatRequest {
            model: MODEL,
            message: prompt,
            chat_history: build_history(history),
            temperature: TEMPERATURE,
            preamble: CRYPTO_PREAMBLE,
            stream,
        };

        tracing::debug!(
            provider = PROVIDER,
            history = body.chat_history.len(),
            stream,
            "sending chat request"
        );
        let resp = self
            .client
            .post(format!("{}/v1/chat", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        ensure_success(resp, PROVIDER).await
    }
}

// ── Cohere API request/response types ───────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    message: &'a str,
    chat_history: Vec<HistoryTurn<'a>>,
    temperature: f64,
    preamble: &'a str,
    stream: bool,
}

#[derive(Debug, PartialEq, Serialize)]
struct HistoryTurn<'a> {
    role: &'static str,
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct StreamEvent {
    event_type: String,
    #[serde(default)]
    text: Option<String>,
}

/// System turns are dropped; everything else alternates USER / CHATBOT.
fn build_history(messages: &[ChatMessage]) -> Vec<HistoryTurn<'_>> {
    messages
        .iter()
        .filter_map(|m| {
            let role = match m.role {
                Role::System => return None,
                Role::User => "USER",
                Role::Assistant => "CHATBOT",
            };
            Some(HistoryTurn {
                role,
                message: &m.content,
            })
        })
        .collect()
}

/// Turns a newline-delimited JSON byte stream into the text of each
/// `text-generation` event. Other event types are skipped; an upstream
/// read error is yielded once and ends the stream.
pub(crate) struct NdjsonTextStream<S> {
    inner: S,
    buffer: Vec<u8>,
    done: bool,
}

impl<S> NdjsonTextStream<S> {
    pub(crate) fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            done: false,
        }
    }

    fn next_text(&mut self, flush: bool) -> Option<String> {
        loop {
            let line = match self.buffer.iter().position(|&b| b == b'\n') {
                Some(pos) => self.buffer.drain(..=pos).collect::<Vec<u8>>(),
                None if flush && !self.buffer.is_empty() => std::mem::take(&mut self.buffer),
                None => return None,
            };

            let line = String::from_utf8_lossy(&line);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<StreamEvent>(line) {
                Ok(ev) if ev.event_type == "text-generation" => {
                    return Some(ev.text.unwrap_or_default());
                }
                Ok(_) => continue,
                Err(e) => {
                    tracing::debug!(provider = PROVIDER, "skipping unparseable line: {e}");
                    continue;
                }
            }
        }
    }
}

impl<S, B> Stream for NdjsonTextStream<S>
where
    S: Stream<Item = Result<B, reqwest::Error>> + Unpin,
    B: AsRef<[u8]>,
{
    type Item = Result<String, CoreError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            let flush = this.done;
            if let Some(text) = this.next_text(flush) {
                return Poll::Ready(Some(Ok(text)));
            }
            if this.done {
                return Poll::Ready(None);
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => this.buffer.extend_from_slice(bytes.as_ref()),
                Poll::Ready(Some(Err(e))) => {
                    this.done = true;
                    this.buffer.clear();
                    return Poll::Ready(Some(Err(e.into())));
                }
                Poll::Ready(None) => this.done = true,
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[async_trait]
impl LanguageModel for CohereClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, prompt: &str, history: &[ChatMessage]) -> Result<String, CoreError> {
        let resp = self.send(prompt, history, false).await?;
        let body: ChatResponse = resp
            .json()
            .await
            .map_err(|e| CoreError::api(PROVIDER, format!("Failed to parse chat response: {e}")))?;
        Ok(body.text)
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        history: &[ChatMessage],
    ) -> Result<TextStream, CoreError> {
        let resp = self.send(prompt, history, true).await?;
        Ok(Box::pin(NdjsonTextStream::new(resp.bytes_stream())))
    }
}
