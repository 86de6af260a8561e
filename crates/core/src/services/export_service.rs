use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::errors::CoreError;
use crate::models::chat::{ChatMessage, Role};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Text,
    Markdown,
    Html,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
            ExportFormat::Markdown => "md",
            ExportFormat::Html => "html",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Text => "text/plain",
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Html => "text/html",
        }
    }
}

/// A rendered conversation, ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    pub filename: String,
    pub mime_type: &'static str,
    pub content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExport<'a> {
    export_date: DateTime<Utc>,
    message_count: usize,
    messages: Vec<JsonMessage<'a>>,
}

#[derive(Serialize)]
struct JsonMessage<'a> {
    role: Role,
    content: &'a str,
    timestamp: DateTime<Utc>,
}

/// Renders chat history in the formats offered for download.
pub struct ExportService;

impl ExportService {
    /// `crypto-chat-<epoch ms>.<ext>`
    pub fn filename(format: ExportFormat, now: DateTime<Utc>) -> String {
        format!("crypto-chat-{}.{}", now.timestamp_millis(), format.extension())
    }

    pub fn export(
        messages: &[ChatMessage],
        format: ExportFormat,
        now: DateTime<Utc>,
    ) -> Result<ExportedFile, CoreError> {
        let content = match format {
            ExportFormat::Json => Self::to_json(messages, now)?,
            ExportFormat::Text => Self::to_text(messages, now),
            ExportFormat::Markdown => Self::to_markdown(messages, now),
            ExportFormat::Html => Self::to_html(messages, now),
        };
        Ok(ExportedFile {
            filename: Self::filename(format, now),
            mime_type: format.mime_type(),
            content,
        })
    }

    pub fn to_json(messages: &[ChatMessage], now: DateTime<Utc>) -> Result<String, CoreError> {
        let export = JsonExport {
            export_date: now,
            message_count: messages.len(),
            messages: messages
                .iter()
                .map(|m| JsonMessage {
                    role: m.role,
                    content: &m.content,
                    timestamp: m.timestamp,
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    pub fn to_text(messages: &[ChatMessage], now: DateTime<Utc>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "CryptoAI Chat Export");
        let _ = writeln!(out, "Exported: {}", now.format(TIMESTAMP_FORMAT));
        let _ = writeln!(out, "Total Messages: {}", messages.len());
        let _ = writeln!(out, "{}\n", "=".repeat(60));

        for msg in messages {
            let _ = write!(
                out,
                "[{}] {}:\n{}\n\n",
                msg.timestamp.format(TIMESTAMP_FORMAT),
                plain_label(msg.role),
                msg.content
            );
        }
        out
    }

    pub fn to_markdown(messages: &[ChatMessage], now: DateTime<Utc>) -> String {
        let mut out = String::from("# CryptoAI Chat Export\n\n");
        let _ = writeln!(out, "**Exported:** {}  ", now.format(TIMESTAMP_FORMAT));
        let _ = writeln!(out, "**Total Messages:** {}\n", messages.len());
        out.push_str("---\n\n");

        for msg in messages {
            let _ = write!(
                out,
                "### {}\n*{}*\n\n{}\n\n---\n\n",
                rich_label(msg.role),
                msg.timestamp.format(TIMESTAMP_FORMAT),
                msg.content
            );
        }
        out
    }

    pub fn to_html(messages: &[ChatMessage], now: DateTime<Utc>) -> String {
        let mut body = String::new();
        for msg in messages {
            let _ = write!(
                body,
                "\n    <div class=\"message {}\">\n        <div class=\"role\">{}</div>\n        <div class=\"timestamp\">{}</div>\n        <div class=\"content\">{}</div>\n    </div>\n",
                msg.role,
                rich_label(msg.role),
                msg.timestamp.format(TIMESTAMP_FORMAT),
                escape_html(&msg.content)
            );
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>CryptoAI Chat Export</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; background: #f5f5f5; }}
        .header {{ background: #3b82f6; color: white; padding: 20px; border-radius: 8px; margin-bottom: 20px; }}
        .message {{ background: white; padding: 15px; margin-bottom: 15px; border-radius: 8px; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }}
        .message.user {{ background: #eff6ff; border-left: 4px solid #3b82f6; }}
        .message.assistant {{ background: #f9fafb; border-left: 4px solid #10b981; }}
        .role {{ font-weight: bold; margin-bottom: 5px; }}
        .timestamp {{ color: #6b7280; font-size: 0.875rem; margin-bottom: 10px; }}
        .content {{ white-space: pre-wrap; line-height: 1.6; }}
    </style>
</head>
<body>
    <div class="header">
        <h1>CryptoAI Chat Export</h1>
        <p>Exported: {exported}</p>
        <p>Total Messages: {count}</p>
    </div>{body}
</body>
</html>
"#,
            exported = now.format(TIMESTAMP_FORMAT),
            count = messages.len(),
        )
    }
}

fn plain_label(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        _ => "CryptoAI",
    }
}

fn rich_label(role: Role) -> &'static str {
    match role {
        Role::User => "👤 You",
        _ => "🤖 CryptoAI",
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
