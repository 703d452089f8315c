use serde_json::Value;
use thiserror::Error;

/// Keys tried, in order, when pulling the HTML document out of a webhook
/// response. `output.html` is the nested variant some workflows produce.
const HTML_KEYS: &str = "html, output.html, content, result";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("invalid JSON response from webhook")]
    InvalidJson,
    #[error("no HTML content in response (tried {HTML_KEYS}). Available keys: {available}")]
    MissingHtml { available: String },
}

/// Runs a prompt through a caller-supplied webhook and returns the HTML
/// string it produced.
#[async_trait::async_trait]
pub trait WebhookClient: Send + Sync {
    async fn run(&self, webhook_url: &str, prompt: &str) -> Result<String, WebhookError>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpWebhookClient {
    client: reqwest::Client,
}

impl HttpWebhookClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl WebhookClient for HttpWebhookClient {
    async fn run(&self, webhook_url: &str, prompt: &str) -> Result<String, WebhookError> {
        let response = self
            .client
            .post(webhook_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await
            .map_err(|err| WebhookError::Network(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| WebhookError::Network(err.to_string()))?;
        if !status.is_success() {
            return Err(WebhookError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = serde_json::from_str(&body).map_err(|_| WebhookError::InvalidJson)?;
        extract_html(&value)
    }
}

/// Pulls the HTML string out of a loosely shaped webhook response by the
/// fixed key-priority list. Blank strings do not count as content.
pub fn extract_html(value: &Value) -> Result<String, WebhookError> {
    let candidates = [
        value.get("html"),
        value.get("output").and_then(|output| output.get("html")),
        value.get("content"),
        value.get("result"),
    ];
    for candidate in candidates {
        if let Some(text) = candidate.and_then(Value::as_str) {
            if !text.trim().is_empty() {
                return Ok(text.to_string());
            }
        }
    }

    let available = match value.as_object() {
        Some(map) if !map.is_empty() => map
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        _ => "none".to_string(),
    };
    Err(WebhookError::MissingHtml { available })
}

#[cfg(test)]
mod tests {
    use super::{extract_html, WebhookError};
    use serde_json::json;

    #[test]
    fn nested_output_html_is_found() {
        let value = json!({"output": {"html": "<p>x</p>"}});
        assert_eq!(extract_html(&value).as_deref(), Ok("<p>x</p>"));
    }

    #[test]
    fn top_level_html_wins_over_content() {
        let value = json!({"html": "<b>a</b>", "content": "<i>b</i>"});
        assert_eq!(extract_html(&value).as_deref(), Ok("<b>a</b>"));
    }

    #[test]
    fn blank_html_falls_through_to_result() {
        let value = json!({"html": "  ", "result": "<p>r</p>"});
        assert_eq!(extract_html(&value).as_deref(), Ok("<p>r</p>"));
    }

    #[test]
    fn empty_object_reports_none() {
        let err = extract_html(&json!({})).unwrap_err();
        assert_eq!(
            err,
            WebhookError::MissingHtml {
                available: "none".to_string()
            }
        );
    }

    #[test]
    fn missing_html_enumerates_available_keys() {
        let err = extract_html(&json!({"status": "ok", "data": 1})).unwrap_err();
        match err {
            WebhookError::MissingHtml { available } => {
                assert!(available.contains("status"));
                assert!(available.contains("data"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
