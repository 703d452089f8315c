use std::time::Duration;

use crate::fetch::map_reqwest_error;
use crate::markdown::MarkdownRenderer;
use crate::stream::{consume_answer_stream, AnswerSink};
use crate::{ChatAnswer, ChatRequest, TransportError, TransportKind};

/// `top_k` sent with every chat request.
pub const DEFAULT_TOP_K: u32 = 4;

/// Answer text when the backend responds without one.
const NO_ANSWER: &str = "No answer";

#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub backend_url: String,
    pub connect_timeout: Duration,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Talks to the chat backend. One-shot answers and streamed answers share
/// the request shape; only the endpoint and response handling differ.
#[async_trait::async_trait]
pub trait ChatClient: Send + Sync {
    async fn answer(&self, request: &ChatRequest) -> Result<String, TransportError>;

    /// Streams an answer, pushing rendered updates through `sink`. No read
    /// timeout: a stalled backend stalls the request, matching the widget
    /// this replaces.
    async fn stream_answer(
        &self,
        request: &ChatRequest,
        sink: &dyn AnswerSink,
    ) -> Result<(), TransportError>;
}

pub struct HttpChatClient {
    settings: ChatSettings,
    client: reqwest::Client,
    renderer: MarkdownRenderer,
}

impl HttpChatClient {
    pub fn new(settings: ChatSettings) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| TransportError::new(TransportKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            client,
            renderer: MarkdownRenderer::new(),
        })
    }

    async fn post(
        &self,
        endpoint: &str,
        request: &ChatRequest,
    ) -> Result<reqwest::Response, TransportError> {
        let url = format!("{}{}", self.settings.backend_url.trim_end_matches('/'), endpoint);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::new(
                TransportKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl ChatClient for HttpChatClient {
    async fn answer(&self, request: &ChatRequest) -> Result<String, TransportError> {
        let response = self.post("/chat", request).await?;
        let answer: ChatAnswer = response
            .json()
            .await
            .map_err(|err| TransportError::new(TransportKind::Network, err.to_string()))?;
        Ok(answer
            .answer
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| NO_ANSWER.to_string()))
    }

    async fn stream_answer(
        &self,
        request: &ChatRequest,
        sink: &dyn AnswerSink,
    ) -> Result<(), TransportError> {
        let response = self.post("/chat/stream", request).await?;
        consume_answer_stream(response.bytes_stream(), &self.renderer, sink).await
    }
}
