use std::fmt;

use serde::{Deserialize, Serialize};

pub type RequestId = u64;

/// One event on the `/chat/stream` wire: a `data: ` line's JSON payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    Content { content: String },
    Error { error: String },
    Done,
}

/// Snapshot of a captured page, serialized as the `page_context` field of
/// chat requests. Field names match the wire shape the backend expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    pub url: String,
    pub title: String,
    pub selection: String,
    pub content: String,
    pub code_blocks: Vec<PageCodeBlock>,
    pub images: Vec<PageImage>,
    pub videos: Vec<PageVideo>,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCodeBlock {
    pub id: usize,
    pub language: String,
    pub code: String,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageImage {
    pub id: usize,
    pub src: String,
    pub alt: String,
    pub caption: String,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageVideo {
    pub id: usize,
    pub src: String,
    pub title: String,
    pub caption: String,
    pub context: String,
}

/// Body of both `/chat` and `/chat/stream` requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub query: String,
    pub page_context: PageContext,
    pub top_k: u32,
}

/// Body of a `/chat` response. The backend may omit the answer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatAnswer {
    #[serde(default)]
    pub answer: Option<String>,
}

/// One row of an exported conversation document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub speaker: String,
    pub text: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: TransportKind,
    pub message: String,
}

impl TransportError {
    pub(crate) fn new(kind: TransportKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for TransportError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::InvalidUrl => write!(f, "invalid url"),
            TransportKind::HttpStatus(code) => write!(f, "http status {code}"),
            TransportKind::Timeout => write!(f, "timeout"),
            TransportKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            TransportKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            TransportKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            TransportKind::Network => write!(f, "network error"),
        }
    }
}

/// Events the engine reports back to the frontend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    PageCaptured {
        context: PageContext,
    },
    PageFailed {
        message: String,
    },
    /// `text` and `html` are the whole accumulated answer re-rendered, not
    /// a fragment.
    StreamChunk {
        request_id: RequestId,
        text: String,
        html: String,
    },
    StreamFailed {
        request_id: RequestId,
        message: String,
    },
    StreamDone {
        request_id: RequestId,
        text: String,
        html: String,
    },
    AnswerReady {
        request_id: RequestId,
        text: String,
        html: String,
    },
    AnswerFailed {
        request_id: RequestId,
        message: String,
    },
    WebhookReady {
        raw_html: String,
        enhanced_html: String,
    },
    WebhookFailed {
        message: String,
    },
    CopyFinished {
        success: bool,
    },
    SaveFinished {
        path: std::path::PathBuf,
    },
    SaveFailed {
        message: String,
    },
}
