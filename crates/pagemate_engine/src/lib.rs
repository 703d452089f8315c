//! PageMate engine: IO pipeline and effect execution.
mod chat;
mod clipboard;
mod context;
mod decode;
mod engine;
mod fetch;
mod filename;
mod markdown;
mod persist;
mod stream;
mod types;
mod viewer;
mod webhook;

pub use chat::{ChatClient, ChatSettings, HttpChatClient, DEFAULT_TOP_K};
pub use clipboard::{extract_code_text, Clipboard, ClipboardError, SystemClipboard};
pub use context::{ContextExtractor, DomContextExtractor, MAX_CONTENT_CHARS};
pub use decode::decode_page;
pub use engine::{EngineConfig, EngineHandle};
pub use fetch::{FetchSettings, HttpPageFetcher, PageBytes, PageFetcher};
pub use filename::transcript_filename;
pub use markdown::MarkdownRenderer;
pub use persist::{ensure_output_dir, write_atomic, PersistError};
pub use stream::{consume_answer_stream, parse_data_line, AnswerSink, AnswerUpdate, LineBuffer};
pub use types::{
    ChatAnswer, ChatRequest, EngineEvent, PageCodeBlock, PageContext, PageImage, PageVideo,
    RequestId, StreamEvent, TranscriptEntry, TransportError, TransportKind,
};
pub use viewer::{enhance_html, transcript_html, DOCUMENT_FILENAME};
pub use webhook::{extract_html, HttpWebhookClient, WebhookClient, WebhookError};
