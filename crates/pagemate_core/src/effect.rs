use crate::{RequestId, TranscriptEntry};

/// Side effects requested by `update`; executed by the app layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch and extract context from the given page.
    CapturePage { url: String },
    /// Send a streaming chat query. The engine attaches the cached context.
    SendQuery { request_id: RequestId, query: String },
    /// Send a one-shot chat query.
    SendOneShot { request_id: RequestId, query: String },
    /// Post the prompt to the webhook.
    SendPrompt { prompt: String, webhook_url: String },
    /// Copy the text of the identified code block to the clipboard.
    CopyCode { code_id: String },
    /// Copy the full enhanced document to the clipboard.
    CopyDocument,
    /// Write the enhanced document to the output directory.
    SaveDocument,
    /// Write the conversation to the output directory.
    ExportTranscript {
        title: String,
        url: String,
        entries: Vec<TranscriptEntry>,
    },
}
