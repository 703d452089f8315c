use crate::{ContextSummary, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User requested a page: set it current, open the widget, capture it.
    PageOpened(String),
    /// User clicked the trigger button (open if closed, close if open).
    WidgetToggled,
    /// User clicked the close control in the widget header.
    WidgetClosed,
    /// User edited the chat input box.
    InputChanged(String),
    /// User submitted the chat input for a streaming answer.
    QuerySubmitted,
    /// User submitted a query for a one-shot (non-streaming) answer.
    OneShotSubmitted(String),
    /// Engine finished capturing the current page.
    PageCaptured(ContextSummary),
    /// Engine failed to capture the current page.
    PageFailed { message: String },
    /// Restore a previously persisted context snapshot at startup.
    RestoreContext(ContextSummary),
    /// Streaming content arrived; `html` is the full re-render of the
    /// accumulated answer so far, not a fragment.
    StreamChunk {
        request_id: RequestId,
        text: String,
        html: String,
    },
    /// The stream reported an error or failed at the transport level.
    StreamFailed {
        request_id: RequestId,
        message: String,
    },
    /// The stream finished; `html` is the final render.
    StreamDone {
        request_id: RequestId,
        text: String,
        html: String,
    },
    /// A one-shot answer arrived.
    AnswerReceived {
        request_id: RequestId,
        text: String,
        html: String,
    },
    /// A one-shot answer failed.
    AnswerFailed {
        request_id: RequestId,
        message: String,
    },
    /// User edited the webhook prompt.
    PromptChanged(String),
    /// User edited the webhook URL.
    WebhookUrlChanged(String),
    /// User submitted the webhook form.
    PromptSubmitted,
    /// The webhook returned a usable HTML document.
    WebhookSucceeded { raw_html: String, enhanced_html: String },
    /// The webhook call failed (network, status, parse, or missing key).
    WebhookFailed { message: String },
    /// Toggle the document between preview and code mode.
    ViewModeToggled,
    /// Toggle the code view between raw and enhanced HTML.
    RawToggled,
    /// User asked to copy the code block with the given id.
    CopyCodeRequested { code_id: String },
    /// User asked to copy the full enhanced document.
    CopyDocumentRequested,
    /// A clipboard copy finished.
    CopyFinished { success: bool },
    /// The copy feedback interval elapsed; revert the control.
    CopyFeedbackExpired,
    /// User asked to download the enhanced document.
    SaveRequested,
    /// User asked to export the conversation as an HTML document.
    ExportRequested,
    /// The document was written to disk.
    SaveFinished { path: String },
    /// Writing the document failed.
    SaveFailed { message: String },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
