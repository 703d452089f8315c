pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Preview,
    Code,
}

/// What the core keeps of a captured page: enough for the status line and
/// the snapshot file. The full context stays with the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContextSummary {
    pub url: String,
    pub title: String,
    pub content_chars: usize,
    pub code_blocks: usize,
    pub images: usize,
    pub videos: usize,
}

/// One row of an exported conversation. `html` is empty for plain-text
/// rows; the exporter escapes `text` itself in that case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub speaker: String,
    pub text: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEntry {
    pub role: Role,
    pub text: String,
    pub html: String,
    pub streaming: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormState {
    pub prompt: String,
    pub webhook_url: String,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentState {
    pub raw_html: String,
    pub enhanced_html: String,
    pub mode: ViewMode,
    pub show_raw: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    widget: WidgetState,
    page_url: Option<String>,
    context: Option<ContextSummary>,
    context_loading: bool,
    context_error: Option<String>,
    input: String,
    messages: Vec<MessageEntry>,
    next_request: RequestId,
    active_request: Option<RequestId>,
    form: FormState,
    document: Option<DocumentState>,
    copy_feedback: Option<bool>,
    last_saved: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn widget(&self) -> WidgetState {
        self.widget
    }

    pub fn page_url(&self) -> Option<&str> {
        self.page_url.as_deref()
    }

    pub fn context(&self) -> Option<&ContextSummary> {
        self.context.as_ref()
    }

    pub fn messages(&self) -> &[MessageEntry] {
        &self.messages
    }

    pub fn active_request(&self) -> Option<RequestId> {
        self.active_request
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn document(&self) -> Option<&DocumentState> {
        self.document.as_ref()
    }

    /// Returns whether a re-render is pending, clearing the flag.
    pub fn consume_dirty(&mut self) -> bool {
        let was = self.dirty;
        self.dirty = false;
        was
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_widget(&mut self, widget: WidgetState) {
        self.widget = widget;
    }

    pub(crate) fn set_page_url(&mut self, url: String) {
        self.page_url = Some(url);
    }

    pub(crate) fn begin_capture(&mut self) {
        self.context_loading = true;
        self.context_error = None;
    }

    pub(crate) fn apply_context(&mut self, summary: ContextSummary) {
        self.context = Some(summary);
        self.context_loading = false;
        self.context_error = None;
    }

    pub(crate) fn fail_capture(&mut self, message: String) {
        self.context_loading = false;
        self.context_error = Some(message);
    }

    pub(crate) fn context_loading(&self) -> bool {
        self.context_loading
    }

    pub(crate) fn context_error(&self) -> Option<&str> {
        self.context_error.as_deref()
    }

    pub(crate) fn input(&self) -> &str {
        &self.input
    }

    pub(crate) fn set_input(&mut self, text: String) {
        self.input = text;
    }

    pub(crate) fn push_message(&mut self, entry: MessageEntry) {
        self.messages.push(entry);
    }

    /// Allocates the next request id. Ids are never reused within a
    /// session, which is what lets stale stream events be discarded.
    pub(crate) fn allocate_request(&mut self) -> RequestId {
        self.next_request += 1;
        self.active_request = Some(self.next_request);
        self.next_request
    }

    pub(crate) fn clear_active_request(&mut self) {
        self.active_request = None;
    }

    /// Mutable access to the trailing assistant entry, if it is the one
    /// receiving the active stream.
    pub(crate) fn streaming_entry(&mut self) -> Option<&mut MessageEntry> {
        self.messages
            .last_mut()
            .filter(|entry| entry.role == Role::Assistant && entry.streaming)
    }

    pub(crate) fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    pub(crate) fn set_document(&mut self, document: DocumentState) {
        self.document = Some(document);
    }

    pub(crate) fn document_mut(&mut self) -> Option<&mut DocumentState> {
        self.document.as_mut()
    }

    pub(crate) fn set_copy_feedback(&mut self, feedback: Option<bool>) {
        self.copy_feedback = feedback;
    }

    pub(crate) fn copy_feedback(&self) -> Option<bool> {
        self.copy_feedback
    }

    pub(crate) fn set_last_saved(&mut self, path: Option<String>) {
        self.last_saved = path;
    }

    pub(crate) fn last_saved(&self) -> Option<&str> {
        self.last_saved.as_deref()
    }
}
