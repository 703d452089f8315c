use crate::{AppState, ContextSummary, Role, ViewMode};

/// How long copy feedback stays on the triggering control, in milliseconds.
pub const COPY_FEEDBACK_MS: u64 = 1500;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub widget_open: bool,
    /// Status line under the message list, e.g.
    /// `📄 Rust Book (7421 chars, 3 code blocks)`.
    pub context_line: String,
    /// Whether captured content backs the status line (drives the
    /// ready/empty color distinction in the frontend).
    pub context_ready: bool,
    pub messages: Vec<MessageRowView>,
    pub input: String,
    pub form: FormView,
    pub document: Option<DocumentView>,
    pub copy_feedback: Option<bool>,
    pub last_saved: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRowView {
    pub role: Role,
    pub text: String,
    pub html: String,
    pub streaming: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormView {
    pub prompt: String,
    pub webhook_url: String,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentView {
    pub mode: ViewMode,
    pub show_raw: bool,
    /// The body to display for the current mode/raw selection.
    pub body: String,
}

impl AppState {
    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            widget_open: self.widget() == crate::WidgetState::Open,
            context_line: self.context_line(),
            context_ready: self
                .context()
                .map(|ctx| ctx.content_chars > 0)
                .unwrap_or(false),
            messages: self
                .messages()
                .iter()
                .map(|entry| MessageRowView {
                    role: entry.role,
                    text: entry.text.clone(),
                    html: entry.html.clone(),
                    streaming: entry.streaming,
                })
                .collect(),
            input: self.input().to_string(),
            form: FormView {
                prompt: self.form().prompt.clone(),
                webhook_url: self.form().webhook_url.clone(),
                loading: self.form().loading,
                error: self.form().error.clone(),
            },
            document: self.document().map(|doc| DocumentView {
                mode: doc.mode,
                show_raw: doc.show_raw,
                body: match (doc.mode, doc.show_raw) {
                    (ViewMode::Preview, _) => doc.enhanced_html.clone(),
                    (ViewMode::Code, true) => doc.raw_html.clone(),
                    (ViewMode::Code, false) => doc.enhanced_html.clone(),
                },
            }),
            copy_feedback: self.copy_feedback(),
            last_saved: self.last_saved().map(ToOwned::to_owned),
        }
    }

    fn context_line(&self) -> String {
        if self.context_loading() {
            return "Loading...".to_string();
        }
        if let Some(message) = self.context_error() {
            return format!("Page capture failed: {message}");
        }
        match self.context() {
            Some(ctx) => format_context_line(ctx),
            None => String::new(),
        }
    }
}

fn format_context_line(ctx: &ContextSummary) -> String {
    let title = if ctx.title.is_empty() {
        "Current Page"
    } else {
        ctx.title.as_str()
    };
    let mut line = format!("📄 {title}");
    if ctx.content_chars > 0 {
        line.push_str(&format!(" ({} chars", ctx.content_chars));
        if ctx.code_blocks > 0 {
            line.push_str(&format!(", {} code blocks", ctx.code_blocks));
        }
        if ctx.images > 0 {
            line.push_str(&format!(", {} images", ctx.images));
        }
        if ctx.videos > 0 {
            line.push_str(&format!(", {} videos", ctx.videos));
        }
        line.push(')');
    }
    line
}

#[cfg(test)]
mod tests {
    use super::format_context_line;
    use crate::ContextSummary;

    #[test]
    fn context_line_lists_only_present_media() {
        let ctx = ContextSummary {
            url: "https://example.com/a".to_string(),
            title: "Example".to_string(),
            content_chars: 120,
            code_blocks: 2,
            images: 0,
            videos: 1,
        };
        assert_eq!(
            format_context_line(&ctx),
            "📄 Example (120 chars, 2 code blocks, 1 videos)"
        );
    }

    #[test]
    fn context_line_without_content_is_title_only() {
        let ctx = ContextSummary {
            title: String::new(),
            ..ContextSummary::default()
        };
        assert_eq!(format_context_line(&ctx), "📄 Current Page");
    }
}
