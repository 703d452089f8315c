use crate::{
    AppState, DocumentState, Effect, MessageEntry, Msg, RequestId, Role, ViewMode, WidgetState,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::PageOpened(url) => {
            let url = url.trim().to_string();
            if url.is_empty() {
                return (state, Vec::new());
            }
            state.set_page_url(url.clone());
            state.set_widget(WidgetState::Open);
            state.begin_capture();
            state.mark_dirty();
            vec![Effect::CapturePage { url }]
        }
        Msg::WidgetToggled => {
            let effects = match state.widget() {
                WidgetState::Closed => {
                    state.set_widget(WidgetState::Open);
                    // The context is rebuilt on every open, not cached
                    // from the previous one.
                    match state.page_url() {
                        Some(url) => {
                            let url = url.to_string();
                            state.begin_capture();
                            vec![Effect::CapturePage { url }]
                        }
                        None => Vec::new(),
                    }
                }
                WidgetState::Open => {
                    state.set_widget(WidgetState::Closed);
                    Vec::new()
                }
            };
            state.mark_dirty();
            effects
        }
        Msg::WidgetClosed => {
            if state.widget() == WidgetState::Open {
                state.set_widget(WidgetState::Closed);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::QuerySubmitted => {
            // The streaming conversation lives in the widget; nothing to
            // submit into while it is closed.
            if state.widget() == WidgetState::Closed {
                return (state, Vec::new());
            }
            let query = state.input().trim().to_string();
            state.set_input(String::new());
            submit_query(&mut state, query, true)
        }
        Msg::OneShotSubmitted(query) => {
            let query = query.trim().to_string();
            submit_query(&mut state, query, false)
        }
        Msg::PageCaptured(summary) => {
            state.apply_context(summary);
            state.mark_dirty();
            Vec::new()
        }
        Msg::PageFailed { message } => {
            state.fail_capture(message);
            state.mark_dirty();
            Vec::new()
        }
        Msg::RestoreContext(summary) => {
            // Snapshot restore only fills the status line; it must not
            // clobber a capture that is already underway.
            if state.context().is_none() && !state.context_loading() {
                state.apply_context(summary);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::StreamChunk {
            request_id,
            text,
            html,
        } => {
            if is_active(&state, request_id) {
                if let Some(entry) = state.streaming_entry() {
                    entry.text = text;
                    entry.html = html;
                    state.mark_dirty();
                }
            }
            Vec::new()
        }
        Msg::StreamDone {
            request_id,
            text,
            html,
        }
        | Msg::AnswerReceived {
            request_id,
            text,
            html,
        } => {
            if is_active(&state, request_id) {
                if let Some(entry) = state.streaming_entry() {
                    entry.text = text;
                    entry.html = html;
                    entry.streaming = false;
                }
                state.clear_active_request();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::StreamFailed {
            request_id,
            message,
        }
        | Msg::AnswerFailed {
            request_id,
            message,
        } => {
            if is_active(&state, request_id) {
                if let Some(entry) = state.streaming_entry() {
                    entry.html = format!("<span class=\"pm-error\">{message}</span>");
                    entry.text = message;
                    entry.streaming = false;
                }
                state.clear_active_request();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PromptChanged(prompt) => {
            state.form_mut().prompt = prompt;
            Vec::new()
        }
        Msg::WebhookUrlChanged(url) => {
            state.form_mut().webhook_url = url;
            Vec::new()
        }
        Msg::PromptSubmitted => {
            if state.form().loading {
                return (state, Vec::new());
            }
            let prompt = state.form().prompt.trim().to_string();
            let webhook_url = state.form().webhook_url.trim().to_string();
            if prompt.is_empty() {
                state.form_mut().error = Some("Please enter a prompt".to_string());
                state.mark_dirty();
                return (state, Vec::new());
            }
            if webhook_url.is_empty() {
                state.form_mut().error = Some("Please enter a webhook URL".to_string());
                state.mark_dirty();
                return (state, Vec::new());
            }
            state.form_mut().loading = true;
            state.form_mut().error = None;
            state.mark_dirty();
            vec![Effect::SendPrompt {
                prompt,
                webhook_url,
            }]
        }
        Msg::WebhookSucceeded {
            raw_html,
            enhanced_html,
        } => {
            state.form_mut().loading = false;
            state.form_mut().prompt = String::new();
            state.set_document(DocumentState {
                raw_html,
                enhanced_html,
                mode: ViewMode::Preview,
                show_raw: false,
            });
            state.mark_dirty();
            Vec::new()
        }
        Msg::WebhookFailed { message } => {
            let form = state.form_mut();
            form.loading = false;
            form.error = Some(message);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ViewModeToggled => {
            if let Some(doc) = state.document_mut() {
                doc.mode = match doc.mode {
                    ViewMode::Preview => ViewMode::Code,
                    ViewMode::Code => ViewMode::Preview,
                };
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::RawToggled => {
            if let Some(doc) = state.document_mut() {
                doc.show_raw = !doc.show_raw;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::CopyCodeRequested { code_id } => vec![Effect::CopyCode { code_id }],
        Msg::CopyDocumentRequested => {
            if state.document().is_some() {
                vec![Effect::CopyDocument]
            } else {
                Vec::new()
            }
        }
        Msg::CopyFinished { success } => {
            state.set_copy_feedback(Some(success));
            state.mark_dirty();
            Vec::new()
        }
        Msg::CopyFeedbackExpired => {
            if state.copy_feedback().is_some() {
                state.set_copy_feedback(None);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SaveRequested => {
            if state.document().is_some() {
                vec![Effect::SaveDocument]
            } else {
                Vec::new()
            }
        }
        Msg::ExportRequested => {
            let entries: Vec<crate::TranscriptEntry> = state
                .messages()
                .iter()
                .filter(|entry| !entry.streaming)
                .map(|entry| crate::TranscriptEntry {
                    speaker: match entry.role {
                        Role::User => "You".to_string(),
                        Role::Assistant => "Assistant".to_string(),
                    },
                    text: entry.text.clone(),
                    html: entry.html.clone(),
                })
                .collect();
            if entries.is_empty() {
                return (state, Vec::new());
            }
            let (title, url) = match state.context() {
                Some(ctx) => (ctx.title.clone(), ctx.url.clone()),
                None => (
                    String::new(),
                    state.page_url().unwrap_or_default().to_string(),
                ),
            };
            vec![Effect::ExportTranscript {
                title,
                url,
                entries,
            }]
        }
        Msg::SaveFinished { path } => {
            state.set_last_saved(Some(path));
            state.mark_dirty();
            Vec::new()
        }
        Msg::SaveFailed { message } => {
            state.set_last_saved(None);
            state.form_mut().error = Some(message);
            state.mark_dirty();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn is_active(state: &AppState, request_id: RequestId) -> bool {
    state.active_request() == Some(request_id)
}

fn submit_query(state: &mut AppState, query: String, streaming: bool) -> Vec<Effect> {
    if query.is_empty() {
        return Vec::new();
    }
    // One query in flight at a time; a second submission is dropped
    // instead of racing the active stream.
    if state.active_request().is_some() {
        return Vec::new();
    }

    state.push_message(MessageEntry {
        role: Role::User,
        text: query.clone(),
        html: String::new(),
        streaming: false,
    });
    state.push_message(MessageEntry {
        role: Role::Assistant,
        text: String::new(),
        html: String::new(),
        streaming: true,
    });
    let request_id = state.allocate_request();
    state.mark_dirty();

    if streaming {
        vec![Effect::SendQuery { request_id, query }]
    } else {
        vec![Effect::SendOneShot { request_id, query }]
    }
}
