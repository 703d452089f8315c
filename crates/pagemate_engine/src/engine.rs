use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use chat_logging::{chat_info, chat_warn, set_active_request};

use crate::chat::{ChatClient, ChatSettings, HttpChatClient, DEFAULT_TOP_K};
use crate::clipboard::{extract_code_text, Clipboard, SystemClipboard};
use crate::context::{ContextExtractor, DomContextExtractor};
use crate::decode::decode_page;
use crate::fetch::{FetchSettings, HttpPageFetcher, PageFetcher};
use crate::filename::transcript_filename;
use crate::markdown::MarkdownRenderer;
use crate::persist::write_atomic;
use crate::stream::{AnswerSink, AnswerUpdate};
use crate::viewer::{enhance_html, transcript_html, DOCUMENT_FILENAME};
use crate::webhook::{HttpWebhookClient, WebhookClient};
use crate::{ChatRequest, EngineEvent, PageContext, RequestId, TranscriptEntry, TransportError};

pub struct EngineConfig {
    pub fetch: FetchSettings,
    pub chat: ChatSettings,
    pub output_dir: PathBuf,
    /// Clock for context timestamps; injected so captures are
    /// reproducible in tests.
    pub now_ms: Arc<dyn Fn() -> u64 + Send + Sync>,
}

impl EngineConfig {
    pub fn default_with_output(output_dir: PathBuf) -> Self {
        Self {
            fetch: FetchSettings::default(),
            chat: ChatSettings::default(),
            output_dir,
            now_ms: Arc::new(|| 0),
        }
    }
}

enum EngineCommand {
    CapturePage {
        url: String,
        selection: String,
    },
    AskStreaming {
        request_id: RequestId,
        query: String,
    },
    AskOnce {
        request_id: RequestId,
        query: String,
    },
    RunWebhook {
        prompt: String,
        webhook_url: String,
    },
    CopyCode {
        code_id: String,
    },
    CopyDocument,
    SaveDocument,
    ExportTranscript {
        title: String,
        url: String,
        entries: Vec<TranscriptEntry>,
    },
}

struct DocumentCache {
    enhanced: String,
}

struct EngineCtx {
    fetcher: HttpPageFetcher,
    extractor: DomContextExtractor,
    chat: HttpChatClient,
    webhook: HttpWebhookClient,
    renderer: MarkdownRenderer,
    output_dir: PathBuf,
    now_ms: Arc<dyn Fn() -> u64 + Send + Sync>,
    /// Most recent capture; attached to every chat request.
    context: Mutex<Option<PageContext>>,
    /// Enhanced document from the last successful webhook run.
    document: Mutex<Option<DocumentCache>>,
    /// Rendered HTML of the last completed answer, for code copy.
    answer_html: Mutex<String>,
}

impl EngineCtx {
    fn new(config: EngineConfig) -> Self {
        let chat = HttpChatClient::new(config.chat).expect("http client");
        Self {
            fetcher: HttpPageFetcher::new(config.fetch),
            extractor: DomContextExtractor,
            chat,
            webhook: HttpWebhookClient::new(),
            renderer: MarkdownRenderer::new(),
            output_dir: config.output_dir,
            now_ms: config.now_ms,
            context: Mutex::new(None),
            document: Mutex::new(None),
            answer_html: Mutex::new(String::new()),
        }
    }

    fn chat_request(&self, query: String) -> ChatRequest {
        let page_context = self
            .context
            .lock()
            .expect("lock context")
            .clone()
            .unwrap_or_default();
        ChatRequest {
            query,
            page_context,
            top_k: DEFAULT_TOP_K,
        }
    }

    fn enhanced_document(&self) -> Option<String> {
        self.document
            .lock()
            .expect("lock document")
            .as_ref()
            .map(|doc| doc.enhanced.clone())
    }
}

/// Frontend-facing engine handle: commands in, `EngineEvent`s out on the
/// receiver returned by [`EngineHandle::new`]. All IO runs on a dedicated
/// worker thread with its own tokio runtime.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> (Self, mpsc::Receiver<EngineEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let ctx = Arc::new(EngineCtx::new(config));
            while let Ok(command) = cmd_rx.recv() {
                let ctx = ctx.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(ctx, command, event_tx).await;
                });
            }
        });

        (Self { cmd_tx }, event_rx)
    }

    pub fn capture_page(&self, url: impl Into<String>, selection: impl Into<String>) {
        self.send(EngineCommand::CapturePage {
            url: url.into(),
            selection: selection.into(),
        });
    }

    pub fn ask_streaming(&self, request_id: RequestId, query: impl Into<String>) {
        self.send(EngineCommand::AskStreaming {
            request_id,
            query: query.into(),
        });
    }

    pub fn ask_once(&self, request_id: RequestId, query: impl Into<String>) {
        self.send(EngineCommand::AskOnce {
            request_id,
            query: query.into(),
        });
    }

    pub fn run_webhook(&self, prompt: impl Into<String>, webhook_url: impl Into<String>) {
        self.send(EngineCommand::RunWebhook {
            prompt: prompt.into(),
            webhook_url: webhook_url.into(),
        });
    }

    pub fn copy_code(&self, code_id: impl Into<String>) {
        self.send(EngineCommand::CopyCode {
            code_id: code_id.into(),
        });
    }

    pub fn copy_document(&self) {
        self.send(EngineCommand::CopyDocument);
    }

    pub fn save_document(&self) {
        self.send(EngineCommand::SaveDocument);
    }

    pub fn export_transcript(&self, title: String, url: String, entries: Vec<TranscriptEntry>) {
        self.send(EngineCommand::ExportTranscript {
            title,
            url,
            entries,
        });
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

async fn handle_command(
    ctx: Arc<EngineCtx>,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::CapturePage { url, selection } => {
            set_active_request(0);
            let event = match capture_page(&ctx, &url, &selection).await {
                Ok(context) => EngineEvent::PageCaptured { context },
                Err(err) => {
                    chat_warn!("page capture failed for {}: {}", url, err);
                    EngineEvent::PageFailed {
                        message: err.to_string(),
                    }
                }
            };
            let _ = event_tx.send(event);
        }
        EngineCommand::AskStreaming { request_id, query } => {
            set_active_request(request_id);
            let request = ctx.chat_request(query);
            let sink = EventAnswerSink {
                request_id,
                ctx: ctx.clone(),
                event_tx: event_tx.clone(),
            };
            if let Err(err) = ctx.chat.stream_answer(&request, &sink).await {
                let _ = event_tx.send(EngineEvent::StreamFailed {
                    request_id,
                    message: format!("Error contacting backend: {err}"),
                });
            }
        }
        EngineCommand::AskOnce { request_id, query } => {
            set_active_request(request_id);
            let request = ctx.chat_request(query);
            let event = match ctx.chat.answer(&request).await {
                Ok(text) => {
                    let html = ctx.renderer.render(&text);
                    *ctx.answer_html.lock().expect("lock answer") = html.clone();
                    EngineEvent::AnswerReady {
                        request_id,
                        text,
                        html,
                    }
                }
                Err(err) => EngineEvent::AnswerFailed {
                    request_id,
                    message: format!("Error contacting backend: {err}"),
                },
            };
            let _ = event_tx.send(event);
        }
        EngineCommand::RunWebhook {
            prompt,
            webhook_url,
        } => {
            set_active_request(0);
            let event = match ctx.webhook.run(&webhook_url, &prompt).await {
                Ok(raw_html) => {
                    let enhanced_html = enhance_html(&raw_html);
                    *ctx.document.lock().expect("lock document") = Some(DocumentCache {
                        enhanced: enhanced_html.clone(),
                    });
                    EngineEvent::WebhookReady {
                        raw_html,
                        enhanced_html,
                    }
                }
                Err(err) => EngineEvent::WebhookFailed {
                    message: err.to_string(),
                },
            };
            let _ = event_tx.send(event);
        }
        EngineCommand::CopyCode { code_id } => {
            let success = copy_code(&ctx, &code_id);
            let _ = event_tx.send(EngineEvent::CopyFinished { success });
        }
        EngineCommand::CopyDocument => {
            let success = match ctx.enhanced_document() {
                Some(enhanced) => copy_to_clipboard(&enhanced),
                None => false,
            };
            let _ = event_tx.send(EngineEvent::CopyFinished { success });
        }
        EngineCommand::SaveDocument => {
            let event = match ctx.enhanced_document() {
                Some(enhanced) => {
                    match write_atomic(&ctx.output_dir, DOCUMENT_FILENAME, &enhanced) {
                        Ok(path) => EngineEvent::SaveFinished { path },
                        Err(err) => EngineEvent::SaveFailed {
                            message: err.to_string(),
                        },
                    }
                }
                None => EngineEvent::SaveFailed {
                    message: "no document to save".to_string(),
                },
            };
            let _ = event_tx.send(event);
        }
        EngineCommand::ExportTranscript {
            title,
            url,
            entries,
        } => {
            let document = enhance_html(&transcript_html(&entries));
            let filename = transcript_filename(&title, &url);
            let event = match write_atomic(&ctx.output_dir, &filename, &document) {
                Ok(path) => EngineEvent::SaveFinished { path },
                Err(err) => EngineEvent::SaveFailed {
                    message: err.to_string(),
                },
            };
            let _ = event_tx.send(event);
        }
    }
}

async fn capture_page(
    ctx: &EngineCtx,
    url: &str,
    selection: &str,
) -> Result<PageContext, TransportError> {
    let page = ctx.fetcher.fetch(url).await?;
    let (html, encoding) = decode_page(&page.bytes, page.content_type.as_deref());
    chat_info!(
        "captured {} ({} bytes, {}, {} redirects)",
        page.final_url,
        page.bytes.len(),
        encoding,
        page.redirect_count
    );
    let timestamp = (ctx.now_ms)();
    let context = ctx.extractor.extract(&html, url, selection, timestamp);
    *ctx.context.lock().expect("lock context") = Some(context.clone());
    Ok(context)
}

fn copy_code(ctx: &EngineCtx, code_id: &str) -> bool {
    let answer_html = ctx.answer_html.lock().expect("lock answer").clone();
    let text = extract_code_text(&answer_html, code_id).or_else(|_| {
        match ctx.enhanced_document() {
            Some(enhanced) => extract_code_text(&enhanced, code_id),
            None => Err(crate::ClipboardError::ElementNotFound(code_id.to_string())),
        }
    });
    match text {
        Ok(text) => copy_to_clipboard(&text),
        Err(err) => {
            chat_warn!("copy failed: {}", err);
            false
        }
    }
}

fn copy_to_clipboard(text: &str) -> bool {
    match SystemClipboard.copy_text(text) {
        Ok(()) => true,
        Err(err) => {
            chat_warn!("clipboard write failed: {}", err);
            false
        }
    }
}

struct EventAnswerSink {
    request_id: RequestId,
    ctx: Arc<EngineCtx>,
    event_tx: mpsc::Sender<EngineEvent>,
}

impl AnswerSink for EventAnswerSink {
    fn emit(&self, update: AnswerUpdate) {
        let event = match update {
            AnswerUpdate::Chunk { text, html } => EngineEvent::StreamChunk {
                request_id: self.request_id,
                text,
                html,
            },
            AnswerUpdate::Failed { message } => EngineEvent::StreamFailed {
                request_id: self.request_id,
                message: format!("Error: {message}"),
            },
            AnswerUpdate::Done { text, html } => {
                *self.ctx.answer_html.lock().expect("lock answer") = html.clone();
                EngineEvent::StreamDone {
                    request_id: self.request_id,
                    text,
                    html,
                }
            }
        };
        let _ = self.event_tx.send(event);
    }
}
