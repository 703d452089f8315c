use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chat_logging::chat_info;
use chrono::Utc;
use pagemate_core::{Effect, Msg, COPY_FEEDBACK_MS};
use pagemate_engine::{EngineConfig, EngineEvent, EngineHandle, TranscriptEntry};

use super::persistence;

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(msg_tx: mpsc::Sender<Msg>, output_dir: PathBuf) -> Self {
        let mut config = EngineConfig::default_with_output(output_dir.clone());
        config.now_ms = std::sync::Arc::new(|| Utc::now().timestamp_millis() as u64);
        if let Ok(backend) = std::env::var("PAGEMATE_BACKEND") {
            config.chat.backend_url = backend;
        }

        let (engine, event_rx) = EngineHandle::new(config);
        spawn_event_pump(event_rx, msg_tx, output_dir);
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::CapturePage { url } => {
                    chat_info!("CapturePage url={}", url);
                    self.engine.capture_page(url, "");
                }
                Effect::SendQuery { request_id, query } => {
                    chat_info!("SendQuery request_id={} query_len={}", request_id, query.len());
                    self.engine.ask_streaming(request_id, query);
                }
                Effect::SendOneShot { request_id, query } => {
                    chat_info!(
                        "SendOneShot request_id={} query_len={}",
                        request_id,
                        query.len()
                    );
                    self.engine.ask_once(request_id, query);
                }
                Effect::SendPrompt {
                    prompt,
                    webhook_url,
                } => {
                    chat_info!("SendPrompt url={} prompt_len={}", webhook_url, prompt.len());
                    self.engine.run_webhook(prompt, webhook_url);
                }
                Effect::CopyCode { code_id } => {
                    self.engine.copy_code(code_id);
                }
                Effect::CopyDocument => {
                    self.engine.copy_document();
                }
                Effect::SaveDocument => {
                    self.engine.save_document();
                }
                Effect::ExportTranscript {
                    title,
                    url,
                    entries,
                } => {
                    let entries = entries
                        .into_iter()
                        .map(|entry| TranscriptEntry {
                            speaker: entry.speaker,
                            text: entry.text,
                            html: entry.html,
                        })
                        .collect();
                    self.engine.export_transcript(title, url, entries);
                }
            }
        }
    }
}

fn spawn_event_pump(
    event_rx: mpsc::Receiver<EngineEvent>,
    msg_tx: mpsc::Sender<Msg>,
    output_dir: PathBuf,
) {
    thread::spawn(move || {
        while let Ok(event) = event_rx.recv() {
            let msg = match event {
                EngineEvent::PageCaptured { context } => {
                    persistence::save_context_snapshot(&output_dir, &context);
                    Msg::PageCaptured(persistence::summarize(&context))
                }
                EngineEvent::PageFailed { message } => Msg::PageFailed { message },
                EngineEvent::StreamChunk {
                    request_id,
                    text,
                    html,
                } => Msg::StreamChunk {
                    request_id,
                    text,
                    html,
                },
                EngineEvent::StreamFailed {
                    request_id,
                    message,
                } => Msg::StreamFailed {
                    request_id,
                    message,
                },
                EngineEvent::StreamDone {
                    request_id,
                    text,
                    html,
                } => Msg::StreamDone {
                    request_id,
                    text,
                    html,
                },
                EngineEvent::AnswerReady {
                    request_id,
                    text,
                    html,
                } => Msg::AnswerReceived {
                    request_id,
                    text,
                    html,
                },
                EngineEvent::AnswerFailed {
                    request_id,
                    message,
                } => Msg::AnswerFailed {
                    request_id,
                    message,
                },
                EngineEvent::WebhookReady {
                    raw_html,
                    enhanced_html,
                } => Msg::WebhookSucceeded {
                    raw_html,
                    enhanced_html,
                },
                EngineEvent::WebhookFailed { message } => Msg::WebhookFailed { message },
                EngineEvent::CopyFinished { success } => {
                    schedule_feedback_reset(msg_tx.clone());
                    Msg::CopyFinished { success }
                }
                EngineEvent::SaveFinished { path } => Msg::SaveFinished {
                    path: path.display().to_string(),
                },
                EngineEvent::SaveFailed { message } => Msg::SaveFailed { message },
            };
            if msg_tx.send(msg).is_err() {
                break;
            }
        }
    });
}

/// Copy feedback reverts after a fixed interval, like the button flash it
/// replaces.
fn schedule_feedback_reset(msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(COPY_FEEDBACK_MS));
        let _ = msg_tx.send(Msg::CopyFeedbackExpired);
    });
}
