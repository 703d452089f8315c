use bytes::Bytes;
use chat_logging::chat_warn;
use futures_util::{Stream, StreamExt};

use crate::markdown::MarkdownRenderer;
use crate::{StreamEvent, TransportError, TransportKind};

/// Fallback body when the stream finishes without producing content.
const EMPTY_ANSWER: &str = "No response generated";

/// Incremental updates produced while consuming an answer stream. `Chunk`
/// and `Done` carry the whole accumulated answer re-rendered, never a
/// fragment: the receiver replaces its message body wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerUpdate {
    Chunk { text: String, html: String },
    Failed { message: String },
    Done { text: String, html: String },
}

/// Receives answer updates as the stream is consumed.
pub trait AnswerSink: Send + Sync {
    fn emit(&self, update: AnswerUpdate);
}

/// Splits an incoming byte stream into complete lines, carrying the
/// trailing partial line (and any split UTF-8 sequence) to the next chunk.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and returns the lines completed by it, without
    /// their terminators.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }
}

/// Parses one stream line. Returns `None` for anything that is not a
/// `data: ` line; malformed JSON surfaces as the inner `Err`.
pub fn parse_data_line(line: &str) -> Option<Result<StreamEvent, serde_json::Error>> {
    let payload = line.strip_prefix("data: ")?;
    Some(serde_json::from_str(payload))
}

/// Consumes a `/chat/stream` response body.
///
/// Each `content` event re-renders the whole accumulator through `sink`.
/// An `error` event emits `Failed` and abandons the rest of that buffer
/// pass without aborting the stream. Malformed lines are logged and
/// skipped. Exactly one terminal update (`Failed` or `Done`) is emitted
/// unless the transport itself fails, in which case the caller gets the
/// error and no terminal update has been emitted for it.
pub async fn consume_answer_stream<S, E>(
    mut stream: S,
    renderer: &MarkdownRenderer,
    sink: &dyn AnswerSink,
) -> Result<(), TransportError>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: std::fmt::Display,
{
    let mut lines = LineBuffer::new();
    let mut accumulated = String::new();
    let mut failed = false;

    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|err| TransportError::new(TransportKind::Network, err.to_string()))?;
        for line in lines.push(&chunk) {
            match parse_data_line(&line) {
                None => {}
                Some(Err(err)) => {
                    chat_warn!("skipping malformed stream line: {}", err);
                }
                Some(Ok(StreamEvent::Content { content })) => {
                    accumulated.push_str(&content);
                    sink.emit(AnswerUpdate::Chunk {
                        text: accumulated.clone(),
                        html: renderer.render(&accumulated),
                    });
                }
                Some(Ok(StreamEvent::Error { error })) => {
                    if !failed {
                        sink.emit(AnswerUpdate::Failed { message: error });
                        failed = true;
                    }
                    break;
                }
                Some(Ok(StreamEvent::Done)) => {
                    if !failed {
                        emit_done(&accumulated, renderer, sink);
                    }
                    return Ok(());
                }
            }
        }
    }

    // The stream ended without a `done` event; finalize anyway so the
    // message does not stay in its streaming state forever.
    if !failed {
        emit_done(&accumulated, renderer, sink);
    }
    Ok(())
}

fn emit_done(accumulated: &str, renderer: &MarkdownRenderer, sink: &dyn AnswerSink) {
    let text = if accumulated.is_empty() {
        EMPTY_ANSWER.to_string()
    } else {
        accumulated.to_string()
    };
    sink.emit(AnswerUpdate::Done {
        html: renderer.render(&text),
        text,
    });
}

#[cfg(test)]
mod tests {
    use super::{parse_data_line, LineBuffer};
    use crate::StreamEvent;

    #[test]
    fn lines_split_across_chunks_are_joined() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(b"data: {\"type\":").is_empty());
        let lines = buffer.push(b"\"done\"}\nrest");
        assert_eq!(lines, vec!["data: {\"type\":\"done\"}".to_string()]);
        assert_eq!(buffer.push(b"\n"), vec!["rest".to_string()]);
    }

    #[test]
    fn crlf_terminators_are_stripped() {
        let mut buffer = LineBuffer::new();
        assert_eq!(buffer.push(b"a\r\nb\n"), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn non_data_lines_are_ignored() {
        assert!(parse_data_line("event: ping").is_none());
        assert!(parse_data_line("").is_none());
    }

    #[test]
    fn data_lines_parse_into_events() {
        let event = parse_data_line("data: {\"type\":\"content\",\"content\":\"Hi\"}");
        assert_eq!(
            event.and_then(Result::ok),
            Some(StreamEvent::Content {
                content: "Hi".to_string()
            })
        );
    }
}
