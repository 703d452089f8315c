use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Embedded elements whose content never belongs in copied code.
const MEDIA_TAGS: &[&str] = &["img", "svg", "canvas", "video", "audio", "iframe"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("code element not found: {0}")]
    ElementNotFound(String),
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("copy failed: {0}")]
    CopyFailed(String),
}

/// System clipboard seam; the engine copies through this.
pub trait Clipboard: Send {
    fn copy_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// OS clipboard via `arboard`. A fresh handle per copy keeps the clipboard
/// connection out of long-lived state.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn copy_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|err| ClipboardError::Unavailable(err.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|err| ClipboardError::CopyFailed(err.to_string()))
    }
}

/// Finds the element with the given id in rendered HTML and returns its
/// text content, skipping embedded media subtrees.
pub fn extract_code_text(html: &str, code_id: &str) -> Result<String, ClipboardError> {
    let fragment = Html::parse_fragment(html);
    let selector = Selector::parse(&format!("[id=\"{code_id}\"]"))
        .map_err(|_| ClipboardError::ElementNotFound(code_id.to_string()))?;
    let element = fragment
        .select(&selector)
        .next()
        .ok_or_else(|| ClipboardError::ElementNotFound(code_id.to_string()))?;

    let mut text = String::new();
    for child in element.children() {
        collect_text(child, &mut text);
    }
    Ok(text.trim().to_string())
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(text),
        Node::Element(_) => {
            if let Some(el) = ElementRef::wrap(node) {
                if MEDIA_TAGS.contains(&el.value().name()) {
                    return;
                }
            }
            for child in node.children() {
                collect_text(child, out);
            }
        }
        _ => {}
    }
}
