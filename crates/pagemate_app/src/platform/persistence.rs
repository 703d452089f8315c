use std::fs;
use std::path::Path;

use chat_logging::{chat_error, chat_info, chat_warn};
use pagemate_core::ContextSummary;
use pagemate_engine::{ensure_output_dir, write_atomic, PageContext};
use serde::{Deserialize, Serialize};

/// Snapshot of the last captured page, the successor of the extension's
/// `ta_page_context` storage entry. Only the summary is kept: after a
/// restart the status line is populated, and the first widget open
/// re-captures the page for real.
const SNAPSHOT_FILENAME: &str = ".pagemate_context.ron";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedContext {
    url: String,
    title: String,
    content_chars: usize,
    code_blocks: usize,
    images: usize,
    videos: usize,
    timestamp: u64,
}

pub(crate) fn load_context_snapshot(output_dir: &Path) -> Option<ContextSummary> {
    let path = output_dir.join(SNAPSHOT_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return None;
        }
        Err(err) => {
            chat_warn!("Failed to read context snapshot from {:?}: {}", path, err);
            return None;
        }
    };

    let persisted: PersistedContext = match ron::from_str(&content) {
        Ok(persisted) => persisted,
        Err(err) => {
            chat_warn!("Failed to parse context snapshot from {:?}: {}", path, err);
            return None;
        }
    };

    chat_info!("Loaded context snapshot from {:?}", path);
    Some(ContextSummary {
        url: persisted.url,
        title: persisted.title,
        content_chars: persisted.content_chars,
        code_blocks: persisted.code_blocks,
        images: persisted.images,
        videos: persisted.videos,
    })
}

pub(crate) fn save_context_snapshot(output_dir: &Path, context: &PageContext) {
    if let Err(err) = ensure_output_dir(output_dir) {
        chat_error!("Failed to ensure output dir {:?}: {}", output_dir, err);
        return;
    }

    let persisted = PersistedContext {
        url: context.url.clone(),
        title: context.title.clone(),
        content_chars: context.content.chars().count(),
        code_blocks: context.code_blocks.len(),
        images: context.images.len(),
        videos: context.videos.len(),
        timestamp: context.timestamp,
    };

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&persisted, pretty) {
        Ok(text) => text,
        Err(err) => {
            chat_error!("Failed to serialize context snapshot: {}", err);
            return;
        }
    };

    if let Err(err) = write_atomic(output_dir, SNAPSHOT_FILENAME, &content) {
        chat_error!("Failed to write context snapshot to {:?}: {}", output_dir, err);
    }
}

/// Derives the core-side summary from a full capture.
pub(crate) fn summarize(context: &PageContext) -> ContextSummary {
    ContextSummary {
        url: context.url.clone(),
        title: context.title.clone(),
        content_chars: context.content.chars().count(),
        code_blocks: context.code_blocks.len(),
        images: context.images.len(),
        videos: context.videos.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::{load_context_snapshot, save_context_snapshot};
    use pagemate_engine::PageContext;

    #[test]
    fn snapshot_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let context = PageContext {
            url: "https://example.com/post".to_string(),
            title: "Post".to_string(),
            content: "hello world".to_string(),
            timestamp: 42,
            ..PageContext::default()
        };

        save_context_snapshot(dir.path(), &context);
        let restored = load_context_snapshot(dir.path()).expect("snapshot present");
        assert_eq!(restored.url, "https://example.com/post");
        assert_eq!(restored.title, "Post");
        assert_eq!(restored.content_chars, 11);
    }

    #[test]
    fn missing_snapshot_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_context_snapshot(dir.path()).is_none());
    }
}
