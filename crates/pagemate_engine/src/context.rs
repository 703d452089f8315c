use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::{PageCodeBlock, PageContext, PageImage, PageVideo};

/// Upper bound on extracted page text; longer pages are clipped with `...`.
pub const MAX_CONTENT_CHARS: usize = 8000;

/// Code shorter than this is ignored (inline fragments, prompt glyphs).
const MIN_CODE_CHARS: usize = 10;

/// Root candidates, most specific first. The first match wins.
const CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role=\"main\"]",
    ".content",
    ".main-content",
    ".post-content",
    ".entry-content",
    ".article-content",
    "#content",
    "#main",
    ".container",
];

const CODE_SELECTOR: &str =
    "pre, code, .highlight, .code-block, [class*=\"lang-\"], [class*=\"language-\"]";

const VIDEO_SELECTOR: &str =
    "video, iframe[src*=\"youtube\"], iframe[src*=\"vimeo\"], iframe[src*=\"embed\"]";

/// Elements whose text never reaches the context. Harvesting runs before
/// this list applies, so code or media inside a stripped container is still
/// captured.
const STRIP_TAGS: &[&str] = &[
    "nav", "header", "footer", "aside", "script", "style", "noscript",
];
const STRIP_CLASSES: &[&str] = &[
    "navigation",
    "nav",
    "menu",
    "sidebar",
    "advertisement",
    "ads",
    "ad",
    "comments",
    "comment-section",
    "social-share",
    "share-buttons",
];
const STRIP_ROLES: &[&str] = &["navigation", "banner", "contentinfo"];

/// Builds a `PageContext` from raw page HTML.
pub trait ContextExtractor: Send + Sync {
    fn extract(&self, html: &str, url: &str, selection: &str, timestamp: u64) -> PageContext;
}

#[derive(Debug, Default)]
pub struct DomContextExtractor;

impl ContextExtractor for DomContextExtractor {
    fn extract(&self, html: &str, url: &str, selection: &str, timestamp: u64) -> PageContext {
        let doc = Html::parse_document(html);
        let title = page_title(&doc);
        let root = content_root(&doc);

        // Harvest before stripping. The denylist removes whole containers,
        // and some of them (sidebars, comment threads) legitimately hold
        // code samples or figures we want in the context.
        let code_blocks = harvest_code_blocks(root);
        let images = harvest_images(root);
        let videos = harvest_videos(root);
        let content = collect_text(root);

        PageContext {
            url: url.to_string(),
            title,
            selection: selection.to_string(),
            content,
            code_blocks,
            images,
            videos,
            timestamp,
        }
    }
}

fn sel(source: &str) -> Option<Selector> {
    Selector::parse(source).ok()
}

fn page_title(doc: &Html) -> String {
    sel("title")
        .and_then(|s| doc.select(&s).next())
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn content_root(doc: &Html) -> ElementRef<'_> {
    for source in CONTENT_SELECTORS {
        if let Some(found) = sel(source).and_then(|s| doc.select(&s).next()) {
            return found;
        }
    }
    sel("body")
        .and_then(|s| doc.select(&s).next())
        .unwrap_or_else(|| doc.root_element())
}

fn harvest_code_blocks(root: ElementRef<'_>) -> Vec<PageCodeBlock> {
    let Some(selector) = sel(CODE_SELECTOR) else {
        return Vec::new();
    };
    let mut blocks = Vec::new();
    for (id, el) in root.select(&selector).enumerate() {
        let code = element_text(el);
        if code.trim().chars().count() <= MIN_CODE_CHARS {
            continue;
        }
        blocks.push(PageCodeBlock {
            id,
            language: code_language(el),
            code: code.trim().to_string(),
            context: previous_sibling_text(el, 100),
        });
    }
    blocks
}

fn harvest_images(root: ElementRef<'_>) -> Vec<PageImage> {
    let Some(selector) = sel("img") else {
        return Vec::new();
    };
    let mut images = Vec::new();
    for (id, el) in root.select(&selector).enumerate() {
        let src = el
            .value()
            .attr("src")
            .or_else(|| el.value().attr("data-src"))
            .or_else(|| el.value().attr("data-lazy"))
            .unwrap_or_default();
        let alt = el
            .value()
            .attr("alt")
            .filter(|alt| !alt.is_empty())
            .or_else(|| el.value().attr("title"))
            .unwrap_or_default();
        if src.is_empty() || src.contains("data:image") || alt.is_empty() {
            continue;
        }
        images.push(PageImage {
            id,
            src: src.to_string(),
            alt: alt.to_string(),
            caption: caption_text(el, 200),
            context: enclosing_block_text(el, 150),
        });
    }
    images
}

fn harvest_videos(root: ElementRef<'_>) -> Vec<PageVideo> {
    let Some(selector) = sel(VIDEO_SELECTOR) else {
        return Vec::new();
    };
    let mut videos = Vec::new();
    for (id, el) in root.select(&selector).enumerate() {
        let src = if el.value().name() == "video" {
            el.value()
                .attr("src")
                .map(ToOwned::to_owned)
                .or_else(|| first_source_src(el))
                .unwrap_or_default()
        } else {
            el.value().attr("src").unwrap_or_default().to_string()
        };
        if src.is_empty() {
            continue;
        }
        let title = el
            .value()
            .attr("title")
            .or_else(|| el.value().attr("aria-label"))
            .unwrap_or_default();
        videos.push(PageVideo {
            id,
            src,
            title: title.to_string(),
            caption: caption_text(el, 200),
            context: enclosing_block_text(el, 150),
        });
    }
    videos
}

fn first_source_src(el: ElementRef<'_>) -> Option<String> {
    let selector = sel("source")?;
    el.select(&selector)
        .next()
        .and_then(|source| source.value().attr("src"))
        .map(ToOwned::to_owned)
}

/// Language from `language-*`/`lang-*` class tokens on the element, then
/// from a `language-*` token on an ancestor. Defaults to `text`.
fn code_language(el: ElementRef<'_>) -> String {
    for class in el.value().classes() {
        if let Some(lang) = class
            .strip_prefix("language-")
            .or_else(|| class.strip_prefix("lang-"))
        {
            if !lang.is_empty() {
                return lang.to_string();
            }
        }
    }
    for ancestor in el.ancestors().filter_map(ElementRef::wrap) {
        for class in ancestor.value().classes() {
            if let Some(lang) = class.strip_prefix("language-") {
                if !lang.is_empty() {
                    return lang.to_string();
                }
            }
        }
    }
    "text".to_string()
}

fn previous_sibling_text(el: ElementRef<'_>, max_chars: usize) -> String {
    el.prev_siblings()
        .find_map(ElementRef::wrap)
        .map(|sibling| clip(element_text(sibling).trim(), max_chars))
        .unwrap_or_default()
}

fn caption_text(el: ElementRef<'_>, max_chars: usize) -> String {
    let figure_caption = el
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "figure")
        .and_then(|figure| {
            let selector = sel("figcaption")?;
            figure.select(&selector).next().map(element_text)
        });
    let caption = figure_caption.or_else(|| {
        el.next_siblings()
            .find_map(ElementRef::wrap)
            .map(element_text)
    });
    clip(caption.unwrap_or_default().trim(), max_chars)
}

fn enclosing_block_text(el: ElementRef<'_>, max_chars: usize) -> String {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| matches!(ancestor.value().name(), "p" | "div" | "section"))
        .map(|block| clip(element_text(block).trim(), max_chars))
        .unwrap_or_default()
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

fn clip(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Whole-subtree text with the denylist applied and whitespace runs
/// collapsed to single spaces, clipped to `MAX_CONTENT_CHARS`.
fn collect_text(root: ElementRef<'_>) -> String {
    let mut builder = TextBuilder::default();
    for child in root.children() {
        visit_node(child, &mut builder);
    }
    let content = builder.finish();
    if content.chars().count() > MAX_CONTENT_CHARS {
        let clipped: String = content.chars().take(MAX_CONTENT_CHARS).collect();
        format!("{clipped}...")
    } else {
        content
    }
}

fn visit_node(node: NodeRef<'_, Node>, builder: &mut TextBuilder) {
    match node.value() {
        Node::Text(text) => builder.append(text),
        Node::Element(_) => {
            if let Some(el) = ElementRef::wrap(node) {
                if is_stripped(el) {
                    return;
                }
            }
            for child in node.children() {
                visit_node(child, builder);
            }
        }
        _ => {}
    }
}

fn is_stripped(el: ElementRef<'_>) -> bool {
    if STRIP_TAGS.contains(&el.value().name()) {
        return true;
    }
    if el
        .value()
        .classes()
        .any(|class| STRIP_CLASSES.contains(&class))
    {
        return true;
    }
    matches!(el.value().attr("role"), Some(role) if STRIP_ROLES.contains(&role))
}

#[derive(Default)]
struct TextBuilder {
    out: String,
    pending_space: bool,
}

impl TextBuilder {
    fn append(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                self.pending_space = true;
            } else {
                if self.pending_space && !self.out.is_empty() {
                    self.out.push(' ');
                }
                self.pending_space = false;
                self.out.push(ch);
            }
        }
    }

    fn finish(self) -> String {
        self.out
    }
}
