use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

/// Markdown-to-HTML renderer for assistant answers.
///
/// Parsing is delegated to `pulldown-cmark`; fenced code blocks, images,
/// and links are intercepted and re-emitted as the widget's own markup
/// (language-labelled code container with a copy button, image container
/// with a load-failure fallback, links opening in a new tab). Code-block
/// ids are sequential per render, so re-rendering the same input yields
/// the same document.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, Options::empty());
        let events = rewrite_events(parser);
        let mut out = String::new();
        html::push_html(&mut out, events.into_iter());
        out
    }
}

fn rewrite_events(parser: Parser<'_>) -> Vec<Event<'_>> {
    let mut events = Vec::new();
    let mut code_seq = 0usize;
    // (language, accumulated code) while inside a code block
    let mut code: Option<(String, String)> = None;
    // (src, accumulated alt text) while inside an image
    let mut image: Option<(String, String)> = None;

    for event in parser {
        if image.is_some() {
            match event {
                Event::End(TagEnd::Image) => {
                    if let Some((src, alt)) = image.take() {
                        events.push(Event::Html(image_container_html(&src, &alt).into()));
                    }
                }
                Event::Text(text) | Event::Code(text) => {
                    if let Some((_, alt)) = image.as_mut() {
                        alt.push_str(&text);
                    }
                }
                _ => {}
            }
            continue;
        }

        if code.is_some() {
            match event {
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((language, body)) = code.take() {
                        code_seq += 1;
                        events.push(Event::Html(
                            code_block_html(&language, body.trim(), code_seq).into(),
                        ));
                    }
                }
                Event::Text(text) => {
                    if let Some((_, body)) = code.as_mut() {
                        body.push_str(&text);
                    }
                }
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .unwrap_or_default()
                        .to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                code = Some((language, String::new()));
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                image = Some((dest_url.to_string(), String::new()));
            }
            Event::Start(Tag::Link { dest_url, .. }) => {
                events.push(Event::Html(
                    format!(
                        "<a href=\"{href}\" target=\"_blank\" rel=\"noreferrer\">",
                        href = escape_attr(&dest_url)
                    )
                    .into(),
                ));
            }
            Event::End(TagEnd::Link) => {
                events.push(Event::Html("</a>".into()));
            }
            other => events.push(other),
        }
    }

    events
}

fn code_block_html(language: &str, body: &str, seq: usize) -> String {
    let language = if language.is_empty() { "text" } else { language };
    let label = language.to_uppercase();
    let class = language.to_ascii_lowercase();
    let id = format!("pm-code-{seq}");
    format!(
        concat!(
            "<div class=\"pm-code-block\">",
            "<div class=\"pm-code-header\">",
            "<span class=\"pm-code-language\">{label}</span>",
            "<button class=\"pm-copy-btn\" data-code-id=\"{id}\" ",
            "onclick=\"copyCodeToClipboard('{id}')\">📋</button>",
            "</div>",
            "<pre><code class=\"language-{class}\" id=\"{id}\">{body}</code></pre>",
            "</div>"
        ),
        label = escape_html(&label),
        id = id,
        class = escape_attr(&class),
        body = escape_html(body),
    )
}

fn image_container_html(src: &str, alt: &str) -> String {
    let label = if alt.is_empty() { "No description" } else { alt };
    format!(
        concat!(
            "<div class=\"pm-image-container\">",
            "<img src=\"{src}\" alt=\"{alt}\" class=\"pm-response-image\" ",
            "onerror=\"this.style.display='none'; ",
            "this.nextElementSibling.style.display='block';\">",
            "<div class=\"pm-image-fallback\" style=\"display:none;\">",
            "<span class=\"pm-image-icon\">🖼️</span>",
            "<span class=\"pm-image-text\">Image: {label}</span>",
            "<a href=\"{src}\" target=\"_blank\" class=\"pm-image-link\">View Image</a>",
            "</div>",
            "</div>"
        ),
        src = escape_attr(src),
        alt = escape_attr(alt),
        label = escape_html(label),
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::MarkdownRenderer;

    #[test]
    fn emphasis_nests_inside_links() {
        let html = MarkdownRenderer.render("[see **docs**](https://example.com)");
        assert!(html.contains(
            "<a href=\"https://example.com\" target=\"_blank\" rel=\"noreferrer\">see <strong>docs</strong></a>"
        ));
    }

    #[test]
    fn code_ids_are_sequential_within_a_render() {
        let html = MarkdownRenderer.render("```\na b c d e f\n```\n\n```\ng h i j k l\n```\n");
        assert!(html.contains("id=\"pm-code-1\""));
        assert!(html.contains("id=\"pm-code-2\""));
    }

    #[test]
    fn render_is_stable_across_calls() {
        let input = "# t\n\n```js\nlet x = 1;\n```\n";
        assert_eq!(MarkdownRenderer.render(input), MarkdownRenderer.render(input));
    }
}
