use pagemate_engine::{ContextExtractor, DomContextExtractor, MAX_CONTENT_CHARS};
use pretty_assertions::assert_eq;

fn extract(html: &str) -> pagemate_engine::PageContext {
    DomContextExtractor.extract(html, "https://example.com/page", "", 1700000000000)
}

#[test]
fn title_and_content_come_from_the_main_element() {
    let html = r#"
    <html><head><title>Guide</title></head>
    <body>
        <nav>Site navigation</nav>
        <main><p>Body text that matters.</p></main>
        <footer>Footer junk</footer>
    </body></html>
    "#;
    let context = extract(html);
    assert_eq!(context.title, "Guide");
    assert_eq!(context.content, "Body text that matters.");
    assert_eq!(context.url, "https://example.com/page");
    assert_eq!(context.timestamp, 1700000000000);
}

#[test]
fn body_is_the_fallback_root_and_denylist_applies() {
    let html = r#"
    <html><body>
        <div class="sidebar">Sidebar links</div>
        <div role="banner">Banner</div>
        <p>Keep this.</p>
        <script>var x = "never this";</script>
    </body></html>
    "#;
    let context = extract(html);
    assert_eq!(context.content, "Keep this.");
}

#[test]
fn short_inline_code_is_not_harvested() {
    let html = r#"<html><body><main><p>Use <code>ls -a</code> here.</p></main></body></html>"#;
    let context = extract(html);
    assert!(context.code_blocks.is_empty());
}

#[test]
fn substantial_code_is_harvested_with_its_language() {
    let html = r#"
    <html><body><main>
        <p>Install it like so:</p>
        <pre><code class="language-rust">fn main() { println!("hi"); }</code></pre>
    </main></body></html>
    "#;
    let context = extract(html);
    // <pre> and its inner <code> both match the harvest selector.
    assert_eq!(context.code_blocks.len(), 2);
    assert_eq!(context.code_blocks[1].language, "rust");
    assert_eq!(
        context.code_blocks[1].code,
        "fn main() { println!(\"hi\"); }"
    );
    assert_eq!(context.code_blocks[0].context, "Install it like so:");
}

#[test]
fn language_falls_back_to_an_ancestor_class() {
    let html = r#"
    <html><body><main>
        <div class="language-python"><pre>print("hello pagemate")</pre></div>
    </main></body></html>
    "#;
    let context = extract(html);
    assert!(!context.code_blocks.is_empty());
    assert!(context
        .code_blocks
        .iter()
        .all(|block| block.language == "python"));
}

#[test]
fn code_inside_a_stripped_container_is_still_harvested() {
    // Harvest runs before the denylist strips the aside; the code block
    // must survive even though its text is excluded from `content`.
    let html = r#"
    <html><body><main>
        <aside class="sidebar"><pre>let snippet = "worth keeping";</pre></aside>
        <p>Visible text.</p>
    </main></body></html>
    "#;
    let context = extract(html);
    assert_eq!(context.content, "Visible text.");
    assert_eq!(context.code_blocks.len(), 1);
    assert!(context.code_blocks[0].code.contains("worth keeping"));
}

#[test]
fn one_image_with_alt_and_real_src_is_harvested() {
    let html = r#"
    <html><body><main>
        <img alt="x" src="https://example.com/x.png">
        <img alt="" src="https://example.com/no-alt.png">
        <img alt="inline" src="data:image/png;base64,AAAA">
    </main></body></html>
    "#;
    let context = extract(html);
    assert_eq!(context.images.len(), 1);
    assert_eq!(context.images[0].alt, "x");
    assert_eq!(context.images[0].src, "https://example.com/x.png");
}

#[test]
fn lazy_loaded_images_and_figcaptions_are_picked_up() {
    let html = r#"
    <html><body><main>
        <figure>
            <img alt="diagram" data-src="https://example.com/d.png">
            <figcaption>The architecture</figcaption>
        </figure>
    </main></body></html>
    "#;
    let context = extract(html);
    assert_eq!(context.images.len(), 1);
    assert_eq!(context.images[0].src, "https://example.com/d.png");
    assert_eq!(context.images[0].caption, "The architecture");
}

#[test]
fn videos_and_known_embeds_are_harvested() {
    let html = r#"
    <html><body><main>
        <video src="https://example.com/talk.mp4" title="Talk"></video>
        <iframe src="https://www.youtube.com/embed/abc123"></iframe>
        <iframe src="https://example.com/widget"></iframe>
    </main></body></html>
    "#;
    let context = extract(html);
    assert_eq!(context.videos.len(), 2);
    assert_eq!(context.videos[0].title, "Talk");
    assert!(context.videos[1].src.contains("youtube"));
}

#[test]
fn long_content_is_clipped_with_an_ellipsis() {
    let word = "word ";
    let body: String = word.repeat(2500);
    let html = format!("<html><body><main><p>{body}</p></main></body></html>");
    let context = extract(&html);
    assert!(context.content.ends_with("..."));
    assert_eq!(context.content.chars().count(), MAX_CONTENT_CHARS + 3);
}

#[test]
fn selection_is_carried_through() {
    let context =
        DomContextExtractor.extract("<html><body><main>t</main></body></html>", "u", "picked", 0);
    assert_eq!(context.selection, "picked");
}
