use pagemate_engine::MarkdownRenderer;

fn render(markdown: &str) -> String {
    MarkdownRenderer::new().render(markdown)
}

#[test]
fn bold_renders_to_strong() {
    assert!(render("**a**").contains("<strong>a</strong>"));
}

#[test]
fn headers_and_lists_render() {
    let html = render("# Title\n\n- one\n- two\n\n1. first\n");
    assert!(html.contains("<h1>Title</h1>"));
    assert!(html.contains("<ul>"));
    assert!(html.contains("<li>one</li>"));
    assert!(html.contains("<ol>"));
    assert!(html.contains("<li>first</li>"));
}

#[test]
fn fenced_block_carries_label_id_and_copy_button() {
    let html = render("```js\nconsole.log(1)\n```");

    assert_eq!(html.matches("pm-code-block").count(), 1);
    assert!(html.contains("<span class=\"pm-code-language\">JS</span>"));
    assert!(html.contains("<code class=\"language-js\" id=\"pm-code-1\">console.log(1)</code>"));
    assert!(html.contains("data-code-id=\"pm-code-1\""));
    assert!(html.contains("onclick=\"copyCodeToClipboard('pm-code-1')\""));
}

#[test]
fn unlabelled_fences_default_to_text() {
    let html = render("```\nplain body\n```");
    assert!(html.contains("<span class=\"pm-code-language\">TEXT</span>"));
    assert!(html.contains("class=\"language-text\""));
}

#[test]
fn code_bodies_are_escaped() {
    let html = render("```html\n<div>&</div>\n```");
    assert!(html.contains("&lt;div&gt;&amp;&lt;/div&gt;"));
}

#[test]
fn inline_code_renders_normally() {
    assert!(render("use `cargo run` here").contains("<code>cargo run</code>"));
}

#[test]
fn links_open_in_a_new_tab() {
    let html = render("[docs](https://example.com)");
    assert!(html.contains(
        "<a href=\"https://example.com\" target=\"_blank\" rel=\"noreferrer\">docs</a>"
    ));
}

#[test]
fn images_come_with_a_fallback_block() {
    let html = render("![diagram](https://example.com/d.png)");
    assert_eq!(html.matches("pm-image-container").count(), 1);
    assert!(html.contains("src=\"https://example.com/d.png\""));
    assert!(html.contains("alt=\"diagram\""));
    assert!(html.contains("onerror="));
    assert!(html.contains("Image: diagram"));
    assert!(html.contains(">View Image</a>"));
}

#[test]
fn images_without_alt_text_fall_back_to_a_placeholder() {
    let html = render("![](https://example.com/d.png)");
    assert!(html.contains("Image: No description"));
}

#[test]
fn empty_and_odd_input_render_without_panicking() {
    assert_eq!(render(""), "");
    render("**unclosed");
    render("``` ");
    render("[]()");
    render("![](");
}

#[test]
fn paragraphs_split_on_blank_lines() {
    let html = render("one\n\ntwo");
    assert_eq!(html.matches("<p>").count(), 2);
}
