use crate::TranscriptEntry;

/// Filename the enhanced document downloads as.
pub const DOCUMENT_FILENAME: &str = "enhanced-content.html";

/// Stylesheet baked into every enhanced document.
const DOCUMENT_STYLE: &str = r#"* { box-sizing: border-box; }
body {
  font-family: 'Inter', -apple-system, BlinkMacSystemFont, sans-serif;
  line-height: 1.6;
  margin: 0;
  padding: 20px;
  background: linear-gradient(135deg, #f8fafc 0%, #e2e8f0 100%);
  color: #334155;
}
h1, h2, h3, h4, h5, h6 {
  color: #1e293b;
  margin-top: 1.5em;
  margin-bottom: 0.5em;
  font-weight: 600;
}
h1 { font-size: 2.5rem; background: linear-gradient(135deg, #7c3aed, #a855f7); -webkit-background-clip: text; -webkit-text-fill-color: transparent; }
h2 { font-size: 2rem; }
h3 { font-size: 1.5rem; }
p { margin-bottom: 1em; }
a {
  color: #7c3aed;
  text-decoration: none;
  transition: all 0.3s ease;
  border-bottom: 1px solid transparent;
}
a:hover {
  color: #a855f7;
  border-bottom-color: currentColor;
}
img {
  max-width: 100%;
  height: auto;
  border-radius: 12px;
  box-shadow: 0 10px 30px rgba(0,0,0,0.1);
  transition: transform 0.3s ease;
}
img:hover { transform: scale(1.02); }
.container {
  max-width: 1200px;
  margin: 0 auto;
  padding: 20px;
  background: white;
  border-radius: 16px;
  box-shadow: 0 10px 40px rgba(0,0,0,0.1);
}
button, .btn {
  background: linear-gradient(135deg, #7c3aed, #a855f7);
  color: white;
  padding: 12px 24px;
  border: none;
  border-radius: 8px;
  cursor: pointer;
  font-weight: 500;
  transition: all 0.3s ease;
  display: inline-block;
  text-decoration: none;
}
button:hover, .btn:hover {
  transform: translateY(-2px);
  box-shadow: 0 10px 30px rgba(124, 58, 237, 0.3);
}
.card {
  background: white;
  padding: 24px;
  border-radius: 12px;
  box-shadow: 0 4px 20px rgba(0,0,0,0.08);
  margin: 20px 0;
  border: 1px solid #e2e8f0;
}
ul, ol { padding-left: 1.5em; }
li { margin: 0.5em 0; }
blockquote {
  border-left: 4px solid #7c3aed;
  padding-left: 1.5em;
  margin: 1.5em 0;
  font-style: italic;
  color: #64748b;
}
code {
  background: #f1f5f9;
  padding: 2px 6px;
  border-radius: 4px;
  font-family: 'Fira Code', monospace;
  color: #7c3aed;
}
pre {
  background: #1e293b;
  color: #e2e8f0;
  padding: 20px;
  border-radius: 8px;
  overflow-x: auto;
  margin: 1em 0;
}
table {
  width: 100%;
  border-collapse: collapse;
  margin: 1.5em 0;
  background: white;
  border-radius: 8px;
  overflow: hidden;
  box-shadow: 0 4px 20px rgba(0,0,0,0.08);
}
th, td {
  padding: 12px;
  text-align: left;
  border-bottom: 1px solid #e2e8f0;
}
th {
  background: linear-gradient(135deg, #7c3aed, #a855f7);
  color: white;
  font-weight: 600;
}
@media (max-width: 768px) {
  body { padding: 10px; }
  .container { padding: 15px; }
  h1 { font-size: 2rem; }
  h2 { font-size: 1.5rem; }
}"#;

/// Wraps received HTML in the fixed document template.
///
/// The output is a pure function of the input: no timestamps, ids, or
/// other run-dependent content, so copy, save, and re-render all agree.
pub fn enhance_html(raw: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"en\">\n",
            "<head>\n",
            "<meta charset=\"UTF-8\">\n",
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
            "<title>Enhanced Content</title>\n",
            "<style>\n{style}\n</style>\n",
            "</head>\n",
            "<body>\n",
            "<div class=\"container\">\n{raw}\n</div>\n",
            "</body>\n",
            "</html>\n"
        ),
        style = DOCUMENT_STYLE,
        raw = raw,
    )
}

/// Builds the body of an exported conversation, one card per entry.
/// Entries without pre-rendered HTML fall back to their escaped text.
pub fn transcript_html(entries: &[TranscriptEntry]) -> String {
    let mut body = String::from("<h1>Conversation</h1>\n");
    for entry in entries {
        body.push_str("<div class=\"card\">\n");
        body.push_str(&format!("<h3>{}</h3>\n", escape_text(&entry.speaker)));
        if entry.html.is_empty() {
            body.push_str(&format!("<p>{}</p>\n", escape_text(&entry.text)));
        } else {
            body.push_str(&entry.html);
            body.push('\n');
        }
        body.push_str("</div>\n");
    }
    body
}

fn escape_text(text: &str) -> String {
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
