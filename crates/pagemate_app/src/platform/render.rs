use pagemate_core::{AppViewModel, Role};

/// A piece of terminal output. `Partial` segments belong to the line a
/// streaming answer is being printed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RenderOp {
    Line(String),
    Partial(String),
}

/// Turns view-model changes into terminal output, printing streamed answer
/// text incrementally instead of re-printing the accumulator every chunk.
#[derive(Debug, Default)]
pub(crate) struct Renderer {
    widget_open: bool,
    context_line: String,
    /// Assistant messages fully printed so far.
    completed: usize,
    /// Already-printed prefix of the in-flight assistant message.
    printed: String,
    mid_line: bool,
    error: Option<String>,
    feedback: Option<bool>,
    saved: Option<String>,
    document_seen: bool,
}

impl Renderer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn apply(&mut self, view: &AppViewModel) -> Vec<RenderOp> {
        let mut ops = Vec::new();

        if view.widget_open != self.widget_open {
            self.widget_open = view.widget_open;
            self.finish_line(&mut ops);
            ops.push(RenderOp::Line(
                if view.widget_open { "chat open" } else { "chat closed" }.to_string(),
            ));
        }

        if view.context_line != self.context_line {
            self.context_line = view.context_line.clone();
            if !view.context_line.is_empty() {
                self.finish_line(&mut ops);
                ops.push(RenderOp::Line(view.context_line.clone()));
            }
        }

        self.render_messages(view, &mut ops);

        if view.form.error != self.error {
            self.error = view.form.error.clone();
            if let Some(error) = &view.form.error {
                self.finish_line(&mut ops);
                ops.push(RenderOp::Line(format!("error: {error}")));
            }
        }

        if view.document.is_some() && !self.document_seen {
            self.document_seen = true;
            self.finish_line(&mut ops);
            ops.push(RenderOp::Line(
                "document ready: /view to print, /copy-doc to copy, /save to download".to_string(),
            ));
        }

        if view.copy_feedback != self.feedback {
            self.feedback = view.copy_feedback;
            match view.copy_feedback {
                Some(true) => ops.push(RenderOp::Line("✓ copied".to_string())),
                Some(false) => ops.push(RenderOp::Line("✗ copy failed".to_string())),
                None => {}
            }
        }

        if view.last_saved != self.saved {
            self.saved = view.last_saved.clone();
            if let Some(path) = &view.last_saved {
                self.finish_line(&mut ops);
                ops.push(RenderOp::Line(format!("saved {path}")));
            }
        }

        ops
    }

    fn render_messages(&mut self, view: &AppViewModel, ops: &mut Vec<RenderOp>) {
        let assistants: Vec<_> = view
            .messages
            .iter()
            .filter(|row| row.role == Role::Assistant)
            .collect();

        while self.completed < assistants.len() {
            let row = assistants[self.completed];
            if row.streaming {
                let delta = match row.text.strip_prefix(self.printed.as_str()) {
                    Some(delta) => delta.to_string(),
                    // The message text was replaced rather than extended;
                    // start it over on a fresh line.
                    None => {
                        self.finish_line(ops);
                        self.printed.clear();
                        row.text.clone()
                    }
                };
                if !self.mid_line {
                    ops.push(RenderOp::Partial("assistant> ".to_string()));
                    self.mid_line = true;
                }
                if !delta.is_empty() {
                    ops.push(RenderOp::Partial(delta));
                    self.printed = row.text.clone();
                }
                return;
            }

            // Completed row: print whatever was not already streamed out.
            let remainder = match row.text.strip_prefix(self.printed.as_str()) {
                Some(rest) => rest.to_string(),
                None => {
                    self.finish_line(ops);
                    row.text.clone()
                }
            };
            if !self.mid_line {
                ops.push(RenderOp::Partial("assistant> ".to_string()));
            }
            ops.push(RenderOp::Line(remainder));
            self.mid_line = false;
            self.printed.clear();
            self.completed += 1;
        }
    }

    fn finish_line(&mut self, ops: &mut Vec<RenderOp>) {
        if self.mid_line {
            ops.push(RenderOp::Line(String::new()));
            self.mid_line = false;
        }
    }

    /// The document body for `/view` and `/raw`, if one is loaded.
    pub(crate) fn document_body(view: &AppViewModel) -> Option<&str> {
        view.document.as_ref().map(|doc| doc.body.as_str())
    }
}
