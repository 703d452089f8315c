/// Parsed terminal input. Anything that does not start with `/` is a chat
/// message for the open widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Open(String),
    Chat(String),
    Ask(String),
    Webhook(String),
    Prompt(String),
    Widget,
    Close,
    View,
    Raw,
    CopyCode(String),
    CopyDoc,
    Save,
    Export,
    Help,
    Quit,
    Unknown(String),
}

pub(crate) fn parse(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if !line.starts_with('/') {
        return Some(Command::Chat(line.to_string()));
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    let command = match name {
        "/open" => Command::Open(rest.to_string()),
        "/ask" => Command::Ask(rest.to_string()),
        "/webhook" => Command::Webhook(rest.to_string()),
        "/prompt" => Command::Prompt(rest.to_string()),
        "/widget" => Command::Widget,
        "/close" => Command::Close,
        "/view" => Command::View,
        "/raw" => Command::Raw,
        "/copy" => Command::CopyCode(rest.to_string()),
        "/copy-doc" => Command::CopyDoc,
        "/save" => Command::Save,
        "/export" => Command::Export,
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    };
    Some(command)
}

pub(crate) const HELP: &str = "\
commands:
  /open <url>       capture a page and open the chat
  <text>            ask about the page (streaming)
  /ask <text>       ask without streaming
  /widget           toggle the chat open or closed
  /close            close the chat
  /webhook <url>    set the webhook endpoint
  /prompt <text>    run a prompt through the webhook
  /view             toggle preview/code view and print the document
  /raw              toggle raw/enhanced code view
  /copy <code-id>   copy a code block to the clipboard
  /copy-doc         copy the enhanced document
  /save             save the enhanced document to ./output
  /export           export the conversation to ./output
  /quit             exit";

#[cfg(test)]
mod tests {
    use super::{parse, Command};

    #[test]
    fn bare_text_is_chat() {
        assert_eq!(
            parse("what is this page about?"),
            Some(Command::Chat("what is this page about?".to_string()))
        );
    }

    #[test]
    fn slash_commands_take_arguments() {
        assert_eq!(
            parse("/open https://example.com"),
            Some(Command::Open("https://example.com".to_string()))
        );
        assert_eq!(
            parse("/copy pm-code-2"),
            Some(Command::CopyCode("pm-code-2".to_string()))
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(parse("   "), None);
    }

    #[test]
    fn unknown_commands_are_reported() {
        assert_eq!(parse("/nope"), Some(Command::Unknown("/nope".to_string())));
    }
}
