use std::sync::Once;

use pagemate_core::{update, AppState, Effect, Msg, ViewMode};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(chat_logging::initialize_for_tests);
}

fn filled_form(state: AppState) -> AppState {
    let (state, _) = update(state, Msg::PromptChanged("make a landing page".to_string()));
    let (state, _) = update(
        state,
        Msg::WebhookUrlChanged("https://hooks.example.com/run".to_string()),
    );
    state
}

#[test]
fn empty_prompt_is_rejected_with_a_message() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::PromptSubmitted);

    assert!(effects.is_empty());
    assert_eq!(
        state.view().form.error.as_deref(),
        Some("Please enter a prompt")
    );
}

#[test]
fn missing_webhook_url_is_rejected_with_a_message() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::PromptChanged("make something".to_string()),
    );
    let (state, effects) = update(state, Msg::PromptSubmitted);

    assert!(effects.is_empty());
    assert_eq!(
        state.view().form.error.as_deref(),
        Some("Please enter a webhook URL")
    );
}

#[test]
fn valid_submission_posts_and_sets_loading() {
    init_logging();
    let state = filled_form(AppState::new());

    let (state, effects) = update(state, Msg::PromptSubmitted);

    assert!(state.view().form.loading);
    assert!(state.view().form.error.is_none());
    assert_eq!(
        effects,
        vec![Effect::SendPrompt {
            prompt: "make a landing page".to_string(),
            webhook_url: "https://hooks.example.com/run".to_string(),
        }]
    );
}

#[test]
fn loading_gates_resubmission() {
    init_logging();
    let state = filled_form(AppState::new());
    let (state, _) = update(state, Msg::PromptSubmitted);

    let (_, effects) = update(state, Msg::PromptSubmitted);
    assert!(effects.is_empty());
}

#[test]
fn success_stores_the_document_in_preview_mode() {
    init_logging();
    let state = filled_form(AppState::new());
    let (state, _) = update(state, Msg::PromptSubmitted);

    let (state, _) = update(
        state,
        Msg::WebhookSucceeded {
            raw_html: "<p>x</p>".to_string(),
            enhanced_html: "<!DOCTYPE html>...".to_string(),
        },
    );

    let view = state.view();
    assert!(!view.form.loading);
    let document = view.document.expect("document stored");
    assert_eq!(document.mode, ViewMode::Preview);
    assert!(!document.show_raw);
    assert_eq!(document.body, "<!DOCTYPE html>...");
}

#[test]
fn failure_clears_loading_and_surfaces_the_error() {
    init_logging();
    let state = filled_form(AppState::new());
    let (state, _) = update(state, Msg::PromptSubmitted);

    let (state, _) = update(
        state,
        Msg::WebhookFailed {
            message: "no HTML content in response. Available keys: none".to_string(),
        },
    );

    let view = state.view();
    assert!(!view.form.loading);
    assert!(view
        .form
        .error
        .as_deref()
        .is_some_and(|error| error.contains("Available keys: none")));
}

#[test]
fn code_mode_switches_between_enhanced_and_raw() {
    init_logging();
    let state = filled_form(AppState::new());
    let (state, _) = update(state, Msg::PromptSubmitted);
    let (state, _) = update(
        state,
        Msg::WebhookSucceeded {
            raw_html: "<p>raw</p>".to_string(),
            enhanced_html: "<html>enhanced</html>".to_string(),
        },
    );

    let (state, _) = update(state, Msg::ViewModeToggled);
    let view = state.view();
    let document = view.document.expect("document");
    assert_eq!(document.mode, ViewMode::Code);
    assert_eq!(document.body, "<html>enhanced</html>");

    let (state, _) = update(state, Msg::RawToggled);
    let document = state.view().document.expect("document");
    assert!(document.show_raw);
    assert_eq!(document.body, "<p>raw</p>");
}

#[test]
fn copy_and_save_require_a_document() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::CopyDocumentRequested);
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::SaveRequested);
    assert!(effects.is_empty());

    let state = filled_form(state);
    let (state, _) = update(state, Msg::PromptSubmitted);
    let (state, _) = update(
        state,
        Msg::WebhookSucceeded {
            raw_html: "<p>x</p>".to_string(),
            enhanced_html: "<html>x</html>".to_string(),
        },
    );
    let (state, effects) = update(state, Msg::CopyDocumentRequested);
    assert_eq!(effects, vec![Effect::CopyDocument]);
    let (_, effects) = update(state, Msg::SaveRequested);
    assert_eq!(effects, vec![Effect::SaveDocument]);
}

#[test]
fn copy_feedback_sets_and_expires() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::CopyFinished { success: true });
    assert_eq!(state.view().copy_feedback, Some(true));

    let (state, _) = update(state, Msg::CopyFeedbackExpired);
    assert_eq!(state.view().copy_feedback, None);
}
