//! PageMate core: pure state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{
    AppState, ContextSummary, DocumentState, FormState, MessageEntry, RequestId, Role,
    TranscriptEntry, ViewMode, WidgetState,
};
pub use update::update;
pub use view_model::{AppViewModel, DocumentView, FormView, MessageRowView, COPY_FEEDBACK_MS};
