use std::sync::Arc;

use imoscope_types::{ImageAttachment, Message};

/// In-memory state of the one live conversation. Single source of truth for
/// the UI. Fields are crate-private so only the controller's transition
/// handlers can mutate them; everything else reads through the getters.
#[derive(Debug, Default)]
pub struct Session {
    pub(crate) session_id: Option<String>,
    pub(crate) messages: Vec<Message>,
    pub(crate) image: Option<Arc<ImageAttachment>>,
    pub(crate) draft_prompt: String,
    pub(crate) loading: bool,
    pub(crate) error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Server-issued identifier; absent until the initial analysis succeeds.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// The ordered transcript, chronological and append-only.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn image(&self) -> Option<&Arc<ImageAttachment>> {
        self.image.as_ref()
    }

    pub fn draft_prompt(&self) -> &str {
        &self.draft_prompt
    }

    /// True for the whole span between request dispatch and resolution.
    /// Submit controls are disabled whenever this is set.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True once the initial analysis has succeeded.
    pub fn is_active(&self) -> bool {
        self.session_id.is_some()
    }
}
