use std::path::Path;
use std::sync::Arc;

use imoscope_api::{AnalysisBackend, AnalyzeResponse, FollowUpResponse};
use imoscope_types::{ChatError, ImageAttachment, Message};

use crate::session::Session;

/// Message shown when the initial submission is missing its inputs.
const MISSING_INPUT: &str = "Please select an image and enter a prompt.";
const EMPTY_PROMPT: &str = "Please enter a prompt.";

/// Where the conversation currently stands. Fully derived from the session's
/// `(loading, session_id)` pair; there is no hidden fifth state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// No session, no request in flight.
    Idle,
    /// Initial analysis dispatched, response pending.
    AwaitingInitialAnalysis,
    /// Session established, no request in flight.
    ActiveSession,
    /// Follow-up dispatched on an established session.
    AwaitingFollowUp,
}

/// Drives the session lifecycle: attach → analyze → follow-up loop → reset.
/// The only writer of session state. Errors never propagate out of a
/// transition; they land in the session's user-visible error string.
pub struct ConversationController {
    session: Session,
    backend: Arc<dyn AnalysisBackend>,
    /// Incremented on every reset. A response whose originating epoch no
    /// longer matches is stale and must not touch the new session.
    epoch: u64,
}

impl ConversationController {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self {
            session: Session::new(),
            backend,
            epoch: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> ControllerState {
        match (self.session.loading, self.session.session_id.is_some()) {
            (false, false) => ControllerState::Idle,
            (true, false) => ControllerState::AwaitingInitialAnalysis,
            (true, true) => ControllerState::AwaitingFollowUp,
            (false, true) => ControllerState::ActiveSession,
        }
    }

    /// Update the prompt the user is composing. Allowed at any time; drafts
    /// are not part of the request that may be in flight.
    pub fn set_draft(&mut self, prompt: impl Into<String>) {
        self.session.draft_prompt = prompt.into();
    }

    /// Read an image file and attach it to the pre-session state. Rejected
    /// while a request is in flight. Replacing a previously attached image
    /// is allowed until the session starts.
    pub async fn attach_image(&mut self, path: &Path) -> bool {
        if self.session.loading {
            return false;
        }
        self.session.error = None;
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.session.error = Some(format!("Could not read {}: {}", path.display(), e));
                return false;
            }
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        match ImageAttachment::new(file_name, bytes) {
            Ok(attachment) => {
                self.session.image = Some(Arc::new(attachment));
                true
            }
            Err(e) => {
                self.session.error = Some(e.to_string());
                false
            }
        }
    }

    /// Submit the attached image plus the draft prompt for initial analysis.
    pub async fn submit_initial(&mut self) {
        let Some((epoch, image, prompt)) = self.begin_initial() else {
            return;
        };
        let backend = Arc::clone(&self.backend);
        let outcome = backend.analyze(&image, &prompt).await;
        self.finish_initial(epoch, outcome);
    }

    /// Submit the draft prompt as a follow-up on the active session.
    pub async fn submit_follow_up(&mut self) {
        let Some((epoch, session_id, prompt)) = self.begin_follow_up() else {
            return;
        };
        let backend = Arc::clone(&self.backend);
        let outcome = backend.follow_up(&session_id, &prompt).await;
        self.finish_follow_up(epoch, outcome);
    }

    /// Drop the whole session and start over. Callers must have obtained the
    /// user's confirmation first. Safe to call while a request is in flight:
    /// bumping the epoch makes the eventual response a no-op.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.session = Session::new();
    }

    pub(crate) fn begin_initial(&mut self) -> Option<(u64, Arc<ImageAttachment>, String)> {
        if self.session.loading {
            return None;
        }
        self.session.error = None;
        if self.session.session_id.is_some() {
            self.session.error =
                Some("A session is already active. Ask a follow-up or start a new chat.".to_string());
            return None;
        }
        let prompt = self.session.draft_prompt.trim().to_string();
        let image = match self.session.image.clone() {
            Some(image) if !prompt.is_empty() => image,
            _ => {
                self.session.error = Some(MISSING_INPUT.to_string());
                return None;
            }
        };
        self.session.messages.push(Message::user(&prompt));
        self.session.loading = true;
        Some((self.epoch, image, prompt))
    }

    pub(crate) fn finish_initial(&mut self, epoch: u64, outcome: Result<AnalyzeResponse, ChatError>) {
        if epoch != self.epoch {
            // Stale response from before a reset. The reset already restored
            // the idle state; applying this would resurrect a dead session.
            return;
        }
        self.session.loading = false;
        match outcome {
            Ok(response) => {
                self.session.session_id = Some(response.session_id);
                self.session.messages.push(Message::assistant(response.result));
                self.session.draft_prompt.clear();
            }
            Err(e) => {
                // Roll back the optimistic user message so an absent session
                // id never coexists with a non-empty transcript.
                self.session.messages.pop();
                self.session.error = Some(e.to_string());
            }
        }
    }

    pub(crate) fn begin_follow_up(&mut self) -> Option<(u64, String, String)> {
        if self.session.loading {
            return None;
        }
        self.session.error = None;
        let Some(session_id) = self.session.session_id.clone() else {
            self.session.error = Some("No active session. Analyze an image first.".to_string());
            return None;
        };
        let prompt = self.session.draft_prompt.trim().to_string();
        if prompt.is_empty() {
            self.session.error = Some(EMPTY_PROMPT.to_string());
            return None;
        }
        self.session.messages.push(Message::user(&prompt));
        self.session.loading = true;
        Some((self.epoch, session_id, prompt))
    }

    pub(crate) fn finish_follow_up(
        &mut self,
        epoch: u64,
        outcome: Result<FollowUpResponse, ChatError>,
    ) {
        if epoch != self.epoch {
            return;
        }
        self.session.loading = false;
        match outcome {
            Ok(response) => {
                self.session.messages.push(Message::assistant(response.result));
                self.session.draft_prompt.clear();
            }
            Err(e) => {
                // Roll back the optimistic user message; the transcript keeps
                // alternating strictly even after a failed retry.
                self.session.messages.pop();
                self.session.error = Some(e.to_string());
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn current_epoch(&self) -> u64 {
        self.epoch
    }

    #[cfg(test)]
    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }
}
