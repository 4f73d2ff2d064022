use std::collections::HashMap;

use tokio_util::sync::CancellationToken;

use crate::error::ControllerError;
use crate::types::SessionId;

/// Upload sessions keyed by ID, at most one live at a time.
///
/// Cancellation addresses a session by ID, so a finished or replaced
/// session can never be aborted through a stale handle.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, CancellationToken>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new session.
    ///
    /// Fails with [`ControllerError::UploadInProgress`] while another session
    /// is still registered.
    pub fn register(
        &mut self,
        id: SessionId,
        cancel: CancellationToken,
    ) -> Result<(), ControllerError> {
        if let Some(active) = self.active() {
            return Err(ControllerError::UploadInProgress(active));
        }
        self.sessions.insert(id, cancel);
        Ok(())
    }

    /// The live session, if any.
    pub fn active(&self) -> Option<SessionId> {
        self.sessions.keys().next().copied()
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// Signals cancellation for `id`.
    ///
    /// Returns `true` only for the call that actually cancelled the token;
    /// repeated calls and unknown IDs return `false`.
    pub fn cancel(&self, id: SessionId) -> bool {
        match self.sessions.get(&id) {
            Some(token) if !token.is_cancelled() => {
                token.cancel();
                true
            }
            _ => false,
        }
    }

    /// Forgets a session once it reached a terminal state.
    pub fn finish(&mut self, id: SessionId) -> Result<(), ControllerError> {
        self.sessions
            .remove(&id)
            .map(|_| ())
            .ok_or(ControllerError::UnknownSession(id))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
