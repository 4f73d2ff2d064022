//! Events and states shared by the controller and its front-ends.

use std::fmt;

use resumedrop_transfer::{SelectedFile, TransferProgress, UploadResponse};
use uuid::Uuid;

/// Identifier of one upload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 200 with a decodable metadata object.
    Succeeded,
    /// 200 whose body was not a JSON object.
    ParseError,
    /// Any status other than 200.
    Failed { status: u16 },
    /// The request never produced a response.
    NetworkError,
    /// Aborted at the user's request.
    Cancelled,
}

/// Lifecycle of the controller's upload slot.
///
/// `Done` keeps the last outcome for inspection and behaves like `Idle`
/// when the next upload is triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    InFlight { id: SessionId },
    Done(Outcome),
}

impl SessionState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight { .. })
    }
}

/// Something the user did on the upload surface.
#[derive(Debug, Clone)]
pub enum UserAction {
    /// Trigger an upload of the selected file, if any.
    Upload(Option<SelectedFile>),
    /// Abort the running upload.
    Cancel,
    /// The panel's close control.
    Close,
    /// A click outside the panel.
    BackdropClick,
}

/// Notification from the transport about one session.
///
/// A session yields zero or more `Progress` events followed by exactly one
/// of `Loaded`, `NetworkError` or `Aborted`.
#[derive(Debug, Clone)]
pub enum TransferEvent {
    Progress(TransferProgress),
    Loaded(UploadResponse),
    NetworkError(String),
    Aborted,
}

/// Everything the controller reacts to, funnelled through one channel.
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    User(UserAction),
    Transfer {
        session: SessionId,
        event: TransferEvent,
    },
    /// Delayed hint after a successful upload.
    FollowUp { session: SessionId },
}

impl From<UserAction> for ControllerEvent {
    fn from(action: UserAction) -> Self {
        Self::User(action)
    }
}
