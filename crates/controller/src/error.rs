//! Controller error types.

use crate::types::SessionId;

/// Errors produced by the upload controller.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("an upload is already in progress (session {0})")]
    UploadInProgress(SessionId),

    #[error("unknown session: {0}")]
    UnknownSession(SessionId),

    #[error("transfer error: {0}")]
    Transfer(#[from] resumedrop_transfer::TransferError),
}
