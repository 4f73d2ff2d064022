//! Wire contract between the uploader and the resume extraction backend.
//!
//! The backend exposes a single multipart route. A `200` answer carries a
//! flat JSON object whose fields are shown to the user verbatim.

pub mod constants;
pub mod metadata;

pub use constants::{FILE_FIELD, SUCCESS_STATUS, default_endpoint};
pub use metadata::{ResultMetadata, render_value};

/// Errors produced while decoding backend responses.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}
