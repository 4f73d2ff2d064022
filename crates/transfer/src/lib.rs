//! Single-file upload with progress reporting and cancellation.
//!
//! The file is posted as a one-part multipart form. Progress is reported per
//! block read from disk, and a `CancellationToken` aborts the request.

mod client;
mod file;
mod progress;
mod size;

pub use client::{UploadClient, UploadResponse};
pub use file::{SelectedFile, detect_content_type};
pub use progress::{ProgressCallback, SpeedCalculator, TransferProgress};
pub use size::format_size;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid file: {0}")]
    InvalidFile(String),

    #[error("cancelled")]
    Cancelled,
}
