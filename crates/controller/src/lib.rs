//! Upload controller: session lifecycle, activity log, alerts and the
//! metadata view.
//!
//! This crate holds the **state logic** of the upload surface. It has no
//! rendering backend of its own: front-ends feed [`UserAction`]s into the
//! controller, drain its event channel through
//! [`UploadController::apply`], and draw from [`PageState`].
//!
//! # Session lifecycle
//!
//! 1. **Trigger**: reject when no file is selected or an upload is running
//! 2. **Upload**: the transport streams the file and reports progress
//! 3. **Outcome**: success, HTTP failure, network error or cancellation
//! 4. **Follow-up**: a delayed hint after success

pub mod alert;
pub mod controller;
pub mod error;
pub mod log;
pub mod page;
pub mod registry;
pub mod transport;
pub mod types;

// Re-export primary types for convenience.
pub use alert::{Alert, AlertQueue};
pub use controller::{ControllerConfig, UploadController};
pub use error::ControllerError;
pub use log::{ActivityLog, LogEntry, Severity};
pub use page::{MetadataView, PageState, RenderOptions, render_metadata, render_panel};
pub use registry::SessionRegistry;
pub use transport::{HttpTransport, UploadTransport};
pub use types::{ControllerEvent, Outcome, SessionId, SessionState, TransferEvent, UserAction};
