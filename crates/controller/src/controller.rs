//! Upload controller.
//!
//! Owns the session slot, the activity log and the metadata region. Every
//! mutation goes through [`UploadController::apply`], fed by user actions
//! and transfer events arriving on one channel.

use std::sync::Arc;
use std::time::Duration;

use resumedrop_protocol::constants::DEFAULT_FOLLOW_UP_DELAY;
use resumedrop_protocol::{ResultMetadata, SUCCESS_STATUS};
use resumedrop_transfer::{SelectedFile, TransferProgress, UploadResponse, format_size};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::page::{MetadataView, PageState};
use crate::registry::SessionRegistry;
use crate::transport::{UploadTransport, runtime_handle};
use crate::types::{ControllerEvent, Outcome, SessionId, SessionState, TransferEvent, UserAction};

pub const NO_FILE_ALERT: &str = "Please select a file.";
pub const BUSY_ALERT: &str = "An upload is already in progress.";
pub const FOLLOW_UP_MESSAGE: &str = "You can now close this window.";

/// Controller settings.
#[derive(Debug, Clone, Copy)]
pub struct ControllerConfig {
    /// Delay before the post-success hint is appended.
    pub follow_up_delay: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            follow_up_delay: DEFAULT_FOLLOW_UP_DELAY,
        }
    }
}

/// Drives one upload at a time and keeps the page state current.
///
/// Timers are spawned on the tokio runtime that was current when the
/// controller was created, so [`apply`](Self::apply) may be called from a
/// thread outside that runtime. Without any runtime the follow-up message is
/// skipped.
pub struct UploadController {
    transport: Arc<dyn UploadTransport>,
    config: ControllerConfig,
    runtime: Option<Handle>,
    events_tx: mpsc::UnboundedSender<ControllerEvent>,
    events_rx: Option<mpsc::UnboundedReceiver<ControllerEvent>>,
    registry: SessionRegistry,
    state: SessionState,
    page: PageState,
}

impl UploadController {
    /// Creates a controller using `transport` for uploads.
    pub fn new(transport: Arc<dyn UploadTransport>, config: ControllerConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            transport,
            config,
            runtime: Handle::try_current().ok(),
            events_tx,
            events_rx: Some(events_rx),
            registry: SessionRegistry::new(),
            state: SessionState::Idle,
            page: PageState::default(),
        }
    }

    /// Takes the event receiver. Can only be called once.
    ///
    /// The owner of the receiver runs the loop, passing every event to
    /// [`apply`](Self::apply).
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<ControllerEvent>> {
        self.events_rx.take()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn page(&self) -> &PageState {
        &self.page
    }

    /// Mutable page access for front-ends acknowledging alerts.
    pub fn page_mut(&mut self) -> &mut PageState {
        &mut self.page
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Shorthand for applying a user action.
    pub fn dispatch(&mut self, action: UserAction) {
        self.apply(ControllerEvent::User(action));
    }

    /// The single update function.
    pub fn apply(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::User(action) => self.on_user(action),
            ControllerEvent::Transfer { session, event } => self.on_transfer(session, event),
            ControllerEvent::FollowUp { session } => {
                debug!(%session, "follow-up message");
                self.page.log.info(FOLLOW_UP_MESSAGE);
            }
        }
    }

    fn on_user(&mut self, action: UserAction) {
        match action {
            UserAction::Upload(file) => self.start_upload(file),
            UserAction::Cancel => self.cancel(),
            UserAction::Close | UserAction::BackdropClick => {
                self.page.panel_visible = false;
            }
        }
    }

    fn start_upload(&mut self, file: Option<SelectedFile>) {
        let Some(file) = file else {
            warn!("upload triggered without a file");
            self.page.alerts.push(NO_FILE_ALERT);
            return;
        };

        let id = SessionId::new();
        let cancel = CancellationToken::new();
        if let Err(e) = self.registry.register(id, cancel.clone()) {
            warn!(error = %e, "upload rejected");
            self.page.alerts.push(BUSY_ALERT);
            return;
        }

        self.page.log.clear();
        self.page.panel_visible = true;
        self.page.log.info(format!(
            "Selected file: {} ({})",
            file.name(),
            format_size(file.size())
        ));

        info!(session = %id, file = %file.name(), bytes = file.size(), "upload started");
        self.state = SessionState::InFlight { id };
        self.transport.start(id, file, cancel, self.events_tx.clone());
        self.page.log.info("Upload started...");
    }

    fn cancel(&mut self) {
        let Some(id) = self.registry.active() else {
            debug!("cancel with no active upload");
            return;
        };
        if self.registry.cancel(id) {
            info!(session = %id, "upload cancelled by user");
            self.page.log.error("Upload cancelled by user.");
        }
    }

    fn on_transfer(&mut self, session: SessionId, event: TransferEvent) {
        if !self.registry.contains(session) {
            warn!(%session, "event for unknown session ignored");
            return;
        }

        match event {
            TransferEvent::Progress(progress) => self.on_progress(progress),
            TransferEvent::Loaded(response) => {
                let outcome = self.on_loaded(session, response);
                self.finish(session, outcome);
            }
            TransferEvent::NetworkError(detail) => {
                error!(%session, error = %detail, "network error");
                self.page
                    .log
                    .error(format!("Network error during upload: {detail}"));
                self.finish(session, Outcome::NetworkError);
            }
            TransferEvent::Aborted => {
                self.page.log.error("Upload was cancelled.");
                self.finish(session, Outcome::Cancelled);
            }
        }
    }

    fn on_progress(&mut self, progress: TransferProgress) {
        if let Some(percent) = progress.percent() {
            self.page.log.info(format!("Upload progress: {percent}%"));
        }
    }

    fn on_loaded(&mut self, session: SessionId, response: UploadResponse) -> Outcome {
        if response.status != SUCCESS_STATUS {
            warn!(%session, status = response.status, "upload failed");
            self.page
                .log
                .error(format!("Upload failed with status {}", response.status));
            return Outcome::Failed {
                status: response.status,
            };
        }

        let metadata = match ResultMetadata::from_slice(&response.body) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(%session, error = %e, "unreadable response body");
                self.page
                    .log
                    .error(format!("Failed to parse server response: {e}"));
                return Outcome::ParseError;
            }
        };

        self.page.metadata = Some(MetadataView::from(&metadata));
        self.page.log.success("Metadata extracted and displayed.");
        self.schedule_follow_up(session);
        Outcome::Succeeded
    }

    fn schedule_follow_up(&self, session: SessionId) {
        let Some(runtime) = runtime_handle(&self.runtime) else {
            warn!(%session, "no tokio runtime, follow-up message skipped");
            return;
        };
        let tx = self.events_tx.clone();
        let delay = self.config.follow_up_delay;
        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(ControllerEvent::FollowUp { session });
        });
    }

    fn finish(&mut self, session: SessionId, outcome: Outcome) {
        if let Err(e) = self.registry.finish(session) {
            warn!(error = %e, "session already finished");
        }
        debug!(%session, ?outcome, "session finished");
        self.state = SessionState::Done(outcome);
    }
}
