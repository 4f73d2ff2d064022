//! Transport seam between the controller and the HTTP client.
//!
//! `UploadTransport` keeps session logic decoupled from the network and
//! testable with mocks.

use resumedrop_transfer::{ProgressCallback, SelectedFile, TransferError, UploadClient};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::error::ControllerError;
use crate::types::{ControllerEvent, SessionId, TransferEvent};

/// Starts uploads and reports their progress back to the controller.
pub trait UploadTransport: Send + Sync {
    /// Begins uploading `file` for `session` without waiting for it.
    ///
    /// Implementations report through `events`: any number of
    /// [`TransferEvent::Progress`] followed by exactly one terminal event.
    /// Cancelling `cancel` must end the session with
    /// [`TransferEvent::Aborted`].
    fn start(
        &self,
        session: SessionId,
        file: SelectedFile,
        cancel: CancellationToken,
        events: UnboundedSender<ControllerEvent>,
    );
}

/// The runtime captured at construction, else the one current on this thread.
pub(crate) fn runtime_handle(captured: &Option<Handle>) -> Option<Handle> {
    captured.clone().or_else(|| Handle::try_current().ok())
}

/// Transport posting to the backend over HTTP.
///
/// Uploads run on the tokio runtime current at construction time.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: UploadClient,
    runtime: Option<Handle>,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ControllerError> {
        Ok(Self {
            client: UploadClient::new(endpoint)?,
            runtime: Handle::try_current().ok(),
        })
    }
}

impl UploadTransport for HttpTransport {
    fn start(
        &self,
        session: SessionId,
        file: SelectedFile,
        cancel: CancellationToken,
        events: UnboundedSender<ControllerEvent>,
    ) {
        let Some(runtime) = runtime_handle(&self.runtime) else {
            error!(%session, "no tokio runtime to run the upload on");
            let _ = events.send(ControllerEvent::Transfer {
                session,
                event: TransferEvent::NetworkError("no async runtime available".into()),
            });
            return;
        };

        let client = self.client.clone();
        runtime.spawn(async move {
            let progress_tx = events.clone();
            let on_progress: ProgressCallback = Box::new(move |progress| {
                let _ = progress_tx.send(ControllerEvent::Transfer {
                    session,
                    event: TransferEvent::Progress(progress),
                });
            });

            let event = match client.upload(&file, cancel, on_progress).await {
                Ok(response) => TransferEvent::Loaded(response),
                Err(TransferError::Cancelled) => TransferEvent::Aborted,
                Err(e) => TransferEvent::NetworkError(e.to_string()),
            };

            debug!(%session, endpoint = %client.endpoint(), "transfer finished");
            let _ = events.send(ControllerEvent::Transfer { session, event });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ControllerConfig, UploadController};
    use crate::log::Severity;
    use crate::page::render_metadata;
    use crate::types::{Outcome, SessionState, UserAction};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Starts a mock backend that answers one upload with `status` and
    /// `body`, or never answers when `body` is `None`.
    async fn mock_backend(
        status: u16,
        body: Option<&str>,
    ) -> (String, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{port}/api/uploadResumeBlob");
        let body = body.map(str::to_string);

        let handle = tokio::spawn(async move {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let mut request = Vec::new();
            let mut buf = vec![0u8; 8192];
            while let Ok(n) = stream.read(&mut buf).await {
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request.ends_with(b"--\r\n") {
                    break;
                }
            }

            let Some(body) = body else {
                tokio::time::sleep(Duration::from_secs(30)).await;
                return;
            };
            let resp = format!(
                "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(resp.as_bytes()).await;
            let _ = stream.shutdown().await;
        });

        (url, handle)
    }

    fn selected(dir: &tempfile::TempDir) -> SelectedFile {
        let path = dir.path().join("cv.pdf");
        std::fs::write(&path, vec![b'x'; 10_000]).unwrap();
        SelectedFile::open(&path).unwrap()
    }

    /// Applies events until the session leaves the in-flight state.
    async fn run_until_done(
        ctrl: &mut UploadController,
        rx: &mut tokio::sync::mpsc::UnboundedReceiver<ControllerEvent>,
    ) {
        while ctrl.state().is_in_flight() {
            let event = tokio::time::timeout(Duration::from_secs(10), rx.recv())
                .await
                .unwrap()
                .unwrap();
            ctrl.apply(event);
        }
    }

    #[tokio::test]
    async fn http_upload_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let (url, server) = mock_backend(200, Some(r#"{"name":"Jane Doe","skills":"Go"}"#)).await;

        let transport = Arc::new(HttpTransport::new(url).unwrap());
        let mut ctrl = UploadController::new(transport, ControllerConfig::default());
        let mut rx = ctrl.take_events().unwrap();

        ctrl.dispatch(UserAction::Upload(Some(selected(&dir))));
        run_until_done(&mut ctrl, &mut rx).await;

        assert_eq!(ctrl.state(), SessionState::Done(Outcome::Succeeded));
        assert_eq!(
            render_metadata(ctrl.page()),
            vec!["Extracted metadata", "name: Jane Doe", "skills: Go"]
        );
        assert!(
            ctrl.page()
                .log
                .entries()
                .iter()
                .any(|e| e.message == "Upload progress: 100%")
        );
        assert_eq!(ctrl.page().log.count(Severity::Success), 1);
        server.abort();
    }

    #[tokio::test]
    async fn http_upload_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let (url, server) = mock_backend(500, Some(r#"{"message":"Error processing PDF"}"#)).await;

        let transport = Arc::new(HttpTransport::new(url).unwrap());
        let mut ctrl = UploadController::new(transport, ControllerConfig::default());
        let mut rx = ctrl.take_events().unwrap();

        ctrl.dispatch(UserAction::Upload(Some(selected(&dir))));
        run_until_done(&mut ctrl, &mut rx).await;

        assert_eq!(
            ctrl.state(),
            SessionState::Done(Outcome::Failed { status: 500 })
        );
        assert!(ctrl.page().metadata.is_none());
        server.abort();
    }

    #[tokio::test]
    async fn http_upload_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let (url, server) = mock_backend(200, None).await;

        let transport = Arc::new(HttpTransport::new(url).unwrap());
        let mut ctrl = UploadController::new(transport, ControllerConfig::default());
        let mut rx = ctrl.take_events().unwrap();

        ctrl.dispatch(UserAction::Upload(Some(selected(&dir))));
        ctrl.dispatch(UserAction::Cancel);
        run_until_done(&mut ctrl, &mut rx).await;

        assert_eq!(ctrl.state(), SessionState::Done(Outcome::Cancelled));
        assert!(ctrl.page().log.count(Severity::Error) >= 2);
        assert!(ctrl.registry().is_empty());
        server.abort();
    }

    #[tokio::test]
    async fn http_upload_connection_refused() {
        let dir = tempfile::tempdir().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let transport =
            Arc::new(HttpTransport::new(format!("http://127.0.0.1:{port}/upload")).unwrap());
        let mut ctrl = UploadController::new(transport, ControllerConfig::default());
        let mut rx = ctrl.take_events().unwrap();

        ctrl.dispatch(UserAction::Upload(Some(selected(&dir))));
        run_until_done(&mut ctrl, &mut rx).await;

        assert_eq!(ctrl.state(), SessionState::Done(Outcome::NetworkError));
        let last = ctrl.page().log.last().unwrap();
        assert!(last.message.starts_with("Network error during upload"));
    }

    #[test]
    fn start_without_runtime_reports_network_error() {
        let dir = tempfile::tempdir().unwrap();
        let transport = HttpTransport::new("http://127.0.0.1:9/upload").unwrap();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let session = SessionId::new();

        transport.start(session, selected(&dir), CancellationToken::new(), tx);

        match rx.try_recv().unwrap() {
            ControllerEvent::Transfer {
                session: reported,
                event: TransferEvent::NetworkError(_),
            } => assert_eq!(reported, session),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
