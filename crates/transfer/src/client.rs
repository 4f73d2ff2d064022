//! Multipart upload client.
//!
//! Async HTTP client using `reqwest`. The file is streamed from disk so that
//! progress can be reported as the body is sent.

use futures_util::TryStreamExt;
use reqwest::multipart::{Form, Part};
use resumedrop_protocol::{FILE_FIELD, SUCCESS_STATUS};
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::TransferError;
use crate::file::SelectedFile;
use crate::progress::{ProgressCallback, TransferProgress};

/// Status and body of a completed upload request.
///
/// The body is only read for a successful status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl UploadResponse {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}

/// Uploads single files to a fixed endpoint.
#[derive(Debug, Clone)]
pub struct UploadClient {
    http: reqwest::Client,
    endpoint: String,
}

impl UploadClient {
    /// Creates a client posting to `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, TransferError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts `file` as the single `file` part of a multipart form.
    ///
    /// `on_progress` is called for every block of the file handed to the
    /// transport. Cancelling `cancel` aborts the request at any point and
    /// yields [`TransferError::Cancelled`]. No timeout is applied.
    pub async fn upload(
        &self,
        file: &SelectedFile,
        cancel: CancellationToken,
        on_progress: ProgressCallback,
    ) -> Result<UploadResponse, TransferError> {
        let form = build_form(file, on_progress).await?;

        debug!(
            endpoint = %self.endpoint,
            file = %file.name(),
            bytes = file.size(),
            "sending upload request"
        );

        let request = self.http.post(&self.endpoint).multipart(form).send();
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TransferError::Cancelled),
            resp = request => resp?,
        };

        let status = response.status().as_u16();
        if status != SUCCESS_STATUS {
            info!(status, "upload rejected by server");
            return Ok(UploadResponse {
                status,
                body: Vec::new(),
            });
        }

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TransferError::Cancelled),
            body = response.bytes() => body?,
        };

        info!(status, bytes = body.len(), "upload accepted");
        Ok(UploadResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Builds the one-part form, wrapping the file stream with a byte counter.
async fn build_form(
    file: &SelectedFile,
    on_progress: ProgressCallback,
) -> Result<Form, TransferError> {
    let handle = tokio::fs::File::open(file.path()).await?;
    let total = file.size();

    let mut loaded: u64 = 0;
    let stream = ReaderStream::new(handle).inspect_ok(move |block| {
        loaded += block.len() as u64;
        on_progress(TransferProgress::new(loaded, Some(total)));
    });

    let part = Part::stream_with_length(reqwest::Body::wrap_stream(stream), total)
        .file_name(file.name().to_string())
        .mime_str(file.content_type())?;

    Ok(Form::new().part(FILE_FIELD, part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Reads a full multipart request (up to the closing boundary).
    async fn read_request(stream: &mut tokio::net::TcpStream) -> Vec<u8> {
        let mut request = Vec::new();
        let mut buf = vec![0u8; 8192];
        loop {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    request.extend_from_slice(&buf[..n]);
                    if request.ends_with(b"--\r\n") || request.ends_with(b"0\r\n\r\n") {
                        break;
                    }
                }
            }
        }
        request
    }

    /// Starts a mock HTTP server that answers one request with `status` and
    /// `body`, and hands the raw request back.
    async fn mock_server(
        status: u16,
        body: &str,
    ) -> (String, tokio::task::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{port}/api/uploadResumeBlob");
        let body = body.to_string();

        let handle = tokio::spawn(async move {
            let Ok((mut stream, _)) = listener.accept().await else {
                return Vec::new();
            };
            let request = read_request(&mut stream).await;

            let resp = format!(
                "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(resp.as_bytes()).await;
            let _ = stream.shutdown().await;
            request
        });

        (url, handle)
    }

    fn sample_file(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> SelectedFile {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        SelectedFile::open(&path).unwrap()
    }

    fn no_progress() -> ProgressCallback {
        Box::new(|_| {})
    }

    #[tokio::test]
    async fn upload_returns_body_on_200() {
        let dir = tempfile::tempdir().unwrap();
        let file = sample_file(&dir, "cv.pdf", b"%PDF-1.4 resume");
        let (url, handle) = mock_server(200, r#"{"name":"Jane Doe","skills":"Go"}"#).await;

        let client = UploadClient::new(url).unwrap();
        let resp = client
            .upload(&file, CancellationToken::new(), no_progress())
            .await
            .unwrap();

        assert!(resp.is_success());
        assert_eq!(resp.body, br#"{"name":"Jane Doe","skills":"Go"}"#);

        let request = String::from_utf8_lossy(&handle.await.unwrap()).into_owned();
        assert!(request.starts_with("POST /api/uploadResumeBlob"));
        assert!(request.contains("multipart/form-data"));
        assert!(request.contains(r#"name="file"; filename="cv.pdf""#));
        assert!(request.to_lowercase().contains("content-type: application/pdf"));
        assert!(request.contains("%PDF-1.4 resume"));
    }

    #[tokio::test]
    async fn upload_non_200_skips_body() {
        let dir = tempfile::tempdir().unwrap();
        let file = sample_file(&dir, "cv.pdf", b"data");
        let (url, handle) = mock_server(404, r#"{"error":"not found"}"#).await;

        let client = UploadClient::new(url).unwrap();
        let resp = client
            .upload(&file, CancellationToken::new(), no_progress())
            .await
            .unwrap();

        assert_eq!(resp.status, 404);
        assert!(!resp.is_success());
        assert!(resp.body.is_empty());
        handle.abort();
    }

    #[tokio::test]
    async fn upload_reports_progress_up_to_total() {
        let dir = tempfile::tempdir().unwrap();
        let contents = vec![7u8; 20_000];
        let file = sample_file(&dir, "big.txt", &contents);
        let (url, handle) = mock_server(200, "{}").await;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let client = UploadClient::new(url).unwrap();
        client
            .upload(
                &file,
                CancellationToken::new(),
                Box::new(move |p| s.lock().unwrap().push(p)),
            )
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|p| p.total == Some(20_000)));
        assert!(seen.windows(2).all(|w| w[0].loaded <= w[1].loaded));
        assert_eq!(seen.last().unwrap().loaded, 20_000);
        handle.abort();
    }

    #[tokio::test]
    async fn upload_cancelled_before_response() {
        let dir = tempfile::tempdir().unwrap();
        let file = sample_file(&dir, "cv.pdf", b"data");

        // Accepts and reads, but never answers.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let _ = read_request(&mut stream).await;
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
        });

        let client = UploadClient::new(format!("http://127.0.0.1:{port}/upload")).unwrap();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = client.upload(&file, cancel, no_progress()).await.unwrap_err();
        assert!(matches!(err, TransferError::Cancelled));
        server.abort();
    }

    #[tokio::test]
    async fn upload_connection_refused_is_http_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = sample_file(&dir, "cv.pdf", b"data");

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = UploadClient::new(format!("http://127.0.0.1:{port}/upload")).unwrap();
        let err = client
            .upload(&file, CancellationToken::new(), no_progress())
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::Http(_)));
    }

    #[tokio::test]
    async fn upload_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = sample_file(&dir, "cv.pdf", b"data");
        std::fs::remove_file(file.path()).unwrap();

        let client = UploadClient::new("http://127.0.0.1:9/upload").unwrap();
        let err = client
            .upload(&file, CancellationToken::new(), no_progress())
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::Io(_)));
    }
}
