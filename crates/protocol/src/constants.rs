use std::time::Duration;

/// Host the extraction backend listens on during local development.
pub const DEFAULT_HOST: &str = "localhost";

/// Port the extraction backend listens on.
pub const DEFAULT_PORT: u16 = 8080;

/// Path of the upload route on the backend.
pub const UPLOAD_PATH: &str = "/api/uploadResumeBlob";

/// Name of the single multipart part carrying the file.
pub const FILE_FIELD: &str = "file";

/// The only status treated as a successful upload.
///
/// Other 2xx codes are failures too: the backend answers 200 with the
/// metadata object and nothing else.
pub const SUCCESS_STATUS: u16 = 200;

/// Delay between a successful upload and the "you can close" hint.
pub const DEFAULT_FOLLOW_UP_DELAY: Duration = Duration::from_secs(2);

/// Content type used when the file extension is not recognised.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Full URL of the upload endpoint with default host and port.
pub fn default_endpoint() -> String {
    format!("http://{DEFAULT_HOST}:{DEFAULT_PORT}{UPLOAD_PATH}")
}
