use std::path::{Path, PathBuf};

use resumedrop_protocol::constants::FALLBACK_CONTENT_TYPE;

use crate::TransferError;

/// A local file chosen for upload.
///
/// Name, size and content type are captured when the file is selected; the
/// contents are only read once the upload starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    path: PathBuf,
    name: String,
    size: u64,
    content_type: &'static str,
}

impl SelectedFile {
    /// Selects a file on disk.
    ///
    /// Rejects:
    /// - Missing paths
    /// - Directories and other non-regular files
    /// - Paths without a usable file name
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TransferError> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path).map_err(|e| {
            TransferError::InvalidFile(format!("{}: {e}", path.display()))
        })?;

        if !meta.is_file() {
            return Err(TransferError::InvalidFile(format!(
                "not a regular file: {}",
                path.display()
            )));
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                TransferError::InvalidFile(format!("no file name: {}", path.display()))
            })?
            .to_string();

        Ok(Self {
            content_type: detect_content_type(&name).unwrap_or(FALLBACK_CONTENT_TYPE),
            path: path.to_path_buf(),
            name,
            size: meta.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Original file name, sent as the part's file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes at selection time.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }
}

/// Detects a MIME type from a file extension (case-insensitive).
///
/// Covers the document and image formats a resume is usually shipped in.
pub fn detect_content_type(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("pdf") => Some("application/pdf"),
        Some("doc") => Some("application/msword"),
        Some("docx") => {
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        }
        Some("odt") => Some("application/vnd.oasis.opendocument.text"),
        Some("rtf") => Some("application/rtf"),
        Some("txt") => Some("text/plain"),
        Some("json") => Some("application/json"),
        Some("png") => Some("image/png"),
        Some("jpg" | "jpeg") => Some("image/jpeg"),
        _ => None,
    }
}
