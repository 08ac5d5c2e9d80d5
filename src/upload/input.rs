//! Upload input: load a user-selected file into memory.
//!
//! The whole file is sent as one multipart part, so it is read up front.
//! Anything may be uploaded; the MIME type is sniffed from the `%PDF` magic
//! bytes first and the extension second.

use crate::error::FormFillError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PDF_MAGIC: &[u8] = b"%PDF";

/// A file selected for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl UploadFile {
    /// Wrap in-memory bytes, sniffing the MIME type.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = sniff_mime(&file_name, &bytes).to_string();
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    /// Read a local file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FormFillError> {
        let path = path.as_ref();
        let bytes = read_local(path)?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.pdf".to_string());

        let file = Self::from_bytes(file_name, bytes);
        if !file.is_pdf() {
            warn!(
                "'{}' does not look like a PDF ({}); uploading anyway",
                path.display(),
                file.mime_type
            );
        }
        debug!("Loaded {} ({} bytes)", path.display(), file.len());
        Ok(file)
    }

    pub fn is_pdf(&self) -> bool {
        self.bytes.starts_with(PDF_MAGIC)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn read_local(path: &Path) -> Result<Vec<u8>, FormFillError> {
    if !path.exists() {
        return Err(FormFillError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    if path.is_dir() {
        return Err(FormFillError::FileReadFailed {
            path: path.to_path_buf(),
            source: std::io::Error::other("is a directory"),
        });
    }

    std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => FormFillError::PermissionDenied {
            path: PathBuf::from(path),
        },
        std::io::ErrorKind::NotFound => FormFillError::FileNotFound {
            path: PathBuf::from(path),
        },
        _ => FormFillError::FileReadFailed {
            path: PathBuf::from(path),
            source: e,
        },
    })
}

fn sniff_mime(file_name: &str, bytes: &[u8]) -> &'static str {
    if bytes.starts_with(PDF_MAGIC) {
        return "application/pdf";
    }
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
