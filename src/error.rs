//! Error types for the formfill library.
//!
//! Three kinds of failure exist and each has its own representation:
//!
//! * [`FormFillError`] — **Fatal** for the operation that raised it: bad
//!   configuration, an unreadable input file, a failed example download.
//!   Returned as `Err(FormFillError)`.
//!
//! * [`UploadError`] — a single extraction request failed. The upload panel
//!   catches it at the boundary, logs the typed detail and collapses it into
//!   one user-visible status line. It never reaches the caller of
//!   [`crate::upload::UploadPanel::submit_upload`].
//!
//! * Field validation failures are not errors at all. They are data
//!   ([`crate::schema::FieldErrors`]) stored on the form controller.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors returned by the formfill library.
#[derive(Debug, Error)]
pub enum FormFillError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but reading it failed part-way.
    #[error("Failed to read '{path}': {source}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Download errors ───────────────────────────────────────────────────
    /// The example document could not be fetched.
    #[error("Failed to download '{url}': {reason}\nIs the extraction service running?")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Schema errors ─────────────────────────────────────────────────────
    /// Validated values could not be turned into the requested record type.
    ///
    /// Only happens when a schema and the record struct disagree on field
    /// names or kinds.
    #[error("Validated values do not match the record type: {0}")]
    SchemaMismatch(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A failed extraction request.
///
/// The variants exist for logs and tests. Users only ever see
/// [`UploadError::user_message`], which is the same for all of them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UploadError {
    /// Another upload through the same client is still outstanding.
    #[error("An upload is already in progress")]
    Busy,

    /// The request never produced a response (DNS, refused, reset, …).
    #[error("Request to '{url}' failed: {reason}")]
    Transport { url: String, reason: String },

    /// The configured request timeout elapsed.
    #[error("Request to '{url}' timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    /// The service answered with a non-2xx status.
    #[error("Extraction service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The service answered 2xx but the body is not the expected JSON.
    #[error("Malformed extraction response: {detail}")]
    MalformedResponse { detail: String },
}

impl UploadError {
    /// The single status line shown for any upload failure.
    pub fn user_message(&self) -> &'static str {
        crate::upload::STATUS_ERROR
    }
}
