//! Callback trait for upload status events.
//!
//! The upload panel owns a status line and a loading flag; a view layer needs
//! to hear about both as they change. Inject an
//! [`Arc<dyn UploadProgressCallback>`] via
//! [`crate::config::FormFillConfigBuilder::progress_callback`] to receive
//! them. The CLI uses this to drive a spinner.
//!
//! # Example
//!
//! ```rust
//! use formfill::{FormFillConfig, UploadProgressCallback};
//! use std::sync::{Arc, Mutex};
//!
//! struct StatusLog(Mutex<Vec<String>>);
//!
//! impl UploadProgressCallback for StatusLog {
//!     fn on_status(&self, status: &str) {
//!         self.0.lock().unwrap().push(status.to_string());
//!     }
//! }
//!
//! let config = FormFillConfig::builder()
//!     .progress_callback(Arc::new(StatusLog(Mutex::new(Vec::new()))))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Receives status and loading changes from [`crate::upload::UploadPanel`].
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait UploadProgressCallback: Send + Sync {
    /// Called right before the request is sent.
    ///
    /// # Arguments
    /// * `file_name` — name of the uploaded file
    /// * `size`      — payload size in bytes
    fn on_upload_start(&self, file_name: &str, size: usize) {
        let _ = (file_name, size);
    }

    /// Called whenever the visible status line changes.
    fn on_status(&self, status: &str) {
        let _ = status;
    }

    /// Called when the loading flag flips.
    fn on_loading_changed(&self, loading: bool) {
        let _ = loading;
    }

    /// Called after a successful upload with the fields that were populated.
    fn on_fields_applied(&self, fields: &[String]) {
        let _ = fields;
    }
}

/// A no-op implementation; the default when no callback is configured.
pub struct NoopProgressCallback;

impl UploadProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::FormFillConfig`].
pub type ProgressCallback = Arc<dyn UploadProgressCallback>;
