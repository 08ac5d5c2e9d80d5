//! Document upload: send a file to the extraction service and push the
//! returned fields into the form.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ client ──▶ UploadPanel ──▶ FormController::set_json_value
//! (bytes)   (POST)     (status/loading)   (auto-populate)
//! ```
//!
//! 1. [`input`]   — load the selected file and sniff its MIME type
//! 2. [`client`]  — one multipart `POST /upload-pdf`, single-flight
//! 3. [`example`] — `GET /download-example-pdf`
//!
//! [`UploadPanel`] is the piece a view binds to: it owns the selected file,
//! the status line and the loading flag, and catches every request failure
//! at its boundary.

pub mod client;
pub mod example;
pub mod input;

use crate::config::FormFillConfig;
use crate::error::FormFillError;
use crate::form::FormController;
use crate::progress::{NoopProgressCallback, ProgressCallback};
use client::UploadClient;
use input::UploadFile;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shown when upload is triggered with no file selected.
pub const STATUS_SELECT_FILE: &str = "Please select a file first.";
/// Shown while the request is outstanding.
pub const STATUS_UPLOADING: &str = "Uploading and processing\u{2026}";
/// Shown after the form has been populated.
pub const STATUS_SUCCESS: &str = "File processed successfully!";
/// Shown for every kind of request failure.
pub const STATUS_ERROR: &str = "Error processing file. Please try again.";

/// Where the panel is in its upload cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum UploadState {
    /// Nothing attempted yet, or a new file was selected.
    #[default]
    Idle,
    /// Upload was triggered without a file.
    AwaitingFile,
    /// The request is outstanding.
    Uploading,
    /// The reply was applied to the form.
    Succeeded,
    /// The request failed; field values are unchanged.
    Failed,
}

/// File selection, status line and loading flag for the upload flow.
pub struct UploadPanel {
    client: UploadClient,
    schema: Value,
    selected: Option<UploadFile>,
    status: String,
    loading: bool,
    state: UploadState,
    callback: ProgressCallback,
}

impl std::fmt::Debug for UploadPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadPanel")
            .field("upload_url", &self.client.upload_url())
            .field("selected", &self.selected)
            .field("status", &self.status)
            .field("loading", &self.loading)
            .field("state", &self.state)
            .finish()
    }
}

impl UploadPanel {
    /// `schema` is the structural schema sent with every upload.
    pub fn new(config: &FormFillConfig, schema: Value) -> Result<Self, FormFillError> {
        Ok(Self::with_client(
            UploadClient::new(config)?,
            schema,
            config.progress_callback.clone(),
        ))
    }

    /// Build a panel around an existing (possibly shared) client.
    pub fn with_client(
        client: UploadClient,
        schema: Value,
        callback: Option<ProgressCallback>,
    ) -> Self {
        Self {
            client,
            schema,
            selected: None,
            status: String::new(),
            loading: false,
            state: UploadState::Idle,
            callback: callback.unwrap_or_else(|| Arc::new(NoopProgressCallback)),
        }
    }

    pub fn client(&self) -> &UploadClient {
        &self.client
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn selected_file(&self) -> Option<&UploadFile> {
        self.selected.as_ref()
    }

    /// The upload trigger is disabled while a request is outstanding.
    pub fn can_upload(&self) -> bool {
        !self.loading && !self.client.is_busy()
    }

    pub fn select_file(&mut self, file: UploadFile) {
        debug!("Selected '{}' ({})", file.file_name, file.mime_type);
        self.selected = Some(file);
        self.state = UploadState::Idle;
    }

    pub fn clear_file(&mut self) {
        self.selected = None;
        self.state = UploadState::Idle;
    }

    /// Upload the selected file and populate `form` from the reply.
    ///
    /// Never fails: every outcome is reported through [`Self::status`] and
    /// [`Self::state`]. On success only `result` keys that name a form field
    /// are applied; the others are ignored. On failure no field is touched.
    pub async fn submit_upload(&mut self, form: &mut FormController) -> UploadState {
        let Some(file) = self.selected.clone() else {
            self.set_status(STATUS_SELECT_FILE);
            self.state = UploadState::AwaitingFile;
            return self.state;
        };

        self.set_loading(true);
        self.set_status(STATUS_UPLOADING);
        self.state = UploadState::Uploading;
        self.callback.on_upload_start(&file.file_name, file.len());

        match self.client.upload_and_extract(&file, &self.schema).await {
            Ok(reply) => {
                let applied = apply_result(form, &reply.result);
                info!(
                    "Populated {} field(s) from '{}'",
                    applied.len(),
                    reply.filename.as_deref().unwrap_or(&file.file_name)
                );
                self.callback.on_fields_applied(&applied);
                self.set_status(STATUS_SUCCESS);
                self.state = UploadState::Succeeded;
            }
            Err(e) => {
                warn!("Upload of '{}' failed: {}", file.file_name, e);
                self.set_status(e.user_message());
                self.state = UploadState::Failed;
            }
        }

        self.set_loading(false);
        self.state
    }

    fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
        self.callback.on_status(status);
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.callback.on_loading_changed(loading);
    }
}

/// Push every known key of `result` into `form`; returns the applied names.
fn apply_result(form: &mut FormController, result: &serde_json::Map<String, Value>) -> Vec<String> {
    let mut applied = Vec::new();
    for (name, value) in result {
        if !form.schema().contains(name) {
            debug!("Ignoring unknown field '{}' in extraction result", name);
            continue;
        }
        if form.set_json_value(name, value) {
            applied.push(name.clone());
        } else {
            debug!("Skipping null value for '{}'", name);
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn panel() -> UploadPanel {
        let config = FormFillConfig::default();
        let schema = crate::schema::FormSchema::financial_profile().to_json_schema();
        UploadPanel::new(&config, schema).unwrap()
    }

    #[test]
    fn apply_result_only_touches_known_fields() {
        let mut form = FormController::default();
        form.on_change("phone", "555-0100");

        let result = json!({
            "firstName": "Jane",
            "email": "jane@example.com",
            "favouriteColour": "teal",
            "lastName": null
        });
        let applied = apply_result(&mut form, result.as_object().unwrap());

        assert_eq!(applied.len(), 2);
        assert!(applied.contains(&"firstName".to_string()));
        assert!(applied.contains(&"email".to_string()));
        assert_eq!(form.value("firstName"), Some("Jane"));
        assert_eq!(form.value("email"), Some("jane@example.com"));
        assert_eq!(form.value("phone"), Some("555-0100"));
        assert_eq!(form.value("lastName"), Some(""));
    }

    #[test]
    fn no_file_selected_sets_status_without_request() {
        let mut panel = panel();
        let mut form = FormController::default();

        let state = tokio_test::block_on(panel.submit_upload(&mut form));

        assert_eq!(state, UploadState::AwaitingFile);
        assert_eq!(panel.status(), STATUS_SELECT_FILE);
        assert!(!panel.is_loading());
        assert!(!panel.client().is_busy());
    }

    #[test]
    fn selecting_a_file_resets_state() {
        let mut panel = panel();
        let mut form = FormController::default();
        tokio_test::block_on(panel.submit_upload(&mut form));
        assert_eq!(panel.state(), UploadState::AwaitingFile);

        panel.select_file(UploadFile::from_bytes("w2.pdf", b"%PDF-1.4".to_vec()));
        assert_eq!(panel.state(), UploadState::Idle);
        assert!(panel.can_upload());
        assert_eq!(panel.selected_file().unwrap().file_name, "w2.pdf");

        panel.clear_file();
        assert!(panel.selected_file().is_none());
    }
}
