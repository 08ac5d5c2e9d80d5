//! Configuration for the form application and its upload client.
//!
//! All knobs live in [`FormFillConfig`], built via [`FormFillConfigBuilder`].
//! The extraction service's base URL is a configuration value rather than a
//! constant so tests can point the client at a local mock.

use crate::error::FormFillError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Default address of the extraction service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default name under which the structural schema is published.
pub const DEFAULT_SCHEMA_NAME: &str = "FormSchema";

/// Configuration for a [`crate::app::FormApp`].
///
/// # Example
/// ```rust
/// use formfill::FormFillConfig;
///
/// let config = FormFillConfig::builder()
///     .base_url("http://127.0.0.1:9000/")
///     .request_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.upload_url(), "http://127.0.0.1:9000/upload-pdf");
/// ```
#[derive(Clone)]
pub struct FormFillConfig {
    /// Base URL of the extraction service, without a trailing slash.
    /// Default: `http://localhost:8000`.
    pub base_url: String,

    /// Name of the schema definition sent with each upload. Default: `FormSchema`.
    pub schema_name: String,

    /// Timeout for a single extraction request in seconds. Default: `None`.
    ///
    /// With no timeout a hung request keeps the panel in its loading state
    /// until the connection is closed by the peer.
    pub request_timeout_secs: Option<u64>,

    /// Timeout for fetching the example document in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional status/loading listener. Default: `None`.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for FormFillConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            schema_name: DEFAULT_SCHEMA_NAME.to_string(),
            request_timeout_secs: None,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for FormFillConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormFillConfig")
            .field("base_url", &self.base_url)
            .field("schema_name", &self.schema_name)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn UploadProgressCallback>"),
            )
            .finish()
    }
}

impl FormFillConfig {
    /// Create a new builder for `FormFillConfig`.
    pub fn builder() -> FormFillConfigBuilder {
        FormFillConfigBuilder {
            config: Self::default(),
        }
    }

    /// `POST` target for document uploads.
    pub fn upload_url(&self) -> String {
        format!("{}/upload-pdf", self.base_url)
    }

    /// `GET` target for the example document.
    pub fn example_pdf_url(&self) -> String {
        format!("{}/download-example-pdf", self.base_url)
    }
}

/// Builder for [`FormFillConfig`].
pub struct FormFillConfigBuilder {
    config: FormFillConfig,
}

impl fmt::Debug for FormFillConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormFillConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl FormFillConfigBuilder {
    /// Trailing slashes are stripped so endpoint paths join cleanly.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim().trim_end_matches('/').to_string();
        self
    }

    pub fn schema_name(mut self, name: impl Into<String>) -> Self {
        self.config.schema_name = name.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn no_request_timeout(mut self) -> Self {
        self.config.request_timeout_secs = None;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<FormFillConfig, FormFillError> {
        let c = &self.config;

        let parsed = reqwest::Url::parse(&c.base_url).map_err(|e| {
            FormFillError::InvalidConfig(format!("base URL '{}' is not a URL: {}", c.base_url, e))
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FormFillError::InvalidConfig(format!(
                "base URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if c.schema_name.trim().is_empty() {
            return Err(FormFillError::InvalidConfig(
                "schema name must not be empty".into(),
            ));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(FormFillError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        if c.download_timeout_secs == 0 {
            return Err(FormFillError::InvalidConfig(
                "download timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_local_service() {
        let config = FormFillConfig::default();
        assert_eq!(config.upload_url(), "http://localhost:8000/upload-pdf");
        assert_eq!(
            config.example_pdf_url(),
            "http://localhost:8000/download-example-pdf"
        );
        assert_eq!(config.request_timeout_secs, None);
        assert_eq!(config.schema_name, "FormSchema");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = FormFillConfig::builder()
            .base_url("https://extract.example.com//")
            .build()
            .unwrap();
        assert_eq!(config.base_url, "https://extract.example.com");
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = FormFillConfig::builder()
            .base_url("ftp://example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, FormFillError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_garbage_url() {
        assert!(FormFillConfig::builder()
            .base_url("not a url")
            .build()
            .is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        assert!(FormFillConfig::builder()
            .request_timeout_secs(0)
            .build()
            .is_err());
        assert!(FormFillConfig::builder()
            .request_timeout_secs(5)
            .no_request_timeout()
            .build()
            .is_ok());
    }

    #[test]
    fn debug_hides_callback() {
        let config = FormFillConfig::builder()
            .progress_callback(std::sync::Arc::new(crate::progress::NoopProgressCallback))
            .build()
            .unwrap();
        let dbg = format!("{config:?}");
        assert!(dbg.contains("<dyn UploadProgressCallback>"));
    }
}
