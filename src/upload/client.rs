//! HTTP client for the extraction service.
//!
//! One call, one request: [`UploadClient::upload_and_extract`] posts the file
//! and the structural schema as a multipart body and decodes the reply. There
//! is no retry. Failures come back as a typed [`UploadError`] so the caller
//! can log the detail before collapsing it into a status line.
//!
//! ## Single flight
//!
//! Clones of a client share one in-flight token. While a request is
//! outstanding every other call through any clone returns
//! [`UploadError::Busy`] immediately without touching the network. The token
//! is released when the request future completes or is dropped.

use crate::config::FormFillConfig;
use crate::error::{FormFillError, UploadError};
use crate::record::ExtractionResponse;
use crate::upload::input::UploadFile;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Longest slice of an error body kept in [`UploadError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Multipart client for `POST {base_url}/upload-pdf`.
#[derive(Debug, Clone)]
pub struct UploadClient {
    http: reqwest::Client,
    upload_url: String,
    timeout_secs: Option<u64>,
    in_flight: Arc<AtomicBool>,
}

impl UploadClient {
    pub fn new(config: &FormFillConfig) -> Result<Self, FormFillError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| FormFillError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            upload_url: config.upload_url(),
            timeout_secs: config.request_timeout_secs,
            in_flight: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    /// `true` while a request through this client (or a clone) is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Upload `file` with `schema` and return the decoded extraction reply.
    ///
    /// # Errors
    /// * [`UploadError::Busy`] — another request is outstanding; nothing sent
    /// * [`UploadError::Transport`] / [`UploadError::Timeout`] — no response
    /// * [`UploadError::Status`] — non-2xx reply
    /// * [`UploadError::MalformedResponse`] — 2xx reply that is not an
    ///   [`ExtractionResponse`]
    pub async fn upload_and_extract(
        &self,
        file: &UploadFile,
        schema: &Value,
    ) -> Result<ExtractionResponse, UploadError> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(UploadError::Busy)?;

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| self.transport_error(e))?;
        let form = Form::new()
            .part("file", part)
            .text("schema", schema.to_string());

        info!(
            "Uploading '{}' ({} bytes) to {}",
            file.file_name,
            file.len(),
            self.upload_url
        );

        let response = self
            .http
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Status {
                status: status.as_u16(),
                body: truncate_chars(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        let reply = response
            .json::<ExtractionResponse>()
            .await
            .map_err(|e| {
                if e.is_decode() {
                    UploadError::MalformedResponse {
                        detail: e.to_string(),
                    }
                } else {
                    self.transport_error(e)
                }
            })?;

        debug!(
            "Extraction reply for {:?}: status={:?}, {} field(s)",
            reply.filename,
            reply.status,
            reply.result.len()
        );
        Ok(reply)
    }

    fn transport_error(&self, e: reqwest::Error) -> UploadError {
        if e.is_timeout() {
            UploadError::Timeout {
                url: self.upload_url.clone(),
                secs: self.timeout_secs.unwrap_or_default(),
            }
        } else {
            UploadError::Transport {
                url: self.upload_url.clone(),
                reason: e.to_string(),
            }
        }
    }
}

/// Holds the in-flight token; releasing it on drop covers every exit path,
/// including cancellation of the request future.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}\u{2026}", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);
        let first = InFlightGuard::acquire(&flag);
        assert!(first.is_some());
        assert!(InFlightGuard::acquire(&flag).is_none());
        drop(first);
        assert!(InFlightGuard::acquire(&flag).is_some());
    }

    #[test]
    fn clones_share_the_token() {
        let client = UploadClient::new(&FormFillConfig::default()).unwrap();
        let clone = client.clone();
        let _held = InFlightGuard::acquire(&client.in_flight).unwrap();
        assert!(clone.is_busy());
    }

    #[test]
    fn truncation_is_char_safe() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("ééééé", 2), "éé\u{2026}");
    }

    #[test]
    fn upload_url_comes_from_config() {
        let config = FormFillConfig::builder()
            .base_url("http://10.0.0.2:9000")
            .build()
            .unwrap();
        let client = UploadClient::new(&config).unwrap();
        assert_eq!(client.upload_url(), "http://10.0.0.2:9000/upload-pdf");
    }
}
