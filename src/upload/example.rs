//! Fetch the service's example document (`GET /download-example-pdf`).

use crate::config::FormFillConfig;
use crate::error::FormFillError;
use crate::upload::input::UploadFile;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Name used when the service does not suggest one.
const DEFAULT_EXAMPLE_NAME: &str = "example.pdf";

/// Download the example document into memory.
pub async fn fetch_example_pdf(config: &FormFillConfig) -> Result<UploadFile, FormFillError> {
    let url = config.example_pdf_url();
    info!("Downloading example document from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.download_timeout_secs))
        .build()
        .map_err(|e| FormFillError::DownloadFailed {
            url: url.clone(),
            reason: e.to_string(),
        })?;

    let download_error = |e: reqwest::Error| {
        if e.is_timeout() {
            FormFillError::DownloadTimeout {
                url: url.clone(),
                secs: config.download_timeout_secs,
            }
        } else {
            FormFillError::DownloadFailed {
                url: url.clone(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(&url).send().await.map_err(download_error)?;

    if !response.status().is_success() {
        return Err(FormFillError::DownloadFailed {
            url: url.clone(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let file_name = suggested_file_name(&response).unwrap_or_else(|| DEFAULT_EXAMPLE_NAME.to_string());
    let bytes = response.bytes().await.map_err(download_error)?;

    info!("Downloaded {} ({} bytes)", file_name, bytes.len());
    Ok(UploadFile::from_bytes(file_name, bytes.to_vec()))
}

/// Download the example document and write it to `dest`.
///
/// Returns the number of bytes written.
pub async fn download_example_pdf(
    config: &FormFillConfig,
    dest: impl AsRef<Path>,
) -> Result<usize, FormFillError> {
    let dest = dest.as_ref();
    let file = fetch_example_pdf(config).await?;

    tokio::fs::write(dest, &file.bytes)
        .await
        .map_err(|e| FormFillError::OutputWriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;

    info!("Saved example document to: {}", dest.display());
    Ok(file.len())
}

/// The `filename=` parameter of `Content-Disposition`, if present and sane.
fn suggested_file_name(response: &reqwest::Response) -> Option<String> {
    let header = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)?
        .to_str()
        .ok()?;
    parse_disposition_file_name(header)
}

fn parse_disposition_file_name(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|param| param.strip_prefix("filename="))
        .map(|v| v.trim_matches('"'))
        // Never let a server-provided name carry path components.
        .and_then(|v| Path::new(v).file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
}
