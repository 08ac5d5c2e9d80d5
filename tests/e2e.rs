//! End-to-end tests against a live extraction service.
//!
//! These make real HTTP calls (and, behind the service, real LLM calls).
//! They are gated behind the `FORMFILL_E2E_URL` environment variable so they
//! do not run in CI unless explicitly requested.
//!
//! Run with:
//!   FORMFILL_E2E_URL=http://localhost:8000 cargo test --test e2e -- --nocapture
//!
//! Optionally point `FORMFILL_E2E_PDF` at a local document; otherwise the
//! service's own example document is used.

use formfill::{
    fetch_example_pdf, FormApp, FormFillConfig, FormRecord, SubmitOutcome, UploadFile,
    UploadState,
};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// The live service URL, or `None` (and a note on stderr) when not enabled.
fn e2e_base_url() -> Option<String> {
    match std::env::var("FORMFILL_E2E_URL") {
        Ok(url) if !url.trim().is_empty() => Some(url),
        _ => {
            eprintln!("SKIP: FORMFILL_E2E_URL not set");
            None
        }
    }
}

fn e2e_config(base_url: &str) -> FormFillConfig {
    FormFillConfig::builder()
        .base_url(base_url)
        .request_timeout_secs(180)
        .build()
        .expect("valid e2e config")
}

async fn e2e_document(config: &FormFillConfig) -> UploadFile {
    match std::env::var("FORMFILL_E2E_PDF") {
        Ok(path) => UploadFile::from_path(&path).expect("readable FORMFILL_E2E_PDF"),
        Err(_) => fetch_example_pdf(config)
            .await
            .expect("service serves an example document"),
    }
}

// ── Live tests ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_example_document_is_a_pdf() {
    let Some(base) = e2e_base_url() else { return };
    let config = e2e_config(&base);

    let doc = fetch_example_pdf(&config).await.expect("download");
    assert!(doc.is_pdf(), "example document is not a PDF: {doc:?}");
    assert!(!doc.is_empty());
}

#[tokio::test]
async fn test_upload_populates_form() {
    let Some(base) = e2e_base_url() else { return };
    let config = e2e_config(&base);

    let mut app = FormApp::new(&config).unwrap();
    app.upload.select_file(e2e_document(&config).await);

    let state = app.upload_selected().await;
    assert_eq!(state, UploadState::Succeeded, "status: {}", app.upload.status());

    let filled: Vec<_> = app
        .form
        .bindings()
        .into_iter()
        .filter(|b| !b.value.is_empty())
        .map(|b| format!("{}={}", b.name, b.value))
        .collect();
    eprintln!("populated: {filled:?}");
    assert!(!filled.is_empty(), "service returned no known fields");
}

#[tokio::test]
async fn test_upload_then_submit() {
    let Some(base) = e2e_base_url() else { return };
    let config = e2e_config(&base);

    let mut app = FormApp::new(&config).unwrap();
    app.upload.select_file(e2e_document(&config).await);
    app.upload_selected().await;

    // Whatever the model returned, submit must either produce a record or
    // name every failing field; it must never error.
    let mut record: Option<FormRecord> = None;
    match app.form.handle_submit(|r: FormRecord| record = Some(r)).unwrap() {
        SubmitOutcome::Submitted => {
            let record = record.expect("handler ran");
            assert!(record.income >= 0.0);
            assert!(record.expenses >= 0.0);
        }
        SubmitOutcome::Invalid(errors) => {
            eprintln!("extracted record needs correction: {errors:?}");
            assert!(errors.keys().all(|k| app.form.schema().contains(k)));
        }
    }
}
