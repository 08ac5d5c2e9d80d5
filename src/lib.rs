//! # formfill
//!
//! Schema-driven form validation with document-based auto-fill.
//!
//! A user can type a personal/financial profile into the form, or upload a
//! PDF to an extraction service that reads it with a vision LLM and returns
//! the fields. Both paths write the same field bindings and both end in the
//! same validation on submit.
//!
//! ## Overview
//!
//! ```text
//!  FormSchema ──┬─▶ validate()        ──▶ FormController ──▶ FormRecord
//!  (one rule    │                           ▲
//!   set)        └─▶ to_json_schema()  ──▶ UploadPanel ──POST /upload-pdf──▶ service
//!                                           └── result{field: value} ─┘
//! ```
//!
//! * [`schema`]    — field rules, validator and JSON Schema from one list
//! * [`form`]      — bindings, errors and submit state
//! * [`upload`]    — multipart client, status line and loading flag
//! * [`explainer`] — static "how it works" snippets behind a toggle
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use formfill::{FormApp, FormFillConfig, FormRecord, SubmitOutcome, UploadFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FormFillConfig::builder()
//!         .base_url("http://localhost:8000")
//!         .build()?;
//!     let mut app = FormApp::new(&config)?;
//!
//!     app.upload.select_file(UploadFile::from_path("w2.pdf")?);
//!     app.upload_selected().await;
//!     eprintln!("{}", app.upload.status());
//!
//!     match app.form.handle_submit(|record: FormRecord| println!("{record:?}"))? {
//!         SubmitOutcome::Submitted => {}
//!         SubmitOutcome::Invalid(errors) => eprintln!("{errors:?}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `formfill` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod app;
pub mod config;
pub mod error;
pub mod explainer;
pub mod form;
pub mod progress;
pub mod record;
pub mod schema;
pub mod upload;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use app::FormApp;
pub use config::{FormFillConfig, FormFillConfigBuilder};
pub use error::{FormFillError, UploadError};
pub use explainer::{ExplainerPanel, ExplainerSection};
pub use form::{FieldBinding, FormController, SubmitOutcome, SubmitState};
pub use progress::{NoopProgressCallback, ProgressCallback, UploadProgressCallback};
pub use record::{ExtractionResponse, FormRecord};
pub use schema::{FieldErrors, FieldKind, FieldRule, FieldSpec, FormSchema, ValidatedValues};
pub use upload::client::UploadClient;
pub use upload::example::{download_example_pdf, fetch_example_pdf};
pub use upload::input::UploadFile;
pub use upload::{UploadPanel, UploadState};
