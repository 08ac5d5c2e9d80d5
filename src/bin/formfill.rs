//! CLI binary for formfill.
//!
//! A thin shim over the library crate: flags become field values, the form
//! is validated, and documents are sent to the extraction service.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use formfill::config::{DEFAULT_BASE_URL, DEFAULT_SCHEMA_NAME};
use formfill::{
    download_example_pdf, fetch_example_pdf, FieldErrors, FormApp, FormFillConfig, FormRecord,
    SubmitOutcome, UploadFile, UploadProgressCallback, UploadState,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI upload callback using indicatif ──────────────────────────────────────

/// Terminal callback: a spinner while the upload panel is loading, the
/// status line as its message.
struct CliUploadCallback {
    bar: ProgressBar,
}

impl CliUploadCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::hidden();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Upload");
        Arc::new(Self { bar })
    }
}

impl UploadProgressCallback for CliUploadCallback {
    fn on_upload_start(&self, file_name: &str, size: usize) {
        self.bar.println(format!(
            "{} {} {}",
            cyan("◆"),
            bold(&format!("Sending {file_name}")),
            dim(&format!("({size} bytes)"))
        ));
    }

    fn on_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    fn on_loading_changed(&self, loading: bool) {
        if loading {
            self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
            self.bar.enable_steady_tick(Duration::from_millis(80));
        } else {
            self.bar.finish_and_clear();
        }
    }

    fn on_fields_applied(&self, fields: &[String]) {
        for field in fields {
            self.bar.println(format!("  {} {}", green("✓"), field));
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Print the JSON Schema sent with every upload
  formfill schema

  # Validate a record typed on the command line
  formfill submit --first-name Jane --last-name Doe --email jane@example.com \
      --phone 555-0100 --income 50000 --expenses 2000

  # Fill the form from a PDF, then validate it
  formfill upload w2.pdf

  # Same, against a service on another host, with a manual correction
  formfill --base-url http://10.0.0.5:8000 upload w2.pdf --set phone=555-0199

  # Try the service's own example document
  formfill upload --example --json

  # Save the example document
  formfill download-example -o example.pdf

ENVIRONMENT VARIABLES:
  FORMFILL_BASE_URL         Extraction service base URL
  FORMFILL_TIMEOUT          Per-request upload timeout in seconds (default: none)
  FORMFILL_SCHEMA_NAME      Name of the published schema definition
  RUST_LOG                  Override the log filter
"#;

/// Validate a personal/financial form, optionally filling it from a PDF.
#[derive(Parser, Debug)]
#[command(
    name = "formfill",
    version,
    about = "Validate a personal/financial form, optionally auto-filled from a PDF",
    long_about = "Validate a personal/financial profile form. Values can be typed as flags or \
extracted from an uploaded document by a remote LLM-backed extraction service.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Base URL of the extraction service.
    #[arg(long, global = true, env = "FORMFILL_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Name of the schema definition sent with uploads.
    #[arg(long, global = true, env = "FORMFILL_SCHEMA_NAME", default_value = DEFAULT_SCHEMA_NAME)]
    schema_name: String,

    /// Upload request timeout in seconds (no timeout when unset).
    #[arg(long, global = true, env = "FORMFILL_TIMEOUT")]
    timeout: Option<u64>,

    /// Example download timeout in seconds.
    #[arg(long, global = true, env = "FORMFILL_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "FORMFILL_VERBOSE")]
    verbose: bool,

    /// Suppress all output except results and errors.
    #[arg(short, long, global = true, env = "FORMFILL_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the structural JSON Schema.
    Schema {
        /// Single-line output.
        #[arg(long)]
        compact: bool,
    },

    /// Validate field values and print the record.
    Submit {
        #[command(flatten)]
        fields: FieldArgs,

        /// Output JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Upload a document, populate the form from the reply, then validate.
    Upload {
        /// Document to upload.
        #[arg(required_unless_present = "example")]
        file: Option<PathBuf>,

        /// Upload the service's example document instead of a local file.
        #[arg(long, conflicts_with = "file")]
        example: bool,

        /// Field overrides applied after population (name=value, repeatable).
        #[arg(long = "set", value_name = "NAME=VALUE")]
        overrides: Vec<String>,

        /// Output JSON instead of text.
        #[arg(long)]
        json: bool,

        /// Disable the spinner.
        #[arg(long, env = "FORMFILL_NO_PROGRESS")]
        no_progress: bool,
    },

    /// Save the service's example document.
    DownloadExample {
        /// Destination path.
        #[arg(short, long, default_value = "example.pdf")]
        output: PathBuf,
    },

    /// Show how the extraction pipeline works.
    Explain,
}

/// Field values typed on the command line.
#[derive(Args, Debug, Default)]
struct FieldArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    /// Annual income.
    #[arg(long, allow_hyphen_values = true)]
    income: Option<String>,
    /// Monthly expenses.
    #[arg(long, allow_hyphen_values = true)]
    expenses: Option<String>,

    /// JSON object of field values, applied before the flags.
    #[arg(long, value_name = "FILE")]
    values: Option<PathBuf>,

    /// Extra field values (name=value, repeatable).
    #[arg(long = "set", value_name = "NAME=VALUE")]
    overrides: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        Command::Schema { compact } => {
            let config = build_config(&cli, false)?;
            let app = FormApp::new(&config)?;
            let schema = app.structural_schema();
            let text = if *compact {
                serde_json::to_string(schema)
            } else {
                serde_json::to_string_pretty(schema)
            }
            .context("Failed to serialise schema")?;
            println!("{text}");
        }

        Command::Submit { fields, json } => {
            let config = build_config(&cli, false)?;
            let mut app = FormApp::new(&config)?;
            apply_field_args(&mut app, fields).await?;
            submit(&mut app, *json, cli.quiet)?;
        }

        Command::Upload {
            file,
            example,
            overrides,
            json,
            no_progress,
        } => {
            let show_progress = !cli.quiet && !*no_progress && !*json;
            let config = build_config(&cli, show_progress)?;
            let mut app = FormApp::new(&config)?;

            let upload = if *example {
                fetch_example_pdf(&config)
                    .await
                    .context("Failed to fetch the example document")?
            } else {
                let path = file.as_ref().context("No file given")?;
                UploadFile::from_path(path)
                    .with_context(|| format!("Failed to load {}", path.display()))?
            };
            app.upload.select_file(upload);

            let state = app.upload_selected().await;
            if !cli.quiet {
                let mark = if state == UploadState::Succeeded {
                    green("✔")
                } else {
                    red("✘")
                };
                eprintln!("{} {}", mark, app.upload.status());
            }
            if state != UploadState::Succeeded {
                anyhow::bail!("Upload failed (run with --verbose for details)");
            }

            for pair in overrides {
                set_pair(&mut app, pair)?;
            }
            submit(&mut app, *json, cli.quiet)?;
        }

        Command::DownloadExample { output } => {
            let config = build_config(&cli, false)?;
            let written = download_example_pdf(&config, output)
                .await
                .context("Download failed")?;
            if !cli.quiet {
                eprintln!(
                    "{} {} bytes  →  {}",
                    green("✔"),
                    written,
                    bold(&output.display().to_string())
                );
            }
        }

        Command::Explain => {
            let config = build_config(&cli, false)?;
            let mut app = FormApp::new(&config)?;
            app.explainer.toggle();
            for section in app.explainer.sections() {
                println!("{}", bold(section.title));
                println!("{}", dim(&format!("```{}", section.language)));
                println!("{}", section.code);
                println!("{}\n", dim("```"));
            }
        }
    }

    Ok(())
}

/// Map CLI args to `FormFillConfig`.
fn build_config(cli: &Cli, show_progress: bool) -> Result<FormFillConfig> {
    let mut builder = FormFillConfig::builder()
        .base_url(&cli.base_url)
        .schema_name(&cli.schema_name)
        .download_timeout_secs(cli.download_timeout);

    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if show_progress {
        builder = builder.progress_callback(CliUploadCallback::new());
    }

    builder.build().context("Invalid configuration")
}

/// Apply `--values`, then the named flags, then `--set`, as keystrokes.
async fn apply_field_args(app: &mut FormApp, args: &FieldArgs) -> Result<()> {
    if let Some(ref path) = args.values {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read values from {:?}", path))?;
        let values: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&text)
            .with_context(|| format!("{:?} is not a JSON object", path))?;
        for (name, value) in &values {
            if !app.form.set_json_value(name, value) {
                tracing::warn!("Ignoring '{}' from {:?}", name, path);
            }
        }
    }

    let named = [
        ("firstName", &args.first_name),
        ("lastName", &args.last_name),
        ("email", &args.email),
        ("phone", &args.phone),
        ("income", &args.income),
        ("expenses", &args.expenses),
    ];
    for (name, value) in named {
        if let Some(v) = value {
            app.form.on_change(name, v.clone());
        }
    }

    for pair in &args.overrides {
        set_pair(app, pair)?;
    }
    Ok(())
}

/// Parse and apply one `name=value` override.
fn set_pair(app: &mut FormApp, pair: &str) -> Result<()> {
    let (name, value) = pair
        .split_once('=')
        .with_context(|| format!("Expected NAME=VALUE, got '{pair}'"))?;
    let name = name.trim();
    if !app.form.on_change(name, value) {
        let known: Vec<&str> = app
            .form
            .schema()
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        anyhow::bail!("Unknown field '{}' (known: {})", name, known.join(", "));
    }
    Ok(())
}

/// Run the submit handler and print the record or every error.
fn submit(app: &mut FormApp, json: bool, quiet: bool) -> Result<()> {
    let mut submitted: Option<FormRecord> = None;
    let outcome = app
        .form
        .handle_submit(|record: FormRecord| submitted = Some(record))
        .context("Submission failed")?;

    match (outcome, submitted) {
        (SubmitOutcome::Submitted, Some(record)) => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&record).context("Failed to serialise record")?
                );
            } else {
                for binding in app.form.bindings() {
                    println!("{:<18} {}", format!("{}:", binding.label), binding.value);
                }
                if !quiet {
                    eprintln!("{} record is valid", green("✔"));
                }
            }
            Ok(())
        }
        (SubmitOutcome::Invalid(errors), _) => {
            print_errors(app, &errors, json)?;
            anyhow::bail!("{} field(s) failed validation", errors.len())
        }
        (SubmitOutcome::Submitted, None) => anyhow::bail!("Submit handler did not run"),
    }
}

fn print_errors(app: &FormApp, errors: &FieldErrors, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "errors": errors }))
                .context("Failed to serialise errors")?
        );
        return Ok(());
    }
    for binding in app.form.bindings() {
        if let Some(message) = binding.error {
            eprintln!(
                "  {} {:<18} {}  {}",
                red("✗"),
                binding.label,
                red(message),
                dim(&format!("(got {:?})", binding.value))
            );
        }
    }
    Ok(())
}
