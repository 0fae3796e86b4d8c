//! CLI binary for cv-workflow.
//!
//! Runs one session end to end: upload the document, extract its fields,
//! let the user review them, and submit. Human-readable progress goes to
//! stderr; the service's final JSON goes to stdout.

use anyhow::{Context, Result};
use clap::Parser;
use cv_workflow::{
    ClientConfig, FileUpload, FormField, HttpApi, ProfileForm, Session, Step, StepObserver,
    WorkflowError, DEFAULT_API_BASE,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
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

// ── Spinner observer using indicatif ─────────────────────────────────────────

/// Shows a spinner while a remote call is outstanding.
struct SpinnerObserver {
    bar: Mutex<Option<ProgressBar>>,
}

impl SpinnerObserver {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
        })
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        }
    }
}

impl StepObserver for SpinnerObserver {
    fn on_step_start(&self, step: Step) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix(match step {
            Step::Upload => "Uploading",
            Step::Extract => "Extracting",
            Step::Submit => "Submitting",
        });
        bar.set_message("waiting for the service…");
        bar.enable_steady_tick(Duration::from_millis(80));

        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(bar);
        }
    }

    fn on_step_complete(&self, _step: Step) {
        self.clear();
    }

    fn on_step_error(&self, _step: Step, _error: &str) {
        self.clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Upload, extract, review interactively, submit
  cvflow resume.pdf

  # Against another service
  cvflow --api-base https://cv.example.com/api/v1 resume.docx

  # Non-interactive, overriding two fields
  cvflow --yes --set age=30 --set travelMode=car resume.pdf

  # Show the payload without submitting
  cvflow --yes --dry-run --json resume.pdf > payload.json

FIELDS (for --set):
  name, employmentStatus, currentEmployer, currentPosition, age, location,
  recruiterName, contactName, hardSkills, experienceDescription,
  yearsOfExperience, graduationStatus, degree, targetRoles, ambitions,
  travelMode, minutesOfRoad, onSiteDays, grossSalary, salaryPeriod,
  hoursAWeek, jobDescriptionText

  Lists are comma separated. Blank optional fields are sent as null.

INTERACTIVE REVIEW:
  Enter keeps the shown value, "-" clears it, anything else replaces it.

ENVIRONMENT VARIABLES:
  CVFLOW_API_BASE   API base URL (default http://localhost:3000/api/v1)
  CVFLOW_TIMEOUT    Per-request timeout in seconds (default: none)
  RUST_LOG          Override log filter
"#;

/// Upload a CV, extract candidate fields, review and submit them.
#[derive(Parser, Debug)]
#[command(
    name = "cvflow",
    version,
    about = "Upload a CV, extract candidate fields, review and submit them",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// CV document to upload (.pdf, .doc or .docx).
    file: PathBuf,

    /// Base URL of the CV service.
    #[arg(long, env = "CVFLOW_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Per-request timeout in seconds. Unset means wait indefinitely.
    #[arg(long, env = "CVFLOW_TIMEOUT")]
    timeout: Option<u64>,

    /// TCP connect timeout in seconds.
    #[arg(long, env = "CVFLOW_CONNECT_TIMEOUT")]
    connect_timeout: Option<u64>,

    /// Override a field before review: FIELD=VALUE (repeatable).
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    set: Vec<(FormField, String)>,

    /// Skip interactive review and retry prompts.
    #[arg(short, long, env = "CVFLOW_YES")]
    yes: bool,

    /// Print the payload instead of submitting it.
    #[arg(long)]
    dry_run: bool,

    /// Print only the final JSON on stdout.
    #[arg(long, env = "CVFLOW_JSON")]
    json: bool,

    /// Disable spinners.
    #[arg(long, env = "CVFLOW_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CVFLOW_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the final JSON.
    #[arg(short, long, env = "CVFLOW_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Spinners give all the feedback that matters while a call is pending,
    // so library INFO logs are hidden unless spinners are off.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;
    let api = HttpApi::new(config).context("Failed to create HTTP client")?;
    let mut session = Session::new(Arc::new(api));
    if show_progress {
        session = session.with_observer(SpinnerObserver::new());
    }

    let interactive = !cli.yes && io::stdin().is_terminal();
    let document = FileUpload::from_path(&cli.file)
        .await
        .with_context(|| format!("Cannot upload {}", cli.file.display()))?;

    // ── 1. Upload ────────────────────────────────────────────────────────
    loop {
        match session.upload(&document).await {
            Ok(state) => {
                if !cli.quiet {
                    eprintln!(
                        "{} File uploaded! Key: {}",
                        green("✔"),
                        bold(state.file_key().unwrap_or_default())
                    );
                }
                break;
            }
            Err(e) => {
                if !offer_retry(Step::Upload, &e, interactive)? {
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    // ── 2. Extract ───────────────────────────────────────────────────────
    loop {
        match session.extract().await {
            Ok(state) => {
                if !cli.quiet {
                    eprintln!("{} Data extracted!", green("✔"));
                    if let Some(fields) = state.extracted() {
                        eprintln!("{}", pretty(&fields.raw)?);
                    }
                }
                break;
            }
            Err(e) => {
                if !offer_retry(Step::Extract, &e, interactive)? {
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    // ── 3. Review ────────────────────────────────────────────────────────
    let mut form = session.review_form()?;
    for (field, value) in &cli.set {
        form.set(*field, value)
            .with_context(|| format!("--set {}={}", field.key(), value))?;
    }
    if interactive {
        eprintln!("{}", bold("Review and edit extracted data before submitting:"));
        let stdin = io::stdin();
        review(&mut form, &mut stdin.lock(), &mut io::stderr())
            .context("Failed to read review input")?;
    }

    let profile = form.to_profile();
    if cli.dry_run {
        println!("{}", pretty(&profile)?);
        return Ok(ExitCode::SUCCESS);
    }

    // ── 4. Submit ────────────────────────────────────────────────────────
    loop {
        match session.submit(&profile).await {
            Ok(state) => {
                if !cli.quiet && !cli.json {
                    eprintln!("{} CV submitted successfully!", green("✔"));
                }
                if let Some(response) = state.response() {
                    println!("{}", pretty(response)?);
                }
                break;
            }
            Err(e) => {
                if !offer_retry(Step::Submit, &e, interactive)? {
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let mut builder = ClientConfig::builder().api_base(&cli.api_base);
    if let Some(secs) = cli.timeout {
        builder = builder.timeout_secs(secs);
    }
    if let Some(secs) = cli.connect_timeout {
        builder = builder.connect_timeout_secs(secs);
    }
    builder.build().context("Invalid configuration")
}

/// Report a failed step once, then ask whether to retry it. `false` means
/// give up; the failure has already been shown.
fn offer_retry(step: Step, error: &WorkflowError, interactive: bool) -> Result<bool> {
    let stdin = io::stdin();
    report_failure(step, error, interactive, &mut stdin.lock(), &mut io::stderr())
}

fn report_failure(
    step: Step,
    error: &WorkflowError,
    interactive: bool,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<bool> {
    let title = match step {
        Step::Upload => "Upload failed",
        Step::Extract => "Extraction failed",
        Step::Submit => "Submission failed",
    };
    writeln!(output, "{} {}: {}", red("✘"), bold(title), error)?;

    if interactive {
        return confirm(&format!("Retry {step}?"), input, output);
    }
    Ok(false)
}

/// Ask a yes/no question; anything but yes is no.
fn confirm(question: &str, input: &mut impl BufRead, output: &mut impl Write) -> Result<bool> {
    write!(output, "{question} {} ", dim("[y/N]"))?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Prompt for every field. Enter keeps, `-` clears, invalid input re-prompts.
/// End of input keeps the remaining fields as they are.
fn review(form: &mut ProfileForm, input: &mut impl BufRead, output: &mut impl Write) -> Result<()> {
    for field in FormField::ALL {
        loop {
            write!(output, "{} {}: ", field.label(), dim(&format!("[{}]", form.get(field))))?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Ok(());
            }
            let answer = line.trim_end_matches(['\r', '\n']);

            let result = match answer {
                "" => Ok(()),
                "-" => form.set(field, ""),
                value => form.set(field, value),
            };
            match result {
                Ok(()) => break,
                Err(e) => writeln!(output, "  {} {}", red("✗"), e)?,
            }
        }
    }
    Ok(())
}

/// Parse `--set FIELD=VALUE`.
fn parse_assignment(s: &str) -> Result<(FormField, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{s}'"))?;
    let field = FormField::from_key(key).map_err(|e| e.to_string())?;
    Ok((field, value.to_string()))
}

fn pretty<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialise JSON")
}
