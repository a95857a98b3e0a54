//! CLI binary for pdfparse-client.
//!
//! A thin shim over [`UploadWorkflow`]: flags select the model and file, the
//! result goes to stdout, and `--download-dir` saves the `.json` artifact.

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use pdfparse_client::{
    format_file_size, ClientConfig, ProgressCallback, UploadProgressCallback, UploadWorkflow,
    ViewMode,
};
use std::io::{self, Write};
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal spinner shown while the catalog loads and while the service
/// parses the upload. One spinner per phase; each is cleared when its phase
/// settles.
struct CliProgressCallback {
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            spinner: Mutex::new(None),
        })
    }

    fn start(&self, prefix: &str, msg: String) {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix(prefix.to_string());
        bar.set_message(msg);
        bar.enable_steady_tick(Duration::from_millis(80));

        if let Some(old) = self.spinner.lock().replace(bar) {
            old.finish_and_clear();
        }
    }

    fn stop(&self) {
        if let Some(bar) = self.spinner.lock().take() {
            bar.finish_and_clear();
        }
    }
}

impl UploadProgressCallback for CliProgressCallback {
    fn on_catalog_start(&self) {
        self.start("Models", "Loading available models…".to_string());
    }

    fn on_catalog_loaded(&self, _model_count: usize, _error: Option<&str>) {
        self.stop();
    }

    fn on_upload_start(&self, file_name: &str, size: u64, model: &str) {
        self.start(
            "Parsing",
            format!("{file_name} ({}) with {model}", format_file_size(size)),
        );
    }

    fn on_upload_complete(&self, output_len: usize, elapsed_ms: u64) {
        self.stop();
        eprintln!(
            "{} Parsed  {}  {}",
            green("✔"),
            dim(&format!("{output_len} chars")),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        );
    }

    fn on_upload_error(&self, error: &str) {
        self.stop();
        eprintln!("{} {}", red("✘"), red(error));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Parse with the default model, print formatted JSON
  pdfparse invoice.pdf

  # Pick a model and keep the untouched response text
  pdfparse --model gemini-2.5-pro --raw invoice.pdf

  # Also save invoice.json into ./out
  pdfparse invoice.pdf --download-dir out

  # Show what the service offers
  pdfparse --list-models

  # Talk to a remote parser
  pdfparse --base-url http://parser.internal:8000 invoice.pdf

LIMITS:
  Only PDF files are accepted, up to 50 MB.

ENVIRONMENT VARIABLES:
  PDFPARSE_BASE_URL   Parsing service root (default http://localhost:8000)
  PDFPARSE_MODEL      Model identifier
  RUST_LOG            Log filter, e.g. pdfparse_client=debug
"#;

/// Upload PDFs to an AI parsing service and print the extracted JSON.
#[derive(Parser, Debug)]
#[command(
    name = "pdfparse",
    version,
    about = "Upload PDFs to an AI parsing service and print the extracted JSON",
    long_about = "Send a PDF to a parsing service together with the AI model to use, then print \
the structured text/JSON it returns. JSON results are pretty-printed unless --raw is given.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to parse.
    input: Option<PathBuf>,

    /// Model identifier (see --list-models). Default: gemini-2.5-flash.
    #[arg(short, long, env = "PDFPARSE_MODEL")]
    model: Option<String>,

    /// Parsing service root URL.
    #[arg(long, env = "PDFPARSE_BASE_URL", default_value = pdfparse_client::DEFAULT_BASE_URL)]
    base_url: String,

    /// List available models and exit.
    #[arg(long)]
    list_models: bool,

    /// Print the response exactly as returned instead of pretty-printed JSON.
    #[arg(long, env = "PDFPARSE_RAW")]
    raw: bool,

    /// Also save the result as <file>.json in this directory.
    #[arg(short, long, env = "PDFPARSE_DOWNLOAD_DIR")]
    download_dir: Option<PathBuf>,

    /// Print a JSON envelope (file, model, output) instead of the bare output.
    #[arg(long, env = "PDFPARSE_JSON")]
    json: bool,

    /// Whole-request timeout in seconds (default: none).
    #[arg(long, env = "PDFPARSE_TIMEOUT")]
    timeout: Option<u64>,

    /// Disable the progress spinner.
    #[arg(long, env = "PDFPARSE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFPARSE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the result.
    #[arg(short, long, env = "PDFPARSE_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner carries the progress story; keep INFO logs out of its way.
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

    // ── Build workflow ───────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn UploadProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;
    let workflow = UploadWorkflow::new(config).context("Failed to create HTTP client")?;

    workflow
        .init()
        .await
        .context("Could not load the model catalog")?;

    // ── List-only mode ───────────────────────────────────────────────────
    if cli.list_models {
        let catalog = workflow.catalog();
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(catalog.models())
                    .context("Failed to serialise models")?
            );
        } else {
            let selected = workflow.selected_model();
            for m in catalog.models() {
                let marker = if m.value == selected { green("●") } else { " ".to_string() };
                println!("{marker} {:<28} {}", bold(&m.value), m.name);
                if !m.description.is_empty() {
                    println!("  {:<28} {}", "", dim(&m.description));
                }
            }
        }
        return Ok(());
    }

    let Some(input) = cli.input.as_ref() else {
        bail!("No PDF given. Pass a file path, or use --list-models.");
    };

    // ── Selection ────────────────────────────────────────────────────────
    if let Some(ref model) = cli.model {
        workflow.select_model(model.as_str())?;
    }
    workflow
        .select_file_path(input)
        .with_context(|| format!("Cannot use '{}'", input.display()))?;

    if !cli.quiet && !cli.json {
        let state = workflow.snapshot();
        if let Some(file) = state.selected_file.as_ref() {
            eprintln!(
                "{} {}  {}",
                cyan("◆"),
                bold(&file.name),
                dim(&format_file_size(file.size))
            );
        }
        match workflow.selected_model_info() {
            Some(info) if !info.description.is_empty() => eprintln!(
                "{} {}  {}",
                cyan("◆"),
                bold(&info.name),
                dim(&info.description)
            ),
            Some(info) => eprintln!("{} {}", cyan("◆"), bold(&info.name)),
            None => eprintln!("{} {}", cyan("◆"), bold(&state.selected_model)),
        }
    }

    // ── Upload ───────────────────────────────────────────────────────────
    let output = workflow.submit().await.context("Upload failed")?;

    if cli.raw {
        workflow.set_view_mode(ViewMode::Raw);
    }
    let state = workflow.snapshot();
    let rendered = state.rendered_output().unwrap_or_else(|| output.raw());

    if cli.json {
        let envelope = serde_json::json!({
            "file": state.selected_file.as_ref().map(|f| f.name.as_str()),
            "model": state.selected_model,
            "is_json": output.is_json(),
            "output": rendered,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&envelope).context("Failed to serialise output")?
        );
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(rendered.as_bytes())
            .context("Failed to write to stdout")?;
        if !rendered.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
        if !cli.quiet && !output.is_json() {
            eprintln!("{}", dim("(raw output: response is not JSON)"));
        }
    }

    // ── Download ─────────────────────────────────────────────────────────
    if let Some(ref dir) = cli.download_dir {
        match workflow.download(dir) {
            Some(path) if !cli.quiet => {
                eprintln!("{}  →  {}", green("✔"), bold(&path.display().to_string()));
            }
            Some(_) => {}
            None => eprintln!(
                "{} Could not save the result to {}",
                red("✘"),
                dir.display()
            ),
        }
    }

    Ok(())
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ClientConfig> {
    let mut builder = ClientConfig::builder().base_url(&cli.base_url);
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder.build().context("Invalid configuration")
}
