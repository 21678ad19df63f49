//! CLI binary for cloudconvert.
//!
//! A thin shim over the library crate that maps CLI flags to a
//! `ClientConfig` + `Conversion` and prints the result.

use anyhow::{Context, Result};
use clap::Parser;
use cloudconvert::{
    convert_file, convert_url, format_from_path, ApiKey, ClientConfig, Conversion,
    ProcessProgressCallback, ProcessStatus, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal spinner that follows the job through its steps.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Starting");
        bar.set_message("creating process…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ProcessProgressCallback for CliProgressCallback {
    fn on_process_created(&self, process_url: &str) {
        self.bar.set_prefix("Created");
        self.bar.set_message(dim(process_url));
    }

    fn on_input_submitted(&self, filename: &str) {
        self.bar.set_prefix("Submitted");
        self.bar.set_message(filename.to_string());
    }

    fn on_poll(&self, attempt: u64, status: &ProcessStatus) {
        let step = status.step.as_ref().map(|s| s.as_str()).unwrap_or("?");
        let percent = status
            .percent
            .map(|p| format!(" {p:.0}%"))
            .unwrap_or_default();
        let message = status.message.as_deref().unwrap_or("");
        self.bar.set_prefix("Converting");
        self.bar
            .set_message(format!("{step}{percent}  {}  {}", dim(message), dim(&format!("#{attempt}"))));
    }

    fn on_completed(&self, _status: &ProcessStatus) {
        self.bar.set_prefix("Downloading");
        self.bar.set_message("fetching output…");
    }

    fn on_output_saved(&self, _bytes_written: u64) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a local image (input format taken from the extension)
  cloudconvert photo.jpg --to png

  # Explicit output path and a vendor option
  cloudconvert talk.wav --to mp3 -o talk.mp3 --option 'options[audio_bitrate]=192'

  # Let the service fetch the input itself
  cloudconvert https://example.com/report.docx --to pdf -o report.pdf

  # Machine-readable summary
  cloudconvert slides.pptx --to pdf --json

ENVIRONMENT VARIABLES:
  CLOUDCONVERT_API_KEY    API key (required)
  CLOUDCONVERT_BASE_URL   Override the process endpoint
  RUST_LOG                Override the log filter
"#;

/// Convert files with the CloudConvert process API.
#[derive(Parser, Debug)]
#[command(
    name = "cloudconvert",
    version,
    about = "Convert files with the CloudConvert process API",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local file path or HTTP/HTTPS URL.
    input: String,

    /// Output format (e.g. png, pdf, mp3).
    #[arg(short, long)]
    to: String,

    /// Input format. Default: the input's file extension.
    #[arg(short, long)]
    from: Option<String>,

    /// Write the result here. Default: input name with the output extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Vendor option as NAME=VALUE; repeatable, later values win.
    #[arg(long = "option", value_name = "NAME=VALUE", value_parser = parse_option)]
    options: Vec<(String, String)>,

    /// API key.
    #[arg(long, env = "CLOUDCONVERT_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Process-creation endpoint.
    #[arg(long, env = "CLOUDCONVERT_BASE_URL")]
    base_url: Option<String>,

    /// Seconds to wait for the conversion.
    #[arg(long, env = "CLOUDCONVERT_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Print a JSON summary instead of a status line.
    #[arg(long)]
    json: bool,

    /// Disable the spinner.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner carries the feedback; keep library logs quiet under it.
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

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ProcessProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;
    let api_key = ApiKey::new(cli.api_key.clone()).context("Invalid API key")?;

    let is_url = cli.input.starts_with("http://") || cli.input.starts_with("https://");
    let source_name = input_file_name(&cli.input, is_url);

    let input_format = match cli.from.clone() {
        Some(f) => f,
        None => format_from_path(&source_name)
            .with_context(|| format!("Cannot infer input format from '{}'; pass --from", cli.input))?,
    };
    let output = cli.output.clone().unwrap_or_else(|| {
        let stem = if is_url { source_name.as_str() } else { cli.input.as_str() };
        Path::new(stem).with_extension(&cli.to)
    });

    let mut conversion = Conversion::new(input_format, cli.to.clone());
    for (name, value) in &cli.options {
        conversion = conversion.option(name, value);
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let summary = if is_url {
        convert_url(&conversion, &cli.input, &source_name, &output, &api_key, &config).await
    } else {
        convert_file(&conversion, &cli.input, &output, &api_key, &config).await
    }
    .context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {} bytes  {}ms  →  {}",
            green("✔"),
            summary.bytes_written,
            summary.duration_ms,
            bold(&summary.output_path.display().to_string()),
        );
        eprintln!("   {}", dim(&summary.process_url));
    }

    Ok(())
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ClientConfig> {
    let mut builder = ClientConfig::builder().wait_timeout(Duration::from_secs(cli.timeout));
    if let Some(ref url) = cli.base_url {
        builder = builder.base_url(url.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder.build().context("Invalid configuration")
}

/// Parse `--option NAME=VALUE`.
fn parse_option(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{s}'")),
    }
}

/// File name of the input: the last URL path segment or the path's file name.
fn input_file_name(input: &str, is_url: bool) -> String {
    if is_url {
        let path = input.split(['?', '#']).next().unwrap_or(input);
        return path
            .rsplit('/')
            .find(|seg| !seg.is_empty() && !seg.contains(':'))
            .unwrap_or("input")
            .to_string();
    }
    Path::new(input)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.to_string())
}
