//! CLI binary for orderdesk.
//!
//! A thin shim over the library crate: maps flags to `SubmitConfig` and
//! an `OrderForm`, plays the role of the drop zone (files come from
//! arguments), and renders pipeline events on the terminal.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use orderdesk::{
    IntakeWarning, OrderError, OrderForm, OrderSession, SelectedFile, StatusSink, SubmitConfig,
    SubmissionPhase,
};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── Terminal status sink ─────────────────────────────────────────────────────

/// Renders pipeline events: status lines for intake, a progress bar while
/// files are read, coloured outcome lines at the end. Encode events can
/// arrive from concurrent reads, hence the mutexed bar.
struct CliSink {
    /// Bar shown during the ReadingFiles phase; None outside it.
    bar: Mutex<Option<ProgressBar>>,
    /// Total files, fixed when the CLI collected its arguments.
    total_files: usize,
    quiet: bool,
}

impl CliSink {
    fn new(total_files: usize, quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            total_files,
            quiet,
        }
    }

    fn println(&self, line: String) {
        if self.quiet {
            return;
        }
        // route through the bar while it exists so lines don't tear it
        let guard = self.bar.lock().unwrap();
        match guard.as_ref() {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }
}

impl StatusSink for CliSink {
    fn on_files_changed(&self, count: usize, _names: &[String]) {
        if count > 0 {
            self.println(format!("{} {count} file(s) selected", dim("·")));
        }
    }

    fn on_counting_pages(&self, name: &str) {
        self.println(format!("{} counting pages in {}", dim("·"), bold(name)));
    }

    fn on_page_estimate(&self, pages: u32) {
        self.println(format!("{} estimated pages: {}", dim("·"), bold(&pages.to_string())));
    }

    fn on_warning(&self, warning: &IntakeWarning) {
        self.println(format!("{} {warning}", yellow("⚠")));
    }

    fn on_phase(&self, phase: SubmissionPhase) {
        match phase {
            SubmissionPhase::ReadingFiles => {
                if self.quiet {
                    return;
                }
                let bar = ProgressBar::new(self.total_files as u64);
                bar.set_style(
                    ProgressStyle::with_template(
                        "{spinner:.cyan} {prefix:.bold}  [{bar:36.green/238}] {pos}/{len} files",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("█▉▊▋▌▍▎▏  "),
                );
                bar.set_prefix("Encoding");
                bar.enable_steady_tick(Duration::from_millis(80));
                *self.bar.lock().unwrap() = Some(bar);
            }
            SubmissionPhase::Submitting => {
                if let Some(bar) = self.bar.lock().unwrap().take() {
                    bar.finish_and_clear();
                }
                self.println(format!("{} uploading order…", dim("·")));
            }
            _ => {}
        }
    }

    fn on_file_encoded(&self, name: &str, bytes: usize) {
        let guard = self.bar.lock().unwrap();
        if let Some(bar) = guard.as_ref() {
            bar.println(format!(
                "  {} {}  {}",
                green("✓"),
                name,
                dim(&format!("{bytes} bytes"))
            ));
            bar.inc(1);
        }
    }

    fn on_order_placed(&self, pickup_location: &str) {
        if !self.quiet {
            eprintln!(
                "{} {}",
                green("✔"),
                bold(&format!("Order placed! Collect from {pickup_location}."))
            );
        }
    }

    fn on_submission_failed(&self, error: &OrderError) {
        if let Some(bar) = self.bar.lock().unwrap().take() {
            bar.finish_and_clear();
        }
        if !self.quiet {
            eprintln!("{} {}", red("✗"), red(&format!("Upload failed: {error}")));
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Two files, minimal order details
  orderdesk thesis.pdf photo.png --name "A. Student" --year 2 --branch CS --roll 101

  # Colour, spiral binding, three copies, UPI payment
  orderdesk notes.pdf --name "A. Student" --year 3 --branch ECE --roll 42 \
      --print-type Colour --binding Spiral --copies 3 --payment UPI

  # Word documents can't be counted automatically; pin the page count
  orderdesk report.docx --pages 12 --name "A. Student" --year 1 --branch ME --roll 7

  # Show the payload that would be sent, without sending it
  orderdesk thesis.pdf --name X --year 1 --branch CS --roll 9 --dry-run

ENVIRONMENT VARIABLES:
  ORDERDESK_ENDPOINT   Collection endpoint receiving the order payload
  RUST_LOG             Tracing filter (e.g. debug, orderdesk=debug)
"#;

/// Submit a print order: files plus order details, one POST.
#[derive(Parser, Debug)]
#[command(
    name = "orderdesk",
    version,
    about = "Collect files, estimate pages, and submit a print order",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Files to print, in order.
    files: Vec<PathBuf>,

    /// Collection endpoint receiving the order payload.
    #[arg(long, env = "ORDERDESK_ENDPOINT")]
    endpoint: String,

    /// Student name (required by the print desk).
    #[arg(long, default_value = "")]
    name: String,

    /// Year of study (required by the print desk).
    #[arg(long, default_value = "")]
    year: String,

    /// Branch / department (required by the print desk).
    #[arg(long, default_value = "")]
    branch: String,

    /// Section (optional).
    #[arg(long, default_value = "")]
    section: String,

    /// Roll number (required by the print desk).
    #[arg(long, default_value = "")]
    roll: String,

    /// Free-form order description (optional).
    #[arg(long, default_value = "")]
    description: String,

    /// Total cost as shown to the user; forwarded verbatim.
    #[arg(long, default_value = "")]
    total_cost: String,

    /// Print type label, e.g. "Black & White" or "Colour".
    #[arg(long, default_value = "Black & White")]
    print_type: String,

    /// Binding label, e.g. "None", "Spiral", "Hardcover".
    #[arg(long, default_value = "None")]
    binding: String,

    /// Number of copies; forwarded verbatim.
    #[arg(long, default_value = "1")]
    copies: String,

    /// Payment method, e.g. "Cash" or "UPI".
    #[arg(long, default_value = "Cash")]
    payment: String,

    /// Pin the page count manually (wins over the automatic estimate).
    #[arg(long)]
    pages: Option<u32>,

    /// Files read and encoded concurrently during submission.
    #[arg(long, default_value_t = 8)]
    concurrency: usize,

    /// Per-file read timeout in seconds.
    #[arg(long, default_value_t = 30)]
    read_timeout: u64,

    /// Overall request timeout in seconds.
    #[arg(long, default_value_t = 120)]
    request_timeout: u64,

    /// Timeout in seconds for counting pages in one PDF.
    #[arg(long, default_value_t = 20)]
    decode_timeout: u64,

    /// Print the payload that would be sent (file data elided) and exit.
    #[arg(long)]
    dry_run: bool,

    /// Print the submission receipt as JSON.
    #[arg(long)]
    json: bool,

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
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    // ── Build config & session ───────────────────────────────────────────
    let config = SubmitConfig::builder(&cli.endpoint)
        .concurrency(cli.concurrency)
        .read_timeout_secs(cli.read_timeout)
        .request_timeout_secs(cli.request_timeout)
        .decode_timeout_secs(cli.decode_timeout)
        .build()
        .context("Invalid configuration")?;
    let mut session = OrderSession::new(config).context("Failed to create session")?;

    let sink = CliSink::new(cli.files.len(), cli.quiet);

    // ── Intake: the argument list plays the drop zone ────────────────────
    for path in &cli.files {
        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        session
            .intake_mut()
            .add_file(SelectedFile::from_path(path, media_type), &sink);
    }
    session.intake_mut().settle(&sink).await;

    if let Some(pages) = cli.pages {
        session.intake_mut().override_page_estimate(pages, &sink);
    }

    let form = OrderForm {
        student_name: cli.name.clone(),
        year: cli.year.clone(),
        branch: cli.branch.clone(),
        section: cli.section.clone(),
        roll_number: cli.roll.clone(),
        description: cli.description.clone(),
        total_cost: cli.total_cost.clone(),
        print_type: cli.print_type.clone(),
        binding: cli.binding.clone(),
        copies: cli.copies.clone(),
        payment_method: cli.payment.clone(),
    };

    // ── Dry run: show the payload, elide the data ────────────────────────
    if cli.dry_run {
        let mut payload = session
            .preview(&form, &sink)
            .await
            .context("Payload preview failed")?;
        for file in &mut payload.files {
            file.data = format!("<{} bytes, elided>", file.decoded_len());
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("Failed to serialise payload")?
        );
        return Ok(());
    }

    // ── Submit ───────────────────────────────────────────────────────────
    let receipt = session
        .submit(&form, &sink)
        .await
        .context("Order submission failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&receipt).context("Failed to serialise receipt")?
        );
    } else if !cli.quiet {
        eprintln!(
            "   {}  {} files, {} bytes, {}ms total",
            dim(&format!("HTTP {}", receipt.status)),
            receipt.stats.files_submitted,
            receipt.stats.bytes_read,
            receipt.stats.total_duration_ms,
        );
    }

    Ok(())
}
