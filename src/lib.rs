//! # orderdesk
//!
//! File intake and order submission for a print desk: collect the files a
//! user selects, keep a running estimate of printable pages, and ship the
//! whole order as one JSON request when the user says go.
//!
//! ## Pipeline Overview
//!
//! ```text
//! files (drop / picker / CLI args)
//!  │
//!  ├─ 1. Intake    append to the selection, classify by media type
//!  │               PDF → counted in the background (lopdf, bounded, timed)
//!  │               image → one page, immediately
//!  │               other → user corrects the count by hand
//!  ├─ 2. Validate  files present + name/year/branch/roll filled in
//!  ├─ 3. Encode    read every file, base64, all-or-nothing join
//!  ├─ 4. Submit    exactly one POST of the order payload
//!  └─ 5. Outcome   2xx → intake cleared, pickup announced
//!                  anything else → intake untouched, retry by hand
//! ```
//!
//! All user-visible side effects flow through an injected [`StatusSink`];
//! the library never touches ambient state, which is what makes the
//! pipeline testable and host-agnostic.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use orderdesk::{
//!     NoopStatusSink, OrderForm, OrderSession, SelectedFile, SubmitConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SubmitConfig::builder("https://print.example.edu/orders").build()?;
//!     let mut session = OrderSession::new(config)?;
//!
//!     let sink = NoopStatusSink;
//!     session.intake_mut().add_file(
//!         SelectedFile::from_path("thesis.pdf", "application/pdf"),
//!         &sink,
//!     );
//!     session.intake_mut().settle(&sink).await;
//!     println!("about {} pages", session.intake().effective_page_estimate());
//!
//!     let form = OrderForm {
//!         student_name: "A. Student".into(),
//!         year: "2".into(),
//!         branch: "CS".into(),
//!         roll_number: "101".into(),
//!         copies: "1".into(),
//!         ..OrderForm::default()
//!     };
//!     let receipt = session.submit(&form, &sink).await?;
//!     println!("collect from {}", receipt.pickup_location);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `orderdesk` binary (clap + anyhow + tracing-subscriber + indicatif + mime_guess) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! orderdesk = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod intake;
pub mod payload;
pub mod pipeline;
pub mod session;
pub mod sink;

#[cfg(test)]
pub(crate) mod test_util;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{SubmitConfig, SubmitConfigBuilder, DEFAULT_PICKUP_LOCATION};
pub use error::{IntakeWarning, OrderError};
pub use intake::{FileSource, IntakeTracker, SelectedFile};
pub use payload::{FilePayload, OrderForm, OrderPayload, SubmissionReceipt, SubmissionStats};
pub use pipeline::pages::{count_pages, MediaClass, PageCountError, PDF_MEDIA_TYPE};
pub use session::{OrderSession, SubmissionPhase};
pub use sink::{NoopStatusSink, StatusSink};
