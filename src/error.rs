//! Error types for the orderdesk library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`OrderError`] — **Fatal** for the current operation: the submission
//!   cannot proceed (nothing selected, required field missing, a file could
//!   not be read, the request failed). Returned as `Err(OrderError)` from
//!   [`crate::session::OrderSession::submit`].
//!
//! * [`IntakeWarning`] — **Non-fatal**: a single file during intake could
//!   not contribute to the page estimate (unreadable PDF, decode timeout,
//!   or a format whose page count must be entered by hand). Delivered
//!   through [`crate::sink::StatusSink::on_warning`] so the order can still
//!   be placed; only the estimate is affected.
//!
//! A submission failure never clears the selected files, so the caller can
//! re-invoke submit without re-selecting anything.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the orderdesk library.
///
/// Intake-level per-file problems use [`IntakeWarning`] and go through the
/// status sink rather than being propagated here.
#[derive(Debug, Error)]
pub enum OrderError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// Submit was triggered with an empty file list.
    #[error("No files selected. Add at least one file before submitting.")]
    NoFilesSelected,

    /// A required order-form field is empty.
    #[error("Required field '{field}' is empty. Fill in name, year, branch, and roll number.")]
    MissingField { field: &'static str },

    // ── File read errors ──────────────────────────────────────────────────
    /// A selected file could not be read from disk.
    #[error("Failed to read '{name}': {source}")]
    FileReadFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// A selected file's path no longer exists at submission time.
    #[error("File not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Reading a single file exceeded the configured per-file timeout.
    #[error("Reading '{name}' timed out after {secs}s")]
    ReadTimeout { name: String, secs: u64 },

    // ── Transport errors ──────────────────────────────────────────────────
    /// The order request could not be completed at the network level.
    #[error("Order submission to '{endpoint}' failed: {reason}")]
    RequestFailed { endpoint: String, reason: String },

    /// The order request exceeded the configured request timeout.
    #[error("Order submission timed out after {secs}s for '{endpoint}'")]
    RequestTimeout { endpoint: String, secs: u64 },

    /// The endpoint answered with a non-success status.
    #[error("Order rejected by the print desk: HTTP {status}")]
    Rejected { status: u16, body: String },

    // ── Session errors ────────────────────────────────────────────────────
    /// A submission is already running on this session.
    #[error("A submission is already in flight; wait for it to finish or call reset()")]
    SubmissionInFlight,

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal warning for a single file during intake.
///
/// Emitted through [`crate::sink::StatusSink::on_warning`]. The file stays
/// in the selection; only the automatic page estimate is affected, and the
/// user can correct it through the editable page-count override.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum IntakeWarning {
    /// A file declared as PDF could not be parsed for a page count.
    #[error("Could not count pages in '{name}': {detail}. Adjust the page count manually.")]
    PageCountFailed { name: String, detail: String },

    /// Counting pages took longer than the configured decode timeout.
    #[error("Counting pages in '{name}' timed out after {secs}s. Adjust the page count manually.")]
    PageCountTimeout { name: String, secs: u64 },

    /// Neither a PDF nor an image; the page count must be entered by hand.
    #[error("'{name}' ({media_type}) cannot be counted automatically. Adjust the page count manually.")]
    ManualCountNeeded { name: String, media_type: String },
}

impl IntakeWarning {
    /// Name of the file the warning refers to.
    pub fn file_name(&self) -> &str {
        match self {
            IntakeWarning::PageCountFailed { name, .. } => name,
            IntakeWarning::PageCountTimeout { name, .. } => name,
            IntakeWarning::ManualCountNeeded { name, .. } => name,
        }
    }
}
