//! Status-sink trait: how the pipeline talks back to whatever UI hosts it.
//!
//! The intake tracker and the submission pipeline never touch ambient
//! state. Every user-visible side effect (status text, the file list
//! display, the page-count field, the confirmation message) goes through
//! an injected [`StatusSink`]. Callers forward events to a terminal, a
//! channel, a widget, or nowhere at all, without the library knowing how
//! the host application communicates.
//!
//! All methods have default no-op bodies so implementations only override
//! what they care about. The trait is `Send + Sync`: encode events can
//! arrive from concurrently running reads.
//!
//! # Example
//!
//! ```rust
//! use orderdesk::StatusSink;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! #[derive(Default)]
//! struct Counting {
//!     encoded: AtomicUsize,
//! }
//!
//! impl StatusSink for Counting {
//!     fn on_file_encoded(&self, name: &str, bytes: usize) {
//!         self.encoded.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{name}: {bytes} bytes ready");
//!     }
//! }
//! ```

use crate::error::{IntakeWarning, OrderError};
use crate::session::SubmissionPhase;

/// Receives pipeline events. Implementations must be `Send + Sync`.
///
/// When several files are encoded concurrently, [`on_file_encoded`] may be
/// called from different tasks at once; protect shared mutable state with
/// the usual primitives (`Mutex`, atomics).
///
/// [`on_file_encoded`]: StatusSink::on_file_encoded
pub trait StatusSink: Send + Sync {
    /// The selection changed: a file was added or the list was cleared.
    fn on_files_changed(&self, count: usize, names: &[String]) {
        let _ = (count, names);
    }

    /// A PDF's page count is being determined in the background.
    fn on_counting_pages(&self, name: &str) {
        let _ = name;
    }

    /// The effective page estimate changed (automatic increment, settled
    /// decode, or manual override).
    fn on_page_estimate(&self, pages: u32) {
        let _ = pages;
    }

    /// A per-file intake problem that does not block submission.
    fn on_warning(&self, warning: &IntakeWarning) {
        let _ = warning;
    }

    /// The submission state machine moved to a new phase.
    fn on_phase(&self, phase: SubmissionPhase) {
        let _ = phase;
    }

    /// One file finished reading and encoding during submission.
    fn on_file_encoded(&self, name: &str, bytes: usize) {
        let _ = (name, bytes);
    }

    /// The order was accepted; tell the user where to collect it.
    fn on_order_placed(&self, pickup_location: &str) {
        let _ = pickup_location;
    }

    /// The submission failed; the selection is untouched and submit can be
    /// triggered again.
    fn on_submission_failed(&self, error: &OrderError) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need status events.
pub struct NoopStatusSink;

impl StatusSink for NoopStatusSink {}
