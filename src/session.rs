//! The submission state machine and its orchestration.
//!
//! An [`OrderSession`] couples the intake tracker with a configured HTTP
//! client and walks one submission at a time through
//! `Idle → Validating → ReadingFiles → Submitting → Succeeded | Failed`,
//! announcing each transition through the injected sink. Success clears
//! the intake; any failure leaves it exactly as it was, so the user can
//! trigger submit again without re-selecting files.
//!
//! Exclusive access (`&mut self`) makes overlapping submissions
//! unrepresentable from a single handle, and the phase check on entry
//! rejects a trigger racing a previous attempt whose future was dropped
//! mid-flight ([`OrderSession::reset`] recovers from that).

use crate::config::SubmitConfig;
use crate::error::OrderError;
use crate::intake::IntakeTracker;
use crate::payload::{OrderForm, OrderPayload, SubmissionReceipt, SubmissionStats};
use crate::pipeline::{encode, transport, validate};
use crate::sink::StatusSink;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Where a submission currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubmissionPhase {
    /// Nothing running; submit may be triggered.
    #[default]
    Idle,
    /// Checking files and required form fields. No I/O yet.
    Validating,
    /// Reading and encoding every selected file.
    ReadingFiles,
    /// The single outbound request is in flight.
    Submitting,
    /// The endpoint accepted the order; intake has been cleared.
    Succeeded,
    /// The attempt failed; intake is untouched and submit can run again.
    Failed,
}

impl fmt::Display for SubmissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmissionPhase::Idle => "idle",
            SubmissionPhase::Validating => "validating",
            SubmissionPhase::ReadingFiles => "reading files",
            SubmissionPhase::Submitting => "submitting",
            SubmissionPhase::Succeeded => "succeeded",
            SubmissionPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One user's order in progress: selected files plus the submission
/// pipeline that ships them.
pub struct OrderSession {
    config: SubmitConfig,
    client: reqwest::Client,
    intake: IntakeTracker,
    phase: SubmissionPhase,
}

impl OrderSession {
    /// Create a session; builds the HTTP client with the configured
    /// request timeout.
    pub fn new(config: SubmitConfig) -> Result<Self, OrderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| OrderError::Internal(format!("failed to build HTTP client: {e}")))?;
        let intake = IntakeTracker::new(
            config.decode_concurrency,
            Duration::from_secs(config.decode_timeout_secs),
        );
        Ok(Self {
            config,
            client,
            intake,
            phase: SubmissionPhase::Idle,
        })
    }

    pub fn config(&self) -> &SubmitConfig {
        &self.config
    }

    pub fn intake(&self) -> &IntakeTracker {
        &self.intake
    }

    pub fn intake_mut(&mut self) -> &mut IntakeTracker {
        &mut self.intake
    }

    /// The phase the last (or current) submission reached.
    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// Return the session to `Idle` after a submit future was dropped
    /// mid-flight. Never needed when submit futures run to completion.
    pub fn reset(&mut self) {
        self.phase = SubmissionPhase::Idle;
    }

    /// Validate and encode without sending: the payload that *would* go
    /// out, for inspection or a dry run. Session state is untouched.
    pub async fn preview(
        &self,
        form: &OrderForm,
        sink: &dyn StatusSink,
    ) -> Result<OrderPayload, OrderError> {
        validate::check(self.intake.len(), form)?;
        let files = encode::encode_all(
            self.intake.files(),
            self.config.concurrency,
            Duration::from_secs(self.config.read_timeout_secs),
            sink,
        )
        .await?;
        Ok(OrderPayload::assemble(files, form))
    }

    /// Run one complete submission attempt.
    ///
    /// Validates, reads and encodes every file (all-or-nothing), sends
    /// exactly one request, and resolves:
    ///
    /// * `Ok(receipt)` — the endpoint answered 2xx; intake was cleared and
    ///   the sink received the order-placed event.
    /// * `Err(..)` — validation, read, or transport failure; intake is
    ///   unchanged so the user can retry. Validation errors abort before
    ///   any I/O and report nothing through the failure events (the caller
    ///   alerts); later failures are announced via
    ///   [`StatusSink::on_submission_failed`].
    pub async fn submit(
        &mut self,
        form: &OrderForm,
        sink: &dyn StatusSink,
    ) -> Result<SubmissionReceipt, OrderError> {
        if self.phase != SubmissionPhase::Idle {
            return Err(OrderError::SubmissionInFlight);
        }
        let total_start = Instant::now();
        info!(
            "starting order submission: {} files to {}",
            self.intake.len(),
            self.config.endpoint
        );

        // ── Validate ─────────────────────────────────────────────────────
        self.set_phase(SubmissionPhase::Validating, sink);
        if let Err(e) = validate::check(self.intake.len(), form) {
            self.phase = SubmissionPhase::Idle;
            return Err(e);
        }

        // ── Read & encode ────────────────────────────────────────────────
        self.set_phase(SubmissionPhase::ReadingFiles, sink);
        let read_start = Instant::now();
        let encoded = encode::encode_all(
            self.intake.files(),
            self.config.concurrency,
            Duration::from_secs(self.config.read_timeout_secs),
            sink,
        )
        .await;
        let files = match encoded {
            Ok(files) => files,
            Err(e) => return Err(self.fail(e, sink)),
        };
        let read_duration_ms = read_start.elapsed().as_millis() as u64;
        let bytes_read: u64 = files.iter().map(|f| f.decoded_len() as u64).sum();

        // ── Submit ───────────────────────────────────────────────────────
        self.set_phase(SubmissionPhase::Submitting, sink);
        let payload = OrderPayload::assemble(files, form);
        let request_start = Instant::now();
        let sent = transport::post_order(
            &self.client,
            &self.config.endpoint,
            &payload,
            self.config.request_timeout_secs,
        )
        .await;
        let (status, body) = match sent {
            Ok(ok) => ok,
            Err(e) => return Err(self.fail(e, sink)),
        };
        let request_duration_ms = request_start.elapsed().as_millis() as u64;

        // ── Success: clear intake, announce pickup ───────────────────────
        self.set_phase(SubmissionPhase::Succeeded, sink);
        self.intake.clear(sink);
        sink.on_order_placed(&self.config.pickup_location);

        let stats = SubmissionStats {
            files_submitted: payload.files.len(),
            bytes_read,
            read_duration_ms,
            request_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };
        info!(
            "order placed: {} files, {} bytes, {}ms total",
            stats.files_submitted, stats.bytes_read, stats.total_duration_ms
        );
        self.phase = SubmissionPhase::Idle;

        Ok(SubmissionReceipt {
            status,
            body,
            pickup_location: self.config.pickup_location.clone(),
            stats,
        })
    }

    fn set_phase(&mut self, phase: SubmissionPhase, sink: &dyn StatusSink) {
        self.phase = phase;
        sink.on_phase(phase);
    }

    /// Record a post-validation failure: announce it, keep the intake.
    fn fail(&mut self, error: OrderError, sink: &dyn StatusSink) -> OrderError {
        warn!("order submission failed: {error}");
        self.set_phase(SubmissionPhase::Failed, sink);
        sink.on_submission_failed(&error);
        self.phase = SubmissionPhase::Idle;
        error
    }
}
