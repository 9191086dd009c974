//! Pipeline stages for order submission.
//!
//! Each submodule implements exactly one step, so every stage is
//! independently testable and a stage can be replaced (say, a different
//! transport) without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! intake ──▶ validate ──▶ encode ──▶ transport
//! (files)   (presence)   (base64)   (one POST)
//! ```
//!
//! 1. [`pages`]     — media-type classification and PDF page counting;
//!    feeds the intake estimate, not the payload
//! 2. [`validate`]  — fail-closed presence checks before any I/O
//! 3. [`encode`]    — concurrent, timed file reads joined all-or-nothing
//! 4. [`transport`] — the single JSON POST and response classification

pub mod encode;
pub mod pages;
pub mod transport;
pub mod validate;
