//! Configuration for order submission.
//!
//! Everything the pipeline needs to know ahead of time lives in
//! [`SubmitConfig`], built via its [`SubmitConfigBuilder`]. Keeping every
//! knob in one struct makes it trivial to share across tasks, serialise
//! for logging, and diff two runs when their outcomes differ.

use crate::error::OrderError;
use serde::{Deserialize, Serialize};

/// Where a freshly placed order can be collected, shown in the
/// confirmation message.
pub const DEFAULT_PICKUP_LOCATION: &str = "Room 213";

/// Configuration for an [`crate::session::OrderSession`].
///
/// Built via [`SubmitConfig::builder`].
///
/// # Example
/// ```rust
/// use orderdesk::SubmitConfig;
///
/// let config = SubmitConfig::builder("https://print.example.edu/orders")
///     .concurrency(4)
///     .read_timeout_secs(20)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitConfig {
    /// Collection endpoint receiving the order payload. Must be an
    /// http:// or https:// URL.
    pub endpoint: String,

    /// Number of files read and encoded concurrently during submission.
    /// Default: 8.
    ///
    /// File reads are I/O-bound; a small bound keeps memory predictable
    /// when someone drops a folder of scans without serialising the reads.
    pub concurrency: usize,

    /// Per-file read timeout in seconds during submission. Default: 30.
    ///
    /// One stuck read (network mount, dying disk) must not stall the whole
    /// order forever. A timed-out read fails the submission with the file
    /// named in the error.
    pub read_timeout_secs: u64,

    /// Overall timeout in seconds for the outbound request. Default: 120.
    pub request_timeout_secs: u64,

    /// Number of PDF page-count decodes running concurrently during
    /// intake. Default: 4.
    pub decode_concurrency: usize,

    /// Timeout in seconds for a single page-count decode. Default: 20.
    ///
    /// A decode that overruns is reported as a warning; the file stays
    /// selected and the user corrects the count by hand.
    pub decode_timeout_secs: u64,

    /// Pickup location announced on a successful submission.
    /// Default: [`DEFAULT_PICKUP_LOCATION`].
    pub pickup_location: String,
}

impl SubmitConfig {
    /// Create a builder targeting the given endpoint.
    pub fn builder(endpoint: impl Into<String>) -> SubmitConfigBuilder {
        SubmitConfigBuilder {
            config: SubmitConfig {
                endpoint: endpoint.into(),
                concurrency: 8,
                read_timeout_secs: 30,
                request_timeout_secs: 120,
                decode_concurrency: 4,
                decode_timeout_secs: 20,
                pickup_location: DEFAULT_PICKUP_LOCATION.to_string(),
            },
        }
    }
}

/// Builder for [`SubmitConfig`].
#[derive(Debug)]
pub struct SubmitConfigBuilder {
    config: SubmitConfig,
}

impl SubmitConfigBuilder {
    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn read_timeout_secs(mut self, secs: u64) -> Self {
        self.config.read_timeout_secs = secs.max(1);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs.max(1);
        self
    }

    pub fn decode_concurrency(mut self, n: usize) -> Self {
        self.config.decode_concurrency = n.max(1);
        self
    }

    pub fn decode_timeout_secs(mut self, secs: u64) -> Self {
        self.config.decode_timeout_secs = secs.max(1);
        self
    }

    pub fn pickup_location(mut self, loc: impl Into<String>) -> Self {
        self.config.pickup_location = loc.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SubmitConfig, OrderError> {
        let c = &self.config;
        if c.endpoint.trim().is_empty() {
            return Err(OrderError::InvalidConfig("endpoint must not be empty".into()));
        }
        if !is_http_url(&c.endpoint) {
            return Err(OrderError::InvalidConfig(format!(
                "endpoint must be an http:// or https:// URL, got '{}'",
                c.endpoint
            )));
        }
        if c.concurrency == 0 {
            return Err(OrderError::InvalidConfig("concurrency must be >= 1".into()));
        }
        Ok(self.config)
    }
}

/// Check that the endpoint string looks like an HTTP(S) URL.
pub(crate) fn is_http_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}
