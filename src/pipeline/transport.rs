//! The outbound request: exactly one JSON POST per submission attempt.
//!
//! The contract with the collection endpoint is deliberately small: the
//! payload goes out as an `application/json` body, a 2xx answer means the
//! order was accepted, anything else is a rejection carried back with its
//! body for diagnosis. There is no retry, no backoff, and no request
//! deduplication here; a failed attempt is resubmitted by the user.

use crate::error::OrderError;
use crate::payload::OrderPayload;
use tracing::debug;

/// Post the order payload and classify the outcome.
///
/// Returns the status code and the captured response body on success
/// (2xx). Network-level failures map to [`OrderError::RequestFailed`] or
/// [`OrderError::RequestTimeout`]; non-2xx answers map to
/// [`OrderError::Rejected`].
pub async fn post_order(
    client: &reqwest::Client,
    endpoint: &str,
    payload: &OrderPayload,
    timeout_secs: u64,
) -> Result<(u16, String), OrderError> {
    debug!(
        "posting order with {} files to {}",
        payload.files.len(),
        endpoint
    );

    let response = client
        .post(endpoint)
        .json(payload)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                OrderError::RequestTimeout {
                    endpoint: endpoint.to_string(),
                    secs: timeout_secs,
                }
            } else {
                OrderError::RequestFailed {
                    endpoint: endpoint.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| OrderError::RequestFailed {
        endpoint: endpoint.to_string(),
        reason: format!("failed to read response body: {e}"),
    })?;

    if !status.is_success() {
        return Err(OrderError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    debug!("order accepted: HTTP {}", status.as_u16());
    Ok((status.as_u16(), body))
}
