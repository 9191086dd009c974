//! File reading and base64 encoding for the order payload.
//!
//! Every selected file is read in full and wrapped as a base64 string,
//! because the collection endpoint accepts exactly one JSON document with
//! the file bytes inline. Reads run concurrently under a configurable
//! bound and each carries its own timeout, so one stuck read fails the
//! submission with a named file instead of stalling it forever. The join
//! is all-or-nothing: a payload is never assembled from a partial set.

use crate::error::OrderError;
use crate::intake::{FileSource, SelectedFile};
use crate::payload::FilePayload;
use crate::sink::StatusSink;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Read one file and encode it for the payload.
pub async fn read_and_encode(
    file: &SelectedFile,
    read_timeout: Duration,
) -> Result<FilePayload, OrderError> {
    let bytes = match file.source() {
        FileSource::Memory(bytes) => bytes.to_vec(),
        FileSource::Path(path) => {
            if !path.exists() {
                return Err(OrderError::FileNotFound { path: path.clone() });
            }
            match timeout(read_timeout, tokio::fs::read(path)).await {
                Ok(Ok(bytes)) => bytes,
                Ok(Err(e)) => {
                    return Err(OrderError::FileReadFailed {
                        name: file.name().to_string(),
                        source: e,
                    })
                }
                Err(_) => {
                    return Err(OrderError::ReadTimeout {
                        name: file.name().to_string(),
                        secs: read_timeout.as_secs(),
                    })
                }
            }
        }
    };

    let data = STANDARD.encode(&bytes);
    debug!("encoded '{}': {} bytes raw", file.name(), bytes.len());

    Ok(FilePayload {
        filename: file.name().to_string(),
        mime_type: file.media_type().to_string(),
        data,
    })
}

/// Read and encode every file, preserving selection order in the result.
///
/// Reads run with up to `concurrency` in flight; completion order is
/// irrelevant because results are re-sorted by selection index before
/// returning. The first failure aborts the join and drops the remaining
/// in-flight reads.
pub async fn encode_all(
    files: &[SelectedFile],
    concurrency: usize,
    read_timeout: Duration,
    sink: &dyn StatusSink,
) -> Result<Vec<FilePayload>, OrderError> {
    let mut in_flight = stream::iter(files.iter().enumerate().map(|(idx, file)| async move {
        (idx, read_and_encode(file, read_timeout).await)
    }))
    .buffer_unordered(concurrency.max(1));

    let mut indexed: Vec<(usize, FilePayload)> = Vec::with_capacity(files.len());
    while let Some((idx, result)) = in_flight.next().await {
        let payload = result?;
        sink.on_file_encoded(&payload.filename, payload.decoded_len());
        indexed.push((idx, payload));
    }

    indexed.sort_by_key(|(idx, _)| *idx);
    Ok(indexed.into_iter().map(|(_, payload)| payload).collect())
}
