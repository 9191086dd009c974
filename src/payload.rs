//! Wire types: the order-form snapshot, the JSON payload, and the receipt.
//!
//! The payload shape is the contract with the print desk's collection
//! endpoint. Field names are camelCase on the wire; `data` carries the
//! file bytes as standard base64. A payload is built fresh for every
//! submission attempt and discarded once the request resolves.

use serde::{Deserialize, Serialize};

/// Snapshot of the order form at the moment submit is triggered.
///
/// The pipeline only reads this snapshot; it never reaches back into
/// whatever UI produced it. All values are carried verbatim as strings,
/// including numeric-looking ones (year, copies, total cost), because the
/// endpoint receives them exactly as the form presented them.
///
/// Required for validation: `student_name`, `year`, `branch`,
/// `roll_number`. Everything else may be empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderForm {
    pub student_name: String,
    pub year: String,
    pub branch: String,
    pub section: String,
    pub roll_number: String,
    pub description: String,
    pub total_cost: String,
    pub print_type: String,
    pub binding: String,
    pub copies: String,
    pub payment_method: String,
}

/// One encoded file inside the order payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePayload {
    /// Original file name, as selected.
    pub filename: String,
    /// Declared media type, e.g. `application/pdf`.
    pub mime_type: String,
    /// File content, standard base64.
    pub data: String,
}

impl FilePayload {
    /// Decoded size in bytes (without allocating the decoded buffer).
    pub fn decoded_len(&self) -> usize {
        // 4 base64 chars per 3 bytes, minus padding
        let padding = self.data.bytes().rev().take_while(|&b| b == b'=').count();
        self.data.len() / 4 * 3 - padding
    }
}

/// The complete order as sent to the collection endpoint.
///
/// `files` preserves selection order regardless of the order in which the
/// individual reads completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub files: Vec<FilePayload>,
    pub student_name: String,
    pub year: String,
    pub branch: String,
    pub section: String,
    pub roll_number: String,
    pub description: String,
    pub total_cost: String,
    pub print_type: String,
    pub binding: String,
    pub copies: String,
    pub payment_method: String,
}

impl OrderPayload {
    /// Assemble a payload from encoded files plus the form snapshot.
    pub fn assemble(files: Vec<FilePayload>, form: &OrderForm) -> Self {
        Self {
            files,
            student_name: form.student_name.clone(),
            year: form.year.clone(),
            branch: form.branch.clone(),
            section: form.section.clone(),
            roll_number: form.roll_number.clone(),
            description: form.description.clone(),
            total_cost: form.total_cost.clone(),
            print_type: form.print_type.clone(),
            binding: form.binding.clone(),
            copies: form.copies.clone(),
            payment_method: form.payment_method.clone(),
        }
    }
}

/// Timing and size bookkeeping for one submission attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionStats {
    /// Number of files carried in the payload.
    pub files_submitted: usize,
    /// Total raw bytes read across all files (before base64 expansion).
    pub bytes_read: u64,
    /// Wall-clock time spent reading and encoding files.
    pub read_duration_ms: u64,
    /// Wall-clock time spent on the outbound request.
    pub request_duration_ms: u64,
    /// End-to-end time from trigger to resolution.
    pub total_duration_ms: u64,
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// HTTP status returned by the endpoint (always 2xx on this type).
    pub status: u16,
    /// Response body, captured verbatim.
    pub body: String,
    /// Where the order can be collected.
    pub pickup_location: String,
    pub stats: SubmissionStats,
}
