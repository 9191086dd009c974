//! Presence validation, run before any I/O.
//!
//! Fails closed: an empty selection or a missing required field aborts the
//! submission before a single byte is read or sent. Only presence is
//! checked; nobody here knows what a well-formed roll number looks like,
//! and the endpoint has never documented one.

use crate::error::OrderError;
use crate::payload::OrderForm;

/// Required form fields, in the order they are reported when missing.
const REQUIRED: [(&str, fn(&OrderForm) -> &str); 4] = [
    ("student name", |f| &f.student_name),
    ("year", |f| &f.year),
    ("branch", |f| &f.branch),
    ("roll number", |f| &f.roll_number),
];

/// Check that files are selected and the required fields are filled in.
///
/// Section and description are optional. Values are tested for emptiness
/// exactly as snapshotted; whitespace-only input passes, matching the
/// behaviour of the form this pipeline replaces.
pub fn check(file_count: usize, form: &OrderForm) -> Result<(), OrderError> {
    if file_count == 0 {
        return Err(OrderError::NoFilesSelected);
    }

    for (field, get) in REQUIRED {
        if get(form).is_empty() {
            return Err(OrderError::MissingField { field });
        }
    }

    Ok(())
}
