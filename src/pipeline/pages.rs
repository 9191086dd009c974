//! Media-type classification and PDF page counting.
//!
//! The page estimate is a heuristic, not a promise: PDFs get their exact
//! page count from the document structure, images count as one page each,
//! and everything else (word-processor files and the like) is left to the
//! user to enter by hand. Only the PDF branch needs real parsing, and only
//! the page tree is consulted; nothing is rendered.

use lopdf::Document;
use thiserror::Error;
use tracing::debug;

/// The exact media type that triggers automatic page counting.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// How a declared media type participates in the page estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaClass {
    /// Exactly `application/pdf`: decode and count pages.
    Pdf,
    /// Media type contains `image`: one printable page.
    Image,
    /// Anything else: the user corrects the count manually.
    Other,
}

impl MediaClass {
    /// Classify a declared media type string.
    ///
    /// The match is deliberately shallow: an exact match for PDF, a
    /// substring match for images (`image/png`, `image/jpeg`, ...), and a
    /// catch-all for the rest. Declared types are taken at face value;
    /// content sniffing happens only when the PDF branch actually parses.
    pub fn classify(media_type: &str) -> Self {
        if media_type == PDF_MEDIA_TYPE {
            MediaClass::Pdf
        } else if media_type.contains("image") {
            MediaClass::Image
        } else {
            MediaClass::Other
        }
    }
}

/// Failure to extract a page count from bytes declared as PDF.
#[derive(Debug, Clone, Error)]
pub enum PageCountError {
    /// The bytes do not start with the `%PDF` magic.
    #[error("not a PDF (missing %PDF header)")]
    NotAPdf,
    /// The header was present but the document structure did not parse.
    #[error("PDF structure could not be parsed: {0}")]
    Parse(String),
}

/// Count the pages of a PDF given its raw bytes.
///
/// Validates the magic bytes first so obviously mislabelled files get a
/// meaningful error instead of a parser backtrace, then loads the document
/// structure and walks the page tree. Parsing is CPU-bound; callers that
/// hold a runtime should wrap this in `spawn_blocking`.
pub fn count_pages(bytes: &[u8]) -> Result<usize, PageCountError> {
    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        return Err(PageCountError::NotAPdf);
    }

    let doc = Document::load_mem(bytes).map_err(|e| PageCountError::Parse(e.to_string()))?;
    let count = doc.get_pages().len();
    debug!("counted {} pages in {} bytes of PDF", count, bytes.len());
    Ok(count)
}
