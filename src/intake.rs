//! File intake: the selection list and the running page estimate.
//!
//! [`IntakeTracker`] owns everything the user has dropped or picked so
//! far. Files are appended in selection order and never de-duplicated
//! (choosing the same file twice means printing it twice). The page
//! estimate is additive only: each file contributes independently, and
//! contributions from concurrently decoding PDFs commute into the same
//! running total whichever finishes first.
//!
//! PDF page counts are produced by tracked background tasks: each decode
//! is admitted through a semaphore, parses on the blocking pool, and is
//! capped by a timeout. [`IntakeTracker::settle`] joins whatever has
//! finished and folds the counts in; a decode that fails or overruns
//! becomes an [`IntakeWarning`] through the sink instead of vanishing.

use crate::error::IntakeWarning;
use crate::pipeline::pages::{self, MediaClass};
use crate::sink::StatusSink;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Where a selected file's bytes come from.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// Read from the filesystem when needed (page counting, encoding).
    Path(PathBuf),
    /// Already in memory (library callers, tests).
    Memory(Arc<Vec<u8>>),
}

/// One file the user has selected, with its declared media type.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    name: String,
    media_type: String,
    source: FileSource,
}

impl SelectedFile {
    /// A file on disk; the display name is the final path component.
    pub fn from_path(path: impl AsRef<Path>, media_type: impl Into<String>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            media_type: media_type.into(),
            source: FileSource::Path(path),
        }
    }

    /// An in-memory file.
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            source: FileSource::Memory(Arc::new(bytes)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn source(&self) -> &FileSource {
        &self.source
    }
}

/// The selection list plus the running page estimate.
///
/// Must live inside a tokio runtime: adding a PDF spawns a decode task.
pub struct IntakeTracker {
    files: Vec<SelectedFile>,
    page_estimate: u32,
    page_override: Option<u32>,
    decodes: JoinSet<Result<(String, usize), IntakeWarning>>,
    decode_permits: Arc<Semaphore>,
    decode_timeout: Duration,
}

impl IntakeTracker {
    /// Create a tracker with the given decode bounds.
    pub fn new(decode_concurrency: usize, decode_timeout: Duration) -> Self {
        Self {
            files: Vec::new(),
            page_estimate: 0,
            page_override: None,
            decodes: JoinSet::new(),
            decode_permits: Arc::new(Semaphore::new(decode_concurrency.max(1))),
            decode_timeout,
        }
    }

    /// Append a file and update the estimate according to its media type.
    ///
    /// PDFs start a background page count (joined later via [`settle`]);
    /// images bump the estimate by one before this returns; anything else
    /// emits a [`IntakeWarning::ManualCountNeeded`] through the sink.
    ///
    /// [`settle`]: IntakeTracker::settle
    pub fn add_file(&mut self, file: SelectedFile, sink: &dyn StatusSink) {
        let name = file.name().to_string();
        let media_type = file.media_type().to_string();
        let source = file.source().clone();

        self.files.push(file);
        sink.on_files_changed(self.files.len(), &self.file_names());
        debug!("selected '{}' ({}), {} total", name, media_type, self.files.len());

        match MediaClass::classify(&media_type) {
            MediaClass::Pdf => {
                sink.on_counting_pages(&name);
                let permits = Arc::clone(&self.decode_permits);
                let decode_timeout = self.decode_timeout;
                self.decodes.spawn(async move {
                    let _permit = permits.acquire_owned().await.map_err(|_| {
                        IntakeWarning::PageCountFailed {
                            name: name.clone(),
                            detail: "decode pool closed".into(),
                        }
                    })?;
                    let counted =
                        tokio::time::timeout(decode_timeout, decode_page_count(&name, source))
                            .await;
                    match counted {
                        Ok(result) => result.map(|count| (name, count)),
                        Err(_) => Err(IntakeWarning::PageCountTimeout {
                            name,
                            secs: decode_timeout.as_secs(),
                        }),
                    }
                });
            }
            MediaClass::Image => {
                self.page_estimate += 1;
            }
            MediaClass::Other => {
                sink.on_warning(&IntakeWarning::ManualCountNeeded { name, media_type });
            }
        }

        // every branch reports the estimate so the host can refresh the
        // page field and the displayed total (PDF counts land via settle)
        sink.on_page_estimate(self.effective_page_estimate());
    }

    /// Append a batch of files; an empty batch is a no-op.
    pub fn add_files(
        &mut self,
        files: impl IntoIterator<Item = SelectedFile>,
        sink: &dyn StatusSink,
    ) {
        for file in files {
            self.add_file(file, sink);
        }
    }

    /// Join every finished page-count decode and fold the counts into the
    /// estimate. Returns the warnings gathered along the way (also
    /// delivered through the sink as they surface).
    ///
    /// Decodes complete in arbitrary order; each successful one adds its
    /// count to the running total.
    pub async fn settle(&mut self, sink: &dyn StatusSink) -> Vec<IntakeWarning> {
        let mut warnings = Vec::new();
        while let Some(joined) = self.decodes.join_next().await {
            match joined {
                Ok(Ok((name, count))) => {
                    self.page_estimate += count as u32;
                    debug!(
                        "'{}' contributed {} pages, estimate now {}",
                        name, count, self.page_estimate
                    );
                    sink.on_page_estimate(self.effective_page_estimate());
                }
                Ok(Err(warning)) => {
                    warn!("page count warning: {warning}");
                    sink.on_warning(&warning);
                    warnings.push(warning);
                }
                Err(join_err) if join_err.is_cancelled() => {}
                Err(join_err) => {
                    let warning = IntakeWarning::PageCountFailed {
                        name: "<decode task>".into(),
                        detail: join_err.to_string(),
                    };
                    warn!("page count task failed to join: {join_err}");
                    sink.on_warning(&warning);
                    warnings.push(warning);
                }
            }
        }
        warnings
    }

    /// Number of selected files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The selection, in the order files were added.
    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    /// Display names of the selection, in order.
    pub fn file_names(&self) -> Vec<String> {
        self.files.iter().map(|f| f.name.clone()).collect()
    }

    /// The automatic running estimate (ignores any override).
    pub fn page_estimate(&self) -> u32 {
        self.page_estimate
    }

    /// Decodes spawned but not yet settled.
    pub fn pending_decodes(&self) -> usize {
        self.decodes.len()
    }

    /// Manually pin the page count; wins over the automatic estimate
    /// until cleared. The pipeline never reconciles the two.
    pub fn override_page_estimate(&mut self, pages: u32, sink: &dyn StatusSink) {
        self.page_override = Some(pages);
        sink.on_page_estimate(pages);
    }

    /// Drop a manual override, falling back to the automatic estimate.
    pub fn clear_override(&mut self, sink: &dyn StatusSink) {
        self.page_override = None;
        sink.on_page_estimate(self.page_estimate);
    }

    /// The estimate the user sees: the override when set, the automatic
    /// count otherwise.
    pub fn effective_page_estimate(&self) -> u32 {
        self.page_override.unwrap_or(self.page_estimate)
    }

    /// Empty the selection and zero the estimate. Pending decodes are
    /// aborted so a stale count never lands in the next order.
    pub fn clear(&mut self, sink: &dyn StatusSink) {
        self.files.clear();
        self.page_estimate = 0;
        self.page_override = None;
        self.decodes.abort_all();
        self.decodes = JoinSet::new();
        sink.on_files_changed(0, &[]);
        sink.on_page_estimate(0);
    }
}

impl Default for IntakeTracker {
    fn default() -> Self {
        Self::new(4, Duration::from_secs(20))
    }
}

/// Load the file bytes and count pages on the blocking pool.
async fn decode_page_count(name: &str, source: FileSource) -> Result<usize, IntakeWarning> {
    let bytes: Arc<Vec<u8>> = match source {
        FileSource::Memory(bytes) => bytes,
        FileSource::Path(path) => {
            let read = tokio::fs::read(&path)
                .await
                .map_err(|e| IntakeWarning::PageCountFailed {
                    name: name.to_string(),
                    detail: e.to_string(),
                })?;
            Arc::new(read)
        }
    };

    let task_name = name.to_string();
    tokio::task::spawn_blocking(move || pages::count_pages(&bytes))
        .await
        .map_err(|e| IntakeWarning::PageCountFailed {
            name: task_name.clone(),
            detail: format!("decode task aborted: {e}"),
        })?
        .map_err(|e| IntakeWarning::PageCountFailed {
            name: task_name,
            detail: e.to_string(),
        })
}
