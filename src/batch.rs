//! Batch processing
//!
//! Fans per-book statistic computation across a bounded worker pool. Books
//! are independent: each task owns its content extraction and result map,
//! results are keyed by book id so completion order is irrelevant, and a
//! progress callback fires after each completed book.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;
use thiserror::Error;

use crate::analyzer::UnicodeSegmenter;
use crate::content::{BookFormat, FsContentProvider};
use crate::remote::{RemoteError, RemoteLookupClient, RemoteLookupOptions};
use crate::stats::{
    compute_statistics, PageAlgorithm, StatisticKind, StatisticRequest, StatisticResult,
};

/// Batch error types. Per-book failures are never batch errors; only pool
/// construction and result-store IO can fail here.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("Remote lookup unavailable: {0}")]
    Remote(#[from] RemoteError),

    #[error("Result store error: {0}")]
    Store(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BatchError>;

/// Identifier for one book within a batch.
pub type BookId = u64;

/// One book to process.
#[derive(Debug, Clone)]
pub struct BookSpec {
    pub id: BookId,
    pub title: String,
    pub path: PathBuf,
    /// Identifier on the remote metadata site, when known.
    pub remote_id: Option<String>,
}

/// Batch-wide options, passed explicitly rather than read from ambient
/// state.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub statistics: Vec<StatisticKind>,
    pub page_algorithm: PageAlgorithm,
    pub use_remote: bool,
    pub remote: RemoteLookupOptions,
    /// Worker pool size; `None` uses the host CPU count.
    pub threads: Option<usize>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            statistics: StatisticKind::ALL.to_vec(),
            page_algorithm: PageAlgorithm::default(),
            use_remote: false,
            remote: RemoteLookupOptions::default(),
            threads: None,
        }
    }
}

impl BatchOptions {
    /// Effective worker pool size.
    pub fn thread_count(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get)
    }
}

/// Progress notification, invoked after each completed book.
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, fraction: f64, label: &str);
}

/// No-op progress callback (silent mode).
pub struct SilentProgress;

impl ProgressCallback for SilentProgress {
    fn on_progress(&self, _fraction: f64, _label: &str) {}
}

/// Cooperative cancellation: books not yet started are skipped, in-flight
/// books run to completion.
#[derive(Debug, Default)]
pub struct CancelFlag(AtomicBool);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A failed book with its recorded reason.
#[derive(Debug, Clone)]
pub struct BookFailure {
    pub id: BookId,
    pub title: String,
    pub reason: String,
}

/// Outcome of a whole batch: successful per-book results, failure
/// summaries, and how many books were skipped by cancellation.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: BTreeMap<BookId, StatisticResult>,
    pub failures: Vec<BookFailure>,
    pub skipped: usize,
    pub elapsed_seconds: f64,
}

impl BatchReport {
    /// Books that produced at least one statistic.
    pub fn counted(&self) -> usize {
        self.results.values().filter(|r| !r.is_empty()).count()
    }
}

/// Run a batch of books across the worker pool.
///
/// Each book is one task; a failed book contributes whatever statistics it
/// computed before failing and a summary entry, and never aborts the batch.
pub fn run_batch(
    books: &[BookSpec],
    options: &BatchOptions,
    progress: &dyn ProgressCallback,
    cancel: &CancelFlag,
) -> Result<BatchReport> {
    let started = Instant::now();
    let total = books.len();
    let mut report = BatchReport::default();
    if total == 0 {
        return Ok(report);
    }

    let remote = if options.use_remote {
        Some(RemoteLookupClient::new(options.remote.clone())?)
    } else {
        None
    };
    let segmenter = UnicodeSegmenter;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.thread_count())
        .build()?;
    info!("counting statistics for {total} books on {} workers", options.thread_count());
    progress.on_progress(0.01, "Counting statistics");

    let completed = AtomicUsize::new(0);
    let outcomes: Vec<_> = pool.install(|| {
        books
            .par_iter()
            .map(|book| {
                if cancel.is_cancelled() {
                    return (book, None);
                }

                let provider = FsContentProvider::new(&book.path);
                let format = BookFormat::from_path(&book.path);
                let request = StatisticRequest {
                    statistics: options.statistics.iter().copied().collect(),
                    page_algorithm: options.page_algorithm,
                    use_remote: options.use_remote,
                    remote_id: book.remote_id.clone(),
                };

                let outcome =
                    compute_statistics(&provider, format, &request, remote.as_ref(), &segmenter);
                log_book_outcome(book, &request, &outcome);

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                progress.on_progress(done as f64 / total as f64, "Counting statistics");
                (book, Some(outcome))
            })
            .collect()
    });

    for (book, outcome) in outcomes {
        match outcome {
            Some(outcome) => {
                if let Some(reason) = outcome.failure {
                    report.failures.push(BookFailure {
                        id: book.id,
                        title: book.title.clone(),
                        reason,
                    });
                }
                if !outcome.result.is_empty() {
                    report.results.insert(book.id, outcome.result);
                }
            }
            None => report.skipped += 1,
        }
    }

    report.elapsed_seconds = started.elapsed().as_secs_f64();
    Ok(report)
}

/// Per-book log section, written after the book completes.
fn log_book_outcome(
    book: &BookSpec,
    request: &StatisticRequest,
    outcome: &crate::stats::BookOutcome,
) {
    debug!("--- book {} ({}) ---", book.id, book.title);
    for kind in &request.statistics {
        match outcome.result.get(kind) {
            Some(value) => debug!("\tfound {}: {}", kind.label(), value),
            None => debug!("\tno {} computed", kind.label()),
        }
    }
    if let Some(reason) = &outcome.failure {
        debug!("\tfailed: {reason}");
    }
}

/// Merge a batch's results into a JSON store file.
///
/// With `overwrite_existing`, freshly computed statistics replace stored
/// ones; otherwise only missing statistics are filled in. The store maps
/// book id to its statistic mapping.
pub fn write_results_store(
    path: &Path,
    report: &BatchReport,
    overwrite_existing: bool,
) -> Result<()> {
    type Store = BTreeMap<String, BTreeMap<String, serde_json::Value>>;

    let mut store: Store = if path.exists() {
        serde_json::from_str(&fs::read_to_string(path)?)?
    } else {
        Store::new()
    };

    for (book_id, result) in &report.results {
        let entry = store.entry(book_id.to_string()).or_default();
        for (kind, value) in result {
            let key = serde_json::to_value(kind)?
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| kind.label().to_string());
            if overwrite_existing || !entry.contains_key(&key) {
                entry.insert(key, serde_json::to_value(value)?);
            }
        }
    }

    fs::write(path, serde_json::to_string_pretty(&store)?)?;
    Ok(())
}
