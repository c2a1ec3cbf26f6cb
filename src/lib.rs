//! bookstat - Book statistics estimation engine
//!
//! Estimates or retrieves page counts, word counts and readability scores
//! for e-book files and merges the results into a per-book store.
//!
//! # Features
//!
//! - **Text Analysis** ([`analyzer`]) - Sentence, word and syllable counts
//! - **Readability** ([`readability`]) - Flesch Reading Ease, Flesch-Kincaid
//!   Grade and Gunning Fog Index
//! - **Markup Estimators** ([`markup`]) - Paragraph-density and fast page
//!   counts, word counting over stripped spine markup
//! - **Container Pagination** ([`container`]) - Compressed-size page counts
//!   from the zip central directory
//! - **Comic Counters** ([`comic`]) - CBZ/CBR image-entry page counts
//! - **PDF Page Count** ([`pdf`]) - Embedded page count via `lopdf`
//! - **Remote Lookup** ([`remote`]) - Best-effort page counts from a
//!   metadata site
//! - **Orchestration** ([`stats`], [`batch`]) - Per-book sequencing and
//!   worker-pool fan-out
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bookstat::{compute_statistics, BookFormat, FsContentProvider,
//!                StatisticKind, StatisticRequest, UnicodeSegmenter};
//!
//! let provider = FsContentProvider::new("book.epub");
//! let request = StatisticRequest::new(StatisticKind::ALL);
//! let outcome = compute_statistics(
//!     &provider,
//!     BookFormat::Reflowable,
//!     &request,
//!     None,
//!     &UnicodeSegmenter,
//! );
//! for (kind, value) in &outcome.result {
//!     println!("{kind}: {value}");
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Batch driver -> worker pool -> per-book orchestrator
//!                                   |- page estimators (markup / container
//!                                   |  / pdf / comic / remote)
//!                                   |- word count
//!                                   `- text analysis -> readability trio
//! ```

pub mod analyzer;
pub mod batch;
pub mod cli;
pub mod comic;
pub mod config;
pub mod container;
pub mod content;
pub mod markup;
pub mod pdf;
pub mod readability;
pub mod remote;
pub mod stats;
pub mod util;

// Re-exports for convenience
pub use analyzer::{SentenceSegmenter, TextAnalysis, TextAnalyzer, UnicodeSegmenter};
pub use batch::{
    run_batch, write_results_store, BatchError, BatchOptions, BatchReport, BookFailure, BookId,
    BookSpec, CancelFlag, ProgressCallback, SilentProgress,
};
pub use cli::{create_progress_bar, create_spinner, BarProgress, Cli, Commands, CountArgs, ExitCode};
pub use comic::{cbr_page_count, cbz_page_count, ComicError};
pub use config::{ConfigError, FileConfig};
pub use container::{fixed_size_page_count, read_container_entries, ContainerEntry, ContainerError};
pub use content::{BookContent, BookFormat, ContentError, ContentProvider, FsContentProvider};
pub use markup::{extract_body_text, fast_page_count, paragraph_density_page_count, word_count};
pub use pdf::{read_info as read_pdf_info, PdfError, PdfInfo};
pub use readability::{flesch_kincaid_grade, flesch_reading_ease, gunning_fog_index};
pub use remote::{RemoteError, RemoteLookupClient, RemoteLookupOptions};
pub use stats::{
    compute_statistics, BookOutcome, BookState, PageAlgorithm, StatisticKind, StatisticRequest,
    StatisticResult, StatisticValue, StatsError,
};
