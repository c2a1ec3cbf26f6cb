//! Statistics orchestrator
//!
//! Per-book sequencing: decides which estimators to run for a requested
//! statistic set, shares one content extraction across them, short-circuits
//! on extraction failures, and catches every failure at the book boundary
//! so that one bad book never aborts a batch.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analyzer::{SentenceSegmenter, TextAnalyzer};
use crate::comic;
use crate::container;
use crate::content::{BookContent, BookFormat, ContentError, ContentProvider};
use crate::markup;
use crate::readability;
use crate::remote::RemoteLookupClient;

/// Statistics error types
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("No words found in this book (conversion error?)")]
    ExtractionFailure,

    #[error(transparent)]
    Content(#[from] ContentError),
}

pub type Result<T> = std::result::Result<T, StatsError>;

/// The statistic kinds a caller can request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum StatisticKind {
    PageCount,
    WordCount,
    FleschReadingEase,
    FleschKincaidGrade,
    GunningFogIndex,
}

impl StatisticKind {
    pub const ALL: [StatisticKind; 5] = [
        StatisticKind::PageCount,
        StatisticKind::WordCount,
        StatisticKind::FleschReadingEase,
        StatisticKind::FleschKincaidGrade,
        StatisticKind::GunningFogIndex,
    ];

    /// Human-readable label for logs and summaries.
    pub fn label(self) -> &'static str {
        match self {
            StatisticKind::PageCount => "Pages",
            StatisticKind::WordCount => "Words",
            StatisticKind::FleschReadingEase => "Flesch Reading Ease",
            StatisticKind::FleschKincaidGrade => "Flesch-Kincaid Grade",
            StatisticKind::GunningFogIndex => "Gunning Fog Index",
        }
    }

    pub fn is_readability(self) -> bool {
        matches!(
            self,
            StatisticKind::FleschReadingEase
                | StatisticKind::FleschKincaidGrade
                | StatisticKind::GunningFogIndex
        )
    }
}

impl fmt::Display for StatisticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A computed statistic value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatisticValue {
    Count(u64),
    Score(f64),
}

impl fmt::Display for StatisticValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatisticValue::Count(n) => write!(f, "{n}"),
            StatisticValue::Score(s) => write!(f, "{s:.1}"),
        }
    }
}

/// Mapping from statistic kind to value; an omitted key means the statistic
/// could not be computed, never zero.
pub type StatisticResult = BTreeMap<StatisticKind, StatisticValue>;

/// Page-counting algorithm for reflowable content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageAlgorithm {
    /// Paragraph-density scan of the markup stream.
    #[default]
    ParagraphDensity,
    /// Sum of per-section totals from a reflow pagination engine.
    ReaderPagination,
    /// Compressed container bytes, 1024 per page.
    FixedSize,
}

/// What to compute for one book. Constructed once per book and immutable
/// while the book is processed.
#[derive(Debug, Clone)]
pub struct StatisticRequest {
    pub statistics: BTreeSet<StatisticKind>,
    pub page_algorithm: PageAlgorithm,
    pub use_remote: bool,
    pub remote_id: Option<String>,
}

impl StatisticRequest {
    pub fn new(statistics: impl IntoIterator<Item = StatisticKind>) -> Self {
        Self {
            statistics: statistics.into_iter().collect(),
            page_algorithm: PageAlgorithm::default(),
            use_remote: false,
            remote_id: None,
        }
    }
}

/// Processing state of one book, recorded on its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookState {
    #[default]
    NotStarted,
    ExtractingContent,
    Analyzing,
    Done,
    Failed,
}

/// Result of one book's processing: whatever statistics were computed
/// before any failure, plus the failure reason if there was one.
#[derive(Debug, Default)]
pub struct BookOutcome {
    pub result: StatisticResult,
    pub state: BookState,
    pub failure: Option<String>,
}

impl BookOutcome {
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// Compute the requested statistics for a single book.
///
/// Every failure is caught here, at the book boundary: the outcome carries
/// whatever statistics were computed before the failure and a recorded
/// reason, so the caller's batch always continues.
pub fn compute_statistics(
    provider: &dyn ContentProvider,
    format: BookFormat,
    request: &StatisticRequest,
    remote: Option<&RemoteLookupClient>,
    segmenter: &dyn SentenceSegmenter,
) -> BookOutcome {
    let mut outcome = BookOutcome::default();
    match run_book(provider, format, request, remote, segmenter, &mut outcome) {
        Ok(()) => {
            outcome.state = BookState::Done;
        }
        Err(e) => {
            warn!("book processing stopped: {e}");
            outcome.state = BookState::Failed;
            outcome.failure = Some(e.to_string());
        }
    }
    outcome
}

fn run_book(
    provider: &dyn ContentProvider,
    format: BookFormat,
    request: &StatisticRequest,
    remote: Option<&RemoteLookupClient>,
    segmenter: &dyn SentenceSegmenter,
    outcome: &mut BookOutcome,
) -> Result<()> {
    let content = BookContent::new(provider);
    let mut remaining: BTreeSet<StatisticKind> = request.statistics.clone();

    // Page count first: it has the cheapest short-circuit opportunities
    // and is the only statistic a comic archive supports.
    if remaining.remove(&StatisticKind::PageCount) {
        outcome.state = BookState::ExtractingContent;
        let pages = if request.use_remote {
            remote_page_count(request, remote)
        } else {
            Some(local_page_count(&content, format, request.page_algorithm)?)
        };
        match pages {
            Some(pages) => {
                debug!("page count: {pages}");
                outcome
                    .result
                    .insert(StatisticKind::PageCount, StatisticValue::Count(pages));
            }
            None => debug!("no page count available"),
        }
    }

    if format.is_comic() {
        if !remaining.is_empty() {
            debug!("skipping non page count statistics for comic archive");
        }
        return Ok(());
    }

    if remaining.remove(&StatisticKind::WordCount) {
        outcome.state = BookState::ExtractingContent;
        let words = markup::word_count(content.stripped_text()?);
        if words == 0 {
            return Err(StatsError::ExtractionFailure);
        }
        debug!("word count: {words}");
        outcome
            .result
            .insert(StatisticKind::WordCount, StatisticValue::Count(words));
    }

    if remaining.iter().any(|s| s.is_readability()) {
        // One shared analysis pass feeds all three formulas.
        outcome.state = BookState::Analyzing;
        let analysis = TextAnalyzer::new(segmenter).analyze(content.stripped_text()?);
        if !analysis.has_words() {
            return Err(StatsError::ExtractionFailure);
        }
        if remaining.contains(&StatisticKind::FleschReadingEase) {
            let score = readability::flesch_reading_ease(&analysis);
            debug!("flesch reading ease: {score:.1}");
            outcome
                .result
                .insert(StatisticKind::FleschReadingEase, StatisticValue::Score(score));
        }
        if remaining.contains(&StatisticKind::FleschKincaidGrade) {
            let score = readability::flesch_kincaid_grade(&analysis);
            debug!("flesch-kincaid grade: {score:.1}");
            outcome.result.insert(
                StatisticKind::FleschKincaidGrade,
                StatisticValue::Score(score),
            );
        }
        if remaining.contains(&StatisticKind::GunningFogIndex) {
            let score = readability::gunning_fog_index(&analysis);
            debug!("gunning fog index: {score:.1}");
            outcome
                .result
                .insert(StatisticKind::GunningFogIndex, StatisticValue::Score(score));
        }
    }

    Ok(())
}

fn remote_page_count(
    request: &StatisticRequest,
    remote: Option<&RemoteLookupClient>,
) -> Option<u64> {
    let client = remote?;
    match request.remote_id.as_deref() {
        Some(id) => client.fetch_page_count(id).map(u64::from),
        None => {
            debug!("no remote identifier for this book");
            None
        }
    }
}

fn local_page_count(
    content: &BookContent<'_>,
    format: BookFormat,
    algorithm: PageAlgorithm,
) -> Result<u64> {
    let provider = content.provider();
    let pages = match format {
        BookFormat::Pdf => u64::from(provider.pdf_page_count()?),
        BookFormat::ComicRar => u64::from(comic::cbr_page_count(&provider.archive_entries()?)),
        BookFormat::ComicZip => u64::from(comic::cbz_page_count(&provider.archive_entries()?)),
        BookFormat::Reflowable => reflowable_page_count(content, algorithm)?,
    };
    Ok(pages)
}

fn reflowable_page_count(content: &BookContent<'_>, algorithm: PageAlgorithm) -> Result<u64> {
    let provider = content.provider();
    match algorithm {
        PageAlgorithm::ParagraphDensity => Ok(u64::from(
            markup::paragraph_density_page_count(content.concatenated_markup()?),
        )),
        PageAlgorithm::ReaderPagination => {
            let sections = provider.reflow_page_counts()?;
            Ok(sections.iter().copied().map(u64::from).sum())
        }
        PageAlgorithm::FixedSize => match provider.container_entries() {
            Ok(entries) => {
                let spine = provider.spine_paths()?;
                Ok(u64::from(container::fixed_size_page_count(&spine, &entries)))
            }
            // Container metadata needs a zip-based book; anything else
            // falls back to the reflow-path estimate.
            Err(ContentError::Unsupported(_)) => {
                debug!("no container metadata, falling back to paragraph density");
                reflowable_page_count(content, PageAlgorithm::ParagraphDensity)
            }
            Err(e) => Err(e.into()),
        },
    }
}
