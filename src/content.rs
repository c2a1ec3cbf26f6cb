//! Book content acquisition
//!
//! The [`ContentProvider`] trait is the seam between the estimation engine
//! and whatever supplies book content: spine markup documents, container
//! metadata, archive entry listings, reflow pagination, and embedded PDF
//! page counts. [`FsContentProvider`] is the filesystem-backed default;
//! a host application can substitute its own implementation.
//!
//! [`BookContent`] memoizes the expensive extraction steps for the duration
//! of one book's processing, so several estimators can share a single pass.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::debug;
use once_cell::unsync::OnceCell;
use thiserror::Error;

use crate::comic::{self, ComicError};
use crate::container::{self, ContainerEntry, ContainerError};
use crate::markup;
use crate::pdf::{self, PdfError};

/// Characters per emulated viewport page for the default reflow pagination.
const REFLOW_CHARS_PER_PAGE: usize = 2400;

/// Content acquisition error types
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("No usable input format: {0}")]
    Unavailable(String),

    #[error("Content is DRM protected")]
    DrmProtected,

    #[error("Operation not supported for this format: {0}")]
    Unsupported(&'static str),

    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    #[error("Comic archive error: {0}")]
    Comic(#[from] ComicError),

    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ContentError>;

/// Book format dispatch.
///
/// Every estimator selects its input by matching on this; adding a format
/// is a compile-time-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookFormat {
    Pdf,
    ComicRar,
    ComicZip,
    Reflowable,
}

impl BookFormat {
    /// Classify by lowercased file extension.
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_lowercase().as_str() {
            "pdf" => BookFormat::Pdf,
            "cbr" => BookFormat::ComicRar,
            "cbz" => BookFormat::ComicZip,
            _ => BookFormat::Reflowable,
        }
    }

    /// Classify a path by its extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => Self::from_extension(ext),
            None => BookFormat::Reflowable,
        }
    }

    /// Comic archives support page counting only.
    pub fn is_comic(self) -> bool {
        matches!(self, BookFormat::ComicRar | BookFormat::ComicZip)
    }
}

/// Supplies book content to the estimation engine.
///
/// Each method corresponds to one acquisition mode; a provider only needs
/// to support the modes that make sense for the book's format and returns
/// [`ContentError::Unsupported`] otherwise.
pub trait ContentProvider {
    /// Raw markup of each spine content document, in reading order.
    fn spine_documents(&self) -> Result<Vec<String>>;

    /// Internal container paths of the spine documents, in reading order.
    fn spine_paths(&self) -> Result<Vec<String>>;

    /// Container entry listing with compressed sizes.
    fn container_entries(&self) -> Result<Vec<ContainerEntry>>;

    /// Per-section page totals from a reflow pagination engine.
    fn reflow_page_counts(&self) -> Result<Vec<u32>>;

    /// Entry names of a comic archive.
    fn archive_entries(&self) -> Result<Vec<String>>;

    /// Embedded page count of a PDF document.
    fn pdf_page_count(&self) -> Result<u32>;
}

/// Filesystem-backed content provider.
///
/// Reflowable zip containers (EPUB) are read through the zip central
/// directory with the content documents in archive order standing in for
/// the spine; standalone markup or text files are a one-document spine.
pub struct FsContentProvider {
    path: PathBuf,
    format: BookFormat,
}

impl FsContentProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = BookFormat::from_path(&path);
        Self { path, format }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> BookFormat {
        self.format
    }

    fn is_zip_container(&self) -> bool {
        matches!(
            self.path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_lowercase)
                .as_deref(),
            Some("epub")
        )
    }

    fn ensure_exists(&self) -> Result<()> {
        if !self.path.exists() {
            return Err(ContentError::Unavailable(format!(
                "book file not found: {}",
                self.path.display()
            )));
        }
        Ok(())
    }

    fn is_content_document(name: &str) -> bool {
        let lower = name.to_lowercase();
        lower.ends_with(".html") || lower.ends_with(".xhtml") || lower.ends_with(".htm")
    }

    fn read_container_documents(&self) -> Result<Vec<String>> {
        let file = fs::File::open(&self.path).map_err(ContainerError::from)?;
        let mut archive = zip::ZipArchive::new(file).map_err(ContainerError::from)?;

        let mut documents = Vec::new();
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(ContainerError::from)?;
            if entry.is_dir() || !Self::is_content_document(entry.name()) {
                continue;
            }
            let mut raw = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut raw)?;
            documents.push(String::from_utf8_lossy(&raw).into_owned());
        }
        Ok(documents)
    }
}

impl ContentProvider for FsContentProvider {
    fn spine_documents(&self) -> Result<Vec<String>> {
        self.ensure_exists()?;
        match self.format {
            BookFormat::Reflowable if self.is_zip_container() => self.read_container_documents(),
            BookFormat::Reflowable => Ok(vec![fs::read_to_string(&self.path)?]),
            _ => Err(ContentError::Unsupported("spine documents")),
        }
    }

    fn spine_paths(&self) -> Result<Vec<String>> {
        self.ensure_exists()?;
        match self.format {
            BookFormat::Reflowable if self.is_zip_container() => {
                let entries = container::read_container_entries(&self.path)?;
                Ok(entries
                    .into_iter()
                    .map(|e| e.path)
                    .filter(|p| Self::is_content_document(p))
                    .collect())
            }
            BookFormat::Reflowable => {
                let name = self
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(vec![name])
            }
            _ => Err(ContentError::Unsupported("spine paths")),
        }
    }

    fn container_entries(&self) -> Result<Vec<ContainerEntry>> {
        self.ensure_exists()?;
        if self.format == BookFormat::Reflowable && self.is_zip_container() {
            Ok(container::read_container_entries(&self.path)?)
        } else {
            Err(ContentError::Unsupported("container metadata"))
        }
    }

    fn reflow_page_counts(&self) -> Result<Vec<u32>> {
        // No host viewer exists here, so each spine section is paginated
        // against a fixed emulated viewport.
        let documents = self.spine_documents()?;
        Ok(documents
            .iter()
            .map(|doc| (doc.chars().count() / REFLOW_CHARS_PER_PAGE) as u32 + 1)
            .collect())
    }

    fn archive_entries(&self) -> Result<Vec<String>> {
        self.ensure_exists()?;
        match self.format {
            BookFormat::ComicZip => {
                let entries = container::read_container_entries(&self.path)?;
                Ok(entries.into_iter().map(|e| e.path).collect())
            }
            BookFormat::ComicRar => Ok(comic::list_rar_entries(&self.path)?),
            _ => Err(ContentError::Unsupported("archive entries")),
        }
    }

    fn pdf_page_count(&self) -> Result<u32> {
        match self.format {
            BookFormat::Pdf => match pdf::read_info(&self.path) {
                Ok(info) => Ok(info.page_count),
                Err(PdfError::Encrypted) => Err(ContentError::DrmProtected),
                Err(e) => Err(e.into()),
            },
            _ => Err(ContentError::Unsupported("embedded page count")),
        }
    }
}

/// Memoized content for one book's processing.
///
/// Opening and parsing the book is the most expensive step, so the raw
/// spine markup and its stripped text are each extracted at most once and
/// shared across whichever estimators need them within a single
/// invocation. The cache is task-local and never shared across books.
pub struct BookContent<'a> {
    provider: &'a dyn ContentProvider,
    documents: OnceCell<Vec<String>>,
    concatenated: OnceCell<String>,
    stripped: OnceCell<String>,
}

impl<'a> BookContent<'a> {
    pub fn new(provider: &'a dyn ContentProvider) -> Self {
        Self {
            provider,
            documents: OnceCell::new(),
            concatenated: OnceCell::new(),
            stripped: OnceCell::new(),
        }
    }

    pub fn provider(&self) -> &'a dyn ContentProvider {
        self.provider
    }

    /// Raw spine documents, extracted once.
    pub fn documents(&self) -> Result<&[String]> {
        if self.documents.get().is_none() {
            debug!("extracting spine documents");
            let documents = self.provider.spine_documents()?;
            let _ = self.documents.set(documents);
        }
        Ok(self.documents.get().map(Vec::as_slice).unwrap_or_default())
    }

    /// All spine markup concatenated in reading order.
    pub fn concatenated_markup(&self) -> Result<&str> {
        if self.concatenated.get().is_none() {
            let joined = self.documents()?.concat();
            let _ = self.concatenated.set(joined);
        }
        Ok(self.concatenated.get().map(String::as_str).unwrap_or_default())
    }

    /// Body text of the whole book with markup stripped, extracted once.
    pub fn stripped_text(&self) -> Result<&str> {
        if self.stripped.get().is_none() {
            let documents = self.documents()?;
            let stripped = markup::strip_spine_documents(documents);
            let _ = self.stripped.set(stripped);
        }
        Ok(self.stripped.get().map(String::as_str).unwrap_or_default())
    }
}
