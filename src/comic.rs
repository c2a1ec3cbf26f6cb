//! Comic archive page counters
//!
//! Counts image entries inside CBZ/CBR containers. CBZ listings come from
//! the zip central directory and are unique; CBR listings come from the
//! `lsar` tool (unar suite), which can repeat names, so the CBR counter
//! dedupes before counting.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Comic archive error types
#[derive(Debug, Error)]
pub enum ComicError {
    #[error("Archive not found: {0}")]
    ArchiveNotFound(PathBuf),

    #[error("Failed to list archive entries: {0}")]
    ListFailed(String),

    #[error("Archive listing tool not available: {0}")]
    ListToolMissing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ComicError>;

/// Entry extensions that count as comic pages.
const COMIC_PAGE_EXTENSIONS: [&str; 4] = ["jpeg", "jpg", "gif", "png"];

/// Resource-fork entries that never count as pages.
const METADATA_DIR_MARKER: &str = "__MACOSX";

fn is_comic_page(name: &str) -> bool {
    if name.contains(METADATA_DIR_MARKER) {
        return false;
    }
    match name.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_lowercase();
            COMIC_PAGE_EXTENSIONS.iter().any(|e| *e == ext)
        }
        None => false,
    }
}

/// Count the comic pages of a CBZ entry listing.
///
/// Zip central-directory listings are already unique, so each qualifying
/// entry counts once.
pub fn cbz_page_count(entries: &[String]) -> u32 {
    entries.iter().filter(|name| is_comic_page(name)).count() as u32
}

/// Count the comic pages of a CBR entry listing.
///
/// The archive-listing tool can repeat names, so distinct names are
/// collected into a set before counting.
pub fn cbr_page_count(entries: &[String]) -> u32 {
    let pages: HashSet<&str> = entries
        .iter()
        .filter(|name| is_comic_page(name))
        .map(String::as_str)
        .collect();
    pages.len() as u32
}

/// List the entry names of a RAR archive via the `lsar` tool.
///
/// `lsar` prints the archive path on its first line followed by one entry
/// name per line.
pub fn list_rar_entries(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(ComicError::ArchiveNotFound(path.to_path_buf()));
    }

    let output = Command::new("lsar").arg(path).output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ComicError::ListToolMissing("lsar (install the unar package)".to_string())
        } else {
            ComicError::Io(e)
        }
    })?;

    if !output.status.success() {
        return Err(ComicError::ListFailed(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
