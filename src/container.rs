//! Container metadata pagination
//!
//! The fixed-size page-count algorithm works from the zip central directory
//! alone: every spine entry contributes `ceil(compressed_size / 1024)`
//! pages, matching the fixed-layout pagination of desktop reader software.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

use log::debug;

/// Bytes per page for fixed-size pagination.
const BYTES_PER_PAGE: u64 = 1024;

/// Container error types
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Container not found: {0}")]
    ContainerNotFound(PathBuf),

    #[error("Invalid container: {0}")]
    InvalidContainer(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ContainerError>;

/// One entry of a zip-based container, in central-directory order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerEntry {
    /// Internal path, forward slashes.
    pub path: String,
    /// Compressed size in the container.
    pub compressed_size: u64,
}

/// Read the entry listing of a zip container without decompressing anything.
pub fn read_container_entries(path: &Path) -> Result<Vec<ContainerEntry>> {
    if !path.exists() {
        return Err(ContainerError::ContainerNotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index)?;
        if entry.is_dir() {
            continue;
        }
        entries.push(ContainerEntry {
            path: entry.name().replace('\\', "/"),
            compressed_size: entry.compressed_size(),
        });
    }
    Ok(entries)
}

/// Fixed-size page count across the spine of a container.
///
/// Each spine path is matched against the container listing after stripping
/// any `#fragment` suffix; unmatched paths are skipped.
pub fn fixed_size_page_count(spine: &[String], entries: &[ContainerEntry]) -> u32 {
    let size_map: HashMap<&str, u64> = entries
        .iter()
        .map(|e| (e.path.as_str(), e.compressed_size))
        .collect();

    let mut pages: u64 = 0;
    for path in spine {
        let internal = path.split('#').next().unwrap_or(path);
        match size_map.get(internal) {
            Some(size) => pages += size.div_ceil(BYTES_PER_PAGE),
            None => debug!("spine entry not in container listing, skipped: {internal}"),
        }
    }
    pages as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use zip::write::SimpleFileOptions;

    fn entry(path: &str, compressed_size: u64) -> ContainerEntry {
        ContainerEntry {
            path: path.to_string(),
            compressed_size,
        }
    }

    fn spine(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fixed_size_rounds_each_entry_up() {
        let entries = vec![
            entry("ch1.html", 1024),
            entry("ch2.html", 1536),
            entry("ch3.html", 100),
        ];
        let spine = spine(&["ch1.html", "ch2.html", "ch3.html"]);
        assert_eq!(fixed_size_page_count(&spine, &entries), 4);
    }

    #[test]
    fn test_fixed_size_exact_multiples() {
        // Sizes all multiples of 1024 sum to exactly S / 1024 pages.
        let entries = vec![
            entry("a.html", 2048),
            entry("b.html", 4096),
            entry("c.html", 1024),
        ];
        let spine = spine(&["a.html", "b.html", "c.html"]);
        assert_eq!(fixed_size_page_count(&spine, &entries), 7);
    }

    #[test]
    fn test_fixed_size_strips_fragments() {
        let entries = vec![entry("text/ch1.html", 3000)];
        let spine = spine(&["text/ch1.html#section2"]);
        assert_eq!(fixed_size_page_count(&spine, &entries), 3);
    }

    #[test]
    fn test_fixed_size_skips_unmatched_paths() {
        let entries = vec![entry("ch1.html", 1024)];
        let spine = spine(&["ch1.html", "missing.html"]);
        assert_eq!(fixed_size_page_count(&spine, &entries), 1);
    }

    #[test]
    fn test_fixed_size_empty_spine() {
        let entries = vec![entry("ch1.html", 1024)];
        assert_eq!(fixed_size_page_count(&[], &entries), 0);
    }

    #[test]
    fn test_read_container_entries() {
        let temp = NamedTempFile::new().unwrap();
        {
            let mut writer = zip::ZipWriter::new(temp.as_file());
            let options = SimpleFileOptions::default();
            writer.start_file("mimetype", options).unwrap();
            writer.write_all(b"application/epub+zip").unwrap();
            writer.start_file("text/ch1.html", options).unwrap();
            writer.write_all(b"<body><p>Hello.</p></body>").unwrap();
            writer.add_directory("text/empty", options).unwrap();
            writer.finish().unwrap();
        }

        let entries = read_container_entries(temp.path()).unwrap();
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["mimetype", "text/ch1.html"]);
        assert!(entries.iter().all(|e| e.compressed_size > 0));
    }

    #[test]
    fn test_read_container_entries_missing_file() {
        let result = read_container_entries(Path::new("/nonexistent/book.epub"));
        assert!(matches!(result, Err(ContainerError::ContainerNotFound(_))));
    }

    #[test]
    fn test_read_container_entries_not_a_zip() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"this is not a zip archive").unwrap();
        let result = read_container_entries(temp.path());
        assert!(matches!(result, Err(ContainerError::InvalidContainer(_))));
    }
}
