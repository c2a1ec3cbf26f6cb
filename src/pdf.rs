//! PDF page count module
//!
//! Reads the embedded page count directly from PDF document structure
//! instead of estimating, which is both faster and exact for fixed-layout
//! documents.

use lopdf::Document;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// PDF reading error types
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid PDF format: {0}")]
    InvalidFormat(String),

    #[error("Encrypted PDF not supported")]
    Encrypted,

    #[error("PDF parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PdfError>;

/// Page count and protection state of a PDF document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfInfo {
    pub page_count: u32,
    pub is_encrypted: bool,
}

/// Read the embedded page count attribute of a PDF.
///
/// Encrypted documents fail with [`PdfError::Encrypted`]; a document whose
/// page tree cannot be read fails with an extraction error.
pub fn read_info(path: impl AsRef<Path>) -> Result<PdfInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PdfError::FileNotFound(path.to_path_buf()));
    }

    let document = Document::load(path).map_err(|e| {
        let err_str = e.to_string();
        if err_str.contains("header") || err_str.contains("PDF") {
            PdfError::InvalidFormat(err_str)
        } else {
            PdfError::ParseError(err_str)
        }
    })?;

    if document.is_encrypted() {
        return Err(PdfError::Encrypted);
    }

    let page_count = document.get_pages().len() as u32;
    if page_count == 0 {
        return Err(PdfError::ParseError("empty page tree".to_string()));
    }

    Ok(PdfInfo {
        page_count,
        is_encrypted: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_info_nonexistent_file() {
        let result = read_info("/nonexistent/file.pdf");
        assert!(matches!(result, Err(PdfError::FileNotFound(_))));
    }

    #[test]
    fn test_read_info_invalid_pdf() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "This is not a PDF").unwrap();

        let result = read_info(temp.path());
        assert!(matches!(
            result,
            Err(PdfError::InvalidFormat(_) | PdfError::ParseError(_))
        ));
    }

    fn write_pdf(page_count: usize) -> NamedTempFile {
        use lopdf::{dictionary, Object};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let kids: Vec<Object> = (0..page_count)
            .map(|_| {
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "MediaBox" => vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(595),
                        Object::Integer(842),
                    ],
                })
                .into()
            })
            .collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let temp = NamedTempFile::new().unwrap();
        doc.save(temp.path()).unwrap();
        temp
    }

    #[test]
    fn test_read_info_page_count() {
        let temp = write_pdf(3);
        let info = read_info(temp.path()).unwrap();
        assert_eq!(info.page_count, 3);
        assert!(!info.is_encrypted);
    }

    #[test]
    fn test_read_info_single_page() {
        let temp = write_pdf(1);
        assert_eq!(read_info(temp.path()).unwrap().page_count, 1);
    }

    #[test]
    fn test_error_display() {
        let err = PdfError::Encrypted;
        assert!(err.to_string().contains("Encrypted"));
    }
}
