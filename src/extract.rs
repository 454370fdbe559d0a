//! File validation and per-format text extraction.

use std::path::Path;

use tracing::debug;

use crate::error::{RagError, Result};

/// File extensions accepted for ingestion.
const ALLOWED_EXTENSIONS: [&str; 2] = ["pdf", "txt"];

/// Content types accepted for ingestion.
const ALLOWED_CONTENT_TYPES: [&str; 3] = ["application/pdf", "text/plain", "text/txt"];

/// The supported source file formats.
///
/// Selected once per ingest by extension lookup; each variant knows how to
/// turn raw bytes into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// A PDF document.
    Pdf,
    /// A plain-text (UTF-8) file.
    PlainText,
}

impl FileKind {
    /// Look up the file kind from a filename's extension.
    ///
    /// Matching is case-insensitive. Returns `None` for unsupported or
    /// missing extensions.
    pub fn from_extension(filename: &str) -> Option<Self> {
        let ext = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::PlainText),
            _ => None,
        }
    }

    /// Extract the text content from the raw file bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Validation`] if the bytes cannot be decoded as
    /// this format.
    pub fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        match self {
            Self::Pdf => {
                let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
                    RagError::Validation(format!("could not extract text from PDF: {e}"))
                })?;
                debug!(kind = "pdf", bytes = bytes.len(), chars = text.len(), "extracted text");
                Ok(text.trim().to_string())
            }
            Self::PlainText => {
                let text = String::from_utf8(bytes.to_vec()).map_err(|_| {
                    RagError::Validation("file is not valid UTF-8 text".to_string())
                })?;
                debug!(kind = "txt", bytes = bytes.len(), chars = text.len(), "extracted text");
                Ok(text.trim().to_string())
            }
        }
    }
}

/// Validates incoming files before any extraction or embedding work.
///
/// Checks run in a fixed order: size, then extension, then content type.
/// The first failing check determines the reported error.
#[derive(Debug, Clone)]
pub struct FileValidator {
    max_file_size: usize,
}

impl FileValidator {
    /// Create a validator with the given maximum file size in bytes.
    pub fn new(max_file_size: usize) -> Self {
        Self { max_file_size }
    }

    /// Validate a file and resolve its [`FileKind`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Validation`] describing the first failed check.
    pub fn validate(&self, filename: &str, content_type: &str, file_size: usize) -> Result<FileKind> {
        if file_size > self.max_file_size {
            return Err(RagError::Validation(format!(
                "file size {file_size} exceeds maximum of {} bytes",
                self.max_file_size
            )));
        }

        let kind = FileKind::from_extension(filename).ok_or_else(|| {
            RagError::Validation(format!(
                "file type not supported; allowed extensions: {}",
                ALLOWED_EXTENSIONS.join(", ")
            ))
        })?;

        if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
            return Err(RagError::Validation(format!(
                "content type '{content_type}' not supported; allowed types: {}",
                ALLOWED_CONTENT_TYPES.join(", ")
            )));
        }

        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_lookup_is_case_insensitive() {
        assert_eq!(FileKind::from_extension("Report.PDF"), Some(FileKind::Pdf));
        assert_eq!(FileKind::from_extension("notes.txt"), Some(FileKind::PlainText));
        assert_eq!(FileKind::from_extension("archive.zip"), None);
        assert_eq!(FileKind::from_extension("no_extension"), None);
    }

    #[test]
    fn plain_text_extraction_trims_and_decodes() {
        let text = FileKind::PlainText.extract_text(b"  hello world \n").unwrap();
        assert_eq!(text, "hello world");
    }

    #[test]
    fn invalid_utf8_is_a_validation_error() {
        let err = FileKind::PlainText.extract_text(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, RagError::Validation(_)));
    }

    #[test]
    fn size_check_runs_before_extension_check() {
        let validator = FileValidator::new(10);
        // Both the size and the extension are invalid; the size error wins.
        let err = validator.validate("malware.exe", "application/octet-stream", 100).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("exceeds maximum"), "unexpected error: {message}");
    }

    #[test]
    fn extension_check_runs_before_content_type_check() {
        let validator = FileValidator::new(1024);
        let err = validator.validate("data.csv", "application/zip", 100).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("file type not supported"), "unexpected error: {message}");
    }

    #[test]
    fn mismatched_content_type_is_rejected() {
        let validator = FileValidator::new(1024);
        let err = validator.validate("notes.txt", "application/zip", 100).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("content type"), "unexpected error: {message}");
    }

    #[test]
    fn valid_file_resolves_its_kind() {
        let validator = FileValidator::new(1024);
        let kind = validator.validate("notes.txt", "text/plain", 100).unwrap();
        assert_eq!(kind, FileKind::PlainText);
        let kind = validator.validate("paper.pdf", "application/pdf", 100).unwrap();
        assert_eq!(kind, FileKind::Pdf);
    }
}
