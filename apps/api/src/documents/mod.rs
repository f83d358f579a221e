// Document collaborators around the placeholder engine:
// upload model, text extraction, value decoding, attachment packaging, HTTP handlers.
// Extraction and packaging are CPU-bound and run inside tokio::task::spawn_blocking.

pub mod extract;
pub mod handlers;
pub mod package;
pub mod values;

use bytes::Bytes;

use crate::errors::AppError;

/// One uploaded file, as received from the multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content: Bytes,
}

/// Document formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Office Open XML word processing document.
    Docx,
    /// `.txt`, and legacy `.doc` which is read as UTF-8 text rather than parsed.
    PlainText,
}

impl DocumentKind {
    /// Detects the kind from the filename suffix, ignoring case.
    pub fn from_filename(filename: &str) -> Result<Self, AppError> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".docx") {
            Ok(DocumentKind::Docx)
        } else if lower.ends_with(".txt") || lower.ends_with(".doc") {
            Ok(DocumentKind::PlainText)
        } else {
            Err(AppError::UnsupportedFileType(filename.to_string()))
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentKind::Docx => "docx",
            DocumentKind::PlainText => "txt",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            DocumentKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DocumentKind::PlainText => "text/plain",
        }
    }
}
