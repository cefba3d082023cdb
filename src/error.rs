//! Error types for pdfstruct.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for pdfstruct operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Stage of a conversion at which a failure happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Opening and loading the source document.
    Open,
    /// Extracting or assembling the given page (1-indexed).
    Page(u32),
    /// Writing the JSON output to the given path.
    Write(PathBuf),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Open => write!(f, "open"),
            Stage::Page(n) => write!(f, "parse page {}", n),
            Stage::Write(path) => write!(f, "write {}", path.display()),
        }
    }
}

/// Errors that can occur while converting a PDF.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file does not start with a PDF header.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF header carries a version string we cannot interpret.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The PDF library rejected the document or a page object.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The document is encrypted and cannot be read.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// JSON serialization or deserialization failed.
    #[error("Rendering error: {0}")]
    Render(String),

    /// The conversion was aborted through a [`CancelToken`](crate::CancelToken).
    #[error("Conversion cancelled")]
    Cancelled,

    /// A failure tagged with the stage and source document it happened in.
    #[error("failed to {stage} ({source_pdf}): {source}")]
    Conversion {
        /// Stage that failed.
        stage: Stage,
        /// Base name of the source PDF.
        source_pdf: String,
        /// Underlying error.
        source: Box<Error>,
    },
}

impl Error {
    /// Tag this error with the stage and source document it occurred in.
    ///
    /// Errors that already carry a stage, and cancellations, are returned
    /// unchanged.
    pub fn at(self, stage: Stage, source_pdf: impl Into<String>) -> Self {
        match self {
            Error::Conversion { .. } | Error::Cancelled => self,
            other => Error::Conversion {
                stage,
                source_pdf: source_pdf.into(),
                source: Box::new(other),
            },
        }
    }

    /// Stage at which the conversion failed, if known.
    pub fn stage(&self) -> Option<&Stage> {
        match self {
            Error::Conversion { stage, .. } => Some(stage),
            _ => None,
        }
    }

    /// The innermost error, with any stage tagging peeled off.
    pub fn root(&self) -> &Error {
        match self {
            Error::Conversion { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Render(format!("JSON serialization error: {}", err))
    }
}
