//! Error types for the cardstmt-core library.

use thiserror::Error;

/// Main error type for the cardstmt library.
///
/// Only document-level failures surface here. Missing fields and broken
/// tables degrade to defaults inside the parser instead.
#[derive(Error, Debug)]
pub enum StatementError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Table detection error.
    #[error("table error: {0}")]
    Table(#[from] TableError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The PDF has pages but no usable text layer.
    #[error("PDF has no extractable text layer")]
    NoTextLayer,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors raised while detecting table regions.
#[derive(Error, Debug)]
pub enum TableError {
    /// The document could not be opened for table detection.
    #[error("failed to load document: {0}")]
    Load(String),

    /// A page content stream could not be read or decoded.
    #[error("failed to read content of page {page}: {reason}")]
    Content { page: u32, reason: String },

    /// Any other detector failure.
    #[error("table detection failed: {0}")]
    Detection(String),
}

/// Result type for the cardstmt library.
pub type Result<T> = std::result::Result<T, StatementError>;
