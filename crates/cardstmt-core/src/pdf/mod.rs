//! PDF text-layer extraction.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::PdfError;
use tracing::debug;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for document text providers.
///
/// A processor is a document handle: `load` acquires it, `close` releases
/// it. Implementations must tolerate `close` being called after a failed
/// `load`.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String>;

    /// Extract text from the entire PDF, pages concatenated in order.
    fn extract_text(&self) -> Result<String> {
        let mut text = String::new();
        for page in 1..=self.page_count() {
            append_page(&mut text, &self.extract_page_text(page)?);
        }
        Ok(text)
    }

    /// Release the loaded document.
    fn close(&mut self);
}

/// Text layer of a document together with its page count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentText {
    pub text: String,
    pub page_count: u32,
}

/// Read the full text layer of a document and release the handle.
///
/// The handle is closed whether loading or extraction succeeds or not.
/// Text shorter than `min_text_length` (after trimming) is reported as
/// [`PdfError::NoTextLayer`].
pub fn read_text<P>(processor: &mut P, data: &[u8], min_text_length: usize) -> Result<DocumentText>
where
    P: PdfProcessor + ?Sized,
{
    let text = processor.load(data).and_then(|()| {
        let text = processor.extract_text()?;
        Ok(DocumentText {
            text,
            page_count: processor.page_count(),
        })
    });
    processor.close();

    let document = text?;
    let usable = document.text.trim().chars().count();
    if usable < min_text_length.max(1) {
        debug!("Text layer too short: {} chars (minimum {})", usable, min_text_length);
        return Err(PdfError::NoTextLayer);
    }

    Ok(document)
}

/// Append one page's text, keeping page boundaries on separate lines.
pub(crate) fn append_page(text: &mut String, page_text: &str) {
    if !text.is_empty() && !text.ends_with(char::is_whitespace) && !page_text.is_empty() {
        text.push('\n');
    }
    text.push_str(page_text);
}
