//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, warn};

use super::{PdfProcessor, Result, append_page};
use crate::error::PdfError;

/// PDF text extractor backed by lopdf (loading, decryption) and
/// pdf-extract (text layer).
pub struct PdfExtractor {
    document: Option<Document>,
    pages: Vec<String>,
    max_pages: usize,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            pages: Vec::new(),
            max_pages: 0,
        }
    }

    /// Limit text extraction to the first `max_pages` pages (0 = unlimited).
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Whether a document is currently loaded.
    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        self.close();

        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        let raw_data = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        // pdf_extract can panic on malformed content (e.g. undefined fonts)
        let extracted = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&raw_data)
        }));
        let mut pages = match extracted {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => return Err(PdfError::TextExtraction(e.to_string())),
            Err(_) => {
                warn!("pdf_extract panicked while reading the text layer");
                return Err(PdfError::TextExtraction("text layer could not be decoded".to_string()));
            }
        };

        if pages.len() != page_count {
            warn!(
                "Text layer reported {} pages, document has {}",
                pages.len(),
                page_count
            );
        }
        if self.max_pages > 0 && pages.len() > self.max_pages {
            debug!("Truncating text extraction to {} of {} pages", self.max_pages, pages.len());
            pages.truncate(self.max_pages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.pages = pages;
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        if self.document.is_none() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }
        if page == 0 || page > self.page_count() {
            return Err(PdfError::InvalidPage(page));
        }

        // Pages past the max_pages cut-off read as empty.
        Ok(self.pages.get(page as usize - 1).cloned().unwrap_or_default())
    }

    fn extract_text(&self) -> Result<String> {
        if self.document.is_none() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }

        let mut text = String::new();
        for page_text in &self.pages {
            append_page(&mut text, page_text);
        }
        Ok(text)
    }

    fn close(&mut self) {
        if self.document.take().is_some() {
            debug!("Closed PDF document");
        }
        self.pages.clear();
    }
}
