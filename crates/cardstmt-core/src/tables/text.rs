//! Table detection over the plain text layer.
//!
//! Lines are split into cells on runs of two or more spaces, tabs or pipes.
//! Consecutive multi-cell lines form a region. Useful when content streams
//! use font encodings the layout detector cannot decode.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::{Result, TableProvider, TableRegion};
use crate::error::TableError;

lazy_static! {
    static ref CELL_SEPARATOR: Regex = Regex::new(r"\s{2,}|\t|\|").unwrap();
}

/// Table detector over extracted page text.
#[derive(Debug, Clone)]
pub struct TextTableDetector {
    min_rows: usize,
    min_cols: usize,
}

impl TextTableDetector {
    pub fn new() -> Self {
        Self { min_rows: 2, min_cols: 2 }
    }

    /// Set the minimum number of rows (header included) per region.
    pub fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows = min_rows.max(1);
        self
    }

    /// Find regions in the text of a single page.
    pub fn detect_in_text(&self, page: u32, text: &str) -> Vec<TableRegion> {
        let mut regions = Vec::new();
        let mut block: Vec<Vec<String>> = Vec::new();

        for line in text.lines() {
            let cells = split_cells(line);
            if cells.len() >= self.min_cols {
                block.push(cells);
                continue;
            }
            self.flush_block(page, &mut block, &mut regions);
        }
        self.flush_block(page, &mut block, &mut regions);

        regions
    }

    fn flush_block(&self, page: u32, block: &mut Vec<Vec<String>>, regions: &mut Vec<TableRegion>) {
        let rows = std::mem::take(block);
        if rows.len() >= self.min_rows {
            regions.push(TableRegion { page, rows });
        }
    }
}

impl Default for TextTableDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl TableProvider for TextTableDetector {
    fn detect(&self, data: &[u8]) -> Result<Vec<TableRegion>> {
        // pdf_extract can panic on malformed content (e.g. undefined fonts)
        let extracted = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(data)
        }));
        let pages = match extracted {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => return Err(TableError::Load(e.to_string())),
            Err(_) => {
                return Err(TableError::Detection(
                    "text layer could not be decoded".to_string(),
                ));
            }
        };

        let regions: Vec<TableRegion> = pages
            .iter()
            .enumerate()
            .flat_map(|(i, text)| self.detect_in_text(i as u32 + 1, text))
            .collect();

        debug!("Text detector found {} table regions", regions.len());
        Ok(regions)
    }
}

fn split_cells(line: &str) -> Vec<String> {
    CELL_SEPARATOR
        .split(line.trim())
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(String::from)
        .collect()
}
