//! Table region detection and transaction aggregation.
//!
//! Detectors turn a raw PDF into [`TableRegion`] grids; the aggregator
//! decides which grids are transaction tables and totals their charges.

mod aggregate;
mod layout;
mod text;

pub use aggregate::{TransactionAggregator, TransactionTotals};
pub use layout::LayoutTableDetector;
pub use text::TextTableDetector;

use crate::error::TableError;

/// Result type for table detection.
pub type Result<T> = std::result::Result<T, TableError>;

/// A detected table: a grid of cell strings, row 0 being the header
/// candidate. Rows may be ragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRegion {
    /// Page the region was found on (1-indexed).
    pub page: u32,
    /// Cell text by row, then column.
    pub rows: Vec<Vec<String>>,
}

impl TableRegion {
    /// Create a region from rows of cells.
    pub fn new<R, C>(page: u32, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            page,
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Number of rows, header included.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn num_cols(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Get header row (first row).
    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Get data rows (all rows except header).
    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Get the cell at a specific position.
    pub fn cell_at(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

/// Trait for table region providers.
///
/// Providers read the raw document on their own, independently of text
/// extraction for scalar fields.
pub trait TableProvider {
    /// Detect table regions in a PDF.
    fn detect(&self, data: &[u8]) -> Result<Vec<TableRegion>>;
}

impl<T: TableProvider + ?Sized> TableProvider for Box<T> {
    fn detect(&self, data: &[u8]) -> Result<Vec<TableRegion>> {
        (**self).detect(data)
    }
}

impl<T: TableProvider + ?Sized> TableProvider for &T {
    fn detect(&self, data: &[u8]) -> Result<Vec<TableRegion>> {
        (**self).detect(data)
    }
}
