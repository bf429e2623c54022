//! Configuration structures for the statement pipeline.

use serde::{Deserialize, Serialize};

use crate::error::StatementError;
use crate::statement::StatementParser;
use crate::tables::{LayoutTableDetector, TableProvider, TextTableDetector};

/// Main configuration for cardstmt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Table detection and aggregation configuration.
    pub tables: TableConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to read (0 = unlimited).
    pub max_pages: usize,

    /// Minimum non-whitespace text length for a usable text layer.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_pages: 0,
            min_text_length: 1,
        }
    }
}

/// How table regions are found in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStrategy {
    /// Positioned text runs from page content streams.
    #[default]
    Layout,
    /// Column splits in the plain text layer.
    Text,
}

/// Table detection and aggregation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Aggregate transactions from tables at all.
    pub enabled: bool,

    /// Detector used to find table regions.
    pub strategy: TableStrategy,

    /// Header similarity a column must exceed (0 - 100).
    pub similarity_threshold: u8,

    /// Vertical distance (points) within which text runs share a row.
    pub row_tolerance: f32,

    /// Minimum rows (header included) for a region to be reported.
    pub min_rows: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strategy: TableStrategy::Layout,
            similarity_threshold: 70,
            row_tolerance: 3.0,
            min_rows: 2,
        }
    }
}

impl TableConfig {
    /// Build the configured table detector.
    pub fn provider(&self) -> Box<dyn TableProvider> {
        match self.strategy {
            TableStrategy::Layout => Box::new(
                LayoutTableDetector::new()
                    .with_row_tolerance(self.row_tolerance)
                    .with_min_rows(self.min_rows),
            ),
            TableStrategy::Text => Box::new(TextTableDetector::new().with_min_rows(self.min_rows)),
        }
    }
}

impl StatementConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, StatementError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| StatementError::Config(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), StatementError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| StatementError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Build a parser honoring this configuration.
    pub fn parser(&self) -> StatementParser<Box<dyn TableProvider>> {
        StatementParser::with_table_provider(self.tables.provider())
            .with_tables(self.tables.enabled)
            .with_similarity_threshold(self.tables.similarity_threshold)
            .with_max_pages(self.pdf.max_pages)
            .with_min_text_length(self.pdf.min_text_length)
    }
}
