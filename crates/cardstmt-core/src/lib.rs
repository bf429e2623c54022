//! Core library for credit-card statement extraction.
//!
//! This crate provides:
//! - PDF text-layer extraction
//! - Issuer identification and rule-based field extraction (due date,
//!   billing cycle end, last 4 card digits, balance due)
//! - Table detection and transaction totals
//! - Statement record and configuration models

pub mod error;
pub mod models;
pub mod pdf;
pub mod statement;
pub mod tables;

#[cfg(test)]
mod testing;

pub use error::{PdfError, Result, StatementError, TableError};
pub use models::config::{PdfConfig, StatementConfig, TableConfig, TableStrategy};
pub use models::statement::{Issuer, StatementRecord, StatementRecordBuilder};
pub use pdf::{DocumentText, PdfExtractor, PdfProcessor};
pub use statement::rules::{format_usd, normalize_amount, parse_statement_date, NOT_AVAILABLE};
pub use statement::{extract_fields, ExtractionResult, StatementParser};
pub use tables::{
    LayoutTableDetector, TableProvider, TableRegion, TextTableDetector, TransactionAggregator,
    TransactionTotals,
};
