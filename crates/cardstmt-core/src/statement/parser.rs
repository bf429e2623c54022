//! Statement parser combining text-layer rules with table aggregation.

use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::statement::{StatementRecord, StatementRecordBuilder};
use crate::pdf::{self, PdfExtractor, PdfProcessor};
use crate::tables::{LayoutTableDetector, TableProvider, TransactionAggregator, TransactionTotals};

use super::rules::{
    extract_field, identify_issuer, normalize_amount,
    patterns::{BALANCE_DUE_RULES, BILLING_CYCLE_RULES, DUE_DATE_RULES, LAST_4_RULES},
};

/// Result of statement extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted statement data.
    pub record: StatementRecord,
    /// Missing fields and consistency issues.
    pub warnings: Vec<String>,
    /// Pages in the document.
    pub page_count: u32,
    /// Table regions detected.
    pub tables_seen: usize,
    /// Table regions recognized as transaction tables.
    pub tables_matched: usize,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Extract the scalar fields from a statement's text layer.
///
/// Each field is matched independently; fields without a match hold the
/// `"N/A"` sentinel (or zero for the balance).
pub fn extract_fields(text: &str) -> StatementRecordBuilder {
    let issuer = identify_issuer(text);
    let balance_raw = extract_field(text, &BALANCE_DUE_RULES);

    debug!("Issuer: {}, raw balance: {}", issuer, balance_raw);

    StatementRecord::builder()
        .issuer(issuer)
        .card_last_4(extract_field(text, &LAST_4_RULES))
        .billing_cycle_end(extract_field(text, &BILLING_CYCLE_RULES))
        .payment_due_date(extract_field(text, &DUE_DATE_RULES))
        .total_balance_due(normalize_amount(&balance_raw))
}

/// Credit-card statement parser.
///
/// Scalar fields come from the text layer; transaction totals come from
/// table regions detected on the raw document. Only a missing or unreadable
/// text layer fails a parse.
pub struct StatementParser<T = LayoutTableDetector> {
    tables: T,
    tables_enabled: bool,
    aggregator: TransactionAggregator,
    max_pages: usize,
    min_text_length: usize,
}

impl StatementParser<LayoutTableDetector> {
    /// Create a parser using the layout table detector.
    pub fn new() -> Self {
        Self::with_table_provider(LayoutTableDetector::new())
    }
}

impl Default for StatementParser<LayoutTableDetector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TableProvider> StatementParser<T> {
    /// Create a parser with a custom table provider.
    pub fn with_table_provider(tables: T) -> Self {
        Self {
            tables,
            tables_enabled: true,
            aggregator: TransactionAggregator::new(),
            max_pages: 0,
            min_text_length: 1,
        }
    }

    /// Enable or disable table aggregation.
    pub fn with_tables(mut self, enabled: bool) -> Self {
        self.tables_enabled = enabled;
        self
    }

    /// Set the header similarity threshold for transaction tables.
    pub fn with_similarity_threshold(mut self, threshold: u8) -> Self {
        self.aggregator = self.aggregator.with_threshold(threshold);
        self
    }

    /// Limit text extraction to the first `max_pages` pages (0 = all).
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Set the minimum text length for a usable text layer.
    pub fn with_min_text_length(mut self, min_text_length: usize) -> Self {
        self.min_text_length = min_text_length;
        self
    }

    /// Parse a statement PDF from disk.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<ExtractionResult> {
        let path = path.as_ref();
        info!("Processing {}", path.display());
        let data = std::fs::read(path)?;
        self.parse_bytes(&data)
    }

    /// Parse a statement PDF from bytes.
    pub fn parse_bytes(&self, data: &[u8]) -> Result<ExtractionResult> {
        let mut extractor = PdfExtractor::new().with_max_pages(self.max_pages);
        self.parse_with(&mut extractor, data)
    }

    /// Parse a statement using a specific text processor.
    pub fn parse_with<P>(&self, processor: &mut P, data: &[u8]) -> Result<ExtractionResult>
    where
        P: PdfProcessor + ?Sized,
    {
        let start = Instant::now();

        let document = pdf::read_text(processor, data, self.min_text_length)?;
        debug!(
            "Extracted {} chars from {} pages",
            document.text.len(),
            document.page_count
        );

        let fields = extract_fields(&document.text);

        let totals = if self.tables_enabled {
            self.aggregator.aggregate_from(&self.tables, data)
        } else {
            TransactionTotals::default()
        };

        let record = fields
            .total_new_charges(totals.total_new_charges)
            .transaction_count(totals.transaction_count)
            .build();

        let mut warnings: Vec<String> = record
            .missing_fields()
            .into_iter()
            // validate() reports a missing due date itself
            .filter(|field| *field != "payment_due_date")
            .map(|field| format!("Field not found: {}", field))
            .collect();
        warnings.extend(record.validate());

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Parsed {} statement: {} transactions, {} warnings in {}ms",
            record.issuer(),
            record.transaction_count(),
            warnings.len(),
            processing_time_ms
        );

        Ok(ExtractionResult {
            record,
            warnings,
            page_count: document.page_count,
            tables_seen: totals.tables_seen,
            tables_matched: totals.tables_matched,
            processing_time_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PdfError, StatementError, TableError};
    use crate::models::statement::Issuer;
    use crate::tables::{self, TableRegion};
    use crate::testing::{build_pdf, undefined_font_pdf, Fragment};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    struct TextOnly {
        text: &'static str,
        fail: bool,
        loaded: bool,
    }

    impl TextOnly {
        fn new(text: &'static str) -> Self {
            Self { text, fail: false, loaded: false }
        }
    }

    impl PdfProcessor for TextOnly {
        fn load(&mut self, _data: &[u8]) -> pdf::Result<()> {
            if self.fail {
                return Err(PdfError::Parse("cannot open".to_string()));
            }
            self.loaded = true;
            Ok(())
        }

        fn page_count(&self) -> u32 {
            u32::from(self.loaded)
        }

        fn extract_page_text(&self, _page: u32) -> pdf::Result<String> {
            Ok(self.text.to_string())
        }

        fn close(&mut self) {
            self.loaded = false;
        }
    }

    struct NoTables;

    impl TableProvider for NoTables {
        fn detect(&self, _data: &[u8]) -> tables::Result<Vec<TableRegion>> {
            Ok(Vec::new())
        }
    }

    struct BrokenTables;

    impl TableProvider for BrokenTables {
        fn detect(&self, _data: &[u8]) -> tables::Result<Vec<TableRegion>> {
            Err(TableError::Detection("lattice parse failed".to_string()))
        }
    }

    struct FixedTables(Vec<TableRegion>);

    impl TableProvider for FixedTables {
        fn detect(&self, _data: &[u8]) -> tables::Result<Vec<TableRegion>> {
            Ok(self.0.clone())
        }
    }

    const SIMPLE: &str = "Payment Due Date: 05/01/2024\nTotal Balance Due $123.45\n";

    #[test]
    fn test_extract_fields() {
        let record = extract_fields(
            "CHASE SAPPHIRE\nAccount ending in 4321\nStatement Closing Date 04/05/2024\n\
             Payment Due Date: 05/01/2024\nNew Balance $1,234.56",
        )
        .build();

        assert_eq!(record.issuer(), Issuer::Chase);
        assert_eq!(record.card_last_4(), "4321");
        assert_eq!(record.billing_cycle_end(), "04/05/2024");
        assert_eq!(record.payment_due_date(), "05/01/2024");
        assert_eq!(record.total_balance_due(), dec("1234.56"));
    }

    #[test]
    fn test_parse_text_without_tables() {
        let parser = StatementParser::with_table_provider(NoTables);
        let result = parser.parse_with(&mut TextOnly::new(SIMPLE), b"%PDF").unwrap();

        assert_eq!(result.record.payment_due_date(), "05/01/2024");
        assert_eq!(result.record.total_balance_due(), dec("123.45"));
        assert_eq!(result.record.transaction_count(), 0);
        assert_eq!(result.record.total_new_charges(), Decimal::ZERO);
        assert_eq!(result.record.issuer(), Issuer::Unknown);
        assert_eq!(result.page_count, 1);
        assert!(result.warnings.iter().any(|w| w.contains("card_last_4")));
    }

    #[test]
    fn test_open_failure_is_fatal() {
        let parser = StatementParser::with_table_provider(NoTables);
        let mut processor = TextOnly::new(SIMPLE);
        processor.fail = true;

        let result = parser.parse_with(&mut processor, b"not a pdf");
        assert!(matches!(result, Err(StatementError::Pdf(PdfError::Parse(_)))));
    }

    #[test]
    fn test_empty_text_layer_is_fatal() {
        let parser = StatementParser::with_table_provider(NoTables);
        let result = parser.parse_with(&mut TextOnly::new("  \n "), b"%PDF");

        assert!(matches!(result, Err(StatementError::Pdf(PdfError::NoTextLayer))));
    }

    #[test]
    fn test_table_failure_is_absorbed() {
        let parser = StatementParser::with_table_provider(BrokenTables);
        let result = parser.parse_with(&mut TextOnly::new(SIMPLE), b"%PDF").unwrap();

        assert_eq!(result.record.transaction_count(), 0);
        assert_eq!(result.record.payment_due_date(), "05/01/2024");
        assert_eq!(result.tables_seen, 0);
    }

    #[test]
    fn test_tables_feed_totals() {
        let parser = StatementParser::with_table_provider(FixedTables(vec![TableRegion::new(
            1,
            vec![
                vec!["Date", "Description", "Amount"],
                vec!["1/1/24", "Coffee", "$5.00"],
                vec!["1/2/24", "Books", "$20.50"],
                vec!["1/3/24", "Refund", "-$5.00"],
            ],
        )]));
        let result = parser.parse_with(&mut TextOnly::new(SIMPLE), b"%PDF").unwrap();

        assert_eq!(result.record.transaction_count(), 2);
        assert_eq!(result.record.total_new_charges(), dec("25.50"));
        assert_eq!(result.tables_seen, 1);
        assert_eq!(result.tables_matched, 1);
    }

    #[test]
    fn test_tables_can_be_disabled() {
        let parser = StatementParser::with_table_provider(FixedTables(vec![TableRegion::new(
            1,
            vec![vec!["Date", "Amount"], vec!["1/1/24", "$5.00"]],
        )]))
        .with_tables(false);
        let result = parser.parse_with(&mut TextOnly::new(SIMPLE), b"%PDF").unwrap();

        assert_eq!(result.record.transaction_count(), 0);
    }

    #[test]
    fn test_parse_bytes_end_to_end() {
        let pdf = build_pdf(&[vec![
            Fragment::new(50.0, 760.0, "Capital One Platinum"),
            Fragment::new(50.0, 745.0, "Account ending in 9876"),
            Fragment::new(50.0, 730.0, "Payment Due Date: 05/01/2024"),
            Fragment::new(50.0, 715.0, "New Balance $25.50"),
            Fragment::new(50.0, 650.0, "Date"),
            Fragment::new(200.0, 650.0, "Description"),
            Fragment::new(450.0, 650.0, "Amount"),
            Fragment::new(50.0, 635.0, "01/03"),
            Fragment::new(200.0, 635.0, "Coffee"),
            Fragment::new(450.0, 635.0, "$5.00"),
            Fragment::new(50.0, 620.0, "01/04"),
            Fragment::new(200.0, 620.0, "Books"),
            Fragment::new(450.0, 620.0, "$20.50"),
        ]]);

        let result = StatementParser::new().parse_bytes(&pdf).unwrap();

        assert_eq!(result.record.issuer(), Issuer::CapitalOne);
        assert_eq!(result.record.card_last_4(), "9876");
        assert_eq!(result.record.payment_due_date(), "05/01/2024");
        assert_eq!(result.record.total_balance_due(), dec("25.50"));
        assert_eq!(result.record.transaction_count(), 2);
        assert_eq!(result.record.total_new_charges(), dec("25.50"));
        assert_eq!(result.page_count, 1);
    }

    #[test]
    fn test_missing_due_date_warned_once() {
        let parser = StatementParser::with_table_provider(NoTables);
        let result = parser
            .parse_with(&mut TextOnly::new("Total Balance Due $10.00"), b"%PDF")
            .unwrap();

        let due_date_warnings = result
            .warnings
            .iter()
            .filter(|w| w.to_lowercase().contains("due date") || w.contains("payment_due_date"))
            .count();
        assert_eq!(due_date_warnings, 1, "warnings: {:?}", result.warnings);
    }

    #[test]
    fn test_undecodable_text_layer_is_fatal() {
        let result = StatementParser::new().parse_bytes(&undefined_font_pdf());
        assert!(matches!(
            result,
            Err(StatementError::Pdf(PdfError::TextExtraction(_)))
        ));
    }

    #[test]
    fn test_parse_bytes_rejects_garbage() {
        assert!(StatementParser::new().parse_bytes(b"definitely not a pdf").is_err());
    }
}
