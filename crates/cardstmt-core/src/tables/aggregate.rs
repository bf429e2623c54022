//! Transaction totals from detected table regions.

use std::panic::AssertUnwindSafe;

use rust_decimal::Decimal;
use tracing::{debug, trace, warn};

use super::{TableProvider, TableRegion};
use crate::statement::rules::{normalize_amount, partial_ratio};

/// Totals across every transaction table of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionTotals {
    /// Sum of positive charge amounts, rounded to 2 decimal places.
    pub total_new_charges: Decimal,
    /// Number of rows that contributed to the sum.
    pub transaction_count: u32,
    /// Regions inspected.
    pub tables_seen: usize,
    /// Regions recognized as transaction tables.
    pub tables_matched: usize,
}

/// Sums charge rows from tables whose headers look like transaction lists.
#[derive(Debug, Clone)]
pub struct TransactionAggregator {
    threshold: u8,
}

impl TransactionAggregator {
    /// Create an aggregator with the default similarity threshold (70).
    pub fn new() -> Self {
        Self { threshold: 70 }
    }

    /// Set the header similarity a column must exceed (0 - 100).
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    /// Total the qualifying rows of every transaction table.
    ///
    /// A region counts only when its header has both a date-like and an
    /// amount-like column. Rows whose amount is not strictly positive
    /// (refunds, blanks, noise) are skipped.
    pub fn aggregate(&self, regions: &[TableRegion]) -> TransactionTotals {
        let mut totals = TransactionTotals {
            tables_seen: regions.len(),
            ..Default::default()
        };
        let mut sum = Decimal::ZERO;

        for region in regions {
            let header: Vec<String> = region.header().iter().map(|c| c.trim().to_lowercase()).collect();

            if !self.is_transaction_header(&header) {
                trace!("Skipping table on page {} with header {:?}", region.page, header);
                continue;
            }
            totals.tables_matched += 1;

            let Some(amount_col) = self.amount_column(&header) else {
                debug!("No amount column resolved for table on page {}", region.page);
                continue;
            };

            for row in region.data_rows() {
                let Some(cell) = row.get(amount_col) else {
                    continue;
                };
                let amount = normalize_amount(cell);
                if amount > Decimal::ZERO {
                    sum += amount;
                    totals.transaction_count += 1;
                }
            }
        }

        totals.total_new_charges = sum.round_dp(2);
        debug!(
            "Aggregated {} transactions totaling {} from {}/{} tables",
            totals.transaction_count, totals.total_new_charges, totals.tables_matched, totals.tables_seen
        );
        totals
    }

    /// Detect tables with `provider` and total them.
    ///
    /// Detection failures, panics included, are logged and yield empty
    /// totals.
    pub fn aggregate_from<P>(&self, provider: &P, data: &[u8]) -> TransactionTotals
    where
        P: TableProvider + ?Sized,
    {
        let detected = std::panic::catch_unwind(AssertUnwindSafe(|| provider.detect(data)));

        match detected {
            Ok(Ok(regions)) => self.aggregate(&regions),
            Ok(Err(e)) => {
                warn!("Table detection failed, assuming no transactions: {}", e);
                TransactionTotals::default()
            }
            Err(_) => {
                warn!("Table detection panicked, assuming no transactions");
                TransactionTotals::default()
            }
        }
    }

    fn is_transaction_header(&self, header: &[String]) -> bool {
        let has = |target: &str| header.iter().any(|cell| partial_ratio(target, cell) > self.threshold);
        has("date") && has("amount")
    }

    fn amount_column(&self, header: &[String]) -> Option<usize> {
        header.iter().position(|cell| {
            partial_ratio("amount", cell) > self.threshold || partial_ratio("charge", cell) > self.threshold
        })
    }
}

impl Default for TransactionAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableError;
    use crate::testing::undefined_font_pdf;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn region(rows: Vec<Vec<&str>>) -> TableRegion {
        TableRegion::new(1, rows)
    }

    struct PanickingProvider;

    impl TableProvider for PanickingProvider {
        fn detect(&self, _data: &[u8]) -> super::super::Result<Vec<TableRegion>> {
            panic!("font table missing");
        }
    }

    struct FailingProvider;

    impl TableProvider for FailingProvider {
        fn detect(&self, _data: &[u8]) -> super::super::Result<Vec<TableRegion>> {
            Err(TableError::Detection("content stream corrupted".to_string()))
        }
    }

    #[test]
    fn test_refund_rows_excluded() {
        let regions = [region(vec![
            vec!["Date", "Description", "Amount"],
            vec!["1/1/24", "Coffee", "$5.00"],
            vec!["1/2/24", "Refund", "-$5.00"],
        ])];

        let totals = TransactionAggregator::new().aggregate(&regions);
        assert_eq!(totals.transaction_count, 1);
        assert_eq!(totals.total_new_charges, dec("5.00"));
        assert_eq!(totals.tables_matched, 1);
    }

    #[test]
    fn test_header_without_date_is_skipped() {
        let regions = [region(vec![
            vec!["Merchant", "Memo", "Amount"],
            vec!["Grocer", "Weekly shop", "$25.00"],
        ])];

        let totals = TransactionAggregator::new().aggregate(&regions);
        assert_eq!(totals.transaction_count, 0);
        assert_eq!(totals.total_new_charges, Decimal::ZERO);
        assert_eq!(totals.tables_matched, 0);
        assert_eq!(totals.tables_seen, 1);
    }

    #[test]
    fn test_header_without_amount_is_skipped() {
        let regions = [region(vec![
            vec!["Date", "Description", "Reference"],
            vec!["1/1/24", "Coffee", "12.00"],
        ])];

        assert_eq!(TransactionAggregator::new().aggregate(&regions).transaction_count, 0);
    }

    #[test]
    fn test_sums_across_all_tables() {
        let regions = [
            region(vec![
                vec!["Trans Date", "Post Date", "Description", "Amount"],
                vec!["Jan 3", "Jan 4", "Book store", "$1,200.10"],
                vec!["Jan 5", "Jan 6", "Payment", "($300.00)"],
            ]),
            region(vec![vec!["Summary", "Value"], vec!["Fees", "$9.99"]]),
            region(vec![
                vec!["Date", "Merchant", "Amount ($)"],
                vec!["Jan 9", "Taxi", "14.455"],
                vec!["Jan 9", "Noise", "n/a"],
            ]),
        ];

        let totals = TransactionAggregator::new().aggregate(&regions);
        assert_eq!(totals.transaction_count, 2);
        assert_eq!(totals.total_new_charges, dec("1214.56"));
        assert_eq!(totals.tables_seen, 3);
        assert_eq!(totals.tables_matched, 2);
    }

    #[test]
    fn test_first_amount_like_column_wins() {
        let regions = [region(vec![
            vec!["Date", "Charges", "Amount"],
            vec!["1/1/24", "7.00", "100.00"],
        ])];

        let totals = TransactionAggregator::new().aggregate(&regions);
        assert_eq!(totals.total_new_charges, dec("7.00"));
    }

    #[test]
    fn test_short_rows_are_ignored() {
        let regions = [region(vec![
            vec!["Date", "Description", "Amount"],
            vec!["1/1/24"],
            vec![],
            vec!["1/3/24", "Lunch", "$12.50"],
        ])];

        let totals = TransactionAggregator::new().aggregate(&regions);
        assert_eq!(totals.transaction_count, 1);
        assert_eq!(totals.total_new_charges, dec("12.50"));
    }

    #[test]
    fn test_header_only_table() {
        let regions = [region(vec![vec!["Date", "Amount"]])];
        let totals = TransactionAggregator::new().aggregate(&regions);
        assert_eq!(totals.tables_matched, 1);
        assert_eq!(totals.transaction_count, 0);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let regions = [region(vec![vec!["Dte", "Amt"], vec!["1/1/24", "3.00"]])];

        assert_eq!(TransactionAggregator::new().aggregate(&regions).transaction_count, 0);
        assert_eq!(
            TransactionAggregator::new().with_threshold(60).aggregate(&regions).transaction_count,
            1
        );
    }

    #[test]
    fn test_detection_failure_is_absorbed() {
        let totals = TransactionAggregator::new().aggregate_from(&FailingProvider, b"%PDF");
        assert_eq!(totals, TransactionTotals::default());
    }

    #[test]
    fn test_detection_panic_is_absorbed() {
        let totals = TransactionAggregator::new().aggregate_from(&PanickingProvider, b"%PDF");
        assert_eq!(totals, TransactionTotals::default());
    }

    #[test]
    fn test_text_detector_on_undefined_font_is_absorbed() {
        let totals = TransactionAggregator::new()
            .aggregate_from(&crate::tables::TextTableDetector::new(), &undefined_font_pdf());
        assert_eq!(totals, TransactionTotals::default());
    }
}
