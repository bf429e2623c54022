//! Statement record model.

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use crate::statement::rules::{parse_statement_date, NOT_AVAILABLE};

/// Card issuers recognized by keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Issuer {
    #[serde(rename = "Chase Bank")]
    Chase,
    #[serde(rename = "American Express")]
    AmericanExpress,
    #[serde(rename = "Citi Bank")]
    Citi,
    #[serde(rename = "Bank of America")]
    BankOfAmerica,
    #[serde(rename = "Capital One")]
    CapitalOne,
    #[serde(rename = "Discover")]
    Discover,
    #[serde(rename = "Wells Fargo")]
    WellsFargo,
    #[default]
    Unknown,
}

impl Issuer {
    /// Display name of the issuer.
    pub fn name(&self) -> &'static str {
        match self {
            Issuer::Chase => "Chase Bank",
            Issuer::AmericanExpress => "American Express",
            Issuer::Citi => "Citi Bank",
            Issuer::BankOfAmerica => "Bank of America",
            Issuer::CapitalOne => "Capital One",
            Issuer::Discover => "Discover",
            Issuer::WellsFargo => "Wells Fargo",
            Issuer::Unknown => "Unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Issuer::Unknown)
    }
}

impl fmt::Display for Issuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Facts extracted from one statement.
///
/// Built once through [`StatementRecordBuilder`] and read-only afterwards.
/// Textual fields hold a value or `"N/A"`; amounts are never negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementRecord {
    issuer: Issuer,
    card_last_4: String,
    billing_cycle_end: String,
    payment_due_date: String,
    total_balance_due: Decimal,
    total_new_charges: Decimal,
    transaction_count: u32,
}

impl Default for StatementRecord {
    fn default() -> Self {
        StatementRecordBuilder::new().build()
    }
}

impl StatementRecord {
    pub fn builder() -> StatementRecordBuilder {
        StatementRecordBuilder::new()
    }

    pub fn issuer(&self) -> Issuer {
        self.issuer
    }

    pub fn card_last_4(&self) -> &str {
        &self.card_last_4
    }

    pub fn billing_cycle_end(&self) -> &str {
        &self.billing_cycle_end
    }

    pub fn payment_due_date(&self) -> &str {
        &self.payment_due_date
    }

    pub fn total_balance_due(&self) -> Decimal {
        self.total_balance_due
    }

    pub fn total_new_charges(&self) -> Decimal {
        self.total_new_charges
    }

    pub fn transaction_count(&self) -> u32 {
        self.transaction_count
    }

    /// Names of fields still holding their "not found" sentinel.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.issuer.is_known() {
            missing.push("issuer");
        }
        if self.card_last_4 == NOT_AVAILABLE {
            missing.push("card_last_4");
        }
        if self.billing_cycle_end == NOT_AVAILABLE {
            missing.push("billing_cycle_end");
        }
        if self.payment_due_date == NOT_AVAILABLE {
            missing.push("payment_due_date");
        }
        missing
    }

    /// Check the record for internal inconsistencies.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.payment_due_date == NOT_AVAILABLE {
            issues.push("Payment due date not found".to_string());
        }

        if self.total_balance_due.is_zero() && self.total_new_charges > Decimal::ZERO {
            issues.push(format!(
                "Balance due is zero but new charges total {}",
                self.total_new_charges
            ));
        }

        if self.transaction_count == 0 && self.total_new_charges > Decimal::ZERO {
            issues.push("New charges present without any transactions".to_string());
        }

        if let (Some(closing), Some(due)) = (
            parse_statement_date(&self.billing_cycle_end),
            parse_statement_date(&self.payment_due_date),
        ) {
            if closing > due {
                issues.push(format!(
                    "Billing cycle end {} is after payment due date {}",
                    closing, due
                ));
            }
        }

        issues
    }
}

/// Builder that applies the record's defaults and invariants.
#[derive(Debug, Clone, Default)]
pub struct StatementRecordBuilder {
    issuer: Issuer,
    card_last_4: Option<String>,
    billing_cycle_end: Option<String>,
    payment_due_date: Option<String>,
    total_balance_due: Decimal,
    total_new_charges: Decimal,
    transaction_count: u32,
}

impl StatementRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issuer(mut self, issuer: Issuer) -> Self {
        self.issuer = issuer;
        self
    }

    pub fn card_last_4(mut self, value: impl Into<String>) -> Self {
        self.card_last_4 = Some(value.into());
        self
    }

    pub fn billing_cycle_end(mut self, value: impl Into<String>) -> Self {
        self.billing_cycle_end = Some(value.into());
        self
    }

    pub fn payment_due_date(mut self, value: impl Into<String>) -> Self {
        self.payment_due_date = Some(value.into());
        self
    }

    pub fn total_balance_due(mut self, amount: Decimal) -> Self {
        self.total_balance_due = amount;
        self
    }

    pub fn total_new_charges(mut self, amount: Decimal) -> Self {
        self.total_new_charges = amount;
        self
    }

    pub fn transaction_count(mut self, count: u32) -> Self {
        self.transaction_count = count;
        self
    }

    pub fn build(self) -> StatementRecord {
        StatementRecord {
            issuer: self.issuer,
            card_last_4: text_or_sentinel(self.card_last_4),
            billing_cycle_end: text_or_sentinel(self.billing_cycle_end),
            payment_due_date: text_or_sentinel(self.payment_due_date),
            total_balance_due: non_negative(self.total_balance_due),
            total_new_charges: non_negative(self.total_new_charges).round_dp(2),
            transaction_count: self.transaction_count,
        }
    }
}

fn text_or_sentinel(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn non_negative(amount: Decimal) -> Decimal {
    if amount.is_sign_negative() { Decimal::ZERO } else { amount }
}
