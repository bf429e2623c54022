//! Ask command - answer a question about a parsed statement.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use cardstmt_core::{format_usd, StatementRecord};

/// Arguments for the ask command.
#[derive(Args)]
pub struct AskArgs {
    /// Input statement PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Question, e.g. "when is my payment due?"
    #[arg(required = true, num_args = 1..)]
    question: Vec<String>,
}

pub const HELP_RESPONSE: &str = "I can retrieve the Total Balance Due, Payment Due Date, \
Billing Cycle End Date, Last 4 Digits, and a Transaction Summary. \
What specific detail are you looking for?";

pub async fn run(args: AskArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let data = fs::read(&args.input)?;
    let result = config.parser().parse_bytes(&data)?;
    info!("Parsed {} statement", result.record.issuer());

    let question = args.question.join(" ");
    eprintln!("{} {}", style("?").cyan(), question);
    println!("{}", respond(&question, &result.record));

    Ok(())
}

/// Answer a free-form question from the record.
///
/// Keywords are checked in a fixed order and the first hit picks the
/// answer, so "balance due date" reports the balance.
pub fn respond(query: &str, record: &StatementRecord) -> String {
    let query = query.to_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|k| query.contains(k));

    if mentions(&["balance", "due amount"]) {
        format!(
            "Your Total Balance Due is {}.",
            format_usd(record.total_balance_due())
        )
    } else if mentions(&["due date", "when is"]) {
        format!("The Payment Due Date is {}.", record.payment_due_date())
    } else if mentions(&["statement date", "billing cycle"]) {
        format!("The Billing Cycle closed on {}.", record.billing_cycle_end())
    } else if mentions(&["last 4", "card number"]) {
        format!(
            "The statement is for a {} card ending in {}.",
            record.issuer(),
            record.card_last_4()
        )
    } else if mentions(&["transactions", "new charges", "spent"]) {
        format!(
            "You had {} new transactions, totaling {} in the last cycle.",
            record.transaction_count(),
            format_usd(record.total_new_charges())
        )
    } else if mentions(&["summary", "all info"]) {
        format!(
            "Statement Summary for {} (Card ending {}):\n\
             - Total Balance Due: {}\n\
             - Payment Due Date: {}\n\
             - Cycle End Date: {}\n\
             - New Charges: {} transactions, totaling {}",
            record.issuer(),
            record.card_last_4(),
            format_usd(record.total_balance_due()),
            record.payment_due_date(),
            record.billing_cycle_end(),
            record.transaction_count(),
            format_usd(record.total_new_charges())
        )
    } else {
        HELP_RESPONSE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardstmt_core::Issuer;
    use rust_decimal::Decimal;

    fn record() -> StatementRecord {
        StatementRecord::builder()
            .issuer(Issuer::Chase)
            .card_last_4("4321")
            .billing_cycle_end("04/05/2024")
            .payment_due_date("05/01/2024")
            .total_balance_due(Decimal::new(123456, 2))
            .total_new_charges(Decimal::new(2550, 2))
            .transaction_count(2)
            .build()
    }

    #[test]
    fn test_balance() {
        assert_eq!(
            respond("What is my BALANCE?", &record()),
            "Your Total Balance Due is $1,234.56."
        );
        assert!(respond("due amount please", &record()).contains("$1,234.56"));
    }

    #[test]
    fn test_balance_wins_over_due_date() {
        assert!(respond("balance due date", &record()).starts_with("Your Total Balance Due"));
    }

    #[test]
    fn test_due_date() {
        assert_eq!(
            respond("When is the payment due?", &record()),
            "The Payment Due Date is 05/01/2024."
        );
    }

    #[test]
    fn test_billing_cycle() {
        assert_eq!(
            respond("billing cycle end", &record()),
            "The Billing Cycle closed on 04/05/2024."
        );
    }

    #[test]
    fn test_card() {
        assert_eq!(
            respond("what are the last 4 digits", &record()),
            "The statement is for a Chase Bank card ending in 4321."
        );
    }

    #[test]
    fn test_transactions() {
        assert_eq!(
            respond("how much did I spend? show transactions", &record()),
            "You had 2 new transactions, totaling $25.50 in the last cycle."
        );
    }

    #[test]
    fn test_summary() {
        let answer = respond("give me a summary", &record());
        assert!(answer.starts_with("Statement Summary for Chase Bank (Card ending 4321):"));
        assert!(answer.contains("- Cycle End Date: 04/05/2024"));
        assert!(answer.contains("- New Charges: 2 transactions, totaling $25.50"));
    }

    #[test]
    fn test_unrecognized_question() {
        assert_eq!(respond("hello", &record()), HELP_RESPONSE);
        assert_eq!(respond("", &StatementRecord::default()), HELP_RESPONSE);
    }

    #[test]
    fn test_missing_fields_read_as_sentinel() {
        assert_eq!(
            respond("due date", &StatementRecord::default()),
            "The Payment Due Date is N/A."
        );
    }
}
