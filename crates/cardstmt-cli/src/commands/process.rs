//! Process command - extract data from a single statement file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use cardstmt_core::{format_usd, parse_statement_date, ExtractionResult, StatementRecord};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input statement PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Report consistency issues in the extracted data
    #[arg(long)]
    validate: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message("Parsing statement...");

    let data = fs::read(&args.input)?;
    let result = config.parser().parse_bytes(&data);
    pb.finish_and_clear();
    let result = result?;

    if args.validate {
        let issues = result.record.validate();
        if issues.is_empty() {
            eprintln!("{} No validation issues", style("✓").green());
        } else {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &issues {
                eprintln!("  - {}", issue);
            }
        }
    }

    let output = format_record(&result.record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    log_result(&result);
    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn log_result(result: &ExtractionResult) {
    debug!(
        "{} pages, {}/{} transaction tables, {}ms",
        result.page_count, result.tables_matched, result.tables_seen, result.processing_time_ms
    );
    for warning in &result.warnings {
        debug!("Extraction warning: {}", warning);
    }
}

/// Render a record in the requested format.
pub fn format_record(record: &StatementRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

pub const CSV_HEADER: [&str; 9] = [
    "issuer",
    "card_last_4",
    "billing_cycle_end",
    "billing_cycle_end_iso",
    "payment_due_date",
    "payment_due_date_iso",
    "total_balance_due",
    "total_new_charges",
    "transaction_count",
];

/// CSV cells for a record, in [`CSV_HEADER`] order.
pub fn csv_fields(record: &StatementRecord) -> [String; 9] {
    [
        record.issuer().to_string(),
        record.card_last_4().to_string(),
        record.billing_cycle_end().to_string(),
        iso_date(record.billing_cycle_end()),
        record.payment_due_date().to_string(),
        iso_date(record.payment_due_date()),
        record.total_balance_due().to_string(),
        record.total_new_charges().to_string(),
        record.transaction_count().to_string(),
    ]
}

fn iso_date(value: &str) -> String {
    parse_statement_date(value)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn format_csv(record: &StatementRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_HEADER)?;
    wtr.write_record(csv_fields(record))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

pub fn format_text(record: &StatementRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Issuer: {}\n", record.issuer()));
    output.push_str(&format!("Card ending: {}\n", record.card_last_4()));
    output.push('\n');

    output.push_str(&format!("Billing cycle end: {}\n", record.billing_cycle_end()));
    output.push_str(&format!("Payment due date:  {}\n", record.payment_due_date()));
    output.push('\n');

    output.push_str(&format!(
        "Total balance due: {}\n",
        format_usd(record.total_balance_due())
    ));
    output.push_str(&format!(
        "New charges:       {} ({} transactions)\n",
        format_usd(record.total_new_charges()),
        record.transaction_count()
    ));

    output
}
