//! Statement field extraction and record assembly.

mod parser;
pub mod rules;

pub use parser::{extract_fields, ExtractionResult, StatementParser};
