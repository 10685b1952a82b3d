use crate::fetch::{self, FetchError};
use crate::output::{self, WriteError};
use crate::rules::{self, ParseError};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConvertError {
    Fetch(FetchError),
    Parse(ParseError),
    Write(WriteError),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Fetch(e) => write!(f, "{}", e),
            ConvertError::Parse(e) => write!(f, "{}", e),
            ConvertError::Write(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConvertError {}

impl From<FetchError> for ConvertError {
    fn from(e: FetchError) -> Self {
        ConvertError::Fetch(e)
    }
}

impl From<ParseError> for ConvertError {
    fn from(e: ParseError) -> Self {
        ConvertError::Parse(e)
    }
}

impl From<WriteError> for ConvertError {
    fn from(e: WriteError) -> Self {
        ConvertError::Write(e)
    }
}

#[derive(Debug)]
pub struct ConvertResult {
    pub rules_written: usize,
    pub output_path: PathBuf,
}

/// Run the full conversion: fetch the sheet, validate every row, write the
/// JSON lookup. Validation failures abort before the output file is touched.
pub fn run_convert() -> Result<ConvertResult, ConvertError> {
    // 1. Fetch the published sheet as CSV
    let csv_text = fetch::fetch_sheet(fetch::SHEET_URL)?;

    // 2. Validate, build, write
    convert_csv(&csv_text, Path::new(output::OUTPUT_PATH))
}

/// Validate the CSV text and write the JSON lookup.
pub fn convert_csv(csv_text: &str, output_path: &Path) -> Result<ConvertResult, ConvertError> {
    let rules = rules::parse_rules(csv_text)?;
    output::write_rules(&rules, output_path)?;

    Ok(ConvertResult {
        rules_written: rules.len(),
        output_path: output_path.to_path_buf(),
    })
}
