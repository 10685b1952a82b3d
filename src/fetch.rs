use std::fmt;

/// Published CSV export of the entity rules sheet. Must stay in sync with
/// the sheet the gameplay team edits.
pub const SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vRXrDu4gWcPOXSWMhwlffAwYxHhj-c0jsMIn6MAuaPZY26tyi2Or7WtKHnRE24stkSE_nI6FX6JhIn1/pub?gid=0&single=true&output=csv";

#[derive(Debug)]
pub enum FetchError {
    Request(reqwest::Error),
    Status(reqwest::StatusCode),
    Body(reqwest::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Request(e) => write!(f, "failed to fetch sheet: {}", e),
            FetchError::Status(status) => write!(f, "sheet download failed: {}", status),
            FetchError::Body(e) => write!(f, "failed to read sheet body: {}", e),
        }
    }
}

impl std::error::Error for FetchError {}

/// Download the sheet CSV. No retries; transport and HTTP errors propagate
/// to the caller unmodified.
pub fn fetch_sheet(url: &str) -> Result<String, FetchError> {
    let resp = reqwest::blocking::get(url).map_err(FetchError::Request)?;
    if !resp.status().is_success() {
        return Err(FetchError::Status(resp.status()));
    }
    resp.text().map_err(FetchError::Body)
}
