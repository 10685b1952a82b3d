use crate::rules::RuleSet;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fmt;
use std::fs;
use std::path::Path;

/// Where the engine expects the lookup file, relative to the repository
/// root the tool is run from.
pub const OUTPUT_PATH: &str = "resources/entityrules_momentum.json";

#[derive(Debug)]
pub enum WriteError {
    Serialize(serde_json::Error),
    Io(std::io::Error),
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::Serialize(e) => write!(f, "failed to serialize rules: {}", e),
            WriteError::Io(e) => write!(f, "failed to write output file: {}", e),
        }
    }
}

impl std::error::Error for WriteError {}

impl From<std::io::Error> for WriteError {
    fn from(e: std::io::Error) -> Self {
        WriteError::Io(e)
    }
}

/// Render the rule set as 4-space-indented JSON.
pub fn render_json(rules: &RuleSet) -> Result<String, WriteError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    rules.serialize(&mut ser).map_err(WriteError::Serialize)?;
    // serde_json emits valid UTF-8
    String::from_utf8(buf)
        .map_err(|e| WriteError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Serialize fully in memory, then write. A run that fails validation or
/// serialization never touches the output file.
pub fn write_rules(rules: &RuleSet, path: &Path) -> Result<(), WriteError> {
    let json = render_json(rules)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, json)?;
    Ok(())
}
