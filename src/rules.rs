use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashSet;
use std::fmt;

/// Cell values the spreadsheet export produces for "no value here".
///
/// The sheet is authored by hand, so empty cells sometimes arrive as one of
/// these placeholder tokens instead of an empty string.
const MISSING_MARKERS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A",
];

fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || MISSING_MARKERS.contains(&cell)
}

/// Permission tier for spawning one entity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowLevel {
    Allow,
    Warn,
    Deny,
}

impl AllowLevel {
    /// Parse a sheet cell token. Matching is exact on the trimmed text.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            "allow" => Some(AllowLevel::Allow),
            "warn" => Some(AllowLevel::Warn),
            "deny" => Some(AllowLevel::Deny),
            _ => None,
        }
    }

    /// Integer coding consumed by the engine's EntityRule.AllowLevel.
    pub fn numeric(self) -> u8 {
        match self {
            AllowLevel::Allow => 3,
            AllowLevel::Warn => 2,
            AllowLevel::Deny => 1,
        }
    }
}

/// The validated permission record for one entity class.
///
/// Field names match the JSON keys the engine reads.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct EntityRule {
    #[serde(rename = "Level")]
    pub level: u8,
    #[serde(rename = "Comment", skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Ordered mapping from entity class name to rule, insertion order = sheet
/// row order. Serializes as a single JSON object.
#[derive(Debug, Default)]
pub struct RuleSet {
    entries: Vec<(String, EntityRule)>,
}

impl RuleSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, class_name: &str) -> Option<&EntityRule> {
        self.entries
            .iter()
            .find(|(name, _)| name == class_name)
            .map(|(_, rule)| rule)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityRule)> {
        self.entries.iter().map(|(name, rule)| (name.as_str(), rule))
    }
}

impl Serialize for RuleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, rule) in &self.entries {
            map.serialize_entry(name, rule)?;
        }
        map.end()
    }
}

/// Row indices in errors are 0-based data-row indices (the header row is
/// not counted).
#[derive(Debug)]
pub enum ParseError {
    Csv(csv::Error),
    MissingColumn(&'static str),
    EmptyClassName { row: usize },
    DuplicateClassName { name: String, row: usize },
    MissingLevel { name: String, row: usize },
    UnknownLevel { token: String, row: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Csv(e) => write!(f, "malformed CSV: {}", e),
            ParseError::MissingColumn(col) => {
                write!(f, "required column '{}' not found in sheet header", col)
            }
            ParseError::EmptyClassName { row } => {
                write!(f, "empty classname on row {}", row)
            }
            ParseError::DuplicateClassName { name, row } => {
                write!(f, "duplicate classname '{}' on row {}", name, row)
            }
            ParseError::MissingLevel { name, row } => {
                write!(f, "missing level for '{}' on row {}", name, row)
            }
            ParseError::UnknownLevel { token, row } => {
                write!(f, "unknown level '{}' on row {}", token, row)
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl From<csv::Error> for ParseError {
    fn from(e: csv::Error) -> Self {
        ParseError::Csv(e)
    }
}

/// Parse and validate the sheet CSV into an ordered rule set.
///
/// Any invalid row fails the whole parse; no partial rule set escapes.
pub fn parse_rules(csv_text: &str) -> Result<RuleSet, ParseError> {
    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    let headers = reader.headers()?.clone();

    let class_idx = headers
        .iter()
        .position(|h| h == "ClassName")
        .ok_or(ParseError::MissingColumn("ClassName"))?;
    let level_idx = headers
        .iter()
        .position(|h| h == "AllowLevel")
        .ok_or(ParseError::MissingColumn("AllowLevel"))?;
    // Comment column is optional
    let comment_idx = headers.iter().position(|h| h == "Comment");

    let mut rules = RuleSet::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (row, record) in reader.records().enumerate() {
        let record = record?;

        let class_cell = record.get(class_idx).unwrap_or("");
        if is_missing(class_cell) {
            return Err(ParseError::EmptyClassName { row });
        }
        let class_name = class_cell.trim().to_string();

        if !seen.insert(class_name.clone()) {
            return Err(ParseError::DuplicateClassName {
                name: class_name,
                row,
            });
        }

        let level_cell = record.get(level_idx).unwrap_or("");
        if is_missing(level_cell) {
            return Err(ParseError::MissingLevel {
                name: class_name,
                row,
            });
        }
        let level = AllowLevel::parse(level_cell).ok_or_else(|| ParseError::UnknownLevel {
            token: level_cell.trim().to_string(),
            row,
        })?;

        let comment = comment_idx
            .and_then(|idx| record.get(idx))
            .filter(|cell| !is_missing(cell))
            .map(|cell| cell.to_string());

        rules.entries.push((
            class_name,
            EntityRule {
                level: level.numeric(),
                comment,
            },
        ));
    }

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "ClassName,AllowLevel,Comment";

    fn sheet(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    #[test]
    fn level_tokens_map_to_fixed_table() {
        let rules = parse_rules(&sheet(&[
            "npc_zombie,allow,",
            "npc_turret,warn,",
            "npc_helicopter,deny,",
        ]))
        .unwrap();
        assert_eq!(rules.get("npc_zombie").unwrap().level, 3);
        assert_eq!(rules.get("npc_turret").unwrap().level, 2);
        assert_eq!(rules.get("npc_helicopter").unwrap().level, 1);
    }

    #[test]
    fn blank_comment_is_omitted() {
        let rules = parse_rules(&sheet(&["npc_zombie,allow,"])).unwrap();
        assert_eq!(rules.get("npc_zombie").unwrap().comment, None);
    }

    #[test]
    fn na_marker_comment_is_omitted() {
        let rules = parse_rules(&sheet(&["npc_zombie,allow,NaN", "npc_turret,warn,N/A"])).unwrap();
        assert_eq!(rules.get("npc_zombie").unwrap().comment, None);
        assert_eq!(rules.get("npc_turret").unwrap().comment, None);
    }

    #[test]
    fn comment_is_kept_when_present() {
        let rules = parse_rules(&sheet(&["npc_turret,warn,test weapon"])).unwrap();
        assert_eq!(
            rules.get("npc_turret").unwrap().comment.as_deref(),
            Some("test weapon")
        );
    }

    #[test]
    fn missing_comment_column_is_fine() {
        let rules = parse_rules("ClassName,AllowLevel\nnpc_zombie,allow").unwrap();
        assert_eq!(rules.get("npc_zombie").unwrap().comment, None);
    }

    #[test]
    fn empty_classname_fails() {
        let err = parse_rules(&sheet(&["npc_zombie,allow,", ",warn,"])).unwrap_err();
        assert!(matches!(err, ParseError::EmptyClassName { row: 1 }));
    }

    #[test]
    fn duplicate_classname_fails_not_overwrites() {
        let err = parse_rules(&sheet(&["npc_zombie,allow,", "npc_zombie,deny,"])).unwrap_err();
        match err {
            ParseError::DuplicateClassName { name, row } => {
                assert_eq!(name, "npc_zombie");
                assert_eq!(row, 1);
            }
            other => panic!("expected DuplicateClassName, got {:?}", other),
        }
    }

    #[test]
    fn missing_level_fails() {
        let err = parse_rules(&sheet(&["npc_zombie,,"])).unwrap_err();
        assert!(matches!(err, ParseError::MissingLevel { row: 0, .. }));
    }

    #[test]
    fn unknown_level_fails() {
        let err = parse_rules(&sheet(&["npc_zombie,allow,", "npc_turret,maybe,"])).unwrap_err();
        match err {
            ParseError::UnknownLevel { token, row } => {
                assert_eq!(token, "maybe");
                assert_eq!(row, 1);
            }
            other => panic!("expected UnknownLevel, got {:?}", other),
        }
    }

    #[test]
    fn level_tokens_are_case_sensitive() {
        let err = parse_rules(&sheet(&["npc_zombie,Allow,"])).unwrap_err();
        assert!(matches!(err, ParseError::UnknownLevel { .. }));
    }

    #[test]
    fn missing_required_column_fails() {
        let err = parse_rules("ClassName,Comment\nnpc_zombie,hi").unwrap_err();
        assert!(matches!(err, ParseError::MissingColumn("AllowLevel")));
        let err = parse_rules("AllowLevel,Comment\nallow,hi").unwrap_err();
        assert!(matches!(err, ParseError::MissingColumn("ClassName")));
    }

    #[test]
    fn row_order_is_preserved() {
        let rules = parse_rules(&sheet(&[
            "npc_zombie,allow,",
            "npc_antlion,allow,",
            "npc_turret,warn,",
        ]))
        .unwrap();
        let names: Vec<&str> = rules.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["npc_zombie", "npc_antlion", "npc_turret"]);
    }

    #[test]
    fn empty_sheet_gives_empty_set() {
        let rules = parse_rules(HEADER).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn classname_is_trimmed() {
        let rules = parse_rules(&sheet(&[" npc_zombie ,allow,"])).unwrap();
        assert!(rules.get("npc_zombie").is_some());
    }
}
