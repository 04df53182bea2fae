//! Line-oriented parser for `sh.status()` output.
//!
//! The report looks like this (bodies are indented with tabs or more than two
//! spaces):
//!
//! ```text
//! --- Sharding Status ---
//!   sharding version: {
//!     "_id" : 1,
//!     "currentVersion" : 6,
//!     "clusterId" : ObjectId("5a0b...")
//!   }
//!   shards:
//!     {  "_id" : "shard01",  "host" : "s1/h1:27018" }
//!   databases:
//!     {  "_id" : "db1",  "primary" : "shard01",  "partitioned" : true }
//!         db1.users
//!             shard key: { "uid" : 1 }
//! ```
//!
//! Unknown sections are recognized and skipped. Body lines that do not parse
//! are dropped from their section; the parse as a whole never fails.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use super::{DatabaseEntry, ShardEntry, StatusReport, VersionValue};

static VERSION_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*"([^"]+)"\s*:\s*(.*)$"#).expect("Valid regex pattern"));

/// Marker the shell prints between chunk ranges in the databases section
const CHUNK_ARROW: &str = "-->>";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Section {
    /// Before the first header
    None,
    ShardingVersion,
    Shards,
    Databases,
    Ignored(String),
}

impl Section {
    fn from_header(name: &str) -> Self {
        match name {
            "sharding version" => Section::ShardingVersion,
            "shards" => Section::Shards,
            "databases" => Section::Databases,
            other => Section::Ignored(other.to_string()),
        }
    }
}

/// Incremental parser state: the open section plus the report built so far.
///
/// Feed it every line after the title banner, then call [`finish`].
///
/// [`finish`]: StatusReportParser::finish
#[derive(Debug)]
pub struct StatusReportParser {
    section: Section,
    report: StatusReport,
}

impl StatusReportParser {
    pub fn new() -> Self {
        Self {
            section: Section::None,
            report: StatusReport::default(),
        }
    }

    pub fn feed_line(&mut self, line: &str) {
        if line.trim().is_empty() || !starts_with_whitespace(line) {
            return;
        }

        if let Some(header) = section_header(line) {
            // "  }" closes the sharding version block
            if header == "}" {
                return;
            }
            self.section = match header_name(header) {
                Some(name) => Section::from_header(name),
                None => Section::Ignored(header.trim_end().to_string()),
            };
            tracing::debug!("Entering status section {:?}", self.section);
            return;
        }

        match &self.section {
            Section::ShardingVersion => self.push_version_line(line),
            Section::Shards => {
                if let Some(fields) = parse_object_line(line) {
                    self.report.shards.push(ShardEntry::new(fields));
                }
            }
            Section::Databases => {
                if is_database_marker(line) {
                    return;
                }
                if let Some(fields) = parse_object_line(line) {
                    self.report.databases.push(DatabaseEntry::new(fields));
                }
            }
            Section::Ignored(name) => {
                tracing::trace!("Skipping line of ignored section '{}': {}", name, line);
            }
            Section::None => {
                tracing::trace!("Skipping line outside any section: {}", line);
            }
        }
    }

    pub fn finish(self) -> StatusReport {
        self.report
    }

    fn push_version_line(&mut self, line: &str) {
        let line = line.trim_end();
        let line = line.strip_suffix(',').unwrap_or(line);

        let Some(captures) = VERSION_PAIR.captures(line) else {
            tracing::trace!("Dropping malformed sharding version line: {}", line);
            return;
        };

        let key = captures[1].to_string();
        let value = parse_version_value(&captures[2]);
        self.report.sharding_version.insert(key, value);
    }
}

impl Default for StatusReportParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the raw text of `sh.status()`.
///
/// The first line is the title banner and is always discarded.
pub fn parse_status_report(raw: &str) -> StatusReport {
    let mut parser = StatusReportParser::new();
    for line in raw.lines().skip(1) {
        parser.feed_line(line);
    }
    parser.finish()
}

fn starts_with_whitespace(line: &str) -> bool {
    line.chars().next().is_some_and(char::is_whitespace)
}

/// Text after the indent of a top-level header line: exactly two spaces
/// followed by a non-whitespace character.
fn section_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("  ")?;
    rest.chars()
        .next()
        .filter(|c| !c.is_whitespace())
        .map(|_| rest)
}

/// Section name up to the first colon. Headers without one name no section.
fn header_name(header: &str) -> Option<&str> {
    match header.split_once(':') {
        Some((name, _)) if !name.is_empty() => Some(name),
        _ => None,
    }
}

fn parse_version_value(raw: &str) -> VersionValue {
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = raw.parse::<i64>() {
            return VersionValue::Integer(n);
        }
    }

    let unquoted = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    VersionValue::Text(unquoted.to_string())
}

/// Collection names, shard key lines and chunk ranges under a database line.
fn is_database_marker(line: &str) -> bool {
    !line.trim_start().starts_with('{') || line.contains(CHUNK_ARROW)
}

fn parse_object_line(line: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Map<String, Value>>(line.trim()) {
        Ok(fields) => Some(fields),
        Err(e) => {
            tracing::trace!("Dropping unparseable report line ({}): {}", e, line);
            None
        }
    }
}
