//! Structured form of the cluster status report.
//!
//! `sh.status()` prints a human-oriented dump that is not JSON. The parser in
//! [`parser`] turns it into a [`StatusReport`]; [`shard_keys`] and
//! [`properties`] derive per-shard views from that report on demand.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub mod parser;
pub mod properties;
pub mod shard_keys;

pub use parser::{parse_status_report, StatusReportParser};
pub use properties::{find_shard, shard_properties, ShardProperties};
pub use shard_keys::{extract_shard_keys, ShardKeySpec};

/// Snapshot of the cluster topology, one per parse.
///
/// All three sections are always present, even when the report had none of
/// their lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    #[serde(rename = "sharding version", default)]
    pub sharding_version: BTreeMap<String, VersionValue>,
    #[serde(default)]
    pub shards: Vec<ShardEntry>,
    #[serde(default)]
    pub databases: Vec<DatabaseEntry>,
}

/// A `sharding version` value: digit-only values become integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionValue {
    Integer(i64),
    Text(String),
}

impl VersionValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            VersionValue::Integer(n) => Some(*n),
            VersionValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            VersionValue::Text(s) => Some(s),
            VersionValue::Integer(_) => None,
        }
    }
}

/// One line of the `shards` section, kept as the JSON object it was printed as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShardEntry(Map<String, Value>);

impl ShardEntry {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// The shard name (`_id`)
    pub fn id(&self) -> Option<&str> {
        self.0.get("_id").and_then(Value::as_str)
    }

    /// The shard connection string, e.g. `rs0/h1:27018,h2:27018`
    pub fn host(&self) -> Option<&str> {
        self.0.get("host").and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// One line of the `databases` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatabaseEntry(Map<String, Value>);

impl DatabaseEntry {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get("_id").and_then(Value::as_str)
    }

    /// Collection records (`{"<collection>": {"shardkey": {...}}}`) of a
    /// sharded database, if any are listed.
    pub fn collections(&self) -> &[Value] {
        self.0
            .get("shards")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}
