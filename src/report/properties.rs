use serde::Serialize;
use std::collections::BTreeMap;

use super::shard_keys::{extract_shard_keys, ShardKeySpec};
use super::StatusReport;

/// What a caller needs to know about one shard: its name, the member
/// connection string and the shard keys of its collections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShardProperties {
    pub name: String,
    pub host: Option<String>,
    pub keys: BTreeMap<String, ShardKeySpec>,
}

/// Properties of every shard in the report, in report order.
///
/// Shards printed without an `_id` cannot be addressed and are left out.
pub fn shard_properties(report: &StatusReport) -> Vec<ShardProperties> {
    let properties: Vec<ShardProperties> = report
        .shards
        .iter()
        .filter_map(|shard| {
            let name = shard.id()?;
            Some(ShardProperties {
                name: name.to_string(),
                host: shard.host().map(str::to_string),
                keys: extract_shard_keys(&report.databases, name),
            })
        })
        .collect();

    tracing::debug!("Shard properties: {:?}", properties);
    properties
}

/// Properties of the shard named `name`, if the report lists it.
pub fn find_shard(report: &StatusReport, name: &str) -> Option<ShardProperties> {
    report
        .shards
        .iter()
        .find(|shard| shard.id() == Some(name))
        .map(|shard| ShardProperties {
            name: name.to_string(),
            host: shard.host().map(str::to_string),
            keys: extract_shard_keys(&report.databases, name),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::parse_status_report;
    use serde_json::json;

    const REPORT: &str = "--- Sharding Status ---
  shards:
\t{\"_id\":\"shard01\",\"host\":\"s1/h1:27018\"}
\t{\"host\":\"anonymous:27018\"}
\t{\"_id\":\"shard02\",\"host\":\"s2/h2:27018\"}
  databases:
\t{\"_id\":\"shard01\",\"shards\":[{\"app.users\":{\"shardkey\":{\"uid\":1}}}]}
";

    #[test]
    fn test_lists_addressable_shards_with_keys() {
        let report = parse_status_report(REPORT);
        let shards = shard_properties(&report);

        assert_eq!(shards.len(), 2);
        assert_eq!(shards[0].name, "shard01");
        assert_eq!(shards[0].host.as_deref(), Some("s1/h1:27018"));
        assert_eq!(
            serde_json::to_value(&shards[0].keys).unwrap(),
            json!({"app.users": {"uid": 1}})
        );
        assert_eq!(shards[1].name, "shard02");
        assert!(shards[1].keys.is_empty());
    }

    #[test]
    fn test_find_shard() {
        let report = parse_status_report(REPORT);

        let shard = find_shard(&report, "shard02").unwrap();
        assert_eq!(shard.host.as_deref(), Some("s2/h2:27018"));

        assert!(find_shard(&report, "shard03").is_none());
    }

    #[test]
    fn test_empty_report_has_no_shards() {
        assert!(shard_properties(&StatusReport::default()).is_empty());
    }
}
