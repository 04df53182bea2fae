//! Library-level checks of the status report and the shard views built on it

mod common;

use common::STATUS_OUTPUT;
use shardctl::report::{find_shard, parse_status_report, shard_properties, VersionValue};

#[test]
fn test_sharding_version_values() {
    let report = parse_status_report(STATUS_OUTPUT);

    assert_eq!(report.sharding_version["_id"], VersionValue::Integer(1));
    assert_eq!(
        report.sharding_version["minCompatibleVersion"].as_i64(),
        Some(5)
    );
    assert!(report.sharding_version["clusterId"]
        .as_str()
        .is_some_and(|v| v.contains("5a0b6a4e2b1f1c0d9c1e2f3a")));
    assert_eq!(report.sharding_version.len(), 4);
}

#[test]
fn test_ignored_sections_do_not_leak() {
    let report = parse_status_report(STATUS_OUTPUT);

    assert_eq!(report.shards.len(), 2);
    assert!(report.shards.iter().all(|s| s.get("state").is_some()));
    let ids: Vec<_> = report.databases.iter().filter_map(|d| d.id()).collect();
    assert_eq!(ids, vec!["app", "shard01", "shard02"]);
}

#[test]
fn test_shard_properties_snapshot() {
    let report = parse_status_report(STATUS_OUTPUT);
    let shard = find_shard(&report, "shard01").unwrap();

    insta::assert_json_snapshot!(shard, @r###"
    {
      "name": "shard01",
      "host": "rs1/h1:27018,h2:27018",
      "keys": {
        "app.orders": {
          "region": 1,
          "ts": -1
        },
        "app.users": {
          "uid": 1
        }
      }
    }
    "###);
}

#[test]
fn test_every_shard_has_properties() {
    let report = parse_status_report(STATUS_OUTPUT);
    let properties = shard_properties(&report);

    let names: Vec<_> = properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["shard01", "shard02"]);
    assert_eq!(properties[1].keys.len(), 1);
    assert!(find_shard(&report, "shard03").is_none());
}
