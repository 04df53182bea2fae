use serde_json::Value;
use std::collections::BTreeMap;

use super::DatabaseEntry;

/// Shard key fields and their direction or type, e.g. `{"uid": 1}` or
/// `{"_id": "hashed"}`. `null` for a collection listed without one.
pub type ShardKeySpec = Value;

/// Collect the shard key of every collection listed under database entries
/// whose `_id` equals `shard_id`.
///
/// Returns an empty map when nothing matches. A collection whose record has
/// no `shardkey` is still listed, with a `null` key.
pub fn extract_shard_keys(
    databases: &[DatabaseEntry],
    shard_id: &str,
) -> BTreeMap<String, ShardKeySpec> {
    let mut keys = BTreeMap::new();

    for database in databases.iter().filter(|db| db.id() == Some(shard_id)) {
        for record in database.collections() {
            let Some(record) = record.as_object() else {
                tracing::trace!("Skipping non-object collection record: {}", record);
                continue;
            };

            for (collection, detail) in record {
                let spec = detail.get("shardkey").cloned().unwrap_or_else(|| {
                    tracing::trace!(
                        "Collection '{}' of '{}' has no shard key",
                        collection,
                        shard_id
                    );
                    Value::Null
                });
                keys.insert(collection.clone(), spec);
            }
        }
    }

    keys
}
