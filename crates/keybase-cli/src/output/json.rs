//! JSON output for key records.

use keybase_core::{KeyRecord, PublicKey};

/// Convert a record to JSON for output. Never includes key material beyond
/// the public key.
pub fn record_json(record: &KeyRecord) -> serde_json::Value {
    let mut value = serde_json::json!({
        "name": record.name(),
        "type": record.key_type().as_str(),
        "algo": record.algo().map(|a| a.as_str()),
        "address": record.address().to_string(),
        "public_key": hex::encode(record.public_key().to_bytes()),
    });
    if let Some(path) = record.path() {
        value["path"] = serde_json::Value::String(path.to_string());
    }
    if let PublicKey::Multisig(multi) = record.public_key() {
        value["threshold"] = serde_json::json!(multi.threshold());
        value["members"] = multi
            .keys()
            .iter()
            .map(|key| serde_json::Value::String(key.address().to_string()))
            .collect();
    }
    value
}

pub fn records_json(records: &[KeyRecord]) -> Vec<serde_json::Value> {
    records.iter().map(record_json).collect()
}
