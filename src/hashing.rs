//! Report Fingerprints - SHA-256 over canonical JSON
//!
//! Two runs over the same inputs with the same tables and rule set must hash
//! identically, so an exported report can be re-checked later.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::rule_set::RuleSetRevision;
use crate::validation::ValidationResult;

pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Canonical JSON: object keys sorted at every depth, no whitespace.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v = serde_json::to_value(value)?;
    serde_json::to_string(&sorted(v))
}

fn sorted(v: Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sorted(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

/// document_hash = sha256(source_name:rule_set:canonical_results:engine_version)
pub fn compute_document_hash(
    source_name: &str,
    rule_set: RuleSetRevision,
    results: &[ValidationResult],
    engine_version: &str,
) -> Result<String, serde_json::Error> {
    let combined = format!(
        "{}:{}:{}:{}",
        source_name,
        rule_set,
        canonical_json(&results)?,
        engine_version
    );
    Ok(sha256_hex(combined.as_bytes()))
}

pub fn compute_report_hash<T: Serialize>(report: &T) -> Result<String, serde_json::Error> {
    Ok(sha256_hex(canonical_json(report)?.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_json_sorts_nested_keys() {
        let obj = json!({"z": 1, "a": {"y": true, "b": null}});
        assert_eq!(canonical_json(&obj).unwrap(), r#"{"a":{"b":null,"y":true},"z":1}"#);
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_document_hash_depends_on_results() {
        let ok = vec![ValidationResult::pass("Paper Weight", "Valid paper weight: 80gsm/50lb")];
        let bad = vec![ValidationResult::fail("Paper Weight", "Invalid paper weight: 999gsm")];

        let h1 = compute_document_hash("a.xml", RuleSetRevision::Complete, &ok, "1.0.0").unwrap();
        let h2 = compute_document_hash("a.xml", RuleSetRevision::Complete, &ok, "1.0.0").unwrap();
        let h3 = compute_document_hash("a.xml", RuleSetRevision::Complete, &bad, "1.0.0").unwrap();
        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
    }
}
