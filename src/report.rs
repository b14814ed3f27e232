//! Reporting - per-document reports, batch totals, CSV/text export

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::hashing::{compute_document_hash, compute_report_hash};
use crate::rule_set::RuleSetRevision;
use crate::validation::{has_failures, ValidationResult};
use crate::ENGINE_VERSION;

const UNKNOWN_GENERATOR: &str = "(unknown)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReport {
    pub source_name: String,
    pub isbn: String,
    #[serde(default)]
    pub generator: Option<String>,
    pub results: Vec<ValidationResult>,
    pub document_hash: String,
}

impl DocumentReport {
    pub fn new(
        source_name: &str,
        generator: Option<String>,
        results: Vec<ValidationResult>,
        rule_set: RuleSetRevision,
    ) -> Result<Self, serde_json::Error> {
        let document_hash = compute_document_hash(source_name, rule_set, &results, ENGINE_VERSION)?;
        Ok(Self {
            source_name: source_name.to_string(),
            isbn: extract_isbn(source_name).to_string(),
            generator,
            results,
            document_hash,
        })
    }

    pub fn passed(&self) -> bool {
        !has_failures(&self.results)
    }

    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }
}

/// A leading 13-digit ISBN starting 978, otherwise the name unchanged.
pub fn extract_isbn(source_name: &str) -> &str {
    let bytes = source_name.as_bytes();
    let is_isbn = bytes.len() >= 13
        && source_name.starts_with("978")
        && bytes[..13].iter().all(|b| b.is_ascii_digit());
    if is_isbn {
        &source_name[..13]
    } else {
        source_name
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_documents(documents: &[DocumentReport]) -> Self {
        let failed = documents.iter().filter(|d| !d.passed()).count();
        Self {
            total: documents.len(),
            passed: documents.len() - failed,
            failed,
        }
    }
}

#[derive(Serialize)]
struct HashedContent<'a> {
    engine_version: &'a str,
    rule_set: RuleSetRevision,
    documents: &'a [DocumentReport],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub id: String,
    pub generated_at: DateTime<Utc>,
    pub engine_version: String,
    pub rule_set: RuleSetRevision,
    pub documents: Vec<DocumentReport>,
    pub summary: BatchSummary,
    /// Covers engine version, rule set and documents; not id or timestamp.
    pub report_hash: String,
}

impl BatchReport {
    pub fn new(
        rule_set: RuleSetRevision,
        documents: Vec<DocumentReport>,
    ) -> Result<Self, serde_json::Error> {
        let report_hash = compute_report_hash(&HashedContent {
            engine_version: ENGINE_VERSION,
            rule_set,
            documents: &documents,
        })?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            rule_set,
            summary: BatchSummary::from_documents(&documents),
            documents,
            report_hash,
        })
    }

    pub fn all_passed(&self) -> bool {
        self.summary.failed == 0
    }

    /// Documents keyed by the generator named in their metadata.
    pub fn by_generator(&self) -> BTreeMap<&str, Vec<&DocumentReport>> {
        let mut groups: BTreeMap<&str, Vec<&DocumentReport>> = BTreeMap::new();
        for doc in &self.documents {
            let key = doc.generator.as_deref().unwrap_or(UNKNOWN_GENERATOR);
            groups.entry(key).or_default().push(doc);
        }
        groups
    }
}

fn csv_cell(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

fn csv_row(cells: &[&str]) -> String {
    cells.iter().map(|c| csv_cell(c)).collect::<Vec<_>>().join(",")
}

/// One row per check: ISBN, Test, Status, Message.
pub fn detailed_csv(documents: &[DocumentReport]) -> String {
    let mut rows = vec![csv_row(&["ISBN", "Test", "Status", "Message"])];
    for doc in documents {
        for result in &doc.results {
            let status = if result.passed { "Success" } else { "Error" };
            rows.push(csv_row(&[
                doc.isbn.as_str(),
                result.test.as_str(),
                status,
                result.message.as_str(),
            ]));
        }
    }
    rows.join("\n")
}

/// One row per document: ISBN, Status, Summary.
pub fn summary_csv(documents: &[DocumentReport]) -> String {
    let mut rows = vec![csv_row(&["ISBN", "Status", "Summary"])];
    for doc in documents {
        let (status, summary) = if doc.passed() {
            ("Passed", "All validations passed".to_string())
        } else {
            ("Failed", format!("Failed {} validations", doc.failure_count()))
        };
        rows.push(csv_row(&[doc.isbn.as_str(), status, summary.as_str()]));
    }
    rows.join("\n")
}

/// Plain-text report, documents grouped under the generator that produced them.
pub fn text_report(report: &BatchReport) -> String {
    let mut out = String::new();
    for (generator, documents) in report.by_generator() {
        out.push_str(&format!("== {} ==\n", generator));
        for doc in documents {
            let status = if doc.passed() { "PASSED" } else { "FAILED" };
            out.push_str(&format!("{}: {}\n", doc.isbn, status));
            for result in &doc.results {
                let mark = if result.passed { "PASS" } else { "FAIL" };
                out.push_str(&format!("  [{}] {}: {}\n", mark, result.test, result.message));
            }
            out.push('\n');
        }
    }
    out.push_str(&format!(
        "Summary: {} processed, {} passed, {} failed\n",
        report.summary.total, report.summary.passed, report.summary.failed
    ));
    out
}
