//! Validation Pipeline - Single Entry Point
//!
//! Document in, report out. Parse and read failures become a single failed
//! result; the engine is only invoked once a FieldRecord exists.

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{ConfigError, ValidatorConfig};
use crate::extract::{extract_fields, FieldPaths};
use crate::record::FieldRecord;
use crate::report::{BatchReport, DocumentReport};
use crate::tables::TablesError;
use crate::validation::{ValidationResult, Validator};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Reference tables: {0}")]
    Tables(#[from] TablesError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub struct ValidationPipeline {
    validator: Validator,
    paths: FieldPaths,
}

impl ValidationPipeline {
    pub fn new(validator: Validator, paths: FieldPaths) -> Self {
        Self { validator, paths }
    }

    pub fn from_config(config: &ValidatorConfig) -> Result<Self, PipelineError> {
        let validator = Validator::new(config.tables()?, config.rule_set())?;
        Ok(Self::new(validator, config.field_paths.clone()))
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Run the engine on an already extracted record.
    pub fn validate_record(&self, record: &FieldRecord) -> Vec<ValidationResult> {
        self.validator.validate(record)
    }

    pub fn validate_document(
        &self,
        xml: &str,
        source_name: &str,
    ) -> Result<DocumentReport, PipelineError> {
        let (generator, results) = match extract_fields(xml, source_name, &self.paths) {
            Ok(record) => {
                let results = self.validator.validate(&record);
                (record.generator, results)
            }
            Err(e) => {
                log::warn!("{}: {}", source_name, e);
                (None, vec![ValidationResult::fail("XML Format", e.to_string())])
            }
        };

        let report = DocumentReport::new(
            source_name,
            generator,
            results,
            self.validator.rule_set().revision,
        )?;
        log::debug!(
            "{}: {} ({} failed)",
            source_name,
            if report.passed() { "passed" } else { "failed" },
            report.failure_count()
        );
        Ok(report)
    }

    pub fn validate_file(&self, path: &Path) -> Result<DocumentReport, PipelineError> {
        let source_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match fs::read_to_string(path) {
            Ok(xml) => self.validate_document(&xml, &source_name),
            Err(e) => {
                log::warn!("{}: {}", path.display(), e);
                let results = vec![ValidationResult::fail(
                    "File Processing",
                    format!("Error reading file: {}", e),
                )];
                Ok(DocumentReport::new(
                    &source_name,
                    None,
                    results,
                    self.validator.rule_set().revision,
                )?)
            }
        }
    }

    /// Documents are independent; they run in parallel and keep input order.
    pub fn validate_batch(&self, files: &[PathBuf]) -> Result<BatchReport, PipelineError> {
        let documents = files
            .par_iter()
            .map(|path| self.validate_file(path))
            .collect::<Result<Vec<_>, _>>()?;

        let report = BatchReport::new(self.validator.rule_set().revision, documents)?;
        log::info!(
            "validated {} documents: {} passed, {} failed",
            report.summary.total,
            report.summary.passed,
            report.summary.failed
        );
        Ok(report)
    }
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::new(Validator::standard(), FieldPaths::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_document_yields_single_failure() {
        let report = ValidationPipeline::default()
            .validate_document("<product><format>", "broken.xml")
            .unwrap();
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].test, "XML Format");
        assert!(!report.passed());
    }

    #[test]
    fn test_unreadable_file_yields_single_failure() {
        let dir = tempfile::tempdir().unwrap();
        let report = ValidationPipeline::default()
            .validate_file(&dir.path().join("absent.xml"))
            .unwrap();
        assert_eq!(report.source_name, "absent.xml");
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].test, "File Processing");
    }

    #[test]
    fn test_generator_carried_to_report() {
        let xml = "<product><generator>Biblio</generator></product>";
        let report = ValidationPipeline::default()
            .validate_document(xml, "g.xml")
            .unwrap();
        assert_eq!(report.generator.as_deref(), Some("Biblio"));
        assert_eq!(report.results.len(), 10);
    }
}
