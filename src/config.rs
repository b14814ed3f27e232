//! Validator Configuration
//!
//! Optional JSON file selecting the rule set, a tables file, and the element
//! paths used for extraction. Every key has a default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::extract::FieldPaths;
use crate::rule_set::{BindingLookup, RuleSet, RuleSetRevision};
use crate::tables::{ReferenceTables, TablesError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reference tables: {0}")]
    Tables(#[from] TablesError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidatorConfig {
    pub rule_set: RuleSetRevision,
    pub binding_lookup: BindingLookup,
    /// Built-in tables are used when unset.
    pub tables_path: Option<PathBuf>,
    pub field_paths: FieldPaths,
}

impl ValidatorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let mut config: ValidatorConfig = serde_json::from_str(&content)?;

        // Relative tables paths resolve against the config file's directory.
        if let (Some(tables), Some(dir)) = (&config.tables_path, path.parent()) {
            if tables.is_relative() {
                config.tables_path = Some(dir.join(tables));
            }
        }
        Ok(config)
    }

    pub fn tables(&self) -> Result<Arc<ReferenceTables>, ConfigError> {
        match &self.tables_path {
            Some(path) => Ok(Arc::new(ReferenceTables::load_from_path(path)?)),
            None => Ok(ReferenceTables::shared()),
        }
    }

    pub fn rule_set(&self) -> RuleSet {
        RuleSet::revision(self.rule_set).with_binding_lookup(self.binding_lookup)
    }
}
