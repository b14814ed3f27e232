//! PrintSpec Core - Product Specification Rule Engine
//!
//! # Ground Rules
//! 1. Tables Are Configuration (built once, never mutated)
//! 2. Every Step Reports (one result per configured step)
//! 3. Missing Data Is A Result, Not An Error
//! 4. Rule Sets Are Data
//! 5. Reports Are Reproducible

pub mod tables;
pub mod record;
pub mod rule_set;
pub mod validation;
pub mod extract;
pub mod hashing;
pub mod report;
pub mod config;
pub mod pipeline;

pub use tables::{ReferenceTables, PaperWeight, BindingSynonym, TablesError};
pub use record::{FieldRecord, FieldName, FieldPresence};
pub use rule_set::{RuleSet, RuleSetRevision, StepId, ExecutionMode, BindingLookup};
pub use validation::{ValidationResult, ValidationStep, Validator, has_failures};
pub use extract::{extract_fields, FieldPaths, ExtractError};
pub use report::{DocumentReport, BatchReport, BatchSummary};
pub use config::{ValidatorConfig, ConfigError};
pub use pipeline::{ValidationPipeline, PipelineError};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MIN_TABLES_ENGINE_VERSION: &str = "1.0.0";
