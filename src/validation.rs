//! Validation Engine - Ordered Step Sequence
//!
//! Steps read the field record and the reference tables and each produce
//! exactly one result. Missing data is a failed result, never an error.

use serde::{Deserialize, Serialize};
use std::num::IntErrorKind;
use std::sync::Arc;

use crate::record::{FieldName, FieldPresence, FieldRecord};
use crate::rule_set::{BindingLookup, ExecutionMode, RuleSet, StepId};
use crate::tables::{ReferenceTables, TablesError, BINDING_STYLE_PREFIXES};

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static VALIDATE_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_validate_call_count() -> u32 {
    VALIDATE_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_validate_call_count() {
    VALIDATE_CALL_COUNT.store(0, Ordering::SeqCst);
}

const ABSENT: &str = "(none)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub test: String,
    pub passed: bool,
    pub message: String,
}

impl ValidationResult {
    pub fn new(test: impl Into<String>, passed: bool, message: impl Into<String>) -> Self {
        Self {
            test: test.into(),
            passed,
            message: message.into(),
        }
    }

    pub fn pass(test: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(test, true, message)
    }

    pub fn fail(test: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(test, false, message)
    }
}

/// A document fails overall iff any result failed.
pub fn has_failures(results: &[ValidationResult]) -> bool {
    results.iter().any(|r| !r.passed)
}

/// Everything a step may read.
pub struct StepContext<'a> {
    pub record: &'a FieldRecord,
    pub tables: &'a ReferenceTables,
    pub required_fields: &'a [FieldName],
    pub binding_lookup: BindingLookup,
}

impl<'a> StepContext<'a> {
    fn grammage(&self) -> Option<&'a str> {
        self.record.grammage.as_deref()
    }
}

/// Validation step trait - one result per invocation
pub trait ValidationStep: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, ctx: &StepContext<'_>) -> ValidationResult;
}

fn shown(value: Option<&str>) -> &str {
    value.unwrap_or(ABSENT)
}

fn join(items: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    items
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// --- Concrete Steps ---

pub struct FileMarker;

impl ValidationStep for FileMarker {
    fn name(&self) -> &'static str { "File" }

    fn check(&self, ctx: &StepContext<'_>) -> ValidationResult {
        ValidationResult::pass(
            self.name(),
            format!("Processing: {}", shown(ctx.record.source_name.as_deref())),
        )
    }
}

pub struct RequiredFieldsStep;

impl ValidationStep for RequiredFieldsStep {
    fn name(&self) -> &'static str { "Required Fields" }

    fn check(&self, ctx: &StepContext<'_>) -> ValidationResult {
        let problems: Vec<String> = ctx
            .required_fields
            .iter()
            .filter_map(|&field| match ctx.record.presence(field) {
                FieldPresence::Present => None,
                FieldPresence::Missing => Some(format!("{} (missing)", field)),
                FieldPresence::Empty => Some(format!("{} (empty)", field)),
            })
            .collect();

        if problems.is_empty() {
            ValidationResult::pass(self.name(), "All required fields present")
        } else {
            ValidationResult::fail(
                self.name(),
                format!("Missing or empty fields: {}", problems.join(", ")),
            )
        }
    }
}

pub struct ProductionClassStep;

impl ValidationStep for ProductionClassStep {
    fn name(&self) -> &'static str { "Production Class" }

    fn check(&self, ctx: &StepContext<'_>) -> ValidationResult {
        let class = ctx.record.production_class.as_deref();
        if ctx.tables.is_valid_production_class(class) {
            ValidationResult::pass(self.name(), format!("Valid production class: {}", shown(class)))
        } else {
            ValidationResult::fail(
                self.name(),
                format!(
                    "Invalid production class: {} (expected one of: {})",
                    shown(class),
                    join(&ctx.tables.valid_production_classes)
                ),
            )
        }
    }
}

pub struct PaperWeightStep;

impl ValidationStep for PaperWeightStep {
    fn name(&self) -> &'static str { "Paper Weight" }

    fn check(&self, ctx: &StepContext<'_>) -> ValidationResult {
        let grammage = ctx.grammage();
        if ctx.tables.is_known_grammage(grammage) {
            ValidationResult::pass(self.name(), format!("Valid paper weight: {}", shown(grammage)))
        } else {
            ValidationResult::fail(
                self.name(),
                format!("Invalid paper weight: {}", shown(grammage)),
            )
        }
    }
}

pub struct BindingStep;

impl ValidationStep for BindingStep {
    fn name(&self) -> &'static str { "Binding Type" }

    fn check(&self, ctx: &StepContext<'_>) -> ValidationResult {
        let raw = ctx.record.version_type.as_deref().unwrap_or("").trim();
        let binding = match ctx.binding_lookup {
            BindingLookup::Paired => ctx.tables.paired(raw).unwrap_or(raw),
            BindingLookup::CanonicalFixed => ctx.tables.canonicalize(raw),
        }
        .trim();
        let grammage = ctx.grammage();

        if ctx.tables.allows_binding(grammage, binding) {
            ValidationResult::pass(self.name(), format!("Binding: {}", binding))
        } else {
            ValidationResult::fail(
                self.name(),
                format!("Binding: {} is not available for {}", binding, shown(grammage)),
            )
        }
    }
}

pub struct DimensionsStep;

impl ValidationStep for DimensionsStep {
    fn name(&self) -> &'static str { "Size Combination" }

    fn check(&self, ctx: &StepContext<'_>) -> ValidationResult {
        // Literal key: no trimming, no unit handling, width first.
        let dimension = format!(
            "{}x{}",
            ctx.record.width.as_deref().unwrap_or(""),
            ctx.record.height.as_deref().unwrap_or("")
        );

        if ctx.tables.allows_dimension(ctx.grammage(), &dimension) {
            ValidationResult::pass(
                self.name(),
                format!("Valid trim size combination: {}mm", dimension),
            )
        } else {
            ValidationResult::fail(
                self.name(),
                format!("Invalid trim size combination: {}mm", dimension),
            )
        }
    }
}

pub struct ColourStep;

impl ValidationStep for ColourStep {
    fn name(&self) -> &'static str { "Color Compatibility" }

    fn check(&self, ctx: &StepContext<'_>) -> ValidationResult {
        let colour = ctx.record.colour.as_deref();
        let grammage = ctx.grammage();

        if ctx.tables.allows_colour(grammage, colour) {
            ValidationResult::pass(self.name(), format!("Valid color: {}", shown(colour)))
        } else {
            ValidationResult::fail(
                self.name(),
                format!("Invalid color {} for {}", shown(colour), shown(grammage)),
            )
        }
    }
}

pub struct BindingStyleStep;

impl ValidationStep for BindingStyleStep {
    fn name(&self) -> &'static str { "Binding Style" }

    fn check(&self, ctx: &StepContext<'_>) -> ValidationResult {
        let style = ctx.record.binding_style.as_deref().map(str::trim);
        let matches = style.map_or(false, |s| {
            BINDING_STYLE_PREFIXES.iter().any(|prefix| s.starts_with(prefix))
        });

        if matches {
            ValidationResult::pass(self.name(), format!("Valid binding style: {}", shown(style)))
        } else {
            ValidationResult::fail(
                self.name(),
                format!(
                    "Invalid binding style: {} (must start with {})",
                    shown(style),
                    BINDING_STYLE_PREFIXES.join(" or ")
                ),
            )
        }
    }
}

pub struct TreatmentStep;

impl ValidationStep for TreatmentStep {
    fn name(&self) -> &'static str { "Treatment" }

    fn check(&self, ctx: &StepContext<'_>) -> ValidationResult {
        let treatment = ctx.record.treatment.as_deref();
        if ctx.tables.is_valid_treatment(treatment) {
            ValidationResult::pass(self.name(), format!("Valid treatment: {}", shown(treatment)))
        } else {
            ValidationResult::fail(
                self.name(),
                format!(
                    "Invalid treatment: {} (expected one of: {})",
                    shown(treatment),
                    join(&ctx.tables.valid_treatments)
                ),
            )
        }
    }
}

pub struct PageExtentStep;

impl ValidationStep for PageExtentStep {
    fn name(&self) -> &'static str { "Page Extent" }

    fn check(&self, ctx: &StepContext<'_>) -> ValidationResult {
        let max = ctx.tables.max_page_extent;
        let raw = match ctx.record.page_extent.as_deref().map(str::trim) {
            None | Some("") => {
                return ValidationResult::fail(self.name(), "Page extent is missing");
            }
            Some(raw) => raw,
        };

        match raw.parse::<i64>() {
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => ValidationResult::fail(
                self.name(),
                format!("Page extent {} exceeds maximum of {}", raw, max),
            ),
            Err(e) if *e.kind() == IntErrorKind::NegOverflow => ValidationResult::fail(
                self.name(),
                format!("Page extent must be greater than zero: {}", raw),
            ),
            Err(_) => ValidationResult::fail(
                self.name(),
                format!("Page extent is not a number: {}", raw),
            ),
            Ok(pages) if pages <= 0 => ValidationResult::fail(
                self.name(),
                format!("Page extent must be greater than zero: {}", pages),
            ),
            Ok(pages) if pages > i64::from(max) => ValidationResult::fail(
                self.name(),
                format!("Page extent {} exceeds maximum of {}", pages, max),
            ),
            Ok(pages) => {
                ValidationResult::pass(self.name(), format!("Valid page extent: {}", pages))
            }
        }
    }
}

impl StepId {
    pub fn step(self) -> Box<dyn ValidationStep> {
        match self {
            StepId::File => Box::new(FileMarker),
            StepId::RequiredFields => Box::new(RequiredFieldsStep),
            StepId::ProductionClass => Box::new(ProductionClassStep),
            StepId::PaperWeight => Box::new(PaperWeightStep),
            StepId::Binding => Box::new(BindingStep),
            StepId::Dimensions => Box::new(DimensionsStep),
            StepId::Colour => Box::new(ColourStep),
            StepId::BindingStyle => Box::new(BindingStyleStep),
            StepId::Treatment => Box::new(TreatmentStep),
            StepId::PageExtent => Box::new(PageExtentStep),
        }
    }
}

/// Validator runs a rule set's steps against one record at a time
pub struct Validator {
    tables: Arc<ReferenceTables>,
    rule_set: RuleSet,
    steps: Vec<Box<dyn ValidationStep>>,
}

impl Validator {
    /// Fails only when the tables themselves are structurally broken.
    pub fn new(tables: Arc<ReferenceTables>, rule_set: RuleSet) -> Result<Self, TablesError> {
        tables.check()?;
        let steps = rule_set.steps.iter().map(|id| id.step()).collect();
        Ok(Self {
            tables,
            rule_set,
            steps,
        })
    }

    /// Built-in tables with the complete rule set.
    pub fn standard() -> Self {
        let rule_set = RuleSet::default();
        let steps = rule_set.steps.iter().map(|id| id.step()).collect();
        Self {
            tables: ReferenceTables::shared(),
            rule_set,
            steps,
        }
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    pub fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }

    pub fn validate(&self, record: &FieldRecord) -> Vec<ValidationResult> {
        #[cfg(feature = "test-hooks")]
        VALIDATE_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        let ctx = StepContext {
            record,
            tables: &self.tables,
            required_fields: &self.rule_set.required_fields,
            binding_lookup: self.rule_set.binding_lookup,
        };

        let mut results = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let result = step.check(&ctx);
            log::trace!("{}: {} ({})", step.name(), result.passed, result.message);
            let stop = !result.passed
                && self.rule_set.execution == ExecutionMode::StopOnFirstFailure;
            results.push(result);
            if stop {
                break;
            }
        }
        results
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::standard()
    }
}
