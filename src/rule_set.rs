//! Rule Sets - versioned step lists
//!
//! A rule set is data: which steps run, in what order, which fields are
//! required, and whether the engine stops at the first failure.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::record::FieldName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    File,
    RequiredFields,
    ProductionClass,
    PaperWeight,
    Binding,
    Dimensions,
    Colour,
    BindingStyle,
    Treatment,
    PageExtent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    RunToCompletion,
    /// Historic behaviour; later steps are skipped after a failure.
    StopOnFirstFailure,
}

/// How the declared version type is turned into a binding name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingLookup {
    /// Swap to the other half of the synonym pair, in either direction.
    /// `Cased` becomes `Hardback` and is then rejected.
    #[default]
    Paired,
    /// Declared labels map to canonical names; canonical names map to themselves.
    CanonicalFixed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSetRevision {
    /// Format, paper, binding and colour only.
    Initial,
    /// Adds production class.
    Classified,
    #[default]
    Complete,
}

impl RuleSetRevision {
    pub const ALL: [RuleSetRevision; 3] = [
        RuleSetRevision::Initial,
        RuleSetRevision::Classified,
        RuleSetRevision::Complete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleSetRevision::Initial => "initial",
            RuleSetRevision::Classified => "classified",
            RuleSetRevision::Complete => "complete",
        }
    }
}

impl fmt::Display for RuleSetRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleSetRevision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "initial" => Ok(RuleSetRevision::Initial),
            "classified" => Ok(RuleSetRevision::Classified),
            "complete" => Ok(RuleSetRevision::Complete),
            _ => Err(format!("Unknown rule set: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    pub revision: RuleSetRevision,
    pub steps: Vec<StepId>,
    pub required_fields: Vec<FieldName>,
    #[serde(default)]
    pub execution: ExecutionMode,
    #[serde(default)]
    pub binding_lookup: BindingLookup,
}

impl RuleSet {
    pub fn revision(revision: RuleSetRevision) -> Self {
        use crate::record::FieldName as F;
        use crate::rule_set::StepId as S;

        let mut steps = vec![S::File, S::RequiredFields];
        let mut required_fields = vec![F::VersionType, F::Width, F::Height, F::Grammage, F::Colour];

        if revision != RuleSetRevision::Initial {
            steps.push(S::ProductionClass);
            required_fields.push(F::ProductionClass);
        }
        steps.extend([S::PaperWeight, S::Binding, S::Dimensions, S::Colour]);

        if revision == RuleSetRevision::Complete {
            steps.extend([S::BindingStyle, S::Treatment, S::PageExtent]);
            required_fields.extend([F::Treatment, F::PageExtent, F::BindingStyle]);
        }

        let execution = match revision {
            RuleSetRevision::Initial => ExecutionMode::StopOnFirstFailure,
            _ => ExecutionMode::RunToCompletion,
        };

        Self {
            revision,
            steps,
            required_fields,
            execution,
            binding_lookup: BindingLookup::default(),
        }
    }

    pub fn with_binding_lookup(mut self, lookup: BindingLookup) -> Self {
        self.binding_lookup = lookup;
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::revision(RuleSetRevision::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_step_order() {
        let rs = RuleSet::default();
        assert_eq!(
            rs.steps,
            vec![
                StepId::File,
                StepId::RequiredFields,
                StepId::ProductionClass,
                StepId::PaperWeight,
                StepId::Binding,
                StepId::Dimensions,
                StepId::Colour,
                StepId::BindingStyle,
                StepId::Treatment,
                StepId::PageExtent,
            ]
        );
        assert_eq!(rs.required_fields.len(), 9);
        assert_eq!(rs.execution, ExecutionMode::RunToCompletion);
        assert_eq!(rs.binding_lookup, BindingLookup::Paired);
    }

    #[test]
    fn test_binding_lookup_defaults_when_absent_from_json() {
        let json = r#"{"revision": "complete", "steps": ["binding"], "requiredFields": []}"#;
        let rs: RuleSet = serde_json::from_str(json).unwrap();
        assert_eq!(rs.binding_lookup, BindingLookup::Paired);
        assert_eq!(
            RuleSet::default()
                .with_binding_lookup(BindingLookup::CanonicalFixed)
                .binding_lookup,
            BindingLookup::CanonicalFixed
        );
    }

    #[test]
    fn test_initial_short_circuits() {
        let rs = RuleSet::revision(RuleSetRevision::Initial);
        assert_eq!(rs.len(), 6);
        assert_eq!(rs.execution, ExecutionMode::StopOnFirstFailure);
        assert!(!rs.steps.contains(&StepId::ProductionClass));
    }

    #[test]
    fn test_classified_adds_production_class() {
        let rs = RuleSet::revision(RuleSetRevision::Classified);
        assert_eq!(rs.steps[2], StepId::ProductionClass);
        assert!(rs.required_fields.contains(&FieldName::ProductionClass));
        assert!(!rs.required_fields.contains(&FieldName::Treatment));
    }

    #[test]
    fn test_revision_from_str() {
        assert_eq!(
            "Complete".parse::<RuleSetRevision>().unwrap(),
            RuleSetRevision::Complete
        );
        assert!("v4".parse::<RuleSetRevision>().is_err());
    }
}
