//! Reference Tables - Static Compatibility Data
//!
//! Built once, never mutated. Every lookup is total: an unknown key is
//! simply "not a member".

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

use crate::ENGINE_VERSION;

/// Prefixes accepted by the binding-style check.
pub const BINDING_STYLE_PREFIXES: [&str; 2] = ["Limp", "Cased"];

pub const DEFAULT_MAX_PAGE_EXTENT: u32 = 1040;

#[derive(Debug, Error)]
pub enum TablesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected exactly 2 binding synonym pairs, found {0}")]
    SynonymCount(usize),

    #[error("Binding label '{0}' appears in more than one synonym pair")]
    DuplicateSynonym(String),

    #[error("Paper weight '{grammage}' has no {set} entries")]
    EmptySet { grammage: String, set: &'static str },

    #[error("Paper weight '{grammage}' allows binding '{binding}' which is not a canonical binding")]
    UnknownBinding { grammage: String, binding: String },

    #[error("Paper weight '{grammage}' has malformed trim size '{dimension}'")]
    MalformedDimension { grammage: String, dimension: String },

    #[error("No paper weights configured")]
    NoPaperWeights,

    #[error("Maximum page extent must be greater than zero")]
    ZeroPageExtent,

    #[error("Tables require engine >= {0}, current is {1}")]
    EngineVersionMismatch(String, String),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),
}

/// One declared/canonical binding pair, e.g. Hardback / Cased.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BindingSynonym {
    pub declared: String,
    pub canonical: String,
}

impl BindingSynonym {
    fn new(declared: &str, canonical: &str) -> Self {
        Self {
            declared: declared.to_string(),
            canonical: canonical.to_string(),
        }
    }
}

/// Compatibility record for a single grammage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaperWeight {
    pub dimensions: BTreeSet<String>,
    pub colours: BTreeSet<String>,
    pub bindings: BTreeSet<String>,
}

impl PaperWeight {
    fn from_lists(dimensions: &[&str], colours: &[&str], bindings: &[&str]) -> Self {
        let collect = |items: &[&str]| -> BTreeSet<String> {
            items.iter().map(|s| s.to_string()).collect()
        };
        Self {
            dimensions: collect(dimensions),
            colours: collect(colours),
            bindings: collect(bindings),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTables {
    #[serde(default = "default_engine_min_version")]
    pub engine_min_version: String,
    pub binding_synonyms: Vec<BindingSynonym>,
    pub paper_weights: BTreeMap<String, PaperWeight>,
    pub valid_production_classes: BTreeSet<String>,
    pub valid_treatments: BTreeSet<String>,
    #[serde(default = "default_max_page_extent")]
    pub max_page_extent: u32,
}

fn default_engine_min_version() -> String {
    crate::MIN_TABLES_ENGINE_VERSION.to_string()
}

fn default_max_page_extent() -> u32 {
    DEFAULT_MAX_PAGE_EXTENT
}

impl ReferenceTables {
    /// The built-in production tables.
    pub fn builtin() -> Self {
        let mut paper_weights = BTreeMap::new();
        paper_weights.insert(
            "80gsm/50lb".to_string(),
            PaperWeight::from_lists(
                &[
                    "123x186", "127x203", "129x198", "129x216", "138x216", "140x216",
                    "148x210", "152x229", "152x212", "156x234", "165x235", "169x244",
                    "170x240", "171x246", "172x216", "172x210", "174x246", "178x254",
                    "189x246", "191x235", "204x254", "210x280", "216x279", "210x297",
                ],
                &["1"],
                &["Cased", "Limp"],
            ),
        );
        paper_weights.insert(
            "90gsm/60lb".to_string(),
            PaperWeight::from_lists(
                &["152x229", "156x234", "174x246", "178x254"],
                &["4", "Scattercolor", "4 or Scattercolour"],
                &["Cased", "Limp"],
            ),
        );

        Self {
            engine_min_version: default_engine_min_version(),
            binding_synonyms: vec![
                BindingSynonym::new("Hardback", "Cased"),
                BindingSynonym::new("Paperback", "Limp"),
            ],
            paper_weights,
            valid_production_classes: ["Standard", "Premium"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            valid_treatments: ["Gloss Laminate", "Matt Laminate"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_page_extent: DEFAULT_MAX_PAGE_EXTENT,
        }
    }

    /// Process-wide built-in tables, initialized on first use.
    pub fn shared() -> Arc<ReferenceTables> {
        static SHARED: OnceLock<Arc<ReferenceTables>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(ReferenceTables::builtin()))
            .clone()
    }

    /// Load tables from a JSON file. The result has already passed `check`.
    pub fn load_from_path(path: &Path) -> Result<Self, TablesError> {
        let content = fs::read_to_string(path)?;
        let tables: ReferenceTables = serde_json::from_str(&content)?;
        tables.check_engine_version()?;
        tables.check()?;
        log::debug!(
            "loaded reference tables from {} ({} paper weights)",
            path.display(),
            tables.paper_weights.len()
        );
        Ok(tables)
    }

    fn check_engine_version(&self) -> Result<(), TablesError> {
        let engine = semver::Version::parse(ENGINE_VERSION)
            .map_err(|_| TablesError::InvalidVersion(ENGINE_VERSION.to_string()))?;
        let min = semver::Version::parse(&self.engine_min_version)
            .map_err(|_| TablesError::InvalidVersion(self.engine_min_version.clone()))?;
        if engine < min {
            return Err(TablesError::EngineVersionMismatch(
                self.engine_min_version.clone(),
                ENGINE_VERSION.to_string(),
            ));
        }
        Ok(())
    }

    /// Structural checks. A failure here is a configuration bug, not bad input.
    pub fn check(&self) -> Result<(), TablesError> {
        if self.binding_synonyms.len() != 2 {
            return Err(TablesError::SynonymCount(self.binding_synonyms.len()));
        }
        let mut seen = HashSet::new();
        for pair in &self.binding_synonyms {
            for label in [&pair.declared, &pair.canonical] {
                if !seen.insert(label.as_str()) {
                    return Err(TablesError::DuplicateSynonym(label.clone()));
                }
            }
        }

        if self.paper_weights.is_empty() {
            return Err(TablesError::NoPaperWeights);
        }

        for (grammage, weight) in &self.paper_weights {
            for (set, entries) in [
                ("dimension", &weight.dimensions),
                ("colour", &weight.colours),
                ("binding", &weight.bindings),
            ] {
                if entries.is_empty() {
                    return Err(TablesError::EmptySet {
                        grammage: grammage.clone(),
                        set,
                    });
                }
            }
            for binding in &weight.bindings {
                if !self.binding_synonyms.iter().any(|p| &p.canonical == binding) {
                    return Err(TablesError::UnknownBinding {
                        grammage: grammage.clone(),
                        binding: binding.clone(),
                    });
                }
            }
            for dimension in &weight.dimensions {
                if !is_dimension_key(dimension) {
                    return Err(TablesError::MalformedDimension {
                        grammage: grammage.clone(),
                        dimension: dimension.clone(),
                    });
                }
            }
        }

        if self.max_page_extent == 0 {
            return Err(TablesError::ZeroPageExtent);
        }

        Ok(())
    }

    /// Map a declared binding label to its canonical name. Canonical names map
    /// to themselves; unknown labels are returned unchanged.
    pub fn canonicalize<'a>(&'a self, label: &'a str) -> &'a str {
        self.binding_synonyms
            .iter()
            .find(|p| p.declared == label || p.canonical == label)
            .map(|p| p.canonical.as_str())
            .unwrap_or(label)
    }

    /// The other half of a synonym pair, looked up from either side.
    pub fn paired(&self, label: &str) -> Option<&str> {
        self.binding_synonyms.iter().find_map(|p| {
            if p.declared == label {
                Some(p.canonical.as_str())
            } else if p.canonical == label {
                Some(p.declared.as_str())
            } else {
                None
            }
        })
    }

    pub fn paper_weight(&self, grammage: Option<&str>) -> Option<&PaperWeight> {
        grammage.and_then(|g| self.paper_weights.get(g))
    }

    pub fn is_known_grammage(&self, grammage: Option<&str>) -> bool {
        self.paper_weight(grammage).is_some()
    }

    pub fn allows_binding(&self, grammage: Option<&str>, binding: &str) -> bool {
        self.paper_weight(grammage)
            .map_or(false, |w| w.bindings.contains(binding))
    }

    pub fn allows_dimension(&self, grammage: Option<&str>, dimension: &str) -> bool {
        self.paper_weight(grammage)
            .map_or(false, |w| w.dimensions.contains(dimension))
    }

    pub fn allows_colour(&self, grammage: Option<&str>, colour: Option<&str>) -> bool {
        match (self.paper_weight(grammage), colour) {
            (Some(w), Some(c)) => w.colours.contains(c),
            _ => false,
        }
    }

    pub fn is_valid_production_class(&self, class: Option<&str>) -> bool {
        class.map_or(false, |c| self.valid_production_classes.contains(c))
    }

    pub fn is_valid_treatment(&self, treatment: Option<&str>) -> bool {
        treatment.map_or(false, |t| self.valid_treatments.contains(t))
    }
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self::builtin()
    }
}

fn is_dimension_key(key: &str) -> bool {
    match key.split_once('x') {
        Some((w, h)) => {
            !w.is_empty()
                && !h.is_empty()
                && w.bytes().all(|b| b.is_ascii_digit())
                && h.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_pass_check() {
        assert!(ReferenceTables::builtin().check().is_ok());
    }

    #[test]
    fn test_canonicalize() {
        let tables = ReferenceTables::builtin();
        assert_eq!(tables.canonicalize("Hardback"), "Cased");
        assert_eq!(tables.canonicalize("Paperback"), "Limp");
        assert_eq!(tables.canonicalize("Cased"), "Cased");
        assert_eq!(tables.canonicalize("Spiral"), "Spiral");
    }

    #[test]
    fn test_paired_is_bidirectional() {
        let tables = ReferenceTables::builtin();
        assert_eq!(tables.paired("Hardback"), Some("Cased"));
        assert_eq!(tables.paired("Cased"), Some("Hardback"));
        assert_eq!(tables.paired("Limp"), Some("Paperback"));
        assert_eq!(tables.paired("Wire-O"), None);
    }

    #[test]
    fn test_lookups_against_unknown_grammage_are_false() {
        let tables = ReferenceTables::builtin();
        assert!(!tables.is_known_grammage(Some("999gsm")));
        assert!(!tables.is_known_grammage(None));
        assert!(!tables.allows_binding(Some("999gsm"), "Cased"));
        assert!(!tables.allows_dimension(None, "210x297"));
        assert!(!tables.allows_colour(Some("80gsm/50lb"), None));
    }

    #[test]
    fn test_check_rejects_non_canonical_binding() {
        let mut tables = ReferenceTables::builtin();
        tables
            .paper_weights
            .get_mut("80gsm/50lb")
            .unwrap()
            .bindings
            .insert("Hardback".to_string());
        assert!(matches!(
            tables.check(),
            Err(TablesError::UnknownBinding { .. })
        ));
    }

    #[test]
    fn test_check_rejects_malformed_dimension() {
        let mut tables = ReferenceTables::builtin();
        tables
            .paper_weights
            .get_mut("90gsm/60lb")
            .unwrap()
            .dimensions
            .insert("152 x 229".to_string());
        assert!(matches!(
            tables.check(),
            Err(TablesError::MalformedDimension { .. })
        ));
    }

    #[test]
    fn test_check_rejects_third_synonym_pair() {
        let mut tables = ReferenceTables::builtin();
        tables.binding_synonyms.push(BindingSynonym::new("Spiral", "Wiro"));
        assert!(matches!(tables.check(), Err(TablesError::SynonymCount(3))));
    }

    #[test]
    fn test_check_rejects_zero_page_extent() {
        let mut tables = ReferenceTables::builtin();
        tables.max_page_extent = 0;
        assert!(matches!(tables.check(), Err(TablesError::ZeroPageExtent)));
    }

    #[test]
    fn test_load_from_path_round_trips_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.json");
        let json = serde_json::to_string_pretty(&ReferenceTables::builtin()).unwrap();
        fs::write(&path, json).unwrap();

        let loaded = ReferenceTables::load_from_path(&path).unwrap();
        assert_eq!(loaded, ReferenceTables::builtin());
    }

    #[test]
    fn test_load_from_path_rejects_future_engine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.json");
        let mut tables = ReferenceTables::builtin();
        tables.engine_min_version = "99.0.0".to_string();
        fs::write(&path, serde_json::to_string(&tables).unwrap()).unwrap();

        assert!(matches!(
            ReferenceTables::load_from_path(&path),
            Err(TablesError::EngineVersionMismatch(..))
        ));
    }
}
