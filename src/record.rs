//! Field Record - extracted specification values
//!
//! Every field is optional. Absence is a reportable condition, never a fault.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    VersionType,
    Width,
    Height,
    Grammage,
    Colour,
    ProductionClass,
    Treatment,
    PageExtent,
    BindingStyle,
    Generator,
    SourceName,
}

impl FieldName {
    pub fn label(self) -> &'static str {
        match self {
            FieldName::VersionType => "versionType",
            FieldName::Width => "width",
            FieldName::Height => "height",
            FieldName::Grammage => "grammage",
            FieldName::Colour => "colour",
            FieldName::ProductionClass => "productionClass",
            FieldName::Treatment => "treatment",
            FieldName::PageExtent => "pageExtent",
            FieldName::BindingStyle => "bindingStyle",
            FieldName::Generator => "generator",
            FieldName::SourceName => "sourceName",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPresence {
    Present,
    Missing,
    /// Present but blank after trimming.
    Empty,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldRecord {
    pub version_type: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub grammage: Option<String>,
    pub colour: Option<String>,
    pub production_class: Option<String>,
    pub treatment: Option<String>,
    pub page_extent: Option<String>,
    pub binding_style: Option<String>,
    pub generator: Option<String>,
    pub source_name: Option<String>,
}

impl FieldRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, name: FieldName) -> Option<&str> {
        let value = match name {
            FieldName::VersionType => &self.version_type,
            FieldName::Width => &self.width,
            FieldName::Height => &self.height,
            FieldName::Grammage => &self.grammage,
            FieldName::Colour => &self.colour,
            FieldName::ProductionClass => &self.production_class,
            FieldName::Treatment => &self.treatment,
            FieldName::PageExtent => &self.page_extent,
            FieldName::BindingStyle => &self.binding_style,
            FieldName::Generator => &self.generator,
            FieldName::SourceName => &self.source_name,
        };
        value.as_deref()
    }

    pub fn set(&mut self, name: FieldName, value: Option<String>) {
        let slot = match name {
            FieldName::VersionType => &mut self.version_type,
            FieldName::Width => &mut self.width,
            FieldName::Height => &mut self.height,
            FieldName::Grammage => &mut self.grammage,
            FieldName::Colour => &mut self.colour,
            FieldName::ProductionClass => &mut self.production_class,
            FieldName::Treatment => &mut self.treatment,
            FieldName::PageExtent => &mut self.page_extent,
            FieldName::BindingStyle => &mut self.binding_style,
            FieldName::Generator => &mut self.generator,
            FieldName::SourceName => &mut self.source_name,
        };
        *slot = value;
    }

    /// Builder-style setter.
    pub fn with(mut self, name: FieldName, value: impl Into<String>) -> Self {
        self.set(name, Some(value.into()));
        self
    }

    pub fn presence(&self, name: FieldName) -> FieldPresence {
        match self.field(name) {
            None => FieldPresence::Missing,
            Some(v) if v.trim().is_empty() => FieldPresence::Empty,
            Some(_) => FieldPresence::Present,
        }
    }
}
