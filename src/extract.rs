//! Field Extraction - XML to FieldRecord
//!
//! Each field is located by a descendant selector: space separated element
//! names, where `"parts text grammage"` finds the first `grammage` element
//! nested (at any depth) inside `text`, itself inside `parts`.

use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::{FieldName, FieldRecord};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid XML format: {0}")]
    Malformed(#[from] roxmltree::Error),

    #[error("Unexpected root element: expected <{expected}>, found <{found}>")]
    UnexpectedRoot { expected: String, found: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldPaths {
    /// When set, documents with a different root element are rejected.
    pub root_element: Option<String>,
    pub version_type: String,
    pub width: String,
    pub height: String,
    pub grammage: String,
    pub colour: String,
    pub production_class: String,
    pub treatment: String,
    pub page_extent: String,
    pub binding_style: String,
    pub generator: String,
}

impl Default for FieldPaths {
    fn default() -> Self {
        Self {
            root_element: None,
            version_type: "version_type".to_string(),
            width: "format width".to_string(),
            height: "format height".to_string(),
            grammage: "parts text grammage".to_string(),
            colour: "parts text colour".to_string(),
            production_class: "production_class".to_string(),
            treatment: "parts cover treatment".to_string(),
            page_extent: "parts text page_extent".to_string(),
            binding_style: "binding_style".to_string(),
            generator: "generator".to_string(),
        }
    }
}

impl FieldPaths {
    fn selectors(&self) -> [(FieldName, &str); 10] {
        [
            (FieldName::VersionType, self.version_type.as_str()),
            (FieldName::Width, self.width.as_str()),
            (FieldName::Height, self.height.as_str()),
            (FieldName::Grammage, self.grammage.as_str()),
            (FieldName::Colour, self.colour.as_str()),
            (FieldName::ProductionClass, self.production_class.as_str()),
            (FieldName::Treatment, self.treatment.as_str()),
            (FieldName::PageExtent, self.page_extent.as_str()),
            (FieldName::BindingStyle, self.binding_style.as_str()),
            (FieldName::Generator, self.generator.as_str()),
        ]
    }
}

/// Parse `xml` and pull out every configured field.
pub fn extract_fields(
    xml: &str,
    source_name: &str,
    paths: &FieldPaths,
) -> Result<FieldRecord, ExtractError> {
    let doc = Document::parse(xml)?;

    if let Some(expected) = &paths.root_element {
        let found = doc.root_element().tag_name().name();
        if found != expected {
            return Err(ExtractError::UnexpectedRoot {
                expected: expected.clone(),
                found: found.to_string(),
            });
        }
    }

    let mut record = FieldRecord::new();
    for (field, selector) in paths.selectors() {
        record.set(field, select_text(&doc, selector));
    }
    record.source_name = Some(source_name.to_string());
    Ok(record)
}

/// Trimmed text content of the first element matching `selector`.
pub fn select_text(doc: &Document<'_>, selector: &str) -> Option<String> {
    let segments: Vec<&str> = selector.split_whitespace().collect();
    if segments.is_empty() {
        return None;
    }

    doc.descendants()
        .find(|node| node.is_element() && matches_selector(*node, &segments))
        .map(|node| text_content(node).trim().to_string())
}

fn matches_selector(node: Node<'_, '_>, segments: &[&str]) -> bool {
    let Some((last, outer)) = segments.split_last() else {
        return false;
    };
    if node.tag_name().name() != *last {
        return false;
    }

    // Innermost ancestor segment first; nearest matching ancestor wins.
    let mut remaining = outer.iter().rev().peekable();
    for ancestor in node.ancestors().skip(1).filter(|n| n.is_element()) {
        match remaining.peek() {
            Some(name) if ancestor.tag_name().name() == **name => {
                remaining.next();
            }
            Some(_) => {}
            None => break,
        }
    }
    remaining.peek().is_none()
}

fn text_content(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}
