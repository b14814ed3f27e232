//! Contract Invariant Tests
//!
//! These tests pin the engine's guarantees against the complete rule set.

use std::fs;
use std::sync::Arc;

use printspec_core::{
    has_failures, BindingLookup, FieldName, FieldRecord, ReferenceTables, RuleSet, RuleSetRevision,
    ValidationPipeline, ValidationResult, Validator,
};

fn valid_record() -> FieldRecord {
    FieldRecord::new()
        .with(FieldName::VersionType, "Hardback")
        .with(FieldName::Width, "210")
        .with(FieldName::Height, "297")
        .with(FieldName::Grammage, "80gsm/50lb")
        .with(FieldName::Colour, "1")
        .with(FieldName::ProductionClass, "Premium")
        .with(FieldName::Treatment, "Gloss Laminate")
        .with(FieldName::PageExtent, "500")
        .with(FieldName::BindingStyle, "Cased Hardback")
        .with(FieldName::SourceName, "9781234567897.xml")
}

fn result<'a>(results: &'a [ValidationResult], test: &str) -> &'a ValidationResult {
    results
        .iter()
        .find(|r| r.test == test)
        .unwrap_or_else(|| panic!("no result for {}", test))
}

fn validate(record: &FieldRecord) -> Vec<ValidationResult> {
    Validator::standard().validate(record)
}

#[test]
fn invariant_result_count_matches_rule_set() {
    let expected = RuleSet::default().len();
    let records = [
        valid_record(),
        FieldRecord::new(),
        valid_record().with(FieldName::Grammage, "999gsm"),
        valid_record().with(FieldName::PageExtent, "abc"),
    ];
    for record in &records {
        assert_eq!(validate(record).len(), expected);
    }
}

#[test]
fn invariant_run_to_completion_for_later_revisions() {
    for revision in [RuleSetRevision::Classified, RuleSetRevision::Complete] {
        let rule_set = RuleSet::revision(revision);
        let expected = rule_set.len();
        let validator = Validator::new(Arc::new(ReferenceTables::builtin()), rule_set).unwrap();
        assert_eq!(validator.validate(&FieldRecord::new()).len(), expected);
    }
}

#[test]
fn invariant_validate_is_idempotent() {
    let record = valid_record().with(FieldName::Colour, "4");
    let validator = Validator::standard();
    assert_eq!(validator.validate(&record), validator.validate(&record));
}

#[test]
fn invariant_valid_record_passes() {
    let results = validate(&valid_record());
    assert!(!has_failures(&results), "{:#?}", results);
}

#[test]
fn invariant_dimension_key_is_not_commutative() {
    let results = validate(&valid_record());
    assert!(result(&results, "Size Combination").passed);

    let swapped = valid_record()
        .with(FieldName::Width, "297")
        .with(FieldName::Height, "210");
    let results = validate(&swapped);
    let size = result(&results, "Size Combination");
    assert!(!size.passed);
    assert_eq!(size.message, "Invalid trim size combination: 297x210mm");
}

#[test]
fn invariant_hardback_canonicalizes_to_cased() {
    let results = validate(&valid_record());
    let binding = result(&results, "Binding Type");
    assert!(binding.passed);
    assert_eq!(binding.message, "Binding: Cased");
}

#[test]
fn invariant_canonical_binding_labels_pair_back_by_default() {
    let cases = [("Cased", "Binding: Hardback"), ("Limp", "Binding: Paperback")];
    for (label, prefix) in cases {
        let results = validate(&valid_record().with(FieldName::VersionType, label));
        let binding = result(&results, "Binding Type");
        assert!(!binding.passed, "{}", label);
        assert!(binding.message.starts_with(prefix), "{}", binding.message);
    }
}

#[test]
fn invariant_canonical_fixed_lookup_accepts_canonical_labels() {
    let rule_set = RuleSet::default().with_binding_lookup(BindingLookup::CanonicalFixed);
    let validator = Validator::new(Arc::new(ReferenceTables::builtin()), rule_set).unwrap();
    for label in ["Cased", "Limp", "Hardback", "Paperback"] {
        let results = validator.validate(&valid_record().with(FieldName::VersionType, label));
        assert!(result(&results, "Binding Type").passed, "{}", label);
    }
}

#[test]
fn invariant_unknown_grammage_fails_dependent_checks() {
    let results = validate(&valid_record().with(FieldName::Grammage, "999gsm"));
    for test in ["Paper Weight", "Binding Type", "Size Combination", "Color Compatibility"] {
        assert!(!result(&results, test).passed, "{} should fail", test);
    }
    assert!(result(&results, "Treatment").passed);
}

#[test]
fn invariant_page_extent_bounds() {
    let cases = [
        ("0", false, "Page extent must be greater than zero: 0"),
        ("1041", false, "Page extent 1041 exceeds maximum of 1040"),
        ("abc", false, "Page extent is not a number: abc"),
        (
            "99999999999999999999",
            false,
            "Page extent 99999999999999999999 exceeds maximum of 1040",
        ),
        ("500", true, "Valid page extent: 500"),
    ];
    for (value, passed, message) in cases {
        let results = validate(&valid_record().with(FieldName::PageExtent, value));
        let extent = result(&results, "Page Extent");
        assert_eq!(extent.passed, passed, "{}", value);
        assert_eq!(extent.message, message);
    }
}

#[test]
fn invariant_binding_style_is_prefix_match() {
    let results = validate(&valid_record().with(FieldName::BindingStyle, "Casebound"));
    assert!(!result(&results, "Binding Style").passed);

    let results = validate(&valid_record().with(FieldName::BindingStyle, "Cased Hardback"));
    assert!(result(&results, "Binding Style").passed);
}

#[test]
fn invariant_empty_record_reports_every_missing_field() {
    let results = validate(&FieldRecord::new());

    let required = result(&results, "Required Fields");
    assert!(!required.passed);
    for name in [
        "versionType", "width", "height", "grammage", "colour",
        "productionClass", "treatment", "pageExtent", "bindingStyle",
    ] {
        assert!(
            required.message.contains(&format!("{} (missing)", name)),
            "{} not reported in {}",
            name,
            required.message
        );
    }

    // Only the informational file marker can pass.
    let failed = results.iter().filter(|r| !r.passed).count();
    assert_eq!(failed, results.len() - 1);
    assert_eq!(results[0].test, "File");
}

#[test]
fn invariant_results_follow_step_order() {
    let tests: Vec<_> = validate(&valid_record()).into_iter().map(|r| r.test).collect();
    assert_eq!(
        tests,
        vec![
            "File",
            "Required Fields",
            "Production Class",
            "Paper Weight",
            "Binding Type",
            "Size Combination",
            "Color Compatibility",
            "Binding Style",
            "Treatment",
            "Page Extent",
        ]
    );
}

#[test]
fn invariant_batch_preserves_order_and_totals() {
    let dir = tempfile::tempdir().unwrap();
    let good = r#"<product>
        <version_type>Paperback</version_type>
        <production_class>Standard</production_class>
        <binding_style>Limp PUR</binding_style>
        <format><width>156</width><height>234</height></format>
        <parts>
          <cover><treatment>Matt Laminate</treatment></cover>
          <text>
            <grammage>90gsm/60lb</grammage>
            <colour>4</colour>
            <page_extent>288</page_extent>
          </text>
        </parts>
      </product>"#;

    let paths = vec![
        dir.path().join("9780000000001.xml"),
        dir.path().join("9780000000002.xml"),
        dir.path().join("9780000000003.xml"),
    ];
    fs::write(&paths[0], good).unwrap();
    fs::write(&paths[1], "<product><format>").unwrap();
    fs::write(&paths[2], good).unwrap();

    let report = ValidationPipeline::default().validate_batch(&paths).unwrap();
    let isbns: Vec<_> = report.documents.iter().map(|d| d.isbn.as_str()).collect();
    assert_eq!(isbns, vec!["9780000000001", "9780000000002", "9780000000003"]);
    assert!(report.documents[0].passed(), "{:#?}", report.documents[0].results);
    assert_eq!(report.documents[1].results[0].test, "XML Format");
    assert_eq!(report.summary.total, 3);
    assert_eq!(report.summary.passed, 2);
    assert_eq!(report.summary.failed, 1);
    assert!(!report.all_passed());
}
