//! Pipeline boundary tests over real drafts.
//!
//! Drafts live in `test_fixtures/drafts/` and the applicant context in
//! `test_fixtures/contexts/`. These tests assert properties at the stage
//! boundaries:
//!
//! - Boundary 1 (markup in): normalization, sanitizer fixpoint
//! - Boundary 2 (blocks out): classification, list numbering, split completeness
//! - Boundary 3 (documents out): text, print and docx backends, report shape
//!
//! Exact wording of composed boilerplate is left to the unit tests.

use rtiscribe_core::classifier::BlockClassifier;
use rtiscribe_core::config::ClassifierConfig;
use rtiscribe_core::markup::{canonicalize, normalize};
use rtiscribe_core::sanitizer::{PhraseCatalog, Sanitizer};
use rtiscribe_core::{
    ApplicantContext, BlockKind, DocumentProcessor, ExportMode, ListMarker, OutputFormat,
    PipelineConfig,
};
use serde_json::Value;
use std::io::{Cursor, Read};
use std::path::PathBuf;

// ============================================================================
// Fixture helpers
// ============================================================================

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_fixtures")
}

fn load_draft(name: &str) -> String {
    let path = fixtures_dir().join("drafts").join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Missing fixture: {}", path.display()))
}

fn load_context(name: &str) -> ApplicantContext {
    let path = fixtures_dir().join("contexts").join(name);
    let contents = std::fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Missing fixture: {}", path.display()));
    serde_yaml::from_str(&contents).expect("Invalid applicant context")
}

const ALL_DRAFTS: &[&str] = &[
    "water_board.html",
    "full_application.html",
    "messy_paste.html",
    "plain_draft.txt",
];

fn processor(mode: ExportMode) -> DocumentProcessor {
    let config = PipelineConfig {
        mode,
        ..Default::default()
    };
    DocumentProcessor::new(config).expect("default config is valid")
}

fn classify(markup: &str, ctx: &ApplicantContext) -> Vec<rtiscribe_core::Block> {
    let classifier = BlockClassifier::new(&ClassifierConfig::default()).unwrap();
    classifier.classify(&normalize(markup), &ctx.classifier_context())
}

// ============================================================================
// Context loading
// ============================================================================

#[test]
fn test_context_fixture_loads() {
    let ctx = load_context("priya.yaml");
    assert_eq!(ctx.name(), Some("Priya Sharma"));
    assert_eq!(ctx.department(), Some("Delhi Jal Board"));
    assert_eq!(ctx.contact(), Some("9876543210"));
    assert_eq!(ctx.date.map(|d| d.to_string()).as_deref(), Some("2024-03-12"));
    assert!(ctx.signature().is_none());
}

// ============================================================================
// Water Board scenario
// ============================================================================

#[test]
fn test_water_board_blocks() {
    let ctx = load_context("priya.yaml");
    let blocks = classify(&load_draft("water_board.html"), &ctx);

    assert_eq!(blocks[0].kind(), BlockKind::AddressHeader);
    let address_lines: Vec<String> = blocks[0]
        .lines()
        .into_iter()
        .map(|line| line.iter().map(|r| r.text.as_str()).collect::<String>().trim().to_string())
        .collect();
    assert_eq!(
        address_lines,
        vec!["To,", "The Public Information Officer,", "Water Board"]
    );
    assert_eq!(blocks[1].kind(), BlockKind::SubjectLine);
    assert_eq!(blocks[2].kind(), BlockKind::Salutation);
}

#[test]
fn test_water_board_sanitizer_keeps_the_request() {
    let ctx = load_context("priya.yaml");
    let sanitizer = Sanitizer::new(PhraseCatalog::standard()).unwrap();
    let sanitized = sanitizer.sanitize(&canonicalize(&load_draft("water_board.html")), &ctx.identity());

    assert!(sanitized.contains("water connection records"), "{sanitized}");
    assert!(!sanitized.contains("Priya Sharma"));
    assert!(!sanitized.contains("citizen of India"));
    assert!(!sanitized.contains("Dear Sir/Madam"));
}

#[test]
fn test_water_board_compliance() {
    let report = processor(ExportMode::AsAuthored).evaluate_markup(&load_draft("water_board.html"));

    assert!(report
        .compliance_points
        .contains(&"References the Right to Information Act, 2005".to_string()));
    assert!(report
        .compliance_points
        .contains(&"Addressed to the Public Information Officer".to_string()));
    for missing in ["fee", "Section 6(1)", "declaration"] {
        assert!(
            report.issues.iter().any(|i| i.contains(missing)),
            "expected an issue mentioning {missing}: {:?}",
            report.issues
        );
    }
    // Act, authority, salutation, subject, assertive tone
    assert_eq!(report.score, 38);
    assert!(!report.is_compliant);
}

#[test]
fn test_water_board_canonical_text() {
    let ctx = load_context("priya.yaml");
    let processor = processor(ExportMode::Canonical);
    let processed = processor.process(&load_draft("water_board.html"), &ctx);
    let text = String::from_utf8(processor.render(&processed, &ctx, OutputFormat::Text).unwrap()).unwrap();

    assert!(text.starts_with("To,\nThe Public Information Officer,\nWater Board"), "{text}");
    assert!(text.contains("water connection records"));
    assert_eq!(text.matches("a citizen of India, hereby request").count(), 1);
    assert!(text.contains("(Signature)\nPriya Sharma\nPlace: New Delhi\nDate: 12/03/2024"));
    assert!(text.contains("I hereby declare"));

    let report = processor.evaluate(&processed.plain_text);
    assert!(report.issues.iter().all(|i| !i.contains("fee")), "{:?}", report.issues);
}

// ============================================================================
// Sanitizer properties
// ============================================================================

#[test]
fn test_sanitizer_is_idempotent_on_fixtures() {
    let ctx = load_context("priya.yaml");
    let sanitizer = Sanitizer::new(PhraseCatalog::standard()).unwrap();

    for name in ALL_DRAFTS {
        let once = sanitizer.sanitize(&canonicalize(&load_draft(name)), &ctx.identity());
        let twice = sanitizer.sanitize(&once, &ctx.identity());
        assert_eq!(once, twice, "{name}: sanitizing twice changed the output");
    }
}

#[test]
fn test_messy_paste_is_cleaned() {
    let ctx = load_context("priya.yaml");
    let stages = processor(ExportMode::Canonical).capture_stages(&load_draft("messy_paste.html"), &ctx);
    let sanitized = stages.sanitized.as_deref().expect("canonical mode sanitizes");

    for gone in ["Priya Sharma", "Lodhi Road", "Respected", "Yours faithfully", "<style", "<title"] {
        assert!(!sanitized.contains(gone), "{gone} survived: {sanitized}");
    }
    assert!(sanitized.contains("road repair"));
    assert!(sanitized.contains("completion certificates"));
    assert!(!stages.normalized.contains("<p></p>"));
}

#[test]
fn test_request_sentence_survives_canonical_export() {
    let ctx = load_context("priya.yaml");
    let draft = "<p>I, Priya Sharma, a citizen of India, seek certified copies of all tenders issued by the Water Board in 2023.</p>";
    let stages = processor(ExportMode::Canonical).capture_stages(draft, &ctx);

    assert!(stages.plain_text.contains("certified copies of all tenders"), "{}", stages.plain_text);
    assert_eq!(stages.plain_text.matches("a citizen of India,").count(), 1);
}

#[test]
fn test_missing_name_stays_visible_in_export() {
    let stages = processor(ExportMode::Canonical)
        .capture_stages("<p>Copies of the minutes.</p>", &ApplicantContext::default());

    assert!(stages.plain_text.contains("I, [Your Name], a citizen of India"), "{}", stages.plain_text);
    assert!(stages.plain_text.contains("Copies of the minutes."));
}

// ============================================================================
// Classification and assembly
// ============================================================================

#[test]
fn test_full_application_list_is_numbered() {
    let ctx = load_context("priya.yaml");
    let blocks = classify(&load_draft("full_application.html"), &ctx);

    let ordinals: Vec<(u32, ListMarker)> = blocks
        .iter()
        .filter_map(|b| b.list_context())
        .map(|c| (c.ordinal, c.marker))
        .collect();
    assert_eq!(
        ordinals,
        (1..=5).map(|n| (n, ListMarker::Numeric)).collect::<Vec<_>>()
    );
}

#[test]
fn test_list_without_trigger_is_bulleted() {
    let items = "<ul><li>Ward 12 water quality</li><li>Ward 13 water quality</li>\
                 <li>Please provide the inspection dates</li><li>Pipeline age</li>\
                 <li>Officer names</li></ul>";
    let ctx = ApplicantContext::default();

    let outside = classify(items, &ctx);
    assert_eq!(outside.len(), 5);
    assert!(outside
        .iter()
        .all(|b| b.list_context().map(|c| c.marker) == Some(ListMarker::Bullet)));

    let inside = classify(&format!("<div><p>Information requested:</p>{items}</div>"), &ctx);
    let markers: Vec<ListMarker> = inside
        .iter()
        .filter_map(|b| b.list_context())
        .map(|c| c.marker)
        .collect();
    assert_eq!(markers, vec![ListMarker::Numeric; 5]);
}

#[test]
fn test_split_is_complete_for_every_fixture() {
    let ctx = load_context("priya.yaml");
    for mode in [ExportMode::AsAuthored, ExportMode::Canonical] {
        let processor = processor(mode);
        for name in ALL_DRAFTS {
            let stages = processor.capture_stages(&load_draft(name), &ctx);
            let reassembled: Vec<_> = stages.segments.blocks().cloned().collect();
            assert_eq!(reassembled, stages.blocks, "{name} ({mode:?}) lost or reordered blocks");
        }
    }
}

#[test]
fn test_plain_draft_pipeline() {
    let ctx = load_context("priya.yaml");
    let processor = processor(ExportMode::AsAuthored);
    let stages = processor.capture_stages(&load_draft("plain_draft.txt"), &ctx);

    assert!(stages.input_markup.starts_with("<p>To,<br>"));
    assert_eq!(stages.blocks[0].kind(), BlockKind::AddressHeader);
    assert_eq!(stages.blocks[1].kind(), BlockKind::SubjectLine);
    assert!(stages.plain_text.contains("1. Copies of contracts"));
    assert!(stages.report.issues.iter().all(|i| !i.contains("list")));
    assert!(stages.report.issues.iter().any(|i| i.contains("fee")));
}

// ============================================================================
// Compliance properties
// ============================================================================

#[test]
fn test_full_application_is_compliant() {
    let ctx = load_context("priya.yaml");
    let stages = processor(ExportMode::AsAuthored).capture_stages(&load_draft("full_application.html"), &ctx);
    assert!(stages.report.issues.is_empty(), "{:?}", stages.report.issues);
    assert!(stages.report.score >= 90);
    assert!(stages.report.is_compliant);
}

#[test]
fn test_removing_fee_lowers_the_score() {
    let processor = processor(ExportMode::AsAuthored);
    let draft = load_draft("full_application.html");
    let without_fee: String = draft
        .lines()
        .filter(|line| !line.contains("application fee"))
        .collect::<Vec<_>>()
        .join("\n");

    let before = processor.evaluate_markup(&draft);
    let after = processor.evaluate_markup(&without_fee);
    assert_eq!(before.score - after.score, 15);
    assert!(after.issues.iter().any(|i| i.contains("fee")));
    assert!(!after.is_compliant);
}

#[test]
fn test_empty_input_scores_zero() {
    let processor = processor(ExportMode::AsAuthored);
    for input in ["", "<p>   </p>", "<p></p><div><br></div>"] {
        let report = processor.evaluate_markup(input);
        assert_eq!(report.score, 0, "{input:?}");
        assert_eq!(report.issues, vec!["No content".to_string()]);
        assert!(!report.is_compliant);
    }
}

#[test]
fn test_report_json_shape() {
    let report = processor(ExportMode::AsAuthored).evaluate_markup(&load_draft("water_board.html"));
    let json: Value = serde_json::to_value(&report).unwrap();

    assert!(json["score"].is_u64());
    assert!(json["is_compliant"].is_boolean());
    assert!(json["analysis_summary"].is_string());
    for key in ["issues", "suggestions", "compliance_points"] {
        assert!(json[key].is_array(), "{key} should be an array");
    }
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_full_application_docx_package() {
    let ctx = load_context("priya.yaml");
    let processor = processor(ExportMode::AsAuthored);
    let processed = processor.process(&load_draft("full_application.html"), &ctx);
    let bytes = processor.render(&processed, &ctx, OutputFormat::Docx).unwrap();

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("docx is a zip package");
    for part in ["[Content_Types].xml", "word/document.xml", "word/footer1.xml"] {
        assert!(archive.by_name(part).is_ok(), "missing {part}");
    }
    assert!(archive.by_name("word/media/signature.png").is_err());

    let mut document = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut document)
        .unwrap();
    assert!(document.contains("Priya Sharma"));
    assert!(document.contains("Delhi Jal Board"));
    assert!(document.contains("(Signature)"));
    assert!(!document.contains("[YOUR NAME]"));
}

#[test]
fn test_full_application_print_layout() {
    let ctx = load_context("priya.yaml");
    let processor = processor(ExportMode::AsAuthored);
    let processed = processor.process(&load_draft("full_application.html"), &ctx);
    let html = String::from_utf8(processor.render(&processed, &ctx, OutputFormat::Print).unwrap()).unwrap();

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Page 1 of"));
    assert!(html.contains("<span class=\"marker\">5.</span>"));
    assert!(html.contains("Place: New Delhi"));
}
