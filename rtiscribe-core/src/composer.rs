//! Canonical composer
//!
//! Rebuilds a complete application around a sanitized body. The author's
//! own address block and subject line are lifted to the top when present;
//! everything else is standard text from the phrase catalog, so sanitizing
//! a composed document strips the additions again.

use crate::markup::{normalize, serialize};
use crate::sanitizer::catalog::{
    ADDRESS_OPENER, CITIZEN_CLAUSE_TAIL, CLOSING, DECLARATION_BANNER, DECLARATION_SENTENCE,
    FEE_SENTENCE, PIO_DESIGNATION, SALUTATION, SIGNATURE_MARKER, STANDARD_SUBJECT,
    TIMELINE_SENTENCE,
};
use crate::types::{placeholders, ApplicantContext, MarkupNode};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static ADDRESS_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^\s*to\s*,").unwrap());

static SUBJECT_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:subject|sub)\s*[:.\-]").unwrap());

static FEE_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:application\s+fee|fee\s+of|postal\s+order|IPO|demand\s+draft|BPL)\b").unwrap()
});

static TIMELINE_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:30|thirty)\s+days\b|section\s*7\s*\(\s*1\s*\)").unwrap()
});

/// What the composer found in the sanitized body
#[derive(Debug, Default)]
struct BodyParts {
    address: Option<MarkupNode>,
    subject: Option<MarkupNode>,
    body: Vec<MarkupNode>,
}

fn split_body(root: MarkupNode) -> BodyParts {
    let mut parts = BodyParts::default();
    for node in root.children {
        let text = node.text_content();
        if parts.address.is_none() && node.is_element() && ADDRESS_START.is_match(&text) {
            parts.address = Some(node);
        } else if parts.subject.is_none() && node.is_element() && SUBJECT_START.is_match(&text) {
            parts.subject = Some(node);
        } else {
            parts.body.push(node);
        }
    }
    parts
}

fn paragraph(text: &str) -> MarkupNode {
    MarkupNode::element("p", vec![MarkupNode::text(text)])
}

fn line_block(tag: &str, lines: &[&str]) -> MarkupNode {
    let mut children = Vec::with_capacity(lines.len() * 2);
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            children.push(MarkupNode::element("br", Vec::new()));
        }
        children.push(MarkupNode::text(*line));
    }
    MarkupNode::element(tag, children)
}

fn default_address(ctx: &ApplicantContext) -> MarkupNode {
    let department = ctx.department().unwrap_or(placeholders::DEPARTMENT);
    line_block("p", &[ADDRESS_OPENER, PIO_DESIGNATION, department])
}

fn standard_subject() -> MarkupNode {
    let rest = STANDARD_SUBJECT
        .strip_prefix("Subject:")
        .unwrap_or(STANDARD_SUBJECT);
    MarkupNode::element(
        "p",
        vec![
            MarkupNode::element("b", vec![MarkupNode::text("Subject:")]),
            MarkupNode::text(rest),
        ],
    )
}

fn citizen_clause(ctx: &ApplicantContext) -> MarkupNode {
    let name = ctx.name().unwrap_or(placeholders::NAME);
    paragraph(&format!("I, {name}, {CITIZEN_CLAUSE_TAIL}"))
}

/// Compose a complete application from sanitized body markup
pub fn compose(sanitized: &str, ctx: &ApplicantContext) -> String {
    let parts = split_body(normalize(sanitized));
    let body_text: String = parts
        .body
        .iter()
        .map(MarkupNode::text_content)
        .collect::<Vec<_>>()
        .join(" ");

    debug!(
        "✍️  Composing: own address={}, own subject={}, {} body element(s)",
        parts.address.is_some(),
        parts.subject.is_some(),
        parts.body.len()
    );

    let mut children = Vec::with_capacity(parts.body.len() + 10);
    children.push(parts.address.unwrap_or_else(|| default_address(ctx)));
    children.push(parts.subject.unwrap_or_else(standard_subject));
    children.push(paragraph(SALUTATION));
    children.push(citizen_clause(ctx));
    children.extend(parts.body);
    if !FEE_MENTION.is_match(&body_text) {
        children.push(paragraph(FEE_SENTENCE));
    }
    if !TIMELINE_MENTION.is_match(&body_text) {
        children.push(paragraph(TIMELINE_SENTENCE));
    }
    children.push(paragraph(CLOSING));
    children.push(paragraph(SIGNATURE_MARKER));
    children.push(MarkupNode::element(
        "h3",
        vec![MarkupNode::text(DECLARATION_BANNER)],
    ));
    children.push(paragraph(DECLARATION_SENTENCE));

    serialize(&MarkupNode::root(children))
}
