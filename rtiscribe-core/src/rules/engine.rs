use super::{rubric, summary};
use crate::config::ComplianceConfig;
use crate::error::{Result, ScribeError};
use crate::markup::markup_to_text;
use crate::types::{ComplianceReport, Severity};
use tracing::debug;

pub const NO_CONTENT_ISSUE: &str = "No content";

/// Immutable view of the text under evaluation, computed once per call
pub struct TextSnapshot<'a> {
    pub text: &'a str,
    pub lowercase: String,
    pub word_count: usize,
}

impl<'a> TextSnapshot<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            lowercase: text.to_lowercase(),
            word_count: text.split_whitespace().count(),
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &'a str> {
        self.text.lines()
    }
}

/// One independent rubric check. Rules never see each other's results, so
/// their order only affects the order of report entries.
pub trait ComplianceRule: Send + Sync {
    fn name(&self) -> &str;
    fn severity(&self) -> Severity;
    fn weight(&self) -> u32;
    fn check(&self, doc: &TextSnapshot) -> bool;
    /// Recorded when the check passes
    fn compliance_point(&self) -> &str;
    /// Recorded as an issue (blocking) or suggestion (minor) when it fails
    fn finding(&self) -> &str;
}

pub struct ComplianceEngine {
    rules: Vec<Box<dyn ComplianceRule>>,
    compliant_threshold: u8,
}

impl Default for ComplianceEngine {
    fn default() -> Self {
        let config = ComplianceConfig::default();
        Self {
            rules: rubric::standard_rules(&config),
            compliant_threshold: config.compliant_threshold,
        }
    }
}

impl ComplianceEngine {
    /// Build the standard rubric with configured weights and limits.
    /// Weights that total more than 100 are rejected.
    pub fn new(config: &ComplianceConfig) -> Result<Self> {
        Self::with_rules(rubric::standard_rules(config), config.compliant_threshold)
    }

    pub fn with_rules(rules: Vec<Box<dyn ComplianceRule>>, compliant_threshold: u8) -> Result<Self> {
        let total: u32 = rules.iter().map(|r| r.weight()).sum();
        if total > 100 {
            return Err(ScribeError::InvalidRubric { total });
        }
        Ok(Self {
            rules,
            compliant_threshold: compliant_threshold.min(100),
        })
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name())
    }

    pub fn total_weight(&self) -> u32 {
        self.rules.iter().map(|r| r.weight()).sum()
    }

    /// Score a plain-text snapshot against the rubric
    pub fn evaluate(&self, text: &str) -> ComplianceReport {
        if text.trim().is_empty() {
            return no_content_report();
        }

        let doc = TextSnapshot::new(text);
        let mut deducted = 0u32;
        let mut compliance_points = Vec::new();
        let mut issues = Vec::new();
        let mut suggestions = Vec::new();

        for rule in &self.rules {
            if rule.check(&doc) {
                compliance_points.push(rule.compliance_point().to_string());
                continue;
            }
            deducted += rule.weight();
            if rule.severity().is_blocking() {
                issues.push(rule.finding().to_string());
            } else {
                suggestions.push(rule.finding().to_string());
            }
            debug!("   ❌ {} (-{})", rule.name(), rule.weight());
        }

        let score = 100u32.saturating_sub(deducted) as u8;
        let is_compliant = score >= self.compliant_threshold && issues.is_empty();
        let analysis_summary = summary::analysis_summary(score, &compliance_points, &issues);

        debug!(
            "📋 Compliance score {} ({} point(s), {} issue(s), {} suggestion(s))",
            score,
            compliance_points.len(),
            issues.len(),
            suggestions.len()
        );

        ComplianceReport {
            score,
            issues,
            suggestions,
            compliance_points,
            is_compliant,
            analysis_summary,
        }
    }

    /// Normalize markup, derive its plain text, then evaluate
    pub fn evaluate_markup(&self, markup: &str) -> ComplianceReport {
        self.evaluate(&markup_to_text(markup))
    }
}

fn no_content_report() -> ComplianceReport {
    let issues = vec![NO_CONTENT_ISSUE.to_string()];
    ComplianceReport {
        score: 0,
        analysis_summary: summary::analysis_summary(0, &[], &issues),
        issues,
        suggestions: Vec::new(),
        compliance_points: Vec::new(),
        is_compliant: false,
    }
}
