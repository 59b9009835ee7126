use super::engine::{ComplianceRule, TextSnapshot};
use crate::config::ComplianceConfig;
use crate::types::Severity;
use regex::Regex;
use std::sync::LazyLock;

// ===== Rubric patterns =====

static ACT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)right\s+to\s+information\s+act|\bRTI\s+Act\b").unwrap()
});

static AUTHORITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)public\s+information\s+officer|\b[CS]?PIO\b|appellate\s+authority").unwrap()
});

static DECLARATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdeclar(?:e|es|ed|ation)\b").unwrap());

static FEE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bfees?\b|\bRs\.?\s*10\b|₹\s*10\b|postal\s+order|\bIPO\b|demand\s+draft|\bBPL\b",
    )
    .unwrap()
});

static SECTION_6_1_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)section\s*6\s*\(\s*1\s*\)").unwrap());

static TIMELINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:30|thirty)\s+days\b|section\s*7\s*\(\s*1\s*\)").unwrap()
});

static EXEMPTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bsections?\s*(?:8|9)\b|\bexempt(?:ed|ion|ions)?\b").unwrap()
});

static SALUTATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:respected|dear)\s+(?:sir|madam)\b|\bsir\s*/\s*madam\b").unwrap()
});

static SUBJECT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:subject|sub\.)\s*:").unwrap());

static DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4}\b|\b\d{4}-\d{2}-\d{2}\b|\b\d{1,2}(?:st|nd|rd|th)?\s+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?,?\s+\d{4}\b|\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2},?\s+\d{4}\b|\bdate\s*:\s*\S",
    )
    .unwrap()
});

static APPLICANT_DETAILS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^\s*(?:applicant(?:\s+(?:name|details))?|name|address|contact(?:\s+(?:no\.?|number))?|phone|mobile|e-?mail)\s*:",
    )
    .unwrap()
});

/// An enumerated line: "1.", "2)", "a.", "(b)", "(iv)", or a bullet
static ENUMERATED_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:\d{1,2}[.)]|\(?[a-z][.)]|\(?[ivx]{1,4}\)|[•\-*–])\s+\S").unwrap()
});

// ===== Rule types =====

/// Passes when a fixed pattern occurs anywhere in the text
struct PatternRule {
    name: &'static str,
    severity: Severity,
    weight: u32,
    pattern: &'static Regex,
    point: String,
    finding: String,
}

impl PatternRule {
    fn new(
        name: &'static str,
        severity: Severity,
        weight: u32,
        pattern: &'static Regex,
        point: &str,
        finding: &str,
    ) -> Self {
        Self {
            name,
            severity,
            weight,
            pattern,
            point: point.to_string(),
            finding: finding.to_string(),
        }
    }
}

impl ComplianceRule for PatternRule {
    fn name(&self) -> &str {
        self.name
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn weight(&self) -> u32 {
        self.weight
    }

    fn check(&self, doc: &TextSnapshot) -> bool {
        self.pattern.is_match(doc.text)
    }

    fn compliance_point(&self) -> &str {
        &self.point
    }

    fn finding(&self) -> &str {
        &self.finding
    }
}

/// Either enough enumerated lines, or a request long enough to stand in
/// for a list
struct InformationListRule {
    weight: u32,
    min_items: usize,
    word_alternative: usize,
}

impl ComplianceRule for InformationListRule {
    fn name(&self) -> &str {
        "information_list"
    }

    fn severity(&self) -> Severity {
        Severity::Important
    }

    fn weight(&self) -> u32 {
        self.weight
    }

    fn check(&self, doc: &TextSnapshot) -> bool {
        let items = doc
            .lines()
            .filter(|line| ENUMERATED_LINE_REGEX.is_match(line))
            .count();
        items >= self.min_items || doc.word_count >= self.word_alternative
    }

    fn compliance_point(&self) -> &str {
        "Lists the information requested"
    }

    fn finding(&self) -> &str {
        "Missing a clear list of the information requested"
    }
}

struct AdequateLengthRule {
    weight: u32,
    min_words: usize,
    finding: String,
}

impl ComplianceRule for AdequateLengthRule {
    fn name(&self) -> &str {
        "adequate_length"
    }

    fn severity(&self) -> Severity {
        Severity::Minor
    }

    fn weight(&self) -> u32 {
        self.weight
    }

    fn check(&self, doc: &TextSnapshot) -> bool {
        doc.word_count >= self.min_words
    }

    fn compliance_point(&self) -> &str {
        "Describes the request in adequate detail"
    }

    fn finding(&self) -> &str {
        &self.finding
    }
}

/// Fails when any deferential phrase appears as whole words
struct AssertiveLanguageRule {
    weight: u32,
    phrases: Vec<String>,
}

impl ComplianceRule for AssertiveLanguageRule {
    fn name(&self) -> &str {
        "assertive_language"
    }

    fn severity(&self) -> Severity {
        Severity::Minor
    }

    fn weight(&self) -> u32 {
        self.weight
    }

    fn check(&self, doc: &TextSnapshot) -> bool {
        !self
            .phrases
            .iter()
            .any(|phrase| contains_words(&doc.lowercase, phrase))
    }

    fn compliance_point(&self) -> &str {
        "Uses assertive language"
    }

    fn finding(&self) -> &str {
        "Consider replacing deferential phrases such as \"please\" or \"kindly\" with direct requests"
    }
}

/// Substring match that only counts occurrences bounded by non-word characters
fn contains_words(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

// ===== Standard rubric =====

/// The fourteen rubric checks in report order
pub fn standard_rules(config: &ComplianceConfig) -> Vec<Box<dyn ComplianceRule>> {
    let w = &config.weights;
    vec![
        Box::new(PatternRule::new(
            "act_reference",
            Severity::Mandatory,
            w.act_reference,
            &ACT_REGEX,
            "References the Right to Information Act, 2005",
            "Missing reference to the Right to Information Act, 2005",
        )),
        Box::new(PatternRule::new(
            "authority",
            Severity::Mandatory,
            w.authority,
            &AUTHORITY_REGEX,
            "Addressed to the Public Information Officer",
            "Not addressed to a Public Information Officer (PIO/CPIO/SPIO) or Appellate Authority",
        )),
        Box::new(PatternRule::new(
            "declaration",
            Severity::Mandatory,
            w.declaration,
            &DECLARATION_REGEX,
            "Includes a declaration of citizenship",
            "Missing declaration section",
        )),
        Box::new(PatternRule::new(
            "fee",
            Severity::Mandatory,
            w.fee,
            &FEE_REGEX,
            "Mentions the application fee",
            "Missing application fee information (Rs. 10/- or BPL exemption)",
        )),
        Box::new(PatternRule::new(
            "section_6_1",
            Severity::Important,
            w.section_6_1,
            &SECTION_6_1_REGEX,
            "Cites Section 6(1) of the Act",
            "Missing citation of Section 6(1) of the Right to Information Act",
        )),
        Box::new(InformationListRule {
            weight: w.information_list,
            min_items: config.min_list_items,
            word_alternative: config.list_word_alternative,
        }),
        Box::new(PatternRule::new(
            "timeline",
            Severity::Important,
            w.timeline,
            &TIMELINE_REGEX,
            "States the 30-day response timeline",
            "Missing response timeline (30 days under Section 7(1))",
        )),
        Box::new(PatternRule::new(
            "exemption_clause",
            Severity::Minor,
            w.exemption_clause,
            &EXEMPTION_REGEX,
            "Acknowledges the Section 8 and 9 exemptions",
            "Consider acknowledging the exemptions in Sections 8 and 9",
        )),
        Box::new(PatternRule::new(
            "salutation",
            Severity::Minor,
            w.salutation,
            &SALUTATION_REGEX,
            "Uses a formal salutation",
            "Consider adding a formal salutation such as \"Respected Sir/Madam\"",
        )),
        Box::new(PatternRule::new(
            "subject",
            Severity::Minor,
            w.subject,
            &SUBJECT_REGEX,
            "Has a subject line",
            "Consider adding a subject line",
        )),
        Box::new(PatternRule::new(
            "date",
            Severity::Minor,
            w.date,
            &DATE_REGEX,
            "Dated",
            "Consider adding the date of the application",
        )),
        Box::new(PatternRule::new(
            "applicant_details",
            Severity::Minor,
            w.applicant_details,
            &APPLICANT_DETAILS_REGEX,
            "Includes applicant details",
            "Consider adding applicant details (name, address, contact)",
        )),
        Box::new(AdequateLengthRule {
            weight: w.adequate_length,
            min_words: config.min_words,
            finding: format!(
                "Consider describing the request in more detail (at least {} words)",
                config.min_words
            ),
        }),
        Box::new(AssertiveLanguageRule {
            weight: w.assertive_language,
            phrases: config
                .deferential_phrases
                .iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ComplianceEngine;

    const COMPLETE: &str = "To,
The Public Information Officer,
Delhi Jal Board
Subject: Application for information under Section 6(1) of the Right to Information Act, 2005
Respected Sir/Madam,
I, Priya Sharma, a citizen of India, hereby request the following information under Section 6(1) of the Right to Information Act, 2005:
1. Copies of all water connection records for Ward 12 between January 2022 and March 2024, including the sanctioned load.
2. Details of complaints registered about contaminated supply in the same ward and period, with the action taken on each.
3. The names and designations of the officers responsible for inspecting the pipeline network.
I have paid the application fee of Rs. 10/- as prescribed under the Right to Information Act, 2005.
The information may be furnished within 30 days as stipulated under Section 7(1) of the Right to Information Act, 2005.
Yours faithfully,
Name: Priya Sharma
Address: 14 Lodhi Road, New Delhi
Date: 12/03/2024
DECLARATION
I hereby declare that I am a citizen of India and the information sought does not fall within the restrictions contained in Section 8 and 9 of the Right to Information Act, 2005.";

    fn engine() -> ComplianceEngine {
        ComplianceEngine::default()
    }

    #[test]
    fn complete_application_scores_full_marks() {
        let report = engine().evaluate(COMPLETE);
        assert!(report.issues.is_empty(), "issues: {:?}", report.issues);
        assert!(report.suggestions.is_empty(), "suggestions: {:?}", report.suggestions);
        assert_eq!(report.score, 100);
        assert!(report.is_compliant);
        assert_eq!(report.compliance_points.len(), 14);
    }

    #[test]
    fn missing_mandatory_element_lowers_score_by_its_weight() {
        let full = engine().evaluate(COMPLETE);
        let without_fee = COMPLETE.replace(
            "I have paid the application fee of Rs. 10/- as prescribed under the Right to Information Act, 2005.\n",
            "",
        );
        let report = engine().evaluate(&without_fee);
        assert_eq!(report.score, full.score - 15);
        assert!(!report.is_compliant);
        assert!(report.issues.iter().any(|i| i.contains("fee")));
    }

    #[test]
    fn minor_failures_are_suggestions() {
        let text = COMPLETE.replace("Respected Sir/Madam,", "Kindly help.");
        let report = engine().evaluate(&text);
        assert!(report.issues.is_empty());
        assert_eq!(report.suggestions.len(), 2);
        assert_eq!(report.score, 94);
        assert!(report.is_compliant);
    }

    #[test]
    fn bare_text_fails_every_blocking_rule() {
        let report = engine().evaluate("hello");
        // only the assertive-language check passes
        assert_eq!(report.score, 4);
        assert_eq!(report.issues.len(), 7);
        assert_eq!(report.compliance_points, vec!["Uses assertive language".to_string()]);
    }

    #[test]
    fn enumerated_lines_count_as_a_list() {
        let rule = InformationListRule {
            weight: 8,
            min_items: 2,
            word_alternative: 150,
        };
        assert!(rule.check(&TextSnapshot::new("(a) bills\n(b) receipts")));
        assert!(rule.check(&TextSnapshot::new("• bills\n• receipts")));
        assert!(!rule.check(&TextSnapshot::new("1. bills only")));
        let long = "word ".repeat(150);
        assert!(rule.check(&TextSnapshot::new(&long)));
    }

    #[test]
    fn deferential_phrases_match_whole_words() {
        assert!(contains_words("could you please reply", "please"));
        assert!(contains_words("we request you to", "request you"));
        assert!(!contains_words("pleased to inform", "please"));
        assert!(!contains_words("anything", ""));
    }

    #[test]
    fn zero_weight_rules_still_report() {
        let mut config = ComplianceConfig::default();
        config.weights.date = 0;
        let engine = ComplianceEngine::new(&config).unwrap();
        let report = engine.evaluate(&COMPLETE.replace("Date: 12/03/2024\n", ""));
        assert_eq!(report.score, 100);
        assert_eq!(report.suggestions, vec!["Consider adding the date of the application".to_string()]);
    }
}
