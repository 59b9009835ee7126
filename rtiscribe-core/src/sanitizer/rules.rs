//! Declarative cleanup rule table
//!
//! Each rule is `{name, pattern, replacement, applies_before}`. The table is
//! ordered topologically over the `applies_before` edges; among rules that
//! are free to run, declaration order wins. An `applies_before` entry ending
//! in `*` names every rule with that prefix.

use crate::error::{Result, ScribeError};
use crate::types::IdentityFields;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Which representation a rule rewrites
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuleTarget {
    Markup,
    Text,
    Both,
}

impl RuleTarget {
    fn covers(self, target: RuleTarget) -> bool {
        self == RuleTarget::Both || self == target
    }
}

#[derive(Debug, Clone)]
pub struct CleanupRule {
    pub name: String,
    pattern: Regex,
    replacement: String,
    pub applies_before: Vec<String>,
    pub target: RuleTarget,
}

impl CleanupRule {
    pub fn new(name: &str, pattern: &str, replacement: &str) -> Result<Self> {
        let compiled = Regex::new(pattern).map_err(|source| ScribeError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self::from_regex(name, compiled, replacement))
    }

    pub fn from_regex(name: &str, pattern: Regex, replacement: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern,
            replacement: replacement.to_string(),
            applies_before: Vec::new(),
            target: RuleTarget::Both,
        }
    }

    pub fn before(mut self, names: &[&str]) -> Self {
        self.applies_before
            .extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn on(mut self, target: RuleTarget) -> Self {
        self.target = target;
        self
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        self.pattern.replace_all(input, self.replacement.as_str())
    }

    fn precedes(&self, other: &CleanupRule) -> bool {
        self.applies_before.iter().any(|target| match target.strip_suffix('*') {
            Some(prefix) => other.name.starts_with(prefix),
            None => other.name == *target,
        })
    }
}

/// Rules in execution order
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<CleanupRule>,
}

impl RuleTable {
    /// Order rules with Kahn's algorithm. Fails on a cycle or on an exact
    /// `applies_before` name that matches no rule.
    pub fn build(rules: Vec<CleanupRule>) -> Result<Self> {
        for rule in &rules {
            for target in &rule.applies_before {
                if target.ends_with('*') {
                    continue;
                }
                if !rules.iter().any(|r| r.name == *target) {
                    return Err(ScribeError::UnknownRule {
                        rule: rule.name.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        let n = rules.len();
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut in_degree = vec![0usize; n];
        for (i, rule) in rules.iter().enumerate() {
            for (j, other) in rules.iter().enumerate() {
                if i != j && rule.precedes(other) {
                    successors[i].push(j);
                    in_degree[j] += 1;
                }
            }
        }

        let mut placed = vec![false; n];
        let mut order = Vec::with_capacity(n);
        while order.len() < n {
            // lowest declaration index among the ready rules
            let Some(next) = (0..n).find(|&i| !placed[i] && in_degree[i] == 0) else {
                let stuck = (0..n).find(|&i| !placed[i]).unwrap_or(0);
                return Err(ScribeError::RuleCycle {
                    rule: rules[stuck].name.clone(),
                });
            };
            placed[next] = true;
            order.push(next);
            for &succ in &successors[next] {
                in_degree[succ] -= 1;
            }
        }

        let mut slots: Vec<Option<CleanupRule>> = rules.into_iter().map(Some).collect();
        let rules = order
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect();
        Ok(Self { rules })
    }

    pub fn apply(&self, input: &str, target: RuleTarget) -> String {
        let mut current = input.to_string();
        for rule in self.rules.iter().filter(|r| r.target.covers(target)) {
            let replaced = match rule.apply(&current) {
                Cow::Borrowed(_) => None,
                Cow::Owned(text) => Some(text),
            };
            if let Some(text) = replaced {
                current = text;
            }
        }
        current
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ===== RULE CONSTRUCTORS =====

/// Regex source for a literal phrase: words separated by whitespace or
/// `<br>`, trailing punctuation optional, word boundaries where they apply
pub fn phrase_pattern(phrase: &str) -> String {
    let core = phrase
        .trim()
        .trim_end_matches([',', '.', ':', ';'])
        .trim_end();
    let words: Vec<String> = core.split_whitespace().map(regex::escape).collect();
    let body = words.join(r"(?:\s|<br\s*/?>)+");
    let starts_word = core.chars().next().is_some_and(|c| c.is_alphanumeric());
    let ends_word = core.chars().last().is_some_and(|c| c.is_alphanumeric());
    format!(
        "(?i){}{}{}[,.:;]?",
        if starts_word { r"\b" } else { "" },
        body,
        if ends_word { r"\b" } else { "" },
    )
}

fn compiled(pattern: &str) -> Option<Regex> {
    Regex::new(pattern).ok()
}

/// Residual removal rules for catalog phrases, in catalog order
pub fn phrase_rules<'a>(phrases: impl Iterator<Item = &'a str>) -> Vec<CleanupRule> {
    phrases
        .enumerate()
        .filter_map(|(i, phrase)| {
            let regex = compiled(&phrase_pattern(phrase))?;
            Some(
                CleanupRule::from_regex(&format!("phrase.{i:03}"), regex, "")
                    .before(&["composite.*", "punctuation.*"]),
            )
        })
        .collect()
}

/// Identity values shorter than this are never removed from free text
pub const MIN_IDENTITY_LEN: usize = 3;

const NAME_LABELS: &str = r"(?:Applicant\s+Name|Applicant|Full\s+Name|Name)";
const ADDRESS_LABELS: &str = r"(?:Applicant\s+Address|Postal\s+Address|Address)";
const CONTACT_LABELS: &str =
    r"(?:Contact\s+(?:No\.?|Number)|Contact|Phone(?:\s+No\.?)?|Mobile(?:\s+No\.?)?|Mob\.?|Tel\.?)";
const EMAIL_LABELS: &str = r"(?:E-?mail(?:\s+ID|\s+Address)?)";

/// Per-call identity rules. Labelled forms run before bare values, and all
/// of them before the composite citizen clause.
pub fn identity_rules(identity: &IdentityFields) -> Vec<CleanupRule> {
    let fields = [
        ("name", NAME_LABELS, identity.name.as_deref()),
        ("address", ADDRESS_LABELS, identity.address.as_deref()),
        ("contact", CONTACT_LABELS, identity.contact.as_deref()),
        ("email", EMAIL_LABELS, identity.email.as_deref()),
    ];

    let mut rules = Vec::new();
    for (field, labels, value) in fields {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            continue;
        };
        let value_pattern = phrase_pattern(value);
        let value_body = value_pattern
            .trim_start_matches("(?i)")
            .trim_end_matches("[,.:;]?");

        let labelled = format!(r"(?i)\b{labels}\s*:\s*{value_body}[,.;]?");
        if let Some(regex) = compiled(&labelled) {
            rules.push(
                CleanupRule::from_regex(&format!("identity.label.{field}"), regex, "")
                    .before(&["identity.value.*", "composite.*"]),
            );
        }

        if value.chars().count() >= MIN_IDENTITY_LEN {
            let bare = format!("(?i){value_body}");
            if let Some(regex) = compiled(&bare) {
                rules.push(
                    CleanupRule::from_regex(&format!("identity.value.{field}"), regex, "")
                        .before(&["composite.*"]),
                );
            }
        }
    }
    rules
}

/// "I, <name>, a citizen of India," plus the optional fixed request tail.
/// The name slot is whatever identity cleanup left behind (nothing, or a
/// placeholder); the match never runs into the author's own request.
const CITIZEN_CLAUSE_PATTERN: &str = concat!(
    r"(?i)\bI\s*,\s*(?:[^,.:;<>]{1,80}?\s*,\s*)?,?\s*a\s+citizen\s+of\s+India\b\s*,?\s*",
    r"(?:hereby\s+request(?:\s+for)?\s+the\s+following(?:\s+information)?",
    r"(?:\s+under\s+(?:Section\s+6\s*\(1\)\s+of\s+)?the\s+(?:Right\s+to\s+Information|RTI)\s+Act(?:\s*,\s*2005)?)?",
    r"\s*[:.]?\s*)?",
);

/// Composite clause and punctuation cleanup, shared by every call
pub fn standard_rules() -> Result<Vec<CleanupRule>> {
    Ok(vec![
        CleanupRule::new("composite.citizen_clause", CITIZEN_CLAUSE_PATTERN, "")?
        .before(&["punctuation.*", "labels.*", "whitespace.*"]),
        CleanupRule::new(
            "labels.dangling",
            r"(?i)\b(?:Applicant\s+Name|Applicant\s+Details|Applicant|Name|Address|Contact(?:\s+No\.?|\s+Number)?|Phone|Mobile|E-?mail(?:\s+ID)?)\s*:[ \t]*(</|$)",
            "$1",
        )?
        .on(RuleTarget::Markup)
        .before(&["punctuation.*"]),
        CleanupRule::new(
            "labels.dangling_text",
            r"(?im)^[ \t]*(?:Applicant\s+Name|Applicant\s+Details|Applicant|Name|Address|Contact(?:\s+No\.?|\s+Number)?|Phone|Mobile|E-?mail(?:\s+ID)?)\s*:[ \t]*$",
            "",
        )?
        .on(RuleTarget::Text)
        .before(&["punctuation.*"]),
        CleanupRule::new("punctuation.empty_parens", r"\(\s*\)", "")?
            .before(&["punctuation.orphan_commas", "punctuation.space_before"]),
        CleanupRule::new("punctuation.orphan_commas", r",(?:\s*,)+", ",")?,
        CleanupRule::new(
            "punctuation.leading_markup",
            r"(<(?:p|div|li|h[1-6]|td|span|b|strong|i|em|u)(?:\s[^>]*)?>)\s*[,.;:]+\s*",
            "$1",
        )?
        .on(RuleTarget::Markup),
        CleanupRule::new("punctuation.leading_text", r"(?m)^[ \t]*[,.;:]+[ \t]*", "")?
            .on(RuleTarget::Text),
        CleanupRule::new("punctuation.space_before", r"[ \t]+([,.;:])", "$1")?,
        CleanupRule::new("whitespace.collapse", r"[ \t]{2,}", " ")?,
        CleanupRule::new("whitespace.line_end", r"(?m)[ \t]+$", "")?.on(RuleTarget::Text),
        CleanupRule::new("breaks.collapse", r"(?:<br>\s*){3,}", "<br><br>")?
            .on(RuleTarget::Markup),
        CleanupRule::new("breaks.blank_lines", r"\n{3,}", "\n\n")?.on(RuleTarget::Text),
    ])
}
