//! Boilerplate sanitizer
//!
//! Strips standard phrases and the applicant's own identity details from
//! author content so the composer can rebuild the application around a
//! clean body. Two passes:
//! 1. structural: drop elements whose whole text is a known phrase
//! 2. residual: run the ordered cleanup rule table over the markup
//!
//! The output is re-normalized and the passes repeat until nothing changes.

pub mod catalog;
pub mod rules;

pub use catalog::{identity_phrases, phrase_key, PhraseCatalog};
pub use rules::{CleanupRule, RuleTable, RuleTarget};

use crate::error::Result;
use crate::markup::{canonicalize, normalize, serialize};
use crate::types::{IdentityFields, MarkupNode};
use std::collections::HashSet;
use tracing::{debug, warn};

pub const DEFAULT_MAX_PASSES: usize = 4;

#[derive(Debug, Clone)]
pub struct Sanitizer {
    catalog: PhraseCatalog,
    structural_keys: HashSet<String>,
    base_rules: Vec<CleanupRule>,
    base_table: RuleTable,
    max_passes: usize,
}

impl Sanitizer {
    /// Build a sanitizer over a read-only phrase catalog
    pub fn new(catalog: PhraseCatalog) -> Result<Self> {
        Self::with_rules(catalog, Vec::new(), DEFAULT_MAX_PASSES)
    }

    /// Build with extra cleanup rules (from configuration) and a pass limit.
    /// Extra rules run after the built-in phrase and identity rules unless
    /// their `applies_before` says otherwise.
    pub fn with_rules(
        catalog: PhraseCatalog,
        extra_rules: Vec<CleanupRule>,
        max_passes: usize,
    ) -> Result<Self> {
        let structural_keys = catalog
            .structural_phrases()
            .map(phrase_key)
            .filter(|key| !key.is_empty())
            .collect();

        let mut base_rules = rules::phrase_rules(catalog.residual_phrases());
        base_rules.extend(rules::standard_rules()?);
        base_rules.extend(extra_rules);

        // validates ordering once; per-call tables only add identity rules
        let base_table = RuleTable::build(base_rules.clone())?;
        debug!(
            "🧹 Sanitizer ready: {} catalog phrases, {} cleanup rules",
            catalog.len(),
            base_table.len()
        );

        Ok(Self {
            catalog,
            structural_keys,
            base_rules,
            base_table,
            max_passes: max_passes.max(1),
        })
    }

    pub fn catalog(&self) -> &PhraseCatalog {
        &self.catalog
    }

    /// Remove boilerplate and identity details from markup.
    ///
    /// Pure: the result depends only on the arguments, and sanitizing the
    /// result again returns it unchanged.
    pub fn sanitize(&self, markup: &str, identity: &IdentityFields) -> String {
        let keys = self.keys_for(identity);
        let table = self.table_for(identity);

        let mut current = markup.to_string();
        for pass in 1..=self.max_passes {
            let tree = strip_known(normalize(&current), &keys);
            let rewritten = table.apply(&serialize(&tree), RuleTarget::Markup);
            let next = canonicalize(&rewritten);
            if next == current {
                debug!("🧹 Sanitizer reached a fixpoint after {} pass(es)", pass);
                return next;
            }
            current = next;
        }
        warn!(
            "⚠️  Sanitizer stopped after {} passes without reaching a fixpoint",
            self.max_passes
        );
        current
    }

    /// Same cleanup over derived plain text; a line equal to a known phrase
    /// counts as a whole element.
    pub fn sanitize_text(&self, text: &str, identity: &IdentityFields) -> String {
        let keys = self.keys_for(identity);
        let table = self.table_for(identity);

        let mut current = text.trim().to_string();
        for _ in 0..self.max_passes {
            let kept: Vec<&str> = current
                .lines()
                .filter(|line| !keys.contains(&phrase_key(line)))
                .collect();
            let next = table.apply(&kept.join("\n"), RuleTarget::Text);
            let next = next.trim().to_string();
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn keys_for(&self, identity: &IdentityFields) -> HashSet<String> {
        let mut keys = self.structural_keys.clone();
        keys.extend(
            identity_phrases(identity)
                .iter()
                .map(|p| phrase_key(p))
                .filter(|key| !key.is_empty()),
        );
        keys
    }

    fn table_for(&self, identity: &IdentityFields) -> RuleTable {
        let identity_rules = rules::identity_rules(identity);
        if identity_rules.is_empty() {
            return self.base_table.clone();
        }
        let mut all = identity_rules;
        all.extend(self.base_rules.iter().cloned());
        match RuleTable::build(all) {
            Ok(table) => table,
            Err(err) => {
                warn!("⚠️  Identity cleanup rules skipped: {}", err);
                self.base_table.clone()
            }
        }
    }
}

/// Remove every element (and loose root text) whose whole text is a known
/// phrase. Children of kept elements are checked recursively.
fn strip_known(mut node: MarkupNode, keys: &HashSet<String>) -> MarkupNode {
    let is_root = node.is_root();
    node.children = std::mem::take(&mut node.children)
        .into_iter()
        .filter(|child| {
            if child.is_text() && !is_root {
                return true;
            }
            !keys.contains(&phrase_key(&child.text_content()))
        })
        .map(|child| {
            if child.is_element() {
                strip_known(child, keys)
            } else {
                child
            }
        })
        .collect();
    node
}

/// One-shot form: sanitize with an explicit phrase list instead of the
/// standard catalog
pub fn sanitize(markup: &str, known_phrases: &[String], identity: &IdentityFields) -> String {
    match Sanitizer::new(PhraseCatalog::from_phrases(known_phrases)) {
        Ok(sanitizer) => sanitizer.sanitize(markup, identity),
        Err(err) => {
            warn!("⚠️  Sanitizer unavailable, returning canonical markup: {}", err);
            canonicalize(markup)
        }
    }
}
