//! Block classifier
//!
//! Walks the normalized tree depth-first and turns every block-level
//! element into a typed [`Block`]. Containers are descended, never emitted.
//! Each element is checked against a fixed, ordered rule list and the first
//! match wins: signature marker, declaration banner, address header,
//! subject line, salutation/closing, list item, body paragraph.

use crate::config::ClassifierConfig;
use crate::error::{Result, ScribeError};
use crate::sanitizer::catalog::DECLARATION_BANNER;
use crate::types::*;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Elements that are descended into when they hold block children
const CONTAINER_TAGS: &[&str] = &[
    "html", "body", "main", "section", "article", "header", "footer", "nav", "aside", "div",
    "form", "figure", "blockquote", "table", "thead", "tbody", "tfoot", "tr",
];

static SUBJECT_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:subject|sub\.?)\s*:").unwrap());

static ADDRESS_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^to\s*,").unwrap());

static BOLD_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)font-weight\s*:\s*(?:bold|bolder|[6-9]00)").unwrap());

static ITALIC_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)font-style\s*:\s*(?:italic|oblique)").unwrap());

static UNDERLINE_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)text-decoration[a-z-]*\s*:[^;]*underline").unwrap());

/// Case-insensitive alternation of literal phrases anchored as requested
fn phrase_alternation(phrases: &[String], anchored: bool) -> Result<Regex> {
    let body = phrases
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");
    // an empty list must never match
    let body = if body.is_empty() { r"[^\s\S]".to_string() } else { body };
    let pattern = if anchored {
        format!(r"(?i)^(?:{body})\b")
    } else {
        format!(r"(?i)\b(?:{body})\b")
    };
    Regex::new(&pattern).map_err(|source| ScribeError::InvalidPattern { pattern, source })
}

#[derive(Debug, Clone)]
pub struct BlockClassifier {
    authority: Regex,
    openers: Regex,
    closers: Regex,
    action_verbs: Regex,
    list_trigger: String,
    declaration_max_chars: usize,
    signature_tokens: Vec<String>,
}

impl BlockClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        Ok(Self {
            authority: phrase_alternation(&config.authority_markers, false)?,
            openers: phrase_alternation(&config.formal_openers, true)?,
            closers: phrase_alternation(&config.closers, true)?,
            action_verbs: phrase_alternation(&config.action_verbs, false)?,
            list_trigger: config.list_trigger.trim().to_lowercase(),
            declaration_max_chars: config.declaration_max_chars,
            signature_tokens: config
                .signature_tokens
                .iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        })
    }

    /// Classify every block of a normalized tree, in document order
    pub fn classify(&self, root: &MarkupNode, ctx: &ClassifierContext) -> Vec<Block> {
        let mut walk = Walk {
            classifier: self,
            ctx,
            blocks: Vec::new(),
        };
        let mut ancestors = Vec::new();
        walk.visit_children(root, &mut ancestors);

        debug!("🏷️  Classified {} block(s)", walk.blocks.len());
        walk.blocks
    }

    fn is_signature_token(&self, text: &str) -> bool {
        let lowered = text.trim().to_lowercase();
        !lowered.is_empty() && self.signature_tokens.iter().any(|t| *t == lowered)
    }

    fn is_signature_marker(&self, node: &MarkupNode, text: &str) -> bool {
        node.attribute("data-signature").is_some() || self.is_signature_token(text)
    }

    fn is_address(&self, text: &str, ctx: &ClassifierContext) -> bool {
        if text.contains("To,") || ADDRESS_START.is_match(text) || self.authority.is_match(text) {
            return true;
        }
        ctx.department_name
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .is_some_and(|d| text.to_lowercase().contains(&d.to_lowercase()))
    }

    /// Numeric when the scoped context carries the trigger phrase or most
    /// items read like requests; bullets otherwise
    fn list_marker(&self, list: &MarkupNode, scope: &[&MarkupNode], intro: Option<&MarkupNode>) -> ListMarker {
        if !self.list_trigger.is_empty() {
            let in_scope = scope
                .iter()
                .copied()
                .chain(intro)
                .any(|n| n.text_content().to_lowercase().contains(&self.list_trigger));
            if in_scope {
                return ListMarker::Numeric;
            }
        }

        let items: Vec<&MarkupNode> = list.children.iter().filter(|c| c.is_tag("li")).collect();
        let voting = items
            .iter()
            .filter(|item| self.action_verbs.is_match(&item.text_content()))
            .count();
        if !items.is_empty() && voting * 2 > items.len() {
            ListMarker::Numeric
        } else {
            ListMarker::Bullet
        }
    }
}

fn is_container(node: &MarkupNode) -> bool {
    node.is_element()
        && !node.is_root()
        && CONTAINER_TAGS.contains(&node.tag_name.as_str())
        && node.has_block_children()
}

fn is_list(node: &MarkupNode) -> bool {
    node.is_tag("ul") || node.is_tag("ol")
}

fn emphasis_of(node: &MarkupNode) -> Emphasis {
    let mut emphasis = match node.tag_name.as_str() {
        "strong" | "b" => Emphasis::BOLD,
        "em" | "i" | "cite" => Emphasis {
            italic: true,
            ..Default::default()
        },
        "u" | "ins" => Emphasis {
            underline: true,
            ..Default::default()
        },
        _ => Emphasis::default(),
    };
    if let Some(style) = node.attribute("style") {
        emphasis.bold |= BOLD_STYLE.is_match(style);
        emphasis.italic |= ITALIC_STYLE.is_match(style);
        emphasis.underline |= UNDERLINE_STYLE.is_match(style);
    }
    emphasis
}

/// Collect inline runs below `node`, inheriting emphasis additively.
/// Nested lists are skipped; they are classified on their own.
fn collect_runs(node: &MarkupNode, inherited: Emphasis, runs: &mut Vec<InlineRun>) {
    if node.is_text() {
        if !node.text.is_empty() {
            runs.push(InlineRun::new(node.text.clone(), inherited));
        }
        return;
    }
    if node.is_line_break() {
        runs.push(InlineRun::line_break());
        return;
    }
    if node.is_void() || is_list(node) {
        return;
    }

    let block = !node.is_inline();
    if block && runs.last().is_some_and(|r| !r.is_line_break()) {
        runs.push(InlineRun::line_break());
    }
    let emphasis = inherited.union(emphasis_of(node));
    for child in &node.children {
        collect_runs(child, emphasis, runs);
    }
    if block && runs.last().is_some_and(|r| !r.is_line_break()) {
        runs.push(InlineRun::line_break());
    }
}

/// Trim line edges, merge equal neighbours, drop empty runs and surplus breaks
fn tidy_runs(runs: Vec<InlineRun>) -> Vec<InlineRun> {
    let mut out: Vec<InlineRun> = Vec::with_capacity(runs.len());
    for run in runs {
        if run.is_line_break() {
            if out.last().is_some_and(|r| !r.is_line_break()) {
                if let Some(last) = out.last_mut() {
                    last.text = last.text.trim_end().to_string();
                }
                out.push(run);
            }
            continue;
        }
        let at_line_start = out.last().map_or(true, InlineRun::is_line_break);
        let text = if at_line_start {
            run.text.trim_start().to_string()
        } else {
            run.text.clone()
        };
        if text.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(last) if !last.is_line_break() && last.emphasis == run.emphasis => {
                last.text.push_str(&text)
            }
            _ => out.push(InlineRun::new(text, run.emphasis)),
        }
    }
    while out.last().is_some_and(InlineRun::is_line_break) {
        out.pop();
    }
    if let Some(last) = out.last_mut() {
        last.text = last.text.trim_end().to_string();
    }
    out.retain(|r| !r.text.is_empty());
    out
}

fn embolden(runs: Vec<InlineRun>) -> Vec<InlineRun> {
    runs.into_iter()
        .map(|r| {
            if r.is_line_break() {
                r
            } else {
                InlineRun::new(r.text, r.emphasis.union(Emphasis::BOLD))
            }
        })
        .collect()
}

struct Walk<'a> {
    classifier: &'a BlockClassifier,
    ctx: &'a ClassifierContext,
    blocks: Vec<Block>,
}

impl<'a> Walk<'a> {
    fn visit_children(&mut self, parent: &'a MarkupNode, ancestors: &mut Vec<&'a MarkupNode>) {
        let mut loose: Vec<InlineRun> = Vec::new();
        let mut loose_text = String::new();
        let mut previous_block: Option<&'a MarkupNode> = None;

        for child in &parent.children {
            if child.is_element() && child.attribute("data-signature").is_some() {
                self.flush_loose(&mut loose, &mut loose_text);
                let runs = tidy_runs(vec![InlineRun::plain(child.text_content())]);
                self.push(BlockKind::SignaturePlaceholder, runs);
                continue;
            }
            if child.is_inline() {
                loose_text.push_str(&child.text_content());
                collect_runs(child, Emphasis::default(), &mut loose);
                continue;
            }
            self.flush_loose(&mut loose, &mut loose_text);

            if is_list(child) {
                self.visit_list(child, ancestors, previous_block);
            } else if is_container(child) {
                ancestors.push(child);
                self.visit_children(child, ancestors);
                ancestors.pop();
            } else {
                self.classify_element(child, None);
            }
            previous_block = Some(child);
        }
        self.flush_loose(&mut loose, &mut loose_text);
    }

    fn visit_list(
        &mut self,
        list: &'a MarkupNode,
        ancestors: &mut Vec<&'a MarkupNode>,
        intro: Option<&'a MarkupNode>,
    ) {
        let marker = self.classifier.list_marker(list, ancestors, intro);
        ancestors.push(list);
        let mut ordinal = 0u32;
        for child in &list.children {
            if child.is_tag("li") {
                ordinal += 1;
                self.classify_element(child, Some(ListContext { ordinal, marker }));
                for nested in child.children.iter().filter(|n| is_list(n)) {
                    ancestors.push(child);
                    self.visit_list(nested, ancestors, None);
                    ancestors.pop();
                }
            } else if is_list(child) {
                self.visit_list(child, ancestors, None);
            } else if child.is_element() {
                self.classify_element(child, None);
            } else {
                let runs = tidy_runs(vec![InlineRun::plain(child.text.clone())]);
                if !runs.is_empty() {
                    self.push(BlockKind::InlineRun, runs);
                }
            }
        }
        ancestors.pop();
    }

    fn flush_loose(&mut self, loose: &mut Vec<InlineRun>, loose_text: &mut String) {
        let runs = tidy_runs(std::mem::take(loose));
        let text = std::mem::take(loose_text);
        if runs.is_empty() {
            return;
        }
        let kind = if self.classifier.is_signature_token(&text) {
            BlockKind::SignaturePlaceholder
        } else {
            BlockKind::InlineRun
        };
        self.push(kind, runs);
    }

    fn push(&mut self, kind: BlockKind, runs: Vec<InlineRun>) {
        self.blocks.push(Block::new(kind, runs));
    }

    fn classify_element(&mut self, node: &MarkupNode, list: Option<ListContext>) {
        let mut raw = Vec::new();
        collect_runs(node, Emphasis::default(), &mut raw);
        let runs = tidy_runs(raw);
        if runs.is_empty() {
            // non-signature images and empty content are the only drops
            return;
        }

        let text = collapse_whitespace(&node.text_content());
        let classifier = self.classifier;
        let heading = node.is_heading();
        let paragraph = node.is_tag("p") || node.is_tag("div");

        // 0. signature marker
        if classifier.is_signature_marker(node, &text) {
            self.push(BlockKind::SignaturePlaceholder, runs);
            return;
        }

        // 1. declaration banner
        if heading
            && text.to_lowercase().contains("declaration")
            && text.chars().count() < classifier.declaration_max_chars
        {
            self.push(
                BlockKind::DeclarationBanner,
                vec![InlineRun::new(DECLARATION_BANNER, Emphasis::BOLD)],
            );
            return;
        }

        // 2. address header
        let starts_address = ADDRESS_START.is_match(&text);
        if (heading || (paragraph && starts_address)) && classifier.is_address(&text, self.ctx) {
            self.push(BlockKind::AddressHeader, runs);
            return;
        }

        // 3. subject line
        if paragraph && SUBJECT_START.is_match(&text) {
            self.push(BlockKind::SubjectLine, runs);
            return;
        }

        // 4. salutation and closing
        if paragraph && classifier.openers.is_match(&text) {
            self.push(BlockKind::Salutation, embolden(runs));
            return;
        }
        if paragraph && classifier.closers.is_match(&text) {
            self.push(BlockKind::BodyParagraph, embolden(runs));
            return;
        }

        // 5. list item
        if let Some(ctx) = list {
            self.push(BlockKind::ListItem(ctx), runs);
            return;
        }

        // 7. everything else; stray headings keep their visual weight
        let runs = if heading { embolden(runs) } else { runs };
        self.push(BlockKind::BodyParagraph, runs);
    }
}
