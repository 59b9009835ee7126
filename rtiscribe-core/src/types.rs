use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ===== MARKUP TREE =====
// Produced by the normalizer, owned by a single pipeline call.

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NodeKind {
    Text,
    Element,
}

/// Tag name given to the synthetic root of every parsed fragment
pub const ROOT_TAG: &str = "#root";

const VOID_TAGS: &[&str] = &[
    "br", "hr", "img", "input", "meta", "link", "col", "wbr", "area", "base", "source",
];

const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "big", "cite", "code", "em", "font", "i", "img", "kbd", "mark", "q",
    "s", "small", "span", "strike", "strong", "sub", "sup", "u", "br",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkupNode {
    pub kind: NodeKind,
    /// Lowercased tag name; empty for text nodes
    pub tag_name: String,
    /// Own text for text nodes; empty for elements (see `text_content`)
    pub text: String,
    pub children: Vec<MarkupNode>,
    pub attributes: BTreeMap<String, String>,
}

impl MarkupNode {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Text,
            tag_name: String::new(),
            text: text.into(),
            children: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn element(tag_name: &str, children: Vec<MarkupNode>) -> Self {
        Self {
            kind: NodeKind::Element,
            tag_name: tag_name.to_ascii_lowercase(),
            text: String::new(),
            children,
            attributes: BTreeMap::new(),
        }
    }

    pub fn root(children: Vec<MarkupNode>) -> Self {
        Self::element(ROOT_TAG, children)
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    pub fn is_root(&self) -> bool {
        self.is_element() && self.tag_name == ROOT_TAG
    }

    pub fn is_tag(&self, tag: &str) -> bool {
        self.is_element() && self.tag_name == tag
    }

    pub fn is_line_break(&self) -> bool {
        self.is_tag("br")
    }

    pub fn is_void(&self) -> bool {
        self.is_element() && is_void_tag(&self.tag_name)
    }

    /// Text nodes and phrasing elements (`b`, `em`, `span`, `br`, ...)
    pub fn is_inline(&self) -> bool {
        self.is_text() || INLINE_TAGS.contains(&self.tag_name.as_str())
    }

    pub fn is_heading(&self) -> bool {
        self.is_element()
            && self.tag_name.len() == 2
            && self.tag_name.starts_with('h')
            && matches!(self.tag_name.as_bytes()[1], b'1'..=b'6')
    }

    /// Aggregate text of this node and all descendants; `<br>` counts as a space
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self.kind {
            NodeKind::Text => out.push_str(&self.text),
            NodeKind::Element => {
                if self.is_line_break() {
                    out.push(' ');
                }
                for child in &self.children {
                    child.collect_text(out);
                }
            }
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// True when any descendant is not phrasing content
    pub fn has_block_children(&self) -> bool {
        self.children.iter().any(|c| !c.is_inline())
    }
}

pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// Collapse whitespace runs to single spaces and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ===== CLASSIFIED BLOCKS =====

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Emphasis {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Emphasis {
    pub const BOLD: Emphasis = Emphasis {
        bold: true,
        italic: false,
        underline: false,
    };

    /// Additive merge: flags are only ever added, never cleared
    pub fn union(self, other: Emphasis) -> Emphasis {
        Emphasis {
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
            underline: self.underline || other.underline,
        }
    }

    pub fn is_plain(&self) -> bool {
        !self.bold && !self.italic && !self.underline
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InlineRun {
    pub text: String,
    pub emphasis: Emphasis,
}

impl InlineRun {
    pub fn new(text: impl Into<String>, emphasis: Emphasis) -> Self {
        Self {
            text: text.into(),
            emphasis,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Emphasis::default())
    }

    pub fn line_break() -> Self {
        Self::plain("\n")
    }

    pub fn is_line_break(&self) -> bool {
        self.text == "\n"
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ListMarker {
    Numeric,
    Bullet,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListContext {
    /// 1-based position inside the enclosing list container
    pub ordinal: u32,
    pub marker: ListMarker,
}

impl ListContext {
    /// Visible marker text: "3." for numeric lists, a bullet glyph otherwise
    pub fn label(&self) -> String {
        match self.marker {
            ListMarker::Numeric => format!("{}.", self.ordinal),
            ListMarker::Bullet => "•".to_string(),
        }
    }
}

/// Semantic kind of a block. List context lives inside `ListItem`, so a
/// block carries one exactly when it is a list item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BlockKind {
    AddressHeader,
    SubjectLine,
    Salutation,
    BodyParagraph,
    DeclarationBanner,
    ListItem(ListContext),
    InlineRun,
    SignaturePlaceholder,
}

impl BlockKind {
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::AddressHeader => "AddressHeader",
            BlockKind::SubjectLine => "SubjectLine",
            BlockKind::Salutation => "Salutation",
            BlockKind::BodyParagraph => "BodyParagraph",
            BlockKind::DeclarationBanner => "DeclarationBanner",
            BlockKind::ListItem(_) => "ListItem",
            BlockKind::InlineRun => "InlineRun",
            BlockKind::SignaturePlaceholder => "SignaturePlaceholder",
        }
    }
}

/// Immutable classified unit. Constructed by the classifier; the assembler
/// only segments sequences of blocks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    kind: BlockKind,
    runs: Vec<InlineRun>,
}

impl Block {
    pub fn new(kind: BlockKind, runs: Vec<InlineRun>) -> Self {
        Self { kind, runs }
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn runs(&self) -> &[InlineRun] {
        &self.runs
    }

    pub fn list_context(&self) -> Option<ListContext> {
        match self.kind {
            BlockKind::ListItem(ctx) => Some(ctx),
            _ => None,
        }
    }

    pub fn is_signature_placeholder(&self) -> bool {
        self.kind == BlockKind::SignaturePlaceholder
    }

    /// Concatenated run text; line breaks stay as '\n'
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Runs grouped into visual lines, split at line-break runs
    pub fn lines(&self) -> Vec<&[InlineRun]> {
        self.runs
            .split(|r| r.is_line_break())
            .filter(|line| line.iter().any(|r| !r.text.trim().is_empty()))
            .collect()
    }
}

// ===== ASSEMBLED DOCUMENT =====

/// Where the assembler anchored the signature
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SplitPoint {
    /// Explicit marker block; it opens `after_signature`
    Placeholder,
    /// After the block holding the closing phrase
    Closing,
    /// No anchor found, signature goes after everything
    End,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSegments {
    pub before_signature: Vec<Block>,
    pub after_signature: Vec<Block>,
    pub has_signature_placeholder: bool,
    /// Content already carries an "Applicant:" block, so renderers skip the footer
    pub has_applicant_in_content: bool,
    pub signature_present: bool,
    pub split: SplitPoint,
}

impl DocumentSegments {
    /// All blocks in document order, signature position excluded
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.before_signature.iter().chain(self.after_signature.iter())
    }

    pub fn block_count(&self) -> usize {
        self.before_signature.len() + self.after_signature.len()
    }
}

// ===== COMPLIANCE =====

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Severity {
    Mandatory,
    Important,
    Minor,
}

impl Severity {
    /// Mandatory and important findings block compliance
    pub fn is_blocking(&self) -> bool {
        matches!(self, Severity::Mandatory | Severity::Important)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComplianceReport {
    pub score: u8,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
    pub compliance_points: Vec<String>,
    pub is_compliant: bool,
    pub analysis_summary: String,
}

// ===== APPLICANT CONTEXT =====

pub mod placeholders {
    pub const NAME: &str = "[Your Name]";
    pub const ADDRESS: &str = "[Your Address]";
    pub const CONTACT: &str = "[Your Contact Number]";
    pub const EMAIL: &str = "[Your Email]";
    pub const DEPARTMENT: &str = "[Department Name]";
    pub const PLACE: &str = "[Place]";
}

/// Read-only context supplied by the host application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicantContext {
    pub applicant_name: Option<String>,
    pub applicant_address: Option<String>,
    pub applicant_contact: Option<String>,
    pub applicant_email: Option<String>,
    pub department_name: Option<String>,
    /// Base64 image data, optionally as a `data:` URL
    pub signature_image: Option<String>,
    pub place: Option<String>,
    pub date: Option<NaiveDate>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ApplicantContext {
    pub fn name(&self) -> Option<&str> {
        present(&self.applicant_name)
    }

    pub fn address(&self) -> Option<&str> {
        present(&self.applicant_address)
    }

    pub fn contact(&self) -> Option<&str> {
        present(&self.applicant_contact)
    }

    pub fn email(&self) -> Option<&str> {
        present(&self.applicant_email)
    }

    pub fn department(&self) -> Option<&str> {
        present(&self.department_name)
    }

    pub fn place_name(&self) -> Option<&str> {
        present(&self.place)
    }

    pub fn signature(&self) -> Option<&str> {
        present(&self.signature_image)
    }

    pub fn identity(&self) -> IdentityFields {
        IdentityFields {
            name: self.name().map(str::to_string),
            address: self.address().map(str::to_string),
            contact: self.contact().map(str::to_string),
            email: self.email().map(str::to_string),
        }
    }

    pub fn classifier_context(&self) -> ClassifierContext {
        ClassifierContext {
            department_name: self.department().map(str::to_string),
            applicant_name: self.name().map(str::to_string),
        }
    }
}

/// Applicant identity values the sanitizer strips as duplicates
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityFields {
    pub name: Option<String>,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassifierContext {
    pub department_name: Option<String>,
    pub applicant_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emphasis_union_never_clears_flags() {
        let outer = Emphasis {
            bold: true,
            italic: true,
            underline: false,
        };
        let inner = Emphasis::default();
        let merged = outer.union(inner);
        assert!(merged.bold && merged.italic && !merged.underline);
    }

    #[test]
    fn block_lines_split_at_breaks() {
        let block = Block::new(
            BlockKind::AddressHeader,
            vec![
                InlineRun::plain("To,"),
                InlineRun::line_break(),
                InlineRun::plain("The Public Information Officer,"),
                InlineRun::line_break(),
                InlineRun::line_break(),
                InlineRun::plain("Water Board"),
            ],
        );
        let lines = block.lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2][0].text, "Water Board");
    }

    #[test]
    fn list_context_only_on_list_items() {
        let ctx = ListContext {
            ordinal: 2,
            marker: ListMarker::Numeric,
        };
        let item = Block::new(BlockKind::ListItem(ctx), vec![InlineRun::plain("x")]);
        let para = Block::new(BlockKind::BodyParagraph, vec![InlineRun::plain("x")]);
        assert_eq!(item.list_context().map(|c| c.label()), Some("2.".to_string()));
        assert!(para.list_context().is_none());
    }

    #[test]
    fn text_content_treats_breaks_as_spaces() {
        let node = MarkupNode::element(
            "h3",
            vec![
                MarkupNode::text("To,"),
                MarkupNode::element("br", vec![]),
                MarkupNode::text("PIO"),
            ],
        );
        assert_eq!(node.text_content(), "To, PIO");
        assert!(node.is_heading());
    }

    #[test]
    fn blank_context_fields_are_absent() {
        let ctx = ApplicantContext {
            applicant_name: Some("   ".into()),
            applicant_email: Some("priya@example.com".into()),
            ..Default::default()
        };
        let identity = ctx.identity();
        assert_eq!(identity.name, None);
        assert_eq!(identity.email.as_deref(), Some("priya@example.com"));
    }
}
