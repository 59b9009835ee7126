use crate::types::{Block, BlockKind, ListContext};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Justify,
}

impl Alignment {
    pub fn css(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Justify => "justify",
        }
    }

    /// WordprocessingML `w:jc` value
    pub fn ooxml(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Justify => "both",
        }
    }
}

/// Layout decision for one block, shared by every renderer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockStyle {
    pub alignment: Alignment,
    /// Force bold on every run (runs may already carry their own emphasis)
    pub bold: bool,
    pub underline: bool,
    /// Left indent in points
    pub indent_pt: u32,
    /// Space after the block in points
    pub space_after_pt: u32,
    /// List position; renders as "2." or "•"
    pub marker: Option<ListContext>,
}

const BODY: BlockStyle = BlockStyle {
    alignment: Alignment::Justify,
    bold: false,
    underline: false,
    indent_pt: 0,
    space_after_pt: 10,
    marker: None,
};

impl BlockStyle {
    pub fn for_block(block: &Block) -> Self {
        match block.kind() {
            BlockKind::AddressHeader => BlockStyle {
                alignment: Alignment::Left,
                space_after_pt: 14,
                ..BODY
            },
            BlockKind::SubjectLine => BlockStyle {
                alignment: Alignment::Left,
                bold: true,
                space_after_pt: 14,
                ..BODY
            },
            BlockKind::Salutation => BlockStyle {
                alignment: Alignment::Left,
                bold: true,
                ..BODY
            },
            BlockKind::DeclarationBanner => BlockStyle {
                alignment: Alignment::Center,
                bold: true,
                underline: true,
                space_after_pt: 8,
                ..BODY
            },
            BlockKind::ListItem(ctx) => BlockStyle {
                alignment: Alignment::Left,
                indent_pt: 24,
                space_after_pt: 4,
                marker: Some(ctx),
                ..BODY
            },
            BlockKind::SignaturePlaceholder => BlockStyle {
                alignment: Alignment::Left,
                ..BODY
            },
            BlockKind::InlineRun | BlockKind::BodyParagraph => BODY,
        }
    }
}
