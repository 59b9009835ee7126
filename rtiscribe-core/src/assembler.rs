use crate::types::*;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static CLOSING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\byours\s+faithfully\b").unwrap());

static APPLICANT_LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bapplicant(?:\s+(?:name|details))?\s*:").unwrap());

/// Splits classified blocks at the signature position
pub struct DocumentAssembler;

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Partition blocks into the parts before and after the signature.
    ///
    /// Split preference: an explicit signature placeholder (it opens the
    /// after part), then the first "Yours faithfully" block (signature goes
    /// right after it), then the end of the sequence. Blocks are moved, never
    /// reordered, copied or dropped.
    pub fn assemble(&self, blocks: Vec<Block>, signature_present: bool) -> DocumentSegments {
        let has_applicant_in_content = blocks
            .iter()
            .any(|b| APPLICANT_LABEL_REGEX.is_match(&b.text()));

        let placeholder = blocks.iter().position(Block::is_signature_placeholder);
        let closing = blocks.iter().position(|b| CLOSING_REGEX.is_match(&b.text()));

        let (split_at, split) = match (placeholder, closing) {
            (Some(index), _) => (index, SplitPoint::Placeholder),
            (None, Some(index)) => (index + 1, SplitPoint::Closing),
            (None, None) => (blocks.len(), SplitPoint::End),
        };

        let mut before_signature = blocks;
        let after_signature = before_signature.split_off(split_at);

        debug!(
            "🏗️  Assembled {} block(s): {} before signature, {} after ({:?})",
            before_signature.len() + after_signature.len(),
            before_signature.len(),
            after_signature.len(),
            split
        );

        DocumentSegments {
            before_signature,
            after_signature,
            has_signature_placeholder: placeholder.is_some(),
            has_applicant_in_content,
            signature_present,
            split,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(kind: BlockKind, text: &str) -> Block {
        Block::new(kind, vec![InlineRun::plain(text)])
    }

    fn sample() -> Vec<Block> {
        vec![
            block(BlockKind::AddressHeader, "To,"),
            block(BlockKind::BodyParagraph, "Body"),
            block(BlockKind::BodyParagraph, "Yours faithfully,"),
            block(BlockKind::DeclarationBanner, "DECLARATION"),
        ]
    }

    fn assert_complete(input: &[Block], segments: &DocumentSegments) {
        let joined: Vec<Block> = segments.blocks().cloned().collect();
        assert_eq!(joined, input);
    }

    #[test]
    fn placeholder_opens_after_part() {
        let mut blocks = sample();
        blocks.insert(3, block(BlockKind::SignaturePlaceholder, "[SIGNATURE]"));
        let segments = DocumentAssembler::new().assemble(blocks.clone(), true);
        assert_eq!(segments.split, SplitPoint::Placeholder);
        assert!(segments.has_signature_placeholder);
        assert_eq!(segments.before_signature.len(), 3);
        assert!(segments.after_signature[0].is_signature_placeholder());
        assert_complete(&blocks, &segments);
    }

    #[test]
    fn closing_anchors_split_after_it() {
        let blocks = sample();
        let segments = DocumentAssembler::new().assemble(blocks.clone(), false);
        assert_eq!(segments.split, SplitPoint::Closing);
        assert_eq!(segments.before_signature.len(), 3);
        assert_eq!(segments.after_signature.len(), 1);
        assert!(!segments.has_signature_placeholder);
        assert_complete(&blocks, &segments);
    }

    #[test]
    fn no_anchor_splits_at_end() {
        let blocks = vec![block(BlockKind::BodyParagraph, "Only body")];
        let segments = DocumentAssembler::new().assemble(blocks.clone(), false);
        assert_eq!(segments.split, SplitPoint::End);
        assert!(segments.after_signature.is_empty());
        assert_complete(&blocks, &segments);
    }

    #[test]
    fn empty_input_is_fine() {
        let segments = DocumentAssembler::new().assemble(Vec::new(), false);
        assert_eq!(segments.block_count(), 0);
        assert_eq!(segments.split, SplitPoint::End);
    }

    #[test]
    fn detects_applicant_block() {
        let mut blocks = sample();
        blocks.push(block(BlockKind::BodyParagraph, "Applicant Details: Priya"));
        let segments = DocumentAssembler::new().assemble(blocks, false);
        assert!(segments.has_applicant_in_content);

        let segments = DocumentAssembler::new().assemble(sample(), false);
        assert!(!segments.has_applicant_in_content);
    }
}
