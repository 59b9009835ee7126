use super::{line_text, trailing_blocks, OutputFormat, RenderContext, Renderer, SIGNATURE_FALLBACK};
use crate::error::Result;
use crate::types::{Block, BlockKind, DocumentSegments};

/// Plain text for the clipboard. Emphasis is dropped; list items keep their
/// markers and the signature is always the text marker.
pub struct TextRenderer;

impl TextRenderer {
    pub fn render_string(&self, segments: &DocumentSegments, ctx: &RenderContext) -> String {
        let mut out = TextBuffer::default();

        for block in &segments.before_signature {
            out.push_block(block);
        }

        let mut signature = vec![SIGNATURE_FALLBACK.to_string()];
        signature.extend(ctx.signature_lines());
        out.push_paragraph(&signature);

        for block in trailing_blocks(segments) {
            out.push_block(block);
        }

        if !segments.has_applicant_in_content {
            out.push_paragraph(&ctx.applicant_footer());
        }

        out.finish()
    }
}

impl Renderer for TextRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Text
    }

    fn render(&self, segments: &DocumentSegments, ctx: &RenderContext) -> Result<Vec<u8>> {
        Ok(self.render_string(segments, ctx).into_bytes())
    }
}

#[derive(Default)]
struct TextBuffer {
    out: String,
    last_was_list_item: bool,
}

impl TextBuffer {
    fn separate(&mut self, list_item: bool) {
        if !self.out.is_empty() {
            // consecutive list items stay on adjacent lines
            self.out.push_str(if list_item && self.last_was_list_item { "\n" } else { "\n\n" });
        }
        self.last_was_list_item = list_item;
    }

    fn push_block(&mut self, block: &Block) {
        let lines: Vec<String> = block
            .lines()
            .into_iter()
            .map(line_text)
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() {
            return;
        }

        let marker = match block.kind() {
            BlockKind::ListItem(ctx) => Some(ctx.label()),
            _ => None,
        };
        self.separate(marker.is_some());

        match marker {
            Some(label) => {
                let indent = " ".repeat(label.chars().count() + 1);
                for (i, line) in lines.iter().enumerate() {
                    if i == 0 {
                        self.out.push_str(&label);
                        self.out.push(' ');
                    } else {
                        self.out.push('\n');
                        self.out.push_str(&indent);
                    }
                    self.out.push_str(line);
                }
            }
            None => self.out.push_str(&lines.join("\n")),
        }
    }

    fn push_paragraph(&mut self, lines: &[String]) {
        self.separate(false);
        self.out.push_str(&lines.join("\n"));
    }

    fn finish(mut self) -> String {
        self.out.push('\n');
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::types::*;
    use chrono::NaiveDate;

    fn block(kind: BlockKind, text: &str) -> Block {
        Block::new(kind, vec![InlineRun::plain(text)])
    }

    fn item(ordinal: u32) -> Block {
        block(
            BlockKind::ListItem(ListContext {
                ordinal,
                marker: ListMarker::Numeric,
            }),
            &format!("Item {ordinal}"),
        )
    }

    fn render(segments: &DocumentSegments, applicant: &ApplicantContext) -> String {
        let config = RenderConfig::default();
        let ctx = RenderContext::new(applicant, &config);
        TextRenderer.render_string(segments, &ctx)
    }

    fn applicant() -> ApplicantContext {
        ApplicantContext {
            applicant_name: Some("Priya Sharma".to_string()),
            place: Some("New Delhi".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 3, 12),
            ..Default::default()
        }
    }

    #[test]
    fn lays_out_signature_between_segments() {
        let segments = DocumentSegments {
            before_signature: vec![
                Block::new(
                    BlockKind::AddressHeader,
                    vec![InlineRun::plain("To,"), InlineRun::line_break(), InlineRun::plain("The PIO")],
                ),
                item(1),
                item(2),
                block(BlockKind::BodyParagraph, "Yours faithfully,"),
            ],
            after_signature: vec![block(BlockKind::DeclarationBanner, "DECLARATION")],
            has_signature_placeholder: false,
            has_applicant_in_content: true,
            signature_present: false,
            split: SplitPoint::Closing,
        };
        let text = render(&segments, &applicant());
        assert_eq!(
            text,
            "To,\nThe PIO\n\n1. Item 1\n2. Item 2\n\nYours faithfully,\n\n(Signature)\nPriya Sharma\nPlace: New Delhi\nDate: 12/03/2024\n\nDECLARATION\n"
        );
    }

    #[test]
    fn placeholder_block_is_replaced_and_footer_added() {
        let segments = DocumentSegments {
            before_signature: vec![block(BlockKind::BodyParagraph, "Body")],
            after_signature: vec![
                block(BlockKind::SignaturePlaceholder, "[SIGNATURE]"),
                block(BlockKind::BodyParagraph, "After"),
            ],
            has_signature_placeholder: true,
            has_applicant_in_content: false,
            signature_present: false,
            split: SplitPoint::Placeholder,
        };
        let text = render(&segments, &applicant());
        assert!(!text.contains("[SIGNATURE]"));
        assert!(text.contains("Date: 12/03/2024\n\nAfter\n\nApplicant Details:\nName: Priya Sharma\nAddress: [Your Address]"));
    }
}
