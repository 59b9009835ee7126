use super::{line_text, trailing_blocks, OutputFormat, RenderContext, Renderer, SIGNATURE_FALLBACK};
use crate::error::Result;
use crate::style::BlockStyle;
use crate::types::{Block, DocumentSegments, InlineRun};
use quick_xml::escape::{escape, partial_escape};
use tracing::debug;

/// Lines an embedded signature image occupies in the page estimate
const SIGNATURE_IMAGE_LINES: usize = 4;

/// Self-contained A4 HTML. Blocks are packed into pages by an estimated
/// line budget and never split across pages.
pub struct PrintRenderer;

/// One unbreakable piece of page content
struct PrintUnit {
    html: String,
    lines: usize,
}

impl PrintRenderer {
    pub fn render_string(&self, segments: &DocumentSegments, ctx: &RenderContext) -> String {
        let cpl = ctx.config.chars_per_line.max(1);
        let mut units: Vec<PrintUnit> = segments
            .before_signature
            .iter()
            .map(|b| block_unit(b, cpl))
            .collect();
        units.push(signature_unit(ctx));
        units.extend(trailing_blocks(segments).map(|b| block_unit(b, cpl)));
        if !segments.has_applicant_in_content {
            units.push(lines_unit(&ctx.applicant_footer(), cpl));
        }

        let pages = paginate(units, ctx.config.lines_per_page.max(1));
        debug!("🖨️  Print layout: {} page(s)", pages.len());
        document_html(&pages, ctx)
    }
}

impl Renderer for PrintRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Print
    }

    fn render(&self, segments: &DocumentSegments, ctx: &RenderContext) -> Result<Vec<u8>> {
        Ok(self.render_string(segments, ctx).into_bytes())
    }
}

/// Wrapped line count of one visual line, at least 1
fn estimate_lines(text: &str, chars_per_line: usize) -> usize {
    text.chars().count().div_ceil(chars_per_line).max(1)
}

fn paginate(units: Vec<PrintUnit>, budget: usize) -> Vec<Vec<PrintUnit>> {
    let mut pages = Vec::new();
    let mut current: Vec<PrintUnit> = Vec::new();
    let mut used = 0;

    for unit in units {
        if used + unit.lines > budget && !current.is_empty() {
            pages.push(std::mem::take(&mut current));
            used = 0;
        }
        used += unit.lines;
        current.push(unit);
    }
    if !current.is_empty() || pages.is_empty() {
        pages.push(current);
    }
    pages
}

fn runs_html(runs: &[InlineRun]) -> String {
    let mut html = String::new();
    for run in runs {
        if run.is_line_break() {
            html.push_str("<br>");
            continue;
        }
        let mut piece = partial_escape(run.text.as_str()).into_owned();
        if run.emphasis.underline {
            piece = format!("<u>{piece}</u>");
        }
        if run.emphasis.italic {
            piece = format!("<em>{piece}</em>");
        }
        if run.emphasis.bold {
            piece = format!("<strong>{piece}</strong>");
        }
        html.push_str(&piece);
    }
    html
}

fn style_attr(style: &BlockStyle) -> String {
    let mut css = format!(
        "text-align: {}; margin: 0 0 {}pt {}pt;",
        style.alignment.css(),
        style.space_after_pt,
        style.indent_pt
    );
    if style.bold {
        css.push_str(" font-weight: bold;");
    }
    if style.underline {
        css.push_str(" text-decoration: underline;");
    }
    css
}

fn block_unit(block: &Block, chars_per_line: usize) -> PrintUnit {
    let style = BlockStyle::for_block(block);
    let marker = style
        .marker
        .map(|m| format!("<span class=\"marker\">{}</span> ", partial_escape(m.label().as_str())))
        .unwrap_or_default();

    let lines: usize = block
        .lines()
        .into_iter()
        .map(|line| estimate_lines(&line_text(line), chars_per_line))
        .sum();

    PrintUnit {
        html: format!(
            "<p class=\"{}\" style=\"{}\">{}{}</p>",
            block.kind().name(),
            style_attr(&style),
            marker,
            runs_html(block.runs())
        ),
        lines: lines.max(1) + 1,
    }
}

fn lines_unit(lines: &[String], chars_per_line: usize) -> PrintUnit {
    let html: Vec<String> = lines
        .iter()
        .map(|l| partial_escape(l.as_str()).into_owned())
        .collect();
    PrintUnit {
        html: format!("<p class=\"closing-lines\">{}</p>", html.join("<br>")),
        lines: lines.iter().map(|l| estimate_lines(l, chars_per_line)).sum::<usize>() + 1,
    }
}

fn signature_unit(ctx: &RenderContext) -> PrintUnit {
    let (mark, mark_lines) = match ctx.signature() {
        Some(image) => (
            format!(
                "<img class=\"signature\" src=\"{}\" alt=\"Signature\" width=\"{}\" height=\"{}\">",
                image.data_url(),
                ctx.config.signature_width_px,
                ctx.config.signature_height_px
            ),
            SIGNATURE_IMAGE_LINES,
        ),
        None => (partial_escape(SIGNATURE_FALLBACK).into_owned(), 1),
    };
    let details: Vec<String> = ctx
        .signature_lines()
        .iter()
        .map(|l| partial_escape(l.as_str()).into_owned())
        .collect();
    PrintUnit {
        html: format!(
            "<div class=\"signature-block\"><p>{}</p><p>{}</p></div>",
            mark,
            details.join("<br>")
        ),
        lines: mark_lines + details.len() + 1,
    }
}

fn document_html(pages: &[Vec<PrintUnit>], ctx: &RenderContext) -> String {
    let total = pages.len();
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>RTI Application</title>\n<style>\n");
    html.push_str("@page { size: A4; margin: 20mm; }\n");
    html.push_str(&format!(
        "body {{ font-family: \"{}\", serif; font-size: {}pt; line-height: 1.4; }}\n",
        escape(ctx.config.font_family.as_str()),
        ctx.config.font_size_pt
    ));
    html.push_str(".page { position: relative; min-height: 257mm; page-break-after: always; }\n");
    html.push_str(".page:last-child { page-break-after: auto; }\n");
    html.push_str(".page-number { position: absolute; bottom: 0; width: 100%; text-align: center; font-size: 10pt; }\n");
    html.push_str(".signature-block { margin: 16pt 0; }\n");
    html.push_str("</style>\n</head>\n<body>\n");

    for (index, page) in pages.iter().enumerate() {
        html.push_str("<section class=\"page\">\n");
        for unit in page {
            html.push_str(&unit.html);
            html.push('\n');
        }
        html.push_str(&format!(
            "<footer class=\"page-number\">Page {} of {}</footer>\n</section>\n",
            index + 1,
            total
        ));
    }

    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::types::*;

    fn paragraph(text: &str) -> Block {
        Block::new(BlockKind::BodyParagraph, vec![InlineRun::plain(text)])
    }

    fn segments(blocks: Vec<Block>) -> DocumentSegments {
        DocumentSegments {
            before_signature: blocks,
            after_signature: Vec::new(),
            has_signature_placeholder: false,
            has_applicant_in_content: false,
            signature_present: false,
            split: SplitPoint::End,
        }
    }

    #[test]
    fn packs_blocks_without_splitting() {
        let units = vec![
            PrintUnit { html: "a".into(), lines: 6 },
            PrintUnit { html: "b".into(), lines: 5 },
            PrintUnit { html: "c".into(), lines: 20 },
            PrintUnit { html: "d".into(), lines: 1 },
        ];
        let pages = paginate(units, 10);
        let layout: Vec<Vec<&str>> = pages
            .iter()
            .map(|p| p.iter().map(|u| u.html.as_str()).collect())
            .collect();
        assert_eq!(layout, vec![vec!["a"], vec!["b"], vec!["c"], vec!["d"]]);
    }

    #[test]
    fn every_page_is_numbered() {
        let applicant = ApplicantContext::default();
        let config = RenderConfig {
            lines_per_page: 8,
            ..Default::default()
        };
        let ctx = RenderContext::new(&applicant, &config);
        let blocks = (0..6).map(|i| paragraph(&format!("Paragraph {i}"))).collect();
        let html = PrintRenderer.render_string(&segments(blocks), &ctx);

        let pages = html.matches("<section class=\"page\">").count();
        assert!(pages > 1);
        for n in 1..=pages {
            assert!(html.contains(&format!("Page {n} of {pages}")));
        }
        assert!(html.contains("@page { size: A4"));
        assert!(html.contains(SIGNATURE_FALLBACK));
        assert!(html.contains("Applicant Details:"));
    }

    #[test]
    fn escapes_text_and_keeps_emphasis() {
        let block = Block::new(
            BlockKind::BodyParagraph,
            vec![
                InlineRun::new("Fee < Rs. 20", Emphasis::BOLD),
                InlineRun::line_break(),
                InlineRun::plain("next"),
            ],
        );
        let unit = block_unit(&block, 90);
        assert!(unit.html.contains("<strong>Fee &lt; Rs. 20</strong><br>next"));
        assert_eq!(unit.lines, 3);
    }

    #[test]
    fn long_lines_wrap_in_the_estimate() {
        assert_eq!(estimate_lines("", 90), 1);
        assert_eq!(estimate_lines(&"x".repeat(91), 90), 2);
    }
}
