//! WordprocessingML output
//!
//! The package is the minimum Word needs: content types, package and
//! document relationships, `word/document.xml`, a footer with page
//! numbers, and the signature image under `word/media/` when present.

use super::{trailing_blocks, OutputFormat, RenderContext, Renderer, SignatureImage, SIGNATURE_FALLBACK};
use crate::error::Result;
use crate::style::{Alignment, BlockStyle};
use crate::types::{Block, DocumentSegments, Emphasis, InlineRun};
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// 9525 EMUs per pixel at 96 dpi
const EMU_PER_PIXEL: u64 = 9525;
const TWIPS_PER_POINT: u32 = 20;
const SIGNATURE_REL_ID: &str = "rIdSignature";
const FOOTER_REL_ID: &str = "rIdFooter";

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const FOOTER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:ftr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t xml:space="preserve">Page </w:t></w:r><w:fldSimple w:instr="PAGE"><w:r><w:t>1</w:t></w:r></w:fldSimple><w:r><w:t xml:space="preserve"> of </w:t></w:r><w:fldSimple w:instr="NUMPAGES"><w:r><w:t>1</w:t></w:r></w:fldSimple></w:p></w:ftr>"#;

pub struct DocxRenderer;

impl Renderer for DocxRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Docx
    }

    fn render(&self, segments: &DocumentSegments, ctx: &RenderContext) -> Result<Vec<u8>> {
        let signature = ctx.signature();
        let document = document_xml(segments, ctx);

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut parts: Vec<(String, Vec<u8>)> = vec![
            ("[Content_Types].xml".to_string(), content_types(signature).into_bytes()),
            ("_rels/.rels".to_string(), ROOT_RELS.as_bytes().to_vec()),
            ("word/document.xml".to_string(), document.into_bytes()),
            ("word/_rels/document.xml.rels".to_string(), document_rels(signature).into_bytes()),
            ("word/footer1.xml".to_string(), FOOTER_XML.as_bytes().to_vec()),
        ];
        if let Some(image) = signature {
            parts.push((media_path(image), image.bytes.clone()));
        }

        for (path, contents) in &parts {
            zip.start_file(path.as_str(), options)?;
            zip.write_all(contents)?;
        }
        let bytes = zip.finish()?.into_inner();
        debug!("📦 Packaged .docx: {} part(s), {} bytes", parts.len(), bytes.len());
        Ok(bytes)
    }
}

fn media_path(image: &SignatureImage) -> String {
    format!("word/media/signature.{}", image.format.extension())
}

fn content_types(signature: Option<&SignatureImage>) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>"#,
    );
    if let Some(image) = signature {
        xml.push_str(&format!(
            r#"<Default Extension="{}" ContentType="{}"/>"#,
            image.format.extension(),
            image.format.mime_type()
        ));
    }
    xml.push_str(r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/footer1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/></Types>"#);
    xml
}

fn document_rels(signature: Option<&SignatureImage>) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    xml.push_str(&format!(
        r#"<Relationship Id="{FOOTER_REL_ID}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/>"#
    ));
    if let Some(image) = signature {
        xml.push_str(&format!(
            r#"<Relationship Id="{SIGNATURE_REL_ID}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/signature.{}"/>"#,
            image.format.extension()
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// Builds `word/document.xml` paragraph by paragraph
struct BodyWriter<'a> {
    output: String,
    ctx: &'a RenderContext<'a>,
}

impl<'a> BodyWriter<'a> {
    fn new(ctx: &'a RenderContext<'a>) -> Self {
        Self {
            output: String::new(),
            ctx,
        }
    }

    fn run_properties(&self, emphasis: Emphasis) -> String {
        let font = escape(self.ctx.config.font_family.as_str());
        let half_points = self.ctx.config.font_size_pt * 2;
        let mut props = format!(
            r#"<w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:cs="{font}"/>"#
        );
        if emphasis.bold {
            props.push_str("<w:b/>");
        }
        if emphasis.italic {
            props.push_str("<w:i/>");
        }
        if emphasis.underline {
            props.push_str(r#"<w:u w:val="single"/>"#);
        }
        props.push_str(&format!(r#"<w:sz w:val="{half_points}"/><w:szCs w:val="{half_points}"/></w:rPr>"#));
        props
    }

    fn text_run(&mut self, text: &str, emphasis: Emphasis) {
        let props = self.run_properties(emphasis);
        self.output.push_str(&format!(
            r#"<w:r>{props}<w:t xml:space="preserve">{}</w:t></w:r>"#,
            escape(text)
        ));
    }

    fn open_paragraph(&mut self, alignment: Alignment, indent_pt: u32, space_after_pt: u32) {
        self.output.push_str(&format!(
            r#"<w:p><w:pPr><w:spacing w:after="{}"/><w:ind w:left="{}"/><w:jc w:val="{}"/></w:pPr>"#,
            space_after_pt * TWIPS_PER_POINT,
            indent_pt * TWIPS_PER_POINT,
            alignment.ooxml()
        ));
    }

    fn close_paragraph(&mut self) {
        self.output.push_str("</w:p>");
    }

    fn block(&mut self, block: &Block) {
        let style = BlockStyle::for_block(block);
        let forced = Emphasis {
            bold: style.bold,
            italic: false,
            underline: style.underline,
        };

        self.open_paragraph(style.alignment, style.indent_pt, style.space_after_pt);
        if let Some(marker) = style.marker {
            self.text_run(&format!("{} ", marker.label()), forced);
        }
        for run in block.runs() {
            self.run(run, forced);
        }
        self.close_paragraph();
    }

    fn run(&mut self, run: &InlineRun, forced: Emphasis) {
        if run.is_line_break() {
            self.output.push_str("<w:r><w:br/></w:r>");
            return;
        }
        self.text_run(&run.text, run.emphasis.union(forced));
    }

    /// Plain left-aligned paragraph with one line per entry
    fn lines(&mut self, lines: &[String]) {
        self.open_paragraph(Alignment::Left, 0, 10);
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                self.output.push_str("<w:r><w:br/></w:r>");
            }
            self.text_run(line, Emphasis::default());
        }
        self.close_paragraph();
    }

    fn signature(&mut self) {
        let has_image = self.ctx.signature().is_some();
        self.open_paragraph(Alignment::Left, 0, 4);
        if has_image {
            self.drawing();
        } else {
            self.text_run(SIGNATURE_FALLBACK, Emphasis::default());
        }
        self.close_paragraph();
        let lines = self.ctx.signature_lines();
        self.lines(&lines);
    }

    fn drawing(&mut self) {
        let cx = self.ctx.config.signature_width_px as u64 * EMU_PER_PIXEL;
        let cy = self.ctx.config.signature_height_px as u64 * EMU_PER_PIXEL;
        self.output.push_str(&format!(
            r#"<w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0"><wp:extent cx="{cx}" cy="{cy}"/><wp:docPr id="1" name="Signature" descr="Applicant signature"/><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic><pic:nvPicPr><pic:cNvPr id="1" name="Signature"/><pic:cNvPicPr/></pic:nvPicPr><pic:blipFill><a:blip r:embed="{SIGNATURE_REL_ID}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill><pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#
        ));
    }

    fn finish(self) -> String {
        self.output
    }
}

fn document_xml(segments: &DocumentSegments, ctx: &RenderContext) -> String {
    let mut body = BodyWriter::new(ctx);
    for block in &segments.before_signature {
        body.block(block);
    }
    body.signature();
    for block in trailing_blocks(segments) {
        body.block(block);
    }
    if !segments.has_applicant_in_content {
        body.lines(&ctx.applicant_footer());
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><w:body>{}<w:sectPr><w:footerReference w:type="default" r:id="{FOOTER_REL_ID}"/><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr></w:body></w:document>"#,
        body.finish()
    )
}
