//! Output backends over assembled document segments
//!
//! Every backend lays out the same sequence: blocks before the signature,
//! the signature block (image or "(Signature)", then name, place and date),
//! the remaining blocks, and the applicant-details footer unless the
//! content already carries one.

pub mod docx;
pub mod print;
pub mod signature;
pub mod text;

pub use docx::DocxRenderer;
pub use print::PrintRenderer;
pub use signature::{ImageFormat, SignatureImage};
pub use text::TextRenderer;

use crate::config::RenderConfig;
use crate::error::Result;
use crate::types::{placeholders, ApplicantContext, Block, DocumentSegments, InlineRun};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

pub const SIGNATURE_FALLBACK: &str = "(Signature)";
pub const APPLICANT_FOOTER_HEADING: &str = "Applicant Details:";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text for the clipboard
    Text,
    /// Paginated, self-contained HTML for printing
    Print,
    /// WordprocessingML package
    Docx,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Print => "html",
            OutputFormat::Docx => "docx",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "print" | "html" => Ok(OutputFormat::Print),
            "docx" | "word" => Ok(OutputFormat::Docx),
            other => Err(format!("unknown output format '{other}' (expected text, print or docx)")),
        }
    }
}

/// Applicant values and layout settings shared by all backends
pub struct RenderContext<'a> {
    pub applicant: &'a ApplicantContext,
    pub config: &'a RenderConfig,
    pub date: NaiveDate,
    signature: Option<SignatureImage>,
}

impl<'a> RenderContext<'a> {
    /// Resolves the date (context date or today) and decodes the signature
    /// image once. An undecodable image falls back to the text marker.
    pub fn new(applicant: &'a ApplicantContext, config: &'a RenderConfig) -> Self {
        let signature = applicant
            .signature()
            .and_then(|data| match SignatureImage::decode(data) {
                Ok(image) => Some(image),
                Err(err) => {
                    warn!("⚠️  Signature image unusable ({}), using text fallback", err);
                    None
                }
            });
        Self {
            applicant,
            config,
            date: applicant.date.unwrap_or_else(|| Local::now().date_naive()),
            signature,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn signature(&self) -> Option<&SignatureImage> {
        self.signature.as_ref()
    }

    pub fn formatted_date(&self) -> String {
        self.date.format(&self.config.date_format).to_string()
    }

    /// Name, place and date lines under the signature
    pub fn signature_lines(&self) -> Vec<String> {
        vec![
            self.applicant.name().unwrap_or(placeholders::NAME).to_string(),
            format!("Place: {}", self.applicant.place_name().unwrap_or(placeholders::PLACE)),
            format!("Date: {}", self.formatted_date()),
        ]
    }

    /// Heading plus one line per identity field
    pub fn applicant_footer(&self) -> Vec<String> {
        let a = self.applicant;
        vec![
            APPLICANT_FOOTER_HEADING.to_string(),
            format!("Name: {}", a.name().unwrap_or(placeholders::NAME)),
            format!("Address: {}", a.address().unwrap_or(placeholders::ADDRESS)),
            format!("Contact: {}", a.contact().unwrap_or(placeholders::CONTACT)),
            format!("Email: {}", a.email().unwrap_or(placeholders::EMAIL)),
        ]
    }
}

pub trait Renderer {
    fn format(&self) -> OutputFormat;
    fn render(&self, segments: &DocumentSegments, ctx: &RenderContext) -> Result<Vec<u8>>;
}

pub fn render_with_format(
    segments: &DocumentSegments,
    ctx: &RenderContext,
    format: OutputFormat,
) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Text => TextRenderer.render(segments, ctx),
        OutputFormat::Print => PrintRenderer.render(segments, ctx),
        OutputFormat::Docx => DocxRenderer.render(segments, ctx),
    }
}

/// Blocks after the signature; the placeholder block itself is replaced by
/// the signature and never rendered
pub(crate) fn trailing_blocks(segments: &DocumentSegments) -> impl Iterator<Item = &Block> {
    segments
        .after_signature
        .iter()
        .filter(|b| !b.is_signature_placeholder())
}

pub(crate) fn line_text(runs: &[InlineRun]) -> String {
    let text: String = runs.iter().map(|r| r.text.as_str()).collect();
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_format_names() {
        assert_eq!("TEXT".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert_eq!("html".parse::<OutputFormat>(), Ok(OutputFormat::Print));
        assert_eq!("docx".parse::<OutputFormat>(), Ok(OutputFormat::Docx));
        assert!("pdf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn missing_values_render_as_placeholders() {
        let applicant = ApplicantContext {
            applicant_name: Some("  ".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 3, 12),
            ..Default::default()
        };
        let config = RenderConfig::default();
        let ctx = RenderContext::new(&applicant, &config);
        assert_eq!(
            ctx.signature_lines(),
            vec!["[Your Name]", "Place: [Place]", "Date: 12/03/2024"]
        );
        assert_eq!(ctx.applicant_footer()[2], "Address: [Your Address]");
    }

    #[test]
    fn bad_signature_degrades_to_none() {
        let applicant = ApplicantContext {
            signature_image: Some("%%%".to_string()),
            ..Default::default()
        };
        let config = RenderConfig::default();
        assert!(RenderContext::new(&applicant, &config).signature().is_none());
    }
}
