use crate::error::{Result, ScribeError};
use crate::sanitizer::{CleanupRule, RuleTarget};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// Default value functions for serde
fn default_max_passes() -> usize {
    crate::sanitizer::DEFAULT_MAX_PASSES
}

fn default_rule_target() -> RuleTarget {
    RuleTarget::Markup
}

/// Whether exports rebuild the application around a sanitized body
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExportMode {
    #[default]
    Canonical,
    AsAuthored,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub mode: ExportMode,
    #[serde(default)]
    pub sanitizer: SanitizerConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub compliance: ComplianceConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizerConfig {
    /// Phrases added to the standard catalog
    #[serde(default)]
    pub extra_phrases: Vec<String>,
    /// Additional cleanup rules merged into the ordered rule table
    #[serde(default)]
    pub extra_rules: Vec<CleanupRuleConfig>,
    /// Upper bound on structural + residual passes per call
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            extra_phrases: Vec::new(),
            extra_rules: Vec::new(),
            max_passes: default_max_passes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupRuleConfig {
    pub name: String,
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
    #[serde(default)]
    pub applies_before: Vec<String>,
    #[serde(default = "default_rule_target")]
    pub target: RuleTarget,
}

impl CleanupRuleConfig {
    pub fn to_rule(&self) -> Result<CleanupRule> {
        let before: Vec<&str> = self.applies_before.iter().map(String::as_str).collect();
        Ok(CleanupRule::new(&self.name, &self.pattern, &self.replacement)?
            .before(&before)
            .on(self.target))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Markers that make a heading an address block
    pub authority_markers: Vec<String>,
    /// Paragraph openers classified as salutations
    pub formal_openers: Vec<String>,
    /// Closing phrases rendered bold
    pub closers: Vec<String>,
    /// Item phrases that vote for numeric list markers
    pub action_verbs: Vec<String>,
    /// Context phrase that forces numeric list markers
    pub list_trigger: String,
    /// Headings mentioning "declaration" shorter than this become banners
    pub declaration_max_chars: usize,
    /// Whole-text tokens that mark the signature position
    pub signature_tokens: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            authority_markers: [
                "Public Information Officer",
                "PIO",
                "CPIO",
                "SPIO",
                "Appellate Authority",
                "Department",
                "Office of",
                "Authority",
                "Ministry",
                "Municipal",
                "Corporation",
                "Directorate",
                "Commissioner",
                "Collector",
                "Board",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            formal_openers: ["Respected", "Dear"].iter().map(|s| s.to_string()).collect(),
            closers: ["Yours faithfully", "Yours sincerely", "Yours truly", "Thank you", "Thanking you"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            action_verbs: ["provide", "list of all", "details of", "copies of", "furnish"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            list_trigger: "information requested".to_string(),
            declaration_max_chars: 20,
            signature_tokens: ["[SIGNATURE]", "{{signature}}", "[SIGN]", "<<signature>>"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Deduction per missing rubric element. Must not total more than 100.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RubricWeights {
    pub act_reference: u32,
    pub authority: u32,
    pub declaration: u32,
    pub fee: u32,
    pub section_6_1: u32,
    pub information_list: u32,
    pub timeline: u32,
    pub exemption_clause: u32,
    pub salutation: u32,
    pub subject: u32,
    pub date: u32,
    pub applicant_details: u32,
    pub adequate_length: u32,
    pub assertive_language: u32,
}

impl Default for RubricWeights {
    fn default() -> Self {
        Self {
            act_reference: 15,
            authority: 15,
            declaration: 15,
            fee: 15,
            section_6_1: 8,
            information_list: 8,
            timeline: 8,
            exemption_clause: 2,
            salutation: 2,
            subject: 2,
            date: 2,
            applicant_details: 2,
            adequate_length: 2,
            assertive_language: 4,
        }
    }
}

impl RubricWeights {
    /// Sum of all weights, saturating at `u32::MAX`
    pub fn total(&self) -> u32 {
        [
            self.act_reference,
            self.authority,
            self.declaration,
            self.fee,
            self.section_6_1,
            self.information_list,
            self.timeline,
            self.exemption_clause,
            self.salutation,
            self.subject,
            self.date,
            self.applicant_details,
            self.adequate_length,
            self.assertive_language,
        ]
        .into_iter()
        .fold(0u32, u32::saturating_add)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceConfig {
    pub weights: RubricWeights,
    /// Minimum score for a compliant report (blocking issues also fail it)
    pub compliant_threshold: u8,
    /// Enumerated lines that count as an information-request list
    pub min_list_items: usize,
    /// Word count that stands in for an explicit list
    pub list_word_alternative: usize,
    /// Word count for the adequate-length rule
    pub min_words: usize,
    /// Phrases that make the tone deferential instead of assertive
    pub deferential_phrases: Vec<String>,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            weights: RubricWeights::default(),
            compliant_threshold: 90,
            min_list_items: 2,
            list_word_alternative: 150,
            min_words: 100,
            deferential_phrases: ["please", "kindly", "request you", "humbly", "beg to"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub font_family: String,
    pub font_size_pt: u32,
    /// chrono format string for the date line and `[DATE]`
    pub date_format: String,
    /// Print layout: estimated characters per printed line
    pub chars_per_line: usize,
    /// Print layout: line budget per A4 page
    pub lines_per_page: usize,
    /// Signature image width in the .docx, in pixels at 96 dpi
    pub signature_width_px: u32,
    pub signature_height_px: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_family: "Times New Roman".to_string(),
            font_size_pt: 12,
            date_format: "%d/%m/%Y".to_string(),
            chars_per_line: 90,
            lines_per_page: 46,
            signature_width_px: 150,
            signature_height_px: 60,
        }
    }
}

impl PipelineConfig {
    /// Load config from a YAML file and validate it
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => match Self::load_from_file(p) {
                Ok(config) => {
                    info!("📁 Loaded pipeline config from {}", p);
                    config
                }
                Err(err) => {
                    warn!("⚠️  Failed to load config from {} ({}), using defaults", p, err);
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let total = self.compliance.weights.total();
        if total > 100 {
            return Err(ScribeError::InvalidRubric { total });
        }
        for rule in &self.sanitizer.extra_rules {
            rule.to_rule()?;
        }
        let date_format = &self.render.date_format;
        if StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ScribeError::InvalidDateFormat(date_format.clone()));
        }
        Ok(())
    }
}
