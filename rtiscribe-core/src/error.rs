//! Error types for the rtiscribe pipeline
//!
//! User-authored content never produces one of these: malformed markup,
//! missing context fields and undecodable signatures all degrade to
//! best-effort output. Errors are reserved for the operator's side of the
//! pipeline (configuration files, rule tables, packaging).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScribeError {
    /// Error reading a config or input file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid YAML for `PipelineConfig`
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// JSON serialization of reports or stage dumps
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regex supplied through configuration failed to compile
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Rubric weights that could push deductions past 100
    #[error("Compliance rubric weights sum to {total}, must not exceed 100")]
    InvalidRubric { total: u32 },

    /// Date format string chrono cannot render
    #[error("Invalid date format '{0}'")]
    InvalidDateFormat(String),

    /// Cleanup rules whose ordering constraints cannot be satisfied
    #[error("Cleanup rule ordering has a cycle involving '{rule}'")]
    RuleCycle { rule: String },

    /// Cleanup rule ordering refers to a rule that does not exist
    #[error("Cleanup rule '{rule}' must apply before unknown rule '{target}'")]
    UnknownRule { rule: String, target: String },

    /// Signature image could not be decoded
    #[error("Signature image error: {0}")]
    Signature(String),

    /// Error writing the .docx zip package
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, ScribeError>;
