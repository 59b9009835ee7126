// rtiscribe Core Library
//
// Compiles RTI application drafts written in a rich-text editor into
// classified blocks, styled documents (text, print, docx) and a formal
// compliance report. Main interface is DocumentProcessor.

pub mod assembler;
pub mod classifier;
pub mod composer;
pub mod config;
pub mod error;
pub mod markup;
pub mod placeholders;
pub mod processor;
pub mod render;
pub mod rules;
pub mod sanitizer;
pub mod style;
pub mod types;

// Re-export main types and functions for easy use
pub use assembler::DocumentAssembler;
pub use classifier::BlockClassifier;
pub use config::{ExportMode, PipelineConfig};
pub use error::{Result, ScribeError};
pub use processor::{DocumentProcessor, PipelineStages, ProcessedDocument, StepProfiler};
pub use render::{OutputFormat, RenderContext, Renderer};
pub use rules::ComplianceEngine;
pub use sanitizer::{sanitize, Sanitizer};
pub use types::*;
