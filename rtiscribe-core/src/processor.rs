use crate::assembler::DocumentAssembler;
use crate::classifier::BlockClassifier;
use crate::composer::compose;
use crate::config::{ExportMode, PipelineConfig};
use crate::error::Result;
use crate::markup::{canonicalize, looks_like_markup, normalize, text_to_markup, to_plain_text};
use crate::placeholders::PlaceholderValues;
use crate::render::{render_with_format, OutputFormat, RenderContext};
use crate::rules::ComplianceEngine;
use crate::sanitizer::{PhraseCatalog, Sanitizer};
use crate::types::*;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::info;

/// Captured intermediate outputs from each pipeline stage
/// Used for testing and diagnostics: every boundary can be inspected
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStages {
    pub mode: ExportMode,
    /// Input as markup (plain text input is wrapped into paragraphs)
    pub input_markup: String,
    pub normalized: String,
    /// Canonical mode only
    pub sanitized: Option<String>,
    /// Canonical mode only
    pub composed: Option<String>,
    /// Final markup with placeholders filled
    pub markup: String,
    pub blocks: Vec<Block>,
    pub segments: DocumentSegments,
    pub plain_text: String,
    /// Compliance of the final document
    pub report: ComplianceReport,
}

/// Result of one pipeline run, ready for rendering
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDocument {
    pub markup: String,
    pub segments: DocumentSegments,
    pub plain_text: String,
}

impl From<PipelineStages> for ProcessedDocument {
    fn from(stages: PipelineStages) -> Self {
        Self {
            markup: stages.markup,
            segments: stages.segments,
            plain_text: stages.plain_text,
        }
    }
}

/// Simple profiler that collects timings for pipeline steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        self.timings.push((step_name.to_string(), elapsed));
        info!("⏱️  {}: {}µs", step_name, elapsed.as_micros());

        result
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn log_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        info!("📊 Performance Summary:");
        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();
        let total_secs = total.as_secs_f64().max(f64::EPSILON);

        for (step, duration) in &self.timings {
            let percentage = (duration.as_secs_f64() / total_secs) * 100.0;
            info!("   {:.<35} {}µs ({:.1}%)", step, duration.as_micros(), percentage);
        }
        info!("   {:.<35} {}µs", "Total", total.as_micros());
    }
}

pub struct DocumentProcessor {
    config: PipelineConfig,
    sanitizer: Sanitizer,
    classifier: BlockClassifier,
    assembler: DocumentAssembler,
    engine: ComplianceEngine,
    profiling: bool,
}

impl DocumentProcessor {
    /// Build every stage from a validated configuration
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let catalog = PhraseCatalog::standard().with_extra(config.sanitizer.extra_phrases.iter().cloned());
        let extra_rules = config
            .sanitizer
            .extra_rules
            .iter()
            .map(|rule| rule.to_rule())
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            sanitizer: Sanitizer::with_rules(catalog, extra_rules, config.sanitizer.max_passes)?,
            classifier: BlockClassifier::new(&config.classifier)?,
            assembler: DocumentAssembler::new(),
            engine: ComplianceEngine::new(&config.compliance)?,
            profiling: false,
            config,
        })
    }

    pub fn with_profiling(mut self, enabled: bool) -> Self {
        self.profiling = enabled;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Compile a draft into assembled segments and derived text
    pub fn process(&self, input: &str, ctx: &ApplicantContext) -> ProcessedDocument {
        self.capture_stages(input, ctx).into()
    }

    /// Run the pipeline and keep every intermediate result
    pub fn capture_stages(&self, input: &str, ctx: &ApplicantContext) -> PipelineStages {
        let mut profiler = StepProfiler::new(self.profiling);
        let mode = self.config.mode;

        let input_markup = if looks_like_markup(input) {
            input.to_string()
        } else {
            text_to_markup(input)
        };

        let normalized = profiler.time_step("Normalize", || canonicalize(&input_markup));

        let (sanitized, composed) = match mode {
            ExportMode::Canonical => {
                let identity = ctx.identity();
                let sanitized =
                    profiler.time_step("Sanitize", || self.sanitizer.sanitize(&normalized, &identity));
                let composed = profiler.time_step("Compose", || compose(&sanitized, ctx));
                (Some(sanitized), Some(composed))
            }
            ExportMode::AsAuthored => (None, None),
        };

        let date = resolve_date(ctx);
        let values = PlaceholderValues {
            ctx,
            date: Some(date),
            date_format: &self.config.render.date_format,
        };
        let markup = profiler.time_step("Fill Placeholders", || {
            values.fill_markup(composed.as_deref().unwrap_or(&normalized))
        });

        let root = normalize(&markup);
        let blocks = profiler.time_step("Classify", || {
            self.classifier.classify(&root, &ctx.classifier_context())
        });
        let segments = profiler.time_step("Assemble", || {
            self.assembler
                .assemble(blocks.clone(), ctx.signature().is_some())
        });
        let plain_text = to_plain_text(&root);
        let report = profiler.time_step("Evaluate", || self.engine.evaluate(&plain_text));

        info!(
            "📄 Processed draft ({:?}): {} block(s), score {}",
            mode,
            segments.block_count(),
            report.score
        );
        profiler.log_summary();

        PipelineStages {
            mode,
            input_markup,
            normalized,
            sanitized,
            composed,
            markup,
            blocks,
            segments,
            plain_text,
            report,
        }
    }

    /// Score plain text against the rubric
    pub fn evaluate(&self, text: &str) -> ComplianceReport {
        self.engine.evaluate(text)
    }

    /// Score editor markup against the rubric
    pub fn evaluate_markup(&self, markup: &str) -> ComplianceReport {
        self.engine.evaluate_markup(markup)
    }

    /// Score a draft as authored, markup or plain text
    pub fn evaluate_draft(&self, input: &str) -> ComplianceReport {
        if looks_like_markup(input) {
            self.evaluate_markup(input)
        } else {
            self.evaluate(input)
        }
    }

    /// Render a processed document through one backend
    pub fn render(
        &self,
        processed: &ProcessedDocument,
        ctx: &ApplicantContext,
        format: OutputFormat,
    ) -> Result<Vec<u8>> {
        let render_ctx = RenderContext::new(ctx, &self.config.render).with_date(resolve_date(ctx));
        render_with_format(&processed.segments, &render_ctx, format)
    }
}

fn resolve_date(ctx: &ApplicantContext) -> NaiveDate {
    ctx.date.unwrap_or_else(|| Local::now().date_naive())
}
