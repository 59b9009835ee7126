use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import from rtiscribe-core
use rtiscribe_core::{
    ApplicantContext, ComplianceReport, DocumentProcessor, ExportMode, OutputFormat,
    PipelineConfig, PipelineStages,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Plain text
    Text,
    /// Paginated HTML for printing
    Print,
    /// Word document
    Docx,
    /// Compliance report only
    Report,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Canonical,
    AsAuthored,
}

#[derive(Parser)]
#[command(name = "rtiscribe")]
#[command(about = "Compile RTI application drafts into text, print and docx documents")]
struct Args {
    /// Path to the draft (editor markup or plain text)
    #[arg(short, long)]
    input: String,

    /// Applicant context file (YAML or JSON)
    #[arg(short = 'x', long)]
    context: Option<String>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: Format,

    /// Output file path (if not specified, auto-generated based on input)
    #[arg(short, long)]
    output: Option<String>,

    /// Override the export mode from the config
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Print the compliance report as JSON
    #[arg(long)]
    json: bool,

    /// Dump all intermediate pipeline stage outputs to a directory
    #[arg(long)]
    dump_stages: bool,

    /// Directory for stage dump output
    #[arg(long, default_value = "test_outputs/stages")]
    stages_dir: String,

    /// Enable detailed profiling of all pipeline steps
    #[arg(long)]
    profile: bool,

    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().without_time().with_target(false))
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        error!("❌ {e:#}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    info!("🦀 rtiscribe RTI application compiler");

    if !Path::new(&args.input).exists() {
        anyhow::bail!("input draft not found at {}", args.input);
    }
    let draft = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input))?;

    let mut config = match &args.config {
        Some(path) => {
            let config = PipelineConfig::load_from_file(path)
                .with_context(|| format!("loading config {path}"))?;
            info!("📋 Loaded config from: {}", path);
            config
        }
        None => {
            info!("📋 Using default config");
            PipelineConfig::default()
        }
    };
    if let Some(mode) = args.mode {
        config.mode = match mode {
            Mode::Canonical => ExportMode::Canonical,
            Mode::AsAuthored => ExportMode::AsAuthored,
        };
    }

    let ctx = load_context(args.context.as_deref())?;
    let processor = DocumentProcessor::new(config)?.with_profiling(args.profile);

    info!("📄 Processing: {}", args.input);

    if args.dump_stages {
        info!("🔬 Pipeline stage dump mode");
        let stages = processor.capture_stages(&draft, &ctx);
        save_stages(&stages, &args.input, &args.stages_dir)?;
        info!("✅ All stages dumped to: {}", args.stages_dir);
        return Ok(());
    }

    let format = match args.format {
        Format::Report => {
            let report = processor.evaluate_draft(&draft);
            print_report(&report, args.json)?;
            return Ok(());
        }
        Format::Text => OutputFormat::Text,
        Format::Print => OutputFormat::Print,
        Format::Docx => OutputFormat::Docx,
    };

    let processed = processor.process(&draft, &ctx);
    let bytes = processor.render(&processed, &ctx, format)?;

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input, format));
    std::fs::write(&output_path, &bytes).with_context(|| format!("writing {output_path}"))?;
    info!(
        "💾 {} block(s) saved to: {} ({} bytes)",
        processed.segments.block_count(),
        output_path,
        bytes.len()
    );

    if args.json {
        let report = processor.evaluate(&processed.plain_text);
        print_report(&report, true)?;
    }

    Ok(())
}

/// Context file is YAML unless the extension says JSON
fn load_context(path: Option<&str>) -> Result<ApplicantContext> {
    let Some(path) = path else {
        warn!("⚠️  No applicant context given, missing values render as placeholders");
        return Ok(ApplicantContext::default());
    };
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading context {path}"))?;
    let is_json = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let ctx = if is_json {
        serde_json::from_str(&content).with_context(|| format!("parsing context {path}"))?
    } else {
        serde_yaml::from_str(&content).with_context(|| format!("parsing context {path}"))?
    };
    info!("👤 Loaded applicant context from: {}", path);
    Ok(ctx)
}

fn default_output_path(input: &str, format: OutputFormat) -> String {
    let input_name = Path::new(input)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("application");
    format!("{input_name}_rti.{}", format.extension())
}

fn print_report(report: &ComplianceReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let verdict = if report.is_compliant { "✅ compliant" } else { "❌ not compliant" };
    println!("📊 Compliance score: {}/100 ({})", report.score, verdict);
    println!("   {}", report.analysis_summary);
    for point in &report.compliance_points {
        println!("   ✔ {point}");
    }
    for issue in &report.issues {
        println!("   ✖ {issue}");
    }
    for suggestion in &report.suggestions {
        println!("   💡 {suggestion}");
    }
    Ok(())
}

fn save_stages(stages: &PipelineStages, input: &str, output_dir: &str) -> Result<()> {
    use std::fs;
    fs::create_dir_all(output_dir)?;

    let write = |name: &str, contents: &str| -> Result<()> {
        let path = format!("{output_dir}/{name}");
        fs::write(&path, contents)?;
        info!("  💾 {}", path);
        Ok(())
    };

    write("stage1_input.html", &stages.input_markup)?;
    write("stage2_normalized.html", &stages.normalized)?;
    if let Some(sanitized) = &stages.sanitized {
        write("stage3a_sanitized.html", sanitized)?;
    }
    if let Some(composed) = &stages.composed {
        write("stage3b_composed.html", composed)?;
    }
    write("stage4_filled.html", &stages.markup)?;
    write("stage5_blocks.json", &serde_json::to_string_pretty(&stages.blocks)?)?;
    write("stage6_segments.json", &serde_json::to_string_pretty(&stages.segments)?)?;
    write("stage7_plain_text.txt", &stages.plain_text)?;
    write("stage8_report.json", &serde_json::to_string_pretty(&stages.report)?)?;

    // Summary file: quick reference for validation scripts
    let summary = serde_json::json!({
        "input": input,
        "mode": stages.mode,
        "captured_at": chrono::Utc::now().to_rfc3339(),
        "stage_counts": {
            "input_bytes": stages.input_markup.len(),
            "blocks": stages.blocks.len(),
            "before_signature": stages.segments.before_signature.len(),
            "after_signature": stages.segments.after_signature.len(),
            "score": stages.report.score,
        }
    });
    write("summary.json", &serde_json::to_string_pretty(&summary)?)?;

    Ok(())
}
