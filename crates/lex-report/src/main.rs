//! CLI entry point for the CSV analysis report generator.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use lex_report::reporting::{summary_path, write_run_summary};
use lex_report::{ClassificationStrategy, ReportConfig, ReportPipeline, RunSummary};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

/// CLI-compatible classification strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliClassifier {
    /// Tag each field from its first row only
    FirstRow,
    /// Tag numeric when most non-empty cells parse as numbers
    Majority,
}

impl From<CliClassifier> for ClassificationStrategy {
    fn from(cli: CliClassifier) -> Self {
        match cli {
            CliClassifier::FirstRow => ClassificationStrategy::FirstRow,
            CliClassifier::Majority => ClassificationStrategy::MajorityVote,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    author = "Lex Machina Team",
    version,
    about = "CSV Analysis Report Generator",
    long_about = "Summarizes every field of a CSV file and writes a PDF report.\n\n\
                  EXAMPLES:\n  \
                  # Basic usage\n  \
                  lex-report -i customers.csv\n\n  \
                  # Custom output and title\n  \
                  lex-report -i customers.csv -o out/customers.pdf -t \"Customer Overview\"\n\n  \
                  # Semicolon-separated input, no chart\n  \
                  lex-report -i data.csv --delimiter ';' --no-chart\n\n  \
                  # Also write the analysis as JSON\n  \
                  lex-report -i data.csv --emit-json"
)]
struct Args {
    /// Path to the CSV file to analyse
    #[arg(short, long)]
    input: PathBuf,

    /// Path of the PDF report to write
    #[arg(short, long, default_value = "report.pdf")]
    output: PathBuf,

    /// Title shown at the top of every page
    #[arg(short, long, default_value = "Data Analysis Report")]
    title: String,

    /// Where to save the chart image
    ///
    /// Defaults to <output stem>_chart.png next to the report
    #[arg(long, conflicts_with = "no_chart")]
    chart: Option<PathBuf>,

    /// Do not render the mean-value chart
    #[arg(long)]
    no_chart: bool,

    /// How fields are classified as numeric or categorical
    #[arg(long, value_enum, default_value = "first-row")]
    classifier: CliClassifier,

    /// Field delimiter of the input file
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Write the analysis as JSON to <output stem>_analysis.json
    #[arg(long)]
    emit_json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and final result)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    // Parse command line arguments
    let args = Args::parse();

    // Load environment variables from .env file before the filter reads RUST_LOG
    dotenv().ok();
    init_logging(&args.log_level, args.quiet);

    match run(&args) {
        Ok(summary) => {
            println!("✅ Report generated and saved to: {}", summary.output_file);
            if let Some(chart) = &summary.chart_file {
                println!("   Chart image: {chart}");
            }
            let errors = summary.analysis.field_errors();
            if !errors.is_empty() {
                println!("   {} field(s) could not be summarized:", errors.len());
                let mut errors: Vec<_> = errors.into_iter().collect();
                errors.sort();
                for (field, message) in errors {
                    println!("     - {field}: {message}");
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<RunSummary> {
    let delimiter = u8::try_from(args.delimiter)
        .map_err(|_| anyhow!("Delimiter must be a single-byte character: {:?}", args.delimiter))?;

    let mut config_builder = ReportConfig::builder()
        .classification(args.classifier.into())
        .delimiter(delimiter)
        .render_chart(!args.no_chart);

    if let Some(ref chart) = args.chart {
        config_builder = config_builder.chart_path(chart);
    }

    let config = config_builder.build()?;
    debug!("Configuration: {:?}", config);

    let quiet = args.quiet;
    let pipeline = ReportPipeline::builder()
        .config(config)
        .on_progress(move |update| {
            if !quiet {
                info!(
                    "[{:>3.0}%] {}: {}",
                    update.progress * 100.0,
                    update.stage.display_name(),
                    update.message
                );
            }
        })
        .build()?;

    let summary = pipeline.run(&args.input, &args.output, &args.title)?;

    if args.emit_json {
        let path = summary_path(&args.output);
        write_run_summary(&summary, &path)?;
        println!("Analysis JSON saved to: {}", path.display());
    }

    Ok(summary)
}
