//! fitscope CLI - Command-line interface for fitscope
//!
//! Commands:
//! - inspect: Activity, device, record groups and chartable metrics
//! - stats: Aggregate statistics for metrics
//! - chart: Build chart groups and print their specs
//! - export: Write the metrics export (activity-metrics.json)
//! - summary: Print the assessment payload and prompt
//! - analyze: Request an activity assessment (feature `gemini`)

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use fitscope::analysis::{build_prompt, AnalysisSummary, DEFAULT_ASSESSMENT_PROMPT};
use fitscope::charts::{MemoryRenderer, Surface};
use fitscope::{ActivityAnalysis, AnalyzerConfig, AnalyzerError, FileAnalyzer, UnitSystem, FITSCOPE_VERSION};

/// fitscope - Metric classification and multi-chart aggregation for FIT files
#[derive(Parser)]
#[command(name = "fitscope")]
#[command(version = FITSCOPE_VERSION)]
#[command(about = "Inspect, chart and summarize parsed FIT activity files", long_about = None)]
struct Cli {
    /// Configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use imperial units (mph, min/mi)
    #[arg(long, global = true)]
    imperial: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show activity type, device, record groups and available metrics
    Inspect {
        /// Parsed FIT file as JSON (use - for stdin)
        input: PathBuf,
    },

    /// Aggregate statistics for metrics
    Stats {
        /// Parsed FIT file as JSON (use - for stdin)
        input: PathBuf,

        /// Metric to include (repeatable; defaults to every available metric)
        #[arg(short, long = "metric")]
        metrics: Vec<String>,
    },

    /// Build charts and print their specs
    Chart {
        /// Parsed FIT file as JSON (use - for stdin)
        input: PathBuf,

        /// Comma-separated metrics sharing one chart (repeatable; defaults to
        /// one chart per available metric)
        #[arg(short, long = "group")]
        groups: Vec<String>,
    },

    /// Write every numeric sample of the available metrics
    Export {
        /// Parsed FIT file as JSON (use - for stdin)
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "activity-metrics.json")]
        output: PathBuf,
    },

    /// Print the assessment payload and prompt without sending them
    Summary {
        /// Parsed FIT file as JSON (use - for stdin)
        input: PathBuf,

        /// Assessment instruction
        #[arg(long)]
        prompt: Option<String>,
    },

    /// Request an activity assessment from Gemini (needs GEMINI_API_KEY)
    #[cfg(feature = "gemini")]
    Analyze {
        /// Parsed FIT file as JSON (use - for stdin)
        input: PathBuf,

        /// Assessment instruction
        #[arg(long)]
        prompt: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), FitscopeCliError> {
    let mut config = match &cli.config {
        Some(path) => AnalyzerConfig::from_file(path)?,
        None => AnalyzerConfig::default(),
    };
    if cli.imperial {
        config = config.with_units(UnitSystem::Imperial);
    }
    let analyzer = FileAnalyzer::with_config(config);
    let pretty = cli.pretty;

    match cli.command {
        Commands::Inspect { input } => {
            let analysis = load(&analyzer, &input)?;
            print_json(&analysis.report(), pretty)
        }

        Commands::Stats { input, metrics } => {
            let analysis = load(&analyzer, &input)?;
            print_json(&analyzer.statistics(&analysis, &metrics), pretty)
        }

        Commands::Chart { input, groups } => cmd_chart(&analyzer, &input, &groups, pretty),

        Commands::Export { input, output } => {
            let analysis = load(&analyzer, &input)?;
            let export = analyzer.export_metrics(&analysis);
            let json = serde_json::to_string_pretty(&export)?;
            write_output(&output, &json)
        }

        Commands::Summary { input, prompt } => {
            let analysis = load(&analyzer, &input)?;
            let instruction = prompt.as_deref().unwrap_or(DEFAULT_ASSESSMENT_PROMPT);
            let payload = SummaryOutput {
                prompt: build_prompt(instruction),
                summary: analyzer.summary(&analysis),
            };
            print_json(&payload, pretty)
        }

        #[cfg(feature = "gemini")]
        Commands::Analyze { input, prompt } => {
            use fitscope::analysis::{analyze_or_fallback, GeminiClient};

            let analysis = load(&analyzer, &input)?;
            let instruction = prompt.as_deref().unwrap_or(DEFAULT_ASSESSMENT_PROMPT);
            let summary = analyzer.summary(&analysis);
            let text = match GeminiClient::from_env() {
                Ok(client) => analyze_or_fallback(&client, instruction, &summary),
                Err(e) => format!("AI analysis unavailable. {}", e),
            };
            println!("{}", text);
            Ok(())
        }
    }
}

fn cmd_chart(
    analyzer: &FileAnalyzer,
    input: &Path,
    groups: &[String],
    pretty: bool,
) -> Result<(), FitscopeCliError> {
    let analysis = load(analyzer, input)?;

    let layout: Vec<Vec<String>> = if groups.is_empty() {
        analysis
            .available_metrics
            .iter()
            .map(|metric| vec![metric.clone()])
            .collect()
    } else {
        groups
            .iter()
            .map(|group| {
                group
                    .split(',')
                    .map(str::trim)
                    .filter(|metric| !metric.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .collect()
    };

    let mut renderer = MemoryRenderer::new();
    {
        let mut manager = analyzer.chart_manager(&analysis, &mut renderer);
        for metrics in &layout {
            match metrics.as_slice() {
                [] => {}
                [metric] => manager.add_metric(metric)?,
                _ => manager.merge_metrics(metrics)?,
            }
        }

        let output = ChartOutput {
            title: manager.renderer().heading().to_string(),
            charts: manager.renderer().surfaces().cloned().collect(),
        };
        print_json(&output, pretty)?;
    }
    Ok(())
}

fn load(analyzer: &FileAnalyzer, input: &Path) -> Result<ActivityAnalysis, FitscopeCliError> {
    let raw = read_input(input)?;
    Ok(analyzer.analyze_json(&raw)?)
}

fn read_input(input: &Path) -> Result<String, FitscopeCliError> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err(FitscopeCliError::InteractiveStdin);
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_output(output: &Path, contents: &str) -> Result<(), FitscopeCliError> {
    if output.to_string_lossy() == "-" {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", contents)?;
        stdout.flush()?;
    } else {
        fs::write(output, contents)?;
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), FitscopeCliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

// Output types

#[derive(Serialize)]
struct ChartOutput {
    title: String,
    charts: Vec<Surface>,
}

#[derive(Serialize)]
struct SummaryOutput {
    prompt: String,
    summary: AnalysisSummary,
}

// Error types

#[derive(Debug)]
enum FitscopeCliError {
    Io(io::Error),
    Analyzer(AnalyzerError),
    Json(serde_json::Error),
    InteractiveStdin,
}

impl From<io::Error> for FitscopeCliError {
    fn from(e: io::Error) -> Self {
        FitscopeCliError::Io(e)
    }
}

impl From<AnalyzerError> for FitscopeCliError {
    fn from(e: AnalyzerError) -> Self {
        FitscopeCliError::Analyzer(e)
    }
}

impl From<serde_json::Error> for FitscopeCliError {
    fn from(e: serde_json::Error) -> Self {
        FitscopeCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<FitscopeCliError> for CliError {
    fn from(e: FitscopeCliError) -> Self {
        match e {
            FitscopeCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            FitscopeCliError::Analyzer(e) => {
                let (code, hint) = match &e {
                    AnalyzerError::ParseError(_) | AnalyzerError::JsonError(_) => (
                        "PARSE_ERROR",
                        "Input must be the JSON object produced by the FIT parser",
                    ),
                    AnalyzerError::Io(_) => ("IO_ERROR", "Check file paths and permissions"),
                    AnalyzerError::ConfigError(_) => {
                        ("CONFIG_ERROR", "Check the configuration file values")
                    }
                    AnalyzerError::RenderTarget(_) => {
                        ("RENDER_ERROR", "No chart surface is available")
                    }
                    AnalyzerError::AnalysisError(_) => {
                        ("ANALYSIS_ERROR", "Check GEMINI_API_KEY and network access")
                    }
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            FitscopeCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            FitscopeCliError::InteractiveStdin => CliError {
                code: "NO_INPUT".to_string(),
                message: "Refusing to read from an interactive terminal".to_string(),
                hint: Some("Pipe the parser output in or pass a file path".to_string()),
            },
        }
    }
}
