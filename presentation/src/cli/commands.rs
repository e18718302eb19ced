//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use crosslint_domain::Severity;
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every issue, grouped per tool
    Full,
    /// Per-tool counts and statistics only
    Summary,
    /// JSON documents
    Json,
}

impl From<OutputFormat> for crosslint_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => crosslint_domain::OutputFormat::Full,
            OutputFormat::Summary => crosslint_domain::OutputFormat::Summary,
            OutputFormat::Json => crosslint_domain::OutputFormat::Json,
        }
    }
}

/// Severity threshold accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeverityArg {
    Info,
    Warning,
    Error,
    Critical,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Info => Severity::Info,
            SeverityArg::Warning => Severity::Warning,
            SeverityArg::Error => Severity::Error,
            SeverityArg::Critical => Severity::Critical,
        }
    }
}

/// CLI arguments for crosslint
#[derive(Parser, Debug)]
#[command(name = "crosslint")]
#[command(author, version, about = "Run several C/C++ static analyzers and merge their findings")]
#[command(long_about = r#"
crosslint drives external static-analysis tools (cppcheck, clang-tidy and
user-defined programs) over the same sources, normalizes their findings and
merges, summarizes or compares the results.

Configuration files are loaded from (in priority order):
1. CROSSLINT_* environment variables
2. --config <path>       Explicit config file
3. ./crosslint.toml      Project-level config
4. ~/.config/crosslint/config.toml   Global config

Example:
  crosslint run src
  crosslint run -t cppcheck -t clang-tidy --parallel --aggregate src
  crosslint run -t cppcheck --save baseline.json src
  crosslint compare baseline.json current.json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze sources with one or more tools
    Run(RunArgs),
    /// List registered tools and whether they are installed
    List,
    /// Summarize saved results
    Stats(StatsArgs),
    /// Compare two saved result sets
    Compare(CompareArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Source file or directory to analyze
    pub source: PathBuf,

    /// Tools to run (can be specified multiple times; defaults to [run].tools)
    #[arg(short, long = "tool", value_name = "TOOL")]
    pub tools: Vec<String>,

    /// Output artifact path; suffixed per tool when several tools run
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Include directory (can be specified multiple times)
    #[arg(short = 'I', long = "include", value_name = "DIR")]
    pub include: Vec<PathBuf>,

    /// Preprocessor definition (can be specified multiple times)
    #[arg(short = 'D', long = "define", value_name = "NAME[=VALUE]")]
    pub define: Vec<String>,

    /// Run tools concurrently with live progress
    #[arg(long = "parallel", alias = "async")]
    pub parallel: bool,

    /// Drop issues below this severity from the report
    #[arg(long, value_enum, value_name = "SEVERITY")]
    pub min_severity: Option<SeverityArg>,

    /// Merge all tool results into one, removing duplicates
    #[arg(long)]
    pub aggregate: bool,

    /// Save the results (or the aggregated result) as JSON
    #[arg(long, value_name = "PATH")]
    pub save: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Saved result files (single results or result lists)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Number of files listed by issue count
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Baseline result file
    pub baseline: PathBuf,

    /// Current result file
    pub current: PathBuf,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Exit with status 1 when new issues were introduced
    #[arg(long)]
    pub fail_on_new: bool,
}
