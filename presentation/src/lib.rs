//! Presentation layer for crosslint
//!
//! This crate contains CLI definitions, output formatters
//! and progress reporters.

pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, CompareArgs, OutputFormat, RunArgs, SeverityArg, StatsArgs};
pub use config::ReportConfig;
pub use output::console::ConsoleFormatter;
pub use output::formatter::{OutputFormatter, ToolStatus};
pub use progress::reporter::{ProgressReporter, ProgressSink, SimpleProgress, batch_callback};
