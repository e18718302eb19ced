//! Output formatter trait

use crosslint_domain::{AnalysisResult, AnalysisStatistics, ComparisonReport, OutputFormat};

/// Installation status of one registered tool, as shown by `crosslint list`
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ToolStatus {
    pub name: String,
    pub available: bool,
    pub version: String,
    pub executable: String,
    pub description: String,
}

/// Trait for rendering analysis output
pub trait OutputFormatter {
    /// Render per-tool results followed by their statistics
    fn format_results(&self, results: &[AnalysisResult], format: OutputFormat) -> String;

    fn format_statistics(&self, stats: &AnalysisStatistics) -> String;

    fn format_comparison(&self, report: &ComparisonReport) -> String;

    fn format_tools(&self, tools: &[ToolStatus]) -> String;
}
