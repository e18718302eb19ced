//! Console output formatter for analysis results

use crate::output::formatter::{OutputFormatter, ToolStatus};
use colored::{ColoredString, Colorize};
use crosslint_domain::{
    AnalysisResult, AnalysisStatistics, Category, ComparisonReport, Issue, OutputFormat, Severity,
};
use serde::Serialize;
use std::time::Duration;

/// Formats analysis output for console display
pub struct ConsoleFormatter {
    top_files: usize,
}

impl Default for ConsoleFormatter {
    fn default() -> Self {
        Self::new(crosslint_domain::DEFAULT_TOP_FILES)
    }
}

impl ConsoleFormatter {
    pub fn new(top_files: usize) -> Self {
        Self { top_files }
    }

    /// Every issue of every tool, then the statistics block
    pub fn format_full(&self, results: &[AnalysisResult]) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Analysis Results"));
        output.push('\n');

        for result in results {
            output.push_str(&Self::tool_header(result));
            if result.is_success() {
                if result.issues().is_empty() {
                    output.push_str(&format!("  {}\n", "no issues".green()));
                }
                for issue in result.issues() {
                    output.push_str(&Self::issue_line(issue));
                }
            }
        }

        output.push_str(&self.format_statistics(&AnalysisStatistics::compute(
            results,
            self.top_files,
        )));
        output.push_str(&Self::footer());
        output
    }

    /// One line per tool, then the statistics block
    pub fn format_summary(&self, results: &[AnalysisResult]) -> String {
        let mut output = String::new();
        output.push_str(&Self::section_header("Tools"));

        for result in results {
            let status = if result.is_success() {
                "ok".green()
            } else {
                "failed".red()
            };
            output.push_str(&format!(
                "  {:<16} {:<7} {:>5} issues  {:>4} files  {}\n",
                result.tool_name.bold(),
                status,
                result.issue_count(),
                result.files_analyzed,
                Self::duration(result.execution_time).dimmed()
            ));
            if !result.is_success() {
                output.push_str(&format!("    {}\n", result.error_message().red()));
            }
        }

        output.push_str(&self.format_statistics(&AnalysisStatistics::compute(
            results,
            self.top_files,
        )));
        output
    }

    /// Format as JSON
    pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn tool_header(result: &AnalysisResult) -> String {
        let title = format!("── {} ──", result.tool_name);
        if result.is_success() {
            format!(
                "\n{} {}\n",
                title.yellow().bold(),
                format!(
                    "{} files, {} issues, {}",
                    result.files_analyzed,
                    result.issue_count(),
                    Self::duration(result.execution_time)
                )
                .dimmed()
            )
        } else {
            format!(
                "\n{}\n  {} {}\n",
                title.red().bold(),
                "Error:".red(),
                result.error_message()
            )
        }
    }

    fn issue_line(issue: &Issue) -> String {
        let location = if issue.has_position() {
            format!("{}:{}:{}", issue.file_path, issue.line, issue.column)
        } else {
            issue.file_path.clone()
        };
        let rule = if issue.rule_id.is_empty() {
            String::new()
        } else {
            format!(" [{}]", issue.rule_id)
        };
        let mut line = format!(
            "  {} {} {}{}\n",
            Self::severity(issue.severity),
            location.bold(),
            issue.message,
            rule.dimmed()
        );
        if let Some(fix) = &issue.fix_suggestion {
            line.push_str(&format!("      {} {}\n", "fix:".cyan(), fix));
        }
        line
    }

    fn severity(severity: Severity) -> ColoredString {
        let label = format!("{:<8}", severity.as_str());
        match severity {
            Severity::Info => label.blue(),
            Severity::Warning => label.yellow(),
            Severity::Error => label.red(),
            Severity::Critical => label.red().bold(),
        }
    }

    fn duration(elapsed: Duration) -> String {
        format!("{:.2}s", elapsed.as_secs_f64())
    }

    fn delta(value: i64) -> ColoredString {
        match value {
            v if v > 0 => format!("+{}", v).red(),
            v if v < 0 => v.to_string().green(),
            v => v.to_string().normal(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_results(&self, results: &[AnalysisResult], format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => self.format_full(results),
            OutputFormat::Summary => self.format_summary(results),
            OutputFormat::Json => Self::format_json(results),
        }
    }

    fn format_statistics(&self, stats: &AnalysisStatistics) -> String {
        let mut output = Self::section_header("Statistics");
        output.push_str(&format!(
            "  {} {}   {} {}   {} {}\n",
            "Issues:".bold(),
            stats.total_issues,
            "Files:".bold(),
            stats.total_files_analyzed,
            "Time:".bold(),
            Self::duration(stats.total_execution_time)
        ));

        output.push_str(&format!("\n  {}\n", "By severity".bold()));
        for severity in Severity::ALL.into_iter().rev() {
            let count = stats.issues_by_severity.get(&severity).copied().unwrap_or(0);
            output.push_str(&format!("    {} {:>5}\n", Self::severity(severity), count));
        }

        let categories: Vec<(Category, usize)> = Category::ALL
            .into_iter()
            .filter_map(|c| stats.issues_by_category.get(&c).map(|n| (c, *n)))
            .collect();
        if !categories.is_empty() {
            output.push_str(&format!("\n  {}\n", "By category".bold()));
            for (category, count) in categories {
                output.push_str(&format!("    {:<16} {:>5}\n", category.as_str(), count));
            }
        }

        if !stats.issues_by_tool.is_empty() {
            output.push_str(&format!("\n  {}\n", "By tool".bold()));
            for (tool, count) in &stats.issues_by_tool {
                output.push_str(&format!("    {:<16} {:>5}\n", tool, count));
            }
        }

        if !stats.top_files.is_empty() {
            output.push_str(&format!("\n  {}\n", "Top files".bold()));
            for entry in &stats.top_files {
                output.push_str(&format!("    {:>5}  {}\n", entry.issue_count, entry.file_path));
            }
        }
        output
    }

    fn format_comparison(&self, report: &ComparisonReport) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Comparison"));
        output.push('\n');

        output.push_str(&Self::section_header(&format!(
            "New issues ({})",
            report.new_issues.len()
        )));
        for issue in &report.new_issues {
            output.push_str(&format!("{}{}", "+".red().bold(), Self::issue_line(issue)));
        }

        output.push_str(&Self::section_header(&format!(
            "Resolved issues ({})",
            report.resolved_issues.len()
        )));
        for issue in &report.resolved_issues {
            output.push_str(&format!("{}{}", "-".green().bold(), Self::issue_line(issue)));
        }

        output.push_str(&format!(
            "\n{} {}\n",
            "Persistent issues:".bold(),
            report.persistent_issues.len()
        ));

        output.push_str(&format!("\n  {}\n", "Severity deltas".bold()));
        for severity in Severity::ALL.into_iter().rev() {
            let delta = report.severity_deltas.get(&severity).copied().unwrap_or(0);
            output.push_str(&format!(
                "    {} {:>5}\n",
                Self::severity(severity),
                Self::delta(delta)
            ));
        }
        output.push_str(&format!(
            "\n{} {}\n",
            "Net change:".bold(),
            Self::delta(report.issue_delta)
        ));

        let verdict = if report.is_clean() {
            "No new issues".green().bold()
        } else {
            "New issues introduced".red().bold()
        };
        output.push_str(&format!("{}\n", verdict));
        output.push_str(&Self::footer());
        output
    }

    fn format_tools(&self, tools: &[ToolStatus]) -> String {
        let mut output = Self::section_header("Registered tools");
        for tool in tools {
            let mark = if tool.available {
                "v".green()
            } else {
                "x".red()
            };
            output.push_str(&format!(
                "  {} {:<16} {}\n",
                mark,
                tool.name.bold(),
                tool.description
            ));
            if tool.available {
                output.push_str(&format!(
                    "      {} ({})\n",
                    tool.version.dimmed(),
                    tool.executable.dimmed()
                ));
            } else {
                output.push_str(&format!("      {}\n", "not installed".dimmed()));
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    fn results() -> Vec<AnalysisResult> {
        vec![
            AnalysisResult::new("cppcheck")
                .with_files_analyzed(2)
                .with_issues(vec![
                    Issue::new("cppcheck", "nullPointer", "Null pointer dereference")
                        .at("a.c", 10, 2)
                        .with_severity(Severity::Error)
                        .with_fix("check p"),
                    Issue::new("cppcheck", "unusedVariable", "Unused variable")
                        .at("b.c", 3, 1)
                        .with_severity(Severity::Info)
                        .with_category(Category::Style),
                ]),
            AnalysisResult::failure("clang-tidy", "exited with status 1"),
        ]
    }

    #[test]
    fn test_format_full() {
        plain();
        let output = ConsoleFormatter::default().format_results(&results(), OutputFormat::Full);

        assert!(output.contains("── cppcheck ──"));
        assert!(output.contains("a.c:10:2 Null pointer dereference [nullPointer]"));
        assert!(output.contains("fix: check p"));
        assert!(output.contains("Error: exited with status 1"));
        assert!(output.contains("Statistics"));
    }

    #[test]
    fn test_format_summary() {
        plain();
        let output = ConsoleFormatter::default().format_results(&results(), OutputFormat::Summary);

        assert!(output.contains("cppcheck"));
        assert!(output.contains("failed"));
        assert!(!output.contains("Null pointer dereference"));
    }

    #[test]
    fn test_format_json_is_document_array() {
        let output = ConsoleFormatter::default().format_results(&results(), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[1]["success"], false);
    }

    #[test]
    fn test_format_statistics_top_files() {
        plain();
        let stats = AnalysisStatistics::compute(&results(), 1);
        let output = ConsoleFormatter::new(1).format_statistics(&stats);

        assert!(output.contains("Issues: 2"));
        assert!(output.contains("Top files"));
        assert!(output.contains("a.c"));
        assert!(!output.contains("b.c"));
    }

    #[test]
    fn test_format_comparison() {
        plain();
        let baseline = results();
        let current = vec![AnalysisResult::new("cppcheck").with_issues(vec![
            Issue::new("cppcheck", "leak", "Memory leak")
                .at("c.c", 1, 1)
                .with_severity(Severity::Error),
        ])];
        let report = ComparisonReport::compute(&baseline, &current);
        let output = ConsoleFormatter::default().format_comparison(&report);

        assert!(output.contains("New issues (1)"));
        assert!(output.contains("Resolved issues (2)"));
        assert!(output.contains("New issues introduced"));
    }

    #[test]
    fn test_format_tools() {
        plain();
        let tools = vec![
            ToolStatus {
                name: "cppcheck".to_string(),
                available: true,
                version: "Cppcheck 2.13.0".to_string(),
                executable: "/usr/bin/cppcheck".to_string(),
                description: "C/C++ analyzer".to_string(),
            },
            ToolStatus {
                name: "clang-tidy".to_string(),
                available: false,
                version: "unknown".to_string(),
                executable: String::new(),
                description: "linter".to_string(),
            },
        ];
        let output = ConsoleFormatter::default().format_tools(&tools);

        assert!(output.contains("Cppcheck 2.13.0"));
        assert!(output.contains("not installed"));
    }
}
