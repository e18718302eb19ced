//! Merging several results into one deduplicated result

use crate::analysis::AnalysisResult;
use crate::issue::{Issue, IssueKey};
use std::collections::HashSet;

/// Tool name given to the result produced by [`aggregate`].
pub const AGGREGATED_TOOL_NAME: &str = "aggregated";

/// Merge `results` into a single result.
///
/// - issues are concatenated in input order and deduplicated by
///   [`IssueKey`], keeping the first occurrence
/// - files analyzed and execution time are summed
/// - success is the AND of every input; failed inputs contribute
///   `"tool: message"` to the error message, joined by `"; "`
///
/// Each issue keeps its own `tool_name`, so provenance survives even
/// though the merged result is named [`AGGREGATED_TOOL_NAME`].
pub fn aggregate(results: &[AnalysisResult]) -> AnalysisResult {
    let mut merged = AnalysisResult::new(AGGREGATED_TOOL_NAME);

    let mut errors = Vec::new();
    for result in results {
        merged.files_analyzed += result.files_analyzed;
        merged.execution_time += result.execution_time;
        if !result.is_success() {
            errors.push(format!("{}: {}", result.tool_name, result.error_message()));
        }
    }

    let issues = dedup_issues(results.iter().flat_map(|r| r.issues().iter().cloned()));
    merged.set_issues(issues);

    if !errors.is_empty() {
        merged.mark_failed(errors.join("; "));
    }

    merged
}

/// Drop every issue whose [`IssueKey`] was already seen, preserving order.
pub fn dedup_issues(issues: impl IntoIterator<Item = Issue>) -> Vec<Issue> {
    let mut seen: HashSet<IssueKey> = HashSet::new();
    issues
        .into_iter()
        .filter(|issue| seen.insert(issue.key()))
        .collect()
}
