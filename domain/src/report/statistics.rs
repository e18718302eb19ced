//! Derived statistics over a set of results

use crate::analysis::AnalysisResult;
use crate::issue::{Category, Severity};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Number of files reported by default in [`AnalysisStatistics::top_files`].
pub const DEFAULT_TOP_FILES: usize = 10;

/// Issue count for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIssueCount {
    pub file_path: String,
    pub issue_count: usize,
}

/// Summary view over a set of results. Nothing here is stored back on the
/// results themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStatistics {
    pub total_issues: usize,
    pub total_files_analyzed: usize,
    #[serde(with = "duration_ms")]
    pub total_execution_time: Duration,
    /// Keyed by each issue's producing tool
    pub issues_by_tool: BTreeMap<String, usize>,
    pub issues_by_severity: BTreeMap<Severity, usize>,
    pub issues_by_category: BTreeMap<Category, usize>,
    /// Files with the most issues, descending; ties keep first-seen order
    pub top_files: Vec<FileIssueCount>,
}

impl AnalysisStatistics {
    /// Compute statistics over `results`, listing at most `top_n` files.
    pub fn compute(results: &[AnalysisResult], top_n: usize) -> Self {
        let mut stats = AnalysisStatistics::default();

        // first-seen order drives tie-breaking below
        let mut file_order: Vec<String> = Vec::new();
        let mut file_counts: HashMap<String, usize> = HashMap::new();

        for result in results {
            stats.total_files_analyzed += result.files_analyzed;
            stats.total_execution_time += result.execution_time;

            for issue in result.issues() {
                stats.total_issues += 1;
                *stats.issues_by_tool.entry(issue.tool_name.clone()).or_insert(0) += 1;
                *stats.issues_by_severity.entry(issue.severity).or_insert(0) += 1;
                *stats.issues_by_category.entry(issue.category).or_insert(0) += 1;

                match file_counts.get_mut(&issue.file_path) {
                    Some(count) => *count += 1,
                    None => {
                        file_counts.insert(issue.file_path.clone(), 1);
                        file_order.push(issue.file_path.clone());
                    }
                }
            }
        }

        let mut top: Vec<FileIssueCount> = file_order
            .into_iter()
            .map(|file_path| FileIssueCount {
                issue_count: file_counts.get(&file_path).copied().unwrap_or(0),
                file_path,
            })
            .collect();
        // stable sort keeps first-seen order among equal counts
        top.sort_by(|a, b| b.issue_count.cmp(&a.issue_count));
        top.truncate(top_n);
        stats.top_files = top;

        stats
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
