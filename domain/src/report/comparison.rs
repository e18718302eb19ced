//! Run-to-run comparison

use super::aggregation::aggregate;
use crate::analysis::AnalysisResult;
use crate::issue::{Issue, IssueKey, Severity};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Difference between a baseline run and a current run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Present in current only
    pub new_issues: Vec<Issue>,
    /// Present in baseline only
    pub resolved_issues: Vec<Issue>,
    /// Present in both (the current run's copy)
    pub persistent_issues: Vec<Issue>,
    /// Current count minus baseline count, for every severity
    pub severity_deltas: BTreeMap<Severity, i64>,
    /// Current total minus baseline total
    pub issue_delta: i64,
}

impl ComparisonReport {
    /// Compare two sets of results.
    ///
    /// Each side is aggregated and deduplicated on its own first; issues are
    /// then matched by [`IssueKey`].
    pub fn compute(baseline: &[AnalysisResult], current: &[AnalysisResult]) -> Self {
        let baseline = aggregate(baseline);
        let current = aggregate(current);

        let baseline_keys: HashSet<IssueKey> = baseline.issues().iter().map(Issue::key).collect();
        let current_keys: HashSet<IssueKey> = current.issues().iter().map(Issue::key).collect();

        let (persistent_issues, new_issues): (Vec<Issue>, Vec<Issue>) = current
            .issues()
            .iter()
            .cloned()
            .partition(|issue| baseline_keys.contains(&issue.key()));

        let resolved_issues = baseline
            .issues()
            .iter()
            .filter(|issue| !current_keys.contains(&issue.key()))
            .cloned()
            .collect();

        let severity_deltas = Severity::ALL
            .into_iter()
            .map(|s| (s, count_delta(current.count_for(s), baseline.count_for(s))))
            .collect();

        Self {
            new_issues,
            resolved_issues,
            persistent_issues,
            severity_deltas,
            issue_delta: count_delta(current.issue_count(), baseline.issue_count()),
        }
    }

    /// Whether the current run introduced no new issues.
    pub fn is_clean(&self) -> bool {
        self.new_issues.is_empty()
    }
}

fn count_delta(current: usize, baseline: usize) -> i64 {
    current as i64 - baseline as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(file: &str, line: u32, rule: &str, severity: Severity) -> Issue {
        Issue::new("cppcheck", rule, "message")
            .at(file, line, 1)
            .with_severity(severity)
    }

    #[test]
    fn test_compare_identical_runs() {
        let run = AnalysisResult::new("cppcheck").with_issues(vec![
            issue("a.c", 1, "r1", Severity::Warning),
            issue("a.c", 1, "r1", Severity::Warning),
            issue("b.c", 4, "r2", Severity::Error),
        ]);

        let report = ComparisonReport::compute(std::slice::from_ref(&run), &[run.clone()]);

        assert!(report.new_issues.is_empty());
        assert!(report.resolved_issues.is_empty());
        assert_eq!(report.persistent_issues.len(), 2);
        assert_eq!(report.issue_delta, 0);
        assert!(report.severity_deltas.values().all(|d| *d == 0));
        assert!(report.is_clean());
    }

    #[test]
    fn test_compare_classifies_new_resolved_persistent() {
        let baseline = AnalysisResult::new("cppcheck").with_issues(vec![
            issue("a.c", 1, "r1", Severity::Warning),
            issue("a.c", 2, "r2", Severity::Error),
        ]);
        let current = AnalysisResult::new("cppcheck").with_issues(vec![
            issue("a.c", 1, "r1", Severity::Warning),
            issue("c.c", 3, "r3", Severity::Critical),
            issue("c.c", 4, "r3", Severity::Critical),
        ]);

        let report = ComparisonReport::compute(&[baseline], &[current]);

        assert_eq!(report.new_issues.len(), 2);
        assert_eq!(report.resolved_issues.len(), 1);
        assert_eq!(report.resolved_issues[0].rule_id, "r2");
        assert_eq!(report.persistent_issues.len(), 1);
        assert_eq!(report.issue_delta, 1);
        assert_eq!(report.severity_deltas[&Severity::Critical], 2);
        assert_eq!(report.severity_deltas[&Severity::Error], -1);
        assert_eq!(report.severity_deltas[&Severity::Warning], 0);
        assert_eq!(report.severity_deltas[&Severity::Info], 0);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_compare_against_empty_baseline() {
        let current =
            AnalysisResult::new("cppcheck").with_issues(vec![issue("a.c", 1, "r1", Severity::Info)]);
        let report = ComparisonReport::compute(&[], &[current]);
        assert_eq!(report.new_issues.len(), 1);
        assert_eq!(report.issue_delta, 1);
    }
}
