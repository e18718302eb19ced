//! Analysis result entity and its persisted document form
//!
//! [`AnalysisResult`] is what one adapter run produces. The issue list is
//! private: every mutation goes through a method that recomputes the
//! severity and category counts, so the counts always describe the current
//! issues.
//!
//! Serialization goes through [`ResultDocument`], the durable JSON shape:
//!
//! ```json
//! {
//!   "tool_name": "cppcheck",
//!   "run_id": "2b0f…",
//!   "timestamp": "2026-01-01T12:00:00.000Z",
//!   "files_analyzed": 3,
//!   "execution_time_ms": 1250,
//!   "success": true,
//!   "error_message": "",
//!   "issues": [ … ],
//!   "severity_counts": { "warning": 2 },
//!   "category_counts": { "bug": 2 }
//! }
//! ```

use crate::core::error::DomainError;
use crate::issue::{Category, Issue, Severity};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Error message used when a failure is recorded without one.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// Output of one adapter run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ResultDocument", try_from = "ResultDocument")]
pub struct AnalysisResult {
    pub tool_name: String,
    /// Unique per invocation.
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub files_analyzed: usize,
    pub execution_time: Duration,
    success: bool,
    error_message: String,
    issues: Vec<Issue>,
    severity_counts: BTreeMap<Severity, usize>,
    category_counts: BTreeMap<Category, usize>,
}

impl AnalysisResult {
    /// A successful, empty result stamped with a fresh run id and the
    /// current time.
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            run_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            files_analyzed: 0,
            execution_time: Duration::ZERO,
            success: true,
            error_message: String::new(),
            issues: Vec::new(),
            severity_counts: BTreeMap::new(),
            category_counts: BTreeMap::new(),
        }
    }

    /// A failed result. An empty message is replaced by [`UNKNOWN_ERROR`].
    pub fn failure(tool_name: impl Into<String>, error_message: impl Into<String>) -> Self {
        let mut result = Self::new(tool_name);
        result.mark_failed(error_message);
        result
    }

    pub fn with_issues(mut self, issues: Vec<Issue>) -> Self {
        self.set_issues(issues);
        self
    }

    pub fn with_files_analyzed(mut self, files: usize) -> Self {
        self.files_analyzed = files;
        self
    }

    pub fn with_execution_time(mut self, elapsed: Duration) -> Self {
        self.execution_time = elapsed;
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Empty when the run succeeded.
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Mark the run as failed.
    pub fn mark_failed(&mut self, error_message: impl Into<String>) {
        let message = error_message.into();
        self.success = false;
        self.error_message = if message.trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            message
        };
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    pub fn set_issues(&mut self, issues: Vec<Issue>) {
        self.issues = issues;
        self.recompute_counts();
    }

    pub fn push_issue(&mut self, issue: Issue) {
        self.issues.push(issue);
        self.recompute_counts();
    }

    pub fn retain_issues(&mut self, keep: impl FnMut(&Issue) -> bool) {
        self.issues.retain(keep);
        self.recompute_counts();
    }

    /// Issue counts keyed by severity. Severities with no issues are absent.
    pub fn severity_counts(&self) -> &BTreeMap<Severity, usize> {
        &self.severity_counts
    }

    /// Issue counts keyed by category. Categories with no issues are absent.
    pub fn category_counts(&self) -> &BTreeMap<Category, usize> {
        &self.category_counts
    }

    pub fn count_for(&self, severity: Severity) -> usize {
        self.severity_counts.get(&severity).copied().unwrap_or(0)
    }

    pub fn count_for_category(&self, category: Category) -> usize {
        self.category_counts.get(&category).copied().unwrap_or(0)
    }

    /// A copy of this result keeping only issues at or above `min`.
    pub fn filter_min_severity(&self, min: Severity) -> AnalysisResult {
        let mut filtered = self.clone();
        filtered.retain_issues(|issue| issue.severity.is_at_least(min));
        filtered
    }

    fn recompute_counts(&mut self) {
        self.severity_counts.clear();
        self.category_counts.clear();
        for issue in &self.issues {
            *self.severity_counts.entry(issue.severity).or_insert(0) += 1;
            *self.category_counts.entry(issue.category).or_insert(0) += 1;
        }
    }
}

/// Durable JSON representation of an [`AnalysisResult`].
///
/// Count maps are keyed by the lowercase severity/category name. They are
/// written for readers of the file and ignored on load, where counts are
/// recomputed from `issues`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultDocument {
    pub tool_name: String,
    pub run_id: String,
    pub timestamp: String,
    pub files_analyzed: usize,
    pub execution_time_ms: u64,
    pub success: bool,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub severity_counts: BTreeMap<String, usize>,
    #[serde(default)]
    pub category_counts: BTreeMap<String, usize>,
}

impl From<AnalysisResult> for ResultDocument {
    fn from(result: AnalysisResult) -> Self {
        Self {
            severity_counts: result
                .severity_counts
                .iter()
                .map(|(s, n)| (s.to_string(), *n))
                .collect(),
            category_counts: result
                .category_counts
                .iter()
                .map(|(c, n)| (c.to_string(), *n))
                .collect(),
            tool_name: result.tool_name,
            run_id: result.run_id,
            timestamp: result
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            files_analyzed: result.files_analyzed,
            execution_time_ms: u64::try_from(result.execution_time.as_millis())
                .unwrap_or(u64::MAX),
            success: result.success,
            error_message: result.error_message,
            issues: result.issues,
        }
    }
}

impl TryFrom<ResultDocument> for AnalysisResult {
    type Error = DomainError;

    fn try_from(doc: ResultDocument) -> Result<Self, Self::Error> {
        let timestamp = DateTime::parse_from_rfc3339(&doc.timestamp)
            .map_err(|e| {
                DomainError::InvalidDocument(format!("bad timestamp '{}': {}", doc.timestamp, e))
            })?
            .with_timezone(&Utc);

        if !doc.success && doc.error_message.trim().is_empty() {
            return Err(DomainError::InvalidDocument(format!(
                "failed result for '{}' has no error message",
                doc.tool_name
            )));
        }

        let mut result = AnalysisResult::new(doc.tool_name);
        result.run_id = doc.run_id;
        result.timestamp = timestamp;
        result.files_analyzed = doc.files_analyzed;
        result.execution_time = Duration::from_millis(doc.execution_time_ms);
        result.success = doc.success;
        result.error_message = if doc.success {
            String::new()
        } else {
            doc.error_message
        };
        result.set_issues(doc.issues);
        Ok(result)
    }
}
