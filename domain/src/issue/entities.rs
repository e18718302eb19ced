//! Issue entity

use super::value_objects::{Category, Severity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One defect reported by an analysis tool.
///
/// Line and column are 1-based; `0` means the tool did not report a
/// position. Issues are owned by the [`AnalysisResult`](crate::AnalysisResult)
/// that holds them and are not mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub message: String,
    pub file_path: String,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
    pub severity: Severity,
    pub category: Category,
    pub rule_id: String,
    pub tool_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_suggestion: Option<String>,
}

impl Issue {
    /// Create an issue with an unknown position, `Warning` severity and
    /// `Bug` category. Use the `with_*` builders for the rest.
    pub fn new(
        tool_name: impl Into<String>,
        rule_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            message: message.into(),
            file_path: String::new(),
            line: 0,
            column: 0,
            severity: Severity::Warning,
            category: Category::Bug,
            rule_id: rule_id.into(),
            tool_name: tool_name.into(),
            fix_suggestion: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn at(mut self, file_path: impl Into<String>, line: u32, column: u32) -> Self {
        self.file_path = file_path.into();
        self.line = line;
        self.column = column;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_fix(mut self, suggestion: impl Into<String>) -> Self {
        self.fix_suggestion = Some(suggestion.into());
        self
    }

    /// The key used to decide whether two issues are "the same issue".
    ///
    /// Column and message are deliberately not part of the key: two tools
    /// reporting the same rule on the same line collapse into one issue.
    pub fn key(&self) -> IssueKey {
        IssueKey {
            file_path: self.file_path.clone(),
            line: self.line,
            rule_id: self.rule_id.clone(),
        }
    }

    pub fn has_position(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {} [{}]",
            self.file_path, self.line, self.column, self.severity, self.message, self.rule_id
        )
    }
}

/// Deduplication key: `(file path, line number, rule id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IssueKey {
    pub file_path: String,
    pub line: u32,
    pub rule_id: String,
}
