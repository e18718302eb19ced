//! Issue classification value objects
//!
//! [`Severity`] is totally ordered (`Info < Warning < Error < Critical`) so
//! that reports can be filtered with "at least X" semantics. [`Category`]
//! is a flat classification used for statistics only.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a discovered issue.
///
/// The declaration order defines the ordering used by
/// [`AnalysisResult::filter_min_severity`](crate::AnalysisResult::filter_min_severity).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// All severities, lowest first.
    pub const ALL: [Severity; 4] = [
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }

    /// Whether this severity is at least `threshold`.
    pub fn is_at_least(&self, threshold: Severity) -> bool {
        *self >= threshold
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" | "information" | "note" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "critical" | "fatal" => Ok(Severity::Critical),
            other => Err(DomainError::InvalidSeverity(other.to_string())),
        }
    }
}

/// Category of a discovered issue.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Style,
    Performance,
    Security,
    #[default]
    Bug,
    Portability,
    Modernization,
    Maintainability,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Style,
        Category::Performance,
        Category::Security,
        Category::Bug,
        Category::Portability,
        Category::Modernization,
        Category::Maintainability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Style => "style",
            Category::Performance => "performance",
            Category::Security => "security",
            Category::Bug => "bug",
            Category::Portability => "portability",
            Category::Modernization => "modernization",
            Category::Maintainability => "maintainability",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or(DomainError::InvalidCategory(normalized))
    }
}
