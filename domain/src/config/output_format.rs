//! Output format value object

use serde::{Deserialize, Serialize};

/// Output format for analysis reports
///
/// This is a domain concept representing how a report should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Every issue, grouped per tool (default)
    #[default]
    Full,
    /// Counts and top files only
    Summary,
    /// JSON document
    Json,
}
