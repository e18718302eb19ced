//! Report algorithms over analysis results
//!
//! All functions here are pure: they read results and build new values.
//!
//! | Operation | Dedup | Output |
//! |-----------|:-----:|--------|
//! | [`aggregate`] | yes | one merged [`AnalysisResult`](crate::AnalysisResult) |
//! | [`AnalysisStatistics::compute`] | no | counts and top files |
//! | [`ComparisonReport::compute`] | yes, per side | new / resolved / persistent |
//!
//! Deduplication uses [`IssueKey`](crate::IssueKey): `(file path, line, rule id)`.

pub mod aggregation;
pub mod comparison;
pub mod statistics;

pub use aggregation::{AGGREGATED_TOOL_NAME, aggregate, dedup_issues};
pub use comparison::ComparisonReport;
pub use statistics::{AnalysisStatistics, DEFAULT_TOP_FILES, FileIssueCount};
