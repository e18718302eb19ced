//! Domain layer for crosslint
//!
//! This crate contains the data model and the pure algorithms of the
//! analysis orchestrator. It has no dependencies on process execution,
//! persistence or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Issue**: one defect reported by one external tool
//! - **AnalysisResult**: everything one tool run produced, with derived counts
//! - **ToolConfig**: closed set of per-tool settings, validated purely
//! - **Reports**: aggregation with deduplication, statistics and comparison

pub mod analysis;
pub mod config;
pub mod core;
pub mod issue;
pub mod report;

// Re-export commonly used types
pub use analysis::{AnalysisRequest, AnalysisResult, Progress, ResultDocument};
pub use config::{
    ClangTidyConfig, CommandToolConfig, CppcheckConfig, OUTPUT_PLACEHOLDER, OutputFormat,
    SOURCE_PLACEHOLDER, ToolConfig, ToolKind, ValidationResult,
};
pub use core::error::DomainError;
pub use issue::{Category, Issue, IssueKey, Severity};
pub use report::{
    AGGREGATED_TOOL_NAME, AnalysisStatistics, ComparisonReport, DEFAULT_TOP_FILES,
    FileIssueCount, aggregate,
};
