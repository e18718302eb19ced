//! Per-tool configuration
//!
//! [`ToolConfig`] is a closed set of variants, one per adapter kind. An
//! adapter accepts only its own variant; anything else is reported as an
//! invalid configuration type rather than silently ignored.
//!
//! Every variant validates purely (no filesystem or process access) into a
//! [`ValidationResult`].

use super::validation::ValidationResult;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Placeholder replaced by the request's source path in command templates.
pub const SOURCE_PLACEHOLDER: &str = "{source}";
/// Placeholder replaced by the request's output path in command templates.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Check groups accepted by cppcheck's `--enable`.
const CPPCHECK_CHECKS: &[&str] = &[
    "all",
    "warning",
    "style",
    "performance",
    "portability",
    "information",
    "unusedFunction",
    "missingInclude",
];

const CPPCHECK_STANDARDS: &[&str] = &[
    "c89", "c99", "c11", "c17", "c23", "c++03", "c++11", "c++14", "c++17", "c++20", "c++23",
];

const MAX_REASONABLE_JOBS: usize = 64;

/// Adapter kinds known to crosslint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Cppcheck,
    ClangTidy,
    Command,
}

impl ToolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Cppcheck => "cppcheck",
            ToolKind::ClangTidy => "clang_tidy",
            ToolKind::Command => "command",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "cppcheck" => Ok(ToolKind::Cppcheck),
            "clang_tidy" => Ok(ToolKind::ClangTidy),
            "command" => Ok(ToolKind::Command),
            other => Err(DomainError::InvalidToolKind(other.to_string())),
        }
    }
}

/// Settings owned by one adapter instance, replaced wholesale on configure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolConfig {
    Cppcheck(CppcheckConfig),
    ClangTidy(ClangTidyConfig),
    Command(CommandToolConfig),
}

impl ToolConfig {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolConfig::Cppcheck(_) => ToolKind::Cppcheck,
            ToolConfig::ClangTidy(_) => ToolKind::ClangTidy,
            ToolConfig::Command(_) => ToolKind::Command,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        match self {
            ToolConfig::Cppcheck(c) => c.validate(),
            ToolConfig::ClangTidy(c) => c.validate(),
            ToolConfig::Command(c) => c.validate(),
        }
    }

    /// Explicit executable override, if configured.
    pub fn executable(&self) -> Option<&PathBuf> {
        match self {
            ToolConfig::Cppcheck(c) => c.executable.as_ref(),
            ToolConfig::ClangTidy(c) => c.executable.as_ref(),
            ToolConfig::Command(_) => None,
        }
    }
}

/// cppcheck settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CppcheckConfig {
    pub executable: Option<PathBuf>,
    /// Values for `--enable`
    pub enable: Vec<String>,
    /// Language standard for `--std`
    pub standard: Option<String>,
    pub platform: Option<String>,
    /// Values for `--suppress`
    pub suppressions: Vec<String>,
    pub jobs: usize,
    pub inconclusive: bool,
    pub extra_args: Vec<String>,
}

impl Default for CppcheckConfig {
    fn default() -> Self {
        Self {
            executable: None,
            enable: vec!["warning".to_string(), "style".to_string(), "performance".to_string()],
            standard: None,
            platform: None,
            suppressions: Vec::new(),
            jobs: 1,
            inconclusive: false,
            extra_args: Vec::new(),
        }
    }
}

impl CppcheckConfig {
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();

        validate_executable(&self.executable, &mut result);

        if self.jobs == 0 {
            result.add_error("jobs must be at least 1");
        } else if self.jobs > MAX_REASONABLE_JOBS {
            result.add_warning(format!(
                "jobs = {} is unusually high (more than {})",
                self.jobs, MAX_REASONABLE_JOBS
            ));
        }

        for check in &self.enable {
            if !CPPCHECK_CHECKS.contains(&check.as_str()) {
                result.add_error(format!("unknown check group '{}'", check));
            }
        }

        if let Some(std) = &self.standard
            && !CPPCHECK_STANDARDS.contains(&std.as_str())
        {
            result.add_warning(format!("language standard '{}' may not be supported", std));
        }

        if self.suppressions.iter().any(|s| s.trim().is_empty()) {
            result.add_error("suppressions must not contain empty entries");
        }

        if self.inconclusive {
            result.add_warning("inconclusive checks can produce false positives");
        }

        result
    }
}

/// clang-tidy settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClangTidyConfig {
    pub executable: Option<PathBuf>,
    /// Check patterns joined into `--checks`, e.g. `-*`, `bugprone-*`
    pub checks: Vec<String>,
    pub header_filter: Option<String>,
    /// Directory containing `compile_commands.json` (`-p`)
    pub compile_commands_dir: Option<PathBuf>,
    pub warnings_as_errors: Vec<String>,
    /// Apply suggested fixes in place (`--fix`)
    pub fix: bool,
    pub extra_args: Vec<String>,
}

impl ClangTidyConfig {
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();

        validate_executable(&self.executable, &mut result);

        if self.checks.is_empty() {
            result.add_warning("no checks configured; clang-tidy will use .clang-tidy defaults");
        }
        for check in self.checks.iter().chain(&self.warnings_as_errors) {
            if check.trim().is_empty() || check.contains(char::is_whitespace) || check.contains(',')
            {
                result.add_error(format!("invalid check pattern '{}'", check));
            }
        }

        if matches!(&self.header_filter, Some(filter) if filter.is_empty()) {
            result.add_error("header_filter must not be empty when set");
        }

        if self.fix {
            result.add_warning("fix = true rewrites source files in place");
        }

        result
    }
}

/// A user-defined external program reporting compiler-style diagnostics
/// (`file:line:col: severity: message [rule]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandToolConfig {
    /// Name the adapter registers under
    pub name: String,
    pub program: String,
    /// Argument template; see [`SOURCE_PLACEHOLDER`] and [`OUTPUT_PLACEHOLDER`]
    pub args: Vec<String>,
    /// File extensions (without dot) this tool understands
    pub extensions: Vec<String>,
    /// Exit codes treated as a successful run
    pub success_exit_codes: Vec<i32>,
    pub description: String,
}

impl Default for CommandToolConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            program: String::new(),
            args: vec![SOURCE_PLACEHOLDER.to_string()],
            extensions: Vec::new(),
            success_exit_codes: vec![0],
            description: String::new(),
        }
    }
}

impl CommandToolConfig {
    pub fn new(name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();

        if self.name.trim().is_empty() {
            result.add_error("name must not be empty");
        }
        if self.program.trim().is_empty() {
            result.add_error("program must not be empty");
        }
        if !self.args.iter().any(|a| a.contains(SOURCE_PLACEHOLDER)) {
            result.add_warning(format!(
                "args do not reference {}; the source path will not be passed",
                SOURCE_PLACEHOLDER
            ));
        }
        if self.success_exit_codes.is_empty() {
            result.add_warning("no success exit codes; every run will be reported as failed");
        }
        if self.extensions.iter().any(|e| e.starts_with('.')) {
            result.add_warning("extensions should be listed without a leading dot");
        }

        result
    }
}

fn validate_executable(executable: &Option<PathBuf>, result: &mut ValidationResult) {
    if matches!(executable, Some(path) if path.as_os_str().is_empty()) {
        result.add_error("executable must not be empty when set");
    }
}
