//! clang-tidy binding
//!
//! clang-tidy takes individual translation units, so a directory source is
//! expanded into the files discovered under it. Include paths and
//! definitions are passed after `--` unless a compilation database is
//! configured, in which case the database supplies the flags.

use super::external::{ExternalToolAdapter, ToolProfile};
use crosslint_application::AdapterError;
use crosslint_domain::{AnalysisRequest, ClangTidyConfig, Issue, ToolConfig, ToolKind};
use std::path::PathBuf;

pub const CLANG_TIDY: &str = "clang-tidy";

const EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx", "c++", "m", "mm"];

pub type ClangTidyAdapter = ExternalToolAdapter<ClangTidyProfile>;

#[derive(Debug, Clone, Copy, Default)]
pub struct ClangTidyProfile;

impl ClangTidyAdapter {
    pub fn clang_tidy() -> Self {
        ExternalToolAdapter::new(ClangTidyProfile)
    }
}

impl ToolProfile for ClangTidyProfile {
    fn kind(&self) -> ToolKind {
        ToolKind::ClangTidy
    }

    fn name(&self) -> &str {
        CLANG_TIDY
    }

    fn description(&self, _config: Option<&ToolConfig>) -> String {
        "clang-based C/C++ linter with bugprone, modernize and performance checks".to_string()
    }

    fn default_config(&self) -> ToolConfig {
        ToolConfig::ClangTidy(ClangTidyConfig::default())
    }

    fn program(&self, _config: &ToolConfig) -> String {
        CLANG_TIDY.to_string()
    }

    fn extensions(&self, _config: Option<&ToolConfig>) -> Vec<String> {
        EXTENSIONS.iter().map(|e| e.to_string()).collect()
    }

    fn requirements(&self) -> String {
        "clang-tidy from LLVM on PATH".to_string()
    }

    fn expands_directories(&self) -> bool {
        true
    }

    fn arguments(
        &self,
        config: &ToolConfig,
        request: &AnalysisRequest,
        targets: &[PathBuf],
    ) -> Result<Vec<String>, AdapterError> {
        let ToolConfig::ClangTidy(c) = config else {
            return Err(AdapterError::InvalidConfigType {
                adapter: CLANG_TIDY.to_string(),
                expected: ToolKind::ClangTidy,
                actual: config.kind(),
            });
        };

        let mut args = vec!["--quiet".to_string()];
        if !c.checks.is_empty() {
            args.push(format!("--checks={}", c.checks.join(",")));
        }
        if !c.warnings_as_errors.is_empty() {
            args.push(format!(
                "--warnings-as-errors={}",
                c.warnings_as_errors.join(",")
            ));
        }
        if let Some(filter) = &c.header_filter {
            args.push(format!("--header-filter={}", filter));
        }
        if let Some(dir) = &c.compile_commands_dir {
            args.push("-p".to_string());
            args.push(dir.display().to_string());
        }
        if c.fix {
            args.push("--fix".to_string());
        }
        args.extend(c.extra_args.iter().cloned());
        args.extend(targets.iter().map(|t| t.display().to_string()));

        if c.compile_commands_dir.is_none() {
            args.push("--".to_string());
            for include in &request.include_paths {
                args.push(format!("-I{}", include.display()));
            }
            for definition in &request.definitions {
                args.push(format!("-D{}", definition));
            }
        }
        Ok(args)
    }

    /// clang-tidy exits non-zero whenever it reports errors; that is still a
    /// completed analysis as long as findings were produced.
    fn exit_ok(&self, _config: &ToolConfig, code: i32, issues: &[Issue]) -> bool {
        code == 0 || !issues.is_empty()
    }
}
