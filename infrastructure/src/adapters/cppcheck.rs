//! cppcheck binding

use super::external::{ExternalToolAdapter, ToolProfile};
use crosslint_application::AdapterError;
use crosslint_domain::{AnalysisRequest, CppcheckConfig, ToolConfig, ToolKind};
use std::path::PathBuf;

pub const CPPCHECK: &str = "cppcheck";

/// Output template producing compiler-style lines.
pub const CPPCHECK_TEMPLATE: &str = "{file}:{line}:{column}: {severity}: {message} [{id}]";

const EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx", "c++", "h", "hh", "hpp", "hxx"];

pub type CppcheckAdapter = ExternalToolAdapter<CppcheckProfile>;

#[derive(Debug, Clone, Copy, Default)]
pub struct CppcheckProfile;

impl CppcheckAdapter {
    pub fn cppcheck() -> Self {
        ExternalToolAdapter::new(CppcheckProfile)
    }
}

impl ToolProfile for CppcheckProfile {
    fn kind(&self) -> ToolKind {
        ToolKind::Cppcheck
    }

    fn name(&self) -> &str {
        CPPCHECK
    }

    fn description(&self, _config: Option<&ToolConfig>) -> String {
        "Static analysis of C and C++ code focused on undefined behaviour".to_string()
    }

    fn default_config(&self) -> ToolConfig {
        ToolConfig::Cppcheck(CppcheckConfig::default())
    }

    fn program(&self, _config: &ToolConfig) -> String {
        CPPCHECK.to_string()
    }

    fn extensions(&self, _config: Option<&ToolConfig>) -> Vec<String> {
        EXTENSIONS.iter().map(|e| e.to_string()).collect()
    }

    fn requirements(&self) -> String {
        "cppcheck 2.x on PATH (https://cppcheck.sourceforge.io)".to_string()
    }

    fn arguments(
        &self,
        config: &ToolConfig,
        request: &AnalysisRequest,
        targets: &[PathBuf],
    ) -> Result<Vec<String>, AdapterError> {
        let ToolConfig::Cppcheck(c) = config else {
            return Err(AdapterError::InvalidConfigType {
                adapter: CPPCHECK.to_string(),
                expected: ToolKind::Cppcheck,
                actual: config.kind(),
            });
        };

        let mut args = vec![format!("--template={}", CPPCHECK_TEMPLATE)];
        if !c.enable.is_empty() {
            args.push(format!("--enable={}", c.enable.join(",")));
        }
        if let Some(std) = &c.standard {
            args.push(format!("--std={}", std));
        }
        if let Some(platform) = &c.platform {
            args.push(format!("--platform={}", platform));
        }
        for suppression in &c.suppressions {
            args.push(format!("--suppress={}", suppression));
        }
        if c.jobs > 1 {
            args.push(format!("-j{}", c.jobs));
        }
        if c.inconclusive {
            args.push("--inconclusive".to_string());
        }
        for include in &request.include_paths {
            args.push(format!("-I{}", include.display()));
        }
        for definition in &request.definitions {
            args.push(format!("-D{}", definition));
        }
        args.extend(c.extra_args.iter().cloned());
        args.extend(targets.iter().map(|t| t.display().to_string()));
        Ok(args)
    }
}
