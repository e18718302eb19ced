//! User-defined analyzers
//!
//! Any program that prints compiler-style diagnostics can be plugged in
//! through a `[tools.command.<name>]` section. The argument template may
//! reference `{source}` and `{output}`; when `{output}` is used the program
//! is expected to write its diagnostics there and the file is parsed after
//! the run.

use super::external::{ExternalToolAdapter, ToolProfile};
use crosslint_application::AdapterError;
use crosslint_domain::{
    AnalysisRequest, CommandToolConfig, Issue, OUTPUT_PLACEHOLDER, SOURCE_PLACEHOLDER,
    ToolConfig, ToolKind,
};
use std::path::PathBuf;

pub type CommandAdapter = ExternalToolAdapter<CommandProfile>;

#[derive(Debug, Clone)]
pub struct CommandProfile {
    name: String,
    /// Configuration the adapter was created from, used as its default
    template: CommandToolConfig,
}

impl CommandProfile {
    pub fn new(config: CommandToolConfig) -> Self {
        Self {
            name: config.name.clone(),
            template: config,
        }
    }
}

impl CommandAdapter {
    /// Adapter registered under `config.name`.
    pub fn from_config(config: CommandToolConfig) -> Self {
        ExternalToolAdapter::new(CommandProfile::new(config))
    }
}

fn command_config(config: &ToolConfig) -> Option<&CommandToolConfig> {
    match config {
        ToolConfig::Command(c) => Some(c),
        _ => None,
    }
}

impl ToolProfile for CommandProfile {
    fn kind(&self) -> ToolKind {
        ToolKind::Command
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self, config: Option<&ToolConfig>) -> String {
        let c = config.and_then(command_config).unwrap_or(&self.template);
        if c.description.is_empty() {
            format!("User-defined analyzer running '{}'", c.program)
        } else {
            c.description.clone()
        }
    }

    fn default_config(&self) -> ToolConfig {
        ToolConfig::Command(self.template.clone())
    }

    fn program(&self, config: &ToolConfig) -> String {
        command_config(config)
            .map(|c| c.program.clone())
            .unwrap_or_default()
    }

    fn extensions(&self, config: Option<&ToolConfig>) -> Vec<String> {
        config
            .and_then(command_config)
            .unwrap_or(&self.template)
            .extensions
            .clone()
    }

    fn requirements(&self) -> String {
        format!("'{}' on PATH", self.template.program)
    }

    fn arguments(
        &self,
        config: &ToolConfig,
        request: &AnalysisRequest,
        targets: &[PathBuf],
    ) -> Result<Vec<String>, AdapterError> {
        let Some(c) = command_config(config) else {
            return Err(AdapterError::InvalidConfigType {
                adapter: self.name.clone(),
                expected: ToolKind::Command,
                actual: config.kind(),
            });
        };

        let source = targets
            .iter()
            .map(|t| t.display().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let output = request.output_path.display().to_string();

        Ok(c.args
            .iter()
            .map(|arg| {
                arg.replace(SOURCE_PLACEHOLDER, &source)
                    .replace(OUTPUT_PLACEHOLDER, &output)
            })
            .collect())
    }

    fn writes_output_file(&self, config: &ToolConfig) -> bool {
        command_config(config)
            .is_some_and(|c| c.args.iter().any(|a| a.contains(OUTPUT_PLACEHOLDER)))
    }

    fn exit_ok(&self, config: &ToolConfig, code: i32, _issues: &[Issue]) -> bool {
        command_config(config).is_some_and(|c| c.success_exit_codes.contains(&code))
    }
}
