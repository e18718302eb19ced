//! Tool configuration from TOML (`[tools]` section)
//!
//! Built-in analyzers use their domain config types directly; user-defined
//! programs are keyed by the name they register under:
//!
//! ```toml
//! [tools.cppcheck]
//! enable = ["warning", "performance"]
//! standard = "c++17"
//!
//! [tools.clang_tidy]
//! checks = ["-*", "bugprone-*"]
//!
//! [tools.command.mylint]
//! program = "mylint"
//! args = ["--format=gcc", "{source}"]
//! extensions = ["c", "h"]
//! ```

use crosslint_domain::{ClangTidyConfig, CommandToolConfig, CppcheckConfig, ToolConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw tools configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolsConfig {
    pub cppcheck: Option<CppcheckConfig>,
    pub clang_tidy: Option<ClangTidyConfig>,
    /// User-defined programs; the table key is the tool name
    pub command: BTreeMap<String, CommandToolConfig>,
}

impl FileToolsConfig {
    /// Command tools with their names filled in from the table keys.
    pub fn command_tools(&self) -> Vec<CommandToolConfig> {
        self.command
            .iter()
            .map(|(name, tool)| CommandToolConfig {
                name: name.clone(),
                ..tool.clone()
            })
            .collect()
    }

    /// Every configured section as a `(tool name, config)` pair.
    pub fn tool_configs(&self) -> Vec<(String, ToolConfig)> {
        let mut configs = Vec::new();
        if let Some(c) = &self.cppcheck {
            configs.push(("cppcheck".to_string(), ToolConfig::Cppcheck(c.clone())));
        }
        if let Some(c) = &self.clang_tidy {
            configs.push(("clang-tidy".to_string(), ToolConfig::ClangTidy(c.clone())));
        }
        configs.extend(
            self.command_tools()
                .into_iter()
                .map(|c| (c.name.clone(), ToolConfig::Command(c))),
        );
        configs
    }
}
