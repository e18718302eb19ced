//! Concrete analyzer adapters
//!
//! All adapters share [`ExternalToolAdapter`]: executable lookup via `which`,
//! a cached `--version` probe, compiler-style diagnostic parsing and
//! cooperative cancellation. They differ only in their [`ToolProfile`].
//!
//! # Registration
//!
//! ```ignore
//! use crosslint_infrastructure::adapters::register_builtin_adapters;
//!
//! register_builtin_adapters();
//! let cppcheck = ToolRegistry::create("cppcheck");
//! ```

pub mod clang_tidy;
pub mod command;
pub mod cppcheck;
pub mod diagnostics;
pub mod external;
pub mod process;

pub use clang_tidy::{CLANG_TIDY, ClangTidyAdapter, ClangTidyProfile};
pub use command::{CommandAdapter, CommandProfile};
pub use cppcheck::{CPPCHECK, CppcheckAdapter, CppcheckProfile};
pub use external::{ExternalToolAdapter, ToolProfile};

use crosslint_application::{AdapterError, ToolAdapter, ToolRegistry};
use crosslint_domain::{CommandToolConfig, ToolConfig};
use std::sync::Arc;
use tracing::debug;

/// Register the cppcheck and clang-tidy factories in the global registry.
pub fn register_builtin_adapters() {
    ToolRegistry::register(CPPCHECK, || {
        Ok(Arc::new(CppcheckAdapter::cppcheck()) as Arc<dyn ToolAdapter>)
    });
    ToolRegistry::register(CLANG_TIDY, || {
        Ok(Arc::new(ClangTidyAdapter::clang_tidy()) as Arc<dyn ToolAdapter>)
    });
}

/// Register one factory per user-defined command tool, keyed by its name.
pub fn register_command_tools(tools: impl IntoIterator<Item = CommandToolConfig>) {
    for tool in tools {
        let name = tool.name.clone();
        debug!(tool = %name, program = %tool.program, "Registering command tool");
        ToolRegistry::register(name, move || {
            let validation = tool.validate();
            if !validation.is_valid() {
                return Err(AdapterError::ExecutionFailure(validation.to_string()));
            }
            Ok(Arc::new(CommandAdapter::from_config(tool.clone())) as Arc<dyn ToolAdapter>)
        });
    }
}

/// Build an adapter for `config`, configured with it.
pub fn adapter_for(config: ToolConfig) -> Result<Arc<dyn ToolAdapter>, AdapterError> {
    let adapter: Arc<dyn ToolAdapter> = match config {
        ToolConfig::Cppcheck(_) => Arc::new(ExternalToolAdapter::with_configuration(
            CppcheckProfile,
            config,
        )?),
        ToolConfig::ClangTidy(_) => Arc::new(ExternalToolAdapter::with_configuration(
            ClangTidyProfile,
            config,
        )?),
        ToolConfig::Command(c) => Arc::new(CommandAdapter::from_config(c)),
    };
    Ok(adapter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosslint_domain::{ClangTidyConfig, ToolKind};

    #[test]
    fn test_adapter_for_keeps_configuration() {
        let config = ToolConfig::ClangTidy(ClangTidyConfig {
            checks: vec!["bugprone-*".to_string()],
            ..Default::default()
        });
        let adapter = adapter_for(config.clone()).unwrap();

        assert_eq!(adapter.name(), CLANG_TIDY);
        assert_eq!(adapter.configuration(), Some(config));

        let command = adapter_for(ToolConfig::Command(CommandToolConfig::new("lint", "lint")))
            .unwrap();
        assert_eq!(command.name(), "lint");
        assert_eq!(command.configuration().unwrap().kind(), ToolKind::Command);
    }

    // Only test in this crate touching the global registry.
    #[test]
    fn test_registration() {
        register_builtin_adapters();
        register_command_tools([
            CommandToolConfig::new("mylint", "mylint"),
            CommandToolConfig::new("broken", ""),
        ]);

        assert!(ToolRegistry::is_registered(CPPCHECK));
        assert!(ToolRegistry::is_registered(CLANG_TIDY));
        assert_eq!(ToolRegistry::create("mylint").unwrap().name(), "mylint");
        assert!(ToolRegistry::is_registered("broken"));
        assert!(ToolRegistry::create("broken").is_none());
    }
}
