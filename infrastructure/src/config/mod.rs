//! Configuration file loading for crosslint
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CROSSLINT_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./crosslint.toml` or `./.crosslint.toml`
//! 4. Global: `$XDG_CONFIG_HOME/crosslint/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{FileConfig, FileOutputConfig, FileRunConfig, FileToolsConfig};
pub use loader::{ConfigLoader, ENV_PREFIX};
