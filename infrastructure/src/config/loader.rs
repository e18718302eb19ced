//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["crosslint.toml", ".crosslint.toml"];

/// Environment variable prefix; nested keys are separated by `__`, e.g.
/// `CROSSLINT_RUN__MIN_SEVERITY=error`.
pub const ENV_PREFIX: &str = "CROSSLINT_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `CROSSLINT_*` environment variables
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./crosslint.toml` or `./.crosslint.toml`
    /// 4. Global config: `$XDG_CONFIG_HOME/crosslint/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path, Path::new("."), Self::global_config_path())
            .extract()
            .map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    fn figment(
        config_path: Option<&PathBuf>,
        project_dir: &Path,
        global_path: Option<PathBuf>,
    ) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = global_path
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        if let Some(path) = Self::project_config_in(project_dir) {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("crosslint").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        Self::project_config_in(Path::new("."))
    }

    fn project_config_in(dir: &Path) -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Describe the config file locations being used (for --show-config)
    pub fn describe_sources(config_path: Option<&PathBuf>) -> Vec<String> {
        let mut lines = vec!["Configuration sources (in priority order):".to_string()];

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            lines.push(format!("  [{:<7}] Explicit: {}", mark, path.display()));
        }

        match Self::project_config_path() {
            Some(path) => lines.push(format!("  [{:<7}] Project: {}", "FOUND", path.display())),
            None => lines.push(format!(
                "  [{:<7}] Project: ./crosslint.toml or ./.crosslint.toml",
                ""
            )),
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "" };
            lines.push(format!("  [{:<7}] Global:  {}", mark, path.display()));
        }

        lines.push(format!("  [{:<7}] Env:     {}*", "", ENV_PREFIX));
        lines.push(format!("  [{:<7}] Default: built-in defaults", ""));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosslint_domain::Severity;
    use std::fs;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.run.tools, vec!["cppcheck".to_string()]);
        assert!(config.output.color);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("crosslint"));
    }

    #[test]
    fn test_project_file_overrides_global() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        fs::write(&global, "[run]\ntools = [\"clang-tidy\"]\nparallel = true\n").unwrap();
        fs::write(
            dir.path().join(".crosslint.toml"),
            "[run]\ntools = [\"cppcheck\", \"mylint\"]\n",
        )
        .unwrap();

        let config: FileConfig = ConfigLoader::figment(None, dir.path(), Some(global))
            .extract()
            .unwrap();

        assert_eq!(config.run.tools, vec!["cppcheck", "mylint"]);
        assert!(config.run.parallel);
    }

    #[test]
    fn test_explicit_file_has_highest_file_priority() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("crosslint.toml"), "[run]\nmin_severity = \"info\"\n").unwrap();
        let explicit = dir.path().join("ci.toml");
        fs::write(
            &explicit,
            "[run]\nmin_severity = \"error\"\n\n[tools.cppcheck]\njobs = 8\n",
        )
        .unwrap();

        let config: FileConfig = ConfigLoader::figment(Some(&explicit), dir.path(), None)
            .extract()
            .unwrap();

        assert_eq!(config.run.min_severity, Some(Severity::Error));
        assert_eq!(config.tools.cppcheck.unwrap().jobs, 8);
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("crosslint.toml"), "[run]\nmin_severity = \"loud\"\n").unwrap();

        let result: Result<FileConfig, _> =
            ConfigLoader::figment(None, dir.path(), None).extract();
        assert!(result.is_err());
    }

    #[test]
    fn test_describe_sources() {
        let lines = ConfigLoader::describe_sources(Some(&PathBuf::from("/nonexistent/ci.toml")));
        assert!(lines[1].contains("MISSING"));
        assert!(lines.iter().any(|l| l.contains(ENV_PREFIX)));
    }
}
