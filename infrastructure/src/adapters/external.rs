//! Process-backed [`ToolAdapter`] shared by every built-in analyzer
//!
//! The per-program differences (executable name, argument layout, exit code
//! semantics) live behind [`ToolProfile`]; [`ExternalToolAdapter`] owns the
//! state an adapter needs: configuration, running and cancel flags, and the
//! cached version probe.

use super::diagnostics;
use super::process::{self, ProcessOutput};
use async_trait::async_trait;
use crosslint_application::{
    AdapterError, OutputCallback, ProgressCallback, ToolAdapter, ensure_config_kind,
};
use crosslint_domain::{AnalysisRequest, AnalysisResult, Issue, Progress, ToolConfig, ToolKind};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Program-specific half of an external analyzer.
pub trait ToolProfile: Send + Sync + 'static {
    fn kind(&self) -> ToolKind;

    fn name(&self) -> &str;

    fn description(&self, config: Option<&ToolConfig>) -> String;

    fn default_config(&self) -> ToolConfig;

    /// Program looked up on `PATH` when the configuration has no override
    fn program(&self, config: &ToolConfig) -> String;

    fn extensions(&self, config: Option<&ToolConfig>) -> Vec<String>;

    fn output_formats(&self) -> Vec<String> {
        vec!["text".to_string()]
    }

    fn requirements(&self) -> String;

    /// Whether a directory source is replaced by the files discovered in it
    fn expands_directories(&self) -> bool {
        false
    }

    /// Arguments following the program for `targets`.
    fn arguments(
        &self,
        config: &ToolConfig,
        request: &AnalysisRequest,
        targets: &[PathBuf],
    ) -> Result<Vec<String>, AdapterError>;

    /// Whether the program itself writes the request's output file.
    fn writes_output_file(&self, _config: &ToolConfig) -> bool {
        false
    }

    fn exit_ok(&self, _config: &ToolConfig, code: i32, _issues: &[Issue]) -> bool {
        code == 0
    }
}

enum Plan {
    Run {
        argv: Vec<String>,
        files: usize,
        config: ToolConfig,
    },
    Done(AnalysisResult),
}

/// [`ToolAdapter`] driving an external program described by `P`.
pub struct ExternalToolAdapter<P> {
    profile: P,
    config: Mutex<Option<ToolConfig>>,
    /// Last version probe, keyed by the executable it was taken from
    version: Mutex<Option<(PathBuf, String)>>,
    running: AtomicBool,
    cancel_requested: AtomicBool,
}

impl<P: ToolProfile> ExternalToolAdapter<P> {
    /// Create an adapter holding the profile's default configuration.
    pub fn new(profile: P) -> Self {
        let config = profile.default_config();
        Self {
            profile,
            config: Mutex::new(Some(config)),
            version: Mutex::new(None),
            running: AtomicBool::new(false),
            cancel_requested: AtomicBool::new(false),
        }
    }

    pub fn with_configuration(profile: P, config: ToolConfig) -> Result<Self, AdapterError> {
        let adapter = Self::new(profile);
        adapter.set_configuration(config)?;
        Ok(adapter)
    }

    fn lock_config(&self) -> MutexGuard<'_, Option<ToolConfig>> {
        self.config.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_or_default(&self) -> ToolConfig {
        self.configuration()
            .unwrap_or_else(|| self.profile.default_config())
    }

    fn program_for(&self, config: &ToolConfig) -> String {
        config
            .executable()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| self.profile.program(config))
    }

    fn resolve_executable(&self, config: &ToolConfig) -> Option<PathBuf> {
        let program = self.program_for(config);
        if program.is_empty() {
            return None;
        }
        which::which(&program).ok()
    }

    fn plan(&self, request: &AnalysisRequest) -> Result<Plan, AdapterError> {
        let name = self.profile.name();
        let config = self
            .configuration()
            .ok_or_else(|| AdapterError::ConfigurationMissing(name.to_string()))?;
        ensure_config_kind(name, self.profile.kind(), &config)?;

        if !request.source_path.exists() {
            return Ok(Plan::Done(AnalysisResult::failure(
                name,
                format!(
                    "source path does not exist: {}",
                    request.source_path.display()
                ),
            )));
        }

        let Some(executable) = self.resolve_executable(&config) else {
            return Ok(Plan::Done(AnalysisResult::failure(
                name,
                format!(
                    "'{}' not found ({})",
                    self.program_for(&config),
                    self.profile.requirements()
                ),
            )));
        };

        let files = discover_sources(
            &request.source_path,
            &self.profile.extensions(Some(&config)),
        );
        let targets = if self.profile.expands_directories() && request.source_path.is_dir() {
            if files.is_empty() {
                debug!(tool = name, "No matching source files, nothing to analyze");
                return Ok(Plan::Done(AnalysisResult::new(name)));
            }
            files.clone()
        } else {
            vec![request.source_path.clone()]
        };

        let mut argv = vec![executable.display().to_string()];
        argv.extend(self.profile.arguments(&config, request, &targets)?);

        Ok(Plan::Run {
            argv,
            files: files.len(),
            config,
        })
    }

    /// Claim the running flag. `None` when a run is already in progress.
    fn begin(&self) -> Option<RunGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        self.cancel_requested.store(false, Ordering::SeqCst);
        Some(RunGuard(&self.running))
    }

    fn already_running(&self) -> AnalysisResult {
        AnalysisResult::failure(self.profile.name(), "an analysis is already running")
    }

    fn finish(
        &self,
        outcome: std::io::Result<ProcessOutput>,
        argv: &[String],
        files: usize,
        config: &ToolConfig,
        request: &AnalysisRequest,
        started: Instant,
    ) -> AnalysisResult {
        let name = self.profile.name();
        let output = match outcome {
            Ok(output) => output,
            Err(e) => {
                warn!(tool = name, error = %e, "Failed to start analyzer");
                return AnalysisResult::failure(
                    name,
                    format!("failed to start '{}': {}", argv[0], e),
                )
                .with_execution_time(started.elapsed());
            }
        };

        let issues = self.collect_issues(&output, config, request);

        let result = if output.cancelled {
            AnalysisResult::failure(name, "analysis cancelled")
        } else {
            match output.exit_code {
                None => AnalysisResult::failure(name, "analyzer was terminated by a signal"),
                Some(code) if !self.profile.exit_ok(config, code, &issues) => {
                    let hint = output
                        .lines
                        .iter()
                        .rev()
                        .find(|l| !l.trim().is_empty())
                        .map(|l| format!(": {}", l.trim()))
                        .unwrap_or_default();
                    AnalysisResult::failure(name, format!("exited with status {}{}", code, hint))
                }
                Some(_) => AnalysisResult::new(name).with_issues(issues),
            }
        };

        let result = result
            .with_files_analyzed(files)
            .with_execution_time(started.elapsed());
        info!(
            tool = name,
            success = result.is_success(),
            issues = result.issue_count(),
            files,
            elapsed_ms = result.execution_time.as_millis() as u64,
            "Analysis finished"
        );
        result
    }

    /// Remove the output file a previous run left behind so only this run's
    /// diagnostics are parsed from it.
    fn clear_stale_output(&self, config: &ToolConfig, request: &AnalysisRequest) {
        let path = &request.output_path;
        if path.as_os_str().is_empty() || !self.profile.writes_output_file(config) {
            return;
        }
        match fs::remove_file(path) {
            Ok(()) => debug!(
                tool = self.profile.name(),
                path = %path.display(),
                "Removed stale output file"
            ),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                tool = self.profile.name(),
                path = %path.display(),
                error = %e,
                "Failed to remove stale output file"
            ),
        }
    }

    fn collect_issues(
        &self,
        output: &ProcessOutput,
        config: &ToolConfig,
        request: &AnalysisRequest,
    ) -> Vec<Issue> {
        let name = self.profile.name();
        let has_output = !request.output_path.as_os_str().is_empty();

        if has_output && self.profile.writes_output_file(config) {
            match fs::read_to_string(&request.output_path) {
                Ok(content) => return diagnostics::parse_lines(name, content.lines()),
                Err(e) => {
                    debug!(tool = name, error = %e, "Output file unreadable, using captured output")
                }
            }
        } else if has_output && let Err(e) = write_artifact(&request.output_path, &output.lines) {
            warn!(
                tool = name,
                path = %request.output_path.display(),
                error = %e,
                "Failed to write output artifact"
            );
        }

        diagnostics::parse_lines(name, output.lines.iter().map(String::as_str))
    }
}

struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl<P: ToolProfile> ToolAdapter for ExternalToolAdapter<P> {
    fn name(&self) -> &str {
        self.profile.name()
    }

    fn version(&self) -> String {
        let Some(executable) = self.resolve_executable(&self.current_or_default()) else {
            return "unknown".to_string();
        };

        let mut cache = self.version.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((path, version)) = cache.as_ref()
            && *path == executable
        {
            return version.clone();
        }

        let version = process::probe_version(&executable).unwrap_or_else(|| "unknown".to_string());
        *cache = Some((executable, version.clone()));
        version
    }

    fn description(&self) -> String {
        self.profile.description(self.configuration().as_ref())
    }

    fn supported_extensions(&self) -> Vec<String> {
        self.profile.extensions(self.configuration().as_ref())
    }

    fn supported_output_formats(&self) -> Vec<String> {
        self.profile.output_formats()
    }

    fn set_configuration(&self, config: ToolConfig) -> Result<(), AdapterError> {
        ensure_config_kind(self.profile.name(), self.profile.kind(), &config)?;
        *self.lock_config() = Some(config);
        Ok(())
    }

    fn configuration(&self) -> Option<ToolConfig> {
        self.lock_config().clone()
    }

    fn default_config(&self) -> ToolConfig {
        self.profile.default_config()
    }

    fn is_available(&self) -> bool {
        self.resolve_executable(&self.current_or_default())
            .is_some()
    }

    fn executable_path(&self) -> PathBuf {
        self.resolve_executable(&self.current_or_default())
            .unwrap_or_default()
    }

    fn system_requirements(&self) -> String {
        self.profile.requirements()
    }

    fn execute(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AdapterError> {
        let (argv, files, config) = match self.plan(request)? {
            Plan::Done(result) => return Ok(result),
            Plan::Run {
                argv,
                files,
                config,
            } => (argv, files, config),
        };
        let Some(_guard) = self.begin() else {
            return Ok(self.already_running());
        };

        self.clear_stale_output(&config, request);
        info!(tool = self.name(), source = %request.source_path.display(), "Starting analysis");
        let started = Instant::now();
        let outcome = process::run_blocking(&argv, &self.cancel_requested, &mut |_| {});
        Ok(self.finish(outcome, &argv, files, &config, request, started))
    }

    async fn execute_async(
        &self,
        request: &AnalysisRequest,
        progress: Option<ProgressCallback>,
        output: Option<OutputCallback>,
    ) -> Result<AnalysisResult, AdapterError> {
        let (argv, files, config) = match self.plan(request)? {
            Plan::Done(result) => return Ok(result),
            Plan::Run {
                argv,
                files,
                config,
            } => (argv, files, config),
        };
        let Some(_guard) = self.begin() else {
            return Ok(self.already_running());
        };

        self.clear_stale_output(&config, request);
        let name = self.profile.name().to_string();
        info!(tool = %name, source = %request.source_path.display(), "Starting analysis");
        if let Some(cb) = &progress {
            cb(&Progress::new(files).with_status(format!("Running {}", name)));
        }

        let mut seen_files = HashSet::new();
        let mut reported = 0;
        let mut on_line = |line: &str| {
            if let Some(cb) = &output {
                cb(line);
            }
            let Some(cb) = &progress else {
                return;
            };
            if let Some(issue) = diagnostics::parse_line(&name, line)
                && seen_files.insert(issue.file_path.clone())
            {
                let processed = seen_files.len().min(files);
                if processed > reported {
                    reported = processed;
                    cb(&Progress::new(files).with_processed(processed, issue.file_path));
                }
            }
        };

        let started = Instant::now();
        let outcome = process::run_async(&argv, &self.cancel_requested, &mut on_line).await;
        let result = self.finish(outcome, &argv, files, &config, request, started);

        if let Some(cb) = &progress {
            cb(&Progress::new(files)
                .with_processed(files, "")
                .with_status("Finished"));
        }
        Ok(result)
    }

    fn cancel_analysis(&self) -> bool {
        if !self.running.load(Ordering::SeqCst) {
            return false;
        }
        self.cancel_requested.store(true, Ordering::SeqCst);
        info!(tool = self.name(), "Cancellation requested");
        true
    }

    fn is_analysis_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn parse_results_file(&self, path: &Path) -> Result<AnalysisResult, AdapterError> {
        let content = fs::read_to_string(path)?;
        let issues = diagnostics::parse_lines(self.name(), content.lines());
        Ok(AnalysisResult::new(self.name()).with_issues(issues))
    }

    fn build_command_line(
        &self,
        config: &ToolConfig,
        request: &AnalysisRequest,
    ) -> Result<Vec<String>, AdapterError> {
        ensure_config_kind(self.profile.name(), self.profile.kind(), config)?;
        let mut argv = vec![self.program_for(config)];
        argv.extend(self.profile.arguments(
            config,
            request,
            std::slice::from_ref(&request.source_path),
        )?);
        Ok(argv)
    }
}

/// Source files under `source` with one of `extensions`, sorted. A plain
/// file is returned as is; an empty extension list matches every file.
pub fn discover_sources(source: &Path, extensions: &[String]) -> Vec<PathBuf> {
    if source.is_file() {
        return vec![source.to_path_buf()];
    }
    if !source.is_dir() {
        return Vec::new();
    }

    let base = glob::Pattern::escape(&source.to_string_lossy());
    let patterns: Vec<String> = if extensions.is_empty() {
        vec![format!("{}/**/*", base)]
    } else {
        extensions
            .iter()
            .map(|ext| format!("{}/**/*.{}", base, ext))
            .collect()
    };

    let mut files = BTreeSet::new();
    for pattern in patterns {
        match glob::glob(&pattern) {
            Ok(paths) => files.extend(paths.filter_map(Result::ok).filter(|p| p.is_file())),
            Err(e) => warn!(pattern = %pattern, error = %e, "Invalid source pattern"),
        }
    }
    files.into_iter().collect()
}

fn write_artifact(path: &Path, lines: &[String]) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosslint_domain::{CommandToolConfig, CppcheckConfig, Severity};

    /// Runs `sh -c <script>`; the source path is appended as `$0`.
    struct ShellProfile {
        script: String,
    }

    impl ShellProfile {
        fn new(script: &str) -> Self {
            Self {
                script: script.to_string(),
            }
        }
    }

    impl ToolProfile for ShellProfile {
        fn kind(&self) -> ToolKind {
            ToolKind::Command
        }

        fn name(&self) -> &str {
            "shell"
        }

        fn description(&self, _config: Option<&ToolConfig>) -> String {
            "shell".to_string()
        }

        fn default_config(&self) -> ToolConfig {
            ToolConfig::Command(CommandToolConfig::new("shell", "sh"))
        }

        fn program(&self, config: &ToolConfig) -> String {
            match config {
                ToolConfig::Command(c) => c.program.clone(),
                _ => "sh".to_string(),
            }
        }

        fn extensions(&self, _config: Option<&ToolConfig>) -> Vec<String> {
            vec!["c".to_string()]
        }

        fn requirements(&self) -> String {
            "a POSIX shell".to_string()
        }

        fn arguments(
            &self,
            _config: &ToolConfig,
            _request: &AnalysisRequest,
            targets: &[PathBuf],
        ) -> Result<Vec<String>, AdapterError> {
            let mut args = vec!["-c".to_string(), self.script.clone()];
            args.extend(targets.iter().map(|t| t.display().to_string()));
            Ok(args)
        }
    }

    fn source_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.c"), "int main(void) { return 0; }\n").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.c"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        dir
    }

    #[test]
    fn test_discover_sources_filters_by_extension() {
        let dir = source_dir();
        let files = discover_sources(dir.path(), &["c".to_string()]);
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().unwrap() == "c"));

        assert_eq!(discover_sources(dir.path(), &[]).len(), 3);
        assert_eq!(discover_sources(&dir.path().join("a.c"), &[]).len(), 1);
        assert!(discover_sources(&dir.path().join("missing"), &[]).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_execute_parses_output_and_writes_artifact() {
        let dir = source_dir();
        let adapter = ExternalToolAdapter::new(ShellProfile::new(
            "echo 'a.c:3:1: error: null dereference [nullPointer]'; echo 'a.c:4:2: warning: unused [unusedVar]' 1>&2",
        ));
        let output = dir.path().join("out/shell.txt");
        let request = AnalysisRequest::new(dir.path()).with_output(&output);

        let result = adapter.execute(&request).unwrap();

        assert!(result.is_success(), "{}", result.error_message());
        assert_eq!(result.issue_count(), 2);
        assert_eq!(result.files_analyzed, 2);
        assert_eq!(result.count_for(Severity::Error), 1);
        assert!(!adapter.is_analysis_running());

        let replayed = adapter.parse_results_file(&output).unwrap();
        assert_eq!(replayed.issue_count(), 2);
        assert_eq!(replayed.count_for(Severity::Warning), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_failed_result() {
        let dir = source_dir();
        let adapter = ExternalToolAdapter::new(ShellProfile::new("echo boom 1>&2; exit 2"));

        let result = adapter.execute(&AnalysisRequest::new(dir.path())).unwrap();

        assert!(!result.is_success());
        assert_eq!(result.error_message(), "exited with status 2: boom");
    }

    #[test]
    fn test_missing_source_is_failed_result() {
        let adapter = ExternalToolAdapter::new(ShellProfile::new("true"));
        let result = adapter
            .execute(&AnalysisRequest::new("/nonexistent/crosslint/src"))
            .unwrap();
        assert!(!result.is_success());
        assert!(result.error_message().contains("does not exist"));
    }

    #[test]
    fn test_wrong_config_kind_is_rejected() {
        let adapter = ExternalToolAdapter::new(ShellProfile::new("true"));
        let err = adapter
            .set_configuration(ToolConfig::Cppcheck(CppcheckConfig::default()))
            .unwrap_err();
        assert!(matches!(err, AdapterError::InvalidConfigType { .. }));
        assert_eq!(adapter.configuration().unwrap().kind(), ToolKind::Command);
    }

    #[test]
    fn test_unresolvable_program_is_unavailable() {
        let adapter = ExternalToolAdapter::with_configuration(
            ShellProfile::new("true"),
            ToolConfig::Command(CommandToolConfig::new("shell", "crosslint-missing-binary")),
        )
        .unwrap();

        assert!(!adapter.is_available());
        assert_eq!(adapter.executable_path(), PathBuf::new());
        assert_eq!(adapter.version(), "unknown");

        let dir = source_dir();
        let result = adapter.execute(&AnalysisRequest::new(dir.path())).unwrap();
        assert!(!result.is_success());
        assert!(result.error_message().contains("crosslint-missing-binary"));
    }

    #[test]
    fn test_build_command_line_is_pure() {
        let adapter = ExternalToolAdapter::new(ShellProfile::new("true"));
        let config = adapter.default_config();
        let argv = adapter
            .build_command_line(&config, &AnalysisRequest::new("/nonexistent/src"))
            .unwrap();
        assert_eq!(argv, vec!["sh", "-c", "true", "/nonexistent/src"]);

        let err = adapter
            .build_command_line(
                &ToolConfig::Cppcheck(CppcheckConfig::default()),
                &AnalysisRequest::new("src"),
            )
            .unwrap_err();
        assert!(err.is_programmer_error());
    }

    #[test]
    fn test_cancel_when_idle_is_not_delivered() {
        let adapter = ExternalToolAdapter::new(ShellProfile::new("true"));
        assert!(!adapter.cancel_analysis());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_async_reports_progress_and_output() {
        let dir = source_dir();
        let adapter = ExternalToolAdapter::new(ShellProfile::new(
            "echo 'a.c:1:1: warning: w [r1]'; echo 'sub/b.c:1:1: warning: w [r2]'",
        ));
        let snapshots = std::sync::Arc::new(Mutex::new(Vec::new()));
        let lines = std::sync::Arc::new(Mutex::new(Vec::new()));
        let (snap_sink, line_sink) = (snapshots.clone(), lines.clone());

        let result = adapter
            .execute_async(
                &AnalysisRequest::new(dir.path()),
                Some(std::sync::Arc::new(move |p: &Progress| {
                    snap_sink.lock().unwrap().push(p.processed_files)
                })),
                Some(std::sync::Arc::new(move |l: &str| {
                    line_sink.lock().unwrap().push(l.to_string())
                })),
            )
            .await
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.issue_count(), 2);
        assert_eq!(lines.lock().unwrap().len(), 2);

        let snapshots = snapshots.lock().unwrap();
        assert!(snapshots.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*snapshots.last().unwrap(), 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancel_during_async_run() {
        let dir = source_dir();
        let adapter = std::sync::Arc::new(ExternalToolAdapter::new(ShellProfile::new(
            "exec sleep 5",
        )));

        let runner = adapter.clone();
        let source = dir.path().to_path_buf();
        let task = tokio::spawn(async move {
            runner
                .execute_async(&AnalysisRequest::new(source), None, None)
                .await
        });

        while !adapter.is_analysis_running() {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(adapter.cancel_analysis());

        let result = task.await.unwrap().unwrap();
        assert!(!result.is_success());
        assert_eq!(result.error_message(), "analysis cancelled");
        assert!(!adapter.is_analysis_running());
    }
}
