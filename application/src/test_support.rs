//! In-crate adapter double used by unit tests

use crate::ports::tool_adapter::{AdapterError, ToolAdapter, ensure_config_kind};
use async_trait::async_trait;
use crosslint_domain::{
    AnalysisRequest, AnalysisResult, CommandToolConfig, Issue, ToolConfig, ToolKind,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub(crate) enum StubBehavior {
    Succeed,
    FailResult(String),
    HardError,
    Panic,
}

type ExecuteHook = Box<dyn Fn() + Send + Sync>;

pub(crate) struct StubAdapter {
    name: String,
    available: AtomicBool,
    config: Mutex<Option<ToolConfig>>,
    issues: Vec<Issue>,
    files: usize,
    behavior: StubBehavior,
    on_execute: Option<ExecuteHook>,
    running: AtomicBool,
    pub(crate) executions: AtomicUsize,
    pub(crate) cancel_requests: AtomicUsize,
    pub(crate) last_output: Mutex<Option<PathBuf>>,
}

impl StubAdapter {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            available: AtomicBool::new(true),
            config: Mutex::new(Some(ToolConfig::Command(CommandToolConfig::new(name, name)))),
            issues: Vec::new(),
            files: 1,
            behavior: StubBehavior::Succeed,
            on_execute: None,
            running: AtomicBool::new(false),
            executions: AtomicUsize::new(0),
            cancel_requests: AtomicUsize::new(0),
            last_output: Mutex::new(None),
        }
    }

    pub(crate) fn unavailable(self) -> Self {
        self.available.store(false, Ordering::SeqCst);
        self
    }

    pub(crate) fn with_issues(mut self, issues: Vec<Issue>, files: usize) -> Self {
        self.issues = issues;
        self.files = files;
        self
    }

    pub(crate) fn with_behavior(mut self, behavior: StubBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Run `hook` at the start of every execution.
    pub(crate) fn with_on_execute(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_execute = Some(Box::new(hook));
        self
    }

    pub(crate) fn without_config(self) -> Self {
        *self.config.lock().unwrap() = None;
        self
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }
}

#[async_trait]
impl ToolAdapter for StubAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> String {
        "1.0".to_string()
    }

    fn description(&self) -> String {
        "stub".to_string()
    }

    fn supported_extensions(&self) -> Vec<String> {
        vec!["c".to_string()]
    }

    fn supported_output_formats(&self) -> Vec<String> {
        vec!["text".to_string()]
    }

    fn set_configuration(&self, config: ToolConfig) -> Result<(), AdapterError> {
        ensure_config_kind(&self.name, ToolKind::Command, &config)?;
        *self.config.lock().unwrap() = Some(config);
        Ok(())
    }

    fn configuration(&self) -> Option<ToolConfig> {
        self.config.lock().unwrap().clone()
    }

    fn default_config(&self) -> ToolConfig {
        ToolConfig::Command(CommandToolConfig::new(&self.name, &self.name))
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn executable_path(&self) -> PathBuf {
        PathBuf::new()
    }

    fn system_requirements(&self) -> String {
        String::new()
    }

    fn execute(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AdapterError> {
        if self.configuration().is_none() {
            return Err(AdapterError::ConfigurationMissing(self.name.clone()));
        }
        self.executions.fetch_add(1, Ordering::SeqCst);
        *self.last_output.lock().unwrap() = Some(request.output_path.clone());
        if let Some(hook) = &self.on_execute {
            hook();
        }

        match &self.behavior {
            StubBehavior::Succeed => Ok(AnalysisResult::new(&self.name)
                .with_files_analyzed(self.files)
                .with_issues(self.issues.clone())),
            StubBehavior::FailResult(message) => Ok(AnalysisResult::failure(&self.name, message)),
            StubBehavior::HardError => Err(AdapterError::ExecutionFailure("stub exploded".into())),
            StubBehavior::Panic => panic!("stub panicked"),
        }
    }

    fn cancel_analysis(&self) -> bool {
        self.cancel_requests.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn is_analysis_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn parse_results_file(&self, _path: &Path) -> Result<AnalysisResult, AdapterError> {
        Ok(AnalysisResult::new(&self.name))
    }

    fn build_command_line(
        &self,
        _config: &ToolConfig,
        request: &AnalysisRequest,
    ) -> Result<Vec<String>, AdapterError> {
        Ok(vec![
            self.name.clone(),
            request.source_path.display().to_string(),
        ])
    }
}
