//! Analysis orchestrator use case
//!
//! Coordinates registered [`ToolAdapter`]s: configuration, single runs,
//! batches (see [`batch`]), cancellation, and post-processing of results.
//!
//! ```text
//! register ──▶ set_configuration ──▶ run_single / run_batch / run_batch_async
//!                                              │
//!                                              ▼
//!                           aggregate · statistics · compare · save/load
//! ```
//!
//! # Error policy
//!
//! Programmer errors (unknown name, empty batch, wrong configuration kind)
//! fail the call before anything runs. Tool failures are returned as
//! results with `success == false` and never abort a batch. Nothing is
//! retried.
//!
//! # Running state
//!
//! The orchestrator keeps one coarse running flag. It is set while any run
//! call is in progress and cleared on every exit path; per-adapter state is
//! only visible through [`ToolAdapter::is_analysis_running`].

mod batch;

pub use batch::{BatchHandle, BatchProgressCallback, CompletionCallback};

use crate::ports::result_store::{ResultStore, StoreError};
use crate::ports::tool_adapter::{AdapterError, ToolAdapter};
use crate::registry::ToolRegistry;
use crosslint_domain::{
    AnalysisRequest, AnalysisResult, AnalysisStatistics, ComparisonReport, ToolConfig,
    ValidationResult, aggregate,
};
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors returned by the orchestrator itself (never by a tool run)
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Tool unavailable: {0}")]
    ToolUnavailable(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Result store error: {0}")]
    Store(#[from] StoreError),

    #[error("No result store configured")]
    NoResultStore,

    #[error("Background batch failed: {0}")]
    TaskFailed(String),
}

type AdapterMap = HashMap<String, Arc<dyn ToolAdapter>>;

/// Coordinates external analysis tools.
///
/// Cloning is cheap and every clone shares the same adapters, running flag
/// and cancellation state.
#[derive(Clone)]
pub struct AnalysisOrchestrator {
    adapters: Arc<Mutex<AdapterMap>>,
    running: Arc<AtomicBool>,
    cancellation: Arc<Mutex<CancellationToken>>,
    store: Option<Arc<dyn ResultStore>>,
}

impl AnalysisOrchestrator {
    pub fn new() -> Self {
        Self {
            adapters: Arc::new(Mutex::new(HashMap::new())),
            running: Arc::new(AtomicBool::new(false)),
            cancellation: Arc::new(Mutex::new(CancellationToken::new())),
            store: None,
        }
    }

    /// Attach the store used by the save/load operations.
    pub fn with_store(mut self, store: Arc<dyn ResultStore>) -> Self {
        self.store = Some(store);
        self
    }

    // ==================== Registration ====================

    /// Register an adapter under its own name. A later adapter with the
    /// same name replaces the earlier one.
    pub fn register(&self, adapter: Arc<dyn ToolAdapter>) -> Result<(), OrchestratorError> {
        let name = adapter.name().to_string();
        if name.trim().is_empty() {
            return Err(OrchestratorError::InvalidArgument(
                "adapter name must not be empty".to_string(),
            ));
        }

        if self.lock_adapters().insert(name.clone(), adapter).is_some() {
            debug!(tool = %name, "Replaced registered adapter");
        } else {
            debug!(tool = %name, "Registered adapter");
        }
        Ok(())
    }

    /// Build an adapter through the global [`ToolRegistry`] and register it.
    pub fn register_from_registry(&self, name: &str) -> Result<(), OrchestratorError> {
        let adapter = ToolRegistry::create(name)
            .ok_or_else(|| OrchestratorError::ToolNotFound(name.to_string()))?;
        self.register(adapter)
    }

    /// Names of every registered adapter, sorted.
    pub fn list_registered(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock_adapters().keys().cloned().collect();
        names.sort();
        names
    }

    /// Registered adapters whose external program is currently usable.
    ///
    /// Probes every adapter on each call.
    pub fn list_available(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .snapshot()
            .into_iter()
            .filter(|(_, adapter)| adapter.is_available())
            .map(|(name, _)| name)
            .collect();
        names.sort();
        names
    }

    pub fn adapter(&self, name: &str) -> Result<Arc<dyn ToolAdapter>, OrchestratorError> {
        self.lock_adapters()
            .get(name)
            .cloned()
            .ok_or_else(|| OrchestratorError::ToolNotFound(name.to_string()))
    }

    // ==================== Configuration ====================

    pub fn set_configuration(
        &self,
        name: &str,
        config: ToolConfig,
    ) -> Result<(), OrchestratorError> {
        self.adapter(name)?.set_configuration(config)?;
        Ok(())
    }

    pub fn configuration(&self, name: &str) -> Result<Option<ToolConfig>, OrchestratorError> {
        Ok(self.adapter(name)?.configuration())
    }

    pub fn validate_configuration(&self, name: &str) -> Result<ValidationResult, OrchestratorError> {
        Ok(self.adapter(name)?.validate_configuration())
    }

    // ==================== Execution ====================

    /// Run one adapter to completion.
    ///
    /// Fails with [`OrchestratorError::ToolNotFound`] or
    /// [`OrchestratorError::ToolUnavailable`] before running anything. An
    /// invalid configuration yields a failed result.
    pub fn run_single(
        &self,
        name: &str,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, OrchestratorError> {
        let adapter = self.adapter(name)?;
        if !adapter.is_available() {
            return Err(OrchestratorError::ToolUnavailable(name.to_string()));
        }

        let _running = RunningGuard::start(&self.running);
        info!(tool = name, source = %request.source_path.display(), "Running analysis");

        if let Some(rejected) = preflight(adapter.as_ref())? {
            return Ok(rejected);
        }

        let result = adapter.execute(request)?;
        log_outcome(&result);
        Ok(result)
    }

    /// Whether any run call is in progress on this orchestrator.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Request a cooperative stop of the current batch and of every adapter
    /// that reports a running analysis.
    ///
    /// Always returns true: this is a signal, not a guarantee. External
    /// processes already spawned may run to completion.
    pub fn cancel(&self) -> bool {
        self.lock_cancellation().cancel();

        for (name, adapter) in self.snapshot() {
            if adapter.is_analysis_running() {
                let delivered = adapter.cancel_analysis();
                debug!(tool = %name, delivered, "Cancellation requested");
            }
        }
        info!("Cancellation requested");
        true
    }

    // ==================== Reports ====================

    /// Merge results into one deduplicated result.
    pub fn aggregate(&self, results: &[AnalysisResult]) -> AnalysisResult {
        aggregate(results)
    }

    pub fn statistics(&self, results: &[AnalysisResult], top_n: usize) -> AnalysisStatistics {
        AnalysisStatistics::compute(results, top_n)
    }

    pub fn compare(
        &self,
        baseline: &[AnalysisResult],
        current: &[AnalysisResult],
    ) -> ComparisonReport {
        ComparisonReport::compute(baseline, current)
    }

    // ==================== Persistence ====================

    pub fn save_result(&self, path: &Path, result: &AnalysisResult) -> Result<(), OrchestratorError> {
        Ok(self.store()?.save_result(path, result)?)
    }

    pub fn load_result(&self, path: &Path) -> Result<AnalysisResult, OrchestratorError> {
        Ok(self.store()?.load_result(path)?)
    }

    pub fn save_results(
        &self,
        path: &Path,
        results: &[AnalysisResult],
    ) -> Result<(), OrchestratorError> {
        Ok(self.store()?.save_results(path, results)?)
    }

    pub fn load_results(&self, path: &Path) -> Result<Vec<AnalysisResult>, OrchestratorError> {
        Ok(self.store()?.load_results(path)?)
    }

    /// Aggregate `results` and save the merged result.
    pub fn save_aggregated(
        &self,
        path: &Path,
        results: &[AnalysisResult],
    ) -> Result<(), OrchestratorError> {
        self.save_result(path, &aggregate(results))
    }

    // ==================== Internals ====================

    fn store(&self) -> Result<&Arc<dyn ResultStore>, OrchestratorError> {
        self.store.as_ref().ok_or(OrchestratorError::NoResultStore)
    }

    fn lock_adapters(&self) -> MutexGuard<'_, AdapterMap> {
        self.adapters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_cancellation(&self) -> MutexGuard<'_, CancellationToken> {
        self.cancellation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the adapter map so adapters are never called under the lock.
    fn snapshot(&self) -> Vec<(String, Arc<dyn ToolAdapter>)> {
        self.lock_adapters()
            .iter()
            .map(|(name, adapter)| (name.clone(), Arc::clone(adapter)))
            .collect()
    }

    /// Resolve every batch name up front so a doomed batch never starts.
    fn resolve_batch<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Vec<(String, Arc<dyn ToolAdapter>)>, OrchestratorError> {
        if names.is_empty() {
            return Err(OrchestratorError::InvalidArgument(
                "no tools requested".to_string(),
            ));
        }

        let adapters = self.lock_adapters();
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                adapters
                    .get(name)
                    .map(|adapter| (name.to_string(), Arc::clone(adapter)))
                    .ok_or_else(|| {
                        OrchestratorError::InvalidArgument(format!("unknown tool '{}'", name))
                    })
            })
            .collect()
    }

    /// Fresh token for a new batch; `cancel()` trips the current one.
    fn reset_cancellation(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.lock_cancellation() = token.clone();
        token
    }
}

impl Default for AnalysisOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Sets the running flag for its lifetime.
struct RunningGuard {
    flag: Arc<AtomicBool>,
}

impl RunningGuard {
    fn start(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self {
            flag: Arc::clone(flag),
        }
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Check configuration before a run.
///
/// `Err` for a missing configuration, `Ok(Some(failed))` for an invalid one,
/// `Ok(None)` when the adapter may run.
fn preflight(adapter: &dyn ToolAdapter) -> Result<Option<AnalysisResult>, AdapterError> {
    if adapter.configuration().is_none() {
        return Err(AdapterError::ConfigurationMissing(adapter.name().to_string()));
    }

    let validation = adapter.validate_configuration();
    for warning in validation.warnings() {
        warn!(tool = adapter.name(), "{}", warning);
    }
    if validation.is_valid() {
        return Ok(None);
    }

    Ok(Some(AnalysisResult::failure(
        adapter.name(),
        format!("invalid configuration: {}", validation.errors().join("; ")),
    )))
}

/// Run one adapter of a synchronous batch, turning every failure
/// (including a panic) into a failed result.
fn execute_contained(name: &str, adapter: &dyn ToolAdapter, request: &AnalysisRequest) -> AnalysisResult {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        match preflight(adapter)? {
            Some(rejected) => Ok(rejected),
            None => adapter.execute(request),
        }
    }));

    let result = match outcome {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => AnalysisResult::failure(name, e.to_string()),
        Err(panic) => AnalysisResult::failure(name, panic_message(panic.as_ref())),
    };
    log_outcome(&result);
    result
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("adapter panicked: {}", detail)
}

fn log_outcome(result: &AnalysisResult) {
    if result.is_success() {
        info!(
            tool = %result.tool_name,
            issues = result.issue_count(),
            files = result.files_analyzed,
            elapsed_ms = result.execution_time.as_millis() as u64,
            "Analysis finished"
        );
    } else {
        warn!(tool = %result.tool_name, error = result.error_message(), "Analysis failed");
    }
}
