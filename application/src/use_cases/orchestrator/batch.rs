//! Multi-tool batches
//!
//! A batch runs several adapters against one request. Every adapter gets its
//! own copy of the request with a tool-specific output path, and results come
//! back in the order the names were given.
//!
//! | Call | Adapters run | Caller |
//! |------|--------------|--------|
//! | [`AnalysisOrchestrator::run_batch`] | one after another, via `execute` | blocked |
//! | [`AnalysisOrchestrator::run_batch_async`] | concurrently, via `execute_async` | gets a [`BatchHandle`] |
//!
//! Cancellation is checked before each adapter starts. Adapters that are
//! registered but unavailable are skipped without a result.

use super::{
    AnalysisOrchestrator, OrchestratorError, RunningGuard, execute_contained, log_outcome,
    preflight,
};
use crate::ports::tool_adapter::{ProgressCallback, ToolAdapter};
use crosslint_domain::{AnalysisRequest, AnalysisResult, Progress};
use std::sync::Arc;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Receives `(tool name, progress)` from whichever adapters are running.
///
/// Invoked from worker threads with no ordering across tools.
pub type BatchProgressCallback = Arc<dyn Fn(&str, &Progress) + Send + Sync>;

/// Receives the final result list exactly once (empty if the batch failed).
pub type CompletionCallback = Box<dyn FnOnce(Vec<AnalysisResult>) + Send>;

type BatchOutcome = Result<Vec<AnalysisResult>, OrchestratorError>;

/// Handle to a batch running in the background.
///
/// No timeout is applied; wrap [`BatchHandle::wait`] in
/// `tokio::time::timeout` to bound it.
pub struct BatchHandle {
    task: JoinHandle<BatchOutcome>,
}

impl BatchHandle {
    /// Wait for the batch to finish.
    pub async fn wait(self) -> BatchOutcome {
        self.task
            .await
            .map_err(|e| OrchestratorError::TaskFailed(e.to_string()))?
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl AnalysisOrchestrator {
    /// Run `names` one after another and block until all are done.
    ///
    /// Fails with [`OrchestratorError::InvalidArgument`] before running
    /// anything if `names` is empty or contains an unregistered name.
    /// A failing adapter produces a failed result and the batch continues.
    pub fn run_batch<S: AsRef<str>>(
        &self,
        names: &[S],
        request: &AnalysisRequest,
    ) -> BatchOutcome {
        let adapters = self.resolve_batch(names)?;
        let token = self.reset_cancellation();
        let _running = RunningGuard::start(&self.running);

        info!(tools = adapters.len(), "Starting batch");

        let mut results = Vec::with_capacity(adapters.len());
        for (name, adapter) in adapters {
            if token.is_cancelled() {
                warn!(tool = %name, "Batch cancelled; remaining tools skipped");
                break;
            }
            if !adapter.is_available() {
                debug!(tool = %name, "Tool unavailable, skipping");
                continue;
            }

            let tool_request = request.for_tool(&name);
            results.push(execute_contained(&name, adapter.as_ref(), &tool_request));
        }

        info!(results = results.len(), "Batch finished");
        Ok(results)
    }

    /// Run `names` on a background task and return immediately.
    ///
    /// Must be called within a Tokio runtime. Validation happens on the
    /// background task; a rejected batch resolves the handle to the error
    /// and calls `on_complete` with an empty list. The batch's cancellation
    /// token is installed before this returns, so a `cancel()` issued right
    /// after the call stops adapters that have not started yet.
    pub fn run_batch_async<S: AsRef<str>>(
        &self,
        names: &[S],
        request: AnalysisRequest,
        progress: Option<BatchProgressCallback>,
        on_complete: Option<CompletionCallback>,
    ) -> BatchHandle {
        let names: Vec<String> = names.iter().map(|n| n.as_ref().to_string()).collect();
        let orchestrator = self.clone();
        let token = self.reset_cancellation();

        let task = tokio::spawn(async move {
            let outcome = orchestrator
                .run_batch_concurrent(&names, &request, progress, token)
                .await;

            if let Some(on_complete) = on_complete {
                match &outcome {
                    Ok(results) => on_complete(results.clone()),
                    Err(e) => {
                        warn!(error = %e, "Background batch rejected");
                        on_complete(Vec::new());
                    }
                }
            }
            outcome
        });

        BatchHandle { task }
    }

    async fn run_batch_concurrent(
        &self,
        names: &[String],
        request: &AnalysisRequest,
        progress: Option<BatchProgressCallback>,
        token: CancellationToken,
    ) -> BatchOutcome {
        let adapters = self.resolve_batch(names)?;
        let _running = RunningGuard::start(&self.running);

        info!(tools = adapters.len(), "Starting background batch");

        let mut join_set = JoinSet::new();
        let mut expected = Vec::new();
        for (index, (name, adapter)) in adapters.into_iter().enumerate() {
            if token.is_cancelled() {
                warn!(tool = %name, "Batch cancelled; remaining tools not started");
                break;
            }
            if !adapter.is_available() {
                debug!(tool = %name, "Tool unavailable, skipping");
                continue;
            }

            let tool_request = request.for_tool(&name);
            let tool_progress = progress.clone().map(|cb| per_tool_progress(&name, cb));
            expected.push((index, name.clone()));

            join_set.spawn(async move {
                let result = execute_async_contained(&name, adapter, tool_request, tool_progress).await;
                (index, result)
            });
        }

        let mut finished: Vec<(usize, AnalysisResult)> = Vec::with_capacity(expected.len());
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(entry) => finished.push(entry),
                Err(e) => warn!("Task join error: {}", e),
            }
        }

        // a task that panicked never reported back; give it a failed result
        for (index, name) in expected {
            if !finished.iter().any(|(i, _)| *i == index) {
                finished.push((
                    index,
                    AnalysisResult::failure(&name, "adapter task terminated unexpectedly"),
                ));
            }
        }

        finished.sort_by_key(|(index, _)| *index);
        let results: Vec<AnalysisResult> = finished.into_iter().map(|(_, r)| r).collect();

        info!(results = results.len(), "Background batch finished");
        Ok(results)
    }
}

fn per_tool_progress(name: &str, callback: BatchProgressCallback) -> ProgressCallback {
    let name = name.to_string();
    Arc::new(move |progress: &Progress| callback(&name, progress))
}

async fn execute_async_contained(
    name: &str,
    adapter: Arc<dyn ToolAdapter>,
    request: AnalysisRequest,
    progress: Option<ProgressCallback>,
) -> AnalysisResult {
    let outcome = match preflight(adapter.as_ref()) {
        Err(e) => Err(e),
        Ok(Some(rejected)) => Ok(rejected),
        Ok(None) => adapter.execute_async(&request, progress, None).await,
    };

    let result = outcome.unwrap_or_else(|e| AnalysisResult::failure(name, e.to_string()));
    log_outcome(&result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubAdapter, StubBehavior};
    use crosslint_domain::Issue;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::Ordering;

    fn request() -> AnalysisRequest {
        AnalysisRequest::new("src").with_output("out/report.txt")
    }

    #[test]
    fn test_batch_rejects_empty_names() {
        let orchestrator = AnalysisOrchestrator::new();
        let names: [&str; 0] = [];
        assert!(matches!(
            orchestrator.run_batch(&names, &request()),
            Err(OrchestratorError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_batch_rejects_unknown_name_before_running() {
        let alpha = Arc::new(StubAdapter::new("alpha"));
        let orchestrator = AnalysisOrchestrator::new();
        orchestrator.register(alpha.clone()).unwrap();

        let err = orchestrator
            .run_batch(&["alpha", "missing"], &request())
            .unwrap_err();

        assert!(matches!(err, OrchestratorError::InvalidArgument(_)));
        assert_eq!(alpha.executions.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_batch_preserves_order_and_disambiguates_output() {
        let alpha = Arc::new(StubAdapter::new("alpha"));
        let beta = Arc::new(StubAdapter::new("beta"));
        let orchestrator = AnalysisOrchestrator::new();
        orchestrator.register(alpha.clone()).unwrap();
        orchestrator.register(beta.clone()).unwrap();

        let results = orchestrator.run_batch(&["beta", "alpha"], &request()).unwrap();

        let names: Vec<_> = results.iter().map(|r| r.tool_name.as_str()).collect();
        assert_eq!(names, vec!["beta", "alpha"]);
        assert_eq!(
            *alpha.last_output.lock().unwrap(),
            Some(PathBuf::from("out/report_alpha.txt"))
        );
        assert_eq!(
            *beta.last_output.lock().unwrap(),
            Some(PathBuf::from("out/report_beta.txt"))
        );
        assert!(!orchestrator.is_running());
    }

    #[test]
    fn test_batch_skips_unavailable_silently() {
        let orchestrator = AnalysisOrchestrator::new();
        orchestrator.register(Arc::new(StubAdapter::new("alpha"))).unwrap();
        orchestrator
            .register(Arc::new(StubAdapter::new("gamma").unavailable()))
            .unwrap();

        let results = orchestrator.run_batch(&["alpha", "gamma"], &request()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].tool_name, "alpha");
    }

    #[test]
    fn test_batch_contains_adapter_failures() {
        let orchestrator = AnalysisOrchestrator::new();
        orchestrator.register(Arc::new(StubAdapter::new("alpha"))).unwrap();
        orchestrator
            .register(Arc::new(
                StubAdapter::new("beta").with_behavior(StubBehavior::HardError),
            ))
            .unwrap();
        orchestrator
            .register(Arc::new(StubAdapter::new("gamma").with_behavior(StubBehavior::Panic)))
            .unwrap();
        orchestrator
            .register(Arc::new(StubAdapter::new("delta").without_config()))
            .unwrap();

        let results = orchestrator
            .run_batch(&["alpha", "beta", "gamma", "delta"], &request())
            .unwrap();

        assert_eq!(results.len(), 4);
        assert!(results[0].is_success());
        assert!(!results[1].is_success());
        assert_eq!(results[1].tool_name, "beta");
        assert!(results[1].error_message().contains("stub exploded"));
        assert!(!results[2].is_success());
        assert!(results[2].error_message().contains("panicked"));
        assert!(!results[3].is_success());
        assert!(results[3].error_message().contains("no configuration"));
    }

    #[test]
    fn test_cancel_during_batch_skips_remaining_tools() {
        let orchestrator = AnalysisOrchestrator::new();
        let canceller = orchestrator.clone();
        let alpha = Arc::new(StubAdapter::new("alpha"));
        let beta = Arc::new(StubAdapter::new("beta").with_on_execute(move || {
            canceller.cancel();
        }));
        let gamma = Arc::new(StubAdapter::new("gamma"));
        orchestrator.register(alpha.clone()).unwrap();
        orchestrator.register(beta.clone()).unwrap();
        orchestrator.register(gamma.clone()).unwrap();

        let results = orchestrator
            .run_batch(&["alpha", "beta", "gamma"], &request())
            .unwrap();

        let names: Vec<_> = results.iter().map(|r| r.tool_name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert_eq!(alpha.executions.load(Ordering::SeqCst), 1);
        assert_eq!(beta.executions.load(Ordering::SeqCst), 1);
        assert_eq!(gamma.executions.load(Ordering::SeqCst), 0);
        assert!(!orchestrator.is_running());

        // the next batch starts with a fresh token
        let results = orchestrator.run_batch(&["gamma"], &request()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(gamma.executions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancel_right_after_async_start_runs_nothing() {
        let orchestrator = AnalysisOrchestrator::new();
        let alpha = Arc::new(StubAdapter::new("alpha"));
        let beta = Arc::new(StubAdapter::new("beta"));
        orchestrator.register(alpha.clone()).unwrap();
        orchestrator.register(beta.clone()).unwrap();

        let handle = orchestrator.run_batch_async(&["alpha", "beta"], request(), None, None);
        assert!(orchestrator.cancel());

        let results = handle.wait().await.unwrap();
        assert!(results.is_empty());
        assert_eq!(alpha.executions.load(Ordering::SeqCst), 0);
        assert_eq!(beta.executions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_async_batch_matches_sync_order() {
        let orchestrator = AnalysisOrchestrator::new();
        let issues = vec![Issue::new("alpha", "r", "m").at("a.c", 1, 1)];
        orchestrator
            .register(Arc::new(StubAdapter::new("alpha").with_issues(issues, 2)))
            .unwrap();
        orchestrator.register(Arc::new(StubAdapter::new("beta"))).unwrap();
        orchestrator
            .register(Arc::new(
                StubAdapter::new("gamma").with_behavior(StubBehavior::HardError),
            ))
            .unwrap();

        let completed: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&completed);
        let progress_seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let progress_sink = Arc::clone(&progress_seen);

        let handle = orchestrator.run_batch_async(
            &["gamma", "alpha", "beta"],
            request(),
            Some(Arc::new(move |tool: &str, _p: &Progress| {
                progress_sink.lock().unwrap().push(tool.to_string());
            })),
            Some(Box::new(move |results: Vec<AnalysisResult>| {
                sink.lock()
                    .unwrap()
                    .push(results.iter().map(|r| r.tool_name.clone()).collect());
            })),
        );

        let results = handle.wait().await.unwrap();
        let names: Vec<_> = results.iter().map(|r| r.tool_name.as_str()).collect();
        assert_eq!(names, vec!["gamma", "alpha", "beta"]);
        assert!(!results[0].is_success());
        assert_eq!(results[1].issue_count(), 1);

        let completed = completed.lock().unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0], vec!["gamma", "alpha", "beta"]);

        let progress_seen = progress_seen.lock().unwrap();
        assert!(progress_seen.iter().any(|t| t == "alpha"));
        assert!(progress_seen.iter().any(|t| t == "beta"));
    }

    #[tokio::test]
    async fn test_async_batch_rejected_calls_completion_with_empty_list() {
        let orchestrator = AnalysisOrchestrator::new();
        let calls: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);

        let handle = orchestrator.run_batch_async(
            &["missing"],
            request(),
            None,
            Some(Box::new(move |results: Vec<AnalysisResult>| {
                sink.lock().unwrap().push(results.len());
            })),
        );

        assert!(matches!(
            handle.wait().await,
            Err(OrchestratorError::InvalidArgument(_))
        ));
        assert_eq!(*calls.lock().unwrap(), vec![0]);
    }

    #[tokio::test]
    async fn test_async_batch_contains_panics() {
        let orchestrator = AnalysisOrchestrator::new();
        orchestrator
            .register(Arc::new(StubAdapter::new("gamma").with_behavior(StubBehavior::Panic)))
            .unwrap();
        orchestrator.register(Arc::new(StubAdapter::new("alpha"))).unwrap();

        let results = orchestrator
            .run_batch_async(&["gamma", "alpha"], request(), None, None)
            .wait()
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].tool_name, "gamma");
        assert!(!results[0].is_success());
        assert!(results[1].is_success());
    }
}
