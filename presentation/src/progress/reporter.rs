//! Progress reporting for concurrent analysis runs

use colored::Colorize;
use crosslint_application::BatchProgressCallback;
use crosslint_domain::{AnalysisResult, Progress};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Receives per-tool progress from a batch run
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, tool: &str, progress: &Progress);

    fn on_tool_complete(&self, result: &AnalysisResult);
}

/// Wrap a sink into the callback shape the orchestrator expects.
pub fn batch_callback(sink: Arc<dyn ProgressSink>) -> BatchProgressCallback {
    Arc::new(move |tool: &str, progress: &Progress| sink.on_progress(tool, progress))
}

/// Reports progress with one bar per tool
pub struct ProgressReporter {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn tool_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn lock_bars(&self) -> MutexGuard<'_, HashMap<String, ProgressBar>> {
        self.bars.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bar_for(&self, tool: &str, total: usize) -> ProgressBar {
        self.lock_bars()
            .entry(tool.to_string())
            .or_insert_with(|| {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::tool_style());
                pb.set_prefix(tool.to_string());
                pb.set_message("Starting...");
                pb
            })
            .clone()
    }

    /// Finish every bar that is still running.
    pub fn finish(&self) {
        for pb in self.lock_bars().values() {
            if !pb.is_finished() {
                pb.finish();
            }
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ProgressReporter {
    fn on_progress(&self, tool: &str, progress: &Progress) {
        let pb = self.bar_for(tool, progress.total_files);
        pb.set_length(progress.total_files as u64);
        pb.set_position(progress.processed_files as u64);

        let message = if progress.current_file.is_empty() {
            progress.status_message.clone()
        } else {
            progress.current_file.clone()
        };
        if !message.is_empty() {
            pb.set_message(message);
        }
    }

    fn on_tool_complete(&self, result: &AnalysisResult) {
        let pb = self.bar_for(&result.tool_name, result.files_analyzed);
        let status = if result.is_success() {
            format!("{} {} issues", "v".green(), result.issue_count())
        } else {
            format!("{} {}", "x".red(), result.error_message())
        };
        pb.finish_with_message(status);
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressSink for SimpleProgress {
    fn on_progress(&self, tool: &str, progress: &Progress) {
        if progress.processed_files == 0 {
            eprintln!("{} {} ({} files)", "->".cyan(), tool.bold(), progress.total_files);
        }
    }

    fn on_tool_complete(&self, result: &AnalysisResult) {
        if result.is_success() {
            eprintln!(
                "  {} {} ({} issues)",
                "v".green(),
                result.tool_name,
                result.issue_count()
            );
        } else {
            eprintln!(
                "  {} {} (failed: {})",
                "x".red(),
                result.tool_name,
                result.error_message()
            );
        }
    }
}
