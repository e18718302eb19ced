//! CLI entrypoint for crosslint
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::{CommandFactory, Parser};
use crosslint_application::{AnalysisOrchestrator, ToolRegistry};
use crosslint_domain::{AnalysisResult, OutputFormat};
use crosslint_infrastructure::{
    ConfigLoader, FileConfig, JsonResultStore, register_builtin_adapters, register_command_tools,
};
use crosslint_presentation::{
    Cli, Command, CompareArgs, ConsoleFormatter, OutputFormatter, ProgressReporter, ProgressSink,
    ReportConfig, RunArgs, SimpleProgress, StatsArgs, ToolStatus, batch_callback,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_ref()) {
            println!("{}", line);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("failed to load configuration: {}", e))?
    };
    for (section, report) in config.validate() {
        warn!(section = %section, "Invalid configuration: {}", report);
    }

    let report = ReportConfig {
        format: config.output.format.unwrap_or_default(),
        color: config.output.color,
        top_files: config.output.top_files,
        min_severity: config.run.min_severity,
        show_progress: config.output.progress,
    }
    .without_color(cli.no_color);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    // === Dependency Injection ===
    let orchestrator = build_orchestrator(&config)?;

    match command {
        Command::Run(args) => run(&orchestrator, &config, report, args).await,
        Command::List => list(&orchestrator, report),
        Command::Stats(args) => stats(&orchestrator, report, args),
        Command::Compare(args) => compare(&orchestrator, report, args),
    }
}

/// Register every known tool and apply the configured settings to it.
fn build_orchestrator(config: &FileConfig) -> Result<AnalysisOrchestrator> {
    register_builtin_adapters();
    register_command_tools(config.tools.command_tools());

    let orchestrator = AnalysisOrchestrator::new().with_store(Arc::new(JsonResultStore::new()));
    for name in ToolRegistry::list() {
        if let Err(e) = orchestrator.register_from_registry(&name) {
            warn!(tool = %name, "Skipping tool: {}", e);
        }
    }

    for (name, tool_config) in config.tools.tool_configs() {
        if !orchestrator.list_registered().contains(&name) {
            continue;
        }
        orchestrator
            .set_configuration(&name, tool_config)
            .with_context(|| format!("invalid settings for tool '{}'", name))?;
    }
    Ok(orchestrator)
}

async fn run(
    orchestrator: &AnalysisOrchestrator,
    config: &FileConfig,
    report: ReportConfig,
    args: RunArgs,
) -> Result<ExitCode> {
    let report = report
        .with_format(args.format.map(Into::into))
        .with_min_severity(args.min_severity.map(Into::into))
        .quiet(args.quiet);
    report.apply_color();

    let tools = if args.tools.is_empty() {
        config.run.tools.clone()
    } else {
        args.tools.clone()
    };
    if tools.is_empty() {
        bail!("no tools selected; pass --tool or set [run].tools");
    }

    let mut request = config.run.request(&args.source);
    if let Some(output) = &args.output {
        request = request.with_output(output);
    }
    for include in &args.include {
        request = request.with_include(include);
    }
    for definition in &args.define {
        request = request.with_definition(definition);
    }

    info!(source = %args.source.display(), tools = ?tools, "Starting analysis");

    let results = if args.parallel || config.run.parallel {
        run_concurrent(orchestrator, &tools, request, &report).await?
    } else {
        run_sequential(orchestrator, tools, request, &report).await?
    };

    let failed = results.iter().any(|r| !r.is_success());
    let results: Vec<AnalysisResult> = match report.min_severity {
        Some(min) => results.iter().map(|r| r.filter_min_severity(min)).collect(),
        None => results,
    };
    let shown = if args.aggregate {
        vec![orchestrator.aggregate(&results)]
    } else {
        results
    };

    if let Some(path) = &args.save {
        match shown.as_slice() {
            [single] if args.aggregate => orchestrator.save_result(path, single)?,
            _ => orchestrator.save_results(path, &shown)?,
        }
        info!(path = %path.display(), "Results saved");
    }

    let formatter = ConsoleFormatter::new(report.top_files);
    println!("{}", formatter.format_results(&shown, report.format));

    Ok(if failed {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    })
}

/// Run the batch on the async runtime with one progress bar per tool.
async fn run_concurrent(
    orchestrator: &AnalysisOrchestrator,
    tools: &[String],
    request: crosslint_domain::AnalysisRequest,
    report: &ReportConfig,
) -> Result<Vec<AnalysisResult>> {
    let reporter = report
        .progress_enabled()
        .then(|| Arc::new(ProgressReporter::new()));
    let progress = reporter
        .clone()
        .map(|r| batch_callback(r as Arc<dyn ProgressSink>));
    let on_complete = reporter.clone().map(|r| {
        Box::new(move |results: Vec<AnalysisResult>| {
            for result in &results {
                r.on_tool_complete(result);
            }
            r.finish();
        }) as crosslint_application::CompletionCallback
    });

    let handle = orchestrator.run_batch_async(tools, request, progress, on_complete);
    let wait = handle.wait();
    tokio::pin!(wait);

    let outcome = tokio::select! {
        outcome = &mut wait => outcome,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, cancelling analysis");
            orchestrator.cancel();
            wait.await
        }
    };
    Ok(outcome?)
}

/// Run the batch one tool at a time on a blocking thread.
async fn run_sequential(
    orchestrator: &AnalysisOrchestrator,
    tools: Vec<String>,
    request: crosslint_domain::AnalysisRequest,
    report: &ReportConfig,
) -> Result<Vec<AnalysisResult>> {
    let worker = orchestrator.clone();
    let task = tokio::task::spawn_blocking(move || worker.run_batch(&tools, &request));
    tokio::pin!(task);

    let outcome = tokio::select! {
        outcome = &mut task => outcome,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, cancelling analysis");
            orchestrator.cancel();
            task.await
        }
    };
    let results = outcome.context("analysis thread failed")??;

    if report.progress_enabled() {
        for result in &results {
            SimpleProgress.on_tool_complete(result);
        }
    }
    Ok(results)
}

fn list(orchestrator: &AnalysisOrchestrator, report: ReportConfig) -> Result<ExitCode> {
    report.apply_color();

    let mut tools = Vec::new();
    for name in orchestrator.list_registered() {
        let adapter = orchestrator.adapter(&name)?;
        let available = adapter.is_available();
        tools.push(ToolStatus {
            name,
            available,
            version: if available {
                adapter.version()
            } else {
                String::new()
            },
            executable: adapter.executable_path().display().to_string(),
            description: adapter.description(),
        });
    }

    let output = match report.format {
        OutputFormat::Json => ConsoleFormatter::format_json(&tools),
        _ => ConsoleFormatter::new(report.top_files).format_tools(&tools),
    };
    println!("{}", output);
    Ok(ExitCode::SUCCESS)
}

fn load_all(files: &[PathBuf]) -> Result<Vec<AnalysisResult>> {
    let store = JsonResultStore::new();
    let mut results = Vec::new();
    for file in files {
        results.extend(store.load_any(file)?);
    }
    Ok(results)
}

fn stats(
    orchestrator: &AnalysisOrchestrator,
    report: ReportConfig,
    args: StatsArgs,
) -> Result<ExitCode> {
    report.apply_color();

    let results = load_all(&args.files)?;
    let top = args.top.unwrap_or(report.top_files);
    let statistics = orchestrator.statistics(&results, top);

    let output = if args.json {
        ConsoleFormatter::format_json(&statistics)
    } else {
        ConsoleFormatter::new(top).format_statistics(&statistics)
    };
    println!("{}", output);
    Ok(ExitCode::SUCCESS)
}

fn compare(
    orchestrator: &AnalysisOrchestrator,
    report: ReportConfig,
    args: CompareArgs,
) -> Result<ExitCode> {
    report.apply_color();

    let baseline = load_all(std::slice::from_ref(&args.baseline))?;
    let current = load_all(std::slice::from_ref(&args.current))?;
    let comparison = orchestrator.compare(&baseline, &current);

    let output = if args.json {
        ConsoleFormatter::format_json(&comparison)
    } else {
        ConsoleFormatter::new(report.top_files).format_comparison(&comparison)
    };
    println!("{}", output);

    Ok(if args.fail_on_new && !comparison.is_clean() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}
