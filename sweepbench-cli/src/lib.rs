#![warn(missing_docs)]
//! Sweepbench CLI
//!
//! Wires the sweep runtime together: load the sweep definition, drive the
//! engine through the case × configuration matrix, and write the report
//! artifacts. `sweepbench` with no subcommand runs the sweep.

mod config;
mod executor;
mod metadata;
mod sampler;
mod scheduler;
mod supervisor;

pub use config::{AxisConfig, BaseOption, CaseConfig, EngineConfig, OutputConfig, RunnerConfig, SweepConfig};
pub use executor::TrialExecutor;
pub use metadata::build_report_meta;
pub use sampler::{ResourceSampler, SamplerHandle};
pub use scheduler::{install_interrupt_handler, CancelFlag, SweepScheduler};
pub use supervisor::{EngineState, EngineSupervisor, SearchLimits, SupervisorError};

use clap::{Parser, Subcommand};
use regex::Regex;
use std::path::PathBuf;
use sweepbench_core::TestCase;
use sweepbench_report::{
    build_report, generate_json_report, generate_markdown_report, RunnerEcho, SweepReport,
};

/// Sweepbench CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "sweepbench")]
#[command(author, version, about = "Engine benchmark sweeps over option matrices")]
pub struct Cli {
    /// Optional subcommand (init, list, run); defaults to run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to sweep.toml (discovered by walking up when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Engine binary, overriding the configured one
    #[arg(long)]
    pub engine: Option<PathBuf>,

    /// Filter cases by regex over their id
    #[arg(long, default_value = ".*")]
    pub filter: String,

    /// Per-trial timeout in seconds, overriding the configured one
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Matrix repeat count, overriding the configured one
    #[arg(long)]
    pub repeats: Option<u32>,

    /// Disable host resource sampling
    #[arg(long)]
    pub no_sampling: bool,

    /// Output directory, overriding the configured one
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a commented default sweep.toml to the current directory
    Init,
    /// List the sweep plan without executing it
    List,
    /// Run the sweep (default)
    Run,
}

/// Run the sweepbench CLI. Entry point for the binary.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("sweepbench=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("sweepbench=info")
            .init();
    }

    match cli.command {
        Some(Commands::Init) => init_config(),
        Some(Commands::List) => {
            let config = load_config(&cli)?;
            list_plan(&cli, &config)
        }
        Some(Commands::Run) | None => {
            let config = load_config(&cli)?;
            run_sweep(&cli, &config)
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<SweepConfig> {
    match &cli.config {
        Some(path) => SweepConfig::load(path),
        None => Ok(SweepConfig::discover().unwrap_or_default()),
    }
}

fn init_config() -> anyhow::Result<()> {
    let path = PathBuf::from("sweep.toml");
    if path.exists() {
        anyhow::bail!("sweep.toml already exists, refusing to overwrite");
    }
    std::fs::write(&path, SweepConfig::default_toml())?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Cases matching the CLI filter, in definition order.
fn filter_cases(cli: &Cli, config: &SweepConfig) -> anyhow::Result<Vec<TestCase>> {
    let re = Regex::new(&cli.filter)
        .map_err(|e| anyhow::anyhow!("invalid case filter '{}': {}", cli.filter, e))?;
    Ok(config
        .test_cases()
        .into_iter()
        .filter(|c| re.is_match(&c.id))
        .collect())
}

fn list_plan(cli: &Cli, config: &SweepConfig) -> anyhow::Result<()> {
    let cases = filter_cases(cli, config)?;
    let configurations = config.configurations();

    println!("Sweep plan:");
    println!("├── cases ({})", cases.len());
    for case in &cases {
        println!("│   ├── {} [{}] {}", case.id, case.complexity, case.label);
    }
    println!("├── configurations ({})", configurations.len());
    for options in &configurations {
        println!("│   ├── {}", options.key());
    }
    let repeats = cli.repeats.unwrap_or(config.runner.repeats).max(1);
    println!(
        "{} trials total ({} × {} × {} repeats)",
        cases.len() * configurations.len() * repeats as usize,
        cases.len(),
        configurations.len(),
        repeats,
    );
    Ok(())
}

fn run_sweep(cli: &Cli, config: &SweepConfig) -> anyhow::Result<()> {
    let binary = cli
        .engine
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.engine.binary));
    if binary.as_os_str().is_empty() {
        anyhow::bail!(
            "no engine binary configured; set [engine].binary in sweep.toml or pass --engine"
        );
    }

    let cases = filter_cases(cli, config)?;
    let configurations = config.configurations();
    if cases.is_empty() {
        println!("No cases matched '{}'.", cli.filter);
        return Ok(());
    }

    let handshake_timeout = SweepConfig::parse_duration(&config.engine.handshake_timeout)?;
    let probe_timeout = SweepConfig::parse_duration(&config.engine.probe_timeout)?;
    let stop_grace = SweepConfig::parse_duration(&config.engine.stop_grace)?;
    let trial_timeout = match cli.timeout {
        Some(secs) => std::time::Duration::from_secs(secs),
        None => SweepConfig::parse_duration(&config.runner.trial_timeout)?,
    };
    let inter_trial_delay = SweepConfig::parse_duration(&config.runner.inter_trial_delay)?;
    let sample_interval = SweepConfig::parse_duration(&config.runner.sample_interval)?;
    let movetime_ms = config
        .runner
        .movetime
        .as_deref()
        .map(SweepConfig::parse_duration)
        .transpose()?
        .map(|d| d.as_millis() as u64);
    let repeats = cli.repeats.unwrap_or(config.runner.repeats).max(1);
    let sample_resources = config.runner.sample_resources && !cli.no_sampling;

    let mut supervisor = EngineSupervisor::new(
        &binary,
        config.engine.args.clone(),
        handshake_timeout,
        probe_timeout,
        stop_grace,
    );
    let executor = TrialExecutor {
        timeout: trial_timeout,
        limits: SearchLimits {
            nodes: config.runner.nodes,
            movetime_ms,
        },
        sample_resources,
        sample_interval,
    };
    let scheduler = SweepScheduler::new(executor, inter_trial_delay, repeats);

    println!(
        "Running {} trials ({} cases × {} configurations × {} repeats)...\n",
        cases.len() * configurations.len() * repeats as usize,
        cases.len(),
        configurations.len(),
        repeats,
    );

    install_interrupt_handler();
    let cancel = CancelFlag::new();
    let result = scheduler.run(&mut supervisor, &cases, &configurations, &cancel)?;

    let meta = build_report_meta(RunnerEcho {
        engine: binary.display().to_string(),
        trial_timeout_secs: trial_timeout.as_secs_f64(),
        inter_trial_delay_ms: inter_trial_delay.as_millis() as u64,
        repeats,
        sample_resources,
    });
    let report = build_report(&result, meta, config.output.baseline.as_deref());

    write_artifacts(cli, config, &report)?;
    print_summary(&report);

    if report.result.cancelled {
        eprintln!("\nSweep cancelled; partial results were written.");
    }
    if !report.result.is_empty() && report.result.successes().count() == 0 {
        eprintln!("\nEvery trial failed.");
        std::process::exit(1);
    }

    Ok(())
}

fn write_artifacts(cli: &Cli, config: &SweepConfig, report: &SweepReport) -> anyhow::Result<()> {
    let directory = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.directory));
    std::fs::create_dir_all(&directory)?;

    if config.output.json {
        let path = directory.join("results.json");
        std::fs::write(&path, generate_json_report(report)?)?;
        println!("JSON results written to: {}", path.display());
    }
    if config.output.markdown {
        let path = directory.join("report.md");
        std::fs::write(&path, generate_markdown_report(report))?;
        println!("Markdown report written to: {}", path.display());
    }
    Ok(())
}

fn print_summary(report: &SweepReport) {
    let result = &report.result;
    println!(
        "\n{} trials recorded, {} succeeded, {} failed",
        result.len(),
        result.successes().count(),
        result.failures().count(),
    );

    for summary in &report.by_configuration {
        let mean = if summary.duration.stat.count > 0 {
            format!("{:.3}s mean", summary.duration.stat.mean)
        } else {
            "no successful trials".to_string()
        };
        println!(
            "  {}  -  {} ({} of {} failed)",
            summary.options_key, mean, summary.duration.failures, summary.duration.attempts,
        );
    }
}
