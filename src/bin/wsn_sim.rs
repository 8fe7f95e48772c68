//! 无线传感器网络能耗仿真
//!
//! 读取场景 JSON，运行仿真，输出事件日志与（可选的）JSON 报告。

use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use wsn_sim::device::DistanceMetric;
use wsn_sim::sim::{ScenarioSpec, SimError, SimTime, Simulation, SimulationOutcome};

#[derive(Debug, Parser)]
#[command(
    name = "wsn-sim",
    about = "Energy-aware wireless sensor network discrete-event simulator"
)]
struct Args {
    /// Path to scenario.json
    #[arg(long)]
    scenario: PathBuf,

    /// Event log file (overrides scenario)
    #[arg(long)]
    log: Option<PathBuf>,

    /// Run name written to the log header (overrides scenario)
    #[arg(long)]
    name: Option<String>,

    /// Simulation time budget in ms: events dated later stop the run
    #[arg(long)]
    simulation_ms: Option<u64>,

    /// Wall-clock budget in ms
    #[arg(long)]
    logic_ms: Option<u64>,

    /// Checkpoint step in ms (0 disables checkpoints)
    #[arg(long)]
    step_ms: Option<u64>,

    /// Override distance metric: planar or haversine
    #[arg(long)]
    distance: Option<String>,

    /// Write the run report as JSON
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Disable tracing output
    #[arg(long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(if args.quiet {
            tracing_subscriber::EnvFilter::new("off")
        } else {
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        })
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(outcome) => {
            let r = &outcome.report;
            println!(
                "done reason={:?} events={} receptions={} detections={} checkpoints={} elapsed_ns={}",
                r.reason,
                r.events_applied,
                r.receptions,
                r.detections,
                r.checkpoints,
                r.elapsed.as_nanos()
            );
            for d in &r.devices {
                println!(
                    "battery {} {} {} sent={}",
                    d.id, d.label, d.battery, d.events_sent
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "仿真失败");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<SimulationOutcome, SimError> {
    let scenario = ScenarioSpec::load(&args.scenario)?;
    let base_dir = args
        .scenario
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let mut cfg = scenario.config();
    if let Some(log) = &args.log {
        cfg.log_file = log.clone();
    }
    if let Some(name) = &args.name {
        cfg.name = name.clone();
    }
    if let Some(ms) = args.simulation_ms {
        cfg.simulation_time = SimTime::from_millis(ms);
    }
    if let Some(ms) = args.logic_ms {
        cfg.logic_budget = Duration::from_millis(ms);
    }
    if let Some(ms) = args.step_ms {
        cfg.step = SimTime::from_millis(ms);
    }

    let mut registry = scenario.build_registry(&base_dir)?;
    if let Some(metric) = args.distance.as_deref() {
        registry.set_metric(parse_metric(metric)?);
    }

    info!(
        name = %cfg.name,
        devices = registry.len(),
        log = %cfg.log_file.display(),
        "加载场景完成"
    );

    let outcome = Simulation::new(cfg).run(registry)?;

    if let Some(path) = &args.report_json {
        let json = serde_json::to_string_pretty(&outcome.report)?;
        fs::write(path, json).map_err(|source| SimError::Io {
            path: path.clone(),
            source,
        })?;
    }
    Ok(outcome)
}

fn parse_metric(s: &str) -> Result<DistanceMetric, SimError> {
    match s.to_ascii_lowercase().as_str() {
        "planar" => Ok(DistanceMetric::Planar),
        "haversine" => Ok(DistanceMetric::Haversine),
        other => Err(SimError::Scenario(format!(
            "invalid distance metric `{other}` (expected planar or haversine)"
        ))),
    }
}
