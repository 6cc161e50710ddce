//! Metrics Diff Tool
//!
//! Compares two metrics.json files written by the generation worldtests.
//! Timing metrics are judged against thresholds; content counts (ore blocks,
//! carved voxels) must match exactly for the same seed.
//!
//! Exit codes:
//! - 0: All metrics within acceptable ranges
//! - 1: Warnings (timing degradation between the two thresholds)
//! - 2: Failures (timing degradation past the failure threshold, or content drift)
//!
//! Usage:
//!   metrics-diff baseline.json current.json
//!   metrics-diff baseline.json current.json --format json

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use voxelgen_testkit::MetricsReport;

#[derive(Parser, Debug)]
#[command(author, version, about = "Compare two voxelgen metrics reports", long_about = None)]
struct Args {
    /// Baseline metrics.json
    baseline: PathBuf,

    /// Current metrics.json
    current: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Relative slowdown that triggers a warning
    #[arg(long, default_value_t = 0.05)]
    threshold_warning: f64,

    /// Relative slowdown that triggers a failure
    #[arg(long, default_value_t = 0.10)]
    threshold_failure: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// How a metric is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    LowerIsBetter,
    HigherIsBetter,
    /// Deterministic content; any change fails.
    Exact,
}

#[derive(Debug)]
struct MetricDiff {
    name: String,
    baseline: f64,
    current: f64,
    change_percent: f64,
    status: DiffStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DiffStatus {
    Pass,
    Warning,
    Failure,
}

impl DiffStatus {
    fn label(self) -> &'static str {
        match self {
            DiffStatus::Pass => "PASS",
            DiffStatus::Warning => "WARN",
            DiffStatus::Failure => "FAIL",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Thresholds {
    warning: f64,
    failure: f64,
}

fn load_metrics(path: &Path) -> Result<MetricsReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn compare_metrics(
    baseline: &MetricsReport,
    current: &MetricsReport,
    thresholds: Thresholds,
) -> Vec<MetricDiff> {
    let mut diffs = Vec::new();
    let mut push = |name: &str, b: f64, c: f64, direction: Direction| {
        diffs.push(compare_metric(name, b, c, thresholds, direction));
    };

    if let (Some(b), Some(c)) = (&baseline.terrain, &current.terrain) {
        push("terrain.avg_gen_time_us", b.avg_gen_time_us, c.avg_gen_time_us, Direction::LowerIsBetter);
        push("terrain.max_gen_time_us", b.max_gen_time_us as f64, c.max_gen_time_us as f64, Direction::LowerIsBetter);
        push("terrain.chunks_per_second", b.chunks_per_second, c.chunks_per_second, Direction::HigherIsBetter);
        if baseline.seed == current.seed {
            push("terrain.blocks_generated", b.blocks_generated as f64, c.blocks_generated as f64, Direction::Exact);
            push("terrain.min_surface_y", b.min_surface_y as f64, c.min_surface_y as f64, Direction::Exact);
            push("terrain.max_surface_y", b.max_surface_y as f64, c.max_surface_y as f64, Direction::Exact);
        }
    }

    if baseline.seed == current.seed {
        if let (Some(b), Some(c)) = (&baseline.ores, &current.ores) {
            push("ores.veins_placed", b.veins_placed as f64, c.veins_placed as f64, Direction::Exact);
            push("ores.blocks_placed", b.blocks_placed as f64, c.blocks_placed as f64, Direction::Exact);
        }
        if let (Some(b), Some(c)) = (&baseline.caves, &current.caves) {
            push("caves.blocks_carved", b.blocks_carved as f64, c.blocks_carved as f64, Direction::Exact);
            push("caves.aquifer_blocks", b.aquifer_blocks as f64, c.aquifer_blocks as f64, Direction::Exact);
        }
    }

    push(
        "execution.duration_seconds",
        baseline.test_execution.duration_seconds,
        current.test_execution.duration_seconds,
        Direction::LowerIsBetter,
    );

    diffs
}

fn compare_metric(
    name: &str,
    baseline: f64,
    current: f64,
    thresholds: Thresholds,
    direction: Direction,
) -> MetricDiff {
    let change_percent = if baseline == 0.0 {
        if current == 0.0 {
            0.0
        } else {
            100.0
        }
    } else {
        ((current - baseline) / baseline) * 100.0
    };

    let warning = thresholds.warning * 100.0;
    let failure = thresholds.failure * 100.0;
    let status = match direction {
        Direction::Exact if baseline != current => DiffStatus::Failure,
        Direction::Exact => DiffStatus::Pass,
        Direction::LowerIsBetter if change_percent > failure => DiffStatus::Failure,
        Direction::LowerIsBetter if change_percent > warning => DiffStatus::Warning,
        Direction::HigherIsBetter if change_percent < -failure => DiffStatus::Failure,
        Direction::HigherIsBetter if change_percent < -warning => DiffStatus::Warning,
        _ => DiffStatus::Pass,
    };

    MetricDiff {
        name: name.to_string(),
        baseline,
        current,
        change_percent,
        status,
    }
}

fn count(diffs: &[MetricDiff], status: DiffStatus) -> usize {
    diffs.iter().filter(|d| d.status == status).count()
}

fn print_text_report(diffs: &[MetricDiff], baseline: &MetricsReport, current: &MetricsReport, args: &Args) {
    println!("Metrics Diff Report");
    println!();
    println!("Baseline:  {}", args.baseline.display());
    println!("Current:   {}", args.current.display());
    println!("Test:      {} → {}", baseline.test_name, current.test_name);
    println!("Seed:      {} → {}", baseline.seed, current.seed);
    println!("Result:    {:?} → {:?}", baseline.result, current.result);
    println!();

    println!("{:<34} {:>14} {:>14} {:>9}  Status", "Metric", "Baseline", "Current", "Change");
    for diff in diffs {
        println!(
            "{:<34} {:>14.3} {:>14.3} {:>8.2}%  {}",
            truncate(&diff.name, 34),
            diff.baseline,
            diff.current,
            diff.change_percent,
            diff.status.label()
        );
    }
    println!();

    let failed = count(diffs, DiffStatus::Failure);
    let warned = count(diffs, DiffStatus::Warning);
    println!("Passed: {}/{}", count(diffs, DiffStatus::Pass), diffs.len());
    if warned > 0 {
        println!("Warnings: {}/{}", warned, diffs.len());
    }
    if failed > 0 {
        println!("Failed: {}/{}", failed, diffs.len());
    }
}

fn json_report(diffs: &[MetricDiff]) -> serde_json::Value {
    let metrics: Vec<serde_json::Value> = diffs
        .iter()
        .map(|d| {
            serde_json::json!({
                "name": d.name,
                "baseline": d.baseline,
                "current": d.current,
                "change_percent": d.change_percent,
                "status": d.status.label(),
            })
        })
        .collect();

    serde_json::json!({
        "metrics": metrics,
        "summary": {
            "total": diffs.len(),
            "passed": count(diffs, DiffStatus::Pass),
            "warnings": count(diffs, DiffStatus::Warning),
            "failures": count(diffs, DiffStatus::Failure),
        },
    })
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn run(args: &Args) -> Result<i32> {
    let baseline = load_metrics(&args.baseline).context("Error loading baseline")?;
    let current = load_metrics(&args.current).context("Error loading current")?;
    let thresholds = Thresholds {
        warning: args.threshold_warning,
        failure: args.threshold_failure,
    };

    let diffs = compare_metrics(&baseline, &current, thresholds);
    match args.format {
        OutputFormat::Text => print_text_report(&diffs, &baseline, &current, args),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json_report(&diffs))?),
    }

    Ok(if count(&diffs, DiffStatus::Failure) > 0 {
        2
    } else if count(&diffs, DiffStatus::Warning) > 0 {
        1
    } else {
        0
    })
}

fn main() {
    let args = Args::parse();
    match run(&args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLDS: Thresholds = Thresholds {
        warning: 0.05,
        failure: 0.10,
    };

    #[test]
    fn timing_thresholds() {
        let slower = compare_metric("t", 100.0, 107.0, THRESHOLDS, Direction::LowerIsBetter);
        assert_eq!(slower.status, DiffStatus::Warning);
        let much_slower = compare_metric("t", 100.0, 120.0, THRESHOLDS, Direction::LowerIsBetter);
        assert_eq!(much_slower.status, DiffStatus::Failure);
        let faster = compare_metric("t", 100.0, 50.0, THRESHOLDS, Direction::LowerIsBetter);
        assert_eq!(faster.status, DiffStatus::Pass);
        let throughput_drop = compare_metric("t", 100.0, 80.0, THRESHOLDS, Direction::HigherIsBetter);
        assert_eq!(throughput_drop.status, DiffStatus::Failure);
    }

    #[test]
    fn exact_metrics_fail_on_any_drift() {
        assert_eq!(compare_metric("o", 7200.0, 7200.0, THRESHOLDS, Direction::Exact).status, DiffStatus::Pass);
        assert_eq!(compare_metric("o", 7200.0, 7201.0, THRESHOLDS, Direction::Exact).status, DiffStatus::Failure);
    }

    #[test]
    fn zero_baseline() {
        assert_eq!(compare_metric("z", 0.0, 0.0, THRESHOLDS, Direction::LowerIsBetter).change_percent, 0.0);
        assert_eq!(compare_metric("z", 0.0, 3.0, THRESHOLDS, Direction::LowerIsBetter).change_percent, 100.0);
    }

    #[test]
    fn json_summary_counts() {
        let diffs = vec![
            compare_metric("a", 1.0, 1.0, THRESHOLDS, Direction::Exact),
            compare_metric("b", 1.0, 2.0, THRESHOLDS, Direction::Exact),
        ];
        let report = json_report(&diffs);
        assert_eq!(report["summary"]["total"], 2);
        assert_eq!(report["summary"]["failures"], 1);
    }

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("terrain.avg_gen_time_us", 10), "terrain...");
    }
}
