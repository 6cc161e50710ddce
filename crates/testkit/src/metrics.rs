//! Standardized metrics collection and reporting for CI/CD integration.
//!
//! Generation runs export one `metrics.json` per test covering terrain shape,
//! ore placement and cave carving, so regressions show up as diffs between
//! runs instead of flaky assertions.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Top-level metrics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Test/benchmark identifier
    pub test_name: String,

    /// Timestamp when metrics were collected (ISO 8601)
    pub timestamp: String,

    /// World seed the run used
    pub seed: u64,

    /// Git commit hash (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_hash: Option<String>,

    /// Overall test result
    pub result: TestResult,

    /// Terrain shape metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terrain: Option<TerrainMetrics>,

    /// Ore placement metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ores: Option<OreMetrics>,

    /// Cave and aquifer metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caves: Option<CaveMetrics>,

    /// Test execution metrics
    pub test_execution: TestExecutionMetrics,
}

/// Overall test result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    /// Test passed all validations
    Pass,
    /// Test failed
    Fail,
    /// Test was skipped
    Skip,
}

/// Terrain generation performance and quality metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainMetrics {
    /// Total chunks generated
    pub chunks_generated: usize,

    /// Total non-air blocks generated
    pub blocks_generated: usize,

    /// Average generation time per chunk (microseconds)
    pub avg_gen_time_us: f64,

    /// Min generation time (microseconds)
    pub min_gen_time_us: u128,

    /// Max generation time (microseconds)
    pub max_gen_time_us: u128,

    /// Total generation time (milliseconds)
    pub total_gen_time_ms: f64,

    /// Chunks per second throughput
    pub chunks_per_second: f64,

    /// Lowest surface Y observed
    pub min_surface_y: i32,

    /// Highest surface Y observed
    pub max_surface_y: i32,

    /// Column count per biome name
    pub biome_columns: BTreeMap<String, usize>,

    /// Chunk seam validation results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seam_validation: Option<SeamValidation>,
}

impl TerrainMetrics {
    /// Number of distinct biomes present.
    pub fn unique_biomes(&self) -> usize {
        self.biome_columns.len()
    }
}

/// Chunk boundary seam validation metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeamValidation {
    /// Total seams checked
    pub total_seams: usize,

    /// Seams that passed validation
    pub seams_valid: usize,

    /// Seams that failed validation
    pub seams_failed: usize,

    /// Maximum height difference observed at seams
    pub max_seam_diff: i32,

    /// Average height difference at seams
    pub avg_seam_diff: f64,
}

impl SeamValidation {
    /// Fold one seam's maximum difference into the running totals.
    pub fn record(&mut self, diff: i32, valid: bool) {
        let previous = self.avg_seam_diff * self.total_seams as f64;
        self.total_seams += 1;
        if valid {
            self.seams_valid += 1;
        } else {
            self.seams_failed += 1;
        }
        self.max_seam_diff = self.max_seam_diff.max(diff);
        self.avg_seam_diff = (previous + diff as f64) / self.total_seams as f64;
    }
}

/// Ore vein placement metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OreMetrics {
    /// Ore definitions in the catalog
    pub catalog_size: usize,

    /// Veins that placed at least one block
    pub veins_placed: u64,

    /// Total ore blocks written
    pub blocks_placed: u64,

    /// Average ore blocks per generated chunk
    pub avg_blocks_per_chunk: f64,
}

/// Cave carving and aquifer metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaveMetrics {
    /// Tunnel systems started across all replayed regions
    pub tunnels: u64,

    /// Caverns started across all replayed regions
    pub caverns: u64,

    /// Voxels turned to air
    pub blocks_carved: u64,

    /// Air voxels flooded by aquifers
    pub aquifer_blocks: u64,
}

/// Test execution and infrastructure metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestExecutionMetrics {
    /// Total test duration (seconds)
    pub duration_seconds: f64,

    /// Number of assertions checked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertions_checked: Option<usize>,

    /// Number of validations passed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validations_passed: Option<usize>,
}

/// Builder for constructing metrics reports
pub struct MetricsReportBuilder {
    report: MetricsReport,
}

impl MetricsReportBuilder {
    /// Create a new builder with test name and seed
    pub fn new(test_name: impl Into<String>, seed: u64) -> Self {
        Self {
            report: MetricsReport {
                test_name: test_name.into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                seed,
                commit_hash: None,
                result: TestResult::Pass,
                terrain: None,
                ores: None,
                caves: None,
                test_execution: TestExecutionMetrics {
                    duration_seconds: 0.0,
                    assertions_checked: None,
                    validations_passed: None,
                },
            },
        }
    }

    /// Set test result
    pub fn result(mut self, result: TestResult) -> Self {
        self.report.result = result;
        self
    }

    /// Set commit hash
    pub fn commit_hash(mut self, hash: impl Into<String>) -> Self {
        self.report.commit_hash = Some(hash.into());
        self
    }

    /// Set terrain metrics
    pub fn terrain(mut self, metrics: TerrainMetrics) -> Self {
        self.report.terrain = Some(metrics);
        self
    }

    /// Set ore metrics
    pub fn ores(mut self, metrics: OreMetrics) -> Self {
        self.report.ores = Some(metrics);
        self
    }

    /// Set cave metrics
    pub fn caves(mut self, metrics: CaveMetrics) -> Self {
        self.report.caves = Some(metrics);
        self
    }

    /// Set test execution metrics
    pub fn execution(mut self, metrics: TestExecutionMetrics) -> Self {
        self.report.test_execution = metrics;
        self
    }

    /// Build the metrics report
    pub fn build(self) -> MetricsReport {
        self.report
    }
}

/// Sink for writing metrics reports to JSON files
pub struct MetricsSink {
    path: std::path::PathBuf,
}

impl MetricsSink {
    /// Create a new metrics sink at the specified path
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self { path })
    }

    /// Write metrics report to file
    pub fn write(&self, report: &MetricsReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(&self.path)?;
        file.write_all(json.as_bytes())?;
        tracing::debug!(path = %self.path.display(), test = %report.test_name, "Wrote metrics report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn metrics_report_roundtrip() {
        let mut biome_columns = BTreeMap::new();
        biome_columns.insert("plains".to_string(), 20_000);
        biome_columns.insert("swamp".to_string(), 5_600);

        let report = MetricsReportBuilder::new("test_example", 42)
            .result(TestResult::Pass)
            .terrain(TerrainMetrics {
                chunks_generated: 100,
                blocks_generated: 2_457_600,
                avg_gen_time_us: 3970.0,
                min_gen_time_us: 2500,
                max_gen_time_us: 8000,
                total_gen_time_ms: 397.0,
                chunks_per_second: 252.0,
                min_surface_y: 52,
                max_surface_y: 158,
                biome_columns,
                seam_validation: Some(SeamValidation {
                    total_seams: 180,
                    seams_valid: 180,
                    seams_failed: 0,
                    max_seam_diff: 4,
                    avg_seam_diff: 1.5,
                }),
            })
            .ores(OreMetrics {
                catalog_size: 20,
                veins_placed: 900,
                blocks_placed: 7200,
                avg_blocks_per_chunk: 72.0,
            })
            .execution(TestExecutionMetrics {
                duration_seconds: 2.5,
                assertions_checked: Some(500),
                validations_passed: Some(500),
            })
            .build();

        let json = serde_json::to_string_pretty(&report).unwrap();
        let parsed: MetricsReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.test_name, "test_example");
        assert_eq!(parsed.seed, 42);
        assert_eq!(parsed.result, TestResult::Pass);
        let terrain = parsed.terrain.as_ref().unwrap();
        assert_eq!(terrain.chunks_generated, 100);
        assert_eq!(terrain.unique_biomes(), 2);
        assert!(parsed.caves.is_none());
        assert!(!json.contains("\"caves\""));
    }

    #[test]
    fn seam_validation_accumulates() {
        let mut seams = SeamValidation::default();
        seams.record(2, true);
        seams.record(6, true);
        seams.record(30, false);
        assert_eq!(seams.total_seams, 3);
        assert_eq!(seams.seams_valid, 2);
        assert_eq!(seams.seams_failed, 1);
        assert_eq!(seams.max_seam_diff, 30);
        assert!((seams.avg_seam_diff - 38.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn metrics_sink_writes_file() {
        let path = std::env::temp_dir().join(format!(
            "metrics-{}.json",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));

        let report = MetricsReportBuilder::new("sink_test", 1)
            .result(TestResult::Pass)
            .execution(TestExecutionMetrics {
                duration_seconds: 1.0,
                assertions_checked: None,
                validations_passed: None,
            })
            .build();

        let sink = MetricsSink::create(&path).unwrap();
        sink.write(&report).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("sink_test"));
        assert!(contents.contains("\"result\": \"pass\""));

        fs::remove_file(&path).ok();
    }
}
