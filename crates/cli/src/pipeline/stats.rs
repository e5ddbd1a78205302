//! Pipeline statistics.

use std::path::PathBuf;
use std::time::Duration;

use contracts::ContractError;
use observability::SyncRunAggregator;
use serde::Serialize;

use super::SyncReport;

/// Outcome of one run, as printed
#[derive(Debug, Clone, Serialize)]
pub struct RunRow {
    pub run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tau: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'static str>,
    pub overridden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Statistics from a batch of runs
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Wall time of the batch
    pub duration: Duration,

    /// One row per run, sorted by run id
    pub rows: Vec<RunRow>,

    /// Sync result aggregator
    pub aggregator: SyncRunAggregator,
}

impl PipelineStats {
    pub fn record_success(&mut self, report: &SyncReport, path: PathBuf) {
        self.aggregator.update(&report.result);
        self.rows.push(RunRow {
            run_id: report.run_id.clone(),
            tau: Some(report.result.tau),
            source: Some(report.result.source.as_str()),
            overridden: report.result.was_overridden(),
            report: Some(path),
            error: None,
        });
    }

    pub fn record_failure(&mut self, run_id: &str, err: &ContractError) {
        self.aggregator.record_failure(err);
        self.rows.push(RunRow {
            run_id: run_id.to_string(),
            tau: None,
            source: None,
            overridden: false,
            report: None,
            error: Some(err.to_string()),
        });
    }

    pub fn sort(&mut self) {
        self.rows.sort_by(|a, b| a.run_id.cmp(&b.run_id));
    }

    pub fn total(&self) -> u64 {
        self.rows.len() as u64
    }

    pub fn failed(&self) -> u64 {
        self.aggregator.failed()
    }

    /// Runs per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.total() as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print the per-run table and the aggregate summary
    pub fn print_summary(&self) {
        println!("\n{:<12} {:>10} {:<14} {}", "run", "tau (s)", "source", "status");
        println!("{}", "-".repeat(60));
        for row in &self.rows {
            match (&row.tau, &row.error) {
                (Some(tau), _) => println!(
                    "{:<12} {:>10.4} {:<14} {}",
                    row.run_id,
                    tau,
                    row.source.unwrap_or("-"),
                    if row.overridden { "ok (override)" } else { "ok" }
                ),
                (None, error) => println!(
                    "{:<12} {:>10} {:<14} failed: {}",
                    row.run_id,
                    "-",
                    "-",
                    error.as_deref().unwrap_or("unknown")
                ),
            }
        }

        println!(
            "\nDuration: {:.2}s ({:.2} runs/s)\n",
            self.duration.as_secs_f64(),
            self.throughput()
        );
        print!("{}", self.aggregator.summary());
        println!();
    }
}
