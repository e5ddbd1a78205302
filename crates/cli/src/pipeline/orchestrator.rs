//! Pipeline orchestrator - synchronizes runs on blocking workers.
//!
//! Runs are independent: each one is estimated, truncated and written on its
//! own `spawn_blocking` task. A failed run is recorded and the rest continue.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use contracts::{ContractError, SyncConfig};
use ingestion::RunRecord;
use observability::{record_sync_failure, record_sync_result};
use sync_engine::{TimeShiftEstimator, TruncateAligner};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::{PipelineStats, SyncReport};
use crate::error::CliError;

/// Estimate, truncate and package one run.
pub fn sync_run(config: &SyncConfig, run: &RunRecord) -> Result<SyncReport, ContractError> {
    let channels = &config.channels;
    let reference = run.signal(&channels.reference)?;
    let shifted = run.signal(&channels.shifted)?;
    let speed = run.speed()?;

    let estimator = TimeShiftEstimator::new(config.clone());
    let result = estimator.estimate(&reference, &shifted, speed)?;
    let pair = TruncateAligner::align_pair(&reference, &shifted, result.tau)?;
    debug!(run_id = %run.run_id, common = pair.len(), "run truncated");

    Ok(SyncReport::new(
        &run.run_id,
        (&channels.reference, &channels.shifted),
        result,
        &pair,
    ))
}

/// Batch driver
pub struct SyncPipeline {
    config: Arc<SyncConfig>,
    output: PathBuf,
}

impl SyncPipeline {
    /// Create a pipeline writing reports into `output`
    pub fn new(config: SyncConfig, output: impl Into<PathBuf>) -> Self {
        Self {
            config: Arc::new(config),
            output: output.into(),
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Synchronize every run, one blocking task each.
    ///
    /// Only a worker that panics or is cancelled aborts the batch.
    pub async fn run(&self, runs: Vec<RunRecord>) -> Result<PipelineStats> {
        let start_time = Instant::now();
        std::fs::create_dir_all(&self.output)?;

        let mut tasks = JoinSet::new();
        let mut run_ids = HashMap::new();
        for run in runs {
            let config = Arc::clone(&self.config);
            let output = self.output.clone();
            let run_id = run.run_id.clone();
            let handle = tasks.spawn_blocking(move || {
                let outcome = sync_run(&config, &run)
                    .and_then(|report| report.write_to(&output).map(|path| (report, path)));
                (run.run_id, outcome)
            });
            run_ids.insert(handle.id(), run_id);
        }
        info!(runs = run_ids.len(), output = %self.output.display(), "Synchronizing runs");

        let mut stats = PipelineStats::default();
        while let Some(joined) = tasks.join_next_with_id().await {
            let (run_id, outcome) = match joined {
                Ok((_, done)) => done,
                Err(err) => {
                    let run_id = run_ids.get(&err.id()).cloned().unwrap_or_default();
                    return Err(CliError::worker(run_id, err.to_string()).into());
                }
            };
            match outcome {
                Ok((report, path)) => {
                    record_sync_result(&run_id, &report.result);
                    info!(
                        run_id = %run_id,
                        tau = format!("{:.4}", report.result.tau),
                        source = report.result.source.as_str(),
                        report = %path.display(),
                        "Run synchronized"
                    );
                    stats.record_success(&report, path);
                }
                Err(err) => {
                    record_sync_failure(&run_id, &err);
                    warn!(run_id = %run_id, kind = err.kind(), error = %err, "Run failed");
                    stats.record_failure(&run_id, &err);
                }
            }
        }

        stats.sort();
        stats.duration = start_time.elapsed();
        Ok(stats)
    }
}
