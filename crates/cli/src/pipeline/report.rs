//! Per-run output file.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use contracts::{ContractError, Signal, SyncResult};
use serde::{Deserialize, Serialize};
use sync_engine::AlignedPair;

/// Estimated shift plus both channels on the common time base
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub run_id: String,
    pub sample_rate: f64,
    pub reference_channel: String,
    pub shifted_channel: String,
    pub result: SyncResult,
    /// Truncated NI samples, `null` where missing
    pub reference: Vec<Option<f64>>,
    /// Truncated VN samples, `null` where missing
    pub aligned: Vec<Option<f64>>,
}

fn to_nullable(signal: &Signal) -> Vec<Option<f64>> {
    signal
        .samples()
        .iter()
        .map(|v| (!v.is_nan()).then_some(*v))
        .collect()
}

impl SyncReport {
    pub fn new(
        run_id: &str,
        channels: (&str, &str),
        result: SyncResult,
        pair: &AlignedPair,
    ) -> Self {
        Self {
            run_id: run_id.to_string(),
            sample_rate: pair.reference.sample_rate(),
            reference_channel: channels.0.to_string(),
            shifted_channel: channels.1.to_string(),
            result,
            reference: to_nullable(&pair.reference),
            aligned: to_nullable(&pair.aligned),
        }
    }

    /// `<dir>/run_<id>.json`
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(format!("run_{}.json", self.run_id))
    }

    /// Write the report into `dir`, returning the file path
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ContractError> {
        let path = self.path_in(dir);
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .map_err(|e| ContractError::Other(format!("failed to write {}: {e}", path.display())))?;
        Ok(path)
    }
}
