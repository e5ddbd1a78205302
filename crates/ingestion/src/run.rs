//! Recorded run files.
//!
//! A run file is JSON holding the run parameters and every recorded channel
//! of both instruments at a common sample rate. Missing samples are `null`.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use contracts::{Signal, SignalSource, SourceTag};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::{IngestionError, Result};
use crate::params::{ParValue, SPEED_PARAMETER};

/// One recorded channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub name: String,
    /// Instrument the channel was recorded by (`NI` or `VN`)
    pub source: SourceTag,
    pub samples: Vec<Option<f64>>,
}

impl ChannelRecord {
    pub fn new(name: impl Into<String>, source: impl Into<SourceTag>, samples: &[f64]) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            samples: samples
                .iter()
                .map(|v| (!v.is_nan()).then_some(*v))
                .collect(),
        }
    }

    /// Samples with missing values as `NAN`
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|v| v.unwrap_or(f64::NAN)).collect()
    }
}

/// A single recorded run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,
    /// Common sample rate of every channel (Hz)
    pub sample_rate: f64,
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
    /// Channels in recording order
    pub channels: Vec<ChannelRecord>,
}

impl RunRecord {
    /// Check the run is usable: positive rate, equal non-empty channel
    /// lengths, unique channel names.
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(IngestionError::malformed(
                &self.run_id,
                format!("sample rate must be > 0, got {}", self.sample_rate),
            ));
        }
        let mut names = std::collections::HashSet::new();
        for channel in &self.channels {
            if !names.insert(channel.name.as_str()) {
                return Err(IngestionError::malformed(
                    &self.run_id,
                    format!("channel '{}' appears twice", channel.name),
                ));
            }
            if channel.samples.len() != self.samples_per_channel() {
                return Err(IngestionError::malformed(
                    &self.run_id,
                    format!(
                        "channel '{}' has {} samples, expected {}",
                        channel.name,
                        channel.samples.len(),
                        self.samples_per_channel()
                    ),
                ));
            }
        }
        if self.samples_per_channel() == 0 {
            return Err(IngestionError::malformed(&self.run_id, "run has no samples"));
        }
        Ok(())
    }

    /// Length of the first channel
    pub fn samples_per_channel(&self) -> usize {
        self.channels.first().map_or(0, |c| c.samples.len())
    }

    pub fn channel(&self, name: &str) -> Result<&ChannelRecord> {
        self.channels
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| IngestionError::MissingChannel {
                run_id: self.run_id.clone(),
                channel: name.to_string(),
            })
    }

    /// Channels recorded by instruments playing `role`
    pub fn channels_for(&self, role: SignalSource) -> impl Iterator<Item = &ChannelRecord> {
        self.channels
            .iter()
            .filter(move |c| c.source.role() == Some(role))
    }

    /// Channel `name` as a core signal
    pub fn signal(&self, name: &str) -> Result<Signal> {
        let channel = self.channel(name)?;
        Ok(Signal::new(
            channel.values(),
            self.sample_rate,
            channel.source.clone(),
        )?)
    }

    /// All parameters decoded
    pub fn decoded_parameters(&self) -> Result<BTreeMap<String, ParValue>> {
        self.parameters
            .iter()
            .map(|(name, value)| Ok((name.clone(), ParValue::from_json(name, value)?)))
            .collect()
    }

    /// Nominal forward speed (m/s)
    pub fn speed(&self) -> Result<f64> {
        let raw = self.parameters.get(SPEED_PARAMETER).ok_or_else(|| {
            IngestionError::parameter(SPEED_PARAMETER, format!("run {} has no speed", self.run_id))
        })?;
        ParValue::from_json(SPEED_PARAMETER, raw)?
            .as_f64()
            .filter(|v| v.is_finite() && *v > 0.0)
            .ok_or_else(|| IngestionError::parameter(SPEED_PARAMETER, "speed must be a positive number"))
    }

    /// Write the run as pretty JSON
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| IngestionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|source| {
            IngestionError::Json {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}

/// Loads run files from an explicit data directory.
#[derive(Debug, Clone)]
pub struct RunLoader {
    data_dir: PathBuf,
}

impl RunLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// `*.json` files of the data directory, sorted by name
    pub fn list_runs(&self) -> Result<Vec<PathBuf>> {
        let io_err = |source| IngestionError::Io {
            path: self.data_dir.clone(),
            source,
        };
        let mut runs = Vec::new();
        for entry in std::fs::read_dir(&self.data_dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && path.extension().is_some_and(|e| e == "json") {
                runs.push(path);
            }
        }
        runs.sort();
        Ok(runs)
    }

    /// Load and validate one run file
    #[instrument(name = "run_load", skip(self), fields(path = %path.display()))]
    pub fn load(&self, path: &Path) -> Result<RunRecord> {
        let file = File::open(path).map_err(|source| IngestionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let run: RunRecord =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| IngestionError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        run.validate()?;
        metrics::counter!("ingestion_runs_loaded_total").increment(1);
        debug!(
            run_id = %run.run_id,
            channels = run.channels.len(),
            samples = run.samples_per_channel(),
            "run loaded"
        );
        Ok(run)
    }

    /// Load run `<data_dir>/<run_id>.json`
    pub fn load_id(&self, run_id: &str) -> Result<RunRecord> {
        self.load(&self.data_dir.join(format!("{run_id}.json")))
    }

    /// Load every run; unreadable files are errors
    pub fn load_all(&self) -> Result<Vec<RunRecord>> {
        self.list_runs()?.iter().map(|p| self.load(p)).collect()
    }

    /// Most recent run by file name, used as the schema template
    pub fn latest(&self) -> Result<Option<RunRecord>> {
        match self.list_runs()?.last() {
            Some(path) => self.load(path).map(Some),
            None => {
                warn!(dir = %self.data_dir.display(), "no run files found");
                Ok(None)
            }
        }
    }
}
