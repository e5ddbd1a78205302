//! Signal - Ingestion output, core input
//!
//! A uniformly sampled, possibly gappy, single-channel time series.

use serde::{Deserialize, Serialize};

use crate::{ContractError, SourceTag};

/// Role an instrument plays during synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    /// Stream A: the cleaner signal, interpolated onto the common time base
    Reference,
    /// Stream B: the signal that gets shifted and sliced
    Aligned,
}

/// Uniformly sampled signal
///
/// Missing samples are `f64::NAN`. The time axis is never stored; it is
/// recomputed as `index / sample_rate` whenever needed so that samples and
/// time base cannot drift apart.
#[derive(Debug, Clone)]
pub struct Signal {
    samples: Vec<f64>,
    sample_rate: f64,
    source: SourceTag,
}

impl Signal {
    /// Create a signal, enforcing `len >= 1` and `sample_rate > 0`.
    pub fn new(
        samples: Vec<f64>,
        sample_rate: f64,
        source: impl Into<SourceTag>,
    ) -> Result<Self, ContractError> {
        if samples.is_empty() {
            return Err(ContractError::invalid_signal("signal has no samples"));
        }
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(ContractError::invalid_signal(format!(
                "sample rate must be > 0, got {sample_rate}"
            )));
        }
        Ok(Self {
            samples,
            sample_rate,
            source: source.into(),
        })
    }

    /// Sample values (`NAN` marks a missing sample)
    #[inline]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Samples per second
    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Instrument label
    #[inline]
    pub fn source(&self) -> &SourceTag {
        &self.source
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a constructed signal; kept for API symmetry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time stamp of sample `index` in seconds
    #[inline]
    pub fn time_at(&self, index: usize) -> f64 {
        index as f64 / self.sample_rate
    }

    /// Full time axis `[0, 1/rate, 2/rate, ...]`
    pub fn time(&self) -> Vec<f64> {
        time_vector(self.samples.len(), self.sample_rate)
    }

    /// Duration covered by the samples, i.e. the last time stamp
    pub fn duration(&self) -> f64 {
        self.time_at(self.samples.len() - 1)
    }

    /// Number of missing samples
    pub fn missing_count(&self) -> usize {
        self.samples.iter().filter(|v| v.is_nan()).count()
    }

    pub fn has_missing(&self) -> bool {
        self.samples.iter().any(|v| v.is_nan())
    }

    /// New signal with every sample negated
    pub fn negated(&self) -> Self {
        self.with_samples(self.samples.iter().map(|v| -v).collect())
    }

    /// New signal sharing rate and source but carrying `samples`
    ///
    /// Callers are responsible for `samples` being non-empty.
    pub fn with_samples(&self, samples: Vec<f64>) -> Self {
        debug_assert!(!samples.is_empty());
        Self {
            samples,
            sample_rate: self.sample_rate,
            source: self.source.clone(),
        }
    }

    /// Consume the signal, returning its samples
    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }
}

/// Time vector for `len` samples at `sample_rate`
pub fn time_vector(len: usize, sample_rate: f64) -> Vec<f64> {
    (0..len).map(|i| i as f64 / sample_rate).collect()
}
