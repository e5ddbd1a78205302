//! Sync configuration contracts that can be shared across crates.
//!
//! Defaults are the constants the instrumented bicycle rig was tuned with;
//! every one of them can be overridden from a config file.

use serde::{Deserialize, Serialize};

/// Time-shift estimation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Low-pass filter applied before bump detection
    #[serde(default)]
    pub filter: FilterConfig,

    /// Physical constants of the bump window
    #[serde(default)]
    pub bump: BumpConfig,

    /// Grid search and cross-check tolerances
    #[serde(default)]
    pub search: SearchConfig,

    /// Local refinement
    #[serde(default)]
    pub minimizer: MinimizerConfig,

    /// Which run channels feed the estimator
    #[serde(default)]
    pub channels: ChannelConfig,
}

/// Low-pass filter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Cutoff frequency (Hz)
    pub cutoff_hz: f64,
    /// Butterworth order
    pub order: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            cutoff_hz: 50.0,
            order: 2,
        }
    }
}

/// Bump window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BumpConfig {
    /// Bicycle wheelbase (m)
    pub wheelbase_m: f64,
    /// Length of the calibration bump (m)
    pub bump_length_m: f64,
}

impl Default for BumpConfig {
    fn default() -> Self {
        Self {
            wheelbase_m: 1.02,
            bump_length_m: 1.0,
        }
    }
}

/// Tau search configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Lower grid bound (s); stream B leads stream A
    pub tau_min_s: f64,
    /// Upper grid bound (s)
    pub tau_max_s: f64,
    /// Number of evenly spaced grid points, bounds included
    pub grid_points: usize,
    /// Exclusive lower bound for a plausible bump guess (s)
    pub guess_min_s: f64,
    /// Exclusive upper bound for a plausible bump guess (s)
    pub guess_max_s: f64,
    /// Guess vs grid optimum disagreement that triggers the override (s)
    pub guess_tolerance_s: f64,
    /// Refined vs seed disagreement that discards the refinement (s)
    pub refine_tolerance_s: f64,
    /// Minimum length of the valid segment around the bump
    pub min_segment_len: usize,
    /// Fewest overlapping samples a candidate tau is scored on; shorter
    /// overlaps score as infinite error
    pub min_overlap_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tau_min_s: 0.0,
            tau_max_s: 0.5,
            grid_points: 500,
            guess_min_s: 0.0,
            guess_max_s: 1.0,
            guess_tolerance_s: 0.1,
            refine_tolerance_s: 0.01,
            min_segment_len: 200,
            min_overlap_len: 100,
        }
    }
}

impl SearchConfig {
    /// Evenly spaced grid over `[tau_min_s, tau_max_s]`
    pub fn grid(&self) -> Vec<f64> {
        match self.grid_points {
            0 => Vec::new(),
            1 => vec![self.tau_min_s],
            n => {
                let step = (self.tau_max_s - self.tau_min_s) / (n - 1) as f64;
                (0..n)
                    .map(|i| {
                        if i == n - 1 {
                            self.tau_max_s
                        } else {
                            self.tau_min_s + step * i as f64
                        }
                    })
                    .collect()
            }
        }
    }
}

/// Derivative-free minimizer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimizerConfig {
    /// Iteration cap
    pub max_iter: usize,
    /// Absolute tolerance on the simplex spread
    pub x_tol: f64,
    /// Absolute tolerance on the objective spread
    pub f_tol: f64,
}

impl Default for MinimizerConfig {
    fn default() -> Self {
        Self {
            max_iter: 200,
            x_tol: 1e-4,
            f_tol: 1e-4,
        }
    }
}

/// Run channel selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Stream A acceleration channel
    pub reference: String,
    /// Stream B acceleration channel
    pub shifted: String,
    /// The two instruments measure with opposite polarity
    pub invert_reference: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            reference: "AccelerometerAccelerationY".to_string(),
            shifted: "AccelerationZ".to_string(),
            invert_reference: true,
        }
    }
}
