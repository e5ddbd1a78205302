//! Numeric primitive traits
//!
//! The core consumes a low-pass filter and a scalar minimizer through these
//! seams so alternative implementations can be swapped in (or mocked in tests).

use crate::ContractError;

/// Low-pass filtering primitive.
pub trait SignalFilter {
    /// Filter `samples` recorded at `sample_rate` with a `cutoff_hz` low-pass.
    ///
    /// Returns a new vector of the same length.
    fn low_pass(
        &self,
        samples: &[f64],
        cutoff_hz: f64,
        sample_rate: f64,
    ) -> Result<Vec<f64>, ContractError>;
}

/// Result of a scalar minimization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimizeOutcome {
    /// Location of the best point found
    pub x: f64,
    /// Objective value at `x`
    pub fun: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Objective evaluations performed
    pub nfev: usize,
    /// Whether the convergence criterion was met before the iteration cap
    pub converged: bool,
}

/// Derivative-free scalar minimizer.
///
/// The objective is fallible: an error raised by any evaluation aborts the
/// search and is returned unchanged.
pub trait ScalarMinimizer {
    fn minimize(
        &self,
        objective: &mut dyn FnMut(f64) -> Result<f64, ContractError>,
        x0: f64,
    ) -> Result<MinimizeOutcome, ContractError>;
}
