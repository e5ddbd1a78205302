//! Misalignment cost for a candidate time shift.

use std::ops::Range;

use contracts::ContractError;
use numerics::{euclidean_distance, interp};
use tracing::instrument;

/// Scores how well `shifted` lines up with `reference` for a given tau.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncErrorEvaluator;

impl SyncErrorEvaluator {
    /// Euclidean distance between the reference interpolated on the shifted
    /// time axis and the shifted samples, over their overlap.
    ///
    /// `reference`, `shifted` and `time` must have equal lengths; `time` is
    /// increasing and may start anywhere. For `tau > 0` the overlap is the
    /// shifted points strictly before `time[last]`, otherwise those strictly
    /// after `time[0]`. The reference is interpolated there while the shifted
    /// samples are sliced as they are.
    ///
    /// # Errors
    /// `InvalidShift` when `|tau| >= time[last]` or the overlap is empty,
    /// `InvalidLength` when the three slices differ in length.
    #[instrument(
        name = "sync_error_evaluate",
        level = "trace",
        skip(reference, shifted, time),
        fields(len = time.len())
    )]
    pub fn evaluate(
        tau: f64,
        reference: &[f64],
        shifted: &[f64],
        time: &[f64],
    ) -> Result<f64, ContractError> {
        if reference.len() != time.len() || shifted.len() != time.len() {
            return Err(ContractError::InvalidLength {
                reference: reference.len(),
                shifted: shifted.len(),
            });
        }
        let Some(&last) = time.last() else {
            return Err(ContractError::invalid_shift(tau, "time axis is empty"));
        };
        if !tau.is_finite() || tau.abs() >= last {
            return Err(ContractError::invalid_shift(
                tau,
                format!("|tau| must be less than the last time stamp {last}"),
            ));
        }

        let range = Self::overlap(tau, time);
        if range.is_empty() {
            return Err(ContractError::invalid_shift(tau, "empty overlap interval"));
        }

        let shifted_time: Vec<f64> = time[range.clone()].iter().map(|t| t + tau).collect();
        let reference_on_overlap = interp(&shifted_time, time, reference)?;
        euclidean_distance(&reference_on_overlap, &shifted[range])
    }

    /// Indices of `time` whose shifted stamp `t + tau` still falls inside
    /// `time`. Empty for a non-finite tau or an empty axis.
    pub fn overlap(tau: f64, time: &[f64]) -> Range<usize> {
        let (Some(&first), Some(&last)) = (time.first(), time.last()) else {
            return 0..0;
        };
        if !tau.is_finite() {
            return 0..0;
        }
        // t + tau is increasing, so the overlap is a prefix or a suffix
        if tau > 0.0 {
            0..time.partition_point(|&t| t + tau < last)
        } else {
            time.partition_point(|&t| t + tau <= first)..time.len()
        }
    }
}
