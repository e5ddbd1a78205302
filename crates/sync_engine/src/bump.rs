//! Bump (dominant transient) detection.

use contracts::{BumpWindow, ContractError, Signal};
use tracing::{instrument, trace, warn};

/// Locates the single large transient of a signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct BumpLocator;

impl BumpLocator {
    /// Window around the larger-magnitude extremum of `signal`.
    ///
    /// The window spans the time the bicycle needs to roll both wheels over
    /// the bump, `(wheelbase + bump_length) / speed`, rounded down to a
    /// multiple of four samples: one quarter before the peak, three after.
    /// The window may reach outside the signal; callers decide what to do
    /// with such a window. A window longer than the whole signal is a
    /// `DataQuality` error.
    #[instrument(
        name = "bump_locate",
        skip(signal),
        fields(source = %signal.source(), len = signal.len())
    )]
    pub fn locate(
        signal: &Signal,
        speed: f64,
        wheelbase: f64,
        bump_length: f64,
    ) -> Result<BumpWindow, ContractError> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(ContractError::numeric(format!(
                "speed must be > 0 m/s, got {speed}"
            )));
        }

        let samples = signal.samples();
        let peak = dominant_extremum(samples).ok_or_else(|| {
            ContractError::data_quality("signal has no valid samples to locate a bump in", 0, 1)
        })?;

        let duration = (wheelbase + bump_length) / speed;
        let span = duration * signal.sample_rate();
        if !(span.is_finite() && span <= samples.len() as f64) {
            return Err(ContractError::data_quality(
                format!("bump window of {duration} s at {speed} m/s is longer than the recording"),
                samples.len(),
                span.min(usize::MAX as f64) as usize,
            ));
        }
        let mut window = span as usize;
        window -= window % 4;
        let quarter = (window / 4) as isize;

        let bump = BumpWindow {
            start: peak as isize - quarter,
            peak,
            end: peak as isize + 3 * quarter,
        };
        trace!(?bump, duration, "bump window");

        if peak > samples.len() / 3 {
            warn!(
                source = %signal.source(),
                peak,
                len = samples.len(),
                "bump is not in the first third of the recording"
            );
        }
        let approach = &samples[bump.start.max(0) as usize..peak];
        if approach.iter().any(|v| v.is_nan()) {
            warn!(
                source = %signal.source(),
                start = bump.start,
                peak,
                "missing samples in the bump approach window"
            );
        }

        Ok(bump)
    }
}

/// Index of the larger-magnitude of the max and min, ties going to the max.
/// The first occurrence wins among equal values. NaN is skipped.
fn dominant_extremum(samples: &[f64]) -> Option<usize> {
    let mut max: Option<(usize, f64)> = None;
    let mut min: Option<(usize, f64)> = None;
    for (i, &v) in samples.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        if max.is_none_or(|(_, m)| v > m) {
            max = Some((i, v));
        }
        if min.is_none_or(|(_, m)| v < m) {
            min = Some((i, v));
        }
    }
    let ((imax, vmax), (imin, vmin)) = (max?, min?);
    Some(if vmax.abs() >= vmin.abs() { imax } else { imin })
}
