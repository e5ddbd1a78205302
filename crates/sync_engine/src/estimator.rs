//! Two-stage time-shift estimation.

use contracts::{
    time_vector, BumpWindow, ContractError, DecisionReason, ErrorLandscape, ScalarMinimizer,
    Segment, Signal, SignalFilter, SyncConfig, SyncResult, TauSource,
};
use numerics::{normalize, subtract_mean, Butterworth, CubicSpline, NelderMead};
use tracing::{debug, info, instrument, trace, warn};

use crate::bump::BumpLocator;
use crate::cost::SyncErrorEvaluator;
use crate::decision::{resolve, CrossCheck, GUESS_CROSS_CHECK, REFINEMENT_CHECK};
use crate::gap::GapSegmenter;

/// Estimates the shift of stream B relative to stream A.
///
/// Coarse grid search over the error landscape, cross-checked against the
/// offset of the two bump peaks, then refined with a local minimizer whose
/// output is only kept when it stays close to its seed.
#[derive(Debug, Clone)]
pub struct TimeShiftEstimator<F = Butterworth, M = NelderMead> {
    config: SyncConfig,
    filter: F,
    minimizer: M,
}

impl TimeShiftEstimator {
    /// Estimator using the built-in Butterworth filter and Nelder-Mead search
    pub fn new(config: SyncConfig) -> Self {
        let filter = Butterworth::new(config.filter.order);
        let minimizer = NelderMead::from(&config.minimizer);
        Self {
            config,
            filter,
            minimizer,
        }
    }
}

impl Default for TimeShiftEstimator {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}

impl<F: SignalFilter, M: ScalarMinimizer> TimeShiftEstimator<F, M> {
    pub fn with_primitives(config: SyncConfig, filter: F, minimizer: M) -> Self {
        Self {
            config,
            filter,
            minimizer,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Estimate tau for `shifted` (stream B) against `reference` (stream A).
    ///
    /// Both signals must share length and sample rate. `speed` is the
    /// nominal forward speed (m/s) used to size the bump windows.
    ///
    /// # Errors
    /// - `InvalidLength` / `RateMismatch` for incompatible inputs
    /// - `DataQuality` when the valid run around the bump is too short or the
    ///   reference has missing samples inside it
    /// - `DataQuality` when no grid point overlaps the segment by at least
    ///   `min_overlap_len` samples
    #[instrument(
        name = "time_shift_estimate",
        skip(self, reference, shifted),
        fields(
            reference = %reference.source(),
            shifted = %shifted.source(),
            len = reference.len(),
            rate = reference.sample_rate()
        )
    )]
    pub fn estimate(
        &self,
        reference: &Signal,
        shifted: &Signal,
        speed: f64,
    ) -> Result<SyncResult, ContractError> {
        let outcome = self.run(reference, shifted, speed);
        match &outcome {
            Ok(result) => {
                metrics::counter!("sync_estimates_total", "status" => "ok").increment(1);
                metrics::histogram!("sync_tau_seconds").record(result.tau);
                metrics::histogram!("sync_landscape_min_error").record(result.min_error);
                let overrides = result
                    .decisions
                    .iter()
                    .filter(|d| d.reason == DecisionReason::CandidateDisagrees);
                for decision in overrides {
                    metrics::counter!(
                        "sync_override_total",
                        "stage" => decision.stage.as_str(),
                        "reason" => decision.reason.as_str()
                    )
                    .increment(1);
                }
                info!(tau = result.tau, source = result.source.as_str(), "time shift estimated");
            }
            Err(err) => {
                metrics::counter!("sync_estimates_total", "status" => err.kind()).increment(1);
            }
        }
        outcome
    }

    fn run(
        &self,
        reference: &Signal,
        shifted: &Signal,
        speed: f64,
    ) -> Result<SyncResult, ContractError> {
        if reference.len() != shifted.len() {
            return Err(ContractError::InvalidLength {
                reference: reference.len(),
                shifted: shifted.len(),
            });
        }
        let rate = reference.sample_rate();
        if (rate - shifted.sample_rate()).abs() > f64::EPSILON * rate {
            return Err(ContractError::RateMismatch {
                reference: rate,
                shifted: shifted.sample_rate(),
            });
        }

        let reference = if self.config.channels.invert_reference {
            reference.negated()
        } else {
            reference.clone()
        };

        let (reference_bump, shifted_bump) = self.locate_bumps(&reference, shifted, speed)?;
        let guess = Some((reference_bump.peak as f64 - shifted_bump.peak as f64) / rate);
        debug!(?reference_bump, ?shifted_bump, ?guess, "bumps located");

        let segment = self.bump_segment(shifted, &shifted_bump)?;
        let (start, end) = segment.bounds();

        let reference_section = &reference.samples()[start..end];
        let missing = reference_section.iter().filter(|v| v.is_nan()).count();
        if missing > 0 {
            return Err(ContractError::data_quality(
                format!("reference has {missing} missing samples in the bump segment"),
                segment.len() - missing,
                segment.len(),
            ));
        }

        let a = normalize(&subtract_mean(reference_section));
        let b = normalize(&subtract_mean(&shifted.samples()[start..end]));
        let time = time_vector(reference.len(), rate);
        let time = &time[start..end];

        let landscape = self.landscape(&a, &b, time)?;
        let (grid_tau, min_error) = landscape.minimum().ok_or_else(|| {
            ContractError::data_quality(
                "no grid point leaves enough overlap to score",
                segment.len(),
                self.config.search.min_overlap_len,
            )
        })?;
        debug!(grid_tau, min_error, "error landscape minimum");

        let search = &self.config.search;
        let first = resolve(
            &GUESS_CROSS_CHECK,
            &CrossCheck {
                seed: grid_tau,
                candidate: guess,
                tolerance: search.guess_tolerance_s,
                plausible: (search.guess_min_s, search.guess_max_s),
            },
            None,
        );
        if first.selected == TauSource::BumpGuess {
            warn!(
                grid_tau,
                guess = first.tau,
                "grid optimum disagrees with the bump offset, using the bump offset"
            );
        }

        let seed_tau = first.tau;
        let refined = self
            .minimizer
            .minimize(&mut |tau| self.score(tau, &a, &b, time), seed_tau)?;
        debug!(
            seed_tau,
            refined_tau = refined.x,
            iterations = refined.iterations,
            converged = refined.converged,
            "refinement finished"
        );

        let second = resolve(
            &REFINEMENT_CHECK,
            &CrossCheck {
                seed: seed_tau,
                candidate: Some(refined.x),
                tolerance: search.refine_tolerance_s,
                plausible: (f64::NEG_INFINITY, f64::INFINITY),
            },
            Some(first.selected),
        );
        if second.selected != TauSource::Refined {
            warn!(
                seed_tau,
                refined_tau = refined.x,
                "minimizer wandered off its seed, keeping the seed"
            );
        }

        Ok(SyncResult {
            tau: second.tau,
            source: second.selected,
            grid_tau,
            min_error,
            guess,
            seed_tau,
            refined_tau: refined.x,
            segment,
            reference_bump,
            shifted_bump,
            decisions: vec![first, second],
        })
    }

    /// Misalignment cost at every grid point of the search configuration.
    ///
    /// `reference`, `shifted` and `time` are the prepared bump sections.
    /// Grid points that leave fewer than `min_overlap_len` overlapping
    /// samples score `+inf`.
    pub fn landscape(
        &self,
        reference: &[f64],
        shifted: &[f64],
        time: &[f64],
    ) -> Result<ErrorLandscape, ContractError> {
        let grid = self.config.search.grid();
        let mut landscape = ErrorLandscape::with_capacity(grid.len());
        for tau in grid {
            landscape.push(tau, self.score(tau, reference, shifted, time)?);
        }
        Ok(landscape)
    }

    /// Cost of `tau`, or `+inf` when the overlap is too short to compare
    fn score(
        &self,
        tau: f64,
        reference: &[f64],
        shifted: &[f64],
        time: &[f64],
    ) -> Result<f64, ContractError> {
        let overlap = SyncErrorEvaluator::overlap(tau, time).len();
        if overlap < self.config.search.min_overlap_len {
            trace!(tau, overlap, "overlap too short to score");
            return Ok(f64::INFINITY);
        }
        SyncErrorEvaluator::evaluate(tau, reference, shifted, time)
    }

    fn locate_bumps(
        &self,
        reference: &Signal,
        shifted: &Signal,
        speed: f64,
    ) -> Result<(BumpWindow, BumpWindow), ContractError> {
        let bump = &self.config.bump;
        let reference_bump = BumpLocator::locate(
            &self.smooth(reference)?,
            speed,
            bump.wheelbase_m,
            bump.bump_length_m,
        )?;
        let shifted_bump = BumpLocator::locate(
            &self.smooth(shifted)?,
            speed,
            bump.wheelbase_m,
            bump.bump_length_m,
        )?;
        Ok((reference_bump, shifted_bump))
    }

    /// Low-pass the signal, reconstructing missing samples with a spline first
    fn smooth(&self, signal: &Signal) -> Result<Signal, ContractError> {
        let samples = if signal.has_missing() {
            reconstruct(signal)?
        } else {
            signal.samples().to_vec()
        };
        let filtered =
            self.filter
                .low_pass(&samples, self.config.filter.cutoff_hz, signal.sample_rate())?;
        Ok(signal.with_samples(filtered))
    }

    /// Valid run of raw `shifted` containing its bump peak
    fn bump_segment(&self, shifted: &Signal, bump: &BumpWindow) -> Result<Segment, ContractError> {
        let required = self.config.search.min_segment_len;
        let segments = GapSegmenter::segment(shifted);
        let segment = segments
            .containing(bump.peak)
            .copied()
            .filter(|s| !s.missing)
            .ok_or_else(|| {
                ContractError::data_quality(
                    format!("bump peak {} falls on a missing sample", bump.peak),
                    0,
                    required,
                )
            })?;
        debug!(start = segment.start, end = segment.end, "bump segment");

        if segment.len() < required {
            return Err(ContractError::data_quality(
                format!(
                    "bump segment [{}, {}) is too short",
                    segment.start, segment.end
                ),
                segment.len(),
                required,
            ));
        }
        Ok(segment)
    }
}

/// Cubic spline through the valid samples, evaluated on the full time axis
fn reconstruct(signal: &Signal) -> Result<Vec<f64>, ContractError> {
    let (t, v): (Vec<f64>, Vec<f64>) = signal
        .samples()
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .map(|(i, v)| (signal.time_at(i), *v))
        .unzip();
    if t.len() < 2 {
        return Err(ContractError::data_quality(
            format!("{} has too few valid samples to reconstruct", signal.source()),
            t.len(),
            2,
        ));
    }
    debug!(
        source = %signal.source(),
        missing = signal.missing_count(),
        "reconstructing missing samples"
    );
    Ok(CubicSpline::natural(&t, &v)?.eval_many(&signal.time()))
}
