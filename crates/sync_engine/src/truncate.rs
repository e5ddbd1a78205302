//! Apply an estimated shift to put both streams on a common time base.

use contracts::{ContractError, Signal, SignalSource};
use numerics::interp;
use tracing::instrument;

/// Reference and aligned signals truncated to the same time base.
#[derive(Debug, Clone)]
pub struct AlignedPair {
    pub reference: Signal,
    pub aligned: Signal,
    pub tau: f64,
}

impl AlignedPair {
    /// Common length of both signals
    pub fn len(&self) -> usize {
        self.reference.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reference.is_empty()
    }
}

/// Truncates signals to the interval they share after a shift of `tau`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TruncateAligner;

impl TruncateAligner {
    /// Truncate one signal according to its role.
    ///
    /// The common time base is `t[t < t[last] - tau]`. A reference signal is
    /// moved back by `tau` and interpolated onto it; an aligned signal is
    /// sliced to it. Signals of equal length and rate come out with equal
    /// lengths.
    ///
    /// # Errors
    /// `SourceUndefined` for a source tag without a role, `InvalidShift`
    /// when the common interval is empty.
    #[instrument(
        name = "truncate_align",
        level = "debug",
        skip(signal),
        fields(source = %signal.source(), len = signal.len())
    )]
    pub fn align(signal: &Signal, tau: f64) -> Result<Signal, ContractError> {
        let role = signal
            .source()
            .role()
            .ok_or_else(|| ContractError::SourceUndefined {
                tag: signal.source().to_string(),
            })?;

        let time = signal.time();
        let last = signal.duration() - tau;
        let common = time.partition_point(|&t| t < last);
        if !tau.is_finite() || common == 0 {
            return Err(ContractError::invalid_shift(
                tau,
                format!(
                    "no common interval for a {:.3} s recording",
                    signal.duration()
                ),
            ));
        }

        let samples = match role {
            SignalSource::Reference => {
                let shifted: Vec<f64> = time.iter().map(|t| t - tau).collect();
                interp(&time[..common], &shifted, signal.samples())?
            }
            SignalSource::Aligned => signal.samples()[..common].to_vec(),
        };
        Ok(signal.with_samples(samples))
    }

    /// Align a reference/aligned pair with the same `tau`.
    ///
    /// Checks the two roles and that both signals share length and rate.
    pub fn align_pair(
        reference: &Signal,
        aligned: &Signal,
        tau: f64,
    ) -> Result<AlignedPair, ContractError> {
        for (signal, expected) in [
            (reference, SignalSource::Reference),
            (aligned, SignalSource::Aligned),
        ] {
            match signal.source().role() {
                Some(role) if role == expected => {}
                Some(_) => {
                    return Err(ContractError::invalid_signal(format!(
                        "{} cannot play the {expected:?} role",
                        signal.source()
                    )));
                }
                None => {
                    return Err(ContractError::SourceUndefined {
                        tag: signal.source().to_string(),
                    });
                }
            }
        }
        if reference.len() != aligned.len() {
            return Err(ContractError::InvalidLength {
                reference: reference.len(),
                shifted: aligned.len(),
            });
        }
        if reference.sample_rate() != aligned.sample_rate() {
            return Err(ContractError::RateMismatch {
                reference: reference.sample_rate(),
                shifted: aligned.sample_rate(),
            });
        }

        Ok(AlignedPair {
            reference: Self::align(reference, tau)?,
            aligned: Self::align(aligned, tau)?,
            tau,
        })
    }
}
