//! Zero-phase Butterworth low-pass filter.
//!
//! The filter is designed as a cascade of second-order sections obtained by
//! the bilinear transform (one extra first-order section for odd orders) and
//! applied forward then backward, so the output has no phase lag.

use std::f64::consts::{PI, SQRT_2};

use contracts::{ContractError, SignalFilter};

/// One IIR section in transposed direct form II, `a[0] == 1`
#[derive(Debug, Clone, Copy, PartialEq)]
struct Section {
    b: [f64; 3],
    a: [f64; 3],
}

impl Section {
    /// Second-order section of `1 / (s^2 + damping*s + 1)` at prewarped `k`
    fn second_order(k: f64, damping: f64) -> Self {
        let k2 = k * k;
        let a0 = 1.0 + damping * k + k2;
        let b0 = k2 / a0;
        Self {
            b: [b0, 2.0 * b0, b0],
            a: [1.0, 2.0 * (k2 - 1.0) / a0, (1.0 - damping * k + k2) / a0],
        }
    }

    /// First-order section of `1 / (s + 1)` at prewarped `k`
    fn first_order(k: f64) -> Self {
        let a0 = 1.0 + k;
        Self {
            b: [k / a0, k / a0, 0.0],
            a: [1.0, (k - 1.0) / a0, 0.0],
        }
    }

    fn dc_gain(&self) -> f64 {
        (self.b[0] + self.b[1] + self.b[2]) / (self.a[0] + self.a[1] + self.a[2])
    }

    /// State that makes a constant input `x0` produce a constant output
    fn steady_state(&self, x0: f64) -> [f64; 2] {
        let g = self.dc_gain();
        let z2 = (self.b[2] - self.a[2] * g) * x0;
        let z1 = (self.b[1] - self.a[1] * g) * x0 + z2;
        [z1, z2]
    }

    fn run(&self, input: &mut [f64], mut z: [f64; 2]) {
        let [b0, b1, b2] = self.b;
        let [_, a1, a2] = self.a;
        for x in input.iter_mut() {
            let y = b0 * *x + z[0];
            z[0] = b1 * *x - a1 * y + z[1];
            z[1] = b2 * *x - a2 * y;
            *x = y;
        }
    }
}

/// Butterworth low-pass applied forward and backward.
///
/// The cutoff is corrected so that the doubled attenuation of the two passes
/// crosses -3 dB at the requested frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Butterworth {
    order: usize,
}

impl Default for Butterworth {
    fn default() -> Self {
        Self { order: 2 }
    }
}

impl Butterworth {
    pub fn new(order: usize) -> Self {
        Self { order }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Sections for a cutoff given as a fraction of Nyquist, `0 < wn < 1`
    fn design(&self, wn: f64) -> Vec<Section> {
        let k = (PI * wn / 2.0).tan();
        let n = self.order;
        let mut sections: Vec<Section> = (0..n / 2)
            .map(|i| {
                let damping = 2.0 * ((2 * i + 1) as f64 * PI / (2 * n) as f64).sin();
                Section::second_order(k, damping)
            })
            .collect();
        if n % 2 == 1 {
            sections.push(Section::first_order(k));
        }
        sections
    }

    fn cascade(sections: &[Section], data: &mut [f64]) {
        let Some(&x0) = data.first() else {
            return;
        };
        let mut level = x0;
        for section in sections {
            section.run(data, section.steady_state(level));
            level *= section.dc_gain();
        }
    }
}

impl SignalFilter for Butterworth {
    fn low_pass(
        &self,
        samples: &[f64],
        cutoff_hz: f64,
        sample_rate: f64,
    ) -> Result<Vec<f64>, ContractError> {
        if self.order == 0 {
            return Err(ContractError::numeric("butterworth order must be >= 1"));
        }
        if !(cutoff_hz > 0.0 && sample_rate > 0.0) {
            return Err(ContractError::numeric(format!(
                "cutoff ({cutoff_hz} Hz) and sample rate ({sample_rate} Hz) must be > 0"
            )));
        }

        let nyquist = 0.5 * sample_rate;
        let correction = (SQRT_2 - 1.0).powf(1.0 / (2 * self.order) as f64);
        let wn = cutoff_hz / correction / nyquist;
        if wn >= 1.0 {
            return Err(ContractError::numeric(format!(
                "corrected cutoff {:.3} Hz is not below the Nyquist frequency {nyquist} Hz",
                cutoff_hz / correction
            )));
        }

        let n = samples.len();
        if n < 2 {
            return Ok(samples.to_vec());
        }

        let sections = self.design(wn);
        let pad = (3 * (self.order + 1)).min(n - 1);
        let mut work = odd_extension(samples, pad);

        Self::cascade(&sections, &mut work);
        work.reverse();
        Self::cascade(&sections, &mut work);
        work.reverse();

        Ok(work[pad..pad + n].to_vec())
    }
}

/// Pad both ends with point reflections about the end samples
fn odd_extension(x: &[f64], pad: usize) -> Vec<f64> {
    let n = x.len();
    let (first, last) = (x[0], x[n - 1]);
    let mut out = Vec::with_capacity(n + 2 * pad);
    out.extend((1..=pad).rev().map(|i| 2.0 * first - x[i]));
    out.extend_from_slice(x);
    out.extend((1..=pad).map(|i| 2.0 * last - x[n - 1 - i]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, rate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / rate).sin())
            .collect()
    }

    fn peak_amplitude(x: &[f64]) -> f64 {
        x.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
    }

    #[test]
    fn test_second_order_section_has_unit_dc_gain() {
        let section = Section::second_order(0.7, SQRT_2);
        assert!((section.dc_gain() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_signal_passes_unchanged() {
        let filtered = Butterworth::default()
            .low_pass(&[3.5; 64], 50.0, 200.0)
            .unwrap();
        assert_eq!(filtered.len(), 64);
        for v in filtered {
            assert!((v - 3.5).abs() < 1e-9, "got {v}");
        }
    }

    #[test]
    fn test_odd_order_constant_signal() {
        let filtered = Butterworth::new(3)
            .low_pass(&[-1.25; 40], 10.0, 200.0)
            .unwrap();
        for v in filtered {
            assert!((v + 1.25).abs() < 1e-9, "got {v}");
        }
    }

    #[test]
    fn test_attenuates_high_frequency() {
        let x = sine(80.0, 200.0, 2000);
        let y = Butterworth::default().low_pass(&x, 5.0, 200.0).unwrap();
        let amplitude = peak_amplitude(&y[200..1800]);
        assert!(amplitude < 0.01, "80 Hz leaked through: {amplitude}");
    }

    #[test]
    fn test_preserves_low_frequency() {
        let x = sine(1.0, 200.0, 2000);
        let y = Butterworth::default().low_pass(&x, 50.0, 200.0).unwrap();
        for i in 200..1800 {
            assert!((x[i] - y[i]).abs() < 0.01, "sample {i}: {} vs {}", x[i], y[i]);
        }
    }

    #[test]
    fn test_zero_phase_keeps_peak_index() {
        let x: Vec<f64> = (0..400)
            .map(|i| (-((i as f64 - 180.0) / 8.0).powi(2)).exp())
            .collect();
        let y = Butterworth::default().low_pass(&x, 20.0, 200.0).unwrap();
        let argmax = y
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(argmax, 180);
    }

    #[test]
    fn test_cutoff_above_nyquist_is_rejected() {
        let err = Butterworth::default()
            .low_pass(&[0.0; 16], 45.0, 100.0)
            .unwrap_err();
        assert!(matches!(err, ContractError::Numeric { .. }));
    }

    #[test]
    fn test_short_signals() {
        let filter = Butterworth::default();
        assert_eq!(filter.low_pass(&[2.0], 50.0, 200.0).unwrap(), vec![2.0]);
        assert_eq!(filter.low_pass(&[1.0, 1.0], 50.0, 200.0).unwrap().len(), 2);
    }

    #[test]
    fn test_odd_extension() {
        let ext = odd_extension(&[1.0, 2.0, 4.0], 2);
        assert_eq!(ext, vec![-2.0, 0.0, 1.0, 2.0, 4.0, 6.0, 7.0]);
    }
}
