//! Linear interpolation and natural cubic splines.

use contracts::ContractError;

/// Piecewise-linear interpolation of `(xp, fp)` at every point of `x`.
///
/// `xp` must be non-decreasing. Points outside `[xp[0], xp[last]]` take the
/// nearest end value, and knots are reproduced exactly.
pub fn interp(x: &[f64], xp: &[f64], fp: &[f64]) -> Result<Vec<f64>, ContractError> {
    if xp.len() != fp.len() {
        return Err(ContractError::InvalidLength {
            reference: xp.len(),
            shifted: fp.len(),
        });
    }
    let (Some(&first), Some(&last)) = (xp.first(), xp.last()) else {
        return Err(ContractError::numeric("cannot interpolate from zero knots"));
    };
    let n = xp.len();

    Ok(x.iter()
        .map(|&xi| {
            if xi.is_nan() {
                return f64::NAN;
            }
            if xi <= first {
                return fp[0];
            }
            if xi >= last {
                return fp[n - 1];
            }
            // first knot strictly greater than xi, 1 <= hi <= n-1
            let hi = xp.partition_point(|&k| k <= xi);
            let lo = hi - 1;
            if xp[lo] == xi {
                return fp[lo];
            }
            let t = (xi - xp[lo]) / (xp[hi] - xp[lo]);
            fp[lo] + t * (fp[hi] - fp[lo])
        })
        .collect())
}

/// Natural cubic spline through `(x, y)` knots.
///
/// Second derivatives vanish at both end knots. Evaluation beyond the knot
/// range extends the end polynomials.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<f64>,
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

impl CubicSpline {
    /// Fit the spline. Knots must be finite and strictly increasing.
    pub fn natural(x: &[f64], y: &[f64]) -> Result<Self, ContractError> {
        let n = x.len();
        if n != y.len() {
            return Err(ContractError::InvalidLength {
                reference: n,
                shifted: y.len(),
            });
        }
        if n < 2 {
            return Err(ContractError::numeric(format!(
                "spline needs at least 2 knots, got {n}"
            )));
        }
        if x.iter().chain(y).any(|v| !v.is_finite()) {
            return Err(ContractError::numeric("spline knots must be finite"));
        }
        if x.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ContractError::numeric(
                "spline knots must be strictly increasing",
            ));
        }

        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        let mut c = vec![0.0; n];

        if n > 2 {
            // Tridiagonal system for interior second-derivative terms
            let m = n - 2;
            let mut diag = vec![0.0; m];
            let mut upper = vec![0.0; m];
            let mut rhs = vec![0.0; m];
            for i in 0..m {
                diag[i] = 2.0 * (h[i] + h[i + 1]);
                upper[i] = h[i + 1];
                rhs[i] = 3.0
                    * ((y[i + 2] - y[i + 1]) / h[i + 1] - (y[i + 1] - y[i]) / h[i]);
            }

            // Thomas algorithm
            for i in 1..m {
                let w = h[i] / diag[i - 1];
                diag[i] -= w * upper[i - 1];
                rhs[i] -= w * rhs[i - 1];
            }
            c[m] = rhs[m - 1] / diag[m - 1];
            for i in (0..m - 1).rev() {
                c[i + 1] = (rhs[i] - upper[i] * c[i + 2]) / diag[i];
            }
        }

        let mut b = vec![0.0; n - 1];
        let mut d = vec![0.0; n - 1];
        for i in 0..n - 1 {
            b[i] = (y[i + 1] - y[i]) / h[i] - h[i] * (2.0 * c[i] + c[i + 1]) / 3.0;
            d[i] = (c[i + 1] - c[i]) / (3.0 * h[i]);
        }
        c.truncate(n - 1);

        Ok(Self {
            x: x.to_vec(),
            a: y[..n - 1].to_vec(),
            b,
            c,
            d,
        })
    }

    /// Value at `t`
    pub fn eval(&self, t: f64) -> f64 {
        let pieces = self.a.len();
        let i = self
            .x
            .partition_point(|&k| k <= t)
            .saturating_sub(1)
            .min(pieces - 1);
        let dx = t - self.x[i];
        self.a[i] + dx * (self.b[i] + dx * (self.c[i] + dx * self.d[i]))
    }

    /// Values at every point of `t`
    pub fn eval_many(&self, t: &[f64]) -> Vec<f64> {
        t.iter().map(|&v| self.eval(v)).collect()
    }

    /// Knot abscissae
    pub fn knots(&self) -> &[f64] {
        &self.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_interp_matches_knots_and_midpoints() {
        let xp = [0.0, 1.0, 2.0];
        let fp = [0.0, 10.0, 0.0];
        let y = interp(&[0.0, 0.5, 1.0, 1.25, 2.0], &xp, &fp).unwrap();
        assert_eq!(y, vec![0.0, 5.0, 10.0, 7.5, 0.0]);
    }

    #[test]
    fn test_interp_clamps_outside_range() {
        let y = interp(&[-1.0, 3.0], &[0.0, 2.0], &[4.0, 8.0]).unwrap();
        assert_eq!(y, vec![4.0, 8.0]);
    }

    #[test]
    fn test_interp_rejects_bad_knots() {
        assert!(interp(&[0.0], &[], &[]).is_err());
        assert!(interp(&[0.0], &[0.0, 1.0], &[1.0]).is_err());
    }

    #[test]
    fn test_spline_reproduces_cubic_interior() {
        // A natural spline through a line is the line itself
        let x: Vec<f64> = (0..10).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v - 1.0).collect();
        let spline = CubicSpline::natural(&x, &y).unwrap();
        for t in [0.1, 1.3, 4.4, 5.0] {
            assert!((spline.eval(t) - (3.0 * t - 1.0)).abs() < 1e-10);
        }
    }

    #[test]
    fn test_spline_fills_gap_smoothly() {
        let x: Vec<f64> = (0..50).filter(|i| *i != 25).map(|i| i as f64 * 0.1).collect();
        let y: Vec<f64> = x.iter().map(|v| v.sin()).collect();
        let spline = CubicSpline::natural(&x, &y).unwrap();
        assert!((spline.eval(2.5) - 2.5_f64.sin()).abs() < 1e-4);
    }

    #[test]
    fn test_spline_two_knots_is_linear() {
        let spline = CubicSpline::natural(&[0.0, 2.0], &[1.0, 5.0]).unwrap();
        assert!((spline.eval(1.0) - 3.0).abs() < 1e-12);
        assert!((spline.eval(3.0) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_spline_rejects_unsorted_knots() {
        assert!(CubicSpline::natural(&[0.0, 0.0, 1.0], &[1.0, 2.0, 3.0]).is_err());
        assert!(CubicSpline::natural(&[0.0], &[1.0]).is_err());
    }

    proptest! {
        #[test]
        fn prop_spline_passes_through_knots(ys in prop::collection::vec(-100.0..100.0f64, 2..40)) {
            let xs: Vec<f64> = (0..ys.len()).map(|i| i as f64 * 0.25).collect();
            let spline = CubicSpline::natural(&xs, &ys).unwrap();
            for (x, y) in xs.iter().zip(&ys) {
                prop_assert!((spline.eval(*x) - y).abs() < 1e-8);
            }
        }

        #[test]
        fn prop_interp_stays_within_neighbours(
            fp in prop::collection::vec(-10.0..10.0f64, 2..20),
            frac in 0.0..1.0f64,
        ) {
            let xp: Vec<f64> = (0..fp.len()).map(|i| i as f64).collect();
            let x = frac * (fp.len() - 1) as f64;
            let y = interp(&[x], &xp, &fp).unwrap()[0];
            let lo = x.floor() as usize;
            let hi = (lo + 1).min(fp.len() - 1);
            let (min, max) = (fp[lo].min(fp[hi]), fp[lo].max(fp[hi]));
            prop_assert!(y >= min - 1e-12 && y <= max + 1e-12);
        }
    }
}
