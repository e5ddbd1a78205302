//! Derivative-free scalar minimization.

use contracts::{ContractError, MinimizeOutcome, MinimizerConfig, ScalarMinimizer};
use tracing::debug;

const RHO: f64 = 1.0;
const CHI: f64 = 2.0;
const PSI: f64 = 0.5;
const SIGMA: f64 = 0.5;

/// One-dimensional Nelder-Mead simplex search.
///
/// The simplex is the pair `{x0, 1.05 * x0}` (or `{0, 0.00025}` for a zero
/// start). The search stops once both the vertex spread and the objective
/// spread are within tolerance, or after `max_iter` iterations.
#[derive(Debug, Clone, PartialEq)]
pub struct NelderMead {
    max_iter: usize,
    x_tol: f64,
    f_tol: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self::from(&MinimizerConfig::default())
    }
}

impl From<&MinimizerConfig> for NelderMead {
    fn from(config: &MinimizerConfig) -> Self {
        Self {
            max_iter: config.max_iter,
            x_tol: config.x_tol,
            f_tol: config.f_tol,
        }
    }
}

impl NelderMead {
    pub fn new(max_iter: usize, x_tol: f64, f_tol: f64) -> Self {
        Self {
            max_iter,
            x_tol,
            f_tol,
        }
    }
}

/// Objective wrapper counting evaluations; NaN ranks as +inf
struct Counted<'a> {
    f: &'a mut dyn FnMut(f64) -> Result<f64, ContractError>,
    nfev: usize,
}

impl Counted<'_> {
    fn call(&mut self, x: f64) -> Result<f64, ContractError> {
        self.nfev += 1;
        let v = (self.f)(x)?;
        Ok(if v.is_nan() { f64::INFINITY } else { v })
    }
}

impl ScalarMinimizer for NelderMead {
    fn minimize(
        &self,
        objective: &mut dyn FnMut(f64) -> Result<f64, ContractError>,
        x0: f64,
    ) -> Result<MinimizeOutcome, ContractError> {
        if !x0.is_finite() {
            return Err(ContractError::numeric(format!(
                "minimizer start point must be finite, got {x0}"
            )));
        }

        let mut f = Counted { f: objective, nfev: 0 };
        let x1 = if x0 != 0.0 { 1.05 * x0 } else { 0.00025 };

        // sim[0] is always the best vertex
        let mut sim = [(x0, f.call(x0)?), (x1, f.call(x1)?)];
        sort(&mut sim);

        let mut iterations = 0;
        let mut converged = false;
        while iterations < self.max_iter {
            let (best, worst) = (sim[0], sim[1]);
            if (worst.0 - best.0).abs() <= self.x_tol && (worst.1 - best.1).abs() <= self.f_tol {
                converged = true;
                break;
            }
            iterations += 1;

            // Centroid of all but the worst vertex
            let xbar = best.0;
            let xr = (1.0 + RHO) * xbar - RHO * worst.0;
            let fr = f.call(xr)?;

            if fr < best.1 {
                let xe = (1.0 + RHO * CHI) * xbar - RHO * CHI * worst.0;
                let fe = f.call(xe)?;
                sim[1] = if fe < fr { (xe, fe) } else { (xr, fr) };
            } else {
                let contracted = if fr < worst.1 {
                    // Outside contraction
                    let xc = (1.0 + PSI * RHO) * xbar - PSI * RHO * worst.0;
                    let fc = f.call(xc)?;
                    (fc <= fr).then_some((xc, fc))
                } else {
                    // Inside contraction
                    let xc = (1.0 - PSI) * xbar + PSI * worst.0;
                    let fc = f.call(xc)?;
                    (fc < worst.1).then_some((xc, fc))
                };
                sim[1] = match contracted {
                    Some(vertex) => vertex,
                    None => {
                        let xs = best.0 + SIGMA * (worst.0 - best.0);
                        (xs, f.call(xs)?)
                    }
                };
            }
            sort(&mut sim);
        }

        debug!(
            x = sim[0].0,
            fun = sim[0].1,
            iterations,
            nfev = f.nfev,
            converged,
            "nelder-mead finished"
        );

        Ok(MinimizeOutcome {
            x: sim[0].0,
            fun: sim[0].1,
            iterations,
            nfev: f.nfev,
            converged,
        })
    }
}

fn sort(sim: &mut [(f64, f64); 2]) {
    if sim[1].1 < sim[0].1 {
        sim.swap(0, 1);
    }
}
