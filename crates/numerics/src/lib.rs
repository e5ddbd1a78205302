//! # Numerics
//!
//! Numeric primitives consumed by the sync engine.
//!
//! - Zero-phase Butterworth low-pass ([`Butterworth`])
//! - Linear interpolation ([`interp`]) and natural cubic splines ([`CubicSpline`])
//! - Derivative-free scalar minimization ([`NelderMead`])
//! - Nan-aware centring and scaling helpers ([`stats`])

mod filter;
mod interpolate;
mod minimize;
pub mod stats;

pub use filter::Butterworth;
pub use interpolate::{interp, CubicSpline};
pub use minimize::NelderMead;
pub use stats::{euclidean_distance, nan_mean, normalize, subtract_mean};
