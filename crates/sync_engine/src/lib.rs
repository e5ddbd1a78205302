//! # Sync Engine
//!
//! Time-shift synchronization of two bicycle sensor streams.
//!
//! - [`GapSegmenter`]: split a gappy signal into valid runs and missing samples
//! - [`BumpLocator`]: find the calibration bump window
//! - [`SyncErrorEvaluator`]: misalignment cost for a candidate tau
//! - [`TimeShiftEstimator`]: grid search, cross-check and local refinement
//! - [`TruncateAligner`]: put both streams on a common time base
//!
//! ## Example
//!
//! ```ignore
//! use sync_engine::{TimeShiftEstimator, TruncateAligner};
//!
//! let estimator = TimeShiftEstimator::new(config);
//! let result = estimator.estimate(&ni_accel, &vn_accel, speed)?;
//! let pair = TruncateAligner::align_pair(&ni_accel, &vn_accel, result.tau)?;
//! ```

mod bump;
mod cost;
pub mod decision;
mod estimator;
mod gap;
mod truncate;

pub use bump::BumpLocator;
pub use cost::SyncErrorEvaluator;
pub use decision::{resolve, CrossCheck, GUESS_CROSS_CHECK, REFINEMENT_CHECK};
pub use estimator::TimeShiftEstimator;
pub use gap::GapSegmenter;
pub use truncate::{AlignedPair, TruncateAligner};

// Re-export contracts types
pub use contracts::{BumpWindow, ErrorLandscape, SegmentIndexList, SyncConfig, SyncResult};
