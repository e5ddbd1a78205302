//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the bicycle sync
//! workspace. Business crates depend on this crate only; reverse dependencies
//! are prohibited.
//!
//! ## Time Model
//! - A signal never stores its time axis: `t[i] = i / sample_rate` (seconds, f64)
//! - `tau` is the offset (seconds) that maps stream B onto stream A's time base
//! - Missing samples are encoded as `f64::NAN`

mod error;
mod primitives;
mod signal;
mod source_tag;
mod sync;
mod sync_config;

pub use error::*;
pub use primitives::*;
pub use signal::*;
pub use source_tag::SourceTag;
pub use sync::*;
pub use sync_config::*;
