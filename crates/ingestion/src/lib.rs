//! # Ingestion
//!
//! Loading of recorded bicycle runs.
//!
//! Responsibilities:
//! - Read run files (JSON) from an explicit data directory
//! - Decode run parameters, including VectorNav register sentences
//! - Turn recorded channels into [`contracts::Signal`]s
//! - Describe the storage schema of a run
//! - Derive steer and frame rates from raw channels
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::RunLoader;
//!
//! let loader = RunLoader::new("data/runs");
//! let run = loader.load_id("00105")?;
//! let reference = run.signal("AccelerometerAccelerationY")?;
//! let speed = run.speed()?;
//! ```
//!
//! ## Mock Testing
//!
//! ```ignore
//! use ingestion::{BumpRunGenerator, MockRunConfig};
//!
//! let run = BumpRunGenerator::new(MockRunConfig::default()).generate();
//! ```

mod error;
pub mod kinematics;
mod mock;
mod params;
mod run;
mod schema;

// Re-exports
pub use error::{IngestionError, Result};
pub use kinematics::{FrameRates, SteerAssembly};
pub use mock::{BumpRunGenerator, MockRunConfig};
pub use params::{parse_vnav_sentence, ParValue, SPEED_PARAMETER};
pub use run::{ChannelRecord, RunLoader, RunRecord};
pub use schema::{clean_column_name, ColumnDescriptor, ColumnKind, SchemaBuilder, TableSchema};
