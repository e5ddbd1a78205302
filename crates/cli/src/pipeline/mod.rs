//! Batch synchronization of recorded runs.

mod orchestrator;
mod report;
mod stats;

pub use orchestrator::{sync_run, SyncPipeline};
pub use report::SyncReport;
pub use stats::PipelineStats;
