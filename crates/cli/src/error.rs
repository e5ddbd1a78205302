//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Data directory not found
    #[error("Data directory not found: {path}")]
    DataDirNotFound { path: String },

    /// No run matched the selection
    #[error("No runs to synchronize in {path}")]
    NoRuns { path: String },

    /// Some runs could not be synchronized
    #[error("{failed} of {total} runs failed to synchronize")]
    RunsFailed { failed: u64, total: u64 },

    /// A blocking sync worker panicked or was cancelled
    #[error("Sync worker for run {run_id} did not finish: {message}")]
    Worker { run_id: String, message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn data_dir_not_found(path: impl Into<String>) -> Self {
        Self::DataDirNotFound { path: path.into() }
    }

    pub fn no_runs(path: impl Into<String>) -> Self {
        Self::NoRuns { path: path.into() }
    }

    pub fn worker(run_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Worker {
            run_id: run_id.into(),
            message: message.into(),
        }
    }
}
