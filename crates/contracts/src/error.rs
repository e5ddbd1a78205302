//! Layered error definitions
//!
//! Categorized by source: config / signal / sync / numeric

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Signal Errors =====
    /// Signal violates its construction invariants
    #[error("invalid signal: {message}")]
    InvalidSignal { message: String },

    /// Two signals that must share an index space differ in length
    #[error("signals are not the same length: reference={reference}, shifted={shifted}")]
    InvalidLength { reference: usize, shifted: usize },

    /// Two signals that must share a time base differ in sample rate
    #[error("signals do not share a sample rate: reference={reference} Hz, shifted={shifted} Hz")]
    RateMismatch { reference: f64, shifted: f64 },

    /// Source tag outside the recognised instrument set
    #[error("no recognised source was defined for this signal: '{tag}'")]
    SourceUndefined { tag: String },

    // ===== Sync Errors =====
    /// Time shift outside the range the observation window supports
    #[error("invalid time shift tau={tau}: {reason}")]
    InvalidShift { tau: f64, reason: String },

    /// Not enough usable samples to trust an alignment
    #[error("data quality error: {message} ({samples} usable samples, {required} required)")]
    DataQuality {
        message: String,
        samples: usize,
        required: usize,
    },

    // ===== Numeric Errors =====
    /// A numeric primitive cannot be applied to its inputs
    #[error("numeric error: {message}")]
    Numeric { message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create invalid signal error
    pub fn invalid_signal(message: impl Into<String>) -> Self {
        Self::InvalidSignal {
            message: message.into(),
        }
    }

    /// Create invalid shift error
    pub fn invalid_shift(tau: f64, reason: impl Into<String>) -> Self {
        Self::InvalidShift {
            tau,
            reason: reason.into(),
        }
    }

    /// Create data quality error
    pub fn data_quality(message: impl Into<String>, samples: usize, required: usize) -> Self {
        Self::DataQuality {
            message: message.into(),
            samples,
            required,
        }
    }

    /// Create numeric error
    pub fn numeric(message: impl Into<String>) -> Self {
        Self::Numeric {
            message: message.into(),
        }
    }

    /// Short, stable label used for metrics and summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigParse { .. } => "config_parse",
            Self::ConfigValidation { .. } => "config_validation",
            Self::InvalidSignal { .. } => "invalid_signal",
            Self::InvalidLength { .. } => "invalid_length",
            Self::RateMismatch { .. } => "rate_mismatch",
            Self::SourceUndefined { .. } => "source_undefined",
            Self::InvalidShift { .. } => "invalid_shift",
            Self::DataQuality { .. } => "data_quality",
            Self::Numeric { .. } => "numeric",
            Self::Io(_) => "io",
            Self::Other(_) => "other",
        }
    }
}
