//! Pipeline error types

use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while running the pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A processor failed to handle an event
    ///
    /// Isolated per processor per event: siblings still run.
    #[error("processor '{processor}' failed: {message}")]
    Processor {
        processor: &'static str,
        message: String,
    },

    /// Configuration rejected at pipeline construction
    #[error(transparent)]
    Config(#[from] beacon_config::ConfigError),

    /// Store could not be opened
    #[error(transparent)]
    Store(#[from] beacon_store::StoreError),
}

impl PipelineError {
    /// Create a processor failure error
    #[inline]
    pub fn processor(processor: &'static str, message: impl Into<String>) -> Self {
        Self::Processor {
            processor,
            message: message.into(),
        }
    }
}
