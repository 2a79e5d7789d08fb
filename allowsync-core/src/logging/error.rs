//! Error types for the logging subsystem

use thiserror::Error;

/// Errors that can occur while setting up the logging subsystem
#[derive(Debug, Clone, Error)]
pub enum LoggingError {
    /// The global subscriber could not be installed
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),
}
