//! Error types for recast-player
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation.
//!
//! These cover host-facing misuse only. Per-item media failures (a probe
//! that cannot determine a duration, a source that will not play) are not
//! errors at this boundary — they degrade the affected item and the engine
//! carries on.

use thiserror::Error;

/// Main error type for the recast-player crate
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schedule construction errors
    #[error("Schedule error: {0}")]
    Schedule(String),

    /// Index outside the schedule bounds
    #[error("Invalid index: {0}")]
    InvalidIndex(usize),

    /// Operation not valid in the current playback state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using the recast-player Error
pub type Result<T> = std::result::Result<T, Error>;
