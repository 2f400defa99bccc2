//! Error types for tone backends.

use std::io;
use std::path::PathBuf;

/// Result type alias for tone backends.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for tone backend operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The beeper device could not be opened, or is not open.
    #[error("device unavailable: {}: {source}", path.display())]
    DeviceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing a tone event to the beeper failed.
    #[error("device write failed: {0}")]
    DeviceWriteFailed(#[source] io::Error),

    /// The audio subsystem could not be initialized.
    #[error("audio init failed: {0}")]
    AudioInitFailed(String),

    /// There is no default output device.
    #[error("no output device")]
    NoOutputDevice,

    /// The output stream could not be opened or started.
    #[error("stream open failed: {0}")]
    StreamOpenFailed(String),

    /// Stopping or closing the output stream failed.
    #[error("stream teardown failed: {0}")]
    StreamTeardownFailed(String),
}
