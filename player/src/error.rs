//! Error types for script playback.

/// Result type alias for playback.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for playback. Any error aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Script, pitch, duration or tempo error.
    #[error(transparent)]
    Music(#[from] tonebox_music::Error),

    /// Device or stream error.
    #[error(transparent)]
    Audio(#[from] tonebox_audio::Error),
}
