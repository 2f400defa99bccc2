//! Error types for the music model.

/// Result type alias for the music model.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for pitch, duration and script handling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Pitch symbol is not one of the 17 known spellings.
    #[error("unknown pitch: {0}")]
    UnknownPitch(String),

    /// Duration symbol is not one of `w,h,q,e,s,t,sf`.
    #[error("unknown duration: {0}")]
    UnknownDuration(String),

    /// Tempo must be a positive number of beats per minute.
    #[error("invalid tempo: {0} bpm")]
    InvalidTempo(i64),

    /// Missing or unparseable token.
    #[error("malformed script at token {position}: {message}")]
    MalformedScript { position: usize, message: String },
}
