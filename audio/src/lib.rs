//! Tone backends for tonebox.
//!
//! This crate turns `(frequency, duration)` pairs into sound:
//!
//! - `beeper`: Linux PC speaker driven through input-event writes
//! - `synth`: waveform synthesizer on a PortAudio callback stream
//! - `waveform`: the four periodic wave shapes used by the synthesizer
//!
//! Both backends implement [`ToneBackend`] and block the calling thread for
//! the requested duration. Blocking goes through a [`StopToken`] so that an
//! interrupt can cut a tone short.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use tonebox_audio::{Beeper, StopToken, ToneBackend};
//!
//! let mut beeper = Beeper::new(tonebox_audio::beeper::DEFAULT_DEVICE_PATH, StopToken::new());
//! beeper.open()?;
//! beeper.emit(440.0, Duration::from_millis(250))?;
//! beeper.close()?;
//! # Ok::<(), tonebox_audio::Error>(())
//! ```

pub mod atomic;
pub mod backend;
pub mod beeper;
mod error;
#[cfg(feature = "portaudio")]
pub mod portaudio;
pub mod stop;
#[cfg(feature = "portaudio")]
pub mod synth;
pub mod tone;
pub mod waveform;

pub use backend::{Silencer, ToneBackend};
pub use beeper::Beeper;
pub use error::{Error, Result};
pub use stop::StopToken;
#[cfg(feature = "portaudio")]
pub use synth::Synthesizer;
pub use tone::ToneState;
pub use waveform::Waveform;
