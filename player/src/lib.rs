//! Script playback for tonebox.
//!
//! The [`Sequencer`] reads one [`Command`](tonebox_music::Command) at a time,
//! converts notes and rests into tones on a
//! [`ToneBackend`](tonebox_audio::ToneBackend), and reports each note to a
//! [`Renderer`]. The backend is silenced and closed on every way out of
//! [`Sequencer::run`]: end of script, renderer quit, error, or interrupt.
//!
//! # Example
//!
//! ```no_run
//! use tonebox_audio::{Beeper, StopToken};
//! use tonebox_music::Script;
//! use tonebox_player::{NullRenderer, Sequencer};
//!
//! let stop = StopToken::new();
//! let beeper = Beeper::new(tonebox_audio::beeper::DEFAULT_DEVICE_PATH, stop.clone());
//! let sequencer = Sequencer::new(beeper, NullRenderer, stop)?;
//! let summary = sequencer.run(Script::new("bpm 120 A 4 q P q A 4 h".as_bytes()))?;
//! println!("played {} notes", summary.notes);
//! # Ok::<(), tonebox_player::Error>(())
//! ```

mod error;
mod interrupt;
mod renderer;
mod sequencer;

#[cfg(test)]
mod tests;

pub use error::{Error, Result};
pub use interrupt::Interrupter;
pub use renderer::{Flow, NoteEvent, NullRenderer, Renderer};
pub use sequencer::{Articulation, Outcome, Sequencer, Summary};
