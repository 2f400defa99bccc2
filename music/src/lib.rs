//! Musical model for tonebox scripts.
//!
//! - `pitch`: note names, reference frequencies and MIDI numbering
//! - `duration`: note values, fractionary weights and tempo arithmetic
//! - `script`: the whitespace-delimited note script parser
//!
//! # Example
//!
//! ```rust
//! use tonebox_music::{Command, Script, Tempo};
//!
//! let mut script = Script::new("bpm 120 A 4 q".as_bytes());
//!
//! assert!(matches!(script.next(), Some(Ok(Command::SetTempo { .. }))));
//! match script.next() {
//!     Some(Ok(Command::PlayNote { pitch, octave, duration })) => {
//!         assert_eq!(pitch.frequency(octave), 440.0);
//!         assert_eq!(duration.millis(Tempo::new(120).unwrap()), 500);
//!     }
//!     other => panic!("unexpected command: {:?}", other),
//! }
//! ```

mod duration;
mod error;
mod pitch;
mod script;

pub use duration::*;
pub use error::{Error, Result};
pub use pitch::*;
pub use script::*;
