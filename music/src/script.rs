//! Note script parser.
//!
//! A script is a stream of whitespace-delimited tokens:
//!
//! ```text
//! bpm 120          set the tempo
//! P q              rest for a quarter note
//! C# 4 e           play C#4 for an eighth note
//! ```
//!
//! Commands are produced one at a time. Tokens are pulled from the reader a
//! line at a time, so arbitrarily long scripts are never held in memory.

use std::collections::VecDeque;
use std::fmt;
use std::io::BufRead;

use crate::duration::{DurationSymbol, Tempo};
use crate::error::{Error, Result};
use crate::pitch::Pitch;

/// Keyword that sets the tempo.
pub const TEMPO_KEYWORD: &str = "bpm";
/// Keyword that introduces a rest.
pub const PAUSE_KEYWORD: &str = "P";

/// A single script command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Play a note.
    PlayNote {
        pitch: Pitch,
        octave: u32,
        duration: DurationSymbol,
    },
    /// Stay silent.
    Pause { duration: DurationSymbol },
    /// Replace the current tempo.
    SetTempo { tempo: Tempo },
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::PlayNote {
                pitch,
                octave,
                duration,
            } => write!(f, "{} {} {}", pitch, octave, duration),
            Command::Pause { duration } => write!(f, "{} {}", PAUSE_KEYWORD, duration),
            Command::SetTempo { tempo } => write!(f, "{} {}", TEMPO_KEYWORD, tempo.bpm()),
        }
    }
}

/// Single-pass script reader yielding [`Command`]s.
///
/// After the first error the iterator is exhausted.
pub struct Script<R> {
    reader: R,
    pending: VecDeque<String>,
    position: usize,
    done: bool,
}

impl<R: BufRead> Script<R> {
    /// Creates a parser over the given reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
            position: 0,
            done: false,
        }
    }

    fn next_token(&mut self) -> Result<Option<String>> {
        while self.pending.is_empty() {
            let mut line = String::new();
            let n = self.reader.read_line(&mut line).map_err(|e| Error::MalformedScript {
                position: self.position + 1,
                message: format!("read failed: {}", e),
            })?;
            if n == 0 {
                return Ok(None);
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_string));
        }
        self.position += 1;
        Ok(self.pending.pop_front())
    }

    fn expect_token(&mut self, what: &str, after: &str) -> Result<String> {
        self.next_token()?.ok_or_else(|| Error::MalformedScript {
            position: self.position + 1,
            message: format!("expected {} after '{}'", what, after),
        })
    }

    fn parse_command(&mut self, head: String) -> Result<Command> {
        match head.as_str() {
            TEMPO_KEYWORD => {
                let value = self.expect_token("tempo value", TEMPO_KEYWORD)?;
                let bpm: i64 = value.parse().map_err(|_| Error::MalformedScript {
                    position: self.position,
                    message: format!("tempo must be an integer, got '{}'", value),
                })?;
                Ok(Command::SetTempo {
                    tempo: Tempo::new(bpm)?,
                })
            }
            PAUSE_KEYWORD => {
                let value = self.expect_token("duration", PAUSE_KEYWORD)?;
                Ok(Command::Pause {
                    duration: DurationSymbol::from_symbol(&value)?,
                })
            }
            _ => {
                let pitch = Pitch::from_symbol(&head)?;
                let octave = self.expect_token("octave", &head)?;
                let octave: u32 = octave.parse().map_err(|_| Error::MalformedScript {
                    position: self.position,
                    message: format!("octave must be a non-negative integer, got '{}'", octave),
                })?;
                let value = self.expect_token("duration", &head)?;
                Ok(Command::PlayNote {
                    pitch,
                    octave,
                    duration: DurationSymbol::from_symbol(&value)?,
                })
            }
        }
    }
}

impl<R: BufRead> Iterator for Script<R> {
    type Item = Result<Command>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = match self.next_token() {
            Ok(Some(head)) => self.parse_command(head),
            Ok(None) => {
                self.done = true;
                return None;
            }
            Err(e) => Err(e),
        };
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}
