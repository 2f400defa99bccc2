//! Script interpreter.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tonebox_audio::{StopToken, ToneBackend};
use tonebox_music::{Command, DurationSymbol, Pitch, Tempo};
use tracing::{debug, warn};

use crate::error::Result;
use crate::interrupt::Interrupter;
use crate::renderer::{Flow, NoteEvent, Renderer};

/// How consecutive notes are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Articulation {
    /// Notes follow each other without a gap.
    #[default]
    Legato,
    /// Each note is followed by a rest of the same length.
    Detached,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Reached the end of the script.
    Completed,
    /// The renderer asked to stop.
    Quit,
    /// An [`Interrupter`] stopped the run.
    Interrupted,
}

/// Result of a run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub outcome: Outcome,
    pub notes: u32,
    pub pauses: u32,
}

/// Plays a script on a tone backend, one command at a time.
///
/// The sequencer owns its backend for the whole session: the backend is
/// opened by [`Sequencer::new`] and silenced and closed when
/// [`Sequencer::run`] returns. `run` consumes the sequencer, so a closed
/// backend is never reused.
pub struct Sequencer<B: ToneBackend, R: Renderer> {
    backend: B,
    renderer: R,
    stop: StopToken,
    interrupter: Arc<Interrupter>,
    articulation: Articulation,
    tempo: Tempo,
    counter: u32,
}

impl<B: ToneBackend, R: Renderer> Sequencer<B, R> {
    /// Opens `backend` and prepares a run at the default tempo.
    ///
    /// `stop` must be the token the backend sleeps on.
    pub fn new(mut backend: B, renderer: R, stop: StopToken) -> Result<Self> {
        backend.open()?;
        debug!("opened {} backend", backend.name());
        Ok(Self {
            backend,
            renderer,
            interrupter: Arc::new(Interrupter::new(stop.clone())),
            stop,
            articulation: Articulation::default(),
            tempo: Tempo::default(),
            counter: 0,
        })
    }

    /// Sets how consecutive notes are joined.
    pub fn with_articulation(mut self, articulation: Articulation) -> Self {
        self.articulation = articulation;
        self
    }

    /// Returns a handle that can stop the run from another thread.
    pub fn interrupter(&self) -> Arc<Interrupter> {
        Arc::clone(&self.interrupter)
    }

    /// Plays every command in `script`, then silences and closes the backend.
    ///
    /// An interrupt or a renderer quit ends the run successfully with the
    /// matching [`Outcome`]. Any error aborts it; teardown failures are then
    /// logged and the original error is returned.
    pub fn run<I>(mut self, script: I) -> Result<Summary>
    where
        I: IntoIterator<Item = tonebox_music::Result<Command>>,
    {
        self.interrupter.attach(self.backend.silencer().as_ref());
        let played = self.play(script.into_iter());
        self.interrupter.detach();
        self.renderer.finish();

        let teardown = self.shutdown();
        match played {
            Ok(summary) if summary.outcome == Outcome::Interrupted => {
                if let Err(e) = teardown {
                    warn!("teardown after interrupt failed: {}", e);
                }
                Ok(summary)
            }
            Ok(summary) => teardown.map(|_| summary),
            Err(e) => {
                if let Err(t) = teardown {
                    warn!("teardown after error failed: {}", t);
                }
                Err(e)
            }
        }
    }

    fn play(&mut self, mut script: impl Iterator<Item = tonebox_music::Result<Command>>) -> Result<Summary> {
        let mut summary = Summary {
            outcome: Outcome::Completed,
            notes: 0,
            pauses: 0,
        };

        while !self.stop.is_stopped() {
            let Some(command) = script.next() else {
                break;
            };
            let command = command?;
            debug!("command: {}", command);

            match command {
                Command::SetTempo { tempo } => {
                    self.tempo = tempo;
                }
                Command::Pause { duration } => {
                    self.stop.sleep(duration.duration(self.tempo));
                    summary.pauses += 1;
                }
                Command::PlayNote {
                    pitch,
                    octave,
                    duration,
                } => {
                    let flow = self.play_note(pitch, octave, duration)?;
                    summary.notes += 1;
                    if flow == Flow::Quit && !self.stop.is_stopped() {
                        summary.outcome = Outcome::Quit;
                        break;
                    }
                }
            }
        }

        if self.stop.is_stopped() {
            summary.outcome = Outcome::Interrupted;
        }
        Ok(summary)
    }

    fn play_note(&mut self, pitch: Pitch, octave: u32, duration: DurationSymbol) -> Result<Flow> {
        let frequency_hz = pitch.frequency(octave);
        let length = duration.duration(self.tempo);

        self.backend.emit(frequency_hz, length)?;
        if self.articulation == Articulation::Detached {
            self.stop.sleep(length);
        }

        self.counter += 1;
        let event = NoteEvent {
            pitch,
            octave,
            duration,
            fractionary: duration.fractionary(),
            stem_count: duration.stem_count(),
            midi_number: pitch.midi_number(octave),
            counter: self.counter,
            frequency_hz,
            duration_ms: duration.millis(self.tempo),
        };
        Ok(self.renderer.note(&event))
    }

    fn shutdown(&mut self) -> Result<()> {
        let silenced = self.backend.silence();
        let closed = self.backend.close();
        debug!("closed {} backend", self.backend.name());
        silenced?;
        closed?;
        Ok(())
    }
}
