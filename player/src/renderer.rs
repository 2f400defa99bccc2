//! Note display contract.

use serde::Serialize;
use tonebox_music::{DurationSymbol, Pitch};

/// A note that has just been played.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEvent {
    /// Pitch as spelled in the script.
    pub pitch: Pitch,
    pub octave: u32,
    pub duration: DurationSymbol,
    /// How many of this value fit in a whole note.
    pub fractionary: u32,
    /// Flags on the note stem.
    pub stem_count: u32,
    /// MIDI note number, `(octave + 1) * 12 + semitone`.
    pub midi_number: u64,
    /// 1-based position among the notes played so far.
    pub counter: u32,
    pub frequency_hz: f64,
    pub duration_ms: u64,
}

/// What the sequencer should do after a note is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Stop playback; the run ends with [`Outcome::Quit`](crate::Outcome::Quit).
    Quit,
}

/// Receives every played note, purely for display.
pub trait Renderer {
    fn note(&mut self, event: &NoteEvent) -> Flow;

    /// Called once when the run ends, on every exit path.
    fn finish(&mut self) {}
}

/// Renderer that shows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn note(&mut self, _event: &NoteEvent) -> Flow {
        Flow::Continue
    }
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn note(&mut self, event: &NoteEvent) -> Flow {
        (**self).note(event)
    }

    fn finish(&mut self) {
        (**self).finish()
    }
}
