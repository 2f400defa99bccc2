//! Note output for the console.

use std::io::{self, Write};

use tonebox_player::{Flow, NoteEvent, Renderer};
use tracing::warn;

/// How played notes are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One human-readable line per note (default).
    #[default]
    Text,
    /// One JSON object per line.
    Json,
    /// Nothing.
    Quiet,
}

/// Prints each played note and optionally stops after a number of notes.
///
/// Write failures are logged and never interrupt playback.
pub struct ConsoleRenderer<W: Write = io::Stdout> {
    out: W,
    format: OutputFormat,
    limit: Option<u32>,
    seen: u32,
}

impl ConsoleRenderer {
    /// Creates a renderer writing to stdout.
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(io::stdout(), format)
    }
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            limit: None,
            seen: 0,
        }
    }

    /// Asks the sequencer to quit once `limit` notes have been played.
    pub fn with_limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_event(&mut self, event: &NoteEvent) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Quiet => {}
            OutputFormat::Text => writeln!(self.out, "{}", format_note(event))?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, event)?;
                writeln!(self.out)?;
            }
        }
        Ok(())
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn note(&mut self, event: &NoteEvent) -> Flow {
        if let Err(e) = self.write_event(event) {
            warn!("failed to print note: {:#}", e);
        }
        self.seen += 1;
        match self.limit {
            Some(limit) if self.seen >= limit => Flow::Quit,
            _ => Flow::Continue,
        }
    }

    fn finish(&mut self) {
        if let Err(e) = self.out.flush() {
            warn!("failed to flush output: {}", e);
        }
    }
}

/// Formats a note as `#3  A4 q  440.00 Hz  600 ms  [midi 69]`.
pub fn format_note(event: &NoteEvent) -> String {
    format!(
        "#{:<4} {:>2}{:<2} {:<2} {:>9.2} Hz {:>6} ms  [midi {}]",
        event.counter,
        event.pitch,
        event.octave,
        event.duration,
        event.frequency_hz,
        event.duration_ms,
        event.midi_number
    )
}
