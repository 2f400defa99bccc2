//! Note names and their frequencies.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};

// Reference frequencies at octave 0, in Hz.
pub const C0: f64 = 16.35;
pub const CS0: f64 = 17.32; // C#0 / Db0
pub const D0: f64 = 18.35;
pub const DS0: f64 = 19.45; // D#0 / Eb0
pub const E0: f64 = 20.6;
pub const F0: f64 = 21.83;
pub const FS0: f64 = 23.12; // F#0 / Gb0
pub const G0: f64 = 24.5;
pub const GS0: f64 = 25.96; // G#0 / Ab0
pub const A0: f64 = 27.5;
pub const AS0: f64 = 29.14; // A#0 / Bb0
pub const B0: f64 = 30.87;

/// One of the twelve semitones of an octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    /// All pitch classes in ascending order.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Returns the reference frequency at octave 0.
    pub const fn reference_hz(self) -> f64 {
        match self {
            PitchClass::C => C0,
            PitchClass::CSharp => CS0,
            PitchClass::D => D0,
            PitchClass::DSharp => DS0,
            PitchClass::E => E0,
            PitchClass::F => F0,
            PitchClass::FSharp => FS0,
            PitchClass::G => G0,
            PitchClass::GSharp => GS0,
            PitchClass::A => A0,
            PitchClass::ASharp => AS0,
            PitchClass::B => B0,
        }
    }

    /// Returns the semitone offset from C (0..=11).
    pub const fn semitone(self) -> u32 {
        self as u32
    }

    /// Returns the frequency at the given octave.
    ///
    /// Octaves past the range of `f64` give `f64::INFINITY`.
    pub fn frequency(self, octave: u32) -> f64 {
        self.reference_hz() * f64::from(octave).exp2()
    }

    /// Returns the MIDI note number at the given octave (C4 = 60).
    ///
    /// Widened to `u64` so every `u32` octave has a number.
    pub const fn midi_number(self, octave: u32) -> u64 {
        (octave as u64 + 1) * 12 + self.semitone() as u64
    }
}

/// A pitch as spelled in a script, e.g. `C#` or `Db`.
///
/// Enharmonic spellings share a [`PitchClass`] and therefore a frequency;
/// the spelling is only kept for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pitch {
    symbol: &'static str,
    class: PitchClass,
}

/// Every pitch spelling accepted in a script.
pub const PITCHES: [Pitch; 17] = [
    Pitch::new("C", PitchClass::C),
    Pitch::new("C#", PitchClass::CSharp),
    Pitch::new("Db", PitchClass::CSharp),
    Pitch::new("D", PitchClass::D),
    Pitch::new("D#", PitchClass::DSharp),
    Pitch::new("Eb", PitchClass::DSharp),
    Pitch::new("E", PitchClass::E),
    Pitch::new("F", PitchClass::F),
    Pitch::new("F#", PitchClass::FSharp),
    Pitch::new("Gb", PitchClass::FSharp),
    Pitch::new("G", PitchClass::G),
    Pitch::new("G#", PitchClass::GSharp),
    Pitch::new("Ab", PitchClass::GSharp),
    Pitch::new("A", PitchClass::A),
    Pitch::new("A#", PitchClass::ASharp),
    Pitch::new("Bb", PitchClass::ASharp),
    Pitch::new("B", PitchClass::B),
];

impl Pitch {
    const fn new(symbol: &'static str, class: PitchClass) -> Self {
        Self { symbol, class }
    }

    /// Looks up a pitch by its script spelling.
    pub fn from_symbol(symbol: &str) -> Result<Self> {
        PITCHES
            .iter()
            .find(|p| p.symbol == symbol)
            .copied()
            .ok_or_else(|| Error::UnknownPitch(symbol.to_string()))
    }

    /// Returns the spelling, e.g. `"Db"`.
    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    /// Returns the pitch class.
    pub fn class(&self) -> PitchClass {
        self.class
    }

    /// Returns the frequency at the given octave.
    pub fn frequency(&self, octave: u32) -> f64 {
        self.class.frequency(octave)
    }

    /// Returns the MIDI note number at the given octave.
    pub fn midi_number(&self, octave: u32) -> u64 {
        self.class.midi_number(octave)
    }
}

impl FromStr for Pitch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_symbol(s)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol)
    }
}

impl Serialize for Pitch {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol)
    }
}

/// Returns the frequency of a pitch symbol at the given octave.
pub fn frequency_of(symbol: &str, octave: u32) -> Result<f64> {
    Ok(Pitch::from_symbol(symbol)?.frequency(octave))
}
