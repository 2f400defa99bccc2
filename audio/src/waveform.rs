//! Periodic wave shapes.
//!
//! Each shape is a pure function of the phase, has period 1 and stays within
//! [-1, 1].

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Wave shape rendered by the synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    #[default]
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    /// All wave shapes.
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
    ];

    /// Returns the amplitude at `phase`.
    #[inline]
    pub fn sample(self, phase: f64) -> f64 {
        match self {
            Waveform::Sine => (2.0 * PI * phase).sin(),
            Waveform::Square => 4.0 * phase.floor() - 2.0 * (2.0 * phase).floor() + 1.0,
            Waveform::Sawtooth => 2.0 * (phase - phase.round()),
            Waveform::Triangle => 4.0 * (phase - (phase + 0.75).floor() + 0.25).abs() - 1.0,
        }
    }

    /// Maps a single-letter code: `S` sine, `Q` square, `W` sawtooth, `T` triangle.
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'S' => Some(Waveform::Sine),
            'Q' => Some(Waveform::Square),
            'W' => Some(Waveform::Sawtooth),
            'T' => Some(Waveform::Triangle),
            _ => None,
        }
    }

    /// Returns the single-letter code.
    pub fn code(self) -> char {
        match self {
            Waveform::Sine => 'S',
            Waveform::Square => 'Q',
            Waveform::Sawtooth => 'W',
            Waveform::Triangle => 'T',
        }
    }

    /// Returns the lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        }
    }
}

impl FromStr for Waveform {
    type Err = String;

    /// Accepts either the single-letter code or the name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(w) = Self::from_code(c) {
                return Ok(w);
            }
        }
        Self::ALL
            .into_iter()
            .find(|w| w.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown waveform '{}' (expected Q, S, W or T)", s))
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
