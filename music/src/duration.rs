//! Note values and tempo arithmetic.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::error::{Error, Result};

/// Milliseconds in one minute of four beats.
///
/// BPM conventionally counts quarter notes; multiplying by four gives the
/// length of a whole note, which is then divided by the fractionary weight.
pub const QUAD_BEAT_MILLIS: u64 = 240_000;

/// Default tempo when a script does not set one.
pub const DEFAULT_BPM: u32 = 100;

/// A note value as written in a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DurationSymbol {
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
    SixtyFourth,
}

impl DurationSymbol {
    /// All note values from longest to shortest.
    pub const ALL: [DurationSymbol; 7] = [
        DurationSymbol::Whole,
        DurationSymbol::Half,
        DurationSymbol::Quarter,
        DurationSymbol::Eighth,
        DurationSymbol::Sixteenth,
        DurationSymbol::ThirtySecond,
        DurationSymbol::SixtyFourth,
    ];

    /// Looks up a note value by its script symbol.
    pub fn from_symbol(symbol: &str) -> Result<Self> {
        match symbol {
            "w" => Ok(DurationSymbol::Whole),
            "h" => Ok(DurationSymbol::Half),
            "q" => Ok(DurationSymbol::Quarter),
            "e" => Ok(DurationSymbol::Eighth),
            "s" => Ok(DurationSymbol::Sixteenth),
            "t" => Ok(DurationSymbol::ThirtySecond),
            "sf" => Ok(DurationSymbol::SixtyFourth),
            _ => Err(Error::UnknownDuration(symbol.to_string())),
        }
    }

    /// Returns the script symbol.
    pub const fn symbol(self) -> &'static str {
        match self {
            DurationSymbol::Whole => "w",
            DurationSymbol::Half => "h",
            DurationSymbol::Quarter => "q",
            DurationSymbol::Eighth => "e",
            DurationSymbol::Sixteenth => "s",
            DurationSymbol::ThirtySecond => "t",
            DurationSymbol::SixtyFourth => "sf",
        }
    }

    /// Returns how many of this value fit in a whole note.
    pub const fn fractionary(self) -> u32 {
        1 << (self as u32)
    }

    /// Returns the number of flags drawn on the stem (0 for quarter and longer).
    pub const fn stem_count(self) -> u32 {
        (self as u32).saturating_sub(2)
    }

    /// Returns the length in whole milliseconds at the given tempo.
    ///
    /// Truncates toward zero.
    pub const fn millis(self, tempo: Tempo) -> u64 {
        QUAD_BEAT_MILLIS / (tempo.bpm() as u64 * self.fractionary() as u64)
    }

    /// Returns the length at the given tempo.
    pub const fn duration(self, tempo: Tempo) -> Duration {
        Duration::from_millis(self.millis(tempo))
    }
}

impl FromStr for DurationSymbol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_symbol(s)
    }
}

impl fmt::Display for DurationSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Tempo in beats per minute. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Tempo(u32);

impl Tempo {
    /// Creates a tempo, rejecting zero, negative and out-of-range values.
    pub fn new(bpm: i64) -> Result<Self> {
        match u32::try_from(bpm) {
            Ok(bpm) if bpm > 0 => Ok(Self(bpm)),
            _ => Err(Error::InvalidTempo(bpm)),
        }
    }

    /// Returns beats per minute.
    pub const fn bpm(self) -> u32 {
        self.0
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self(DEFAULT_BPM)
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bpm", self.0)
    }
}

/// Returns the fractionary weight of a duration symbol.
pub fn fractionary_of(symbol: &str) -> Result<u32> {
    Ok(DurationSymbol::from_symbol(symbol)?.fractionary())
}

/// Returns `240000 / (bpm * fractionary)` in milliseconds.
pub fn duration_millis(symbol: &str, bpm: i64) -> Result<u64> {
    let tempo = Tempo::new(bpm)?;
    Ok(DurationSymbol::from_symbol(symbol)?.millis(tempo))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractionary_table() {
        let expected = [("w", 1), ("h", 2), ("q", 4), ("e", 8), ("s", 16), ("t", 32), ("sf", 64)];
        for (symbol, weight) in expected {
            assert_eq!(fractionary_of(symbol).unwrap(), weight, "symbol {}", symbol);
        }
    }

    #[test]
    fn test_fractionary_strictly_increasing() {
        let weights: Vec<u32> = DurationSymbol::ALL.iter().map(|d| d.fractionary()).collect();
        assert!(weights.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_duration_millis() {
        assert_eq!(duration_millis("q", 120).unwrap(), 500);
        assert_eq!(duration_millis("e", 120).unwrap(), 250);
        assert_eq!(duration_millis("w", 60).unwrap(), 4000);
        assert_eq!(duration_millis("w", 120).unwrap(), 2000);
        assert_eq!(duration_millis("q", 100).unwrap(), 600);
    }

    #[test]
    fn test_duration_truncates() {
        // 240000 / (7 * 64) = 535.71...
        assert_eq!(duration_millis("sf", 7).unwrap(), 535);
        // 240000 / (1000000 * 64) < 1
        assert_eq!(duration_millis("sf", 1_000_000).unwrap(), 0);
    }

    #[test]
    fn test_invalid_tempo() {
        assert_eq!(duration_millis("q", 0), Err(Error::InvalidTempo(0)));
        assert_eq!(duration_millis("q", -60), Err(Error::InvalidTempo(-60)));
        assert!(Tempo::new(i64::MAX).is_err());
        assert_eq!(Tempo::default().bpm(), 100);
    }

    #[test]
    fn test_unknown_duration() {
        assert_eq!(fractionary_of("x"), Err(Error::UnknownDuration("x".to_string())));
        assert!(duration_millis("Q", 120).is_err());
    }

    #[test]
    fn test_symbol_round_trip() {
        for d in DurationSymbol::ALL {
            assert_eq!(d.symbol().parse::<DurationSymbol>().unwrap(), d);
        }
    }

    #[test]
    fn test_stem_count() {
        assert_eq!(DurationSymbol::Whole.stem_count(), 0);
        assert_eq!(DurationSymbol::Quarter.stem_count(), 0);
        assert_eq!(DurationSymbol::Eighth.stem_count(), 1);
        assert_eq!(DurationSymbol::SixtyFourth.stem_count(), 4);
    }
}
