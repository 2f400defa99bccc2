//! State shared between the control thread and the audio callback.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::atomic::AtomicF64;
use crate::backend::Silencer;
use crate::waveform::Waveform;

/// Output sample rate of the synthesizer.
pub const SAMPLE_RATE: f64 = 48000.0;

/// Phase accumulator and frequency read by the audio callback.
///
/// The control thread calls [`ToneState::configure`] only while no stream is
/// running; the callback then owns the phase until the stream is stopped.
/// The only cross-thread write during playback is the `muted` flag, which
/// the interrupt path sets.
#[derive(Debug)]
pub struct ToneState {
    waveform: Waveform,
    sample_rate: f64,
    phase: AtomicF64,
    frequency: AtomicF64,
    muted: AtomicBool,
}

impl ToneState {
    /// Creates a silent state for the given waveform.
    pub fn new(waveform: Waveform, sample_rate: f64) -> Self {
        Self {
            waveform,
            sample_rate,
            phase: AtomicF64::new(0.0),
            frequency: AtomicF64::new(0.0),
            muted: AtomicBool::new(false),
        }
    }

    /// Returns the waveform.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Returns the sample rate.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Resets the phase and sets the next tone. Must not be called while a
    /// stream is running.
    pub fn configure(&self, frequency_hz: f64) {
        self.phase.store(0.0, Ordering::Relaxed);
        self.frequency.store(frequency_hz, Ordering::Relaxed);
        self.muted.store(false, Ordering::Release);
    }

    /// Makes the callback output silence until the next `configure`.
    pub fn mute(&self) {
        self.muted.store(true, Ordering::Release);
    }

    /// Returns true if muted.
    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Acquire)
    }

    /// Returns the configured frequency in Hz.
    pub fn frequency(&self) -> f64 {
        self.frequency.load(Ordering::Relaxed)
    }

    /// Returns the current phase in [0, 1).
    pub fn phase(&self) -> f64 {
        self.phase.load(Ordering::Relaxed)
    }

    /// Fills `out` with mono samples and advances the phase.
    ///
    /// Called from the real-time thread: no locks, no allocation.
    pub fn render(&self, out: &mut [f32]) {
        if self.is_muted() {
            out.fill(0.0);
            return;
        }
        let step = self.frequency.load(Ordering::Relaxed) / self.sample_rate;
        let mut phase = self.phase.load(Ordering::Relaxed);
        for sample in out.iter_mut() {
            *sample = self.waveform.sample(phase) as f32;
            phase += step;
            if phase >= 1.0 {
                phase = phase.fract();
            }
        }
        self.phase.store(phase, Ordering::Relaxed);
    }
}

impl Silencer for ToneState {
    fn silence_now(&self) {
        self.mute();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_advances_phase() {
        let state = ToneState::new(Waveform::Square, SAMPLE_RATE);
        state.configure(12000.0);

        let mut out = [0.0f32; 4];
        state.render(&mut out);
        // step = 0.25: phases 0, 0.25, 0.5, 0.75
        assert_eq!(out, [1.0, 1.0, -1.0, -1.0]);
        assert_eq!(state.phase(), 0.0);

        let mut out = [0.0f32; 2];
        state.render(&mut out);
        assert_eq!(out, [1.0, 1.0]);
        assert_eq!(state.phase(), 0.5);
    }

    #[test]
    fn test_phase_stays_in_unit_interval() {
        let state = ToneState::new(Waveform::Sine, SAMPLE_RATE);
        state.configure(440.0);
        let mut out = [0.0f32; 4096];
        for _ in 0..20 {
            state.render(&mut out);
            let p = state.phase();
            assert!((0.0..1.0).contains(&p), "phase {}", p);
        }
        assert!(out.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn test_configure_resets_phase() {
        let state = ToneState::new(Waveform::Triangle, SAMPLE_RATE);
        state.configure(1000.0);
        let mut out = [0.0f32; 7];
        state.render(&mut out);
        assert!(state.phase() > 0.0);

        state.configure(500.0);
        assert_eq!(state.phase(), 0.0);
    }

    #[test]
    fn test_silencer_mutes_output() {
        let state = ToneState::new(Waveform::Square, SAMPLE_RATE);
        state.configure(440.0);

        let silencer: &dyn Silencer = &state;
        silencer.silence_now();
        assert!(state.is_muted());

        let mut out = [0.5f32; 64];
        state.render(&mut out);
        assert!(out.iter().all(|s| *s == 0.0));

        state.configure(440.0);
        assert!(!state.is_muted());
    }
}
