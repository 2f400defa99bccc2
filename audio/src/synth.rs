//! Waveform synthesizer backend.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::backend::{Silencer, ToneBackend};
use crate::error::{Error, Result};
use crate::portaudio::{self, OutputStream};
use crate::stop::StopToken;
use crate::tone::{SAMPLE_RATE, ToneState};
use crate::waveform::Waveform;

/// A stream rendering a [`ToneState`] until it is closed.
trait ToneStream: Send {
    fn start(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

impl ToneStream for OutputStream {
    fn start(&mut self) -> Result<()> {
        OutputStream::start(self)
    }

    fn close(&mut self) -> Result<()> {
        OutputStream::close(self)
    }
}

/// Audio subsystem the synthesizer opens streams on.
trait AudioDriver: Send {
    fn initialize(&mut self) -> Result<()>;
    fn terminate(&mut self) -> Result<()>;
    fn open_stream(&mut self, state: Arc<ToneState>) -> Result<Box<dyn ToneStream>>;
}

struct PortAudioDriver;

impl AudioDriver for PortAudioDriver {
    fn initialize(&mut self) -> Result<()> {
        portaudio::initialize()
    }

    fn terminate(&mut self) -> Result<()> {
        portaudio::terminate()
    }

    fn open_stream(&mut self, state: Arc<ToneState>) -> Result<Box<dyn ToneStream>> {
        Ok(Box::new(portaudio::open_output(state)?))
    }
}

/// Plays each tone on a fresh PortAudio callback stream.
///
/// Every `emit` runs configure → open → start → sleep → stop/close, so the
/// tone state is never written by the control thread while the callback is
/// reading it.
pub struct Synthesizer {
    driver: Box<dyn AudioDriver>,
    state: Arc<ToneState>,
    stop: StopToken,
    initialized: bool,
    stream: Option<Box<dyn ToneStream>>,
}

impl Synthesizer {
    /// Creates a synthesizer at 48 kHz. PortAudio is initialized on `open`.
    pub fn new(waveform: Waveform, stop: StopToken) -> Self {
        Self::with_driver(Box::new(PortAudioDriver), waveform, stop)
    }

    fn with_driver(driver: Box<dyn AudioDriver>, waveform: Waveform, stop: StopToken) -> Self {
        Self {
            driver,
            state: Arc::new(ToneState::new(waveform, SAMPLE_RATE)),
            stop,
            initialized: false,
            stream: None,
        }
    }

    /// Returns the waveform.
    pub fn waveform(&self) -> Waveform {
        self.state.waveform()
    }

    fn teardown(&mut self) -> Result<()> {
        match self.stream.take() {
            Some(mut stream) => stream.close(),
            None => Ok(()),
        }
    }
}

impl ToneBackend for Synthesizer {
    fn name(&self) -> &'static str {
        "synth"
    }

    fn open(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.driver.initialize()?;
        self.initialized = true;
        debug!("initialized audio ({} wave)", self.state.waveform());
        Ok(())
    }

    fn emit(&mut self, frequency_hz: f64, duration: Duration) -> Result<()> {
        if !self.initialized {
            return Err(Error::AudioInitFailed("audio not initialized".to_string()));
        }
        self.teardown()?;

        self.state.configure(frequency_hz);
        // a stop that raced configure must stay muted
        if self.stop.is_stopped() {
            self.state.mute();
            return Ok(());
        }
        let stream = self.stream.insert(self.driver.open_stream(Arc::clone(&self.state))?);
        if let Err(e) = stream.start() {
            let _ = self.teardown();
            return Err(e);
        }

        self.stop.sleep(duration);
        self.teardown()
    }

    fn silence(&mut self) -> Result<()> {
        self.state.mute();
        self.teardown()
    }

    fn close(&mut self) -> Result<()> {
        if !self.initialized {
            return Ok(());
        }
        if let Err(e) = self.silence() {
            warn!("failed to stop stream before close: {}", e);
        }
        self.initialized = false;
        self.driver.terminate()?;
        debug!("terminated audio");
        Ok(())
    }

    fn silencer(&self) -> Option<Arc<dyn Silencer>> {
        if !self.initialized {
            return None;
        }
        Some(Arc::clone(&self.state) as Arc<dyn Silencer>)
    }
}

impl Drop for Synthesizer {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
