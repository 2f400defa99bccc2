//! PC speaker tone device.
//!
//! The Linux `pcspkr` driver exposes the speaker as an input device that
//! accepts `EV_SND`/`SND_TONE` events. Writing an event with a non-zero value
//! starts a square tone at that many Hz; a value of 0 stops it. The hardware
//! has no notion of duration, so [`Beeper::emit`] sleeps between the two
//! writes.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::{Buf, BufMut};
use tracing::{debug, warn};

use crate::backend::{Silencer, ToneBackend};
use crate::error::{Error, Result};
use crate::stop::StopToken;

/// Default PC speaker event device.
pub const DEFAULT_DEVICE_PATH: &str = "/dev/input/by-path/platform-pcspkr-event-spkr";

/// Sound event type (`EV_SND`).
pub const EV_SND: u16 = 0x12;
/// Tone event code (`SND_TONE`).
pub const SND_TONE: u16 = 0x02;
/// Size of `struct input_event` on 64-bit Linux.
pub const EVENT_SIZE: usize = 24;

/// A `struct input_event` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneEvent {
    pub sec: i64,
    pub usec: i64,
    pub kind: u16,
    pub code: u16,
    pub value: i32,
}

impl ToneEvent {
    /// Creates a tone event stamped with the current time. `hz == 0` is silence.
    pub fn tone(hz: i32) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            sec: now.as_secs() as i64,
            usec: now.subsec_micros() as i64,
            kind: EV_SND,
            code: SND_TONE,
            value: hz,
        }
    }

    /// Encodes the record in native byte order without allocating.
    pub fn encode(&self) -> [u8; EVENT_SIZE] {
        let mut buf = [0u8; EVENT_SIZE];
        let mut w = &mut buf[..];
        w.put_i64_ne(self.sec);
        w.put_i64_ne(self.usec);
        w.put_u16_ne(self.kind);
        w.put_u16_ne(self.code);
        w.put_i32_ne(self.value);
        buf
    }

    /// Decodes one record. Returns `None` if `data` is too short.
    pub fn decode(mut data: &[u8]) -> Option<Self> {
        if data.len() < EVENT_SIZE {
            return None;
        }
        Some(Self {
            sec: data.get_i64_ne(),
            usec: data.get_i64_ne(),
            kind: data.get_u16_ne(),
            code: data.get_u16_ne(),
            value: data.get_i32_ne(),
        })
    }
}

/// Converts a frequency to the driver's integer Hz, truncating.
fn native_tone(frequency_hz: f64) -> i32 {
    frequency_hz as i32
}

/// Open device file. Shared with the interrupt path through [`Silencer`].
#[derive(Debug)]
pub struct BeeperHandle {
    file: File,
}

impl BeeperHandle {
    /// Writes a single tone record.
    pub fn send_tone(&self, hz: i32) -> Result<()> {
        let record = ToneEvent::tone(hz).encode();
        (&self.file)
            .write_all(&record)
            .map_err(Error::DeviceWriteFailed)
    }
}

impl Silencer for BeeperHandle {
    fn silence_now(&self) {
        if let Err(e) = self.send_tone(0) {
            warn!("failed to silence beeper: {}", e);
        }
    }
}

/// Discrete tone device backed by the PC speaker.
pub struct Beeper {
    path: PathBuf,
    stop: StopToken,
    handle: Option<Arc<BeeperHandle>>,
}

impl Beeper {
    /// Creates a closed beeper for the given event device.
    pub fn new(path: impl AsRef<Path>, stop: StopToken) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            stop,
            handle: None,
        }
    }

    /// Returns the device path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true while the device is open.
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    fn handle(&self) -> Result<&Arc<BeeperHandle>> {
        self.handle.as_ref().ok_or_else(|| Error::DeviceUnavailable {
            path: self.path.clone(),
            source: io::Error::new(io::ErrorKind::NotConnected, "device not open"),
        })
    }
}

impl ToneBackend for Beeper {
    fn name(&self) -> &'static str {
        "beeper"
    }

    fn open(&mut self) -> Result<()> {
        if self.handle.is_some() {
            return Ok(());
        }
        let file = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .map_err(|source| Error::DeviceUnavailable {
                path: self.path.clone(),
                source,
            })?;
        debug!("opened beeper {}", self.path.display());
        self.handle = Some(Arc::new(BeeperHandle { file }));
        Ok(())
    }

    fn emit(&mut self, frequency_hz: f64, duration: Duration) -> Result<()> {
        let handle = self.handle()?;
        if self.stop.is_stopped() {
            return Ok(());
        }
        handle.send_tone(native_tone(frequency_hz))?;
        self.stop.sleep(duration);
        handle.send_tone(0)
    }

    fn silence(&mut self) -> Result<()> {
        match &self.handle {
            Some(handle) => handle.send_tone(0),
            None => Ok(()),
        }
    }

    fn close(&mut self) -> Result<()> {
        if self.handle.is_none() {
            return Ok(());
        }
        if let Err(e) = self.silence() {
            warn!("failed to silence beeper before close: {}", e);
        }
        self.handle = None;
        debug!("closed beeper {}", self.path.display());
        Ok(())
    }

    fn silencer(&self) -> Option<Arc<dyn Silencer>> {
        self.handle
            .as_ref()
            .map(|h| Arc::clone(h) as Arc<dyn Silencer>)
    }
}

impl Drop for Beeper {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
