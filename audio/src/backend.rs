//! The tone backend contract.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;

/// Something that produces one tone at a time.
///
/// `emit` is synchronous: it returns once the tone has sounded for the full
/// duration (or the run was interrupted), so calls never overlap. The
/// control thread is the only caller of these methods.
pub trait ToneBackend: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Acquires the device. Calling it again while open is a no-op.
    fn open(&mut self) -> Result<()>;

    /// Sounds `frequency_hz` for `duration`, then falls silent.
    fn emit(&mut self, frequency_hz: f64, duration: Duration) -> Result<()>;

    /// Stops any sound. A no-op when nothing is playing or the device is closed.
    fn silence(&mut self) -> Result<()>;

    /// Silences and releases the device. Safe to call more than once.
    fn close(&mut self) -> Result<()>;

    /// Returns a handle that can mute the device from another thread.
    ///
    /// `None` while the device is closed.
    fn silencer(&self) -> Option<Arc<dyn Silencer>>;
}

/// Handle-only muting used by the interrupt path.
///
/// Implementations must not block on, or allocate under, state owned by the
/// control thread. Failures are logged rather than returned.
pub trait Silencer: Send + Sync {
    fn silence_now(&self);
}

impl<T: ToneBackend + ?Sized> ToneBackend for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn emit(&mut self, frequency_hz: f64, duration: Duration) -> Result<()> {
        (**self).emit(frequency_hz, duration)
    }

    fn silence(&mut self) -> Result<()> {
        (**self).silence()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn silencer(&self) -> Option<Arc<dyn Silencer>> {
        (**self).silencer()
    }
}
