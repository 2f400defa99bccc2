//! Asynchronous interruption of a playback run.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tonebox_audio::{Silencer, StopToken};
use tracing::debug;

/// Stops a running [`Sequencer`](crate::Sequencer) from another thread.
///
/// Holds only a weak reference to the backend's [`Silencer`]. The sequencer
/// attaches it when it starts and detaches it when it finishes, so an
/// interrupt arriving after the backend is closed touches nothing.
pub struct Interrupter {
    stop: StopToken,
    target: Mutex<Option<Weak<dyn Silencer>>>,
}

impl Interrupter {
    /// Creates an interrupter for runs sleeping on `stop`.
    pub fn new(stop: StopToken) -> Self {
        Self {
            stop,
            target: Mutex::new(None),
        }
    }

    /// Requests a stop, wakes any sleep in progress and mutes the device.
    pub fn interrupt(&self) {
        debug!("interrupt requested");
        self.stop.request_stop();
        let target = self.target.lock().as_ref().and_then(Weak::upgrade);
        if let Some(silencer) = target {
            silencer.silence_now();
        }
    }

    /// Returns true once [`Interrupter::interrupt`] has been called.
    pub fn is_interrupted(&self) -> bool {
        self.stop.is_stopped()
    }

    pub(crate) fn attach(&self, silencer: Option<&Arc<dyn Silencer>>) {
        *self.target.lock() = silencer.map(Arc::downgrade);
    }

    pub(crate) fn detach(&self) {
        *self.target.lock() = None;
    }
}
