//! Callback-driven audio output via PortAudio.
//!
//! - `initialize`/`terminate` wrap `Pa_Initialize`/`Pa_Terminate`; PortAudio
//!   reference-counts them, so every successful `initialize` needs one
//!   `terminate`
//! - [`OutputStream`] is a mono float32 stream whose samples are produced on
//!   PortAudio's thread by [`ToneState::render`]
//! - Links against the system portaudio library
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tonebox_audio::portaudio;
//! use tonebox_audio::{ToneState, Waveform};
//!
//! portaudio::initialize()?;
//! let state = Arc::new(ToneState::new(Waveform::Sine, 48000.0));
//! state.configure(440.0);
//! let mut stream = portaudio::open_output(state)?;
//! stream.start()?;
//! std::thread::sleep(std::time::Duration::from_millis(500));
//! stream.close()?;
//! portaudio::terminate()?;
//! ```

pub(crate) mod ffi;

use std::ffi::CStr;
use std::os::raw::{c_int, c_ulong, c_void};
use std::ptr;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::tone::ToneState;

fn pa_error_string(code: ffi::PaError) -> String {
    unsafe {
        let ptr = ffi::Pa_GetErrorText(code);
        if ptr.is_null() {
            return format!("portaudio error {}", code);
        }
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

fn pa_check(code: ffi::PaError) -> std::result::Result<(), String> {
    if code == ffi::PA_NO_ERROR {
        Ok(())
    } else {
        Err(pa_error_string(code))
    }
}

/// Initializes PortAudio.
pub fn initialize() -> Result<()> {
    pa_check(unsafe { ffi::Pa_Initialize() }).map_err(Error::AudioInitFailed)
}

/// Releases one PortAudio initialization.
pub fn terminate() -> Result<()> {
    pa_check(unsafe { ffi::Pa_Terminate() }).map_err(Error::StreamTeardownFailed)
}

/// Information about the output device.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub index: usize,
    pub name: String,
    pub max_output_channels: u32,
    pub default_low_output_latency: f64,
    pub default_sample_rate: f64,
}

/// Returns the default output device, if there is one.
///
/// PortAudio must be initialized.
pub fn default_output_device() -> Option<DeviceInfo> {
    let idx = unsafe { ffi::Pa_GetDefaultOutputDevice() };
    if idx == ffi::PA_NO_DEVICE {
        return None;
    }
    let info = unsafe { ffi::Pa_GetDeviceInfo(idx) };
    if info.is_null() {
        return None;
    }
    let info = unsafe { &*info };
    let name = unsafe { CStr::from_ptr(info.name) }
        .to_string_lossy()
        .into_owned();
    Some(DeviceInfo {
        index: idx as usize,
        name,
        max_output_channels: info.max_output_channels as u32,
        default_low_output_latency: info.default_low_output_latency,
        default_sample_rate: info.default_sample_rate,
    })
}

/// Runs on PortAudio's real-time thread.
unsafe extern "C" fn render_callback(
    _input: *const c_void,
    output: *mut c_void,
    frame_count: c_ulong,
    _time_info: *const ffi::PaStreamCallbackTimeInfo,
    _status_flags: ffi::PaStreamCallbackFlags,
    user_data: *mut c_void,
) -> c_int {
    // user_data is the ToneState held by the OutputStream, which outlives
    // the stream; the output buffer holds frame_count mono f32 samples.
    let state = unsafe { &*(user_data as *const ToneState) };
    let out = unsafe { std::slice::from_raw_parts_mut(output as *mut f32, frame_count as usize) };
    state.render(out);
    ffi::PA_CONTINUE
}

/// A mono output stream rendering a [`ToneState`].
pub struct OutputStream {
    pa_stream: *mut c_void,
    state: Arc<ToneState>,
    closed: bool,
}

// The raw stream pointer is only touched by the thread that owns the
// OutputStream; the callback reaches the ToneState through atomics.
unsafe impl Send for OutputStream {}

impl OutputStream {
    /// Starts the stream; the callback begins running.
    pub fn start(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::StreamOpenFailed("stream closed".to_string()));
        }
        pa_check(unsafe { ffi::Pa_StartStream(self.pa_stream) }).map_err(Error::StreamOpenFailed)
    }

    /// Stops and closes the stream.
    ///
    /// Both steps are always attempted; the first failure is returned.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let stopped = pa_check(unsafe { ffi::Pa_StopStream(self.pa_stream) });
        let closed = pa_check(unsafe { ffi::Pa_CloseStream(self.pa_stream) });
        debug!("closed output stream");
        stopped.and(closed).map_err(Error::StreamTeardownFailed)
    }

    /// Returns the tone state rendered by this stream.
    pub fn state(&self) -> &Arc<ToneState> {
        &self.state
    }
}

impl Drop for OutputStream {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Opens a mono float32 stream on the default output device.
///
/// Uses the device's low output latency and lets PortAudio pick the buffer
/// size. The stream is not started.
pub fn open_output(state: Arc<ToneState>) -> Result<OutputStream> {
    let device = default_output_device().ok_or(Error::NoOutputDevice)?;
    debug!(
        "opening output on '{}' at {} Hz (latency {:.4}s)",
        device.name,
        state.sample_rate(),
        device.default_low_output_latency
    );

    let output_params = ffi::PaStreamParameters {
        device: device.index as ffi::PaDeviceIndex,
        channel_count: 1,
        sample_format: ffi::PA_FLOAT32,
        suggested_latency: device.default_low_output_latency,
        host_api_specific_stream_info: ptr::null_mut(),
    };

    let mut pa_stream: *mut c_void = ptr::null_mut();
    pa_check(unsafe {
        ffi::Pa_OpenStream(
            &mut pa_stream,
            ptr::null(),
            &output_params,
            state.sample_rate(),
            ffi::PA_FRAMES_PER_BUFFER_UNSPECIFIED,
            ffi::PA_CLIP_OFF,
            Some(render_callback),
            Arc::as_ptr(&state) as *mut c_void,
        )
    })
    .map_err(Error::StreamOpenFailed)?;

    Ok(OutputStream {
        pa_stream,
        state,
        closed: false,
    })
}
