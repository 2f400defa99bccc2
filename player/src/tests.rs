//! Sequencer scenarios against a recording backend.

use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tonebox_audio::{Beeper, Silencer, StopToken, ToneBackend};
use tonebox_music::{Script, frequency_of};

use crate::{Articulation, Error, Flow, NoteEvent, NullRenderer, Outcome, Renderer, Sequencer};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Open,
    Emit(f64, u64),
    Silence,
    Close,
    Interrupted,
}

#[derive(Debug, Clone, Default)]
struct Log(Arc<Mutex<Vec<Call>>>);

impl Log {
    fn push(&self, call: Call) {
        self.0.lock().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.0.lock().clone()
    }

    fn emits(&self) -> Vec<(f64, u64)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Emit(hz, ms) => Some((hz, ms)),
                _ => None,
            })
            .collect()
    }
}

struct LogSilencer(Log);

impl Silencer for LogSilencer {
    fn silence_now(&self) {
        self.0.push(Call::Interrupted);
    }
}

struct RecordingBackend {
    log: Log,
    stop: StopToken,
    sleep: bool,
    fail_open: bool,
    fail_emit_at: Option<usize>,
    emitted: usize,
    silencer: Arc<LogSilencer>,
}

impl RecordingBackend {
    fn new(log: &Log, stop: &StopToken) -> Self {
        Self {
            log: log.clone(),
            stop: stop.clone(),
            sleep: false,
            fail_open: false,
            fail_emit_at: None,
            emitted: 0,
            silencer: Arc::new(LogSilencer(log.clone())),
        }
    }

    fn sleeping(mut self) -> Self {
        self.sleep = true;
        self
    }
}

impl ToneBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn open(&mut self) -> tonebox_audio::Result<()> {
        if self.fail_open {
            return Err(tonebox_audio::Error::DeviceUnavailable {
                path: "/dev/null/spkr".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            });
        }
        self.log.push(Call::Open);
        Ok(())
    }

    fn emit(&mut self, frequency_hz: f64, duration: Duration) -> tonebox_audio::Result<()> {
        if self.fail_emit_at == Some(self.emitted) {
            return Err(tonebox_audio::Error::DeviceWriteFailed(io::Error::other("boom")));
        }
        self.emitted += 1;
        self.log.push(Call::Emit(frequency_hz, duration.as_millis() as u64));
        if self.sleep {
            self.stop.sleep(duration);
        }
        Ok(())
    }

    fn silence(&mut self) -> tonebox_audio::Result<()> {
        self.log.push(Call::Silence);
        Ok(())
    }

    fn close(&mut self) -> tonebox_audio::Result<()> {
        self.log.push(Call::Close);
        Ok(())
    }

    fn silencer(&self) -> Option<Arc<dyn Silencer>> {
        Some(Arc::clone(&self.silencer) as Arc<dyn Silencer>)
    }
}

#[derive(Clone, Default)]
struct CollectingRenderer {
    events: Arc<Mutex<Vec<NoteEvent>>>,
    quit_after: Option<usize>,
    finished: Arc<Mutex<bool>>,
}

impl Renderer for CollectingRenderer {
    fn note(&mut self, event: &NoteEvent) -> Flow {
        let mut events = self.events.lock();
        events.push(event.clone());
        match self.quit_after {
            Some(n) if events.len() >= n => Flow::Quit,
            _ => Flow::Continue,
        }
    }

    fn finish(&mut self) {
        *self.finished.lock() = true;
    }
}

fn hz(symbol: &str, octave: u32) -> f64 {
    frequency_of(symbol, octave).unwrap()
}

fn script(text: &str) -> Script<&[u8]> {
    Script::new(text.as_bytes())
}

#[test]
fn test_notes_emitted_in_script_order() {
    let log = Log::default();
    let stop = StopToken::new();
    let seq = Sequencer::new(RecordingBackend::new(&log, &stop), NullRenderer, stop).unwrap();

    let summary = seq.run(script("C 4 q D 4 q E 4 q A 4 w")).unwrap();
    assert_eq!(summary.outcome, Outcome::Completed);
    assert_eq!(summary.notes, 4);
    assert_eq!(summary.pauses, 0);

    assert_eq!(
        log.calls(),
        vec![
            Call::Open,
            Call::Emit(hz("C", 4), 600),
            Call::Emit(hz("D", 4), 600),
            Call::Emit(hz("E", 4), 600),
            Call::Emit(440.0, 2400),
            Call::Silence,
            Call::Close,
        ]
    );
}

#[test]
fn test_emit_count_matches_note_count() {
    let pitches = ["C", "Db", "E", "F#", "Ab", "B", "Bb", "G"];
    let text: Vec<String> = (0..50)
        .map(|i| format!("{} {} sf", pitches[i % pitches.len()], i % 8))
        .collect();
    let log = Log::default();
    let stop = StopToken::new();
    let seq = Sequencer::new(RecordingBackend::new(&log, &stop), NullRenderer, stop).unwrap();

    let summary = seq.run(script(&text.join("\n"))).unwrap();
    assert_eq!(summary.notes, 50);

    let emits = log.emits();
    assert_eq!(emits.len(), 50);
    for (i, (freq, _)) in emits.iter().enumerate() {
        assert_eq!(*freq, hz(pitches[i % pitches.len()], (i % 8) as u32));
    }
}

#[test]
fn test_tempo_changes_apply_to_following_notes() {
    let log = Log::default();
    let stop = StopToken::new();
    let seq = Sequencer::new(RecordingBackend::new(&log, &stop), NullRenderer, stop).unwrap();

    seq.run(script("A 4 q bpm 120 A 4 q A 4 e bpm 60 A 4 w")).unwrap();
    let millis: Vec<u64> = log.emits().into_iter().map(|(_, ms)| ms).collect();
    assert_eq!(millis, vec![600, 500, 250, 4000]);
}

#[test]
fn test_pause_is_silent() {
    let log = Log::default();
    let stop = StopToken::new();
    let seq = Sequencer::new(RecordingBackend::new(&log, &stop), NullRenderer, stop).unwrap();

    let start = Instant::now();
    let summary = seq.run(script("bpm 6000 P h A 4 q")).unwrap();
    // h at 6000 bpm = 20ms
    assert!(start.elapsed() >= Duration::from_millis(20));
    assert_eq!(summary.pauses, 1);
    assert_eq!(summary.notes, 1);
    assert_eq!(log.emits(), vec![(440.0, 10)]);
}

#[test]
fn test_missing_tempo_value_is_malformed() {
    let log = Log::default();
    let stop = StopToken::new();
    let seq = Sequencer::new(RecordingBackend::new(&log, &stop), NullRenderer, stop).unwrap();

    let err = seq.run(script("bpm")).unwrap_err();
    assert!(matches!(
        err,
        Error::Music(tonebox_music::Error::MalformedScript { .. })
    ));
    assert_eq!(log.calls(), vec![Call::Open, Call::Silence, Call::Close]);
}

#[test]
fn test_script_error_stops_playback() {
    let log = Log::default();
    let stop = StopToken::new();
    let seq = Sequencer::new(RecordingBackend::new(&log, &stop), NullRenderer, stop).unwrap();

    let err = seq.run(script("C 4 q X 4 q D 4 q")).unwrap_err();
    assert!(matches!(
        err,
        Error::Music(tonebox_music::Error::UnknownPitch(ref p)) if p == "X"
    ));
    assert_eq!(
        log.calls(),
        vec![Call::Open, Call::Emit(hz("C", 4), 600), Call::Silence, Call::Close]
    );
}

#[test]
fn test_backend_error_aborts_run() {
    let log = Log::default();
    let stop = StopToken::new();
    let mut backend = RecordingBackend::new(&log, &stop);
    backend.fail_emit_at = Some(1);
    let seq = Sequencer::new(backend, NullRenderer, stop).unwrap();

    let err = seq.run(script("C 4 q D 4 q E 4 q")).unwrap_err();
    assert!(matches!(
        err,
        Error::Audio(tonebox_audio::Error::DeviceWriteFailed(_))
    ));
    assert_eq!(
        log.calls(),
        vec![Call::Open, Call::Emit(hz("C", 4), 600), Call::Silence, Call::Close]
    );
}

#[test]
fn test_open_failure() {
    let log = Log::default();
    let stop = StopToken::new();
    let mut backend = RecordingBackend::new(&log, &stop);
    backend.fail_open = true;

    let err = Sequencer::new(backend, NullRenderer, stop).err().unwrap();
    assert!(matches!(
        err,
        Error::Audio(tonebox_audio::Error::DeviceUnavailable { .. })
    ));
    assert!(log.calls().is_empty());
}

#[test]
fn test_renderer_quit() {
    let log = Log::default();
    let stop = StopToken::new();
    let renderer = CollectingRenderer {
        quit_after: Some(2),
        ..Default::default()
    };
    let seq = Sequencer::new(RecordingBackend::new(&log, &stop), renderer.clone(), stop).unwrap();

    let summary = seq.run(script("C 4 q D 4 q E 4 q F 4 q")).unwrap();
    assert_eq!(summary.outcome, Outcome::Quit);
    assert_eq!(summary.notes, 2);
    assert_eq!(log.emits().len(), 2);
    assert_eq!(log.calls().last(), Some(&Call::Close));
    assert!(*renderer.finished.lock());
}

#[test]
fn test_renderer_receives_note_events() {
    let log = Log::default();
    let stop = StopToken::new();
    let renderer = CollectingRenderer::default();
    let seq = Sequencer::new(RecordingBackend::new(&log, &stop), renderer.clone(), stop).unwrap();

    seq.run(script("Db 3 e P q C 4 sf bpm 120 A 4 q")).unwrap();

    let events = renderer.events.lock().clone();
    assert_eq!(events.len(), 3);

    assert_eq!(events[0].pitch.symbol(), "Db");
    assert_eq!(events[0].octave, 3);
    assert_eq!(events[0].fractionary, 8);
    assert_eq!(events[0].stem_count, 1);
    assert_eq!(events[0].midi_number, 49);
    assert_eq!(events[0].duration_ms, 300);
    assert_eq!(events[0].counter, 1);

    assert_eq!(events[1].midi_number, 60);
    assert_eq!(events[1].fractionary, 64);
    assert_eq!(events[1].counter, 2);

    assert_eq!(events[2].midi_number, 69);
    assert_eq!(events[2].frequency_hz, 440.0);
    assert_eq!(events[2].duration_ms, 500);
    assert_eq!(events[2].counter, 3);
}

#[test]
fn test_huge_octave_plays_without_overflow() {
    let log = Log::default();
    let stop = StopToken::new();
    let renderer = CollectingRenderer::default();
    let seq = Sequencer::new(RecordingBackend::new(&log, &stop), renderer.clone(), stop).unwrap();

    let summary = seq.run(script("C 400000000 q A 4 q")).unwrap();
    assert_eq!(summary.outcome, Outcome::Completed);
    assert_eq!(summary.notes, 2);

    let emits = log.emits();
    assert!(emits[0].0.is_infinite() && emits[0].0 > 0.0);
    assert_eq!(emits[1], (440.0, 600));

    let events = renderer.events.lock().clone();
    assert_eq!(events[0].midi_number, 4_800_000_012);
    assert_eq!(events[0].octave, 400_000_000);
}

#[test]
fn test_note_event_json() {
    let renderer = CollectingRenderer::default();
    let log = Log::default();
    let stop = StopToken::new();
    let seq = Sequencer::new(RecordingBackend::new(&log, &stop), renderer.clone(), stop).unwrap();
    seq.run(script("Bb 2 h")).unwrap();

    let event = renderer.events.lock()[0].clone();
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["pitch"], "Bb");
    assert_eq!(json["duration"], "half");
    assert_eq!(json["midiNumber"], 46);
    assert_eq!(json["stemCount"], 0);
    assert_eq!(json["durationMs"], 1200);
}

#[test]
fn test_detached_articulation_adds_gap() {
    let log = Log::default();
    let stop = StopToken::new();
    let seq = Sequencer::new(RecordingBackend::new(&log, &stop), NullRenderer, stop)
        .unwrap()
        .with_articulation(Articulation::Detached);

    let start = Instant::now();
    // h at 6000 bpm = 20ms, two gaps
    let summary = seq.run(script("bpm 6000 A 4 h A 4 h")).unwrap();
    assert!(start.elapsed() >= Duration::from_millis(40));
    assert_eq!(summary.notes, 2);
    assert_eq!(log.emits().len(), 2);
}

#[test]
fn test_interrupt_mid_emit() {
    let log = Log::default();
    let stop = StopToken::new();
    let backend = RecordingBackend::new(&log, &stop).sleeping();
    let seq = Sequencer::new(backend, NullRenderer, stop).unwrap();
    let interrupter = seq.interrupter();

    // a whole note at 1 bpm lasts four minutes
    let player = thread::spawn(move || seq.run(script("bpm 1 A 4 w A 4 w")));
    thread::sleep(Duration::from_millis(50));
    interrupter.interrupt();

    let summary = player.join().unwrap().unwrap();
    assert_eq!(summary.outcome, Outcome::Interrupted);
    assert_eq!(summary.notes, 1);
    assert_eq!(
        log.calls(),
        vec![
            Call::Open,
            Call::Emit(440.0, 240_000),
            Call::Interrupted,
            Call::Silence,
            Call::Close,
        ]
    );
}

#[test]
fn test_interrupt_after_run_is_harmless() {
    let log = Log::default();
    let stop = StopToken::new();
    let seq = Sequencer::new(RecordingBackend::new(&log, &stop), NullRenderer, stop).unwrap();
    let interrupter = seq.interrupter();

    seq.run(script("A 4 q")).unwrap();
    interrupter.interrupt();

    assert!(!log.calls().contains(&Call::Interrupted));
}

#[test]
fn test_interrupt_silences_beeper() {
    let device = tempfile::NamedTempFile::new().unwrap();
    let stop = StopToken::new();
    let beeper = Beeper::new(device.path(), stop.clone());
    let seq = Sequencer::new(beeper, NullRenderer, stop).unwrap();
    let interrupter = seq.interrupter();

    let player = thread::spawn(move || seq.run(script("bpm 1 A 4 w")));
    thread::sleep(Duration::from_millis(50));
    interrupter.interrupt();

    let summary = player.join().unwrap().unwrap();
    assert_eq!(summary.outcome, Outcome::Interrupted);

    let data = std::fs::read(device.path()).unwrap();
    let values: Vec<i32> = data
        .chunks(tonebox_audio::beeper::EVENT_SIZE)
        .map(|c| tonebox_audio::beeper::ToneEvent::decode(c).unwrap().value)
        .collect();
    assert_eq!(values[0], 440);
    assert!(values.len() >= 3);
    assert!(values[1..].iter().all(|v| *v == 0));
}
