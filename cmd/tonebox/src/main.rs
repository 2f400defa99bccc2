//! tonebox - play note scripts on the PC speaker or the sound card.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tonebox_audio::{Beeper, StopToken, ToneBackend, Waveform};
use tonebox_cli::{BackendKind, ConsoleRenderer, load_config};
use tonebox_music::Script;
use tonebox_player::{Outcome, Sequencer};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod settings;

use settings::Settings;

/// Exit status after Ctrl-C, as a shell reports SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

/// tonebox - play note scripts.
///
/// A script is a whitespace-separated list of commands:
///   - `<pitch> <octave> <duration>` plays a note, e.g. `A 4 q`
///   - `P <duration>` rests, e.g. `P h`
///   - `bpm <n>` sets the tempo (default 100)
///
/// Durations: w h q e s t sf. Pitches: C Db C# D Eb D# E F Gb F# G Ab G# A Bb A# B.
#[derive(Parser, Debug)]
#[command(name = "tonebox")]
#[command(about = "Play note scripts on the PC speaker or the sound card")]
#[command(version)]
pub struct Cli {
    /// Script file to play
    pub script: PathBuf,

    /// Waveform for the synthesizer: Q (square), S (sine), W (sawtooth), T (triangle)
    pub waveform: Option<Waveform>,

    /// Tone backend: beeper or synth
    #[arg(long)]
    pub backend: Option<BackendKind>,

    /// PC speaker input device (beeper only)
    #[arg(long)]
    pub device: Option<PathBuf>,

    /// Rest for the length of each note after playing it
    #[arg(long)]
    pub detached: bool,

    /// Stop after this many notes
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: Option<u32>,

    /// Print notes as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Do not print notes
    #[arg(short = 'q', long, conflicts_with = "json")]
    pub quiet: bool,

    /// Config file (default is ~/.tonebox/config.yaml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;
    if let Some(path) = config.path() {
        debug!("loaded config {}", path.display());
    }
    let settings = Settings::resolve(cli, &config);
    debug!("settings: {:?}", settings);

    let file = File::open(&cli.script)
        .with_context(|| format!("failed to open script {}", cli.script.display()))?;
    let script = Script::new(BufReader::new(file));

    let stop = StopToken::new();
    let backend = build_backend(&settings, stop.clone())?;
    let renderer = ConsoleRenderer::stdout(settings.format).with_limit(settings.limit);
    let sequencer = Sequencer::new(backend, renderer, stop)
        .with_context(|| format!("failed to open {} backend", settings.backend))?
        .with_articulation(settings.articulation);
    let interrupter = sequencer.interrupter();

    let mut playback = tokio::task::spawn_blocking(move || sequencer.run(script));

    let finished = tokio::select! {
        joined = &mut playback => Some(joined),
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for ctrl-c")?;
            info!("interrupted, silencing");
            interrupter.interrupt();
            None
        }
    };
    let joined = match finished {
        Some(joined) => joined,
        None => playback.await,
    };
    let summary = joined.context("playback task failed")??;

    debug!(
        "{:?} after {} notes and {} pauses",
        summary.outcome, summary.notes, summary.pauses
    );
    Ok(match summary.outcome {
        Outcome::Interrupted => ExitCode::from(EXIT_INTERRUPTED),
        Outcome::Completed | Outcome::Quit => ExitCode::SUCCESS,
    })
}

fn build_backend(settings: &Settings, stop: StopToken) -> anyhow::Result<Box<dyn ToneBackend>> {
    match settings.backend {
        BackendKind::Beeper => Ok(Box::new(Beeper::new(&settings.device, stop))),
        #[cfg(feature = "portaudio")]
        BackendKind::Synth => Ok(Box::new(tonebox_audio::Synthesizer::new(
            settings.waveform,
            stop,
        ))),
        #[cfg(not(feature = "portaudio"))]
        BackendKind::Synth => anyhow::bail!("synth backend requires the portaudio feature"),
    }
}
