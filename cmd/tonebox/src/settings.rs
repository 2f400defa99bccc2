//! Merges command-line flags with the config file.

use std::path::PathBuf;

use tonebox_audio::Waveform;
use tonebox_audio::beeper::DEFAULT_DEVICE_PATH;
use tonebox_cli::{BackendKind, Config, OutputFormat};
use tonebox_player::Articulation;

use crate::Cli;

/// Effective playback settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub backend: BackendKind,
    pub waveform: Waveform,
    pub device: PathBuf,
    pub articulation: Articulation,
    pub format: OutputFormat,
    pub limit: Option<u32>,
}

impl Settings {
    /// Flags win over the config file, which wins over built-in defaults.
    ///
    /// A waveform argument implies the synthesizer unless `--backend` says
    /// otherwise.
    pub fn resolve(cli: &Cli, config: &Config) -> Self {
        let backend = cli
            .backend
            .or(cli.waveform.map(|_| BackendKind::Synth))
            .or(config.backend)
            .unwrap_or_default();

        let articulation = if cli.detached {
            Articulation::Detached
        } else {
            config.articulation.unwrap_or_default()
        };

        let format = if cli.quiet {
            OutputFormat::Quiet
        } else if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };

        Self {
            backend,
            waveform: cli.waveform.or(config.waveform).unwrap_or_default(),
            device: cli
                .device
                .clone()
                .or_else(|| config.device.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DEVICE_PATH)),
            articulation,
            format,
            limit: cli.limit,
        }
    }
}
