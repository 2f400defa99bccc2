//! CLI utilities for tonebox.
//!
//! Configuration loading and console output shared by the `tonebox` binary.

pub mod config;
pub mod output;

pub use config::{BackendKind, Config, load_config};
pub use output::{ConsoleRenderer, OutputFormat};
