//! Layered configuration loading for tunechain.
//!
//! # Usage
//!
//! ```rust,no_run
//! use tuneconf::TuneConfig;
//!
//! let config = TuneConfig::load().expect("Failed to load config");
//! println!("corpus: {}", config.paths.corpus.display());
//! println!("length: {}", config.generate.length);
//! ```
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/tunechain/config.toml` (system)
//! 2. `~/.config/tunechain/config.toml` (user)
//! 3. `./tunechain.toml` (local override, replaced by `--config`)
//! 4. Environment variables (`TUNECHAIN_*`, `RUST_LOG`)
//!
//! # Example Config
//!
//! ```toml
//! [paths]
//! corpus = "~/music/pitches.csv"
//! output_dir = "~/music/out"
//!
//! [generate]
//! length = 100
//! seed = 42
//! initial = "frequency"
//!
//! [render]
//! tempo_bpm = 120
//! program = 0
//!
//! [telemetry]
//! log_level = "info"
//! ```

pub mod loader;
pub mod sections;

pub use loader::{discover_config_files_with_override, ConfigSources};
pub use sections::{GenerateConfig, PathsConfig, RenderConfig, TelemetryConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete tunechain configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TuneConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub generate: GenerateConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl TuneConfig {
    /// Load configuration from all sources.
    ///
    /// Load order (later wins):
    /// 1. Compiled defaults
    /// 2. `/etc/tunechain/config.toml`
    /// 3. `~/.config/tunechain/config.toml`
    /// 4. `./tunechain.toml`
    /// 5. Environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration with an explicit file in place of `./tunechain.toml`.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = TuneConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            loader::apply_file(&mut config, &path)?;
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Requested melody length, clamped to `generate.max_length`.
    pub fn melody_length(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.generate.length)
            .min(self.generate.max_length)
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        // Build TOML manually for nicer formatting
        let mut output = String::new();

        output.push_str("# tunechain configuration\n\n");

        output.push_str("[paths]\n");
        output.push_str(&format!("corpus = \"{}\"\n", self.paths.corpus.display()));
        output.push_str(&format!(
            "output_dir = \"{}\"\n",
            self.paths.output_dir.display()
        ));

        output.push_str("\n[generate]\n");
        output.push_str(&format!("length = {}\n", self.generate.length));
        output.push_str(&format!("max_length = {}\n", self.generate.max_length));
        match self.generate.seed {
            Some(seed) => output.push_str(&format!("seed = {}\n", seed)),
            None => output.push_str("# seed = 42\n"),
        }
        output.push_str(&format!("initial = \"{}\"\n", self.generate.initial));

        output.push_str("\n[render]\n");
        output.push_str(&format!("tempo_bpm = {}\n", self.render.tempo_bpm));
        output.push_str(&format!(
            "ticks_per_quarter = {}\n",
            self.render.ticks_per_quarter
        ));
        output.push_str(&format!("velocity = {}\n", self.render.velocity));
        output.push_str(&format!("program = {}\n", self.render.program));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!("log_level = \"{}\"\n", self.telemetry.log_level));

        output
    }
}
