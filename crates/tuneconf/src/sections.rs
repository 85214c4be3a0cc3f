//! Config sections, one struct per TOML table.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Input and output locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Training corpus CSV (pitch, duration rows).
    /// Default: data/pitches.csv
    #[serde(default = "PathsConfig::default_corpus")]
    pub corpus: PathBuf,

    /// Directory MIDI renders are written to when no explicit path is given.
    /// Default: .
    #[serde(default = "PathsConfig::default_output_dir")]
    pub output_dir: PathBuf,
}

impl PathsConfig {
    fn default_corpus() -> PathBuf {
        PathBuf::from("data/pitches.csv")
    }

    fn default_output_dir() -> PathBuf {
        PathBuf::from(".")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            corpus: Self::default_corpus(),
            output_dir: Self::default_output_dir(),
        }
    }
}

/// Melody generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Number of states per generated melody.
    /// Default: 100
    #[serde(default = "GenerateConfig::default_length")]
    pub length: usize,

    /// Hard cap on `length`, including values given on the command line.
    /// Default: 100000
    #[serde(default = "GenerateConfig::default_max_length")]
    pub max_length: usize,

    /// RNG seed. Unset means seed from the OS.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Initial distribution estimate: "frequency" or "sequence-start".
    /// Default: frequency
    #[serde(default = "GenerateConfig::default_initial")]
    pub initial: String,
}

impl GenerateConfig {
    fn default_length() -> usize {
        100
    }

    fn default_max_length() -> usize {
        100_000
    }

    fn default_initial() -> String {
        "frequency".to_string()
    }
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            length: Self::default_length(),
            max_length: Self::default_max_length(),
            seed: None,
            initial: Self::default_initial(),
        }
    }
}

/// MIDI rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Default: 120
    #[serde(default = "RenderConfig::default_tempo_bpm")]
    pub tempo_bpm: u16,

    /// Default: 480
    #[serde(default = "RenderConfig::default_ticks_per_quarter")]
    pub ticks_per_quarter: u16,

    /// Default: 80
    #[serde(default = "RenderConfig::default_velocity")]
    pub velocity: u8,

    /// General MIDI program. Default: 0 (acoustic grand piano)
    #[serde(default)]
    pub program: u8,
}

impl RenderConfig {
    fn default_tempo_bpm() -> u16 {
        120
    }

    fn default_ticks_per_quarter() -> u16 {
        480
    }

    fn default_velocity() -> u8 {
        80
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tempo_bpm: Self::default_tempo_bpm(),
            ticks_per_quarter: Self::default_ticks_per_quarter(),
            velocity: Self::default_velocity(),
            program: 0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log filter directive (trace, debug, info, warn, error, or an
    /// EnvFilter expression).
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}
