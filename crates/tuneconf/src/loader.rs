//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, TuneConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local). Only returns files
/// that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided it replaces the local override. A CLI path that
/// does not exist is still returned so loading reports it.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/tunechain/config.toml");
    if system.exists() {
        files.push(system);
    }

    // XDG_CONFIG_HOME or ~/.config
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("tunechain/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        files.push(path.to_path_buf());
        return files;
    }

    let local = PathBuf::from("tunechain.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Overlay the values found in a TOML file onto `config`.
pub fn apply_file(config: &mut TuneConfig, path: &Path) -> Result<(), ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    apply_toml(config, &contents, path)
}

/// Overlay the values in a TOML document onto `config`.
///
/// Keys that are absent keep their current value, so later files only
/// need to mention what they change.
pub fn apply_toml(config: &mut TuneConfig, contents: &str, path: &Path) -> Result<(), ConfigError> {
    let table: toml::Table = contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let fields = Fields { path };

    if let Some(paths) = fields.section(&table, "paths")? {
        if let Some(v) = fields.string(paths, "paths.corpus")? {
            config.paths.corpus = expand_path(&v);
        }
        if let Some(v) = fields.string(paths, "paths.output_dir")? {
            config.paths.output_dir = expand_path(&v);
        }
    }

    if let Some(generate) = fields.section(&table, "generate")? {
        if let Some(v) = fields.integer(generate, "generate.length")? {
            config.generate.length = v;
        }
        if let Some(v) = fields.integer(generate, "generate.max_length")? {
            config.generate.max_length = v;
        }
        if let Some(v) = fields.integer(generate, "generate.seed")? {
            config.generate.seed = Some(v);
        }
        if let Some(v) = fields.string(generate, "generate.initial")? {
            config.generate.initial = v;
        }
    }

    if let Some(render) = fields.section(&table, "render")? {
        if let Some(v) = fields.integer(render, "render.tempo_bpm")? {
            config.render.tempo_bpm = v;
        }
        if let Some(v) = fields.integer(render, "render.ticks_per_quarter")? {
            config.render.ticks_per_quarter = v;
        }
        if let Some(v) = fields.integer(render, "render.velocity")? {
            config.render.velocity = v;
        }
        if let Some(v) = fields.integer(render, "render.program")? {
            config.render.program = v;
        }
    }

    if let Some(telemetry) = fields.section(&table, "telemetry")? {
        if let Some(v) = fields.string(telemetry, "telemetry.log_level")? {
            config.telemetry.log_level = v;
        }
    }

    Ok(())
}

/// Typed lookups that report the offending key on mismatch.
struct Fields<'a> {
    path: &'a Path,
}

impl Fields<'_> {
    fn error(&self, key: &str, expected: &str) -> ConfigError {
        ConfigError::Parse {
            path: self.path.to_path_buf(),
            message: format!("{key}: expected {expected}"),
        }
    }

    fn leaf(key: &str) -> &str {
        key.rsplit('.').next().unwrap_or(key)
    }

    fn section<'t>(
        &self,
        table: &'t toml::Table,
        key: &str,
    ) -> Result<Option<&'t toml::Table>, ConfigError> {
        match table.get(key) {
            None => Ok(None),
            Some(v) => v.as_table().map(Some).ok_or_else(|| self.error(key, "a table")),
        }
    }

    fn string(&self, table: &toml::Table, key: &str) -> Result<Option<String>, ConfigError> {
        match table.get(Self::leaf(key)) {
            None => Ok(None),
            Some(v) => v
                .as_str()
                .map(|s| Some(s.to_string()))
                .ok_or_else(|| self.error(key, "a string")),
        }
    }

    fn integer<T: TryFrom<i64>>(
        &self,
        table: &toml::Table,
        key: &str,
    ) -> Result<Option<T>, ConfigError> {
        match table.get(Self::leaf(key)) {
            None => Ok(None),
            Some(v) => v
                .as_integer()
                .and_then(|i| T::try_from(i).ok())
                .map(Some)
                .ok_or_else(|| self.error(key, "an integer in range")),
        }
    }
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut TuneConfig, sources: &mut ConfigSources) {
    apply_env_overrides_with(config, sources, |key| env::var(key).ok());
}

/// Apply overrides read through `lookup` instead of the process environment.
///
/// Unparseable numeric values are ignored.
pub fn apply_env_overrides_with<F>(config: &mut TuneConfig, sources: &mut ConfigSources, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("TUNECHAIN_CORPUS") {
        config.paths.corpus = expand_path(&v);
        sources.env_overrides.push("TUNECHAIN_CORPUS".to_string());
    }
    if let Some(v) = lookup("TUNECHAIN_OUTPUT_DIR") {
        config.paths.output_dir = expand_path(&v);
        sources.env_overrides.push("TUNECHAIN_OUTPUT_DIR".to_string());
    }

    if let Some(v) = lookup("TUNECHAIN_LENGTH") {
        if let Ok(length) = v.parse() {
            config.generate.length = length;
            sources.env_overrides.push("TUNECHAIN_LENGTH".to_string());
        }
    }
    if let Some(v) = lookup("TUNECHAIN_SEED") {
        if let Ok(seed) = v.parse() {
            config.generate.seed = Some(seed);
            sources.env_overrides.push("TUNECHAIN_SEED".to_string());
        }
    }
    if let Some(v) = lookup("TUNECHAIN_INITIAL") {
        config.generate.initial = v;
        sources.env_overrides.push("TUNECHAIN_INITIAL".to_string());
    }

    if let Some(v) = lookup("TUNECHAIN_TEMPO") {
        if let Ok(bpm) = v.parse() {
            config.render.tempo_bpm = bpm;
            sources.env_overrides.push("TUNECHAIN_TEMPO".to_string());
        }
    }

    if let Some(v) = lookup("TUNECHAIN_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("TUNECHAIN_LOG_LEVEL".to_string());
    }
    // Also support RUST_LOG
    if let Some(v) = lookup("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }
}

/// Expand ~ and environment variables in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            home.join(stripped)
        } else {
            PathBuf::from(path)
        }
    } else if let Some(stripped) = path.strip_prefix('$') {
        // Handle $VAR/rest/of/path
        if let Some((var_name, rest)) = stripped.split_once('/') {
            match env::var(var_name) {
                Ok(var_value) => PathBuf::from(var_value).join(rest),
                Err(_) => PathBuf::from(path),
            }
        } else {
            env::var(stripped)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(path))
        }
    } else {
        PathBuf::from(path)
    }
}
