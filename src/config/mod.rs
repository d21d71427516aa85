//! Configuration file support for winfake.
//!
//! Settings are read from `~/.config/winfake/config.toml`: script timing, the
//! scripted log text, sandbox locations, sound cues and the login roster.
//!
//! If no config file exists, the built-in defaults reproduce the stock script.

pub mod types;

pub use types::{PathsConfig, ScriptConfig, SoundConfig, TimingConfig, UserEntry};

use anyhow::{Context, Result};
use chrono::NaiveTime;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::util::expand_tilde;
use types::{DEFAULT_GLITCH_OFFSETS_MS, DEFAULT_OBSERVED_USER, DEFAULT_WELCOME_TIMESTAMP};

const APP_DIR: &str = "winfake";

/// Main configuration structure containing all user settings.
///
/// # Example TOML
/// ```toml
/// [timing]
/// tick_interval_ms = 5000
/// glitch_offsets_ms = [50, 150, 200, 300]
///
/// [script]
/// observed_user = "Milan"
/// close_attempts_required = 3
///
/// [sound]
/// player = "paplay"
///
/// [[users]]
/// username = "Milan"
/// password = "secret"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, schemars::JsonSchema)]
pub struct Config {
    /// Script timer settings
    #[serde(default)]
    pub timing: TimingConfig,

    /// Scripted log text parameters
    #[serde(default)]
    pub script: ScriptConfig,

    /// Sandbox and log file locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Sound cue playback
    #[serde(default)]
    pub sound: SoundConfig,

    /// Login roster; empty means any user name is accepted
    #[serde(default)]
    pub users: Vec<UserEntry>,
}

impl Config {
    /// Validates and clamps configuration values to acceptable ranges.
    ///
    /// Invalid values are replaced and a warning is logged.
    ///
    /// Validated ranges:
    /// - `tick_interval_ms`: >= 100
    /// - `glitch_offsets_ms`: exactly four, strictly ascending
    /// - `close_attempts_required`: 1 - 10
    /// - `observed_user`: non-empty
    /// - `welcome_timestamp`: `HH:MM`
    pub(crate) fn validate_and_clamp(&mut self) {
        if self.timing.tick_interval_ms < 100 {
            warn!(
                "Invalid tick_interval_ms {}, clamping to 100",
                self.timing.tick_interval_ms
            );
            self.timing.tick_interval_ms = 100;
        }

        let offsets = &self.timing.glitch_offsets_ms;
        let ascending = offsets.windows(2).all(|pair| pair[0] < pair[1]);
        if offsets.len() != DEFAULT_GLITCH_OFFSETS_MS.len() || !ascending {
            warn!(
                "Invalid glitch_offsets_ms {:?}, expected four ascending values; using defaults",
                offsets
            );
            self.timing.glitch_offsets_ms = DEFAULT_GLITCH_OFFSETS_MS.to_vec();
        }

        if !(1..=10).contains(&self.script.close_attempts_required) {
            warn!(
                "Invalid close_attempts_required {}, clamping to 1-10 range",
                self.script.close_attempts_required
            );
            self.script.close_attempts_required = self.script.close_attempts_required.clamp(1, 10);
        }

        if self.script.observed_user.trim().is_empty() {
            warn!("Empty observed_user, falling back to '{DEFAULT_OBSERVED_USER}'");
            self.script.observed_user = DEFAULT_OBSERVED_USER.to_string();
        }

        if NaiveTime::parse_from_str(&self.script.welcome_timestamp, "%H:%M").is_err() {
            warn!(
                "Invalid welcome_timestamp '{}', falling back to '{DEFAULT_WELCOME_TIMESTAMP}'",
                self.script.welcome_timestamp
            );
            self.script.welcome_timestamp = DEFAULT_WELCOME_TIMESTAMP.to_string();
        }

        if self.paths.log_file_name.trim().is_empty() {
            warn!("Empty log_file_name, falling back to 'session.log'");
            self.paths.log_file_name = PathsConfig::default().log_file_name;
        }
    }

    /// Returns the path to the configuration file (`~/.config/winfake/config.toml`).
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join(APP_DIR);

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Loads configuration from `config_path`, or returns defaults if the file does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or contains invalid TOML.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Writes the documented example config to `config_path`.
    ///
    /// # Errors
    /// Returns an error if a file already exists there or it cannot be written.
    pub fn create_default_file(config_path: &Path) -> Result<()> {
        if config_path.exists() {
            return Err(anyhow::anyhow!(
                "Config file already exists at {}",
                config_path.display()
            ));
        }

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let default_config = include_str!("../../config.example.toml");
        fs::write(config_path, default_config)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Created default config at {}", config_path.display());
        Ok(())
    }

    /// Sandbox directory holding the session log and the user's notes.
    pub fn sandbox_dir(&self) -> PathBuf {
        match &self.paths.sandbox_dir {
            Some(raw) if !raw.trim().is_empty() => expand_tilde(raw),
            _ => data_root().join("sandbox"),
        }
    }

    /// Directory holding the `.wav` sound assets.
    pub fn sfx_dir(&self) -> PathBuf {
        match &self.sound.sfx_dir {
            Some(raw) if !raw.trim().is_empty() => expand_tilde(raw),
            _ => data_root().join("assets").join("sfx"),
        }
    }
}

fn data_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_script() {
        let config = Config::default();
        assert_eq!(config.timing.tick_interval_ms, 5_000);
        assert_eq!(config.timing.glitch_offsets_ms, vec![50, 150, 200, 300]);
        assert_eq!(config.script.observed_user, "Milan");
        assert_eq!(config.script.close_attempts_required, 3);
        assert_eq!(
            config.sound.cues.get("logoff").map(String::as_str),
            Some("Windows Logoff Sound")
        );
        assert!(config.users.is_empty());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::load_from(&temp.path().join("absent.toml")).unwrap();
        assert_eq!(config.paths.log_file_name, "session.log");
    }

    #[test]
    fn parses_partial_file_and_roster() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[timing]
tick_interval_ms = 250

[script]
observed_user = "Ada"

[[users]]
username = "Ada"
password = "pw"

[[users]]
username = "Gast"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.timing.tick_interval_ms, 250);
        assert_eq!(config.timing.escalate_delay_ms, 2_000);
        assert_eq!(config.script.observed_user, "Ada");
        assert_eq!(config.users.len(), 2);
        assert_eq!(config.users[1].password, "");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[timing\ntick_interval_ms = ").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }

    #[test]
    fn validate_clamps_out_of_range_values() {
        let mut config = Config::default();
        config.timing.tick_interval_ms = 5;
        config.timing.glitch_offsets_ms = vec![300, 200, 100, 50];
        config.script.close_attempts_required = 0;
        config.script.observed_user = "  ".into();
        config.script.welcome_timestamp = "late".into();

        config.validate_and_clamp();

        assert_eq!(config.timing.tick_interval_ms, 100);
        assert_eq!(config.timing.glitch_offsets_ms, vec![50, 150, 200, 300]);
        assert_eq!(config.script.close_attempts_required, 1);
        assert_eq!(config.script.observed_user, "Milan");
        assert_eq!(config.script.welcome_timestamp, "03:14");
    }

    #[test]
    fn custom_sandbox_dir_is_used() {
        let mut config = Config::default();
        config.paths.sandbox_dir = Some("/tmp/winfake-sandbox".into());
        assert_eq!(config.sandbox_dir(), PathBuf::from("/tmp/winfake-sandbox"));
    }

    #[test]
    fn example_config_parses_cleanly() {
        let config: Config = toml::from_str(include_str!("../../config.example.toml")).unwrap();
        assert_eq!(config.timing.glitch_offsets_ms.len(), 4);
        assert_eq!(config.script.close_attempts_required, 3);
    }

    #[test]
    fn create_default_file_refuses_to_overwrite() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("winfake").join("config.toml");
        Config::create_default_file(&path).unwrap();
        assert!(path.exists());
        assert!(Config::create_default_file(&path).is_err());
    }
}
