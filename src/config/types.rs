//! Configuration type definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Timer settings for the notepad script.
///
/// All values are milliseconds. The tick is the periodic inspection of the log;
/// every other delay is measured from the event that schedules it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TimingConfig {
    /// Interval of the periodic log inspection (minimum 100)
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    /// Delay between the first rewrite ("instable") and the second ("untrustworthy")
    #[serde(default = "default_escalate_delay")]
    pub escalate_delay_ms: u64,

    /// Delay after the second rewrite before the observed user is greeted
    #[serde(default = "default_welcome_delay")]
    pub welcome_delay_ms: u64,

    /// Delay after the second rewrite before the repeated-login warning appears
    #[serde(default = "default_login_warning_delay")]
    pub login_warning_delay_ms: u64,

    /// Offsets of the four glitch toggles, strictly ascending
    #[serde(default = "default_glitch_offsets")]
    pub glitch_offsets_ms: Vec<u64>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            escalate_delay_ms: default_escalate_delay(),
            welcome_delay_ms: default_welcome_delay(),
            login_warning_delay_ms: default_login_warning_delay(),
            glitch_offsets_ms: default_glitch_offsets(),
        }
    }
}

/// Parameters of the scripted log text.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScriptConfig {
    /// User who receives the "welcome back" block
    #[serde(default = "default_observed_user")]
    pub observed_user: String,

    /// Timestamp (HH:MM) quoted in the "welcome back" block
    #[serde(default = "default_welcome_timestamp")]
    pub welcome_timestamp: String,

    /// Close requests needed before the notepad lets go (valid range: 1 - 10)
    #[serde(default = "default_close_attempts")]
    pub close_attempts_required: u32,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            observed_user: default_observed_user(),
            welcome_timestamp: default_welcome_timestamp(),
            close_attempts_required: default_close_attempts(),
        }
    }
}

/// File locations.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PathsConfig {
    /// Sandbox directory for the session log and user files.
    /// Defaults to `~/.local/share/winfake/sandbox`. Supports `~/`.
    #[serde(default)]
    pub sandbox_dir: Option<String>,

    /// File name of the session log inside the sandbox
    #[serde(default = "default_log_file_name")]
    pub log_file_name: String,

    /// File name offered by `:save` when no path is given
    #[serde(default = "default_note_file_name")]
    pub note_file_name: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sandbox_dir: None,
            log_file_name: default_log_file_name(),
            note_file_name: default_note_file_name(),
        }
    }
}

/// Sound cue playback.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SoundConfig {
    /// Play sound cues at all
    #[serde(default = "default_sound_enabled")]
    pub enabled: bool,

    /// Directory holding `<stem>.wav` assets.
    /// Defaults to `~/.local/share/winfake/assets/sfx`. Supports `~/`.
    #[serde(default)]
    pub sfx_dir: Option<String>,

    /// External player executable (e.g. "aplay", "paplay", "pw-play")
    #[serde(default = "default_player")]
    pub player: String,

    /// Extra arguments passed to the player before the asset path
    #[serde(default = "default_player_args")]
    pub player_args: Vec<String>,

    /// Cue key to asset stem (without `.wav`)
    #[serde(default = "default_cues")]
    pub cues: BTreeMap<String, String>,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: default_sound_enabled(),
            sfx_dir: None,
            player: default_player(),
            player_args: default_player_args(),
            cues: default_cues(),
        }
    }
}

/// A login roster entry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UserEntry {
    pub username: String,

    #[serde(default)]
    pub password: String,
}

// =============================================================================
// Defaults
// =============================================================================

pub(crate) const DEFAULT_GLITCH_OFFSETS_MS: [u64; 4] = [50, 150, 200, 300];
pub(crate) const DEFAULT_OBSERVED_USER: &str = "Milan";
pub(crate) const DEFAULT_WELCOME_TIMESTAMP: &str = "03:14";

fn default_tick_interval() -> u64 {
    5_000
}

fn default_escalate_delay() -> u64 {
    2_000
}

fn default_welcome_delay() -> u64 {
    1_000
}

fn default_login_warning_delay() -> u64 {
    5_000
}

fn default_glitch_offsets() -> Vec<u64> {
    DEFAULT_GLITCH_OFFSETS_MS.to_vec()
}

fn default_observed_user() -> String {
    DEFAULT_OBSERVED_USER.to_string()
}

fn default_welcome_timestamp() -> String {
    DEFAULT_WELCOME_TIMESTAMP.to_string()
}

fn default_close_attempts() -> u32 {
    3
}

fn default_log_file_name() -> String {
    "session.log".to_string()
}

fn default_note_file_name() -> String {
    "note.txt".to_string()
}

fn default_sound_enabled() -> bool {
    true
}

fn default_player() -> String {
    "aplay".to_string()
}

fn default_player_args() -> Vec<String> {
    vec!["-q".to_string()]
}

fn default_cues() -> BTreeMap<String, String> {
    [
        ("logon", "Windows Logon"),
        ("unlock", "Windows Unlock"),
        ("logoff", "Windows Logoff Sound"),
        ("startup", "Windows Startup"),
        ("observer", "observer"),
    ]
    .into_iter()
    .map(|(cue, stem)| (cue.to_string(), stem.to_string()))
    .collect()
}
