use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Config;
use crate::util::resolve_user_path;

/// Runtime options of one notepad, derived from configuration.
#[derive(Debug, Clone)]
pub struct NotepadOptions {
    pub tick_interval: Duration,
    pub escalate_delay: Duration,
    pub welcome_delay: Duration,
    pub login_warning_delay: Duration,
    pub glitch_offsets: [Duration; 4],
    pub observed_user: String,
    pub welcome_timestamp: String,
    pub close_attempts_required: u32,
    pub sandbox_dir: PathBuf,
    pub log_file: PathBuf,
    pub default_note: PathBuf,
}

impl NotepadOptions {
    /// Stock script timings with every file inside `sandbox_dir`. Intended mainly for tests.
    pub fn new(sandbox_dir: impl Into<PathBuf>) -> Self {
        let mut config = Config::default();
        config.paths.sandbox_dir = Some(sandbox_dir.into().to_string_lossy().to_string());
        Self::from_config(&config)
    }

    pub fn from_config(config: &Config) -> Self {
        let timing = &config.timing;
        let sandbox_dir = config.sandbox_dir();
        Self {
            tick_interval: Duration::from_millis(timing.tick_interval_ms),
            escalate_delay: Duration::from_millis(timing.escalate_delay_ms),
            welcome_delay: Duration::from_millis(timing.welcome_delay_ms),
            login_warning_delay: Duration::from_millis(timing.login_warning_delay_ms),
            glitch_offsets: glitch_offsets(&timing.glitch_offsets_ms),
            observed_user: config.script.observed_user.clone(),
            welcome_timestamp: config.script.welcome_timestamp.clone(),
            close_attempts_required: config.script.close_attempts_required.max(1),
            log_file: sandbox_dir.join(&config.paths.log_file_name),
            default_note: sandbox_dir.join(&config.paths.note_file_name),
            sandbox_dir,
        }
    }

    /// Resolve a path typed into a file dialog against the sandbox.
    pub fn resolve(&self, raw: &str) -> PathBuf {
        resolve_user_path(raw, &self.sandbox_dir)
    }

    pub fn with_log_file(mut self, path: &Path) -> Self {
        self.log_file = path.to_path_buf();
        self
    }
}

fn glitch_offsets(raw: &[u64]) -> [Duration; 4] {
    let offsets = <[u64; 4]>::try_from(raw).unwrap_or([50, 150, 200, 300]);
    offsets.map(Duration::from_millis)
}
