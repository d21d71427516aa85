//! Best-effort sound cues.
//!
//! A cue key (e.g. `"logoff"`) maps to an asset stem, and the stem resolves to
//! `<sfx_dir>/<stem>.wav`. The asset is handed to an external player process.
//! Nothing here ever fails loudly: a missing asset or player only yields `false`.
//! Each player process is reaped by a short-lived helper thread.

use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};

use crate::config::Config;

/// Cue played when the observed user is greeted.
pub const CUE_OBSERVER: &str = "observer";
/// Cue played when a close request is refused.
pub const CUE_LOGOFF: &str = "logoff";
/// Cue played when a session starts.
pub const CUE_LOGON: &str = "logon";

/// Resolves cue keys to assets and plays them through an external player.
#[derive(Debug, Clone)]
pub struct SoundPlayer {
    enabled: bool,
    sfx_dir: PathBuf,
    player: String,
    player_args: Vec<String>,
    cues: BTreeMap<String, String>,
}

impl SoundPlayer {
    pub fn from_config(config: &Config) -> Self {
        Self {
            enabled: config.sound.enabled,
            sfx_dir: config.sfx_dir(),
            player: config.sound.player.clone(),
            player_args: config.sound.player_args.clone(),
            cues: config.sound.cues.clone(),
        }
    }

    /// A player that never plays anything.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            sfx_dir: PathBuf::new(),
            player: String::new(),
            player_args: Vec::new(),
            cues: BTreeMap::new(),
        }
    }

    /// Path of the asset behind `cue`, if the cue is known.
    pub fn asset_path(&self, cue: &str) -> Option<PathBuf> {
        self.cues
            .get(cue)
            .map(|stem| self.sfx_dir.join(format!("{stem}.wav")))
    }

    /// Play `cue`. Returns whether a player process was started.
    pub fn play(&self, cue: &str) -> bool {
        if !self.enabled {
            debug!("Sound disabled, skipping cue '{cue}'");
            return false;
        }

        let Some(path) = self.asset_path(cue) else {
            debug!("Unknown sound cue '{cue}'");
            return false;
        };

        if !path.exists() {
            debug!("Sound asset not found: {}", path.display());
            return false;
        }

        self.spawn_player(&path).is_some()
    }

    /// Start the player and hand the child to a thread that waits on it.
    fn spawn_player(&self, path: &Path) -> Option<JoinHandle<()>> {
        let mut command = Command::new(&self.player);
        command
            .args(&self.player_args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        match command.spawn() {
            Ok(mut child) => {
                let pid = child.id();
                debug!(
                    "Playing {} with {} (pid: {})",
                    path.display(),
                    self.player,
                    pid
                );
                Some(thread::spawn(move || match child.wait() {
                    Ok(status) if !status.success() => {
                        debug!("Sound player (pid: {pid}) exited with {status}");
                    }
                    Ok(_) => {}
                    Err(err) => warn!("Failed to wait for sound player (pid: {pid}): {err}"),
                }))
            }
            Err(err) => {
                warn!(
                    "Failed to launch sound player '{}' for {}: {}",
                    self.player,
                    path.display(),
                    err
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn player_in(dir: &Path, player: &str) -> SoundPlayer {
        let mut config = Config::default();
        config.sound.sfx_dir = Some(dir.to_string_lossy().to_string());
        config.sound.player = player.to_string();
        config.sound.player_args = Vec::new();
        SoundPlayer::from_config(&config)
    }

    #[test]
    fn cues_resolve_to_wav_assets() {
        let temp = tempfile::tempdir().unwrap();
        let player = player_in(temp.path(), "true");
        assert_eq!(
            player.asset_path(CUE_LOGOFF),
            Some(temp.path().join("Windows Logoff Sound.wav"))
        );
        assert_eq!(player.asset_path("doorbell"), None);
    }

    #[test]
    fn missing_asset_is_not_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let player = player_in(temp.path(), "true");
        assert!(!player.play(CUE_OBSERVER));
        assert!(!player.play("doorbell"));
    }

    #[test]
    fn disabled_player_never_plays() {
        assert!(!SoundPlayer::disabled().play(CUE_LOGON));
    }

    #[test]
    fn missing_player_binary_reports_false() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("observer.wav"), b"RIFF").unwrap();
        let player = player_in(temp.path(), "winfake-no-such-player-binary");
        assert!(!player.play(CUE_OBSERVER));
    }

    #[cfg(unix)]
    #[test]
    fn present_asset_spawns_player() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("observer.wav"), b"RIFF").unwrap();
        let player = player_in(temp.path(), "true");
        assert!(player.play(CUE_OBSERVER));
    }

    #[cfg(unix)]
    #[test]
    fn finished_player_is_waited_on() {
        let temp = tempfile::tempdir().unwrap();
        let asset = temp.path().join("observer.wav");
        fs::write(&asset, b"RIFF").unwrap();
        let player = player_in(temp.path(), "true");

        let reaper = player.spawn_player(&asset).unwrap();
        reaper.join().unwrap();
    }
}
