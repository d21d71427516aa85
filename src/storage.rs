//! Plain-text persistence for the session log and user notes.
//!
//! Every write goes to a fresh temporary sibling, is synced, and is renamed
//! over the target. The session log additionally holds an exclusive lock on
//! `<log>.lock` in its own directory while it is replaced. Explicit saves to
//! user-chosen paths take no lock and never touch other files next to the
//! target.

use fs2::FileExt;
use log::{debug, info, warn};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading or writing text files.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to lock {path}: {source}")]
    Lock { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
}

/// The backing session log of one notepad.
#[derive(Debug, Clone)]
pub struct LogFile {
    path: PathBuf,
}

impl LogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Overwrite the log with `text`.
    pub fn overwrite(&self, text: &str) -> Result<(), PersistError> {
        info!("Writing session log to {}", self.path.display());
        ensure_parent(&self.path)?;

        let lock_path = self.lock_path();
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|source| PersistError::Lock {
                path: lock_path.clone(),
                source,
            })?;
        lock_file
            .lock_exclusive()
            .map_err(|source| PersistError::Lock {
                path: lock_path.clone(),
                source,
            })?;

        let result = replace_contents(&self.path, text);

        FileExt::unlock(&lock_file).unwrap_or_else(|err| {
            warn!("failed to unlock {}: {}", lock_path.display(), err);
        });

        result
    }
}

/// Write `text` to `path`, replacing any previous content.
pub fn write_text(path: &Path, text: &str) -> Result<(), PersistError> {
    ensure_parent(path)?;
    replace_contents(path, text)
}

/// Read a UTF-8 text file.
pub fn read_text(path: &Path) -> Result<String, PersistError> {
    fs::read_to_string(path).map_err(|source| PersistError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn ensure_parent(path: &Path) -> Result<(), PersistError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PersistError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

fn replace_contents(path: &Path, text: &str) -> Result<(), PersistError> {
    let write_err = |source| PersistError::Write {
        path: path.to_path_buf(),
        source,
    };

    let (tmp_path, mut tmp_file) = create_temp(path).map_err(write_err)?;
    let written = tmp_file
        .write_all(text.as_bytes())
        .and_then(|_| tmp_file.sync_all());
    drop(tmp_file);
    if let Err(source) = written.and_then(|_| fs::rename(&tmp_path, path)) {
        fs::remove_file(&tmp_path).ok();
        return Err(write_err(source));
    }

    debug!("Wrote {} bytes to {}", text.len(), path.display());
    Ok(())
}

/// Hidden temporary sibling of `target`; `attempt` disambiguates taken names.
fn temp_path(target: &Path, attempt: u32) -> PathBuf {
    let mut name = std::ffi::OsString::from(".");
    name.push(target.file_name().unwrap_or_default());
    name.push(".tmp");
    if attempt > 0 {
        name.push(attempt.to_string());
    }
    target.with_file_name(name)
}

fn create_temp(target: &Path) -> io::Result<(PathBuf, File)> {
    let mut attempt = 0u32;
    loop {
        let candidate = temp_path(target, attempt);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => return Ok((candidate, file)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists && attempt < 1000 => {
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_replaces_previous_content() {
        let temp = tempfile::tempdir().unwrap();
        let log = LogFile::new(temp.path().join("sandbox").join("session.log"));

        log.overwrite("first run with a much longer body\n").unwrap();
        log.overwrite("second").unwrap();

        assert_eq!(fs::read_to_string(log.path()).unwrap(), "second");

        let mut names: Vec<_> = fs::read_dir(log.path().parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, ["session.log", "session.log.lock"]);
    }

    #[test]
    fn save_leaves_neighbouring_files_alone() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("report");
        let draft = temp.path().join("report.tmp");
        fs::write(&draft, "user's precious draft").unwrap();

        write_text(&target, "saved").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "saved");
        assert_eq!(fs::read_to_string(&draft).unwrap(), "user's precious draft");
        assert!(!temp.path().join("report.lock").exists());
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 2);
    }

    #[test]
    fn temp_name_skips_taken_candidates() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("note.txt");
        fs::write(temp_path(&target, 0), "stale").unwrap();

        let (path, _file) = create_temp(&target).unwrap();
        assert_eq!(path, temp.path().join(".note.txt.tmp1"));
        assert_eq!(fs::read_to_string(temp_path(&target, 0)).unwrap(), "stale");
    }

    #[test]
    fn read_back_round_trips_unicode() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("notiz.txt");
        write_text(&path, "Öffnen – Speichern\n").unwrap();
        assert_eq!(read_text(&path).unwrap(), "Öffnen – Speichern\n");
    }

    #[test]
    fn read_missing_file_reports_path() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("missing.txt");
        let err = read_text(&path).unwrap_err();
        assert!(matches!(err, PersistError::Read { .. }));
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn write_into_file_parent_fails() {
        let temp = tempfile::tempdir().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let err = write_text(&blocker.join("note.txt"), "x").unwrap_err();
        assert!(matches!(err, PersistError::CreateDir { .. }));
    }
}
