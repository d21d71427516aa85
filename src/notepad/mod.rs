//! The scripted notepad.
//!
//! On start the notepad writes a fresh session log, both into its host window
//! and over the backing log file. A repeating tick then watches for the
//! "Environment: stable" marker and escalates it in two steps. The second step
//! runs the glitch effect and queues the closing lines; the observed user also
//! gets a personal greeting. Close requests are refused until the configured
//! number of attempts is reached, and the final text is persisted at that point.
//!
//! Every delayed action is a task tagged with the [`Epoch`] it was
//! scheduled under. New and Load bump the epoch, so anything still queued from
//! before becomes a no-op when its time comes.

mod options;
pub mod script;
mod state;

pub use options::NotepadOptions;
pub use state::{CloseDecision, CloseState, Epoch, LogState, Phase};

use chrono::{Local, NaiveTime};
use log::{debug, info, trace, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::host::{NotepadHost, SurfaceStyle};
use crate::scheduler::{Timeline, TimerId};
use crate::session::Session;
use crate::sound::{CUE_LOGOFF, CUE_OBSERVER};
use crate::storage::{self, LogFile, PersistError};
use script::{
    CANNOT_EXIT_LINE, LOGIN_WARNING_LINES, MARKER_INSTABLE, MARKER_STABLE, MARKER_UNTRUSTED,
    Severity,
};

const GLITCH_SEQUENCE: [SurfaceStyle; 4] = [
    SurfaceStyle::Inverted,
    SurfaceStyle::Normal,
    SurfaceStyle::Inverted,
    SurfaceStyle::Normal,
];

/// Errors surfaced to the user from explicit file actions.
#[derive(Debug, Error)]
pub enum NotepadError {
    #[error("could not save note: {0}")]
    Save(#[source] PersistError),

    #[error("could not open note: {0}")]
    Load(#[source] PersistError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Tick,
    Escalate,
    WelcomeBack,
    LoginWarning,
    Glitch(SurfaceStyle),
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    epoch: Epoch,
    task: Task,
}

/// A running notepad bound to one host window.
pub struct Notepad<H: NotepadHost> {
    host: H,
    session: Session,
    options: NotepadOptions,
    log_file: LogFile,
    state: LogState,
    style: SurfaceStyle,
    epoch: Epoch,
    timeline: Timeline<Scheduled>,
    tick: Option<TimerId>,
}

impl<H: NotepadHost> Notepad<H> {
    /// Open a notepad with the local wall-clock time as session start.
    pub fn start(session: Session, options: NotepadOptions, host: H) -> Self {
        Self::start_at(session, options, host, Local::now().time())
    }

    /// Open a notepad whose template reports `started` as the session start.
    ///
    /// The template replaces whatever the log file held before; a failed write
    /// is logged and otherwise ignored.
    pub fn start_at(session: Session, options: NotepadOptions, host: H, started: NaiveTime) -> Self {
        let template = script::session_template(session.display_name(), started);
        let log_file = LogFile::new(options.log_file.clone());

        let mut notepad = Self {
            host,
            session,
            options,
            log_file,
            state: LogState::with_buffer(template.clone()),
            style: SurfaceStyle::Normal,
            epoch: Epoch::default(),
            timeline: Timeline::new(),
            tick: None,
        };

        notepad.host.set_text(&template);
        if let Err(err) = notepad.log_file.overwrite(&template) {
            warn!("Failed to write initial session log: {}", err);
        }
        notepad.restart_tick();

        info!(
            "Notepad started for '{}' (log: {})",
            notepad.session.display_name(),
            notepad.log_file.path().display()
        );
        notepad
    }

    /// Advance virtual time by `elapsed`, running every task that falls due.
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.timeline.now() + elapsed;
        while let Some(scheduled) = self.timeline.pop_due(until) {
            self.run(scheduled);
        }
        self.timeline.settle(until);
    }

    /// Virtual time since the notepad was opened.
    pub fn elapsed(&self) -> Duration {
        self.timeline.now()
    }

    pub fn state(&self) -> &LogState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn close_state(&self) -> CloseState {
        match self.state.close_attempts {
            0 => CloseState::Open,
            n if n < self.options.close_attempts_required => CloseState::Blocked,
            _ => CloseState::Closing,
        }
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn style(&self) -> SurfaceStyle {
        self.style
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn options(&self) -> &NotepadOptions {
        &self.options
    }

    pub fn log_path(&self) -> &Path {
        self.log_file.path()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Clear the editor and restart the script.
    pub fn new_file(&mut self) {
        self.push_text(String::new());
        self.reset("new file");
    }

    /// Replace the editor content with `path` and restart the script.
    ///
    /// On failure nothing changes.
    pub fn load_from(&mut self, path: &Path) -> Result<PathBuf, NotepadError> {
        let text = storage::read_text(path).map_err(NotepadError::Load)?;
        self.push_text(text);
        self.reset("file loaded");
        info!("Loaded {}", path.display());
        Ok(path.to_path_buf())
    }

    /// Write the current editor content to `path`.
    pub fn save_to(&mut self, path: &Path) -> Result<PathBuf, NotepadError> {
        let text = self.pull_text();
        storage::write_text(path, &text).map_err(NotepadError::Save)?;
        info!("Saved note to {}", path.display());
        Ok(path.to_path_buf())
    }

    /// Handle a close request from the host window.
    pub fn request_close(&mut self) -> CloseDecision {
        self.state.close_attempts = self.state.close_attempts.saturating_add(1);
        let attempts = self.state.close_attempts;
        let required = self.options.close_attempts_required;

        if attempts < required {
            let text = script::append_lines(&self.pull_text(), &[CANNOT_EXIT_LINE]);
            self.push_text(text);
            self.host.play_sound(CUE_LOGOFF);
            info!("Close request {attempts}/{required} refused");
            return CloseDecision::Deny;
        }

        if attempts > required {
            debug!("Close request {attempts} after shutdown; already persisted");
            return CloseDecision::Allow;
        }

        self.shut_down();
        let text = self.pull_text();
        if let Err(err) = self.log_file.overwrite(&text) {
            warn!("Failed to persist final session log: {}", err);
        }
        info!("Close request {attempts}/{required} accepted");
        CloseDecision::Allow
    }

    fn run(&mut self, scheduled: Scheduled) {
        if scheduled.epoch != self.epoch {
            trace!(
                "Dropping stale {:?} from epoch {} (current {})",
                scheduled.task,
                scheduled.epoch.get(),
                self.epoch.get()
            );
            return;
        }

        match scheduled.task {
            Task::Tick => self.on_tick(),
            Task::Escalate => self.on_escalate(),
            Task::WelcomeBack => self.on_welcome_back(),
            Task::LoginWarning => {
                let text = script::append_lines(&self.pull_text(), &LOGIN_WARNING_LINES);
                self.push_text(text);
            }
            Task::Glitch(style) => {
                self.host.apply_style(style);
                self.style = style;
            }
        }
    }

    fn on_tick(&mut self) {
        if self.state.manipulation_triggered || self.state.phase != Phase::Stable {
            return;
        }

        let text = self.pull_text();
        let Some(rewritten) =
            script::rewrite_marker(&text, MARKER_STABLE, MARKER_INSTABLE, Severity::Warn)
        else {
            return;
        };

        self.push_text(rewritten);
        self.state.phase = Phase::Instable;
        info!("Session log escalated to instable");
        self.schedule(self.options.escalate_delay, Task::Escalate);
    }

    fn on_escalate(&mut self) {
        if self.state.manipulation_triggered || self.state.phase != Phase::Instable {
            return;
        }

        let text = self.pull_text();
        let Some(rewritten) =
            script::rewrite_marker(&text, MARKER_INSTABLE, MARKER_UNTRUSTED, Severity::Error)
        else {
            debug!("Instable marker gone before escalation; script halted");
            return;
        };

        self.push_text(rewritten);
        self.state.phase = Phase::Untrusted;
        self.state.manipulation_triggered = true;
        info!("Session log escalated to untrustworthy");

        self.glitch();

        if self.session.is_user(&self.options.observed_user) {
            self.schedule(self.options.welcome_delay, Task::WelcomeBack);
        }
        self.schedule(self.options.login_warning_delay, Task::LoginWarning);
    }

    fn on_welcome_back(&mut self) {
        let block = script::welcome_block(
            self.session.display_name(),
            &self.options.welcome_timestamp,
        );
        let text = script::append_lines(&self.pull_text(), block.as_slice());
        self.push_text(text);
        self.host.play_sound(CUE_OBSERVER);
    }

    fn glitch(&mut self) {
        self.host.move_cursor_to_end();
        let offsets = self.options.glitch_offsets;
        for (offset, style) in offsets.into_iter().zip(GLITCH_SEQUENCE) {
            self.schedule(offset, Task::Glitch(style));
        }
    }

    fn reset(&mut self, reason: &str) {
        self.epoch = self.epoch.next();
        self.state.reset_script();
        if self.style != SurfaceStyle::Normal {
            self.host.apply_style(SurfaceStyle::Normal);
            self.style = SurfaceStyle::Normal;
        }
        if self.close_state() == CloseState::Closing {
            debug!("Reset after shutdown ({reason}); tick stays off");
            return;
        }
        self.restart_tick();
        info!("Script reset ({reason}), epoch {}", self.epoch.get());
    }

    fn shut_down(&mut self) {
        if let Some(id) = self.tick.take() {
            self.timeline.cancel(id);
        }
        self.epoch = self.epoch.next();
        self.timeline.clear();
    }

    fn restart_tick(&mut self) {
        if let Some(id) = self.tick.take() {
            self.timeline.cancel(id);
        }
        let scheduled = Scheduled {
            epoch: self.epoch,
            task: Task::Tick,
        };
        self.tick = Some(
            self.timeline
                .schedule_repeating(self.options.tick_interval, scheduled),
        );
    }

    fn schedule(&mut self, delay: Duration, task: Task) {
        debug!("Scheduling {:?} in {:?}", task, delay);
        self.timeline.schedule_once(
            delay,
            Scheduled {
                epoch: self.epoch,
                task,
            },
        );
    }

    fn pull_text(&mut self) -> String {
        let text = self.host.text();
        self.state.buffer.clone_from(&text);
        text
    }

    fn push_text(&mut self, text: String) {
        self.host.set_text(&text);
        self.state.buffer = text;
    }
}
