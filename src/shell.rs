//! Terminal host for the notepad.
//!
//! Renders the editor text to stdout (inverted style as reverse video) and
//! turns stdin lines into notepad actions. A calloop loop owns the notepad:
//! a frame timer advances the script, and one channel carries stdin lines and
//! SIGINT/SIGTERM from helper threads. Signals count as close requests, so
//! Ctrl-C is refused like any other attempt to leave.

use anyhow::{Context, Result, anyhow};
use calloop::EventLoop;
use calloop::channel::{self, Event as ChannelEvent, Sender};
use calloop::timer::{TimeoutAction, Timer};
use log::{debug, info, warn};
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::io::{self, BufRead, Write};
use std::thread;
use std::time::{Duration, Instant};

use winfake::host::{NotepadHost, SurfaceStyle};
use winfake::notepad::{CloseDecision, Notepad, NotepadOptions};
use winfake::session::Session;
use winfake::sound::{CUE_LOGON, SoundPlayer};

const FRAME: Duration = Duration::from_millis(50);

const HELP: &str =
    "Commands: :new | :open PATH | :save [PATH] | :close | :show ; other lines are typed into the note";

/// Input arriving from the helper threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellInput {
    Line(String),
    CloseRequested,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    New,
    Open(String),
    Save(Option<String>),
    Close,
    Show,
    Type(String),
}

fn parse_command(line: &str) -> Command {
    let Some(rest) = line.strip_prefix(':') else {
        return Command::Type(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest.trim(), ""),
    };

    match (name, arg) {
        ("new", _) => Command::New,
        ("open", path) if !path.is_empty() => Command::Open(path.to_string()),
        ("save", "") => Command::Save(None),
        ("save", path) => Command::Save(Some(path.to_string())),
        ("close" | "q" | "quit", _) => Command::Close,
        ("show", _) => Command::Show,
        _ => Command::Type(line.to_string()),
    }
}

/// Editor surface drawn on a terminal (or any writer).
pub struct TerminalHost<W: Write> {
    out: W,
    text: String,
    style: SurfaceStyle,
    sound: SoundPlayer,
}

impl<W: Write> TerminalHost<W> {
    pub fn new(out: W, sound: SoundPlayer) -> Self {
        Self {
            out,
            text: String::new(),
            style: SurfaceStyle::Normal,
            sound,
        }
    }

    /// Append a line as if the user had typed it at the end of the note.
    pub fn type_line(&mut self, line: &str) {
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
        self.text.push_str(line);
    }

    /// Print a message box line below the editor.
    pub fn notice(&mut self, message: &str) {
        if let Err(err) = writeln!(self.out, "[Notepad] {message}") {
            debug!("Failed to write notice: {}", err);
        }
    }

    pub fn render(&mut self) {
        let (start, end) = match self.style {
            SurfaceStyle::Normal => ("", ""),
            SurfaceStyle::Inverted => ("\x1b[7m", "\x1b[0m"),
        };
        let result = writeln!(
            self.out,
            "----- Notepad.exe -----\n{start}{}{end}\n-----------------------",
            self.text
        )
        .and_then(|_| self.out.flush());
        if let Err(err) = result {
            debug!("Failed to render notepad: {}", err);
        }
    }
}

impl<W: Write> NotepadHost for TerminalHost<W> {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.render();
    }

    fn move_cursor_to_end(&mut self) {
        // The terminal always shows the whole note; nothing to scroll.
    }

    fn apply_style(&mut self, style: SurfaceStyle) {
        self.style = style;
        self.render();
    }

    fn play_sound(&mut self, cue: &str) -> bool {
        self.sound.play(cue)
    }
}

struct ShellState<W: Write> {
    notepad: Notepad<TerminalHost<W>>,
    last_frame: Instant,
    closed: bool,
}

impl<W: Write> ShellState<W> {
    fn new(notepad: Notepad<TerminalHost<W>>) -> Self {
        Self {
            notepad,
            last_frame: Instant::now(),
            closed: false,
        }
    }

    fn frame(&mut self) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.notepad.advance(elapsed);
    }

    fn apply(&mut self, input: ShellInput) {
        let line = match input {
            ShellInput::CloseRequested => return self.close(),
            ShellInput::Line(line) => line,
        };

        match parse_command(&line) {
            Command::New => self.notepad.new_file(),
            Command::Open(raw) => {
                let path = self.notepad.options().resolve(&raw);
                let message = match self.notepad.load_from(&path) {
                    Ok(path) => format!("Opened {}", path.display()),
                    Err(err) => err.to_string(),
                };
                self.notepad.host_mut().notice(&message);
            }
            Command::Save(raw) => {
                let path = match raw {
                    Some(raw) => self.notepad.options().resolve(&raw),
                    None => self.notepad.options().default_note.clone(),
                };
                let message = match self.notepad.save_to(&path) {
                    Ok(path) => format!("Saved {}", path.display()),
                    Err(err) => err.to_string(),
                };
                self.notepad.host_mut().notice(&message);
            }
            Command::Close => self.close(),
            Command::Show => self.notepad.host_mut().render(),
            Command::Type(text) => {
                let host = self.notepad.host_mut();
                host.type_line(&text);
                host.render();
            }
        }
    }

    fn close(&mut self) {
        match self.notepad.request_close() {
            CloseDecision::Deny => debug!("Close vetoed"),
            CloseDecision::Allow => {
                info!("Close allowed; leaving event loop");
                self.closed = true;
            }
        }
    }
}

/// Run the notepad on the terminal until it agrees to close.
pub fn run(session: Session, options: NotepadOptions, sound: SoundPlayer) -> Result<()> {
    let mut event_loop: EventLoop<ShellState<io::Stdout>> =
        EventLoop::try_new().context("Failed to create event loop")?;
    let handle = event_loop.handle();

    let (tx, rx) = channel::channel::<ShellInput>();
    spawn_signal_forwarder(tx.clone())?;
    spawn_stdin_reader(tx);

    handle
        .insert_source(rx, |event, _, state| match event {
            ChannelEvent::Msg(input) => state.apply(input),
            ChannelEvent::Closed => debug!("Input channel closed"),
        })
        .map_err(|err| anyhow!("Failed to register input source: {}", err.error))?;

    handle
        .insert_source(Timer::from_duration(FRAME), |_, _, state| {
            state.frame();
            TimeoutAction::ToDuration(FRAME)
        })
        .map_err(|err| anyhow!("Failed to register frame timer: {}", err.error))?;

    let mut host = TerminalHost::new(io::stdout(), sound);
    host.play_sound(CUE_LOGON);
    host.notice(HELP);

    let notepad = Notepad::start(session, options, host);
    let mut state = ShellState::new(notepad);

    let signal = event_loop.get_signal();
    event_loop
        .run(FRAME, &mut state, |state| {
            if state.closed {
                signal.stop();
            }
        })
        .context("Event loop failed")?;

    Ok(())
}

fn spawn_stdin_reader(tx: Sender<ShellInput>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(ShellInput::Line(line)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    warn!("Failed to read stdin: {}", err);
                    break;
                }
            }
        }
        debug!("stdin closed - requesting close");
        tx.send(ShellInput::CloseRequested).ok();
    });
}

fn spawn_signal_forwarder(tx: Sender<ShellInput>) -> Result<()> {
    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("Failed to register signal handler")?;

    // Runs until process exit; signal_hook's forever() has no shutdown hook.
    thread::spawn(move || {
        for sig in signals.forever() {
            info!(
                "Received {} - requesting close",
                if sig == SIGTERM { "SIGTERM" } else { "SIGINT" }
            );
            if tx.send(ShellInput::CloseRequested).is_err() {
                break;
            }
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use std::fs;

    fn shell_in(dir: &std::path::Path) -> ShellState<Vec<u8>> {
        let host = TerminalHost::new(Vec::new(), SoundPlayer::disabled());
        let notepad = Notepad::start_at(
            Session::new("Eve"),
            NotepadOptions::new(dir),
            host,
            NaiveTime::from_hms_opt(23, 59, 0).unwrap(),
        );
        ShellState::new(notepad)
    }

    fn output(state: &ShellState<Vec<u8>>) -> String {
        String::from_utf8_lossy(&state.notepad.host().out).to_string()
    }

    #[test]
    fn parses_commands_and_typed_text() {
        assert_eq!(parse_command(":new"), Command::New);
        assert_eq!(
            parse_command(":open  notes/a.txt "),
            Command::Open("notes/a.txt".into())
        );
        assert_eq!(parse_command(":save"), Command::Save(None));
        assert_eq!(
            parse_command(":save b.txt"),
            Command::Save(Some("b.txt".into()))
        );
        assert_eq!(parse_command(":q"), Command::Close);
        assert_eq!(parse_command(":show"), Command::Show);
        assert_eq!(parse_command("hello"), Command::Type("hello".into()));
        assert_eq!(parse_command(":open"), Command::Type(":open".into()));
    }

    #[test]
    fn render_inverts_with_reverse_video() {
        let mut host = TerminalHost::new(Vec::new(), SoundPlayer::disabled());
        host.set_text("boo");
        host.apply_style(SurfaceStyle::Inverted);
        let out = String::from_utf8(host.out).unwrap();
        assert!(out.contains("\x1b[7mboo\x1b[0m"));
    }

    #[test]
    fn typed_lines_reach_the_note() {
        let temp = tempfile::tempdir().unwrap();
        let mut state = shell_in(temp.path());
        state.apply(ShellInput::Line("hello there".into()));
        assert!(state.notepad.host().text().ends_with("\nhello there"));
    }

    #[test]
    fn save_without_path_uses_default_note() {
        let temp = tempfile::tempdir().unwrap();
        let mut state = shell_in(temp.path());
        state.apply(ShellInput::Line(":save".into()));

        let saved = fs::read_to_string(temp.path().join("note.txt")).unwrap();
        assert!(saved.contains("[INFO] User: Eve"));
        assert!(output(&state).contains("[Notepad] Saved"));
    }

    #[test]
    fn failed_open_is_shown_to_the_user() {
        let temp = tempfile::tempdir().unwrap();
        let mut state = shell_in(temp.path());
        state.apply(ShellInput::Line(":open nowhere.txt".into()));
        assert!(output(&state).contains("[Notepad] could not open note"));
        assert!(state.notepad.host().text().contains("Environment: stable"));
    }

    #[test]
    fn open_resolves_relative_to_sandbox() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("todo.txt"), "buy milk").unwrap();
        let mut state = shell_in(temp.path());
        state.apply(ShellInput::Line(":open todo.txt".into()));
        assert_eq!(state.notepad.host().text(), "buy milk");
    }

    #[test]
    fn signals_and_close_commands_need_three_attempts() {
        let temp = tempfile::tempdir().unwrap();
        let mut state = shell_in(temp.path());

        state.apply(ShellInput::CloseRequested);
        state.apply(ShellInput::Line(":close".into()));
        assert!(!state.closed);

        state.apply(ShellInput::CloseRequested);
        assert!(state.closed);
    }
}
