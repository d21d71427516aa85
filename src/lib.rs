//! Library exports for the winfake notepad.
//!
//! The scripted notepad lives in [`notepad`]. It depends only on the
//! [`host::NotepadHost`] trait, so any window layer can drive it: the bundled
//! terminal binary, or a mock in tests.

pub mod config;
pub mod host;
pub mod notepad;
pub mod scheduler;
pub mod session;
pub mod sound;
pub mod storage;
pub mod util;

pub use config::Config;
pub use notepad::{CloseDecision, Notepad, NotepadOptions};
pub use session::Session;
