//! The window-side collaborator of the notepad.
//!
//! The notepad does not know how it is drawn. It reads and writes text, moves
//! the cursor, flips the style and asks for sound cues through [`NotepadHost`].
//! The terminal binary implements this trait, and the tests use a recording
//! mock.

/// Visual variant of the text surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceStyle {
    #[default]
    Normal,
    /// Colours swapped; used by the glitch effect.
    Inverted,
}

/// Operations the notepad needs from its host window.
pub trait NotepadHost {
    /// Current text shown in the editor, including any user edits.
    fn text(&self) -> String;

    /// Replace the whole editor content.
    fn set_text(&mut self, text: &str);

    fn move_cursor_to_end(&mut self);

    fn apply_style(&mut self, style: SurfaceStyle);

    /// Best-effort cue playback. `false` means nothing was played; callers
    /// treat it like success.
    fn play_sound(&mut self, cue: &str) -> bool;
}
