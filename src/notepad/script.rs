//! Text of the scripted session log and the marker rewrites applied to it.

use chrono::NaiveTime;

pub const MARKER_STABLE: &str = "Environment: stable";
pub const MARKER_INSTABLE: &str = "Environment: instable";
pub const MARKER_UNTRUSTED: &str = "Environment: untrustworthy";

pub const CANNOT_EXIT_LINE: &str = "[INFO] Cannot exit. Session active.";

pub const LOGIN_WARNING_LINES: [&str; 2] = [
    "[WARN] Repeated logins detected for this account.",
    "[WARN] Logging in again is not recommended.",
];

/// Log line severity tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn tag(self) -> &'static str {
        match self {
            Severity::Info => "[INFO]",
            Severity::Warn => "[WARN]",
            Severity::Error => "[ERROR]",
        }
    }
}

/// The log every notepad starts from.
pub fn session_template(user: &str, started: NaiveTime) -> String {
    format!(
        "[INFO] Session started: {}\n[INFO] User: {user}\n[INFO] {MARKER_STABLE}",
        started.format("%H:%M")
    )
}

/// Greeting appended for the observed user.
pub fn welcome_block(user: &str, timestamp: &str) -> Vec<String> {
    vec![
        format!("[INFO] Welcome back, {user}."),
        format!("[INFO] Last session: {timestamp}"),
        format!("[WARN] Session from {timestamp} was never closed."),
    ]
}

/// Replace the first occurrence of `from` with `to`.
///
/// When the line holding the marker starts with a `[TAG]`, the tag becomes
/// `severity`. Returns `None` when `from` does not occur.
pub fn rewrite_marker(text: &str, from: &str, to: &str, severity: Severity) -> Option<String> {
    let at = text.find(from)?;
    let line_start = text[..at].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &text[line_start..at];

    let mut out = String::with_capacity(text.len() + to.len());
    out.push_str(&text[..line_start]);
    match prefix
        .strip_prefix('[')
        .and_then(|p| p.split_once(']'))
        .map(|(_, rest)| rest)
    {
        Some(rest) => {
            out.push_str(severity.tag());
            out.push_str(rest);
        }
        None => out.push_str(prefix),
    }
    out.push_str(to);
    out.push_str(&text[at + from.len()..]);
    Some(out)
}

/// Append `lines` to `text`, starting on a fresh line.
pub fn append_lines<S: AsRef<str>>(text: &str, lines: &[S]) -> String {
    let mut out = text.to_string();
    for line in lines {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(line.as_ref());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_is_three_info_lines() {
        let started = NaiveTime::from_hms_opt(9, 5, 59).unwrap();
        assert_eq!(
            session_template("Milan", started),
            "[INFO] Session started: 09:05\n[INFO] User: Milan\n[INFO] Environment: stable"
        );
    }

    #[test]
    fn rewrite_escalates_tag_on_marker_line_only() {
        let text = "[INFO] User: x\n[INFO] Environment: stable\n[INFO] tail";
        let out = rewrite_marker(text, MARKER_STABLE, MARKER_INSTABLE, Severity::Warn).unwrap();
        assert_eq!(
            out,
            "[INFO] User: x\n[WARN] Environment: instable\n[INFO] tail"
        );
    }

    #[test]
    fn rewrite_without_tag_keeps_prefix() {
        let out = rewrite_marker(
            "note Environment: instable!",
            MARKER_INSTABLE,
            MARKER_UNTRUSTED,
            Severity::Error,
        )
        .unwrap();
        assert_eq!(out, "note Environment: untrustworthy!");
    }

    #[test]
    fn rewrite_missing_marker_is_none() {
        assert!(rewrite_marker("nothing here", MARKER_STABLE, MARKER_INSTABLE, Severity::Warn)
            .is_none());
        // "instable" must not be mistaken for "stable".
        assert!(rewrite_marker(
            "[WARN] Environment: instable",
            MARKER_STABLE,
            MARKER_INSTABLE,
            Severity::Warn
        )
        .is_none());
    }

    #[test]
    fn append_starts_new_line_once() {
        assert_eq!(append_lines("a", &["b", "c"]), "a\nb\nc");
        assert_eq!(append_lines("a\n", &["b"]), "a\nb");
        assert_eq!(append_lines("", &["b"]), "b");
    }
}
