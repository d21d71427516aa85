//! Logged-in identity and the login roster.
//!
//! A [`Session`] is fixed for the lifetime of one desktop instance and is
//! passed by value into every notepad it opens. [`UserRoster`] checks the
//! credentials typed at login against the configured users.

mod roster;

pub use roster::{LoginError, UserRoster};

/// Display name used when nobody is logged in.
pub const UNKNOWN_USER: &str = "Unknown";

/// The logged-in identity of one desktop instance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    current_user: Option<String>,
}

impl Session {
    /// The name is kept exactly as given; a blank name means nobody.
    pub fn new(current_user: impl Into<String>) -> Self {
        let user = current_user.into();
        Self {
            current_user: (!user.trim().is_empty()).then_some(user),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn current_user(&self) -> Option<&str> {
        self.current_user.as_deref()
    }

    /// The user name, or [`UNKNOWN_USER`].
    pub fn display_name(&self) -> &str {
        self.current_user().unwrap_or(UNKNOWN_USER)
    }

    /// Whether this session belongs to `user` (exact match).
    pub fn is_user(&self, user: &str) -> bool {
        self.current_user() == Some(user)
    }
}

#[cfg(test)]
mod tests;
