use log::{info, warn};
use thiserror::Error;

use super::Session;
use crate::config::UserEntry;

/// Why a login was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("unknown user '{0}'")]
    UnknownUser(String),

    #[error("wrong password for '{0}'")]
    WrongPassword(String),
}

/// Users allowed to log in, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct UserRoster {
    users: Vec<UserEntry>,
}

impl UserRoster {
    pub fn new(users: Vec<UserEntry>) -> Self {
        Self { users }
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.users.iter().map(|u| u.username.as_str())
    }

    /// The user preselected on the login screen.
    pub fn default_user(&self) -> Option<&str> {
        self.usernames().next()
    }

    /// Check credentials and open a session.
    ///
    /// With an empty roster every name is accepted and `None` logs in as
    /// "Unknown". Otherwise `None` means the default user.
    pub fn authenticate(
        &self,
        username: Option<&str>,
        password: &str,
    ) -> Result<Session, LoginError> {
        if self.users.is_empty() {
            warn!("No users configured; accepting login without a password check");
            return Ok(username.map(Session::new).unwrap_or_default());
        }

        let requested = username
            .or_else(|| self.default_user())
            .unwrap_or_default();
        let entry = self
            .users
            .iter()
            .find(|u| u.username == requested)
            .ok_or_else(|| LoginError::UnknownUser(requested.to_string()))?;

        if entry.password != password {
            return Err(LoginError::WrongPassword(entry.username.clone()));
        }

        info!("User '{}' logged in", entry.username);
        Ok(Session::new(entry.username.as_str()))
    }
}
