//! Active-user handling.
//!
//! The signed-in username is a display name, not a credential. It lives under
//! the `username` key and selects which `tasks-<username>` list is loaded.

use crate::error::SessionError;
use crate::storage::KeyValueStore;

/// Storage key holding the active username.
pub const USERNAME_KEY: &str = "username";

/// Storage key holding `username`'s task list.
pub fn tasks_key(username: &str) -> String {
    format!("tasks-{username}")
}

/// The resolved active user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    username: String,
}

impl Session {
    /// Read a previously stored username. `None` means the caller must sign in.
    pub fn resolve<S: KeyValueStore + ?Sized>(storage: &S) -> Result<Option<Session>, SessionError> {
        let stored = storage.load(USERNAME_KEY)?;
        Ok(stored
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(|username| Session { username }))
    }

    /// Store `username` (trimmed) as the active user.
    pub fn sign_in<S: KeyValueStore + ?Sized>(storage: &mut S, username: &str) -> Result<Session, SessionError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(SessionError::EmptyUsername);
        }
        storage.save(USERNAME_KEY, username)?;
        tracing::info!(username, "signed in");
        Ok(Session { username: username.to_string() })
    }

    /// Forget the active user. Their task list stays in storage.
    pub fn sign_out<S: KeyValueStore + ?Sized>(storage: &mut S) -> Result<(), SessionError> {
        storage.save(USERNAME_KEY, "")?;
        tracing::info!("signed out");
        Ok(())
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Storage key of this user's task list.
    pub fn tasks_key(&self) -> String {
        tasks_key(&self.username)
    }
}
