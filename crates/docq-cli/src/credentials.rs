//! Stored bearer tokens
//!
//! Two storage scopes mirror the service's web client: persistent
//! credentials live under the config dir and survive restarts; session
//! credentials live under the runtime dir and are gone after logout or
//! reboot. Lookup prefers the persistent scope. Files are written with
//! mode 0o600 on unix.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Where a credential is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Survives restarts (password logins)
    Persistent,
    /// Cleared on logout or reboot (guest logins)
    Session,
}

impl Scope {
    pub fn name(&self) -> &'static str {
        match self {
            Scope::Persistent => "persistent",
            Scope::Session => "session",
        }
    }
}

/// A stored bearer token plus enough context to describe it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    /// Bearer token attached to every API call
    pub access_token: String,
    /// Refresh token, absent for guest logins
    pub refresh_token: Option<String>,
    /// Username the token was issued to
    pub username: String,
    /// Whether this is a guest identity
    pub is_guest: bool,
    /// Unix millis when the token was stored
    pub saved_at: i64,
}

impl StoredCredentials {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        username: impl Into<String>,
        is_guest: bool,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            username: username.into(),
            is_guest,
            saved_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// File locations for the two credential scopes
pub struct CredentialStore {
    persistent: PathBuf,
    session: PathBuf,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore {
    /// Store at the standard locations
    pub fn new() -> Self {
        let persistent = crate::config::Config::config_dir().join("credentials.json");
        let session = dirs::runtime_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("docq")
            .join("session-token.json");
        Self {
            persistent,
            session,
        }
    }

    /// Store with both scopes rooted at one directory (tests)
    pub fn at(dir: &Path) -> Self {
        Self {
            persistent: dir.join("credentials.json"),
            session: dir.join("session-token.json"),
        }
    }

    fn path(&self, scope: Scope) -> &Path {
        match scope {
            Scope::Persistent => &self.persistent,
            Scope::Session => &self.session,
        }
    }

    /// Save credentials under one scope. The other scope's copy is
    /// removed so the latest login always wins the lookup.
    pub fn save(&self, scope: Scope, credentials: &StoredCredentials) -> io::Result<()> {
        let path = self.path(scope);
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
                // Set directory permissions to 0o700 on Unix
                #[cfg(unix)]
                fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
            }
        }

        let content = serde_json::to_string_pretty(credentials)?;
        fs::write(path, content)?;

        // Set file permissions to 0o600 on Unix (owner read/write only)
        #[cfg(unix)]
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;

        let other = match scope {
            Scope::Persistent => Scope::Session,
            Scope::Session => Scope::Persistent,
        };
        remove_if_present(self.path(other))?;

        Ok(())
    }

    /// Load credentials, checking the persistent scope first
    pub fn load(&self) -> Option<(StoredCredentials, Scope)> {
        for scope in [Scope::Persistent, Scope::Session] {
            let path = self.path(scope);
            if !path.exists() {
                continue;
            }
            match fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(credentials) => return Some((credentials, scope)),
                    Err(e) => {
                        tracing::debug!("ignoring unreadable credentials at {path:?}: {e}");
                    }
                },
                Err(e) => {
                    tracing::debug!("ignoring unreadable credentials at {path:?}: {e}");
                }
            }
        }
        None
    }

    /// Remove credentials from both scopes
    pub fn clear(&self) -> io::Result<()> {
        remove_if_present(&self.persistent)?;
        remove_if_present(&self.session)?;
        Ok(())
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(token: &str, guest: bool) -> StoredCredentials {
        StoredCredentials::new(token, None, "alice", guest)
    }

    #[test]
    fn test_round_trip_persistent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path());

        store.save(Scope::Persistent, &sample("tok-1", false)).unwrap();
        let (loaded, scope) = store.load().unwrap();
        assert_eq!(loaded.access_token, "tok-1");
        assert_eq!(loaded.username, "alice");
        assert_eq!(scope, Scope::Persistent);
    }

    #[test]
    fn test_latest_login_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path());

        store.save(Scope::Persistent, &sample("old", false)).unwrap();
        store.save(Scope::Session, &sample("guest", true)).unwrap();

        // The persistent copy was removed, so the guest token is found
        let (loaded, scope) = store.load().unwrap();
        assert_eq!(loaded.access_token, "guest");
        assert!(loaded.is_guest);
        assert_eq!(scope, Scope::Session);
    }

    #[test]
    fn test_clear_removes_both_scopes() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path());

        store.save(Scope::Session, &sample("tok", true)).unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());

        // Clearing an empty store is fine
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_credential_file_permissions() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path());

        store.save(Scope::Persistent, &sample("tok", false)).unwrap();
        let mode = fs::metadata(dir.path().join("credentials.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
