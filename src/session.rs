//! Dashboard session credential storage
//!
//! The credential is the value of the `WorkosCursorSessionToken` cookie from
//! a logged-in browser session. Only the remote pull reads it.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::storage;

/// Name of the dashboard session cookie
pub const SESSION_COOKIE: &str = "WorkosCursorSessionToken";

/// A stored session cookie value
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredential {
    token: String,
    /// Unix timestamp (seconds) when the credential was saved
    pub saved_at: i64,
}

impl std::fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCredential")
            .field("token", &"<redacted>")
            .field("saved_at", &self.saved_at)
            .finish()
    }
}

impl SessionCredential {
    /// Accepts the bare value or `WorkosCursorSessionToken=<value>`
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let token = input
            .strip_prefix(SESSION_COOKIE)
            .and_then(|rest| rest.trim_start().strip_prefix('='))
            .unwrap_or(input)
            .trim()
            .trim_end_matches(';')
            .trim();

        if token.is_empty() {
            bail!("Cookie value is empty");
        }
        if token.chars().any(|c| c.is_whitespace() || c == ';') {
            bail!("Cookie value must be a single token without spaces or ';'");
        }

        Ok(Self {
            token: token.to_string(),
            saved_at: chrono::Utc::now().timestamp(),
        })
    }

    /// `Cookie` header value for dashboard requests
    pub fn cookie_header(&self) -> String {
        format!("{}={}", SESSION_COOKIE, self.token)
    }
}

/// Session credential stored in a JSON file
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open_default() -> Result<Self> {
        Ok(Self::new(crate::config::session_path()?))
    }

    pub fn load(&self) -> Result<Option<SessionCredential>> {
        storage::read_json(&self.path)
    }

    pub fn save(&self, credential: &SessionCredential) -> Result<()> {
        storage::write_json(&self.path, credential)?;
        restrict_permissions(&self.path)
    }

    /// Forget the stored credential; returns whether one existed
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)
            .with_context(|| format!("Failed to remove: {}", self.path.display()))?;
        Ok(true)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to set permissions on: {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &std::path::Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_value() {
        let cred = SessionCredential::parse("  user_01ABC%3A%3Aeyj.x.y \n").unwrap();
        assert_eq!(
            cred.cookie_header(),
            "WorkosCursorSessionToken=user_01ABC%3A%3Aeyj.x.y"
        );
    }

    #[test]
    fn test_parse_with_cookie_name() {
        let cred = SessionCredential::parse("WorkosCursorSessionToken = abc123;").unwrap();
        assert_eq!(cred.cookie_header(), "WorkosCursorSessionToken=abc123");
    }

    #[test]
    fn test_parse_rejects_empty_and_multiple() {
        assert!(SessionCredential::parse("   ").is_err());
        assert!(SessionCredential::parse("WorkosCursorSessionToken=").is_err());
        assert!(SessionCredential::parse("a=1; b=2").is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let cred = SessionCredential::parse("secret-token").unwrap();
        assert!(!format!("{:?}", cred).contains("secret-token"));
    }

    #[test]
    fn test_store_roundtrip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        assert!(store.load().unwrap().is_none());

        let cred = SessionCredential::parse("abc").unwrap();
        store.save(&cred).unwrap();
        assert_eq!(store.load().unwrap(), Some(cred));

        assert!(store.clear().unwrap());
        assert!(!store.clear().unwrap());
        assert!(store.load().unwrap().is_none());
    }
}
