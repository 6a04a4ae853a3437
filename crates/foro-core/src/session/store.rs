//! Persisted session storage.
//!
//! Stores the auth token and user profile in `<FORO_HOME>/session.json` with
//! restricted permissions (0600). Tokens are never logged in full.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use foro_types::UserProfile;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::config::paths;
use crate::error::{ApiError, ApiResult};

/// On-disk session document with the two well-known keys.
///
/// `user_data` stays a raw JSON value so a corrupt profile is detectable
/// separately from a corrupt file.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct SessionFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    auth_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_data: Option<Value>,
}

/// A hydrated session: the token plus the profile it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub token: String,
    pub profile: UserProfile,
}

/// Single owner of the persisted token/profile slot.
///
/// Token and profile are written and cleared together, never independently.
/// `read` treats a corrupt profile as an absent session and clears the slot.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Creates a store over the default session path.
    pub fn new() -> Self {
        Self {
            path: paths::session_path(),
        }
    }

    /// Creates a store over an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Persists the token and profile together.
    ///
    /// Storage failures are logged and swallowed; a failed save never breaks
    /// the login flow that triggered it.
    pub fn save(&self, token: &str, profile: &UserProfile) {
        if let Err(err) = self.write_session(token, profile) {
            warn!(
                "Failed to persist session for token {}: {err:#}",
                mask_token(token)
            );
        }
    }

    /// Returns the stored session, or `None` when absent.
    ///
    /// Unreadable or unparseable state never surfaces as an error: the slot
    /// is cleared and the visitor is simply signed out.
    pub fn read(&self) -> Option<StoredSession> {
        match self.read_session() {
            Ok(session) => session,
            Err(err) => {
                warn!("Discarding session state ({}): {err}", err.kind);
                self.clear();
                None
            }
        }
    }

    /// Removes the persisted session. Idempotent.
    pub fn clear(&self) {
        if self.path.exists()
            && let Err(err) = fs::remove_file(&self.path)
        {
            warn!("Failed to clear session at {}: {err}", self.path.display());
        }
    }

    /// Replaces the stored profile while keeping the token, used after a
    /// profile edit. No-op when nobody is signed in.
    pub fn update_profile(&self, profile: &UserProfile) {
        if let Some(session) = self.read() {
            self.save(&session.token, profile);
        }
    }

    fn write_session(&self, token: &str, profile: &UserProfile) -> Result<()> {
        let document = SessionFile {
            auth_token: Some(token.to_string()),
            user_data: Some(
                serde_json::to_value(profile).context("Failed to serialize profile")?,
            ),
        };

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(&document).context("Failed to serialize session")?;

        // Write with restricted permissions
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }

    fn read_session(&self) -> ApiResult<Option<StoredSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .map_err(|e| ApiError::corrupt_state(format!("Unreadable session file: {e}")))?;
        let document: SessionFile = serde_json::from_str(&contents)
            .map_err(|e| ApiError::corrupt_state(format!("Invalid session file: {e}")))?;

        let (Some(token), Some(user_data)) = (document.auth_token, document.user_data) else {
            return Ok(None);
        };
        if token.is_empty() {
            return Ok(None);
        }

        let profile: UserProfile = serde_json::from_value(user_data)
            .map_err(|e| ApiError::corrupt_state(format!("Invalid stored profile: {e}")))?;

        Ok(Some(StoredSession { token, profile }))
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns a masked version of a token for display (first 12 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 16 {
        return "***".to_string();
    }
    format!("{}...", &token[..12])
}
