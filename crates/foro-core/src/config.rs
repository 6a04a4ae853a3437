//! Configuration for the foro client core.
//!
//! Loads configuration from ${FORO_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the configured backend address.
pub const BASE_URL_ENV: &str = "FORO_BASE_URL";

pub mod paths {
    //! Path resolution for foro configuration and session data.
    //!
    //! FORO_HOME resolution order:
    //! 1. FORO_HOME environment variable (if set)
    //! 2. ~/.config/foro (default)

    use std::path::PathBuf;

    /// Returns the foro home directory.
    ///
    /// Checks FORO_HOME env var first, falls back to ~/.config/foro
    pub fn foro_home() -> PathBuf {
        if let Ok(home) = std::env::var("FORO_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("foro"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        foro_home().join("config.toml")
    }

    /// Returns the path to the persisted session file.
    pub fn session_path() -> PathBuf {
        foro_home().join("session.json")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base address of the backend REST API
    pub base_url: String,

    /// Per-request timeout in seconds (0 disables)
    pub timeout_secs: u64,
}

impl Config {
    const DEFAULT_BASE_URL: &str = "http://localhost:8080";
    const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Returns the effective backend address.
    ///
    /// # Errors
    /// Returns an error if the winning value is not a well-formed URL.
    pub fn effective_base_url(&self) -> Result<String> {
        resolve_base_url(Some(&self.base_url), BASE_URL_ENV, Self::DEFAULT_BASE_URL)
    }

    /// Returns the per-request timeout, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_secs))
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Resolves a base URL with precedence: env > config > default.
///
/// Blank values at either level fall through to the next one.
///
/// # Errors
/// Returns an error if the winning URL is not well-formed.
pub fn resolve_base_url(
    config_base_url: Option<&str>,
    env_var: &str,
    default_url: &str,
) -> Result<String> {
    // Try env var first
    if let Ok(env_url) = std::env::var(env_var) {
        let trimmed = env_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed)?;
            return Ok(trimmed.to_string());
        }
    }

    // Try config value
    if let Some(config_url) = config_base_url {
        let trimmed = config_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed)?;
            return Ok(trimmed.to_string());
        }
    }

    // Default
    Ok(default_url.to_string())
}

/// Validates that a URL is well-formed.
fn validate_url(url: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid base URL: {url}"))?;
    Ok(())
}
