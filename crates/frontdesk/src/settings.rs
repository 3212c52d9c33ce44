//! Persistent CLI settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use frontdesk_core::SearchConfig;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "FRONTDESK_API_URL";
/// Environment variable overriding the API token.
pub const API_TOKEN_ENV: &str = "FRONTDESK_API_TOKEN";

/// Settings that persist across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the dashboard backend.
    pub api_base_url: String,
    /// Bearer token, if the backend requires one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Per-request timeout.
    pub request_timeout_secs: u64,
    /// Quiet time before an interactive search runs.
    pub search_debounce_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api/".to_string(),
            api_token: None,
            request_timeout_secs: 15,
            search_debounce_ms: 300,
        }
    }
}

impl Settings {
    /// `<config dir>/frontdesk/settings.json`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("frontdesk")
            .join("settings.json")
    }

    /// Loads settings from `path`; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    /// Writes settings to `path`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub async fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, contents).await?;
        tracing::info!("Settings saved to {:?}", path);
        Ok(())
    }

    /// Applies environment overrides, then an explicit URL flag.
    #[must_use]
    pub fn with_overrides(
        mut self,
        env: impl Fn(&str) -> Option<String>,
        api_url_flag: Option<&str>,
    ) -> Self {
        if let Some(url) = env(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(token) = env(API_TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_token = Some(token);
        }
        if let Some(url) = api_url_flag {
            self.api_base_url = url.to_string();
        }
        self
    }

    /// Request timeout as a duration.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Search configuration with the configured debounce and timeout.
    #[must_use]
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::default()
            .with_debounce(Duration::from_millis(self.search_debounce_ms))
            .with_source_timeout(self.request_timeout())
    }
}
