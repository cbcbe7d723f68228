//! Configuration file management for turnnav.
//!
//! Provides a TOML-based config file at `~/.config/turnnav/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use turnnav_db::DbConfig;

/// Model requested from the completions endpoint when none is configured.
pub const DEFAULT_COMPLETIONS_MODEL: &str = "gpt-4o-mini";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    #[serde(default)]
    pub completions: Option<CompletionsSection>,
    #[serde(default)]
    pub retrieval: Option<RetrievalSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionsSection {
    /// Full URL of an OpenAI-compatible chat completions endpoint.
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalSection {
    /// URL of the document retrieval endpoint used by the knowledge service.
    pub url: String,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the turnnav config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/turnnav` or `~/.config/turnnav`.
/// We intentionally ignore the platform-specific `dirs::config_dir()`
/// (which returns `~/Library/Application Support` on macOS).
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("turnnav");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("turnnav")
}

/// Return the path to the turnnav config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix since the file may hold an API key.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct TurnnavConfig {
    pub db_config: DbConfig,
    /// Completion endpoint settings, when one is configured anywhere.
    pub completions: Option<CompletionsConfig>,
    /// Document retrieval endpoint, when one is configured anywhere.
    pub retrieval_url: Option<String>,
}

/// Resolved completion-endpoint settings.
#[derive(Debug, Clone)]
pub struct CompletionsConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl TurnnavConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `TURNNAV_DATABASE_URL` env > `config_file.database.url` > `DbConfig::DEFAULT_URL`
    /// - Completions: `TURNNAV_COMPLETIONS_URL` / `_API_KEY` / `_MODEL` env > `[completions]` section > absent
    /// - Retrieval: `TURNNAV_RETRIEVAL_URL` env > `[retrieval]` section > absent
    pub fn resolve(cli_db_url: Option<&str>) -> Self {
        let file_config = load_config().ok();

        // DB URL resolution.
        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Ok(url) = std::env::var("TURNNAV_DATABASE_URL") {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };
        let db_config = DbConfig::new(db_url);

        // Completions resolution. Each field falls back to the config file
        // independently so an env var can override just the model.
        let file_completions = file_config.as_ref().and_then(|cfg| cfg.completions.clone());
        let completions_url = if let Ok(url) = std::env::var("TURNNAV_COMPLETIONS_URL") {
            Some(url)
        } else {
            file_completions.as_ref().map(|c| c.url.clone())
        };
        let completions = completions_url.map(|url| {
            let api_key = if let Ok(key) = std::env::var("TURNNAV_COMPLETIONS_API_KEY") {
                Some(key)
            } else {
                file_completions.as_ref().and_then(|c| c.api_key.clone())
            };
            let model = if let Ok(model) = std::env::var("TURNNAV_COMPLETIONS_MODEL") {
                model
            } else if let Some(model) = file_completions.as_ref().and_then(|c| c.model.clone()) {
                model
            } else {
                DEFAULT_COMPLETIONS_MODEL.to_string()
            };
            CompletionsConfig { url, api_key, model }
        });

        // Retrieval resolution.
        let retrieval_url = if let Ok(url) = std::env::var("TURNNAV_RETRIEVAL_URL") {
            Some(url)
        } else {
            file_config
                .as_ref()
                .and_then(|cfg| cfg.retrieval.as_ref().map(|r| r.url.clone()))
        };

        Self {
            db_config,
            completions,
            retrieval_url,
        }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
