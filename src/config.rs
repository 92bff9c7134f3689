// Configuration loading and parsing (movienight.toml).
//
// The config file is optional: when none is found the built-in defaults
// (local dev server, 10 second request timeout) apply. Lookup order:
// `config/movienight.toml` under the working directory, then the per-user
// config directory.

use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    Validation { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the movie night server, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout applied by the HTTP client.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_secs: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate the config file at `path`.
///
/// This is the lower-level loading primitive; prefer `load_config()` which
/// searches the standard locations and falls back to defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut config: Config = toml::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    // Tolerate a trailing slash in the file; the client joins paths that
    // start with '/'.
    config.server.base_url = config.server.base_url.trim_end_matches('/').to_string();

    validate(&config)?;
    Ok(config)
}

/// Candidate config file locations, in lookup order.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("config").join("movienight.toml"));
    }
    if let Some(dirs) = ProjectDirs::from("", "", "movienight") {
        paths.push(dirs.config_dir().join("movienight.toml"));
    }
    paths
}

/// Load the configuration from the first existing candidate path, or the
/// built-in defaults when no config file exists.
pub fn load_config() -> Result<Config, ConfigError> {
    for path in candidate_paths() {
        if path.exists() {
            return load_config_from(&path);
        }
    }
    Ok(Config::default())
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let url = &config.server.base_url;
    if url.is_empty() {
        return Err(ConfigError::Validation {
            field: "server.base_url".into(),
            message: "must not be empty".into(),
        });
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation {
            field: "server.base_url".into(),
            message: format!("must start with http:// or https://, got `{url}`"),
        });
    }

    if config.server.request_timeout_secs == 0 {
        return Err(ConfigError::Validation {
            field: "server.request_timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
