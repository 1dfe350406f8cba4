//! Configuration for the Quarry CLI.
//!
//! Provides the [`QuarryConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `QUARRY_CONFIG` environment variable
//! 3. XDG default: `~/.config/quarry/config.toml`
//! 4. Built-in defaults
//!
//! `QUARRY_STORE_*` environment variables override file values.

use confyg::{Confygery, env};
use quarry_core::{Error, Result};
use quarry_store::StoreConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Where the config file path was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// The `--config` flag.
    Flag,
    /// The `QUARRY_CONFIG` environment variable.
    Env,
    /// The platform config directory.
    Default,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag => write!(f, "--config flag"),
            Self::Env => write!(f, "QUARRY_CONFIG"),
            Self::Default => write!(f, "platform default"),
        }
    }
}

/// Main configuration for the Quarry CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuarryConfig {
    /// Store, retrieval and ingestion settings.
    pub store: StoreConfig,
}

impl QuarryConfig {
    /// Load configuration from file, environment, and defaults.
    ///
    /// A missing config file is not an error; the built-in defaults apply.
    /// The loaded configuration is validated before it is returned.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path) {
            if path.exists() {
                builder
                    .add_file(&path.to_string_lossy())
                    .map_err(|e| Error::config(format!("config file: {e}")))?;
            }
        }

        let mut env_opts = env::Options::with_top_level("QUARRY");
        env_opts.add_section("store");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        config.store.validate()?;
        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        Self::locate(explicit).map(|(path, _)| path)
    }

    /// Resolve the config file path along with where it came from.
    pub fn locate(explicit: Option<&str>) -> Option<(PathBuf, ConfigSource)> {
        if let Some(path) = explicit {
            return Some((PathBuf::from(path), ConfigSource::Flag));
        }

        if let Ok(path) = std::env::var("QUARRY_CONFIG") {
            return Some((PathBuf::from(path), ConfigSource::Env));
        }

        Self::default_config_path().map(|path| (path, ConfigSource::Default))
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("quarry").join("config.toml"))
    }

    /// Return the default cache snapshot path under the user data directory.
    pub fn default_cache_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("quarry").join("cache.json"))
    }

    /// Cache snapshot path: configured value, else the data-dir default.
    pub fn cache_path(&self) -> Result<PathBuf> {
        self.store
            .cache_path()
            .or_else(Self::default_cache_path)
            .ok_or_else(|| Error::config("Could not determine a cache path; set store.cache_path"))
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
