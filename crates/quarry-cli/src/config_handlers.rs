//! Handler functions for `quarry config`.
//!
//! Each action renders its report to a `String` before printing, so the
//! rendering is testable without capturing stdout.

use crate::cli::ConfigAction;
use crate::config::QuarryConfig;
use quarry_core::{Error, Result};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

const INIT_HEADER: &str = "\
# Quarry configuration.
# QUARRY_STORE_<FIELD> environment variables override values in this file.

";

/// Handle a config subcommand.
///
/// Receives the raw `--config` path (not a loaded config) because `path`
/// and `init` work before a config file exists.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    let report = match action {
        ConfigAction::Path => describe_paths(config_path)?,
        ConfigAction::Show => QuarryConfig::load(config_path)?.to_toml_string()?,
        ConfigAction::Get { key } => {
            let config = QuarryConfig::load(config_path)?;
            format!("{}\n", lookup(&config, &key)?)
        }
        ConfigAction::Init { file, force } => {
            let path = match file {
                Some(file) => PathBuf::from(file),
                None => QuarryConfig::default_config_path()
                    .ok_or_else(|| Error::config("no platform config directory; pass --file"))?,
            };
            write_default_config(&path, force)?;
            format!("Wrote default configuration to {}\n", path.display())
        }
    };
    print!("{report}");
    Ok(())
}

// ============================================================================
// path
// ============================================================================

/// Report the config file in use, where its path came from, and the cache
/// file the effective configuration points at.
fn describe_paths(config_path: Option<&str>) -> Result<String> {
    let (path, source) = QuarryConfig::locate(config_path)
        .ok_or_else(|| Error::config("no config path; pass --config or set QUARRY_CONFIG"))?;
    let state = if path.exists() {
        "present"
    } else {
        "missing; `quarry config init` creates it"
    };

    let cache = match QuarryConfig::load(config_path) {
        Ok(config) => config.cache_path()?.display().to_string(),
        Err(e) => format!("unknown ({e})"),
    };

    Ok(format!(
        "config: {} ({source}, {state})\ncache:  {cache}\n",
        path.display()
    ))
}

// ============================================================================
// get
// ============================================================================

/// A single setting found by `quarry config get`.
#[derive(Debug, Clone, PartialEq)]
struct Setting {
    key: String,
    value: Value,
    is_default: bool,
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_null() {
            return write!(f, "# {} is not set", self.key);
        }
        write!(f, "{} = {}", self.key, self.value)?;
        if self.is_default {
            write!(f, "  # default")?;
        }
        Ok(())
    }
}

/// Resolve a dotted key such as `store.distance` against the effective
/// configuration, noting whether the value is still the built-in default.
fn lookup(config: &QuarryConfig, key: &str) -> Result<Setting> {
    let pointer = format!("/{}", key.replace('.', "/"));
    let effective = serde_json::to_value(config)?;
    let value = effective
        .pointer(&pointer)
        .ok_or_else(|| Error::not_found("Setting", key))?;
    if value.is_object() {
        return Err(Error::invalid_argument(format!(
            "'{key}' is a section; use `quarry config show`"
        )));
    }

    let defaults = serde_json::to_value(QuarryConfig::default())?;
    Ok(Setting {
        key: key.to_string(),
        value: value.clone(),
        is_default: defaults.pointer(&pointer) == Some(value),
    })
}

// ============================================================================
// init
// ============================================================================

/// Write the default configuration to `path`.
///
/// The rendered file is parsed and validated before anything touches disk.
fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::config(format!(
            "{} already exists; pass --force to replace it",
            path.display()
        )));
    }

    let rendered = format!("{INIT_HEADER}{}", QuarryConfig::default().to_toml_string()?);
    let reparsed: QuarryConfig = toml::from_str(&rendered)
        .map_err(|e| Error::config(format!("rendered config does not parse: {e}")))?;
    reparsed.store.validate()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }
    std::fs::write(path, rendered).map_err(|e| Error::io_with_path(e, path))?;
    log::debug!("Wrote default configuration to {}", path.display());
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
