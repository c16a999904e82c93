//! CLI configuration, read from `~/.greenlicense/config.toml`.

use std::path::{Path, PathBuf};

use greenlicense_types::LicenseVersion;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const CONFIG_FILE: &str = "config.toml";
const STORE_FILE: &str = "store.db";

/// Settings loaded from the config file. Every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite store location. Defaults to `~/.greenlicense/store.db`.
    pub store_path: Option<PathBuf>,
    /// License version for `software create` when `--license` is omitted.
    pub default_license_version: LicenseVersion,
}

impl Config {
    /// Loads `~/.greenlicense/config.toml` if it exists.
    pub fn load() -> Self {
        Self::load_from(&config_dir().join(CONFIG_FILE))
    }

    /// Loads config from an explicit path.
    /// Falls back to defaults with a warning on read or parse errors.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!(path = %path.display(), "No config file found, using defaults");
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "Loaded config");
                    config
                }
                Err(e) => {
                    warn!(
                        "Failed to parse config file {}: {}. Falling back to defaults.",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Store location with the default applied.
    pub fn store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| config_dir().join(STORE_FILE))
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".greenlicense")
}
