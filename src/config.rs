//! Relay configuration shared by client and server
//!
//! Loaded from `~/.config/remote-notify/config.toml` when present, with
//! defaults otherwise. CLI flags and environment variables override the
//! file (see the binary's argument definitions).

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host the client sends to
    #[serde(default = "default_host")]
    pub host: String,
    /// Canonical TCP port; the alternate port is always one above
    #[serde(default = "default_port")]
    pub port: u16,
    /// Hostname on which the listener vacates the canonical port for
    /// SSH-tunnelled senders. Empty disables the port bump.
    #[serde(default)]
    pub home_host: String,
    /// Directory holding the per-source icon files
    #[serde(default = "default_icon_dir")]
    pub icon_dir: PathBuf,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    6683
}

fn default_icon_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "remote-notify")
        .map(|d| d.data_dir().join("icons"))
        .unwrap_or_else(|| std::env::temp_dir().join("remote-notify").join("icons"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            home_host: String::new(),
            icon_dir: default_icon_dir(),
        }
    }
}

impl Config {
    /// Load from the config file, falling back to defaults when the file
    /// does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Path of the config file
    pub fn config_path() -> Result<PathBuf> {
        let base_dirs = directories::BaseDirs::new()
            .ok_or_else(|| anyhow::anyhow!("Failed to determine home directory"))?;
        Ok(base_dirs
            .home_dir()
            .join(".config/remote-notify/config.toml"))
    }
}
