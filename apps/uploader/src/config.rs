//! Uploader configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/resumedrop/uploader.toml`
//! - Windows: `%APPDATA%/resumedrop/uploader.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use resumedrop_protocol::constants::DEFAULT_FOLLOW_UP_DELAY;
use serde::{Deserialize, Serialize};

/// Uploader configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Full URL of the upload route.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Delay before the "you can close" hint after a success, in ms.
    #[serde(default = "default_follow_up_delay_ms")]
    pub follow_up_delay_ms: u64,

    /// Prefix log lines with the local time.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_endpoint() -> String {
    resumedrop_protocol::default_endpoint()
}

fn default_follow_up_delay_ms() -> u64 {
    DEFAULT_FOLLOW_UP_DELAY.as_millis() as u64
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            follow_up_delay_ms: default_follow_up_delay_ms(),
            show_timestamps: default_true(),
        }
    }
}

impl Config {
    /// Loads configuration from the platform path, or creates a default if
    /// not found.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Loads configuration from `path`, writing defaults there if missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Saves the configuration to `path`.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    pub fn follow_up_delay(&self) -> Duration {
        Duration::from_millis(self.follow_up_delay_ms)
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("resumedrop")
            .join("uploader.toml"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata)
            .join("resumedrop")
            .join("uploader.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Ok(PathBuf::from("/tmp/resumedrop/uploader.toml"))
    }
}
