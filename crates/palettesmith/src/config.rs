//! Application configuration: where themes live and which preset laid them out.
//!
//! The config file is `config.json` inside [`config_dir`], which honours
//! `$XDG_CONFIG_HOME` and otherwise falls back to `~/.config/palettesmith`.
//! Discovered plugins live in the `plugins` subdirectory of the same place.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

pub const APP_DIR: &str = "palettesmith";
pub const CONFIG_FILE: &str = "config.json";
pub const PLUGINS_DIR: &str = "plugins";

/// A named layout for theme directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Everything under the palettesmith config directory.
    Generic,
    /// Themes under `~/.config/omarchy`, staging under palettesmith.
    Omarchy,
    /// Reserved; rejected by [`AppConfig::for_preset`].
    Custom,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Generic => "generic",
            Preset::Omarchy => "omarchy",
            Preset::Custom => "custom",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generic" => Ok(Preset::Generic),
            "omarchy" => Ok(Preset::Omarchy),
            "custom" => Ok(Preset::Custom),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}

/// Persisted application settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub target_theme_dir: PathBuf,
    pub current_theme_link: PathBuf,
    pub preset: String,
    pub staging_dir: PathBuf,
}

impl AppConfig {
    /// Paths for a named preset, rooted at the user's directories.
    pub fn for_preset(name: &str) -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Self::for_preset_in(name, &config_dir()?, &home)
    }

    /// Like [`for_preset`](Self::for_preset) with explicit base directories.
    pub fn for_preset_in(name: &str, config_dir: &Path, home: &Path) -> Result<Self, ConfigError> {
        let preset: Preset = name.parse()?;
        let staging_dir = config_dir.join("staging");
        match preset {
            Preset::Generic => Ok(Self {
                target_theme_dir: config_dir.join("themes"),
                current_theme_link: config_dir.join("current").join("theme"),
                preset: preset.to_string(),
                staging_dir,
            }),
            Preset::Omarchy => {
                let omarchy = home.join(".config").join("omarchy");
                Ok(Self {
                    target_theme_dir: omarchy.join("themes"),
                    current_theme_link: omarchy.join("current").join("theme"),
                    preset: preset.to_string(),
                    staging_dir,
                })
            }
            Preset::Custom => Err(ConfigError::UnsupportedPreset(name.to_string())),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `config.json` from `dir`, or returns the generic preset when the
    /// file does not exist yet. The flag is `true` on that first run.
    pub fn load_or_default(dir: &Path) -> Result<(Self, bool), ConfigError> {
        let path = dir.join(CONFIG_FILE);
        match fs::metadata(&path) {
            Ok(_) => Ok((Self::load(&path)?, false)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using generic preset");
                let home = dirs::home_dir().unwrap_or_default();
                Ok((Self::for_preset_in(Preset::Generic.as_str(), dir, &home)?, true))
            }
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }

    /// Writes pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| write_err(std::io::Error::other(e)))?;
        fs::write(path, json).map_err(write_err)
    }
}

/// The palettesmith config directory.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    config_dir_with(
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        dirs::home_dir(),
    )
}

pub fn config_dir_with(
    xdg_config_home: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    match xdg_config_home.filter(|p| p.is_absolute()) {
        Some(base) => Ok(base.join(APP_DIR)),
        None => home
            .map(|h| h.join(".config").join(APP_DIR))
            .ok_or(ConfigError::NoHomeDir),
    }
}

pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Where user plugins are discovered from.
pub fn plugins_dir() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(PLUGINS_DIR))
}
