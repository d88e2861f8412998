//! Theme values and override resolution.
//!
//! A [`ThemeConfig`] holds global field defaults plus per-target overrides.
//! [`ThemeStore`] resolves the effective value for a `(target, field)` pair:
//!
//! 1. the target's override, when present and non-empty
//! 2. the global theme default for the field key, when present
//! 3. the field's own declared default
//!
//! Overrides that merely repeat the effective default are never stored.
//! Target IDs are matched the way plugin IDs are: trimmed and lower-cased.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::plugin::Plugin;
use crate::schema::FieldSpec;

/// Persisted theme values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, BTreeMap<String, String>>,
}

impl ThemeConfig {
    /// Reads a theme file (JSON).
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

    /// Writes the theme as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| write_err(std::io::Error::other(e)))?;
        fs::write(path, json).map_err(write_err)
    }
}

/// Where an effective value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    Override,
    Theme,
    Default,
}

/// Resolves and edits theme values. Not internally synchronized.
#[derive(Debug, Clone, Default)]
pub struct ThemeStore {
    config: ThemeConfig,
}

impl ThemeStore {
    /// Wraps a config, folding override targets onto their normalized IDs.
    pub fn new(mut config: ThemeConfig) -> Self {
        let mut overrides: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for (target, values) in std::mem::take(&mut config.overrides) {
            overrides.entry(target_key(&target)).or_default().extend(values);
        }
        config.overrides = overrides;
        Self { config }
    }

    pub fn config(&self) -> &ThemeConfig {
        &self.config
    }

    pub fn into_config(self) -> ThemeConfig {
        self.config
    }

    /// The effective value for `field_key` on `target_id`.
    pub fn resolve(&self, target_id: &str, field_key: &str, field_default: &str) -> String {
        if let Some(value) = self.override_value(target_id, field_key) {
            return value.to_string();
        }
        if let Some(value) = self.config.defaults.get(field_key) {
            return value.clone();
        }
        field_default.to_string()
    }

    /// The stored, non-empty override for a target field.
    pub fn override_value(&self, target_id: &str, field_key: &str) -> Option<&str> {
        self.config
            .overrides
            .get(&target_key(target_id))
            .and_then(|m| m.get(field_key))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn has_override(&self, target_id: &str, field_key: &str) -> bool {
        self.override_value(target_id, field_key).is_some()
    }

    pub fn has_default(&self, field_key: &str) -> bool {
        self.config.defaults.contains_key(field_key)
    }

    pub fn provenance(&self, target_id: &str, field_key: &str) -> Provenance {
        if self.has_override(target_id, field_key) {
            Provenance::Override
        } else if self.has_default(field_key) {
            Provenance::Theme
        } else {
            Provenance::Default
        }
    }

    /// Stores an override, or removes it when `value` is empty or equals the
    /// global theme default for the key.
    pub fn set_override(&mut self, target_id: &str, field_key: &str, value: &str) {
        let redundant = self
            .config
            .defaults
            .get(field_key)
            .is_some_and(|default| default == value);
        self.store_override(target_id, field_key, value, redundant);
    }

    /// Like [`set_override`](Self::set_override), comparing against the full
    /// effective default: the theme default, else the field's declared default.
    pub fn set_override_for_field(&mut self, target_id: &str, field: &FieldSpec, value: &str) {
        let effective = self
            .config
            .defaults
            .get(&field.key)
            .map(String::as_str)
            .unwrap_or(&field.default);
        let redundant = effective == value;
        self.store_override(target_id, &field.key, value, redundant);
    }

    fn store_override(&mut self, target_id: &str, field_key: &str, value: &str, redundant: bool) {
        if redundant || value.is_empty() {
            self.remove_override(target_id, field_key);
            return;
        }
        self.config
            .overrides
            .entry(target_key(target_id))
            .or_default()
            .insert(field_key.to_string(), value.to_string());
    }

    fn remove_override(&mut self, target_id: &str, field_key: &str) {
        let target = target_key(target_id);
        if let Some(map) = self.config.overrides.get_mut(&target) {
            map.remove(field_key);
            if map.is_empty() {
                self.config.overrides.remove(&target);
            }
        }
    }

    /// Sets a global default and drops any override that now repeats it.
    pub fn set_default(&mut self, field_key: &str, value: &str) {
        self.config
            .defaults
            .insert(field_key.to_string(), value.to_string());
        self.config.overrides.retain(|_, map| {
            if map.get(field_key).is_some_and(|v| v == value) {
                map.remove(field_key);
            }
            !map.is_empty()
        });
    }

    pub fn remove_default(&mut self, field_key: &str) -> Option<String> {
        self.config.defaults.remove(field_key)
    }

    /// Drops every override for a target.
    pub fn clear_overrides(&mut self, target_id: &str) {
        self.config.overrides.remove(&target_key(target_id));
    }

    /// Effective values for every field of a plugin, keyed by field key.
    pub fn effective_values(&self, plugin: &Plugin) -> BTreeMap<String, String> {
        plugin
            .spec
            .fields
            .iter()
            .map(|field| {
                let value = self.resolve(plugin.id(), &field.key, &field.default);
                (field.key.clone(), value)
            })
            .collect()
    }
}

fn target_key(target_id: &str) -> String {
    target_id.trim().to_lowercase()
}
