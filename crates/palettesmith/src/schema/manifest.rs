//! Plugin manifest model.
//!
//! A manifest is the top-level plugin descriptor: identity, the spec file it
//! points at, the config paths the target application reads, and reload
//! directives. Richer manifests also describe detection rules, target files,
//! color definitions and restart behavior.

use serde::{Deserialize, Serialize};

use crate::plugin::paths::expand_path;

/// Top-level plugin descriptor, read from `plugin.json`/`plugin.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginManifest {
    pub id: String,
    pub title: String,
    /// Spec file, relative to the manifest's directory.
    #[serde(rename = "spec")]
    pub spec_path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub user_paths: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub system_paths: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reload: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection: Option<DetectionRules>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileTarget>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<ColorDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart: Option<RestartConfig>,
}

impl PluginManifest {
    /// True when any of the rich sections is present.
    pub fn is_rich(&self) -> bool {
        self.detection.is_some()
            || !self.files.is_empty()
            || !self.colors.is_empty()
            || self.restart.is_some()
    }

    /// Expands `~` and environment variables in every path-valued entry.
    pub fn expand_paths(&mut self) {
        for path in self
            .user_paths
            .iter_mut()
            .chain(self.system_paths.iter_mut())
        {
            *path = expand_path(path);
        }
        for file in &mut self.files {
            file.path = expand_path(&file.path);
        }
        if let Some(detection) = &mut self.detection {
            for path in &mut detection.config_exists {
                *path = expand_path(path);
            }
        }
    }
}

/// How to tell whether the target application is installed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionRules {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub config_exists: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary_exists: Option<String>,
    /// Parsed for completeness; never evaluated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_running: Option<String>,
}

/// A config file the plugin writes to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTarget {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser: Option<String>,
    pub backup: bool,
    pub optional: bool,
}

/// A named color slot and where it lives in the target's config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorDefinition {
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub default: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub css_variables: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toml_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaml_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_path: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ini_keys: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hypr_variables: Vec<String>,
}

impl ColorDefinition {
    /// True when at least one non-empty targeting hint is declared.
    pub fn has_target_hint(&self) -> bool {
        let non_empty = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        let any_non_empty = |v: &[String]| v.iter().any(|s| !s.trim().is_empty());

        non_empty(&self.toml_path)
            || non_empty(&self.yaml_path)
            || non_empty(&self.json_path)
            || any_non_empty(&self.css_variables)
            || any_non_empty(&self.ini_keys)
            || any_non_empty(&self.hypr_variables)
    }
}

/// Restart directive. `method` is one of `none`, `signal`, `command`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartConfig {
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

/// Accepted restart methods.
pub const RESTART_METHODS: &[&str] = &["none", "signal", "command"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_manifest_json() {
        let m: PluginManifest = serde_json::from_str(
            r#"{"id": "Kitty", "title": "Kitty", "spec": "spec.json", "reload": ["kitty @ load-config"]}"#,
        )
        .unwrap();
        assert_eq!(m.id, "Kitty");
        assert_eq!(m.spec_path, "spec.json");
        assert_eq!(m.reload, vec!["kitty @ load-config"]);
        assert!(!m.is_rich());
    }

    #[test]
    fn test_rich_manifest_yaml() {
        let yaml = r#"
id: waybar
title: Waybar
spec: spec.yaml
detection:
  config_exists: ["~/.config/waybar/config"]
  binary_exists: waybar
files:
  - path: ~/.config/waybar/style.css
    format: css
    backup: true
colors:
  - id: background
    css_variables: ["--bg"]
restart:
  method: signal
  signal: SIGUSR2
  process: waybar
"#;
        let m: PluginManifest = serde_yaml::from_str(yaml).unwrap();
        assert!(m.is_rich());
        assert_eq!(m.files[0].format.as_deref(), Some("css"));
        assert!(m.files[0].backup);
        assert!(!m.files[0].optional);
        assert_eq!(
            m.detection.as_ref().unwrap().binary_exists.as_deref(),
            Some("waybar")
        );
        assert_eq!(m.restart.as_ref().unwrap().method, "signal");
    }

    #[test]
    fn test_target_hint_detection() {
        let mut c = ColorDefinition {
            id: "bg".into(),
            ..Default::default()
        };
        assert!(!c.has_target_hint());

        c.css_variables = vec!["  ".into()];
        assert!(!c.has_target_hint());

        c.toml_path = Some("colors.primary.background".into());
        assert!(c.has_target_hint());
    }

    #[test]
    fn test_serialize_skips_empty_sections() {
        let m = PluginManifest {
            id: "x".into(),
            title: "X".into(),
            spec_path: "spec.json".into(),
            ..Default::default()
        };
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"id":"x","title":"X","spec":"spec.json"}"#);
    }
}
