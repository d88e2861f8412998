//! Best-effort installation detection.
//!
//! Detection only reads the filesystem and `PATH` through a [`PathLookup`];
//! it never mutates state and a negative result is not an error.

use std::fmt;
use std::path::{Path, PathBuf};

use super::Plugin;

/// Abstraction over filesystem and `PATH` queries.
pub trait PathLookup {
    fn exists(&self, path: &Path) -> bool;

    /// Resolves an executable name against `PATH`.
    fn find_binary(&self, name: &str) -> Option<PathBuf>;
}

/// The real filesystem and `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLookup;

impl PathLookup for SystemLookup {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn find_binary(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }
}

/// Outcome of [`detect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    ConfigFound(PathBuf),
    BinaryFound(PathBuf),
    NotDetected,
}

impl Detection {
    pub fn is_detected(&self) -> bool {
        !matches!(self, Detection::NotDetected)
    }
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Detection::ConfigFound(path) => write!(f, "config {}", path.display()),
            Detection::BinaryFound(path) => write!(f, "binary {}", path.display()),
            Detection::NotDetected => f.write_str("not detected"),
        }
    }
}

/// Reports whether the plugin's target application appears to be installed.
///
/// Checks, in order: `detection.config_exists`, `user_paths`, `system_paths`
/// for an existing file, then `detection.binary_exists` on `PATH`.
pub fn detect(plugin: &Plugin, lookup: &dyn PathLookup) -> Detection {
    let manifest = &plugin.manifest;
    let rules = manifest.detection.as_ref();

    let candidates = rules
        .map(|r| r.config_exists.as_slice())
        .unwrap_or_default()
        .iter()
        .chain(&manifest.user_paths)
        .chain(&manifest.system_paths)
        .filter(|p| !p.trim().is_empty());

    for candidate in candidates {
        let path = Path::new(candidate);
        if lookup.exists(path) {
            return Detection::ConfigFound(path.to_path_buf());
        }
    }

    rules
        .and_then(|r| r.binary_exists.as_deref())
        .filter(|name| !name.trim().is_empty())
        .and_then(|name| lookup.find_binary(name))
        .map(Detection::BinaryFound)
        .unwrap_or(Detection::NotDetected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::PluginOrigin;
    use crate::schema::{DetectionRules, PluginManifest, PluginSpec};
    use std::collections::HashSet;

    #[derive(Default)]
    struct FakeLookup {
        files: HashSet<PathBuf>,
        binaries: Vec<(&'static str, PathBuf)>,
    }

    impl PathLookup for FakeLookup {
        fn exists(&self, path: &Path) -> bool {
            self.files.contains(path)
        }

        fn find_binary(&self, name: &str) -> Option<PathBuf> {
            self.binaries
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, p)| p.clone())
        }
    }

    fn plugin(detection: Option<DetectionRules>) -> Plugin {
        Plugin {
            manifest: PluginManifest {
                id: "kitty".into(),
                title: "Kitty".into(),
                spec_path: "spec.json".into(),
                user_paths: vec!["/home/ada/.config/kitty/kitty.conf".into()],
                system_paths: vec!["/etc/xdg/kitty/kitty.conf".into()],
                detection,
                ..Default::default()
            },
            spec: PluginSpec::default(),
            origin: PluginOrigin::Directory("/plugins/kitty".into()),
        }
    }

    fn rules() -> DetectionRules {
        DetectionRules {
            config_exists: vec!["/home/ada/.config/kitty/theme.conf".into()],
            binary_exists: Some("kitty".into()),
            process_running: Some("kitty".into()),
        }
    }

    #[test]
    fn test_config_exists_wins() {
        let mut lookup = FakeLookup::default();
        lookup.files.insert("/home/ada/.config/kitty/theme.conf".into());
        lookup.files.insert("/etc/xdg/kitty/kitty.conf".into());
        lookup.binaries.push(("kitty", "/usr/bin/kitty".into()));

        assert_eq!(
            detect(&plugin(Some(rules())), &lookup),
            Detection::ConfigFound("/home/ada/.config/kitty/theme.conf".into())
        );
    }

    #[test]
    fn test_falls_back_to_manifest_paths() {
        let mut lookup = FakeLookup::default();
        lookup.files.insert("/etc/xdg/kitty/kitty.conf".into());
        assert_eq!(
            detect(&plugin(None), &lookup),
            Detection::ConfigFound("/etc/xdg/kitty/kitty.conf".into())
        );
    }

    #[test]
    fn test_binary_on_path() {
        let mut lookup = FakeLookup::default();
        lookup.binaries.push(("kitty", "/usr/bin/kitty".into()));
        let detection = detect(&plugin(Some(rules())), &lookup);
        assert_eq!(detection, Detection::BinaryFound("/usr/bin/kitty".into()));
        assert!(detection.is_detected());
    }

    #[test]
    fn test_not_detected() {
        let lookup = FakeLookup::default();
        let detection = detect(&plugin(Some(rules())), &lookup);
        assert_eq!(detection, Detection::NotDetected);
        assert_eq!(detection.to_string(), "not detected");
    }
}
