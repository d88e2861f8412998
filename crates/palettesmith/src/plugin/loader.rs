//! Directory-based plugin discovery.
//!
//! Each immediate subdirectory of the plugin root is one candidate, keyed by
//! its directory name. A broken candidate records its errors under that key
//! and never stops the scan.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::LoadError;
use crate::schema::{PluginManifest, PluginSpec, SpecDocument};
use crate::validate::validate_manifest;

use super::{Plugin, PluginOrigin};

/// Manifest file names, in lookup order.
pub const MANIFEST_FILES: &[&str] = &["plugin.json", "plugin.yaml", "plugin.yml"];

/// The result of scanning a plugin root.
#[derive(Debug, Default)]
pub struct Catalog {
    plugins: Vec<Plugin>,
    by_id: HashMap<String, usize>,
    errors: BTreeMap<String, Vec<LoadError>>,
    system_errors: Vec<LoadError>,
}

impl Catalog {
    /// Usable plugins in discovery order.
    pub fn list(&self) -> &[Plugin] {
        &self.plugins
    }

    /// Case-insensitive lookup by plugin ID.
    pub fn get(&self, id: &str) -> Option<&Plugin> {
        self.by_id
            .get(&id.to_lowercase())
            .map(|&index| &self.plugins[index])
    }

    /// Per-candidate load errors, keyed by directory name.
    pub fn errors(&self) -> &BTreeMap<String, Vec<LoadError>> {
        &self.errors
    }

    pub fn has_errors(&self, key: &str) -> bool {
        self.errors.contains_key(key)
    }

    /// Errors that concern the plugin root rather than a single candidate.
    pub fn system_errors(&self) -> &[LoadError] {
        &self.system_errors
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn into_plugins(self) -> Vec<Plugin> {
        self.plugins
    }

    fn record(&mut self, key: &str, err: LoadError) {
        warn!(plugin = key, error = %err, "failed to load plugin");
        self.errors.entry(key.to_string()).or_default().push(err);
    }

    fn insert(&mut self, key: &str, plugin: Plugin) {
        if let Some(&index) = self.by_id.get(plugin.id()) {
            let first = self.plugins[index]
                .dir()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            let id = plugin.manifest.id.clone();
            self.record(key, LoadError::DuplicateId { id, first });
            return;
        }
        debug!(plugin = plugin.id(), fields = plugin.spec.fields.len(), "loaded plugin");
        self.by_id.insert(plugin.id().to_string(), self.plugins.len());
        self.plugins.push(plugin);
    }
}

/// Scans `root` for plugin directories.
///
/// A missing root yields an empty catalog. An unreadable root yields an empty
/// catalog with a system error.
pub fn discover(root: &Path) -> Catalog {
    let mut catalog = Catalog::default();

    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(root = %root.display(), "plugin root does not exist");
            return catalog;
        }
        Err(source) => {
            let err = LoadError::RootUnreadable {
                dir: root.to_path_buf(),
                source,
            };
            warn!(error = %err, "plugin discovery failed");
            catalog.system_errors.push(err);
            return catalog;
        }
    };

    let mut dirs: Vec<(String, PathBuf)> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|entry| (entry.file_name().to_string_lossy().into_owned(), entry.path()))
        .collect();
    dirs.sort_by(|a, b| a.0.cmp(&b.0));

    for (key, dir) in dirs {
        match load_plugin(&dir) {
            Ok(plugin) => catalog.insert(&key, plugin),
            Err(err) => catalog.record(&key, err),
        }
    }

    catalog
}

/// Loads a single plugin directory.
pub fn load_plugin(dir: &Path) -> Result<Plugin, LoadError> {
    let manifest_path = MANIFEST_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
        .ok_or_else(|| LoadError::ManifestMissing {
            dir: dir.to_path_buf(),
        })?;

    let content =
        fs::read_to_string(&manifest_path).map_err(|source| LoadError::ManifestUnreadable {
            path: manifest_path.clone(),
            source,
        })?;
    let manifest: PluginManifest =
        parse_document(&manifest_path, &content).map_err(|message| {
            LoadError::ManifestMalformed {
                path: manifest_path.clone(),
                message,
            }
        })?;

    let violations = validate_manifest(&manifest);
    if !violations.is_empty() {
        return Err(LoadError::ManifestInvalid {
            path: manifest_path,
            violations,
        });
    }

    let spec_path = dir.join(&manifest.spec_path);
    let content = fs::read_to_string(&spec_path).map_err(|source| LoadError::SpecUnreadable {
        path: spec_path.clone(),
        source,
    })?;
    let document: SpecDocument = parse_document(&spec_path, &content)
        .map_err(|message| LoadError::SpecMalformed {
            path: spec_path.clone(),
            message,
        })?;
    let spec = PluginSpec::from_document(document).map_err(|violations| {
        LoadError::SpecInvalid {
            path: spec_path,
            violations,
        }
    })?;

    Ok(assemble(manifest, spec, PluginOrigin::Directory(dir.to_path_buf())))
}

/// Normalizes IDs and paths once a manifest and spec are parsed.
pub(crate) fn assemble(
    mut manifest: PluginManifest,
    mut spec: PluginSpec,
    origin: PluginOrigin,
) -> Plugin {
    manifest.id = manifest.id.trim().to_lowercase();
    if spec.id.trim().is_empty() {
        spec.id = manifest.id.clone();
    }
    manifest.expand_paths();
    Plugin {
        manifest,
        spec,
        origin,
    }
}

/// Parses JSON or YAML, chosen by file extension (JSON when unknown).
pub(crate) fn parse_document<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T, String> {
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }
}
