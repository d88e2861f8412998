//! Plugin discovery, built-ins, registry and installation detection.
//!
//! A [`Plugin`] is a manifest + spec pair plus where it came from. Plugins are
//! immutable once loaded; re-discovery builds a fresh [`Catalog`].
//!
//! ```rust,no_run
//! use palettesmith::plugin::{discover, Layer, Registry};
//!
//! let catalog = discover("/home/ada/.config/palettesmith/plugins".as_ref());
//! let mut registry = Registry::with_builtins()?;
//! registry.extend(catalog.into_plugins(), Layer::External);
//! for (plugin, layer) in registry.iter() {
//!     println!("{} ({})", plugin.id(), layer);
//! }
//! # Ok::<(), palettesmith::LoadError>(())
//! ```

mod builtin;
mod detect;
mod loader;
pub mod paths;
mod registry;

use std::path::{Path, PathBuf};

use crate::schema::{PluginManifest, PluginSpec};

pub use builtin::builtin_plugins;
pub use detect::{detect, Detection, PathLookup, SystemLookup};
pub use loader::{discover, load_plugin, Catalog, MANIFEST_FILES};
pub use registry::{Layer, Registry};

/// Where a plugin definition came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginOrigin {
    /// Compiled into the binary; carries the embedded template source.
    Builtin { template: &'static str },
    /// Loaded from a plugin directory on disk.
    Directory(PathBuf),
}

/// A loaded plugin: manifest, typed spec and origin.
#[derive(Debug, Clone)]
pub struct Plugin {
    pub manifest: PluginManifest,
    pub spec: PluginSpec,
    pub origin: PluginOrigin,
}

impl Plugin {
    /// The lower-cased plugin ID.
    pub fn id(&self) -> &str {
        &self.manifest.id
    }

    pub fn title(&self) -> &str {
        &self.manifest.title
    }

    /// The plugin directory, for plugins loaded from disk.
    pub fn dir(&self) -> Option<&Path> {
        match &self.origin {
            PluginOrigin::Directory(dir) => Some(dir),
            PluginOrigin::Builtin { .. } => None,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.origin, PluginOrigin::Builtin { .. })
    }
}
