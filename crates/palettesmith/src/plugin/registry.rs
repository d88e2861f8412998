//! Layered plugin registry.
//!
//! Built-in plugins are registered first, discovered plugins after. A later
//! registration with the same ID replaces the earlier one in place.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::LoadError;

use super::{builtin_plugins, Plugin};

/// Which layer a registry entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Builtin,
    External,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Builtin => "builtin",
            Layer::External => "external",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plugins from every layer, merged last-writer-wins.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<(Plugin, Layer)>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the compiled-in plugins.
    pub fn with_builtins() -> Result<Self, LoadError> {
        let mut registry = Self::new();
        registry.extend(builtin_plugins()?, Layer::Builtin);
        Ok(registry)
    }

    /// Registers a plugin, returning the layer of the entry it replaced.
    ///
    /// A replaced entry keeps its position in [`iter`](Self::iter).
    pub fn register(&mut self, plugin: Plugin, layer: Layer) -> Option<Layer> {
        let id = plugin.id().to_lowercase();
        match self.index.get(&id) {
            Some(&position) => {
                let previous = self.entries[position].1;
                debug!(plugin = %id, from = %previous, to = %layer, "plugin overridden");
                self.entries[position] = (plugin, layer);
                Some(previous)
            }
            None => {
                self.index.insert(id, self.entries.len());
                self.entries.push((plugin, layer));
                None
            }
        }
    }

    pub fn extend<I>(&mut self, plugins: I, layer: Layer)
    where
        I: IntoIterator<Item = Plugin>,
    {
        for plugin in plugins {
            self.register(plugin, layer);
        }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, id: &str) -> Option<&Plugin> {
        self.entry(id).map(|(plugin, _)| plugin)
    }

    pub fn layer(&self, id: &str) -> Option<Layer> {
        self.entry(id).map(|(_, layer)| *layer)
    }

    fn entry(&self, id: &str) -> Option<&(Plugin, Layer)> {
        self.index
            .get(&id.to_lowercase())
            .map(|&position| &self.entries[position])
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Plugin, Layer)> {
        self.entries.iter().map(|(plugin, layer)| (plugin, *layer))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
