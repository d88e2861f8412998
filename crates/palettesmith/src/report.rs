//! Whole-catalog validation report.
//!
//! A [`ValidationReport`] lists every plugin candidate with its state:
//! valid, failed to load, structurally invalid, template broken, or carrying
//! field defaults that fail their own constraints. Nothing short-circuits;
//! one broken plugin never hides the state of the others.

use std::fmt;

use crate::error::ValidationError;
use crate::plugin::{Catalog, Layer, Plugin, Registry};
use crate::template::Renderer;
use crate::validate::{validate_defaults, validate_plugin};

/// The state of one plugin candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginReport {
    /// Plugin ID, or the directory name when the plugin failed to load.
    pub name: String,
    pub layer: Option<Layer>,
    pub load_errors: Vec<String>,
    pub structural: Vec<ValidationError>,
    pub template: Option<String>,
    pub defaults: Vec<ValidationError>,
}

impl PluginReport {
    /// Runs every check against a loaded plugin.
    pub fn check(plugin: &Plugin, layer: Layer) -> Self {
        Self {
            name: plugin.id().to_string(),
            layer: Some(layer),
            load_errors: Vec::new(),
            structural: validate_plugin(plugin),
            template: Renderer::for_plugin(plugin).err().map(|e| e.to_string()),
            defaults: validate_defaults(plugin),
        }
    }

    /// The plugin name, with its layer when it loaded.
    pub fn heading(&self) -> String {
        match self.layer {
            Some(layer) => format!("{} ({})", self.name, layer),
            None => self.name.clone(),
        }
    }

    /// One line per problem found.
    pub fn details(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .load_errors
            .iter()
            .map(|err| format!("load: {}", err))
            .collect();
        lines.extend(
            self.structural
                .iter()
                .map(|err| format!("{} [{}]", err, err.code)),
        );
        if let Some(err) = &self.template {
            lines.push(format!("template: {}", err));
        }
        lines.extend(
            self.defaults
                .iter()
                .map(|err| format!("default {} [{}]", err, err.code)),
        );
        lines
    }

    pub fn is_valid(&self) -> bool {
        self.load_errors.is_empty()
            && self.structural.is_empty()
            && self.template.is_none()
            && self.defaults.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub plugins: Vec<PluginReport>,
    pub system_errors: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks every usable plugin and lists every load failure of a catalog.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut report = Self::new();
        report.add_catalog(catalog, Layer::External);
        report
    }

    /// Checks the merged registry, plus the load failures of the catalog
    /// its external layer came from.
    pub fn from_registry(registry: &Registry, catalog: &Catalog) -> Self {
        let mut report = Self::new();
        for (plugin, layer) in registry.iter() {
            report.plugins.push(PluginReport::check(plugin, layer));
        }
        report.add_load_failures(catalog);
        report
    }

    pub fn add_catalog(&mut self, catalog: &Catalog, layer: Layer) {
        for plugin in catalog.list() {
            self.plugins.push(PluginReport::check(plugin, layer));
        }
        self.add_load_failures(catalog);
    }

    fn add_load_failures(&mut self, catalog: &Catalog) {
        for (name, errors) in catalog.errors() {
            self.plugins.push(PluginReport {
                name: name.clone(),
                layer: None,
                load_errors: errors.iter().map(ToString::to_string).collect(),
                structural: Vec::new(),
                template: None,
                defaults: Vec::new(),
            });
        }
        self.system_errors
            .extend(catalog.system_errors().iter().map(ToString::to_string));
    }

    pub fn is_ok(&self) -> bool {
        self.system_errors.is_empty() && self.plugins.iter().all(PluginReport::is_valid)
    }

    pub fn failed(&self) -> usize {
        self.plugins.iter().filter(|p| !p.is_valid()).count()
    }
}

impl fmt::Display for PluginReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_valid() { "ok" } else { "FAIL" };
        writeln!(f, "{:<4} {}", status, self.heading())?;
        for line in self.details() {
            writeln!(f, "       {}", line)?;
        }
        Ok(())
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for err in &self.system_errors {
            writeln!(f, "error: {}", err)?;
        }
        for plugin in &self.plugins {
            write!(f, "{}", plugin)?;
        }
        let failed = self.failed();
        if failed == 0 && self.system_errors.is_empty() {
            write!(f, "{} plugins valid", self.plugins.len())
        } else {
            write!(
                f,
                "{} of {} plugins failed validation",
                failed,
                self.plugins.len()
            )
        }
    }
}
