//! Subcommand implementations.
//!
//! Each command writes to the given writer so tests can capture output.

use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use console::style;
use serde::Serialize;
use tracing::debug;

use palettesmith::plugin::{detect, discover, Catalog, Layer, PathLookup, Registry};
use palettesmith::report::ValidationReport;
use palettesmith::template::render_target;
use palettesmith::theme::{ThemeConfig, ThemeStore};
use palettesmith::validate::validate_field;

/// Built-in plugins overlaid with the ones discovered under `plugins_dir`.
pub fn load_registry(plugins_dir: &Path) -> Result<(Registry, Catalog)> {
    debug!(dir = %plugins_dir.display(), "discovering plugins");
    let catalog = discover(plugins_dir);
    let mut registry = Registry::with_builtins().context("built-in plugins failed to load")?;
    registry.extend(catalog.list().iter().cloned(), Layer::External);
    Ok((registry, catalog))
}

/// Prints the validation report. Returns whether everything passed.
pub fn validate(plugins_dir: &Path, out: &mut dyn Write) -> Result<bool> {
    let (registry, catalog) = load_registry(plugins_dir)?;
    let report = ValidationReport::from_registry(&registry, &catalog);

    for err in &report.system_errors {
        writeln!(out, "{} {}", style("error:").red().bold(), err)?;
    }
    for plugin in &report.plugins {
        let status = if plugin.is_valid() {
            style("ok  ").green()
        } else {
            style("FAIL").red().bold()
        };
        writeln!(out, "{} {}", status, plugin.heading())?;
        for line in plugin.details() {
            writeln!(out, "       {}", style(line).dim())?;
        }
    }

    let failed = report.failed();
    if report.is_ok() {
        writeln!(
            out,
            "{}",
            style(format!("{} plugins valid", report.plugins.len())).green()
        )?;
    } else {
        writeln!(
            out,
            "{}",
            style(format!(
                "{} of {} plugins failed validation",
                failed,
                report.plugins.len()
            ))
            .red()
        )?;
    }
    Ok(report.is_ok())
}

#[derive(Debug, Serialize)]
struct ListEntry {
    id: String,
    title: String,
    layer: &'static str,
    detected: bool,
    detection: String,
}

/// Lists every registered plugin with its layer and detection state.
pub fn list(
    plugins_dir: &Path,
    json: bool,
    lookup: &dyn PathLookup,
    out: &mut dyn Write,
) -> Result<()> {
    let (registry, _) = load_registry(plugins_dir)?;
    let entries: Vec<ListEntry> = registry
        .iter()
        .map(|(plugin, layer)| {
            let detection = detect(plugin, lookup);
            ListEntry {
                id: plugin.id().to_string(),
                title: plugin.title().to_string(),
                layer: layer.as_str(),
                detected: detection.is_detected(),
                detection: detection.to_string(),
            }
        })
        .collect();

    if json {
        serde_json::to_writer_pretty(&mut *out, &entries)?;
        writeln!(out)?;
        return Ok(());
    }

    for entry in &entries {
        let detection = if entry.detected {
            style(entry.detection.as_str()).green()
        } else {
            style(entry.detection.as_str()).dim()
        };
        writeln!(
            out,
            "{:<16} {:<20} {:<9} {}",
            style(&entry.id).bold(),
            entry.title,
            entry.layer,
            detection
        )?;
    }
    Ok(())
}

/// Renders one plugin's config fragment.
///
/// `sets` become overrides for the plugin, each validated against its field.
pub fn render(
    plugins_dir: &Path,
    id: &str,
    theme: Option<&Path>,
    sets: &[(String, String)],
    out: &mut dyn Write,
) -> Result<()> {
    let (registry, _) = load_registry(plugins_dir)?;
    let plugin = registry
        .get(id)
        .ok_or_else(|| anyhow!("unknown plugin '{}'", id))?;

    let config = match theme {
        Some(path) => ThemeConfig::load(path)?,
        None => ThemeConfig::default(),
    };
    let mut store = ThemeStore::new(config);

    for (key, value) in sets {
        let field = plugin
            .spec
            .field(key)
            .ok_or_else(|| anyhow!("plugin '{}' has no field '{}'", plugin.id(), key))?;
        let errors = validate_field(field, value);
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            bail!("invalid value for {}: {}", key, messages.join("; "));
        }
        store.set_override_for_field(plugin.id(), field, value);
    }

    let rendered = render_target(plugin, &store)
        .with_context(|| format!("failed to render plugin '{}'", plugin.id()))?;
    for fallback in &rendered.fallbacks {
        eprintln!(
            "{} {} could not parse {:?}: {}",
            style("warning:").yellow().bold(),
            fallback.helper,
            fallback.input,
            fallback.reason
        );
    }
    out.write_all(rendered.text.as_bytes())?;
    Ok(())
}
