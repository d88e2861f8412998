//! Plugins compiled into the binary.

use std::path::Path;

use crate::error::LoadError;
use crate::schema::{PluginManifest, PluginSpec, SpecDocument};
use crate::validate::validate_manifest;

use super::loader::{assemble, parse_document};
use super::{Plugin, PluginOrigin};

struct Embedded {
    manifest_name: &'static str,
    manifest: &'static str,
    spec_name: &'static str,
    spec: &'static str,
    template: &'static str,
}

const BUILTINS: &[Embedded] = &[
    Embedded {
        manifest_name: "builtin/alacritty/plugin.json",
        manifest: include_str!("../../builtin/alacritty/plugin.json"),
        spec_name: "builtin/alacritty/spec.json",
        spec: include_str!("../../builtin/alacritty/spec.json"),
        template: include_str!("../../builtin/alacritty/alacritty.toml.tmpl"),
    },
    Embedded {
        manifest_name: "builtin/hyprland/plugin.yaml",
        manifest: include_str!("../../builtin/hyprland/plugin.yaml"),
        spec_name: "builtin/hyprland/spec.yaml",
        spec: include_str!("../../builtin/hyprland/spec.yaml"),
        template: include_str!("../../builtin/hyprland/hyprland.conf.j2"),
    },
];

/// Parses the embedded plugin definitions through the same schema as
/// discovered plugins.
pub fn builtin_plugins() -> Result<Vec<Plugin>, LoadError> {
    BUILTINS.iter().map(load_embedded).collect()
}

fn load_embedded(embedded: &Embedded) -> Result<Plugin, LoadError> {
    let manifest_path = Path::new(embedded.manifest_name);
    let manifest: PluginManifest = parse_document(manifest_path, embedded.manifest)
        .map_err(|message| LoadError::ManifestMalformed {
            path: manifest_path.to_path_buf(),
            message,
        })?;

    let violations = validate_manifest(&manifest);
    if !violations.is_empty() {
        return Err(LoadError::ManifestInvalid {
            path: manifest_path.to_path_buf(),
            violations,
        });
    }

    let spec_path = Path::new(embedded.spec_name);
    let document: SpecDocument =
        parse_document(spec_path, embedded.spec).map_err(|message| LoadError::SpecMalformed {
            path: spec_path.to_path_buf(),
            message,
        })?;
    let spec = PluginSpec::from_document(document).map_err(|violations| {
        LoadError::SpecInvalid {
            path: spec_path.to_path_buf(),
            violations,
        }
    })?;

    Ok(assemble(
        manifest,
        spec,
        PluginOrigin::Builtin {
            template: embedded.template,
        },
    ))
}
