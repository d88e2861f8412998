//! Plugin definition shapes.
//!
//! - [`PluginManifest`]: identity, spec reference, paths, rich sections
//! - [`SpecDocument`]: the raw spec file
//! - [`PluginSpec`] / [`FieldSpec`] / [`FieldKind`]: the typed field model

mod manifest;
mod spec;

pub use manifest::{
    ColorDefinition, DetectionRules, FileTarget, PluginManifest, RestartConfig, RESTART_METHODS,
};
pub use spec::{FieldDefinition, FieldKind, FieldSpec, PluginSpec, SpecDocument};
