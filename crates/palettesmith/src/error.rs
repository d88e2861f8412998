//! Error types for plugin loading, validation, rendering and configuration.
//!
//! Each failure class has its own type so callers can tell a bad plugin
//! directory ([`LoadError`]) from a bad value ([`ValidationError`]) from a
//! broken template ([`RenderError`]). Color parse failures come from
//! [`palettesmith_color::ColorParseError`].

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// A failure to turn one plugin directory into a usable plugin.
///
/// Load errors are recorded per plugin and never abort discovery of the
/// remaining candidates.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No `plugin.json`/`plugin.yaml`/`plugin.yml` in the plugin directory.
    #[error("manifest not found in {}", dir.display())]
    ManifestMissing { dir: PathBuf },

    /// The manifest file exists but could not be read.
    #[error("failed to read manifest {}: {source}", path.display())]
    ManifestUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid JSON/YAML for the manifest shape.
    #[error("invalid manifest {}: {message}", path.display())]
    ManifestMalformed { path: PathBuf, message: String },

    /// The manifest parsed but failed structural validation.
    #[error("invalid manifest {}: {}", path.display(), join_violations(violations))]
    ManifestInvalid {
        path: PathBuf,
        violations: Vec<ValidationError>,
    },

    /// The spec file referenced by the manifest could not be read.
    #[error("failed to read spec file {}: {source}", path.display())]
    SpecUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The spec file is not valid JSON/YAML for the spec shape.
    #[error("invalid spec {}: {message}", path.display())]
    SpecMalformed { path: PathBuf, message: String },

    /// The spec parsed but its field definitions are invalid.
    #[error("invalid spec {}: {}", path.display(), join_violations(violations))]
    SpecInvalid {
        path: PathBuf,
        violations: Vec<ValidationError>,
    },

    /// Another plugin already claimed this ID (compared case-insensitively).
    #[error("duplicate plugin ID: {id} (already loaded from {})", first.display())]
    DuplicateId { id: String, first: PathBuf },

    /// The plugin root itself could not be listed.
    #[error("failed to read plugins directory {}: {source}", dir.display())]
    RootUnreadable {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Machine-readable validation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCode {
    Required,
    InvalidColor,
    InvalidNumber,
    BelowMinimum,
    AboveMaximum,
    InvalidOption,
    MissingId,
    MissingTitle,
    MissingSpec,
    MissingKey,
    DuplicateKey,
    UnknownType,
    InvalidBounds,
    EmptyOptions,
    MissingFiles,
    MissingTargetHint,
    InvalidRestart,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCode::Required => "required",
            ValidationCode::InvalidColor => "invalid_color",
            ValidationCode::InvalidNumber => "invalid_number",
            ValidationCode::BelowMinimum => "below_minimum",
            ValidationCode::AboveMaximum => "above_maximum",
            ValidationCode::InvalidOption => "invalid_option",
            ValidationCode::MissingId => "missing_id",
            ValidationCode::MissingTitle => "missing_title",
            ValidationCode::MissingSpec => "missing_spec",
            ValidationCode::MissingKey => "missing_key",
            ValidationCode::DuplicateKey => "duplicate_key",
            ValidationCode::UnknownType => "unknown_type",
            ValidationCode::InvalidBounds => "invalid_bounds",
            ValidationCode::EmptyOptions => "empty_options",
            ValidationCode::MissingFiles => "missing_files",
            ValidationCode::MissingTargetHint => "missing_target_hint",
            ValidationCode::InvalidRestart => "invalid_restart",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structural defect or a field constraint violation.
///
/// `field` names the offending field key, or the manifest/spec attribute for
/// structural problems (`"id"`, `"title"`, `"files"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub code: ValidationCode,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code,
        }
    }
}

fn join_violations(violations: &[ValidationError]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error type for template compilation and rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template file could not be read.
    #[error("failed to read template file {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template syntax error, detected at compile time.
    #[error("failed to parse template {name}: {message}")]
    Syntax { name: String, message: String },

    /// The template engine failed while rendering.
    #[error("failed to execute template {name}: {message}")]
    Execution { name: String, message: String },

    /// The plugin has no template to compile.
    #[error("plugin {0} declares no template file")]
    NoTemplate(String),
}

impl RenderError {
    /// Maps a MiniJinja error onto compile/execute variants.
    pub(crate) fn from_minijinja(name: &str, err: minijinja::Error) -> Self {
        use minijinja::ErrorKind;

        match err.kind() {
            ErrorKind::SyntaxError | ErrorKind::BadEscape => RenderError::Syntax {
                name: name.to_string(),
                message: err.to_string(),
            },
            _ => RenderError::Execution {
                name: name.to_string(),
                message: err.to_string(),
            },
        }
    }
}

/// Error type for application config loading and preset selection.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot determine the user's home directory")]
    NoHomeDir,

    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write config {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("preset '{0}' is not yet supported")]
    UnsupportedPreset(String),

    #[error("unknown preset '{0}': supported presets are 'generic', 'omarchy'")]
    UnknownPreset(String),
}
