//! Structural and value validation.
//!
//! All validators return the complete list of violations; an empty list means
//! valid. Nothing here fails fast.

use std::collections::HashSet;

use palettesmith_color::normalize;

use crate::error::{ValidationCode, ValidationError};
use crate::plugin::Plugin;
use crate::schema::{FieldKind, FieldSpec, PluginManifest, RESTART_METHODS};

/// Checks a manifest's required attributes and, for rich manifests, its
/// files, color definitions and restart method.
pub fn validate_manifest(manifest: &PluginManifest) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if manifest.id.trim().is_empty() {
        errors.push(ValidationError::new(
            "id",
            ValidationCode::MissingId,
            "plugin ID is required",
        ));
    }
    if manifest.title.trim().is_empty() {
        errors.push(ValidationError::new(
            "title",
            ValidationCode::MissingTitle,
            "plugin title is required",
        ));
    }
    if manifest.spec_path.trim().is_empty() {
        errors.push(ValidationError::new(
            "spec",
            ValidationCode::MissingSpec,
            "spec path is required",
        ));
    }

    if !manifest.is_rich() {
        return errors;
    }

    if !manifest.files.iter().any(|f| !f.path.trim().is_empty()) {
        errors.push(ValidationError::new(
            "files",
            ValidationCode::MissingFiles,
            "at least one file target with a path is required",
        ));
    }

    for (index, color) in manifest.colors.iter().enumerate() {
        let id = color.id.trim();
        let name = if id.is_empty() {
            errors.push(ValidationError::new(
                format!("colors[{}].id", index),
                ValidationCode::MissingId,
                "color entry is missing an id",
            ));
            format!("colors[{}]", index)
        } else {
            format!("colors.{}", id)
        };
        if !color.has_target_hint() {
            errors.push(ValidationError::new(
                name,
                ValidationCode::MissingTargetHint,
                "color has no targeting hints",
            ));
        }
    }

    if let Some(restart) = &manifest.restart {
        let method = restart.method.trim();
        if !method.is_empty() && !RESTART_METHODS.contains(&method) {
            errors.push(ValidationError::new(
                "restart.method",
                ValidationCode::InvalidRestart,
                format!(
                    "unknown restart method '{}': expected one of {}",
                    method,
                    RESTART_METHODS.join(", ")
                ),
            ));
        }
    }

    errors
}

/// Checks one raw value against a field's constraints.
///
/// An empty value is accepted when the field declares a default, since the
/// default is what gets rendered.
pub fn validate_field(field: &FieldSpec, value: &str) -> Vec<ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        if field.has_default() {
            return Vec::new();
        }
        return vec![ValidationError::new(
            &field.key,
            ValidationCode::Required,
            "field is required",
        )];
    }

    let error = match &field.kind {
        FieldKind::Text => None,
        FieldKind::Color => normalize(value).err().map(|err| {
            ValidationError::new(
                &field.key,
                ValidationCode::InvalidColor,
                format!("invalid color format: {}", err),
            )
        }),
        FieldKind::Number { min, max } => check_number(&field.key, value, *min, *max),
        FieldKind::Select { options } => {
            if options.is_empty() || options.iter().any(|o| o == value) {
                None
            } else {
                Some(ValidationError::new(
                    &field.key,
                    ValidationCode::InvalidOption,
                    format!("must be one of: {}", options.join(", ")),
                ))
            }
        }
    };

    error.into_iter().collect()
}

/// Parses with `.` as the only decimal separator and rejects non-finite values.
fn check_number(
    key: &str,
    value: &str,
    min: Option<f64>,
    max: Option<f64>,
) -> Option<ValidationError> {
    let num = match value.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => {
            return Some(ValidationError::new(
                key,
                ValidationCode::InvalidNumber,
                "must be a valid number",
            ))
        }
    };

    if let Some(min) = min {
        if num < min {
            return Some(ValidationError::new(
                key,
                ValidationCode::BelowMinimum,
                format!("must be at least {}", min),
            ));
        }
    }
    if let Some(max) = max {
        if num > max {
            return Some(ValidationError::new(
                key,
                ValidationCode::AboveMaximum,
                format!("must be at most {}", max),
            ));
        }
    }
    None
}

/// Checks a loaded plugin's manifest and spec structure.
pub fn validate_plugin(plugin: &Plugin) -> Vec<ValidationError> {
    let mut errors = validate_manifest(&plugin.manifest);

    if plugin.spec.id.trim().is_empty() {
        errors.push(ValidationError::new(
            "spec.id",
            ValidationCode::MissingId,
            "spec ID is required",
        ));
    }

    let mut seen = HashSet::new();
    for (index, field) in plugin.spec.fields.iter().enumerate() {
        let name = if field.key.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("fields[{}]", index),
                ValidationCode::MissingKey,
                "field key is required",
            ));
            format!("fields[{}]", index)
        } else {
            if !seen.insert(field.key.as_str()) {
                errors.push(ValidationError::new(
                    &field.key,
                    ValidationCode::DuplicateKey,
                    format!("duplicate field key '{}'", field.key),
                ));
            }
            field.key.clone()
        };

        match &field.kind {
            FieldKind::Number {
                min: Some(min),
                max: Some(max),
            } if min > max => {
                errors.push(ValidationError::new(
                    name,
                    ValidationCode::InvalidBounds,
                    format!("min {} is greater than max {}", min, max),
                ));
            }
            FieldKind::Select { options } if options.is_empty() => {
                errors.push(ValidationError::new(
                    name,
                    ValidationCode::EmptyOptions,
                    "select field declares no options",
                ));
            }
            _ => {}
        }
    }

    errors
}

/// Validates every declared default of a plugin's fields.
pub fn validate_defaults(plugin: &Plugin) -> Vec<ValidationError> {
    plugin
        .spec
        .fields
        .iter()
        .filter(|f| f.has_default())
        .flat_map(|f| validate_field(f, &f.default))
        .collect()
}
