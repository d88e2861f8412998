//! Field spec model.
//!
//! [`SpecDocument`] mirrors the on-disk spec file. [`PluginSpec`] is the typed
//! form the rest of the crate works with, produced by
//! [`PluginSpec::from_document`], which collects every structural violation
//! instead of stopping at the first.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ValidationCode, ValidationError};

/// On-disk spec file: template reference plus ordered field definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecDocument {
    pub id: String,
    pub title: String,
    pub template_file: String,
    pub fields: Vec<FieldDefinition>,
}

/// One raw field entry of a spec file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDefinition {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(deserialize_with = "de_scalar_string")]
    pub default: String,
    pub help: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(
        rename = "enum",
        deserialize_with = "de_null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub options: Vec<String>,
}

/// Accepts `"10"`, `10`, `0.5` or `true` and keeps the textual form.
/// `null` (or a bare YAML key) is an empty string.
fn de_scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        String(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        None => String::new(),
        Some(Scalar::String(s)) => s,
        Some(Scalar::Int(i)) => i.to_string(),
        Some(Scalar::Float(f)) => f.to_string(),
        Some(Scalar::Bool(b)) => b.to_string(),
    })
}

fn de_null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The kind of value a field holds.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Color,
    Text,
    Number { min: Option<f64>, max: Option<f64> },
    Select { options: Vec<String> },
}

impl FieldKind {
    /// The type name used in spec files.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Color => "color",
            FieldKind::Text => "text",
            FieldKind::Number { .. } => "number",
            FieldKind::Select { .. } => "select",
        }
    }

    fn from_definition(def: &FieldDefinition) -> Option<Self> {
        match def.field_type.as_str() {
            "color" => Some(FieldKind::Color),
            "text" => Some(FieldKind::Text),
            "number" => Some(FieldKind::Number {
                min: def.min,
                max: def.max,
            }),
            "select" => Some(FieldKind::Select {
                options: def.options.clone(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A typed, validated field definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    pub default: String,
    pub help: String,
}

impl FieldSpec {
    pub fn new(key: impl Into<String>, kind: FieldKind) -> Self {
        let key = key.into();
        Self {
            label: key.clone(),
            key,
            kind,
            default: String::new(),
            help: String::new(),
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = default.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn has_default(&self) -> bool {
        !self.default.trim().is_empty()
    }
}

/// Typed plugin spec: identity, template reference and ordered fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginSpec {
    pub id: String,
    pub title: String,
    pub template_file: String,
    pub fields: Vec<FieldSpec>,
}

impl PluginSpec {
    /// Converts a raw spec document, collecting every violation.
    ///
    /// Fails with `missing_key`, `duplicate_key` or `unknown_type` entries.
    /// Bounds ordering and option presence are left to
    /// [`validate_plugin`](crate::validate::validate_plugin).
    pub fn from_document(doc: SpecDocument) -> Result<Self, Vec<ValidationError>> {
        let mut violations = Vec::new();
        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(doc.fields.len());

        for (index, def) in doc.fields.iter().enumerate() {
            let key = def.key.trim();
            let name = if key.is_empty() {
                violations.push(ValidationError::new(
                    format!("fields[{}]", index),
                    ValidationCode::MissingKey,
                    "field key is required",
                ));
                format!("fields[{}]", index)
            } else {
                if !seen.insert(key.to_string()) {
                    violations.push(ValidationError::new(
                        key,
                        ValidationCode::DuplicateKey,
                        format!("duplicate field key '{}'", key),
                    ));
                }
                key.to_string()
            };

            let Some(kind) = FieldKind::from_definition(def) else {
                let message = if def.field_type.trim().is_empty() {
                    "type is required".to_string()
                } else {
                    format!("invalid type '{}'", def.field_type)
                };
                violations.push(ValidationError::new(name, ValidationCode::UnknownType, message));
                continue;
            };

            fields.push(FieldSpec {
                key: key.to_string(),
                label: if def.label.is_empty() {
                    key.to_string()
                } else {
                    def.label.clone()
                },
                kind,
                default: def.default.clone(),
                help: def.help.clone(),
            });
        }

        if !violations.is_empty() {
            return Err(violations);
        }

        Ok(Self {
            id: doc.id,
            title: doc.title,
            template_file: doc.template_file,
            fields,
        })
    }

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }
}
