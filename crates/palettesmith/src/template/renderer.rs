//! Compiled plugin template renderer.
//!
//! [`Renderer`] compiles one template once and renders it with field data.
//! The syntax is chosen by the template's file name: `.jinja`, `.jinja2` and
//! `.j2` use MiniJinja, everything else uses the action syntax.
//!
//! ```rust,no_run
//! use palettesmith::template::{build_field_data, Renderer};
//! # use palettesmith::plugin::Plugin;
//! # fn demo(plugin: &Plugin) -> Result<(), palettesmith::RenderError> {
//! let renderer = Renderer::for_plugin(plugin)?;
//! let data = build_field_data(&plugin.spec.fields, &Default::default());
//! let rendered = renderer.render_detailed(&data)?;
//! for fallback in &rendered.fallbacks {
//!     eprintln!("{} could not parse {:?}", fallback.helper, fallback.input);
//! }
//! print!("{}", rendered.text);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::RenderError;
use crate::plugin::{Plugin, PluginOrigin};
use crate::schema::FieldSpec;
use crate::theme::ThemeStore;

use super::action::ActionEngine;
use super::engine::{FieldData, MiniJinjaEngine, TemplateEngine};
use super::helpers::{FallbackLog, HelperFallback};

/// File extensions rendered with MiniJinja.
pub const JINJA_EXTENSIONS: &[&str] = &["jinja", "jinja2", "j2"];

/// Which template language a file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// `{{.key}}` actions with helper calls and pipes.
    Action,
    /// MiniJinja.
    Jinja,
}

impl Syntax {
    pub fn from_file_name(name: &str) -> Self {
        let is_jinja = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                JINJA_EXTENSIONS
                    .iter()
                    .any(|j| ext.eq_ignore_ascii_case(j))
            });
        if is_jinja {
            Syntax::Jinja
        } else {
            Syntax::Action
        }
    }
}

/// Output of [`Renderer::render_detailed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    /// Color helpers that fell back on a color they could not parse.
    pub fallbacks: Vec<HelperFallback>,
}

/// A compiled template, ready to render.
pub struct Renderer {
    engine: Box<dyn TemplateEngine>,
    name: String,
    syntax: Syntax,
    log: FallbackLog,
}

impl Renderer {
    /// Reads and compiles `template_file` relative to `plugin_dir`.
    pub fn compile(plugin_dir: &Path, template_file: &str) -> Result<Self, RenderError> {
        let path = plugin_dir.join(template_file);
        let source = fs::read_to_string(&path).map_err(|source| RenderError::Unreadable {
            path: path.clone(),
            source,
        })?;
        Self::from_source(template_file, &source)
    }

    /// Compiles template source; `name` picks the syntax.
    pub fn from_source(name: &str, source: &str) -> Result<Self, RenderError> {
        let syntax = Syntax::from_file_name(name);
        let log = FallbackLog::new();
        let mut engine: Box<dyn TemplateEngine> = match syntax {
            Syntax::Jinja => Box::new(MiniJinjaEngine::new(log.clone())),
            Syntax::Action => Box::new(ActionEngine::new(log.clone())),
        };
        engine.add_template(name, source)?;
        debug!(template = name, ?syntax, "compiled template");

        Ok(Self {
            engine,
            name: name.to_string(),
            syntax,
            log,
        })
    }

    /// Compiles a plugin's template from its directory or embedded source.
    pub fn for_plugin(plugin: &Plugin) -> Result<Self, RenderError> {
        let template_file = plugin.spec.template_file.trim();
        if template_file.is_empty() {
            return Err(RenderError::NoTemplate(plugin.id().to_string()));
        }
        match &plugin.origin {
            PluginOrigin::Builtin { template } => Self::from_source(template_file, template),
            PluginOrigin::Directory(dir) => Self::compile(dir, template_file),
        }
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn render(&self, values: &FieldData) -> Result<String, RenderError> {
        self.render_detailed(values).map(|rendered| rendered.text)
    }

    /// Renders and reports every helper fallback that happened.
    pub fn render_detailed(&self, values: &FieldData) -> Result<Rendered, RenderError> {
        self.log.take();
        let text = self.engine.render_named(&self.name, values)?;
        let fallbacks = self.log.take();
        debug!(
            template = %self.name,
            bytes = text.len(),
            fallbacks = fallbacks.len(),
            "rendered template"
        );
        Ok(Rendered { text, fallbacks })
    }
}

/// Field data for rendering: each field's value, or its declared default
/// when the value is missing or empty.
pub fn build_field_data(fields: &[FieldSpec], values: &BTreeMap<String, String>) -> FieldData {
    fields
        .iter()
        .map(|field| {
            let value = values
                .get(&field.key)
                .filter(|v| !v.is_empty())
                .unwrap_or(&field.default);
            (field.key.clone(), value.clone())
        })
        .collect()
}

/// Resolves a plugin's values from the store and renders its template.
pub fn render_target(plugin: &Plugin, store: &ThemeStore) -> Result<Rendered, RenderError> {
    let renderer = Renderer::for_plugin(plugin)?;
    let values = store.effective_values(plugin);
    let data = build_field_data(&plugin.spec.fields, &values);
    renderer.render_detailed(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldKind, PluginManifest, PluginSpec};
    use crate::theme::ThemeConfig;
    use tempfile::TempDir;

    #[test]
    fn test_syntax_by_extension() {
        assert_eq!(Syntax::from_file_name("kitty.conf.j2"), Syntax::Jinja);
        assert_eq!(Syntax::from_file_name("style.css.jinja"), Syntax::Jinja);
        assert_eq!(Syntax::from_file_name("x.JINJA2"), Syntax::Jinja);
        assert_eq!(Syntax::from_file_name("alacritty.toml.tmpl"), Syntax::Action);
        assert_eq!(Syntax::from_file_name("theme"), Syntax::Action);
    }

    #[test]
    fn test_compile_from_dir() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("t.tmpl"), "bg={{.bg}}\n").unwrap();
        let renderer = Renderer::compile(tmp.path(), "t.tmpl").unwrap();
        assert_eq!(renderer.syntax(), Syntax::Action);

        let mut values = FieldData::new();
        values.insert("bg".into(), "#112233".into());
        assert_eq!(renderer.render(&values).unwrap(), "bg=#112233\n");
    }

    #[test]
    fn test_compile_missing_file() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            Renderer::compile(tmp.path(), "missing.tmpl"),
            Err(RenderError::Unreadable { .. })
        ));
    }

    #[test]
    fn test_compile_syntax_error() {
        assert!(matches!(
            Renderer::from_source("t.tmpl", "{{if .x}}"),
            Err(RenderError::Syntax { .. })
        ));
        assert!(matches!(
            Renderer::from_source("t.j2", "{% if %}"),
            Err(RenderError::Syntax { .. })
        ));
    }

    #[test]
    fn test_fallbacks_are_per_render() {
        let renderer = Renderer::from_source("t.tmpl", "{{brighten .bg 0.1}}").unwrap();
        let mut values = FieldData::new();
        values.insert("bg".into(), "garbage".into());

        let first = renderer.render_detailed(&values).unwrap();
        assert_eq!(first.text, "garbage");
        assert_eq!(first.fallbacks.len(), 1);

        values.insert("bg".into(), "#000000".into());
        let second = renderer.render_detailed(&values).unwrap();
        assert!(second.fallbacks.is_empty());
    }

    #[test]
    fn test_hex_to_rgba_stays_rgba_on_bad_color() {
        let mut values = FieldData::new();
        values.insert("bg".into(), "oops".into());
        for name in ["t.tmpl", "t.j2"] {
            let source = if name.ends_with(".j2") {
                "{{ hexToRGBA(bg, 0.5) }}"
            } else {
                "{{hexToRGBA .bg 0.5}}"
            };
            let rendered = Renderer::from_source(name, source)
                .unwrap()
                .render_detailed(&values)
                .unwrap();
            assert_eq!(rendered.text, "rgba(0,0,0,1.0)");
            assert_eq!(rendered.fallbacks.len(), 1);
        }
    }

    #[test]
    fn test_build_field_data_fills_defaults() {
        let fields = vec![
            FieldSpec::new("bg", FieldKind::Color).with_default("#1e1e2e"),
            FieldSpec::new("fg", FieldKind::Color).with_default("#cdd6f4"),
            FieldSpec::new("font", FieldKind::Text),
        ];
        let mut values = BTreeMap::new();
        values.insert("bg".to_string(), "#112233".to_string());
        values.insert("fg".to_string(), String::new());
        values.insert("unrelated".to_string(), "x".to_string());

        let data = build_field_data(&fields, &values);
        assert_eq!(data["bg"], "#112233");
        assert_eq!(data["fg"], "#cdd6f4");
        assert_eq!(data["font"], "");
        assert!(!data.contains_key("unrelated"));
    }

    #[test]
    fn test_render_target_uses_store() {
        let plugin = Plugin {
            manifest: PluginManifest {
                id: "demo".into(),
                title: "Demo".into(),
                spec_path: "spec.json".into(),
                ..Default::default()
            },
            spec: PluginSpec {
                id: "demo".into(),
                title: "Demo".into(),
                template_file: "demo.tmpl".into(),
                fields: vec![
                    FieldSpec::new("bg", FieldKind::Color).with_default("#000000"),
                    FieldSpec::new("fg", FieldKind::Color).with_default("#ffffff"),
                ],
            },
            origin: PluginOrigin::Builtin {
                template: "{{.bg}} {{.fg}}",
            },
        };
        let mut store = ThemeStore::new(ThemeConfig::default());
        store.set_default("bg", "#1e1e2e");
        store.set_override("demo", "fg", "#eeeeee");

        let rendered = render_target(&plugin, &store).unwrap();
        assert_eq!(rendered.text, "#1e1e2e #eeeeee");
    }

    #[test]
    fn test_plugin_without_template() {
        let plugin = Plugin {
            manifest: PluginManifest {
                id: "bare".into(),
                ..Default::default()
            },
            spec: PluginSpec::default(),
            origin: PluginOrigin::Directory("/nowhere".into()),
        };
        assert!(matches!(
            Renderer::for_plugin(&plugin),
            Err(RenderError::NoTemplate(_))
        ));
    }
}
