//! Integration tests for palettesmith.
//!
//! Plugins are written to temporary directories and driven through
//! discovery, the registry, the theme store and the renderer together.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use palettesmith::plugin::{discover, Layer, Registry};
use palettesmith::report::ValidationReport;
use palettesmith::schema::{FieldKind, FieldSpec};
use palettesmith::template::{build_field_data, render_target, Renderer, Syntax};
use palettesmith::theme::{Provenance, ThemeConfig, ThemeStore};
use palettesmith::validate::validate_field;
use palettesmith::{LoadError, ValidationCode};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), content).unwrap();
}

/// A JSON plugin with a single `bg` color field.
fn simple_plugin(root: &Path, dir: &str, id: &str, template_file: &str, template: &str) {
    let dir = root.join(dir);
    write(
        &dir,
        "plugin.json",
        &format!(
            r#"{{"id": "{}", "title": "{}", "spec": "spec.json"}}"#,
            id, id
        ),
    );
    write(
        &dir,
        "spec.json",
        &format!(
            r##"{{
                "id": "{}",
                "template_file": "{}",
                "fields": [{{"key": "bg", "label": "Background", "type": "color", "default": "#1e1e2e"}}]
            }}"##,
            id, template_file
        ),
    );
    write(&dir, template_file, template);
}

// ============================================================================
// Discovery
// ============================================================================

#[test]
fn unreadable_manifest_does_not_stop_discovery() {
    let tmp = TempDir::new().unwrap();
    simple_plugin(tmp.path(), "alpha", "alpha", "a.tmpl", "{{.bg}}");
    simple_plugin(tmp.path(), "gamma", "gamma", "g.tmpl", "{{.bg}}");
    // A directory where the manifest file should be cannot be read.
    fs::create_dir_all(tmp.path().join("beta").join("plugin.json")).unwrap();

    let catalog = discover(tmp.path());

    assert_eq!(catalog.len(), 2);
    assert!(catalog.get("alpha").is_some());
    assert!(catalog.get("gamma").is_some());
    assert!(catalog.has_errors("beta"));
    assert!(matches!(
        catalog.errors()["beta"][0],
        LoadError::ManifestUnreadable { .. }
    ));
}

#[test]
fn duplicate_ids_keep_the_first() {
    let tmp = TempDir::new().unwrap();
    simple_plugin(tmp.path(), "a-first", "kitty", "k.tmpl", "first");
    simple_plugin(tmp.path(), "b-second", "Kitty", "k.tmpl", "second");

    let catalog = discover(tmp.path());

    assert_eq!(catalog.len(), 1);
    let kept = catalog.get("KITTY").unwrap();
    assert!(kept.dir().unwrap().ends_with("a-first"));
    assert!(matches!(
        catalog.errors()["b-second"][0],
        LoadError::DuplicateId { .. }
    ));
}

#[test]
fn yaml_plugin_loads() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("waybar");
    write(
        &dir,
        "plugin.yml",
        "id: Waybar\ntitle: Waybar\nspec: spec.yaml\nuser_paths:\n  - ~/.config/waybar/style.css\n",
    );
    write(
        &dir,
        "spec.yaml",
        "template_file: style.css.j2\nfields:\n  - key: bar_bg\n    type: color\n    default: \"#11111b\"\n  - key: height\n    type: number\n    default: 30\n    min: 10\n    max: 80\n",
    );
    write(&dir, "style.css.j2", "window { background: {{ bar_bg }}; height: {{ height }}px; }\n");

    let catalog = discover(tmp.path());
    let plugin = catalog.get("waybar").unwrap();
    assert_eq!(plugin.id(), "waybar");
    assert_eq!(plugin.spec.id, "waybar");
    assert!(!plugin.manifest.user_paths[0].starts_with('~'));

    let store = ThemeStore::new(ThemeConfig::default());
    let rendered = render_target(plugin, &store).unwrap();
    assert_eq!(
        rendered.text,
        "window { background: #11111b; height: 30px; }\n"
    );
}

#[test]
fn null_default_in_json_spec_loads() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("foot");
    write(
        &dir,
        "plugin.json",
        r#"{"id": "foot", "title": "Foot", "spec": "spec.json"}"#,
    );
    write(
        &dir,
        "spec.json",
        r#"{"template_file": "foot.ini.tmpl", "fields": [{"key": "font", "type": "text", "default": null}, {"key": "cursor", "type": "select", "enum": null}]}"#,
    );
    write(&dir, "foot.ini.tmpl", "font={{.font}}\n");

    let catalog = discover(tmp.path());
    assert!(!catalog.has_errors("foot"), "{:?}", catalog.errors());
    let plugin = catalog.get("foot").unwrap();
    assert_eq!(plugin.spec.fields[0].default, "");
    assert_eq!(
        plugin.spec.fields[1].kind,
        FieldKind::Select { options: vec![] }
    );
}

#[test]
fn bare_default_in_yaml_spec_loads() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("mako");
    write(&dir, "plugin.yaml", "id: mako\ntitle: Mako\nspec: spec.yaml\n");
    write(
        &dir,
        "spec.yaml",
        "template_file: config.tmpl\nfields:\n  - key: font\n    type: text\n    default:\n",
    );
    write(&dir, "config.tmpl", "font={{.font}}\n");

    let catalog = discover(tmp.path());
    assert_eq!(catalog.len(), 1);
    let plugin = catalog.get("mako").unwrap();
    assert_eq!(plugin.spec.fields[0].default, "");

    let rendered = render_target(plugin, &ThemeStore::new(ThemeConfig::default())).unwrap();
    assert_eq!(rendered.text, "font=\n");
}

// ============================================================================
// Registry layers
// ============================================================================

#[test]
fn external_plugin_overrides_builtin() {
    let tmp = TempDir::new().unwrap();
    simple_plugin(tmp.path(), "alacritty", "alacritty", "custom.tmpl", "bg={{.bg}}");

    let mut registry = Registry::with_builtins().unwrap();
    let builtin_count = registry.len();
    assert_eq!(registry.layer("alacritty"), Some(Layer::Builtin));

    registry.extend(discover(tmp.path()).into_plugins(), Layer::External);

    assert_eq!(registry.len(), builtin_count);
    assert_eq!(registry.layer("alacritty"), Some(Layer::External));
    let plugin = registry.get("alacritty").unwrap();
    assert!(!plugin.is_builtin());

    let store = ThemeStore::new(ThemeConfig::default());
    assert_eq!(render_target(plugin, &store).unwrap().text, "bg=#1e1e2e");
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn end_to_end_value_substitution() {
    let tmp = TempDir::new().unwrap();
    simple_plugin(tmp.path(), "demo", "demo", "demo.tmpl", "{{.bg}}");
    let catalog = discover(tmp.path());
    let plugin = catalog.get("demo").unwrap();

    let renderer = Renderer::for_plugin(plugin).unwrap();
    let mut values = BTreeMap::new();
    values.insert("bg".to_string(), "#112233".to_string());
    let data = build_field_data(&plugin.spec.fields, &values);

    assert_eq!(renderer.render(&data).unwrap(), "#112233");
    assert_eq!(
        renderer
            .render(&build_field_data(&plugin.spec.fields, &BTreeMap::new()))
            .unwrap(),
        "#1e1e2e"
    );
}

#[test]
fn minijinja_template_uses_the_same_helpers() {
    let tmp = TempDir::new().unwrap();
    simple_plugin(tmp.path(), "j", "j", "out.conf.j2", "{{ bg | brighten(0.3) }}");
    let catalog = discover(tmp.path());
    let plugin = catalog.get("j").unwrap();

    let renderer = Renderer::for_plugin(plugin).unwrap();
    assert_eq!(renderer.syntax(), Syntax::Jinja);

    let mut store = ThemeStore::new(ThemeConfig::default());
    store.set_default("bg", "#808080");
    assert_eq!(render_target(plugin, &store).unwrap().text, "#a6a6a6");
}

#[test]
fn malformed_color_passes_through_brighten() {
    let renderer = Renderer::from_source("t.tmpl", "{{brighten .bg 0.3}}").unwrap();
    let mut data = BTreeMap::new();
    data.insert("bg".to_string(), "not-a-color".to_string());

    let rendered = renderer.render_detailed(&data).unwrap();
    assert_eq!(rendered.text, "not-a-color");
    assert_eq!(rendered.fallbacks.len(), 1);
    assert_eq!(rendered.fallbacks[0].helper, "brighten");
}

#[test]
fn builtin_hyprland_renders() {
    let registry = Registry::with_builtins().unwrap();
    let plugin = registry.get("hyprland").unwrap();
    let mut store = ThemeStore::new(ThemeConfig::default());
    store.set_override("hyprland", "active_border", "#ff0000");

    let rendered = render_target(plugin, &store).unwrap();
    assert!(rendered.text.contains("rgb(ff0000)"));
    assert!(rendered.fallbacks.is_empty());
}

// ============================================================================
// Theme store and validation
// ============================================================================

#[test]
fn override_equal_to_theme_default_is_dropped() {
    let mut store = ThemeStore::new(ThemeConfig::default());
    store.set_default("bg", "#000000");

    store.set_override("kitty", "bg", "#111111");
    assert_eq!(store.provenance("kitty", "bg"), Provenance::Override);
    assert_eq!(store.resolve("kitty", "bg", "#ffffff"), "#111111");

    store.set_override("kitty", "bg", "#000000");
    assert!(!store.has_override("kitty", "bg"));
    assert_eq!(store.provenance("kitty", "bg"), Provenance::Theme);
    assert!(store.config().overrides.is_empty());

    assert_eq!(store.resolve("kitty", "fg", "#ffffff"), "#ffffff");
    assert_eq!(store.provenance("kitty", "fg"), Provenance::Default);
}

#[test]
fn theme_override_keyed_with_mixed_case_applies() {
    let tmp = TempDir::new().unwrap();
    simple_plugin(tmp.path(), "kitty", "Kitty", "k.tmpl", "bg={{.bg}}");
    let catalog = discover(tmp.path());
    let plugin = catalog.get("kitty").unwrap();

    let config: ThemeConfig =
        serde_json::from_str(r##"{"overrides": {"Kitty": {"bg": "#123456"}}}"##).unwrap();
    let store = ThemeStore::new(config);
    assert_eq!(store.provenance(plugin.id(), "bg"), Provenance::Override);
    assert_eq!(render_target(plugin, &store).unwrap().text, "bg=#123456");
}

#[test]
fn invalid_color_yields_one_error() {
    let field = FieldSpec::new("bg", FieldKind::Color);
    let errors = validate_field(&field, "#12345");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ValidationCode::InvalidColor);
    assert_eq!(errors[0].field, "bg");
}

#[test]
fn report_covers_builtins_and_discovered() {
    let tmp = TempDir::new().unwrap();
    simple_plugin(tmp.path(), "ok", "ok", "ok.tmpl", "{{.bg}}");
    write(&tmp.path().join("broken"), "plugin.json", "{ not json");

    let catalog = discover(tmp.path());
    let mut registry = Registry::with_builtins().unwrap();
    registry.extend(catalog.list().iter().cloned(), Layer::External);

    let report = ValidationReport::from_registry(&registry, &catalog);
    assert!(!report.is_ok());
    assert_eq!(report.failed(), 1);
    let broken = report.plugins.iter().find(|p| p.name == "broken").unwrap();
    assert_eq!(broken.load_errors.len(), 1);
}
