//! Template engine abstraction.
//!
//! [`TemplateEngine`] lets the renderer work with either template syntax.
//! [`MiniJinjaEngine`] handles Jinja templates; the action syntax lives in
//! [`ActionEngine`](super::ActionEngine).

use std::collections::BTreeMap;

use minijinja::value::Rest;
use minijinja::{Environment, Error, ErrorKind, Value};

use crate::error::RenderError;

use super::helpers::{Arg, FallbackLog, Helper};

/// Field values keyed by field key, as handed to templates.
pub type FieldData = BTreeMap<String, String>;

/// A template engine that renders named templates with field data.
pub trait TemplateEngine: Send + Sync {
    /// Compiles and stores a template. Syntax errors surface here.
    fn add_template(&mut self, name: &str, source: &str) -> Result<(), RenderError>;

    /// Renders a previously added template.
    fn render_named(&self, name: &str, data: &FieldData) -> Result<String, RenderError>;

    fn has_template(&self, name: &str) -> bool;
}

/// MiniJinja-based engine with the color helpers registered as both
/// functions and filters.
///
/// ```rust
/// use palettesmith::template::{FallbackLog, FieldData, MiniJinjaEngine, TemplateEngine};
///
/// let mut engine = MiniJinjaEngine::new(FallbackLog::new());
/// engine.add_template("t.j2", "{{ bg | brighten(0.3) }}").unwrap();
///
/// let mut data = FieldData::new();
/// data.insert("bg".into(), "#808080".into());
/// assert_eq!(engine.render_named("t.j2", &data).unwrap(), "#a6a6a6");
/// ```
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    pub fn new(log: FallbackLog) -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        register_helpers(&mut env, &log);
        Self { env }
    }

    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn add_template(&mut self, name: &str, source: &str) -> Result<(), RenderError> {
        self.env
            .add_template_owned(name.to_string(), source.to_string())
            .map_err(|e| RenderError::from_minijinja(name, e))
    }

    fn render_named(&self, name: &str, data: &FieldData) -> Result<String, RenderError> {
        let tmpl = self
            .env
            .get_template(name)
            .map_err(|e| RenderError::from_minijinja(name, e))?;
        tmpl.render(Value::from_serialize(data))
            .map_err(|e| RenderError::from_minijinja(name, e))
    }

    fn has_template(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }
}

/// Registers every [`Helper`] under its name, as a function and as a filter.
///
/// As a filter the piped value is the first argument:
/// `{{ a | mix(b, 0.5) }}` is `mix(a, b, 0.5)`.
pub fn register_helpers(env: &mut Environment<'static>, log: &FallbackLog) {
    for helper in Helper::ALL {
        env.add_function(helper.name(), helper_fn(helper, log.clone()));
        env.add_filter(helper.name(), helper_fn(helper, log.clone()));
    }
}

fn helper_fn(
    helper: Helper,
    log: FallbackLog,
) -> impl Fn(Rest<Value>) -> Result<String, Error> + Send + Sync + 'static {
    move |args: Rest<Value>| {
        let args: Vec<Arg> = args.iter().map(to_arg).collect();
        helper
            .apply(&args, &log)
            .map_err(|msg| Error::new(ErrorKind::InvalidOperation, msg))
    }
}

fn to_arg(value: &Value) -> Arg {
    if let Some(s) = value.as_str() {
        return Arg::text(s);
    }
    if value.is_number() {
        if let Ok(n) = f64::try_from(value.clone()) {
            return Arg::number(n);
        }
    }
    if value.is_undefined() || value.is_none() {
        return Arg::text("");
    }
    Arg::text(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> FieldData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn render(source: &str, values: &[(&str, &str)]) -> Result<String, RenderError> {
        let mut engine = MiniJinjaEngine::new(FallbackLog::new());
        engine.add_template("t.j2", source)?;
        engine.render_named("t.j2", &data(values))
    }

    #[test]
    fn test_filter_and_function_forms() {
        let values = [("bg", "#808080"), ("fg", "#ffffff")];
        assert_eq!(render("{{ bg | brighten(0.3) }}", &values).unwrap(), "#a6a6a6");
        assert_eq!(render("{{ brighten(bg, 0.3) }}", &values).unwrap(), "#a6a6a6");
        assert_eq!(
            render("{{ mix(\"#000000\", fg, 0.5) }}", &values).unwrap(),
            "#7f7f7f"
        );
        assert_eq!(
            render("{{ bg | trimPrefix('#') }}", &values).unwrap(),
            "808080"
        );
    }

    #[test]
    fn test_numeric_field_values_coerce() {
        let values = [("bg", "#cdd6f4"), ("opacity", "0.8")];
        assert_eq!(
            render("{{ bg | alpha(opacity) }}", &values).unwrap(),
            "rgba(205,214,244,0.8)"
        );
    }

    #[test]
    fn test_missing_key_renders_empty() {
        assert_eq!(render("[{{ nope }}]", &[]).unwrap(), "[]");
    }

    #[test]
    fn test_trailing_newline_kept() {
        assert_eq!(render("a = {{ x }}\n", &[("x", "1")]).unwrap(), "a = 1\n");
    }

    #[test]
    fn test_fallback_recorded() {
        let log = FallbackLog::new();
        let mut engine = MiniJinjaEngine::new(log.clone());
        engine.add_template("t.j2", "{{ bg | brighten(0.2) }}").unwrap();
        let out = engine.render_named("t.j2", &data(&[("bg", "oops")])).unwrap();
        assert_eq!(out, "oops");
        assert_eq!(log.take()[0].helper, "brighten");
    }

    #[test]
    fn test_syntax_error_at_add() {
        let mut engine = MiniJinjaEngine::new(FallbackLog::new());
        let err = engine.add_template("t.j2", "{{ unclosed").unwrap_err();
        assert!(matches!(err, RenderError::Syntax { .. }));
        assert!(!engine.has_template("t.j2"));
    }

    #[test]
    fn test_bad_arguments_fail_render() {
        let err = render("{{ mix(bg) }}", &[("bg", "#000000")]).unwrap_err();
        assert!(matches!(err, RenderError::Execution { .. }));
    }
}
