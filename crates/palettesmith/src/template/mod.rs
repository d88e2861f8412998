//! Template rendering for plugin config fragments.
//!
//! A plugin's template turns resolved field values into the exact text its
//! target application reads. Two syntaxes are supported, chosen by file
//! extension:
//!
//! | Extension | Engine | Example |
//! |-----------|--------|---------|
//! | `.jinja`, `.jinja2`, `.j2` | [`MiniJinjaEngine`] | `{{ bg \| brighten(0.3) }}` |
//! | anything else | [`ActionEngine`] | `{{brighten .bg 0.3}}` |
//!
//! Both expose the same helpers: `alpha`, `hexToRGBA`, `brighten`, `mix`,
//! `colorFormat`, `trimPrefix` and `trimSuffix`. See [`Helper`].
//!
//! ## Key Types
//!
//! - [`Renderer`]: a compiled template for one plugin
//! - [`Rendered`]: output text plus any [`HelperFallback`]s
//! - [`build_field_data`] / [`render_target`]: the value-to-text pipeline

mod action;
mod engine;
mod helpers;
mod renderer;

pub use action::ActionEngine;
pub use engine::{register_helpers, FieldData, MiniJinjaEngine, TemplateEngine};
pub use helpers::{FallbackLog, Helper, HelperFallback};
pub use renderer::{
    build_field_data, render_target, Rendered, Renderer, Syntax, JINJA_EXTENSIONS,
};
