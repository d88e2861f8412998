//! # Palettesmith - Theme Values Projected Into Config Files
//!
//! `palettesmith` keeps one set of theme values and renders them, through
//! per-application plugin definitions, into the config formats of many
//! desktop components (terminal emulators, compositors, bars, ...).
//!
//! ## Core Concepts
//!
//! - [`Plugin`](plugin::Plugin): a manifest, a typed field spec and a template
//! - [`Registry`](plugin::Registry): built-in plugins merged with discovered ones
//! - [`ThemeStore`](theme::ThemeStore): override > theme default > field default
//! - [`Renderer`](template::Renderer): compiles a plugin template and renders it
//! - [`validate_field`](validate::validate_field): checks a value against its field
//!
//! ## Quick Start
//!
//! ```rust
//! use palettesmith::plugin::Registry;
//! use palettesmith::template::render_target;
//! use palettesmith::theme::{ThemeConfig, ThemeStore};
//!
//! let registry = Registry::with_builtins().unwrap();
//! let alacritty = registry.get("alacritty").unwrap();
//!
//! let mut store = ThemeStore::new(ThemeConfig::default());
//! store.set_default("background", "#101010");
//! store.set_override("alacritty", "opacity", "0.9");
//!
//! let rendered = render_target(alacritty, &store).unwrap();
//! assert!(rendered.text.contains("background = \"#101010\""));
//! assert!(rendered.text.contains("opacity = 0.9"));
//! assert!(rendered.fallbacks.is_empty());
//! ```
//!
//! ## Discovering Plugins
//!
//! User plugins live one per directory under a root, each with a
//! `plugin.json`/`plugin.yaml` manifest and a spec file. Broken candidates are
//! reported per directory and never stop the rest from loading:
//!
//! ```rust,no_run
//! use palettesmith::plugin::{discover, Layer, Registry};
//!
//! let catalog = discover(&palettesmith::config::plugins_dir().unwrap());
//! for (dir, errors) in catalog.errors() {
//!     eprintln!("{}: {} problem(s)", dir, errors.len());
//! }
//!
//! let mut registry = Registry::with_builtins().unwrap();
//! registry.extend(catalog.into_plugins(), Layer::External);
//! ```

pub mod config;
mod error;
pub mod plugin;
pub mod report;
pub mod schema;
pub mod template;
pub mod theme;
pub mod validate;

pub use error::{ConfigError, LoadError, RenderError, ValidationCode, ValidationError};

// Re-export the color engine so callers need a single dependency.
pub use palettesmith_color as color;
pub use palettesmith_color::{normalize, Color, ColorParseError};
