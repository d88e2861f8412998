//! # Palettesmith Color - Color Normalization Engine
//!
//! `palettesmith-color` turns the many ways a color can be written in a
//! configuration file into one canonical [`Color`] value, and back out into
//! whatever spelling a target application expects.
//!
//! The crate is pure: no I/O, no global state.
//!
//! ## Core Operations
//!
//! - [`normalize`]: parse hex (`#abc`, `aabbcc`, `0xaabbccdd`), `rgb()`/`rgba()`
//!   (numeric or hex-packed) and `hsl()`/`hsla()` text
//! - [`format`] / [`Color::format`]: emit one of the [`ColorFormat`] spellings
//! - [`brighten`] / [`mix`]: linear interpolation toward white or another color
//!
//! ## Example
//!
//! ```rust
//! use palettesmith_color::{brighten, format, mix, normalize, Color};
//!
//! let base = normalize("rgb(30, 30, 46)").unwrap();
//! assert_eq!(format(base, "hex6"), "#1e1e2e");
//! assert_eq!(format(base, "hypr_rgb"), "rgb(1e1e2e)");
//!
//! let surface = mix(base, Color::WHITE, 0.1);
//! let highlight = brighten(base, 0.5);
//! assert_ne!(surface, highlight);
//! ```

mod color;
mod error;
mod hsl;
mod ops;
mod parse;

pub use color::{format, trim_decimal, Color, ColorFormat};
pub use error::{ColorParseError, Result};
pub use ops::{brighten, mix};
pub use parse::normalize;
