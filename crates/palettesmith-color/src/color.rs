//! The [`Color`] value type and its textual output formats.
//!
//! A [`Color`] is an immutable sRGBA value with 8-bit channels. Every target
//! application expects colors spelled a little differently, so output goes
//! through a [`ColorFormat`]:
//!
//! | ID | Output |
//! |----|--------|
//! | `hex6` / `hex` | `#rrggbb` |
//! | `hex6_no_prefix` / `rgb_no_prefix` | `rrggbb` |
//! | `hex_0x` | `0xrrggbb` |
//! | `hex8` | `#rrggbbaa` |
//! | `rgb` | `rgb(r, g, b)` |
//! | `rgba` | `rgba(r, g, b, a)` |
//! | `hsl` | `hsl(h, s%, l%)` |
//! | `hsla` | `hsla(h, s%, l%, a)` |
//! | `hypr_rgb` | `rgb(rrggbb)` |
//! | `hypr_rgba` | `rgba(rrggbbaa)` |
//!
//! Unknown identifiers fall back to `hex6` when going through [`format`].
//!
//! # Example
//!
//! ```rust
//! use palettesmith_color::{format, normalize, ColorFormat};
//!
//! let color = normalize("#cdd6f4").unwrap();
//! assert_eq!(color.format(ColorFormat::HyprRgb), "rgb(cdd6f4)");
//! assert_eq!(format(color, "no-such-format"), "#cdd6f4");
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::ColorParseError;
use crate::hsl;

/// An sRGBA color with 8-bit channels.
///
/// Alpha is `255` (opaque) unless the source text carried one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Creates an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Creates a color with an explicit alpha channel.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Returns a copy with the alpha channel replaced.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Alpha as a fraction in `0.0..=1.0`.
    pub fn alpha_fraction(&self) -> f64 {
        f64::from(self.a) / 255.0
    }

    /// Converts to HSL: hue in degrees `[0, 360)`, saturation and lightness
    /// in percent `[0, 100]`. Alpha is not part of the result.
    pub fn to_hsl(&self) -> (f64, f64, f64) {
        hsl::rgb_to_hsl(self.r, self.g, self.b)
    }

    /// Builds a color from HSL components.
    ///
    /// The hue is wrapped into `[0, 360)`; saturation and lightness are
    /// clamped to `[0, 100]`; alpha is clamped to `0.0..=1.0`.
    pub fn from_hsl(h: f64, s: f64, l: f64, alpha: f64) -> Self {
        let (r, g, b) = hsl::hsl_to_rgb(h, s, l);
        Self::rgba(r, g, b, alpha_to_channel(alpha))
    }

    /// Renders the color in the given format.
    pub fn format(&self, format: ColorFormat) -> String {
        let Color { r, g, b, a } = *self;
        match format {
            ColorFormat::Hex6 => format!("#{:02x}{:02x}{:02x}", r, g, b),
            ColorFormat::Hex6NoPrefix => format!("{:02x}{:02x}{:02x}", r, g, b),
            ColorFormat::Hex0x => format!("0x{:02x}{:02x}{:02x}", r, g, b),
            ColorFormat::Hex8 => format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a),
            ColorFormat::Rgb => format!("rgb({}, {}, {})", r, g, b),
            ColorFormat::Rgba => format!(
                "rgba({}, {}, {}, {})",
                r,
                g,
                b,
                trim_decimal(self.alpha_fraction(), 3)
            ),
            ColorFormat::Hsl => {
                let (h, s, l) = self.rounded_hsl();
                format!("hsl({}, {}%, {}%)", h, s, l)
            }
            ColorFormat::Hsla => {
                let (h, s, l) = self.rounded_hsl();
                format!(
                    "hsla({}, {}%, {}%, {})",
                    h,
                    s,
                    l,
                    trim_decimal(self.alpha_fraction(), 3)
                )
            }
            ColorFormat::HyprRgb => format!("rgb({:02x}{:02x}{:02x})", r, g, b),
            ColorFormat::HyprRgba => format!("rgba({:02x}{:02x}{:02x}{:02x})", r, g, b, a),
        }
    }

    fn rounded_hsl(&self) -> (u16, u8, u8) {
        let (h, s, l) = self.to_hsl();
        let h = (h.round() as u16) % 360;
        (h, s.round() as u8, l.round() as u8)
    }
}

impl fmt::Display for Color {
    /// `#rrggbb` for opaque colors, `#rrggbbaa` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            f.write_str(&self.format(ColorFormat::Hex6))
        } else {
            f.write_str(&self.format(ColorFormat::Hex8))
        }
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::normalize(s)
    }
}

/// Output formats understood by [`Color::format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorFormat {
    #[default]
    Hex6,
    Hex6NoPrefix,
    Hex0x,
    Hex8,
    Rgb,
    Rgba,
    Hsl,
    Hsla,
    /// Hex packed inside `rgb()`, as Hyprland expects.
    HyprRgb,
    /// Hex packed inside `rgba()`, as Hyprland expects.
    HyprRgba,
}

impl ColorFormat {
    /// Every format, in table order.
    pub const ALL: [ColorFormat; 10] = [
        ColorFormat::Hex6,
        ColorFormat::Hex6NoPrefix,
        ColorFormat::Hex0x,
        ColorFormat::Hex8,
        ColorFormat::Rgb,
        ColorFormat::Rgba,
        ColorFormat::Hsl,
        ColorFormat::Hsla,
        ColorFormat::HyprRgb,
        ColorFormat::HyprRgba,
    ];

    /// Canonical identifier for this format.
    pub fn id(&self) -> &'static str {
        match self {
            ColorFormat::Hex6 => "hex6",
            ColorFormat::Hex6NoPrefix => "hex6_no_prefix",
            ColorFormat::Hex0x => "hex_0x",
            ColorFormat::Hex8 => "hex8",
            ColorFormat::Rgb => "rgb",
            ColorFormat::Rgba => "rgba",
            ColorFormat::Hsl => "hsl",
            ColorFormat::Hsla => "hsla",
            ColorFormat::HyprRgb => "hypr_rgb",
            ColorFormat::HyprRgba => "hypr_rgba",
        }
    }

    /// Looks up a format by identifier, falling back to [`ColorFormat::Hex6`].
    pub fn from_id_or_default(id: &str) -> Self {
        id.parse().unwrap_or_default()
    }
}

impl FromStr for ColorFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hex6" | "hex" => Ok(ColorFormat::Hex6),
            "hex6_no_prefix" | "rgb_no_prefix" => Ok(ColorFormat::Hex6NoPrefix),
            "hex_0x" => Ok(ColorFormat::Hex0x),
            "hex8" => Ok(ColorFormat::Hex8),
            "rgb" => Ok(ColorFormat::Rgb),
            "rgba" => Ok(ColorFormat::Rgba),
            "hsl" => Ok(ColorFormat::Hsl),
            "hsla" => Ok(ColorFormat::Hsla),
            "hypr_rgb" => Ok(ColorFormat::HyprRgb),
            "hypr_rgba" => Ok(ColorFormat::HyprRgba),
            other => Err(format!("unknown color format: {}", other)),
        }
    }
}

impl fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Formats a color by format identifier; unknown identifiers yield `hex6`.
pub fn format(color: Color, format_id: &str) -> String {
    color.format(ColorFormat::from_id_or_default(format_id))
}

/// Scales a `0.0..=1.0` alpha to a channel value, rounding half up.
pub(crate) fn alpha_to_channel(alpha: f64) -> u8 {
    let alpha = if alpha.is_nan() { 1.0 } else { alpha.clamp(0.0, 1.0) };
    (alpha * 255.0).round() as u8
}

/// Formats `value` with at most `places` decimals, trimming trailing zeros.
pub fn trim_decimal(value: f64, places: usize) -> String {
    let text = format!("{:.*}", places, value);
    if !text.contains('.') {
        return text;
    }
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
