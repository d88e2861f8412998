//! Color normalization: many spellings in, one [`Color`] out.
//!
//! Supported inputs (case-insensitive, surrounding whitespace ignored):
//!
//! - Hex: `#abc`, `#aabbcc`, `#aabbccdd`, with `#`, `0x` or no prefix
//! - Hex packed in a function: `rgb(aabbcc)`, `rgba(aabbccdd)`, optional `0x`
//! - Numeric functions: `rgb(255, 0, 127)`, `rgba(255, 0, 127, 0.5)`
//! - HSL functions: `hsl(267, 83%, 81%)`, `hsla(267deg, 83%, 81%, 0.5)`
//!
//! Numeric RGB components are clamped to `0..=255`, alpha to `0.0..=1.0`;
//! hue wraps into `[0, 360)` and saturation/lightness clamp to `[0, 100]`.

use crate::color::{alpha_to_channel, Color};
use crate::error::{ColorParseError, Result};

/// Parses a color from any supported textual form.
///
/// # Errors
///
/// - [`ColorParseError::Empty`] for blank input
/// - [`ColorParseError::InvalidCharacter`] when a hex body has non-hex characters
/// - [`ColorParseError::InvalidLength`] when a hex body is not 3, 6 or 8 digits
/// - [`ColorParseError::InvalidFunction`] for malformed `rgb()`/`hsl()` forms
///
/// # Example
///
/// ```rust
/// use palettesmith_color::{normalize, Color};
///
/// assert_eq!(normalize("#abc").unwrap(), normalize("aabbcc").unwrap());
/// assert_eq!(normalize("rgba(255,0,127,0.5)").unwrap(), Color::rgba(255, 0, 127, 128));
/// assert!(normalize("#abcd").is_err());
/// ```
pub fn normalize(input: &str) -> Result<Color> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ColorParseError::Empty);
    }
    let lowered = trimmed.to_ascii_lowercase();

    if let Some((name, args)) = split_function(&lowered) {
        return match name {
            "rgb" | "rgba" => parse_rgb_function(trimmed, name, args),
            "hsl" | "hsla" => parse_hsl_function(trimmed, name, args),
            other => Err(ColorParseError::function(
                trimmed,
                format!("unknown color function '{}'", other),
            )),
        };
    }

    let digits = lowered
        .strip_prefix('#')
        .or_else(|| lowered.strip_prefix("0x"))
        .unwrap_or(&lowered);
    parse_hex_digits(trimmed, digits)
}

/// Splits `name(args)` into its parts. Returns `None` for non-function text.
fn split_function(s: &str) -> Option<(&str, &str)> {
    let open = s.find('(')?;
    let inner = s[open + 1..].strip_suffix(')')?;
    let name = s[..open].trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some((name, inner.trim()))
}

/// Parses a bare hex body (no prefix) of 3, 6 or 8 digits.
fn parse_hex_digits(original: &str, digits: &str) -> Result<Color> {
    if digits.is_empty() {
        return Err(ColorParseError::InvalidLength {
            input: original.to_string(),
            len: 0,
        });
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorParseError::InvalidCharacter {
            input: original.to_string(),
        });
    }

    // All characters are ASCII hex digits here, so byte slicing is safe.
    let channel = |range: std::ops::Range<usize>| -> u8 {
        u8::from_str_radix(&digits[range], 16).unwrap_or_default()
    };
    let nibble = |i: usize| -> u8 { channel(i..i + 1) * 17 };

    match digits.len() {
        3 => Ok(Color::rgb(nibble(0), nibble(1), nibble(2))),
        6 => Ok(Color::rgb(channel(0..2), channel(2..4), channel(4..6))),
        8 => Ok(Color::rgba(
            channel(0..2),
            channel(2..4),
            channel(4..6),
            channel(6..8),
        )),
        len => Err(ColorParseError::InvalidLength {
            input: original.to_string(),
            len,
        }),
    }
}

fn parse_rgb_function(original: &str, name: &str, args: &str) -> Result<Color> {
    if !args.contains(',') {
        return parse_packed_hex(original, name, args);
    }

    let parts = split_args(args);
    let (rgb, alpha) = match (name, parts.len()) {
        ("rgb", 3) | ("rgba", 3) => (&parts[..3], None),
        ("rgba", 4) => (&parts[..3], Some(parts[3])),
        _ => {
            return Err(ColorParseError::function(
                original,
                format!("{}() takes {} components, got {}", name, expected_arity(name), parts.len()),
            ))
        }
    };

    let mut channels = [0u8; 3];
    for (slot, part) in channels.iter_mut().zip(rgb) {
        let value = parse_number(original, part)?;
        *slot = value.clamp(0.0, 255.0).round() as u8;
    }
    let a = match alpha {
        Some(part) => alpha_to_channel(parse_number(original, part)?),
        None => 255,
    };
    Ok(Color::rgba(channels[0], channels[1], channels[2], a))
}

/// `rgb(aabbcc)` / `rgba(aabbccdd)`: hex packed inside a function call.
///
/// A six-digit body inside `rgba()` means fully opaque.
fn parse_packed_hex(original: &str, name: &str, args: &str) -> Result<Color> {
    let digits = args.strip_prefix("0x").unwrap_or(args);
    match digits.len() {
        6 | 8 => {}
        len => {
            return Err(ColorParseError::function(
                original,
                format!("packed hex in {}() must be 6 or 8 digits, got {}", name, len),
            ))
        }
    }
    let color = parse_hex_digits(original, digits)?;
    if name == "rgba" && digits.len() == 6 {
        return Ok(color.with_alpha(255));
    }
    Ok(color)
}

fn parse_hsl_function(original: &str, name: &str, args: &str) -> Result<Color> {
    let parts = split_args(args);
    let alpha = match (name, parts.len()) {
        ("hsl", 3) | ("hsla", 3) => None,
        ("hsla", 4) => Some(parts[3]),
        _ => {
            return Err(ColorParseError::function(
                original,
                format!("{}() takes {} components, got {}", name, expected_arity(name), parts.len()),
            ))
        }
    };

    let hue = parse_number(original, parts[0].strip_suffix("deg").unwrap_or(parts[0]))?;
    let saturation = parse_number(original, parts[1].strip_suffix('%').unwrap_or(parts[1]))?;
    let lightness = parse_number(original, parts[2].strip_suffix('%').unwrap_or(parts[2]))?;
    let alpha = match alpha {
        Some(part) => parse_number(original, part)?,
        None => 1.0,
    };

    Ok(Color::from_hsl(hue, saturation, lightness, alpha))
}

fn split_args(args: &str) -> Vec<&str> {
    args.split(',').map(str::trim).collect()
}

fn expected_arity(name: &str) -> &'static str {
    match name {
        "rgba" | "hsla" => "3 or 4",
        _ => "3",
    }
}

fn parse_number(original: &str, text: &str) -> Result<f64> {
    let text = text.trim();
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ColorParseError::function(
            original,
            format!("'{}' is not a number", text),
        )),
    }
}
