//! Derived color operations: brightening and mixing.
//!
//! Both operations interpolate linearly in sRGB and clamp their scalar
//! argument into `0.0..=1.0` first. Channel results are rounded to the
//! nearest integer with exact halves going down, so mixing pure black and
//! white at `0.5` lands on `#7f7f7f`.

use crate::color::Color;

/// Moves each RGB channel toward 255 by `amount` (`0.0` = unchanged,
/// `1.0` = white). Alpha is preserved.
///
/// ```rust
/// use palettesmith_color::{brighten, normalize};
///
/// let c = brighten(normalize("#808080").unwrap(), 0.3);
/// assert_eq!(c.to_string(), "#a6a6a6");
/// ```
pub fn brighten(color: Color, amount: f64) -> Color {
    let amount = clamp_unit(amount);
    let lift = |c: u8| -> u8 {
        let c = f64::from(c);
        round_channel(c + (255.0 - c) * amount)
    };
    Color::rgba(lift(color.r), lift(color.g), lift(color.b), color.a)
}

/// Linearly interpolates from `a` (`ratio = 0.0`) to `b` (`ratio = 1.0`),
/// alpha included.
///
/// ```rust
/// use palettesmith_color::{mix, Color};
///
/// assert_eq!(mix(Color::BLACK, Color::WHITE, 0.5).to_string(), "#7f7f7f");
/// ```
pub fn mix(a: Color, b: Color, ratio: f64) -> Color {
    let ratio = clamp_unit(ratio);
    let lerp = |x: u8, y: u8| -> u8 {
        round_channel(f64::from(x) * (1.0 - ratio) + f64::from(y) * ratio)
    };
    Color::rgba(
        lerp(a.r, b.r),
        lerp(a.g, b.g),
        lerp(a.b, b.b),
        lerp(a.a, b.a),
    )
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Nearest integer, ties toward zero; clamped to the channel range.
fn round_channel(v: f64) -> u8 {
    (v - 0.5).ceil().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brighten_known_value() {
        let gray = Color::rgb(0x80, 0x80, 0x80);
        assert_eq!(brighten(gray, 0.3), Color::rgb(0xa6, 0xa6, 0xa6));
    }

    #[test]
    fn test_brighten_extremes() {
        let c = Color::rgba(10, 20, 30, 40);
        assert_eq!(brighten(c, 0.0), c);
        assert_eq!(brighten(c, 1.0), Color::rgba(255, 255, 255, 40));
        assert_eq!(brighten(c, 5.0), brighten(c, 1.0));
        assert_eq!(brighten(c, -1.0), c);
        assert_eq!(brighten(c, f64::NAN), c);
    }

    #[test]
    fn test_mix_midpoint() {
        assert_eq!(mix(Color::BLACK, Color::WHITE, 0.5), Color::rgb(0x7f, 0x7f, 0x7f));
    }

    #[test]
    fn test_mix_endpoints_and_clamping() {
        let a = Color::rgb(30, 30, 46);
        let b = Color::rgb(205, 214, 244);
        assert_eq!(mix(a, b, 0.0), a);
        assert_eq!(mix(a, b, 1.0), b);
        assert_eq!(mix(a, b, 2.0), b);
        assert_eq!(mix(a, b, -3.0), a);
    }

    #[test]
    fn test_mix_rounds_to_nearest() {
        // 10 * 0.75 + 20 * 0.25 = 12.5 -> 12; 0 * 0.75 + 255 * 0.25 = 63.75 -> 64
        let out = mix(Color::rgb(10, 0, 0), Color::rgb(20, 255, 0), 0.25);
        assert_eq!(out, Color::rgb(12, 64, 0));
    }

    #[test]
    fn test_round_channel() {
        assert_eq!(round_channel(127.5), 127);
        assert_eq!(round_channel(127.51), 128);
        assert_eq!(round_channel(166.1), 166);
        assert_eq!(round_channel(0.0), 0);
        assert_eq!(round_channel(255.0), 255);
        assert_eq!(round_channel(300.0), 255);
    }
}
