//! sRGB ↔ HSL conversion.
//!
//! Uses the standard cylindrical transform. Hue is expressed in degrees,
//! saturation and lightness in percent, matching what CSS-style `hsl()`
//! functions carry. Conversions quantize to 8-bit channels, so an
//! RGB → HSL → RGB round trip may drift by a unit or two per channel.

// ─── RGB → HSL ──────────────────────────────────────────────────────────────

/// Converts 8-bit RGB to `(hue°, saturation%, lightness%)`.
pub(crate) fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let delta = max - min;

    if delta == 0.0 {
        return (0.0, 0.0, l * 100.0);
    }

    let s = if l > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    };

    let h = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    ((h * 60.0).rem_euclid(360.0), s * 100.0, l * 100.0)
}

// ─── HSL → RGB ──────────────────────────────────────────────────────────────

/// Converts `(hue°, saturation%, lightness%)` to 8-bit RGB.
///
/// Hue wraps into `[0, 360)`; saturation and lightness are clamped to
/// `[0, 100]`.
pub(crate) fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let h = if h.is_finite() { h.rem_euclid(360.0) } else { 0.0 };
    let s = clamp_percent(s) / 100.0;
    let l = clamp_percent(l) / 100.0;

    if s == 0.0 {
        let v = to_channel(l);
        return (v, v, v);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;
    let h = h / 360.0;

    (
        to_channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        to_channel(hue_to_rgb(p, q, h)),
        to_channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    )
}

fn hue_to_rgb(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn clamp_percent(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 100.0)
    }
}

fn to_channel(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
