//! Color and string helpers shared by both template syntaxes.
//!
//! Color helpers never fail on a bad color: they hand back their input
//! unchanged (for `mix`, the first color; for `hexToRGBA`, opaque black as
//! `rgba(0,0,0,1.0)`), log a warning and record a [`HelperFallback`]. Wrong
//! argument counts or non-numeric amounts are real errors.
//!
//! `brighten` and `mix` always emit `#rrggbb`; alpha is dropped.

use std::sync::{Arc, Mutex, MutexGuard};

use palettesmith_color::{brighten, format, mix, normalize, ColorFormat, ColorParseError};
use tracing::warn;

/// A color helper that fell back because a color did not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperFallback {
    pub helper: &'static str,
    pub input: String,
    pub reason: String,
}

/// Shared sink for fallbacks recorded during a render.
///
/// Cloning shares the underlying log. MiniJinja helpers must be
/// `Send + Sync`, hence the mutex.
#[derive(Debug, Clone, Default)]
pub struct FallbackLog(Arc<Mutex<Vec<HelperFallback>>>);

impl FallbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, fallback: HelperFallback) {
        self.entries().push(fallback);
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&self) -> Vec<HelperFallback> {
        std::mem::take(&mut *self.entries())
    }

    fn entries(&self) -> MutexGuard<'_, Vec<HelperFallback>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// The helpers available to templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Helper {
    Alpha,
    HexToRgba,
    Brighten,
    Mix,
    ColorFormat,
    TrimPrefix,
    TrimSuffix,
}

impl Helper {
    pub const ALL: [Helper; 7] = [
        Helper::Alpha,
        Helper::HexToRgba,
        Helper::Brighten,
        Helper::Mix,
        Helper::ColorFormat,
        Helper::TrimPrefix,
        Helper::TrimSuffix,
    ];

    /// The name templates call the helper by.
    pub fn name(&self) -> &'static str {
        match self {
            Helper::Alpha => "alpha",
            Helper::HexToRgba => "hexToRGBA",
            Helper::Brighten => "brighten",
            Helper::Mix => "mix",
            Helper::ColorFormat => "colorFormat",
            Helper::TrimPrefix => "trimPrefix",
            Helper::TrimSuffix => "trimSuffix",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.name() == name)
    }

    pub fn arity(&self) -> usize {
        match self {
            Helper::Mix => 3,
            _ => 2,
        }
    }

    /// Evaluates the helper. Errors describe bad arguments.
    pub(crate) fn apply(&self, args: &[Arg], log: &FallbackLog) -> Result<String, String> {
        if args.len() != self.arity() {
            return Err(format!(
                "{} expects {} arguments, got {}",
                self.name(),
                self.arity(),
                args.len()
            ));
        }

        let out = match self {
            Helper::Alpha => {
                let opacity = args[1].as_number(self.name(), 2)?;
                match normalize(&args[0].text) {
                    Ok(c) => rgba(c.r, c.g, c.b, opacity),
                    Err(err) => self.fall_back(log, &args[0].text, err),
                }
            }
            Helper::HexToRgba => {
                let alpha = args[1].as_number(self.name(), 2)?;
                match normalize(&args[0].text) {
                    Ok(c) => rgba(c.r, c.g, c.b, alpha),
                    Err(err) => {
                        self.record(log, &args[0].text, err);
                        rgba(0, 0, 0, 1.0)
                    }
                }
            }
            Helper::Brighten => {
                let amount = args[1].as_number(self.name(), 2)?;
                match normalize(&args[0].text) {
                    Ok(c) => brighten(c, amount).format(ColorFormat::Hex6),
                    Err(err) => self.fall_back(log, &args[0].text, err),
                }
            }
            Helper::Mix => {
                let ratio = args[2].as_number(self.name(), 3)?;
                match (normalize(&args[0].text), normalize(&args[1].text)) {
                    (Ok(a), Ok(b)) => mix(a, b, ratio).format(ColorFormat::Hex6),
                    (Err(err), _) => self.fall_back(log, &args[0].text, err),
                    (Ok(_), Err(err)) => {
                        self.record(log, &args[1].text, err);
                        args[0].text.clone()
                    }
                }
            }
            Helper::ColorFormat => match normalize(&args[0].text) {
                Ok(c) => format(c, &args[1].text),
                Err(err) => self.fall_back(log, &args[0].text, err),
            },
            Helper::TrimPrefix => {
                let s = &args[0].text;
                s.strip_prefix(args[1].text.as_str()).unwrap_or(s).to_string()
            }
            Helper::TrimSuffix => {
                let s = &args[0].text;
                s.strip_suffix(args[1].text.as_str()).unwrap_or(s).to_string()
            }
        };
        Ok(out)
    }

    fn fall_back(&self, log: &FallbackLog, input: &str, err: ColorParseError) -> String {
        self.record(log, input, err);
        input.to_string()
    }

    fn record(&self, log: &FallbackLog, input: &str, err: ColorParseError) {
        warn!(helper = self.name(), input, error = %err, "color helper could not parse its input");
        log.record(HelperFallback {
            helper: self.name(),
            input: input.to_string(),
            reason: err.to_string(),
        });
    }
}

/// A helper argument: its text form and, for numeric literals, the number.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Arg {
    text: String,
    value: Option<f64>,
}

impl Arg {
    pub(crate) fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: None,
        }
    }

    pub(crate) fn number(n: f64) -> Self {
        Self {
            text: n.to_string(),
            value: Some(n),
        }
    }

    /// The numeric value, parsing text arguments such as field values.
    fn as_number(&self, helper: &str, position: usize) -> Result<f64, String> {
        if let Some(n) = self.value {
            return Ok(n);
        }
        self.text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| {
                format!(
                    "{}: argument {} must be a number, got {:?}",
                    helper, position, self.text
                )
            })
    }
}

fn rgba(r: u8, g: u8, b: u8, opacity: f64) -> String {
    format!("rgba({},{},{},{})", r, g, b, format_alpha(opacity))
}

/// Opacity as used in `rgba(...)`: clamped, one decimal place.
fn format_alpha(opacity: f64) -> String {
    let opacity = if opacity.is_nan() {
        1.0
    } else {
        opacity.clamp(0.0, 1.0)
    };
    format!("{:.1}", opacity)
}
