//! HSL lightness shading for card palettes.
//!
//! # Invariants
//! - Output is always `#rrggbb` lowercase.
//! - Shading only moves lightness; hue and saturation are preserved up to
//!   8-bit rounding.
//! - Lightness clamps to `[0, 1]`, so `shade(shade(c, d), -d)` recovers `c`
//!   only when neither call hits a clamp.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Base card color used when none (or a malformed one) is stored.
pub const DEFAULT_CARD_COLOR: &str = "#DBEAFE";

/// Lightness deltas applied to the base color.
pub const GRADIENT_END_DELTA: f64 = -0.08;
pub const BORDER_DELTA: f64 = -0.15;
pub const SCORE_BADGE_DELTA: f64 = -0.12;
pub const RESIZE_HANDLE_DELTA: f64 = -0.20;

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Rejected color literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError(pub String);

impl Display for ColorParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "expected #RRGGBB color, got `{}`", self.0)
    }
}

impl Error for ColorParseError {}

impl FromStr for HexColor {
    type Err = ColorParseError;

    /// Accepts `#RRGGBB` or `RRGGBB`, any case.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError(value.to_string()));
        }
        let packed =
            u32::from_str_radix(digits, 16).map_err(|_| ColorParseError(value.to_string()))?;
        Ok(Self {
            r: (packed >> 16) as u8,
            g: ((packed >> 8) & 0xff) as u8,
            b: (packed & 0xff) as u8,
        })
    }
}

impl Display for HexColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl HexColor {
    pub fn default_card() -> Self {
        Self {
            r: 0xdb,
            g: 0xea,
            b: 0xfe,
        }
    }

    /// Returns this color with HSL lightness moved by `delta`.
    pub fn shade(self, delta: f64) -> Self {
        let (h, s, l) = rgb_to_hsl(
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        );
        let lightness = (l + delta).clamp(0.0, 1.0);
        let (r, g, b) = hsl_to_rgb(h, s, lightness);
        Self {
            r: to_channel(r),
            g: to_channel(g),
            b: to_channel(b),
        }
    }
}

/// Shades a hex color string.
///
/// # Errors
/// Returns `ColorParseError` when `hex` is not a 6-digit hex color.
pub fn shade(hex: &str, delta: f64) -> Result<String, ColorParseError> {
    Ok(hex.parse::<HexColor>()?.shade(delta).to_string())
}

/// Colors derived from one card base color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardPalette {
    pub base: HexColor,
    pub gradient_end: HexColor,
    pub border: HexColor,
    pub score_badge: HexColor,
    pub resize_handle: HexColor,
}

impl CardPalette {
    pub fn from_base(base: HexColor) -> Self {
        Self {
            base,
            gradient_end: base.shade(GRADIENT_END_DELTA),
            border: base.shade(BORDER_DELTA),
            score_badge: base.shade(SCORE_BADGE_DELTA),
            resize_handle: base.shade(RESIZE_HANDLE_DELTA),
        }
    }

    /// Palette for a stored color, falling back to the default card color.
    pub fn for_color(stored: &str) -> Self {
        let base = stored.parse().unwrap_or_else(|_| HexColor::default_card());
        Self::from_base(base)
    }
}

fn rgb_to_hsl(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if max == min {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    // Channel order matters when two channels tie for max.
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h / 6.0, s, l)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

fn to_channel(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}
