use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 8-bit sRGB color as the scene framework stores it (`#rrggbb`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex color `{0}` (expected #rrggbb)")]
pub struct ParseColorError(pub String);

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    pub const fn from_u32(packed: u32) -> Self {
        Self {
            r: ((packed >> 16) & 0xff) as u8,
            g: ((packed >> 8) & 0xff) as u8,
            b: (packed & 0xff) as u8,
        }
    }

    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Parse `#rrggbb` (case-insensitive, leading `#` optional).
    pub fn parse_hex(s: &str) -> Result<Self, ParseColorError> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseColorError(s.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_u32)
            .map_err(|_| ParseColorError(s.to_string()))
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:06x}", self.to_u32())
    }

    pub fn lerp(self, other: Rgb, factor: f32) -> Rgb {
        interpolate(self, other, factor)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

/// Per-channel linear blend of two colors, rounded to the nearest byte.
///
/// `factor` is expected in [0, 1]; the caller clamps.
pub fn interpolate(from: Rgb, to: Rgb, factor: f32) -> Rgb {
    Rgb {
        r: lerp_channel(from.r, to.r, factor),
        g: lerp_channel(from.g, to.g, factor),
        b: lerp_channel(from.b, to.b, factor),
    }
}

fn lerp_channel(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

/// An ordered list of color keyframes spread evenly over [0, 1].
///
/// `n` stops give `n - 1` segments of width `1 / (n - 1)`; segment `i` covers
/// `[i / (n - 1), (i + 1) / (n - 1)]` and the last one ends at exactly 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Rgb>", into = "Vec<Rgb>")]
pub struct ColorRamp {
    stops: Vec<Rgb>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("a color ramp needs at least one stop")]
pub struct EmptyRampError;

impl ColorRamp {
    /// Two-stop ramp.
    pub fn between(from: Rgb, to: Rgb) -> Self {
        Self { stops: vec![from, to] }
    }

    /// Ramp through `stops` in order. Returns `None` when empty.
    pub fn through(stops: impl IntoIterator<Item = Rgb>) -> Option<Self> {
        let stops: Vec<Rgb> = stops.into_iter().collect();
        if stops.is_empty() {
            None
        } else {
            Some(Self { stops })
        }
    }

    pub fn stops(&self) -> &[Rgb] {
        &self.stops
    }

    pub fn first(&self) -> Rgb {
        self.stops[0]
    }

    pub fn last(&self) -> Rgb {
        self.stops[self.stops.len() - 1]
    }

    pub fn segment_count(&self) -> usize {
        self.stops.len().saturating_sub(1)
    }

    /// `[start, end)` of each segment, in order.
    pub fn segment_bounds(&self) -> Vec<(f32, f32)> {
        let n = self.segment_count();
        (0..n)
            .map(|i| (i as f32 / n as f32, (i + 1) as f32 / n as f32))
            .collect()
    }

    /// Color at `t` in [0, 1].
    pub fn sample(&self, t: f32) -> Rgb {
        let segments = self.segment_count();
        if segments == 0 {
            return self.first();
        }
        let scaled = t.clamp(0.0, 1.0) * segments as f32;
        let index = (scaled.floor() as usize).min(segments - 1);
        let local = scaled - index as f32;
        interpolate(self.stops[index], self.stops[index + 1], local)
    }
}

impl TryFrom<Vec<Rgb>> for ColorRamp {
    type Error = EmptyRampError;

    fn try_from(value: Vec<Rgb>) -> Result<Self, Self::Error> {
        Self::through(value).ok_or(EmptyRampError)
    }
}

impl From<ColorRamp> for Vec<Rgb> {
    fn from(value: ColorRamp) -> Self {
        value.stops
    }
}
