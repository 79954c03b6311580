//! sRGB and linear RGB color types.
//!
//! Accent colors are authored as sRGB hex strings but blended in linear
//! light, the same way a WebGL renderer with color management does it. All
//! math is `f64`; conversion to GPU-friendly `f32` happens at the edge.

use crate::error::FieldError;
use serde::{Serialize, Serializer};

/// sRGB color with components in [0, 1].
///
/// Serializes as a `"#rrggbb"` hex string, quantized to 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Linear RGB color (gamma-decoded).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Srgb {
    /// Parses `"#ff40d6"` or `"ff40d6"` (case insensitive).
    ///
    /// Returns `FieldError::InvalidColor` for anything that is not six hex digits.
    pub fn from_hex(hex: &str) -> Result<Srgb, FieldError> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(FieldError::InvalidColor(format!(
                "expected 6 hex digits, got {hex:?}"
            )));
        }
        let channel = |range: std::ops::Range<usize>, name: &str| {
            u8::from_str_radix(&hex[range], 16)
                .map(|v| v as f64 / 255.0)
                .map_err(|e| FieldError::InvalidColor(format!("invalid {name} component: {e}")))
        };
        Ok(Srgb {
            r: channel(0..2, "red")?,
            g: channel(2..4, "green")?,
            b: channel(4..6, "blue")?,
        })
    }

    /// Formats as `"#rrggbb"`, clamping and rounding each channel.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Quantizes to 8 bits per channel.
    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Decodes sRGB gamma.
    pub fn to_linear(self) -> LinearRgb {
        LinearRgb {
            r: srgb_component_to_linear(self.r),
            g: srgb_component_to_linear(self.g),
            b: srgb_component_to_linear(self.b),
        }
    }

    /// Interpolates from `self` to `other` in linear light, returning sRGB.
    ///
    /// `t` is clamped to [0, 1]; a NaN `t` is treated as 0.
    pub fn mix_linear(self, other: Srgb, t: f64) -> Srgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        self.to_linear().lerp(other.to_linear(), t).to_srgb()
    }
}

impl LinearRgb {
    /// Component-wise linear interpolation. `t` is not clamped.
    pub fn lerp(self, other: LinearRgb, t: f64) -> LinearRgb {
        LinearRgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    /// Encodes sRGB gamma, clamping the result to [0, 1].
    pub fn to_srgb(self) -> Srgb {
        Srgb {
            r: linear_component_to_srgb(self.r).clamp(0.0, 1.0),
            g: linear_component_to_srgb(self.g).clamp(0.0, 1.0),
            b: linear_component_to_srgb(self.b).clamp(0.0, 1.0),
        }
    }
}

impl Serialize for Srgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

fn srgb_component_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_component_to_srgb(c: f64) -> f64 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}
