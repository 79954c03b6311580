//! Per-instance draw data: transform matrix and accent color.

use crate::RenderAttributes;
use glam::{Mat4, Quat, Vec3};
use motion_field_core::color::Srgb;
use motion_field_core::error::FieldError;

/// Warm accent shown right under the pointer (`#ff40d6`).
const NEAR: Srgb = Srgb {
    r: 255.0 / 255.0,
    g: 64.0 / 255.0,
    b: 214.0 / 255.0,
};
/// Cold accent shown at or beyond the repulsion radius (`#86e8ff`).
const FAR: Srgb = Srgb {
    r: 134.0 / 255.0,
    g: 232.0 / 255.0,
    b: 255.0 / 255.0,
};

/// The two accent colors blended by `color_mix`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccentColors {
    /// Color at `color_mix == 0` (pointer on top of the particle).
    pub near: Srgb,
    /// Color at `color_mix == 1` (pointer at or beyond the radius).
    pub far: Srgb,
}

impl AccentColors {
    pub fn from_hex(near: &str, far: &str) -> Result<Self, FieldError> {
        Ok(Self {
            near: Srgb::from_hex(near)?,
            far: Srgb::from_hex(far)?,
        })
    }

    /// Blends `near` toward `far` in linear light. `t` is clamped to [0, 1].
    pub fn mix(&self, t: f64) -> Srgb {
        self.near.mix_linear(self.far, t)
    }
}

impl Default for AccentColors {
    fn default() -> Self {
        Self {
            near: NEAR,
            far: FAR,
        }
    }
}

impl RenderAttributes {
    /// Instance transform: uniform `scale`, no rotation, translated to `position`.
    pub fn instance_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale as f32),
            Quat::IDENTITY,
            self.position.as_vec3(),
        )
    }

    /// Instance color for this particle.
    pub fn instance_color(&self, accents: &AccentColors) -> Srgb {
        accents.mix(self.color_mix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    const NEAR_HEX: &str = "#ff40d6";
    const FAR_HEX: &str = "#86e8ff";

    #[test]
    fn default_accents_are_demo_colors() {
        let accents = AccentColors::default();
        assert_eq!(accents.near.to_hex(), NEAR_HEX);
        assert_eq!(accents.far.to_hex(), FAR_HEX);
    }

    #[test]
    fn from_hex_propagates_parse_errors() {
        assert!(matches!(
            AccentColors::from_hex("#ff40d6", "cold"),
            Err(FieldError::InvalidColor(_))
        ));
    }

    #[test]
    fn mix_endpoints() {
        let accents = AccentColors::default();
        assert_eq!(accents.mix(0.0).to_hex(), NEAR_HEX);
        assert_eq!(accents.mix(1.0).to_hex(), FAR_HEX);
    }

    #[test]
    fn instance_matrix_scales_then_translates() {
        let attrs = RenderAttributes {
            position: DVec3::new(1.0, 2.0, -3.0),
            scale: 0.5,
            color_mix: 1.0,
        };
        let m = attrs.instance_matrix();
        let p = m.transform_point3(Vec3::new(2.0, 0.0, 0.0));
        assert!((p - Vec3::new(2.0, 2.0, -3.0)).length() < 1e-6, "got {p:?}");
        let origin = m.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(1.0, 2.0, -3.0)).length() < 1e-6);
    }

    #[test]
    fn instance_color_uses_color_mix() {
        let accents = AccentColors::default();
        let near = RenderAttributes {
            position: DVec3::ZERO,
            scale: 1.0,
            color_mix: 0.0,
        };
        let far = RenderAttributes {
            color_mix: 1.0,
            ..near
        };
        assert_eq!(near.instance_color(&accents).to_hex(), NEAR_HEX);
        assert_eq!(far.instance_color(&accents).to_hex(), FAR_HEX);
    }
}
