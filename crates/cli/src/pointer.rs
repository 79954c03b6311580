//! Pointer trajectories for driving the field without a real mouse.

use crate::error::CliError;
use glam::DVec3;

/// Where the pointer is on a given step, on the y = 0 plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerPath {
    /// Pointer held at one point.
    Fixed { x: f64, z: f64 },
    /// Pointer circling the origin, advancing `speed` radians per step.
    Orbit { radius: f64, speed: f64 },
}

impl PointerPath {
    pub fn at(&self, step: usize) -> DVec3 {
        match *self {
            PointerPath::Fixed { x, z } => DVec3::new(x, 0.0, z),
            PointerPath::Orbit { radius, speed } => {
                let angle = step as f64 * speed;
                DVec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
            }
        }
    }
}

/// Parses `"x,z"` into a fixed pointer.
pub fn parse_fixed(spec: &str) -> Result<PointerPath, CliError> {
    let (x, z) = spec
        .split_once(',')
        .ok_or_else(|| CliError::Pointer(format!("pointer must be 'x,z', got {spec:?}")))?;
    let coord = |s: &str| {
        s.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| CliError::Pointer(format!("invalid pointer coordinate {s:?}")))
    };
    Ok(PointerPath::Fixed {
        x: coord(x)?,
        z: coord(z)?,
    })
}
