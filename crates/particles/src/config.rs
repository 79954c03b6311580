//! Field configuration: grid layout and the spring-damper constants.

use motion_field_core::error::FieldError;
use motion_field_core::params::{param_f64, param_usize};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Default grid rows (20 x 20 = 400 particles).
const DEFAULT_ROWS: usize = 20;
/// Default grid columns.
const DEFAULT_COLS: usize = 20;
/// Default distance between neighbouring home positions.
const DEFAULT_SPACING: f64 = 0.6;
/// Default planar radius inside which the pointer pushes particles.
const DEFAULT_REPULSION_RADIUS: f64 = 3.0;
/// Default peak repulsion impulse, applied at zero distance falloff.
const DEFAULT_REPULSION_FORCE: f64 = 0.08;
/// Default spring constant pulling particles home.
const DEFAULT_SPRING: f64 = 0.04;
/// Default per-step velocity damping.
const DEFAULT_DAMPING: f64 = 0.88;

/// Immutable configuration of a [`ParticleField`](crate::ParticleField).
///
/// Use [`Default`] for the interactive demo's constants. All rates are per
/// step, not per second: the integrator is frame-coupled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of lattice rows (x axis).
    pub rows: usize,
    /// Number of lattice columns (z axis).
    pub cols: usize,
    /// Distance between neighbouring home positions.
    pub spacing: f64,
    /// Planar radius of pointer influence.
    pub repulsion_radius: f64,
    /// Impulse magnitude at the pointer, falling off linearly to 0 at the radius.
    pub repulsion_force: f64,
    /// Spring constant toward home.
    pub spring: f64,
    /// Velocity multiplier applied every step, in (0, 1).
    pub damping: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            spacing: DEFAULT_SPACING,
            repulsion_radius: DEFAULT_REPULSION_RADIUS,
            repulsion_force: DEFAULT_REPULSION_FORCE,
            spring: DEFAULT_SPRING,
            damping: DEFAULT_DAMPING,
        }
    }
}

impl FieldConfig {
    /// Extracts a configuration from a loose JSON object, falling back to
    /// defaults for missing or mistyped keys. The result is not validated.
    pub fn from_json(params: &Value) -> Self {
        Self {
            rows: param_usize(params, "rows", DEFAULT_ROWS),
            cols: param_usize(params, "cols", DEFAULT_COLS),
            spacing: param_f64(params, "spacing", DEFAULT_SPACING),
            repulsion_radius: param_f64(params, "repulsion_radius", DEFAULT_REPULSION_RADIUS),
            repulsion_force: param_f64(params, "repulsion_force", DEFAULT_REPULSION_FORCE),
            spring: param_f64(params, "spring", DEFAULT_SPRING),
            damping: param_f64(params, "damping", DEFAULT_DAMPING),
        }
    }

    /// Checks every value that could break the finiteness invariant.
    ///
    /// Returns `FieldError::InvalidConfiguration` naming the first bad field.
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(FieldError::config(format!(
                "grid dimensions must be non-zero, got {}x{}",
                self.rows, self.cols
            )));
        }
        if self.rows.checked_mul(self.cols).is_none() {
            return Err(FieldError::config("grid dimensions overflow"));
        }
        positive_finite("spacing", self.spacing)?;
        positive_finite("repulsion_radius", self.repulsion_radius)?;
        finite("repulsion_force", self.repulsion_force)?;
        finite("spring", self.spring)?;
        if self.spring < 0.0 {
            return Err(FieldError::config(format!(
                "spring must be non-negative, got {}",
                self.spring
            )));
        }
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(FieldError::config(format!(
                "damping must be in (0, 1), got {}",
                self.damping
            )));
        }
        // The per-step error map has trace 1 + d - d*k and determinant d;
        // with 0 < d < 1 it is contracting only while d*k < 2 * (1 + d).
        if self.spring * self.damping >= 2.0 * (1.0 + self.damping) {
            return Err(FieldError::config(format!(
                "spring {} is too stiff for damping {}: spring * damping must stay below 2 * (1 + damping)",
                self.spring, self.damping
            )));
        }
        Ok(())
    }

    /// Number of particles the grid produces.
    pub fn particle_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Current values as a JSON object.
    pub fn params(&self) -> Value {
        json!({
            "rows": self.rows,
            "cols": self.cols,
            "spacing": self.spacing,
            "repulsion_radius": self.repulsion_radius,
            "repulsion_force": self.repulsion_force,
            "spring": self.spring,
            "damping": self.damping,
        })
    }

    /// Schema of every parameter: type, default, suggested range, description.
    pub fn param_schema() -> Value {
        json!({
            "rows": {
                "type": "integer",
                "default": DEFAULT_ROWS,
                "min": 1,
                "max": 200,
                "description": "Lattice rows (x axis)"
            },
            "cols": {
                "type": "integer",
                "default": DEFAULT_COLS,
                "min": 1,
                "max": 200,
                "description": "Lattice columns (z axis)"
            },
            "spacing": {
                "type": "number",
                "default": DEFAULT_SPACING,
                "min": 0.05,
                "max": 5.0,
                "description": "Distance between neighbouring home positions"
            },
            "repulsion_radius": {
                "type": "number",
                "default": DEFAULT_REPULSION_RADIUS,
                "min": 0.1,
                "max": 20.0,
                "description": "Planar radius of pointer influence"
            },
            "repulsion_force": {
                "type": "number",
                "default": DEFAULT_REPULSION_FORCE,
                "min": 0.0,
                "max": 1.0,
                "description": "Peak repulsion impulse per step"
            },
            "spring": {
                "type": "number",
                "default": DEFAULT_SPRING,
                "min": 0.0,
                "max": 0.5,
                "description": "Spring constant toward the home position"
            },
            "damping": {
                "type": "number",
                "default": DEFAULT_DAMPING,
                "min": 0.01,
                "max": 0.99,
                "description": "Velocity multiplier applied every step, exclusive of 0 and 1"
            }
        })
    }
}

fn finite(name: &str, value: f64) -> Result<(), FieldError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(FieldError::config(format!("{name} must be finite, got {value}")))
    }
}

fn positive_finite(name: &str, value: f64) -> Result<(), FieldError> {
    finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(FieldError::config(format!("{name} must be positive, got {value}")))
    }
}
