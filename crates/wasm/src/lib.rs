#![deny(unsafe_code)]
//! WASM bindings for the motion-field particle simulation.
//!
//! The browser shell owns the render loop: each animation frame it projects
//! the mouse onto the ground plane, calls [`WasmParticleField::step`], and
//! uploads the packed buffers to an instanced mesh. The OS reduced-motion
//! media query is forwarded with [`WasmParticleField::set_reduced_motion`].

use motion_field_core::{FieldError, MotionPreference};
use motion_field_particles::{AccentColors, FieldConfig, ParticleField, RenderAttributes};
use wasm_bindgen::prelude::*;

/// Floats per particle in [`pack_attributes`]: x, y, z, scale, color_mix.
pub const ATTRIBUTE_STRIDE: usize = 5;
/// Floats per particle in [`pack_matrices`]: a column-major 4x4 matrix.
pub const MATRIX_STRIDE: usize = 16;
/// Floats per particle in [`pack_colors`]: sRGB r, g, b.
pub const COLOR_STRIDE: usize = 3;

/// A particle field driven from JavaScript.
#[wasm_bindgen]
pub struct WasmParticleField {
    field: ParticleField,
    accents: AccentColors,
    preference: MotionPreference,
}

#[wasm_bindgen]
impl WasmParticleField {
    /// Creates a field from a JSON params string (`"{}"` for the defaults).
    #[wasm_bindgen(constructor)]
    pub fn new(params_json: &str) -> Result<WasmParticleField, JsError> {
        Ok(Self {
            field: build_field(params_json)?,
            accents: AccentColors::default(),
            preference: MotionPreference::default(),
        })
    }

    /// Advances one frame with the pointer at `(x, y, z)` and returns the
    /// packed attributes ([`ATTRIBUTE_STRIDE`] floats per particle).
    pub fn step(&mut self, x: f64, y: f64, z: f64) -> Vec<f32> {
        let enabled = self.preference.motion_enabled();
        pack_attributes(self.field.step(glam::DVec3::new(x, y, z), enabled))
    }

    /// Instance matrices for the last frame.
    pub fn instance_matrices(&self) -> Vec<f32> {
        pack_matrices(self.field.attributes())
    }

    /// Instance colors for the last frame.
    pub fn instance_colors(&self) -> Vec<f32> {
        pack_colors(self.field.attributes(), &self.accents)
    }

    /// Replaces the accent colors (`"#rrggbb"` strings).
    pub fn set_accents(&mut self, near: &str, far: &str) -> Result<(), JsError> {
        self.accents = AccentColors::from_hex(near, far)?;
        Ok(())
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.preference.set_reduced(reduced);
    }

    pub fn reduced_motion(&self) -> bool {
        self.preference.is_reduced()
    }

    /// Particle count.
    pub fn len(&self) -> usize {
        self.field.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }

    /// Current parameters as a JSON string.
    pub fn params(&self) -> String {
        self.field.params().to_string()
    }

    /// Parameter schema as a JSON string.
    pub fn param_schema() -> String {
        FieldConfig::param_schema().to_string()
    }
}

/// Parses `params_json` and builds the field.
pub fn build_field(params_json: &str) -> Result<ParticleField, FieldError> {
    let params: serde_json::Value = serde_json::from_str(params_json)
        .map_err(|e| FieldError::config(format!("invalid params JSON: {e}")))?;
    ParticleField::from_json(&params)
}

pub fn pack_attributes(attributes: &[RenderAttributes]) -> Vec<f32> {
    let mut out = Vec::with_capacity(attributes.len() * ATTRIBUTE_STRIDE);
    for a in attributes {
        out.extend_from_slice(&[
            a.position.x as f32,
            a.position.y as f32,
            a.position.z as f32,
            a.scale as f32,
            a.color_mix as f32,
        ]);
    }
    out
}

pub fn pack_matrices(attributes: &[RenderAttributes]) -> Vec<f32> {
    let mut out = Vec::with_capacity(attributes.len() * MATRIX_STRIDE);
    for a in attributes {
        out.extend_from_slice(&a.instance_matrix().to_cols_array());
    }
    out
}

pub fn pack_colors(attributes: &[RenderAttributes], accents: &AccentColors) -> Vec<f32> {
    let mut out = Vec::with_capacity(attributes.len() * COLOR_STRIDE);
    for a in attributes {
        let c = a.instance_color(accents);
        out.extend_from_slice(&[c.r as f32, c.g as f32, c.b as f32]);
    }
    out
}
