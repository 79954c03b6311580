//! Headless frame loop: drives a `ParticleField` along a pointer path and
//! serializes the final frame.

use crate::error::CliError;
use crate::pointer::PointerPath;
use glam::DVec3;
use motion_field_core::{MotionPreference, Srgb};
use motion_field_particles::{AccentColors, FieldConfig, ParticleField, RenderAttributes};
use serde::Serialize;
use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

/// Everything the `simulate` subcommand needs besides the field config.
#[derive(Debug, Clone, Copy)]
pub struct SimulateOptions {
    pub steps: usize,
    pub pointer: PointerPath,
    pub reduced_motion: bool,
    /// Toggle the motion preference right before this step runs.
    pub toggle_motion_at: Option<usize>,
}

/// Result of a headless run.
pub struct SimulationRun {
    pub field: ParticleField,
    /// Pointer used for the last step, if any step ran.
    pub last_pointer: Option<DVec3>,
    /// Number of motion-preference changes observed during the run.
    pub motion_changes: usize,
}

pub fn run(config: FieldConfig, opts: &SimulateOptions) -> Result<SimulationRun, CliError> {
    let mut field = ParticleField::new(config)?;
    let mut preference = MotionPreference::new(opts.reduced_motion);

    let changes = Rc::new(Cell::new(0_usize));
    let counter = Rc::clone(&changes);
    preference.subscribe(move |reduced| {
        counter.set(counter.get() + 1);
        tracing::info!(reduced, "motion preference toggled");
    });

    let mut last_pointer = None;
    for step in 0..opts.steps {
        if opts.toggle_motion_at == Some(step) {
            preference.toggle();
        }
        let pointer = opts.pointer.at(step);
        field.step(pointer, preference.motion_enabled());
        last_pointer = Some(pointer);
    }

    tracing::debug!(
        steps = opts.steps,
        particles = field.len(),
        "simulation finished"
    );

    Ok(SimulationRun {
        field,
        last_pointer,
        motion_changes: changes.get(),
    })
}

/// One particle of the output frame: its render attributes plus the
/// resolved accent color.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FrameEntry {
    pub index: usize,
    #[serde(flatten)]
    pub attributes: RenderAttributes,
    pub color: Srgb,
}

/// One entry per particle, in grid order.
pub fn frame(attributes: &[RenderAttributes], accents: &AccentColors) -> Vec<FrameEntry> {
    attributes
        .iter()
        .enumerate()
        .map(|(index, a)| FrameEntry {
            index,
            attributes: *a,
            color: a.instance_color(accents),
        })
        .collect()
}

/// Pretty-prints `value` to `output`, or to stdout when `output` is `None`.
pub fn write_output<T>(value: &T, output: Option<&Path>) -> Result<(), CliError>
where
    T: Serialize + ?Sized,
{
    let text = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => std::fs::write(path, text + "\n").map_err(|source| CliError::Write {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}
