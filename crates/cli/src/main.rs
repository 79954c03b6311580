#![deny(unsafe_code)]
//! CLI binary for the motion-field particle simulation.
//!
//! Subcommands:
//! - `simulate`: run the field along a pointer path, print the final frame as JSON
//! - `schema`: print the parameter schema and defaults

mod error;
mod pointer;
mod simulate;

use clap::{Parser, Subcommand};
use error::CliError;
use motion_field_particles::{AccentColors, FieldConfig};
use pointer::PointerPath;
use simulate::SimulateOptions;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "motion-field", about = "Pointer-driven particle field simulator")]
struct Cli {
    /// Print errors as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the field for N frames and write the final frame as JSON.
    Simulate {
        /// Number of frames to simulate.
        #[arg(short, long, default_value_t = 120)]
        steps: usize,

        /// Field parameters as a JSON string (missing keys use defaults).
        #[arg(long, default_value = "{}")]
        params: String,

        /// Fixed pointer position on the plane, as "x,z".
        #[arg(long, default_value = "0,0", allow_hyphen_values = true)]
        pointer: String,

        /// Move the pointer on a circle of this radius instead of holding it fixed.
        #[arg(long)]
        orbit: Option<f64>,

        /// Radians the orbiting pointer advances per frame.
        #[arg(long, default_value_t = 0.05, allow_hyphen_values = true)]
        orbit_speed: f64,

        /// Start with reduced motion (particle state frozen).
        #[arg(long)]
        reduced_motion: bool,

        /// Toggle the reduced-motion preference right before this frame.
        #[arg(long)]
        toggle_motion_at: Option<usize>,

        /// Accent color under the pointer.
        #[arg(long, default_value = "#ff40d6")]
        near_color: String,

        /// Accent color at or beyond the repulsion radius.
        #[arg(long, default_value = "#86e8ff")]
        far_color: String,

        /// Output file path (defaults to stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the parameter schema and default values.
    Schema,
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Schema => {
            let info = serde_json::json!({
                "schema": FieldConfig::param_schema(),
                "defaults": FieldConfig::default().params(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::Simulate {
            steps,
            params,
            pointer,
            orbit,
            orbit_speed,
            reduced_motion,
            toggle_motion_at,
            near_color,
            far_color,
            output,
        } => {
            let params: serde_json::Value = serde_json::from_str(&params)
                .map_err(CliError::Params)?;
            let config = FieldConfig::from_json(&params);

            let accents = AccentColors::from_hex(&near_color, &far_color)
                .map_err(CliError::Accent)?;

            let path = match orbit {
                Some(radius) if radius.is_finite() && orbit_speed.is_finite() => {
                    PointerPath::Orbit {
                        radius,
                        speed: orbit_speed,
                    }
                }
                Some(_) => {
                    return Err(CliError::Pointer(
                        "--orbit and --orbit-speed must be finite".into(),
                    ))
                }
                None => pointer::parse_fixed(&pointer)?,
            };

            let opts = SimulateOptions {
                steps,
                pointer: path,
                reduced_motion,
                toggle_motion_at,
            };
            let result = simulate::run(config, &opts)?;

            let frame = simulate::frame(result.field.attributes(), &accents);
            simulate::write_output(&frame, output.as_deref())?;

            tracing::info!(
                steps,
                particles = result.field.len(),
                motion_changes = result.motion_changes,
                last_pointer = ?result.last_pointer,
                "frame written"
            );
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
