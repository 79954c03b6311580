//! CLI errors and the exit code each one maps to.
//!
//! | code | meaning |
//! |------|---------|
//! | 2    | clap rejected the arguments (before `run`) |
//! | 10   | the field rejected its configuration |
//! | 11   | the frame could not be written to `--output` |
//! | 12   | `--params`, `--pointer`/`--orbit` or an accent color did not parse |
//! | 13   | the frame could not be serialized |

use motion_field_core::FieldError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] FieldError),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid --params JSON: {0}")]
    Params(#[source] serde_json::Error),

    #[error("{0}")]
    Pointer(String),

    #[error("bad accent color: {0}")]
    Accent(#[source] FieldError),

    #[error("failed to serialize frame: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 10,
            CliError::Write { .. } => 11,
            CliError::Params(_) | CliError::Pointer(_) | CliError::Accent(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}
