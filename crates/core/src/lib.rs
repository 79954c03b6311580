#![deny(unsafe_code)]
//! Core types for the motion-field workspace.
//!
//! Provides the `FieldError` type, JSON parameter helpers, `Srgb`/`LinearRgb`
//! color math, and the `MotionPreference` reduced-motion broadcast shared by
//! every consumer of the particle field.

pub mod color;
pub mod error;
pub mod motion;
pub mod params;

pub use color::{LinearRgb, Srgb};
pub use error::FieldError;
pub use motion::{MotionPreference, SubscriptionId};
