//! Core math and geometry primitives for `pitchcal`.
//!
//! This crate provides the building blocks shared by the solver crates:
//!
//! - linear algebra type aliases (`Real`, `Pt2`, `Mat3`, ...),
//! - the error taxonomy used by every calibration stage,
//! - a deterministic, model-agnostic RANSAC engine,
//! - the football pitch model (dimensions, origin convention, landmarks),
//! - correspondence, homography and validation types,
//! - the perspective camera model used by the pose solver.
//!
//! Two coordinate spaces appear throughout:
//! `video pixel (x, y)` and `pitch meters (X, Y)`. The pose solver adds a
//! third-party renderer's world frame (`y` up, pitch on the `y = 0` plane)
//! and normalized device coordinates.
//!
//! # Example
//!
//! ```
//! use pitchcal_core::{PitchDimensions, PitchFeature};
//!
//! let pitch = PitchDimensions::default();
//! let spot = pitch.feature_position(PitchFeature::CenterSpot);
//! assert!((spot.x - 52.5).abs() < 1e-12);
//! assert!(pitch.contains(&spot));
//! ```

/// Perspective camera parameters and projection.
mod camera;
/// Error taxonomy.
mod error;
/// Linear algebra type aliases and helpers.
mod math;
/// Pitch dimensions and landmark catalogue.
mod pitch;
/// Generic RANSAC engine and traits.
mod ransac;
/// Correspondence, matrix and metrics types.
mod types;

pub use camera::*;
pub use error::*;
pub use math::*;
pub use pitch::*;
pub use ransac::*;
pub use types::*;
