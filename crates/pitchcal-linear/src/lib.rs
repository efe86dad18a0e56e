//! Linear solvers for pixel↔pitch calibration.
//!
//! - [`HomographySolver`]: normalized DLT inside RANSAC, plus matrix inversion.
//! - [`CoordinateTransformer`]: apply `H` or `H⁻¹` to single points.
//! - [`CalibrationValidator`]: reprojection error statistics in pitch meters.
//!
//! ```
//! use pitchcal_core::{CorrespondencePoint, Pt2, RansacOptions};
//! use pitchcal_linear::{CalibrationValidator, CoordinateTransformer, HomographySolver, ValidationOptions};
//!
//! let points = vec![
//!     CorrespondencePoint::new(Pt2::new(100.0, 600.0), Pt2::new(0.0, 0.0), "corner_bottom_left"),
//!     CorrespondencePoint::new(Pt2::new(1800.0, 600.0), Pt2::new(105.0, 0.0), "corner_bottom_right"),
//!     CorrespondencePoint::new(Pt2::new(1500.0, 200.0), Pt2::new(105.0, 68.0), "corner_top_right"),
//!     CorrespondencePoint::new(Pt2::new(400.0, 200.0), Pt2::new(0.0, 68.0), "corner_top_left"),
//! ];
//! let h = HomographySolver::compute(&points, &RansacOptions::default()).unwrap();
//! let h_inv = HomographySolver::invert(&h).unwrap();
//! let metrics = CalibrationValidator::validate(&points, &h, &ValidationOptions::default());
//! assert!(metrics.is_valid);
//! let pitch = CoordinateTransformer::video_to_pitch(100.0, 600.0, &h).unwrap();
//! let px = CoordinateTransformer::pitch_to_video(pitch.x, pitch.y, &h_inv).unwrap();
//! assert!((px - Pt2::new(100.0, 600.0)).norm() < 1e-6);
//! ```

mod homography;
pub mod math;
mod transform;
mod validation;

pub use homography::*;
pub use transform::*;
pub use validation::*;
