//! High-level entry crate for `pitchcal`.
//!
//! Two tasks are covered:
//!
//! - mapping video pixels to pitch meters and back through a robustly fitted
//!   homography, with a validation report on the user's clicks;
//! - recovering a broadcast camera's position, orientation and field of view
//!   from the same kind of clicks.
//!
//! ## Session API
//!
//! ```no_run
//! use pitchcal::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = CalibrationSession::new("match-42", PitchCalConfig::default());
//! session.add_feature_point(PitchFeature::CornerBottomLeft, Pt2::new(212.0, 803.0), 0)?;
//! session.add_feature_point(PitchFeature::CornerBottomRight, Pt2::new(1705.0, 811.0), 0)?;
//! session.add_feature_point(PitchFeature::PenaltyAreaLeftTop, Pt2::new(480.0, 402.0), 0)?;
//! session.add_feature_point(PitchFeature::PenaltyAreaRightTop, Pt2::new(1441.0, 405.0), 0)?;
//!
//! let calibration = session.compute()?;
//! if let Some(msg) = calibration.metrics.warning() {
//!     eprintln!("{msg}");
//! }
//! let on_pitch = session.video_to_pitch(960.0, 540.0)?;
//! println!("centre of frame is at {:.1}, {:.1} m", on_pitch.x, on_pitch.y);
//! # Ok(())
//! # }
//! ```
//!
//! ## Building blocks
//!
//! ```no_run
//! use pitchcal::core::{CorrespondencePoint, RansacOptions};
//! use pitchcal::linear::{CalibrationValidator, CoordinateTransformer, HomographySolver, ValidationOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let points: Vec<CorrespondencePoint> = /* user clicks */
//! # vec![];
//! let h = HomographySolver::compute(&points, &RansacOptions::default())?;
//! let h_inv = HomographySolver::invert(&h)?;
//! let metrics = CalibrationValidator::validate(&points, &h, &ValidationOptions::default());
//! let px = CoordinateTransformer::pitch_to_video(52.5, 34.0, &h_inv)?;
//! # let _ = (metrics, px);
//! # Ok(())
//! # }
//! ```

/// Math types, RANSAC engine, pitch and camera models.
pub mod core {
    pub use pitchcal_core::*;
}

/// Homography estimation, coordinate transforms and validation.
pub mod linear {
    pub use pitchcal_linear::*;
}

/// Camera pose search.
pub mod optim {
    pub use pitchcal_optim::*;
}

/// Configuration, sessions, records and stores.
pub mod pipeline {
    pub use pitchcal_pipeline::*;
}

/// Convenient re-exports for common use cases.
pub mod prelude {
    pub use crate::core::{
        CalibrationError, CameraParameters, CorrespondencePoint, HomographyMatrix,
        PitchDimensions, PitchFeature, PitchOrigin, Pt2, Pt3, RansacOptions, ValidationMetrics,
        Viewport,
    };
    pub use crate::linear::{
        CalibrationValidator, CoordinateTransformer, HomographySolver, ValidationOptions,
    };
    pub use crate::optim::{CameraPoseSolver, PoseSolution, PoseSolverOptions};
    pub use crate::pipeline::{
        Calibration, CalibrationSession, CalibrationStore, InMemoryStore, JsonDirStore,
        PitchCalConfig, PoseInput,
    };
}
