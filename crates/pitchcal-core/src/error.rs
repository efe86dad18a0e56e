use thiserror::Error;

use crate::Real;

/// Errors produced by the calibration stages.
///
/// Every stage is a pure function returning `Result<_, CalibrationError>`;
/// nothing here is fatal and nothing is retried automatically.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    /// Fewer correspondences than the estimator's minimum.
    #[error("need at least {required} point correspondences, got {got}")]
    InsufficientPoints { required: usize, got: usize },
    /// The robust fit could not produce a usable transform.
    #[error("homography computation failed: {0}")]
    HomographyComputationFailed(String),
    /// A matrix inverse was requested on a (near) singular matrix.
    #[error("matrix is singular (|det| = {det:e})")]
    SingularMatrix { det: Real },
    /// The homogeneous scale of a transformed point vanished.
    #[error("point maps to infinity under the given transform")]
    PointAtInfinity,
    /// A correspondence references a pitch location outside the pitch rectangle.
    #[error("feature '{feature}' at ({x:.2}, {y:.2}) m lies outside the pitch")]
    PointOutsidePitch { feature: String, x: Real, y: Real },
    /// A feature name is not in the landmark catalogue.
    #[error("unknown pitch feature '{0}'")]
    UnknownFeature(String),
    /// Malformed input such as a non-finite coordinate or aspect ratio.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The external tracker reported that the reference view was lost.
    #[error("camera tracking lost; pixel/pitch transforms are stale")]
    TrackingLost,
    /// A query was made before any calibration was computed.
    #[error("no calibration has been computed yet")]
    NotComputed,
}
