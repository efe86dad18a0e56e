//! Reprojection-error validation of a pixel→pitch homography.

use log::warn;
use pitchcal_core::{CorrespondencePoint, HomographyMatrix, Real, ValidationMetrics};
use serde::{Deserialize, Serialize};

use crate::CoordinateTransformer;

/// Acceptance policy for a calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// A calibration is valid when its mean error is strictly below this (meters).
    pub max_mean_error_meters: Real,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            max_mean_error_meters: 2.0,
        }
    }
}

/// Computes reprojection statistics of correspondences under a homography.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationValidator;

impl CalibrationValidator {
    /// Map every `video_pixel` through `h` and compare with its `pitch_meters`.
    ///
    /// Points mapping to infinity count as infinite error. An empty point set
    /// yields [`ValidationMetrics::empty`].
    pub fn validate(
        points: &[CorrespondencePoint],
        h: &HomographyMatrix,
        opts: &ValidationOptions,
    ) -> ValidationMetrics {
        if points.is_empty() {
            return ValidationMetrics::empty();
        }

        let mut sum = 0.0;
        let mut max: Real = 0.0;
        for p in points {
            let err = CoordinateTransformer::video_to_pitch(p.video_pixel.x, p.video_pixel.y, h)
                .map(|q| (q - p.pitch_meters).norm())
                .unwrap_or(Real::INFINITY);
            sum += err;
            max = max.max(err);
        }
        let mean = sum / points.len() as Real;

        let metrics = ValidationMetrics {
            mean_error_meters: mean,
            max_error_meters: max,
            point_count: points.len(),
            is_valid: mean < opts.max_mean_error_meters,
        };
        if let Some(msg) = metrics.warning() {
            warn!("{msg}");
        }
        metrics
    }

    /// Per-point reprojection errors in meters, in input order.
    pub fn point_errors(points: &[CorrespondencePoint], h: &HomographyMatrix) -> Vec<Real> {
        points
            .iter()
            .map(|p| {
                CoordinateTransformer::video_to_pitch(p.video_pixel.x, p.video_pixel.y, h)
                    .map(|q| (q - p.pitch_meters).norm())
                    .unwrap_or(Real::INFINITY)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchcal_core::Pt2;

    fn shifted(dx: Real) -> Vec<CorrespondencePoint> {
        [(10.0, 10.0), (50.0, 20.0), (90.0, 60.0)]
            .into_iter()
            .enumerate()
            .map(|(i, (x, y))| {
                CorrespondencePoint::new(Pt2::new(x, y), Pt2::new(x + dx, y), format!("p{i}"))
            })
            .collect()
    }

    #[test]
    fn identity_on_exact_points_is_zero_error() {
        let m = CalibrationValidator::validate(
            &shifted(0.0),
            &HomographyMatrix::identity(),
            &ValidationOptions::default(),
        );
        assert_eq!(m.point_count, 3);
        assert_eq!(m.mean_error_meters, 0.0);
        assert!(m.is_valid);
    }

    #[test]
    fn threshold_is_configurable() {
        let pts = shifted(1.5);
        let strict = ValidationOptions {
            max_mean_error_meters: 1.0,
        };
        let h = HomographyMatrix::identity();
        assert!(CalibrationValidator::validate(&pts, &h, &ValidationOptions::default()).is_valid);
        assert!(!CalibrationValidator::validate(&pts, &h, &strict).is_valid);
    }

    #[test]
    fn unmappable_point_is_infinite_error() {
        let h = HomographyMatrix::from_rows([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.1, 0.0, -1.0]]);
        let errors = CalibrationValidator::point_errors(&shifted(0.0), &h);
        assert!(errors[0].is_infinite());
        let m = CalibrationValidator::validate(&shifted(0.0), &h, &ValidationOptions::default());
        assert!(!m.is_valid);
        assert!(m.max_error_meters.is_infinite());
    }

    #[test]
    fn empty_set_is_not_valid() {
        let m = CalibrationValidator::validate(
            &[],
            &HomographyMatrix::identity(),
            &ValidationOptions::default(),
        );
        assert_eq!(m, ValidationMetrics::empty());
    }
}
