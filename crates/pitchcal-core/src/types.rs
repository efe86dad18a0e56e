//! Correspondence, homography and validation types.

use serde::{Deserialize, Serialize};

use crate::{Mat3, Pt2, Real};

/// One user click: a video pixel paired with its known pitch location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrespondencePoint {
    /// Pixel coordinates in the video frame.
    pub video_pixel: Pt2,
    /// Pitch coordinates in meters.
    pub pitch_meters: Pt2,
    /// Landmark identifier; unique within a calibration session.
    pub feature_name: String,
    /// Video frame the click was made on.
    #[serde(default)]
    pub frame_number: u32,
}

impl CorrespondencePoint {
    pub fn new(video_pixel: Pt2, pitch_meters: Pt2, feature_name: impl Into<String>) -> Self {
        Self {
            video_pixel,
            pitch_meters,
            feature_name: feature_name.into(),
            frame_number: 0,
        }
    }

    pub fn with_frame(mut self, frame_number: u32) -> Self {
        self.frame_number = frame_number;
        self
    }
}

/// A 3×3 projective transform, serialized row-major.
///
/// Forward matrices map video pixels to pitch meters; inverse matrices map
/// pitch meters back to pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[Real; 3]; 3]", into = "[[Real; 3]; 3]")]
pub struct HomographyMatrix(pub Mat3);

impl HomographyMatrix {
    pub fn identity() -> Self {
        Self(Mat3::identity())
    }

    pub fn from_rows(rows: [[Real; 3]; 3]) -> Self {
        Self(Mat3::from_fn(|r, c| rows[r][c]))
    }

    pub fn to_rows(&self) -> [[Real; 3]; 3] {
        let m = &self.0;
        [
            [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
            [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
            [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
        ]
    }

    #[inline]
    pub fn matrix(&self) -> &Mat3 {
        &self.0
    }

    pub fn determinant(&self) -> Real {
        self.0.determinant()
    }

    /// Scale so that `H[2][2] == 1`, when that element is not negligible.
    pub fn normalized(&self) -> Self {
        let s = self.0[(2, 2)];
        if s.abs() > Real::EPSILON {
            Self(self.0 / s)
        } else {
            *self
        }
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl From<[[Real; 3]; 3]> for HomographyMatrix {
    fn from(rows: [[Real; 3]; 3]) -> Self {
        Self::from_rows(rows)
    }
}

impl From<HomographyMatrix> for [[Real; 3]; 3] {
    fn from(h: HomographyMatrix) -> Self {
        h.to_rows()
    }
}

/// Reprojection quality of a calibration, in pitch meters.
///
/// Always recomputed as a whole; never patched in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationMetrics {
    /// `+inf` when some point maps to infinity.
    #[serde(with = "error_meters")]
    pub mean_error_meters: Real,
    #[serde(with = "error_meters")]
    pub max_error_meters: Real,
    pub point_count: usize,
    pub is_valid: bool,
}

impl ValidationMetrics {
    /// Metrics for an empty point set.
    pub fn empty() -> Self {
        Self {
            mean_error_meters: 0.0,
            max_error_meters: 0.0,
            point_count: 0,
            is_valid: false,
        }
    }

    /// Human-readable warning when the calibration is usable but inaccurate.
    pub fn warning(&self) -> Option<String> {
        if self.is_valid {
            return None;
        }
        if self.point_count == 0 {
            return Some("calibration has no points to validate".to_string());
        }
        Some(format!(
            "calibration accuracy below threshold: mean error {:.2} m (max {:.2} m) over {} points",
            self.mean_error_meters, self.max_error_meters, self.point_count
        ))
    }
}

/// JSON has no infinity: non-finite errors are written as `null` and read
/// back as `+inf`.
mod error_meters {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::Real;

    pub fn serialize<S: Serializer>(v: &Real, s: S) -> Result<S::Ok, S::Error> {
        v.is_finite().then_some(*v).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Real, D::Error> {
        Ok(Option::<Real>::deserialize(d)?.unwrap_or(Real::INFINITY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_serializes_row_major() {
        let h = HomographyMatrix::from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        assert_eq!(h.matrix()[(0, 1)], 2.0);
        assert_eq!(h.matrix()[(1, 0)], 4.0);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, "[[1.0,2.0,3.0],[4.0,5.0,6.0],[7.0,8.0,9.0]]");
        let back: HomographyMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn normalization_fixes_bottom_right() {
        let h = HomographyMatrix(Mat3::identity() * 4.0).normalized();
        assert_eq!(h, HomographyMatrix::identity());
        let mut m = Mat3::identity();
        m[(2, 2)] = 0.0;
        assert_eq!(HomographyMatrix(m).normalized().matrix()[(0, 0)], 1.0);
    }

    #[test]
    fn warning_only_when_invalid() {
        let ok = ValidationMetrics {
            mean_error_meters: 0.4,
            max_error_meters: 0.9,
            point_count: 6,
            is_valid: true,
        };
        assert!(ok.warning().is_none());
        let bad = ValidationMetrics {
            is_valid: false,
            mean_error_meters: 2.4,
            ..ok
        };
        assert!(bad.warning().unwrap().contains("2.40 m"));
        assert!(ValidationMetrics::empty().warning().is_some());
    }

    #[test]
    fn unmappable_error_survives_json() {
        let m = ValidationMetrics {
            mean_error_meters: Real::INFINITY,
            max_error_meters: Real::INFINITY,
            point_count: 5,
            is_valid: false,
        };
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"mean_error_meters\":null"), "{json}");
        let back: ValidationMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);

        let finite = ValidationMetrics {
            mean_error_meters: 0.1 + 0.2,
            max_error_meters: 1.0 / 3.0,
            ..m
        };
        let back: ValidationMetrics =
            serde_json::from_str(&serde_json::to_string(&finite).unwrap()).unwrap();
        assert_eq!(back, finite);
    }
}
