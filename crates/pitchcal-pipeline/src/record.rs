use chrono::{DateTime, Utc};
use pitchcal_core::{
    CalibrationError, CorrespondencePoint, HomographyMatrix, Pt2, Real, ValidationMetrics,
};
use pitchcal_linear::CoordinateTransformer;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The persisted result of a pixel→pitch calibration for one video.
///
/// A recompute replaces every derived field; only `id` and `created_at`
/// survive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub id: Uuid,
    pub video_id: String,
    /// Video pixel → pitch meters.
    pub homography_matrix: HomographyMatrix,
    /// Pitch meters → video pixel.
    pub inverse_matrix: HomographyMatrix,
    pub points: Vec<CorrespondencePoint>,
    pub metrics: ValidationMetrics,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Calibration {
    pub fn new(
        video_id: impl Into<String>,
        homography_matrix: HomographyMatrix,
        inverse_matrix: HomographyMatrix,
        points: Vec<CorrespondencePoint>,
        metrics: ValidationMetrics,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            video_id: video_id.into(),
            homography_matrix,
            inverse_matrix,
            points,
            metrics,
            created_at: now,
            updated_at: now,
        }
    }

    /// Full replacement of the derived data, keeping identity and creation time.
    pub fn replaced(
        &self,
        homography_matrix: HomographyMatrix,
        inverse_matrix: HomographyMatrix,
        points: Vec<CorrespondencePoint>,
        metrics: ValidationMetrics,
    ) -> Self {
        Self {
            id: self.id,
            video_id: self.video_id.clone(),
            homography_matrix,
            inverse_matrix,
            points,
            metrics,
            created_at: self.created_at,
            updated_at: Utc::now(),
        }
    }

    pub fn video_to_pitch(&self, x: Real, y: Real) -> Result<Pt2, CalibrationError> {
        CoordinateTransformer::video_to_pitch(x, y, &self.homography_matrix)
    }

    pub fn pitch_to_video(&self, x: Real, y: Real) -> Result<Pt2, CalibrationError> {
        CoordinateTransformer::pitch_to_video(x, y, &self.inverse_matrix)
    }
}
