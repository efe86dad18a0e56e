use log::{debug, warn};
use pitchcal_core::{
    CalibrationError, CameraParameters, CorrespondencePoint, PitchFeature, Pt2, Real, Viewport,
};
use pitchcal_linear::{CalibrationValidator, HomographySolver};
use pitchcal_optim::PoseSolution;

use crate::{solve_camera_pose_from_points, Calibration, PitchCalConfig};

/// Interactive calibration state of one video.
///
/// Points are keyed by feature name: adding a point for a feature that is
/// already present replaces it. Any change to the point set drops the current
/// result until [`CalibrationSession::compute`] runs again.
#[derive(Debug, Clone)]
pub struct CalibrationSession {
    video_id: String,
    config: PitchCalConfig,
    points: Vec<CorrespondencePoint>,
    calibration: Option<Calibration>,
    stale: bool,
    tracking_lost: bool,
}

impl CalibrationSession {
    pub fn new(video_id: impl Into<String>, config: PitchCalConfig) -> Self {
        Self {
            video_id: video_id.into(),
            config,
            points: Vec::new(),
            calibration: None,
            stale: false,
            tracking_lost: false,
        }
    }

    /// Continue from a previously persisted record.
    pub fn resume(record: Calibration, config: PitchCalConfig) -> Self {
        Self {
            video_id: record.video_id.clone(),
            config,
            points: record.points.clone(),
            calibration: Some(record),
            stale: false,
            tracking_lost: false,
        }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn config(&self) -> &PitchCalConfig {
        &self.config
    }

    /// Points in the order their features were first added.
    pub fn points(&self) -> &[CorrespondencePoint] {
        &self.points
    }

    /// The current result, if one is computed and still matches the points.
    pub fn calibration(&self) -> Option<&Calibration> {
        if self.stale {
            None
        } else {
            self.calibration.as_ref()
        }
    }

    pub fn is_tracking_lost(&self) -> bool {
        self.tracking_lost
    }

    /// Add or replace the point of `point.feature_name`.
    pub fn add_point(&mut self, point: CorrespondencePoint) -> Result<(), CalibrationError> {
        let mut coords = point.video_pixel.iter().chain(point.pitch_meters.iter());
        if !coords.all(|v| v.is_finite()) {
            return Err(CalibrationError::InvalidInput(format!(
                "feature '{}' has a non-finite coordinate",
                point.feature_name
            )));
        }
        self.config
            .pitch
            .check_contains(&point.feature_name, &point.pitch_meters)?;

        match self
            .points
            .iter_mut()
            .find(|p| p.feature_name == point.feature_name)
        {
            Some(existing) => {
                debug!("replacing point for feature '{}'", point.feature_name);
                *existing = point;
            }
            None => self.points.push(point),
        }
        self.invalidate();
        Ok(())
    }

    /// Add a click on a catalogue landmark; its pitch location comes from the
    /// configured pitch dimensions.
    pub fn add_feature_point(
        &mut self,
        feature: PitchFeature,
        video_pixel: Pt2,
        frame_number: u32,
    ) -> Result<(), CalibrationError> {
        let pitch_meters = self.config.pitch.feature_position(feature);
        self.add_point(
            CorrespondencePoint::new(video_pixel, pitch_meters, feature.name())
                .with_frame(frame_number),
        )
    }

    /// Like [`CalibrationSession::add_feature_point`] with the feature given by name.
    pub fn add_named_feature_point(
        &mut self,
        feature_name: &str,
        video_pixel: Pt2,
        frame_number: u32,
    ) -> Result<(), CalibrationError> {
        let feature = feature_name.parse::<PitchFeature>()?;
        self.add_feature_point(feature, video_pixel, frame_number)
    }

    /// Remove the point of a feature. Returns whether one was present.
    pub fn remove_point(&mut self, feature_name: &str) -> bool {
        let before = self.points.len();
        self.points.retain(|p| p.feature_name != feature_name);
        let removed = self.points.len() != before;
        if removed {
            self.invalidate();
        }
        removed
    }

    /// Drop every point and the computed calibration.
    pub fn clear(&mut self) {
        self.points.clear();
        self.calibration = None;
        self.stale = false;
    }

    /// Solve, invert and validate, replacing the current result wholesale.
    ///
    /// On failure the previous result stays dropped.
    pub fn compute(&mut self) -> Result<&Calibration, CalibrationError> {
        let forward = HomographySolver::compute(&self.points, &self.config.homography)?;
        let inverse = HomographySolver::invert(&forward)?;
        let metrics = CalibrationValidator::validate(&self.points, &forward, &self.config.validation);
        debug!(
            "calibration of '{}': {} points, mean error {:.3} m, valid: {}",
            self.video_id, metrics.point_count, metrics.mean_error_meters, metrics.is_valid
        );

        let points = self.points.clone();
        let record = match &self.calibration {
            Some(prev) => prev.replaced(forward, inverse, points, metrics),
            None => Calibration::new(self.video_id.clone(), forward, inverse, points, metrics),
        };
        self.stale = false;
        Ok(self.calibration.insert(record))
    }

    /// The external tracker lost the reference view; transforms are unusable
    /// until [`CalibrationSession::mark_tracking_restored`].
    pub fn mark_tracking_lost(&mut self) {
        if !self.tracking_lost {
            warn!("tracking lost for '{}'", self.video_id);
        }
        self.tracking_lost = true;
    }

    pub fn mark_tracking_restored(&mut self) {
        self.tracking_lost = false;
    }

    pub fn video_to_pitch(&self, x: Real, y: Real) -> Result<Pt2, CalibrationError> {
        self.current()?.video_to_pitch(x, y)
    }

    pub fn pitch_to_video(&self, x: Real, y: Real) -> Result<Pt2, CalibrationError> {
        self.current()?.pitch_to_video(x, y)
    }

    /// Recover the camera pose from the session's points.
    pub fn solve_camera_pose(
        &self,
        viewport: &Viewport,
        initial: Option<&CameraParameters>,
    ) -> Result<PoseSolution, CalibrationError> {
        solve_camera_pose_from_points(
            &self.points,
            viewport,
            &self.config.pitch,
            initial,
            &self.config.pose,
        )
    }

    fn current(&self) -> Result<&Calibration, CalibrationError> {
        if self.tracking_lost {
            return Err(CalibrationError::TrackingLost);
        }
        self.calibration().ok_or(CalibrationError::NotComputed)
    }

    fn invalidate(&mut self) {
        if self.calibration.is_some() {
            self.stale = true;
        }
    }
}
