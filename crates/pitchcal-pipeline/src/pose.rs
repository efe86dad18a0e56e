use pitchcal_core::{
    CalibrationError, CameraParameters, CameraPoseCorrespondence, CorrespondencePoint,
    PitchDimensions, Viewport,
};
use pitchcal_optim::{CameraPoseSolver, PoseSolution, PoseSolverOptions};
use serde::{Deserialize, Serialize};

/// Input of a pose solve expressed in raw video pixels and pitch meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseInput {
    pub viewport: Viewport,
    pub points: Vec<CorrespondencePoint>,
    #[serde(default)]
    pub initial_guess: Option<CameraParameters>,
}

/// Lift clicked correspondences into the pose solver's frames: pitch meters
/// to the 3D world frame and pixels to NDC.
pub fn pose_correspondences(
    points: &[CorrespondencePoint],
    viewport: &Viewport,
    pitch: &PitchDimensions,
) -> Result<Vec<CameraPoseCorrespondence>, CalibrationError> {
    viewport.check()?;
    points
        .iter()
        .map(|p| {
            pitch.check_contains(&p.feature_name, &p.pitch_meters)?;
            Ok(CameraPoseCorrespondence {
                world: pitch.to_world(&p.pitch_meters),
                screen_normalized: viewport.pixel_to_ndc(&p.video_pixel),
            })
        })
        .collect()
}

/// Recover the camera from clicked correspondences.
pub fn solve_camera_pose_from_points(
    points: &[CorrespondencePoint],
    viewport: &Viewport,
    pitch: &PitchDimensions,
    initial: Option<&CameraParameters>,
    opts: &PoseSolverOptions,
) -> Result<PoseSolution, CalibrationError> {
    let corrs = pose_correspondences(points, viewport, pitch)?;
    CameraPoseSolver::solve(&corrs, viewport.aspect_ratio(), initial, opts)
}

impl PoseInput {
    pub fn solve(
        &self,
        pitch: &PitchDimensions,
        opts: &PoseSolverOptions,
    ) -> Result<PoseSolution, CalibrationError> {
        solve_camera_pose_from_points(
            &self.points,
            &self.viewport,
            pitch,
            self.initial_guess.as_ref(),
            opts,
        )
    }
}
