//! Staged random local search over camera parameters.
//!
//! Each iteration perturbs one of the six free parameters by a uniform delta
//! in `[-step, +step]`, clamps the candidate to the physical constraints and
//! keeps it only if the reprojection error strictly improves. Stages run
//! coarse to fine with shrinking steps. There is no annealing: the error of
//! the returned parameters never exceeds that of the (clamped) start.

use log::debug;
use pitchcal_core::{CalibrationError, CameraParameters, CameraPoseCorrespondence, Real};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::reprojection_mse;

/// Minimum correspondences accepted by the solver.
pub const MIN_POSE_POINTS: usize = 4;

/// One stage of the search schedule. Steps are half-widths of the uniform
/// perturbation range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchStage {
    pub iterations: usize,
    /// World units, applied to `x`, `y` and `z`.
    pub position_step: Real,
    /// Radians, applied to pitch and yaw.
    pub rotation_step: Real,
    /// Degrees.
    pub fov_step: Real,
}

impl SearchStage {
    /// The coarse → refine → fine schedule used by default.
    pub fn default_schedule() -> Vec<SearchStage> {
        vec![
            SearchStage {
                iterations: 1000,
                position_step: 1.0,
                rotation_step: 0.05,
                fov_step: 1.0,
            },
            SearchStage {
                iterations: 2000,
                position_step: 0.25,
                rotation_step: 0.01,
                fov_step: 0.25,
            },
            SearchStage {
                iterations: 2000,
                position_step: 0.025,
                rotation_step: 0.0025,
                fov_step: 0.05,
            },
        ]
    }
}

/// Physical limits enforced on every candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseConstraints {
    /// Lowest admissible camera height above the pitch.
    pub min_height: Real,
    pub min_fov_degrees: Real,
    pub max_fov_degrees: Real,
}

impl Default for PoseConstraints {
    fn default() -> Self {
        Self {
            min_height: 5.0,
            min_fov_degrees: 10.0,
            max_fov_degrees: 120.0,
        }
    }
}

impl PoseConstraints {
    pub fn apply(&self, p: &mut CameraParameters) {
        p.y = p.y.max(self.min_height);
        p.field_of_view_degrees = p
            .field_of_view_degrees
            .clamp(self.min_fov_degrees, self.max_fov_degrees);
        p.rotation_z = 0.0;
    }

    pub fn admits(&self, p: &CameraParameters) -> bool {
        p.y >= self.min_height
            && p.field_of_view_degrees >= self.min_fov_degrees
            && p.field_of_view_degrees <= self.max_fov_degrees
    }
}

/// Options for [`CameraPoseSolver`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseSolverOptions {
    pub stages: Vec<SearchStage>,
    pub constraints: PoseConstraints,
    /// Seed of the random source used by [`CameraPoseSolver::solve`].
    pub seed: u64,
}

impl Default for PoseSolverOptions {
    fn default() -> Self {
        Self {
            stages: SearchStage::default_schedule(),
            constraints: PoseConstraints::default(),
            seed: 42,
        }
    }
}

impl PoseSolverOptions {
    fn check(&self) -> Result<(), CalibrationError> {
        let c = &self.constraints;
        if !(c.min_height.is_finite()
            && c.min_fov_degrees > 0.0
            && c.min_fov_degrees <= c.max_fov_degrees
            && c.max_fov_degrees < 180.0)
        {
            return Err(CalibrationError::InvalidInput(format!(
                "inconsistent pose constraints: {c:?}"
            )));
        }
        for (i, s) in self.stages.iter().enumerate() {
            let steps = [s.position_step, s.rotation_step, s.fov_step];
            if steps.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(CalibrationError::InvalidInput(format!(
                    "stage {i} has a negative or non-finite step"
                )));
            }
        }
        Ok(())
    }
}

/// Result of a pose solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseSolution {
    pub parameters: CameraParameters,
    /// Mean squared NDC reprojection error of `parameters`.
    pub error: Real,
    /// Error of the clamped starting parameters.
    pub initial_error: Real,
    /// Number of accepted perturbations.
    pub accepted: usize,
}

/// Free parameters of the search, in the order they are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FreeParam {
    X,
    Y,
    Z,
    Pitch,
    Yaw,
    Fov,
}

impl FreeParam {
    const ALL: [FreeParam; 6] = [
        FreeParam::X,
        FreeParam::Y,
        FreeParam::Z,
        FreeParam::Pitch,
        FreeParam::Yaw,
        FreeParam::Fov,
    ];

    fn step(self, stage: &SearchStage) -> Real {
        match self {
            FreeParam::X | FreeParam::Y | FreeParam::Z => stage.position_step,
            FreeParam::Pitch | FreeParam::Yaw => stage.rotation_step,
            FreeParam::Fov => stage.fov_step,
        }
    }

    fn slot(self, p: &mut CameraParameters) -> &mut Real {
        match self {
            FreeParam::X => &mut p.x,
            FreeParam::Y => &mut p.y,
            FreeParam::Z => &mut p.z,
            FreeParam::Pitch => &mut p.rotation_x,
            FreeParam::Yaw => &mut p.rotation_y,
            FreeParam::Fov => &mut p.field_of_view_degrees,
        }
    }
}

/// Recovers camera position, pitch, yaw and field of view from
/// world↔screen correspondences.
#[derive(Debug, Clone, Copy)]
pub struct CameraPoseSolver;

impl CameraPoseSolver {
    /// Solve with a random source seeded from `opts.seed`.
    ///
    /// `initial` defaults to [`CameraParameters::default`], a typical
    /// broadcast camera.
    pub fn solve(
        correspondences: &[CameraPoseCorrespondence],
        aspect_ratio: Real,
        initial: Option<&CameraParameters>,
        opts: &PoseSolverOptions,
    ) -> Result<PoseSolution, CalibrationError> {
        let mut rng = StdRng::seed_from_u64(opts.seed);
        Self::solve_with_rng(correspondences, aspect_ratio, initial, opts, &mut rng)
    }

    /// Solve drawing perturbations from a caller-supplied random source.
    pub fn solve_with_rng<R: Rng>(
        correspondences: &[CameraPoseCorrespondence],
        aspect_ratio: Real,
        initial: Option<&CameraParameters>,
        opts: &PoseSolverOptions,
        rng: &mut R,
    ) -> Result<PoseSolution, CalibrationError> {
        if correspondences.len() < MIN_POSE_POINTS {
            return Err(CalibrationError::InsufficientPoints {
                required: MIN_POSE_POINTS,
                got: correspondences.len(),
            });
        }
        if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
            return Err(CalibrationError::InvalidInput(format!(
                "aspect ratio must be positive, got {aspect_ratio}"
            )));
        }
        let finite = |c: &CameraPoseCorrespondence| {
            c.world.iter().chain(c.screen_normalized.iter()).all(|v| v.is_finite())
        };
        if !correspondences.iter().all(finite) {
            return Err(CalibrationError::InvalidInput(
                "correspondence with non-finite coordinate".into(),
            ));
        }
        opts.check()?;

        let mut best = initial.copied().unwrap_or_default();
        if !best.is_finite() {
            return Err(CalibrationError::InvalidInput(
                "initial guess has a non-finite parameter".into(),
            ));
        }
        opts.constraints.apply(&mut best);
        let mut best_err = reprojection_mse(&best, correspondences, aspect_ratio);
        let initial_error = best_err;
        let mut accepted = 0;

        for (stage_idx, stage) in opts.stages.iter().enumerate() {
            let mut stage_accepted = 0;
            for _ in 0..stage.iterations {
                let param = FreeParam::ALL[rng.random_range(0..FreeParam::ALL.len())];
                let step = param.step(stage);
                let mut candidate = best;
                *param.slot(&mut candidate) += rng.random_range(-step..=step);
                opts.constraints.apply(&mut candidate);

                let err = reprojection_mse(&candidate, correspondences, aspect_ratio);
                if err < best_err {
                    best = candidate;
                    best_err = err;
                    stage_accepted += 1;
                }
            }
            accepted += stage_accepted;
            debug!(
                "pose stage {stage_idx}: {} iterations, {stage_accepted} accepted, mse {best_err:.3e}",
                stage.iterations
            );
        }

        Ok(PoseSolution {
            parameters: best,
            error: best_err,
            initial_error,
            accepted,
        })
    }
}
