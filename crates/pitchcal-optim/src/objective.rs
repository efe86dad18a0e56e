use pitchcal_core::{CameraParameters, CameraPoseCorrespondence, PerspectiveProjection, Real};

/// Squared NDC error charged for a point on or behind the camera plane.
pub const BEHIND_CAMERA_PENALTY: Real = 10.0;

fn squared_error(proj: &PerspectiveProjection, c: &CameraPoseCorrespondence) -> Real {
    match proj.project(&c.world) {
        Some(p) => (p - c.screen_normalized).norm_squared(),
        None => BEHIND_CAMERA_PENALTY,
    }
}

/// Squared NDC distance of each correspondence under `params`.
pub fn squared_errors(
    params: &CameraParameters,
    correspondences: &[CameraPoseCorrespondence],
    aspect_ratio: Real,
) -> Vec<Real> {
    let proj = PerspectiveProjection::new(params, aspect_ratio);
    correspondences
        .iter()
        .map(|c| squared_error(&proj, c))
        .collect()
}

/// Mean squared NDC reprojection error; `INFINITY` for an empty set.
pub fn reprojection_mse(
    params: &CameraParameters,
    correspondences: &[CameraPoseCorrespondence],
    aspect_ratio: Real,
) -> Real {
    if correspondences.is_empty() {
        return Real::INFINITY;
    }
    let proj = PerspectiveProjection::new(params, aspect_ratio);
    let total: Real = correspondences
        .iter()
        .map(|c| squared_error(&proj, c))
        .sum();
    let mse = total / correspondences.len() as Real;
    if mse.is_nan() {
        Real::INFINITY
    } else {
        mse
    }
}
