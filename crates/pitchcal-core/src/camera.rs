//! Perspective camera model for the pose solver.
//!
//! The camera follows the renderer's conventions: world `y` is up, the camera
//! looks down its local `-Z` axis, and orientation is an Euler rotation in
//! `YXZ` order (yaw about `Y`, then pitch about `X`, roll fixed at zero).
//! Projection yields normalized device coordinates (NDC) with `y` up.

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::{CalibrationError, Pt2, Pt3, Real};

/// Position, orientation and vertical field of view of a virtual camera.
///
/// `rotation_z` (roll) is not estimated and stays zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraParameters {
    pub x: Real,
    pub y: Real,
    pub z: Real,
    /// Pitch in radians (negative looks down).
    pub rotation_x: Real,
    /// Yaw in radians.
    pub rotation_y: Real,
    #[serde(default)]
    pub rotation_z: Real,
    /// Vertical field of view in degrees.
    pub field_of_view_degrees: Real,
}

impl Default for CameraParameters {
    /// A typical elevated broadcast camera behind the near touchline.
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 30.0,
            z: 60.0,
            rotation_x: -0.4,
            rotation_y: 0.0,
            rotation_z: 0.0,
            field_of_view_degrees: 30.0,
        }
    }
}

impl CameraParameters {
    pub fn position(&self) -> Pt3 {
        Pt3::new(self.x, self.y, self.z)
    }

    /// Camera-to-world rotation `R_y(yaw) * R_x(pitch)`.
    pub fn rotation(&self) -> Rotation3<Real> {
        Rotation3::from_axis_angle(&Vector3::y_axis(), self.rotation_y)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), self.rotation_x)
    }

    pub fn is_finite(&self) -> bool {
        [
            self.x,
            self.y,
            self.z,
            self.rotation_x,
            self.rotation_y,
            self.rotation_z,
            self.field_of_view_degrees,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// A known world point and where it was observed on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPoseCorrespondence {
    /// World point, normally on the pitch plane `y = 0`.
    pub world: Pt3,
    /// Observed position in NDC, `[-1, 1]` with `y` up.
    pub screen_normalized: Pt2,
}

/// Precomputed world→NDC projection for one parameter set.
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveProjection {
    world_to_cam: Rotation3<Real>,
    position: Pt3,
    fx: Real,
    fy: Real,
}

impl PerspectiveProjection {
    pub fn new(params: &CameraParameters, aspect_ratio: Real) -> Self {
        let f = 1.0 / (params.field_of_view_degrees.to_radians() / 2.0).tan();
        Self {
            world_to_cam: params.rotation().inverse(),
            position: params.position(),
            fx: f / aspect_ratio,
            fy: f,
        }
    }

    /// World point expressed in the camera frame.
    pub fn to_camera(&self, world: &Pt3) -> Vector3<Real> {
        self.world_to_cam * (world - self.position)
    }

    /// Project to NDC; `None` for points on or behind the camera plane.
    pub fn project(&self, world: &Pt3) -> Option<Pt2> {
        let pc = self.to_camera(world);
        let depth = -pc.z;
        if depth <= 1e-9 {
            return None;
        }
        Some(Pt2::new(self.fx * pc.x / depth, self.fy * pc.y / depth))
    }
}

/// Video frame size in pixels; converts raw pixels to NDC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: Real,
    pub height: Real,
}

impl Viewport {
    pub fn new(width: Real, height: Real) -> Result<Self, CalibrationError> {
        let vp = Self { width, height };
        vp.check()?;
        Ok(vp)
    }

    pub fn check(&self) -> Result<(), CalibrationError> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(CalibrationError::InvalidInput(format!(
                "viewport must have positive size, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    pub fn aspect_ratio(&self) -> Real {
        self.width / self.height
    }

    /// Pixel (origin top-left, `y` down) to NDC (`y` up).
    pub fn pixel_to_ndc(&self, px: &Pt2) -> Pt2 {
        Pt2::new(2.0 * px.x / self.width - 1.0, 1.0 - 2.0 * px.y / self.height)
    }

    pub fn ndc_to_pixel(&self, ndc: &Pt2) -> Pt2 {
        Pt2::new(
            (ndc.x + 1.0) * self.width / 2.0,
            (1.0 - ndc.y) * self.height / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_on_optical_axis_projects_to_centre() {
        let params = CameraParameters {
            x: 0.0,
            y: 10.0,
            z: 0.0,
            rotation_x: -std::f64::consts::FRAC_PI_2,
            rotation_y: 0.0,
            rotation_z: 0.0,
            field_of_view_degrees: 60.0,
        };
        let proj = PerspectiveProjection::new(&params, 1.5);
        let p = proj.project(&Pt3::origin()).unwrap();
        assert!(p.coords.norm() < 1e-12, "{p:?}");
    }

    #[test]
    fn vertical_fov_maps_edge_to_unit_ndc() {
        let params = CameraParameters {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
            rotation_z: 0.0,
            field_of_view_degrees: 90.0,
        };
        let proj = PerspectiveProjection::new(&params, 2.0);
        // 45 degrees above the axis sits on the top edge.
        let top = proj.project(&Pt3::new(0.0, 5.0, -5.0)).unwrap();
        assert!((top.y - 1.0).abs() < 1e-12);
        // Horizontal extent is scaled by the aspect ratio.
        let right = proj.project(&Pt3::new(10.0, 0.0, -5.0)).unwrap();
        assert!((right.x - 1.0).abs() < 1e-12);
        assert!(proj.project(&Pt3::new(0.0, 0.0, 5.0)).is_none());
    }

    #[test]
    fn yaw_turns_the_view_left() {
        let params = CameraParameters {
            rotation_x: 0.0,
            rotation_y: std::f64::consts::FRAC_PI_2,
            ..CameraParameters::default()
        };
        let proj = PerspectiveProjection::new(&params, 1.0);
        // Positive yaw about +Y rotates -Z towards -X.
        let ahead = Pt3::new(params.x - 20.0, params.y, params.z);
        let p = proj.project(&ahead).unwrap();
        assert!(p.coords.norm() < 1e-9, "{p:?}");
    }

    #[test]
    fn viewport_flips_y() {
        let vp = Viewport::new(1920.0, 1080.0).unwrap();
        let ndc = vp.pixel_to_ndc(&Pt2::new(0.0, 0.0));
        assert_eq!(ndc, Pt2::new(-1.0, 1.0));
        let px = vp.ndc_to_pixel(&Pt2::new(0.5, -0.5));
        assert!((px - Pt2::new(1440.0, 810.0)).norm() < 1e-9);
        assert!(Viewport::new(0.0, 10.0).is_err());
    }
}
