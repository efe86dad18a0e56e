//! Mathematical type definitions.
//!
//! Everything in the workspace is computed in `f64`; the aliases below keep
//! signatures short and make the scalar type easy to spot.

use nalgebra::{Matrix3, Matrix4, Point2, Point3, Vector2, Vector3};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 2D vector with [`Real`] components.
pub type Vec2 = Vector2<Real>;
/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 2D point with [`Real`] coordinates.
pub type Pt2 = Point2<Real>;
/// 3D point with [`Real`] coordinates.
pub type Pt3 = Point3<Real>;
/// 3×3 matrix with [`Real`] entries.
pub type Mat3 = Matrix3<Real>;
/// 4×4 matrix with [`Real`] entries.
pub type Mat4 = Matrix4<Real>;

/// Homogeneous scale below which a projected point is treated as lying at infinity.
pub const HOMOGENEOUS_EPS: Real = 1e-12;

/// Convert a 2D point in Euclidean coordinates into homogeneous coordinates.
pub fn to_homogeneous(p: &Pt2) -> Vec3 {
    Vec3::new(p.x, p.y, 1.0)
}

/// Convert a 3D homogeneous vector back to a 2D point.
///
/// Returns `None` when `|w|` is below [`HOMOGENEOUS_EPS`] or the result is not finite.
pub fn from_homogeneous(v: &Vec3) -> Option<Pt2> {
    if v.z.abs() < HOMOGENEOUS_EPS {
        return None;
    }
    let p = Pt2::new(v.x / v.z, v.y / v.z);
    (p.x.is_finite() && p.y.is_finite()).then_some(p)
}

/// Twice the signed area of the triangle `(a, b, c)`.
pub fn triangle_area2(a: &Pt2, b: &Pt2, c: &Pt2) -> Real {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn homogeneous_round_trip() {
        let p = Pt2::new(3.5, -2.0);
        let h = to_homogeneous(&p) * 4.0;
        let back = from_homogeneous(&h).unwrap();
        assert!((back - p).norm() < 1e-12);
    }

    #[test]
    fn vanishing_scale_is_rejected() {
        assert!(from_homogeneous(&Vec3::new(1.0, 1.0, 0.0)).is_none());
        assert!(from_homogeneous(&Vec3::new(1.0, 1.0, 1e-15)).is_none());
    }

    #[test]
    fn collinear_triangle_has_zero_area() {
        let a = Pt2::new(0.0, 0.0);
        let b = Pt2::new(1.0, 1.0);
        let c = Pt2::new(5.0, 5.0);
        assert_eq!(triangle_area2(&a, &b, &c), 0.0);
        assert!(triangle_area2(&a, &b, &Pt2::new(1.0, 0.0)) < 0.0);
    }
}
