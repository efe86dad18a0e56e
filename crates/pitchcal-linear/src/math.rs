//! Numerical helpers shared by the linear solvers.

use pitchcal_core::{triangle_area2, Mat3, Pt2};

/// Hartley normalization for 2D points.
///
/// Centers the points at the origin and scales them so the mean distance
/// from the origin is `√2`. Returns the normalized points and the 3×3 `T`
/// with `p_norm = T * p_homogeneous`, or `None` for an empty set or when all
/// points coincide.
pub fn normalize_points_2d(points: &[Pt2]) -> Option<(Vec<Pt2>, Mat3)> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let centroid = points.iter().fold(Pt2::origin(), |acc, p| acc + p.coords / n);
    let mean_dist = points.iter().map(|p| (p - centroid).norm()).sum::<f64>() / n;
    if !mean_dist.is_finite() || mean_dist <= f64::EPSILON {
        return None;
    }

    let s = std::f64::consts::SQRT_2 / mean_dist;
    #[rustfmt::skip]
    let t = Mat3::new(
        s, 0.0, -s * centroid.x,
        0.0, s, -s * centroid.y,
        0.0, 0.0, 1.0,
    );
    let normalized = points.iter().map(|p| Pt2::from((p - centroid) * s)).collect();
    Some((normalized, t))
}

/// Whether any three of `points` are (nearly) collinear.
///
/// The area test is scale-aware: the tolerance is relative to the squared
/// extent of the triple, so pixel and meter inputs are treated alike.
pub fn has_collinear_triple(points: &[Pt2]) -> bool {
    const REL_TOL: f64 = 1e-9;
    let n = points.len();
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let (a, b, c) = (&points[i], &points[j], &points[k]);
                let extent = (b - a).norm_squared().max((c - a).norm_squared());
                if triangle_area2(a, b, c).abs() <= REL_TOL * extent.max(f64::MIN_POSITIVE) {
                    return true;
                }
            }
        }
    }
    false
}
