//! Pixel→pitch homography estimation.
//!
//! The forward homography `H` maps **video pixels** to **pitch meters**:
//! `X ~ H x`. It is estimated with the normalized Direct Linear Transform
//! inside a RANSAC loop, so a minority of misclicked correspondences does not
//! spoil the fit. The inlier threshold is expressed in pitch meters.

use log::debug;
use nalgebra::DMatrix;
use pitchcal_core::{
    from_homogeneous, ransac_fit, to_homogeneous, CalibrationError, CorrespondencePoint,
    Estimator, HomographyMatrix, Mat3, Pt2, RansacOptions,
};

use crate::math::{has_collinear_triple, normalize_points_2d};

/// Minimum number of correspondences for a homography.
pub const MIN_HOMOGRAPHY_POINTS: usize = 4;

/// Determinant magnitude below which a matrix is treated as singular.
pub const SINGULAR_DET_EPS: f64 = 1e-10;

/// Homography estimation entry points.
#[derive(Debug, Clone, Copy)]
pub struct HomographySolver;

impl HomographySolver {
    /// Estimate `H` with `dst ~ H src` from all correspondences (no outlier handling).
    ///
    /// Uses Hartley normalization on both sides and takes the right singular
    /// vector of the smallest singular value. The result is scaled so that
    /// `H[2][2] == 1` when possible.
    pub fn dlt(src: &[Pt2], dst: &[Pt2]) -> Result<Mat3, CalibrationError> {
        let n = src.len();
        if n < MIN_HOMOGRAPHY_POINTS || dst.len() != n {
            return Err(CalibrationError::InsufficientPoints {
                required: MIN_HOMOGRAPHY_POINTS,
                got: n.min(dst.len()),
            });
        }

        let degenerate =
            || CalibrationError::HomographyComputationFailed("degenerate point configuration".into());
        let (src_n, t_src) = normalize_points_2d(src).ok_or_else(degenerate)?;
        let (dst_n, t_dst) = normalize_points_2d(dst).ok_or_else(degenerate)?;

        // Two rows per correspondence; padded to square so the SVD exposes
        // the full right null space when n == 4.
        let rows = (2 * n).max(9);
        let mut a = DMatrix::<f64>::zeros(rows, 9);
        for (i, (p, q)) in src_n.iter().zip(dst_n.iter()).enumerate() {
            let (x, y) = (p.x, p.y);
            let (u, v) = (q.x, q.y);
            let r = 2 * i;
            a[(r, 0)] = -x;
            a[(r, 1)] = -y;
            a[(r, 2)] = -1.0;
            a[(r, 6)] = u * x;
            a[(r, 7)] = u * y;
            a[(r, 8)] = u;
            a[(r + 1, 3)] = -x;
            a[(r + 1, 4)] = -y;
            a[(r + 1, 5)] = -1.0;
            a[(r + 1, 6)] = v * x;
            a[(r + 1, 7)] = v * y;
            a[(r + 1, 8)] = v;
        }

        let svd = a.svd(false, true);
        let v_t = svd
            .v_t
            .ok_or_else(|| CalibrationError::HomographyComputationFailed("svd failed".into()))?;
        let (min_idx, _) = svd
            .singular_values
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .ok_or_else(|| CalibrationError::HomographyComputationFailed("svd failed".into()))?;
        let h_vec = v_t.row(min_idx);
        let h_n = Mat3::from_fn(|r, c| h_vec[3 * r + c]);

        let t_dst_inv = t_dst
            .try_inverse()
            .ok_or_else(|| CalibrationError::HomographyComputationFailed("normalization".into()))?;
        let h = HomographyMatrix(t_dst_inv * h_n * t_src).normalized();
        if !h.is_finite() {
            return Err(degenerate());
        }
        Ok(h.0)
    }

    /// Robustly estimate the pixel→pitch homography from user correspondences.
    ///
    /// Candidates are scored by consensus under `opts.thresh` pitch meters;
    /// the winner is refit on its inliers when `opts.refit_on_inliers` is set.
    pub fn compute(
        points: &[CorrespondencePoint],
        opts: &RansacOptions,
    ) -> Result<HomographyMatrix, CalibrationError> {
        Self::compute_with_inliers(points, opts).map(|(h, _)| h)
    }

    /// Like [`HomographySolver::compute`], also returning the inlier indices.
    pub fn compute_with_inliers(
        points: &[CorrespondencePoint],
        opts: &RansacOptions,
    ) -> Result<(HomographyMatrix, Vec<usize>), CalibrationError> {
        if points.len() < MIN_HOMOGRAPHY_POINTS {
            return Err(CalibrationError::InsufficientPoints {
                required: MIN_HOMOGRAPHY_POINTS,
                got: points.len(),
            });
        }
        if let Some(bad) = points.iter().find(|p| {
            !(p.video_pixel.x.is_finite()
                && p.video_pixel.y.is_finite()
                && p.pitch_meters.x.is_finite()
                && p.pitch_meters.y.is_finite())
        }) {
            return Err(CalibrationError::InvalidInput(format!(
                "feature '{}' has a non-finite coordinate",
                bad.feature_name
            )));
        }

        let mut opts = opts.clone();
        opts.min_inliers = opts.min_inliers.max(MIN_HOMOGRAPHY_POINTS);

        let res = ransac_fit::<PixelToPitch>(points, &opts);
        let h = match res.model {
            Some(h) if res.success => h,
            _ => {
                return Err(CalibrationError::HomographyComputationFailed(format!(
                    "no consensus of {} points within {} m among {} correspondences",
                    opts.min_inliers,
                    opts.thresh,
                    points.len()
                )))
            }
        };
        debug!(
            "homography: {}/{} inliers, rms {:.4} m, found at iteration {}",
            res.inliers.len(),
            points.len(),
            res.inlier_rms,
            res.iters
        );

        let h = HomographyMatrix(h);
        let det = h.determinant();
        if !det.is_finite() || det.abs() < SINGULAR_DET_EPS {
            return Err(CalibrationError::HomographyComputationFailed(format!(
                "fitted transform is singular (det = {det:e})"
            )));
        }
        Ok((h, res.inliers))
    }

    /// Invert a homography. The result is rescaled so `[2][2] == 1` when possible.
    pub fn invert(h: &HomographyMatrix) -> Result<HomographyMatrix, CalibrationError> {
        let det = h.determinant();
        if !det.is_finite() || det.abs() < SINGULAR_DET_EPS {
            return Err(CalibrationError::SingularMatrix { det });
        }
        let inv = h
            .0
            .try_inverse()
            .ok_or(CalibrationError::SingularMatrix { det })?;
        Ok(HomographyMatrix(inv).normalized())
    }
}

/// RANSAC model over user correspondences, pixel → pitch.
struct PixelToPitch;

impl PixelToPitch {
    fn split(data: &[CorrespondencePoint], idx: &[usize]) -> (Vec<Pt2>, Vec<Pt2>) {
        idx.iter()
            .map(|&i| (data[i].video_pixel, data[i].pitch_meters))
            .unzip()
    }
}

impl Estimator for PixelToPitch {
    type Datum = CorrespondencePoint;
    type Model = Mat3;

    const MIN_SAMPLES: usize = MIN_HOMOGRAPHY_POINTS;

    fn fit(data: &[Self::Datum], sample_indices: &[usize]) -> Option<Self::Model> {
        let (px, pitch) = Self::split(data, sample_indices);
        HomographySolver::dlt(&px, &pitch).ok()
    }

    fn residual(model: &Self::Model, datum: &Self::Datum) -> f64 {
        from_homogeneous(&(model * to_homogeneous(&datum.video_pixel)))
            .map(|p| (p - datum.pitch_meters).norm())
            .unwrap_or(f64::INFINITY)
    }

    fn is_degenerate(data: &[Self::Datum], sample_indices: &[usize]) -> bool {
        let (px, pitch) = Self::split(data, sample_indices);
        has_collinear_triple(&px) || has_collinear_triple(&pitch)
    }

    fn refit(data: &[Self::Datum], inliers: &[usize]) -> Option<Self::Model> {
        let (px, pitch) = Self::split(data, inliers);
        HomographySolver::dlt(&px, &pitch).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(scale: f64) -> Vec<Pt2> {
        vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(scale, 0.0),
            Pt2::new(scale, scale),
            Pt2::new(0.0, scale),
        ]
    }

    #[test]
    fn dlt_recovers_pure_scale() {
        let h = HomographySolver::dlt(&square(1.0), &square(2.0)).unwrap();
        assert!((h[(0, 0)] - 2.0).abs() < 1e-9);
        assert!((h[(1, 1)] - 2.0).abs() < 1e-9);
        assert!(h[(0, 1)].abs() < 1e-9);
        assert!((h[(2, 2)] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn dlt_needs_four_pairs() {
        let err = HomographySolver::dlt(&square(1.0)[..3], &square(2.0)[..3]).unwrap_err();
        assert_eq!(
            err,
            CalibrationError::InsufficientPoints {
                required: 4,
                got: 3
            }
        );
    }

    #[test]
    fn inverse_of_singular_matrix_fails() {
        let h = HomographyMatrix::from_rows([[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 1.0]]);
        assert!(matches!(
            HomographySolver::invert(&h),
            Err(CalibrationError::SingularMatrix { .. })
        ));
    }

    #[test]
    fn inverse_composes_to_identity() {
        let h = HomographyMatrix::from_rows([
            [0.05, 0.01, -3.0],
            [0.002, 0.09, -12.0],
            [0.0001, 0.0008, 1.0],
        ]);
        let inv = HomographySolver::invert(&h).unwrap();
        let prod = HomographyMatrix(h.0 * inv.0).normalized();
        assert!((prod.0 - Mat3::identity()).norm() < 1e-9);
    }
}
