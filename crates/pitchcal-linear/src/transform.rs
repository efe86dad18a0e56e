use pitchcal_core::{CalibrationError, HomographyMatrix, Pt2, Real, HOMOGENEOUS_EPS};

/// Stateless point transforms between video pixels and pitch meters.
///
/// Cheap enough to call on every cursor move.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateTransformer;

impl CoordinateTransformer {
    /// Apply a projective transform to `(x, y)`.
    ///
    /// Fails with [`CalibrationError::PointAtInfinity`] when the homogeneous
    /// scale vanishes.
    #[inline]
    pub fn apply(h: &HomographyMatrix, x: Real, y: Real) -> Result<Pt2, CalibrationError> {
        let m = h.matrix();
        let w = m[(2, 0)] * x + m[(2, 1)] * y + m[(2, 2)];
        if !w.is_finite() || w.abs() < HOMOGENEOUS_EPS {
            return Err(CalibrationError::PointAtInfinity);
        }
        let px = (m[(0, 0)] * x + m[(0, 1)] * y + m[(0, 2)]) / w;
        let py = (m[(1, 0)] * x + m[(1, 1)] * y + m[(1, 2)]) / w;
        if !(px.is_finite() && py.is_finite()) {
            return Err(CalibrationError::PointAtInfinity);
        }
        Ok(Pt2::new(px, py))
    }

    /// Video pixel → pitch meters, using the forward matrix.
    #[inline]
    pub fn video_to_pitch(x: Real, y: Real, h: &HomographyMatrix) -> Result<Pt2, CalibrationError> {
        Self::apply(h, x, y)
    }

    /// Pitch meters → video pixel, using the inverse matrix.
    #[inline]
    pub fn pitch_to_video(
        x: Real,
        y: Real,
        h_inv: &HomographyMatrix,
    ) -> Result<Pt2, CalibrationError> {
        Self::apply(h_inv, x, y)
    }
}
