//! Generic, model-agnostic RANSAC.
//!
//! Implement [`Estimator`] for a model and call [`ransac_fit`] (seeded from
//! [`RansacOptions::seed`]) or [`ransac_fit_with_rng`] (caller-owned random
//! source). Neither panics on failure: when no consensus is found the returned
//! [`RansacResult`] has `success == false` and `model == None`.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration parameters for the RANSAC engine.
///
/// Defaults are tuned for pixel→pitch homographies: a 3 m inlier threshold
/// and a consensus of at least four correspondences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacOptions {
    /// Maximum number of sampling iterations.
    pub max_iters: usize,
    /// Inlier residual threshold, in the residual's units.
    pub thresh: f64,
    /// Minimum number of inliers required to accept a model.
    pub min_inliers: usize,
    /// Desired probability in `[0, 1]` of drawing at least one clean sample.
    pub confidence: f64,
    /// Seed for the internal random source.
    pub seed: u64,
    /// Refit the model on its full inlier set before scoring.
    pub refit_on_inliers: bool,
}

impl Default for RansacOptions {
    fn default() -> Self {
        Self {
            max_iters: 1000,
            thresh: 3.0,
            min_inliers: 4,
            confidence: 0.99,
            seed: 0x5eed_f00d,
            refit_on_inliers: true,
        }
    }
}

/// Output of a RANSAC run.
#[derive(Debug, Clone)]
pub struct RansacResult<M> {
    /// Whether a consensus set satisfying the options was found.
    pub success: bool,
    /// Best model found, if any.
    pub model: Option<M>,
    /// Indices of the inliers of `model`.
    pub inliers: Vec<usize>,
    /// Root-mean-square residual over the inliers.
    pub inlier_rms: f64,
    /// Iteration at which `model` was found.
    pub iters: usize,
}

impl<M> Default for RansacResult<M> {
    fn default() -> Self {
        Self {
            success: false,
            model: None,
            inliers: Vec::new(),
            inlier_rms: f64::INFINITY,
            iters: 0,
        }
    }
}

/// A model that can be fit inside the RANSAC loop.
pub trait Estimator {
    type Datum;
    type Model;

    /// Minimal number of samples needed to estimate a model.
    const MIN_SAMPLES: usize;

    /// Fit a model from a subset of data indices; `None` if fitting fails.
    fn fit(data: &[Self::Datum], sample_indices: &[usize]) -> Option<Self::Model>;

    /// Non-negative residual of one datum, in the same units as `thresh`.
    fn residual(model: &Self::Model, datum: &Self::Datum) -> f64;

    /// Reject a sample before fitting. Default: never degenerate.
    fn is_degenerate(_data: &[Self::Datum], _sample_indices: &[usize]) -> bool {
        false
    }

    /// Refit on a full inlier set. Default: keep the minimal-sample model.
    fn refit(_data: &[Self::Datum], _inliers: &[usize]) -> Option<Self::Model> {
        None
    }
}

/// Adaptive iteration bound for the given inlier ratio.
fn required_iterations(
    confidence: f64,
    inlier_ratio: f64,
    min_samples: usize,
    done: usize,
    max_iters: usize,
) -> usize {
    if !(0.0..1.0).contains(&confidence) || inlier_ratio <= 0.0 {
        return max_iters;
    }
    let p_clean = inlier_ratio.powi(min_samples as i32);
    let log_miss = (1.0 - p_clean).max(1e-12).ln();
    if log_miss >= 0.0 {
        return max_iters;
    }
    let needed = ((1.0 - confidence).ln() / log_miss).ceil() as usize;
    needed.clamp(done, max_iters)
}

/// Collect the indices and residuals of every datum within `thresh` of `model`.
fn consensus<E: Estimator>(
    data: &[E::Datum],
    model: &E::Model,
    thresh: f64,
    inliers: &mut Vec<usize>,
    residuals: &mut Vec<f64>,
) {
    inliers.clear();
    residuals.clear();
    for (i, datum) in data.iter().enumerate() {
        let r = E::residual(model, datum);
        if r.is_finite() && r <= thresh {
            inliers.push(i);
            residuals.push(r);
        }
    }
}

fn rms(vals: &[f64]) -> f64 {
    if vals.is_empty() {
        return f64::INFINITY;
    }
    (vals.iter().map(|v| v * v).sum::<f64>() / vals.len() as f64).sqrt()
}

/// Run RANSAC with a random source seeded from `opts.seed`.
pub fn ransac_fit<E: Estimator>(data: &[E::Datum], opts: &RansacOptions) -> RansacResult<E::Model> {
    let mut rng = StdRng::seed_from_u64(opts.seed);
    ransac_fit_with_rng::<E, _>(data, opts, &mut rng)
}

/// Run RANSAC drawing samples from a caller-supplied random source.
///
/// Candidates are ranked by inlier count, ties broken by inlier RMS.
pub fn ransac_fit_with_rng<E: Estimator, R: Rng + ?Sized>(
    data: &[E::Datum],
    opts: &RansacOptions,
    rng: &mut R,
) -> RansacResult<E::Model> {
    let mut best = RansacResult::default();
    if data.len() < E::MIN_SAMPLES || data.len() < opts.min_inliers {
        return best;
    }

    let mut sample = Vec::with_capacity(E::MIN_SAMPLES);
    let mut inliers = Vec::with_capacity(data.len());
    let mut residuals = Vec::with_capacity(data.len());
    let mut refit_inliers = Vec::with_capacity(data.len());
    let mut refit_residuals = Vec::with_capacity(data.len());

    let mut budget = opts.max_iters;
    let mut iter = 0;
    while iter < budget {
        iter += 1;

        sample.clear();
        sample.extend(index::sample(rng, data.len(), E::MIN_SAMPLES).into_iter());
        if E::is_degenerate(data, &sample) {
            continue;
        }
        let Some(mut model) = E::fit(data, &sample) else {
            continue;
        };

        consensus::<E>(data, &model, opts.thresh, &mut inliers, &mut residuals);
        if inliers.len() < opts.min_inliers {
            continue;
        }

        // A refit that loses consensus falls back to the minimal-sample model.
        if opts.refit_on_inliers {
            if let Some(refined) = E::refit(data, &inliers) {
                consensus::<E>(
                    data,
                    &refined,
                    opts.thresh,
                    &mut refit_inliers,
                    &mut refit_residuals,
                );
                if refit_inliers.len() >= opts.min_inliers {
                    model = refined;
                    std::mem::swap(&mut inliers, &mut refit_inliers);
                    std::mem::swap(&mut residuals, &mut refit_residuals);
                }
            }
        }

        let score_rms = rms(&residuals);
        let better = !best.success
            || inliers.len() > best.inliers.len()
            || (inliers.len() == best.inliers.len() && score_rms < best.inlier_rms);
        if better {
            best.success = true;
            best.model = Some(model);
            best.inliers.clone_from(&inliers);
            best.inlier_rms = score_rms;
            best.iters = iter;
        }

        let ratio = best.inliers.len() as f64 / data.len() as f64;
        budget = required_iterations(opts.confidence, ratio, E::MIN_SAMPLES, iter, opts.max_iters);
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Estimates a constant 2D offset `b - a` between paired points.
    struct OffsetEstimator;

    impl Estimator for OffsetEstimator {
        type Datum = ((f64, f64), (f64, f64));
        type Model = (f64, f64);

        const MIN_SAMPLES: usize = 1;

        fn fit(data: &[Self::Datum], sample_indices: &[usize]) -> Option<Self::Model> {
            let (a, b) = data[sample_indices[0]];
            Some((b.0 - a.0, b.1 - a.1))
        }

        fn residual(model: &Self::Model, datum: &Self::Datum) -> f64 {
            let (a, b) = datum;
            let dx = a.0 + model.0 - b.0;
            let dy = a.1 + model.1 - b.1;
            dx.hypot(dy)
        }

        fn refit(data: &[Self::Datum], inliers: &[usize]) -> Option<Self::Model> {
            if inliers.is_empty() {
                return None;
            }
            let n = inliers.len() as f64;
            let (sx, sy) = inliers.iter().fold((0.0, 0.0), |(sx, sy), &i| {
                let (a, b) = data[i];
                (sx + b.0 - a.0, sy + b.1 - a.1)
            });
            Some((sx / n, sy / n))
        }
    }

    fn opts() -> RansacOptions {
        RansacOptions {
            max_iters: 200,
            thresh: 0.5,
            min_inliers: 3,
            confidence: 0.99,
            seed: 11,
            refit_on_inliers: true,
        }
    }

    fn offset_data() -> Vec<((f64, f64), (f64, f64))> {
        let mut data: Vec<_> = (0..8)
            .map(|i| {
                let a = (i as f64, 2.0 * i as f64);
                let jitter = if i % 2 == 0 { 0.05 } else { -0.05 };
                (a, (a.0 + 10.0 + jitter, a.1 - 4.0))
            })
            .collect();
        data.push(((0.0, 0.0), (40.0, 40.0)));
        data.push(((3.0, 1.0), (-20.0, 7.0)));
        data
    }

    #[test]
    fn too_little_data_is_not_a_panic() {
        let mut o = opts();
        o.min_inliers = 4;
        let data = vec![((0.0, 0.0), (1.0, 1.0)); 3];
        let res = ransac_fit::<OffsetEstimator>(&data, &o);
        assert!(!res.success);
        assert!(res.model.is_none());
        assert!(res.inliers.is_empty());
    }

    #[test]
    fn recovers_offset_and_rejects_outliers() {
        let data = offset_data();
        let res = ransac_fit::<OffsetEstimator>(&data, &opts());
        assert!(res.success);
        let (dx, dy) = res.model.unwrap();
        assert!((dx - 10.0).abs() < 0.05, "dx = {dx}");
        assert!((dy + 4.0).abs() < 1e-9, "dy = {dy}");
        assert_eq!(res.inliers, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn injected_rng_matches_seeded_run() {
        let data = offset_data();
        let o = opts();
        let a = ransac_fit::<OffsetEstimator>(&data, &o);
        let mut rng = StdRng::seed_from_u64(o.seed);
        let b = ransac_fit_with_rng::<OffsetEstimator, _>(&data, &o, &mut rng);
        assert_eq!(a.inliers, b.inliers);
        assert_eq!(a.model, b.model);
    }

    /// Fits like [`OffsetEstimator`] but refits to a model nothing agrees with.
    struct DivergingRefit;

    impl Estimator for DivergingRefit {
        type Datum = ((f64, f64), (f64, f64));
        type Model = (f64, f64);

        const MIN_SAMPLES: usize = 1;

        fn fit(data: &[Self::Datum], sample_indices: &[usize]) -> Option<Self::Model> {
            OffsetEstimator::fit(data, sample_indices)
        }

        fn residual(model: &Self::Model, datum: &Self::Datum) -> f64 {
            OffsetEstimator::residual(model, datum)
        }

        fn refit(_data: &[Self::Datum], _inliers: &[usize]) -> Option<Self::Model> {
            Some((1e6, 1e6))
        }
    }

    #[test]
    fn failed_refit_keeps_minimal_model() {
        let data = offset_data();
        let res = ransac_fit::<DivergingRefit>(&data, &opts());
        assert!(res.success);
        let (dx, dy) = res.model.unwrap();
        assert!((dx - 10.0).abs() < 0.06, "dx = {dx}");
        assert!((dy + 4.0).abs() < 1e-9, "dy = {dy}");
        assert_eq!(res.inliers, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn iteration_bound_shrinks_with_clean_data() {
        assert_eq!(required_iterations(0.99, 1.0, 4, 1, 1000), 1);
        assert_eq!(required_iterations(0.99, 0.0, 4, 1, 1000), 1000);
        let half = required_iterations(0.99, 0.5, 4, 1, 1000);
        assert!(half > 50 && half < 100, "{half}");
    }
}
