//! Alpha grid and regularization path
//!
//! The penalty of an elastic net is `lambda * (alpha * ||w||_1 + 0.5 * (1 - alpha) * ||w||^2_2)`.
//! For every mixing ratio `alpha` the sweep walks a geometric path of `lambda` values, starting at
//! the smallest penalty for which all coefficients vanish.

use ndarray::{ArrayView1, ArrayView2};

/// Lower bound on the mixing ratio when computing `lambda_max`, pure ridge never zeroes coefficients
const MIN_PATH_ALPHA: f32 = 1e-3;

/// Evenly spaced mixing ratios in `[0, 1]`, a single ratio is pure LASSO
pub fn alpha_grid(n_alphas: usize) -> Vec<f32> {
    if n_alphas <= 1 {
        return vec![1.0];
    }

    let last = (n_alphas - 1) as f32;
    (0..n_alphas).map(|i| i as f32 / last).collect()
}

/// Smallest penalty which sets every coefficient of a centered problem to zero
///
/// `records` and `targets` are expected to be centered.
pub fn lambda_max(records: ArrayView2<f32>, targets: ArrayView1<f32>, alpha: f32) -> f32 {
    let nsamples = records.nrows().max(1) as f32;
    let alpha = alpha.max(MIN_PATH_ALPHA);

    let correlation = records.t().dot(&targets);
    let max_corr = correlation.iter().fold(0f32, |acc, c| acc.max(c.abs()));

    max_corr / (nsamples * alpha)
}

/// Geometric path from `lambda_max` down to `lambda_max * min_ratio`
///
/// The path is ordered from strongest to weakest penalty. A path of length one only holds the
/// weakest penalty.
pub fn lambda_path(lambda_max: f32, n_lambdas: usize, min_ratio: f32) -> Vec<f32> {
    let lambda_min = lambda_max * min_ratio;
    if n_lambdas <= 1 {
        return vec![lambda_min];
    }

    let last = (n_lambdas - 1) as f32;
    (0..n_lambdas)
        .map(|i| lambda_max * min_ratio.powf(i as f32 / last))
        .collect()
}
