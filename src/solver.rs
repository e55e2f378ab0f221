//! Seam between the harness and the elastic-net implementation under test
use linfa_elasticnet::ElasticNetError;
use ndarray::{Array2, ArrayView1, ArrayView2, Zip};
use rayon::ThreadPoolBuildError;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::hyperparams::SweepValidParams;

/// Column holding the lowest RMSE across folds
pub const BEST: usize = 0;
/// Column holding the mean RMSE across folds
pub const MEAN: usize = 1;
/// Column holding the highest RMSE across folds
pub const WORST: usize = 2;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error(transparent)]
    ElasticNet(#[from] ElasticNetError),
    #[error("could not start solver workers: {0}")]
    Workers(#[from] ThreadPoolBuildError),
    #[error("not enough samples: {0}")]
    NotEnoughSamples(String),
    #[error("feature matrix has {records} rows, but target has {targets}")]
    ShapeMismatch { records: usize, targets: usize },
}

/// Training and holdout RMSE of an elastic-net sweep
///
/// Both grids have one row per alpha of the sweep and the columns [`BEST`], [`MEAN`] and
/// [`WORST`], summarizing the per-fold errors at the penalty selected for that alpha.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct RmseGrids {
    train: Array2<f32>,
    test: Array2<f32>,
}

impl RmseGrids {
    /// Assemble grids from per-alpha rows of `[best, mean, worst]`
    pub fn from_rows(train: &[[f32; 3]], test: &[[f32; 3]]) -> RmseGrids {
        let to_grid = |rows: &[[f32; 3]]| {
            Array2::from_shape_fn((rows.len(), 3), |(alpha, column)| rows[alpha][column])
        };

        RmseGrids {
            train: to_grid(train),
            test: to_grid(test),
        }
    }

    pub fn train(&self) -> &Array2<f32> {
        &self.train
    }

    pub fn test(&self) -> &Array2<f32> {
        &self.test
    }

    pub fn n_alphas(&self) -> usize {
        self.train.nrows()
    }
}

/// Elastic-net training and evaluation routine checked by the harness
///
/// An implementation fits models for the alpha grid, lambda path, folds and validation split
/// described by `params` and reports the resulting RMSE grids. `name` identifies the run in log
/// output and has no influence on the result.
pub trait ElasticNetSolver {
    fn evaluate(
        &self,
        records: ArrayView2<f32>,
        targets: ArrayView1<f32>,
        params: &SweepValidParams,
        name: &str,
    ) -> Result<RmseGrids, SolverError>;
}

/// Root mean squared error between predictions and ground truth
///
/// Returns `NaN` for empty inputs.
pub fn rmse(prediction: ArrayView1<f32>, truth: ArrayView1<f32>) -> f32 {
    let mut sum = 0f64;
    Zip::from(&prediction).and(&truth).for_each(|p, t| {
        let diff = f64::from(*p) - f64::from(*t);
        sum += diff * diff;
    });

    (sum / truth.len() as f64).sqrt() as f32
}

/// Lowest, mean and highest value of a non-empty slice
pub fn summarize(values: &[f32]) -> [f32; 3] {
    let best = values.iter().copied().fold(f32::INFINITY, f32::min);
    let worst = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mean = values.iter().map(|v| f64::from(*v)).sum::<f64>() / values.len() as f64;

    [best, mean as f32, worst]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn rmse_of_constant_offset() {
        let truth = array![1f32, 2., 3., 4.];
        let prediction = array![3f32, 4., 5., 6.];

        assert_abs_diff_eq!(rmse(prediction.view(), truth.view()), 2.0);
        assert_abs_diff_eq!(rmse(truth.view(), truth.view()), 0.0);
    }

    #[test]
    fn rmse_of_mixed_errors() {
        let truth = array![0f32, 0.];
        let prediction = array![3f32, -4.];

        // sqrt((9 + 16) / 2)
        assert_abs_diff_eq!(
            rmse(prediction.view(), truth.view()),
            12.5f32.sqrt(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn rmse_of_nothing_is_nan() {
        let empty = ndarray::Array1::<f32>::zeros(0);
        assert!(rmse(empty.view(), empty.view()).is_nan());
    }

    #[test]
    fn summary_is_ordered() {
        let [best, mean, worst] = summarize(&[3.0, 1.0, 2.0]);
        assert_abs_diff_eq!(best, 1.0);
        assert_abs_diff_eq!(mean, 2.0);
        assert_abs_diff_eq!(worst, 3.0);

        assert_eq!(summarize(&[5.0]), [5.0, 5.0, 5.0]);
    }

    #[test]
    fn grids_from_rows() {
        let grids = RmseGrids::from_rows(
            &[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
            &[[7.0, 8.0, 9.0], [10.0, 11.0, 12.0]],
        );

        assert_eq!(grids.n_alphas(), 2);
        assert_abs_diff_eq!(grids.train()[[1, WORST]], 6.0);
        assert_abs_diff_eq!(grids.test()[[0, MEAN]], 8.0);
        assert_abs_diff_eq!(
            grids.test(),
            &array![[7f32, 8., 9.], [10., 11., 12.]]
        );
    }
}
