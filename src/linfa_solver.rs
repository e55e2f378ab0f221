//! Elastic-net sweep backed by `linfa-elasticnet`
//!
//! For every mixing ratio of the alpha grid a path of penalties is cross-validated and the
//! penalty with the lowest mean holdout RMSE is kept. Models are fitted on standardized data,
//! errors are reported in the units of the target.
use linfa::traits::{Fit, Predict};
use linfa::{Dataset, ParamGuard};
use linfa_elasticnet::ElasticNet;
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis, Ix1};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, info};

use crate::hyperparams::SweepValidParams;
use crate::path::{alpha_grid, lambda_max, lambda_path};
use crate::solver::{rmse, summarize, ElasticNetSolver, RmseGrids, SolverError, MEAN};

type Result<T> = std::result::Result<T, SolverError>;

/// Coordinate descent elastic net of `linfa-elasticnet`, swept over alphas, lambdas and folds
///
/// The trailing `valid_fraction` rows are held out as validation set. The remaining rows are
/// split into contiguous folds. The holdout set of a fold is the validation set if there is
/// one, otherwise the rows left out of the fold, or the fitted rows themselves for a single
/// fold.
///
/// With `n_devices == 0` the alphas are evaluated one after another on the calling thread,
/// otherwise in parallel on a dedicated pool of `n_devices` workers. The result does not depend
/// on the number of workers.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinfaElasticNet;

impl LinfaElasticNet {
    pub fn new() -> LinfaElasticNet {
        LinfaElasticNet
    }
}

/// Centering and scaling learned from the training rows
struct Standardizer {
    records_mean: Array1<f32>,
    records_scale: Array1<f32>,
    targets_mean: f32,
    targets_scale: f32,
}

fn nonzero_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

impl Standardizer {
    fn fit(records: ArrayView2<f32>, targets: ArrayView1<f32>) -> Result<Standardizer> {
        let records_mean = records.mean_axis(Axis(0)).ok_or_else(|| {
            SolverError::NotEnoughSamples("cannot standardize an empty training set".into())
        })?;
        let records_scale = records.std_axis(Axis(0), 0.0).mapv(nonzero_scale);

        Ok(Standardizer {
            records_mean,
            records_scale,
            targets_mean: targets.mean().unwrap_or(0.0),
            targets_scale: nonzero_scale(targets.std(0.0)),
        })
    }

    fn records(&self, records: ArrayView2<f32>) -> Array2<f32> {
        (&records - &self.records_mean) / &self.records_scale
    }

    fn targets(&self, targets: ArrayView1<f32>) -> Array1<f32> {
        targets.mapv(|y| (y - self.targets_mean) / self.targets_scale)
    }

    fn unscale(&self, prediction: Array1<f32>) -> Array1<f32> {
        prediction.mapv(|y| y * self.targets_scale + self.targets_mean)
    }
}

/// Fitting rows and holdout rows of a single fold
struct Fold {
    fit: Dataset<f32, f32, Ix1>,
    fit_truth: Array1<f32>,
    holdout: Array2<f32>,
    holdout_truth: Array1<f32>,
}

/// Per-fold errors of one (alpha, lambda) pair
struct Scores {
    lambda: f32,
    train: Vec<f32>,
    holdout: Vec<f32>,
}

impl Scores {
    fn mean_holdout(&self) -> f32 {
        summarize(&self.holdout)[MEAN]
    }
}

fn n_valid_rows(nsamples: usize, valid_fraction: f32) -> usize {
    (nsamples as f64 * f64::from(valid_fraction)).floor() as usize
}

/// Split the rows into folds and standardize them with statistics of the training rows
fn make_folds(
    records: ArrayView2<f32>,
    targets: ArrayView1<f32>,
    params: &SweepValidParams,
) -> Result<(Standardizer, Vec<Fold>)> {
    let nsamples = records.nrows();
    let n_valid = n_valid_rows(nsamples, params.valid_fraction());
    let n_train = nsamples - n_valid;
    let n_folds = params.n_folds();

    if params.valid_fraction() > 0.0 && n_valid == 0 {
        return Err(SolverError::NotEnoughSamples(format!(
            "validation fraction {} of {} rows leaves no validation rows",
            params.valid_fraction(),
            nsamples
        )));
    }
    if n_train < n_folds.max(1) {
        return Err(SolverError::NotEnoughSamples(format!(
            "{} training rows cannot be split into {} fold(s)",
            n_train, n_folds
        )));
    }

    let (train_records, valid_records) = records.split_at(Axis(0), n_train);
    let (train_targets, valid_targets) = targets.split_at(Axis(0), n_train);

    let scaler = Standardizer::fit(train_records, train_targets)?;
    let train_x = scaler.records(train_records);
    let train_y = scaler.targets(train_targets);
    let valid_x = scaler.records(valid_records);

    let folds = (0..n_folds)
        .map(|fold| {
            let start = fold * n_train / n_folds;
            let end = (fold + 1) * n_train / n_folds;

            let fit_rows: Vec<usize> = if n_folds == 1 {
                (0..n_train).collect()
            } else {
                (0..start).chain(end..n_train).collect()
            };

            let fit_x = train_x.select(Axis(0), &fit_rows);
            let fit_y = train_y.select(Axis(0), &fit_rows);
            let fit_truth = train_targets.select(Axis(0), &fit_rows);

            let (holdout, holdout_truth) = if n_valid > 0 {
                (valid_x.clone(), valid_targets.to_owned())
            } else if n_folds > 1 {
                (
                    train_x.slice(s![start..end, ..]).to_owned(),
                    train_targets.slice(s![start..end]).to_owned(),
                )
            } else {
                (fit_x.clone(), fit_truth.clone())
            };

            Fold {
                fit: Dataset::new(fit_x, fit_y),
                fit_truth,
                holdout,
                holdout_truth,
            }
        })
        .collect();

    Ok((scaler, folds))
}

impl LinfaElasticNet {
    /// Cross-validate the lambda path of a single alpha, returning the train and holdout
    /// summaries at the selected lambda
    fn sweep_alpha(
        &self,
        alpha: f32,
        lambdas: &[f32],
        scaler: &Standardizer,
        folds: &[Fold],
        params: &SweepValidParams,
        name: &str,
    ) -> Result<([f32; 3], [f32; 3])> {
        let mut best: Option<Scores> = None;

        for &lambda in lambdas {
            let model_params = ElasticNet::<f32>::params()
                .penalty(lambda)
                .l1_ratio(alpha)
                .max_iterations(params.max_iterations())
                .tolerance(params.tolerance())
                .check()?;

            let mut scores = Scores {
                lambda,
                train: Vec::with_capacity(folds.len()),
                holdout: Vec::with_capacity(folds.len()),
            };

            for fold in folds {
                let model = model_params.fit(&fold.fit)?;

                let fitted: Array1<f32> = model.predict(fold.fit.records());
                let predicted: Array1<f32> = model.predict(&fold.holdout);

                scores
                    .train
                    .push(rmse(scaler.unscale(fitted).view(), fold.fit_truth.view()));
                scores.holdout.push(rmse(
                    scaler.unscale(predicted).view(),
                    fold.holdout_truth.view(),
                ));
            }

            if params.verbosity() >= 2 {
                debug!(
                    run = name,
                    alpha,
                    lambda,
                    holdout = scores.mean_holdout(),
                    "evaluated penalty"
                );
            }

            // ties keep the stronger penalty seen first
            let improves = match &best {
                Some(current) => scores.mean_holdout() < current.mean_holdout(),
                None => true,
            };
            if improves {
                best = Some(scores);
            }
        }

        let best = best.ok_or_else(|| {
            SolverError::NotEnoughSamples("lambda path is empty".to_string())
        })?;
        let (train, holdout) = (summarize(&best.train), summarize(&best.holdout));

        if params.verbosity() >= 1 {
            info!(
                run = name,
                alpha,
                lambda = best.lambda,
                train = train[MEAN],
                holdout = holdout[MEAN],
                "selected penalty"
            );
        }

        Ok((train, holdout))
    }
}

impl ElasticNetSolver for LinfaElasticNet {
    fn evaluate(
        &self,
        records: ArrayView2<f32>,
        targets: ArrayView1<f32>,
        params: &SweepValidParams,
        name: &str,
    ) -> Result<RmseGrids> {
        if records.nrows() != targets.len() {
            return Err(SolverError::ShapeMismatch {
                records: records.nrows(),
                targets: targets.len(),
            });
        }

        let (scaler, folds) = make_folds(records, targets, params)?;

        // lambda_max is taken over all training rows, which are centered by construction
        let n_train = records.nrows() - n_valid_rows(records.nrows(), params.valid_fraction());
        let train_x = scaler.records(records.slice(s![..n_train, ..]));
        let train_y = scaler.targets(targets.slice(s![..n_train]));

        let alphas = alpha_grid(params.n_alphas());
        debug!(
            run = name,
            alphas = alphas.len(),
            lambdas = params.n_lambdas(),
            folds = folds.len(),
            devices = params.n_devices(),
            "starting elastic net sweep"
        );

        let sweep = |alpha: &f32| {
            let lambdas = lambda_path(
                lambda_max(train_x.view(), train_y.view(), *alpha),
                params.n_lambdas(),
                params.lambda_min_ratio(),
            );
            self.sweep_alpha(*alpha, &lambdas, &scaler, &folds, params, name)
        };

        let rows: Vec<([f32; 3], [f32; 3])> = if params.n_devices() == 0 {
            alphas.iter().map(&sweep).collect::<Result<_>>()?
        } else {
            let pool = ThreadPoolBuilder::new()
                .num_threads(params.n_devices())
                .build()?;
            pool.install(|| alphas.par_iter().map(&sweep).collect::<Result<_>>())?
        };

        let (train, test): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
        Ok(RmseGrids::from_rows(&train, &test))
    }
}
