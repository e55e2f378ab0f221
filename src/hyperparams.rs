#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use linfa::ParamGuard;

use crate::error::{HarnessError, Result};

/// A verified sweep configuration ready to be handed to an
/// [`ElasticNetSolver`](crate::ElasticNetSolver)
///
/// See [`SweepParams`] for more information.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct SweepValidParams {
    n_devices: usize,
    n_folds: usize,
    n_lambdas: usize,
    n_alphas: usize,
    valid_fraction: f32,
    verbosity: u8,
    max_iterations: u32,
    tolerance: f32,
    lambda_min_ratio: f32,
}

impl SweepValidParams {
    /// Number of parallel workers; zero runs the sweep on the calling thread
    pub fn n_devices(&self) -> usize {
        self.n_devices
    }

    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    pub fn n_lambdas(&self) -> usize {
        self.n_lambdas
    }

    pub fn n_alphas(&self) -> usize {
        self.n_alphas
    }

    pub fn valid_fraction(&self) -> f32 {
        self.valid_fraction
    }

    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn lambda_min_ratio(&self) -> f32 {
        self.lambda_min_ratio
    }
}

/// A hyper-parameter set for an elastic-net accuracy sweep
///
/// For each of `n_alphas` mixing ratios the solver walks a path of `n_lambdas` penalties,
/// cross-validates every penalty over `n_folds` folds and keeps the one with the lowest
/// holdout error.
///
/// # Parameters
/// | Name | Default | Purpose | Range |
/// | :--- | :--- | :---| :--- |
/// | [devices](Self::devices) | `1` | Number of parallel workers, `0` runs on the calling thread | `[0, inf)` |
/// | [folds](Self::folds) | `1` | Number of cross-validation folds | `[1, inf)` |
/// | [lambdas](Self::lambdas) | `100` | Length of the penalty path | `[1, inf)` |
/// | [alphas](Self::alphas) | `8` | Number of L1/L2 mixing ratios | `[1, inf)` |
/// | [valid_fraction](Self::valid_fraction) | `0.2` | Share of trailing rows held out for validation | `[0, 1)` |
/// | [verbosity](Self::verbosity) | `0` | Amount of solver progress logging | `[0, 255]` |
/// | [max_iterations](Self::max_iterations) | `1000` | Coordinate descent iterations per fit | `[1, inf)` |
/// | [tolerance](Self::tolerance) | `1e-4` | Coordinate descent convergence tolerance | `(0, inf)` |
/// | [lambda_min_ratio](Self::lambda_min_ratio) | `1e-4` | Ratio of the smallest to the largest penalty | `(0, 1]` |
///
/// # Example
///
/// ```rust
/// use linfa::ParamGuard;
/// use linfa_glm_ipums::{HarnessError, SweepParams};
///
/// let params = SweepParams::new()
///     .devices(2)
///     .folds(5)
///     .lambdas(20)
///     .alphas(3)
///     .valid_fraction(0.2)
///     .check()?;
///
/// assert_eq!(params.n_folds(), 5);
/// # Ok::<(), HarnessError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SweepParams(SweepValidParams);

impl Default for SweepParams {
    fn default() -> Self {
        Self::new()
    }
}

impl SweepParams {
    pub fn new() -> SweepParams {
        Self(SweepValidParams {
            n_devices: 1,
            n_folds: 1,
            n_lambdas: 100,
            n_alphas: 8,
            valid_fraction: 0.2,
            verbosity: 0,
            max_iterations: 1000,
            tolerance: 1e-4,
            lambda_min_ratio: 1e-4,
        })
    }

    pub fn devices(mut self, n_devices: usize) -> Self {
        self.0.n_devices = n_devices;
        self
    }

    pub fn folds(mut self, n_folds: usize) -> Self {
        self.0.n_folds = n_folds;
        self
    }

    pub fn lambdas(mut self, n_lambdas: usize) -> Self {
        self.0.n_lambdas = n_lambdas;
        self
    }

    pub fn alphas(mut self, n_alphas: usize) -> Self {
        self.0.n_alphas = n_alphas;
        self
    }

    /// Set the share of rows, taken from the end of the table, used as validation set.
    ///
    /// With a fraction of zero no validation set exists and the holdout error is
    /// measured on the cross-validation folds instead.
    pub fn valid_fraction(mut self, valid_fraction: f32) -> Self {
        self.0.valid_fraction = valid_fraction;
        self
    }

    pub fn verbosity(mut self, verbosity: u8) -> Self {
        self.0.verbosity = verbosity;
        self
    }

    pub fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.0.max_iterations = max_iterations;
        self
    }

    pub fn tolerance(mut self, tolerance: f32) -> Self {
        self.0.tolerance = tolerance;
        self
    }

    pub fn lambda_min_ratio(mut self, lambda_min_ratio: f32) -> Self {
        self.0.lambda_min_ratio = lambda_min_ratio;
        self
    }
}

impl ParamGuard for SweepParams {
    type Checked = SweepValidParams;
    type Error = HarnessError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        let p = &self.0;
        if p.n_folds < 1 {
            Err(HarnessError::InvalidFoldCount(p.n_folds))
        } else if p.n_lambdas < 1 {
            Err(HarnessError::InvalidLambdaCount(p.n_lambdas))
        } else if p.n_alphas < 1 {
            Err(HarnessError::InvalidAlphaCount(p.n_alphas))
        } else if !(0.0..1.0).contains(&p.valid_fraction) {
            Err(HarnessError::InvalidValidFraction(p.valid_fraction))
        } else if p.max_iterations < 1 {
            Err(HarnessError::InvalidMaxIterations(p.max_iterations))
        } else if !p.tolerance.is_finite() || p.tolerance <= 0.0 {
            Err(HarnessError::InvalidTolerance(p.tolerance))
        } else if !(p.lambda_min_ratio > 0.0 && p.lambda_min_ratio <= 1.0) {
            Err(HarnessError::InvalidLambdaMinRatio(p.lambda_min_ratio))
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_are_valid() {
        let params = SweepParams::default().check().unwrap();
        assert_eq!(params.n_devices(), 1);
        assert_eq!(params.n_lambdas(), 100);
        assert_eq!(params.n_alphas(), 8);
        assert_eq!(params.valid_fraction(), 0.2);
    }

    #[test]
    fn zero_devices_selects_cpu() {
        let params = SweepParams::new().devices(0).check().unwrap();
        assert_eq!(params.n_devices(), 0);
    }

    #[test]
    fn rejects_zero_counts() {
        assert!(matches!(
            SweepParams::new().folds(0).check(),
            Err(HarnessError::InvalidFoldCount(0))
        ));
        assert!(matches!(
            SweepParams::new().lambdas(0).check(),
            Err(HarnessError::InvalidLambdaCount(0))
        ));
        assert!(matches!(
            SweepParams::new().alphas(0).check(),
            Err(HarnessError::InvalidAlphaCount(0))
        ));
        assert!(matches!(
            SweepParams::new().max_iterations(0).check(),
            Err(HarnessError::InvalidMaxIterations(0))
        ));
    }

    #[test]
    fn valid_fraction_is_half_open() {
        assert!(SweepParams::new().valid_fraction(0.0).check().is_ok());
        assert!(matches!(
            SweepParams::new().valid_fraction(1.0).check(),
            Err(HarnessError::InvalidValidFraction(_))
        ));
        assert!(matches!(
            SweepParams::new().valid_fraction(-0.1).check(),
            Err(HarnessError::InvalidValidFraction(_))
        ));
        assert!(matches!(
            SweepParams::new().valid_fraction(f32::NAN).check(),
            Err(HarnessError::InvalidValidFraction(_))
        ));
    }

    #[test]
    fn rejects_bad_solver_knobs() {
        assert!(matches!(
            SweepParams::new().tolerance(0.0).check(),
            Err(HarnessError::InvalidTolerance(_))
        ));
        assert!(matches!(
            SweepParams::new().tolerance(f32::INFINITY).check(),
            Err(HarnessError::InvalidTolerance(_))
        ));
        assert!(matches!(
            SweepParams::new().lambda_min_ratio(0.0).check(),
            Err(HarnessError::InvalidLambdaMinRatio(_))
        ));
        assert!(matches!(
            SweepParams::new().lambda_min_ratio(1.5).check(),
            Err(HarnessError::InvalidLambdaMinRatio(_))
        ));
    }

    #[test]
    fn check_ref_agrees_with_check() {
        let params = SweepParams::new().folds(5).lambdas(20).alphas(3);
        let checked = params.check_ref().unwrap().clone();
        assert_eq!(params.check().unwrap(), checked);
    }
}
