//! `linfa-glm-ipums` checks the accuracy of an elastic-net regression sweep on a fixed
//! extract of the ipums income data.
//!
//! ## The Big Picture
//!
//! The harness loads `data/ipums_1k.csv`, hands features and target to an
//! [`ElasticNetSolver`] together with a sweep configuration, and compares the returned RMSE
//! grids against hard ceilings. The ceiling depends on whether a validation set was held out
//! and on the length of the lambda path:
//!
//! | validation fraction | lambdas | ceiling |
//! | :--- | :--- | :--- |
//! | `0` | any | `54000` |
//! | `> 0` | `> 20` | `50000` |
//! | `> 0` | `<= 20` | `59000` |
//!
//! Only `rmse_train[0, 0..3]` and `rmse_test[0, 2]` are compared.
//!
//! ## Current state
//!
//! The shipped solver, [`LinfaElasticNet`], cross-validates the coordinate descent elastic net
//! of [`linfa-elasticnet`](https://crates.io/crates/linfa-elasticnet) over a grid of mixing
//! ratios and a geometric path of penalties.
//!
//! ## Examples
//!
//! ```no_run
//! use linfa_glm_ipums::{run_ipums, SweepParams};
//!
//! let outcome = run_ipums(
//!     "glm_ipums_gpu_fold1_quick",
//!     SweepParams::new()
//!         .devices(1)
//!         .folds(1)
//!         .lambdas(5)
//!         .alphas(3)
//!         .valid_fraction(0.2),
//! )?;
//! println!("{}", outcome.grids.test());
//! # Ok::<(), linfa_glm_ipums::HarnessError>(())
//! ```
//!
//! The whole suite runs sequentially with `cargo run --release --bin glm_ipums`.

pub mod dataset;
mod error;
mod hyperparams;
mod linfa_solver;
pub mod path;
mod runner;
mod solver;
pub mod thresholds;

pub use error::{HarnessError, Result};
pub use hyperparams::{SweepParams, SweepValidParams};
pub use linfa_solver::LinfaElasticNet;
pub use runner::{run_ipums, Outcome, RegressionTestRunner};
pub use solver::{rmse, ElasticNetSolver, RmseGrids, SolverError, BEST, MEAN, WORST};
pub use thresholds::{check_thresholds, Cell, Grid, Regime, MONITORED_CELLS};
