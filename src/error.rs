//! Error types of the ipums harness
//!

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::solver::SolverError;
use crate::thresholds::Cell;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("dataset `{}` is unavailable: {source}", .path.display())]
    DataUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("dataset `{}` is malformed: {reason}", .path.display())]
    MalformedData { path: PathBuf, reason: String },
    #[error("number of folds should be at least one, but is {0}")]
    InvalidFoldCount(usize),
    #[error("number of lambdas should be at least one, but is {0}")]
    InvalidLambdaCount(usize),
    #[error("number of alphas should be at least one, but is {0}")]
    InvalidAlphaCount(usize),
    #[error("validation fraction should be in range [0, 1), but is {0}")]
    InvalidValidFraction(f32),
    #[error("maximal number of iterations should be at least one, but is {0}")]
    InvalidMaxIterations(u32),
    #[error("tolerance should be positive and finite, but is {0}")]
    InvalidTolerance(f32),
    #[error("lambda min ratio should be in range (0, 1], but is {0}")]
    InvalidLambdaMinRatio(f32),
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error("{cell} = {value} is not below the ceiling {ceiling}")]
    ThresholdExceeded { cell: Cell, value: f32, ceiling: f32 },
}
