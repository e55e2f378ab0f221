//! Accuracy ceilings for the ipums sweep
//!
//! The ceilings were measured on one snapshot of the ipums extract and are fixtures of this
//! harness, not general guidance.
use std::fmt;

use tracing::{error, info};

use crate::error::{HarnessError, Result};
use crate::solver::{RmseGrids, BEST, MEAN, WORST};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grid {
    Train,
    Test,
}

/// A single entry of the train or test RMSE grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub grid: Grid,
    pub row: usize,
    pub column: usize,
}

impl Cell {
    pub const fn new(grid: Grid, row: usize, column: usize) -> Cell {
        Cell { grid, row, column }
    }

    /// Read the cell, `NaN` if the grid is too small
    pub fn value(&self, grids: &RmseGrids) -> f32 {
        let grid = match self.grid {
            Grid::Train => grids.train(),
            Grid::Test => grids.test(),
        };

        grid.get((self.row, self.column)).copied().unwrap_or(f32::NAN)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grid = match self.grid {
            Grid::Train => "rmse_train",
            Grid::Test => "rmse_test",
        };
        write!(f, "{}[{}, {}]", grid, self.row, self.column)
    }
}

/// Cells compared against the ceiling, in the order they are checked
pub const MONITORED_CELLS: [Cell; 4] = [
    Cell::new(Grid::Train, 0, BEST),
    Cell::new(Grid::Train, 0, MEAN),
    Cell::new(Grid::Train, 0, WORST),
    Cell::new(Grid::Test, 0, WORST),
];

/// Threshold regime, chosen from the validation split and the length of the lambda path
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Regime {
    /// No validation rows were held out
    NoValidation,
    /// Validation rows and more than 20 lambdas
    LongLambdaPath,
    /// Validation rows and at most 20 lambdas
    ShortLambdaPath,
}

impl Regime {
    pub fn select(valid_fraction: f32, n_lambdas: usize) -> Regime {
        if valid_fraction == 0.0 {
            Regime::NoValidation
        } else if n_lambdas > 20 {
            Regime::LongLambdaPath
        } else {
            Regime::ShortLambdaPath
        }
    }

    pub fn ceiling(&self) -> f32 {
        match self {
            Regime::NoValidation => 54000.0,
            Regime::LongLambdaPath => 50000.0,
            Regime::ShortLambdaPath => 59000.0,
        }
    }
}

/// Check that every monitored cell is strictly below the ceiling of `regime`
///
/// The first violating cell is logged and returned as
/// [`ThresholdExceeded`](HarnessError::ThresholdExceeded). `NaN` never passes.
pub fn check_thresholds(grids: &RmseGrids, regime: Regime) -> Result<()> {
    let ceiling = regime.ceiling();

    for cell in MONITORED_CELLS.iter() {
        let value = cell.value(grids);
        info!("{} = {}", cell, value);

        let below = value < ceiling;
        if !below {
            error!("{} = {} is not below {} ({:?})", cell, value, ceiling, regime);
            return Err(HarnessError::ThresholdExceeded {
                cell: *cell,
                value,
                ceiling,
            });
        }
    }

    Ok(())
}
