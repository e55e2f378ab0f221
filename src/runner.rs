use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use linfa::ParamGuard;
use tracing::{debug, info};

use crate::dataset::{load_csv, IPUMS_PATH};
use crate::error::Result;
use crate::hyperparams::{SweepParams, SweepValidParams};
use crate::linfa_solver::LinfaElasticNet;
use crate::solver::{ElasticNetSolver, RmseGrids};
use crate::thresholds::{check_thresholds, Regime};

/// Result of a passing run
#[derive(Clone, Debug)]
pub struct Outcome {
    pub name: String,
    pub regime: Regime,
    pub grids: RmseGrids,
    /// Time spent inside the solver
    pub solve_time: Duration,
    /// Wall-clock time of the whole run, including loading the data
    pub elapsed: Duration,
}

/// Loads a dataset, runs an elastic-net sweep over it and checks the errors against the
/// ceiling of the selected [`Regime`]
///
/// Nothing is cached between runs: every call reads the table from disk again.
pub struct RegressionTestRunner<S> {
    data_path: PathBuf,
    solver: S,
}

impl RegressionTestRunner<LinfaElasticNet> {
    /// Runner on the ipums extract, solved with `linfa-elasticnet`
    pub fn ipums() -> Self {
        RegressionTestRunner::new(IPUMS_PATH, LinfaElasticNet::new())
    }
}

impl<S: ElasticNetSolver> RegressionTestRunner<S> {
    pub fn new<P: AsRef<Path>>(data_path: P, solver: S) -> Self {
        RegressionTestRunner {
            data_path: data_path.as_ref().to_path_buf(),
            solver,
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Run a single named case
    ///
    /// `name` only shows up in log output. Errors of the solver are passed on unchanged, a
    /// monitored cell at or above the ceiling ends the run with
    /// [`ThresholdExceeded`](crate::HarnessError::ThresholdExceeded).
    pub fn run(&self, name: &str, params: &SweepValidParams) -> Result<Outcome> {
        let start = Instant::now();

        if let Ok(cwd) = std::env::current_dir() {
            debug!(run = name, "cwd: {}", cwd.display());
        }

        let dataset = load_csv(&self.data_path)?;
        debug!(
            run = name,
            rows = dataset.records().nrows(),
            features = dataset.records().ncols(),
            "read {}",
            self.data_path.display()
        );

        let solve_start = Instant::now();
        let grids = self.solver.evaluate(
            dataset.records().view(),
            dataset.targets().view(),
            params,
            name,
        )?;
        let solve_time = solve_start.elapsed();

        let regime = Regime::select(params.valid_fraction(), params.n_lambdas());
        check_thresholds(&grids, regime)?;

        let elapsed = start.elapsed();
        info!(
            run = name,
            "passed in {:.3}s, solver took {:.3}s",
            elapsed.as_secs_f64(),
            solve_time.as_secs_f64()
        );

        Ok(Outcome {
            name: name.to_string(),
            regime,
            grids,
            solve_time,
            elapsed,
        })
    }
}

/// Check `params` and run them as case `name` on the ipums extract
pub fn run_ipums(name: &str, params: SweepParams) -> Result<Outcome> {
    let params = params.check()?;
    RegressionTestRunner::ipums().run(name, &params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarnessError;
    use crate::solver::SolverError;
    use crate::thresholds::{Cell, Grid};
    use ndarray::{ArrayView1, ArrayView2};
    use std::cell::Cell as Counter;

    /// Returns the same grids whatever it is asked
    struct FixedSolver {
        row: [f32; 3],
        calls: Counter<usize>,
    }

    impl FixedSolver {
        fn new(row: [f32; 3]) -> FixedSolver {
            FixedSolver {
                row,
                calls: Counter::new(0),
            }
        }
    }

    impl ElasticNetSolver for FixedSolver {
        fn evaluate(
            &self,
            records: ArrayView2<f32>,
            targets: ArrayView1<f32>,
            params: &SweepValidParams,
            _name: &str,
        ) -> std::result::Result<RmseGrids, SolverError> {
            assert_eq!(records.nrows(), targets.len());
            self.calls.set(self.calls.get() + 1);

            let rows = vec![self.row; params.n_alphas()];
            Ok(RmseGrids::from_rows(&rows, &rows))
        }
    }

    struct FailingSolver;

    impl ElasticNetSolver for FailingSolver {
        fn evaluate(
            &self,
            _records: ArrayView2<f32>,
            _targets: ArrayView1<f32>,
            _params: &SweepValidParams,
            _name: &str,
        ) -> std::result::Result<RmseGrids, SolverError> {
            Err(SolverError::NotEnoughSamples("always".to_string()))
        }
    }

    fn params(lambdas: usize, valid_fraction: f32) -> SweepValidParams {
        SweepParams::new()
            .lambdas(lambdas)
            .alphas(3)
            .valid_fraction(valid_fraction)
            .check()
            .unwrap()
    }

    #[test]
    fn passing_run_reports_regime() {
        let runner = RegressionTestRunner::new(IPUMS_PATH, FixedSolver::new([1.0, 2.0, 3.0]));
        let outcome = runner.run("passing", &params(3, 0.0)).unwrap();

        assert_eq!(outcome.name, "passing");
        assert_eq!(outcome.regime, Regime::NoValidation);
        assert_eq!(outcome.grids.n_alphas(), 3);
        assert!(outcome.solve_time <= outcome.elapsed);
    }

    #[test]
    fn selects_ceiling_from_configuration() {
        // 55000 passes only the loosest ceiling
        let runner = RegressionTestRunner::new(IPUMS_PATH, FixedSolver::new([55000.0; 3]));

        assert!(runner.run("short", &params(20, 0.2)).is_ok());
        assert!(matches!(
            runner.run("long", &params(21, 0.2)),
            Err(HarnessError::ThresholdExceeded { ceiling, .. }) if ceiling == 50000.0
        ));
        assert!(matches!(
            runner.run("no_validation", &params(20, 0.0)),
            Err(HarnessError::ThresholdExceeded { ceiling, .. }) if ceiling == 54000.0
        ));
    }

    #[test]
    fn first_failing_cell_is_reported() {
        let runner =
            RegressionTestRunner::new(IPUMS_PATH, FixedSolver::new([1.0, 1.0, 60000.0]));

        match runner.run("worst_fold", &params(5, 0.2)) {
            Err(HarnessError::ThresholdExceeded { cell, value, .. }) => {
                assert_eq!(cell, Cell::new(Grid::Train, 0, 2));
                assert_eq!(value, 60000.0);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn missing_data_stops_before_solver() {
        let solver = FixedSolver::new([1.0; 3]);
        let runner = RegressionTestRunner::new("./data/missing.csv", solver);

        assert!(matches!(
            runner.run("missing", &params(3, 0.0)),
            Err(HarnessError::DataUnavailable { .. })
        ));
        assert_eq!(runner.solver.calls.get(), 0);
    }

    #[test]
    fn solver_errors_pass_through() {
        let runner = RegressionTestRunner::new(IPUMS_PATH, FailingSolver);

        assert!(matches!(
            runner.run("failing", &params(3, 0.0)),
            Err(HarnessError::Solver(SolverError::NotEnoughSamples(_)))
        ));
    }

    #[test]
    fn each_run_calls_solver_once() {
        let runner = RegressionTestRunner::new(IPUMS_PATH, FixedSolver::new([1.0; 3]));
        runner.run("first", &params(3, 0.0)).unwrap();
        runner.run("second", &params(3, 0.0)).unwrap();

        assert_eq!(runner.solver.calls.get(), 2);
    }

    #[test]
    fn invalid_params_are_rejected_before_loading() {
        assert!(matches!(
            run_ipums("invalid", SweepParams::new().folds(0)),
            Err(HarnessError::InvalidFoldCount(0))
        ));
    }
}
