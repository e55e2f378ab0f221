//! Runs every ipums case in order and stops at the first failure
use linfa_glm_ipums::{run_ipums, Result, SweepParams};
use tracing_subscriber::EnvFilter;

fn case(devices: usize, folds: usize, lambdas: usize, valid_fraction: f32) -> SweepParams {
    SweepParams::new()
        .devices(devices)
        .folds(folds)
        .lambdas(lambdas)
        .alphas(3)
        .valid_fraction(valid_fraction)
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();

    let suite = vec![
        ("glm_ipums_gpu_fold1_quick_0", case(1, 1, 3, 0.0)),
        ("glm_ipums_gpu_fold1_0", case(1, 1, 20, 0.0)),
        ("glm_ipums_gpu_fold5_0", case(1, 5, 20, 0.0)),
        ("glm_ipums_gpu_fold1_quick", case(1, 1, 5, 0.2)),
        ("glm_ipums_gpu_fold1", case(1, 1, 20, 0.2)),
        ("glm_ipums_gpu_fold5", case(1, 5, 20, 0.2)),
        ("glm_ipums_gpu2_fold1_quick", case(2, 1, 3, 0.2)),
        ("glm_ipums_gpu2_fold1", case(2, 1, 20, 0.2)),
        ("glm_ipums_gpu2_fold5", case(3, 5, 20, 0.2)),
        ("glm_ipums_cpu_fold1_quick", case(0, 1, 3, 0.2)),
        ("glm_ipums_cpu_fold1", case(0, 1, 20, 0.2)),
        ("glm_ipums_cpu_fold5", case(0, 5, 20, 0.2)),
    ];

    for (name, params) in suite {
        let outcome = run_ipums(name, params)?;
        println!(
            "{}: passed ({:?}) in {:.3}s",
            outcome.name,
            outcome.regime,
            outcome.elapsed.as_secs_f64()
        );
    }

    println!("DONE.");
    Ok(())
}
