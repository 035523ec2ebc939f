//! Reliability of Michaelis-Menten parameters for a five point design.
//!
//! Run with `RUST_LOG=lmmc_rs=debug` to see progress messages.

use lmmc_rs::models::enzyme;
use lmmc_rs::uncertainty::WriterTrace;
use lmmc_rs::{DataSet, MonteCarloConfig, MonteCarloDriver};
use ndarray::array;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Michaelis-Menten reliability example");
    println!("====================================\n");

    let data = DataSet::from_points(&[1.0, 2.0, 5.0, 10.0, 20.0])?;
    let truth = array![10.0, 5.0];

    // 1. The same design at increasing noise levels
    for noise_sd in [0.05, 0.2, 0.5] {
        let config = MonteCarloConfig::new(noise_sd)
            .with_nsims(10_000)
            .with_seed(2024)
            .with_parallel(true);
        let driver = MonteCarloDriver::for_model(&enzyme::MICHAELIS, &data, truth.clone(), config)?;
        let report = driver.run()?;

        println!("noise sd = {}", noise_sd);
        println!("{}\n", report);
    }

    // 2. Km held fixed
    let config = MonteCarloConfig::new(0.2).with_nsims(10_000).with_seed(2024);
    let report = MonteCarloDriver::for_model(&enzyme::MICHAELIS, &data, truth.clone(), config)?
        .with_fixed(&["Km"])?
        .run()?;
    println!("Km fixed at 5.0");
    println!("{}\n", report);

    // 3. A short traced run
    let config = MonteCarloConfig::new(0.2).with_nsims(3).with_seed(1);
    let driver = MonteCarloDriver::for_model(&enzyme::MICHAELIS, &data, truth, config)?;
    let mut trace = WriterTrace::new(std::io::stdout());
    driver.run_traced(&mut trace)?;
    trace.into_inner()?;

    Ok(())
}
