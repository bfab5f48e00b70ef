//! Herald Election Simulator
//!
//! Run a configuration over several seeds and print the merged metrics.
//!
//! ```text
//! herald-sim [config.json] [runs]
//! ```
//!
//! Without a configuration file the default experiment runs. Logs go to
//! stderr (`RUST_LOG` overrides the filter); the summary goes to stdout as
//! JSON.

use std::env;
use std::path::Path;

use herald_sim::{run_batch, SimulationConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "herald_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = env::args().collect();

    let config = match args.get(1) {
        Some(path) => SimulationConfig::from_file(Path::new(path))?,
        None => SimulationConfig::default(),
    };

    let runs: usize = args.get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1);

    tracing::info!(
        devices = config.device_count,
        variants = config.variants.len(),
        runs,
        "starting batch"
    );

    let batch = run_batch(&config, runs)?;
    for outcome in batch.outcomes() {
        tracing::info!(
            variant = %outcome.variant,
            final_correct = outcome.final_correct,
            leader_changes = outcome.leader_changes,
            "variant outcome"
        );
    }
    println!("{}", serde_json::to_string_pretty(&batch.summary)?);

    Ok(())
}
