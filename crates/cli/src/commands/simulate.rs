//! `simulate` command implementation.

use anyhow::{Context, Result};
use ingestion::{BumpRunGenerator, MockRunConfig};
use tracing::info;

use crate::cli::SimulateArgs;

/// Execute the `simulate` command
pub fn run_simulate(args: &SimulateArgs) -> Result<()> {
    let run_id = match &args.run_id {
        Some(id) => id.clone(),
        None => args
            .output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .context("Output path has no file name")?,
    };

    let config = MockRunConfig {
        run_id,
        samples: args.samples,
        sample_rate: args.rate,
        speed: args.speed,
        bump_at_s: args.bump_at,
        tau: args.tau,
        noise: args.noise,
        seed: args.seed,
        gaps: args.gaps.clone(),
        ..MockRunConfig::default()
    };
    let run = BumpRunGenerator::new(config).generate();
    run.validate().context("Simulated run is not usable")?;

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    run.write_to(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!(
        run_id = %run.run_id,
        samples = run.samples_per_channel(),
        tau = args.tau,
        path = %args.output.display(),
        "Simulated run written"
    );
    println!("✓ Wrote {} ({} samples, tau = {}s)", args.output.display(), args.samples, args.tau);
    Ok(())
}
