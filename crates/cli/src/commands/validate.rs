//! `validate` command implementation.

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::SyncConfig;
use serde::Serialize;
use tracing::info;

use super::config_overrides;
use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    cutoff_hz: f64,
    filter_order: usize,
    tau_range_s: (f64, f64),
    grid_points: usize,
    grid_step_s: f64,
    reference_channel: String,
    shifted_channel: String,
    invert_reference: bool,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    let loaded = config_overrides(&args.overrides)
        .and_then(|overrides| ConfigLoader::load_layered(Some(args.config.as_path()), &overrides));
    match loaded {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    cutoff_hz: config.filter.cutoff_hz,
                    filter_order: config.filter.order,
                    tau_range_s: (config.search.tau_min_s, config.search.tau_max_s),
                    grid_points: config.search.grid_points,
                    grid_step_s: grid_step(&config),
                    reference_channel: config.channels.reference.clone(),
                    shifted_channel: config.channels.shifted.clone(),
                    invert_reference: config.channels.invert_reference,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

fn grid_step(config: &SyncConfig) -> f64 {
    let search = &config.search;
    (search.tau_max_s - search.tau_min_s) / (search.grid_points.saturating_sub(1).max(1)) as f64
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &SyncConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let search = &config.search;

    if grid_step(config) > search.guess_tolerance_s {
        warnings.push(format!(
            "grid step {:.4}s is coarser than guess_tolerance_s {}s",
            grid_step(config),
            search.guess_tolerance_s
        ));
    }

    if search.tau_min_s < search.guess_min_s || search.tau_max_s > search.guess_max_s {
        warnings.push(
            "search range extends past the plausible guess range - the bump guess cannot override there"
                .to_string(),
        );
    }

    if !config.channels.invert_reference {
        warnings.push(
            "channels.invert_reference is false - both instruments must share polarity".to_string(),
        );
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!(
                "\n  Filter: order {} low-pass at {} Hz",
                summary.filter_order, summary.cutoff_hz
            );
            println!(
                "  Search: [{}, {}] s, {} points (step {:.4} s)",
                summary.tau_range_s.0,
                summary.tau_range_s.1,
                summary.grid_points,
                summary.grid_step_s
            );
            println!(
                "  Channels: {} (NI{}) / {} (VN)",
                summary.reference_channel,
                if summary.invert_reference { ", inverted" } else { "" },
                summary.shifted_channel
            );
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
