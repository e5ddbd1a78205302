//! `sync` command implementation.

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{ContractError, SyncConfig};
use ingestion::RunLoader;
use tracing::{info, warn};

use super::config_overrides;
use crate::cli::SyncArgs;
use crate::error::CliError;
use crate::pipeline::SyncPipeline;

/// Execute the `sync` command
pub async fn run_sync(args: &SyncArgs) -> Result<()> {
    let config = load_config(args)?;

    if !args.data_dir.is_dir() {
        return Err(CliError::data_dir_not_found(args.data_dir.display().to_string()).into());
    }
    let loader = RunLoader::new(&args.data_dir);
    let paths = if args.runs.is_empty() {
        loader
            .list_runs()
            .with_context(|| format!("Failed to list runs in {}", args.data_dir.display()))?
    } else {
        args.runs
            .iter()
            .map(|id| loader.data_dir().join(format!("{id}.json")))
            .collect()
    };
    if paths.is_empty() {
        return Err(CliError::no_runs(args.data_dir.display().to_string()).into());
    }

    // Unreadable runs are counted as failures, not fatal
    let mut runs = Vec::with_capacity(paths.len());
    let mut load_failures = Vec::new();
    for path in &paths {
        match loader.load(path) {
            Ok(run) => runs.push(run),
            Err(err) => {
                let run_id = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                warn!(run_id = %run_id, error = %err, "Failed to load run");
                load_failures.push((run_id, ContractError::from(err)));
            }
        }
    }

    let pipeline = SyncPipeline::new(config, &args.output);
    let mut stats = pipeline.run(runs).await?;
    for (run_id, err) in &load_failures {
        stats.record_failure(run_id, err);
    }
    stats.sort();

    if args.json {
        let json = serde_json::to_string_pretty(&stats.rows)
            .context("Failed to serialize run results")?;
        println!("{}", json);
    } else {
        stats.print_summary();
    }

    info!(
        total = stats.total(),
        failed = stats.failed(),
        duration_secs = stats.duration.as_secs_f64(),
        "Sync finished"
    );

    if stats.failed() > 0 {
        return Err(CliError::RunsFailed {
            failed: stats.failed(),
            total: stats.total(),
        }
        .into());
    }
    Ok(())
}

fn load_config(args: &SyncArgs) -> Result<SyncConfig> {
    if let Some(path) = &args.config {
        if !path.exists() {
            return Err(CliError::config_not_found(path.display().to_string()).into());
        }
    }
    let overrides = config_overrides(&args.overrides)?;
    let config = ConfigLoader::load_layered(args.config.as_deref(), &overrides)
        .context("Failed to load sync configuration")?;
    info!(
        config = ?args.config,
        overrides = overrides.len(),
        "Configuration loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingestion::{BumpRunGenerator, MockRunConfig};
    use std::path::PathBuf;

    fn args(data_dir: PathBuf, output: PathBuf) -> SyncArgs {
        SyncArgs {
            data_dir,
            config: None,
            overrides: Vec::new(),
            runs: Vec::new(),
            output,
            json: true,
        }
    }

    #[tokio::test]
    async fn test_sync_directory() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("runs");
        std::fs::create_dir(&data).unwrap();
        let run = BumpRunGenerator::new(MockRunConfig {
            run_id: "00010".into(),
            ..MockRunConfig::default()
        })
        .generate();
        run.write_to(&data.join("00010.json")).unwrap();

        let output = dir.path().join("out");
        run_sync(&args(data, output.clone())).await.unwrap();
        assert!(output.join("run_00010.json").exists());
    }

    #[tokio::test]
    async fn test_unreadable_run_fails_command() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("00011.json"), "{}").unwrap();

        let err = run_sync(&args(dir.path().to_path_buf(), dir.path().join("out")))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::RunsFailed { failed: 1, total: 1 })
        ));
    }

    #[tokio::test]
    async fn test_missing_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_sync(&args(dir.path().join("nope"), dir.path().join("out")))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::DataDirNotFound { .. })
        ));
    }

    #[test]
    fn test_set_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.toml");
        std::fs::write(&path, "[filter]\ncutoff_hz = 40.0\n").unwrap();

        let mut sync_args = args(dir.path().to_path_buf(), dir.path().join("out"));
        sync_args.config = Some(path);
        sync_args.overrides = vec!["filter.order=4".into()];
        let config = load_config(&sync_args).unwrap();
        assert_eq!(config.filter.cutoff_hz, 40.0);
        assert_eq!(config.filter.order, 4);

        sync_args.overrides = vec!["filter.ordr=4".into()];
        assert!(load_config(&sync_args).is_err());
    }

    #[tokio::test]
    async fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut sync_args = args(dir.path().to_path_buf(), dir.path().join("out"));
        sync_args.config = Some(dir.path().join("missing.toml"));
        let err = run_sync(&sync_args).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::ConfigNotFound { .. })
        ));
    }
}
