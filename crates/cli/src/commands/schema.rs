//! `schema` command implementation.

use anyhow::{Context, Result};
use ingestion::{RunLoader, SchemaBuilder};
use tracing::info;

use crate::cli::SchemaArgs;

/// Execute the `schema` command
pub fn run_schema(args: &SchemaArgs) -> Result<()> {
    let dir = args.run.parent().unwrap_or_else(|| std::path::Path::new("."));
    let run = RunLoader::new(dir)
        .load(&args.run)
        .with_context(|| format!("Failed to load run {}", args.run.display()))?;
    let schema = SchemaBuilder::for_run(&run)
        .with_context(|| format!("Failed to describe run {}", run.run_id))?;
    info!(run_id = %run.run_id, columns = schema.len(), "Schema built");

    if args.json {
        let json = serde_json::to_string_pretty(&schema).context("Failed to serialize schema")?;
        println!("{}", json);
    } else {
        println!("Run {} ({} columns)\n", run.run_id, schema.len());
        print!("{}", schema);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingestion::{BumpRunGenerator, MockRunConfig};

    #[test]
    fn test_schema_of_simulated_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mock.json");
        BumpRunGenerator::new(MockRunConfig::default())
            .generate()
            .write_to(&path)
            .unwrap();

        run_schema(&SchemaArgs {
            run: path,
            json: true,
        })
        .unwrap();
    }

    #[test]
    fn test_missing_run_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_schema(&SchemaArgs {
            run: dir.path().join("nope.json"),
            json: false,
        })
        .unwrap_err();
        assert!(err.to_string().contains("Failed to load run"));
    }
}
