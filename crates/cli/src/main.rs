//! # Bike Sync CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - 运行文件的批量同步与截断
//! - 合成运行与表结构描述

mod cli;
mod commands;
mod error;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_schema, run_simulate, run_sync, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging based on CLI options
    observability::init_with_config(observability_config(&cli))?;

    info!(version = env!("CARGO_PKG_VERSION"), "Bike Sync CLI starting");

    // Execute command
    let result = match &cli.command {
        Commands::Sync(args) => run_sync(args).await,
        Commands::Simulate(args) => run_simulate(args),
        Commands::Schema(args) => run_schema(args),
        Commands::Validate(args) => run_validate(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Map CLI flags onto the observability settings
fn observability_config(cli: &Cli) -> ObservabilityConfig {
    ObservabilityConfig::from_flags(
        cli.verbose,
        cli.quiet,
        cli.log_format.into(),
        Some(cli.metrics_port),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observability_config_from_flags() {
        let cli = Cli::try_parse_from(["bike-sync", "-vv", "--log-format", "json", "validate"])
            .unwrap();
        let config = observability_config(&cli);
        assert_eq!(config.level, tracing::Level::TRACE);
        assert_eq!(config.log_format, observability::LogFormat::Json);
        assert_eq!(config.metrics_port, None);

        let cli = Cli::try_parse_from(["bike-sync", "-q", "--metrics-port", "9100", "validate"])
            .unwrap();
        let config = observability_config(&cli);
        assert_eq!(config.level, tracing::Level::WARN);
        assert_eq!(config.metrics_port, Some(9100));
    }
}
