//! # Observability
//!
//! 可观测性模块：Tracing + Prometheus 指标。
//!
//! ## 功能
//!
//! - 由命令行开关推导日志级别与格式
//! - 日志过滤：工作区各 crate 使用所选级别，依赖库只输出 warn 及以上
//! - Prometheus 指标导出（可选）
//! - SyncResult 指标收集与运行统计
//!
//! ## 使用示例
//!
//! ```ignore
//! use observability::{LogFormat, ObservabilityConfig};
//!
//! // -v，JSON 日志，不导出指标
//! observability::init_with_config(ObservabilityConfig::from_flags(1, false, LogFormat::Json, None))?;
//!
//! let result = estimator.estimate(&reference, &shifted, speed)?;
//! observability::record_sync_result(&run.run_id, &result);
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// Re-exports
pub use crate::metrics::{
    describe_metrics, record_sync_failure, record_sync_result, RunSummary, RunningStats,
    StatsSummary, SyncRunAggregator,
};

/// 工作区内 crate 的日志 target
const WORKSPACE_TARGETS: [&str; 7] = [
    "bike_sync",
    "config_loader",
    "contracts",
    "ingestion",
    "numerics",
    "observability",
    "sync_engine",
];

/// 可观测性配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// 日志格式
    pub log_format: LogFormat,
    /// Prometheus 端口 (None = 禁用)
    pub metrics_port: Option<u16>,
    /// 工作区 crate 的日志级别
    pub level: Level,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            metrics_port: None,
            level: Level::INFO,
        }
    }
}

impl ObservabilityConfig {
    /// 由 `-v` 次数与 `-q` 推导级别：quiet 为 warn，0/1/2+ 次 -v 为 info/debug/trace
    pub fn from_flags(
        verbose: u8,
        quiet: bool,
        log_format: LogFormat,
        metrics_port: Option<u16>,
    ) -> Self {
        let level = match (quiet, verbose) {
            (true, _) => Level::WARN,
            (false, 0) => Level::INFO,
            (false, 1) => Level::DEBUG,
            (false, _) => Level::TRACE,
        };
        Self {
            log_format,
            metrics_port: metrics_port.filter(|port| *port != 0),
            level,
        }
    }

    /// 默认过滤指令，例如 `warn,sync_engine=debug,...`
    pub fn filter_directives(&self) -> String {
        let level = self.level.to_string().to_ascii_lowercase();
        let mut directives = vec!["warn".to_string()];
        directives.extend(WORKSPACE_TARGETS.iter().map(|target| format!("{target}={level}")));
        directives.join(",")
    }

    /// `RUST_LOG` 优先，否则使用 [`Self::filter_directives`]
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.filter_directives()))
    }
}

/// 日志格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON 结构化日志
    #[default]
    Json,
    /// 人类可读格式
    Pretty,
    /// 紧凑单行格式
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// 使用自定义配置初始化
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    // 1. Initialize Tracing
    let fmt_layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(config.env_filter())
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    // 2. Initialize Prometheus Exporter (if enabled)
    if let Some(port) = config.metrics_port {
        PrometheusBuilder::new()
            .with_http_listener(([0, 0, 0, 0], port))
            .install()
            .context("Failed to install Prometheus recorder")?;
        describe_metrics();

        tracing::info!(port, "Prometheus metrics endpoint initialized");
    }

    tracing::info!(
        log_format = ?config.log_format,
        level = %config.level,
        metrics_port = ?config.metrics_port,
        "Observability initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.metrics_port, None);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.level, Level::INFO);
    }

    #[test]
    fn test_levels_from_flags() {
        let level = |verbose, quiet| {
            ObservabilityConfig::from_flags(verbose, quiet, LogFormat::Compact, None).level
        };
        assert_eq!(level(0, false), Level::INFO);
        assert_eq!(level(1, false), Level::DEBUG);
        assert_eq!(level(2, false), Level::TRACE);
        assert_eq!(level(5, false), Level::TRACE);
        assert_eq!(level(0, true), Level::WARN);
    }

    #[test]
    fn test_zero_port_disables_exporter() {
        let config = ObservabilityConfig::from_flags(0, false, LogFormat::Json, Some(0));
        assert_eq!(config.metrics_port, None);
        let config = ObservabilityConfig::from_flags(0, false, LogFormat::Json, Some(9100));
        assert_eq!(config.metrics_port, Some(9100));
    }

    #[test]
    fn test_filter_directives() {
        let config = ObservabilityConfig::from_flags(1, false, LogFormat::Json, None);
        let directives = config.filter_directives();
        assert!(directives.starts_with("warn,"), "{directives}");
        assert!(directives.contains("sync_engine=debug"), "{directives}");
        assert!(directives.contains("bike_sync=debug"), "{directives}");
        assert!(directives.parse::<EnvFilter>().is_ok());
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
