//! 同步结果指标收集模块
//!
//! 基于 SyncResult 收集和统计每次运行的同步指标。

use std::collections::BTreeMap;

use contracts::{ContractError, SyncResult};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use tracing::debug;

/// 注册本项目导出的指标说明
///
/// 标签只取有限集合（来源、阶段、原因、错误类别）；`run_id` 只出现在日志中。
pub fn describe_metrics() {
    describe_counter!("bike_sync_runs_total", "Runs synchronized, by selected tau source");
    describe_gauge!(
        "bike_sync_last_tau_seconds",
        Unit::Seconds,
        "Tau of the most recently synchronized run"
    );
    describe_histogram!(
        "bike_sync_tau_seconds",
        Unit::Seconds,
        "Estimated time shift per run"
    );
    describe_histogram!(
        "bike_sync_refinement_shift_seconds",
        Unit::Seconds,
        "Distance between the final tau and the grid optimum"
    );
    describe_histogram!(
        "bike_sync_segment_len",
        Unit::Count,
        "Samples in the valid segment around the bump"
    );
    describe_counter!(
        "bike_sync_decisions_total",
        "Cross-check outcomes, by stage and reason"
    );
    describe_counter!("bike_sync_failures_total", "Failed runs, by error kind");
}

/// 从 SyncResult 记录指标
///
/// 每完成一次运行的同步时调用。`run_id` 只写入 debug 日志，不作为指标标签。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_sync_result;
///
/// let result = estimator.estimate(&reference, &shifted, speed)?;
/// record_sync_result("00105", &result);
/// ```
pub fn record_sync_result(run_id: &str, result: &SyncResult) {
    counter!("bike_sync_runs_total", "source" => result.source.as_str()).increment(1);

    gauge!("bike_sync_last_tau_seconds").set(result.tau);
    histogram!("bike_sync_tau_seconds").record(result.tau);

    // 网格最优与最终结果的差
    histogram!("bike_sync_refinement_shift_seconds").record((result.tau - result.grid_tau).abs());

    histogram!("bike_sync_segment_len").record(result.segment.len() as f64);

    for decision in &result.decisions {
        counter!(
            "bike_sync_decisions_total",
            "stage" => decision.stage.as_str(),
            "reason" => decision.reason.as_str()
        )
        .increment(1);
    }
    debug!(run_id, tau = result.tau, source = result.source.as_str(), "sync metrics recorded");
}

/// 记录同步失败
pub fn record_sync_failure(run_id: &str, err: &ContractError) {
    counter!("bike_sync_failures_total", "kind" => err.kind()).increment(1);
    debug!(run_id, kind = err.kind(), "sync failure recorded");
}

/// 同步运行聚合器
///
/// 在内存中聚合一批运行的结果，便于输出摘要。
#[derive(Debug, Clone, Default)]
pub struct SyncRunAggregator {
    /// 成功运行数
    pub succeeded: u64,

    /// 被覆盖（种子被替换）的运行数
    pub overridden: u64,

    /// tau 统计 (秒)
    pub tau_stats: RunningStats,

    /// 网格最小误差统计
    pub error_stats: RunningStats,

    /// 各来源的选中次数
    pub source_counts: BTreeMap<&'static str, u64>,

    /// 各错误类别的失败次数
    pub failure_counts: BTreeMap<&'static str, u64>,
}

impl SyncRunAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次成功的同步
    pub fn update(&mut self, result: &SyncResult) {
        self.succeeded += 1;
        if result.was_overridden() {
            self.overridden += 1;
        }
        self.tau_stats.push(result.tau);
        if result.min_error.is_finite() {
            self.error_stats.push(result.min_error);
        }
        *self.source_counts.entry(result.source.as_str()).or_insert(0) += 1;
    }

    /// 记录一次失败的同步
    pub fn record_failure(&mut self, err: &ContractError) {
        *self.failure_counts.entry(err.kind()).or_insert(0) += 1;
    }

    /// 失败总数
    pub fn failed(&self) -> u64 {
        self.failure_counts.values().sum()
    }

    /// 生成摘要报告
    pub fn summary(&self) -> RunSummary {
        let total = self.succeeded + self.failed();
        RunSummary {
            total_runs: total,
            succeeded: self.succeeded,
            failed: self.failed(),
            overridden: self.overridden,
            success_rate: if total > 0 {
                self.succeeded as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            tau_s: StatsSummary::from(&self.tau_stats),
            min_error: StatsSummary::from(&self.error_stats),
            source_counts: self.source_counts.clone(),
            failure_counts: self.failure_counts.clone(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 运行摘要
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub total_runs: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub overridden: u64,
    pub success_rate: f64,
    pub tau_s: StatsSummary,
    pub min_error: StatsSummary,
    pub source_counts: BTreeMap<&'static str, u64>,
    pub failure_counts: BTreeMap<&'static str, u64>,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Sync Run Summary ===")?;
        writeln!(f, "Total runs: {}", self.total_runs)?;
        writeln!(
            f,
            "Succeeded: {} ({:.2}%)",
            self.succeeded, self.success_rate
        )?;
        writeln!(f, "Failed: {}", self.failed)?;
        writeln!(f, "Overridden: {}", self.overridden)?;
        writeln!(f, "Tau (s): {}", self.tau_s)?;
        writeln!(f, "Min error: {}", self.min_error)?;

        if !self.source_counts.is_empty() {
            writeln!(f, "Selected sources:")?;
            for (source, count) in &self.source_counts {
                writeln!(f, "  {}: {}", source, count)?;
            }
        }
        if !self.failure_counts.is_empty() {
            writeln!(f, "Failures:")?;
            for (kind, count) in &self.failure_counts {
                writeln!(f, "  {}: {}", kind, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.4}, max={:.4}, mean={:.4}, std={:.4} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
