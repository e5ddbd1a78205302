//! 配置校验模块
//!
//! 校验规则：
//! - 滤波器截止频率 > 0，阶数 1..=8
//! - 轴距 > 0，减速带长度 >= 0
//! - tau 搜索区间合法，网格点数 >= 2
//! - 容差 > 0，最小片段长度 >= 2
//! - 最小重叠长度在 1..=min_segment_len 之内
//! - 最小化器迭代上限与收敛容差合法
//! - 通道名非空且互不相同

use contracts::{
    BumpConfig, ChannelConfig, ContractError, FilterConfig, MinimizerConfig, SearchConfig,
    SyncConfig,
};

const MAX_FILTER_ORDER: usize = 8;

/// 校验 SyncConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &SyncConfig) -> Result<(), ContractError> {
    validate_filter(&config.filter)?;
    validate_bump(&config.bump)?;
    validate_search(&config.search)?;
    validate_minimizer(&config.minimizer)?;
    validate_channels(&config.channels)?;
    Ok(())
}

/// `value > 0` and finite
fn require_positive(field: &str, value: f64) -> Result<(), ContractError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ContractError::config_validation(
            field,
            format!("must be > 0, got {value}"),
        ))
    }
}

/// 校验滤波器
fn validate_filter(filter: &FilterConfig) -> Result<(), ContractError> {
    require_positive("filter.cutoff_hz", filter.cutoff_hz)?;
    if !(1..=MAX_FILTER_ORDER).contains(&filter.order) {
        return Err(ContractError::config_validation(
            "filter.order",
            format!(
                "order must be in 1..={MAX_FILTER_ORDER}, got {}",
                filter.order
            ),
        ));
    }
    Ok(())
}

/// 校验减速带物理常数
fn validate_bump(bump: &BumpConfig) -> Result<(), ContractError> {
    require_positive("bump.wheelbase_m", bump.wheelbase_m)?;
    if !(bump.bump_length_m.is_finite() && bump.bump_length_m >= 0.0) {
        return Err(ContractError::config_validation(
            "bump.bump_length_m",
            format!("must be >= 0, got {}", bump.bump_length_m),
        ));
    }
    Ok(())
}

/// 校验 tau 搜索与交叉检验参数
fn validate_search(search: &SearchConfig) -> Result<(), ContractError> {
    if !(search.tau_min_s.is_finite()
        && search.tau_max_s.is_finite()
        && search.tau_min_s < search.tau_max_s)
    {
        return Err(ContractError::config_validation(
            "search.tau_min_s / search.tau_max_s",
            format!(
                "tau_min_s ({}) must be < tau_max_s ({})",
                search.tau_min_s, search.tau_max_s
            ),
        ));
    }
    if search.grid_points < 2 {
        return Err(ContractError::config_validation(
            "search.grid_points",
            format!("need at least 2 grid points, got {}", search.grid_points),
        ));
    }
    if !(search.guess_min_s < search.guess_max_s) {
        return Err(ContractError::config_validation(
            "search.guess_min_s / search.guess_max_s",
            format!(
                "guess_min_s ({}) must be < guess_max_s ({})",
                search.guess_min_s, search.guess_max_s
            ),
        ));
    }
    require_positive("search.guess_tolerance_s", search.guess_tolerance_s)?;
    require_positive("search.refine_tolerance_s", search.refine_tolerance_s)?;
    if search.min_segment_len < 2 {
        return Err(ContractError::config_validation(
            "search.min_segment_len",
            format!("must be >= 2, got {}", search.min_segment_len),
        ));
    }
    if !(1..=search.min_segment_len).contains(&search.min_overlap_len) {
        return Err(ContractError::config_validation(
            "search.min_overlap_len",
            format!(
                "must be in 1..={}, got {}",
                search.min_segment_len, search.min_overlap_len
            ),
        ));
    }
    Ok(())
}

/// 校验最小化器
fn validate_minimizer(minimizer: &MinimizerConfig) -> Result<(), ContractError> {
    if minimizer.max_iter == 0 {
        return Err(ContractError::config_validation(
            "minimizer.max_iter",
            "max_iter must be > 0",
        ));
    }
    require_positive("minimizer.x_tol", minimizer.x_tol)?;
    require_positive("minimizer.f_tol", minimizer.f_tol)?;
    Ok(())
}

/// 校验通道选择
fn validate_channels(channels: &ChannelConfig) -> Result<(), ContractError> {
    for (field, name) in [
        ("channels.reference", &channels.reference),
        ("channels.shifted", &channels.shifted),
    ] {
        if name.trim().is_empty() {
            return Err(ContractError::config_validation(
                field,
                "channel name cannot be empty",
            ));
        }
    }
    if channels.reference == channels.shifted {
        return Err(ContractError::config_validation(
            "channels.shifted",
            format!(
                "shifted channel must differ from the reference channel '{}'",
                channels.reference
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        assert!(validate(&SyncConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_cutoff() {
        let mut config = SyncConfig::default();
        config.filter.cutoff_hz = -5.0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("filter.cutoff_hz"), "got: {err}");
        assert!(err.contains("must be > 0"), "got: {err}");
    }

    #[test]
    fn test_invalid_order() {
        let mut config = SyncConfig::default();
        config.filter.order = 0;
        assert!(validate(&config).is_err());
        config.filter.order = 9;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("1..=8"), "got: {err}");
    }

    #[test]
    fn test_invalid_tau_range() {
        let mut config = SyncConfig::default();
        config.search.tau_min_s = 0.5;
        config.search.tau_max_s = 0.1;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("tau_min_s"), "got: {err}");
    }

    #[test]
    fn test_too_few_grid_points() {
        let mut config = SyncConfig::default();
        config.search.grid_points = 1;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("grid_points"), "got: {err}");
    }

    #[test]
    fn test_non_positive_tolerance() {
        let mut config = SyncConfig::default();
        config.search.refine_tolerance_s = 0.0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("refine_tolerance_s"), "got: {err}");
    }

    #[test]
    fn test_overlap_longer_than_segment() {
        let mut config = SyncConfig::default();
        config.search.min_overlap_len = config.search.min_segment_len + 1;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("min_overlap_len"), "got: {err}");

        config.search.min_overlap_len = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_iterations() {
        let mut config = SyncConfig::default();
        config.minimizer.max_iter = 0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("max_iter"), "got: {err}");
    }

    #[test]
    fn test_channel_names() {
        let mut config = SyncConfig::default();
        config.channels.shifted = " ".into();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("cannot be empty"), "got: {err}");

        config.channels.shifted = config.channels.reference.clone();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("must differ"), "got: {err}");
    }

    #[test]
    fn test_first_violation_wins() {
        let mut config = SyncConfig::default();
        config.bump.wheelbase_m = 0.0;
        config.minimizer.max_iter = 0;
        let err = validate(&config).unwrap_err();
        assert!(
            matches!(err, ContractError::ConfigValidation { ref field, .. } if field == "bump.wheelbase_m")
        );
    }
}
