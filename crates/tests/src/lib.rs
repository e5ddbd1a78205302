//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置文件到估计器的贯通测试
//! - 合成减速带运行的 e2e 测试
//! - 运行文件读写与批量统计

#[cfg(test)]
mod support {
    use contracts::Signal;
    use ingestion::{BumpRunGenerator, MockRunConfig, RunRecord};

    pub const RATE: f64 = 200.0;
    pub const SPEED: f64 = 3.0;

    /// NI bump at sample 1000, VN bump `tau` earlier, 6000 samples at 200 Hz
    pub fn bump_run(tau: f64, gaps: Vec<(usize, usize)>) -> RunRecord {
        BumpRunGenerator::new(MockRunConfig {
            run_id: "e2e".to_string(),
            samples: 6000,
            sample_rate: RATE,
            speed: SPEED,
            bump_at_s: 5.0,
            tau,
            gaps,
            ..MockRunConfig::default()
        })
        .generate()
    }

    pub fn signals(run: &RunRecord) -> (Signal, Signal) {
        (
            run.signal("AccelerometerAccelerationY").unwrap(),
            run.signal("AccelerationZ").unwrap(),
        )
    }

    pub fn arg_extreme(values: &[f64], max: bool) -> usize {
        let mut best = 0;
        for (i, v) in values.iter().enumerate() {
            let better = if max {
                *v > values[best]
            } else {
                *v < values[best]
            };
            if better {
                best = i;
            }
        }
        best
    }
}

#[cfg(test)]
mod config_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::SyncConfig;
    use sync_engine::TimeShiftEstimator;

    use crate::support::*;

    #[test]
    fn test_config_round_trip_into_estimator() {
        let mut tuned = SyncConfig::default();
        tuned.filter.cutoff_hz = 40.0;
        tuned.search.tau_max_s = 0.4;
        tuned.search.grid_points = 401;

        let toml = ConfigLoader::to_toml(&tuned).unwrap();
        let loaded = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        assert_eq!(loaded, tuned);

        let json = ConfigLoader::to_json(&tuned).unwrap();
        assert_eq!(
            ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap(),
            tuned
        );

        let estimator = TimeShiftEstimator::new(loaded);
        assert_eq!(estimator.config(), &tuned);

        let (reference, shifted) = signals(&bump_run(0.25, Vec::new()));
        let result = estimator.estimate(&reference, &shifted, SPEED).unwrap();
        assert!((result.tau - 0.25).abs() < 0.01, "tau = {}", result.tau);
    }

    #[test]
    fn test_config_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.toml");
        std::fs::write(&path, "[bump]\nwheelbase_m = 1.1\n").unwrap();

        let config = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(config.bump.wheelbase_m, 1.1);
        assert_eq!(config.search, SyncConfig::default().search);
    }
}

#[cfg(test)]
mod e2e_tests {
    use contracts::{ContractError, Segment, Signal, TauSource};
    use ingestion::{RunLoader, SchemaBuilder};
    use observability::SyncRunAggregator;
    use sync_engine::{GapSegmenter, SyncConfig, TimeShiftEstimator, TruncateAligner};

    use crate::support::*;

    /// End-to-end test: synthetic run -> estimate -> truncate
    ///
    /// 验证完整的数据流：
    /// 1. 生成 NI/VN 两路减速带信号，VN 超前 0.25 s
    /// 2. 估计时间偏移
    /// 3. 截断到公共时间基，两路峰值对齐
    #[test]
    fn test_e2e_bump_scenario() {
        let run = bump_run(0.25, Vec::new());
        let (reference, shifted) = signals(&run);

        let estimator = TimeShiftEstimator::new(SyncConfig::default());
        let result = estimator.estimate(&reference, &shifted, SPEED).unwrap();

        assert!((result.tau - 0.25).abs() < 0.01, "tau = {}", result.tau);
        assert!(result.tau >= 0.0 && result.tau <= 0.5);
        assert!(!result.was_overridden(), "decisions: {:?}", result.decisions);
        assert_eq!(result.source, TauSource::Refined);
        assert!((result.reference_bump.peak as i64 - 1000).abs() <= 2);
        assert!((result.shifted_bump.peak as i64 - 950).abs() <= 2);

        let pair = TruncateAligner::align_pair(&reference, &shifted, result.tau).unwrap();
        // t < 29.995 - tau
        assert!((5945..=5952).contains(&pair.len()), "len = {}", pair.len());
        assert_eq!(pair.reference.len(), pair.aligned.len());

        let ni_peak = arg_extreme(pair.reference.samples(), false);
        let vn_peak = arg_extreme(pair.aligned.samples(), true);
        assert_eq!(vn_peak, 950);
        assert!(
            (ni_peak as i64 - vn_peak as i64).abs() <= 3,
            "NI peak {ni_peak} vs VN peak {vn_peak}"
        );
    }

    #[test]
    fn test_e2e_recovers_range_of_shifts() {
        let estimator = TimeShiftEstimator::new(SyncConfig::default());
        for tau in [0.05, 0.15, 0.4] {
            let (reference, shifted) = signals(&bump_run(tau, Vec::new()));
            let result = estimator.estimate(&reference, &shifted, SPEED).unwrap();
            assert!(
                (result.tau - tau).abs() < 0.01,
                "expected {tau}, got {}",
                result.tau
            );
        }
    }

    #[test]
    fn test_e2e_gaps_away_from_bump() {
        let run = bump_run(0.25, vec![(3000, 3), (5000, 1)]);
        let (reference, shifted) = signals(&run);

        let segments = GapSegmenter::segment(&shifted);
        assert_eq!(
            segments.bounds(),
            vec![(0, 3000), (3000, 3001), (3001, 3002), (3002, 3003), (3003, 5000), (5000, 5001), (5001, 6000)]
        );

        let estimator = TimeShiftEstimator::new(SyncConfig::default());
        let result = estimator.estimate(&reference, &shifted, SPEED).unwrap();
        assert!((result.tau - 0.25).abs() < 0.01, "tau = {}", result.tau);
        assert_eq!(result.segment, Segment::valid(0, 3000));

        let pair = TruncateAligner::align_pair(&reference, &shifted, result.tau).unwrap();
        assert!(pair.aligned.samples()[3000..3003].iter().all(|v| v.is_nan()));
        assert!(pair.reference.samples().iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn test_e2e_gap_around_bump_is_data_quality_error() {
        let run = bump_run(0.25, vec![(900, 1), (1050, 1)]);
        let (reference, shifted) = signals(&run);

        let err = TimeShiftEstimator::new(SyncConfig::default())
            .estimate(&reference, &shifted, SPEED)
            .unwrap_err();
        match err {
            ContractError::DataQuality {
                samples, required, ..
            } => {
                assert_eq!(samples, 149);
                assert_eq!(required, 200);
            }
            other => panic!("expected DataQuality, got {other:?}"),
        }
    }

    #[test]
    fn test_e2e_rejects_mismatched_streams() {
        let (reference, shifted) = signals(&bump_run(0.25, Vec::new()));
        let estimator = TimeShiftEstimator::new(SyncConfig::default());

        let short = shifted.with_samples(shifted.samples()[..5000].to_vec());
        assert!(matches!(
            estimator.estimate(&reference, &short, SPEED),
            Err(ContractError::InvalidLength { .. })
        ));

        let slow = Signal::new(shifted.samples().to_vec(), 100.0, "VN").unwrap();
        assert!(matches!(
            estimator.estimate(&reference, &slow, SPEED),
            Err(ContractError::RateMismatch { .. })
        ));
    }

    #[test]
    fn test_e2e_truncate_rejects_whole_recording_shift() {
        let (reference, _) = signals(&bump_run(0.25, Vec::new()));
        assert!(matches!(
            TruncateAligner::align(&reference, 30.0),
            Err(ContractError::InvalidShift { .. })
        ));
        let unknown = Signal::new(vec![0.0; 10], RATE, "GPS").unwrap();
        assert!(matches!(
            TruncateAligner::align(&unknown, 0.0),
            Err(ContractError::SourceUndefined { .. })
        ));
    }

    /// Simulated runs on disk -> loader -> estimator -> aggregator
    #[test]
    fn test_e2e_run_files_to_summary() {
        let dir = tempfile::tempdir().unwrap();
        for (id, tau) in [("00001", 0.1), ("00002", 0.3)] {
            let mut run = bump_run(tau, Vec::new());
            run.run_id = id.to_string();
            run.write_to(&dir.path().join(format!("{id}.json"))).unwrap();
        }
        let mut broken = bump_run(0.2, vec![(900, 1), (1010, 1)]);
        broken.run_id = "00003".to_string();
        broken.write_to(&dir.path().join("00003.json")).unwrap();

        let loader = RunLoader::new(dir.path());
        let runs = loader.load_all().unwrap();
        assert_eq!(runs.len(), 3);

        let schema = SchemaBuilder::for_run(&loader.latest().unwrap().unwrap()).unwrap();
        assert!(schema.column("AccelerationZ").is_some());
        assert!(schema.column("Speed").is_some());

        let estimator = TimeShiftEstimator::new(SyncConfig::default());
        let mut aggregator = SyncRunAggregator::new();
        for run in &runs {
            let (reference, shifted) = signals(run);
            match estimator.estimate(&reference, &shifted, run.speed().unwrap()) {
                Ok(result) => aggregator.update(&result),
                Err(err) => aggregator.record_failure(&err),
            }
        }

        let summary = aggregator.summary();
        assert_eq!(summary.total_runs, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failure_counts.get("data_quality"), Some(&1));
        assert!((summary.tau_s.mean - 0.2).abs() < 0.01);
    }
}
