//! Mock 运行数据生成器
//!
//! 用于无实车数据的测试：生成一次骑过减速带的合成运行。

use std::collections::BTreeMap;

use contracts::ChannelConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::run::{ChannelRecord, RunRecord};

/// Mock 运行配置
#[derive(Debug, Clone)]
pub struct MockRunConfig {
    /// 运行编号
    pub run_id: String,

    /// 每个通道的采样点数
    pub samples: usize,

    /// 采样率 (Hz)
    pub sample_rate: f64,

    /// 前进速度 (m/s)
    pub speed: f64,

    /// NI 信号中减速带峰值时刻 (s)
    pub bump_at_s: f64,

    /// VN 相对 NI 超前的时间 (s)
    pub tau: f64,

    /// 均匀噪声幅值，相对峰值
    pub noise: f64,

    /// 随机种子
    pub seed: u64,

    /// VN 通道缺失样本区间 `(start, len)`
    pub gaps: Vec<(usize, usize)>,

    /// NI 加速度通道名
    pub reference_channel: String,

    /// VN 加速度通道名
    pub shifted_channel: String,
}

impl Default for MockRunConfig {
    fn default() -> Self {
        let channels = ChannelConfig::default();
        Self {
            run_id: "mock".to_string(),
            samples: 6000,
            sample_rate: 200.0,
            speed: 3.0,
            bump_at_s: 5.0,
            tau: 0.25,
            noise: 0.005,
            seed: 7,
            gaps: Vec::new(),
            reference_channel: channels.reference,
            shifted_channel: channels.shifted,
        }
    }
}

/// 减速带运行生成器
///
/// 两台仪器记录同一冲击：NI 极性相反，VN 超前 `tau` 秒。
#[derive(Debug, Clone)]
pub struct BumpRunGenerator {
    config: MockRunConfig,
}

impl BumpRunGenerator {
    pub fn new(config: MockRunConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MockRunConfig {
        &self.config
    }

    /// 冲击波形：主峰加一个较小的反向回弹
    pub fn bump_shape(t: f64) -> f64 {
        const WIDTH: f64 = 0.03;
        (-(t / WIDTH).powi(2)).exp() - 0.4 * (-((t - 0.1) / WIDTH).powi(2)).exp()
    }

    /// 生成运行数据
    pub fn generate(&self) -> RunRecord {
        let c = &self.config;
        let mut rng = StdRng::seed_from_u64(c.seed);
        let mut noise = || {
            if c.noise > 0.0 {
                rng.random_range(-c.noise..c.noise)
            } else {
                0.0
            }
        };

        let shifted_at = c.bump_at_s - c.tau;
        let mut reference = Vec::with_capacity(c.samples);
        let mut shifted = Vec::with_capacity(c.samples);
        let mut steer = Vec::with_capacity(c.samples);
        for i in 0..c.samples {
            let t = i as f64 / c.sample_rate;
            reference.push(-(Self::bump_shape(t - c.bump_at_s) + noise()));
            shifted.push(Self::bump_shape(t - shifted_at) + noise());
            steer.push(0.05 * (2.0 * std::f64::consts::PI * 0.8 * t).sin());
        }

        for &(start, len) in &c.gaps {
            let end = (start + len).min(shifted.len());
            for v in &mut shifted[start.min(end)..end] {
                *v = f64::NAN;
            }
        }
        debug!(run_id = %c.run_id, samples = c.samples, tau = c.tau, "generated mock run");

        RunRecord {
            run_id: c.run_id.clone(),
            sample_rate: c.sample_rate,
            parameters: BTreeMap::from([
                ("Speed".to_string(), serde_json::json!(c.speed)),
                ("RunID".to_string(), serde_json::json!(c.run_id)),
                ("Environment".to_string(), serde_json::json!("Mock")),
                (
                    "VNavRefFrame".to_string(),
                    serde_json::json!("$VNRRG,09,1,0,0,0,1,0,0,0,1*4C"),
                ),
            ]),
            channels: vec![
                ChannelRecord::new(c.reference_channel.as_str(), "NI", &reference),
                ChannelRecord::new("SteerPotentiometer", "NI", &steer),
                ChannelRecord::new(c.shifted_channel.as_str(), "VN", &shifted),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_run_is_valid() {
        let run = BumpRunGenerator::new(MockRunConfig::default()).generate();
        run.validate().unwrap();
        assert_eq!(run.samples_per_channel(), 6000);
        assert_eq!(run.speed().unwrap(), 3.0);
    }

    #[test]
    fn test_bump_positions_and_polarity() {
        let config = MockRunConfig {
            noise: 0.0,
            ..MockRunConfig::default()
        };
        let run = BumpRunGenerator::new(config).generate();
        let reference = run.channel("AccelerometerAccelerationY").unwrap().values();
        let shifted = run.channel("AccelerationZ").unwrap().values();
        assert!((reference[1000] + 1.0).abs() < 1e-4);
        assert!((shifted[950] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_same_seed_same_run() {
        let a = BumpRunGenerator::new(MockRunConfig::default()).generate();
        let b = BumpRunGenerator::new(MockRunConfig::default()).generate();
        assert_eq!(a, b);
    }

    #[test]
    fn test_gaps_only_touch_vn_channel() {
        let config = MockRunConfig {
            gaps: vec![(3000, 3), (5999, 10)],
            ..MockRunConfig::default()
        };
        let run = BumpRunGenerator::new(config).generate();
        let shifted = run.channel("AccelerationZ").unwrap();
        let missing: Vec<usize> = shifted
            .samples
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_none())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(missing, vec![3000, 3001, 3002, 5999]);
        assert!(run.channels[0].samples.iter().all(Option::is_some));
    }
}
