//! # Headless 模块
//!
//! 不开窗口的命令行功能：列出效果、离线模拟单个效果。

use board_fx::{
    DeviceTier, EffectConfig, EffectRegistry, FRAME_MS, ManualClock, Stage, StageOptions,
    scaling_for,
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, info};

/// 离线模拟错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HeadlessError {
    #[error("未知效果: {0}")]
    UnknownEffect(String),
    #[error("效果生成失败: {0}")]
    SpawnFailed(String),
}

/// `{animations: [{key, name, schema}]}`
pub fn list_effects_json() -> Value {
    json!({ "animations": EffectRegistry::builtin().list() })
}

/// 单帧记录
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FrameSample {
    pub frame: u32,
    pub progress: f32,
    pub draw_items: usize,
}

/// 模拟结果
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub key: String,
    pub lifetime_ms: f32,
    /// 结束时的帧号（运行到上限仍未结束时为 `None`）
    pub finished_at: Option<u32>,
    pub samples: Vec<FrameSample>,
}

/// 模拟参数
#[derive(Debug, Clone)]
pub struct SimulateOptions {
    pub frames: u32,
    pub mobile: bool,
    pub seed: u64,
    pub config: EffectConfig,
}

impl Default for SimulateOptions {
    fn default() -> Self {
        Self {
            frames: 120,
            mobile: false,
            seed: 0,
            config: EffectConfig::new(),
        }
    }
}

/// 以 60fps 的手动时钟运行一个效果
pub fn simulate(key: &str, options: &SimulateOptions) -> Result<SimulationReport, HeadlessError> {
    let def = EffectRegistry::builtin()
        .get(key)
        .ok_or_else(|| HeadlessError::UnknownEffect(key.to_string()))?;

    let tier = if options.mobile {
        DeviceTier::MOBILE
    } else {
        DeviceTier::DESKTOP
    };
    let clock = ManualClock::new();
    let mut stage = Stage::new(
        clock.clone(),
        StageOptions {
            scaling: scaling_for(tier),
            seed: Some(options.seed),
            ..StageOptions::default()
        },
    );
    let id = stage
        .spawn(def, 0.0, 0.0, options.config.clone())
        .ok_or_else(|| HeadlessError::SpawnFailed(key.to_string()))?;
    let lifetime_ms = stage.instance(id).map(|i| i.lifetime_ms()).unwrap_or(0.0);
    info!(key, lifetime_ms, mobile = options.mobile, "开始离线模拟");

    let mut samples = Vec::new();
    let mut finished_at = None;
    for frame in 1..=options.frames {
        clock.advance(FRAME_MS as f64);
        let live = stage.tick();
        let progress = stage.instance(id).map(|i| i.progress()).unwrap_or(1.0);
        let draw_items = stage.scene().draw_list().len();
        debug!(frame, progress, draw_items, "模拟帧");
        samples.push(FrameSample {
            frame,
            progress,
            draw_items,
        });
        if live == 0 {
            finished_at = Some(frame);
            break;
        }
    }

    info!(key, frames = samples.len(), ?finished_at, "离线模拟结束");
    Ok(SimulationReport {
        key: key.to_string(),
        lifetime_ms,
        finished_at,
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_effects_json() {
        let value = list_effects_json();
        let animations = value["animations"].as_array().unwrap();
        assert_eq!(animations.len(), 16);
        assert_eq!(animations[0]["key"], "burst");
        assert_eq!(animations[0]["schema"]["radius"]["default"], 60.0);
        assert!(animations[0].get("run").is_none());
    }

    #[test]
    fn test_simulate_burst_finishes() {
        let report = simulate("burst", &SimulateOptions::default()).unwrap();
        // 600ms ≈ 36 帧
        let end = report.finished_at.unwrap();
        assert!((36..=37).contains(&end));
        assert!(report.samples.windows(2).all(|w| w[0].progress <= w[1].progress));
        assert_eq!(report.samples.last().unwrap().draw_items, 0);
    }

    #[test]
    fn test_simulate_unknown_key() {
        assert_eq!(
            simulate("nope", &SimulateOptions::default()).unwrap_err(),
            HeadlessError::UnknownEffect("nope".to_string())
        );
    }

    #[test]
    fn test_simulate_frame_limit() {
        let options = SimulateOptions {
            frames: 5,
            ..SimulateOptions::default()
        };
        let report = simulate("snowflake", &options).unwrap();
        assert_eq!(report.samples.len(), 5);
        assert!(report.finished_at.is_none());
    }
}
