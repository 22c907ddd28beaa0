//! # Dispatcher 模块
//!
//! 把"第 N 个区域在 (x, y) 被按下"翻译为音频播放 + 效果生成。
//!
//! ## 处理顺序
//!
//! 1. 解析区域配置；
//! 2. 有样本时随机挑一个播放（不依赖渲染表面）；
//! 3. 查找效果定义，未知 key 静默跳过；
//! 4. 渲染表面未就绪时只跳过动画；
//! 5. 以 `animationCfg` 浅覆盖 `globalScale` 后生成实例。
//!
//! 触发路径不返回错误，结果用 [`TriggerOutcome`] 描述。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::config::{BoardConfig, SampleRef};
use crate::effects::EffectRegistry;
use crate::stage::InstanceId;
use crate::surface::SurfaceListener;

/// 音频输出（即发即忘）
pub trait AudioOutput {
    fn play(&mut self, url: &str, gain_db: f32);
}

/// 动画部分的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum EffectOutcome {
    /// 已生成实例
    Spawned(InstanceId),
    /// 区域没有配置动画
    NoAnimation,
    /// 注册表中没有这个 key
    UnknownKey(String),
    /// 渲染表面尚未就绪
    SurfaceNotReady,
    /// Stage 拒绝生成（已拆除、正被占用或构建失败）
    Dropped,
}

/// 一次触发的结果
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerOutcome {
    /// 还没有加载看板
    NoBoard,
    /// 区域索引超出范围
    NoZone(usize),
    /// 已处理
    Handled {
        /// 播放的样本
        sample: Option<SampleRef>,
        effect: EffectOutcome,
    },
}

impl TriggerOutcome {
    /// 生成的实例（如果有）
    pub fn spawned(&self) -> Option<InstanceId> {
        match self {
            TriggerOutcome::Handled {
                effect: EffectOutcome::Spawned(id),
                ..
            } => Some(*id),
            _ => None,
        }
    }
}

/// 触发分发器
pub struct TriggerDispatcher {
    registry: &'static EffectRegistry,
    surface: SurfaceListener,
    board: Option<BoardConfig>,
    audio: Option<Box<dyn AudioOutput>>,
    rng: StdRng,
}

impl std::fmt::Debug for TriggerDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerDispatcher")
            .field("surface", &self.surface)
            .field("zones", &self.board.as_ref().map(|b| b.zones.len()))
            .field("audio", &self.audio.is_some())
            .finish()
    }
}

impl TriggerDispatcher {
    pub fn new(registry: &'static EffectRegistry, surface: SurfaceListener) -> Self {
        Self {
            registry,
            surface,
            board: None,
            audio: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// 挂接音频输出
    pub fn with_audio(mut self, audio: impl AudioOutput + 'static) -> Self {
        self.audio = Some(Box::new(audio));
        self
    }

    /// 固定样本选择的随机种子
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// 替换看板配置（热重载）
    pub fn set_board(&mut self, board: BoardConfig) {
        debug!(zones = board.zones.len(), "看板配置已更新");
        self.board = Some(board);
    }

    pub fn board(&self) -> Option<&BoardConfig> {
        self.board.as_ref()
    }

    pub fn surface_ready(&self) -> bool {
        self.surface.is_ready()
    }

    /// 处理一次触发
    pub fn trigger(&mut self, zone_index: usize, x: f32, y: f32) -> TriggerOutcome {
        let Some(board) = self.board.as_ref() else {
            debug!(zone = zone_index, "看板尚未加载，忽略触发");
            return TriggerOutcome::NoBoard;
        };
        let Some(zone) = board.zone(zone_index) else {
            debug!(zone = zone_index, "区域不存在");
            return TriggerOutcome::NoZone(zone_index);
        };

        let sample = if zone.samples.is_empty() {
            None
        } else {
            Some(zone.samples[self.rng.gen_range(0..zone.samples.len())].clone())
        };
        if let (Some(sample), Some(audio)) = (&sample, self.audio.as_mut()) {
            audio.play(&sample.url, sample.gain_db);
        }

        let effect = if zone.animation_key.is_empty() {
            EffectOutcome::NoAnimation
        } else if let Some(def) = self.registry.get(&zone.animation_key) {
            match self.surface.ready() {
                None => {
                    debug!(zone = zone_index, key = def.key, "渲染表面未就绪，仅播放音频");
                    EffectOutcome::SurfaceNotReady
                }
                Some(handle) => {
                    let config = zone.effect_config(board.effective_global_scale());
                    match handle.try_borrow_mut() {
                        Ok(mut stage) => match stage.spawn(def, x, y, config) {
                            Some(id) => EffectOutcome::Spawned(id),
                            None => EffectOutcome::Dropped,
                        },
                        Err(_) => {
                            debug!(zone = zone_index, "Stage 正被占用，跳过动画");
                            EffectOutcome::Dropped
                        }
                    }
                }
            }
        } else {
            debug!(zone = zone_index, key = %zone.animation_key, "未知动画 key，跳过动画");
            EffectOutcome::UnknownKey(zone.animation_key.clone())
        };

        trace!(zone = zone_index, x, y, ?effect, "触发完成");
        TriggerOutcome::Handled { sample, effect }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::ManualClock;
    use crate::stage::{Stage, StageOptions};
    use crate::surface::SurfaceSlot;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<(String, f32)>>>);

    impl AudioOutput for Recorder {
        fn play(&mut self, url: &str, gain_db: f32) {
            self.0.borrow_mut().push((url.to_string(), gain_db));
        }
    }

    fn board(key: &str) -> BoardConfig {
        BoardConfig::from_json(&format!(
            r#"{{ "zones": [{{ "animationKey": "{key}",
                  "samples": [{{ "url": "a.wav", "gainDb": -6 }}] }}] }}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_no_board() {
        let slot = SurfaceSlot::new();
        let mut d = TriggerDispatcher::new(EffectRegistry::builtin(), slot.subscribe());
        assert_eq!(d.trigger(0, 0.0, 0.0), TriggerOutcome::NoBoard);
    }

    #[test]
    fn test_zone_out_of_range() {
        let slot = SurfaceSlot::new();
        let mut d = TriggerDispatcher::new(EffectRegistry::builtin(), slot.subscribe());
        d.set_board(board("burst"));
        assert_eq!(d.trigger(7, 0.0, 0.0), TriggerOutcome::NoZone(7));
    }

    #[test]
    fn test_audio_plays_without_surface() {
        let slot = SurfaceSlot::new();
        let audio = Recorder::default();
        let mut d = TriggerDispatcher::new(EffectRegistry::builtin(), slot.subscribe())
            .with_audio(audio.clone());
        d.set_board(board("burst"));

        let outcome = d.trigger(0, 10.0, 10.0);
        assert!(matches!(
            outcome,
            TriggerOutcome::Handled {
                effect: EffectOutcome::SurfaceNotReady,
                ..
            }
        ));
        assert_eq!(audio.0.borrow().as_slice(), &[("a.wav".to_string(), -6.0)]);
    }

    #[test]
    fn test_spawns_once_surface_published() {
        let slot = SurfaceSlot::new();
        let mut d = TriggerDispatcher::new(EffectRegistry::builtin(), slot.subscribe());
        d.set_board(board("ripple"));

        let handle = Stage::new(ManualClock::new(), StageOptions::default()).into_handle();
        slot.publish(handle.clone());

        assert!(d.trigger(0, 1.0, 2.0).spawned().is_some());
        assert_eq!(handle.borrow().live_count(), 1);
    }

    #[test]
    fn test_busy_stage_drops_animation() {
        let slot = SurfaceSlot::new();
        let mut d = TriggerDispatcher::new(EffectRegistry::builtin(), slot.subscribe());
        d.set_board(board("burst"));
        let handle = Stage::new(ManualClock::new(), StageOptions::default()).into_handle();
        slot.publish(handle.clone());

        let _guard = handle.borrow();
        assert!(matches!(
            d.trigger(0, 0.0, 0.0),
            TriggerOutcome::Handled {
                effect: EffectOutcome::Dropped,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_key_is_no_animation() {
        let slot = SurfaceSlot::new();
        let mut d = TriggerDispatcher::new(EffectRegistry::builtin(), slot.subscribe());
        d.set_board(board(""));
        assert!(matches!(
            d.trigger(0, 0.0, 0.0),
            TriggerOutcome::Handled {
                effect: EffectOutcome::NoAnimation,
                ..
            }
        ));
    }
}
