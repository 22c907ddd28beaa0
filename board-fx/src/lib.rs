//! # Board FX
//!
//! 音效板的实时动画引擎。
//!
//! ## 架构概述
//!
//! `board-fx` 不依赖窗口、GPU 或音频后端。宿主负责：
//!
//! - 创建 [`Stage`] 并在渲染表面就绪后通过 [`SurfaceSlot`] 发布；
//! - 把点击翻译为 [`TriggerDispatcher::trigger`]；
//! - 每帧调用 [`Stage::tick`]，再把 [`Scene::draw_list`] 画出来。
//!
//! ```text
//! Host                               board-fx
//!   │── trigger(zone, x, y) ────────►│ Dispatcher ──► AudioOutput
//!   │                                │      └──► Stage::spawn ──► Effect::run
//!   │── tick() ─────────────────────►│ EffectInstance::advance × N
//!   │◄── draw_list() ────────────────│ Scene
//! ```
//!
//! ## 模块结构
//!
//! - [`scene`]：保留模式场景图与形状
//! - [`instance`]：时钟、帧参数与效果实例生命周期
//! - [`effects`]：16 个内置效果与注册表
//! - [`stage`]：活跃实例调度
//! - [`surface`]：渲染表面就绪通道
//! - [`dispatcher`]：区域触发分发
//! - [`config`]：看板与效果配置
//! - [`perf`]：设备档位与降级缩放
//! - [`easing`]：缓动曲线

pub mod config;
pub mod dispatcher;
pub mod easing;
pub mod effects;
pub mod instance;
pub mod perf;
pub mod scene;
pub mod stage;
pub mod surface;

pub use config::{BoardConfig, BoardError, EffectConfig, SampleRef, ZoneConfig};
pub use dispatcher::{AudioOutput, EffectOutcome, TriggerDispatcher, TriggerOutcome};
pub use effects::{EffectDefinition, EffectRegistry, EffectSummary};
pub use instance::{Clock, EffectInstance, FRAME_MS, Frame, ManualClock, MonotonicClock};
pub use perf::{DeviceTier, PerfScaling, TierProbe, detect_tier, scaling_for};
pub use scene::{DrawItem, Node, NodeId, Rgba, Scene, SceneError, Shape, Vec2};
pub use stage::{InstanceId, Stage, StageHandle, StageOptions};
pub use surface::{SurfaceListener, SurfaceSlot};
