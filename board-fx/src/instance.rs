//! # Instance 模块
//!
//! 效果实例的统一时间轴：记录起始时间与寿命，每帧计算进度 `t`，
//! 在 `t < 1` 时调用效果自己的模拟规则，`t >= 1` 时销毁根容器并停止。
//!
//! 各效果只实现 [`Simulation`]，开始/计时/销毁的簿记集中在这里。

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use tracing::debug;

use crate::scene::{NodeId, Scene};

/// 参考帧时长（毫秒）
///
/// 原本逐帧积分的运动按 60 fps 的"帧单位"换算成时间函数，
/// 使效果与实际帧率无关。
pub const FRAME_MS: f32 = 1000.0 / 60.0;

/// 毫秒时钟
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// 单调时钟（`Instant`）
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// 手动推进的时钟，克隆体共享同一时间
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now_ms: f64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.now.set(self.now.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// 单帧的时间信息
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// 寿命进度（0.0 起，单调不减）
    pub t: f32,
    /// 自实例创建以来的毫秒数
    pub elapsed_ms: f32,
    /// 距上一帧的毫秒数
    pub dt_ms: f32,
}

impl Frame {
    /// 以 60 fps 帧为单位的已用时间
    pub fn frames(&self) -> f32 {
        self.elapsed_ms / FRAME_MS
    }

    /// 以 60 fps 帧为单位的帧间隔
    pub fn dt_frames(&self) -> f32 {
        self.dt_ms / FRAME_MS
    }
}

/// 效果的逐帧模拟规则
///
/// 只允许修改自己创建的节点。
pub trait Simulation {
    fn step(&mut self, scene: &mut Scene, frame: &Frame);
}

impl<F> Simulation for F
where
    F: FnMut(&mut Scene, &Frame),
{
    fn step(&mut self, scene: &mut Scene, frame: &Frame) {
        self(scene, frame)
    }
}

/// 实例推进结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceStatus {
    /// 仍在播放，下一帧继续
    Running,
    /// 已结束并销毁
    Finished,
}

/// 效果实例
pub struct EffectInstance {
    root: NodeId,
    start_ms: f64,
    lifetime_ms: f32,
    last_elapsed: f32,
    progress: f32,
    frames: u32,
    disposed: bool,
    simulation: Box<dyn Simulation>,
}

impl std::fmt::Debug for EffectInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectInstance")
            .field("root", &self.root)
            .field("lifetime_ms", &self.lifetime_ms)
            .field("progress", &self.progress)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl EffectInstance {
    /// 创建实例
    ///
    /// `start_ms` 在调用时捕获一次，此后不再改变。
    pub fn new(
        root: NodeId,
        start_ms: f64,
        lifetime_ms: f32,
        simulation: impl Simulation + 'static,
    ) -> Self {
        Self {
            root,
            start_ms,
            lifetime_ms: lifetime_ms.max(0.0),
            last_elapsed: 0.0,
            progress: 0.0,
            frames: 0,
            disposed: false,
            simulation: Box::new(simulation),
        }
    }

    /// 根容器
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// 寿命（毫秒）
    pub fn lifetime_ms(&self) -> f32 {
        self.lifetime_ms
    }

    /// 最近一帧的进度
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// 已执行的模拟帧数
    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// 推进一帧
    ///
    /// 时钟回拨时沿用上一帧的已用时间，保证 `t` 单调不减。
    pub fn advance(&mut self, scene: &mut Scene, now_ms: f64) -> InstanceStatus {
        if self.disposed {
            return InstanceStatus::Finished;
        }
        if !scene.contains(self.root) {
            // 场景已被整体拆除
            self.disposed = true;
            return InstanceStatus::Finished;
        }

        let elapsed = ((now_ms - self.start_ms) as f32).max(self.last_elapsed);
        let dt = elapsed - self.last_elapsed;
        self.last_elapsed = elapsed;

        let t = if self.lifetime_ms <= 0.0 {
            1.0
        } else {
            elapsed / self.lifetime_ms
        };
        self.progress = t;

        if t >= 1.0 {
            self.dispose(scene);
            return InstanceStatus::Finished;
        }

        self.simulation.step(
            scene,
            &Frame {
                t,
                elapsed_ms: elapsed,
                dt_ms: dt,
            },
        );
        self.frames += 1;
        InstanceStatus::Running
    }

    /// 销毁根容器（可重复调用）
    ///
    /// 返回本次调用是否真正移除了节点。
    pub fn dispose(&mut self, scene: &mut Scene) -> bool {
        if self.disposed {
            return false;
        }
        self.disposed = true;
        match scene.destroy(self.root) {
            Ok(removed) => {
                debug!(root = %self.root, removed, "效果实例已销毁");
                true
            }
            Err(e) => {
                debug!(root = %self.root, error = %e, "效果根容器已不存在，跳过销毁");
                false
            }
        }
    }
}
