//! # Stage 模块
//!
//! 一个渲染表面对应一个 `Stage`：共享场景图 + 活跃实例列表 + 时钟。
//!
//! ## 调度
//!
//! 宿主每帧调用一次 [`Stage::tick`]，按插入顺序推进所有实例；
//! 结束的实例在同一帧内移除。没有并行，也没有挂起点。
//!
//! ## 资源上限
//!
//! 活跃实例超过 `max_live_instances` 时，最早的实例先被销毁。

use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info, trace, warn};

use crate::config::EffectConfig;
use crate::effects::{EffectContext, EffectDefinition};
use crate::instance::{Clock, EffectInstance, InstanceStatus};
use crate::perf::PerfScaling;
use crate::scene::{Scene, Vec2};

/// 共享的 Stage 句柄（单线程）
pub type StageHandle = Rc<RefCell<Stage>>;

/// 默认活跃实例上限
pub const DEFAULT_MAX_LIVE_INSTANCES: usize = 64;

/// 实例标识（由 Stage 分配，不复用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 视口尺寸（逻辑像素）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Stage 选项
#[derive(Debug, Clone)]
pub struct StageOptions {
    pub max_live_instances: usize,
    pub scaling: PerfScaling,
    /// 固定随机种子（测试与离线模拟用）
    pub seed: Option<u64>,
    pub viewport: Viewport,
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            max_live_instances: DEFAULT_MAX_LIVE_INSTANCES,
            scaling: PerfScaling::default(),
            seed: None,
            viewport: Viewport::default(),
        }
    }
}

struct LiveInstance {
    id: InstanceId,
    key: &'static str,
    instance: EffectInstance,
}

/// 场景图 + 活跃效果实例
pub struct Stage {
    scene: Scene,
    clock: Box<dyn Clock>,
    live: Vec<LiveInstance>,
    rng: StdRng,
    scaling: PerfScaling,
    max_live: usize,
    next_id: u64,
    viewport: Viewport,
    destroyed: bool,
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("live", &self.live.len())
            .field("nodes", &self.scene.len())
            .field("viewport", &self.viewport)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl Stage {
    pub fn new(clock: impl Clock + 'static, options: StageOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            scene: Scene::new(),
            clock: Box::new(clock),
            live: Vec::new(),
            rng,
            scaling: options.scaling,
            max_live: options.max_live_instances.max(1),
            next_id: 1,
            viewport: options.viewport,
            destroyed: false,
        }
    }

    /// 包装为共享句柄
    pub fn into_handle(self) -> StageHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scaling(&self) -> PerfScaling {
        self.scaling
    }

    /// 更换设备档位（只影响之后生成的实例）
    pub fn set_scaling(&mut self, scaling: PerfScaling) {
        self.scaling = scaling;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// 活跃实例数
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// 按插入顺序的活跃实例 ID
    pub fn instance_ids(&self) -> Vec<InstanceId> {
        self.live.iter().map(|l| l.id).collect()
    }

    pub fn instance(&self, id: InstanceId) -> Option<&EffectInstance> {
        self.live.iter().find(|l| l.id == id).map(|l| &l.instance)
    }

    /// 实例对应的效果 key
    pub fn instance_key(&self, id: InstanceId) -> Option<&'static str> {
        self.live.iter().find(|l| l.id == id).map(|l| l.key)
    }

    /// 在 `(x, y)` 生成一个效果实例
    ///
    /// 已拆除的 Stage 返回 `None`；效果构建失败时回收已创建的节点并返回 `None`。
    pub fn spawn(
        &mut self,
        def: &EffectDefinition,
        x: f32,
        y: f32,
        config: EffectConfig,
    ) -> Option<InstanceId> {
        if self.destroyed {
            debug!(key = def.key, "Stage 已拆除，忽略生成请求");
            return None;
        }

        while self.live.len() >= self.max_live {
            let oldest = self.live.remove(0);
            let mut instance = oldest.instance;
            instance.dispose(&mut self.scene);
            debug!(id = %oldest.id, key = oldest.key, "超过实例上限，提前销毁最早的实例");
        }

        let now = self.clock.now_ms();
        let rng = StdRng::seed_from_u64(self.rng.next_u64());
        let mut ctx = EffectContext::new(
            &mut self.scene,
            Vec2::new(x, y),
            &config,
            self.scaling,
            rng,
            now,
        );

        match (def.run)(&mut ctx) {
            Ok(instance) => {
                let id = InstanceId(self.next_id);
                self.next_id += 1;
                trace!(
                    id = %id,
                    key = def.key,
                    x,
                    y,
                    lifetime_ms = instance.lifetime_ms(),
                    "生成效果实例"
                );
                self.live.push(LiveInstance {
                    id,
                    key: def.key,
                    instance,
                });
                Some(id)
            }
            Err(e) => {
                let leftover = ctx.created_root();
                if let Some(root) = leftover {
                    let _ = self.scene.destroy(root);
                }
                warn!(key = def.key, error = %e, "效果构建失败");
                None
            }
        }
    }

    /// 推进一帧，返回仍在运行的实例数
    pub fn tick(&mut self) -> usize {
        if self.destroyed {
            return 0;
        }
        let now = self.clock.now_ms();
        let scene = &mut self.scene;
        self.live.retain_mut(|live| {
            let running = live.instance.advance(scene, now) == InstanceStatus::Running;
            if !running {
                trace!(id = %live.id, key = live.key, "效果实例结束");
            }
            running
        });
        self.live.len()
    }

    /// 提前销毁指定实例（可重复调用）
    pub fn dispose(&mut self, id: InstanceId) -> bool {
        match self.live.iter().position(|l| l.id == id) {
            Some(index) => {
                let mut live = self.live.remove(index);
                live.instance.dispose(&mut self.scene)
            }
            None => false,
        }
    }

    /// 记录新的视口尺寸
    ///
    /// 实例使用出生点局部坐标，缩放视口不会影响正在播放的效果。
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport { width, height };
    }

    /// 拆除：销毁所有实例与场景内容，之后的生成与推进都被忽略
    pub fn teardown(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        let count = self.live.len();
        for mut live in self.live.drain(..) {
            live.instance.dispose(&mut self.scene);
        }
        let leftover = self.scene.clear();
        info!(instances = count, leftover, "Stage 已拆除");
    }
}
