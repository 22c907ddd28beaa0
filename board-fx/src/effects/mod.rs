//! # Effects 模块
//!
//! 内置效果定义与注册表。
//!
//! ## 效果契约
//!
//! 每个效果的 `run` 在调用时：
//! 1. 在出生点创建唯一的根容器并立即挂到场景根节点下；
//! 2. 按设计填充子节点（数量受设备档位缩放）；
//! 3. 读取 `lifeMs`（缺省用效果自己的默认值），交给 [`EffectInstance`] 计时；
//! 4. 所有绝对尺寸、距离、速度统一乘以 `globalScale`。
//!
//! 效果只读写自己的子树，不接触其他实例或宿主状态。

mod burst;
mod confetti;
mod crystal;
mod firework;
mod flock;
mod flower;
mod galaxy;
mod geometric;
mod lightning;
mod matrix;
mod nebula;
mod plasma;
mod pulse;
mod registry;
mod ripple;
mod spiral;
mod tornado;
mod waves;

pub use registry::{EffectRegistry, EffectSummary};

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::config::{EffectConfig, LIFE_MS_KEY};
use crate::instance::{EffectInstance, Simulation};
use crate::perf::PerfScaling;
use crate::scene::{Node, NodeId, Scene, SceneError, Vec2};

/// 效果入口函数
pub type RunFn = fn(&mut EffectContext<'_>) -> Result<EffectInstance, SceneError>;

/// schema 字段
///
/// 只用于编辑器展示，运行时不做校验。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchemaField {
    pub name: &'static str,
    pub default: f64,
}

impl SchemaField {
    /// 数值字段
    pub const fn number(name: &'static str, default: f64) -> Self {
        Self { name, default }
    }
}

/// 效果参数 schema（有序）
///
/// 序列化为 `{ "<name>": { "type": "number", "default": <v> } }`。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSchema(pub &'static [SchemaField]);

impl EffectSchema {
    pub fn fields(&self) -> &'static [SchemaField] {
        self.0
    }

    /// 字段默认值
    pub fn default_of(&self, name: &str) -> Option<f64> {
        self.0.iter().find(|f| f.name == name).map(|f| f.default)
    }

    /// 寿命默认值
    pub fn default_life_ms(&self) -> Option<f64> {
        self.default_of(LIFE_MS_KEY)
    }
}

impl Serialize for EffectSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct FieldSpec {
            #[serde(rename = "type")]
            kind: &'static str,
            default: f64,
        }

        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in self.0 {
            map.serialize_entry(
                field.name,
                &FieldSpec {
                    kind: "number",
                    default: field.default,
                },
            )?;
        }
        map.end()
    }
}

/// 效果定义
#[derive(Clone, Copy)]
pub struct EffectDefinition {
    /// 注册表 key（区域配置里的 `animationKey`）
    pub key: &'static str,
    /// 展示名
    pub name: &'static str,
    pub schema: EffectSchema,
    pub run: RunFn,
}

impl std::fmt::Debug for EffectDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectDefinition")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// `run` 的输入
///
/// 持有场景的可变借用，只在 `run` 期间存在；返回的
/// [`EffectInstance`] 之后由 `Stage` 逐帧推进。
pub struct EffectContext<'a> {
    scene: &'a mut Scene,
    spawn: Vec2,
    config: &'a EffectConfig,
    scaling: PerfScaling,
    rng: StdRng,
    now_ms: f64,
    root: Option<NodeId>,
}

impl<'a> EffectContext<'a> {
    pub fn new(
        scene: &'a mut Scene,
        spawn: Vec2,
        config: &'a EffectConfig,
        scaling: PerfScaling,
        rng: StdRng,
        now_ms: f64,
    ) -> Self {
        Self {
            scene,
            spawn,
            config,
            scaling,
            rng,
            now_ms,
            root: None,
        }
    }

    pub fn config(&self) -> &EffectConfig {
        self.config
    }

    pub fn scaling(&self) -> PerfScaling {
        self.scaling
    }

    pub fn global_scale(&self) -> f32 {
        self.config.global_scale()
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// 派生一个独立随机源（供模拟阶段使用）
    pub fn fork_rng(&mut self) -> StdRng {
        StdRng::seed_from_u64(self.rng.next_u64())
    }

    /// `[lo, hi)` 区间均匀随机数
    pub fn random(&mut self, lo: f32, hi: f32) -> f32 {
        random_between(&mut self.rng, lo, hi)
    }

    /// 从非空常量表里随机取一项
    pub fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        pick(&mut self.rng, items)
    }

    /// 在出生点创建根容器并挂到场景根节点下
    pub fn create_root(&mut self) -> Result<NodeId, SceneError> {
        let parent = self.scene.root();
        let root = self.scene.attach(
            parent,
            Node::container().at(self.spawn.x, self.spawn.y),
        )?;
        self.root = Some(root);
        Ok(root)
    }

    /// 挂载子节点
    pub fn add(&mut self, parent: NodeId, node: Node) -> Result<NodeId, SceneError> {
        self.scene.attach(parent, node)
    }

    /// 已创建的根容器（`run` 失败时用于回收）
    pub fn created_root(&self) -> Option<NodeId> {
        self.root
    }

    /// 生成实例
    ///
    /// 根容器下没有任何子节点（数量被配置为 0）时寿命记为 0，
    /// 实例在第一帧即结束。
    pub fn finish(
        &self,
        root: NodeId,
        lifetime_ms: f32,
        simulation: impl Simulation + 'static,
    ) -> EffectInstance {
        let lifetime_ms = if self.scene.children(root).is_empty() {
            0.0
        } else {
            lifetime_ms
        };
        EffectInstance::new(root, self.now_ms, lifetime_ms, simulation)
    }
}

/// `[lo, hi)` 区间均匀随机数（`lo == hi` 时返回 `lo`）
pub(crate) fn random_between(rng: &mut StdRng, lo: f32, hi: f32) -> f32 {
    lo + rng.gen_range(0.0f32..1.0) * (hi - lo)
}

/// 从非空常量表里随机取一项
pub(crate) fn pick<T: Copy>(rng: &mut StdRng, items: &[T]) -> T {
    items[rng.gen_range(0..items.len())]
}

/// 修改节点（节点不存在时忽略）
pub(crate) fn update(scene: &mut Scene, id: NodeId, f: impl FnOnce(&mut Node)) {
    if let Some(node) = scene.node_mut(id) {
        f(node);
    }
}
