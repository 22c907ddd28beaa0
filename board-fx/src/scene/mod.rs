//! # Scene 模块
//!
//! 保留模式场景图。所有效果实例共享同一棵树，但每个实例只拥有
//! 自己挂在根节点下的那棵子树。
//!
//! ## 核心概念
//!
//! - `NodeId`: 场景分配的节点标识，不会复用
//! - `Node`: 局部变换 + 透明度 + 图元
//! - `Scene`: 节点仓库，负责父子关系、递归销毁与绘制顺序
//!
//! 绘制顺序即插入顺序（深度优先），后挂载的子树绘制在上层。

mod shape;
mod transform;

pub use shape::{Rgba, Shape, StrokeStyle};
pub use transform::{Affine, Vec2};

use std::collections::HashMap;
use thiserror::Error;

/// 节点唯一标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// 场景图错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// 节点不存在（已被销毁或从未创建）
    #[error("节点不存在: {0}")]
    NodeNotFound(NodeId),

    /// 试图销毁根节点
    #[error("不能销毁场景根节点")]
    RootRemoval,
}

/// 场景节点
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// 相对父节点的位置
    pub position: Vec2,
    /// 均匀缩放
    pub scale: f32,
    /// 旋转（弧度）
    pub rotation: f32,
    /// 透明度，会与父节点相乘
    pub alpha: f32,
    pub visible: bool,
    pub shape: Shape,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            position: Vec2::zero(),
            scale: 1.0,
            rotation: 0.0,
            alpha: 1.0,
            visible: true,
            shape: Shape::Empty,
            parent: None,
            children: Vec::new(),
        }
    }
}

impl Node {
    /// 纯容器节点
    pub fn container() -> Self {
        Self::default()
    }

    /// 带图元的节点
    pub fn with_shape(shape: Shape) -> Self {
        Self {
            shape,
            ..Self::default()
        }
    }

    /// 设置位置
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = Vec2::new(x, y);
        self
    }

    /// 设置初始缩放
    pub fn scaled(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// 设置初始透明度
    pub fn faded(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// 设置初始旋转
    pub fn rotated(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// 父节点
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// 局部变换
    pub fn local_transform(&self) -> Affine {
        Affine::new(self.position, self.scale, self.rotation)
    }
}

/// 绘制项
///
/// `Scene::draw_list` 的输出：已组合的世界变换与累计透明度。
#[derive(Debug, Clone)]
pub struct DrawItem<'a> {
    pub id: NodeId,
    pub transform: Affine,
    pub alpha: f32,
    pub shape: &'a Shape,
}

/// 场景图
#[derive(Debug)]
pub struct Scene {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    next_id: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// 创建只有根节点的场景
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(root, Node::container());
        Self {
            nodes,
            root,
            next_id: 1,
        }
    }

    /// 根节点
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// 节点总数（含根节点）
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// 是否只剩根节点
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// 子节点列表（节点不存在时为空）
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// 挂载新节点到 `parent` 末尾
    pub fn attach(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId, SceneError> {
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::NodeNotFound(parent));
        }

        let id = NodeId(self.next_id);
        self.next_id += 1;

        node.parent = Some(parent);
        node.children.clear();
        self.nodes.insert(id, node);

        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        Ok(id)
    }

    /// 递归销毁节点及其子树
    ///
    /// 返回被移除的节点数。
    pub fn destroy(&mut self, id: NodeId) -> Result<usize, SceneError> {
        if id == self.root {
            return Err(SceneError::RootRemoval);
        }
        let parent = self
            .nodes
            .get(&id)
            .ok_or(SceneError::NodeNotFound(id))?
            .parent;

        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != id);
        }

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// 销毁根节点下的所有子树
    pub fn clear(&mut self) -> usize {
        let top: Vec<NodeId> = self.children(self.root).to_vec();
        top.into_iter()
            .filter_map(|id| self.destroy(id).ok())
            .sum()
    }

    /// 节点的世界变换
    pub fn world_transform(&self, id: NodeId) -> Option<Affine> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(cid) = current {
            let node = self.nodes.get(&cid)?;
            chain.push(node.local_transform());
            current = node.parent;
        }
        Some(
            chain
                .iter()
                .rev()
                .fold(Affine::identity(), |acc, local| acc.then(local)),
        )
    }

    /// 深度优先的绘制列表
    ///
    /// 跳过不可见或累计透明度为 0 的子树。
    pub fn draw_list(&self) -> Vec<DrawItem<'_>> {
        let mut out = Vec::new();
        self.collect(self.root, Affine::identity(), 1.0, &mut out);
        out
    }

    fn collect<'a>(&'a self, id: NodeId, parent: Affine, alpha: f32, out: &mut Vec<DrawItem<'a>>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let alpha = alpha * node.alpha.clamp(0.0, 1.0);
        if !node.visible || alpha <= 0.0 {
            return;
        }
        let transform = parent.then(&node.local_transform());
        if !matches!(node.shape, Shape::Empty) {
            out.push(DrawItem {
                id,
                transform,
                alpha,
                shape: &node.shape,
            });
        }
        for child in &node.children {
            self.collect(*child, transform, alpha, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot() -> Node {
        Node::with_shape(Shape::disc(2.0, Rgba::WHITE))
    }

    #[test]
    fn test_attach_and_children_order() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.attach(root, Node::container()).unwrap();
        let b = scene.attach(root, Node::container()).unwrap();

        assert_eq!(scene.children(root), &[a, b]);
        assert_eq!(scene.node(a).unwrap().parent(), Some(root));
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn test_attach_to_missing_parent() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.attach(root, Node::container()).unwrap();
        scene.destroy(a).unwrap();

        assert_eq!(
            scene.attach(a, Node::container()),
            Err(SceneError::NodeNotFound(a))
        );
    }

    #[test]
    fn test_destroy_is_recursive() {
        let mut scene = Scene::new();
        let root = scene.root();
        let c = scene.attach(root, Node::container()).unwrap();
        let child = scene.attach(c, dot()).unwrap();
        scene.attach(child, dot()).unwrap();

        assert_eq!(scene.destroy(c), Ok(3));
        assert!(scene.is_empty());
        assert!(scene.children(root).is_empty());
    }

    #[test]
    fn test_destroy_twice_reports_missing() {
        let mut scene = Scene::new();
        let root = scene.root();
        let c = scene.attach(root, Node::container()).unwrap();

        assert!(scene.destroy(c).is_ok());
        assert_eq!(scene.destroy(c), Err(SceneError::NodeNotFound(c)));
    }

    #[test]
    fn test_root_cannot_be_destroyed() {
        let mut scene = Scene::new();
        let root = scene.root();
        assert_eq!(scene.destroy(root), Err(SceneError::RootRemoval));
    }

    #[test]
    fn test_clear_keeps_root() {
        let mut scene = Scene::new();
        let root = scene.root();
        for _ in 0..3 {
            let c = scene.attach(root, Node::container()).unwrap();
            scene.attach(c, dot()).unwrap();
        }
        assert_eq!(scene.clear(), 6);
        assert!(scene.contains(root));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_world_transform_chain() {
        let mut scene = Scene::new();
        let root = scene.root();
        let c = scene
            .attach(root, Node::container().at(100.0, 100.0))
            .unwrap();
        let p = scene.attach(c, dot().at(10.0, -5.0).scaled(2.0)).unwrap();

        let world = scene.world_transform(p).unwrap();
        assert_eq!(world.translation, Vec2::new(110.0, 95.0));
        assert_eq!(world.scale, 2.0);
    }

    #[test]
    fn test_draw_list_alpha_and_visibility() {
        let mut scene = Scene::new();
        let root = scene.root();
        let c = scene.attach(root, Node::container().faded(0.5)).unwrap();
        let visible = scene.attach(c, dot().faded(0.5)).unwrap();
        let hidden = scene.attach(c, dot()).unwrap();
        scene.node_mut(hidden).unwrap().visible = false;
        scene.attach(c, dot().faded(0.0)).unwrap();

        let list = scene.draw_list();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, visible);
        assert!((list[0].alpha - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_draw_list_insertion_order() {
        let mut scene = Scene::new();
        let root = scene.root();
        let first = scene.attach(root, dot()).unwrap();
        let second = scene.attach(root, dot()).unwrap();

        let ids: Vec<NodeId> = scene.draw_list().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![first, second]);
    }
}
