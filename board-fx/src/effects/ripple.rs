//! Ripple：依次错开出发的同心圆环
//!
//! 第 i 个圆环延迟 `i * lifeMs / (2 * rings)` 出发，各自在 `lifeMs` 内
//! 从 0 扩张到 `maxRadius`。实例总寿命覆盖最后一个圆环。

use super::{EffectContext, EffectDefinition, EffectSchema, SchemaField, update};
use crate::instance::{EffectInstance, Frame};
use crate::scene::{Node, NodeId, Rgba, Scene, SceneError, Shape, StrokeStyle};

const RINGS: usize = 3;
const MAX_RADIUS: f32 = 100.0;
const LIFE_MS: f32 = 1000.0;
const COLOR: Rgba = Rgba::hex(0x00aaff);
const STROKE_WIDTH: f32 = 2.0;

const SCHEMA: &[SchemaField] = &[
    SchemaField::number("rings", RINGS as f64),
    SchemaField::number("maxRadius", MAX_RADIUS as f64),
    SchemaField::number("lifeMs", LIFE_MS as f64),
];

pub(crate) const DEFINITION: EffectDefinition = EffectDefinition {
    key: "ripple",
    name: "Ripple",
    schema: EffectSchema(SCHEMA),
    run,
};

struct Ring {
    node: NodeId,
    delay_ms: f32,
}

fn run(ctx: &mut EffectContext<'_>) -> Result<EffectInstance, SceneError> {
    let gs = ctx.global_scale();
    let scaling = ctx.scaling();
    let rings = scaling.scale_complexity(ctx.config().count("rings", RINGS));
    let max_radius = ctx.config().number("maxRadius", MAX_RADIUS).max(0.0) * gs;
    let ring_life = ctx.config().life_ms(LIFE_MS);
    let stroke = StrokeStyle::new(STROKE_WIDTH * gs, COLOR);

    let root = ctx.create_root()?;
    let stagger = if rings == 0 {
        0.0
    } else {
        ring_life / (2 * rings) as f32
    };

    let mut nodes = Vec::with_capacity(rings);
    for i in 0..rings {
        let mut node = Node::with_shape(Shape::ring(0.0, stroke));
        node.visible = false;
        nodes.push(Ring {
            node: ctx.add(root, node)?,
            delay_ms: i as f32 * stagger,
        });
    }

    let total = ring_life + stagger * rings as f32;
    Ok(ctx.finish(root, total, move |scene: &mut Scene, frame: &Frame| {
        for ring in &nodes {
            let local = frame.elapsed_ms - ring.delay_ms;
            let rt = if ring_life > 0.0 { local / ring_life } else { 1.0 };
            update(scene, ring.node, |node| {
                node.visible = local >= 0.0 && rt <= 1.0;
                if node.visible {
                    node.shape = Shape::ring(rt * max_radius, stroke);
                    node.alpha = (1.0 - rt).max(0.0);
                }
            });
        }
    }))
}
