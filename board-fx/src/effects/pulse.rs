//! Pulse：每隔 200 ms 发出一个圆环，放大到三倍后消失

use super::{EffectContext, EffectDefinition, EffectSchema, SchemaField, update};
use crate::instance::{EffectInstance, Frame};
use crate::scene::{Node, NodeId, Rgba, Scene, SceneError, Shape, StrokeStyle};

const RINGS: usize = 4;
const LIFE_MS: f32 = 1000.0;
const RING_DELAY_MS: f32 = 200.0;
const RING_RADIUS: f32 = 30.0;
const STROKE_WIDTH: f32 = 3.0;
const COLOR: Rgba = Rgba::hex(0x4ecdc4);

const SCHEMA: &[SchemaField] = &[
    SchemaField::number("rings", RINGS as f64),
    SchemaField::number("lifeMs", LIFE_MS as f64),
];

pub(crate) const DEFINITION: EffectDefinition = EffectDefinition {
    key: "pulse",
    name: "Pulse",
    schema: EffectSchema(SCHEMA),
    run,
};

fn run(ctx: &mut EffectContext<'_>) -> Result<EffectInstance, SceneError> {
    let gs = ctx.global_scale();
    let rings = ctx.scaling().scale_complexity(ctx.config().count("rings", RINGS));
    let ring_life = ctx.config().life_ms(LIFE_MS);
    let stroke = StrokeStyle::new(STROKE_WIDTH * gs, COLOR);

    let root = ctx.create_root()?;
    let mut nodes: Vec<(NodeId, f32)> = Vec::with_capacity(rings);
    for i in 0..rings {
        let mut node = Node::with_shape(Shape::ring(RING_RADIUS * gs, stroke));
        node.visible = false;
        nodes.push((ctx.add(root, node)?, i as f32 * RING_DELAY_MS));
    }

    let last_delay = rings.saturating_sub(1) as f32 * RING_DELAY_MS;
    Ok(ctx.finish(
        root,
        ring_life + last_delay,
        move |scene: &mut Scene, frame: &Frame| {
            for &(id, delay) in &nodes {
                let rt = if ring_life > 0.0 {
                    (frame.elapsed_ms - delay) / ring_life
                } else {
                    1.0
                };
                update(scene, id, |node| {
                    node.visible = rt > 0.0 && rt <= 1.0;
                    node.scale = 1.0 + rt.clamp(0.0, 1.0) * 2.0;
                    node.alpha = (1.0 - rt).clamp(0.0, 1.0);
                });
            }
        },
    ))
}
