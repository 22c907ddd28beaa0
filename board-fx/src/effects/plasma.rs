//! Plasma：绕中心公转并径向摆动的发光能量球

use std::f32::consts::TAU;

use super::{EffectContext, EffectDefinition, EffectSchema, SchemaField, update};
use crate::easing::fade_tail;
use crate::instance::{EffectInstance, Frame};
use crate::scene::{Node, NodeId, Scene, SceneError, Shape, Vec2};

const ORBS: usize = 12;
const LIFE_MS: f32 = 2200.0;

const WOBBLE: f32 = 15.0;
const REACH: f32 = 50.0;
const COLORS: [u32; 4] = [0xff0080, 0x8000ff, 0x0080ff, 0x00ff80];

const SCHEMA: &[SchemaField] = &[
    SchemaField::number("orbs", ORBS as f64),
    SchemaField::number("lifeMs", LIFE_MS as f64),
];

pub(crate) const DEFINITION: EffectDefinition = EffectDefinition {
    key: "plasma",
    name: "Plasma",
    schema: EffectSchema(SCHEMA),
    run,
};

struct Orb {
    node: NodeId,
    base_angle: f32,
    distance: f32,
    speed: f32,
    phase: f32,
    /// 摆动角频率（弧度 / 毫秒）
    wobble_speed: f32,
}

fn run(ctx: &mut EffectContext<'_>) -> Result<EffectInstance, SceneError> {
    let gs = ctx.global_scale();
    let count = ctx.scaling().scale_count(ctx.config().count("orbs", ORBS));
    let life_ms = ctx.config().life_ms(LIFE_MS);
    let wobble = WOBBLE * gs;

    let root = ctx.create_root()?;
    let mut orbs = Vec::with_capacity(count);
    for i in 0..count {
        let size = ctx.random(3.0, 11.0) * gs;
        let color = COLORS[i % COLORS.len()];
        let orb = Orb {
            node: ctx.add(root, Node::with_shape(Shape::glow(size, color, 0.1, 0.8)))?,
            base_angle: i as f32 / count as f32 * TAU,
            distance: ctx.random(0.0, REACH) * gs,
            speed: ctx.random(0.5, 2.0),
            phase: ctx.random(0.0, TAU),
            wobble_speed: ctx.random(0.02, 0.05),
        };
        orbs.push(orb);
    }

    Ok(ctx.finish(root, life_ms, move |scene: &mut Scene, frame: &Frame| {
        let ms = frame.elapsed_ms;
        let fade = fade_tail(frame.t, 0.7);
        for (i, orb) in orbs.iter().enumerate() {
            let angle = orb.base_angle + ms * 0.001 * orb.speed;
            let distance = orb.distance + (ms * orb.wobble_speed + orb.phase).sin() * wobble;
            let energy = 0.6 + 0.4 * (ms * 0.003 + i as f32).sin();
            update(scene, orb.node, |node| {
                node.position = Vec2::from_angle(angle, distance);
                node.scale = 0.8 + 0.4 * (ms * 0.005 + orb.phase).sin();
                node.alpha = energy * fade;
            });
        }
    }))
}
