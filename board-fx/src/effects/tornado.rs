//! Tornado：绕竖轴旋转的漏斗状粒子柱，整体缓慢上升并收紧

use std::f32::consts::TAU;

use super::{EffectContext, EffectDefinition, EffectSchema, SchemaField, update};
use crate::instance::{EffectInstance, Frame};
use crate::scene::{Node, NodeId, Rgba, Scene, SceneError, Shape, Vec2};

const PARTICLES: usize = 20;
const LIFE_MS: f32 = 1500.0;

const HEIGHT: f32 = 100.0;
const RISE: f32 = 60.0;
const TOP_RADIUS: f32 = 30.0;
const BASE_RADIUS: f32 = 6.0;
const DOT_RADIUS: f32 = 2.0;
const COLOR: Rgba = Rgba::hex(0x90ee90);

const SCHEMA: &[SchemaField] = &[
    SchemaField::number("particles", PARTICLES as f64),
    SchemaField::number("lifeMs", LIFE_MS as f64),
];

pub(crate) const DEFINITION: EffectDefinition = EffectDefinition {
    key: "tornado",
    name: "Tornado",
    schema: EffectSchema(SCHEMA),
    run,
};

struct Particle {
    node: NodeId,
    /// 0.0（底部）- 1.0（顶部）
    height: f32,
    speed: f32,
    offset: f32,
}

fn run(ctx: &mut EffectContext<'_>) -> Result<EffectInstance, SceneError> {
    let gs = ctx.global_scale();
    let count = ctx
        .scaling()
        .scale_count(ctx.config().count("particles", PARTICLES));
    let life_ms = ctx.config().life_ms(LIFE_MS);

    let root = ctx.create_root()?;
    let mut particles = Vec::with_capacity(count);
    for _ in 0..count {
        let height = ctx.random(0.0, 1.0);
        let speed = ctx.random(0.5, 2.0);
        let offset = ctx.random(0.0, TAU);
        particles.push(Particle {
            node: ctx.add(root, Node::with_shape(Shape::disc(DOT_RADIUS * gs, COLOR)))?,
            height,
            speed,
            offset,
        });
    }

    Ok(ctx.finish(root, life_ms, move |scene: &mut Scene, frame: &Frame| {
        let t = frame.t;
        let tighten = 1.0 - 0.5 * t;
        for p in &particles {
            let angle = t * p.speed * TAU + p.offset;
            // 越高越宽
            let radius = (BASE_RADIUS + (TOP_RADIUS - BASE_RADIUS) * p.height) * gs * tighten;
            let y = -(p.height * HEIGHT + t * RISE) * gs;
            update(scene, p.node, |node| {
                node.position = Vec2::new(angle.cos() * radius, y);
                // 背面的粒子略暗
                node.alpha = (1.0 - t).max(0.0) * (0.65 + 0.35 * angle.sin());
            });
        }
    }))
}
