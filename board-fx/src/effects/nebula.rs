//! Nebula（key 为 `snowflake`）：围绕发光核心缓慢公转的星云粒子
//!
//! 每个粒子有随机"深度"，决定缩放与透明度。桌面端叠加两轴漂移与
//! 距离衰减；移动端只保留公转和单一的呼吸正弦。

use std::f32::consts::TAU;

use super::{EffectContext, EffectDefinition, EffectSchema, SchemaField, update};
use crate::easing::fade_tail;
use crate::instance::{EffectInstance, Frame};
use crate::scene::{Node, NodeId, Scene, SceneError, Shape, Vec2};

const DENSITY: usize = 40;
const LIFE_MS: f32 = 4000.0;

const SPREAD: f32 = 80.0;
const DRIFT_X: f32 = 10.0;
const DRIFT_Y: f32 = 8.0;
/// 距离透明度衰减的参考半径
const FALLOFF: f32 = 100.0;
const PALETTE: &[u32] = &[0x4a90e2, 0x7b68ee, 0x9370db, 0xba55d3, 0xda70d6, 0x87ceeb];

const SCHEMA: &[SchemaField] = &[
    SchemaField::number("density", DENSITY as f64),
    SchemaField::number("lifeMs", LIFE_MS as f64),
];

pub(crate) const DEFINITION: EffectDefinition = EffectDefinition {
    key: "snowflake",
    name: "Nebula",
    schema: EffectSchema(SCHEMA),
    run,
};

struct Mote {
    node: NodeId,
    depth: f32,
    orbit_radius: f32,
    /// 弧度 / 帧，深浅两组方向相反
    orbit_speed: f32,
    base_angle: f32,
    phase: f32,
    pulse_speed: f32,
    drift_speed: f32,
    life: f32,
}

impl Mote {
    fn spin_sign(&self) -> f32 {
        if self.depth > 0.5 { 1.0 } else { -1.0 }
    }
}

fn run(ctx: &mut EffectContext<'_>) -> Result<EffectInstance, SceneError> {
    let gs = ctx.global_scale();
    let scaling = ctx.scaling();
    let count = scaling.scale_count(ctx.config().count("density", DENSITY));
    let life_ms = ctx.config().life_ms(LIFE_MS);

    let root = ctx.create_root()?;
    if count == 0 {
        return Ok(ctx.finish(root, life_ms, |_: &mut Scene, _: &Frame| {}));
    }

    let mut motes = Vec::with_capacity(count);
    for _ in 0..count {
        let color = ctx.pick(PALETTE);
        let size = ctx.random(1.0, 5.0) * gs;
        let angle = ctx.random(0.0, TAU);
        let distance = ctx.random(0.0, SPREAD) * gs;
        let depth = ctx.random(0.0, 1.0);
        let direction = if depth > 0.5 { 1.0 } else { -1.0 };
        let orbit_speed = ctx.random(0.5, 2.0) * 0.001 * direction;
        let mote = Mote {
            node: ctx.add(root, Node::with_shape(Shape::glow(size, color, 0.1, 0.7)))?,
            depth,
            orbit_radius: distance * (0.8 + depth * 0.4),
            orbit_speed,
            base_angle: angle,
            phase: ctx.random(0.0, TAU),
            pulse_speed: ctx.random(0.1, 0.4),
            drift_speed: ctx.random(0.2, 0.7),
            life: ctx.random(0.8, 1.2),
        };
        motes.push(mote);
    }

    let center = ctx.add(root, Node::with_shape(Shape::glow(3.0 * gs, 0xffffff, 0.3, 0.8)))?;
    let mobile = scaling.is_mobile();

    Ok(ctx.finish(root, life_ms, move |scene: &mut Scene, frame: &Frame| {
        let t = frame.t;
        let ms = frame.elapsed_ms;
        let f = frame.frames();

        for m in &motes {
            let angle = m.base_angle + m.orbit_speed * f;
            let mut pos = Vec2::from_angle(angle, m.orbit_radius);
            let pulse = 0.7 + 0.5 * (ms * m.pulse_speed * 0.01 + m.phase).sin();
            let depth_factor = 0.3 + m.depth * 0.7;
            let life_alpha = fade_tail(t / m.life, 0.7);

            let alpha = if mobile {
                depth_factor * life_alpha * pulse
            } else {
                pos = pos
                    + Vec2::new(
                        (ms * m.drift_speed * 0.001 + m.phase).sin() * DRIFT_X * gs,
                        (ms * m.drift_speed * 0.001 + m.phase * 1.3).cos() * DRIFT_Y * gs,
                    );
                let distance_alpha = (1.0 - pos.length() / (FALLOFF * gs)).max(0.2);
                depth_factor * distance_alpha * life_alpha * pulse
            };

            update(scene, m.node, |node| {
                node.position = pos;
                node.scale = depth_factor * pulse;
                node.alpha = alpha.clamp(0.0, 1.0);
                node.rotation = 0.005 * f * m.spin_sign();
            });
        }

        update(scene, center, |node| {
            node.scale = 0.8 + 0.4 * (ms * 0.003).sin();
            node.rotation = 0.01 * f;
        });
        update(scene, root, |node| node.alpha = fade_tail(t, 0.8));
    }))
}
