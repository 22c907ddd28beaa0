//! # Crystal
//!
//! 多阶段晶体：
//! 1. 核心成形：`t < 0.3` 星形核心缓出长大并带能量搏动；
//! 2. 晶面生长：各晶面按层与序号错开出现，在 `0.4 * lifeMs` 内长成，
//!    之后保持轻微振荡；
//! 3. 碎裂：每个晶面有自己的碎裂阈值（寿命的 0.6 - 0.9），越过后沿随机方向
//!    加速飞散、旋转、缩小并淡出；
//! 4. 核心在 `t > 0.75` 后淡出。
//!
//! 所有阈值都是寿命比例，与帧率无关。

use std::f32::consts::TAU;

use super::{EffectContext, EffectDefinition, EffectSchema, SchemaField, update};
use crate::easing::{Easing, fade_tail, phase};
use crate::instance::{EffectInstance, FRAME_MS, Frame};
use crate::scene::{Node, NodeId, Rgba, Scene, SceneError, Shape, Vec2};

const COMPLEXITY: usize = 16;
const LAYERS: usize = 3;
const LIFE_MS: f32 = 4200.0;

const CORE_PHASE_END: f32 = 0.3;
const GROWTH_SHARE: f32 = 0.4;
const LAYER_DELAY_MS: f32 = 150.0;
const FACE_DELAY_MS: f32 = 40.0;
/// 碎裂飞散距离系数
const SCATTER: f32 = 90.0;
const PALETTE: &[u32] = &[0x87ceeb, 0x4682b4, 0x6495ed, 0x9370db, 0x8a2be2, 0xb19cd9];

const SCHEMA: &[SchemaField] = &[
    SchemaField::number("complexity", COMPLEXITY as f64),
    SchemaField::number("layers", LAYERS as f64),
    SchemaField::number("lifeMs", LIFE_MS as f64),
];

pub(crate) const DEFINITION: EffectDefinition = EffectDefinition {
    key: "crystal",
    name: "Crystal",
    schema: EffectSchema(SCHEMA),
    run,
};

struct Face {
    node: NodeId,
    base: Vec2,
    spin: f32,
    pulse_phase: f32,
    pulse_speed: f32,
    growth_delay_ms: f32,
    peak_alpha: f32,
    shatter_at: f32,
    scatter: Vec2,
}

impl Face {
    fn pulse(&self, ms: f32) -> f32 {
        0.9 + 0.2 * (ms * self.pulse_speed * 0.001 + self.pulse_phase).sin()
    }
}

fn crystal_face(size: f32, color: u32) -> Shape {
    Shape::Layers(vec![
        Shape::regular_polygon(6, size, Rgba::hex(color).with_alpha(0.8)),
        Shape::regular_polygon(6, size * 0.7, Rgba::WHITE.with_alpha(0.4)),
    ])
}

fn run(ctx: &mut EffectContext<'_>) -> Result<EffectInstance, SceneError> {
    let gs = ctx.global_scale();
    let scaling = ctx.scaling();
    let complexity = scaling.scale_complexity(ctx.config().count("complexity", COMPLEXITY));
    let layers = scaling.scale_complexity(ctx.config().count("layers", LAYERS));
    let life_ms = ctx.config().life_ms(LIFE_MS);

    let root = ctx.create_root()?;
    if complexity == 0 || layers == 0 {
        return Ok(ctx.finish(root, life_ms, |_: &mut Scene, _: &Frame| {}));
    }

    let mut faces = Vec::new();
    for layer in 0..layers {
        let per_layer = complexity / layers + layer * 2;
        let ring = (15.0 + layer as f32 * 25.0) * gs;
        for i in 0..per_layer {
            let color = ctx.pick(PALETTE);
            let size = ctx.random(8.0, 20.0) * gs;
            let angle = i as f32 / per_layer as f32 * TAU;
            let radius = ring + ctx.random(-5.0, 5.0) * gs;
            let base = Vec2::from_angle(angle, radius);

            let node = Node::with_shape(crystal_face(size, color))
                .at(base.x, base.y)
                .scaled(0.0)
                .faded(0.0);
            let face = Face {
                node: ctx.add(root, node)?,
                base,
                spin: ctx.random(-0.01, 0.01),
                pulse_phase: ctx.random(0.0, TAU),
                pulse_speed: ctx.random(0.5, 2.0),
                growth_delay_ms: layer as f32 * LAYER_DELAY_MS + i as f32 * FACE_DELAY_MS,
                peak_alpha: 0.8 - layer as f32 * 0.1,
                shatter_at: ctx.random(0.6, 0.9),
                scatter: Vec2::new(ctx.random(-1.0, 1.0), ctx.random(-1.0, 1.0)) * gs,
            };
            faces.push(face);
        }
    }

    let core_shape = Shape::Layers(vec![
        Shape::star(8, 6.0 * gs, 12.0 * gs, Rgba::WHITE.with_alpha(0.9)),
        Shape::disc(4.0 * gs, Rgba::WHITE.with_alpha(0.6)),
    ]);
    let core = ctx.add(root, Node::with_shape(core_shape).scaled(0.0))?;
    let growth_ms = (life_ms * GROWTH_SHARE).max(1.0);

    Ok(ctx.finish(root, life_ms, move |scene: &mut Scene, frame: &Frame| {
        let t = frame.t;
        let ms = frame.elapsed_ms;
        let f = frame.frames();

        let formed = Easing::OutCubic.apply(phase(t, 0.0, CORE_PHASE_END));
        let energy = 1.0 + 0.3 * (ms * 0.008).sin();
        update(scene, core, |node| {
            node.scale = formed * energy;
            // 只在成形阶段旋转
            node.rotation = 0.02 * f.min(CORE_PHASE_END * life_ms / FRAME_MS);
            node.alpha = fade_tail(t, 0.75);
        });

        for face in &faces {
            let local_ms = ms - face.growth_delay_ms;
            if local_ms <= 0.0 {
                continue;
            }
            let grown = Easing::OutQuad.apply(local_ms / growth_ms);
            let oscillation = (ms * 0.002 + face.pulse_phase).sin() * 3.0 * gs;
            let spin = face.spin * (local_ms / FRAME_MS);

            if t <= face.shatter_at {
                update(scene, face.node, |node| {
                    node.position = face.base + Vec2::new(oscillation, oscillation * 0.6);
                    node.scale = grown * face.pulse(ms);
                    node.alpha = face.peak_alpha * grown;
                    node.rotation = spin;
                });
            } else {
                let s = phase(t, face.shatter_at, 1.0);
                update(scene, face.node, |node| {
                    node.position = face.base + face.scatter * (SCATTER * s * s);
                    node.scale = (1.0 - s * 0.7) * face.pulse(ms);
                    node.alpha = face.peak_alpha * grown * (1.0 - s.powf(1.5)).max(0.0);
                    node.rotation = spin + s * s * 3.0;
                });
            }
        }
    }))
}
