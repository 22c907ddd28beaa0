//! Confetti：向上抛出的彩色纸片，受重力下落并旋转

use std::f32::consts::{FRAC_PI_2, PI};

use super::{EffectContext, EffectDefinition, EffectSchema, SchemaField, update};
use crate::instance::{EffectInstance, Frame};
use crate::scene::{Node, NodeId, Rgba, Scene, SceneError, Shape, Vec2};

const COUNT: usize = 20;
const SPREAD: f32 = 80.0;
const LIFE_MS: f32 = 2000.0;

/// 每帧重力加速度（帧单位）
const GRAVITY: f32 = 0.15;
/// 额外的向上初速度
const LIFT: f32 = 3.0;

const PALETTE: &[u32] = &[
    0xff6b6b, 0x4ecdc4, 0x45b7d1, 0xf9ca24, 0xf0932b, 0xeb4d4b, 0x6c5ce7,
];

const SCHEMA: &[SchemaField] = &[
    SchemaField::number("count", COUNT as f64),
    SchemaField::number("spread", SPREAD as f64),
    SchemaField::number("lifeMs", LIFE_MS as f64),
];

pub(crate) const DEFINITION: EffectDefinition = EffectDefinition {
    key: "confetti",
    name: "Confetti",
    schema: EffectSchema(SCHEMA),
    run,
};

struct Piece {
    node: NodeId,
    velocity: Vec2,
    spin: f32,
}

fn run(ctx: &mut EffectContext<'_>) -> Result<EffectInstance, SceneError> {
    let gs = ctx.global_scale();
    let count = ctx.scaling().scale_count(ctx.config().count("count", COUNT));
    // spread 控制抛出速度，默认值时与基准速度一致
    let spread = ctx.config().number("spread", SPREAD).max(0.0) / SPREAD;
    let life_ms = ctx.config().life_ms(LIFE_MS);

    let root = ctx.create_root()?;
    let mut pieces = Vec::with_capacity(count);
    for _ in 0..count {
        let color = ctx.pick(PALETTE);
        let size = ctx.random(3.0, 7.0) * gs;
        let angle = -FRAC_PI_2 + ctx.random(-0.5, 0.5) * PI;
        let speed = ctx.random(2.0, 6.0) * gs * spread;
        let spin = ctx.random(-0.1, 0.1);

        let shape = Shape::Rect {
            width: size,
            height: size,
            fill: Rgba::hex(color),
        };
        pieces.push(Piece {
            node: ctx.add(root, Node::with_shape(shape))?,
            velocity: Vec2::from_angle(angle, speed) - Vec2::new(0.0, LIFT * gs),
            spin,
        });
    }

    let gravity = GRAVITY * gs;
    Ok(ctx.finish(root, life_ms, move |scene: &mut Scene, frame: &Frame| {
        let f = frame.frames();
        for piece in &pieces {
            update(scene, piece.node, |node| {
                node.position = Vec2::new(
                    piece.velocity.x * f,
                    piece.velocity.y * f + 0.5 * gravity * f * f,
                );
                node.rotation = piece.spin * f;
                node.alpha = (1.0 - frame.t).max(0.0);
            });
        }
    }))
}
