//! Geometric：彩色多边形从中心依次飞出到环形目标位置，边转边淡出

use std::f32::consts::TAU;

use super::{EffectContext, EffectDefinition, EffectSchema, SchemaField, update};
use crate::easing::{Easing, fade_tail};
use crate::instance::{EffectInstance, FRAME_MS, Frame};
use crate::scene::{Node, NodeId, Rgba, Scene, SceneError, Shape, Vec2};

const SHAPES: usize = 5;
const LIFE_MS: f32 = 1600.0;

const STAGGER_MS: f32 = 100.0;
const FLY_MS: f32 = 800.0;
const PALETTE: &[u32] = &[0xff6b6b, 0x4ecdc4, 0x45b7d1, 0xf9ca24, 0xf0932b];

const SCHEMA: &[SchemaField] = &[
    SchemaField::number("shapes", SHAPES as f64),
    SchemaField::number("lifeMs", LIFE_MS as f64),
];

pub(crate) const DEFINITION: EffectDefinition = EffectDefinition {
    key: "geometric",
    name: "Geometric",
    schema: EffectSchema(SCHEMA),
    run,
};

#[derive(Debug, Clone, Copy)]
enum Kind {
    Triangle,
    Square,
    Pentagon,
    Hexagon,
}

const KINDS: &[Kind] = &[Kind::Triangle, Kind::Square, Kind::Pentagon, Kind::Hexagon];

impl Kind {
    fn shape(self, size: f32, fill: Rgba) -> Shape {
        match self {
            Kind::Triangle => Shape::Polygon {
                points: vec![
                    Vec2::new(0.0, -size),
                    Vec2::new(-size * 0.866, size * 0.5),
                    Vec2::new(size * 0.866, size * 0.5),
                ],
                fill,
            },
            Kind::Square => Shape::Rect {
                width: size,
                height: size,
                fill,
            },
            Kind::Pentagon => Shape::regular_polygon(5, size, fill),
            Kind::Hexagon => Shape::regular_polygon(6, size, fill),
        }
    }
}

struct Piece {
    node: NodeId,
    target: Vec2,
    delay_ms: f32,
    spin: f32,
}

fn run(ctx: &mut EffectContext<'_>) -> Result<EffectInstance, SceneError> {
    let gs = ctx.global_scale();
    let count = ctx
        .scaling()
        .scale_complexity(ctx.config().count("shapes", SHAPES));
    let life_ms = ctx.config().life_ms(LIFE_MS);
    // 寿命很短时压缩飞行时间，保证能飞到位
    let fly_ms = FLY_MS.min(life_ms * 0.5).max(1.0);

    let root = ctx.create_root()?;
    let mut pieces = Vec::with_capacity(count);
    for i in 0..count {
        let kind = ctx.pick(KINDS);
        let color = Rgba::hex(ctx.pick(PALETTE));
        let size = ctx.random(10.0, 30.0) * gs;
        let angle = i as f32 / count as f32 * TAU;
        let distance = ctx.random(30.0, 60.0) * gs;
        let spin = ctx.random(-0.05, 0.05);

        let node = Node::with_shape(kind.shape(size, color))
            .scaled(0.0)
            .faded(0.0);
        pieces.push(Piece {
            node: ctx.add(root, node)?,
            target: Vec2::from_angle(angle, distance),
            delay_ms: i as f32 * STAGGER_MS,
            spin,
        });
    }

    Ok(ctx.finish(root, life_ms, move |scene: &mut Scene, frame: &Frame| {
        let fade = fade_tail(frame.t, 0.6);
        for piece in &pieces {
            let local_ms = frame.elapsed_ms - piece.delay_ms;
            if local_ms <= 0.0 {
                continue;
            }
            let eased = Easing::OutCubic.apply(local_ms / fly_ms);
            update(scene, piece.node, |node| {
                node.position = piece.target * eased;
                node.scale = eased;
                node.rotation = piece.spin * (local_ms / FRAME_MS);
                node.alpha = eased * fade;
            });
        }
    }))
}
