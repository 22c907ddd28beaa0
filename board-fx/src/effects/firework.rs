//! Firework：均匀放射的火花，受重力下坠，各自寿命略有差异

use std::f32::consts::TAU;

use super::{EffectContext, EffectDefinition, EffectSchema, SchemaField, update};
use crate::instance::{EffectInstance, Frame};
use crate::scene::{Node, NodeId, Rgba, Scene, SceneError, Shape, Vec2};

const SPARKS: usize = 16;
const LIFE_MS: f32 = 2000.0;

const GRAVITY: f32 = 0.1;
/// 速度倍率（帧单位）
const BOOST: f32 = 2.0;
const SPARK_RADIUS: f32 = 3.0;
const PALETTE: &[u32] = &[0xff4757, 0x3742fa, 0x2ed573, 0xffa502, 0xff6b6b];

const SCHEMA: &[SchemaField] = &[
    SchemaField::number("sparks", SPARKS as f64),
    SchemaField::number("lifeMs", LIFE_MS as f64),
];

pub(crate) const DEFINITION: EffectDefinition = EffectDefinition {
    key: "firework",
    name: "Firework",
    schema: EffectSchema(SCHEMA),
    run,
};

struct Spark {
    node: NodeId,
    velocity: Vec2,
    /// 相对实例寿命的比例
    life: f32,
}

fn run(ctx: &mut EffectContext<'_>) -> Result<EffectInstance, SceneError> {
    let gs = ctx.global_scale();
    let count = ctx.scaling().scale_count(ctx.config().count("sparks", SPARKS));
    let life_ms = ctx.config().life_ms(LIFE_MS);

    let root = ctx.create_root()?;
    let mut sparks = Vec::with_capacity(count);
    for i in 0..count {
        let color = ctx.pick(PALETTE);
        let angle = i as f32 / count as f32 * TAU;
        let speed = ctx.random(1.0, 3.0) * gs;
        let life = ctx.random(0.8, 1.2);
        sparks.push(Spark {
            node: ctx.add(
                root,
                Node::with_shape(Shape::disc(SPARK_RADIUS * gs, Rgba::hex(color))),
            )?,
            velocity: Vec2::from_angle(angle, speed),
            life,
        });
    }

    let gravity = GRAVITY * gs;
    Ok(ctx.finish(root, life_ms, move |scene: &mut Scene, frame: &Frame| {
        let f = frame.frames();
        for spark in &sparks {
            let st = frame.t / spark.life;
            update(scene, spark.node, |node| {
                if st > 1.0 {
                    node.visible = false;
                    return;
                }
                node.position = Vec2::new(
                    BOOST * spark.velocity.x * f,
                    BOOST * spark.velocity.y * f + gravity * f * f,
                );
                node.alpha = (1.0 - st).max(0.0);
                node.scale = (1.0 - st * 0.5).max(0.2);
            });
        }
    }))
}
