//! Spiral：12 个点沿逐渐张开的螺旋旋转

use std::f32::consts::TAU;

use super::{EffectContext, EffectDefinition, EffectSchema, SchemaField, update};
use crate::instance::{EffectInstance, Frame};
use crate::scene::{Node, Rgba, Scene, SceneError, Shape, Vec2};

const TURNS: f32 = 3.0;
const LIFE_MS: f32 = 800.0;
const DOTS: usize = 12;
const DOT_RADIUS: f32 = 4.0;
const REACH: f32 = 50.0;
const COLOR: Rgba = Rgba::hex(0xff6b6b);

const SCHEMA: &[SchemaField] = &[
    SchemaField::number("turns", TURNS as f64),
    SchemaField::number("lifeMs", LIFE_MS as f64),
];

pub(crate) const DEFINITION: EffectDefinition = EffectDefinition {
    key: "spiral",
    name: "Spiral",
    schema: EffectSchema(SCHEMA),
    run,
};

fn run(ctx: &mut EffectContext<'_>) -> Result<EffectInstance, SceneError> {
    let gs = ctx.global_scale();
    let turns = ctx.config().number("turns", TURNS);
    let life_ms = ctx.config().life_ms(LIFE_MS);
    let reach = REACH * gs;

    let root = ctx.create_root()?;
    let mut dots = Vec::with_capacity(DOTS);
    for _ in 0..DOTS {
        dots.push(ctx.add(root, Node::with_shape(Shape::disc(DOT_RADIUS * gs, COLOR)))?);
    }

    Ok(ctx.finish(root, life_ms, move |scene: &mut Scene, frame: &Frame| {
        let t = frame.t;
        for (i, dot) in dots.iter().enumerate() {
            let angle = t * turns * TAU + i as f32 * TAU / DOTS as f32;
            update(scene, *dot, |node| {
                node.position = Vec2::from_angle(angle, t * reach);
                node.alpha = (1.0 - t).max(0.0);
            });
        }
    }))
}
