//! Burst：单个白色圆盘向外扩张并淡出

use super::{EffectContext, EffectDefinition, EffectSchema, SchemaField, update};
use crate::instance::{EffectInstance, Frame};
use crate::scene::{Node, Rgba, Scene, SceneError, Shape};

const RADIUS: f32 = 60.0;
const LIFE_MS: f32 = 600.0;
const START_ALPHA: f32 = 0.8;

const SCHEMA: &[SchemaField] = &[
    SchemaField::number("radius", RADIUS as f64),
    SchemaField::number("lifeMs", LIFE_MS as f64),
];

pub(crate) const DEFINITION: EffectDefinition = EffectDefinition {
    key: "burst",
    name: "Burst",
    schema: EffectSchema(SCHEMA),
    run,
};

fn run(ctx: &mut EffectContext<'_>) -> Result<EffectInstance, SceneError> {
    let gs = ctx.global_scale();
    let radius = ctx.config().number("radius", RADIUS).max(0.0) * gs;
    let life_ms = ctx.config().life_ms(LIFE_MS);

    let root = ctx.create_root()?;
    let disc = ctx.add(
        root,
        Node::with_shape(Shape::disc(radius, Rgba::WHITE)).faded(START_ALPHA),
    )?;

    Ok(ctx.finish(root, life_ms, move |scene: &mut Scene, frame: &Frame| {
        update(scene, disc, |node| {
            node.scale = 1.0 + frame.t;
            node.alpha = (START_ALPHA - frame.t).max(0.0);
        });
    }))
}
