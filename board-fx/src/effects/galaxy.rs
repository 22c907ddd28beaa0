//! Galaxy：绕金色中心星旋转并逐渐张开的星团，带闪烁

use std::f32::consts::TAU;

use super::{EffectContext, EffectDefinition, EffectSchema, SchemaField, update};
use crate::easing::{fade_tail, phase};
use crate::instance::{EffectInstance, Frame};
use crate::scene::{Node, NodeId, Rgba, Scene, SceneError, Shape, Vec2};

const STARS: usize = 30;
const LIFE_MS: f32 = 2500.0;

/// 角速度系数（弧度 / 帧）
const ANGULAR: f32 = 0.05;
const CORE_RADIUS: f32 = 6.0;
const CORE_COLOR: Rgba = Rgba::hex(0xffd700);

const SCHEMA: &[SchemaField] = &[
    SchemaField::number("stars", STARS as f64),
    SchemaField::number("lifeMs", LIFE_MS as f64),
];

pub(crate) const DEFINITION: EffectDefinition = EffectDefinition {
    key: "galaxy",
    name: "Galaxy",
    schema: EffectSchema(SCHEMA),
    run,
};

struct Star {
    node: NodeId,
    distance: f32,
    angle: f32,
    speed: f32,
    brightness: f32,
}

fn star_color(brightness: f32) -> Rgba {
    if brightness > 0.7 {
        Rgba::WHITE
    } else if brightness > 0.4 {
        Rgba::hex(0x87ceeb)
    } else {
        Rgba::hex(0x4169e1)
    }
}

fn run(ctx: &mut EffectContext<'_>) -> Result<EffectInstance, SceneError> {
    let gs = ctx.global_scale();
    let count = ctx.scaling().scale_count(ctx.config().count("stars", STARS));
    let life_ms = ctx.config().life_ms(LIFE_MS);

    let root = ctx.create_root()?;
    if count == 0 {
        return Ok(ctx.finish(root, life_ms, |_: &mut Scene, _: &Frame| {}));
    }

    let mut stars = Vec::with_capacity(count);
    for _ in 0..count {
        let size = ctx.random(1.0, 4.0) * gs;
        let brightness = ctx.random(0.0, 1.0);
        let star = Star {
            node: ctx.add(
                root,
                Node::with_shape(Shape::disc(size, star_color(brightness))),
            )?,
            distance: ctx.random(10.0, 70.0) * gs,
            angle: ctx.random(0.0, TAU),
            speed: ctx.random(0.3, 1.0),
            brightness,
        };
        stars.push(star);
    }

    let core = ctx.add(
        root,
        Node::with_shape(Shape::disc(CORE_RADIUS * gs, CORE_COLOR)).faded(0.0),
    )?;

    Ok(ctx.finish(root, life_ms, move |scene: &mut Scene, frame: &Frame| {
        let t = frame.t;
        let f = frame.frames();

        // 前 20% 亮起，后 20% 熄灭
        let core_alpha = phase(t, 0.0, 0.2).min(fade_tail(t, 0.8));
        update(scene, core, |node| node.alpha = core_alpha);

        for star in &stars {
            let angle = star.angle + star.speed * ANGULAR * f;
            let radius = star.distance * (0.5 + t * 0.5);
            let twinkle = 0.5 + 0.5 * (frame.elapsed_ms * 0.01 + angle).sin();
            update(scene, star.node, |node| {
                node.position = Vec2::from_angle(angle, radius);
                node.alpha = star.brightness * twinkle * fade_tail(t, 0.7);
            });
        }
    }))
}
