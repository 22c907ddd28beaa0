//! Flower：多层花瓣依次绽放，花心随后长出并轻微搏动，末段整体淡出
//!
//! 阶段边界都是寿命的比例：
//! - 花瓣：按序号与层数错开，在 `[delay, delay + 0.5]` 内缓出长大
//! - 花心：`t` 在 `[0.5, 1.0]` 内长大
//! - 淡出：`t > 0.7`

use std::f32::consts::TAU;

use super::{EffectContext, EffectDefinition, EffectSchema, SchemaField, update};
use crate::easing::{Easing, fade_tail, phase};
use crate::instance::{EffectInstance, Frame};
use crate::scene::{Node, NodeId, Rgba, Scene, SceneError, Shape, Vec2};

const PETALS: usize = 8;
const LAYERS: usize = 2;
const LIFE_MS: f32 = 1200.0;

const PETAL_LENGTH: f32 = 30.0;
const CORE_RADIUS: f32 = 8.0;
const CORE_COLOR: Rgba = Rgba::hex(0xffd700);
const LAYER_COLORS: [u32; 3] = [0xff69b4, 0xff8fc7, 0xffb6d9];
const CURVE_SAMPLES: usize = 8;

const SCHEMA: &[SchemaField] = &[
    SchemaField::number("petals", PETALS as f64),
    SchemaField::number("layers", LAYERS as f64),
    SchemaField::number("lifeMs", LIFE_MS as f64),
];

pub(crate) const DEFINITION: EffectDefinition = EffectDefinition {
    key: "flower",
    name: "Flower",
    schema: EffectSchema(SCHEMA),
    run,
};

/// 三次贝塞尔曲线采样（不含起点）
fn cubic(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, out: &mut Vec<Vec2>) {
    for i in 1..=CURVE_SAMPLES {
        let s = i as f32 / CURVE_SAMPLES as f32;
        let u = 1.0 - s;
        out.push(
            p0 * (u * u * u) + p1 * (3.0 * u * u * s) + p2 * (3.0 * u * s * s) + p3 * (s * s * s),
        );
    }
}

/// 沿 +x 方向的花瓣轮廓，长度为 `length`
fn petal_outline(length: f32) -> Vec<Vec2> {
    let k = length / PETAL_LENGTH;
    let p = |x: f32, y: f32| Vec2::new(x * k, y * k);
    let mut points = vec![p(0.0, 0.0)];
    cubic(p(0.0, 0.0), p(10.0, -15.0), p(25.0, -10.0), p(30.0, 0.0), &mut points);
    cubic(p(30.0, 0.0), p(25.0, 10.0), p(10.0, 15.0), p(0.0, 0.0), &mut points);
    points.pop();
    points
}

struct Petal {
    node: NodeId,
    delay: f32,
}

fn run(ctx: &mut EffectContext<'_>) -> Result<EffectInstance, SceneError> {
    let gs = ctx.global_scale();
    let scaling = ctx.scaling();
    let petals = scaling.scale_complexity(ctx.config().count("petals", PETALS));
    let layers = scaling.scale_complexity(ctx.config().count("layers", LAYERS));
    let life_ms = ctx.config().life_ms(LIFE_MS);

    let root = ctx.create_root()?;
    if petals == 0 || layers == 0 {
        return Ok(ctx.finish(root, life_ms, |_: &mut Scene, _: &Frame| {}));
    }

    let mut nodes = Vec::with_capacity(petals * layers);
    // 外层先画，内层叠在上面
    for layer in (0..layers).rev() {
        let length = PETAL_LENGTH * gs * (1.0 - 0.25 * layer as f32).max(0.3);
        let outline = petal_outline(length);
        let fill = Rgba::hex(LAYER_COLORS[layer % LAYER_COLORS.len()]);
        let offset = layer as f32 * TAU / (2 * petals) as f32;
        for i in 0..petals {
            let angle = i as f32 / petals as f32 * TAU + offset;
            let node = Node::with_shape(Shape::Polygon {
                points: outline.clone(),
                fill,
            })
            .rotated(angle)
            .scaled(0.0);
            nodes.push(Petal {
                node: ctx.add(root, node)?,
                delay: 0.4 * i as f32 / petals as f32 + 0.1 * layer as f32,
            });
        }
    }

    let core = ctx.add(
        root,
        Node::with_shape(Shape::disc(CORE_RADIUS * gs, CORE_COLOR)).scaled(0.0),
    )?;

    Ok(ctx.finish(root, life_ms, move |scene: &mut Scene, frame: &Frame| {
        let t = frame.t;
        for petal in &nodes {
            let grow = Easing::OutCubic.apply(phase(t, petal.delay, petal.delay + 0.5));
            update(scene, petal.node, |node| node.scale = grow);
        }

        let beat = 1.0 + 0.08 * (frame.elapsed_ms * 0.012).sin();
        let core_scale = Easing::OutBack.apply(phase(t, 0.5, 1.0)) * beat;
        update(scene, core, |node| node.scale = core_scale);

        update(scene, root, |node| node.alpha = fade_tail(t, 0.7));
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_petal_outline_closed_and_sized() {
        let outline = petal_outline(60.0);
        assert_eq!(outline.len(), 2 * CURVE_SAMPLES);
        let tip = outline.iter().map(|p| p.x).fold(0.0, f32::max);
        assert!((tip - 60.0).abs() < 1e-3);
        assert_eq!(outline[0], Vec2::zero());
    }
}
