//! Matrix：沿各自方向流动的符号串
//!
//! 每条流从一个字符集中取字形，流头最亮、向尾部递减；流动期间
//! 周期性地随机替换其中一个字形。`chaos` 控制叠加的摆动幅度。

use std::f32::consts::{PI, TAU};

use rand::Rng;
use rand::rngs::StdRng;

use super::{EffectContext, EffectDefinition, EffectSchema, SchemaField, pick, random_between, update};
use crate::instance::{EffectInstance, FRAME_MS, Frame};
use crate::scene::{Node, NodeId, Rgba, Scene, SceneError, Shape, Vec2};

const DENSITY: usize = 40;
const CHAOS: f32 = 3.0;
const LIFE_MS: f32 = 3500.0;

const CHAR_SETS: &[&str] = &[
    "01",
    "0123456789ABCDEF",
    "αβγδεζηθικλμνξοπρστυφχψω",
    "∀∃∈∉∋∌∩∪∞≠≤≥±∓⊕⊗⊙⊆⊇",
    "░▒▓█▄▀▐▌",
    "←↑→↓↔↕↖↗↘↙",
    "♠♣♥♦♪♫☆★◆◇◈",
];

const PALETTES: &[[u32; 3]] = &[
    [0x00ff00, 0x40ff40, 0x80ff80],
    [0xff0080, 0xff40a0, 0xff80c0],
    [0x00ffff, 0x40ffff, 0x80ffff],
    [0xffff00, 0xffff40, 0xffff80],
    [0xff8000, 0xffa040, 0xffc080],
    [0x8000ff, 0xa040ff, 0xc080ff],
    [0xff0040, 0xff4060, 0xff8090],
];

const SCHEMA: &[SchemaField] = &[
    SchemaField::number("density", DENSITY as f64),
    SchemaField::number("chaos", CHAOS as f64),
    SchemaField::number("lifeMs", LIFE_MS as f64),
];

pub(crate) const DEFINITION: EffectDefinition = EffectDefinition {
    key: "matrix",
    name: "Matrix",
    schema: EffectSchema(SCHEMA),
    run,
};

/// 从字符集随机取一个字形
fn random_glyph(rng: &mut StdRng, set: &str) -> String {
    let glyphs: Vec<char> = set.chars().collect();
    pick(rng, &glyphs).to_string()
}

struct Glyph {
    node: NodeId,
    base: Vec2,
    base_alpha: f32,
    base_rotation: f32,
}

struct Stream {
    glyphs: Vec<Glyph>,
    /// 流动方向（每帧位移，已含速度与缩放）
    flow: Vec2,
    delay_ms: f32,
    rotation_speed: f32,
    pulse_phase: f32,
    color_shift: f32,
    charset: &'static str,
    next_morph_ms: f32,
}

fn run(ctx: &mut EffectContext<'_>) -> Result<EffectInstance, SceneError> {
    let gs = ctx.global_scale();
    let scaling = ctx.scaling();
    let count = scaling.scale_count(ctx.config().count("density", DENSITY));
    let chaos = ctx.config().number("chaos", CHAOS) * gs;
    let life_ms = ctx.config().life_ms(LIFE_MS);

    let root = ctx.create_root()?;
    let mut streams = Vec::with_capacity(count);
    for _ in 0..count {
        let charset = ctx.pick(CHAR_SETS);
        let palette = ctx.pick(PALETTES);
        let length = scaling.scale_complexity(ctx.random(3.0, 15.0) as usize);

        let angle = ctx.random(0.0, TAU);
        let base = Vec2::from_angle(angle, ctx.random(0.0, 60.0) * gs) - Vec2::new(0.0, 80.0 * gs);
        let flow_angle = angle + ctx.random(-0.25, 0.25) * PI;
        let speed = ctx.random(1.0, 5.0) * gs;
        // 偏向下方流动
        let flow = Vec2::new(
            flow_angle.cos() * speed * 0.3,
            (flow_angle.sin().abs() + 0.5) * speed,
        );

        let mut glyphs = Vec::with_capacity(length);
        for j in 0..length {
            let text = random_glyph(ctx.rng(), charset);
            let size = ctx.random(8.0, 16.0) * gs;
            let color = Rgba::hex(palette[j.min(palette.len() - 1)]);
            let pos = Vec2::new(
                base.x + ctx.random(-4.0, 4.0) * gs,
                base.y - j as f32 * ctx.random(10.0, 18.0) * gs,
            );
            let base_alpha = if j == 0 { 1.0 } else { (1.0 - j as f32 * 0.1).max(0.2) };
            let base_rotation = ctx.random(-0.15, 0.15);
            let node = Node::with_shape(Shape::Glyph { text, size, color })
                .at(pos.x, pos.y)
                .faded(base_alpha)
                .rotated(base_rotation);
            glyphs.push(Glyph {
                node: ctx.add(root, node)?,
                base: pos,
                base_alpha,
                base_rotation,
            });
        }

        let delay_ms = ctx.random(0.0, 800.0);
        streams.push(Stream {
            glyphs,
            flow,
            delay_ms,
            rotation_speed: ctx.random(-0.01, 0.01),
            pulse_phase: ctx.random(0.0, TAU),
            color_shift: ctx.random(0.0, TAU),
            charset,
            next_morph_ms: delay_ms + ctx.random(300.0, 800.0),
        });
    }

    let mut rng = ctx.fork_rng();
    Ok(ctx.finish(root, life_ms, move |scene: &mut Scene, frame: &Frame| {
        let t = frame.t;
        let ms = frame.elapsed_ms;

        for (si, stream) in streams.iter_mut().enumerate() {
            let active = ((ms - stream.delay_ms) / FRAME_MS).max(0.0);
            let fade_start = 0.6 + (si % 5) as f32 * 0.05;
            let fade = if t > fade_start {
                (1.0 - (t - fade_start) / (1.0 - fade_start) * 1.2).max(0.1)
            } else {
                1.0
            };

            for (ci, glyph) in stream.glyphs.iter().enumerate() {
                let k = ci as f32;
                let sway = Vec2::new(
                    (ms * 0.003 + k + si as f32).sin() * chaos * 0.5,
                    (ms * 0.002 + k).cos() * chaos * 0.3,
                );
                let shimmer = if ci < 3 {
                    0.6 + 0.4 * ((ms * 0.001 + stream.color_shift + k).sin() * 0.5 + 0.5)
                } else {
                    1.0
                };
                let pos = glyph.base + stream.flow * active + sway;
                update(scene, glyph.node, |node| {
                    node.position = pos;
                    node.rotation = glyph.base_rotation + stream.rotation_speed * active;
                    node.scale = 0.8 + 0.3 * (ms * 0.004 + stream.pulse_phase + k).sin();
                    node.alpha = glyph.base_alpha * shimmer * fade;
                });
            }

            if ms >= stream.next_morph_ms && !stream.glyphs.is_empty() {
                stream.next_morph_ms = ms + random_between(&mut rng, 300.0, 800.0);
                let index = rng.gen_range(0..stream.glyphs.len());
                let text = random_glyph(&mut rng, stream.charset);
                update(scene, stream.glyphs[index].node, |node| {
                    if let Shape::Glyph { text: current, .. } = &mut node.shape {
                        *current = text;
                    }
                });
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_random_glyph_from_set() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let g = random_glyph(&mut rng, "αβγ");
            assert!("αβγ".contains(g.as_str()));
            assert_eq!(g.chars().count(), 1);
        }
    }
}
