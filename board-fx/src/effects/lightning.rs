//! Lightning：放射状的锯齿闪电 + 一群电火花
//!
//! 闪电本体在寿命前半段闪烁淡出。火花在桌面端按群聚规则运动，
//! 移动端只做匀速漂移。

use std::f32::consts::{FRAC_PI_2, TAU};

use super::flock::{self, Boid, FlockParams};
use super::{EffectContext, EffectDefinition, EffectSchema, SchemaField, update};
use crate::instance::{EffectInstance, Frame};
use crate::scene::{Node, NodeId, Rgba, Scene, SceneError, Shape, StrokeStyle, Vec2};

const BRANCHES: usize = 6;
const LIFE_MS: f32 = 400.0;

const SEGMENTS: usize = 10;
const ZIGZAG: f32 = 20.0;
const BOLT_COLOR: Rgba = Rgba::hex(0xffeb3b);
const BOLT_WIDTH: f32 = 2.0;
const SPARKS_PER_BRANCH: usize = 4;
const SPARK_RADIUS: f32 = 1.5;
const SPARK_COLOR: u32 = 0xfff59d;

const SWARM: FlockParams = FlockParams {
    neighbor_radius: 30.0,
    separation_radius: 8.0,
    cohesion: 0.01,
    separation: 0.06,
    alignment: 0.05,
    max_speed: 6.0,
};

const SCHEMA: &[SchemaField] = &[
    SchemaField::number("branches", BRANCHES as f64),
    SchemaField::number("lifeMs", LIFE_MS as f64),
];

pub(crate) const DEFINITION: EffectDefinition = EffectDefinition {
    key: "lightning",
    name: "Lightning",
    schema: EffectSchema(SCHEMA),
    run,
};

fn run(ctx: &mut EffectContext<'_>) -> Result<EffectInstance, SceneError> {
    let gs = ctx.global_scale();
    let scaling = ctx.scaling();
    let branches = scaling.scale_complexity(ctx.config().count("branches", BRANCHES));
    let life_ms = ctx.config().life_ms(LIFE_MS);

    let root = ctx.create_root()?;
    if branches == 0 {
        return Ok(ctx.finish(root, life_ms, |_: &mut Scene, _: &Frame| {}));
    }

    let bolts = ctx.add(root, Node::container())?;
    let stroke = StrokeStyle::new(BOLT_WIDTH * gs, BOLT_COLOR);
    for i in 0..branches {
        let angle = i as f32 / branches as f32 * TAU;
        let length = ctx.random(40.0, 80.0) * gs;
        let mut points = Vec::with_capacity(SEGMENTS + 2);
        points.push(Vec2::zero());
        for j in 0..=SEGMENTS {
            let along = j as f32 / SEGMENTS as f32 * length;
            let across = ctx.random(-0.5, 0.5) * ZIGZAG * gs;
            points.push(Vec2::from_angle(angle, along) + Vec2::from_angle(angle + FRAC_PI_2, across));
        }
        ctx.add(bolts, Node::with_shape(Shape::Polyline { points, stroke }))?;
    }

    let count = scaling.scale_count(branches * SPARKS_PER_BRANCH);
    let mut sparks: Vec<NodeId> = Vec::with_capacity(count);
    let mut boids = Vec::with_capacity(count);
    for _ in 0..count {
        let angle = ctx.random(0.0, TAU);
        let speed = ctx.random(1.0, 4.0) * gs;
        let radius = ctx.random(0.0, 10.0) * gs;
        let pos = Vec2::from_angle(angle, radius);
        sparks.push(ctx.add(
            root,
            Node::with_shape(Shape::glow(SPARK_RADIUS * gs, SPARK_COLOR, 0.25, 0.9))
                .at(pos.x, pos.y),
        )?);
        boids.push(Boid {
            pos,
            vel: Vec2::from_angle(angle, speed),
        });
    }

    let origin: Vec<Boid> = boids.clone();
    let mobile = scaling.is_mobile();
    let params = SWARM.scaled(gs);
    Ok(ctx.finish(root, life_ms, move |scene: &mut Scene, frame: &Frame| {
        let t = frame.t;
        update(scene, bolts, |node| {
            let flicker = 0.75 + 0.25 * (frame.elapsed_ms * 0.08).sin();
            node.alpha = (1.0 - t * 2.0).max(0.0) * flicker;
        });

        if mobile {
            let f = frame.frames();
            for (boid, start) in boids.iter_mut().zip(&origin) {
                boid.pos = start.pos + start.vel * f;
            }
        } else {
            flock::step(&mut boids, &params, frame.dt_frames(), |_, _| Vec2::zero());
        }

        for (id, boid) in sparks.iter().zip(&boids) {
            update(scene, *id, |node| {
                node.position = boid.pos;
                node.alpha = (1.0 - t).max(0.0);
            });
        }
    }))
}
