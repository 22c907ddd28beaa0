//! Waves：沿水平带分布的流体粒子
//!
//! 桌面端：粒子按群聚规则相互作用，同时被牵引向三条相位错开的正弦波形。
//! 移动端：不做任何力计算，纵向位移只由一个正弦项决定，横向位置不动。

use std::f32::consts::PI;

use super::flock::{self, Boid, FlockParams};
use super::{EffectContext, EffectDefinition, EffectSchema, SchemaField, update};
use crate::instance::{EffectInstance, Frame};
use crate::scene::{Node, NodeId, Rgba, Scene, SceneError, Shape, Vec2};

const PARTICLES: usize = 60;
const AMPLITUDE: f32 = 30.0;
const FREQUENCY: f32 = 0.05;
const WIDTH: f32 = 120.0;
const LIFE_MS: f32 = 1500.0;

/// 波形推进速度（弧度 / 毫秒）
const WAVE_SPEED: f32 = 0.01;
const DOT_RADIUS: f32 = 2.5;
const ROW_COLORS: [u32; 3] = [0x00ccff, 0x0099cc, 0x006699];

const FLUID: FlockParams = FlockParams {
    neighbor_radius: 24.0,
    separation_radius: 6.0,
    cohesion: 0.004,
    separation: 0.04,
    alignment: 0.03,
    max_speed: 4.0,
};
/// 向波形的弹性牵引
const SPRING: f32 = 0.08;
/// 向原始横坐标的弱牵引
const TETHER: f32 = 0.01;

const SCHEMA: &[SchemaField] = &[
    SchemaField::number("particles", PARTICLES as f64),
    SchemaField::number("amplitude", AMPLITUDE as f64),
    SchemaField::number("frequency", FREQUENCY as f64),
    SchemaField::number("width", WIDTH as f64),
    SchemaField::number("lifeMs", LIFE_MS as f64),
];

pub(crate) const DEFINITION: EffectDefinition = EffectDefinition {
    key: "waves",
    name: "Waves",
    schema: EffectSchema(SCHEMA),
    run,
};

/// 正弦波形参数
#[derive(Debug, Clone, Copy)]
struct Wave {
    amplitude: f32,
    /// 空间频率（已按全局缩放换算）
    wavenumber: f32,
}

impl Wave {
    /// 单正弦项的纵向位移，振幅随 `1 - t` 衰减
    fn offset(&self, base_x: f32, phase: f32, elapsed_ms: f32, t: f32) -> f32 {
        let envelope = (1.0 - t).max(0.0);
        self.amplitude * envelope * (base_x * self.wavenumber + elapsed_ms * WAVE_SPEED + phase).sin()
    }
}

struct Particle {
    node: NodeId,
    base_x: f32,
    phase: f32,
}

fn run(ctx: &mut EffectContext<'_>) -> Result<EffectInstance, SceneError> {
    let gs = ctx.global_scale();
    let scaling = ctx.scaling();
    let count = scaling.scale_count(ctx.config().count("particles", PARTICLES));
    let wave = Wave {
        amplitude: ctx.config().number("amplitude", AMPLITUDE) * gs,
        wavenumber: ctx.config().number("frequency", FREQUENCY) / gs,
    };
    let width = ctx.config().number("width", WIDTH).max(0.0) * gs;
    let life_ms = ctx.config().life_ms(LIFE_MS);

    let root = ctx.create_root()?;
    let mut particles = Vec::with_capacity(count);
    let mut boids = Vec::with_capacity(count);
    for i in 0..count {
        let row = i % ROW_COLORS.len();
        let base_x = if count > 1 {
            -width / 2.0 + width * i as f32 / (count - 1) as f32
        } else {
            0.0
        };
        let phase = row as f32 * PI / 3.0;
        let y = wave.offset(base_x, phase, 0.0, 0.0);
        let drift = ctx.random(-0.5, 0.5) * gs;

        let node = ctx.add(
            root,
            Node::with_shape(Shape::disc(DOT_RADIUS * gs, Rgba::hex(ROW_COLORS[row])))
                .at(base_x, y),
        )?;
        particles.push(Particle {
            node,
            base_x,
            phase,
        });
        boids.push(Boid {
            pos: Vec2::new(base_x, y),
            vel: Vec2::new(drift, 0.0),
        });
    }

    let alpha = |t: f32| (1.0 - t).max(0.0);

    if scaling.is_mobile() {
        return Ok(ctx.finish(root, life_ms, move |scene: &mut Scene, frame: &Frame| {
            for p in &particles {
                let y = wave.offset(p.base_x, p.phase, frame.elapsed_ms, frame.t);
                update(scene, p.node, |node| {
                    node.position = Vec2::new(p.base_x, y);
                    node.alpha = alpha(frame.t);
                });
            }
        }));
    }

    let params = FLUID.scaled(gs);
    Ok(ctx.finish(root, life_ms, move |scene: &mut Scene, frame: &Frame| {
        flock::step(&mut boids, &params, frame.dt_frames(), |i, boid| {
            let p = &particles[i];
            let target = wave.offset(p.base_x, p.phase, frame.elapsed_ms, frame.t);
            Vec2::new(
                (p.base_x - boid.pos.x) * TETHER,
                (target - boid.pos.y) * SPRING,
            )
        });
        for (p, boid) in particles.iter().zip(&boids) {
            update(scene, p.node, |node| {
                node.position = boid.pos;
                node.alpha = alpha(frame.t);
            });
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EffectConfig;
    use crate::perf::{DeviceTier, scaling_for};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn spawn(tier: DeviceTier, config: &EffectConfig, scene: &mut Scene) -> EffectInstance {
        let mut ctx = EffectContext::new(
            scene,
            Vec2::zero(),
            config,
            scaling_for(tier),
            StdRng::seed_from_u64(3),
            0.0,
        );
        run(&mut ctx).unwrap()
    }

    #[test]
    fn test_mobile_caps_particles() {
        let mut scene = Scene::new();
        let config = EffectConfig::new().with("particles", 200);
        let inst = spawn(DeviceTier::MOBILE, &config, &mut scene);
        assert_eq!(scene.children(inst.root()).len(), 20);
    }

    #[test]
    fn test_mobile_motion_is_single_sine() {
        let mut scene = Scene::new();
        let config = EffectConfig::new();
        let mut inst = spawn(DeviceTier::MOBILE, &config, &mut scene);
        let children = scene.children(inst.root()).to_vec();
        let base: Vec<f32> = children
            .iter()
            .map(|id| scene.node(*id).unwrap().position.x)
            .collect();

        let wave = Wave {
            amplitude: AMPLITUDE,
            wavenumber: FREQUENCY,
        };
        for now in [100.0, 400.0, 900.0] {
            inst.advance(&mut scene, now);
            let t = now as f32 / LIFE_MS;
            for (i, id) in children.iter().enumerate() {
                let node = scene.node(*id).unwrap();
                let phase = (i % ROW_COLORS.len()) as f32 * PI / 3.0;
                // 横坐标不受任何力影响
                assert_eq!(node.position.x, base[i]);
                let expected = wave.offset(base[i], phase, now as f32, t);
                assert!((node.position.y - expected).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_desktop_flock_moves_horizontally() {
        let mut scene = Scene::new();
        let config = EffectConfig::new();
        let mut inst = spawn(DeviceTier::DESKTOP, &config, &mut scene);
        let children = scene.children(inst.root()).to_vec();
        assert_eq!(children.len(), PARTICLES);
        let before: Vec<f32> = children
            .iter()
            .map(|id| scene.node(*id).unwrap().position.x)
            .collect();

        for i in 1..=30 {
            inst.advance(&mut scene, i as f64 * 16.0);
        }
        let moved = children
            .iter()
            .zip(&before)
            .filter(|(id, x)| (scene.node(**id).unwrap().position.x - **x).abs() > 1e-3)
            .count();
        assert!(moved > 0);
    }
}
