//! 群聚（boids）力场
//!
//! 聚合、分离、对齐三种力都与距离成线性关系，半径与速度上限随
//! `globalScale` 缩放，因此整个系统在缩放下保持相似。

use crate::scene::Vec2;

/// 单帧积分的最大步长（帧单位），卡顿时拆成多个子步
const MAX_SUBSTEP: f32 = 1.0;
const MAX_SUBSTEPS: usize = 8;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Boid {
    pub pos: Vec2,
    pub vel: Vec2,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct FlockParams {
    /// 邻居感知半径
    pub neighbor_radius: f32,
    /// 分离半径
    pub separation_radius: f32,
    pub cohesion: f32,
    pub separation: f32,
    pub alignment: f32,
    /// 速度上限（每帧）
    pub max_speed: f32,
}

impl FlockParams {
    /// 距离类参数乘以全局缩放
    pub fn scaled(self, gs: f32) -> Self {
        Self {
            neighbor_radius: self.neighbor_radius * gs,
            separation_radius: self.separation_radius * gs,
            max_speed: self.max_speed * gs,
            ..self
        }
    }
}

/// 推进 `dt_frames` 帧
///
/// `steer` 为每个个体附加的外力（例如波形牵引）。
pub(crate) fn step(
    boids: &mut [Boid],
    params: &FlockParams,
    dt_frames: f32,
    mut steer: impl FnMut(usize, &Boid) -> Vec2,
) {
    if boids.is_empty() || dt_frames <= 0.0 {
        return;
    }
    let substeps = ((dt_frames / MAX_SUBSTEP).ceil() as usize).clamp(1, MAX_SUBSTEPS);
    let h = dt_frames / substeps as f32;

    let mut accel = vec![Vec2::zero(); boids.len()];
    for _ in 0..substeps {
        for (i, a) in accel.iter_mut().enumerate() {
            *a = forces(boids, i, params) + steer(i, &boids[i]);
        }
        for (boid, a) in boids.iter_mut().zip(&accel) {
            boid.vel = (boid.vel + *a * h).clamp_length(params.max_speed);
            boid.pos = boid.pos + boid.vel * h;
        }
    }
}

fn forces(boids: &[Boid], i: usize, params: &FlockParams) -> Vec2 {
    let me = boids[i];
    let mut center = Vec2::zero();
    let mut heading = Vec2::zero();
    let mut push = Vec2::zero();
    let mut neighbors = 0usize;

    for (j, other) in boids.iter().enumerate() {
        if j == i {
            continue;
        }
        let offset = me.pos - other.pos;
        let dist = offset.length();
        if dist >= params.neighbor_radius {
            continue;
        }
        neighbors += 1;
        center = center + other.pos;
        heading = heading + other.vel;
        if dist < params.separation_radius {
            push = push + offset;
        }
    }

    if neighbors == 0 {
        return Vec2::zero();
    }
    let n = neighbors as f32;
    let cohesion = (center * (1.0 / n) - me.pos) * params.cohesion;
    let alignment = (heading * (1.0 / n) - me.vel) * params.alignment;
    cohesion + alignment + push * params.separation
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> FlockParams {
        FlockParams {
            neighbor_radius: 40.0,
            separation_radius: 10.0,
            cohesion: 0.01,
            separation: 0.05,
            alignment: 0.05,
            max_speed: 3.0,
        }
    }

    #[test]
    fn test_lone_boid_keeps_velocity() {
        let mut boids = vec![Boid {
            pos: Vec2::zero(),
            vel: Vec2::new(1.0, 0.0),
        }];
        step(&mut boids, &params(), 2.0, |_, _| Vec2::zero());
        assert_eq!(boids[0].vel, Vec2::new(1.0, 0.0));
        assert!((boids[0].pos.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_close_pair_separates() {
        let mut boids = vec![
            Boid {
                pos: Vec2::new(-2.0, 0.0),
                vel: Vec2::zero(),
            },
            Boid {
                pos: Vec2::new(2.0, 0.0),
                vel: Vec2::zero(),
            },
        ];
        step(&mut boids, &params(), 1.0, |_, _| Vec2::zero());
        assert!(boids[0].pos.x < -2.0);
        assert!(boids[1].pos.x > 2.0);
    }

    #[test]
    fn test_speed_is_capped() {
        let mut boids = vec![Boid {
            pos: Vec2::zero(),
            vel: Vec2::zero(),
        }];
        step(&mut boids, &params(), 4.0, |_, _| Vec2::new(100.0, 0.0));
        assert!(boids[0].vel.length() <= 3.0 + 1e-4);
    }

    #[test]
    fn test_scaled_system_is_similar() {
        let start = [
            (Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.5)),
            (Vec2::new(8.0, 3.0), Vec2::new(-0.5, 0.2)),
            (Vec2::new(-5.0, 12.0), Vec2::new(0.3, -1.0)),
        ];
        let make = |gs: f32| -> Vec<Boid> {
            start
                .iter()
                .map(|(p, v)| Boid {
                    pos: *p * gs,
                    vel: *v * gs,
                })
                .collect()
        };

        let mut a = make(1.0);
        let mut b = make(2.0);
        for _ in 0..30 {
            step(&mut a, &params(), 1.0, |_, _| Vec2::zero());
            step(&mut b, &params().scaled(2.0), 1.0, |_, _| Vec2::zero());
        }
        for (x, y) in a.iter().zip(&b) {
            assert!((x.pos.x * 2.0 - y.pos.x).abs() < 1e-2);
            assert!((x.pos.y * 2.0 - y.pos.y).abs() < 1e-2);
        }
    }
}
