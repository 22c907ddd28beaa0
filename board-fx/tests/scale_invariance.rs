//! # 全局缩放集成测试
//!
//! 同一随机种子下，`globalScale = 2` 的画面应当是 `globalScale = 1`
//! 的画面以出生点为中心放大 2 倍：相对位置与可见尺寸翻倍，透明度不变。

use board_fx::{EffectConfig, EffectRegistry, ManualClock, Stage, StageOptions, Vec2};
use serde_json::json;

const SPAWN: Vec2 = Vec2 { x: 240.0, y: 180.0 };

/// 一帧画面：(相对出生点的位置, 可见尺寸, 透明度)
type Snapshot = Vec<(Vec2, f32, f32)>;

fn snapshots(key: &str, global_scale: f32) -> Vec<Snapshot> {
    let clock = ManualClock::new();
    let mut stage = Stage::new(
        clock.clone(),
        StageOptions {
            seed: Some(2024),
            ..StageOptions::default()
        },
    );
    let def = EffectRegistry::builtin().get(key).unwrap();
    let life = def.schema.default_life_ms().unwrap();
    let config = EffectConfig::from_value(&json!({ "globalScale": global_scale }));
    stage.spawn(def, SPAWN.x, SPAWN.y, config).unwrap();

    let mut frames = Vec::new();
    let mut elapsed = 0.0;
    for checkpoint in [0.1, 0.35, 0.6, 0.85] {
        let target = life * checkpoint;
        while elapsed < target {
            clock.advance(1000.0 / 60.0);
            elapsed += 1000.0 / 60.0;
            stage.tick();
        }
        let frame = stage
            .scene()
            .draw_list()
            .iter()
            .map(|item| {
                (
                    item.transform.translation - SPAWN,
                    item.shape.extent() * item.transform.scale,
                    item.alpha,
                )
            })
            .collect();
        frames.push(frame);
    }
    frames
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() <= 1e-2 * (1.0 + a.abs().max(b.abs()))
}

fn assert_scaled(key: &str) {
    let base = snapshots(key, 1.0);
    let doubled = snapshots(key, 2.0);

    for (frame, (small, large)) in base.iter().zip(&doubled).enumerate() {
        assert_eq!(small.len(), large.len(), "{key} 第 {frame} 帧绘制项数量不同");
        for ((p1, s1, a1), (p2, s2, a2)) in small.iter().zip(large) {
            assert!(close(p1.x * 2.0, p2.x), "{key} x: {} vs {}", p1.x * 2.0, p2.x);
            assert!(close(p1.y * 2.0, p2.y), "{key} y: {} vs {}", p1.y * 2.0, p2.y);
            assert!(close(s1 * 2.0, *s2), "{key} size: {} vs {}", s1 * 2.0, s2);
            assert!((a1 - a2).abs() < 1e-3, "{key} alpha: {a1} vs {a2}");
        }
    }
}

#[test]
fn test_burst_scales_uniformly() {
    assert_scaled("burst");
}

#[test]
fn test_ripple_scales_uniformly() {
    assert_scaled("ripple");
}

#[test]
fn test_confetti_scales_uniformly() {
    assert_scaled("confetti");
}

#[test]
fn test_waves_scales_uniformly() {
    assert_scaled("waves");
}

#[test]
fn test_firework_scales_uniformly() {
    assert_scaled("firework");
}

#[test]
fn test_flower_scales_uniformly() {
    assert_scaled("flower");
}

#[test]
fn test_galaxy_scales_uniformly() {
    assert_scaled("galaxy");
}

#[test]
fn test_crystal_scales_uniformly() {
    assert_scaled("crystal");
}

#[test]
fn test_plasma_scales_uniformly() {
    assert_scaled("plasma");
}

#[test]
fn test_tornado_scales_uniformly() {
    assert_scaled("tornado");
}
