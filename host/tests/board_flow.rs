//! # 看板集成测试
//!
//! 看板文件 → 触发 → Stage → egui 图元 的完整链路。
//! 不依赖窗口、GPU 或音频设备。

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::{Duration, Instant};

use board_fx::{
    AudioOutput, EffectOutcome, EffectRegistry, FRAME_MS, ManualClock, Stage, StageOptions,
    SurfaceSlot, TriggerDispatcher,
};
use host::BoardLayout;
use host::BoardWatcher;
use host::renderer::paint::{Primitive, translate};

#[derive(Clone, Default)]
struct RecordingAudio(Rc<RefCell<Vec<(String, f32)>>>);

impl AudioOutput for RecordingAudio {
    fn play(&mut self, url: &str, gain_db: f32) {
        self.0.borrow_mut().push((url.to_string(), gain_db));
    }
}

const BOARD: &str = r#"{
    "globalScale": 1.5,
    "zones": [
        {
            "animationKey": "burst",
            "animationCfg": {"radius": 20, "lifeMs": 300},
            "samples": [{"url": "kick.wav", "gainDb": -6}]
        },
        {"animationKey": "", "samples": [{"url": "hat.wav"}]}
    ]
}"#;

fn write_board(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

// ========== 完整链路 ==========

#[test]
fn test_tap_plays_sample_and_paints_effect() {
    let file = write_board(BOARD);
    let mut watcher = BoardWatcher::new(file.path(), Duration::from_secs(5));
    let board = watcher.load_now().unwrap();

    let slot = SurfaceSlot::new();
    let audio = RecordingAudio::default();
    let mut dispatcher = TriggerDispatcher::new(EffectRegistry::builtin(), slot.subscribe())
        .with_audio(audio.clone())
        .with_seed(7);
    dispatcher.set_board(board);

    let clock = ManualClock::new();
    let stage = Stage::new(clock.clone(), StageOptions::default()).into_handle();
    slot.publish(stage.clone());

    // 窗口坐标 (50, 106) → 区域 0 内的 (50, 50)
    let layout = BoardLayout::new(800.0, 656.0, 56.0);
    let (x, y) = layout.to_surface(50.0, 106.0).unwrap();
    let zone = layout.zone_at(x, y).unwrap();
    assert_eq!(zone, 0);

    let outcome = dispatcher.trigger(zone, x, y);
    assert!(outcome.spawned().is_some());
    assert_eq!(audio.0.borrow().as_slice(), &[("kick.wav".to_string(), -6.0)]);

    clock.advance(FRAME_MS as f64);
    stage.borrow_mut().tick();
    let prims = {
        let stage = stage.borrow();
        translate(&stage.scene().draw_list(), egui::Pos2::new(0.0, layout.top))
    };
    assert!(!prims.is_empty());
    // 图元位于窗口坐标系（加上工具栏偏移）
    let circle = prims.iter().find_map(|p| match p {
        Primitive::Shape(egui::Shape::Circle(c)) => Some(*c),
        _ => None,
    });
    let circle = circle.unwrap();
    assert!((circle.center.x - 50.0).abs() < 1e-3);
    assert!((circle.center.y - 106.0).abs() < 1e-3);
    // radius 20 × globalScale 1.5，第一帧后放大到 1 + 1/18
    assert!((circle.radius - 30.0 * (1.0 + FRAME_MS / 300.0)).abs() < 1e-2);

    // 300ms 后实例结束，场景清空
    for _ in 0..20 {
        clock.advance(FRAME_MS as f64);
        stage.borrow_mut().tick();
    }
    assert_eq!(stage.borrow().live_count(), 0);
    assert!(translate(&stage.borrow().scene().draw_list(), egui::Pos2::ZERO).is_empty());
}

#[test]
fn test_audio_only_zone() {
    let file = write_board(BOARD);
    let mut watcher = BoardWatcher::new(file.path(), Duration::from_secs(5));

    let slot = SurfaceSlot::new();
    let audio = RecordingAudio::default();
    let mut dispatcher = TriggerDispatcher::new(EffectRegistry::builtin(), slot.subscribe())
        .with_audio(audio.clone());
    dispatcher.set_board(watcher.load_now().unwrap());

    let outcome = dispatcher.trigger(1, 10.0, 10.0);
    assert_eq!(
        outcome,
        board_fx::TriggerOutcome::Handled {
            sample: Some(board_fx::SampleRef {
                url: "hat.wav".to_string(),
                gain_db: 0.0,
            }),
            effect: EffectOutcome::NoAnimation,
        }
    );
    assert_eq!(audio.0.borrow().len(), 1);
}

// ========== 看板热更新 ==========

#[test]
fn test_board_reload_changes_zone_effect() {
    let file = write_board(r#"{"zones":[{"animationKey":"burst"}]}"#);
    let mut watcher = BoardWatcher::new(file.path(), Duration::ZERO);

    let slot = SurfaceSlot::new();
    let mut dispatcher = TriggerDispatcher::new(EffectRegistry::builtin(), slot.subscribe());
    dispatcher.set_board(watcher.load_now().unwrap());

    let stage = Stage::new(ManualClock::new(), StageOptions::default()).into_handle();
    slot.publish(stage.clone());

    let first = dispatcher.trigger(0, 10.0, 10.0).spawned().unwrap();
    assert_eq!(stage.borrow().instance_key(first), Some("burst"));

    // 修改时间精度可能是秒级，等待文件时间戳变化
    std::thread::sleep(Duration::from_millis(1100));
    let updated = r#"{"zones":[{"animationKey":"ripple"}]}"#;
    std::fs::write(file.path(), updated).unwrap();

    let board = watcher.poll(Instant::now()).unwrap();
    dispatcher.set_board(board);
    let second = dispatcher.trigger(0, 10.0, 10.0).spawned().unwrap();
    assert_eq!(stage.borrow().instance_key(second), Some("ripple"));
}

// ========== 命令行功能 ==========

#[test]
fn test_simulate_report_serializes() {
    let report = host::simulate("ripple", &host::SimulateOptions::default()).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["key"], "ripple");
    assert!(json["samples"].as_array().unwrap().len() > 1);
}
