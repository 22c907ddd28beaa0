//! # Host 层
//!
//! 音效看板的桌面宿主，使用 winit + wgpu + egui 渲染，rodio 播放样本。
//!
//! ## 架构说明
//!
//! Host 层负责：
//! - 窗口、输入与 4x4 区域命中
//! - 看板文件的加载与轮询
//! - 音频播放
//! - 把 [`board_fx`] 的场景绘制到 GPU 表面
//!
//! 效果本身（实例、节点树、缩放、降级）全部在 `board-fx` 中，
//! Host 层只负责在渲染表面就绪后发布 Stage。

pub mod app;
pub mod audio;
pub mod board;
pub mod config;
pub mod headless;
pub mod input;
pub mod renderer;

pub use app::App;
pub use audio::{AudioError, AudioManager, linear_gain};
pub use board::BoardWatcher;
pub use config::{AppConfig, AudioConfig, BoardSettings, ConfigError, DebugConfig, WindowConfig};
pub use headless::{HeadlessError, SimulateOptions, SimulationReport, list_effects_json, simulate};
pub use input::{BoardLayout, GRID_SIZE, PointerState, Tap, ZONE_COUNT};
pub use renderer::{ChromeInfo, RenderSurface, SurfaceError, SurfaceOptions};
