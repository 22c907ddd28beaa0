//! # App 模块
//!
//! winit 事件循环：窗口、输入、看板轮询与渲染表面的连接处。
//!
//! 渲染表面创建失败时应用仍然运行，只是退化为纯音频看板；
//! 触发通过 [`TriggerDispatcher`] 完成，它只会看到已发布的渲染表面。

use std::sync::Arc;
use std::time::Instant;

use board_fx::{
    DeviceTier, EffectRegistry, SurfaceSlot, TierProbe, TriggerDispatcher, TriggerOutcome,
    detect_tier,
};
use tracing::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, KeyEvent, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use crate::audio::AudioManager;
use crate::board::BoardWatcher;
use crate::config::AppConfig;
use crate::input::{BoardLayout, PointerState};
use crate::renderer::{ChromeInfo, RenderSurface, SurfaceOptions};

/// 应用状态
pub struct App {
    config: AppConfig,
    slot: SurfaceSlot,
    dispatcher: TriggerDispatcher,
    watcher: BoardWatcher,
    pointer: PointerState,
    /// 没有渲染表面时用于命中测试的布局
    layout: BoardLayout,
    window: Option<Arc<Window>>,
    surface: Option<RenderSurface>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let slot = SurfaceSlot::new();
        let mut dispatcher = TriggerDispatcher::new(EffectRegistry::builtin(), slot.subscribe());

        match AudioManager::new(&config.assets_root) {
            Ok(mut audio) => {
                audio.set_master_volume(config.audio.master_volume);
                audio.set_muted(config.audio.muted);
                dispatcher = dispatcher.with_audio(audio);
            }
            Err(e) => warn!(error = %e, "音频不可用，看板将静音运行"),
        }

        let mut watcher = BoardWatcher::new(&config.board.path, config.board.poll_interval());
        match watcher.load_now() {
            Ok(board) => dispatcher.set_board(board),
            Err(e) => warn!(error = %e, "看板加载失败，等待文件更新"),
        }

        let layout = BoardLayout::new(
            config.window.width as f32,
            config.window.height as f32,
            config.board.chrome_height,
        );

        Self {
            config,
            slot,
            dispatcher,
            watcher,
            pointer: PointerState::new(),
            layout,
            window: None,
            surface: None,
        }
    }

    pub fn dispatcher(&self) -> &TriggerDispatcher {
        &self.dispatcher
    }

    pub fn slot(&self) -> &SurfaceSlot {
        &self.slot
    }

    fn current_layout(&self) -> BoardLayout {
        self.surface
            .as_ref()
            .map(RenderSurface::layout)
            .unwrap_or(self.layout)
    }

    /// 在窗口逻辑坐标处按下
    pub fn press_at(&mut self, x: f32, y: f32) -> Option<TriggerOutcome> {
        self.pointer.moved(x, y);
        self.press()
    }

    fn press(&mut self) -> Option<TriggerOutcome> {
        let tap = self.pointer.pressed(&self.current_layout())?;
        let outcome = self.dispatcher.trigger(tap.zone, tap.x, tap.y);
        debug!(zone = tap.zone, x = tap.x, y = tap.y, ?outcome, "触发区域");
        Some(outcome)
    }

    /// 重新检查看板文件
    pub fn poll_board(&mut self, now: Instant) -> bool {
        match self.watcher.poll(now) {
            Some(board) => {
                self.dispatcher.set_board(board);
                true
            }
            None => false,
        }
    }

    fn chrome_info(&self) -> ChromeInfo {
        ChromeInfo {
            title: self.config.window.title.clone(),
            zones: self.dispatcher.board().map_or(0, |b| b.zones.len()),
            board_ok: self.dispatcher.board().is_some(),
        }
    }

    fn detect_tier(&self, window: &Window) -> DeviceTier {
        if self.config.debug.force_mobile {
            return DeviceTier::MOBILE;
        }
        let logical: LogicalSize<f32> = window.inner_size().to_logical(window.scale_factor());
        detect_tier(&TierProbe {
            user_agent: self.config.debug.user_agent.as_deref(),
            viewport_width: logical.width,
        })
    }

    fn logical(&self, position: PhysicalPosition<f64>) -> (f32, f32) {
        let scale = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
        let p = position.to_logical::<f32>(scale);
        (p.x, p.y)
    }

    fn shutdown(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.destroy();
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        match &event.logical_key {
            Key::Named(NamedKey::Escape) => {
                self.shutdown();
                event_loop.exit();
            }
            Key::Character(c) if c.eq_ignore_ascii_case("g") => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.toggle_grid();
                }
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!(error = %e, "窗口创建失败");
                event_loop.exit();
                return;
            }
        };

        let tier = self.detect_tier(&window);
        info!(mobile = tier.is_mobile, "设备档位");

        let options = SurfaceOptions {
            tier,
            max_live_instances: self.config.board.max_live_instances,
            chrome_height: self.config.board.chrome_height,
            show_grid: self.config.debug.show_grid,
        };
        match RenderSurface::new(window.clone(), self.slot.clone(), options) {
            Ok(surface) => self.surface = Some(surface),
            Err(e) => error!(error = %e, "渲染表面初始化失败，仅播放音频"),
        }
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(surface) = self.surface.as_mut() {
            if surface.handle_window_event(&event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(window) = self.window.as_ref() {
                    let logical: LogicalSize<f32> = size.to_logical(window.scale_factor());
                    let chrome = self.config.board.chrome_height;
                    self.layout = BoardLayout::new(logical.width, logical.height, chrome);
                }
                if let Some(surface) = self.surface.as_mut() {
                    surface.resize(size.width, size.height);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = self.logical(position);
                self.pointer.moved(x, y);
            }
            WindowEvent::CursorLeft { .. } => self.pointer.left(),
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.press();
            }
            WindowEvent::Touch(touch) if touch.phase == TouchPhase::Started => {
                let (x, y) = self.logical(touch.location);
                self.press_at(x, y);
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &event),
            WindowEvent::RedrawRequested => {
                let chrome = self.chrome_info();
                if let Some(surface) = self.surface.as_mut() {
                    surface.render(&chrome);
                }
            }
            _ => {}
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        // 移动平台挂起时交换链失效，恢复时重新创建
        self.shutdown();
        self.window = None;
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.poll_board(Instant::now());
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
        info!("应用退出");
    }
}
