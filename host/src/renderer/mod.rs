//! # Renderer 模块
//!
//! 渲染表面：一个窗口 + GPU 上下文 + egui 叠加层 + 一个 [`Stage`]。
//!
//! ## 生命周期
//!
//! 1. [`RenderSurface::new`] 初始化 GPU；成功后才把 Stage 发布到
//!    [`SurfaceSlot`]，之前的触发只播放音频；
//! 2. 每帧 [`RenderSurface::render`]：推进 Stage，把绘制列表交给 egui；
//! 3. [`RenderSurface::destroy`]：撤回发布并拆除 Stage（可重复调用）。
//!
//! ## 渲染层顺序
//!
//! 1. 顶部工具栏（chrome）
//! 2. 看板背景与可选的区域网格
//! 3. 效果图元

use std::sync::Arc;

use board_fx::{DeviceTier, MonotonicClock, PerfScaling, Stage, StageHandle, StageOptions};
use board_fx::{SurfaceSlot, scaling_for};
use egui::{Color32, Pos2};
use tracing::{debug, info, warn};
use winit::event::WindowEvent;
use winit::window::Window;

use crate::input::{BoardLayout, ZONE_COUNT};

mod gpu;
pub mod paint;

pub use gpu::{GpuContext, SurfaceError};

const BOARD_BACKGROUND: Color32 = Color32::BLACK;
const GRID_COLOR: Color32 = Color32::from_rgba_premultiplied(60, 60, 80, 120);

/// 渲染表面参数
#[derive(Debug, Clone)]
pub struct SurfaceOptions {
    pub tier: DeviceTier,
    pub max_live_instances: usize,
    pub chrome_height: f32,
    pub show_grid: bool,
}

/// 工具栏显示的信息
#[derive(Debug, Clone, Default)]
pub struct ChromeInfo {
    pub title: String,
    pub zones: usize,
    pub board_ok: bool,
}

/// 渲染表面
pub struct RenderSurface {
    window: Arc<Window>,
    gpu: GpuContext,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    stage: StageHandle,
    slot: SurfaceSlot,
    layout: BoardLayout,
    chrome_height: f32,
    show_grid: bool,
    destroyed: bool,
}

impl std::fmt::Debug for RenderSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSurface")
            .field("size", &self.gpu.size())
            .field("layout", &self.layout)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

/// 物理尺寸 → 看板布局（逻辑像素）
fn layout_for(window: &Window, chrome_height: f32) -> BoardLayout {
    let logical = window
        .inner_size()
        .to_logical::<f32>(window.scale_factor());
    BoardLayout::new(logical.width, logical.height, chrome_height)
}

impl RenderSurface {
    /// 初始化；失败时不发布任何东西
    pub fn new(
        window: Arc<Window>,
        slot: SurfaceSlot,
        options: SurfaceOptions,
    ) -> Result<Self, SurfaceError> {
        let gpu = GpuContext::new(window.clone(), options.tier)?;
        let scaling: PerfScaling = scaling_for(options.tier);

        let egui_ctx = egui::Context::default();
        // 移动端关闭抗锯齿羽化
        egui_ctx.tessellation_options_mut(|o| o.feathering = !options.tier.is_mobile);
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window.as_ref(),
            Some(window.scale_factor() as f32),
            None,
            Some(gpu.device.limits().max_texture_dimension_2d as usize),
        );
        let egui_renderer = egui_wgpu::Renderer::new(&gpu.device, gpu.config.format, None, 1, false);

        let layout = layout_for(&window, options.chrome_height);
        let stage = Stage::new(
            MonotonicClock::new(),
            StageOptions {
                max_live_instances: options.max_live_instances,
                scaling,
                seed: None,
                viewport: board_fx::stage::Viewport {
                    width: layout.width,
                    height: layout.height,
                },
            },
        )
        .into_handle();

        slot.publish(stage.clone());
        info!(
            width = layout.width,
            height = layout.height,
            mobile = options.tier.is_mobile,
            "渲染表面就绪"
        );

        Ok(Self {
            window,
            gpu,
            egui_ctx,
            egui_state,
            egui_renderer,
            stage,
            slot,
            layout,
            chrome_height: options.chrome_height,
            show_grid: options.show_grid,
            destroyed: false,
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn layout(&self) -> BoardLayout {
        self.layout
    }

    pub fn stage(&self) -> &StageHandle {
        &self.stage
    }

    pub fn toggle_grid(&mut self) {
        self.show_grid = !self.show_grid;
    }

    /// 交给 egui 处理，返回是否被 egui 消费
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.egui_state
            .on_window_event(&self.window, event)
            .consumed
    }

    /// 窗口尺寸变化（物理像素）
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.gpu.resize(width, height);
        self.layout = layout_for(&self.window, self.chrome_height);
        if let Ok(mut stage) = self.stage.try_borrow_mut() {
            stage.resize(self.layout.width, self.layout.height);
        }
        debug!(width, height, "渲染表面尺寸变化");
    }

    /// 推进一帧并绘制
    pub fn render(&mut self, chrome: &ChromeInfo) {
        if self.destroyed {
            return;
        }
        let (width, height) = self.gpu.size();
        if width == 0 || height == 0 {
            return;
        }

        let live = match self.stage.try_borrow_mut() {
            Ok(mut stage) => stage.tick(),
            Err(_) => return,
        };

        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gpu.reconfigure();
                return;
            }
            Err(e) => {
                warn!(error = %e, "获取交换链纹理失败");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let primitives = {
            let stage = self.stage.borrow();
            paint::translate(&stage.scene().draw_list(), Pos2::new(0.0, self.chrome_height))
        };
        let layout = self.layout;
        let show_grid = self.show_grid;
        let chrome_height = self.chrome_height;

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            egui::TopBottomPanel::top("chrome")
                .exact_height(chrome_height)
                .show(ctx, |ui| {
                    ui.horizontal_centered(|ui| {
                        ui.heading(&chrome.title);
                        ui.separator();
                        if chrome.board_ok {
                            ui.label(format!("{} 个区域", chrome.zones));
                        } else {
                            ui.colored_label(Color32::LIGHT_RED, "看板未加载");
                        }
                        ui.separator();
                        ui.label(format!("{live} 个效果"));
                    });
                });
            egui::CentralPanel::default()
                .frame(egui::Frame::NONE.fill(BOARD_BACKGROUND))
                .show(ctx, |ui| {
                    let painter = ui.painter();
                    if show_grid {
                        paint_grid(painter, &layout);
                    }
                    paint::paint(painter, &primitives);
                });
        });

        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);
        let jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.gpu.device, &self.gpu.queue, *id, delta);
        }

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("board encoder"),
            });
        let commands = self.egui_renderer.update_buffers(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &jobs,
            &screen,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("board pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer.render(&mut pass, &jobs, &screen);
        }

        self.gpu
            .queue
            .submit(commands.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }

    /// 撤回发布并拆除 Stage
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.slot.clear(&self.stage);
        match self.stage.try_borrow_mut() {
            Ok(mut stage) => stage.teardown(),
            Err(_) => warn!("Stage 正被占用，跳过拆除"),
        }
        info!("渲染表面已销毁");
    }
}

impl Drop for RenderSurface {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn paint_grid(painter: &egui::Painter, layout: &BoardLayout) {
    let stroke = egui::Stroke::new(1.0, GRID_COLOR);
    for index in 0..ZONE_COUNT {
        if let Some(r) = layout.zone_rect(index) {
            let rect = egui::Rect::from_min_size(
                Pos2::new(r.x, r.y + layout.top),
                egui::vec2(r.width, r.height),
            );
            painter.rect_stroke(rect, 0.0, stroke, egui::StrokeKind::Inside);
        }
    }
}
