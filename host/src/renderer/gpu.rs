//! wgpu 设备与交换链

use std::sync::Arc;

use board_fx::DeviceTier;
use thiserror::Error;
use tracing::info;
use winit::window::Window;

/// 渲染表面初始化错误
#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("无法创建渲染表面: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("没有可用的图形适配器")]
    NoAdapter,
    #[error("无法创建图形设备: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("适配器不支持该渲染表面")]
    Unsupported,
}

/// GPU 上下文
pub struct GpuContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    /// 初始化设备；移动端档位请求低功耗适配器
    pub fn new(window: Arc<Window>, tier: DeviceTier) -> Result<Self, SurfaceError> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window)?;

        let power_preference = if tier.is_mobile {
            wgpu::PowerPreference::LowPower
        } else {
            wgpu::PowerPreference::HighPerformance
        };
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(SurfaceError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("board device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::Performance,
            },
            None,
        ))?;

        let config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or(SurfaceError::Unsupported)?;
        surface.configure(&device, &config);

        info!(
            adapter = %adapter.get_info().name,
            format = ?config.format,
            ?power_preference,
            "GPU 初始化成功"
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    /// 交换链丢失后重新配置
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}
