pub mod bind_group;
pub mod buffer;
pub mod texture;
use std::sync::Arc;

use glam::UVec2;

use crate::error::StartupError;

pub use self::bind_group::*;
pub use self::buffer::*;
pub use self::texture::*;

pub struct WgpuState
{
    adapter: wgpu::Adapter,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    surface: Arc<wgpu::Surface>,
    surface_config: wgpu::SurfaceConfiguration
}

impl WgpuState
{
    pub fn adapter(&self) -> &wgpu::Adapter { &self.adapter }
    pub fn device(&self) -> &Arc<wgpu::Device> { &self.device }
    pub fn queue(&self) -> &Arc<wgpu::Queue> { &self.queue }
    pub fn surface(&self) -> &Arc<wgpu::Surface> { &self.surface }
    pub fn surface_config(&self) -> &wgpu::SurfaceConfiguration { &self.surface_config }

    pub fn surface_size(&self) -> UVec2
    {
        UVec2::new(self.surface_config.width, self.surface_config.height)
    }

    pub async fn new(window: &winit::window::Window) -> Result<Self, StartupError>
    {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = unsafe { instance.create_surface(window) }?;

        let adapter = instance.request_adapter(
            &wgpu::RequestAdapterOptions
            {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false
            }
        ).await.ok_or(StartupError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("Using adapter '{}' ({:?})", info.name, info.backend);

        // timestamps are optional, the profiler stays silent without them
        let features = adapter.features() & wgpu::Features::TIMESTAMP_QUERY;

        let (device, queue) = adapter.request_device(
            &wgpu::DeviceDescriptor
            {
                features,
                limits: wgpu::Limits::default(),
                label: Some("Raytrace Device")
            }, None).await?;

        let surface_caps = surface.get_capabilities(&adapter);

        let surface_format = surface_caps.formats.iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(StartupError::NoSurfaceFormat)?;

        log::info!("Surface format {:?}, {}x{}", surface_format, size.width, size.height);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoNoVsync,
            alpha_mode: surface_caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![]
        };

        surface.configure(&device, &config);

        Ok(Self
        {
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
            surface: Arc::new(surface),
            surface_config: config
        })
    }

    /// Reconfigures the surface. Returns false for zero-sized requests, which are ignored.
    pub fn resize(&mut self, size: UVec2) -> bool
    {
        if size.x == 0 || size.y == 0
        {
            return false;
        }

        self.surface_config.width = size.x;
        self.surface_config.height = size.y;
        self.device.poll(wgpu::Maintain::Wait); // to fix crash on dx12 with wgpu 0.17
        self.surface.configure(&self.device, &self.surface_config);
        true
    }

    pub fn reconfigure(&self)
    {
        self.surface.configure(&self.device, &self.surface_config);
    }
}
