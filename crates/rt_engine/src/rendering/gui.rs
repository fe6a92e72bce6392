use std::sync::Arc;

use egui::{ClippedPrimitive, Context, TexturesDelta};
use egui_wgpu::renderer::{Renderer as EguiRenderer, ScreenDescriptor};
use winit::event::Event;
use winit::event_loop::EventLoop;
use winit::window::Window;

use crate::gpu_utils::WgpuState;
use crate::rendering::RenderStage;

use super::{get_command_encoder, get_render_pass};

/// egui overlay composited over the presented image. The UI is laid out and
/// tessellated in [`GuiOverlay::run`], so drawing only uploads and records.
pub struct GuiOverlay
{
    context: Context,
    platform: egui_winit::State,
    renderer: EguiRenderer,
    window: Arc<Window>,

    primitives: Vec<ClippedPrimitive>,
    textures: TexturesDelta
}

impl GuiOverlay
{
    pub fn new<T>(event_loop: &EventLoop<T>, gpu_state: &WgpuState, window: Arc<Window>) -> Self
        where T : 'static
    {
        let format = gpu_state.surface_config().format;

        Self
        {
            context: Context::default(),
            platform: egui_winit::State::new(event_loop),
            renderer: EguiRenderer::new(gpu_state.device(), format, None, 1),
            window,
            primitives: vec![],
            textures: TexturesDelta::default()
        }
    }

    /// True when the pointer or keyboard input belongs to the overlay.
    pub fn handle_event<T>(&mut self, event: &Event<T>) -> bool
    {
        match event
        {
            Event::WindowEvent { event, .. } => self.platform.on_event(&self.context, event).consumed,
            _ => false
        }
    }

    /// Lays out one frame of UI.
    pub fn run<F>(&mut self, build_ui: F) where F : FnOnce(&Context)
    {
        let input = self.platform.take_egui_input(&self.window);
        let output = self.context.run(input, build_ui);

        self.platform.handle_platform_output(&self.window, &self.context, output.platform_output);
        self.primitives = self.context.tessellate(output.shapes);
        self.textures.append(output.textures_delta);
    }

    fn screen(&self) -> ScreenDescriptor
    {
        let size = self.window.inner_size();
        ScreenDescriptor
        {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: self.window.scale_factor() as f32
        }
    }
}

impl RenderStage for GuiOverlay
{
    fn on_draw(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, view: &wgpu::TextureView)
    {
        let screen = self.screen();
        let textures = std::mem::take(&mut self.textures);

        for (id, delta) in &textures.set
        {
            self.renderer.update_texture(device, queue, *id, delta);
        }

        let mut encoder = get_command_encoder(device);
        self.renderer.update_buffers(device, queue, &mut encoder, &self.primitives, &screen);

        {
            let mut pass = get_render_pass(&mut encoder, view, None, Some("gui"));
            self.renderer.render(&mut pass, &self.primitives, &screen);
        }

        queue.submit(std::iter::once(encoder.finish()));

        for id in &textures.free
        {
            self.renderer.free_texture(id);
        }
    }
}
