use std::sync::Arc;

pub trait RenderStage
{
    fn on_draw(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, view: &wgpu::TextureView);
}

/// Acquires the swapchain image and hands it to each stage in order.
pub struct Renderer
{
    device: Arc<wgpu::Device>,
    surface: Arc<wgpu::Surface>,
    queue: Arc<wgpu::Queue>
}

impl Renderer
{
    pub fn new(device: Arc<wgpu::Device>, surface: Arc<wgpu::Surface>, queue: Arc<wgpu::Queue>) -> Self
    {
        Self
        {
            device,
            surface,
            queue
        }
    }

    pub fn render(&self, stages: &mut [&mut dyn RenderStage]) -> Result<(), wgpu::SurfaceError>
    {
        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        for stage in stages.iter_mut()
        {
            stage.on_draw(&self.device, &self.queue, &view);
        }

        output.present();

        Ok(())
    }
}
