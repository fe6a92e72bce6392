use std::collections::HashMap;

use crate::gpu_utils::Texture;
use crate::rendering::binder::{FrameUniforms, UniformBlock};
use crate::rendering::fullscreen::{FullscreenPass, FullscreenPassDesc};
use crate::rendering::graph::{BufferId, InputSlot};
use crate::rendering::shader::{ShaderError, ShaderSource};

pub const PRESENT_SHADER: &str = include_str!("../../resources/shaders/present.wgsl");
pub const PRESENT_ENTRY: &str = "fs_present";

/// Row of the offscreen buffer shown on surface row `row` (both counted from the top).
///
/// Offscreen buffers store their first row at the bottom of the image, so presenting with
/// `flip_y` reads them back to front. Mirrors the sampling in `present.wgsl`.
pub fn source_row(row: u32, height: u32, flip_y: bool) -> u32
{
    if flip_y
    {
        height.saturating_sub(1).saturating_sub(row)
    }
    else
    {
        row
    }
}

/// Draws the presented buffer over the whole surface.
pub struct Presentation
{
    pass: FullscreenPass,
    flip_y: bool
}

impl Presentation
{
    pub fn new(device: &wgpu::Device, fallback: &Texture, sampler: &wgpu::Sampler, source: BufferId, surface_format: wgpu::TextureFormat, flip_y: bool) -> Result<Self, ShaderError>
    {
        let shader = ShaderSource::embedded("present", PRESENT_SHADER);
        let inputs = [InputSlot::new("source_tex", source)];

        let pass = FullscreenPass::new(device, fallback, sampler, FullscreenPassDesc
        {
            label: "present",
            source: &shader,
            entry_point: PRESENT_ENTRY,
            block: UniformBlock::Post,
            inputs: &inputs,
            format: surface_format
        })?;

        Ok(Self { pass, flip_y })
    }

    pub fn rebind(&mut self, device: &wgpu::Device, buffers: &HashMap<BufferId, Texture>, fallback: &Texture, sampler: &wgpu::Sampler)
    {
        self.pass.rebind(device, buffers, fallback, sampler);
    }

    pub fn write_uniforms(&mut self, uniforms: &FrameUniforms, queue: &wgpu::Queue)
    {
        let mut uniforms = *uniforms;
        uniforms.post.flip_y = self.flip_y as u32;
        self.pass.write_uniforms(&uniforms, queue);
    }

    pub fn record(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView)
    {
        self.pass.record(encoder, target);
    }
}
