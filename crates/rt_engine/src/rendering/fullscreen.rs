use std::collections::HashMap;

use crate::gpu_utils::{BindGroup, Entry, SamplerEntry, Texture, TextureEntry, Uniform};
use crate::math::Color;
use crate::rendering::binder::{FrameUniforms, PostParams, SceneParams, UniformBlock};
use crate::rendering::graph::{BufferId, InputSlot};
use crate::rendering::shader::{PassInterface, ShaderError, ShaderProgram, ShaderSource, VERTEX_ENTRY};
use crate::rendering::{construct_fullscreen_pipeline, get_render_pass, FullscreenPipelineInfo};

/// The uniform buffer of one pass, sized to cover both the host block and the shader's struct.
enum PassUniform
{
    Scene(Uniform<SceneParams>),
    Post(Uniform<PostParams>),
    /// The shader declares a block the host does not feed.
    Zeroed(Uniform<[f32; 4]>)
}

impl PassUniform
{
    fn new(block: UniformBlock, span: u64, device: &wgpu::Device, label: &str) -> Self
    {
        let size = span.max(block.size());
        let visibility = wgpu::ShaderStages::FRAGMENT;
        let label = Some(label);

        match block
        {
            UniformBlock::Scene => Self::Scene(Uniform::with_min_size(size, visibility, device, label)),
            UniformBlock::Post => Self::Post(Uniform::with_min_size(size, visibility, device, label)),
            UniformBlock::None => Self::Zeroed(Uniform::with_min_size(size, visibility, device, label))
        }
    }

    fn write(&mut self, uniforms: &FrameUniforms, queue: &wgpu::Queue)
    {
        match self
        {
            Self::Scene(uniform) => uniform.enqueue_write(uniforms.scene, queue),
            Self::Post(uniform) => uniform.enqueue_write(uniforms.post, queue),
            Self::Zeroed(_) => {}
        }
    }
}

impl Entry for PassUniform
{
    fn get_layout(&self, binding: u32) -> wgpu::BindGroupLayoutEntry
    {
        match self
        {
            Self::Scene(uniform) => uniform.get_layout(binding),
            Self::Post(uniform) => uniform.get_layout(binding),
            Self::Zeroed(uniform) => uniform.get_layout(binding)
        }
    }

    fn get_resource(&self) -> wgpu::BindingResource
    {
        match self
        {
            Self::Scene(uniform) => uniform.get_resource(),
            Self::Post(uniform) => uniform.get_resource(),
            Self::Zeroed(uniform) => uniform.get_resource()
        }
    }
}

pub struct FullscreenPassDesc<'a>
{
    pub label: &'a str,
    pub source: &'a ShaderSource,
    pub entry_point: &'a str,
    pub block: UniformBlock,
    pub inputs: &'a [InputSlot],
    pub format: wgpu::TextureFormat
}

/// A compiled full-screen fragment program with its resolved bindings.
pub struct FullscreenPass
{
    label: String,
    interface: PassInterface,
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    uniform: Option<PassUniform>,
    bind_group: Option<BindGroup>
}

impl FullscreenPass
{
    /// Fails on shader errors. Binding mismatches are logged and the pass still builds.
    pub fn new(device: &wgpu::Device, fallback: &Texture, sampler: &wgpu::Sampler, desc: FullscreenPassDesc) -> Result<Self, ShaderError>
    {
        let program = ShaderProgram::load(desc.source)?;
        program.require_fragment_entry(desc.entry_point)?;

        let (interface, warnings) = program.interface(desc.block, desc.inputs)?;
        for warning in &warnings
        {
            log::warn!("Pass '{}': {}", desc.label, warning);
        }
        log::debug!("Pass '{}': {} of {} uniforms resolved", desc.label, interface.params.len(), desc.block.layout().len());

        let uniform = interface.uniform
            .map(|u| PassUniform::new(desc.block, u.span, device, desc.label));

        let layout = {
            let textures = interface.textures.iter()
                .map(|t| (t.binding, TextureEntry(fallback)))
                .collect::<Vec<_>>();
            let sampler_entry = SamplerEntry(sampler);
            let entries = Self::entries(&interface, uniform.as_ref(), &textures, &sampler_entry);
            BindGroup::create_layout(&entries, device, Some(desc.label))
        };

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(desc.label),
            source: wgpu::ShaderSource::Wgsl(program.code().into())
        });

        let pipeline = construct_fullscreen_pipeline(device, &FullscreenPipelineInfo {
            shader: &shader,
            vs_main: VERTEX_ENTRY,
            fs_main: desc.entry_point,
            bind_groups: &[&layout],
            format: desc.format,
            label: Some(desc.label)
        });

        log::debug!("Built pass '{}' ({} textures, uniform: {})", desc.label, interface.textures.len(), interface.uniform.is_some());

        Ok(Self
        {
            label: desc.label.to_string(),
            interface,
            pipeline,
            layout,
            uniform,
            bind_group: None
        })
    }

    /// Rebuilds the bind group against the current buffers. Required after every reallocation.
    pub fn rebind(&mut self, device: &wgpu::Device, buffers: &HashMap<BufferId, Texture>, fallback: &Texture, sampler: &wgpu::Sampler)
    {
        let textures = self.interface.textures.iter()
            .map(|t| {
                let texture = t.source.and_then(|id| buffers.get(&id)).unwrap_or(fallback);
                (t.binding, TextureEntry(texture))
            })
            .collect::<Vec<_>>();
        let sampler_entry = SamplerEntry(sampler);
        let entries = Self::entries(&self.interface, self.uniform.as_ref(), &textures, &sampler_entry);

        self.bind_group = Some(BindGroup::new(&entries, &self.layout, device, Some(&self.label)));
    }

    pub fn write_uniforms(&mut self, uniforms: &FrameUniforms, queue: &wgpu::Queue)
    {
        if let Some(uniform) = &mut self.uniform
        {
            uniform.write(uniforms, queue);
        }
    }

    pub fn record(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView)
    {
        let Some(bind_group) = &self.bind_group else
        {
            log::warn!("Pass '{}' has no bind group yet, skipping", self.label);
            return;
        };

        let mut render_pass = get_render_pass(encoder, target, Some(Color::BLACK), Some(&self.label));
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, bind_group.bind_group(), &[]);
        render_pass.draw(0..3, 0..1);
    }

    fn entries<'a>(interface: &PassInterface, uniform: Option<&'a PassUniform>, textures: &'a [(u32, TextureEntry<'a>)], sampler: &'a SamplerEntry<'a>) -> Vec<(u32, &'a dyn Entry)>
    {
        let mut entries: Vec<(u32, &'a dyn Entry)> = Vec::new();

        if let (Some(uniform), Some(binding)) = (uniform, interface.uniform)
        {
            entries.push((binding.binding, uniform as &dyn Entry));
        }

        for (binding, texture) in textures
        {
            entries.push((*binding, texture as &dyn Entry));
        }

        for binding in &interface.samplers
        {
            entries.push((*binding, sampler as &dyn Entry));
        }

        entries
    }
}
