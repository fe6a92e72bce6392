use wgpu::BindGroupDescriptor;

use crate::{gpu_utils::{GBuffer, Texture}, utils::Byteable};

pub trait Entry
{
    fn get_layout(&self, binding: u32) -> wgpu::BindGroupLayoutEntry;
    fn get_resource(&self) -> wgpu::BindingResource;
}

pub struct BindGroup
{
    handle: wgpu::BindGroup
}

impl BindGroup
{
    pub fn bind_group(&self) -> &wgpu::BindGroup { &self.handle }

    /// Builds the layout for `(binding, entry)` pairs. Bindings need not be contiguous.
    pub fn create_layout(entries: &[(u32, &dyn Entry)], device: &wgpu::Device, label: Option<&str>) -> wgpu::BindGroupLayout
    {
        let entry_layouts = entries.iter()
            .map(|(binding, entry)| entry.get_layout(*binding))
            .collect::<Vec<_>>();

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label,
            entries: &entry_layouts
        })
    }

    pub fn new(entries: &[(u32, &dyn Entry)], layout: &wgpu::BindGroupLayout, device: &wgpu::Device, label: Option<&str>) -> Self
    {
        let bind_group_entries = entries.iter()
            .map(|(binding, entry)| wgpu::BindGroupEntry {
                binding: *binding,
                resource: entry.get_resource()
            })
            .collect::<Vec<_>>();

        let handle = device.create_bind_group(&BindGroupDescriptor {
            label,
            layout,
            entries: &bind_group_entries
        });

        Self { handle }
    }
}

pub struct Uniform<T> where T : Byteable
{
    buffer: GBuffer<T>,
    visibility: wgpu::ShaderStages
}

impl<T> Uniform<T> where T : Byteable
{
    /// A uniform whose buffer spans at least `min_size` bytes, for shaders declaring a larger block than `T`.
    pub fn with_min_size(min_size: u64, visibility: wgpu::ShaderStages, device: &wgpu::Device, label: Option<&str>) -> Self
    {
        let buffer_usage = wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST;
        let stride = GBuffer::<T>::stride().max(1);
        let capacity = ((min_size + stride - 1) / stride).max(1);
        let buffer = GBuffer::<T>::with_capacity(capacity, buffer_usage, device, label);
        Self
        {
            buffer,
            visibility
        }
    }

    pub fn enqueue_write(&mut self, value: T, queue: &wgpu::Queue)
    {
        self.buffer.enqueue_write(&[value], queue);
    }
}

impl<T> Entry for Uniform<T> where T : Byteable
{
    fn get_layout(&self, binding: u32) -> wgpu::BindGroupLayoutEntry
    {
        wgpu::BindGroupLayoutEntry
        {
            binding,
            visibility: self.visibility,
            ty: wgpu::BindingType::Buffer
            {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None
            },
            count: None
        }
    }

    fn get_resource(&self) -> wgpu::BindingResource
    {
        self.buffer.as_entire_binding()
    }
}

/// A sampled, filterable 2D texture visible to fragment shaders.
pub struct TextureEntry<'a>(pub &'a Texture);

impl<'a> Entry for TextureEntry<'a>
{
    fn get_layout(&self, binding: u32) -> wgpu::BindGroupLayoutEntry
    {
        wgpu::BindGroupLayoutEntry
        {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture
            {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false
            },
            count: None
        }
    }

    fn get_resource(&self) -> wgpu::BindingResource
    {
        wgpu::BindingResource::TextureView(&self.0.view)
    }
}

pub struct SamplerEntry<'a>(pub &'a wgpu::Sampler);

impl<'a> Entry for SamplerEntry<'a>
{
    fn get_layout(&self, binding: u32) -> wgpu::BindGroupLayoutEntry
    {
        wgpu::BindGroupLayoutEntry
        {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None
        }
    }

    fn get_resource(&self) -> wgpu::BindingResource
    {
        wgpu::BindingResource::Sampler(self.0)
    }
}
