use std::marker::PhantomData;

use crate::utils::Byteable;

pub struct GBuffer<T> where T : Byteable
{
    capacity: u64,
    handle: wgpu::Buffer,
    phantom: PhantomData<T>,
}

impl<T> GBuffer<T> where T : Byteable
{
    pub fn with_capacity(capacity: u64, usage: wgpu::BufferUsages, device: &wgpu::Device, label: Option<&str>) -> Self
    {
        let handle = device.create_buffer(&wgpu::BufferDescriptor {
            label,
            size: capacity * Self::stride(),
            usage,
            mapped_at_creation: false
        });

        Self
        {
            capacity,
            handle,
            phantom: PhantomData
        }
    }

    pub fn stride() -> u64 { std::mem::size_of::<T>() as u64 }

    pub fn enqueue_write(&mut self, data: &[T], queue: &wgpu::Queue)
    {
        assert!(data.len() as u64 <= self.capacity, "Data is larger than the capacity of this buffer.");
        queue.write_buffer(&self.handle, 0, bytemuck::cast_slice(data));
    }

    pub fn as_entire_binding(&self) -> wgpu::BindingResource
    {
        self.handle.as_entire_binding()
    }
}
