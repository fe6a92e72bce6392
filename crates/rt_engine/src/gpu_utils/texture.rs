use glam::UVec2;

pub struct Texture
{
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    size: UVec2
}

impl Texture
{
    /// Format of every offscreen render buffer.
    pub const RENDER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

    pub fn size(&self) -> UVec2 { self.size }

    /// A colour target that later passes can sample and that can be copied to and from.
    pub fn create_render_buffer(device: &wgpu::Device, size: UVec2, label: &str) -> Self
    {
        let usage = wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC
            | wgpu::TextureUsages::COPY_DST;

        Self::create(device, size.max(UVec2::ONE), Self::RENDER_FORMAT, usage, label)
    }

    /// 1x1 black texture bound wherever a shader samples something the host does not provide.
    pub fn create_fallback(device: &wgpu::Device) -> Self
    {
        Self::create(device, UVec2::ONE, Self::RENDER_FORMAT, wgpu::TextureUsages::TEXTURE_BINDING, "fallback_texture")
    }

    pub fn create_sampler(device: &wgpu::Device) -> wgpu::Sampler
    {
        device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("linear_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        })
    }

    fn create(device: &wgpu::Device, size: UVec2, format: wgpu::TextureFormat, usage: wgpu::TextureUsages, label: &str) -> Self
    {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d
            {
                width: size.x,
                height: size.y,
                depth_or_array_layers: 1
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[]
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self { texture, view, size }
    }
}
