pub use glam::{Vec2, Vec3, UVec2};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color 
{
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

unsafe impl bytemuck::Pod for Color {}
unsafe impl bytemuck::Zeroable for Color {}

impl Color
{
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };

    pub fn to_wgpu(self) -> wgpu::Color
    {
        wgpu::Color { r: self.r as f64, g: self.g as f64, b: self.b as f64, a: self.a as f64 }
    }
}
