use thiserror::Error;

use crate::rendering::graph::GraphError;
use crate::rendering::shader::ShaderError;

/// Anything that stops the demo before the first frame can be drawn.
#[derive(Debug, Error)]
pub enum StartupError
{
    #[error("could not create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("could not create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible graphics adapter found")]
    NoAdapter,
    #[error("could not open graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error("invalid render graph: {0}")]
    Graph(#[from] GraphError)
}
