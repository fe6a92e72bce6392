pub use crate::winit;
pub use crate::wgpu;
pub use crate::glam;
pub use crate::egui;
pub use crate::rt_core;

pub use crate::math::{Vec2, Vec3, UVec2, Color};
pub use crate::egui::Window as GuiWindow;
pub use crate::error::StartupError;
pub use crate::app::input::{FrameState, MouseButton, KeyCode};
pub use crate::rendering::graph::{BufferDesc, BufferId, GraphDesc, InputSlot, PassDesc, ShaderRef};
pub use crate::rendering::binder::UniformBlock;
pub use crate::rendering::shader::ShaderSource;
