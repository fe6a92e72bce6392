pub mod app;
pub mod error;
pub mod gpu_utils;
pub mod math;
pub mod prelude;
pub mod rendering;
pub mod utils;

pub use winit;
pub use wgpu;
pub use glam;
pub use egui;
pub use rt_core;
