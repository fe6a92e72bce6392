pub mod camera;
pub mod gpu;
pub mod scene;

pub use glam;

/// Largest number of scene objects the raytrace pass can receive in one upload.
pub const MAX_PRIMITIVES: usize = 16;
