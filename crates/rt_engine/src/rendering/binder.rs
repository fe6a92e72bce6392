//! Host-side uniform blocks and the descriptor tables used to check them against shaders.

use std::mem::{offset_of, size_of};

use glam::UVec2;
use rt_core::camera::OrbitCamera;
use rt_core::gpu::{GpuMaterial, GpuPrimitive, SceneUpload};
use rt_core::scene::SceneState;
use rt_core::MAX_PRIMITIVES;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarType
{
    Float,
    Uint,
    Sint
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind
{
    Scalar(ScalarType),
    Vector(u8, ScalarType),
    Array
}

/// One named member of a uniform block and where the host writes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamDesc
{
    pub name: &'static str,
    pub kind: ParamKind,
    pub offset: u32
}

const fn param(name: &'static str, kind: ParamKind, offset: usize) -> ParamDesc
{
    ParamDesc { name, kind, offset: offset as u32 }
}

const F32: ParamKind = ParamKind::Scalar(ScalarType::Float);
const U32: ParamKind = ParamKind::Scalar(ScalarType::Uint);
const VEC2: ParamKind = ParamKind::Vector(2, ScalarType::Float);
const VEC3: ParamKind = ParamKind::Vector(3, ScalarType::Float);

/// Scene, light and camera data consumed by the raytrace pass.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SceneParams
{
    pub primitives: [GpuPrimitive; MAX_PRIMITIVES],
    pub materials: [GpuMaterial; MAX_PRIMITIVES],
    pub light_position: [f32; 3],
    pub light_intensity: f32,
    pub light_color: [f32; 3],
    pub primitive_count: u32,
    pub camera_eye: [f32; 3],
    pub time: f32,
    pub camera_target: [f32; 3],
    pub frame_index: u32,
    pub resolution: [f32; 2],
    pub fov: f32,
    pub pad: f32
}

unsafe impl bytemuck::Pod for SceneParams {}
unsafe impl bytemuck::Zeroable for SceneParams {}

impl SceneParams
{
    pub const LAYOUT: &'static [ParamDesc] = &[
        param("primitives", ParamKind::Array, offset_of!(SceneParams, primitives)),
        param("materials", ParamKind::Array, offset_of!(SceneParams, materials)),
        param("light_position", VEC3, offset_of!(SceneParams, light_position)),
        param("light_intensity", F32, offset_of!(SceneParams, light_intensity)),
        param("light_color", VEC3, offset_of!(SceneParams, light_color)),
        param("primitive_count", U32, offset_of!(SceneParams, primitive_count)),
        param("camera_eye", VEC3, offset_of!(SceneParams, camera_eye)),
        param("time", F32, offset_of!(SceneParams, time)),
        param("camera_target", VEC3, offset_of!(SceneParams, camera_target)),
        param("frame_index", U32, offset_of!(SceneParams, frame_index)),
        param("resolution", VEC2, offset_of!(SceneParams, resolution)),
        param("fov", F32, offset_of!(SceneParams, fov)),
    ];
}

/// Parameters shared by the full-screen post passes and presentation.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PostParams
{
    pub resolution: [f32; 2],
    pub time: f32,
    pub frame_index: u32,
    pub denoise_strength: f32,
    pub taa_blend: f32,
    pub history_valid: u32,
    pub flip_y: u32
}

unsafe impl bytemuck::Pod for PostParams {}
unsafe impl bytemuck::Zeroable for PostParams {}

impl PostParams
{
    pub const LAYOUT: &'static [ParamDesc] = &[
        param("resolution", VEC2, offset_of!(PostParams, resolution)),
        param("time", F32, offset_of!(PostParams, time)),
        param("frame_index", U32, offset_of!(PostParams, frame_index)),
        param("denoise_strength", F32, offset_of!(PostParams, denoise_strength)),
        param("taa_blend", F32, offset_of!(PostParams, taa_blend)),
        param("history_valid", U32, offset_of!(PostParams, history_valid)),
        param("flip_y", U32, offset_of!(PostParams, flip_y)),
    ];
}

/// Which host uniform block a pass receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformBlock
{
    None,
    Scene,
    Post
}

impl UniformBlock
{
    pub fn layout(self) -> &'static [ParamDesc]
    {
        match self
        {
            UniformBlock::None => &[],
            UniformBlock::Scene => SceneParams::LAYOUT,
            UniformBlock::Post => PostParams::LAYOUT
        }
    }

    pub fn size(self) -> u64
    {
        match self
        {
            UniformBlock::None => 0,
            UniformBlock::Scene => size_of::<SceneParams>() as u64,
            UniformBlock::Post => size_of::<PostParams>() as u64
        }
    }
}

/// What the sequencer knows about the frame it is about to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameInfo
{
    pub index: u64,
    pub extent: UVec2,
    /// False on the first frame and after a reallocation, when history holds no image.
    pub history_valid: bool,
    pub history_reset: bool
}

#[derive(Debug, Clone, Copy)]
pub struct FrameUniforms
{
    pub scene: SceneParams,
    pub post: PostParams
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostSettings
{
    pub denoise_strength: f32,
    pub taa_blend: f32,
    pub flip_y: bool
}

impl Default for PostSettings
{
    fn default() -> Self
    {
        Self
        {
            denoise_strength: 6.0,
            taa_blend: 0.9,
            flip_y: true
        }
    }
}

/// Builds every pass's uniform values for one frame.
#[derive(Debug, Clone)]
pub struct UniformBinder
{
    settings: PostSettings
}

impl UniformBinder
{
    pub fn new(settings: PostSettings) -> Self
    {
        Self { settings }
    }

    pub fn settings(&self) -> &PostSettings { &self.settings }

    pub fn bind(&self, scene: &SceneState, camera: &OrbitCamera, frame: &FrameInfo) -> FrameUniforms
    {
        let upload = SceneUpload::new(scene.objects());
        let light = scene.light();
        let resolution = [frame.extent.x as f32, frame.extent.y as f32];
        // the shaders only need a wrapping counter
        let frame_index = (frame.index % u32::MAX as u64) as u32;

        let scene_params = SceneParams
        {
            primitives: upload.primitives,
            materials: upload.materials,
            light_position: light.position.to_array(),
            light_intensity: light.intensity,
            light_color: light.color.to_array(),
            primitive_count: upload.count,
            camera_eye: camera.eye().to_array(),
            time: scene.time(),
            camera_target: camera.target().to_array(),
            frame_index,
            resolution,
            fov: camera.fov(),
            pad: 0.0
        };

        let post = PostParams
        {
            resolution,
            time: scene.time(),
            frame_index,
            denoise_strength: self.settings.denoise_strength,
            taa_blend: self.settings.taa_blend,
            history_valid: frame.history_valid as u32,
            flip_y: self.settings.flip_y as u32
        };

        FrameUniforms { scene: scene_params, post }
    }
}

#[cfg(test)]
mod tests
{
    use assert_approx_eq::assert_approx_eq;
    use rt_core::camera::OrbitSettings;
    use rt_core::scene::{spheres, SceneInput};
    use super::*;

    fn frame(index: u64, history_valid: bool) -> FrameInfo
    {
        FrameInfo { index, extent: UVec2::new(640, 360), history_valid, history_reset: false }
    }

    #[test]
    fn block_layouts_match_wgsl_rules()
    {
        assert_eq!(size_of::<SceneParams>(), 1104);
        assert_eq!(size_of::<PostParams>(), 32);
        assert_eq!(offset_of!(SceneParams, materials), 512);
        assert_eq!(offset_of!(SceneParams, light_position), 1024);
        assert_eq!(offset_of!(SceneParams, resolution), 1088);
    }

    #[test]
    fn vec3_members_are_16_byte_aligned()
    {
        for param in SceneParams::LAYOUT.iter().filter(|p| p.kind == VEC3)
        {
            assert_eq!(param.offset % 16, 0, "{} misaligned", param.name);
        }
    }

    #[test]
    fn binds_scene_camera_and_frame()
    {
        let mut scene = spheres();
        scene.update(1.0, &SceneInput::default());
        let camera = OrbitCamera::new(5.0, OrbitSettings::default());
        let binder = UniformBinder::new(PostSettings::default());

        let uniforms = binder.bind(&scene, &camera, &frame(7, true));

        assert_eq!(uniforms.scene.primitive_count, 8);
        assert_eq!(uniforms.scene.frame_index, 7);
        assert_eq!(uniforms.scene.resolution, [640.0, 360.0]);
        assert_eq!(uniforms.scene.light_position, scene.light().position.to_array());
        assert_approx_eq!(uniforms.scene.camera_eye[2], 5.0);
        assert_eq!(uniforms.scene.camera_target, [0.0, 0.0, 0.0]);
        assert_approx_eq!(uniforms.scene.time, 1.0);

        assert_eq!(uniforms.post.history_valid, 1);
        assert_eq!(uniforms.post.flip_y, 1);
        assert_approx_eq!(uniforms.post.denoise_strength, 6.0);
    }

    #[test]
    fn invalid_history_is_flagged()
    {
        let binder = UniformBinder::new(PostSettings::default());
        let camera = OrbitCamera::new(5.0, OrbitSettings::default());
        let uniforms = binder.bind(&spheres(), &camera, &frame(0, false));
        assert_eq!(uniforms.post.history_valid, 0);
    }
}
