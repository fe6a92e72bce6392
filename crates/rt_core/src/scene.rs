use glam::{Vec2, Vec3};

use crate::MAX_PRIMITIVES;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape
{
    Sphere { radius: f32 },
    Box { half_extents: Vec3 }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive
{
    pub position: Vec3,
    pub shape: Shape
}

impl Primitive
{
    pub const fn sphere(position: Vec3, radius: f32) -> Self
    {
        Self { position, shape: Shape::Sphere { radius } }
    }

    pub const fn cuboid(position: Vec3, half_extents: Vec3) -> Self
    {
        Self { position, shape: Shape::Box { half_extents } }
    }
}

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind
{
    Diffuse = 0,
    Metallic = 1,
    Dielectric = 2,
    Emissive = 3,
    Mirror = 4
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material
{
    pub kind: MaterialKind,
    pub roughness: f32,
    /// Only read by the shading pass for `Dielectric`.
    pub ior: f32,
    pub albedo: Vec3
}

impl Material
{
    pub const fn new(kind: MaterialKind, roughness: f32, ior: f32, albedo: Vec3) -> Self
    {
        Self { kind, roughness, ior, albedo }
    }
}

/// A primitive together with the material it is shaded with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneObject
{
    pub primitive: Primitive,
    pub material: Material
}

impl SceneObject
{
    pub const fn new(primitive: Primitive, material: Material) -> Self
    {
        Self { primitive, material }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light
{
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32
}

/// Closed path followed by the light: `(5cos(0.5t), 5 + 2sin(0.3t), 3sin(0.7t))`.
pub fn light_orbit(time: f32) -> Vec3
{
    Vec3::new(
        5.0 * (time * 0.5).cos(),
        5.0 + 2.0 * (time * 0.3).sin(),
        3.0 * (time * 0.7).sin()
    )
}

/// Hue cycle used when colour cycling is enabled.
pub fn cycle_color(time: f32) -> Vec3
{
    const PHASES: Vec3 = Vec3::new(0.0, 2.094, 4.189);
    Vec3::new(
        0.5 + 0.5 * (time + PHASES.x).cos(),
        0.5 + 0.5 * (time + PHASES.y).cos(),
        0.5 + 0.5 * (time + PHASES.z).cos()
    )
}

/// Per-frame user adjustments to the scene.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SceneInput
{
    /// Light offset accumulated this frame, in world units (x, y).
    pub light_nudge: Vec2,
    pub intensity_delta: f32,
    pub toggle_color_cycle: bool
}

#[derive(Debug, Clone)]
pub struct SceneState
{
    objects: Vec<SceneObject>,
    light: Light,
    base_light_color: Vec3,
    light_offset: Vec3,
    color_cycle: bool,
    time: f32
}

impl SceneState
{
    pub fn new(objects: Vec<SceneObject>, light: Light) -> Self
    {
        if objects.len() > MAX_PRIMITIVES
        {
            log::warn!("Scene has {} objects, only the first {} are uploaded", objects.len(), MAX_PRIMITIVES);
        }

        Self
        {
            objects,
            base_light_color: light.color,
            light,
            light_offset: Vec3::ZERO,
            color_cycle: false,
            time: 0.0
        }
    }

    pub fn objects(&self) -> &[SceneObject] { &self.objects }
    pub fn light(&self) -> &Light { &self.light }
    pub fn time(&self) -> f32 { self.time }
    pub fn is_color_cycling(&self) -> bool { self.color_cycle }
    /// Objects that do not fit the GPU arrays.
    pub fn dropped_objects(&self) -> usize { self.objects.len().saturating_sub(MAX_PRIMITIVES) }

    pub fn primitives(&self) -> impl Iterator<Item = (&Primitive, &Material)>
    {
        self.objects.iter().map(|o| (&o.primitive, &o.material))
    }

    pub fn update(&mut self, delta_time: f32, input: &SceneInput)
    {
        self.time += delta_time;

        if input.toggle_color_cycle
        {
            self.color_cycle = !self.color_cycle;
            log::info!("Light colour cycling {}", if self.color_cycle { "enabled" } else { "disabled" });
        }

        self.light_offset += Vec3::new(input.light_nudge.x, input.light_nudge.y, 0.0);
        self.light.position = light_orbit(self.time) + self.light_offset;
        self.light.intensity += input.intensity_delta;

        self.light.color = if self.color_cycle
        {
            cycle_color(self.time)
        }
        else
        {
            self.base_light_color
        };
    }
}

pub fn default_light() -> Light
{
    Light
    {
        position: Vec3::new(5.0, 10.0, -2.0),
        color: Vec3::new(1.0, 0.9, 0.8),
        intensity: 5.0
    }
}

/// Seven spheres standing on a large ground sphere.
pub fn spheres() -> SceneState
{
    use MaterialKind::*;

    let objects = vec![
        SceneObject::new(Primitive::sphere(Vec3::new(0.0, 0.0, 0.0), 1.0), Material::new(Diffuse, 0.2, 1.0, Vec3::new(0.9, 0.3, 0.3))),
        SceneObject::new(Primitive::sphere(Vec3::new(-2.5, 0.0, 0.0), 1.0), Material::new(Metallic, 0.1, 1.0, Vec3::new(0.8, 0.8, 0.9))),
        SceneObject::new(Primitive::sphere(Vec3::new(2.5, 0.0, 0.0), 1.0), Material::new(Dielectric, 0.0, 1.5, Vec3::new(0.9, 0.9, 0.9))),
        SceneObject::new(Primitive::sphere(Vec3::new(0.0, -1001.0, 0.0), 1000.0), Material::new(Diffuse, 0.5, 1.0, Vec3::new(0.8, 0.8, 0.8))),
        SceneObject::new(Primitive::sphere(Vec3::new(0.0, 0.0, -2.5), 1.0), Material::new(Diffuse, 0.3, 1.0, Vec3::new(0.3, 0.9, 0.3))),
        SceneObject::new(Primitive::sphere(Vec3::new(0.0, 0.0, 2.5), 1.0), Material::new(Metallic, 0.2, 1.0, Vec3::new(0.9, 0.6, 0.2))),
        SceneObject::new(Primitive::sphere(Vec3::new(-1.5, 0.0, -1.5), 0.5), Material::new(Dielectric, 0.1, 1.3, Vec3::new(0.3, 0.7, 0.9))),
        SceneObject::new(Primitive::sphere(Vec3::new(1.5, 0.0, 1.5), 0.5), Material::new(Emissive, 0.0, 1.0, Vec3::new(0.9, 0.9, 0.0))),
    ];

    SceneState::new(objects, default_light())
}

/// The sphere scene with a mirror slab and two boxes added.
pub fn spheres_and_boxes() -> SceneState
{
    use MaterialKind::*;

    let mut objects = spheres().objects;
    objects.extend([
        SceneObject::new(Primitive::cuboid(Vec3::new(0.0, 0.5, -5.0), Vec3::new(3.0, 1.5, 0.1)), Material::new(Mirror, 0.0, 1.0, Vec3::new(0.95, 0.95, 0.95))),
        SceneObject::new(Primitive::cuboid(Vec3::new(3.5, -0.5, -2.5), Vec3::new(0.5, 0.5, 0.5)), Material::new(Diffuse, 0.6, 1.0, Vec3::new(0.2, 0.4, 0.9))),
        SceneObject::new(Primitive::cuboid(Vec3::new(-3.5, -0.25, 2.0), Vec3::new(0.75, 0.75, 0.4)), Material::new(Metallic, 0.35, 1.0, Vec3::new(0.7, 0.3, 0.7))),
    ]);

    SceneState::new(objects, default_light())
}
