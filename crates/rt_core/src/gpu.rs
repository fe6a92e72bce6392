use crate::scene::{Material, Primitive, SceneObject, Shape};
use crate::MAX_PRIMITIVES;

pub const SHAPE_SPHERE: u32 = 0;
pub const SHAPE_BOX: u32 = 1;

/// Primitive as laid out in the shader's uniform block (32 bytes).
/// For spheres `extent.x` holds the radius, for boxes `extent` holds the half extents.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GpuPrimitive
{
    pub position: [f32; 3],
    pub kind: u32,
    pub extent: [f32; 3],
    pub pad: f32
}

unsafe impl bytemuck::Pod for GpuPrimitive {}
unsafe impl bytemuck::Zeroable for GpuPrimitive {}

impl From<&Primitive> for GpuPrimitive
{
    fn from(primitive: &Primitive) -> Self
    {
        let (kind, extent) = match primitive.shape
        {
            Shape::Sphere { radius } => (SHAPE_SPHERE, [radius, 0.0, 0.0]),
            Shape::Box { half_extents } => (SHAPE_BOX, half_extents.to_array())
        };

        Self
        {
            position: primitive.position.to_array(),
            kind,
            extent,
            pad: 0.0
        }
    }
}

/// Material as laid out in the shader's uniform block (32 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GpuMaterial
{
    pub kind: i32,
    pub roughness: f32,
    pub ior: f32,
    pub pad0: f32,
    pub albedo: [f32; 3],
    pub pad1: f32
}

unsafe impl bytemuck::Pod for GpuMaterial {}
unsafe impl bytemuck::Zeroable for GpuMaterial {}

impl From<&Material> for GpuMaterial
{
    fn from(material: &Material) -> Self
    {
        Self
        {
            kind: material.kind as i32,
            roughness: material.roughness,
            ior: material.ior,
            pad0: 0.0,
            albedo: material.albedo.to_array(),
            pad1: 0.0
        }
    }
}

/// Both scene arrays, filled from the same objects so index `i` of one always pairs with index `i` of the other.
#[derive(Debug, Clone, Copy)]
pub struct SceneUpload
{
    pub primitives: [GpuPrimitive; MAX_PRIMITIVES],
    pub materials: [GpuMaterial; MAX_PRIMITIVES],
    pub count: u32
}

impl SceneUpload
{
    /// Objects past `MAX_PRIMITIVES` are left out.
    pub fn new(objects: &[SceneObject]) -> Self
    {
        let mut primitives = [GpuPrimitive::default(); MAX_PRIMITIVES];
        let mut materials = [GpuMaterial::default(); MAX_PRIMITIVES];
        let count = objects.len().min(MAX_PRIMITIVES);

        for (i, object) in objects.iter().take(count).enumerate()
        {
            primitives[i] = GpuPrimitive::from(&object.primitive);
            materials[i] = GpuMaterial::from(&object.material);
        }

        Self { primitives, materials, count: count as u32 }
    }
}

#[cfg(test)]
mod tests
{
    use glam::Vec3;
    use super::*;
    use crate::scene::{spheres, spheres_and_boxes, MaterialKind};

    #[test]
    fn upload_structs_are_32_bytes()
    {
        assert_eq!(std::mem::size_of::<GpuPrimitive>(), 32);
        assert_eq!(std::mem::size_of::<GpuMaterial>(), 32);
    }

    #[test]
    fn upload_keeps_pairs_aligned()
    {
        let scene = spheres_and_boxes();
        let upload = SceneUpload::new(scene.objects());

        assert_eq!(upload.count as usize, scene.objects().len());
        for (i, object) in scene.objects().iter().enumerate()
        {
            assert_eq!(upload.primitives[i].position, object.primitive.position.to_array());
            assert_eq!(upload.materials[i].kind, object.material.kind as i32);
            assert_eq!(upload.materials[i].albedo, object.material.albedo.to_array());
        }
    }

    #[test]
    fn shapes_encode_their_extent()
    {
        let sphere = GpuPrimitive::from(&Primitive::sphere(Vec3::ONE, 2.5));
        assert_eq!(sphere.kind, SHAPE_SPHERE);
        assert_eq!(sphere.extent, [2.5, 0.0, 0.0]);

        let cuboid = GpuPrimitive::from(&Primitive::cuboid(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(cuboid.kind, SHAPE_BOX);
        assert_eq!(cuboid.extent, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn ground_sphere_is_fourth_object()
    {
        let upload = SceneUpload::new(spheres().objects());
        assert_eq!(upload.count, 8);
        assert_eq!(upload.primitives[3].extent[0], 1000.0);
        assert_eq!(upload.materials[2].kind, MaterialKind::Dielectric as i32);
        assert_eq!(upload.materials[2].ior, 1.5);
    }

    #[test]
    fn oversized_scene_is_truncated()
    {
        let object = spheres().objects()[0];
        let objects = vec![object; MAX_PRIMITIVES + 4];
        let upload = SceneUpload::new(&objects);
        assert_eq!(upload.count as usize, MAX_PRIMITIVES);
    }
}
