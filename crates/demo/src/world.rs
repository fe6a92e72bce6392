use rt_engine::rt_core::camera::OrbitCamera;
use rt_engine::rt_core::scene::{self, SceneState};

use crate::config::{DemoConfig, SceneChoice};
use crate::controls::ControlInput;

/// Everything the simulation owns: the scene and the camera looking at it.
pub struct DemoWorld
{
    pub scene: SceneState,
    pub camera: OrbitCamera
}

impl DemoWorld
{
    pub fn new(config: &DemoConfig) -> Self
    {
        let choice = config.scene_choice();
        let scene = match choice
        {
            SceneChoice::Spheres => scene::spheres(),
            SceneChoice::SpheresAndBoxes => scene::spheres_and_boxes()
        };

        log::info!("Scene {:?} with {} objects", choice, scene.objects().len());

        Self
        {
            scene,
            camera: OrbitCamera::new(config.camera.distance, config.orbit_settings())
        }
    }

    pub fn on_update(&mut self, input: &ControlInput, delta_time: f32)
    {
        input.apply(&mut self.camera);
        self.scene.update(delta_time, &input.scene);
    }
}
