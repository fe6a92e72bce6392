use rt_engine::prelude::*;
use rt_engine::rt_core::camera::OrbitCamera;
use rt_engine::rt_core::scene::SceneInput;

use crate::config::LightConfig;

pub const ROTATE_BUTTON: MouseButton = MouseButton::Right;

pub const LIGHT_LEFT: KeyCode = KeyCode::H;
pub const LIGHT_RIGHT: KeyCode = KeyCode::K;
pub const LIGHT_UP: KeyCode = KeyCode::U;
pub const LIGHT_DOWN: KeyCode = KeyCode::J;
pub const INTENSITY_DOWN: KeyCode = KeyCode::Y;
pub const INTENSITY_UP: KeyCode = KeyCode::I;
pub const TOGGLE_COLOR_CYCLE: KeyCode = KeyCode::C;
pub const QUIT: KeyCode = KeyCode::Escape;

/// Lines shown in the HUD, matching the bindings above.
pub const CONTROL_HINTS: &[&str] = &[
    "Mouse Right - Rotate camera",
    "Mouse Wheel - Zoom in/out",
    "H/K/U/J - Move light",
    "Y/I - Decrease/increase intensity",
    "C - Cycle light colour",
    "Esc - Quit"
];

/// One frame of input translated into demo actions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlInput
{
    pub begin_drag: bool,
    pub end_drag: bool,
    /// Pointer motion in pixels.
    pub pointer_delta: Vec2,
    /// Scroll in lines.
    pub scroll: f32,
    pub scene: SceneInput,
    pub quit: bool
}

impl ControlInput
{
    pub fn from_frame(frame: &FrameState, light: &LightConfig) -> Self
    {
        let axis = |negative: KeyCode, positive: KeyCode| -> f32
        {
            (frame.is_key_down(positive) as i32 - frame.is_key_down(negative) as i32) as f32
        };

        let dt = frame.delta_time();
        let nudge = Vec2::new(axis(LIGHT_LEFT, LIGHT_RIGHT), axis(LIGHT_DOWN, LIGHT_UP));

        Self
        {
            begin_drag: frame.is_mouse_button_pressed(ROTATE_BUTTON),
            end_drag: frame.is_mouse_button_released(ROTATE_BUTTON),
            pointer_delta: frame.mouse_delta(),
            scroll: frame.scroll_delta().y,
            scene: SceneInput
            {
                light_nudge: nudge * light.nudge_speed * dt,
                intensity_delta: axis(INTENSITY_DOWN, INTENSITY_UP) * light.intensity_rate * dt,
                toggle_color_cycle: frame.is_key_pressed(TOGGLE_COLOR_CYCLE)
            },
            quit: frame.is_key_pressed(QUIT)
        }
    }

    pub fn apply(&self, camera: &mut OrbitCamera)
    {
        if self.begin_drag
        {
            camera.begin_drag();
        }

        camera.rotate(self.pointer_delta);

        if self.end_drag
        {
            camera.end_drag();
        }

        if self.scroll != 0.0
        {
            camera.zoom(self.scroll);
        }
    }
}

#[cfg(test)]
mod tests
{
    use assert_approx_eq::assert_approx_eq;
    use rt_engine::app::input::FrameStateBuilder;
    use rt_engine::rt_core::camera::OrbitSettings;
    use rt_engine::winit::event::ElementState;
    use super::*;

    fn builder() -> FrameStateBuilder
    {
        FrameStateBuilder::new(None, &FrameState::default())
    }

    #[test]
    fn held_keys_scale_with_frame_time()
    {
        let mut frame = builder();
        frame.on_key(LIGHT_RIGHT, ElementState::Pressed);
        frame.on_key(LIGHT_UP, ElementState::Pressed);
        frame.on_key(INTENSITY_DOWN, ElementState::Pressed);

        let input = ControlInput::from_frame(&frame.build(0.5), &LightConfig { nudge_speed: 4.0, intensity_rate: 2.0 });

        assert_approx_eq!(input.scene.light_nudge.x, 2.0);
        assert_approx_eq!(input.scene.light_nudge.y, 2.0);
        assert_approx_eq!(input.scene.intensity_delta, -1.0);
        assert!(!input.scene.toggle_color_cycle);
    }

    #[test]
    fn opposite_keys_cancel()
    {
        let mut frame = builder();
        frame.on_key(LIGHT_LEFT, ElementState::Pressed);
        frame.on_key(LIGHT_RIGHT, ElementState::Pressed);

        let input = ControlInput::from_frame(&frame.build(1.0), &LightConfig::default());
        assert_eq!(input.scene.light_nudge, Vec2::ZERO);
    }

    #[test]
    fn unmapped_keys_do_nothing()
    {
        let mut frame = builder();
        frame.on_key(KeyCode::Q, ElementState::Pressed);
        frame.on_mouse_button(MouseButton::Middle, ElementState::Pressed);

        let input = ControlInput::from_frame(&frame.build(1.0), &LightConfig::default());
        assert_eq!(input, ControlInput::default());
    }

    #[test]
    fn drag_rotates_only_while_held()
    {
        let mut camera = OrbitCamera::new(5.0, OrbitSettings::default());

        let mut frame = builder();
        frame.on_mouse_motion(Vec2::new(10.0, 0.0));
        ControlInput::from_frame(&frame.build(0.016), &LightConfig::default()).apply(&mut camera);
        assert_approx_eq!(camera.yaw(), 0.0);

        let mut frame = builder();
        frame.on_mouse_button(ROTATE_BUTTON, ElementState::Pressed);
        frame.on_mouse_motion(Vec2::new(10.0, 0.0));
        let state = frame.build(0.016);
        ControlInput::from_frame(&state, &LightConfig::default()).apply(&mut camera);
        assert!(camera.is_dragging());
        assert_approx_eq!(camera.yaw(), -2.0);

        let mut frame = FrameStateBuilder::new(None, &state);
        frame.on_mouse_button(ROTATE_BUTTON, ElementState::Released);
        ControlInput::from_frame(&frame.build(0.016), &LightConfig::default()).apply(&mut camera);
        assert!(!camera.is_dragging());
    }

    #[allow(deprecated)]
    fn release_over_gui(button: MouseButton) -> rt_engine::winit::event::Event<'static, ()>
    {
        use rt_engine::winit::event::{DeviceId, Event, WindowEvent};
        use rt_engine::winit::window::WindowId;

        Event::WindowEvent
        {
            window_id: unsafe { WindowId::dummy() },
            event: WindowEvent::MouseInput
            {
                device_id: unsafe { DeviceId::dummy() },
                state: ElementState::Released,
                button,
                modifiers: Default::default()
            }
        }
    }

    #[test]
    fn release_over_the_hud_ends_the_drag()
    {
        let light = LightConfig::default();
        let mut camera = OrbitCamera::new(5.0, OrbitSettings::default());

        let mut frame = builder();
        frame.on_mouse_button(ROTATE_BUTTON, ElementState::Pressed);
        let held = frame.build(0.016);
        ControlInput::from_frame(&held, &light).apply(&mut camera);
        assert!(camera.is_dragging());

        let mut frame = FrameStateBuilder::new(None, &held);
        frame.on_consumed_event(&release_over_gui(ROTATE_BUTTON));
        let released = frame.build(0.016);
        ControlInput::from_frame(&released, &light).apply(&mut camera);
        assert!(!camera.is_dragging());

        let mut frame = FrameStateBuilder::new(None, &released);
        frame.on_mouse_motion(Vec2::new(25.0, 10.0));
        ControlInput::from_frame(&frame.build(0.016), &light).apply(&mut camera);
        assert_approx_eq!(camera.yaw(), 0.0);
        assert_approx_eq!(camera.pitch(), 0.0);
    }

    #[test]
    fn scrolling_zooms_in_steps()
    {
        let mut camera = OrbitCamera::new(5.0, OrbitSettings::default());

        let mut frame = builder();
        frame.on_scroll(rt_engine::winit::event::MouseScrollDelta::LineDelta(0.0, 2.0));
        ControlInput::from_frame(&frame.build(0.016), &LightConfig::default()).apply(&mut camera);

        assert_approx_eq!(camera.distance(), 4.0);
    }

    #[test]
    fn toggle_and_quit_fire_on_press()
    {
        let mut frame = builder();
        frame.on_key(TOGGLE_COLOR_CYCLE, ElementState::Pressed);
        frame.on_key(QUIT, ElementState::Pressed);

        let input = ControlInput::from_frame(&frame.build(0.016), &LightConfig::default());
        assert!(input.scene.toggle_color_cycle);
        assert!(input.quit);
    }
}
