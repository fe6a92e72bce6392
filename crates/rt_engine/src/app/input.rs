use glam::Vec2;
use winit::event::{DeviceEvent, ElementState, Event, KeyboardInput, MouseScrollDelta, WindowEvent};
use winit::window::WindowId;

pub use winit::event::{MouseButton, VirtualKeyCode as KeyCode};

/// Pixels that count as one scroll line for touchpads reporting pixel deltas.
const PIXELS_PER_LINE: f32 = 20.0;

/// Input gathered over one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameState
{
    keys_pressed: Vec<KeyCode>,
    keys_down: Vec<KeyCode>,

    mouse_delta: Vec2,

    mouse_buttons_pressed: Vec<MouseButton>,
    mouse_buttons_released: Vec<MouseButton>,
    mouse_buttons_down: Vec<MouseButton>,
    scroll_delta: Vec2,

    delta_time: f32
}

impl FrameState
{
    pub fn is_key_down(&self, keycode: KeyCode) -> bool { self.keys_down.contains(&keycode) }
    pub fn is_key_pressed(&self, keycode: KeyCode) -> bool { self.keys_pressed.contains(&keycode) }

    pub fn is_mouse_button_down(&self, mouse_button: MouseButton) -> bool { self.mouse_buttons_down.contains(&mouse_button) }
    pub fn is_mouse_button_pressed(&self, mouse_button: MouseButton) -> bool { self.mouse_buttons_pressed.contains(&mouse_button) }
    pub fn is_mouse_button_released(&self, mouse_button: MouseButton) -> bool { self.mouse_buttons_released.contains(&mouse_button) }

    pub fn delta_time(&self) -> f32 { self.delta_time }

    /// Raw pointer motion summed over the frame.
    pub fn mouse_delta(&self) -> Vec2 { self.mouse_delta }
    /// Scroll in lines, positive away from the user.
    pub fn scroll_delta(&self) -> Vec2 { self.scroll_delta }
}

pub struct FrameStateBuilder
{
    window: Option<WindowId>,

    keys_pressed: Vec<KeyCode>,
    keys_down: Vec<KeyCode>,

    mouse_buttons_pressed: Vec<MouseButton>,
    mouse_buttons_released: Vec<MouseButton>,
    mouse_buttons_down: Vec<MouseButton>,
    scroll_delta: Vec2,

    mouse_delta: Vec2
}

impl FrameStateBuilder
{
    /// Starts a frame that keeps held keys and buttons from `previous_frame`.
    /// With `window` set, window events for other windows are ignored.
    pub fn new(window: Option<WindowId>, previous_frame: &FrameState) -> Self
    {
        Self
        {
            window,
            keys_pressed: vec![],
            keys_down: previous_frame.keys_down.clone(),
            mouse_buttons_pressed: vec![],
            mouse_buttons_released: vec![],
            mouse_buttons_down: previous_frame.mouse_buttons_down.clone(),
            scroll_delta: Vec2::ZERO,
            mouse_delta: Vec2::ZERO
        }
    }

    pub fn on_event<'a, T>(&mut self, event: &Event<'a, T>)
    {
        match event
        {
            Event::WindowEvent {
                ref event,
                window_id,
            }

            if self.window.map_or(true, |id| id == *window_id) =>
            {
                match event
                {
                    WindowEvent::KeyboardInput
                    {
                        input: KeyboardInput {
                            state,
                            virtual_keycode: Some(keycode),
                            ..
                        },
                        ..
                    } => self.on_key(*keycode, *state),

                    WindowEvent::MouseInput
                    {
                        state,
                        button,
                        ..
                    } => self.on_mouse_button(*button, *state),

                    WindowEvent::MouseWheel
                    {
                        delta,
                        ..
                    } => self.on_scroll(*delta),

                    _ => {}
                }
            },

            Event::DeviceEvent
            {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } => self.on_mouse_motion(Vec2::new(delta.0 as f32, delta.1 as f32)),

            _ => {}
        }
    }

    /// For events the GUI consumed: only releases are recorded, so a key or button
    /// pressed outside the GUI still comes up when it is released over it.
    pub fn on_consumed_event<'a, T>(&mut self, event: &Event<'a, T>)
    {
        let Event::WindowEvent { event, window_id } = event else { return };
        if self.window.map_or(false, |id| id != *window_id)
        {
            return;
        }

        match event
        {
            WindowEvent::KeyboardInput
            {
                input: KeyboardInput {
                    state: ElementState::Released,
                    virtual_keycode: Some(keycode),
                    ..
                },
                ..
            } => self.on_key(*keycode, ElementState::Released),

            WindowEvent::MouseInput
            {
                state: ElementState::Released,
                button,
                ..
            } => self.on_mouse_button(*button, ElementState::Released),

            _ => {}
        }
    }

    pub fn on_key(&mut self, keycode: KeyCode, state: ElementState)
    {
        match state
        {
            ElementState::Pressed =>
            {
                // key repeat reports presses for keys that are already down
                if !self.keys_down.contains(&keycode)
                {
                    self.keys_pressed.push(keycode);
                    self.keys_down.push(keycode);
                }
            },
            ElementState::Released =>
            {
                self.keys_down.retain(|&x| x != keycode);
            },
        }
    }

    pub fn on_mouse_button(&mut self, button: MouseButton, state: ElementState)
    {
        match state
        {
            ElementState::Pressed =>
            {
                self.mouse_buttons_pressed.push(button);
                self.mouse_buttons_down.push(button);
            },
            ElementState::Released =>
            {
                self.mouse_buttons_down.retain(|&b| b != button);
                self.mouse_buttons_released.push(button);
            },
        }
    }

    pub fn on_scroll(&mut self, delta: MouseScrollDelta)
    {
        self.scroll_delta += match delta
        {
            MouseScrollDelta::LineDelta(x, y) => Vec2::new(x, y),
            MouseScrollDelta::PixelDelta(position) => Vec2::new(position.x as f32, position.y as f32) / PIXELS_PER_LINE
        };
    }

    pub fn on_mouse_motion(&mut self, delta: Vec2)
    {
        self.mouse_delta += delta;
    }

    pub fn build(&self, delta_time: f32) -> FrameState
    {
        FrameState
        {
            keys_pressed: self.keys_pressed.clone(),
            keys_down: self.keys_down.clone(),
            mouse_delta: self.mouse_delta,
            mouse_buttons_pressed: self.mouse_buttons_pressed.clone(),
            mouse_buttons_released: self.mouse_buttons_released.clone(),
            mouse_buttons_down: self.mouse_buttons_down.clone(),
            scroll_delta: self.scroll_delta,
            delta_time
        }
    }
}

#[cfg(test)]
mod tests
{
    use assert_approx_eq::assert_approx_eq;
    use winit::dpi::PhysicalPosition;
    use winit::event::DeviceId;

    use super::*;

    #[allow(deprecated)]
    fn mouse_event(button: MouseButton, state: ElementState) -> Event<'static, ()>
    {
        Event::WindowEvent
        {
            window_id: unsafe { WindowId::dummy() },
            event: WindowEvent::MouseInput
            {
                device_id: unsafe { DeviceId::dummy() },
                state,
                button,
                modifiers: Default::default()
            }
        }
    }

    #[test]
    fn held_keys_survive_into_next_frame()
    {
        let mut builder = FrameStateBuilder::new(None, &FrameState::default());
        builder.on_key(KeyCode::H, ElementState::Pressed);
        let first = builder.build(0.016);
        assert!(first.is_key_pressed(KeyCode::H));
        assert!(first.is_key_down(KeyCode::H));

        let second = FrameStateBuilder::new(None, &first).build(0.016);
        assert!(!second.is_key_pressed(KeyCode::H));
        assert!(second.is_key_down(KeyCode::H));
    }

    #[test]
    fn repeated_presses_are_not_new_presses()
    {
        let mut builder = FrameStateBuilder::new(None, &FrameState::default());
        builder.on_key(KeyCode::C, ElementState::Pressed);
        let first = builder.build(0.016);

        let mut builder = FrameStateBuilder::new(None, &first);
        builder.on_key(KeyCode::C, ElementState::Pressed);
        assert!(!builder.build(0.016).is_key_pressed(KeyCode::C));
    }

    #[test]
    fn motion_and_scroll_accumulate()
    {
        let mut builder = FrameStateBuilder::new(None, &FrameState::default());
        builder.on_mouse_motion(Vec2::new(3.0, -1.0));
        builder.on_mouse_motion(Vec2::new(2.0, 4.0));
        builder.on_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));
        builder.on_scroll(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 40.0)));

        let frame = builder.build(0.016);
        assert_eq!(frame.mouse_delta(), Vec2::new(5.0, 3.0));
        assert_approx_eq!(frame.scroll_delta().y, 3.0);
        assert_approx_eq!(frame.delta_time(), 0.016);
    }

    #[test]
    fn released_buttons_stop_being_down()
    {
        let mut builder = FrameStateBuilder::new(None, &FrameState::default());
        builder.on_mouse_button(MouseButton::Right, ElementState::Pressed);
        let first = builder.build(0.016);
        assert!(first.is_mouse_button_down(MouseButton::Right));

        let mut builder = FrameStateBuilder::new(None, &first);
        builder.on_mouse_button(MouseButton::Right, ElementState::Released);
        let second = builder.build(0.016);
        assert!(!second.is_mouse_button_down(MouseButton::Right));
        assert!(second.is_mouse_button_released(MouseButton::Right));
    }

    #[test]
    fn consumed_release_still_lifts_the_button()
    {
        let mut builder = FrameStateBuilder::new(None, &FrameState::default());
        builder.on_event(&mouse_event(MouseButton::Right, ElementState::Pressed));
        let held = builder.build(0.016);
        assert!(held.is_mouse_button_down(MouseButton::Right));

        let mut builder = FrameStateBuilder::new(None, &held);
        builder.on_consumed_event(&mouse_event(MouseButton::Right, ElementState::Released));
        let frame = builder.build(0.016);
        assert!(!frame.is_mouse_button_down(MouseButton::Right));
        assert!(frame.is_mouse_button_released(MouseButton::Right));
    }

    #[test]
    fn consumed_presses_are_dropped()
    {
        let mut builder = FrameStateBuilder::new(None, &FrameState::default());
        builder.on_consumed_event(&mouse_event(MouseButton::Right, ElementState::Pressed));

        let frame = builder.build(0.016);
        assert!(!frame.is_mouse_button_down(MouseButton::Right));
        assert!(!frame.is_mouse_button_pressed(MouseButton::Right));
    }
}
