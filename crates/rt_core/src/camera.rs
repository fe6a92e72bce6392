use glam::{Vec2, Vec3};

pub const PITCH_LIMIT: f32 = 89.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitSettings
{
    pub min_distance: f32,
    pub max_distance: f32,
    /// Degrees of rotation per pixel of pointer motion, per axis.
    pub sensitivity: Vec2,
    pub zoom_step: f32,
    pub fov: f32
}

impl Default for OrbitSettings
{
    fn default() -> Self
    {
        Self
        {
            min_distance: 2.0,
            max_distance: 20.0,
            sensitivity: Vec2::splat(0.2),
            zoom_step: 0.5,
            fov: 60.0
        }
    }
}

/// Camera rig orbiting a fixed target. Angles are stored in degrees.
#[derive(Debug, Clone)]
pub struct OrbitCamera
{
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vec3,
    up: Vec3,
    dragging: bool,
    settings: OrbitSettings
}

impl OrbitCamera
{
    pub fn new(distance: f32, settings: OrbitSettings) -> Self
    {
        let mut camera = Self
        {
            pitch: 0.0,
            yaw: 0.0,
            distance,
            target: Vec3::ZERO,
            up: Vec3::Y,
            dragging: false,
            settings
        };

        camera.clamp();
        camera
    }

    pub fn pitch(&self) -> f32 { self.pitch }
    pub fn yaw(&self) -> f32 { self.yaw }
    pub fn distance(&self) -> f32 { self.distance }
    pub fn target(&self) -> Vec3 { self.target }
    pub fn up(&self) -> Vec3 { self.up }
    pub fn fov(&self) -> f32 { self.settings.fov }
    pub fn is_dragging(&self) -> bool { self.dragging }
    pub fn settings(&self) -> &OrbitSettings { &self.settings }

    pub fn begin_drag(&mut self) { self.dragging = true; }
    pub fn end_drag(&mut self) { self.dragging = false; }

    /// Rotates the rig by a pointer delta in pixels. Ignored unless a drag is active.
    pub fn rotate(&mut self, pointer_delta: Vec2)
    {
        if !self.dragging
        {
            return;
        }

        self.pitch -= pointer_delta.y * self.settings.sensitivity.y;
        self.yaw -= pointer_delta.x * self.settings.sensitivity.x;
        self.clamp();
    }

    pub fn zoom(&mut self, scroll: f32)
    {
        self.distance -= scroll * self.settings.zoom_step;
        self.clamp();
    }

    pub fn set_angles(&mut self, pitch: f32, yaw: f32)
    {
        self.pitch = pitch;
        self.yaw = yaw;
        self.clamp();
    }

    pub fn set_distance(&mut self, distance: f32)
    {
        self.distance = distance;
        self.clamp();
    }

    pub fn eye(&self) -> Vec3
    {
        let pitch = self.pitch.to_radians();
        let yaw = self.yaw.to_radians();

        self.target + self.distance * Vec3::new(
            pitch.cos() * yaw.sin(),
            pitch.sin(),
            pitch.cos() * yaw.cos()
        )
    }

    fn clamp(&mut self)
    {
        // NaN input would otherwise survive `clamp` and poison the eye position
        if self.pitch.is_nan() { self.pitch = 0.0; }
        if self.distance.is_nan() { self.distance = self.settings.min_distance; }

        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.distance = self.distance.clamp(self.settings.min_distance, self.settings.max_distance);
    }
}

#[cfg(test)]
mod tests
{
    use assert_approx_eq::assert_approx_eq;
    use super::*;

    fn dragging_camera() -> OrbitCamera
    {
        let mut camera = OrbitCamera::new(5.0, OrbitSettings::default());
        camera.begin_drag();
        camera
    }

    #[test]
    fn pitch_stays_within_limits()
    {
        let mut camera = dragging_camera();
        for delta in [-10_000.0, -451.0, -3.0, 0.0, 7.5, 449.0, 10_000.0]
        {
            camera.rotate(Vec2::new(0.0, delta));
            assert!(camera.pitch() >= -PITCH_LIMIT && camera.pitch() <= PITCH_LIMIT, "pitch {}", camera.pitch());
        }

        camera.rotate(Vec2::new(0.0, -1.0e6));
        assert_approx_eq!(camera.pitch(), PITCH_LIMIT);
        camera.rotate(Vec2::new(0.0, 1.0e6));
        assert_approx_eq!(camera.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn distance_stays_within_configured_range()
    {
        let mut camera = OrbitCamera::new(5.0, OrbitSettings::default());
        for scroll in [1.0, 3.0, 100.0, -0.5, -250.0, 12.0]
        {
            camera.zoom(scroll);
            assert!(camera.distance() >= 2.0 && camera.distance() <= 20.0, "distance {}", camera.distance());
        }

        camera.zoom(1000.0);
        assert_approx_eq!(camera.distance(), 2.0);
        camera.zoom(-1000.0);
        assert_approx_eq!(camera.distance(), 20.0);
    }

    #[test]
    fn zero_angles_place_eye_on_positive_z()
    {
        let camera = OrbitCamera::new(7.0, OrbitSettings::default());
        let eye = camera.eye();
        assert_approx_eq!(eye.x, 0.0);
        assert_approx_eq!(eye.y, 0.0);
        assert_approx_eq!(eye.z, 7.0);
    }

    #[test]
    fn rotation_requires_drag()
    {
        let mut camera = OrbitCamera::new(5.0, OrbitSettings::default());
        camera.rotate(Vec2::new(30.0, 30.0));
        assert_eq!(camera.pitch(), 0.0);
        assert_eq!(camera.yaw(), 0.0);

        camera.begin_drag();
        camera.rotate(Vec2::new(10.0, -5.0));
        assert_approx_eq!(camera.yaw(), -2.0);
        assert_approx_eq!(camera.pitch(), 1.0);

        camera.end_drag();
        camera.rotate(Vec2::new(10.0, -5.0));
        assert_approx_eq!(camera.yaw(), -2.0);
    }

    #[test]
    fn eye_keeps_distance_from_target()
    {
        let mut camera = dragging_camera();
        camera.set_angles(35.0, 120.0);
        assert_approx_eq!(camera.eye().length(), 5.0, 1e-4);
        assert!(camera.eye().y > 0.0);
    }

    #[test]
    fn nan_input_is_corrected()
    {
        let mut camera = dragging_camera();
        camera.set_angles(f32::NAN, 0.0);
        camera.set_distance(f32::NAN);
        assert!(camera.eye().is_finite());
    }
}
