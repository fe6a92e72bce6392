//! `raytrace.yaml`: every tunable of the demo. Missing sections fall back to defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use rt_engine::app::WindowSettings;
use rt_engine::glam::Vec2;
use rt_engine::rendering::binder::PostSettings;
use rt_engine::rendering::sequencer::HistoryPolicy;
use rt_engine::rt_core::camera::OrbitSettings;

pub const DEFAULT_CONFIG_PATH: &str = "raytrace.yaml";

#[derive(Debug, Error)]
pub enum ConfigError
{
    #[error("could not read config '{}': {source}", .path.display())]
    Read
    {
        path: PathBuf,
        #[source]
        source: std::io::Error
    },
    #[error("could not parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineVariant
{
    /// raytrace, temporal denoise, present.
    SingleDenoise,
    /// raytrace, normals, guided denoise, TAA, present.
    DenoiseTaa
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneChoice
{
    Spheres,
    SpheresAndBoxes
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig
{
    pub title: String,
    pub width: u32,
    pub height: u32
}

impl Default for WindowConfig
{
    fn default() -> Self
    {
        Self
        {
            title: "Raytracing Demo".to_string(),
            width: 1280,
            height: 720
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig
{
    /// Frames between history resets, 0 never resets.
    pub reset_interval: u64
}

impl Default for HistoryConfig
{
    fn default() -> Self
    {
        Self { reset_interval: HistoryPolicy::default().reset_interval }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig
{
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Degrees per pixel of pointer motion.
    pub sensitivity: f32,
    pub zoom_step: f32,
    pub fov: f32
}

impl Default for CameraConfig
{
    fn default() -> Self
    {
        let orbit = OrbitSettings::default();
        Self
        {
            distance: 5.0,
            min_distance: orbit.min_distance,
            max_distance: orbit.max_distance,
            sensitivity: orbit.sensitivity.x,
            zoom_step: orbit.zoom_step,
            fov: orbit.fov
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DenoiseConfig
{
    pub strength: f32
}

impl Default for DenoiseConfig
{
    fn default() -> Self
    {
        Self { strength: PostSettings::default().denoise_strength }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaaConfig
{
    /// Weight of the history in the TAA blend.
    pub blend: f32
}

impl Default for TaaConfig
{
    fn default() -> Self
    {
        Self { blend: PostSettings::default().taa_blend }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightConfig
{
    /// World units per second while a move key is held.
    pub nudge_speed: f32,
    /// Intensity units per second while an intensity key is held.
    pub intensity_rate: f32
}

impl Default for LightConfig
{
    fn default() -> Self
    {
        Self
        {
            nudge_speed: 6.0,
            intensity_rate: 6.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig
{
    pub window: WindowConfig,
    pub pipeline: PipelineVariant,
    /// `None` picks the scene that goes with `pipeline`.
    pub scene: Option<SceneChoice>,
    pub history: HistoryConfig,
    pub camera: CameraConfig,
    pub denoise: DenoiseConfig,
    pub taa: TaaConfig,
    pub light: LightConfig,
    /// `None` leaves the frame rate uncapped.
    pub frame_rate_cap: Option<u32>,
    /// Directory searched for WGSL files overriding the embedded shaders.
    pub shader_dir: Option<PathBuf>
}

impl Default for DemoConfig
{
    fn default() -> Self
    {
        Self
        {
            window: WindowConfig::default(),
            pipeline: PipelineVariant::DenoiseTaa,
            scene: None,
            history: HistoryConfig::default(),
            camera: CameraConfig::default(),
            denoise: DenoiseConfig::default(),
            taa: TaaConfig::default(),
            light: LightConfig::default(),
            frame_rate_cap: Some(600),
            shader_dir: None
        }
    }
}

impl DemoConfig
{
    /// Reads `path`, or returns the defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError>
    {
        if !path.exists()
        {
            log::info!("No config at '{}', using defaults", path.display());
            return Ok(Self::default());
        }

        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read
        {
            path: path.to_path_buf(),
            source
        })?;

        let config = Self::from_yaml(&yaml)?;
        log::info!("Loaded config '{}'", path.display());
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError>
    {
        // a document with only comments deserialises to unit, not to a map
        let blank = yaml.lines().all(|l| l.trim().is_empty() || l.trim_start().starts_with('#'));
        if blank
        {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError>
    {
        if self.window.width == 0 || self.window.height == 0
        {
            return Err(ConfigError::Invalid(format!("window size {}x{} is empty", self.window.width, self.window.height)));
        }

        let camera = &self.camera;
        if !(camera.min_distance > 0.0 && camera.min_distance <= camera.max_distance)
        {
            return Err(ConfigError::Invalid(format!("camera distance range [{}, {}] is empty", camera.min_distance, camera.max_distance)));
        }

        if !(0.0..=1.0).contains(&self.taa.blend)
        {
            return Err(ConfigError::Invalid(format!("taa.blend {} is outside [0, 1]", self.taa.blend)));
        }

        if !(camera.fov > 0.0 && camera.fov < 180.0)
        {
            return Err(ConfigError::Invalid(format!("camera.fov {} is outside (0, 180)", camera.fov)));
        }

        Ok(())
    }

    pub fn scene_choice(&self) -> SceneChoice
    {
        self.scene.unwrap_or(match self.pipeline
        {
            PipelineVariant::SingleDenoise => SceneChoice::Spheres,
            PipelineVariant::DenoiseTaa => SceneChoice::SpheresAndBoxes
        })
    }

    pub fn window_settings(&self) -> WindowSettings
    {
        WindowSettings
        {
            title: self.window.title.clone(),
            width: self.window.width,
            height: self.window.height
        }
    }

    pub fn orbit_settings(&self) -> OrbitSettings
    {
        OrbitSettings
        {
            min_distance: self.camera.min_distance,
            max_distance: self.camera.max_distance,
            sensitivity: Vec2::splat(self.camera.sensitivity),
            zoom_step: self.camera.zoom_step,
            fov: self.camera.fov
        }
    }

    pub fn post_settings(&self) -> PostSettings
    {
        PostSettings
        {
            denoise_strength: self.denoise.strength,
            taa_blend: self.taa.blend,
            ..PostSettings::default()
        }
    }

    pub fn history_policy(&self) -> HistoryPolicy
    {
        HistoryPolicy::new(self.history.reset_interval)
    }
}

#[cfg(test)]
mod tests
{
    use assert_approx_eq::assert_approx_eq;
    use super::*;

    #[test]
    fn comment_only_document_gives_defaults()
    {
        let config = DemoConfig::from_yaml("# nothing yet\n").unwrap();
        assert_eq!(config, DemoConfig::default());
        assert_eq!(config.history.reset_interval, 3);
        assert_eq!(config.frame_rate_cap, Some(600));
        assert_eq!(config.pipeline, PipelineVariant::DenoiseTaa);
    }

    #[test]
    fn partial_sections_keep_other_defaults()
    {
        let yaml = "
pipeline: single_denoise
history:
  reset_interval: 0
camera:
  distance: 8.0
frame_rate_cap: null
";
        let config = DemoConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.pipeline, PipelineVariant::SingleDenoise);
        assert_eq!(config.history_policy(), HistoryPolicy::new(0));
        assert_approx_eq!(config.camera.distance, 8.0);
        assert_approx_eq!(config.camera.zoom_step, 0.5);
        assert_eq!(config.frame_rate_cap, None);
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn scene_follows_pipeline_unless_set()
    {
        assert_eq!(DemoConfig::default().scene_choice(), SceneChoice::SpheresAndBoxes);

        let config = DemoConfig::from_yaml("pipeline: single_denoise\n").unwrap();
        assert_eq!(config.scene_choice(), SceneChoice::Spheres);

        let config = DemoConfig::from_yaml("pipeline: single_denoise\nscene: spheres_and_boxes\n").unwrap();
        assert_eq!(config.scene_choice(), SceneChoice::SpheresAndBoxes);
    }

    #[test]
    fn unknown_keys_are_rejected()
    {
        let err = DemoConfig::from_yaml("camera:\n  distanse: 3.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn inverted_distance_range_is_invalid()
    {
        let yaml = "camera:\n  min_distance: 10.0\n  max_distance: 2.0\n";
        assert!(matches!(DemoConfig::from_yaml(yaml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn blend_outside_unit_range_is_invalid()
    {
        assert!(matches!(DemoConfig::from_yaml("taa:\n  blend: 1.5\n"), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn settings_are_derived_from_sections()
    {
        let yaml = "
camera:
  sensitivity: 0.4
  fov: 45.0
denoise:
  strength: 3.0
";
        let config = DemoConfig::from_yaml(yaml).unwrap();

        let orbit = config.orbit_settings();
        assert_eq!(orbit.sensitivity, Vec2::splat(0.4));
        assert_approx_eq!(orbit.fov, 45.0);

        let post = config.post_settings();
        assert_approx_eq!(post.denoise_strength, 3.0);
        assert!(post.flip_y);
    }

    #[test]
    fn shipped_config_matches_defaults()
    {
        let config = DemoConfig::from_yaml(include_str!("../../../raytrace.yaml")).unwrap();
        assert_eq!(config, DemoConfig::default());
    }

    #[test]
    fn missing_file_gives_defaults()
    {
        let config = DemoConfig::load(Path::new("definitely/not/here.yaml")).unwrap();
        assert_eq!(config, DemoConfig::default());
    }
}
