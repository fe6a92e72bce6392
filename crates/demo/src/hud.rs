use rt_engine::egui::{self, Align2, RichText};
use rt_engine::prelude::GuiWindow;
use rt_engine::rendering::backend::PassTiming;

use crate::config::PipelineVariant;
use crate::controls::CONTROL_HINTS;

/// Seconds of frames averaged into one FPS reading.
const FPS_WINDOW: f32 = 0.5;

/// Frame rate averaged over short windows so the readout stays legible.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter
{
    elapsed: f32,
    frames: u32,
    fps: f32,
    frame_time: f32
}

impl FpsCounter
{
    pub fn fps(&self) -> f32 { self.fps }
    /// Average frame time of the last window, in seconds.
    pub fn frame_time(&self) -> f32 { self.frame_time }

    pub fn tick(&mut self, delta_time: f32)
    {
        self.elapsed += delta_time;
        self.frames += 1;

        if self.elapsed >= FPS_WINDOW
        {
            self.frame_time = self.elapsed / self.frames as f32;
            self.fps = self.frames as f32 / self.elapsed;
            self.elapsed = 0.0;
            self.frames = 0;
        }
    }
}

/// Everything the overlay shows for one frame.
pub struct HudInfo<'a>
{
    pub fps: &'a FpsCounter,
    pub light_intensity: f32,
    pub color_cycling: bool,
    pub pipeline: PipelineVariant,
    pub reset_interval: u64,
    pub history_reset: bool,
    pub timings: &'a [PassTiming]
}

pub fn intensity_label(intensity: f32) -> String
{
    format!("Light Intensity: {:.1}", intensity)
}

pub fn pipeline_label(pipeline: PipelineVariant) -> &'static str
{
    match pipeline
    {
        PipelineVariant::SingleDenoise => "raytrace > denoise",
        PipelineVariant::DenoiseTaa => "raytrace > denoise > TAA"
    }
}

pub fn reset_label(reset_interval: u64) -> String
{
    match reset_interval
    {
        0 => "History reset: never".to_string(),
        n => format!("History reset: every {} frames", n)
    }
}

pub fn draw_hud(context: &egui::Context, info: &HudInfo)
{
    GuiWindow::new("Stats")
        .anchor(Align2::LEFT_TOP, [10.0, 10.0])
        .resizable(false)
        .collapsible(true)
        .show(context, |ui| {
            ui.label(RichText::new(format!("{:.0} FPS", info.fps.fps())).strong());
            ui.label(format!("Frame time: {:.2}ms", info.fps.frame_time() * 1000.0));
            ui.label(intensity_label(info.light_intensity));
            ui.label(format!("Colour cycle: {}", if info.color_cycling { "on" } else { "off" }));

            ui.separator();
            ui.label(format!("Pipeline: {}", pipeline_label(info.pipeline)));
            ui.label(reset_label(info.reset_interval));
            if info.history_reset
            {
                ui.label("History reset this frame");
            }

            if !info.timings.is_empty()
            {
                ui.separator();
                for timing in info.timings
                {
                    ui.label(format!("{}: {:.3}ms", timing.label, timing.milliseconds));
                }
            }
        });

    GuiWindow::new("Controls")
        .anchor(Align2::LEFT_BOTTOM, [10.0, -10.0])
        .resizable(false)
        .collapsible(true)
        .show(context, |ui| {
            for hint in CONTROL_HINTS
            {
                ui.label(*hint);
            }
        });
}

#[cfg(test)]
mod tests
{
    use assert_approx_eq::assert_approx_eq;
    use super::*;

    #[test]
    fn fps_updates_once_per_window()
    {
        let mut counter = FpsCounter::default();
        for _ in 0..3
        {
            counter.tick(0.125);
        }
        assert_approx_eq!(counter.fps(), 0.0);

        counter.tick(0.125);
        assert_approx_eq!(counter.fps(), 8.0);
        assert_approx_eq!(counter.frame_time(), 0.125);
    }

    #[test]
    fn labels_match_overlay_text()
    {
        assert_eq!(intensity_label(5.0), "Light Intensity: 5.0");
        assert_eq!(intensity_label(7.36), "Light Intensity: 7.4");
        assert_eq!(reset_label(0), "History reset: never");
        assert_eq!(reset_label(3), "History reset: every 3 frames");
    }
}
