use std::sync::Arc;

use rt_engine::app::WinitWindow;
use rt_engine::glam::UVec2;
use rt_engine::gpu_utils::WgpuState;
use rt_engine::rendering::backend::GraphStage;
use rt_engine::rendering::binder::UniformBinder;
use rt_engine::rendering::gui::GuiOverlay;
use rt_engine::rendering::Renderer;
use rt_engine::wgpu::SurfaceError;
use rt_engine::winit::event::Event;
use rt_engine::winit::event_loop::EventLoop;
use rt_engine::error::StartupError;

use crate::config::{DemoConfig, PipelineVariant};
use crate::hud::{draw_hud, FpsCounter, HudInfo};
use crate::pipelines::{graph_for, ShaderLibrary};
use crate::world::DemoWorld;

#[derive(Clone, Copy)]
pub struct RenderData<'a>
{
    pub fps: &'a FpsCounter
}

pub struct DemoRenderer
{
    renderer: Renderer,
    gui: GuiOverlay,
    graph_stage: GraphStage,
    binder: UniformBinder,
    pipeline: PipelineVariant
}

impl DemoRenderer
{
    pub fn new<T>(gpu_state: &WgpuState, event_loop: &EventLoop<T>, window: Arc<WinitWindow>, config: &DemoConfig) -> Result<Self, StartupError>
        where T : 'static
    {
        let renderer = Renderer::new(gpu_state.device().clone(), gpu_state.surface().clone(), gpu_state.queue().clone());

        let gui = GuiOverlay::new(event_loop, gpu_state, window);

        let shaders = ShaderLibrary::new(config.shader_dir.clone());
        let graph = graph_for(config.pipeline, &shaders).compile()?;
        log::info!("Pipeline '{}' with {} passes", graph.label(), graph.passes().len());

        let binder = UniformBinder::new(config.post_settings());
        let graph_stage = GraphStage::new(gpu_state, graph, config.history_policy(), binder.settings().flip_y)?;

        Ok(Self
        {
            renderer,
            gui,
            graph_stage,
            binder,
            pipeline: config.pipeline
        })
    }

    /// Reallocates every graph buffer. Zero-sized extents are ignored.
    pub fn on_resize(&mut self, new_size: UVec2)
    {
        self.graph_stage.resize(new_size);
    }

    pub fn frame_index(&self) -> u64
    {
        self.graph_stage.sequencer().frame_index()
    }

    pub fn gui_handle_event<'a, T>(&mut self, event: &Event<'a, T>) -> bool
    {
        self.gui.handle_event(event)
    }

    pub fn render_world(&mut self, world: &DemoWorld, render_data: RenderData) -> Result<(), SurfaceError>
    {
        let binder = &self.binder;
        self.graph_stage.prepare(|frame| binder.bind(&world.scene, &world.camera, frame));

        let info = HudInfo
        {
            fps: render_data.fps,
            light_intensity: world.scene.light().intensity,
            color_cycling: world.scene.is_color_cycling(),
            pipeline: self.pipeline,
            reset_interval: self.graph_stage.sequencer().policy().reset_interval,
            history_reset: self.graph_stage.last_report().map_or(false, |r| r.history_reset),
            timings: self.graph_stage.timings()
        };

        self.gui.run(|c| draw_hud(c, &info));

        self.renderer.render(&mut [&mut self.graph_stage, &mut self.gui])
    }
}
