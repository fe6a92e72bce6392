use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use rt_engine::app::input::{FrameState, FrameStateBuilder};
use rt_engine::app::{self, App, FrameLimiter, WinitWindow};
use rt_engine::error::StartupError;
use rt_engine::glam::UVec2;
use rt_engine::gpu_utils::WgpuState;
use rt_engine::wgpu::SurfaceError;
use rt_engine::winit::event::{Event, WindowEvent};
use rt_engine::winit::event_loop::{ControlFlow, EventLoop};
use rt_engine::winit::window::Window;

pub mod config;
pub mod controls;
pub mod hud;
pub mod pipelines;
pub mod renderer;
pub mod world;

use crate::config::{ConfigError, DemoConfig};
use crate::controls::ControlInput;
use crate::hud::FpsCounter;
use crate::renderer::{DemoRenderer, RenderData};
use crate::world::DemoWorld;

#[derive(Debug, Error)]
pub enum DemoError
{
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Startup(#[from] StartupError)
}

pub struct DemoApp
{
    window: Arc<WinitWindow>,
    gpu_state: WgpuState,
    renderer: DemoRenderer,
    world: DemoWorld,
    config: DemoConfig,

    frame_builder: FrameStateBuilder,
    current_frame: FrameState,

    limiter: FrameLimiter,
    fps: FpsCounter,
    last_update: Instant,
    exiting: bool
}

impl DemoApp
{
    fn resize(&mut self, new_size: UVec2)
    {
        if self.gpu_state.resize(new_size)
        {
            log::debug!("Resized to {}x{}", new_size.x, new_size.y);
            self.renderer.on_resize(new_size);
        }
    }

    fn on_update(&mut self)
    {
        let now = Instant::now();
        let delta_time = now.duration_since(self.last_update).as_secs_f32();
        self.last_update = now;

        self.current_frame = self.frame_builder.build(delta_time);
        self.frame_builder = FrameStateBuilder::new(Some(self.window.id()), &self.current_frame);

        let input = ControlInput::from_frame(&self.current_frame, &self.config.light);
        if input.quit
        {
            self.exiting = true;
        }

        self.world.on_update(&input, delta_time);
        self.fps.tick(delta_time);
    }

    fn on_render(&mut self) -> Result<(), SurfaceError>
    {
        let render_data = RenderData { fps: &self.fps };
        self.renderer.render_world(&self.world, render_data)
    }

    fn exit(&mut self, control_flow: &mut ControlFlow)
    {
        self.exiting = true;
        *control_flow = ControlFlow::Exit;
    }
}

impl App for DemoApp
{
    type Config = DemoConfig;

    fn new<T>(event_loop: &EventLoop<T>, window: Window, config: DemoConfig) -> Result<Self, StartupError>
        where T : 'static
    {
        let window = Arc::new(window);
        let gpu_state = pollster::block_on(WgpuState::new(&window))?;
        let renderer = DemoRenderer::new(&gpu_state, event_loop, window.clone(), &config)?;
        let world = DemoWorld::new(&config);

        let start_frame = FrameState::default();
        let frame_builder = FrameStateBuilder::new(Some(window.id()), &start_frame);
        let limiter = FrameLimiter::new(config.frame_rate_cap);

        match config.frame_rate_cap
        {
            Some(cap) if cap > 0 => log::info!("Frame rate capped at {} fps", cap),
            _ => log::info!("Frame rate uncapped")
        }

        Ok(Self
        {
            window,
            gpu_state,
            renderer,
            world,
            config,
            frame_builder,
            current_frame: start_frame,
            limiter,
            fps: FpsCounter::default(),
            last_update: Instant::now(),
            exiting: false
        })
    }

    fn on_event<'a, T>(&mut self, event: Event<'a, T>, control_flow: &mut ControlFlow)
    {
        if self.renderer.gui_handle_event(&event)
        {
            self.frame_builder.on_consumed_event(&event);
            return;
        }

        self.frame_builder.on_event(&event);
        match event
        {
            Event::WindowEvent {
                ref event,
                window_id,
            }

            if window_id == self.window.id() =>
            {
                match event
                {
                    WindowEvent::CloseRequested => self.exit(control_flow),
                    WindowEvent::Resized(physical_size) => {
                        self.resize(UVec2::new(physical_size.width, physical_size.height));
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        self.resize(UVec2::new(new_inner_size.width, new_inner_size.height));
                    }
                    _ => {}
                }
            }

            Event::RedrawRequested(window_id) if window_id == self.window.id() => {
                self.on_update();
                if self.exiting
                {
                    self.exit(control_flow);
                    return;
                }

                match self.on_render()
                {
                    Ok(_) => {},
                    Err(SurfaceError::Lost) => self.gpu_state.reconfigure(),
                    Err(SurfaceError::OutOfMemory) => {
                        log::error!("Surface out of memory, exiting");
                        self.exit(control_flow);
                    }
                    Err(e) => log::warn!("Skipping frame: {:?}", e)
                }

                self.limiter.mark_frame(Instant::now());
            }

            Event::MainEventsCleared if !self.exiting => {
                self.limiter.schedule(&self.window, control_flow);
            },

            Event::LoopDestroyed => {
                log::info!("Exiting after {} frames", self.renderer.frame_index());
            }
            _ => {}
        }
    }
}

/// Loads the config at `config_path` and runs the demo. Only returns on a startup failure.
pub fn run(config_path: &Path) -> Result<(), DemoError>
{
    let config = DemoConfig::load(config_path)?;
    log::info!("Running: {} ({:?})", config.window.title, config.pipeline);

    app::run::<DemoApp>(&config.window_settings(), config)?;
    Ok(())
}
