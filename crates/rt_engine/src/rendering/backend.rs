//! The wgpu implementation of [`GraphBackend`]: offscreen textures, one pipeline per pass,
//! and a single command encoder submitted once per frame.

use std::collections::HashMap;
use std::sync::Arc;

use glam::UVec2;
use wgpu_profiler::{wgpu_profiler, GpuProfiler};

use crate::error::StartupError;
use crate::gpu_utils::{Texture, WgpuState};
use crate::rendering::binder::{FrameInfo, FrameUniforms};
use crate::rendering::fullscreen::{FullscreenPass, FullscreenPassDesc};
use crate::rendering::graph::{BufferDesc, BufferId, FrameGraph, PassDesc, PassOp};
use crate::rendering::get_command_encoder;
use crate::rendering::presentation::Presentation;
use crate::rendering::sequencer::{FrameReport, GraphBackend, HistoryPolicy, RenderPassSequencer};
use crate::rendering::RenderStage;

#[derive(Clone, Debug, PartialEq)]
pub struct PassTiming
{
    pub label: String,
    pub milliseconds: f64
}

pub struct WgpuGraphBackend
{
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,

    buffers: HashMap<BufferId, Texture>,
    /// Indexed like the graph's passes. History updates are plain copies and have no pipeline.
    passes: Vec<Option<FullscreenPass>>,
    presentation: Presentation,

    fallback: Texture,
    sampler: wgpu::Sampler,

    encoder: Option<wgpu::CommandEncoder>,
    profiler: GpuProfiler,
    timings: Vec<PassTiming>
}

impl WgpuGraphBackend
{
    /// Compiles every draw pass of `graph`. Any shader error aborts startup.
    pub fn new(gpu_state: &WgpuState, graph: &FrameGraph, flip_y: bool) -> Result<Self, StartupError>
    {
        let device = gpu_state.device().clone();
        let queue = gpu_state.queue().clone();
        let fallback = Texture::create_fallback(&device);
        let sampler = Texture::create_sampler(&device);

        let mut passes = Vec::with_capacity(graph.passes().len());
        for pass in graph.passes()
        {
            let compiled = match &pass.op
            {
                PassOp::Draw { shader, uniforms, inputs } =>
                {
                    let desc = FullscreenPassDesc
                    {
                        label: pass.name,
                        source: &shader.source,
                        entry_point: shader.entry_point,
                        block: *uniforms,
                        inputs,
                        format: Texture::RENDER_FORMAT
                    };

                    Some(FullscreenPass::new(&device, &fallback, &sampler, desc)?)
                },
                PassOp::HistoryUpdate { .. } => None
            };

            passes.push(compiled);
        }

        let presentation = Presentation::new(&device, &fallback, &sampler, graph.present(), gpu_state.surface_config().format, flip_y)?;
        let profiler = GpuProfiler::new(gpu_state.adapter(), &device, &queue, 4);

        Ok(Self
        {
            device,
            queue,
            buffers: HashMap::new(),
            passes,
            presentation,
            fallback,
            sampler,
            encoder: None,
            profiler,
            timings: Vec::new()
        })
    }

    /// GPU time of each pass from the most recent finished frame. Empty without timestamp support.
    pub fn timings(&self) -> &[PassTiming] { &self.timings }

    fn collect_timings(&mut self)
    {
        if let Some(profiling_data) = self.profiler.process_finished_frame()
        {
            self.timings = profiling_data.iter()
                .map(|scope| PassTiming
                {
                    label: scope.label.clone(),
                    milliseconds: (scope.time.end - scope.time.start) * 1000.0
                })
                .collect();
        }
    }
}

impl GraphBackend for WgpuGraphBackend
{
    type Target = wgpu::TextureView;

    fn allocate(&mut self, buffers: &[BufferDesc], extent: UVec2)
    {
        self.buffers = buffers.iter()
            .map(|b| (b.id, Texture::create_render_buffer(&self.device, extent, b.id.0)))
            .collect();

        for pass in self.passes.iter_mut().flatten()
        {
            pass.rebind(&self.device, &self.buffers, &self.fallback, &self.sampler);
        }

        self.presentation.rebind(&self.device, &self.buffers, &self.fallback, &self.sampler);
    }

    fn extent(&self, buffer: BufferId) -> Option<UVec2>
    {
        self.buffers.get(&buffer).map(|t| t.size())
    }

    fn begin_frame(&mut self, _frame: &FrameInfo)
    {
        self.encoder = Some(get_command_encoder(&self.device));
    }

    fn draw(&mut self, pass_index: usize, pass: &PassDesc, uniforms: &FrameUniforms)
    {
        let (Some(encoder), Some(Some(compiled)), Some(output)) =
            (self.encoder.as_mut(), self.passes.get_mut(pass_index), self.buffers.get(&pass.output)) else
        {
            log::warn!("Pass '{}' cannot be recorded", pass.name);
            return;
        };

        compiled.write_uniforms(uniforms, &self.queue);
        wgpu_profiler!(pass.name, &mut self.profiler, &mut *encoder, &self.device, {
            compiled.record(encoder, &output.view);
        });
    }

    fn copy(&mut self, pass: &PassDesc, source: BufferId, destination: BufferId)
    {
        let (Some(encoder), Some(src), Some(dst)) =
            (self.encoder.as_mut(), self.buffers.get(&source), self.buffers.get(&destination)) else
        {
            log::warn!("Pass '{}' cannot copy '{}' to '{}'", pass.name, source, destination);
            return;
        };

        let size = src.size().min(dst.size());
        wgpu_profiler!(pass.name, &mut self.profiler, &mut *encoder, &self.device, {
            encoder.copy_texture_to_texture(
                src.texture.as_image_copy(),
                dst.texture.as_image_copy(),
                wgpu::Extent3d
                {
                    width: size.x,
                    height: size.y,
                    depth_or_array_layers: 1
                }
            );
        });
    }

    fn present(&mut self, _buffer: BufferId, uniforms: &FrameUniforms, target: &wgpu::TextureView)
    {
        let Some(encoder) = self.encoder.as_mut() else { return };

        self.presentation.write_uniforms(uniforms, &self.queue);
        wgpu_profiler!("present", &mut self.profiler, &mut *encoder, &self.device, {
            self.presentation.record(encoder, target);
        });
    }

    fn end_frame(&mut self)
    {
        let Some(mut encoder) = self.encoder.take() else { return };

        self.profiler.resolve_queries(&mut encoder);
        self.queue.submit(std::iter::once(encoder.finish()));

        if self.profiler.end_frame().is_err()
        {
            log::warn!("GPU profiler dropped a frame");
        }

        self.collect_timings();
    }
}

/// Runs the graph as one stage of the [`crate::rendering::Renderer`].
pub struct GraphStage
{
    sequencer: RenderPassSequencer<WgpuGraphBackend>,
    pending: Option<FrameUniforms>,
    last_report: Option<FrameReport>
}

impl GraphStage
{
    pub fn new(gpu_state: &WgpuState, graph: FrameGraph, policy: HistoryPolicy, flip_y: bool) -> Result<Self, StartupError>
    {
        let backend = WgpuGraphBackend::new(gpu_state, &graph, flip_y)?;
        let sequencer = RenderPassSequencer::new(graph, backend, policy, gpu_state.surface_size());

        Ok(Self
        {
            sequencer,
            pending: None,
            last_report: None
        })
    }

    pub fn sequencer(&self) -> &RenderPassSequencer<WgpuGraphBackend> { &self.sequencer }
    pub fn last_report(&self) -> Option<&FrameReport> { self.last_report.as_ref() }
    pub fn timings(&self) -> &[PassTiming] { self.sequencer.backend().timings() }

    pub fn resize(&mut self, extent: UVec2)
    {
        self.sequencer.resize(extent);
    }

    /// Computes the uniform values for the next drawn frame.
    pub fn prepare<F>(&mut self, bind: F) where F : FnOnce(&FrameInfo) -> FrameUniforms
    {
        let frame = self.sequencer.frame_info();
        self.pending = Some(bind(&frame));
    }
}

impl RenderStage for GraphStage
{
    fn on_draw(&mut self, _device: &wgpu::Device, _queue: &wgpu::Queue, view: &wgpu::TextureView)
    {
        let Some(uniforms) = self.pending.take() else
        {
            log::warn!("Render graph drawn without prepared uniforms, skipping");
            return;
        };

        match self.sequencer.execute(|_| uniforms, view)
        {
            Ok(report) => self.last_report = Some(report),
            Err(e) => log::warn!("Skipping frame: {}", e)
        }
    }
}
