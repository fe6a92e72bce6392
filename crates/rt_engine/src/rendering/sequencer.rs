use glam::UVec2;
use thiserror::Error;

use crate::rendering::binder::{FrameInfo, FrameUniforms};
use crate::rendering::graph::{BufferDesc, BufferId, FrameGraph, PassDesc, PassOp};

/// Records what the sequencer decides to run.
pub trait GraphBackend
{
    type Target: ?Sized;

    /// (Re)creates every buffer at `extent`. Previous contents are lost.
    fn allocate(&mut self, buffers: &[BufferDesc], extent: UVec2);
    fn extent(&self, buffer: BufferId) -> Option<UVec2>;

    fn begin_frame(&mut self, frame: &FrameInfo);
    fn draw(&mut self, pass_index: usize, pass: &PassDesc, uniforms: &FrameUniforms);
    fn copy(&mut self, pass: &PassDesc, source: BufferId, destination: BufferId);
    fn present(&mut self, buffer: BufferId, uniforms: &FrameUniforms, target: &Self::Target);
    fn end_frame(&mut self);
}

/// When the accumulated history is replaced by a fresh single-frame image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryPolicy
{
    /// Reset every `reset_interval` frames, 0 never resets.
    pub reset_interval: u64
}

impl HistoryPolicy
{
    pub const fn new(reset_interval: u64) -> Self
    {
        Self { reset_interval }
    }

    pub fn resets_on(&self, frame_index: u64) -> bool
    {
        self.reset_interval != 0 && frame_index % self.reset_interval == 0
    }
}

impl Default for HistoryPolicy
{
    fn default() -> Self
    {
        Self::new(3)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequencerError
{
    #[error("pass '{pass}' uses '{buffer}' at {found:?} but the frame is {expected}")]
    StaleBuffer
    {
        pass: &'static str,
        buffer: BufferId,
        expected: UVec2,
        found: Option<UVec2>
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReport
{
    pub frame_index: u64,
    pub history_reset: bool,
    pub passes: Vec<&'static str>
}

pub struct RenderPassSequencer<B> where B : GraphBackend
{
    graph: FrameGraph,
    backend: B,
    policy: HistoryPolicy,
    extent: UVec2,
    frame_index: u64,
    history_valid: bool
}

impl<B> RenderPassSequencer<B> where B : GraphBackend
{
    pub fn new(graph: FrameGraph, mut backend: B, policy: HistoryPolicy, extent: UVec2) -> Self
    {
        let extent = extent.max(UVec2::ONE);
        backend.allocate(graph.buffers(), extent);
        log::info!("Render graph '{}': {} passes, presenting '{}'", graph.label(), graph.passes().len(), graph.present());

        Self
        {
            graph,
            backend,
            policy,
            extent,
            frame_index: 0,
            history_valid: false
        }
    }

    pub fn backend(&self) -> &B { &self.backend }
    pub fn backend_mut(&mut self) -> &mut B { &mut self.backend }
    pub fn policy(&self) -> HistoryPolicy { self.policy }
    pub fn extent(&self) -> UVec2 { self.extent }
    pub fn frame_index(&self) -> u64 { self.frame_index }

    /// Reallocates every buffer at the new extent. Zero-sized and unchanged extents are ignored.
    pub fn resize(&mut self, extent: UVec2) -> bool
    {
        if extent.x == 0 || extent.y == 0 || extent == self.extent
        {
            return false;
        }

        log::debug!("Reallocating {} buffers at {}x{}", self.graph.buffers().len(), extent.x, extent.y);
        self.backend.allocate(self.graph.buffers(), extent);
        self.extent = extent;
        self.history_valid = false;
        true
    }

    pub fn frame_info(&self) -> FrameInfo
    {
        FrameInfo
        {
            index: self.frame_index,
            extent: self.extent,
            history_valid: self.history_valid,
            history_reset: self.policy.resets_on(self.frame_index)
        }
    }

    /// Runs every pass in order and presents. `bind` produces the frame's uniform values.
    pub fn execute<F>(&mut self, bind: F, target: &B::Target) -> Result<FrameReport, SequencerError>
        where F : FnOnce(&FrameInfo) -> FrameUniforms
    {
        self.check_extents()?;

        let frame = self.frame_info();
        let uniforms = bind(&frame);
        let mut passes = Vec::with_capacity(self.graph.passes().len());

        self.backend.begin_frame(&frame);
        for (index, pass) in self.graph.passes().iter().enumerate()
        {
            match &pass.op
            {
                PassOp::Draw { .. } =>
                {
                    log::trace!("Frame {}: draw '{}' -> '{}'", frame.index, pass.name, pass.output);
                    self.backend.draw(index, pass, &uniforms);
                },
                PassOp::HistoryUpdate { accumulated, reset_from } =>
                {
                    let source = if frame.history_reset { *reset_from } else { *accumulated };
                    log::trace!("Frame {}: copy '{}' -> '{}'", frame.index, source, pass.output);
                    self.backend.copy(pass, source, pass.output);
                }
            }

            passes.push(pass.name);
        }

        self.backend.present(self.graph.present(), &uniforms, target);
        self.backend.end_frame();

        self.frame_index += 1;
        self.history_valid = true;

        Ok(FrameReport
        {
            frame_index: frame.index,
            history_reset: frame.history_reset,
            passes
        })
    }

    fn check_extents(&self) -> Result<(), SequencerError>
    {
        for pass in self.graph.passes()
        {
            for buffer in pass.reads().into_iter().chain(std::iter::once(pass.output))
            {
                let found = self.backend.extent(buffer);
                if found != Some(self.extent)
                {
                    return Err(SequencerError::StaleBuffer
                    {
                        pass: pass.name,
                        buffer,
                        expected: self.extent,
                        found
                    });
                }
            }
        }

        Ok(())
    }
}
