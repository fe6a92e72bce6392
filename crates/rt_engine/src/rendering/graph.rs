use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use thiserror::Error;

use crate::rendering::binder::UniformBlock;
use crate::rendering::shader::ShaderSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub &'static str);

impl fmt::Display for BufferId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferLifetime
{
    /// Fully rewritten before it is read each frame.
    Transient,
    /// Carries the previous frame's content into the next frame.
    History
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferDesc
{
    pub id: BufferId,
    pub lifetime: BufferLifetime
}

impl BufferDesc
{
    pub const fn transient(id: BufferId) -> Self
    {
        Self { id, lifetime: BufferLifetime::Transient }
    }

    pub const fn history(id: BufferId) -> Self
    {
        Self { id, lifetime: BufferLifetime::History }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputSlot
{
    pub name: &'static str,
    pub source: BufferId
}

impl InputSlot
{
    pub const fn new(name: &'static str, source: BufferId) -> Self
    {
        Self { name, source }
    }
}

#[derive(Clone, Debug)]
pub struct ShaderRef
{
    pub source: ShaderSource,
    pub entry_point: &'static str
}

#[derive(Clone, Debug)]
pub enum PassOp
{
    Draw
    {
        shader: ShaderRef,
        uniforms: UniformBlock,
        inputs: Vec<InputSlot>
    },
    /// Copies `accumulated` into the output, or `reset_from` on frames the history policy resets.
    HistoryUpdate
    {
        accumulated: BufferId,
        reset_from: BufferId
    }
}

#[derive(Clone, Debug)]
pub struct PassDesc
{
    pub name: &'static str,
    pub op: PassOp,
    pub output: BufferId
}

impl PassDesc
{
    pub fn draw(name: &'static str, shader: ShaderRef, uniforms: UniformBlock, inputs: Vec<InputSlot>, output: BufferId) -> Self
    {
        Self { name, op: PassOp::Draw { shader, uniforms, inputs }, output }
    }

    pub fn history_update(name: &'static str, accumulated: BufferId, reset_from: BufferId, output: BufferId) -> Self
    {
        Self { name, op: PassOp::HistoryUpdate { accumulated, reset_from }, output }
    }

    pub fn reads(&self) -> Vec<BufferId>
    {
        match &self.op
        {
            PassOp::Draw { inputs, .. } => inputs.iter().map(|i| i.source).collect(),
            PassOp::HistoryUpdate { accumulated, reset_from } => vec![*accumulated, *reset_from]
        }
    }
}

#[derive(Clone, Debug)]
pub struct GraphDesc
{
    pub label: &'static str,
    pub buffers: Vec<BufferDesc>,
    pub passes: Vec<PassDesc>,
    pub present: BufferId
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError
{
    #[error("pass '{0}' is declared more than once")]
    DuplicatePass(&'static str),
    #[error("buffer '{0}' is declared more than once")]
    DuplicateBuffer(BufferId),
    #[error("pass '{pass}' references undeclared buffer '{buffer}'")]
    UnknownBuffer { pass: &'static str, buffer: BufferId },
    #[error("buffer '{buffer}' is written by both '{first}' and '{second}'")]
    MultipleWriters { buffer: BufferId, first: &'static str, second: &'static str },
    #[error("pass '{pass}' samples '{buffer}' while rendering into it")]
    ReadWriteHazard { pass: &'static str, buffer: BufferId },
    #[error("pass '{pass}' samples '{buffer}' which no pass writes")]
    UnwrittenInput { pass: &'static str, buffer: BufferId },
    #[error("history update '{pass}' targets '{buffer}' which is not a history buffer")]
    NotHistory { pass: &'static str, buffer: BufferId },
    #[error("presented buffer '{0}' is not written by any pass")]
    PresentNotWritten(BufferId),
    #[error("passes {0:?} form a dependency cycle")]
    Cycle(Vec<&'static str>)
}

#[derive(Clone, Debug)]
pub struct FrameGraph
{
    label: &'static str,
    buffers: Vec<BufferDesc>,
    passes: Vec<PassDesc>,
    present: BufferId
}

impl FrameGraph
{
    pub fn label(&self) -> &'static str { self.label }
    pub fn buffers(&self) -> &[BufferDesc] { &self.buffers }
    pub fn passes(&self) -> &[PassDesc] { &self.passes }
    pub fn present(&self) -> BufferId { self.present }
}

impl GraphDesc
{
    pub fn compile(self) -> Result<FrameGraph, GraphError>
    {
        let lifetimes = self.check_buffers()?;
        let writers = self.check_writers(&lifetimes)?;

        if !writers.contains_key(&self.present)
        {
            return Err(GraphError::PresentNotWritten(self.present));
        }

        let edges = self.dependency_edges(&lifetimes, &writers)?;
        let order = topological_order(self.passes.len(), &edges)
            .map_err(|stuck| GraphError::Cycle(stuck.into_iter().map(|i| self.passes[i].name).collect()))?;

        let mut slots = self.passes.into_iter().map(Some).collect::<Vec<_>>();
        let passes = order.into_iter()
            .filter_map(|i| slots[i].take())
            .collect::<Vec<_>>();

        log::debug!("Render graph '{}': {}", self.label, passes.iter().map(|p| p.name).collect::<Vec<_>>().join(" -> "));

        Ok(FrameGraph
        {
            label: self.label,
            buffers: self.buffers,
            passes,
            present: self.present
        })
    }

    fn check_buffers(&self) -> Result<HashMap<BufferId, BufferLifetime>, GraphError>
    {
        let mut lifetimes = HashMap::new();
        for buffer in &self.buffers
        {
            if lifetimes.insert(buffer.id, buffer.lifetime).is_some()
            {
                return Err(GraphError::DuplicateBuffer(buffer.id));
            }
        }

        let mut names = HashSet::new();
        for pass in &self.passes
        {
            if !names.insert(pass.name)
            {
                return Err(GraphError::DuplicatePass(pass.name));
            }

            for buffer in pass.reads().into_iter().chain(std::iter::once(pass.output))
            {
                if !lifetimes.contains_key(&buffer)
                {
                    return Err(GraphError::UnknownBuffer { pass: pass.name, buffer });
                }
            }
        }

        if !lifetimes.contains_key(&self.present)
        {
            return Err(GraphError::UnknownBuffer { pass: "present", buffer: self.present });
        }

        Ok(lifetimes)
    }

    /// Maps each written buffer to the index of its only writer.
    fn check_writers(&self, lifetimes: &HashMap<BufferId, BufferLifetime>) -> Result<HashMap<BufferId, usize>, GraphError>
    {
        let mut writers: HashMap<BufferId, usize> = HashMap::new();
        for (i, pass) in self.passes.iter().enumerate()
        {
            if let Some(&first) = writers.get(&pass.output)
            {
                return Err(GraphError::MultipleWriters
                {
                    buffer: pass.output,
                    first: self.passes[first].name,
                    second: pass.name
                });
            }

            if pass.reads().contains(&pass.output)
            {
                return Err(GraphError::ReadWriteHazard { pass: pass.name, buffer: pass.output });
            }

            if matches!(pass.op, PassOp::HistoryUpdate { .. }) && lifetimes[&pass.output] != BufferLifetime::History
            {
                return Err(GraphError::NotHistory { pass: pass.name, buffer: pass.output });
            }

            writers.insert(pass.output, i);
        }

        Ok(writers)
    }

    /// Transient reads depend on their writer. History reads must happen before the
    /// writer overwrites the previous frame's content, so the edge points the other way.
    fn dependency_edges(&self, lifetimes: &HashMap<BufferId, BufferLifetime>, writers: &HashMap<BufferId, usize>) -> Result<Vec<(usize, usize)>, GraphError>
    {
        let mut edges = Vec::new();
        for (reader, pass) in self.passes.iter().enumerate()
        {
            for buffer in pass.reads()
            {
                let writer = *writers.get(&buffer)
                    .ok_or(GraphError::UnwrittenInput { pass: pass.name, buffer })?;

                match lifetimes[&buffer]
                {
                    BufferLifetime::Transient => edges.push((writer, reader)),
                    BufferLifetime::History => edges.push((reader, writer))
                }
            }
        }

        Ok(edges)
    }
}

/// Kahn's algorithm, preferring the lowest declared index among ready nodes.
/// On failure returns the nodes that could not be scheduled.
fn topological_order(count: usize, edges: &[(usize, usize)]) -> Result<Vec<usize>, Vec<usize>>
{
    let mut incoming = vec![0usize; count];
    let mut outgoing = vec![Vec::new(); count];
    for &(from, to) in edges
    {
        incoming[to] += 1;
        outgoing[from].push(to);
    }

    let mut ready = (0..count).filter(|&i| incoming[i] == 0).collect::<BTreeSet<_>>();
    let mut order = Vec::with_capacity(count);

    while let Some(next) = ready.pop_first()
    {
        order.push(next);
        for &to in &outgoing[next]
        {
            incoming[to] -= 1;
            if incoming[to] == 0
            {
                ready.insert(to);
            }
        }
    }

    if order.len() == count
    {
        Ok(order)
    }
    else
    {
        Err((0..count).filter(|i| !order.contains(i)).collect())
    }
}
