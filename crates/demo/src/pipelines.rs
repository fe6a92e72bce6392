//! The two render graphs the demo can run. Both share the raytrace pass and differ in
//! how the noisy image is cleaned up before it reaches the screen.

use std::path::PathBuf;

use rt_engine::prelude::*;

use crate::config::PipelineVariant;

pub const RAYTRACE_SHADER: &str = include_str!("../resources/shaders/raytrace.wgsl");
pub const DENOISE_SHADER: &str = include_str!("../resources/shaders/denoise.wgsl");
pub const DENOISE_GUIDED_SHADER: &str = include_str!("../resources/shaders/denoise_guided.wgsl");
pub const TAA_SHADER: &str = include_str!("../resources/shaders/taa.wgsl");

pub const NOISY: BufferId = BufferId("noisy");
pub const NORMALS: BufferId = BufferId("normals");
pub const DENOISED: BufferId = BufferId("denoised");
pub const TAA_OUTPUT: BufferId = BufferId("taa_output");
pub const HISTORY: BufferId = BufferId("history");

/// Resolves each pass shader to a file in `shader_dir` when one exists, else the embedded copy.
#[derive(Debug, Clone, Default)]
pub struct ShaderLibrary
{
    shader_dir: Option<PathBuf>
}

impl ShaderLibrary
{
    pub fn new(shader_dir: Option<PathBuf>) -> Self
    {
        Self { shader_dir }
    }

    pub fn source(&self, name: &'static str, embedded: &'static str) -> ShaderSource
    {
        if let Some(dir) = &self.shader_dir
        {
            let path = dir.join(format!("{}.wgsl", name));
            if path.is_file()
            {
                log::info!("Shader '{}' loaded from '{}'", name, path.display());
                return ShaderSource::File(path);
            }
        }

        ShaderSource::embedded(name, embedded)
    }

    fn shader(&self, name: &'static str, embedded: &'static str, entry_point: &'static str) -> ShaderRef
    {
        ShaderRef
        {
            source: self.source(name, embedded),
            entry_point
        }
    }
}

/// raytrace -> denoise -> history update, presenting the denoised image.
pub fn single_denoise(shaders: &ShaderLibrary) -> GraphDesc
{
    GraphDesc
    {
        label: "single_denoise",
        buffers: vec![
            BufferDesc::transient(NOISY),
            BufferDesc::transient(DENOISED),
            BufferDesc::history(HISTORY)
        ],
        passes: vec![
            PassDesc::draw(
                "raytrace",
                shaders.shader("raytrace", RAYTRACE_SHADER, "fs_main"),
                UniformBlock::Scene,
                vec![],
                NOISY
            ),
            PassDesc::draw(
                "denoise",
                shaders.shader("denoise", DENOISE_SHADER, "fs_main"),
                UniformBlock::Post,
                vec![InputSlot::new("noisy_tex", NOISY), InputSlot::new("history_tex", HISTORY)],
                DENOISED
            ),
            PassDesc::history_update("history_update", DENOISED, DENOISED, HISTORY)
        ],
        present: DENOISED
    }
}

/// raytrace + normals -> guided denoise -> TAA -> history update, presenting the TAA output.
/// On reset frames the history restarts from the denoised image.
pub fn denoise_taa(shaders: &ShaderLibrary) -> GraphDesc
{
    GraphDesc
    {
        label: "denoise_taa",
        buffers: vec![
            BufferDesc::transient(NOISY),
            BufferDesc::transient(NORMALS),
            BufferDesc::transient(DENOISED),
            BufferDesc::transient(TAA_OUTPUT),
            BufferDesc::history(HISTORY)
        ],
        passes: vec![
            PassDesc::draw(
                "raytrace",
                shaders.shader("raytrace", RAYTRACE_SHADER, "fs_main"),
                UniformBlock::Scene,
                vec![],
                NOISY
            ),
            PassDesc::draw(
                "normals",
                shaders.shader("raytrace", RAYTRACE_SHADER, "fs_normals"),
                UniformBlock::Scene,
                vec![],
                NORMALS
            ),
            PassDesc::draw(
                "denoise",
                shaders.shader("denoise_guided", DENOISE_GUIDED_SHADER, "fs_main"),
                UniformBlock::Post,
                vec![
                    InputSlot::new("noisy_tex", NOISY),
                    InputSlot::new("normals_tex", NORMALS),
                    InputSlot::new("history_tex", HISTORY)
                ],
                DENOISED
            ),
            PassDesc::draw(
                "taa",
                shaders.shader("taa", TAA_SHADER, "fs_main"),
                UniformBlock::Post,
                vec![InputSlot::new("denoised_tex", DENOISED), InputSlot::new("history_tex", HISTORY)],
                TAA_OUTPUT
            ),
            PassDesc::history_update("history_update", TAA_OUTPUT, DENOISED, HISTORY)
        ],
        present: TAA_OUTPUT
    }
}

pub fn graph_for(variant: PipelineVariant, shaders: &ShaderLibrary) -> GraphDesc
{
    match variant
    {
        PipelineVariant::SingleDenoise => single_denoise(shaders),
        PipelineVariant::DenoiseTaa => denoise_taa(shaders)
    }
}

#[cfg(test)]
mod tests
{
    use std::collections::HashMap;

    use rt_engine::rendering::binder::{FrameInfo, FrameUniforms, UniformBinder};
    use rt_engine::rendering::graph::PassOp;
    use rt_engine::rendering::sequencer::{GraphBackend, HistoryPolicy, RenderPassSequencer};
    use rt_engine::rendering::shader::ShaderProgram;
    use super::*;
    use crate::config::DemoConfig;
    use crate::world::DemoWorld;

    /// Records what each frame does instead of touching a GPU.
    #[derive(Default)]
    struct RecordingBackend
    {
        extents: HashMap<BufferId, UVec2>,
        contents: HashMap<BufferId, String>,
        frames: Vec<FrameInfo>,
        ops: Vec<String>,
        /// (pass, history content) for every pass that sampled the history buffer.
        history_reads: Vec<(&'static str, String)>,
        presented: Vec<String>
    }

    impl RecordingBackend
    {
        fn content(&self, buffer: BufferId) -> String
        {
            self.contents.get(&buffer).cloned().unwrap_or_default()
        }
    }

    impl GraphBackend for RecordingBackend
    {
        type Target = ();

        fn allocate(&mut self, buffers: &[BufferDesc], extent: UVec2)
        {
            for buffer in buffers
            {
                self.extents.insert(buffer.id, extent);
                self.contents.insert(buffer.id, "cleared".to_string());
            }
        }

        fn extent(&self, buffer: BufferId) -> Option<UVec2>
        {
            self.extents.get(&buffer).copied()
        }

        fn begin_frame(&mut self, frame: &FrameInfo)
        {
            self.frames.push(*frame);
        }

        fn draw(&mut self, _pass_index: usize, pass: &PassDesc, _uniforms: &FrameUniforms)
        {
            if pass.reads().contains(&HISTORY)
            {
                let history = self.content(HISTORY);
                self.history_reads.push((pass.name, history));
            }

            let frame = self.frames.last().map(|f| f.index).unwrap_or_default();
            self.ops.push(format!("draw {}", pass.name));
            self.contents.insert(pass.output, format!("{}@{}", pass.name, frame));
        }

        fn copy(&mut self, _pass: &PassDesc, source: BufferId, destination: BufferId)
        {
            self.ops.push(format!("copy {} -> {}", source, destination));
            let content = self.content(source);
            self.contents.insert(destination, content);
        }

        fn present(&mut self, buffer: BufferId, _uniforms: &FrameUniforms, _target: &())
        {
            let content = self.content(buffer);
            self.presented.push(content);
        }

        fn end_frame(&mut self) {}
    }

    fn run_frames(variant: PipelineVariant, reset_interval: u64, frames: usize) -> (RenderPassSequencer<RecordingBackend>, Vec<bool>)
    {
        let config = DemoConfig { pipeline: variant, ..DemoConfig::default() };
        let world = DemoWorld::new(&config);
        let binder = UniformBinder::new(config.post_settings());

        let graph = graph_for(variant, &ShaderLibrary::default()).compile().unwrap();
        let mut sequencer = RenderPassSequencer::new(graph, RecordingBackend::default(), HistoryPolicy::new(reset_interval), UVec2::new(64, 36));

        let resets: Vec<bool> = (0..frames)
            .map(|_| sequencer.execute(|frame| binder.bind(&world.scene, &world.camera, frame), &()).unwrap().history_reset)
            .collect();

        (sequencer, resets)
    }

    fn ops_per_frame(backend: &RecordingBackend, frames: usize) -> Vec<Vec<String>>
    {
        let per_frame = backend.ops.len() / frames;
        backend.ops.chunks(per_frame).map(|c| c.to_vec()).collect()
    }

    fn order(graph: &GraphDesc) -> Vec<&'static str>
    {
        graph.clone().compile().unwrap().passes().iter().map(|p| p.name).collect()
    }

    #[test]
    fn single_denoise_runs_in_declared_order()
    {
        let graph = single_denoise(&ShaderLibrary::default());
        assert_eq!(order(&graph), vec!["raytrace", "denoise", "history_update"]);
        assert_eq!(graph.present, DENOISED);
    }

    #[test]
    fn denoise_taa_runs_history_update_last()
    {
        let graph = denoise_taa(&ShaderLibrary::default());
        assert_eq!(order(&graph), vec!["raytrace", "normals", "denoise", "taa", "history_update"]);
        assert_eq!(graph.present, TAA_OUTPUT);
    }

    #[test]
    fn every_history_reader_runs_before_the_update()
    {
        for variant in [PipelineVariant::SingleDenoise, PipelineVariant::DenoiseTaa]
        {
            let graph = graph_for(variant, &ShaderLibrary::default()).compile().unwrap();
            let update = graph.passes().iter().position(|p| p.output == HISTORY).unwrap();

            for (i, pass) in graph.passes().iter().enumerate()
            {
                if pass.reads().contains(&HISTORY)
                {
                    assert!(i < update, "'{}' reads history after it is overwritten", pass.name);
                }
            }
        }
    }

    #[test]
    fn every_embedded_pass_binds_without_warnings()
    {
        for variant in [PipelineVariant::SingleDenoise, PipelineVariant::DenoiseTaa]
        {
            let graph = graph_for(variant, &ShaderLibrary::default());

            for pass in &graph.passes
            {
                let PassOp::Draw { shader, uniforms, inputs } = &pass.op else { continue };

                let program = ShaderProgram::load(&shader.source).unwrap();
                program.require_fragment_entry(shader.entry_point).unwrap();

                let (interface, warnings) = program.interface(*uniforms, inputs).unwrap();
                assert!(warnings.is_empty(), "pass '{}': {:?}", pass.name, warnings);
                assert_eq!(interface.sampled_buffers().count(), inputs.len());
            }
        }
    }

    #[test]
    fn missing_override_falls_back_to_embedded()
    {
        let shaders = ShaderLibrary::new(Some(PathBuf::from("no/such/dir")));
        assert_eq!(shaders.source("taa", TAA_SHADER), ShaderSource::embedded("taa", TAA_SHADER));
    }

    #[test]
    fn override_file_replaces_embedded_shader()
    {
        let dir = std::env::temp_dir().join(format!("raytrace_demo_shaders_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("denoise.wgsl"), DENOISE_SHADER).unwrap();

        let shaders = ShaderLibrary::new(Some(dir.clone()));
        assert_eq!(shaders.source("denoise", DENOISE_SHADER), ShaderSource::File(dir.join("denoise.wgsl")));
        assert_eq!(shaders.source("taa", TAA_SHADER), ShaderSource::embedded("taa", TAA_SHADER));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn single_denoise_copies_denoised_into_history_every_frame()
    {
        let (sequencer, resets) = run_frames(PipelineVariant::SingleDenoise, 3, 4);
        let backend = sequencer.backend();

        assert_eq!(resets, [true, false, false, true]);
        for ops in ops_per_frame(backend, 4)
        {
            assert_eq!(ops, ["draw raytrace", "draw denoise", "copy denoised -> history"]);
        }

        let seen = backend.history_reads.iter().map(|(pass, history)| format!("{}: {}", pass, history)).collect::<Vec<_>>();
        assert_eq!(seen, ["denoise: cleared", "denoise: denoise@0", "denoise: denoise@1", "denoise: denoise@2"]);
        assert_eq!(backend.presented, ["denoise@0", "denoise@1", "denoise@2", "denoise@3"]);
    }

    #[test]
    fn denoise_taa_restarts_history_from_denoised_on_reset_frames()
    {
        let (sequencer, resets) = run_frames(PipelineVariant::DenoiseTaa, 3, 6);
        let backend = sequencer.backend();

        assert_eq!(resets, [true, false, false, true, false, false]);
        for (frame, ops) in ops_per_frame(backend, 6).into_iter().enumerate()
        {
            let source = if frame % 3 == 0 { "denoised" } else { "taa_output" };
            assert_eq!(ops, [
                "draw raytrace".to_string(),
                "draw normals".to_string(),
                "draw denoise".to_string(),
                "draw taa".to_string(),
                format!("copy {} -> history", source)
            ]);
        }

        let taa_reads = backend.history_reads.iter()
            .filter(|(pass, _)| *pass == "taa")
            .map(|(_, history)| history.as_str())
            .collect::<Vec<_>>();
        assert_eq!(taa_reads, ["cleared", "denoise@0", "taa@1", "taa@2", "denoise@3", "taa@4"]);
        assert_eq!(backend.content(HISTORY), "taa@5");
        assert_eq!(backend.presented.last().map(String::as_str), Some("taa@5"));
    }

    #[test]
    fn denoise_taa_without_resets_always_keeps_taa_output()
    {
        let (sequencer, resets) = run_frames(PipelineVariant::DenoiseTaa, 0, 5);

        assert!(resets.iter().all(|reset| !reset));
        assert!(sequencer.backend().ops.iter()
            .filter(|op| op.starts_with("copy"))
            .all(|op| op == "copy taa_output -> history"));
    }

    #[test]
    fn history_is_invalid_on_first_frame_and_after_resize()
    {
        for variant in [PipelineVariant::SingleDenoise, PipelineVariant::DenoiseTaa]
        {
            let config = DemoConfig { pipeline: variant, ..DemoConfig::default() };
            let world = DemoWorld::new(&config);
            let binder = UniformBinder::new(config.post_settings());
            let bind = |frame: &FrameInfo| binder.bind(&world.scene, &world.camera, frame);

            let graph = graph_for(variant, &ShaderLibrary::default()).compile().unwrap();
            let mut sequencer = RenderPassSequencer::new(graph, RecordingBackend::default(), config.history_policy(), UVec2::new(64, 36));

            sequencer.execute(bind, &()).unwrap();
            sequencer.execute(bind, &()).unwrap();
            assert!(sequencer.resize(UVec2::new(128, 72)));
            assert_eq!(sequencer.backend().content(HISTORY), "cleared");
            sequencer.execute(bind, &()).unwrap();

            let valid = sequencer.backend().frames.iter().map(|f| f.history_valid).collect::<Vec<_>>();
            assert_eq!(valid, [false, true, false], "{:?}", variant);

            let uniforms = bind(&sequencer.frame_info());
            assert_eq!(uniforms.post.history_valid, 1);
        }
    }
}
