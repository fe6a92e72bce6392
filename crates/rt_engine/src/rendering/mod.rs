pub mod backend;
pub mod binder;
pub mod fullscreen;
pub mod graph;
pub mod gui;
pub mod presentation;
pub mod renderer;
pub mod sequencer;
pub mod shader;

use crate::math::Color;

pub use crate::rendering::renderer::*;

pub struct FullscreenPipelineInfo<'a>
{
    pub shader: &'a wgpu::ShaderModule,

    pub vs_main: &'a str,
    pub fs_main: &'a str,

    pub bind_groups: &'a [&'a wgpu::BindGroupLayout],
    pub format: wgpu::TextureFormat,

    pub label: Option<&'a str>
}

/// A pipeline drawing one vertex-bufferless triangle over the whole target.
pub fn construct_fullscreen_pipeline(device: &wgpu::Device, info: &FullscreenPipelineInfo) -> wgpu::RenderPipeline
{
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: info.label,
        bind_group_layouts: info.bind_groups,
        push_constant_ranges: &[]
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: info.label,
        layout: Some(&render_pipeline_layout),
        vertex: wgpu::VertexState {
            module: info.shader,
            entry_point: info.vs_main,
            buffers: &[]
        },

        fragment: Some(wgpu::FragmentState {
            module: info.shader,
            entry_point: info.fs_main,
            targets: &[Some(wgpu::ColorTargetState {
                format: info.format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false
        },

        depth_stencil: None,

        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false
        },
        multiview: None
    })
}

pub fn get_command_encoder(device: &wgpu::Device) -> wgpu::CommandEncoder
{
    device.create_command_encoder(&wgpu::CommandEncoderDescriptor
    {
        label: Some("Command Encoder")
    })
}

/// `clear` of `None` keeps what the target already holds.
pub fn get_render_pass<'a>(encoder: &'a mut wgpu::CommandEncoder, view: &'a wgpu::TextureView, clear: Option<Color>, label: Option<&'a str>) -> wgpu::RenderPass<'a>
{
    let load = match clear
    {
        Some(color) => wgpu::LoadOp::Clear(color.to_wgpu()),
        None => wgpu::LoadOp::Load
    };

    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label,
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load,
                store: true,
            }
        })],

        depth_stencil_attachment: None
    })
}
