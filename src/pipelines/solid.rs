use crate::{
    data_structures::vertex::VertexStreams,
    pipelines::{RasterState, mk_render_pipeline},
};

/// Lit solid pipeline for one winding. Groups: view, matrix record, material record.
pub fn mk_solid_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    depth_format: Option<wgpu::TextureFormat>,
    streams: &VertexStreams,
    front_face: wgpu::FrontFace,
    view_layout: &wgpu::BindGroupLayout,
    matrix_layout: &wgpu::BindGroupLayout,
    material_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Solid Pipeline Layout"),
        bind_group_layouts: &[Some(view_layout), Some(matrix_layout), Some(material_layout)],
        immediate_size: 0,
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Solid Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("solid.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        "Solid Pipeline",
        &layout,
        color_format,
        depth_format,
        RasterState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face,
            cull_mode: None,
        },
        &streams.layouts(),
        shader,
    )
}
