use crate::pipelines::{RasterState, mk_render_pipeline};

/// Line-list vertices per box: 12 edges, two ends each.
pub const BOX_VERTICES: u32 = 24;

/// Per-instance box record: object-space min and max.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BoxInstance {
    pub bbox_min: [f32; 4],
    pub bbox_max: [f32; 4],
}

impl BoxInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x4];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<BoxInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

pub fn mk_bbox_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    depth_format: Option<wgpu::TextureFormat>,
    view_layout: &wgpu::BindGroupLayout,
    matrix_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Bounding Box Pipeline Layout"),
        bind_group_layouts: &[Some(view_layout), Some(matrix_layout)],
        immediate_size: 0,
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Bounding Box Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("bbox.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        "Bounding Box Pipeline",
        &layout,
        color_format,
        depth_format,
        RasterState {
            topology: wgpu::PrimitiveTopology::LineList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
        },
        &[BoxInstance::desc()],
        shader,
    )
}
