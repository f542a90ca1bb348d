//! Vertex and attribute records as stored in geometry buffers.
//!
//! Positions live in one stream, normals plus optional extra slots in a second
//! one. Both streams are indexed by the same vertex id, so their strides alone
//! decide where a vertex starts.

use std::mem;

use half::f16;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VertexAttributes {
    pub normal: [f32; 4],
}

/// Half precision position, components stored as raw `f16` bits.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VertexFP16 {
    pub position: [u16; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VertexAttributesFP16 {
    pub normal: [u16; 4],
}

/// Byte size of one position record.
pub fn vertex_size(fp16: bool) -> usize {
    if fp16 {
        mem::size_of::<VertexFP16>()
    } else {
        mem::size_of::<Vertex>()
    }
}

/// Byte size of one attribute record: the normal plus `extra` 4-wide slots.
pub fn vertex_attribute_size(fp16: bool, extra: u32) -> usize {
    if fp16 {
        mem::size_of::<VertexAttributesFP16>() + mem::size_of::<f16>() * 4 * extra as usize
    } else {
        mem::size_of::<VertexAttributes>() + mem::size_of::<f32>() * 4 * extra as usize
    }
}

/// Writes a 4-component value into `dst` in the requested precision.
pub(crate) fn write_vec4(dst: &mut [u8], value: [f32; 4], fp16: bool) {
    if fp16 {
        let packed = value.map(|v| f16::from_f32(v).to_bits());
        dst.copy_from_slice(bytemuck::bytes_of(&packed));
    } else {
        dst.copy_from_slice(bytemuck::bytes_of(&value));
    }
}

/// Reads back a 4-component value written by [`write_vec4`].
pub fn read_vec4(src: &[u8], fp16: bool) -> [f32; 4] {
    if fp16 {
        let packed: [u16; 4] = bytemuck::pod_read_unaligned(&src[..8]);
        packed.map(|bits| f16::from_bits(bits).to_f32())
    } else {
        bytemuck::pod_read_unaligned(&src[..16])
    }
}

/// Maps a unit normal into `[0, 1]` color space.
pub(crate) fn normal_color(normal: [f32; 3]) -> [f32; 4] {
    [
        normal[0] * 0.5 + 0.5,
        normal[1] * 0.5 + 0.5,
        normal[2] * 0.5 + 0.5,
        1.0,
    ]
}

/// Vertex buffer layouts for the position and attribute streams.
///
/// Location 0 is the position, location 1 the normal, extra slots follow from 2.
#[derive(Debug, Clone)]
pub struct VertexStreams {
    fp16: bool,
    extra: u32,
    position: [wgpu::VertexAttribute; 1],
    attributes: Vec<wgpu::VertexAttribute>,
}

impl VertexStreams {
    pub fn new(fp16: bool, extra: u32) -> Self {
        let format = if fp16 {
            wgpu::VertexFormat::Float16x4
        } else {
            wgpu::VertexFormat::Float32x4
        };
        // 16 locations minus position and normal
        let slots = extra.min(14);
        let attributes = (0..=slots)
            .map(|i| wgpu::VertexAttribute {
                offset: format.size() * i as wgpu::BufferAddress,
                shader_location: 1 + i,
                format,
            })
            .collect();

        Self {
            fp16,
            extra,
            position: [wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format,
            }],
            attributes,
        }
    }

    pub fn layouts(&self) -> [wgpu::VertexBufferLayout<'_>; 2] {
        [
            wgpu::VertexBufferLayout {
                array_stride: vertex_size(self.fp16) as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &self.position,
            },
            wgpu::VertexBufferLayout {
                array_stride: vertex_attribute_size(self.fp16, self.extra) as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &self.attributes,
            },
        ]
    }
}
