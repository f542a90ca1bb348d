use std::num::NonZeroU64;

use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector3};
use wgpu::util::DeviceExt;

use crate::data_structures::material::UBO_RANGE_ALIGNMENT;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ViewUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Normalized direction towards the light, w unused.
    pub light_dir: [f32; 4],
}

impl ViewUniform {
    pub fn new(view_proj: Matrix4<f32>, light_dir: Vector3<f32>) -> Self {
        let light = light_dir.normalize();
        Self {
            view_proj: view_proj.into(),
            light_dir: [light.x, light.y, light.z, 0.0],
        }
    }
}

impl Default for ViewUniform {
    fn default() -> Self {
        Self::new(Matrix4::identity(), Vector3::new(0.3, 0.5, 1.0))
    }
}

pub fn mk_view_buffer(device: &wgpu::Device, uniform: ViewUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("View Buffer"),
        contents: bytemuck::cast_slice(&[uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_view_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("view_bind_group_layout"),
    })
}

pub fn mk_view_bind_group(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, buffer: &wgpu::Buffer) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: Some("view_bind_group"),
    })
}

/// One 256-byte record per draw, selected with a dynamic offset.
pub fn mk_record_bind_group_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: NonZeroU64::new(UBO_RANGE_ALIGNMENT as u64),
            },
            count: None,
        }],
        label: Some(label),
    })
}

pub fn mk_record_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer,
                offset: 0,
                size: NonZeroU64::new(UBO_RANGE_ALIGNMENT as u64),
            }),
        }],
        label: Some(label),
    })
}

/// Dynamic offset of record `index`.
pub fn record_offset(index: usize) -> wgpu::DynamicOffset {
    (index * UBO_RANGE_ALIGNMENT) as wgpu::DynamicOffset
}
