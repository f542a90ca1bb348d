use std::mem;

use anyhow::Context as _;
use bytemuck::Zeroable;
use wgpu::util::{DeviceExt, DrawIndexedIndirectArgs};

use crate::{
    context::Context,
    data_structures::{material::Material, matrix::MatrixNode, vertex::VertexStreams},
    gpu::{Resources, indirect_args},
    layout::SceneLayout,
    pipelines::{
        bbox::{BOX_VERTICES, BoxInstance, mk_bbox_pipeline},
        solid::mk_solid_pipeline,
        uniforms::{
            ViewUniform, mk_record_bind_group, mk_record_bind_group_layout, mk_view_bind_group,
            mk_view_bind_group_layout, mk_view_buffer, record_offset,
        },
    },
    render::{CullStats, RenderList},
    scene::CadScene,
};

/// Buffers of one uploaded scene.
#[derive(Debug)]
struct SceneBuffers {
    layout: SceneLayout,
    index_formats: Vec<wgpu::IndexFormat>,
    part_bbox_offsets: Vec<usize>,
    vbo: wgpu::Buffer,
    abo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    mesh_desc: Option<wgpu::Buffer>,
    mesh_prim: Option<wgpu::Buffer>,
    bboxes: wgpu::Buffer,
    matrix_bind_group: wgpu::BindGroup,
    material_bind_group: wgpu::BindGroup,
    solid_pipelines: [wgpu::RenderPipeline; 2],
}

#[derive(Debug)]
pub struct WgpuResources {
    device: wgpu::Device,
    queue: wgpu::Queue,
    color_format: wgpu::TextureFormat,
    depth_format: Option<wgpu::TextureFormat>,

    view_buffer: wgpu::Buffer,
    view_bind_group: wgpu::BindGroup,
    view_layout: wgpu::BindGroupLayout,
    matrix_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    bbox_pipeline: wgpu::RenderPipeline,

    scene: Option<SceneBuffers>,
    indirect: Option<wgpu::Buffer>,
    stats: CullStats,
}

fn buffer_init(device: &wgpu::Device, label: &str, contents: &[u8], usage: wgpu::BufferUsages) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage,
    })
}

impl WgpuResources {
    pub fn new(
        ctx: &Context,
        color_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
    ) -> Self {
        let device = &ctx.device;
        let view_layout = mk_view_bind_group_layout(device);
        let matrix_layout = mk_record_bind_group_layout(device, "matrix_bind_group_layout");
        let material_layout = mk_record_bind_group_layout(device, "material_bind_group_layout");
        let view_buffer = mk_view_buffer(device, ViewUniform::default());
        let view_bind_group = mk_view_bind_group(device, &view_layout, &view_buffer);
        let bbox_pipeline = mk_bbox_pipeline(device, color_format, depth_format, &view_layout, &matrix_layout);

        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            color_format,
            depth_format,
            view_buffer,
            view_bind_group,
            view_layout,
            matrix_layout,
            material_layout,
            bbox_pipeline,
            scene: None,
            indirect: None,
            stats: CullStats::default(),
        }
    }

    pub fn set_view(&self, view: ViewUniform) {
        self.queue
            .write_buffer(&self.view_buffer, 0, bytemuck::cast_slice(&[view]));
    }

    pub fn is_initialized(&self) -> bool {
        self.scene.is_some()
    }

    /// Writes the indirect draw buffer for `list` and records its statistics.
    pub fn upload_render_list(&mut self, list: &RenderList) -> anyhow::Result<()> {
        let scene = self
            .scene
            .as_ref()
            .context("render list uploaded before init_scene")?;
        let args = indirect_args(list, &scene.layout);
        let mut bytes = Vec::with_capacity(args.len() * mem::size_of::<DrawIndexedIndirectArgs>());
        for arg in &args {
            bytes.extend_from_slice(arg.as_bytes());
        }
        self.indirect = (!bytes.is_empty()).then(|| {
            buffer_init(
                &self.device,
                "Indirect Draw Buffer",
                &bytes,
                wgpu::BufferUsages::INDIRECT | wgpu::BufferUsages::COPY_DST,
            )
        });
        self.stats = list.stats();
        Ok(())
    }

    /// Draws every item of `list` with one indexed indirect draw each.
    pub fn draw_solid(&self, list: &RenderList, pass: &mut wgpu::RenderPass<'_>) {
        let (Some(scene), Some(indirect)) = (&self.scene, &self.indirect) else {
            return;
        };
        pass.set_bind_group(0, &self.view_bind_group, &[]);
        pass.set_vertex_buffer(0, scene.vbo.slice(..));
        pass.set_vertex_buffer(1, scene.abo.slice(..));

        let mut bound_geometry = None;
        let mut bound_ccw = None;
        let stride = mem::size_of::<DrawIndexedIndirectArgs>() as u64;
        for (i, item) in list.items.iter().enumerate() {
            if bound_ccw != Some(item.face_ccw) {
                let pipeline = &scene.solid_pipelines[if item.face_ccw { 0 } else { 1 }];
                pass.set_pipeline(pipeline);
                bound_ccw = Some(item.face_ccw);
            }
            if bound_geometry != Some(item.geometry_index) {
                let range = scene.layout.geometries[item.geometry_index].ibo;
                pass.set_index_buffer(
                    scene.ibo.slice(range.as_wgpu()),
                    scene.index_formats[item.geometry_index],
                );
                bound_geometry = Some(item.geometry_index);
            }
            pass.set_bind_group(1, &scene.matrix_bind_group, &[record_offset(item.matrix_index)]);
            pass.set_bind_group(2, &scene.material_bind_group, &[record_offset(item.material_index)]);
            pass.draw_indexed_indirect(indirect, i as u64 * stride);
        }
    }

    /// Meshlet descriptor and primitive storage buffers, when the scene has meshlets.
    pub fn meshlet_buffers(&self) -> Option<(&wgpu::Buffer, &wgpu::Buffer)> {
        let scene = self.scene.as_ref()?;
        scene.mesh_desc.as_ref().zip(scene.mesh_prim.as_ref())
    }

    /// Placement of every geometry inside the uploaded buffers.
    pub fn scene_layout(&self) -> Option<&SceneLayout> {
        self.scene.as_ref().map(|scene| &scene.layout)
    }
}

impl Resources for WgpuResources {
    fn init_scene(&mut self, scene: &CadScene) -> anyhow::Result<()> {
        self.deinit_scene();
        let start = instant::Instant::now();
        let layout = SceneLayout::compute(scene);
        let device = &self.device;

        let storage = wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST;
        let vbo = buffer_init(
            device,
            "Scene Vertex Buffer",
            &layout.pack_vertices(scene)?,
            wgpu::BufferUsages::VERTEX | storage,
        );
        let abo = buffer_init(
            device,
            "Scene Attribute Buffer",
            &layout.pack_attributes(scene)?,
            wgpu::BufferUsages::VERTEX | storage,
        );
        let ibo = buffer_init(
            device,
            "Scene Index Buffer",
            &layout.pack_indices(scene)?,
            wgpu::BufferUsages::INDEX | storage,
        );
        let mesh_desc = match layout.desc_size {
            0 => None,
            _ => Some(buffer_init(
                device,
                "Meshlet Descriptor Buffer",
                &layout.pack_meshlet_descs(scene)?,
                storage,
            )),
        };
        let mesh_prim = match layout.prim_size {
            0 => None,
            _ => Some(buffer_init(
                device,
                "Meshlet Primitive Buffer",
                &layout.pack_meshlet_prims(scene)?,
                storage,
            )),
        };

        // bindings need at least one record
        let matrices = if scene.matrices.is_empty() {
            vec![MatrixNode::zeroed()]
        } else {
            scene.matrices.clone()
        };
        let materials = if scene.materials.is_empty() {
            vec![Material::default()]
        } else {
            scene.materials.clone()
        };
        let uniform = wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST;
        let matrix_buffer = buffer_init(device, "Matrix Buffer", bytemuck::cast_slice(&matrices), uniform);
        let material_buffer = buffer_init(device, "Material Buffer", bytemuck::cast_slice(&materials), uniform);
        let matrix_bind_group = mk_record_bind_group(device, "matrix_bind_group", &self.matrix_layout, &matrix_buffer);
        let material_bind_group =
            mk_record_bind_group(device, "material_bind_group", &self.material_layout, &material_buffer);

        let mut boxes: Vec<BoxInstance> = scene
            .bboxes
            .iter()
            .map(|bbox| match bbox.is_empty() {
                true => BoxInstance::zeroed(),
                false => BoxInstance {
                    bbox_min: bbox.min.into(),
                    bbox_max: bbox.max.into(),
                },
            })
            .collect();
        if boxes.is_empty() {
            boxes.push(BoxInstance::zeroed());
        }
        let bboxes = buffer_init(device, "Part Box Buffer", bytemuck::cast_slice(&boxes), wgpu::BufferUsages::VERTEX);

        let streams = VertexStreams::new(scene.cfg.fp16, scene.cfg.extra_attributes);
        let solid_pipeline = |front_face| {
            mk_solid_pipeline(
                device,
                self.color_format,
                self.depth_format,
                &streams,
                front_face,
                &self.view_layout,
                &self.matrix_layout,
                &self.material_layout,
            )
        };
        let solid_pipelines = [solid_pipeline(wgpu::FrontFace::Ccw), solid_pipeline(wgpu::FrontFace::Cw)];

        self.scene = Some(SceneBuffers {
            index_formats: scene.geometry.iter().map(|g| g.index_width().format()).collect(),
            part_bbox_offsets: scene.geometry.iter().map(|g| g.part_bbox_offset).collect(),
            layout,
            vbo,
            abo,
            ibo,
            mesh_desc,
            mesh_prim,
            bboxes,
            matrix_bind_group,
            material_bind_group,
            solid_pipelines,
        });
        log::info!(
            "uploaded {} geometries, {} matrices, {} materials in {:.2} ms",
            scene.geometry.len(),
            scene.matrices.len(),
            scene.materials.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(())
    }

    fn deinit_scene(&mut self) {
        if let Some(scene) = self.scene.take() {
            scene.vbo.destroy();
            scene.abo.destroy();
            scene.ibo.destroy();
            scene.bboxes.destroy();
            if let Some(buffer) = scene.mesh_desc {
                buffer.destroy();
            }
            if let Some(buffer) = scene.mesh_prim {
                buffer.destroy();
            }
        }
        if let Some(indirect) = self.indirect.take() {
            indirect.destroy();
        }
        self.stats = CullStats::default();
    }

    fn synchronize(&self) -> anyhow::Result<()> {
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .context("waiting for the device failed")?;
        Ok(())
    }

    fn stats(&self) -> CullStats {
        self.stats
    }

    fn draw_bounding_boxes(&self, list: &RenderList, pass: &mut wgpu::RenderPass<'_>) {
        let Some(scene) = &self.scene else {
            return;
        };
        pass.set_pipeline(&self.bbox_pipeline);
        pass.set_bind_group(0, &self.view_bind_group, &[]);
        pass.set_vertex_buffer(0, scene.bboxes.slice(..));
        for item in &list.items {
            let bbox = (scene.part_bbox_offsets[item.geometry_index] + item.part_index) as u32;
            pass.set_bind_group(1, &scene.matrix_bind_group, &[record_offset(item.matrix_index)]);
            pass.draw(0..BOX_VERTICES, bbox..bbox + 1);
        }
    }
}
