//! Per-mesh storage: vertex, attribute and index buffers, the part table and
//! the optional meshlet topology.
//!
//! All byte sizes are read off the owned buffers, so they cannot drift from
//! the data that is eventually uploaded.

use cgmath::{InnerSpace, Vector3};

use crate::{
    config::LoadConfig,
    data_structures::{
        bbox::BoundingBox,
        meshlet::{self, MeshletTopology},
        vertex::{self, normal_color, read_vec4, write_vec4},
    },
    error::{SceneError, try_alloc_bytes},
    source::SourceGeometry,
};

/// Largest vertex count that still fits 16-bit indices.
pub const MAX_SHORT_VERTICES: usize = u16::MAX as usize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IndexWidth {
    U16,
    #[default]
    U32,
}

impl IndexWidth {
    /// Narrowest width for `num_vertices`, or `IndexOverflow` when even
    /// 32-bit indices cannot address the vertices or count the indices.
    pub fn select(
        geometry: usize,
        num_vertices: usize,
        num_indices: usize,
        allow_shorts: bool,
    ) -> Result<Self, SceneError> {
        let limit = u32::MAX as usize;
        if num_vertices > limit || num_indices > limit {
            return Err(SceneError::IndexOverflow {
                geometry,
                count: num_vertices.max(num_indices),
            });
        }
        if allow_shorts && num_vertices <= MAX_SHORT_VERTICES {
            Ok(IndexWidth::U16)
        } else {
            Ok(IndexWidth::U32)
        }
    }

    pub fn size(self) -> usize {
        match self {
            IndexWidth::U16 => 2,
            IndexWidth::U32 => 4,
        }
    }

    pub fn format(self) -> wgpu::IndexFormat {
        match self {
            IndexWidth::U16 => wgpu::IndexFormat::Uint16,
            IndexWidth::U32 => wgpu::IndexFormat::Uint32,
        }
    }

    /// Appends `indices` in little-endian at this width.
    pub(crate) fn write(self, dst: &mut Vec<u8>, indices: &[u32]) {
        match self {
            IndexWidth::U16 => indices
                .iter()
                .for_each(|&i| dst.extend_from_slice(&(i as u16).to_le_bytes())),
            IndexWidth::U32 => indices
                .iter()
                .for_each(|&i| dst.extend_from_slice(&i.to_le_bytes())),
        }
    }

    pub fn read(self, src: &[u8], count: usize) -> Vec<u32> {
        match self {
            IndexWidth::U16 => src
                .chunks_exact(2)
                .take(count)
                .map(|b| u16::from_le_bytes([b[0], b[1]]) as u32)
                .collect(),
            IndexWidth::U32 => src
                .chunks_exact(4)
                .take(count)
                .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect(),
        }
    }
}

/// A run of indices: byte offset into the index buffer and index count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawRange {
    pub offset: usize,
    pub count: u32,
}

impl DrawRange {
    /// The offset expressed in indices of the given width.
    pub fn first_index(&self, width: IndexWidth) -> u32 {
        (self.offset / width.size()) as u32
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshletRange {
    pub offset: u32,
    pub count: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GeometryPart {
    pub index_solid: DrawRange,
    pub mesh_solid: MeshletRange,
}

#[derive(Debug, Default)]
pub struct Geometry {
    /// First entry of this geometry in the scene's flattened part tables.
    pub part_offset: usize,
    /// First entry of this geometry in the scene's per-part bbox table.
    pub part_bbox_offset: usize,
    pub use_shorts: bool,
    pub fp16: bool,
    pub extra_attributes: u32,

    pub num_vertices: usize,
    pub num_index_solid: usize,

    pub parts: Vec<GeometryPart>,
    pub meshlet: MeshletTopology,
    /// Union of the part boxes, object space.
    pub bbox: BoundingBox,

    pub vbo_data: Vec<u8>,
    pub abo_data: Vec<u8>,
    pub ibo_data: Vec<u8>,
}

/// Area-weighted vertex normals for meshes that come without any.
pub fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vector3::new(0.0f32, 0.0, 0.0); positions.len()];
    for c in indices.chunks_exact(3) {
        let p0: Vector3<f32> = positions[c[0] as usize].into();
        let p1: Vector3<f32> = positions[c[1] as usize].into();
        let p2: Vector3<f32> = positions[c[2] as usize].into();
        // unnormalized, so larger faces weigh more
        let face = (p1 - p0).cross(p2 - p0);
        for &i in c {
            normals[i as usize] += face;
        }
    }
    normals
        .into_iter()
        .map(|n| {
            if n.magnitude2() > 0.0 {
                n.normalize().into()
            } else {
                [0.0, 0.0, 1.0]
            }
        })
        .collect()
}

fn validate(index: usize, source: &SourceGeometry) -> Result<(), SceneError> {
    let num_vertices = source.positions.len();
    if source.indices.len() % 3 != 0 {
        return Err(SceneError::malformed(format!(
            "geometry {} has {} indices, not a multiple of 3",
            index,
            source.indices.len()
        )));
    }
    if !source.normals.is_empty() && source.normals.len() != num_vertices {
        return Err(SceneError::malformed(format!(
            "geometry {} has {} normals for {} vertices",
            index,
            source.normals.len(),
            num_vertices
        )));
    }
    if let Some(bad) = source.indices.iter().find(|&&i| i as usize >= num_vertices) {
        return Err(SceneError::malformed(format!(
            "geometry {} references vertex {} of {}",
            index, bad, num_vertices
        )));
    }
    for (p, part) in source.parts.iter().enumerate() {
        let end = part.first_index.checked_add(part.index_count);
        if part.first_index % 3 != 0
            || part.index_count % 3 != 0
            || end.is_none_or(|end| end > source.indices.len())
        {
            return Err(SceneError::malformed(format!(
                "geometry {} part {} covers indices {}+{} of {}",
                index,
                p,
                part.first_index,
                part.index_count,
                source.indices.len()
            )));
        }
    }
    Ok(())
}

impl Geometry {
    /// Lays out one source mesh according to `cfg`.
    ///
    /// Returns the geometry and the tight object-space box of each part, in
    /// part order. `part_offset` and `part_bbox_offset` are left at zero for
    /// the scene to assign.
    pub fn build(
        index: usize,
        source: &SourceGeometry,
        cfg: &LoadConfig,
    ) -> Result<(Self, Vec<BoundingBox>), SceneError> {
        validate(index, source)?;

        let num_vertices = source.positions.len();
        let num_indices = source.indices.len();
        let width = IndexWidth::select(index, num_vertices, num_indices, cfg.allow_shorts)?;

        let positions: Vec<[f32; 3]> = source
            .positions
            .iter()
            .map(|p| [p[0] * cfg.scale, p[1] * cfg.scale, p[2] * cfg.scale])
            .collect();
        let normals = if source.normals.is_empty() {
            compute_normals(&positions, &source.indices)
        } else {
            source.normals.clone()
        };

        let vertex_size = vertex::vertex_size(cfg.fp16);
        let attribute_size = vertex::vertex_attribute_size(cfg.fp16, cfg.extra_attributes);
        let slot = if cfg.fp16 { 8 } else { 16 };

        let mut vbo_data = try_alloc_bytes("vertex buffer", num_vertices * vertex_size)?;
        let mut abo_data = try_alloc_bytes("attribute buffer", num_vertices * attribute_size)?;
        for (v, (p, n)) in positions.iter().zip(&normals).enumerate() {
            let dst = &mut vbo_data[v * vertex_size..(v + 1) * vertex_size];
            write_vec4(dst, [p[0], p[1], p[2], 1.0], cfg.fp16);

            let dst = &mut abo_data[v * attribute_size..(v + 1) * attribute_size];
            write_vec4(&mut dst[..slot], [n[0], n[1], n[2], 0.0], cfg.fp16);
            let extra = if cfg.colorize_extra {
                normal_color(*n)
            } else {
                [n[0], n[1], n[2], 0.0]
            };
            for s in 1..=cfg.extra_attributes as usize {
                write_vec4(&mut dst[s * slot..(s + 1) * slot], extra, cfg.fp16);
            }
        }

        let mut ibo_data = Vec::new();
        ibo_data
            .try_reserve_exact(num_indices * width.size())
            .map_err(SceneError::allocation("index buffer", num_indices * width.size()))?;
        width.write(&mut ibo_data, &source.indices);

        let mut part_bboxes = Vec::with_capacity(source.parts.len());
        let mut bbox = BoundingBox::new();
        for part in &source.parts {
            let indices = &source.indices[part.first_index..part.first_index + part.index_count];
            let part_bbox = BoundingBox::from_positions(indices.iter().map(|&i| &positions[i as usize]));
            bbox.merge(&part_bbox);
            part_bboxes.push(part_bbox);
        }

        let ranges: Vec<(usize, usize)> = source
            .parts
            .iter()
            .map(|p| (p.first_index, p.index_count))
            .collect();
        let (meshlet, mesh_ranges) = match meshlet::build_meshlets(
            cfg.mesh_builder,
            cfg.mesh_limits(),
            &positions,
            &source.indices,
            &ranges,
            width,
        ) {
            Some((topology, ranges)) => (topology, ranges),
            None => (MeshletTopology::default(), vec![Default::default(); source.parts.len()]),
        };

        let parts = source
            .parts
            .iter()
            .zip(mesh_ranges)
            .map(|(part, mesh_solid)| GeometryPart {
                index_solid: DrawRange {
                    offset: part.first_index * width.size(),
                    count: part.index_count as u32,
                },
                mesh_solid,
            })
            .collect();

        let geometry = Geometry {
            part_offset: 0,
            part_bbox_offset: 0,
            use_shorts: width == IndexWidth::U16,
            fp16: cfg.fp16,
            extra_attributes: cfg.extra_attributes,
            num_vertices,
            num_index_solid: num_indices,
            parts,
            meshlet,
            bbox,
            vbo_data,
            abo_data,
            ibo_data,
        };
        Ok((geometry, part_bboxes))
    }

    pub fn index_width(&self) -> IndexWidth {
        if self.use_shorts {
            IndexWidth::U16
        } else {
            IndexWidth::U32
        }
    }

    pub fn vertex_size(&self) -> usize {
        vertex::vertex_size(self.fp16)
    }

    pub fn vertex_attribute_size(&self) -> usize {
        vertex::vertex_attribute_size(self.fp16, self.extra_attributes)
    }

    pub fn vbo_size(&self) -> usize {
        self.vbo_data.len()
    }

    pub fn abo_size(&self) -> usize {
        self.abo_data.len()
    }

    pub fn ibo_size(&self) -> usize {
        self.ibo_data.len()
    }

    /// Bytes of meshlet descriptors.
    pub fn mesh_size(&self) -> usize {
        self.meshlet.desc_size()
    }

    /// Bytes of meshlet vertex index and triangle data.
    pub fn mesh_indices_size(&self) -> usize {
        self.meshlet.prim_size()
    }

    pub fn has_meshlets(&self) -> bool {
        !self.meshlet.is_empty()
    }

    pub fn indices(&self) -> Vec<u32> {
        self.index_width().read(&self.ibo_data, self.num_index_solid)
    }

    /// Position of vertex `index`, decoded to full precision.
    pub fn position(&self, index: usize) -> [f32; 4] {
        let size = self.vertex_size();
        read_vec4(&self.vbo_data[index * size..], self.fp16)
    }

    /// Attribute slot `slot` of vertex `index`; slot 0 is the normal.
    pub fn attribute(&self, index: usize, slot: usize) -> [f32; 4] {
        let size = self.vertex_attribute_size();
        let width = if self.fp16 { 8 } else { 16 };
        read_vec4(&self.abo_data[index * size + slot * width..], self.fp16)
    }
}
