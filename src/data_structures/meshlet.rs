//! Meshlet clustering and packing.
//!
//! Triangles of each geometry part are grouped greedily, in index order, into
//! meshlets with a bounded number of unique vertices and primitives. A meshlet
//! never spans two parts, so every part owns a contiguous meshlet range.
//!
//! The packed result is two byte buffers: descriptors (`MeshletDesc`, one per
//! meshlet) and primitive data holding the per-meshlet vertex index lists and
//! local triangle lists. How the primitive data is arranged depends on
//! [`MeshletBuilderType`].

use std::mem;

use cgmath::Vector4;

use crate::{
    config::MeshletBuilderType,
    data_structures::{
        bbox::BoundingBox,
        geometry::{IndexWidth, MeshletRange},
    },
};

/// Local triangle indices are bytes, so a meshlet addresses at most 256 vertices.
pub const MAX_MESHLET_VERTICES: u32 = 256;
pub const MAX_MESHLET_PRIMITIVES: u32 = 255;
/// Alignment of per-meshlet blocks in the packed layout, and of the whole primitive buffer.
pub const PRIM_ALIGNMENT: usize = 16;

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshletDesc {
    pub bbox_min: [f32; 3],
    pub num_vertices: u32,
    pub bbox_max: [f32; 3],
    pub num_prims: u32,
    /// Byte offset of the vertex index list within the primitive buffer.
    pub vertex_offset: u32,
    /// Byte offset of the triangle list within the primitive buffer.
    pub prim_offset: u32,
    pub _pad: [u32; 2],
}

/// Packed meshlets of one geometry. Empty when building was disabled or failed.
#[derive(Debug, Default, PartialEq)]
pub struct MeshletTopology {
    pub num_meshlets: usize,
    pub builder: MeshletBuilderType,
    /// Width of the vertex indices stored by the packed layout.
    pub index_width: IndexWidth,
    pub prim_data: Vec<u8>,
    pub desc_data: Vec<u8>,
}

impl MeshletTopology {
    pub fn is_empty(&self) -> bool {
        self.num_meshlets == 0
    }

    pub fn prim_size(&self) -> usize {
        self.prim_data.len()
    }

    pub fn desc_size(&self) -> usize {
        self.desc_data.len()
    }

    pub fn desc(&self, meshlet: usize) -> MeshletDesc {
        let size = mem::size_of::<MeshletDesc>();
        bytemuck::pod_read_unaligned(&self.desc_data[meshlet * size..(meshlet + 1) * size])
    }

    pub fn descs(&self) -> Vec<MeshletDesc> {
        bytemuck::pod_collect_to_vec(&self.desc_data)
    }

    /// Geometry vertex indices referenced by a meshlet, in local order.
    pub fn vertex_indices(&self, meshlet: usize) -> Vec<u32> {
        let desc = self.desc(meshlet);
        let start = desc.vertex_offset as usize;
        self.index_width
            .read(&self.prim_data[start..], desc.num_vertices as usize)
    }

    /// Triangles of a meshlet resolved to geometry vertex indices.
    pub fn triangles(&self, meshlet: usize) -> Vec<[u32; 3]> {
        let desc = self.desc(meshlet);
        let vertices = self.vertex_indices(meshlet);
        let stride = match self.builder {
            MeshletBuilderType::PackBasic => 3,
            _ => 4,
        };
        let start = desc.prim_offset as usize;
        (0..desc.num_prims as usize)
            .map(|t| {
                let local = &self.prim_data[start + t * stride..start + t * stride + 3];
                [
                    vertices[local[0] as usize],
                    vertices[local[1] as usize],
                    vertices[local[2] as usize],
                ]
            })
            .collect()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Default)]
struct Cluster {
    vertices: Vec<u32>,
    triangles: Vec<[u8; 3]>,
    bbox: BoundingBox,
}

impl Cluster {
    fn local_index(&mut self, vertex: u32, positions: &[[f32; 3]]) -> u8 {
        if let Some(local) = self.vertices.iter().position(|&v| v == vertex) {
            return local as u8;
        }
        let p = positions[vertex as usize];
        self.bbox.merge_point(Vector4::new(p[0], p[1], p[2], 1.0));
        self.vertices.push(vertex);
        (self.vertices.len() - 1) as u8
    }

    fn new_vertices(&self, triangle: &[u32]) -> usize {
        triangle
            .iter()
            .enumerate()
            .filter(|&(k, v)| !self.vertices.contains(v) && !triangle[..k].contains(v))
            .count()
    }

    fn desc(&self, vertex_offset: usize, prim_offset: usize) -> MeshletDesc {
        MeshletDesc {
            bbox_min: self.bbox.min.truncate().into(),
            num_vertices: self.vertices.len() as u32,
            bbox_max: self.bbox.max.truncate().into(),
            num_prims: self.triangles.len() as u32,
            vertex_offset: vertex_offset as u32,
            prim_offset: prim_offset as u32,
            _pad: [0; 2],
        }
    }
}

fn cluster_triangles(indices: &[u32], positions: &[[f32; 3]], max_vertices: usize, max_prims: usize) -> Vec<Cluster> {
    let mut clusters = Vec::new();
    let mut current = Cluster::default();

    for triangle in indices.chunks_exact(3) {
        let fresh = current.new_vertices(triangle);
        if !current.triangles.is_empty()
            && (current.vertices.len() + fresh > max_vertices || current.triangles.len() + 1 > max_prims)
        {
            clusters.push(mem::take(&mut current));
        }
        let local = [
            current.local_index(triangle[0], positions),
            current.local_index(triangle[1], positions),
            current.local_index(triangle[2], positions),
        ];
        current.triangles.push(local);
    }
    if !current.triangles.is_empty() {
        clusters.push(current);
    }
    clusters
}

fn align_to(buffer: &mut Vec<u8>, alignment: usize) {
    let padded = buffer.len().next_multiple_of(alignment);
    buffer.resize(padded, 0);
}

fn pack_basic(clusters: &[Cluster], width: IndexWidth) -> (Vec<u8>, Vec<MeshletDesc>) {
    let mut prims = Vec::new();
    let mut descs = Vec::with_capacity(clusters.len());

    for cluster in clusters {
        let vertex_offset = prims.len();
        width.write(&mut prims, &cluster.vertices);
        let prim_offset = prims.len();
        for triangle in &cluster.triangles {
            prims.extend_from_slice(triangle);
        }
        align_to(&mut prims, PRIM_ALIGNMENT);
        descs.push(cluster.desc(vertex_offset, prim_offset));
    }
    (prims, descs)
}

fn pack_array(clusters: &[Cluster]) -> (Vec<u8>, Vec<MeshletDesc>) {
    let total_vertices: usize = clusters.iter().map(|c| c.vertices.len()).sum();
    let mut prims = Vec::new();
    let mut descs = Vec::with_capacity(clusters.len());

    let mut vertex_offset = 0;
    let mut prim_offset = total_vertices * mem::size_of::<u32>();
    for cluster in clusters {
        descs.push(cluster.desc(vertex_offset, prim_offset));
        vertex_offset += cluster.vertices.len() * mem::size_of::<u32>();
        prim_offset += cluster.triangles.len() * 4;
    }
    for cluster in clusters {
        IndexWidth::U32.write(&mut prims, &cluster.vertices);
    }
    for cluster in clusters {
        for triangle in &cluster.triangles {
            prims.extend_from_slice(&[triangle[0], triangle[1], triangle[2], 0]);
        }
    }
    align_to(&mut prims, PRIM_ALIGNMENT);
    (prims, descs)
}

/// Clusters every part's triangles and packs them.
///
/// `parts` are `(first_index, index_count)` ranges into `indices`. Returns the
/// topology and one meshlet range per part, or `None` when building is disabled
/// or the limits cannot be honoured.
pub fn build_meshlets(
    builder: MeshletBuilderType,
    [max_vertices, max_prims]: [u32; 2],
    positions: &[[f32; 3]],
    indices: &[u32],
    parts: &[(usize, usize)],
    width: IndexWidth,
) -> Option<(MeshletTopology, Vec<MeshletRange>)> {
    if builder == MeshletBuilderType::Disabled {
        return None;
    }
    if !(3..=MAX_MESHLET_VERTICES).contains(&max_vertices) || !(1..=MAX_MESHLET_PRIMITIVES).contains(&max_prims) {
        log::warn!(
            "meshlet limits {} vertices / {} primitives are unsupported, skipping meshlets",
            max_vertices,
            max_prims
        );
        return None;
    }

    let mut clusters = Vec::new();
    let mut ranges = Vec::with_capacity(parts.len());
    for &(first, count) in parts {
        let part = cluster_triangles(
            &indices[first..first + count],
            positions,
            max_vertices as usize,
            max_prims as usize,
        );
        ranges.push(MeshletRange {
            offset: clusters.len() as u32,
            count: part.len() as u32,
        });
        clusters.extend(part);
    }
    if clusters.is_empty() {
        return None;
    }

    let (prim_data, descs, index_width) = match builder {
        MeshletBuilderType::PackBasic => {
            let (prims, descs) = pack_basic(&clusters, width);
            (prims, descs, width)
        }
        MeshletBuilderType::Array => {
            let (prims, descs) = pack_array(&clusters);
            (prims, descs, IndexWidth::U32)
        }
        MeshletBuilderType::Disabled => return None,
    };
    let topology = MeshletTopology {
        num_meshlets: descs.len(),
        builder,
        index_width,
        prim_data,
        desc_data: bytemuck::cast_slice(&descs).to_vec(),
    };
    Some((topology, ranges))
}
