//! Placement of every geometry inside combined device buffers.
//!
//! The GPU layer uploads one vertex, one attribute, one index, one meshlet
//! descriptor and one meshlet primitive buffer for the whole scene. This
//! module decides where each geometry lands so that the resource layer only
//! copies bytes and reads offsets.

use std::mem;

use crate::{
    data_structures::{geometry::Geometry, meshlet::{MeshletDesc, PRIM_ALIGNMENT}},
    error::{SceneError, try_alloc_bytes},
    scene::CadScene,
};

/// Index ranges start on a 4-byte boundary so 16-bit slices can be bound at any geometry.
pub const INDEX_ALIGNMENT: usize = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BufferRange {
    pub offset: usize,
    pub size: usize,
}

impl BufferRange {
    pub fn end(&self) -> usize {
        self.offset + self.size
    }

    pub fn as_wgpu(&self) -> std::ops::Range<u64> {
        self.offset as u64..self.end() as u64
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GeometryAllocation {
    pub vbo: BufferRange,
    pub abo: BufferRange,
    pub ibo: BufferRange,
    pub mesh_desc: BufferRange,
    pub mesh_prim: BufferRange,
    /// First vertex of this geometry in both the vertex and the attribute buffer.
    pub base_vertex: u32,
    pub index_size: u32,
}

impl GeometryAllocation {
    /// Index of this geometry's first meshlet descriptor in the combined buffer.
    pub fn first_desc(&self) -> u32 {
        (self.mesh_desc.offset / mem::size_of::<MeshletDesc>()) as u32
    }

    /// `[first descriptor, primitive byte offset, vertex index size, base vertex]`,
    /// the per-draw constants of a meshlet draw.
    pub fn mesh_push_constants(&self) -> [u32; 4] {
        [
            self.first_desc(),
            self.mesh_prim.offset as u32,
            self.index_size,
            self.base_vertex,
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneLayout {
    pub geometries: Vec<GeometryAllocation>,
    pub vertex_size: usize,
    pub attribute_size: usize,
    pub vbo_size: usize,
    pub abo_size: usize,
    pub ibo_size: usize,
    pub desc_size: usize,
    pub prim_size: usize,
}

fn place(cursor: &mut usize, size: usize, alignment: usize) -> BufferRange {
    let offset = cursor.next_multiple_of(alignment);
    *cursor = offset + size;
    BufferRange { offset, size }
}

impl SceneLayout {
    pub fn compute(scene: &CadScene) -> Self {
        let vertex_size = scene.vertex_size();
        let attribute_size = scene.vertex_attribute_size();
        let desc_alignment = mem::size_of::<MeshletDesc>();

        let mut layout = SceneLayout {
            vertex_size,
            attribute_size,
            ..Default::default()
        };
        let (mut vbo, mut abo, mut ibo, mut desc, mut prim) = (0, 0, 0, 0, 0);
        for geometry in &scene.geometry {
            let allocation = GeometryAllocation {
                vbo: place(&mut vbo, geometry.vbo_size(), vertex_size),
                abo: place(&mut abo, geometry.abo_size(), attribute_size),
                ibo: place(&mut ibo, geometry.ibo_size(), INDEX_ALIGNMENT),
                mesh_desc: place(&mut desc, geometry.mesh_size(), desc_alignment),
                mesh_prim: place(&mut prim, geometry.mesh_indices_size(), PRIM_ALIGNMENT),
                base_vertex: 0,
                index_size: geometry.meshlet.index_width.size() as u32,
            };
            layout.geometries.push(GeometryAllocation {
                base_vertex: (allocation.vbo.offset / vertex_size) as u32,
                ..allocation
            });
        }
        layout.vbo_size = vbo;
        layout.abo_size = abo;
        layout.ibo_size = ibo.next_multiple_of(INDEX_ALIGNMENT);
        layout.desc_size = desc;
        layout.prim_size = prim;
        layout
    }

    fn pack(
        &self,
        scene: &CadScene,
        what: &'static str,
        total: usize,
        range: impl Fn(&GeometryAllocation) -> BufferRange,
        data: impl Fn(&Geometry) -> &[u8],
    ) -> Result<Vec<u8>, SceneError> {
        let mut buffer = try_alloc_bytes(what, total)?;
        for (allocation, geometry) in self.geometries.iter().zip(&scene.geometry) {
            let range = range(allocation);
            buffer[range.offset..range.end()].copy_from_slice(data(geometry));
        }
        Ok(buffer)
    }

    pub fn pack_vertices(&self, scene: &CadScene) -> Result<Vec<u8>, SceneError> {
        self.pack(scene, "combined vertex buffer", self.vbo_size, |a| a.vbo, |g| g.vbo_data.as_slice())
    }

    pub fn pack_attributes(&self, scene: &CadScene) -> Result<Vec<u8>, SceneError> {
        self.pack(scene, "combined attribute buffer", self.abo_size, |a| a.abo, |g| g.abo_data.as_slice())
    }

    pub fn pack_indices(&self, scene: &CadScene) -> Result<Vec<u8>, SceneError> {
        self.pack(scene, "combined index buffer", self.ibo_size, |a| a.ibo, |g| g.ibo_data.as_slice())
    }

    pub fn pack_meshlet_descs(&self, scene: &CadScene) -> Result<Vec<u8>, SceneError> {
        self.pack(
            scene,
            "combined meshlet descriptor buffer",
            self.desc_size,
            |a| a.mesh_desc,
            |g| g.meshlet.desc_data.as_slice(),
        )
    }

    pub fn pack_meshlet_prims(&self, scene: &CadScene) -> Result<Vec<u8>, SceneError> {
        self.pack(
            scene,
            "combined meshlet primitive buffer",
            self.prim_size,
            |a| a.mesh_prim,
            |g| g.meshlet.prim_data.as_slice(),
        )
    }
}
