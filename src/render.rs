//! Render list composition.
//!
//! A [`RenderList`] flattens the scene's objects into one [`DrawItem`] per
//! active object part. Each item carries everything a backend needs to issue
//! the draw: the index range for classic indexed drawing and the meshlet range
//! for meshlet drawing, plus the matrix and material to bind.
//!
//! Items are grouped by winding and then by geometry so consecutive draws can
//! share pipeline and buffer bindings.

use crate::{
    data_structures::geometry::{DrawRange, IndexWidth, MeshletRange},
    scene::CadScene,
};

/// Per-list draw statistics, laid out for readback from a device buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CullStats {
    pub draws: u32,
    pub tris: u32,
    pub meshlets: u32,
    pub tasks: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderListConfig {
    /// Draw parts through their meshlet ranges when the geometry has meshlets.
    pub use_meshlets: bool,
    /// Dispatch meshlet draws through task groups.
    pub use_task: bool,
    /// Meshlets handled by one task group.
    pub task_num_meshlets: u32,
}

impl Default for RenderListConfig {
    fn default() -> Self {
        Self {
            use_meshlets: true,
            use_task: true,
            task_num_meshlets: 32,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawItem {
    pub object_index: usize,
    pub geometry_index: usize,
    pub part_index: usize,
    pub matrix_index: usize,
    pub material_index: usize,
    pub index_range: DrawRange,
    pub index_width: IndexWidth,
    pub meshlet: MeshletRange,
    /// Hints for mesh-shading consumers. The built-in solid pass ignores them.
    pub use_meshlets: bool,
    pub task: bool,
    pub face_ccw: bool,
}

impl DrawItem {
    /// Task groups needed when each covers `per` meshlets.
    pub fn task_count(&self, per: u32) -> u32 {
        self.meshlet.count.div_ceil(per.max(1))
    }

    pub fn first_index(&self) -> u32 {
        self.index_range.first_index(self.index_width)
    }

    pub fn triangles(&self) -> u32 {
        self.index_range.count / 3
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderList {
    pub items: Vec<DrawItem>,
    pub cfg: RenderListConfig,
}

impl RenderList {
    pub fn build(scene: &CadScene, cfg: &RenderListConfig) -> Self {
        let mut items = Vec::with_capacity(scene.num_object_parts);
        for (o, object) in scene.objects.iter().enumerate() {
            let geometry = &scene.geometry[object.geometry_index];
            for (p, part) in object.active_parts() {
                let geometry_part = &geometry.parts[p];
                if geometry_part.index_solid.count == 0 {
                    continue;
                }
                let use_meshlets = cfg.use_meshlets && geometry.has_meshlets() && geometry_part.mesh_solid.count > 0;
                items.push(DrawItem {
                    object_index: o,
                    geometry_index: object.geometry_index,
                    part_index: p,
                    matrix_index: part.matrix_index,
                    material_index: part.material_index,
                    index_range: geometry_part.index_solid,
                    index_width: geometry.index_width(),
                    meshlet: geometry_part.mesh_solid,
                    use_meshlets,
                    task: use_meshlets && cfg.use_task,
                    face_ccw: object.face_ccw,
                });
            }
        }
        // stable, so object order is kept inside a group
        items.sort_by_key(|item| (!item.face_ccw, item.geometry_index));
        log::debug!("render list with {} draws", items.len());
        Self {
            items,
            cfg: cfg.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Counts what drawing this list submits, before any culling.
    pub fn stats(&self) -> CullStats {
        self.items.iter().fold(CullStats::default(), |mut stats, item| {
            stats.draws += 1;
            stats.tris += item.triangles();
            if item.use_meshlets {
                stats.meshlets += item.meshlet.count;
            }
            if item.task {
                stats.tasks += item.task_count(self.cfg.task_num_meshlets);
            }
            stats
        })
    }
}
