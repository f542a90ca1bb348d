//! Device-side scene resources.
//!
//! [`Resources`] is the seam between the scene and a graphics backend. The
//! backend only uploads what [`crate::layout::SceneLayout`] and the render list
//! already decided; it never re-derives offsets or sizes itself.
//!
//! Drawing here always goes through index ranges. The meshlet descriptor and
//! primitive buffers are uploaded for mesh-shading pipelines outside this
//! crate, which bind them via [`WgpuResources::meshlet_buffers`] and take their
//! per-draw constants from [`crate::layout::GeometryAllocation::mesh_push_constants`].

pub mod wgpu_resources;

use wgpu::util::DrawIndexedIndirectArgs;

use crate::{
    layout::SceneLayout,
    render::{CullStats, RenderList},
    scene::CadScene,
};

pub use wgpu_resources::WgpuResources;

pub trait Resources {
    /// Uploads every buffer of `scene`, replacing a previously uploaded scene.
    fn init_scene(&mut self, scene: &CadScene) -> anyhow::Result<()>;
    /// Drops all scene buffers. Safe without a prior `init_scene`.
    fn deinit_scene(&mut self);
    /// Blocks until the device is idle.
    fn synchronize(&self) -> anyhow::Result<()>;
    /// Statistics of the render list uploaded last.
    fn stats(&self) -> CullStats;
    fn draw_bounding_boxes(&self, list: &RenderList, pass: &mut wgpu::RenderPass<'_>);
}

/// One indexed indirect draw per render list item, in list order.
///
/// `first_index` is relative to the item's geometry index range, which the
/// backend binds as the index buffer slice. `base_vertex` addresses the
/// combined vertex and attribute buffers.
pub fn indirect_args(list: &RenderList, layout: &SceneLayout) -> Vec<DrawIndexedIndirectArgs> {
    list.items
        .iter()
        .map(|item| DrawIndexedIndirectArgs {
            index_count: item.index_range.count,
            instance_count: 1,
            first_index: item.first_index(),
            base_vertex: layout.geometries[item.geometry_index].base_vertex as i32,
            first_instance: 0,
        })
        .collect()
}
