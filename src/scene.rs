//! The scene container.
//!
//! A [`CadScene`] is an arena: geometries, matrices, materials, objects and the
//! flattened per-part bounding boxes live in plain vectors and refer to each
//! other by index. Indices are validated once at load and trusted afterwards.
//!
//! A scene is either empty or fully loaded. Loading builds a complete new value
//! and swaps it in, so a failed load never leaves partial data behind.

use std::{path::Path, time::Duration};

use cgmath::{Matrix4, Vector3, Zero};

use crate::{
    config::{CloneAxis, LoadConfig},
    data_structures::{
        bbox::BoundingBox,
        geometry::Geometry,
        material::Material,
        matrix::{MatrixNode, instance_color},
        object::{Object, ObjectPart},
        vertex,
    },
    error::SceneError,
    source::{self, SceneSource, SourceScene},
};

/// Spacing between clones, relative to the instanced scene extent.
const CLONE_SPACING: f32 = 1.1;

#[derive(Debug, Default)]
pub struct CadScene {
    pub materials: Vec<Material>,
    /// Object-space box per geometry part, flattened over all geometries.
    pub bboxes: Vec<BoundingBox>,
    pub geometry: Vec<Geometry>,
    pub matrices: Vec<MatrixNode>,
    pub objects: Vec<Object>,

    pub vbo_size: usize,
    pub abo_size: usize,
    pub ibo_size: usize,
    /// Meshlet descriptor bytes over all geometries.
    pub mesh_size: usize,
    /// Meshlet primitive bytes over all geometries.
    pub mesh_indices_size: usize,
    pub num_geometry_parts: usize,
    pub num_object_parts: usize,

    pub cfg: LoadConfig,
    /// Union of all part boxes, object space.
    pub bbox: BoundingBox,
    /// Union of every object's geometry box under its world matrix.
    pub bbox_instanced: BoundingBox,

    pub num_orig_geometries: usize,
    pub num_orig_matrices: usize,
    pub num_orig_objects: usize,
}

/// Applies the load scale to a matrix's translation, matching scaled vertex positions.
fn scale_translation(mut matrix: Matrix4<f32>, scale: f32) -> Matrix4<f32> {
    matrix.w.x *= scale;
    matrix.w.y *= scale;
    matrix.w.z *= scale;
    matrix
}

/// Axis of the largest extent, lowest axis on ties.
fn largest_axis(extent: Vector3<f32>) -> usize {
    let mut axis = 0;
    for a in 1..3 {
        if extent[a] > extent[axis] {
            axis = a;
        }
    }
    axis
}

impl CadScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing is loaded.
    pub fn is_empty(&self) -> bool {
        self.geometry.is_empty()
            && self.matrices.is_empty()
            && self.objects.is_empty()
            && self.materials.is_empty()
            && self.bboxes.is_empty()
    }

    /// Opens `path` with the reader matching its extension and loads it.
    pub fn load_scene(
        &mut self,
        path: impl AsRef<Path>,
        cfg: &LoadConfig,
        clones: usize,
        clone_axis: impl Into<CloneAxis>,
    ) -> Result<(), SceneError> {
        if !self.is_empty() {
            return Err(SceneError::AlreadyLoaded);
        }
        let source = source::open(path.as_ref())?;
        self.load_source(source.as_ref(), cfg, clones, clone_axis)
    }

    /// Loads from any source. On error the scene stays empty.
    pub fn load_source<S: SceneSource + ?Sized>(
        &mut self,
        source: &S,
        cfg: &LoadConfig,
        clones: usize,
        clone_axis: impl Into<CloneAxis>,
    ) -> Result<(), SceneError> {
        if !self.is_empty() {
            return Err(SceneError::AlreadyLoaded);
        }
        let start = instant::Instant::now();
        let description = source.read()?;
        let scene = Self::build(&description, cfg, clones, clone_axis.into())?;
        *self = scene;
        if cfg.verbose {
            self.log_stats(start.elapsed());
        }
        Ok(())
    }

    fn build(source: &SourceScene, cfg: &LoadConfig, clones: usize, clone_axis: CloneAxis) -> Result<Self, SceneError> {
        source.validate()?;

        let mut scene = Self {
            cfg: cfg.clone(),
            bbox: BoundingBox::new(),
            bbox_instanced: BoundingBox::new(),
            materials: source.materials.clone(),
            ..Default::default()
        };

        scene.geometry.reserve(source.geometries.len());
        for (g, description) in source.geometries.iter().enumerate() {
            let (mut geometry, part_bboxes) = Geometry::build(g, description, cfg)?;
            geometry.part_offset = scene.num_geometry_parts;
            geometry.part_bbox_offset = scene.bboxes.len();
            scene.num_geometry_parts += geometry.parts.len();
            scene.bboxes.extend(part_bboxes);

            scene.vbo_size += geometry.vbo_size();
            scene.abo_size += geometry.abo_size();
            scene.ibo_size += geometry.ibo_size();
            scene.mesh_size += geometry.mesh_size();
            scene.mesh_indices_size += geometry.mesh_indices_size();
            scene.bbox.merge(&geometry.bbox);
            scene.geometry.push(geometry);
        }

        scene.matrices.reserve(source.nodes.len() * (clones + 1));
        for (n, node) in source.nodes.iter().enumerate() {
            let bbox = node
                .geometry
                .map(|g| scene.geometry[g].bbox)
                .unwrap_or_default();
            scene.matrices.push(MatrixNode::new(
                scale_translation(node.world_matrix, cfg.scale),
                scale_translation(node.object_matrix, cfg.scale),
                &bbox,
                instance_color(n),
            ));
        }

        for (n, node) in source.nodes.iter().enumerate() {
            let Some(geometry_index) = node.geometry else {
                continue;
            };
            let parts: Vec<ObjectPart> = node
                .parts
                .iter()
                .map(|part| ObjectPart {
                    active: part.active,
                    material_index: part.material,
                    matrix_index: part.node,
                })
                .collect();
            let object = Object {
                part_offset: scene.num_object_parts,
                matrix_index: n,
                geometry_index,
                face_ccw: scene.matrices[n].winding >= 0.0,
                parts,
            };
            scene.num_object_parts += object.parts.len();
            scene.objects.push(object);
        }

        scene.num_orig_geometries = scene.geometry.len();
        scene.num_orig_matrices = scene.matrices.len();
        scene.num_orig_objects = scene.objects.len();
        scene.bbox_instanced = scene.instanced_bbox();

        if clones > 0 {
            scene.replicate(clones, clone_axis);
            scene.bbox_instanced = scene.instanced_bbox();
        }
        Ok(scene)
    }

    fn instanced_bbox(&self) -> BoundingBox {
        self.objects.iter().fold(BoundingBox::new(), |bbox, object| {
            let world = self.matrices[object.matrix_index].world();
            bbox.merged(&self.geometry[object.geometry_index].bbox.transformed(&world, 3))
        })
    }

    /// Appends `clones` copies of every matrix and object, each shifted along
    /// the clone axis past the previous one. Geometry is shared.
    fn replicate(&mut self, clones: usize, clone_axis: CloneAxis) {
        let extent = self.bbox_instanced.diagonal();
        let axis = match clone_axis {
            CloneAxis::X => 0,
            CloneAxis::Y => 1,
            CloneAxis::Z => 2,
            CloneAxis::Auto => largest_axis(extent),
        };
        let mut stride = extent[axis];
        if stride <= 0.0 {
            stride = extent[largest_axis(extent)];
        }
        if stride <= 0.0 {
            stride = 1.0;
        }
        stride *= CLONE_SPACING;
        log::debug!("cloning scene {} times along axis {} every {}", clones, axis, stride);

        let num_matrices = self.num_orig_matrices;
        let num_objects = self.num_orig_objects;
        for c in 1..=clones {
            let mut offset = Vector3::zero();
            offset[axis] = stride * c as f32;
            let translation = Matrix4::from_translation(offset);

            for m in 0..num_matrices {
                let mut node = self.matrices[m];
                node.set_world(translation * node.world());
                node.refresh_inverse_transpose();
                node.color = instance_color(self.matrices.len());
                self.matrices.push(node);
            }
            for o in 0..num_objects {
                let object = self.objects[o].cloned_into(c, num_matrices, self.num_object_parts);
                self.num_object_parts += object.parts.len();
                self.objects.push(object);
            }
        }
    }

    /// Releases every buffer and resets all counters. Safe on an empty scene.
    pub fn unload(&mut self) {
        *self = Self::default();
    }

    pub fn vertex_size(&self) -> usize {
        vertex::vertex_size(self.cfg.fp16)
    }

    pub fn vertex_attribute_size(&self) -> usize {
        vertex::vertex_attribute_size(self.cfg.fp16, self.cfg.extra_attributes)
    }

    /// Bytes of vertex `index` inside a vertex buffer of this scene's format.
    pub fn vertex<'a>(&self, data: &'a [u8], index: usize) -> &'a [u8] {
        let size = self.vertex_size();
        &data[index * size..(index + 1) * size]
    }

    pub fn vertex_mut<'a>(&self, data: &'a mut [u8], index: usize) -> &'a mut [u8] {
        let size = self.vertex_size();
        &mut data[index * size..(index + 1) * size]
    }

    /// Bytes of the attributes of vertex `index` inside an attribute buffer.
    pub fn vertex_attribute<'a>(&self, data: &'a [u8], index: usize) -> &'a [u8] {
        let size = self.vertex_attribute_size();
        &data[index * size..(index + 1) * size]
    }

    pub fn vertex_attribute_mut<'a>(&self, data: &'a mut [u8], index: usize) -> &'a mut [u8] {
        let size = self.vertex_attribute_size();
        &mut data[index * size..(index + 1) * size]
    }

    /// Object-space box of part `part` of geometry `geometry`.
    pub fn part_bbox(&self, geometry: usize, part: usize) -> &BoundingBox {
        &self.bboxes[self.geometry[geometry].part_bbox_offset + part]
    }

    /// Number of meshlets over all geometries.
    pub fn num_meshlets(&self) -> usize {
        self.geometry.iter().map(|g| g.meshlet.num_meshlets).sum()
    }

    fn log_stats(&self, elapsed: Duration) {
        let kb = |bytes: usize| bytes as f64 / 1024.0;
        log::info!(
            "scene loaded in {:.2} ms: {} geometries ({} parts), {} objects ({} parts), {} matrices, {} materials",
            elapsed.as_secs_f64() * 1000.0,
            self.geometry.len(),
            self.num_geometry_parts,
            self.objects.len(),
            self.num_object_parts,
            self.matrices.len(),
            self.materials.len()
        );
        log::info!(
            "vbo {:.1} KB, abo {:.1} KB, ibo {:.1} KB, {} meshlets: desc {:.1} KB, prim {:.1} KB",
            kb(self.vbo_size),
            kb(self.abo_size),
            kb(self.ibo_size),
            self.num_meshlets(),
            kb(self.mesh_size),
            kb(self.mesh_indices_size)
        );
        if self.objects.len() > self.num_orig_objects {
            log::info!(
                "{} clones of {} objects",
                self.objects.len() / self.num_orig_objects.max(1) - 1,
                self.num_orig_objects
            );
        }
    }
}
