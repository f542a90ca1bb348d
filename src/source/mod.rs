/**
 * Scene sources: everything that can hand the scene loader a flat description
 * of materials, meshes and placed nodes.
 *
 * The loader only relies on [`SourceScene`]; file formats are adapters that
 * produce one. glTF and Wavefront OBJ are supported, and a `SourceScene` built
 * in memory is itself a source.
 */
pub mod gltf_source;
pub mod obj_source;

use std::path::Path;

use cgmath::{Matrix4, SquareMatrix};

use crate::{data_structures::material::Material, error::SceneError};

pub use gltf_source::GltfSource;
pub use obj_source::ObjSource;

/// A contiguous run of triangles in a source mesh's index list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourcePart {
    pub first_index: usize,
    pub index_count: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceGeometry {
    pub positions: Vec<[f32; 3]>,
    /// Empty when the source has no normals; they are derived at load time.
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub parts: Vec<SourcePart>,
}

impl SourceGeometry {
    /// A mesh drawn as one part covering all indices.
    pub fn single_part(positions: Vec<[f32; 3]>, normals: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        let parts = vec![SourcePart {
            first_index: 0,
            index_count: indices.len(),
        }];
        Self {
            positions,
            normals,
            indices,
            parts,
        }
    }

    /// Appends another mesh as a new part, rebasing its indices.
    pub fn append_part(&mut self, positions: &[[f32; 3]], normals: &[[f32; 3]], indices: &[u32]) {
        let base = self.positions.len() as u32;
        self.parts.push(SourcePart {
            first_index: self.indices.len(),
            index_count: indices.len(),
        });
        self.positions.extend_from_slice(positions);
        self.normals.extend_from_slice(normals);
        self.indices.extend(indices.iter().map(|i| i + base));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceNodePart {
    pub active: bool,
    pub material: usize,
    /// Node whose matrix this part is drawn with.
    pub node: usize,
}

/// A placed node. Every node becomes a matrix, nodes with geometry also an object.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceNode {
    pub object_matrix: Matrix4<f32>,
    pub world_matrix: Matrix4<f32>,
    pub geometry: Option<usize>,
    pub parts: Vec<SourceNodePart>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceScene {
    pub materials: Vec<Material>,
    pub geometries: Vec<SourceGeometry>,
    pub nodes: Vec<SourceNode>,
}

impl SourceScene {
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn add_geometry(&mut self, geometry: SourceGeometry) -> usize {
        self.geometries.push(geometry);
        self.geometries.len() - 1
    }

    pub fn add_node(&mut self, node: SourceNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Places `geometry` at `world` with every part active and using `material`.
    pub fn add_instance(&mut self, geometry: usize, world: Matrix4<f32>, material: usize) -> usize {
        let node = self.nodes.len();
        let num_parts = self.geometries.get(geometry).map_or(0, |g| g.parts.len());
        self.add_node(SourceNode {
            object_matrix: world,
            world_matrix: world,
            geometry: Some(geometry),
            parts: (0..num_parts)
                .map(|_| SourceNodePart {
                    active: true,
                    material,
                    node,
                })
                .collect(),
        })
    }

    /// Index of a plain material, adding it on first use.
    pub(crate) fn default_material(&mut self, slot: &mut Option<usize>) -> usize {
        *slot.get_or_insert_with(|| {
            self.materials.push(Material::default());
            self.materials.len() - 1
        })
    }

    /// Checks every cross reference between nodes, geometries and materials.
    pub fn validate(&self) -> Result<(), SceneError> {
        for (n, node) in self.nodes.iter().enumerate() {
            let num_parts = match node.geometry {
                Some(g) => self
                    .geometries
                    .get(g)
                    .map(|geometry| geometry.parts.len())
                    .ok_or_else(|| {
                        SceneError::malformed(format!(
                            "node {} references geometry {} of {}",
                            n,
                            g,
                            self.geometries.len()
                        ))
                    })?,
                None => 0,
            };
            if node.parts.len() > num_parts {
                return Err(SceneError::malformed(format!(
                    "node {} has {} parts but its geometry only {}",
                    n,
                    node.parts.len(),
                    num_parts
                )));
            }
            for part in &node.parts {
                if part.material >= self.materials.len() {
                    return Err(SceneError::malformed(format!(
                        "node {} references material {} of {}",
                        n,
                        part.material,
                        self.materials.len()
                    )));
                }
                if part.node >= self.nodes.len() {
                    return Err(SceneError::malformed(format!(
                        "node {} part references node {} of {}",
                        n,
                        part.node,
                        self.nodes.len()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Anything that can produce a [`SourceScene`].
pub trait SceneSource {
    fn read(&self) -> Result<SourceScene, SceneError>;
}

impl SceneSource for SourceScene {
    fn read(&self) -> Result<SourceScene, SceneError> {
        Ok(self.clone())
    }
}

pub(crate) fn identity() -> Matrix4<f32> {
    Matrix4::identity()
}

/// Picks a reader from the file extension.
pub fn open(path: &Path) -> Result<Box<dyn SceneSource>, SceneError> {
    if !path.is_file() {
        return Err(SceneError::SourceUnreadable {
            path: path.to_path_buf(),
            reason: "no such file".into(),
        });
    }
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("obj") => Ok(Box::new(ObjSource::new(path))),
        Some("gltf") | Some("glb") => Ok(Box::new(GltfSource::new(path))),
        other => Err(SceneError::SourceUnreadable {
            path: path.to_path_buf(),
            reason: format!("unsupported scene format {:?}", other.unwrap_or("")),
        }),
    }
}
