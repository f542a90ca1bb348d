use std::path::{Path, PathBuf};

use cgmath::Matrix4;

use crate::{
    data_structures::material::{Material, MaterialSide},
    error::SceneError,
    source::{SceneSource, SourceGeometry, SourceNode, SourceNodePart, SourceScene, identity},
};

/// glTF 2.0 files (`.gltf` with external buffers or binary `.glb`).
///
/// Each glTF mesh becomes one geometry with a part per triangle primitive.
/// Every node of the default scene becomes a node with its accumulated world
/// matrix; nodes that reference a mesh also become objects.
#[derive(Clone, Debug)]
pub struct GltfSource {
    path: PathBuf,
}

impl GltfSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn map_error(&self, error: gltf::Error) -> SceneError {
        match error {
            gltf::Error::Io(e) => SceneError::SourceUnreadable {
                path: self.path.clone(),
                reason: e.to_string(),
            },
            other => SceneError::malformed(format!("{:?}: {}", self.path, other)),
        }
    }
}

fn to_material(material: gltf::Material) -> Material {
    let base = material.pbr_metallic_roughness().base_color_factor();
    let [r, g, b] = material.emissive_factor();
    let mut side = MaterialSide::from_diffuse(base);
    side.emissive = [r, g, b, 1.0];
    Material::two_sided(side)
}

struct NodeVisitor<'a> {
    /// Material index per part, per mesh. `None` uses the default material.
    part_materials: &'a [Vec<Option<usize>>],
    default_material: Option<usize>,
    scene: SourceScene,
}

impl NodeVisitor<'_> {
    fn visit(&mut self, node: gltf::Node, parent: Matrix4<f32>) {
        let local = Matrix4::from(node.transform().matrix());
        let world = parent * local;

        let index = self.scene.nodes.len();
        let geometry = node.mesh().map(|mesh| mesh.index());
        let materials = geometry
            .and_then(|g| self.part_materials.get(g))
            .cloned()
            .unwrap_or_default();
        let parts = materials
            .into_iter()
            .map(|material| SourceNodePart {
                active: true,
                material: match material {
                    Some(m) => m,
                    None => self.scene.default_material(&mut self.default_material),
                },
                node: index,
            })
            .collect();
        self.scene.add_node(SourceNode {
            object_matrix: local,
            world_matrix: world,
            geometry,
            parts,
        });

        for child in node.children() {
            self.visit(child, world);
        }
    }
}

impl SceneSource for GltfSource {
    fn read(&self) -> Result<SourceScene, SceneError> {
        let (document, buffers, _images) = gltf::import(&self.path).map_err(|e| self.map_error(e))?;

        let mut scene = SourceScene {
            materials: document.materials().map(to_material).collect(),
            ..Default::default()
        };

        let mut part_materials = Vec::with_capacity(document.meshes().len());
        for mesh in document.meshes() {
            let mut geometry = SourceGeometry::default();
            let mut materials = Vec::new();
            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    log::warn!(
                        "skipping {:?} primitive of mesh {:?}",
                        primitive.mode(),
                        mesh.name().unwrap_or("unnamed")
                    );
                    continue;
                }
                let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
                let positions: Vec<[f32; 3]> = reader
                    .read_positions()
                    .ok_or_else(|| {
                        SceneError::malformed(format!(
                            "mesh {} primitive {} has no positions",
                            mesh.index(),
                            primitive.index()
                        ))
                    })?
                    .collect();
                let normals: Vec<[f32; 3]> = reader.read_normals().map(|n| n.collect()).unwrap_or_default();
                let indices: Vec<u32> = match reader.read_indices() {
                    Some(indices) => indices.into_u32().collect(),
                    None => (0..positions.len() as u32).collect(),
                };
                geometry.append_part(&positions, &normals, &indices);
                materials.push(primitive.material().index());
            }
            // normals are all or nothing per geometry
            if geometry.normals.len() != geometry.positions.len() {
                geometry.normals.clear();
            }
            scene.add_geometry(geometry);
            part_materials.push(materials);
        }

        let mut visitor = NodeVisitor {
            part_materials: &part_materials,
            default_material: None,
            scene,
        };
        match document.default_scene().or_else(|| document.scenes().next()) {
            Some(root) => {
                for node in root.nodes() {
                    visitor.visit(node, identity());
                }
            }
            None => log::warn!("{:?} contains no scene, nothing is placed", self.path),
        }
        Ok(visitor.scene)
    }
}
