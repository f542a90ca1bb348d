use std::path::{Path, PathBuf};

use crate::{
    data_structures::material::{Material, MaterialSide},
    error::SceneError,
    source::{SceneSource, SourceGeometry, SourceNodePart, SourceScene, identity},
};

/// Wavefront OBJ files, with their MTL materials when present.
///
/// `tobj` emits one model per object/material run. Consecutive models sharing
/// a name become the parts of one geometry, which is placed once with an
/// identity matrix.
#[derive(Clone, Debug)]
pub struct ObjSource {
    path: PathBuf,
}

impl ObjSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

fn to_material(material: &tobj::Material) -> Material {
    let rgba = |c: [f32; 3]| [c[0], c[1], c[2], 1.0];
    let diffuse = material.diffuse.map_or([0.8, 0.8, 0.8, 1.0], rgba);
    let mut side = MaterialSide::from_diffuse(diffuse);
    if let Some(ambient) = material.ambient {
        side.ambient = rgba(ambient);
    }
    if let Some(specular) = material.specular {
        side.specular = rgba(specular);
    }
    Material::two_sided(side)
}

fn to_positions(flat: &[f32]) -> Vec<[f32; 3]> {
    flat.chunks_exact(3).map(|p| [p[0], p[1], p[2]]).collect()
}

impl SceneSource for ObjSource {
    fn read(&self) -> Result<SourceScene, SceneError> {
        let (models, materials) = tobj::load_obj(
            &self.path,
            &tobj::LoadOptions {
                single_index: true,
                triangulate: true,
                ..Default::default()
            },
        )
        .map_err(|e| match e {
            tobj::LoadError::OpenFileFailed | tobj::LoadError::ReadError => SceneError::SourceUnreadable {
                path: self.path.clone(),
                reason: e.to_string(),
            },
            other => SceneError::malformed(format!("{:?}: {}", self.path, other)),
        })?;

        let mut scene = SourceScene::default();
        match materials {
            Ok(materials) => scene.materials = materials.iter().map(to_material).collect(),
            Err(e) => log::warn!("{:?} has no usable materials ({}), using defaults", self.path, e),
        }
        let num_file_materials = scene.materials.len();
        let mut default_material = None;

        let mut groups: Vec<(&str, Vec<&tobj::Model>)> = Vec::new();
        for model in &models {
            match groups.last_mut() {
                Some((name, group)) if *name == model.name => group.push(model),
                _ => groups.push((&model.name, vec![model])),
            }
        }

        for (name, group) in groups {
            let with_normals = group
                .iter()
                .all(|m| m.mesh.normals.len() == m.mesh.positions.len());
            let mut geometry = SourceGeometry::default();
            let mut materials = Vec::with_capacity(group.len());
            for model in &group {
                let positions = to_positions(&model.mesh.positions);
                let normals = if with_normals {
                    to_positions(&model.mesh.normals)
                } else {
                    Vec::new()
                };
                geometry.append_part(&positions, &normals, &model.mesh.indices);
                materials.push(model.mesh.material_id.filter(|&m| m < num_file_materials));
            }
            log::debug!("obj object {:?}: {} parts", name, geometry.parts.len());

            let geometry_index = scene.add_geometry(geometry);
            let node = scene.nodes.len();
            let parts = materials
                .into_iter()
                .map(|material| SourceNodePart {
                    active: true,
                    material: match material {
                        Some(m) => m,
                        None => scene.default_material(&mut default_material),
                    },
                    node,
                })
                .collect();
            scene.add_node(crate::source::SourceNode {
                object_matrix: identity(),
                world_matrix: identity(),
                geometry: Some(geometry_index),
                parts,
            });
        }

        Ok(scene)
    }
}
