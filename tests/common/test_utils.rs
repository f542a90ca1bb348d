#![allow(dead_code)]

use cadscene::{
    LoadConfig,
    data_structures::material::Material,
    source::{SourceGeometry, SourcePart, SourceScene},
};
use cgmath::{Matrix4, SquareMatrix};

/// Loads without info logging so test output stays readable.
pub fn quiet() -> LoadConfig {
    LoadConfig {
        verbose: false,
        ..Default::default()
    }
}

pub fn triangle() -> SourceGeometry {
    SourceGeometry::single_part(
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        Vec::new(),
        vec![0, 1, 2],
    )
}

/// No vertices and a single part with no indices, as a faceless OBJ object reads.
pub fn empty_geometry() -> SourceGeometry {
    SourceGeometry {
        parts: vec![SourcePart {
            first_index: 0,
            index_count: 0,
        }],
        ..Default::default()
    }
}

/// `n` by `n` quads in the xy plane, two triangles each, one part.
pub fn grid(n: u32) -> SourceGeometry {
    let mut positions = Vec::with_capacity(((n + 1) * (n + 1)) as usize);
    for y in 0..=n {
        for x in 0..=n {
            positions.push([x as f32, y as f32, 0.0]);
        }
    }
    let mut indices = Vec::with_capacity((n * n * 6) as usize);
    for y in 0..n {
        for x in 0..n {
            let i = y * (n + 1) + x;
            indices.extend_from_slice(&[i, i + 1, i + n + 2, i, i + n + 2, i + n + 1]);
        }
    }
    SourceGeometry::single_part(positions, Vec::new(), indices)
}

/// A grid whose triangles are split into `parts` runs of roughly equal size.
pub fn grid_parts(n: u32, parts: usize) -> SourceGeometry {
    let mut geometry = grid(n);
    let triangles = geometry.indices.len() / 3;
    let per_part = triangles.div_ceil(parts);
    geometry.parts = (0..triangles)
        .step_by(per_part)
        .map(|first| SourcePart {
            first_index: first * 3,
            index_count: (per_part.min(triangles - first)) * 3,
        })
        .collect();
    geometry
}

/// One geometry placed once at the origin with a default material.
pub fn single_instance(geometry: SourceGeometry) -> SourceScene {
    let mut scene = SourceScene::default();
    let material = scene.add_material(Material::default());
    let g = scene.add_geometry(geometry);
    scene.add_instance(g, Matrix4::identity(), material);
    scene
}

pub fn fixture(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}
