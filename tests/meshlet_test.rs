use cadscene::{
    LoadConfig, MeshletBuilderType,
    data_structures::{
        geometry::{Geometry, IndexWidth},
        meshlet::{MeshletDesc, PRIM_ALIGNMENT, build_meshlets},
    },
    source::SourceGeometry,
};

use crate::common::test_utils::{grid, grid_parts, quiet, triangle};

mod common;

fn config(builder: MeshletBuilderType, vertices: u32, prims: u32) -> LoadConfig {
    LoadConfig {
        mesh_builder: builder,
        mesh_vertex_count: vertices,
        mesh_primitive_count: prims,
        ..quiet()
    }
}

fn part_triangles(source: &SourceGeometry, part: usize) -> Vec<[u32; 3]> {
    let part = source.parts[part];
    source.indices[part.first_index..part.first_index + part.index_count]
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]])
        .collect()
}

fn assert_decodes_to_parts(builder: MeshletBuilderType) {
    let source = grid_parts(12, 3);
    let cfg = config(builder, 32, 40);
    let (geometry, _) = Geometry::build(0, &source, &cfg).unwrap();
    assert!(geometry.has_meshlets());

    for (p, part) in geometry.parts.iter().enumerate() {
        let range = part.mesh_solid;
        assert!(range.count > 0);
        let decoded: Vec<[u32; 3]> = (range.offset..range.offset + range.count)
            .flat_map(|m| geometry.meshlet.triangles(m as usize))
            .collect();
        assert_eq!(decoded, part_triangles(&source, p));
    }
}

#[test]
fn pack_basic_decodes_to_part_triangles() {
    assert_decodes_to_parts(MeshletBuilderType::PackBasic);
}

#[test]
fn array_decodes_to_part_triangles() {
    assert_decodes_to_parts(MeshletBuilderType::Array);
}

#[test]
fn meshlets_respect_limits() {
    for builder in [MeshletBuilderType::PackBasic, MeshletBuilderType::Array] {
        let (geometry, _) = Geometry::build(0, &grid(16), &config(builder, 16, 10)).unwrap();
        for desc in geometry.meshlet.descs() {
            assert!(desc.num_vertices <= 16);
            assert!(desc.num_prims <= 10);
            assert!(desc.num_prims > 0);
        }
    }
}

#[test]
fn part_ranges_are_contiguous() {
    let (geometry, _) = Geometry::build(0, &grid_parts(10, 4), &quiet()).unwrap();
    let mut next = 0;
    for part in &geometry.parts {
        assert_eq!(part.mesh_solid.offset, next);
        next += part.mesh_solid.count;
    }
    assert_eq!(next as usize, geometry.meshlet.num_meshlets);
}

#[test]
fn triangle_packs_into_one_meshlet() {
    let (geometry, _) = Geometry::build(0, &triangle(), &quiet()).unwrap();
    let meshlet = &geometry.meshlet;
    assert_eq!(meshlet.num_meshlets, 1);
    assert_eq!(geometry.mesh_size(), std::mem::size_of::<MeshletDesc>());
    assert_eq!(std::mem::size_of::<MeshletDesc>(), 48);

    let desc = meshlet.desc(0);
    assert_eq!(desc.num_vertices, 3);
    assert_eq!(desc.num_prims, 1);
    assert_eq!(desc.vertex_offset, 0);
    // three u16 vertex indices precede the triangle
    assert_eq!(desc.prim_offset, 6);
    assert_eq!(desc.bbox_min, [0.0, 0.0, 0.0]);
    assert_eq!(desc.bbox_max, [1.0, 1.0, 0.0]);
    assert_eq!(meshlet.vertex_indices(0), vec![0, 1, 2]);
    assert_eq!(geometry.mesh_indices_size(), PRIM_ALIGNMENT);
}

#[test]
fn pack_basic_blocks_are_aligned() {
    let (geometry, _) = Geometry::build(0, &grid(10), &config(MeshletBuilderType::PackBasic, 20, 20)).unwrap();
    assert!(geometry.meshlet.num_meshlets > 1);
    for desc in geometry.meshlet.descs() {
        assert_eq!(desc.vertex_offset as usize % PRIM_ALIGNMENT, 0);
    }
    assert_eq!(geometry.mesh_indices_size() % PRIM_ALIGNMENT, 0);
}

#[test]
fn array_layout_keeps_vertex_indices_first() {
    let (geometry, _) = Geometry::build(0, &grid(6), &config(MeshletBuilderType::Array, 16, 16)).unwrap();
    let descs = geometry.meshlet.descs();
    let total_vertices: u32 = descs.iter().map(|d| d.num_vertices).sum();
    assert_eq!(geometry.meshlet.index_width, IndexWidth::U32);
    assert_eq!(descs[0].prim_offset, total_vertices * 4);
    for pair in descs.windows(2) {
        assert_eq!(pair[1].vertex_offset, pair[0].vertex_offset + pair[0].num_vertices * 4);
        assert_eq!(pair[1].prim_offset, pair[0].prim_offset + pair[0].num_prims * 4);
    }
}

#[test]
fn disabled_builder_produces_no_meshlets() {
    let (geometry, _) = Geometry::build(0, &grid(4), &config(MeshletBuilderType::Disabled, 64, 126)).unwrap();
    assert!(!geometry.has_meshlets());
    assert_eq!(geometry.mesh_size(), 0);
    assert_eq!(geometry.mesh_indices_size(), 0);
    assert!(geometry.parts.iter().all(|p| p.mesh_solid.count == 0));
}

#[test]
fn unsupported_limits_fall_back_to_index_ranges() {
    let source = grid(2);
    let parts = [(0, source.indices.len())];
    for limits in [[2, 126], [257, 126], [64, 0], [64, 256]] {
        assert!(
            build_meshlets(
                MeshletBuilderType::PackBasic,
                limits,
                &source.positions,
                &source.indices,
                &parts,
                IndexWidth::U16,
            )
            .is_none()
        );
    }

    let (geometry, _) = Geometry::build(0, &source, &config(MeshletBuilderType::PackBasic, 2, 126)).unwrap();
    assert!(!geometry.has_meshlets());
    assert_eq!(geometry.num_index_solid, source.indices.len());
}
