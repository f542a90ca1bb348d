use cadscene::{
    CadScene, CloneAxis, SceneError,
    source::{GltfSource, ObjSource, SceneSource, SourceGeometry, SourceScene, open},
};
use cgmath::{Matrix4, SquareMatrix, Vector4};

use crate::common::test_utils::{approx, fixture, quiet, single_instance, triangle};

mod common;

#[test]
fn obj_objects_become_geometries() {
    let source = ObjSource::new(fixture("two_objects.obj")).read().unwrap();

    assert_eq!(source.geometries.len(), 2);
    assert_eq!(source.nodes.len(), 2);
    assert_eq!(source.geometries[0].positions.len(), 3);
    assert_eq!(source.geometries[1].positions.len(), 4);
    assert_eq!(source.geometries[1].indices.len(), 6);
    assert!(source.geometries[1].normals.is_empty());
    // no mtllib, so every part uses the appended default material
    assert_eq!(source.materials.len(), 1);
    assert!(source.nodes.iter().all(|n| n.parts[0].material == 0));
    assert!(source.validate().is_ok());
}

#[test]
fn obj_file_loads_into_scene() {
    let mut scene = CadScene::new();
    scene
        .load_scene(fixture("two_objects.obj"), &quiet(), 1, CloneAxis::Auto)
        .unwrap();

    assert_eq!(scene.num_orig_objects, 2);
    assert_eq!(scene.objects.len(), 4);
    assert_eq!(scene.geometry[1].num_index_solid, 6);
    assert_eq!(scene.bbox.max, Vector4::new(1.0, 1.0, 1.0, 1.0));
}

#[test]
fn gltf_hierarchy_accumulates_world_matrices() {
    let source = GltfSource::new(fixture("triangle.gltf")).read().unwrap();

    assert_eq!(source.geometries.len(), 1);
    assert_eq!(source.geometries[0].indices, vec![0, 1, 2]);
    assert_eq!(source.nodes.len(), 2);
    assert_eq!(source.nodes[0].geometry, None);
    assert_eq!(source.nodes[1].geometry, Some(0));

    let world = source.nodes[1].world_matrix;
    assert!(approx(world.w.x, 2.0));
    assert!(approx(world.w.y, 3.0));
    let local = source.nodes[1].object_matrix;
    assert!(approx(local.w.x, 0.0));
    assert!(approx(local.w.y, 3.0));
}

#[test]
fn gltf_materials_map_to_sides() {
    let source = GltfSource::new(fixture("triangle.gltf")).read().unwrap();
    assert_eq!(source.materials.len(), 1);
    let front = source.materials[0].sides[0];
    assert_eq!(front.diffuse, [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(front.emissive, [0.0, 0.5, 0.0, 1.0]);
    assert_eq!(source.nodes[1].parts[0].material, 0);
}

#[test]
fn gltf_file_loads_into_scene() {
    let mut scene = CadScene::new();
    scene
        .load_scene(fixture("triangle.gltf"), &quiet(), 0, CloneAxis::Auto)
        .unwrap();

    assert_eq!(scene.matrices.len(), 2);
    assert_eq!(scene.objects.len(), 1);
    assert_eq!(scene.objects[0].matrix_index, 1);
    assert_eq!(scene.bbox_instanced.min, Vector4::new(2.0, 3.0, 0.0, 1.0));
    assert_eq!(scene.bbox_instanced.max, Vector4::new(3.0, 4.0, 0.0, 1.0));
}

#[test]
fn open_dispatches_on_extension() {
    assert!(open(&fixture("triangle.gltf")).is_ok());
    assert!(open(&fixture("two_objects.obj")).is_ok());
    assert!(matches!(
        open(&fixture("missing.obj")),
        Err(SceneError::SourceUnreadable { .. })
    ));
}

#[test]
fn in_memory_scene_is_a_source() {
    let source = single_instance(triangle());
    assert_eq!(source.read().unwrap(), source);
}

#[test]
fn appended_parts_are_rebased() {
    let mut geometry = SourceGeometry::default();
    geometry.append_part(&[[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], &[], &[0, 1, 2]);
    geometry.append_part(&[[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], &[], &[2, 1, 0]);
    assert_eq!(geometry.indices, vec![0, 1, 2, 5, 4, 3]);
    assert_eq!(geometry.parts[1].first_index, 3);
    assert_eq!(geometry.parts[1].index_count, 3);
}

#[test]
fn dangling_references_fail_validation() {
    let mut source = SourceScene::default();
    source.add_geometry(triangle());
    source.add_instance(0, Matrix4::identity(), 0);
    // no material 0
    assert!(matches!(source.validate(), Err(SceneError::SourceMalformed(_))));

    let mut source = single_instance(triangle());
    source.nodes[0].parts[0].node = 4;
    assert!(matches!(source.validate(), Err(SceneError::SourceMalformed(_))));

    let mut source = single_instance(triangle());
    let extra = source.nodes[0].parts[0];
    source.nodes[0].parts.push(extra);
    assert!(matches!(source.validate(), Err(SceneError::SourceMalformed(_))));
}
