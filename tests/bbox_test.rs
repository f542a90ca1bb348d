use cadscene::data_structures::bbox::BoundingBox;
use cgmath::{Matrix4, Vector3, Vector4};

fn unit_box() -> BoundingBox {
    BoundingBox {
        min: Vector4::new(0.0, 0.0, 0.0, 1.0),
        max: Vector4::new(1.0, 1.0, 1.0, 1.0),
    }
}

#[test]
fn new_box_is_empty_until_first_merge() {
    let mut bbox = BoundingBox::new();
    assert!(bbox.is_empty());
    assert_eq!(bbox.diagonal(), Vector3::new(0.0, 0.0, 0.0));

    bbox.merge_point(Vector4::new(1.0, 2.0, 3.0, 1.0));
    assert!(!bbox.is_empty());
    assert_eq!(bbox.min, bbox.max);
}

#[test]
fn merge_is_commutative_and_associative() {
    let a = BoundingBox::from_positions(&[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]);
    let b = BoundingBox::from_positions(&[[-1.0, 0.5, 2.0]]);
    let c = BoundingBox::from_positions(&[[3.0, -2.0, 0.0]]);

    assert_eq!(a.merged(&b), b.merged(&a));
    assert_eq!(a.merged(&b).merged(&c), a.merged(&b.merged(&c)));
    assert_eq!(a.merged(&BoundingBox::new()), a);
}

#[test]
fn transformed_translates_box() {
    let moved = unit_box().transformed(&Matrix4::from_translation(Vector3::new(2.0, 0.0, -1.0)), 3);
    assert_eq!(moved.min, Vector4::new(2.0, 0.0, -1.0, 1.0));
    assert_eq!(moved.max, Vector4::new(3.0, 1.0, 0.0, 1.0));
}

#[test]
fn transformed_encloses_rotated_corners() {
    let rotation = Matrix4::from_angle_z(cgmath::Deg(90.0));
    let rotated = unit_box().transformed(&rotation, 3);
    assert!((rotated.min.x + 1.0).abs() < 1e-5);
    assert!(rotated.max.x.abs() < 1e-5);
    assert!(rotated.min.y.abs() < 1e-5);
    assert!((rotated.max.y - 1.0).abs() < 1e-5);
}

#[test]
fn transformed_dimension_limits_corners() {
    let bbox = unit_box();
    let flat = bbox.transformed(&Matrix4::from_translation(Vector3::new(0.0, 0.0, 0.0)), 2);
    // only the z = min.z corners are used
    assert_eq!(flat.min.z, 0.0);
    assert_eq!(flat.max.z, 0.0);

    let full = bbox.transformed(&Matrix4::from_scale(1.0), 3);
    assert_eq!(full.max.z, 1.0);
}

#[test]
fn transformed_axis_scale_maps_min_and_max() {
    let bbox = BoundingBox {
        min: Vector4::new(-1.0, 2.0, 3.0, 1.0),
        max: Vector4::new(2.0, 4.0, 5.0, 1.0),
    };
    // the negative y scale swaps which corner ends up as the minimum
    let scaled = bbox.transformed(&Matrix4::from_nonuniform_scale(2.0, -1.0, 0.5), 3);
    assert_eq!(scaled.min, Vector4::new(-2.0, -4.0, 1.5, 1.0));
    assert_eq!(scaled.max, Vector4::new(4.0, -2.0, 2.5, 1.0));
}

#[test]
fn transformed_empty_stays_empty() {
    let moved = BoundingBox::new().transformed(&Matrix4::from_translation(Vector3::new(1.0, 1.0, 1.0)), 3);
    assert!(moved.is_empty());
}

#[test]
fn touching_boxes_do_not_overlap() {
    let a = unit_box();
    let b = a.transformed(&Matrix4::from_translation(Vector3::new(1.0, 0.0, 0.0)), 3);
    let c = a.transformed(&Matrix4::from_translation(Vector3::new(0.5, 0.5, 0.5)), 3);

    assert!(!a.overlaps(&b));
    assert!(a.overlaps(&c));
    assert!(a.merged(&b).contains(&a));
    assert!(!a.contains(&b));
}

#[test]
fn diagonal_spans_extents() {
    let bbox = BoundingBox::from_positions(&[[-1.0, 0.0, 2.0], [3.0, 4.0, 2.0]]);
    assert_eq!(bbox.diagonal(), Vector3::new(4.0, 4.0, 0.0));
    assert!(bbox.contains_point(Vector3::new(0.0, 1.0, 2.0)));
}
