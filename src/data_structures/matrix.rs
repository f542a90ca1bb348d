//! Per-node transform records, one uniform buffer range each.

use cgmath::{Matrix, Matrix3, Matrix4, SquareMatrix};

use crate::data_structures::{bbox::BoundingBox, material::UBO_RANGE_ALIGNMENT};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MatrixNode {
    pub world_matrix: [[f32; 4]; 4],
    /// Inverse transpose of `world_matrix`, for transforming normals.
    pub world_matrix_it: [[f32; 4]; 4],
    pub object_matrix: [[f32; 4]; 4],
    pub bbox_min: [f32; 4],
    pub bbox_max: [f32; 4],
    pub _pad0: [f32; 3],
    /// `1.0` for counter-clockwise front faces, `-1.0` when the transform mirrors.
    pub winding: f32,
    pub color: [f32; 4],
}

const _: () = assert!(std::mem::size_of::<MatrixNode>() == UBO_RANGE_ALIGNMENT);

/// Inverse transpose, or the matrix itself when it cannot be inverted.
pub fn inverse_transpose(matrix: &Matrix4<f32>) -> Matrix4<f32> {
    match matrix.invert() {
        Some(inverse) => inverse.transpose(),
        None => {
            log::warn!("singular world matrix, normals will use it unchanged");
            *matrix
        }
    }
}

/// Sign of the determinant of the upper 3x3, as a winding factor.
pub fn winding_of(matrix: &Matrix4<f32>) -> f32 {
    let linear = Matrix3::from_cols(matrix.x.truncate(), matrix.y.truncate(), matrix.z.truncate());
    if linear.determinant() < 0.0 { -1.0 } else { 1.0 }
}

impl MatrixNode {
    /// Builds a node and derives `world_matrix_it` and `winding` once.
    pub fn new(world: Matrix4<f32>, object: Matrix4<f32>, bbox: &BoundingBox, color: [f32; 4]) -> Self {
        let (bbox_min, bbox_max) = if bbox.is_empty() {
            ([0.0; 4], [0.0; 4])
        } else {
            (bbox.min.into(), bbox.max.into())
        };
        Self {
            world_matrix: world.into(),
            world_matrix_it: inverse_transpose(&world).into(),
            object_matrix: object.into(),
            bbox_min,
            bbox_max,
            _pad0: [0.0; 3],
            winding: winding_of(&world),
            color,
        }
    }

    pub fn world(&self) -> Matrix4<f32> {
        self.world_matrix.into()
    }

    pub fn world_it(&self) -> Matrix4<f32> {
        self.world_matrix_it.into()
    }

    /// Replaces the world matrix only. Call [`Self::refresh_inverse_transpose`]
    /// afterwards, the derived fields are not kept in sync automatically.
    pub fn set_world(&mut self, world: Matrix4<f32>) {
        self.world_matrix = world.into();
    }

    /// Re-derives `world_matrix_it` and `winding` from the current world matrix.
    pub fn refresh_inverse_transpose(&mut self) {
        let world = self.world();
        self.world_matrix_it = inverse_transpose(&world).into();
        self.winding = winding_of(&world);
    }
}

/// Deterministic instance color from a small palette, cycling with the index.
pub fn instance_color(index: usize) -> [f32; 4] {
    const PALETTE: [[f32; 4]; 8] = [
        [0.86, 0.37, 0.34, 1.0],
        [0.35, 0.65, 0.85, 1.0],
        [0.47, 0.76, 0.40, 1.0],
        [0.93, 0.75, 0.31, 1.0],
        [0.62, 0.46, 0.80, 1.0],
        [0.37, 0.78, 0.74, 1.0],
        [0.91, 0.55, 0.24, 1.0],
        [0.70, 0.70, 0.70, 1.0],
    ];
    PALETTE[index % PALETTE.len()]
}
