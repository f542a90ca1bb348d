//! Axis-aligned bounding boxes in homogeneous coordinates.
//!
//! The fourth component is carried along so boxes can be pushed through a
//! full 4x4 transform; points merged from vertex data use `w = 1`.

use cgmath::{Matrix4, Vector3, Vector4};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vector4<f32>,
    pub max: Vector4<f32>,
}

fn min4(a: Vector4<f32>, b: Vector4<f32>) -> Vector4<f32> {
    Vector4::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z), a.w.min(b.w))
}

fn max4(a: Vector4<f32>, b: Vector4<f32>) -> Vector4<f32> {
    Vector4::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z), a.w.max(b.w))
}

impl BoundingBox {
    /// An empty box. Any merge replaces both extents.
    pub fn new() -> Self {
        Self {
            min: Vector4::new(f32::INFINITY, f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Vector4::new(
                f32::NEG_INFINITY,
                f32::NEG_INFINITY,
                f32::NEG_INFINITY,
                f32::NEG_INFINITY,
            ),
        }
    }

    /// Tight box around a set of positions, each lifted to `w = 1`.
    pub fn from_positions<'a>(positions: impl IntoIterator<Item = &'a [f32; 3]>) -> Self {
        let mut bbox = Self::new();
        for p in positions {
            bbox.merge_point(Vector4::new(p[0], p[1], p[2], 1.0));
        }
        bbox
    }

    /// True until the first merge.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn merge_point(&mut self, point: Vector4<f32>) {
        self.min = min4(self.min, point);
        self.max = max4(self.max, point);
    }

    pub fn merge(&mut self, other: &BoundingBox) {
        self.min = min4(self.min, other.min);
        self.max = max4(self.max, other.max);
    }

    pub fn merged(mut self, other: &BoundingBox) -> Self {
        self.merge(other);
        self
    }

    /// Box enclosing the first `2^dim` corners of this box after `matrix`.
    ///
    /// Corner `i` takes `max` on x when bit 0 is set, on y for bit 1, on z for
    /// bit 2 and on w for bit 3. `dim = 2` keeps z at `min.z`, `dim = 3` covers
    /// the spatial box at `min.w` and `dim = 4` adds the `max.w` corners.
    pub fn transformed(&self, matrix: &Matrix4<f32>, dim: u32) -> Self {
        if self.is_empty() {
            return Self::new();
        }

        let corners = 1u32 << dim.min(4);
        let mut bbox = Self::new();
        for i in 0..corners {
            let corner = Vector4::new(
                if i & 1 != 0 { self.max.x } else { self.min.x },
                if i & 2 != 0 { self.max.y } else { self.min.y },
                if i & 4 != 0 { self.max.z } else { self.min.z },
                if i & 8 != 0 { self.max.w } else { self.min.w },
            );
            bbox.merge_point(matrix * corner);
        }
        bbox
    }

    pub fn contains_point(&self, point: Vector3<f32>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.is_empty()
            || (self.contains_point(other.min.truncate()) && self.contains_point(other.max.truncate()))
    }

    /// True when the interiors intersect. Boxes that only touch do not overlap.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
            && self.min.z < other.max.z
            && other.min.z < self.max.z
    }

    /// Extent along each axis, zero for an empty box.
    pub fn diagonal(&self) -> Vector3<f32> {
        if self.is_empty() {
            return Vector3::new(0.0, 0.0, 0.0);
        }
        (self.max - self.min).truncate()
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}
