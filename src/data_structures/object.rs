//! Instances: an object draws one geometry with its own matrix and per-part
//! material and matrix overrides.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectPart {
    pub active: bool,
    pub material_index: usize,
    pub matrix_index: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Object {
    /// First entry of this object in the scene's flattened object-part table.
    pub part_offset: usize,
    pub matrix_index: usize,
    pub geometry_index: usize,
    pub face_ccw: bool,
    /// At most as many entries as the geometry has parts; part `i` overrides geometry part `i`.
    pub parts: Vec<ObjectPart>,
}

impl Object {
    pub fn active_parts(&self) -> impl Iterator<Item = (usize, &ObjectPart)> {
        self.parts.iter().enumerate().filter(|(_, part)| part.active)
    }

    /// Copy of this object for clone `clone`, with every matrix index moved to
    /// the clone's block of matrices.
    pub fn cloned_into(&self, clone: usize, num_matrices: usize, part_offset: usize) -> Self {
        let shift = clone * num_matrices;
        Self {
            part_offset,
            matrix_index: self.matrix_index + shift,
            geometry_index: self.geometry_index,
            face_ccw: self.face_ccw,
            parts: self
                .parts
                .iter()
                .map(|part| ObjectPart {
                    matrix_index: part.matrix_index + shift,
                    ..*part
                })
                .collect(),
        }
    }
}
