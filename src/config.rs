//! Load-time configuration.

/// Selects how meshlets are packed into a geometry's primitive buffer.
///
/// Only one packing is active per load, so this is a closed set dispatched
/// with a `match` rather than a trait object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MeshletBuilderType {
    /// One block per meshlet: vertex indices in the geometry's index width,
    /// then tightly packed `u8` triangles, each block aligned to 16 bytes.
    #[default]
    PackBasic,
    /// Two regions: every meshlet's vertex indices as `u32`, followed by every
    /// meshlet's triangles as 4-byte `[a, b, c, 0]` records.
    Array,
    /// Skip meshlet building; draws use index ranges only.
    Disabled,
}

/// Axis along which cloned instances are offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CloneAxis {
    X,
    Y,
    Z,
    /// Largest extent of the instanced bounding box, lowest axis on ties.
    #[default]
    Auto,
}

impl From<u32> for CloneAxis {
    fn from(axis: u32) -> Self {
        match axis {
            0 => CloneAxis::X,
            1 => CloneAxis::Y,
            2 => CloneAxis::Z,
            _ => CloneAxis::Auto,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoadConfig {
    /// Uniform scale applied to all vertex positions.
    pub scale: f32,
    /// Log per-load statistics at info level.
    pub verbose: bool,
    /// Store positions and attributes as half floats.
    pub fp16: bool,
    /// Use 16-bit indices for geometries with at most 65535 vertices.
    pub allow_shorts: bool,
    /// Fill extra attribute slots with a normal-derived color instead of the normal.
    pub colorize_extra: bool,
    /// Number of additional 4-component attributes after the normal.
    pub extra_attributes: u32,

    // read positionally through `mesh_limits`, keep adjacent and in this order
    pub mesh_vertex_count: u32,
    pub mesh_primitive_count: u32,

    pub mesh_builder: MeshletBuilderType,
}

impl LoadConfig {
    /// Meshlet limits as `[max vertices, max primitives]`.
    pub fn mesh_limits(&self) -> [u32; 2] {
        [self.mesh_vertex_count, self.mesh_primitive_count]
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            verbose: true,
            fp16: false,
            allow_shorts: true,
            colorize_extra: false,
            extra_attributes: 0,
            mesh_vertex_count: 64,
            mesh_primitive_count: 126,
            mesh_builder: MeshletBuilderType::PackBasic,
        }
    }
}
