//! Material records, laid out for direct upload into a uniform buffer.

/// Uniform buffer ranges are bound at this granularity.
pub const UBO_RANGE_ALIGNMENT: usize = 256;

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialSide {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub emissive: [f32; 4],
}

impl MaterialSide {
    /// A plain side from a base color: faint ambient term, dull white specular.
    pub fn from_diffuse(diffuse: [f32; 4]) -> Self {
        Self {
            ambient: [diffuse[0] * 0.1, diffuse[1] * 0.1, diffuse[2] * 0.1, 1.0],
            diffuse,
            specular: [0.5, 0.5, 0.5, 1.0],
            emissive: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Front and back side, padded to one uniform buffer range.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Material {
    pub sides: [MaterialSide; 2],
    pub _pad: [u32; 8 * 4],
}

const _: () = assert!(std::mem::size_of::<Material>() == UBO_RANGE_ALIGNMENT);

impl Material {
    pub fn new(front: MaterialSide, back: MaterialSide) -> Self {
        Self {
            sides: [front, back],
            _pad: [0; 32],
        }
    }

    /// Both sides share one description.
    pub fn two_sided(side: MaterialSide) -> Self {
        Self::new(side, side)
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::two_sided(MaterialSide::from_diffuse([0.8, 0.8, 0.8, 1.0]))
    }
}
