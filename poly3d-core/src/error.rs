/// Error types for mesh construction and per-frame updates
use thiserror::Error;

/// Malformed shape parameters, reported when a mesh is built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstructionError {
    #[error("translation {0:?} has non-finite components")]
    NonFiniteTranslation([f32; 3]),

    #[error("rotation axis {0:?} is zero-length or non-finite")]
    DegenerateAxis([f32; 3]),

    #[error("index {index} out of range for a mesh with {vertex_count} vertices")]
    IndexOutOfRange { index: u16, vertex_count: usize },

    #[error("index buffer length {0} is not a multiple of 3")]
    PartialTriangle(usize),

    #[error("color buffer covers {colored} vertices but the mesh has {vertex_count}")]
    ColorCountMismatch { colored: usize, vertex_count: usize },

    #[error("{0} vertices cannot be addressed by a 16-bit index buffer")]
    TooManyVertices(usize),

    #[error("animation duration must be positive and finite, got {0} ms")]
    InvalidDuration(f64),

    #[error("bounce needs a finite step and at least one step per direction, got {step} x {steps}")]
    InvalidBounce { step: f32, steps: i32 },

    #[error("approach step must be finite, got {0}")]
    InvalidStep(f32),
}

/// A rotation was requested around a zero-length axis.
///
/// The rotation step leaves the matrix untouched when this is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("cannot rotate around degenerate axis {axis:?}")]
pub struct DegenerateRotationError {
    pub axis: [f32; 3],
}
