/// Poly3D Core Library - Procedural polyhedron meshes and their animation
///
/// This library builds flat-colored polyhedron meshes, advances their
/// transforms once per frame, and hands them to a rendering driver through
/// the [`RenderContext`] trait.

pub mod clock;
pub mod error;
pub mod geometry;
pub mod projection;
pub mod scene;
pub mod shapes;
pub mod transform;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConstructionError, DegenerateRotationError};
pub use geometry::{FaceColor, Mesh, MeshBuilder, Rgba, Triangle};
pub use projection::Camera;
pub use scene::{DrawCall, FrameStats, MeshId, RenderContext, Scene};
pub use shapes::{
    build_dodecahedron, build_octahedron, build_pentagonal_pyramid, build_triangular_bipyramid,
    ShapeKind,
};
pub use transform::{update, AnimationConfig, Bounce, Motion};
