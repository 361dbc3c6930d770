//! Polyhedron mesh factory
//!
//! Every builder takes a world-space translation, a rotation axis and the
//! current time in milliseconds, and returns a flat-colored [`Mesh`] whose
//! vertices are never shared between faces.

use std::fmt;
use std::str::FromStr;

use nalgebra::Vector3;

use crate::error::ConstructionError;
use crate::geometry::Mesh;
use crate::transform::{Bounce, Motion};

mod dodecahedron;
mod octahedron;
mod pentagonal_pyramid;
mod pyramid;

pub use dodecahedron::build_dodecahedron;
pub use octahedron::build_octahedron;
pub use pentagonal_pyramid::build_pentagonal_pyramid;
pub use pyramid::build_triangular_bipyramid;

type BuildFn = fn(Vector3<f32>, Vector3<f32>, f64) -> Result<Mesh, ConstructionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    TriangularBipyramid,
    Octahedron,
    PentagonalPyramid,
    Dodecahedron,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::TriangularBipyramid,
        ShapeKind::Octahedron,
        ShapeKind::PentagonalPyramid,
        ShapeKind::Dodecahedron,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::TriangularBipyramid => "pyramid",
            ShapeKind::Octahedron => "octahedron",
            ShapeKind::PentagonalPyramid => "pentagonal-pyramid",
            ShapeKind::Dodecahedron => "dodecahedron",
        }
    }

    fn builder(self) -> BuildFn {
        match self {
            ShapeKind::TriangularBipyramid => build_triangular_bipyramid,
            ShapeKind::Octahedron => build_octahedron,
            ShapeKind::PentagonalPyramid => build_pentagonal_pyramid,
            ShapeKind::Dodecahedron => build_dodecahedron,
        }
    }

    /// Build a mesh of this kind
    pub fn build(
        self,
        translation: Vector3<f32>,
        axis: Vector3<f32>,
        now_ms: f64,
    ) -> Result<Mesh, ConstructionError> {
        (self.builder())(translation, axis, now_ms)
    }

    /// The octahedron bounces while it spins; every other shape only spins.
    pub fn default_motion(self) -> Motion {
        match self {
            ShapeKind::Octahedron => Motion::SpinAndBounce(Bounce::new()),
            _ => Motion::Spin,
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShapeKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown shape '{}'", s))
    }
}
