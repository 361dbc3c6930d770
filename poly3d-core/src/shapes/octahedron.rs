use nalgebra::{Point3, Vector3};

use super::ShapeKind;
use crate::error::ConstructionError;
use crate::geometry::{Mesh, MeshBuilder, Rgba};

const FACE_COLORS: [Rgba; 8] = [
    [1.0, 0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 1.0],
    [1.0, 1.0, 0.0, 1.0],
    [1.0, 0.0, 1.0, 1.0],
    [1.0, 1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0, 1.0],
    [1.0, 0.0, 1.0, 1.0],
    [1.0, 0.0, 0.0, 1.0],
];

/// Two square pyramids joined at their bases, one pointing up and one down:
/// 8 faces, 24 vertices, 24 indices.
pub fn build_octahedron(
    translation: Vector3<f32>,
    axis: Vector3<f32>,
    now_ms: f64,
) -> Result<Mesh, ConstructionError> {
    let front_left = Point3::new(-0.5, 0.0, 0.5);
    let front_right = Point3::new(0.5, 0.0, 0.5);
    let back_left = Point3::new(-0.5, 0.0, -0.5);
    let back_right = Point3::new(0.5, 0.0, -0.5);
    let rims = [
        [front_left, front_right],
        [back_left, back_right],
        [back_left, front_left],
        [back_right, front_right],
    ];

    let kind = ShapeKind::Octahedron;
    let mut builder = MeshBuilder::with_capacity(kind, 24, 24);
    let apexes = [Point3::new(0.0, 1.0, 0.0), Point3::new(0.0, -1.0, 0.0)];
    let faces = apexes
        .iter()
        .flat_map(|&apex| rims.iter().map(move |&[a, b]| [a, b, apex]));

    for (face, color) in faces.zip(FACE_COLORS) {
        let first = builder.push_face(&face, color)?;
        builder.push_pattern(first, &[[0, 1, 2]])?;
    }

    builder.finish(translation, axis, kind.default_motion(), now_ms)
}
