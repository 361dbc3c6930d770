use nalgebra::{Point3, Vector3};

use super::ShapeKind;
use crate::error::ConstructionError;
use crate::geometry::{Mesh, MeshBuilder, Rgba};

const SIDE_COLORS: [Rgba; 4] = [
    [1.0, 0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 1.0],
    [1.0, 1.0, 0.0, 1.0],
    [1.0, 0.0, 1.0, 1.0],
];
const BASE_COLOR: Rgba = [0.0, 1.0, 1.0, 1.0];

/// Four triangular sides meeting at an apex over a square base split into
/// two triangles: 16 vertices, 18 indices.
pub fn build_triangular_bipyramid(
    translation: Vector3<f32>,
    axis: Vector3<f32>,
    now_ms: f64,
) -> Result<Mesh, ConstructionError> {
    let apex = Point3::new(0.0, 1.0, 0.0);
    let front_left = Point3::new(-0.5, 0.0, 0.5);
    let front_right = Point3::new(0.5, 0.0, 0.5);
    let back_left = Point3::new(-0.5, 0.0, -0.5);
    let back_right = Point3::new(0.5, 0.0, -0.5);

    let sides = [
        [front_left, front_right, apex],
        [back_left, back_right, apex],
        [back_left, front_left, apex],
        [back_right, front_right, apex],
    ];

    let kind = ShapeKind::TriangularBipyramid;
    let mut builder = MeshBuilder::with_capacity(kind, 16, 18);
    for (side, color) in sides.iter().zip(SIDE_COLORS) {
        let first = builder.push_face(side, color)?;
        builder.push_pattern(first, &[[0, 1, 2]])?;
    }

    // The base keeps one color entry per triangle, both the same cyan.
    let base = builder.push_face(&[front_left, front_right], BASE_COLOR)?;
    builder.push_face(&[back_left, back_right], BASE_COLOR)?;
    builder.push_pattern(base, &[[0, 1, 2], [1, 2, 3]])?;

    builder.finish(translation, axis, kind.default_motion(), now_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pyramid_layout() {
        let mesh = build_triangular_bipyramid(Vector3::zeros(), Vector3::y(), 0.0).unwrap();

        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.face_colors.len(), 6);
        assert_eq!(&mesh.indices[12..], &[12, 13, 14, 13, 14, 15]);
        assert!(mesh.triangles().take(4).all(|t| t.vertices[2] == Point3::new(0.0, 1.0, 0.0)));
        assert!(mesh.triangles().skip(4).all(|t| t.color == BASE_COLOR));
        assert!(mesh.triangles().skip(4).all(|t| t.vertices.iter().all(|p| p.y == 0.0)));
    }
}
