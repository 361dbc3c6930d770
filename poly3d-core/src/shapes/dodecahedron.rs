use nalgebra::{Point3, Vector3};

use super::ShapeKind;
use crate::error::ConstructionError;
use crate::geometry::{Mesh, MeshBuilder, Rgba};

const FACE_COLORS: [Rgba; 12] = [
    [1.0, 0.0, 0.0, 1.0],
    [1.0, 1.0, 0.0, 0.0],
    [1.0, 0.0, 1.0, 1.0],
    [0.0, 1.0, 0.0, 0.0],
    [1.0, 0.0, 1.0, 1.0],
    [1.0, 0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 1.0],
    [0.0, 0.0, 1.0, 1.0],
    [0.0, 1.0, 1.0, 1.0],
    [1.0, 1.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 1.0],
];

/// Fan over a pentagon's five local vertices
const PENTAGON_FAN: [[u16; 3]; 3] = [[0, 1, 2], [1, 2, 3], [1, 3, 4]];

/// The twelve pentagons, each listed as five points in the fan's order.
fn pentagons() -> [[Point3<f32>; 5]; 12] {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let r = 1.0 / t;
    let (h, t, r) = (0.5, t / 2.0, r / 2.0);
    let p = Point3::new;

    [
        [p(0.0, r, t), p(-h, h, h), p(h, h, h), p(r, t, 0.0), p(-r, t, 0.0)],
        [p(t, 0.0, r), p(h, h, h), p(t, 0.0, -r), p(h, h, -h), p(r, t, 0.0)],
        [p(h, -h, -h), p(t, 0.0, -r), p(0.0, -r, -t), p(0.0, r, -t), p(h, h, -h)],
        [p(-h, -h, -h), p(0.0, -r, -t), p(-t, 0.0, -r), p(-h, h, -h), p(0.0, r, -t)],
        [p(-r, -t, 0.0), p(-h, -h, -h), p(-h, -h, h), p(-t, 0.0, r), p(-t, 0.0, -r)],
        [p(0.0, r, -t), p(h, h, -h), p(-h, h, -h), p(-r, t, 0.0), p(r, t, 0.0)],
        [p(-t, 0.0, -r), p(-h, h, -h), p(-t, 0.0, r), p(-h, h, h), p(-r, t, 0.0)],
        [p(-h, -h, h), p(-t, 0.0, r), p(0.0, -r, t), p(0.0, r, t), p(-h, h, h)],
        [p(r, -t, 0.0), p(h, -h, -h), p(-r, -t, 0.0), p(-h, -h, -h), p(0.0, -r, -t)],
        [p(0.0, -r, t), p(0.0, r, t), p(h, -h, h), p(t, 0.0, r), p(h, h, h)],
        [p(h, -h, h), p(t, 0.0, r), p(r, -t, 0.0), p(h, -h, -h), p(t, 0.0, -r)],
        [p(-r, -t, 0.0), p(-h, -h, h), p(r, -t, 0.0), p(h, -h, h), p(0.0, -r, t)],
    ]
}

/// Twelve pentagons built from the golden ratio, each split into three
/// triangles: 60 vertices, 108 indices.
pub fn build_dodecahedron(
    translation: Vector3<f32>,
    axis: Vector3<f32>,
    now_ms: f64,
) -> Result<Mesh, ConstructionError> {
    let kind = ShapeKind::Dodecahedron;
    let mut builder = MeshBuilder::with_capacity(kind, 60, 108);

    for (face, color) in pentagons().iter().zip(FACE_COLORS) {
        let first = builder.push_face(face, color)?;
        builder.push_pattern(first, &PENTAGON_FAN)?;
    }

    builder.finish(translation, axis, kind.default_motion(), now_ms)
}
