use std::f32::consts::PI;

use nalgebra::{Point3, Vector3};

use super::ShapeKind;
use crate::error::ConstructionError;
use crate::geometry::{Mesh, MeshBuilder, Rgba};

const RADIUS: f32 = 0.5;
const ANGLE_STEP_DEG: u16 = 72;

const BASE_COLOR: Rgba = [1.0, 0.0, 0.0, 1.0];
const SIDE_COLORS: [Rgba; 5] = [
    [1.0, 0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 1.0],
    [0.0, 0.0, 1.0, 1.0],
    [0.0, 1.0, 1.0, 1.0],
    [1.0, 1.0, 0.0, 1.0],
];

/// Base fan triangles; the rim point at step `k` sits at vertices `2k+1`
/// and `2k+2`.
const BASE_FAN: [[u16; 3]; 5] = [[0, 2, 3], [0, 4, 5], [0, 6, 7], [0, 8, 9], [0, 10, 1]];

fn rim_point(degrees: u16) -> Point3<f32> {
    let radians = f32::from(degrees) * PI / 180.0;
    Point3::new(RADIUS * radians.cos(), 0.0, RADIUS * radians.sin())
}

/// A five-sided fan base around its center plus five triangular sides up to
/// the apex: 26 vertices, 30 indices.
pub fn build_pentagonal_pyramid(
    translation: Vector3<f32>,
    axis: Vector3<f32>,
    now_ms: f64,
) -> Result<Mesh, ConstructionError> {
    let apex = Point3::new(0.0, 1.0, 0.0);
    let angles = (0..360).step_by(usize::from(ANGLE_STEP_DEG));

    let kind = ShapeKind::PentagonalPyramid;
    let mut builder = MeshBuilder::with_capacity(kind, 26, 30);

    let mut base = vec![Point3::origin()];
    for degrees in angles.clone() {
        let p = rim_point(degrees);
        base.extend_from_slice(&[p, p]);
    }
    let center = builder.push_face(&base, BASE_COLOR)?;
    builder.push_pattern(center, &BASE_FAN)?;

    for (degrees, color) in angles.zip(SIDE_COLORS) {
        let side = [rim_point(degrees), apex, rim_point(degrees + ANGLE_STEP_DEG)];
        let first = builder.push_face(&side, color)?;
        builder.push_pattern(first, &[[0, 1, 2]])?;
    }

    builder.finish(translation, axis, kind.default_motion(), now_ms)
}
