/// Flat-colored mesh records and the builder that assembles them face by face
use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::ConstructionError;
use crate::shapes::ShapeKind;
use crate::transform::{is_degenerate_axis, Motion};

/// Floats per position entry
pub const VERTEX_SIZE: usize = 3;
/// Floats per color entry
pub const COLOR_SIZE: usize = 4;
/// Vertices a 16-bit index buffer can address
pub const MAX_VERTICES: usize = u16::MAX as usize + 1;

pub type Rgba = [f32; 4];

/// One flat color applied to a run of consecutive vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceColor {
    pub rgba: Rgba,
    pub vertex_count: usize,
}

/// A triangle resolved from the index buffer
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub vertices: [Point3<f32>; 3],
    pub color: Rgba,
}

impl Triangle {
    /// Calculate the face normal from the triangle's vertices.
    ///
    /// Collinear vertices yield the zero vector instead of NaN.
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let [v0, v1, v2] = self.vertices;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1
            .cross(&edge2)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }
}

/// A renderable polyhedron: flat buffers plus its current placement.
///
/// Vertices are never shared between faces, so every face keeps its own
/// flat color.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub kind: ShapeKind,
    pub positions: Vec<f32>,
    pub face_colors: Vec<FaceColor>,
    /// `face_colors` expanded to one RGBA entry per vertex
    pub colors: Vec<f32>,
    pub indices: Vec<u16>,
    pub transform: Matrix4<f32>,
    pub last_update_ms: f64,
    pub motion: Motion,
    axis: Vector3<f32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / VERTEX_SIZE
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn position(&self, index: usize) -> Option<Point3<f32>> {
        let start = index * VERTEX_SIZE;
        let p = self.positions.get(start..start + VERTEX_SIZE)?;
        Some(Point3::new(p[0], p[1], p[2]))
    }

    /// World-space translation held by the transform
    pub fn translation(&self) -> Vector3<f32> {
        self.transform.fixed_view::<3, 1>(0, 3).into_owned()
    }

    pub fn rotation_axis(&self) -> Vector3<f32> {
        self.axis
    }

    /// Replace the rotation axis. A zero axis is accepted here and turns
    /// the rotation step into a no-op.
    pub fn set_rotation_axis(&mut self, axis: Vector3<f32>) {
        self.axis = axis;
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        resolve_triangles(&self.positions, &self.colors, &self.indices)
    }

    /// Check the buffer invariants: whole triangles, indices in range,
    /// one color per vertex, and a vertex count a 16-bit index can reach.
    pub fn validate(&self) -> Result<(), ConstructionError> {
        let vertex_count = self.vertex_count();
        if vertex_count > MAX_VERTICES {
            return Err(ConstructionError::TooManyVertices(vertex_count));
        }
        if self.indices.len() % 3 != 0 {
            return Err(ConstructionError::PartialTriangle(self.indices.len()));
        }
        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&i| usize::from(i) >= vertex_count)
        {
            return Err(ConstructionError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }

        let colored: usize = self.face_colors.iter().map(|c| c.vertex_count).sum();
        if colored != vertex_count || self.colors.len() != vertex_count * COLOR_SIZE {
            return Err(ConstructionError::ColorCountMismatch {
                colored,
                vertex_count,
            });
        }

        Ok(())
    }
}

/// Walk an indexed triangle list, skipping triangles whose indices fall
/// outside the buffers.
pub fn resolve_triangles<'a>(
    positions: &'a [f32],
    colors: &'a [f32],
    indices: &'a [u16],
) -> impl Iterator<Item = Triangle> + 'a {
    let point = move |i: u16| {
        let start = usize::from(i) * VERTEX_SIZE;
        positions
            .get(start..start + VERTEX_SIZE)
            .map(|p| Point3::new(p[0], p[1], p[2]))
    };

    indices.chunks_exact(3).filter_map(move |tri| {
        let vertices = [point(tri[0])?, point(tri[1])?, point(tri[2])?];
        let start = usize::from(tri[0]) * COLOR_SIZE;
        let color = match colors.get(start..start + COLOR_SIZE) {
            Some(c) => [c[0], c[1], c[2], c[3]],
            None => [1.0; 4],
        };
        Some(Triangle { vertices, color })
    })
}

/// Accumulates faces and triangles, then finishes into a validated [`Mesh`]
pub struct MeshBuilder {
    kind: ShapeKind,
    positions: Vec<f32>,
    face_colors: Vec<FaceColor>,
    indices: Vec<u16>,
}

impl MeshBuilder {
    pub fn new(kind: ShapeKind) -> Self {
        Self::with_capacity(kind, 0, 0)
    }

    pub fn with_capacity(kind: ShapeKind, vertices: usize, indices: usize) -> Self {
        Self {
            kind,
            positions: Vec::with_capacity(vertices * VERTEX_SIZE),
            face_colors: Vec::new(),
            indices: Vec::with_capacity(indices),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / VERTEX_SIZE
    }

    /// Append the vertices of one face under a single flat color and
    /// return the index of its first vertex. A face that would take the mesh
    /// past what a `u16` index can address is refused and nothing is pushed.
    pub fn push_face(&mut self, points: &[Point3<f32>], rgba: Rgba) -> Result<u16, ConstructionError> {
        let total = self.vertex_count() + points.len();
        if total > MAX_VERTICES {
            return Err(ConstructionError::TooManyVertices(total));
        }
        let first = u16::try_from(self.vertex_count())
            .map_err(|_| ConstructionError::TooManyVertices(total))?;

        for p in points {
            self.positions.extend_from_slice(&[p.x, p.y, p.z]);
        }
        self.face_colors.push(FaceColor {
            rgba,
            vertex_count: points.len(),
        });
        Ok(first)
    }

    pub fn push_triangle(&mut self, a: u16, b: u16, c: u16) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Push triangles whose corners are given relative to `first`. Nothing
    /// is pushed if any corner overflows a `u16`.
    pub fn push_pattern(&mut self, first: u16, pattern: &[[u16; 3]]) -> Result<(), ConstructionError> {
        let offset = |corner: u16| {
            first
                .checked_add(corner)
                .ok_or(ConstructionError::TooManyVertices(usize::from(first) + usize::from(corner) + 1))
        };
        let mut resolved = Vec::with_capacity(pattern.len() * 3);
        for corner in pattern.iter().flatten() {
            resolved.push(offset(*corner)?);
        }
        self.indices.extend_from_slice(&resolved);
        Ok(())
    }

    /// Place the mesh at `translation`, capture `now_ms` as its last update
    /// time, and validate the buffers.
    pub fn finish(
        self,
        translation: Vector3<f32>,
        axis: Vector3<f32>,
        motion: Motion,
        now_ms: f64,
    ) -> Result<Mesh, ConstructionError> {
        if translation.iter().any(|c| !c.is_finite()) {
            return Err(ConstructionError::NonFiniteTranslation(translation.into()));
        }
        if is_degenerate_axis(&axis) {
            return Err(ConstructionError::DegenerateAxis(axis.into()));
        }

        let colors = self
            .face_colors
            .iter()
            .flat_map(|face| std::iter::repeat(face.rgba).take(face.vertex_count))
            .flatten()
            .collect();

        let mesh = Mesh {
            kind: self.kind,
            positions: self.positions,
            face_colors: self.face_colors,
            colors,
            indices: self.indices,
            transform: Matrix4::new_translation(&translation),
            last_update_ms: now_ms,
            motion,
            axis,
        };
        mesh.validate()?;
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> [Point3<f32>; 3] {
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_builder_expands_face_colors() {
        let mut builder = MeshBuilder::new(ShapeKind::TriangularBipyramid);
        let first = builder.push_face(&unit_triangle(), [1.0, 0.0, 0.0, 1.0]).unwrap();
        builder.push_pattern(first, &[[0, 1, 2]]).unwrap();
        let second = builder.push_face(&unit_triangle(), [0.0, 0.0, 1.0, 1.0]).unwrap();
        builder.push_pattern(second, &[[0, 1, 2]]).unwrap();
        assert_eq!(second, 3);

        let mesh = builder
            .finish(Vector3::zeros(), Vector3::y(), Motion::Spin, 0.0)
            .unwrap();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.colors.len(), 6 * COLOR_SIZE);
        assert_eq!(&mesh.colors[12..16], &[0.0, 0.0, 1.0, 1.0]);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_finish_rejects_bad_parameters() {
        let build = |translation, axis| {
            let mut builder = MeshBuilder::new(ShapeKind::Octahedron);
            builder.push_face(&unit_triangle(), [1.0; 4]).unwrap();
            builder.push_triangle(0, 1, 2);
            builder.finish(translation, axis, Motion::Spin, 0.0)
        };

        assert!(matches!(
            build(Vector3::new(f32::NAN, 0.0, 0.0), Vector3::y()),
            Err(ConstructionError::NonFiniteTranslation(_))
        ));
        assert!(matches!(
            build(Vector3::zeros(), Vector3::zeros()),
            Err(ConstructionError::DegenerateAxis(_))
        ));
    }

    #[test]
    fn test_finish_rejects_out_of_range_index() {
        let mut builder = MeshBuilder::new(ShapeKind::Dodecahedron);
        builder.push_face(&unit_triangle(), [1.0; 4]).unwrap();
        builder.push_triangle(0, 1, 3);

        let result = builder.finish(Vector3::zeros(), Vector3::x(), Motion::Spin, 0.0);
        assert_eq!(
            result.unwrap_err(),
            ConstructionError::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            }
        );
    }

    #[test]
    fn test_builder_refuses_vertices_past_u16() {
        let mut builder = MeshBuilder::new(ShapeKind::Dodecahedron);
        let wide = vec![Point3::origin(); usize::from(u16::MAX)];
        assert_eq!(builder.push_face(&wide, [1.0; 4]), Ok(0));

        assert_eq!(
            builder.push_face(&unit_triangle(), [1.0; 4]),
            Err(ConstructionError::TooManyVertices(65538))
        );
        assert_eq!(builder.vertex_count(), 65535);

        // The last addressable vertex still fits.
        assert_eq!(builder.push_face(&[Point3::origin()], [1.0; 4]), Ok(65535));
        assert_eq!(builder.vertex_count(), MAX_VERTICES);
    }

    #[test]
    fn test_pattern_overflow_pushes_nothing() {
        let mut builder = MeshBuilder::new(ShapeKind::Octahedron);
        builder.push_face(&unit_triangle(), [1.0; 4]).unwrap();

        assert_eq!(
            builder.push_pattern(u16::MAX - 1, &[[0, 1, 1], [0, 1, 2]]),
            Err(ConstructionError::TooManyVertices(65537))
        );
        assert!(builder.indices.is_empty());

        builder.push_pattern(0, &[[0, 1, 2]]).unwrap();
        assert_eq!(builder.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_translation_is_read_back() {
        let mut builder = MeshBuilder::new(ShapeKind::PentagonalPyramid);
        builder.push_face(&unit_triangle(), [1.0; 4]).unwrap();
        builder.push_triangle(0, 1, 2);
        let mesh = builder
            .finish(Vector3::new(1.0, -2.0, 3.0), Vector3::z(), Motion::Spin, 0.0)
            .unwrap();

        assert_eq!(mesh.translation(), Vector3::new(1.0, -2.0, 3.0));
        assert_eq!(mesh.position(1), Some(Point3::new(1.0, 0.0, 0.0)));
        assert_eq!(mesh.position(3), None);
    }

    #[test]
    fn test_triangle_normal() {
        let triangle = Triangle {
            vertices: unit_triangle(),
            color: [1.0; 4],
        };
        assert!((triangle.calculate_normal() - Vector3::z()).norm() < 1e-6);

        let flat = Triangle {
            vertices: [Point3::origin(); 3],
            color: [1.0; 4],
        };
        assert_eq!(flat.calculate_normal(), Vector3::zeros());
    }

    #[test]
    fn test_resolve_skips_dangling_triangles() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let colors = [0.5; 12];
        let indices = [0, 1, 2, 0, 1, 9];

        let triangles: Vec<_> = resolve_triangles(&positions, &colors, &indices).collect();
        assert_eq!(triangles.len(), 1);
        assert_eq!(triangles[0].color, [0.5; 4]);
    }
}
