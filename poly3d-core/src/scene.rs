/// Scene state owned by a rendering driver
///
/// The scene holds the camera, the animation timing and every live mesh.
/// Drivers call [`Scene::update`] and [`Scene::render`] once per frame.
use std::fmt;

use nalgebra::{Matrix4, Vector3};

use crate::error::ConstructionError;
use crate::geometry::{resolve_triangles, Mesh, Triangle};
use crate::projection::Camera;
use crate::shapes::ShapeKind;
use crate::transform::{self, AnimationConfig};

/// Stable handle to a mesh in a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(u32);

impl MeshId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One indexed triangle-list draw
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub id: MeshId,
    pub positions: &'a [f32],
    pub colors: &'a [f32],
    pub indices: &'a [u16],
    pub model_view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
}

impl<'a> DrawCall<'a> {
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + 'a {
        resolve_triangles(self.positions, self.colors, self.indices)
    }
}

/// Anything that can draw indexed, per-vertex colored triangle lists
pub trait RenderContext {
    type Error: fmt::Display;

    fn begin_frame(&mut self) {}

    fn draw_indexed(&mut self, call: DrawCall<'_>) -> Result<(), Self::Error>;

    fn end_frame(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Outcome of one [`Scene::render`] pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub drawn: usize,
    pub skipped: usize,
    pub triangles: usize,
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    pub config: AnimationConfig,
    meshes: Vec<(MeshId, Mesh)>,
    next_id: u32,
}

impl Scene {
    pub fn new(camera: Camera, config: AnimationConfig) -> Self {
        Self {
            camera,
            config,
            meshes: Vec::new(),
            next_id: 0,
        }
    }

    /// The four polyhedra side by side, each spinning on its own axis.
    pub fn showcase(
        camera: Camera,
        config: AnimationConfig,
        now_ms: f64,
    ) -> Result<Self, ConstructionError> {
        let mut scene = Self::new(camera, config);
        let layout = [
            (ShapeKind::TriangularBipyramid, Vector3::new(-1.8, 0.6, -2.0), Vector3::new(1.0, 1.0, 0.2)),
            (ShapeKind::Octahedron, Vector3::new(-0.6, -0.5, -2.0), Vector3::new(0.0, 1.0, 0.0)),
            (ShapeKind::PentagonalPyramid, Vector3::new(0.6, 0.6, -2.0), Vector3::new(1.0, 0.0, 0.6)),
            (ShapeKind::Dodecahedron, Vector3::new(1.8, -0.4, -2.0), Vector3::new(-0.4, 1.0, 0.1)),
        ];
        for (kind, translation, axis) in layout {
            scene.spawn(kind, translation, axis, now_ms)?;
        }
        Ok(scene)
    }

    pub fn add(&mut self, mesh: Mesh) -> MeshId {
        let id = MeshId(self.next_id);
        self.next_id += 1;
        log::debug!("added {} mesh {}", mesh.kind, id);
        self.meshes.push((id, mesh));
        id
    }

    /// Build a mesh and add it. A construction failure leaves the scene as
    /// it was.
    pub fn spawn(
        &mut self,
        kind: ShapeKind,
        translation: Vector3<f32>,
        axis: Vector3<f32>,
        now_ms: f64,
    ) -> Result<MeshId, ConstructionError> {
        let mesh = kind.build(translation, axis, now_ms).map_err(|e| {
            log::warn!("could not build {}: {}", kind, e);
            e
        })?;
        Ok(self.add(mesh))
    }

    pub fn remove(&mut self, id: MeshId) -> Option<Mesh> {
        let position = self.meshes.iter().position(|(mesh_id, _)| *mesh_id == id)?;
        let (_, mesh) = self.meshes.remove(position);
        log::debug!("removed {} mesh {}", mesh.kind, id);
        Some(mesh)
    }

    /// Keep only the meshes for which `keep` returns true and hand back the
    /// ids of those dropped.
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<MeshId>
    where
        F: FnMut(MeshId, &Mesh) -> bool,
    {
        let mut dropped = Vec::new();
        self.meshes.retain(|(id, mesh)| {
            let kept = keep(*id, mesh);
            if !kept {
                dropped.push(*id);
            }
            kept
        });
        dropped
    }

    /// Drop every mesh whose translation has reached `z_plane` along +z and
    /// return their ids so the driver can free what it holds for them.
    pub fn cull_past(&mut self, z_plane: f32) -> Vec<MeshId> {
        let dropped = self.retain(|_, mesh| mesh.translation().z < z_plane);
        if !dropped.is_empty() {
            log::debug!("culled {} meshes past z = {}", dropped.len(), z_plane);
        }
        dropped
    }

    pub fn get(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.iter().find(|(mesh_id, _)| *mesh_id == id).map(|(_, m)| m)
    }

    pub fn get_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes
            .iter_mut()
            .find(|(mesh_id, _)| *mesh_id == id)
            .map(|(_, m)| m)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshId, &Mesh)> {
        self.meshes.iter().map(|(id, mesh)| (*id, mesh))
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Advance every mesh to `now_ms`
    pub fn update(&mut self, now_ms: f64) {
        for (_, mesh) in &mut self.meshes {
            transform::update(mesh, now_ms, &self.config);
        }
    }

    /// Issue one draw per mesh. A draw that fails is logged and skipped so
    /// the rest of the frame still renders.
    pub fn render<R: RenderContext>(&self, ctx: &mut R) -> Result<FrameStats, R::Error> {
        let view = self.camera.view_matrix();
        let projection = self.camera.projection_matrix();
        let mut stats = FrameStats::default();

        ctx.begin_frame();
        for (id, mesh) in &self.meshes {
            let call = DrawCall {
                id: *id,
                positions: &mesh.positions,
                colors: &mesh.colors,
                indices: &mesh.indices,
                model_view: view * mesh.transform,
                projection,
            };
            match ctx.draw_indexed(call) {
                Ok(()) => {
                    stats.drawn += 1;
                    stats.triangles += mesh.triangle_count();
                }
                Err(e) => {
                    log::warn!("skipping {} mesh {}: {}", mesh.kind, id, e);
                    stats.skipped += 1;
                }
            }
        }
        ctx.end_frame()?;

        Ok(stats)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Camera::default(), AnimationConfig::default())
    }
}
