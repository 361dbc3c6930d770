/// Poly3D Web - WebGL2 driver for the polyhedron scene
///
/// JavaScript owns the animation loop and calls [`WebRenderer::frame`] from
/// `requestAnimationFrame`. Each frame draws the scene, then advances it.
use nalgebra::Vector3;
use poly3d_core::{AnimationConfig, Camera, Clock, MeshId, Motion, Scene, ShapeKind};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext};

mod gl;
mod logger;

pub use gl::{GlContext, GlError};
pub use logger::ConsoleLogger;

/// Browser time source backed by `Date.now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct WebClock;

impl Clock for WebClock {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

#[wasm_bindgen]
pub struct WebRenderer {
    scene: Scene,
    context: GlContext,
    canvas: HtmlCanvasElement,
    clock: WebClock,
}

#[wasm_bindgen]
impl WebRenderer {
    /// Bind to the canvas with id `canvas_id` and load the four-shape scene
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<WebRenderer, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("missing window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("missing document"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str("canvas not found"))?
            .dyn_into::<HtmlCanvasElement>()?;

        let gl: WebGl2RenderingContext = canvas
            .get_context("webgl2")?
            .ok_or_else(|| JsValue::from_str("webgl2 context unavailable"))?
            .dyn_into()?;

        let context = GlContext::new(gl)?;
        let clock = WebClock;
        let camera = Camera::new(canvas.width(), canvas.height());
        let scene = Scene::showcase(camera, AnimationConfig::default(), clock.now_ms())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let renderer = WebRenderer {
            scene,
            context,
            canvas,
            clock,
        };
        renderer.sync_viewport();
        Ok(renderer)
    }

    /// Draw the current state, then advance every mesh. Returns the number
    /// of meshes drawn.
    pub fn frame(&mut self) -> Result<u32, JsValue> {
        let stats = self.scene.render(&mut self.context)?;
        self.scene.update(self.clock.now_ms());
        Ok(stats.drawn as u32)
    }

    /// Add a shape by name (`pyramid`, `octahedron`, `pentagonal-pyramid`,
    /// `dodecahedron`) and return its id.
    #[allow(clippy::too_many_arguments)]
    pub fn add_shape(
        &mut self,
        name: &str,
        x: f32,
        y: f32,
        z: f32,
        axis_x: f32,
        axis_y: f32,
        axis_z: f32,
    ) -> Result<u32, JsValue> {
        let kind: ShapeKind = name.parse().map_err(|e: String| JsValue::from_str(&e))?;
        let id = self
            .scene
            .spawn(
                kind,
                Vector3::new(x, y, z),
                Vector3::new(axis_x, axis_y, axis_z),
                self.clock.now_ms(),
            )
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(id.raw())
    }

    /// Remove a mesh and free its buffers. Returns false for unknown ids.
    pub fn remove(&mut self, id: u32) -> bool {
        match self.find(id) {
            Some(mesh_id) => {
                self.scene.remove(mesh_id);
                self.context.release(mesh_id);
                true
            }
            None => false,
        }
    }

    /// Add a shape that drifts toward the viewer by `step` along +z each
    /// frame instead of spinning. Pair with [`WebRenderer::cull_past`].
    pub fn add_approaching(&mut self, name: &str, x: f32, y: f32, z: f32, step: f32) -> Result<u32, JsValue> {
        let motion = Motion::approach(step).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let id = self.add_shape(name, x, y, z, 0.0, 1.0, 0.0)?;
        if let Some(mesh) = self.find(id).and_then(|mesh_id| self.scene.get_mut(mesh_id)) {
            mesh.motion = motion;
        }
        Ok(id)
    }

    /// Remove the meshes that reached `z_plane` and free their buffers.
    /// Returns the ids removed.
    pub fn cull_past(&mut self, z_plane: f32) -> Vec<u32> {
        let dropped = self.scene.cull_past(z_plane);
        for id in &dropped {
            self.context.release(*id);
        }
        dropped.into_iter().map(MeshId::raw).collect()
    }

    /// Remove every mesh
    pub fn clear(&mut self) {
        for id in self.scene.retain(|_, _| false) {
            self.context.release(id);
        }
    }

    pub fn set_duration(&mut self, duration_ms: f64) -> Result<(), JsValue> {
        self.scene.config = AnimationConfig::new(duration_ms)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(())
    }

    pub fn mesh_count(&self) -> u32 {
        self.scene.len() as u32
    }

    /// Match the viewport and projection to the canvas size
    pub fn resize(&mut self) {
        self.scene
            .camera
            .set_viewport(self.canvas.width(), self.canvas.height());
        self.sync_viewport();
    }

    fn sync_viewport(&self) {
        self.context
            .set_viewport(self.canvas.width() as i32, self.canvas.height() as i32);
    }

    fn find(&self, raw: u32) -> Option<MeshId> {
        self.scene.iter().map(|(id, _)| id).find(|id| id.raw() == raw)
    }
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    logger::init().map_err(|e| JsValue::from_str(&e.to_string()))?;
    log::info!("poly3d web driver loaded");
    Ok(())
}
