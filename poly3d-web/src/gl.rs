/// WebGL2 binding for scene draw calls
use std::collections::HashMap;

use js_sys::{Float32Array, Uint16Array};
use poly3d_core::geometry::{COLOR_SIZE, VERTEX_SIZE};
use poly3d_core::{DrawCall, MeshId, RenderContext};
use thiserror::Error;
use wasm_bindgen::JsValue;
use web_sys::{
    WebGl2RenderingContext as Gl, WebGlBuffer, WebGlProgram, WebGlShader, WebGlUniformLocation,
};

pub(crate) const POSITION_ATTRIBUTE: &str = "vertexPos";
pub(crate) const COLOR_ATTRIBUTE: &str = "vertexColor";
pub(crate) const MODEL_VIEW_UNIFORM: &str = "modelViewMatrix";
pub(crate) const PROJECTION_UNIFORM: &str = "projectionMatrix";

pub(crate) const VERTEX_SHADER_SOURCE: &str = r#"
attribute vec3 vertexPos;
attribute vec4 vertexColor;
uniform mat4 modelViewMatrix;
uniform mat4 projectionMatrix;
varying vec4 vColor;

void main(void) {
    gl_Position = projectionMatrix * modelViewMatrix * vec4(vertexPos, 1.0);
    vColor = vertexColor;
}
"#;

pub(crate) const FRAGMENT_SHADER_SOURCE: &str = r#"
precision lowp float;
varying vec4 vColor;

void main(void) {
    gl_FragColor = vColor;
}
"#;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("webgl: {0}")]
pub struct GlError(pub String);

impl From<JsValue> for GlError {
    fn from(value: JsValue) -> Self {
        GlError(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

impl From<GlError> for JsValue {
    fn from(err: GlError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

fn error(message: &str) -> GlError {
    GlError(message.to_string())
}

/// Static buffers for one mesh, uploaded on first draw
struct MeshBuffers {
    positions: WebGlBuffer,
    colors: WebGlBuffer,
    indices: WebGlBuffer,
    index_count: i32,
}

pub struct GlContext {
    gl: Gl,
    program: WebGlProgram,
    position_location: u32,
    color_location: u32,
    model_view_location: WebGlUniformLocation,
    projection_location: WebGlUniformLocation,
    buffers: HashMap<MeshId, MeshBuffers>,
}

impl GlContext {
    pub fn new(gl: Gl) -> Result<Self, GlError> {
        let vert_shader = compile_shader(&gl, Gl::VERTEX_SHADER, VERTEX_SHADER_SOURCE)?;
        let frag_shader = compile_shader(&gl, Gl::FRAGMENT_SHADER, FRAGMENT_SHADER_SOURCE)?;
        let program = link_program(&gl, &vert_shader, &frag_shader)?;

        let position_location = attribute_location(&gl, &program, POSITION_ATTRIBUTE)?;
        let color_location = attribute_location(&gl, &program, COLOR_ATTRIBUTE)?;
        let model_view_location = gl
            .get_uniform_location(&program, MODEL_VIEW_UNIFORM)
            .ok_or_else(|| error("modelViewMatrix uniform missing"))?;
        let projection_location = gl
            .get_uniform_location(&program, PROJECTION_UNIFORM)
            .ok_or_else(|| error("projectionMatrix uniform missing"))?;

        gl.enable(Gl::DEPTH_TEST);

        Ok(Self {
            gl,
            program,
            position_location,
            color_location,
            model_view_location,
            projection_location,
            buffers: HashMap::new(),
        })
    }

    pub fn set_viewport(&self, width: i32, height: i32) {
        self.gl.viewport(0, 0, width, height);
    }

    /// Free the GPU buffers of a mesh that left the scene
    pub fn release(&mut self, id: MeshId) {
        if let Some(buffers) = self.buffers.remove(&id) {
            self.gl.delete_buffer(Some(&buffers.positions));
            self.gl.delete_buffer(Some(&buffers.colors));
            self.gl.delete_buffer(Some(&buffers.indices));
            log::debug!("released buffers of mesh {}", id);
        }
    }

    fn upload(&self, call: &DrawCall<'_>) -> Result<MeshBuffers, GlError> {
        let positions = self.create_buffer()?;
        self.gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&positions));
        self.gl.buffer_data_with_array_buffer_view(
            Gl::ARRAY_BUFFER,
            &Float32Array::from(call.positions),
            Gl::STATIC_DRAW,
        );

        let colors = self.create_buffer()?;
        self.gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&colors));
        self.gl.buffer_data_with_array_buffer_view(
            Gl::ARRAY_BUFFER,
            &Float32Array::from(call.colors),
            Gl::STATIC_DRAW,
        );

        let indices = self.create_buffer()?;
        self.gl.bind_buffer(Gl::ELEMENT_ARRAY_BUFFER, Some(&indices));
        self.gl.buffer_data_with_array_buffer_view(
            Gl::ELEMENT_ARRAY_BUFFER,
            &Uint16Array::from(call.indices),
            Gl::STATIC_DRAW,
        );

        let index_count =
            i32::try_from(call.indices.len()).map_err(|_| error("index buffer too large"))?;
        log::debug!("uploaded mesh {} ({} indices)", call.id, index_count);

        Ok(MeshBuffers {
            positions,
            colors,
            indices,
            index_count,
        })
    }

    fn create_buffer(&self) -> Result<WebGlBuffer, GlError> {
        self.gl
            .create_buffer()
            .ok_or_else(|| error("failed to create buffer"))
    }
}

impl RenderContext for GlContext {
    type Error = GlError;

    fn begin_frame(&mut self) {
        self.gl.clear_color(0.1, 0.1, 0.1, 1.0);
        self.gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);
        self.gl.use_program(Some(&self.program));
    }

    fn draw_indexed(&mut self, call: DrawCall<'_>) -> Result<(), GlError> {
        if !self.buffers.contains_key(&call.id) {
            let uploaded = self.upload(&call)?;
            self.buffers.insert(call.id, uploaded);
        }
        let buffers = &self.buffers[&call.id];
        let gl = &self.gl;

        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&buffers.positions));
        gl.vertex_attrib_pointer_with_i32(
            self.position_location,
            VERTEX_SIZE as i32,
            Gl::FLOAT,
            false,
            0,
            0,
        );
        gl.enable_vertex_attrib_array(self.position_location);

        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&buffers.colors));
        gl.vertex_attrib_pointer_with_i32(
            self.color_location,
            COLOR_SIZE as i32,
            Gl::FLOAT,
            false,
            0,
            0,
        );
        gl.enable_vertex_attrib_array(self.color_location);

        gl.bind_buffer(Gl::ELEMENT_ARRAY_BUFFER, Some(&buffers.indices));

        gl.uniform_matrix4fv_with_f32_array(
            Some(&self.projection_location),
            false,
            call.projection.as_slice(),
        );
        gl.uniform_matrix4fv_with_f32_array(
            Some(&self.model_view_location),
            false,
            call.model_view.as_slice(),
        );

        gl.draw_elements_with_i32(Gl::TRIANGLES, buffers.index_count, Gl::UNSIGNED_SHORT, 0);
        Ok(())
    }
}

fn attribute_location(gl: &Gl, program: &WebGlProgram, name: &str) -> Result<u32, GlError> {
    u32::try_from(gl.get_attrib_location(program, name))
        .map_err(|_| GlError(format!("{} attribute missing", name)))
}

fn compile_shader(gl: &Gl, shader_type: u32, source: &str) -> Result<WebGlShader, GlError> {
    let shader = gl
        .create_shader(shader_type)
        .ok_or_else(|| error("failed to create shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    let success = gl
        .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);

    if success {
        Ok(shader)
    } else {
        let message = gl
            .get_shader_info_log(&shader)
            .unwrap_or_else(|| "unknown shader error".into());
        Err(GlError(message))
    }
}

fn link_program(gl: &Gl, vert: &WebGlShader, frag: &WebGlShader) -> Result<WebGlProgram, GlError> {
    let program = gl
        .create_program()
        .ok_or_else(|| error("failed to create program"))?;
    gl.attach_shader(&program, vert);
    gl.attach_shader(&program, frag);
    gl.link_program(&program);

    let success = gl
        .get_program_parameter(&program, Gl::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);

    if success {
        Ok(program)
    } else {
        let message = gl
            .get_program_info_log(&program)
            .unwrap_or_else(|| "unknown program error".into());
        Err(GlError(message))
    }
}
