/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix3, Matrix4, Vector3};
use poly3d_core::geometry::{COLOR_SIZE, VERTEX_SIZE};
use poly3d_core::projection::{ndc_to_screen, project_ndc};
use poly3d_core::{DrawCall, RenderContext, Rgba, Triangle};
use std::io::Write;
use thiserror::Error;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RasterError {
    #[error("color buffer holds {colors} floats for {vertices} vertices")]
    ColorMismatch { colors: usize, vertices: usize },
}

/// ASCII renderer that converts indexed meshes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<(char, Color)>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![(' ', Color::Reset); size],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill((' ', Color::Reset));
    }

    /// Number of cells currently covered by geometry
    pub fn covered_cells(&self) -> usize {
        self.char_buffer.iter().filter(|(c, _)| *c != ' ').count()
    }

    fn render_triangle(&mut self, triangle: &Triangle, mvp: &Matrix4<f32>, rotation: &Matrix3<f32>) {
        // Project vertices to screen space
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (coord, vertex) in screen_coords.iter_mut().zip(&triangle.vertices) {
            match project_ndc(mvp, vertex) {
                Some(ndc) => *coord = ndc_to_screen(&ndc, self.width as u32, self.height as u32),
                None => return, // Triangle is clipped
            }
        }

        // Winding is not consistent across shapes, so light both sides.
        let normal = rotation * triangle.calculate_normal();
        let brightness = normal.dot(&Vector3::z()).abs();

        // Map brightness to character
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let char_index = char_index.clamp(1, LUMINOSITY_RAMP.len() - 1);
        let character = LUMINOSITY_RAMP[char_index];

        self.rasterize_triangle(&screen_coords, character, shade(triangle.color, brightness));
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], character: char, color: Color) {
        let [v0, v1, v2] = *coords;

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                if let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;

                        let idx = y as usize * self.width + x as usize;
                        if depth < self.depth_buffer[idx] {
                            self.depth_buffer[idx] = depth;
                            self.char_buffer[idx] = (character, color);
                        }
                    }
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for row in self.char_buffer.chunks(self.width.max(1)) {
            for &(c, color) in row {
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(c))?;
            }
            writer.queue(Print("\r\n"))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl RenderContext for AsciiRenderer {
    type Error = RasterError;

    fn begin_frame(&mut self) {
        self.clear();
    }

    fn draw_indexed(&mut self, call: DrawCall<'_>) -> Result<(), RasterError> {
        let vertices = call.positions.len() / VERTEX_SIZE;
        if call.colors.len() != vertices * COLOR_SIZE {
            return Err(RasterError::ColorMismatch {
                colors: call.colors.len(),
                vertices,
            });
        }

        let mvp = call.projection * call.model_view;
        let rotation = call.model_view.fixed_view::<3, 3>(0, 0).into_owned();
        for triangle in call.triangles() {
            self.render_triangle(&triangle, &mvp, &rotation);
        }
        Ok(())
    }
}

/// Scale a face color by its lighting, keeping a floor so dark faces stay visible
fn shade(rgba: Rgba, brightness: f32) -> Color {
    let level = 0.35 + 0.65 * brightness.clamp(0.0, 1.0);
    let channel = |c: f32| (c.clamp(0.0, 1.0) * level * 255.0).round() as u8;
    Color::Rgb {
        r: channel(rgba[0]),
        g: channel(rgba[1]),
        b: channel(rgba[2]),
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
