/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

/// Camera configuration for 3D rendering
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Perspective camera five units back from the origin with a 45 degree
    /// field of view.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::origin(),
            up: Vector3::y(),
            fov: std::f32::consts::FRAC_PI_4,
            aspect: aspect_ratio(width, height),
            near: 1.0,
            far: 100.0,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the perspective projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Project a point through `model_view` and the camera's projection to
    /// screen space. Returns `(x, y, depth)` with depth in NDC.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_view: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let mvp = self.projection_matrix() * model_view;
        project_ndc(&mvp, point).map(|ndc| ndc_to_screen(&ndc, width, height))
    }
}

/// Transform to clip space and divide by `w`. Returns `None` when the point
/// is behind the eye or outside the view volume.
pub fn project_ndc(mvp: &Matrix4<f32>, point: &Point3<f32>) -> Option<Point3<f32>> {
    let clip = mvp * point.to_homogeneous();

    if clip.w <= 1e-6 {
        return None;
    }

    let ndc = clip.xyz() / clip.w;
    if ndc.iter().any(|c| !(-1.0..=1.0).contains(c)) {
        return None;
    }
    Some(Point3::from(ndc))
}

/// Map NDC to pixel coordinates with y pointing down
pub fn ndc_to_screen(ndc: &Point3<f32>, width: u32, height: u32) -> (f32, f32, f32) {
    let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
    let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;
    (screen_x, screen_y, ndc.z)
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}
