/// Per-frame rigid-body updates: time-based spin, step-based bounce and approach
use std::f64::consts::TAU;

use nalgebra::{Matrix4, Rotation3, Unit, Vector3};

use crate::error::{ConstructionError, DegenerateRotationError};
use crate::geometry::Mesh;

/// Axes shorter than this have no usable direction
const MIN_AXIS_LENGTH: f32 = 1e-6;

/// Animation timing shared by every mesh in a scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationConfig {
    duration_ms: f64,
    bounce_step: f32,
    bounce_steps: i32,
}

impl AnimationConfig {
    pub const DEFAULT_DURATION_MS: f64 = 5000.0;

    pub fn new(duration_ms: f64) -> Result<Self, ConstructionError> {
        Self::default().with_duration(duration_ms)
    }

    /// Same config with a different time for one full turn
    pub fn with_duration(self, duration_ms: f64) -> Result<Self, ConstructionError> {
        if !duration_ms.is_finite() || duration_ms <= 0.0 {
            return Err(ConstructionError::InvalidDuration(duration_ms));
        }
        Ok(Self {
            duration_ms,
            ..self
        })
    }

    /// Same config with a different bounce: `step` units per update,
    /// reversing after `steps` updates in one direction.
    pub fn with_bounce(self, step: f32, steps: i32) -> Result<Self, ConstructionError> {
        if !step.is_finite() || steps < 1 {
            return Err(ConstructionError::InvalidBounce { step, steps });
        }
        Ok(Self {
            bounce_step: step,
            bounce_steps: steps,
            ..self
        })
    }

    /// Time for one full turn, in milliseconds
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Vertical distance covered by one bounce step
    pub fn bounce_step(&self) -> f32 {
        self.bounce_step
    }

    /// Steps taken in one direction before the bounce reverses
    pub fn bounce_steps(&self) -> i32 {
        self.bounce_steps
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: Self::DEFAULT_DURATION_MS,
            bounce_step: 0.01,
            bounce_steps: 160,
        }
    }
}

/// Triangular vertical oscillation advanced once per update.
///
/// Starting from the rest position it rises `steps` steps, then falls to
/// `-steps`, then rises back, and so on. Elapsed time plays no part.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounce {
    step_index: i32,
    falling: bool,
}

impl Bounce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take one step and return the signed vertical displacement.
    /// `steps` below 1 is treated as 1.
    pub fn advance(&mut self, step: f32, steps: i32) -> f32 {
        let steps = steps.max(1);
        if !self.falling && self.step_index < steps {
            self.step_index += 1;
            if self.step_index == steps {
                self.falling = true;
            }
            step
        } else {
            self.step_index -= 1;
            if self.step_index <= -steps {
                self.falling = false;
            }
            -step
        }
    }

    /// Current displacement from the rest position
    pub fn offset(&self, step: f32) -> f32 {
        self.step_index as f32 * step
    }

    pub fn is_falling(&self) -> bool {
        self.falling
    }
}

/// How a mesh moves on each update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Still,
    Spin,
    SpinAndBounce(Bounce),
    /// Slide `step` units along world +z per update without spinning
    Approach { step: f32 },
}

impl Motion {
    pub fn approach(step: f32) -> Result<Self, ConstructionError> {
        if !step.is_finite() {
            return Err(ConstructionError::InvalidStep(step));
        }
        Ok(Motion::Approach { step })
    }
}

pub(crate) fn is_degenerate_axis(axis: &Vector3<f32>) -> bool {
    axis.iter().any(|c| !c.is_finite()) || axis.norm() < MIN_AXIS_LENGTH
}

/// Angle covered in `delta_ms` when a full turn takes `duration_ms`
pub fn rotation_angle(delta_ms: f64, duration_ms: f64) -> f32 {
    (TAU * delta_ms / duration_ms) as f32
}

/// Rotate `matrix` in place by `angle` radians around `axis`, in the
/// matrix's local frame (`M = M * R`).
pub fn rotate_about(
    matrix: &mut Matrix4<f32>,
    angle: f32,
    axis: &Vector3<f32>,
) -> Result<(), DegenerateRotationError> {
    if is_degenerate_axis(axis) {
        return Err(DegenerateRotationError {
            axis: (*axis).into(),
        });
    }
    let axis = Unit::new_normalize(*axis);
    let rotation = Rotation3::from_axis_angle(&axis, angle);
    *matrix *= rotation.to_homogeneous();
    Ok(())
}

/// Advance a mesh to `now_ms`.
///
/// Approaching meshes slide one step along world +z and do nothing else.
/// Bouncing meshes first take one vertical step in their local frame, then
/// every spinning mesh rotates by the angle matching the elapsed time. A
/// clock that runs backwards is treated as zero elapsed time, and a
/// degenerate axis skips the rotation.
pub fn update(mesh: &mut Mesh, now_ms: f64, config: &AnimationConfig) {
    let delta_ms = (now_ms - mesh.last_update_ms).max(0.0);
    mesh.last_update_ms = mesh.last_update_ms.max(now_ms);

    match &mut mesh.motion {
        Motion::Still => return,
        Motion::Approach { step } => {
            let shift = Matrix4::new_translation(&Vector3::new(0.0, 0.0, *step));
            mesh.transform = shift * mesh.transform;
            return;
        }
        Motion::Spin => {}
        Motion::SpinAndBounce(bounce) => {
            let dy = bounce.advance(config.bounce_step, config.bounce_steps);
            mesh.transform *= Matrix4::new_translation(&Vector3::new(0.0, dy, 0.0));
        }
    }

    let angle = rotation_angle(delta_ms, config.duration_ms);
    let axis = mesh.rotation_axis();
    if let Err(e) = rotate_about(&mut mesh.transform, angle, &axis) {
        log::debug!("{:?} mesh skipped rotation: {}", mesh.kind, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{build_dodecahedron, build_octahedron};

    fn assert_matrix_eq(a: &Matrix4<f32>, b: &Matrix4<f32>) {
        assert!((a - b).norm() < 1e-4, "{} != {}", a, b);
    }

    #[test]
    fn test_default_config() {
        let config = AnimationConfig::default();
        assert_eq!(config.duration_ms(), 5000.0);
        assert_eq!(config.bounce_steps(), 160);
        assert!(AnimationConfig::new(0.0).is_err());
        assert!(AnimationConfig::new(f64::NAN).is_err());
        assert_eq!(AnimationConfig::new(2500.0).unwrap().duration_ms(), 2500.0);
    }

    #[test]
    fn test_rotation_angle() {
        assert!((rotation_angle(5000.0, 5000.0) - std::f32::consts::TAU).abs() < 1e-6);
        assert!((rotation_angle(1250.0, 5000.0) - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(rotation_angle(0.0, 5000.0), 0.0);
    }

    #[test]
    fn test_rotate_about_zero_axis_is_rejected() {
        let mut matrix = Matrix4::new_translation(&Vector3::new(1.0, 2.0, 3.0));
        let before = matrix;
        let result = rotate_about(&mut matrix, 1.0, &Vector3::zeros());
        assert!(result.is_err());
        assert_eq!(matrix, before);
    }

    #[test]
    fn test_rotate_about_keeps_rigid_transform() {
        let mut matrix = Matrix4::new_translation(&Vector3::new(1.0, 0.0, -2.0));
        rotate_about(&mut matrix, 0.7, &Vector3::new(1.0, 1.0, 1.0)).unwrap();
        rotate_about(&mut matrix, -2.1, &Vector3::new(0.0, 3.0, 1.0)).unwrap();

        let linear = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        assert_matrix_eq(
            &(linear.transpose() * linear).to_homogeneous(),
            &Matrix4::identity(),
        );
        assert!((linear.determinant() - 1.0).abs() < 1e-5);
        assert_eq!(matrix.row(3).into_owned(), Matrix4::<f32>::identity().row(3).into_owned());
        assert!((matrix[(0, 3)] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_update_twice_at_same_time_is_idempotent() {
        let config = AnimationConfig::default();
        let mut mesh = build_dodecahedron(Vector3::zeros(), Vector3::new(1.0, 0.0, 1.0), 0.0).unwrap();

        update(&mut mesh, 700.0, &config);
        let after_first = mesh.transform;
        update(&mut mesh, 700.0, &config);
        assert_matrix_eq(&mesh.transform, &after_first);
        assert_eq!(mesh.last_update_ms, 700.0);
    }

    #[test]
    fn test_full_duration_is_a_full_turn() {
        let config = AnimationConfig::default();
        let t0 = 1_700_000_000_000.0;
        let mut mesh = build_dodecahedron(Vector3::new(0.5, 0.0, -1.0), Vector3::new(0.0, 1.0, 1.0), t0).unwrap();
        let start = mesh.transform;

        update(&mut mesh, t0 + 5000.0, &config);
        assert_matrix_eq(&mesh.transform, &start);

        update(&mut mesh, t0 + 7500.0, &config);
        let half_turn = Rotation3::from_axis_angle(&Unit::new_normalize(Vector3::new(0.0, 1.0, 1.0)), std::f32::consts::PI);
        assert_matrix_eq(&mesh.transform, &(start * half_turn.to_homogeneous()));
    }

    #[test]
    fn test_backwards_clock_does_not_rotate() {
        let config = AnimationConfig::default();
        let mut mesh = build_dodecahedron(Vector3::zeros(), Vector3::y(), 1000.0).unwrap();
        let start = mesh.transform;

        update(&mut mesh, 400.0, &config);
        assert_matrix_eq(&mesh.transform, &start);
        assert_eq!(mesh.last_update_ms, 1000.0);
    }

    #[test]
    fn test_zero_axis_update_is_a_no_op_rotation() {
        let config = AnimationConfig::default();
        let mut mesh = build_dodecahedron(Vector3::zeros(), Vector3::y(), 0.0).unwrap();
        mesh.set_rotation_axis(Vector3::zeros());
        let start = mesh.transform;

        update(&mut mesh, 1234.0, &config);
        assert!(mesh.transform.iter().all(|v| v.is_finite()));
        assert_matrix_eq(&mesh.transform, &start);
        assert_eq!(mesh.last_update_ms, 1234.0);
    }

    #[test]
    fn test_bounce_rises_then_falls() {
        let mut bounce = Bounce::new();
        for _ in 0..160 {
            assert_eq!(bounce.advance(0.01, 160), 0.01);
        }
        assert!((bounce.offset(0.01) - 1.6).abs() < 1e-5);
        assert!(bounce.is_falling());

        for _ in 0..160 {
            assert_eq!(bounce.advance(0.01, 160), -0.01);
        }
        assert_eq!(bounce.offset(0.01), 0.0);

        for _ in 0..160 {
            bounce.advance(0.01, 160);
        }
        assert!((bounce.offset(0.01) + 1.6).abs() < 1e-5);
        assert!(!bounce.is_falling());
        assert_eq!(bounce.advance(0.01, 160), 0.01);
    }

    #[test]
    fn test_octahedron_bounces_independent_of_time() {
        let config = AnimationConfig::default();
        let mut mesh = build_octahedron(Vector3::new(0.0, -0.5, 0.0), Vector3::y(), 0.0).unwrap();

        // Same timestamp on every call: no rotation, only bounce steps.
        for _ in 0..160 {
            update(&mut mesh, 0.0, &config);
        }
        assert!((mesh.translation().y - 1.1).abs() < 1e-4);
        match mesh.motion {
            Motion::SpinAndBounce(bounce) => assert!((bounce.offset(0.01) - 1.6).abs() < 1e-5),
            other => panic!("unexpected motion {:?}", other),
        }

        for _ in 0..160 {
            update(&mut mesh, 0.0, &config);
        }
        assert!((mesh.translation().y + 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_still_mesh_never_moves() {
        let config = AnimationConfig::default();
        let mut mesh = build_octahedron(Vector3::zeros(), Vector3::y(), 0.0).unwrap();
        mesh.motion = Motion::Still;
        let start = mesh.transform;

        update(&mut mesh, 2500.0, &config);
        assert_eq!(mesh.transform, start);
        assert_eq!(mesh.last_update_ms, 2500.0);
    }

    #[test]
    fn test_bounce_settings_are_validated() {
        let config = AnimationConfig::default();
        assert_eq!(
            config.with_bounce(0.01, 0),
            Err(ConstructionError::InvalidBounce { step: 0.01, steps: 0 })
        );
        assert!(config.with_bounce(0.01, -5).is_err());
        assert!(config.with_bounce(f32::INFINITY, 160).is_err());

        let custom = config.with_bounce(0.05, 20).unwrap();
        assert_eq!(custom.bounce_step(), 0.05);
        assert_eq!(custom.bounce_steps(), 20);
        assert_eq!(custom.duration_ms(), config.duration_ms());
    }

    #[test]
    fn test_bounce_stays_bounded_with_zero_steps() {
        let mut bounce = Bounce::new();
        for _ in 0..1000 {
            bounce.advance(0.01, 0);
            assert!(bounce.offset(0.01).abs() <= 0.01 + 1e-6);
        }
    }

    #[test]
    fn test_short_axes_still_rotate() {
        let mesh = build_dodecahedron(Vector3::zeros(), Vector3::new(1e-4, 0.0, 0.0), 0.0);
        assert!(mesh.is_ok());

        let mut matrix = Matrix4::identity();
        rotate_about(&mut matrix, std::f32::consts::FRAC_PI_2, &Vector3::new(3e-4, 0.0, 0.0)).unwrap();
        let expected = Rotation3::from_axis_angle(&Vector3::x_axis(), std::f32::consts::FRAC_PI_2);
        assert_matrix_eq(&matrix, &expected.to_homogeneous());

        assert!(rotate_about(&mut matrix, 1.0, &Vector3::new(1e-7, 0.0, 0.0)).is_err());
    }

    #[test]
    fn test_approach_moves_along_world_z() {
        let config = AnimationConfig::default();
        let mut mesh = build_dodecahedron(Vector3::new(0.5, 1.0, -8.0), Vector3::y(), 0.0).unwrap();
        // Spin it first so a local-frame shift would leave the z axis.
        update(&mut mesh, 1000.0, &config);
        let rotated = mesh.transform.fixed_view::<3, 3>(0, 0).into_owned();

        mesh.motion = Motion::approach(0.03).unwrap();
        for frame in 1..=100 {
            update(&mut mesh, 1000.0 + 16.0 * frame as f64, &config);
        }

        let translation = mesh.translation();
        assert!((translation.z - (-8.0 + 100.0 * 0.03)).abs() < 1e-4);
        assert!((translation.x - 0.5).abs() < 1e-6);
        assert!((translation.y - 1.0).abs() < 1e-6);
        assert_eq!(mesh.transform.fixed_view::<3, 3>(0, 0).into_owned(), rotated);
    }

    #[test]
    fn test_approach_step_must_be_finite() {
        assert!(Motion::approach(f32::NAN).is_err());
        assert_eq!(Motion::approach(0.03), Ok(Motion::Approach { step: 0.03 }));
    }
}
