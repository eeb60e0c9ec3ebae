/// Spinning perspective camera driven by a frame counter
use nalgebra::Matrix4;
use tracing::debug;

use crate::transform::{RotationState, Transform};

/// Used whenever the display reports an unusable refresh rate
pub const DEFAULT_REFRESH_RATE_HZ: f32 = 60.0;

/// Fixed camera parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    /// Vertical field of view
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Distance the model is pushed away from the eye along -Z
    pub eye_distance: f32,
    /// Rotation speed about each axis, per second of display refreshes
    pub degrees_per_second: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 0.1,
            far: 100.0,
            eye_distance: 3.0,
            degrees_per_second: 100.0,
        }
    }
}

/// Derives the model-view-projection matrix for a given frame.
///
/// Holds no mutable state: the frame count is supplied by the caller, so the
/// same inputs always give the same matrix.
#[derive(Debug, Clone, Copy, Default)]
pub struct CameraAnimator {
    settings: CameraSettings,
}

impl CameraAnimator {
    pub fn new(settings: CameraSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Angle applied about each of the X, Y and Z axes, in degrees.
    pub fn rotation_degrees(&self, frame_count: u64, refresh_rate_hz: f32) -> f32 {
        let hz = f64::from(sanitize(refresh_rate_hz, DEFAULT_REFRESH_RATE_HZ, "refresh rate"));
        let degrees = f64::from(self.settings.degrees_per_second) * frame_count as f64 / hz;
        degrees.rem_euclid(360.0) as f32
    }

    pub fn projection_matrix(&self, viewport_aspect: f32) -> Matrix4<f32> {
        let aspect = sanitize(viewport_aspect, 1.0, "viewport aspect");
        Matrix4::new_perspective(
            aspect,
            self.settings.fov_degrees.to_radians(),
            self.settings.near,
            self.settings.far,
        )
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Transform::translation_matrix(0.0, 0.0, -self.settings.eye_distance)
    }

    pub fn model_matrix(&self, frame_count: u64, refresh_rate_hz: f32) -> Matrix4<f32> {
        let angle = self.rotation_degrees(frame_count, refresh_rate_hz).to_radians();
        Transform::rotation_matrix(&RotationState::uniform(angle))
    }

    /// Projection, then translation, then the X, Y and Z rotations.
    pub fn compute_matrix(
        &self,
        frame_count: u64,
        refresh_rate_hz: f32,
        viewport_aspect: f32,
    ) -> Matrix4<f32> {
        Transform::mvp_matrix(
            &self.model_matrix(frame_count, refresh_rate_hz),
            &self.view_matrix(),
            &self.projection_matrix(viewport_aspect),
        )
    }
}

/// [`CameraAnimator::compute_matrix`] with the default settings
pub fn compute_matrix(frame_count: u64, refresh_rate_hz: f32, viewport_aspect: f32) -> Matrix4<f32> {
    CameraAnimator::default().compute_matrix(frame_count, refresh_rate_hz, viewport_aspect)
}

/// Width over height, or 1.0 for a collapsed viewport.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    if width == 0 || height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

fn sanitize(value: f32, fallback: f32, what: &str) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        debug!("Unusable {} {}, using {}", what, value, fallback);
        fallback
    }
}

/// Number of completed frames. Only ever moves forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCounter {
    frames: u64,
}

impl FrameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed frame.
    pub fn advance(&mut self) {
        self.frames += 1;
    }

    pub fn get(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Vector3, Vector4};

    fn expected(degrees: f32, aspect: f32) -> Matrix4<f32> {
        let angle = degrees.to_radians();
        Matrix4::new_perspective(aspect, 60.0f32.to_radians(), 0.1, 100.0)
            * Matrix4::new_translation(&Vector3::new(0.0, 0.0, -3.0))
            * Matrix4::new_rotation(Vector3::new(angle, 0.0, 0.0))
            * Matrix4::new_rotation(Vector3::new(0.0, angle, 0.0))
            * Matrix4::new_rotation(Vector3::new(0.0, 0.0, angle))
    }

    #[test]
    fn test_default_settings() {
        let settings = CameraSettings::default();
        assert_eq!(settings.fov_degrees, 60.0);
        assert!((settings.near - 0.1).abs() < 1e-6);
        assert_eq!(settings.far, 100.0);
        assert_eq!(settings.eye_distance, 3.0);
    }

    #[test]
    fn test_matrix_is_deterministic() {
        let a = compute_matrix(1234, 59.94, 4.0 / 3.0);
        let b = compute_matrix(1234, 59.94, 4.0 / 3.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_frame_zero_has_no_rotation() {
        let aspect = 4.0 / 3.0;
        let matrix = compute_matrix(0, 60.0, aspect);
        let no_rotation = Matrix4::new_perspective(aspect, 60.0f32.to_radians(), 0.1, 100.0)
            * Matrix4::new_translation(&Vector3::new(0.0, 0.0, -3.0));
        assert!((matrix - no_rotation).norm() < 1e-6);
    }

    #[test]
    fn test_sixty_frames_at_sixty_hz() {
        let mut counter = FrameCounter::new();
        for _ in 0..60 {
            counter.advance();
        }
        assert_eq!(counter.get(), 60);

        let camera = CameraAnimator::default();
        assert_eq!(camera.rotation_degrees(counter.get(), 60.0), 100.0);

        let matrix = camera.compute_matrix(counter.get(), 60.0, 1.5);
        assert!((matrix - expected(100.0, 1.5)).norm() < 1e-5);
    }

    #[test]
    fn test_rotation_scales_with_refresh_rate() {
        let camera = CameraAnimator::default();
        assert!((camera.rotation_degrees(30, 120.0) - 25.0).abs() < 1e-6);
        assert!((camera.rotation_degrees(144, 144.0) - 100.0).abs() < 1e-4);
        // Wrapped into a single turn
        assert!((camera.rotation_degrees(288, 60.0) - 120.0).abs() < 1e-4);
    }

    #[test]
    fn test_origin_lands_in_front_of_camera() {
        let matrix = compute_matrix(17, 60.0, 1.0);
        let clip = matrix * Vector4::new(0.0, 0.0, 0.0, 1.0);
        // Clip w equals the eye-space depth
        assert!((clip.w - 3.0).abs() < 1e-5);
        assert!(clip.x.abs() < 1e-5 && clip.y.abs() < 1e-5);
    }

    #[test]
    fn test_unusable_inputs_fall_back() {
        let fallback = compute_matrix(90, DEFAULT_REFRESH_RATE_HZ, 1.0);
        assert_eq!(compute_matrix(90, 0.0, 1.0), fallback);
        assert_eq!(compute_matrix(90, -5.0, 1.0), fallback);
        assert_eq!(compute_matrix(90, f32::NAN, 1.0), fallback);
        assert_eq!(compute_matrix(90, 60.0, 0.0), fallback);
        assert_eq!(compute_matrix(90, 60.0, f32::INFINITY), fallback);
    }

    #[test]
    fn test_aspect_ratio() {
        assert!((aspect_ratio(640, 480) - 4.0 / 3.0).abs() < 1e-6);
        assert_eq!(aspect_ratio(0, 480), 1.0);
        assert_eq!(aspect_ratio(640, 0), 1.0);
    }

    #[test]
    fn test_custom_settings() {
        let camera = CameraAnimator::new(CameraSettings {
            eye_distance: 10.0,
            degrees_per_second: 50.0,
            ..CameraSettings::default()
        });
        assert_eq!(camera.rotation_degrees(60, 60.0), 50.0);
        let clip = camera.compute_matrix(0, 60.0, 1.0) * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((clip.w - 10.0).abs() < 1e-5);
    }
}
