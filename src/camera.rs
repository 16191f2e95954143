//! Perspective camera with fixed and drifting presets.

use glam::{Mat4, Vec3};

use crate::params::{CameraPreset, DriftCamera, FixedCamera, RenderConfig};

/// Camera system producing view and projection matrices
pub struct CameraSystem {
    preset: CameraPreset,
    aspect_ratio: f32,
}

impl CameraSystem {
    /// Create new camera system with specified preset
    pub fn new(preset: CameraPreset, render_config: &RenderConfig) -> Self {
        Self {
            preset,
            aspect_ratio: render_config.aspect_ratio(),
        }
    }

    /// Follow the viewport after a resize
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect_ratio = width as f32 / height.max(1) as f32;
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Compute camera position and look-at target for given time
    ///
    /// # Returns
    /// Tuple of (eye_position, target_position)
    pub fn compute_position_and_target(&self, time_s: f32) -> (Vec3, Vec3) {
        match &self.preset {
            CameraPreset::Fixed(params) => Self::compute_fixed(params),
            CameraPreset::Drift(params) => Self::compute_drift(params, time_s),
        }
    }

    fn compute_fixed(p: &FixedCamera) -> (Vec3, Vec3) {
        (Vec3::from_array(p.position), Vec3::from_array(p.target))
    }

    /// Sway sideways and bob vertically in front of the target
    fn compute_drift(p: &DriftCamera, time_s: f32) -> (Vec3, Vec3) {
        let tau = std::f32::consts::TAU;
        let target = Vec3::from_array(p.target);
        let x = (time_s * p.sway_freq_hz * tau).sin() * p.sway_amplitude;
        let y = (time_s * p.bob_freq_hz * tau).sin() * p.bob_amplitude;
        let eye = target + Vec3::new(x, y, p.distance);
        (eye, target)
    }

    /// Create view and projection matrices for rendering
    ///
    /// # Returns
    /// Tuple of (view, projection)
    pub fn view_and_projection(&self, time_s: f32, render_config: &RenderConfig) -> (Mat4, Mat4) {
        let (eye, target) = self.compute_position_and_target(time_s);

        // Always keep Y as up vector (camera never rolls)
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let proj = Mat4::perspective_rh(
            render_config.fov_degrees.to_radians(),
            self.aspect_ratio,
            render_config.near_plane,
            render_config.far_plane,
        );

        (view, proj)
    }
}
