//! Fixed-angle viewing camera with wheel zoom.
//!
//! The tree group rotates under the camera, so the camera itself only moves
//! along its viewing ray.

use glam::{Mat4, Vec3};

/// Closest the camera may zoom in.
pub const MIN_DISTANCE: f32 = 12.0;
/// Furthest the camera may zoom out.
pub const MAX_DISTANCE: f32 = 90.0;
/// Distance change per wheel line, as a fraction of the current distance.
const ZOOM_STEP: f32 = 0.1;

/// Camera looking at the tree from a slight elevation.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Elevation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            pitch: 0.12,
            distance: 35.0,
            target: Vec3::ZERO,
            fov_y: 50.0_f32.to_radians(),
        }
    }

    pub fn position(&self) -> Vec3 {
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos();
        self.target + Vec3::new(0.0, y, z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Perspective projection for a viewport of the given aspect ratio.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect.max(f32::EPSILON), 0.1, 300.0)
    }

    /// Zoom by `lines` wheel lines; positive moves closer.
    pub fn zoom(&mut self, lines: f32) {
        let factor = (1.0 - ZOOM_STEP).powf(lines);
        self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
