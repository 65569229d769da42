//! Fixed perspective camera looking down -z at the particle plane.

use glam::{Mat4, Vec3, Vec4Swizzles};

use crate::picking::Ray;

/// Perspective camera on the z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Distance from the origin along +z.
    pub distance: f32,
    pub near: f32,
    pub far: f32,
    /// Viewport width / height.
    pub aspect: f32,
}

impl Camera {
    /// Create a camera with a field of view in degrees.
    pub fn new(fov_deg: f32, distance: f32, aspect: f32) -> Self {
        Self {
            fov_y: fov_deg.to_radians(),
            distance,
            near: 0.1,
            far: 10_000.0,
            aspect,
        }
    }

    /// Camera position in world space.
    pub fn position(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.distance)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), Vec3::ZERO, Vec3::Y)
    }

    /// Right-handed perspective projection with a [0, 1] depth range.
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect.max(f32::EPSILON), self.near, self.far)
    }

    /// Update the aspect ratio from a viewport size.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    /// World-space ray through a point in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc_x: f32, ndc_y: f32) -> Ray {
        let inv = (self.projection() * self.view_matrix()).inverse();
        let near = inv * glam::Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
        let far = inv * glam::Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let near = near.xyz() / near.w;
        let far = far.xyz() / far.w;
        Ray {
            origin: near,
            direction: (far - near).normalize(),
        }
    }

    /// Uniform mesh scale that fits a field of `field_height` rows to the view.
    ///
    /// Wide viewports get a small additional zoom, narrow ones a small
    /// shrink.
    pub fn fit_scale(&self, field_height: f32) -> f32 {
        let visible = 2.0 * (self.fov_y / 2.0).tan() * self.distance;
        let fudge = if self.aspect < 2.8 { -0.2 } else { 0.1 };
        visible / field_height.max(1.0) + fudge
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(50.0, 180.0, 16.0 / 9.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centre_ray_points_down_z() {
        let cam = Camera::default();
        let ray = cam.ray_from_ndc(0.0, 0.0);
        assert!(ray.direction.x.abs() < 1e-4);
        assert!(ray.direction.y.abs() < 1e-4);
        assert!(ray.direction.z < -0.99);
    }

    #[test]
    fn test_fit_scale_depends_on_aspect() {
        let mut cam = Camera::default();
        let visible = 2.0 * (25f32.to_radians()).tan() * 180.0;
        assert!((cam.fit_scale(145.0) - (visible / 145.0 - 0.2)).abs() < 1e-4);
        cam.set_viewport(3000, 1000);
        assert!((cam.fit_scale(145.0) - (visible / 145.0 + 0.1)).abs() < 1e-4);
    }

    #[test]
    fn test_origin_projects_to_centre() {
        let cam = Camera::default();
        let clip = cam.projection() * cam.view_matrix() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((clip.x / clip.w).abs() < 1e-6);
        assert!((clip.y / clip.w).abs() < 1e-6);
    }
}
