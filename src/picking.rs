//! Pointer picking against the invisible hit plane.
//!
//! The hit plane sits at z = 0, centred on the origin, and spans the
//! particle grid at the current fit scale. A pointer ray that hits it
//! yields a UV in `[0, 1]^2` with v increasing upward.

use glam::{Vec2, Vec3};

/// A world-space ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

/// Axis-aligned rectangle in the z = 0 plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickPlane {
    /// Grid width in particles.
    pub width: f32,
    /// Grid height in particles.
    pub height: f32,
    /// Fit scale applied to both axes.
    pub scale: f32,
}

impl PickPlane {
    pub fn new(width: f32, height: f32, scale: f32) -> Self {
        Self {
            width,
            height,
            scale,
        }
    }

    /// World-space extent.
    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.width, self.height) * self.scale
    }

    /// UV of the point where `ray` meets the plane, or `None` on a miss.
    pub fn intersect(&self, ray: &Ray) -> Option<Vec2> {
        if ray.direction.z.abs() < 1e-6 {
            return None;
        }
        let t = -ray.origin.z / ray.direction.z;
        if t < 0.0 {
            return None;
        }
        let hit = ray.origin + ray.direction * t;
        let extent = self.extent();
        if extent.x <= 0.0 || extent.y <= 0.0 {
            return None;
        }
        let uv = Vec2::new(hit.x / extent.x + 0.5, hit.y / extent.y + 0.5);
        if (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y) {
            Some(uv)
        } else {
            None
        }
    }
}
