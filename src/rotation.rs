//! Pointer-driven mesh tilt.
//!
//! The pointer sets a target rotation; each tick the current rotation moves
//! a fixed fraction of the way toward it.

use glam::Vec2;

/// Exponentially smoothed rotation about the x and y axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationSmoother {
    /// Target rotation (x, y) in radians.
    pub target: Vec2,
    /// Current rotation (x, y) in radians.
    pub current: Vec2,
    /// Fraction of the remaining distance covered per tick, in (0, 1).
    speed: f32,
    /// Divisor from pointer NDC to radians.
    factor: f32,
}

impl RotationSmoother {
    pub fn new(speed: f32, factor: f32) -> Self {
        Self {
            target: Vec2::ZERO,
            current: Vec2::ZERO,
            speed: speed.clamp(f32::EPSILON, 1.0),
            factor,
        }
    }

    /// Aim at a pointer position in normalized device coordinates.
    ///
    /// Horizontal pointer movement turns the mesh about y, vertical
    /// movement tilts it about x.
    pub fn set_target_from_ndc(&mut self, ndc: Vec2) {
        self.target = Vec2::new(-ndc.y / self.factor, ndc.x / self.factor);
    }

    /// Advance one tick and return the new rotation.
    pub fn step(&mut self) -> Vec2 {
        self.current += (self.target - self.current) * self.speed;
        self.current
    }

    /// Snap back to rest.
    pub fn reset(&mut self) {
        self.target = Vec2::ZERO;
        self.current = Vec2::ZERO;
    }
}

impl Default for RotationSmoother {
    fn default() -> Self {
        Self::new(0.08, 25.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_from_ndc() {
        let mut r = RotationSmoother::default();
        r.set_target_from_ndc(Vec2::new(1.0, 0.5));
        assert_eq!(r.target, Vec2::new(-0.02, 0.04));
    }

    #[test]
    fn test_converges_without_overshoot() {
        let mut r = RotationSmoother::default();
        r.set_target_from_ndc(Vec2::new(1.0, -1.0));
        let target = r.target;
        let mut prev = 0.0;
        for _ in 0..200 {
            let cur = r.step();
            assert!(cur.y >= prev);
            assert!(cur.y <= target.y + 1e-7);
            assert!(cur.x <= target.x + 1e-7);
            prev = cur.y;
        }
        assert!((r.current - target).length() < 1e-5);
    }

    #[test]
    fn test_first_step_covers_speed_fraction() {
        let mut r = RotationSmoother::new(0.5, 1.0);
        r.target = Vec2::new(2.0, 4.0);
        assert_eq!(r.step(), Vec2::new(1.0, 2.0));
    }
}
