//! The drawing seam.
//!
//! The effect talks to the GPU only through [`Renderer`]. The wgpu
//! implementation lives in [`crate::gpu::GpuRenderer`]; tests substitute a
//! recording implementation.

use glam::Mat4;

use crate::error::RenderError;
use crate::particles::ParticleInstance;
use crate::textures::Raster;
use crate::uniforms::{ParticleUniforms, RenderParams};

/// Everything needed to draw one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub params: RenderParams,
    /// Mesh transform (translation, rotation, fit scale).
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

impl FrameState {
    /// Combined model-view matrix.
    pub fn model_view(&self) -> Mat4 {
        self.view * self.model
    }

    /// Pack for the uniform buffer.
    pub fn uniforms(&self) -> ParticleUniforms {
        ParticleUniforms::new(&self.params, self.model_view(), self.projection)
    }
}

/// Receives scene data and draws frames.
pub trait Renderer {
    /// Replace the instance buffer with a freshly built particle field.
    fn upload_field(&mut self, instances: &[ParticleInstance]);

    /// Replace the scene texture. `raster` rows are top-down.
    fn set_texture(&mut self, raster: &Raster);

    /// Replace the trail texture. `raster` rows are top-down.
    fn update_trail(&mut self, raster: &Raster);

    /// The output surface changed size.
    fn resize(&mut self, width: u32, height: u32);

    /// Draw one frame.
    fn render(&mut self, frame: &FrameState) -> Result<(), RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_model_view_order() {
        let frame = FrameState {
            params: RenderParams::default(),
            model: Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)),
            view: Mat4::from_scale(Vec3::splat(2.0)),
            projection: Mat4::IDENTITY,
        };
        let p = frame.model_view().transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(frame.uniforms().model_view, frame.model_view().to_cols_array_2d());
    }
}
