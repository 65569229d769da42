//! Shader parameters.
//!
//! [`RenderParams`] is the single value object holding every scene-driven
//! shader input. A scene change replaces it wholesale (see
//! [`RenderParams::for_scene`]), so no draw can ever see a mix of old and new
//! scene values. Only the clock and the animated depth are mutated between
//! scene changes.
//!
//! [`ParticleUniforms`] is the std140-compatible layout written to the GPU
//! uniform buffer each frame.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};

use crate::config::{SceneDescriptor, ShapeMode};

/// Scene-driven shader inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    /// Accumulated time in seconds.
    pub time: f32,
    /// Jitter magnitude in grid units.
    pub random: f32,
    /// Depth displacement magnitude.
    pub depth: f32,
    /// Point size multiplier.
    pub size: f32,
    /// Dimensions of the active texture / particle grid.
    pub texture_size: Vec2,
    /// Subtracted from the fragment mask; 0.0 = fully visible.
    pub alpha_circle: f32,
    /// Opacity for the square state.
    pub alpha_square: f32,
    /// Lower smoothstep edge of the fragment mask: 0.0 circles, 1.0 squares.
    pub circle_or_square: f32,
}

impl RenderParams {
    /// Parameters for `scene` on a grid of `texture_size`, starting the clock at `time`.
    pub fn for_scene(scene: &SceneDescriptor, texture_size: Vec2, time: f32) -> Self {
        Self {
            time,
            random: scene.random,
            depth: scene.depth,
            size: scene.size,
            texture_size,
            alpha_circle: 0.0,
            alpha_square: 1.0,
            circle_or_square: scene.shape.edge(),
        }
    }

    /// Shape mode selected by the current mask edge.
    pub fn shape(&self) -> ShapeMode {
        if self.circle_or_square >= 0.5 {
            ShapeMode::Square
        } else {
            ShapeMode::Circle
        }
    }
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            time: 0.0,
            random: 3.0,
            depth: 0.0,
            size: 1.5,
            texture_size: Vec2::ONE,
            alpha_circle: 0.0,
            alpha_square: 1.0,
            circle_or_square: 0.0,
        }
    }
}

/// GPU uniform block for the particle pipeline.
///
/// Field order matches `Uniforms` in the WGSL source.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleUniforms {
    pub model_view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub texture_size: [f32; 2],
    pub time: f32,
    pub random: f32,
    pub depth: f32,
    pub size: f32,
    pub alpha_circle: f32,
    pub alpha_square: f32,
    pub circle_or_square: f32,
    pub _padding: [f32; 3],
}

impl ParticleUniforms {
    /// Pack parameters and matrices for upload.
    pub fn new(params: &RenderParams, model_view: Mat4, projection: Mat4) -> Self {
        Self {
            model_view: model_view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            texture_size: params.texture_size.to_array(),
            time: params.time,
            random: params.random,
            depth: params.depth,
            size: params.size,
            alpha_circle: params.alpha_circle,
            alpha_square: params.alpha_square,
            circle_or_square: params.circle_or_square,
            _padding: [0.0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneAsset;

    fn scene(shape: ShapeMode) -> SceneDescriptor {
        SceneDescriptor {
            index: 0,
            asset: SceneAsset::Image("a.png".into()),
            quote: String::new(),
            threshold: 10,
            random: 2.0,
            depth: 1.25,
            max_depth: None,
            size: 0.5,
            shape,
            legacy_mask: false,
        }
    }

    #[test]
    fn test_for_scene_copies_descriptor() {
        let p = RenderParams::for_scene(&scene(ShapeMode::Square), Vec2::new(250.0, 145.0), 3.5);
        assert_eq!(p.time, 3.5);
        assert_eq!(p.random, 2.0);
        assert_eq!(p.depth, 1.25);
        assert_eq!(p.size, 0.5);
        assert_eq!(p.circle_or_square, 1.0);
        assert_eq!(p.shape(), ShapeMode::Square);
        assert_eq!(p.texture_size, Vec2::new(250.0, 145.0));
    }

    #[test]
    fn test_uniform_block_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<ParticleUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<ParticleUniforms>(), 176);
    }
}
