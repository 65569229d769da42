//! Particle field construction.
//!
//! A [`ParticleField`] holds one instance per *visible* source pixel as three
//! parallel channels: grid offset, random angle and source pixel index. The
//! field is rebuilt wholesale whenever the active scene changes; it is never
//! patched in place.
//!
//! # Example
//!
//! ```ignore
//! let mask = PixelMask::extract(&raster, 20);
//! let field = ParticleField::build(FieldSource::Masked(&mask), &mut rand::thread_rng());
//! assert_eq!(field.len(), mask.visible_count());
//! renderer.upload_field(&field.instances());
//! ```

use std::f32::consts::PI;

use bytemuck::{Pod, Zeroable};
use rand::Rng;

use crate::mask::PixelMask;

/// Which pixels of a `width x height` grid become particles.
#[derive(Debug, Clone, Copy)]
pub enum FieldSource<'a> {
    /// Image scene: only pixels the mask marks visible.
    Masked(&'a PixelMask),
    /// Video scene: every pixel of the grid.
    Unmasked {
        /// Grid width in pixels.
        width: u32,
        /// Grid height in pixels.
        height: u32,
    },
    /// Video scene with an auxiliary mask applied by linear pixel index.
    ///
    /// Pixels beyond the mask's extent stay visible.
    Overlay {
        /// Grid width in pixels.
        width: u32,
        /// Grid height in pixels.
        height: u32,
        /// The last computed image mask.
        mask: &'a PixelMask,
    },
}

impl FieldSource<'_> {
    /// Grid dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        match *self {
            FieldSource::Masked(mask) => (mask.width(), mask.height()),
            FieldSource::Unmasked { width, height }
            | FieldSource::Overlay { width, height, .. } => (width, height),
        }
    }

    /// Whether linear pixel `index` becomes a particle.
    #[inline]
    pub fn includes(&self, index: usize) -> bool {
        match *self {
            FieldSource::Masked(mask) => mask.is_visible(index),
            FieldSource::Unmasked { .. } => true,
            FieldSource::Overlay { mask, .. } => mask.get(index).unwrap_or(true),
        }
    }
}

/// Per-instance vertex data as uploaded to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    /// Grid offset (x = column, y = row from the bottom, z = 0).
    pub offset: [f32; 3],
    /// Push direction in radians, `[0, PI)`.
    pub angle: f32,
    /// Source pixel index, used as the particle's noise seed.
    pub pindex: f32,
}

/// The instanced particle attribute set for one scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleField {
    width: u32,
    height: u32,
    offsets: Vec<[f32; 3]>,
    angles: Vec<f32>,
    indices: Vec<u32>,
}

impl ParticleField {
    /// Build the field for `source`.
    ///
    /// A counting pass sizes the output exactly; the write pass fills it.
    /// Angles are drawn independently per call from `rng`.
    pub fn build<R: Rng + ?Sized>(source: FieldSource<'_>, rng: &mut R) -> Self {
        let (width, height) = source.dimensions();
        let total = width as usize * height as usize;

        let count = (0..total).filter(|&i| source.includes(i)).count();

        let mut offsets = Vec::with_capacity(count);
        let mut angles = Vec::with_capacity(count);
        let mut indices = Vec::with_capacity(count);

        for i in (0..total).filter(|&i| source.includes(i)) {
            let w = width as usize;
            offsets.push([(i % w) as f32, (i / w) as f32, 0.0]);
            angles.push(rng.gen::<f32>() * PI);
            indices.push(i as u32);
        }

        debug_assert_eq!(offsets.len(), count);
        log::debug!("particle field {}x{}: {} instances", width, height, count);

        Self {
            width,
            height,
            offsets,
            angles,
            indices,
        }
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the field has no particles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Grid width the field was built for.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height the field was built for.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Grid offsets.
    pub fn offsets(&self) -> &[[f32; 3]] {
        &self.offsets
    }

    /// Random push angles.
    pub fn angles(&self) -> &[f32] {
        &self.angles
    }

    /// Source pixel indices.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Interleave the channels into GPU instance records.
    pub fn instances(&self) -> Vec<ParticleInstance> {
        self.offsets
            .iter()
            .zip(&self.angles)
            .zip(&self.indices)
            .map(|((offset, angle), index)| ParticleInstance {
                offset: *offset,
                angle: *angle,
                pindex: *index as f32,
            })
            .collect()
    }
}
