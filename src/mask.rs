//! Visibility mask extraction.
//!
//! A [`PixelMask`] decides which source pixels become particles. The source
//! raster is mirrored vertically before sampling so that linear pixel index
//! `i` addresses row `i / width` counted from the *bottom* of the image,
//! which is the row order the particle shader uses for texture coordinates.
//!
//! A pixel is visible when its red channel is strictly greater than the
//! scene threshold.

use crate::textures::Raster;

/// Per-pixel visibility for one scene.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelMask {
    width: u32,
    height: u32,
    threshold: u8,
    visible: Vec<bool>,
    visible_count: usize,
}

impl PixelMask {
    /// Extract the mask of a decoded raster.
    ///
    /// The raster is given in decoder (top-down) row order.
    pub fn extract(raster: &Raster, threshold: u8) -> Self {
        let width = raster.width();
        let height = raster.height();
        let row_bytes = width as usize * 4;

        let mut visible = Vec::with_capacity(raster.pixel_count());
        // Walk rows bottom-up: equivalent to sampling the mirrored image.
        for row in raster.as_rgba().chunks_exact(row_bytes.max(1)).rev() {
            visible.extend(row.chunks_exact(4).map(|px| px[0] > threshold));
        }
        let visible_count = visible.iter().filter(|v| **v).count();

        log::debug!(
            "pixel mask {}x{} threshold {}: {} of {} visible",
            width,
            height,
            threshold,
            visible_count,
            visible.len()
        );

        Self {
            width,
            height,
            threshold,
            visible,
            visible_count,
        }
    }

    /// Mask width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Threshold the mask was computed with.
    #[inline]
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Total pixel count (`width * height`).
    #[inline]
    pub fn total(&self) -> usize {
        self.visible.len()
    }

    /// Number of visible pixels.
    #[inline]
    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    /// Visibility of linear pixel index `index`, or `None` past the end.
    #[inline]
    pub fn get(&self, index: usize) -> Option<bool> {
        self.visible.get(index).copied()
    }

    /// Visibility of linear pixel index `index`. Out-of-range indices are not visible.
    #[inline]
    pub fn is_visible(&self, index: usize) -> bool {
        self.get(index).unwrap_or(false)
    }

    /// The visibility flags, one per pixel.
    pub fn as_slice(&self) -> &[bool] {
        &self.visible
    }
}
