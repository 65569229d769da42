//! Decoded RGBA rasters.
//!
//! A [`Raster`] is the common currency between asset loading, mask
//! extraction and texture upload. Rows are stored top-down, exactly as the
//! image decoder produces them; consumers that need the bottom-up texture
//! convention (mask extraction, GPU upload) flip explicitly.
//!
//! # Example
//!
//! ```ignore
//! // 2x2 image: red, black / white, dark grey
//! let raster = Raster::from_rgba(vec![
//!     255, 0, 0, 255,   0, 0, 0, 255,
//!     255, 255, 255, 255,   10, 10, 10, 255,
//! ], 2, 2)?;
//! assert_eq!(raster.pixel(0, 0), [255, 0, 0, 255]);
//! ```

use std::path::Path;

use image::{imageops, RgbaImage};

use crate::error::AssetError;

/// A decoded image: raw RGBA bytes plus dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    /// Raw RGBA pixel data (width * height * 4 bytes), rows top-down.
    data: Vec<u8>,
    /// Width in pixels.
    width: u32,
    /// Height in pixels.
    height: u32,
}

impl Raster {
    /// Create a raster from raw RGBA data.
    ///
    /// Fails with [`AssetError::Dimensions`] when `data` is not exactly
    /// `width * height * 4` bytes.
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Result<Self, AssetError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(AssetError::Dimensions {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, width, height })
    }

    /// Take ownership of a decoded `image` buffer.
    pub fn from_image(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            data: img.into_raw(),
            width,
            height,
        }
    }

    /// Decode an image file (PNG or JPEG).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let img = image::open(path.as_ref())?.into_rgba8();
        Ok(Self::from_image(img))
    }

    /// Create a solid color raster.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self { data, width, height }
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total pixel count.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Raw RGBA bytes, rows top-down.
    #[inline]
    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }

    /// Mutable RGBA bytes, rows top-down. The length is fixed.
    #[inline]
    pub fn as_rgba_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// RGBA value at column `x`, row `y` (row 0 is the top of the image).
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Copy the pixels into `out` with the row order reversed (top row last).
    ///
    /// `out` is cleared first and keeps its capacity, so a buffer reused
    /// across calls stops allocating once it has grown to the largest raster.
    pub fn flip_rows_into(&self, out: &mut Vec<u8>) {
        let row = self.width as usize * 4;
        out.clear();
        out.reserve(self.data.len());
        for chunk in self.data.chunks_exact(row.max(1)).rev() {
            out.extend_from_slice(chunk);
        }
    }

    /// A copy resampled to `width` x `height`, or a clone when the size already matches.
    pub fn resized(&self, width: u32, height: u32) -> Self {
        if width == self.width && height == self.height {
            return self.clone();
        }
        match RgbaImage::from_raw(self.width, self.height, self.data.clone()) {
            Some(img) => Self::from_image(imageops::resize(
                &img,
                width,
                height,
                imageops::FilterType::Triangle,
            )),
            // Unreachable: the constructors guarantee the buffer length.
            None => Self::solid(width, height, [0, 0, 0, 0]),
        }
    }
}
