//! Pointer trail.
//!
//! Pointer samples (UV positions on the particle plane) are kept as aging
//! points. Every tick the offscreen canvas is cleared to black and each live
//! point is painted as a soft white radial blob whose radius follows an
//! ease-in/ease-out envelope over the point's lifetime. The canvas is then
//! uploaded as a texture and its red channel pushes particles around.
//!
//! # Example
//!
//! ```ignore
//! let mut trail = PointerTrail::new(TrailSettings::default());
//! trail.push_sample(Vec2::new(0.5, 0.5));
//! trail.tick();
//! let mut raster = Raster::solid(80, 80, [0, 0, 0, 255]);
//! trail.canvas().write_into(&mut raster);
//! renderer.update_trail(&raster);
//! ```

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;

use crate::config::EffectSettings;
use crate::textures::Raster;

/// Peak opacity at a blob's core.
const BLOB_ALPHA: f32 = 0.2;

/// Fraction of the blob radius painted at full core opacity.
const BLOB_CORE: f32 = 0.25;

/// Scale applied to the squared sample distance before capping at 1.
const FORCE_SCALE: f32 = 10_000.0;

/// Fraction of the lifetime spent growing.
const GROW_PHASE: f32 = 0.3;

/// Trail tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSettings {
    /// Canvas side length in texels.
    pub size: u32,
    /// Lifetime of a point in ticks.
    pub max_age: u32,
    /// Blob radius as a fraction of `size`.
    pub radius: f32,
}

impl Default for TrailSettings {
    fn default() -> Self {
        Self {
            size: 80,
            max_age: 70,
            radius: 0.08,
        }
    }
}

impl From<&EffectSettings> for TrailSettings {
    fn from(settings: &EffectSettings) -> Self {
        Self {
            size: settings.trail_size,
            max_age: settings.trail_max_age,
            radius: settings.trail_radius,
        }
    }
}

/// One pointer sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    /// Position on the plane, each axis in `[0, 1]`.
    pub uv: Vec2,
    /// Ticks since the sample was taken.
    pub age: u32,
    /// Movement strength in `[0, 1]`.
    pub force: f32,
}

/// Single-channel offscreen canvas, rows top-down.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailCanvas {
    size: u32,
    values: Vec<f32>,
}

impl TrailCanvas {
    /// A black canvas of `size` x `size` texels.
    pub fn new(size: u32) -> Self {
        Self {
            size,
            values: vec![0.0; size as usize * size as usize],
        }
    }

    /// Side length in texels.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Fill with black.
    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Intensity at texel (`x`, `y`), row 0 at the top.
    pub fn value(&self, x: u32, y: u32) -> f32 {
        self.values[y as usize * self.size as usize + x as usize]
    }

    /// Composite a white radial gradient centred at `center` (texel units).
    ///
    /// Opacity is `BLOB_ALPHA` inside `BLOB_CORE * radius`, falling linearly
    /// to zero at `radius`. Blending is source-over onto the current value.
    pub fn paint_blob(&mut self, center: Vec2, radius: f32) {
        if radius <= 0.0 || self.size == 0 {
            return;
        }
        let inner = radius * BLOB_CORE;
        let max = (self.size - 1) as f32;
        let x0 = (center.x - radius).floor().clamp(0.0, max) as u32;
        let x1 = (center.x + radius).ceil().clamp(0.0, max) as u32;
        let y0 = (center.y - radius).floor().clamp(0.0, max) as u32;
        let y1 = (center.y + radius).ceil().clamp(0.0, max) as u32;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let texel = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let d = texel.distance(center);
                if d >= radius {
                    continue;
                }
                let falloff = if d <= inner {
                    1.0
                } else {
                    1.0 - (d - inner) / (radius - inner)
                };
                let alpha = BLOB_ALPHA * falloff;
                let v = &mut self.values[y as usize * self.size as usize + x as usize];
                *v = alpha + *v * (1.0 - alpha);
            }
        }
    }

    /// Write the canvas into `raster` as opaque grey, in place.
    ///
    /// A raster of the wrong size is replaced by a square one first; after
    /// that every call reuses its buffer.
    pub fn write_into(&self, raster: &mut Raster) {
        if raster.width() != self.size || raster.height() != self.size {
            *raster = Raster::solid(self.size, self.size, [0, 0, 0, 255]);
        }
        for (px, &v) in raster.as_rgba_mut().chunks_exact_mut(4).zip(&self.values) {
            let g = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
            px.copy_from_slice(&[g, g, g, 255]);
        }
    }
}

/// Lifetime envelope in `[0, 1]`: sine ease-in to the peak at 30% of
/// `max_age`, sine ease-out to zero at `max_age`.
pub fn envelope(age: u32, max_age: u32) -> f32 {
    let age = age as f32;
    let max_age = max_age.max(1) as f32;
    let peak = GROW_PHASE * max_age;
    if age < peak {
        ((age / peak) * FRAC_PI_2).sin()
    } else {
        ((1.0 - (age - peak) / (max_age - peak)) * FRAC_PI_2).sin()
    }
}

/// Aging pointer samples plus the canvas they paint.
#[derive(Debug, Clone)]
pub struct PointerTrail {
    settings: TrailSettings,
    points: Vec<TrailPoint>,
    canvas: TrailCanvas,
    enabled: bool,
}

impl PointerTrail {
    pub fn new(settings: TrailSettings) -> Self {
        Self {
            settings,
            points: Vec::new(),
            canvas: TrailCanvas::new(settings.size),
            enabled: true,
        }
    }

    /// Live points, oldest first.
    pub fn points(&self) -> &[TrailPoint] {
        &self.points
    }

    pub fn canvas(&self) -> &TrailCanvas {
        &self.canvas
    }

    pub fn settings(&self) -> TrailSettings {
        self.settings
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the trail. Disabling drops every point and blanks the canvas.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.clear();
        }
    }

    /// Drop every point and blank the canvas.
    pub fn clear(&mut self) {
        self.points.clear();
        self.canvas.clear();
    }

    /// Record a pointer sample at `uv`.
    ///
    /// Force is `min(10000 * d^2, 1)` where `d` is the distance to the
    /// previous live point, or 0 when there is none.
    pub fn push_sample(&mut self, uv: Vec2) {
        if !self.enabled {
            return;
        }
        let force = match self.points.last() {
            Some(last) => (last.uv.distance_squared(uv) * FORCE_SCALE).min(1.0),
            None => 0.0,
        };
        self.points.push(TrailPoint { uv, age: 0, force });
    }

    /// Advance one tick: clear, age, expire and repaint.
    pub fn tick(&mut self) {
        self.canvas.clear();
        let max_age = self.settings.max_age;
        self.points.retain_mut(|p| {
            p.age += 1;
            p.age <= max_age
        });

        let size = self.settings.size as f32;
        for p in &self.points {
            let intensity = envelope(p.age, max_age) * p.force;
            let radius = size * self.settings.radius * intensity;
            let center = Vec2::new(p.uv.x * size, (1.0 - p.uv.y) * size);
            self.canvas.paint_blob(center, radius);
        }
    }
}
