//! Scene configuration.
//!
//! The effect is configured once at startup from a JSON document holding the
//! ordered scene list and optional overrides of the effect settings:
//!
//! ```json
//! {
//!   "settings": { "trail_max_age": 70 },
//!   "scenes": [
//!     { "asset": { "image": "img/1.jpg" }, "quote": "Hello", "threshold": 20,
//!       "random": 4.0, "depth": 1.5, "size": 2.0, "shape": "circle" },
//!     { "asset": { "video": "video/waves" }, "quote": "Waves", "threshold": 0,
//!       "random": 1.0, "depth": 2.0, "max_depth": 60.0, "size": 1.0,
//!       "shape": "square", "legacy_mask": true }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Depth reached by transition pulses when a scene sets no `max_depth`.
pub const DEFAULT_MAX_DEPTH: f32 = 30.0;

/// Where a scene's pixels come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneAsset {
    /// A still image file.
    Image(PathBuf),
    /// A directory of numbered frames played as a video.
    Video(PathBuf),
}

impl SceneAsset {
    /// Whether this asset is video-backed.
    pub fn is_video(&self) -> bool {
        matches!(self, SceneAsset::Video(_))
    }

    /// Path of the file or frame directory.
    pub fn path(&self) -> &Path {
        match self {
            SceneAsset::Image(p) | SceneAsset::Video(p) => p,
        }
    }
}

/// Particle sprite shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeMode {
    /// Soft round sprites.
    #[default]
    Circle,
    /// Nearly opaque square sprites.
    Square,
}

impl ShapeMode {
    /// Lower smoothstep edge used by the fragment mask.
    pub fn edge(self) -> f32 {
        match self {
            ShapeMode::Circle => 0.0,
            ShapeMode::Square => 1.0,
        }
    }
}

/// One navigable scene. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescriptor {
    /// Position in the scene list. Filled in when omitted.
    #[serde(default)]
    pub index: usize,
    pub asset: SceneAsset,
    /// Caption shown while the scene is active. May contain inline markup.
    #[serde(default)]
    pub quote: String,
    /// Red-channel threshold; pixels strictly above it become particles.
    pub threshold: u8,
    /// Jitter magnitude.
    pub random: f32,
    /// Resting depth magnitude.
    pub depth: f32,
    /// Depth reached by transition and click pulses.
    #[serde(default)]
    pub max_depth: Option<f32>,
    /// Point size multiplier.
    pub size: f32,
    #[serde(default)]
    pub shape: ShapeMode,
    /// Apply the last computed image mask on top of this (video) scene.
    #[serde(default)]
    pub legacy_mask: bool,
}

impl SceneDescriptor {
    /// Peak depth for pulses.
    pub fn max_depth(&self) -> f32 {
        self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH)
    }

    /// Caption text with inline markup removed.
    pub fn plain_quote(&self) -> String {
        strip_markup(&self.quote)
    }
}

/// Remove `<...>` tags from caption markup.
pub fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Tunable constants of the effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
    /// Grid width shared by every scene after the first.
    pub working_width: u32,
    /// Grid height shared by every scene after the first.
    pub working_height: u32,
    /// Side length of the trail raster in texels.
    pub trail_size: u32,
    /// Trail point lifetime in ticks.
    pub trail_max_age: u32,
    /// Blob radius as a fraction of the trail raster size.
    pub trail_radius: f32,
    /// Minimum time between accepted scene transitions.
    pub navigation_debounce_ms: u64,
    /// Minimum time between accepted pointer samples.
    pub pointer_throttle_ms: u64,
    /// Exponential smoothing factor for mesh rotation, in (0, 1).
    pub rotation_speed: f32,
    /// Divisor from pointer NDC to target rotation (higher = subtler).
    pub rotation_factor: f32,
    /// Target interval between updates in seconds.
    pub frame_interval: f32,
    /// Vertical field of view in degrees.
    pub camera_fov_deg: f32,
    /// Camera distance from the particle plane.
    pub camera_distance: f32,
    /// Playback rate of image-sequence videos.
    pub video_frame_rate: f32,
}

impl EffectSettings {
    /// Navigation debounce window.
    pub fn navigation_debounce(&self) -> Duration {
        Duration::from_millis(self.navigation_debounce_ms)
    }

    /// Pointer sampling throttle window.
    pub fn pointer_throttle(&self) -> Duration {
        Duration::from_millis(self.pointer_throttle_ms)
    }
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            working_width: 250,
            working_height: 145,
            trail_size: 80,
            trail_max_age: 70,
            trail_radius: 0.08,
            navigation_debounce_ms: 300,
            pointer_throttle_ms: 16,
            rotation_speed: 0.08,
            rotation_factor: 25.0,
            frame_interval: 1.0 / 60.0,
            camera_fov_deg: 50.0,
            camera_distance: 180.0,
            video_frame_rate: 30.0,
        }
    }
}

#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    settings: EffectSettings,
    scenes: Vec<RawScene>,
}

#[derive(Deserialize)]
struct RawScene {
    #[serde(default)]
    index: Option<usize>,
    #[serde(flatten)]
    scene: SceneDescriptor,
}

/// The complete startup configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectConfig {
    pub settings: EffectSettings,
    scenes: Vec<SceneDescriptor>,
}

impl EffectConfig {
    /// Build a configuration from an in-memory scene list.
    pub fn new(settings: EffectSettings, scenes: Vec<SceneDescriptor>) -> Result<Self, ConfigError> {
        if scenes.is_empty() {
            return Err(ConfigError::NoScenes);
        }
        let scenes = scenes
            .into_iter()
            .enumerate()
            .map(|(position, mut scene)| {
                scene.index = position;
                scene
            })
            .collect();
        Ok(Self { settings, scenes })
    }

    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(json)?;
        let mut scenes = Vec::with_capacity(raw.scenes.len());
        for (position, raw_scene) in raw.scenes.into_iter().enumerate() {
            if let Some(index) = raw_scene.index {
                if index != position {
                    return Err(ConfigError::IndexMismatch { position, index });
                }
            }
            scenes.push(raw_scene.scene);
        }
        Self::new(raw.settings, scenes)
    }

    /// Load a JSON configuration file.
    ///
    /// Relative asset paths are resolved against the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let mut config = Self::from_json_str(&json)?;
        if let Some(base) = path.parent() {
            for scene in &mut config.scenes {
                scene.asset = match &scene.asset {
                    SceneAsset::Image(p) if p.is_relative() => SceneAsset::Image(base.join(p)),
                    SceneAsset::Video(p) if p.is_relative() => SceneAsset::Video(base.join(p)),
                    other => other.clone(),
                };
            }
        }
        log::info!(
            "loaded {} scenes from {}",
            config.scenes.len(),
            path.display()
        );
        Ok(config)
    }

    /// The ordered scene list (never empty).
    pub fn scenes(&self) -> &[SceneDescriptor] {
        &self.scenes
    }
}
