//! # pixelfield - image-to-particle transition effect
//!
//! Turns images and image-sequence videos into GPU point clouds. Every
//! visible pixel becomes a particle that is displaced by noise, scaled by
//! its brightness and pushed toward the camera where a pointer heat trail
//! passes over it. Scenes cross-fade through tweened depth pulses, a
//! caption swap and a short spin.
//!
//! ## Quick Start
//!
//! ```ignore
//! use pixelfield::prelude::*;
//!
//! fn main() -> Result<(), EffectError> {
//!     let config = EffectConfig::load("scenes.json")?;
//!     Viewer::new(config).with_title("pixelfield").run()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Scenes
//!
//! A scene is one [`SceneDescriptor`]: an image file or a frame directory,
//! a caption, a visibility threshold and the displacement parameters.
//! Scenes are listed in a JSON document loaded by [`EffectConfig::load`].
//!
//! ### Particles
//!
//! [`PixelMask::extract`] decides which pixels of an image are visible and
//! [`ParticleField::build`] emits one [`ParticleInstance`] per visible
//! pixel. Video scenes use every pixel.
//!
//! ### Driving the effect
//!
//! [`Effect`] owns all mutable state and is driven by two calls: raw input
//! through [`Effect::handle_event`] and time through [`Effect::frame`]. It
//! draws through the [`Renderer`] trait and animates through the
//! [`TweenScheduler`] trait, so both can be swapped in tests.
//!
//! ```ignore
//! let mut effect = Effect::new(&config, (1280, 720), renderer, Tweener::new());
//! effect.provide_asset(0, FileLoader::new(&config.settings).load(&config.scenes()[0])?);
//! effect.handle_event(RawEvent::KeyDown(Key::Right), Instant::now());
//! effect.frame(1.0 / 60.0)?;
//! ```
//!
//! ## Controls
//!
//! | Input | Effect |
//! |-------|--------|
//! | Pointer / touch move | Tilts the mesh and paints the trail |
//! | Left / Right arrow | Previous / next scene |
//! | Click | Depth pulse on the current scene |

pub mod assets;
pub mod config;
pub mod effect;
pub mod error;
pub mod gpu;
pub mod input;
pub mod kernel;
pub mod mask;
pub mod particles;
pub mod picking;
pub mod renderer;
pub mod rotation;
pub mod shader;
pub mod textures;
pub mod time;
pub mod trail;
pub mod transition;
pub mod tween;
pub mod uniforms;
mod window;

pub use assets::{AssetLibrary, AssetLoader, FileLoader, FrameSequence, LoadedAsset, VideoSource};
pub use config::{EffectConfig, EffectSettings, SceneAsset, SceneDescriptor, ShapeMode};
pub use effect::{Caption, Effect, MeshTransform};
pub use error::{AssetError, ConfigError, EffectError, GpuError, RenderError};
pub use glam::{Vec2, Vec3};
pub use gpu::GpuRenderer;
pub use input::{InputRouter, Intent, Key, RawEvent, Viewport};
pub use mask::PixelMask;
pub use particles::{FieldSource, ParticleField, ParticleInstance};
pub use renderer::{FrameState, Renderer};
pub use textures::Raster;
pub use trail::{PointerTrail, TrailSettings};
pub use tween::{Ease, Tween, TweenScheduler, Tweener};
pub use uniforms::RenderParams;
pub use window::Viewer;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use pixelfield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::assets::{AssetLoader, FileLoader, LoadedAsset};
    pub use crate::config::{EffectConfig, EffectSettings, SceneDescriptor};
    pub use crate::effect::Effect;
    pub use crate::error::{EffectError, RenderError};
    pub use crate::input::{Key, RawEvent};
    pub use crate::renderer::{FrameState, Renderer};
    pub use crate::tween::{TweenScheduler, Tweener};
    pub use crate::window::Viewer;
    pub use crate::{Vec2, Vec3};
}
