//! Scene asset loading.
//!
//! Image scenes decode to a single [`Raster`]. Video scenes are directories
//! of numbered frames (`0001.png`, `0002.png`, ...) played back by a
//! [`FrameSequence`] at a fixed rate. Every scene after the first is
//! resampled to the shared working resolution when it is loaded.

use std::path::Path;

use crate::config::{EffectSettings, SceneAsset, SceneDescriptor};
use crate::error::AssetError;
use crate::textures::Raster;

/// A playing video.
pub trait VideoSource {
    /// Rewind to the first frame.
    fn restart(&mut self);

    /// Advance playback by `dt` seconds. Returns true when the frame changed.
    fn advance(&mut self, dt: f32) -> bool;

    /// The frame currently showing.
    fn frame(&self) -> &Raster;
}

/// Decoded frames played at a fixed rate, looping.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    frames: Vec<Raster>,
    frame_rate: f32,
    position: f32,
    current: usize,
}

impl FrameSequence {
    /// Wrap already decoded frames. All frames should share one size.
    pub fn new(frames: Vec<Raster>, frame_rate: f32) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }
        Some(Self {
            frames,
            frame_rate: frame_rate.max(f32::EPSILON),
            position: 0.0,
            current: 0,
        })
    }

    /// Decode every PNG/JPEG in `dir`, sorted by file name.
    pub fn load_dir<P: AsRef<Path>>(dir: P, frame_rate: f32) -> Result<Self, AssetError> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_frame = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
                .unwrap_or(false);
            if is_frame {
                paths.push(path);
            }
        }
        paths.sort();

        let frames = paths
            .iter()
            .map(Raster::from_file)
            .collect::<Result<Vec<_>, _>>()?;
        let seq = Self::new(frames, frame_rate)
            .ok_or_else(|| AssetError::EmptySequence(dir.to_path_buf()))?;
        log::debug!("decoded {} frames from {}", seq.frame_count(), dir.display());
        Ok(seq)
    }

    /// Resample every frame to `width` x `height`.
    pub fn resized(self, width: u32, height: u32) -> Self {
        Self {
            frames: self
                .frames
                .iter()
                .map(|f| f.resized(width, height))
                .collect(),
            ..self
        }
    }

    /// Number of frames. Never zero.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Index of the frame currently showing.
    pub fn current(&self) -> usize {
        self.current
    }
}

impl VideoSource for FrameSequence {
    fn restart(&mut self) {
        self.position = 0.0;
        self.current = 0;
    }

    fn advance(&mut self, dt: f32) -> bool {
        let duration = self.frames.len() as f32 / self.frame_rate;
        self.position = (self.position + dt.max(0.0)) % duration;
        let next = ((self.position * self.frame_rate) as usize).min(self.frames.len() - 1);
        let changed = next != self.current;
        self.current = next;
        changed
    }

    fn frame(&self) -> &Raster {
        &self.frames[self.current]
    }
}

/// A scene's decoded pixels.
pub enum LoadedAsset {
    Image(Raster),
    Video(Box<dyn VideoSource>),
}

impl LoadedAsset {
    /// The raster to show right now.
    pub fn raster(&self) -> &Raster {
        match self {
            LoadedAsset::Image(r) => r,
            LoadedAsset::Video(v) => v.frame(),
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, LoadedAsset::Video(_))
    }

    /// Grid dimensions this asset produces.
    pub fn dimensions(&self) -> (u32, u32) {
        let r = self.raster();
        (r.width(), r.height())
    }
}

impl std::fmt::Debug for LoadedAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (w, h) = self.dimensions();
        match self {
            LoadedAsset::Image(_) => write!(f, "Image({}x{})", w, h),
            LoadedAsset::Video(_) => write!(f, "Video({}x{})", w, h),
        }
    }
}

/// Decoded assets by scene index.
#[derive(Debug)]
pub struct AssetLibrary {
    slots: Vec<Option<LoadedAsset>>,
}

impl AssetLibrary {
    /// An empty library for `count` scenes.
    pub fn new(count: usize) -> Self {
        Self {
            slots: (0..count).map(|_| None).collect(),
        }
    }

    /// Store the asset for scene `index`. Returns false when `index` is out of range.
    pub fn insert(&mut self, index: usize, asset: LoadedAsset) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = Some(asset);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<&LoadedAsset> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut LoadedAsset> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    pub fn is_loaded(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Drop every asset.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }
}

/// Produces decoded assets for scenes.
pub trait AssetLoader {
    fn load(&mut self, scene: &SceneDescriptor) -> Result<LoadedAsset, AssetError>;
}

/// Loads assets from the filesystem.
#[derive(Debug, Clone)]
pub struct FileLoader {
    working_width: u32,
    working_height: u32,
    frame_rate: f32,
}

impl FileLoader {
    pub fn new(settings: &EffectSettings) -> Self {
        Self {
            working_width: settings.working_width,
            working_height: settings.working_height,
            frame_rate: settings.video_frame_rate,
        }
    }

    /// Target size for `scene`: native for the first scene, working size otherwise.
    fn target_size(&self, scene: &SceneDescriptor) -> Option<(u32, u32)> {
        (scene.index != 0).then_some((self.working_width, self.working_height))
    }
}

impl AssetLoader for FileLoader {
    fn load(&mut self, scene: &SceneDescriptor) -> Result<LoadedAsset, AssetError> {
        let target = self.target_size(scene);
        let asset = match &scene.asset {
            SceneAsset::Image(path) => {
                let raster = Raster::from_file(path)?;
                LoadedAsset::Image(match target {
                    Some((w, h)) => raster.resized(w, h),
                    None => raster,
                })
            }
            SceneAsset::Video(dir) => {
                let seq = FrameSequence::load_dir(dir, self.frame_rate)?;
                LoadedAsset::Video(Box::new(match target {
                    Some((w, h)) => seq.resized(w, h),
                    None => seq,
                }))
            }
        };
        log::info!(
            "scene {}: loaded {:?} from {}",
            scene.index,
            asset,
            scene.asset.path().display()
        );
        Ok(asset)
    }
}
