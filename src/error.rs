//! Error types for pixelfield.
//!
//! This module provides error types for GPU initialization, rendering,
//! asset loading, configuration parsing and running the viewer.
//!
//! Navigation, pointer sampling and trail updates never fail: a debounced
//! transition or a ray that misses the picking plane is a normal outcome,
//! not an error.

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors reported by a [`Renderer`](crate::Renderer) while drawing a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The presentation surface was lost or became outdated; reconfigure and retry.
    SurfaceLost,
    /// The device ran out of memory. Not recoverable.
    OutOfMemory,
    /// Acquiring the next frame timed out. The frame is skipped.
    Timeout,
    /// Any other backend failure.
    Other(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::SurfaceLost => write!(f, "Render surface lost or outdated"),
            RenderError::OutOfMemory => write!(f, "GPU out of memory"),
            RenderError::Timeout => write!(f, "Timed out acquiring the next frame"),
            RenderError::Other(msg) => write!(f, "Render error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(e: wgpu::SurfaceError) -> Self {
        match e {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => RenderError::SurfaceLost,
            wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
            wgpu::SurfaceError::Timeout => RenderError::Timeout,
            other => RenderError::Other(other.to_string()),
        }
    }
}

/// Errors that can occur while loading scene assets.
#[derive(Debug)]
pub enum AssetError {
    /// Failed to decode an image file.
    ImageLoad(image::ImageError),
    /// Failed to read a file or directory from disk.
    Io(std::io::Error),
    /// A video directory contained no decodable frames.
    EmptySequence(PathBuf),
    /// Raw pixel data did not match the declared dimensions.
    Dimensions {
        /// Byte length implied by width * height * 4.
        expected: usize,
        /// Byte length actually supplied.
        actual: usize,
    },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::ImageLoad(e) => write!(f, "Failed to load image: {}", e),
            AssetError::Io(e) => write!(f, "Failed to read asset: {}", e),
            AssetError::EmptySequence(path) => {
                write!(f, "Video directory '{}' contains no frames", path.display())
            }
            AssetError::Dimensions { expected, actual } => write!(
                f,
                "RGBA data size mismatch: expected {} bytes, got {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::ImageLoad(e) => Some(e),
            AssetError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<image::ImageError> for AssetError {
    fn from(e: image::ImageError) -> Self {
        AssetError::ImageLoad(e)
    }
}

impl From<std::io::Error> for AssetError {
    fn from(e: std::io::Error) -> Self {
        AssetError::Io(e)
    }
}

/// Errors that can occur while reading the scene configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    Io(std::io::Error),
    /// The configuration document is not valid JSON for the expected schema.
    Parse(serde_json::Error),
    /// The scene list is empty.
    NoScenes,
    /// A scene declared an index that does not match its position in the list.
    IndexMismatch {
        /// Position of the scene in the list.
        position: usize,
        /// Index declared by the scene.
        index: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read configuration: {}", e),
            ConfigError::Parse(e) => write!(f, "Invalid configuration: {}", e),
            ConfigError::NoScenes => write!(f, "Configuration must list at least one scene"),
            ConfigError::IndexMismatch { position, index } => write!(
                f,
                "Scene at position {} declares index {}",
                position, index
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Errors that can occur when running the viewer.
#[derive(Debug)]
pub enum EffectError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// A scene asset could not be loaded.
    Asset(AssetError),
    /// The configuration could not be loaded.
    Config(ConfigError),
    /// Rendering failed in a way that cannot be recovered.
    Render(RenderError),
}

impl fmt::Display for EffectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            EffectError::Window(e) => write!(f, "Failed to create window: {}", e),
            EffectError::Gpu(e) => write!(f, "GPU error: {}", e),
            EffectError::Asset(e) => write!(f, "Asset error: {}", e),
            EffectError::Config(e) => write!(f, "Configuration error: {}", e),
            EffectError::Render(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for EffectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EffectError::EventLoop(e) => Some(e),
            EffectError::Window(e) => Some(e),
            EffectError::Gpu(e) => Some(e),
            EffectError::Asset(e) => Some(e),
            EffectError::Config(e) => Some(e),
            EffectError::Render(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for EffectError {
    fn from(e: winit::error::EventLoopError) -> Self {
        EffectError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for EffectError {
    fn from(e: winit::error::OsError) -> Self {
        EffectError::Window(e)
    }
}

impl From<GpuError> for EffectError {
    fn from(e: GpuError) -> Self {
        EffectError::Gpu(e)
    }
}

impl From<AssetError> for EffectError {
    fn from(e: AssetError) -> Self {
        EffectError::Asset(e)
    }
}

impl From<ConfigError> for EffectError {
    fn from(e: ConfigError) -> Self {
        EffectError::Config(e)
    }
}

impl From<RenderError> for EffectError {
    fn from(e: RenderError) -> Self {
        EffectError::Render(e)
    }
}
