//! Windowed viewer.
//!
//! [`Viewer`] opens a winit window, builds a [`GpuRenderer`], decodes every
//! scene asset and forwards window events to an [`Effect`]. Redraws are
//! requested continuously; the effect's frame limiter decides which of
//! them actually draw.

use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, TouchPhase, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::assets::{AssetLoader, FileLoader};
use crate::config::EffectConfig;
use crate::effect::Effect;
use crate::error::{EffectError, RenderError};
use crate::gpu::GpuRenderer;
use crate::input::{Key, RawEvent};
use crate::time::Clock;
use crate::tween::Tweener;

/// Builder and entry point for the windowed effect.
pub struct Viewer {
    config: EffectConfig,
    title: String,
    width: u32,
    height: u32,
    trail: bool,
}

impl Viewer {
    pub fn new(config: EffectConfig) -> Self {
        Self {
            config,
            title: "pixelfield".to_string(),
            width: 1280,
            height: 720,
            trail: true,
        }
    }

    /// Window title shown before the first caption is known.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Initial inner size in logical pixels.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Enable or disable the pointer trail.
    pub fn with_trail(mut self, enabled: bool) -> Self {
        self.trail = enabled;
        self
    }

    /// Open the window and block until it closes.
    pub fn run(self) -> Result<(), EffectError> {
        let event_loop = EventLoop::new()?;
        let mut app = App::new(self);
        event_loop.run_app(&mut app)?;
        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

struct App {
    viewer: Viewer,
    window: Option<Arc<Window>>,
    effect: Option<Effect<GpuRenderer, Tweener>>,
    clock: Clock,
    cursor: Option<(f32, f32)>,
    touch_id: Option<u64>,
    title: String,
    error: Option<EffectError>,
}

impl App {
    fn new(viewer: Viewer) -> Self {
        Self {
            window: None,
            effect: None,
            clock: Clock::new(),
            cursor: None,
            touch_id: None,
            title: viewer.title.clone(),
            error: None,
            viewer,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), EffectError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.viewer.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.viewer.width,
                self.viewer.height,
            ));
        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let renderer = pollster::block_on(GpuRenderer::new(window.clone()))?;

        let size = window.inner_size();
        let config = &self.viewer.config;
        let mut effect = Effect::new(config, (size.width, size.height), renderer, Tweener::new());
        effect.set_trail_enabled(self.viewer.trail);

        let mut loader = FileLoader::new(&config.settings);
        for scene in config.scenes() {
            match loader.load(scene) {
                Ok(asset) => effect.provide_asset(scene.index, asset),
                // Scene 0 is required; later scenes just stay unreachable.
                Err(e) if scene.index == 0 => return Err(e.into()),
                Err(e) => log::error!("scene {}: {}", scene.index, e),
            }
        }
        let loaded = config
            .scenes()
            .iter()
            .filter(|scene| effect.is_loaded(scene.index))
            .count();
        log::info!("{} of {} scenes loaded", loaded, config.scenes().len());

        self.clock = Clock::new();
        self.window = Some(window);
        self.effect = Some(effect);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: EffectError) {
        log::error!("{}", error);
        if let Some(effect) = &mut self.effect {
            effect.shutdown();
        }
        self.error = Some(error);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(effect) = &mut self.effect else {
            return;
        };
        let delta = self.clock.tick();
        match effect.frame(delta) {
            Ok(_) => {}
            Err(RenderError::SurfaceLost) => log::warn!("surface lost; reconfigured"),
            Err(RenderError::Timeout) => log::warn!("frame acquisition timed out"),
            Err(e) => {
                self.fail(event_loop, e.into());
                return;
            }
        }

        let title = effect.caption().plain_text();
        if let Some(window) = &self.window {
            if title != self.title {
                window.set_title(&title);
                self.title = title;
            }
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let WindowEvent::RedrawRequested = event {
            self.redraw(event_loop);
            return;
        }

        let Some(effect) = &mut self.effect else {
            return;
        };
        let now = Instant::now();
        match event {
            WindowEvent::CloseRequested => {
                effect.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                effect.handle_event(
                    RawEvent::Resize {
                        width: size.width,
                        height: size.height,
                    },
                    now,
                );
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = (position.x as f32, position.y as f32);
                self.cursor = Some((x, y));
                effect.handle_event(RawEvent::PointerMove { x, y }, now);
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                if let Some((x, y)) = self.cursor {
                    effect.handle_event(RawEvent::Click { x, y }, now);
                }
            }
            WindowEvent::Touch(touch) => {
                // Only the first active finger steers.
                match touch.phase {
                    TouchPhase::Started if self.touch_id.is_none() => {
                        self.touch_id = Some(touch.id);
                    }
                    TouchPhase::Ended | TouchPhase::Cancelled
                        if self.touch_id == Some(touch.id) =>
                    {
                        self.touch_id = None;
                        return;
                    }
                    _ => {}
                }
                if self.touch_id == Some(touch.id) {
                    effect.handle_event(
                        RawEvent::TouchMove {
                            x: touch.location.x as f32,
                            y: touch.location.y as f32,
                        },
                        now,
                    );
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        effect.handle_event(RawEvent::KeyDown(Key::from(code)), now);
                    }
                }
            }
            _ => {}
        }
    }
}
