//! The effect controller.
//!
//! [`Effect`] owns every piece of mutable state: the scene controller, the
//! particle field, the render parameters, the pointer trail, the mesh
//! transform and the caption. Input arrives through one entry point
//! ([`Effect::handle_event`] for raw window events, [`Effect::dispatch`]
//! for already routed intents) and time advances only through
//! [`Effect::frame`]. Both run on the caller's thread, so a frame never
//! observes a half-applied scene change.
//!
//! # Example
//!
//! ```ignore
//! let config = EffectConfig::load("scenes.json")?;
//! let mut effect = Effect::new(&config, (1280, 720), renderer, Tweener::new());
//! let mut loader = FileLoader::new(&config.settings);
//! for scene in config.scenes() {
//!     effect.provide_asset(scene.index, loader.load(scene)?);
//! }
//!
//! // Event loop:
//! effect.handle_event(RawEvent::KeyDown(Key::Right), Instant::now());
//! effect.frame(delta)?;
//! ```

use std::time::Instant;

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::assets::{AssetLibrary, LoadedAsset};
use crate::config::{strip_markup, EffectConfig, EffectSettings, SceneDescriptor};
use crate::error::RenderError;
use crate::gpu::camera::Camera;
use crate::input::{InputRouter, Intent, RawEvent, Viewport};
use crate::mask::PixelMask;
use crate::particles::{FieldSource, ParticleField};
use crate::picking::PickPlane;
use crate::renderer::{FrameState, Renderer};
use crate::rotation::RotationSmoother;
use crate::textures::Raster;
use crate::time::FrameLimiter;
use crate::trail::{PointerTrail, TrailSettings};
use crate::transition::{
    caption_timeline, click_pulse, depth_pulse, initial_animation, mesh_pulse, unlock_spin,
    Direction, NavigationOutcome, SceneController, Transition,
};
use crate::tween::{Cue, TweenProperty, TweenScheduler, TweenUpdate};
use crate::uniforms::RenderParams;

/// Caption overlay state.
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    /// Quote text, possibly with inline markup.
    pub text: String,
    pub opacity: f32,
    /// Rotation in degrees.
    pub rotation: f32,
    pub scale: f32,
}

impl Caption {
    fn new(text: String) -> Self {
        Self {
            text,
            opacity: 1.0,
            rotation: 0.0,
            scale: 1.0,
        }
    }

    /// Caption text without markup.
    pub fn plain_text(&self) -> String {
        strip_markup(&self.text)
    }
}

/// Placement of the particle mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshTransform {
    /// Translation along z.
    pub z: f32,
    /// Rotation about z in radians.
    pub spin: f32,
    /// Uniform xy scale fitting the field to the view.
    pub scale: f32,
}

impl Default for MeshTransform {
    fn default() -> Self {
        Self {
            z: 0.0,
            spin: 0.0,
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    /// Waiting for the first scene's asset.
    Pending,
    Running,
    Shutdown,
}

/// The particle transition effect.
pub struct Effect<R: Renderer, T: TweenScheduler> {
    scenes: Vec<SceneDescriptor>,
    settings: EffectSettings,
    assets: AssetLibrary,
    renderer: R,
    tweens: T,
    controller: SceneController,
    router: InputRouter,
    /// Last mask computed from an image scene.
    mask: Option<PixelMask>,
    field: ParticleField,
    params: RenderParams,
    mesh: MeshTransform,
    rotation: RotationSmoother,
    camera: Camera,
    plane: PickPlane,
    trail: PointerTrail,
    /// Upload buffer the trail canvas is rewritten into every tick.
    trail_raster: Raster,
    limiter: FrameLimiter,
    caption: Caption,
    pending_caption: Option<String>,
    rng: StdRng,
    lifecycle: Lifecycle,
}

impl<R: Renderer, T: TweenScheduler> Effect<R, T> {
    /// Create a pending effect for a `(width, height)` pixel viewport.
    ///
    /// Nothing renders until scene 0's asset arrives.
    pub fn new(config: &EffectConfig, viewport: (u32, u32), renderer: R, tweens: T) -> Self {
        let settings = config.settings.clone();
        let scenes = config.scenes().to_vec();
        let width = viewport.0.max(1) as f32;
        let height = viewport.1.max(1) as f32;
        let camera = Camera::new(
            settings.camera_fov_deg,
            settings.camera_distance,
            width / height,
        );
        let caption = Caption::new(scenes.first().map(|s| s.quote.clone()).unwrap_or_default());

        Self {
            assets: AssetLibrary::new(scenes.len()),
            controller: SceneController::new(scenes.len(), settings.navigation_debounce()),
            router: InputRouter::new(Viewport::new(width, height), settings.pointer_throttle()),
            mask: None,
            field: ParticleField::default(),
            params: RenderParams::default(),
            mesh: MeshTransform::default(),
            rotation: RotationSmoother::new(settings.rotation_speed, settings.rotation_factor),
            camera,
            plane: PickPlane::new(1.0, 1.0, 1.0),
            trail: PointerTrail::new(TrailSettings::from(&settings)),
            trail_raster: Raster::solid(settings.trail_size, settings.trail_size, [0, 0, 0, 255]),
            limiter: FrameLimiter::new(settings.frame_interval),
            caption,
            pending_caption: None,
            rng: StdRng::from_entropy(),
            lifecycle: Lifecycle::Pending,
            scenes,
            settings,
            renderer,
            tweens,
        }
    }

    /// Use a seeded generator for particle angles.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Register the decoded asset of scene `index`.
    ///
    /// The first time scene 0 is provided the effect initializes and starts
    /// its startup animation.
    pub fn provide_asset(&mut self, index: usize, asset: LoadedAsset) {
        if self.lifecycle == Lifecycle::Shutdown {
            return;
        }
        if !self.assets.insert(index, asset) {
            log::warn!("asset for unknown scene {} ignored", index);
            return;
        }
        if index == 0 && self.lifecycle == Lifecycle::Pending && self.activate_scene(0) {
            for tween in initial_animation() {
                let handle = self.tweens.start(tween);
                self.controller.tweens.initial.push(handle);
            }
            self.lifecycle = Lifecycle::Running;
            log::info!("effect initialized with {} particles", self.field.len());
        }
    }

    /// Route a raw window event and act on the resulting intent.
    pub fn handle_event(&mut self, event: RawEvent, now: Instant) {
        if self.lifecycle == Lifecycle::Shutdown {
            return;
        }
        if let Some(intent) = self.router.route(event, now) {
            self.dispatch(intent, now);
        }
    }

    /// Act on an intent.
    pub fn dispatch(&mut self, intent: Intent, now: Instant) {
        if self.lifecycle == Lifecycle::Shutdown {
            return;
        }
        match intent {
            Intent::PointerSample(ndc) => self.pointer_sample(ndc),
            Intent::NavigatePrevious => self.navigate(Direction::Previous, now),
            Intent::NavigateNext => self.navigate(Direction::Next, now),
            Intent::Pulse => self.pulse(),
            Intent::Resize { width, height } => self.resize(width, height),
        }
    }

    /// Advance by `delta` seconds of wall time and draw if the frame limiter allows.
    ///
    /// Returns whether a frame was drawn.
    pub fn frame(&mut self, delta: f32) -> Result<bool, RenderError> {
        if self.lifecycle != Lifecycle::Running {
            return Ok(false);
        }
        let Some(elapsed) = self.limiter.advance(delta) else {
            return Ok(false);
        };

        self.params.time += elapsed;
        for update in self.tweens.advance(elapsed) {
            self.apply(update);
        }
        self.rotation.step();

        self.trail.tick();
        self.trail.canvas().write_into(&mut self.trail_raster);
        self.renderer.update_trail(&self.trail_raster);

        let index = self.controller.index();
        if let Some(LoadedAsset::Video(video)) = self.assets.get_mut(index) {
            video.advance(elapsed);
            self.renderer.set_texture(video.frame());
        }

        let frame = self.frame_state();
        self.renderer.render(&frame)?;
        Ok(true)
    }

    /// Enable or disable the pointer trail.
    pub fn set_trail_enabled(&mut self, enabled: bool) {
        self.trail.set_enabled(enabled);
    }

    /// Stop all animation and ignore every later call.
    pub fn shutdown(&mut self) {
        if self.lifecycle == Lifecycle::Shutdown {
            return;
        }
        self.controller.tweens.kill_all(&mut self.tweens);
        self.tweens.kill_all();
        self.trail.clear();
        self.rotation.reset();
        self.assets.clear();
        self.mask = None;
        self.lifecycle = Lifecycle::Shutdown;
        log::info!("effect shut down");
    }

    /// Matrices and parameters for the next draw.
    pub fn frame_state(&self) -> FrameState {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.current.x,
            self.rotation.current.y,
            self.mesh.spin,
        );
        let model = Mat4::from_scale_rotation_translation(
            Vec3::new(self.mesh.scale, self.mesh.scale, 1.0),
            rotation,
            Vec3::new(0.0, 0.0, self.mesh.z),
        );
        FrameState {
            params: self.params,
            model,
            view: self.camera.view_matrix(),
            projection: self.camera.projection(),
        }
    }

    /// Active scene index.
    pub fn index(&self) -> usize {
        self.controller.index()
    }

    /// Active scene descriptor.
    pub fn scene(&self) -> &SceneDescriptor {
        &self.scenes[self.controller.index()]
    }

    pub fn scenes(&self) -> &[SceneDescriptor] {
        &self.scenes
    }

    pub fn settings(&self) -> &EffectSettings {
        &self.settings
    }

    /// Whether scene `index` has a decoded asset.
    pub fn is_loaded(&self, index: usize) -> bool {
        self.assets.is_loaded(index)
    }

    /// Whether scene 0 has been initialized and the effect not shut down.
    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub fn is_shut_down(&self) -> bool {
        self.lifecycle == Lifecycle::Shutdown
    }

    pub fn caption(&self) -> &Caption {
        &self.caption
    }

    pub fn params(&self) -> &RenderParams {
        &self.params
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// The mask of the most recent image scene.
    pub fn mask(&self) -> Option<&PixelMask> {
        self.mask.as_ref()
    }

    pub fn mesh(&self) -> &MeshTransform {
        &self.mesh
    }

    pub fn rotation(&self) -> &RotationSmoother {
        &self.rotation
    }

    pub fn trail(&self) -> &PointerTrail {
        &self.trail
    }

    pub fn plane(&self) -> &PickPlane {
        &self.plane
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn tweens(&self) -> &T {
        &self.tweens
    }

    fn pointer_sample(&mut self, ndc: Vec2) {
        self.rotation.set_target_from_ndc(ndc);
        if self.lifecycle != Lifecycle::Running || !self.trail.is_enabled() {
            return;
        }
        let ray = self.camera.ray_from_ndc(ndc.x, ndc.y);
        if let Some(uv) = self.plane.intersect(&ray) {
            self.trail.push_sample(uv);
        }
    }

    fn navigate(&mut self, direction: Direction, now: Instant) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }
        let assets = &self.assets;
        match self
            .controller
            .navigate(direction, now, |i| assets.is_loaded(i))
        {
            NavigationOutcome::Accepted(transition) => self.transition(transition),
            NavigationOutcome::Debounced => log::debug!("navigation {:?} debounced", direction),
            NavigationOutcome::NotReady(index) => {
                log::warn!("scene {} is not loaded yet; navigation ignored", index)
            }
        }
    }

    fn transition(&mut self, transition: Transition) {
        self.controller.tweens.kill_transition(&mut self.tweens);
        self.mesh.spin = 0.0;
        if transition.unlock {
            self.controller.tweens.kill_initial(&mut self.tweens);
            self.controller.tweens.spin = Some(self.tweens.start(unlock_spin()));
        }

        if !self.activate_scene(transition.to) {
            return;
        }

        let scene = &self.scenes[transition.to];
        self.pending_caption = Some(scene.quote.clone());
        let depth = depth_pulse(scene);
        let handles = &mut self.controller.tweens;
        handles.caption = Some(self.tweens.start_timeline(caption_timeline()));
        handles.mesh_z = Some(self.tweens.start(mesh_pulse()));
        handles.depth = Some(self.tweens.start(depth));

        log::info!(
            "scene {} -> {} ({} particles)",
            transition.from,
            transition.to,
            self.field.len()
        );
    }

    fn pulse(&mut self) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }
        let handles = &mut self.controller.tweens;
        let mut finished = Vec::new();
        for handle in [handles.mesh_z.take(), handles.depth.take(), handles.pulse.take()]
            .into_iter()
            .flatten()
            .chain(handles.initial.drain(..))
        {
            finished.extend(self.tweens.complete(handle));
        }
        for update in finished {
            self.apply(update);
        }

        let tween = click_pulse(&self.scenes[self.controller.index()]);
        self.controller.tweens.pulse = Some(self.tweens.start(tween));
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
        self.renderer.resize(width, height);
        self.refit();
    }

    /// Recompute the fit scale for the current field and viewport.
    fn refit(&mut self) {
        let scale = self.camera.fit_scale(self.params.texture_size.y);
        self.mesh.scale = scale;
        self.plane = PickPlane::new(self.params.texture_size.x, self.params.texture_size.y, scale);
    }

    /// Swap texture, mask, field and parameters to scene `index`.
    ///
    /// The new field is fully built before it replaces the old one.
    fn activate_scene(&mut self, index: usize) -> bool {
        let Some(scene) = self.scenes.get(index) else {
            return false;
        };
        let Some(asset) = self.assets.get_mut(index) else {
            log::warn!("scene {} has no asset", index);
            return false;
        };
        if let LoadedAsset::Video(video) = asset {
            video.restart();
        }

        let raster = asset.raster();
        let (width, height) = (raster.width(), raster.height());
        let field = if asset.is_video() {
            let source = match (&self.mask, scene.legacy_mask) {
                (Some(mask), true) => FieldSource::Overlay {
                    width,
                    height,
                    mask,
                },
                _ => FieldSource::Unmasked { width, height },
            };
            ParticleField::build(source, &mut self.rng)
        } else {
            let mask = PixelMask::extract(raster, scene.threshold);
            log::debug!(
                "scene {} mask: {} of {} pixels above {}",
                index,
                mask.visible_count(),
                mask.total(),
                mask.threshold()
            );
            let field = ParticleField::build(FieldSource::Masked(&mask), &mut self.rng);
            self.mask = Some(mask);
            field
        };

        self.renderer.set_texture(raster);
        self.renderer.upload_field(&field.instances());
        self.field = field;
        self.params = RenderParams::for_scene(
            scene,
            Vec2::new(width as f32, height as f32),
            self.params.time,
        );
        self.refit();
        true
    }

    fn apply(&mut self, update: TweenUpdate) {
        match update {
            TweenUpdate::Value { property, value } => match property {
                TweenProperty::Depth => self.params.depth = value,
                TweenProperty::MeshZ => self.mesh.z = value,
                TweenProperty::MeshSpin => self.mesh.spin = value,
                TweenProperty::CaptionOpacity => self.caption.opacity = value,
                TweenProperty::CaptionRotation => self.caption.rotation = value,
                TweenProperty::CaptionScale => self.caption.scale = value,
            },
            TweenUpdate::Cue(Cue::SwapCaption) => {
                if let Some(text) = self.pending_caption.take() {
                    self.caption.text = text;
                }
                self.caption.opacity = 1.0;
            }
        }
    }
}
