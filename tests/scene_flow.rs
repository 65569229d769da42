//! End-to-end tests of the effect controller.
//!
//! These drive an [`Effect`] through navigation, pulses, pointer input and
//! shutdown against a renderer that only records what it was asked to do.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use glam::Vec2;
use pixelfield::tween::{Timeline, Tween, TweenHandle, TweenScheduler, TweenUpdate, Tweener};
use pixelfield::{
    Effect, EffectConfig, EffectSettings, FrameSequence, FrameState, Intent, Key, LoadedAsset,
    ParticleInstance, Raster, RawEvent, RenderError, Renderer, SceneAsset, SceneDescriptor,
    ShapeMode,
};

// ============================================================================
// Fixtures
// ============================================================================

#[derive(Default)]
struct RecordingRenderer {
    fields: Vec<usize>,
    textures: Vec<(u32, u32)>,
    trail_uploads: usize,
    /// Size and buffer address of every trail upload.
    trail_buffers: Vec<(u32, u32, usize)>,
    resizes: Vec<(u32, u32)>,
    frames: Vec<FrameState>,
    fail_with: Option<RenderError>,
}

impl Renderer for RecordingRenderer {
    fn upload_field(&mut self, instances: &[ParticleInstance]) {
        self.fields.push(instances.len());
    }

    fn set_texture(&mut self, raster: &Raster) {
        self.textures.push((raster.width(), raster.height()));
    }

    fn update_trail(&mut self, raster: &Raster) {
        self.trail_uploads += 1;
        self.trail_buffers.push((
            raster.width(),
            raster.height(),
            raster.as_rgba().as_ptr() as usize,
        ));
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.resizes.push((width, height));
    }

    fn render(&mut self, frame: &FrameState) -> Result<(), RenderError> {
        if let Some(e) = self.fail_with.clone() {
            return Err(e);
        }
        self.frames.push(*frame);
        Ok(())
    }
}

/// Delegates to [`Tweener`] and records which handles were stopped.
#[derive(Default)]
struct RecordingScheduler {
    inner: Tweener,
    started: usize,
    killed: Vec<TweenHandle>,
    completed: Vec<TweenHandle>,
}

impl TweenScheduler for RecordingScheduler {
    fn start(&mut self, tween: Tween) -> TweenHandle {
        self.started += 1;
        self.inner.start(tween)
    }

    fn start_timeline(&mut self, timeline: Timeline) -> TweenHandle {
        self.started += 1;
        self.inner.start_timeline(timeline)
    }

    fn kill(&mut self, handle: TweenHandle) {
        self.killed.push(handle);
        self.inner.kill(handle);
    }

    fn complete(&mut self, handle: TweenHandle) -> Vec<TweenUpdate> {
        self.completed.push(handle);
        self.inner.complete(handle)
    }

    fn kill_all(&mut self) {
        self.inner.kill_all();
    }

    fn is_active(&self, handle: TweenHandle) -> bool {
        self.inner.is_active(handle)
    }

    fn advance(&mut self, dt: f32) -> Vec<TweenUpdate> {
        self.inner.advance(dt)
    }
}

type TestEffect = Effect<RecordingRenderer, Tweener>;

const DEBOUNCE: Duration = Duration::from_millis(300);
const VIEWPORT: (u32, u32) = (1280, 720);

fn scene(asset: SceneAsset, quote: &str) -> SceneDescriptor {
    SceneDescriptor {
        index: 0,
        asset,
        quote: quote.to_string(),
        threshold: 20,
        random: 1.0,
        depth: 2.0,
        max_depth: None,
        size: 1.0,
        shape: ShapeMode::Circle,
        legacy_mask: false,
    }
}

fn image_scene(quote: &str) -> SceneDescriptor {
    scene(SceneAsset::Image(PathBuf::from("unused.png")), quote)
}

fn config(scenes: Vec<SceneDescriptor>) -> EffectConfig {
    EffectConfig::new(EffectSettings::default(), scenes).unwrap()
}

fn five_scene_config() -> EffectConfig {
    config((0..5).map(|i| image_scene(&format!("quote {}", i))).collect())
}

/// 2x2 image whose red channel is 10, 30, 200, 21: three pixels exceed 20.
fn two_by_two() -> Raster {
    Raster::from_rgba(
        vec![
            10, 0, 0, 255, 30, 0, 0, 255, //
            200, 0, 0, 255, 21, 0, 0, 255,
        ],
        2,
        2,
    )
    .unwrap()
}

fn video(width: u32, height: u32) -> LoadedAsset {
    let frames = (0..3)
        .map(|i| Raster::solid(width, height, [i * 80, 0, 0, 255]))
        .collect();
    LoadedAsset::Video(Box::new(FrameSequence::new(frames, 10.0).unwrap()))
}

fn running(config: &EffectConfig) -> TestEffect {
    let mut effect = Effect::new(config, VIEWPORT, RecordingRenderer::default(), Tweener::new()).with_seed(7);
    for index in 0..config.scenes().len() {
        effect.provide_asset(index, LoadedAsset::Image(two_by_two()));
    }
    effect
}

// ============================================================================
// Initialization
// ============================================================================

#[test]
fn test_first_scene_builds_masked_field() {
    let effect = running(&five_scene_config());

    assert!(effect.is_running());
    assert_eq!(effect.index(), 0);
    assert_eq!(effect.field().len(), 3);
    assert_eq!(effect.mask().map(|m| m.visible_count()), Some(3));
    assert_eq!(effect.mask().map(|m| m.threshold()), Some(20));
    assert_eq!(effect.renderer().fields, vec![3]);
    assert_eq!(effect.renderer().textures, vec![(2, 2)]);
    assert_eq!(effect.caption().text, "quote 0");
}

#[test]
fn test_pending_until_first_scene_arrives() {
    let config = five_scene_config();
    let mut effect = Effect::new(&config, VIEWPORT, RecordingRenderer::default(), Tweener::new());
    effect.provide_asset(1, LoadedAsset::Image(two_by_two()));

    assert!(!effect.is_running());
    assert_eq!(effect.frame(0.1), Ok(false));
    effect.dispatch(Intent::NavigateNext, Instant::now());
    assert_eq!(effect.index(), 0);
    assert!(effect.renderer().fields.is_empty());

    effect.provide_asset(0, LoadedAsset::Image(two_by_two()));
    assert!(effect.is_running());
}

#[test]
fn test_initial_viewport_comes_from_caller() {
    let config = five_scene_config();
    let mut small = Effect::new(&config, (800, 600), RecordingRenderer::default(), Tweener::new());
    small.provide_asset(0, LoadedAsset::Image(two_by_two()));
    let mut wide = running(&config);

    let projection = small.frame_state().projection;
    let aspect = projection.y_axis.y / projection.x_axis.x;
    assert!((aspect - 800.0 / 600.0).abs() < 1e-4);

    // The top-right corner of each window is the same NDC point
    let now = Instant::now();
    small.handle_event(RawEvent::PointerMove { x: 800.0, y: 0.0 }, now);
    wide.handle_event(RawEvent::PointerMove { x: 1280.0, y: 0.0 }, now);
    assert_eq!(small.rotation().target, wide.rotation().target);
}

#[test]
fn test_out_of_range_asset_ignored() {
    let config = five_scene_config();
    let mut effect = running(&config);
    effect.provide_asset(9, LoadedAsset::Image(two_by_two()));
    assert_eq!(effect.renderer().fields.len(), 1);
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_five_nexts_return_to_first_scene() {
    let mut effect = running(&five_scene_config());
    let t0 = Instant::now();
    for i in 0..5 {
        effect.dispatch(Intent::NavigateNext, t0 + DEBOUNCE * i);
    }
    assert_eq!(effect.index(), 0);
    // One upload at startup plus one per transition
    assert_eq!(effect.renderer().fields.len(), 6);
}

#[test]
fn test_rapid_navigation_is_debounced() {
    let mut effect = running(&five_scene_config());
    let t0 = Instant::now();
    effect.dispatch(Intent::NavigateNext, t0);
    effect.dispatch(Intent::NavigateNext, t0 + Duration::from_millis(100));
    assert_eq!(effect.index(), 1);
}

#[test]
fn test_previous_from_first_wraps_to_last() {
    let mut effect = running(&five_scene_config());
    effect.dispatch(Intent::NavigatePrevious, Instant::now());
    assert_eq!(effect.index(), 4);
    assert_eq!(effect.scene().quote, "quote 4");
}

#[test]
fn test_arrow_keys_navigate() {
    let mut effect = running(&five_scene_config());
    let t0 = Instant::now();
    effect.handle_event(RawEvent::KeyDown(Key::Other), t0);
    assert_eq!(effect.index(), 0);
    effect.handle_event(RawEvent::KeyDown(Key::Right), t0);
    assert_eq!(effect.index(), 1);
    effect.handle_event(RawEvent::KeyDown(Key::Left), t0 + DEBOUNCE);
    assert_eq!(effect.index(), 0);
}

#[test]
fn test_unloaded_scene_is_skipped_without_consuming_debounce() {
    let config = five_scene_config();
    let mut effect = Effect::new(&config, VIEWPORT, RecordingRenderer::default(), Tweener::new());
    effect.provide_asset(0, LoadedAsset::Image(two_by_two()));

    let t0 = Instant::now();
    effect.dispatch(Intent::NavigateNext, t0);
    assert_eq!(effect.index(), 0);

    effect.provide_asset(1, LoadedAsset::Image(two_by_two()));
    effect.dispatch(Intent::NavigateNext, t0 + Duration::from_millis(10));
    assert_eq!(effect.index(), 1);
}

// ============================================================================
// Animation
// ============================================================================

#[test]
fn test_caption_swaps_after_fade_out() {
    let mut effect = running(&five_scene_config());
    effect.dispatch(Intent::NavigateNext, Instant::now());
    assert_eq!(effect.caption().text, "quote 0");

    assert_eq!(effect.frame(0.25), Ok(true));
    assert_eq!(effect.caption().text, "quote 0");
    assert!(effect.caption().opacity < 1.0);

    assert_eq!(effect.frame(0.35), Ok(true));
    assert_eq!(effect.caption().text, "quote 1");
    assert_eq!(effect.caption().opacity, 1.0);
}

#[test]
fn test_transition_resets_scene_params() {
    let mut scenes: Vec<_> = (0..3).map(|i| image_scene(&i.to_string())).collect();
    scenes[1].random = 9.0;
    scenes[1].size = 3.0;
    scenes[1].shape = ShapeMode::Square;
    let mut effect = running(&config(scenes));

    effect.dispatch(Intent::NavigateNext, Instant::now());
    let params = effect.params();
    assert_eq!(params.random, 9.0);
    assert_eq!(params.size, 3.0);
    assert_eq!(params.shape(), ShapeMode::Square);
}

#[test]
fn test_transitions_cancel_superseded_tweens() {
    let config = five_scene_config();
    let mut effect = Effect::new(
        &config,
        VIEWPORT,
        RecordingRenderer::default(),
        RecordingScheduler::default(),
    );
    for index in 0..5 {
        effect.provide_asset(index, LoadedAsset::Image(two_by_two()));
    }
    // Two startup depth swells
    assert_eq!(effect.tweens().started, 2);

    let t0 = Instant::now();
    // First arrival at scene 1 kills the startup animation and adds the spin
    effect.dispatch(Intent::NavigateNext, t0);
    assert_eq!(effect.tweens().killed.len(), 2);
    assert_eq!(effect.tweens().started, 2 + 1 + 3);

    // Caption, mesh push, depth swell and unlock spin of the previous transition
    effect.dispatch(Intent::NavigateNext, t0 + DEBOUNCE);
    assert_eq!(effect.tweens().killed.len(), 6);

    effect.dispatch(Intent::Pulse, t0 + DEBOUNCE);
    assert_eq!(effect.tweens().completed.len(), 2);
    effect.dispatch(Intent::Pulse, t0 + DEBOUNCE);
    // Mesh and depth are gone; only the previous pulse is left to complete
    assert_eq!(effect.tweens().completed.len(), 3);
}

#[test]
fn test_click_pulses_toward_max_depth() {
    let mut scenes: Vec<_> = (0..3).map(|i| image_scene(&i.to_string())).collect();
    scenes[2].max_depth = Some(60.0);
    let mut effect = running(&config(scenes));
    let t0 = Instant::now();
    effect.dispatch(Intent::NavigateNext, t0);
    effect.dispatch(Intent::NavigateNext, t0 + DEBOUNCE);
    assert_eq!(effect.index(), 2);

    effect.dispatch(Intent::Pulse, t0 + DEBOUNCE);
    // Past the 1.5s rise, inside the hold before the return leg
    effect.frame(2.0).unwrap();
    assert!((effect.params().depth - 60.0).abs() < 1e-3);
    // The mesh push was completed and left at rest
    assert_eq!(effect.mesh().z, 0.0);
}

#[test]
fn test_click_on_first_scene_pulls_far_back() {
    let mut effect = running(&five_scene_config());
    effect.dispatch(Intent::Pulse, Instant::now());
    effect.frame(2.0).unwrap();
    assert!((effect.params().depth + 500.0).abs() < 1e-2);
}

#[test]
fn test_click_after_wrapping_to_first_scene_returns_to_rest() {
    let mut effect = running(&five_scene_config());
    let t0 = Instant::now();
    for i in 0..5 {
        effect.dispatch(Intent::NavigateNext, t0 + DEBOUNCE * i);
    }
    assert_eq!(effect.index(), 0);

    // Completing the depth swell leaves the descriptor depth behind
    effect.dispatch(Intent::Pulse, t0 + DEBOUNCE * 5);
    effect.frame(2.0).unwrap();
    assert!((effect.params().depth + 500.0).abs() < 1e-2);

    // Rise, hold and return all fit in 4.5s; scene 0 comes back to zero
    effect.frame(10.0).unwrap();
    assert_eq!(effect.params().depth, 0.0);
}

#[test]
fn test_unlock_spin_is_cancelled_by_next_transition() {
    let mut effect = running(&five_scene_config());
    let t0 = Instant::now();
    effect.dispatch(Intent::NavigateNext, t0);
    effect.dispatch(Intent::NavigateNext, t0 + DEBOUNCE);
    effect.frame(0.1).unwrap();
    assert_eq!(effect.mesh().spin, 0.0);
}

#[test]
fn test_frames_are_limited() {
    let mut effect = running(&five_scene_config());
    assert_eq!(effect.frame(0.001), Ok(false));
    assert_eq!(effect.frame(0.02), Ok(true));
    assert_eq!(effect.renderer().frames.len(), 1);
    assert_eq!(effect.renderer().trail_uploads, 1);
    assert!((effect.params().time - 0.021).abs() < 1e-5);
}

#[test]
fn test_render_errors_propagate() {
    let mut effect = running(&five_scene_config());
    effect.renderer_mut().fail_with = Some(RenderError::SurfaceLost);
    assert_eq!(effect.frame(0.1), Err(RenderError::SurfaceLost));
}

// ============================================================================
// Pointer trail
// ============================================================================

#[test]
fn test_pointer_moves_paint_the_trail() {
    let mut effect = running(&five_scene_config());
    let t0 = Instant::now();
    effect.handle_event(RawEvent::Resize { width: 1280, height: 720 }, t0);
    assert_eq!(effect.renderer().resizes, vec![(1280, 720)]);

    effect.handle_event(RawEvent::PointerMove { x: 640.0, y: 360.0 }, t0);
    let first = effect.trail().points()[0];
    assert!((first.uv.x - 0.5).abs() < 1e-3);
    assert!((first.uv.y - 0.5).abs() < 1e-3);
    assert_eq!(first.force, 0.0);

    // Inside the throttle window
    effect.handle_event(RawEvent::PointerMove { x: 660.0, y: 360.0 }, t0 + Duration::from_millis(5));
    assert_eq!(effect.trail().points().len(), 1);

    effect.handle_event(RawEvent::PointerMove { x: 700.0, y: 360.0 }, t0 + Duration::from_millis(20));
    let points = effect.trail().points();
    assert_eq!(points.len(), 2);
    assert!(points[1].uv.x > 0.5);
    assert_eq!(points[1].force, 1.0);

    for _ in 0..21 {
        effect.frame(0.1).unwrap();
    }
    let canvas = effect.trail().canvas();
    let mut peak: f32 = 0.0;
    for y in 0..canvas.size() {
        for x in 0..canvas.size() {
            peak = peak.max(canvas.value(x, y));
        }
    }
    assert!(peak > 0.0);
    assert_eq!(effect.renderer().trail_uploads, 21);
}

#[test]
fn test_trail_uploads_reuse_one_raster() {
    let mut effect = running(&five_scene_config());
    effect.handle_event(RawEvent::PointerMove { x: 640.0, y: 360.0 }, Instant::now());
    for _ in 0..5 {
        effect.frame(0.1).unwrap();
    }
    let uploads = &effect.renderer().trail_buffers;
    assert_eq!(uploads.len(), 5);
    assert!(uploads.iter().all(|u| *u == uploads[0]));
    assert_eq!((uploads[0].0, uploads[0].1), (80, 80));
}

#[test]
fn test_pointer_tilts_mesh() {
    let mut effect = running(&five_scene_config());
    effect.handle_event(RawEvent::PointerMove { x: 1280.0, y: 0.0 }, Instant::now());
    let target = effect.rotation().target;
    assert!(target.x < 0.0);
    assert!(target.y > 0.0);

    effect.frame(0.02).unwrap();
    assert!(effect.rotation().current.y > 0.0);
}

#[test]
fn test_disabled_trail_ignores_pointer() {
    let mut effect = running(&five_scene_config());
    effect.set_trail_enabled(false);
    effect.handle_event(RawEvent::PointerMove { x: 640.0, y: 360.0 }, Instant::now());
    assert!(effect.trail().points().is_empty());
}

// ============================================================================
// Video scenes
// ============================================================================

#[test]
fn test_video_scene_uses_every_pixel() {
    let scenes = vec![
        image_scene("still"),
        scene(SceneAsset::Video(PathBuf::from("clip")), "moving"),
    ];
    let config = config(scenes);
    let mut effect = running(&config);
    effect.provide_asset(1, video(3, 2));

    effect.dispatch(Intent::NavigateNext, Instant::now());
    assert_eq!(effect.field().len(), 6);
    assert_eq!(effect.params().texture_size.x, 3.0);

    let uploads = effect.renderer().textures.len();
    effect.frame(0.1).unwrap();
    assert_eq!(effect.renderer().textures.len(), uploads + 1);
}

#[test]
fn test_legacy_mask_overlays_video() {
    let mut clip = scene(SceneAsset::Video(PathBuf::from("clip")), "masked");
    clip.legacy_mask = true;
    let config = config(vec![image_scene("still"), clip]);
    let mut effect = running(&config);
    effect.provide_asset(1, video(2, 2));

    effect.dispatch(Intent::NavigateNext, Instant::now());
    assert_eq!(effect.field().len(), 3);
}

// ============================================================================
// Shutdown
// ============================================================================

#[test]
fn test_shutdown_returns_mesh_to_rest() {
    let mut effect = running(&five_scene_config());
    effect.handle_event(RawEvent::PointerMove { x: 1280.0, y: 0.0 }, Instant::now());
    effect.frame(0.02).unwrap();
    assert_ne!(effect.rotation().current, Vec2::ZERO);

    effect.shutdown();
    assert_eq!(effect.rotation().current, Vec2::ZERO);
    assert_eq!(effect.rotation().target, Vec2::ZERO);
}

#[test]
fn test_shutdown_is_terminal() {
    let mut effect = running(&five_scene_config());
    effect.dispatch(Intent::NavigateNext, Instant::now());
    effect.shutdown();

    assert!(effect.is_shut_down());
    assert!(effect.tweens().is_empty());
    assert!(effect.trail().points().is_empty());
    assert!((0..5).all(|i| !effect.is_loaded(i)));
    assert!(effect.mask().is_none());

    let index = effect.index();
    effect.dispatch(Intent::NavigateNext, Instant::now() + DEBOUNCE);
    effect.handle_event(RawEvent::Click { x: 10.0, y: 10.0 }, Instant::now());
    assert_eq!(effect.index(), index);
    assert_eq!(effect.frame(1.0), Ok(false));

    // Repeated shutdown is a no-op
    effect.shutdown();
    assert!(effect.is_shut_down());
}
