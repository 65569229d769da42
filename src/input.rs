//! Input routing.
//!
//! Raw window events are translated into a small set of [`Intent`]s that the
//! effect understands. Pointer and touch movement is converted to normalized
//! device coordinates and throttled; arrow keys navigate; clicks pulse.
//!
//! # Usage
//!
//! ```ignore
//! let mut router = InputRouter::new(Viewport::new(1280.0, 720.0), Duration::from_millis(16));
//! if let Some(intent) = router.route(RawEvent::PointerMove { x: 640.0, y: 360.0 }, Instant::now()) {
//!     effect.dispatch(intent, Instant::now());
//! }
//! ```

use std::time::{Duration, Instant};

use glam::Vec2;
use winit::keyboard::KeyCode as WinitKeyCode;

/// Keys the effect reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Other,
}

impl From<WinitKeyCode> for Key {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::ArrowLeft => Key::Left,
            WinitKeyCode::ArrowRight => Key::Right,
            _ => Key::Other,
        }
    }
}

/// Events as delivered by the windowing layer, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawEvent {
    PointerMove { x: f32, y: f32 },
    /// Movement of the first active touch.
    TouchMove { x: f32, y: f32 },
    KeyDown(Key),
    Click { x: f32, y: f32 },
    Resize { width: u32, height: u32 },
}

/// What the effect should do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Pointer position in normalized device coordinates.
    PointerSample(Vec2),
    NavigatePrevious,
    NavigateNext,
    Pulse,
    Resize { width: u32, height: u32 },
}

/// Screen rectangle the effect is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// A viewport anchored at the window origin.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    /// Convert a screen position to normalized device coordinates.
    ///
    /// Origin is at the centre. X increases to the right, Y increases upward.
    pub fn ndc(&self, x: f32, y: f32) -> Vec2 {
        let w = self.width.max(1.0);
        let h = self.height.max(1.0);
        Vec2::new(
            ((x - self.left) / w) * 2.0 - 1.0,
            -((y - self.top) / h) * 2.0 + 1.0,
        )
    }
}

/// Stateful translator from [`RawEvent`] to [`Intent`].
#[derive(Debug, Clone)]
pub struct InputRouter {
    viewport: Viewport,
    throttle: Duration,
    last_sample: Option<Instant>,
}

impl InputRouter {
    pub fn new(viewport: Viewport, throttle: Duration) -> Self {
        Self {
            viewport,
            throttle,
            last_sample: None,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Translate one event. Returns `None` for ignored or throttled events.
    pub fn route(&mut self, event: RawEvent, now: Instant) -> Option<Intent> {
        match event {
            RawEvent::PointerMove { x, y } | RawEvent::TouchMove { x, y } => {
                if let Some(last) = self.last_sample {
                    if now.saturating_duration_since(last) < self.throttle {
                        return None;
                    }
                }
                self.last_sample = Some(now);
                Some(Intent::PointerSample(self.viewport.ndc(x, y)))
            }
            RawEvent::KeyDown(Key::Left) => Some(Intent::NavigatePrevious),
            RawEvent::KeyDown(Key::Right) => Some(Intent::NavigateNext),
            RawEvent::KeyDown(Key::Other) => None,
            RawEvent::Click { .. } => Some(Intent::Pulse),
            RawEvent::Resize { width, height } => {
                self.viewport.width = width as f32;
                self.viewport.height = height as f32;
                Some(Intent::Resize { width, height })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> InputRouter {
        InputRouter::new(Viewport::new(800.0, 600.0), Duration::from_millis(16))
    }

    #[test]
    fn test_ndc_corners_and_centre() {
        let vp = Viewport::new(800.0, 600.0);
        assert_eq!(vp.ndc(400.0, 300.0), Vec2::ZERO);
        assert_eq!(vp.ndc(0.0, 0.0), Vec2::new(-1.0, 1.0));
        assert_eq!(vp.ndc(800.0, 600.0), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_ndc_respects_offset() {
        let vp = Viewport {
            left: 100.0,
            top: 50.0,
            width: 200.0,
            height: 100.0,
        };
        assert_eq!(vp.ndc(200.0, 100.0), Vec2::ZERO);
    }

    #[test]
    fn test_pointer_throttled() {
        let mut r = router();
        let t0 = Instant::now();
        assert!(r.route(RawEvent::PointerMove { x: 1.0, y: 1.0 }, t0).is_some());
        assert!(r
            .route(RawEvent::PointerMove { x: 2.0, y: 2.0 }, t0 + Duration::from_millis(5))
            .is_none());
        // Touch shares the same throttle window
        assert!(r
            .route(RawEvent::TouchMove { x: 2.0, y: 2.0 }, t0 + Duration::from_millis(10))
            .is_none());
        assert!(r
            .route(RawEvent::TouchMove { x: 3.0, y: 3.0 }, t0 + Duration::from_millis(16))
            .is_some());
    }

    #[test]
    fn test_keys_map_to_navigation() {
        let mut r = router();
        let now = Instant::now();
        assert_eq!(r.route(RawEvent::KeyDown(Key::Left), now), Some(Intent::NavigatePrevious));
        assert_eq!(r.route(RawEvent::KeyDown(Key::Right), now), Some(Intent::NavigateNext));
        assert_eq!(r.route(RawEvent::KeyDown(Key::Other), now), None);
        assert_eq!(Key::from(WinitKeyCode::ArrowRight), Key::Right);
        assert_eq!(Key::from(WinitKeyCode::Space), Key::Other);
    }

    #[test]
    fn test_click_pulses_and_resize_updates_viewport() {
        let mut r = router();
        let now = Instant::now();
        assert_eq!(r.route(RawEvent::Click { x: 0.0, y: 0.0 }, now), Some(Intent::Pulse));
        assert_eq!(
            r.route(RawEvent::Resize { width: 1024, height: 512 }, now),
            Some(Intent::Resize { width: 1024, height: 512 })
        );
        assert_eq!(r.viewport().width, 1024.0);
        assert_eq!(r.viewport().ndc(512.0, 256.0), Vec2::ZERO);
    }
}
