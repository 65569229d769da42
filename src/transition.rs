//! Scene transition state machine.
//!
//! [`SceneController`] owns the active scene index and decides whether a
//! navigation request is accepted: requests within the debounce window of
//! the last accepted one are dropped, and the index wraps at both ends.
//! It also keeps the tween handles of the decorative animations tied to a
//! transition so they can be cancelled before the next one starts.
//!
//! The tween recipes issued on transitions, clicks and startup live here as
//! plain constructors; interpolation itself is the scheduler's job.

use std::time::{Duration, Instant};

use crate::config::SceneDescriptor;
use crate::tween::{Cue, Ease, Timeline, Tween, TweenHandle, TweenProperty, TweenScheduler};

/// Navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// An accepted scene change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: usize,
    pub to: usize,
    /// First arrival at scene 1.
    pub unlock: bool,
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Accepted(Transition),
    /// Within the debounce window of the previous accepted transition.
    Debounced,
    /// The target scene has no decoded asset yet.
    NotReady(usize),
}

/// Handles of animations that a new transition or click supersedes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionTweens {
    pub caption: Option<TweenHandle>,
    pub mesh_z: Option<TweenHandle>,
    pub depth: Option<TweenHandle>,
    pub pulse: Option<TweenHandle>,
    /// Spin started on first arrival at scene 1.
    pub spin: Option<TweenHandle>,
    pub initial: Vec<TweenHandle>,
}

impl TransitionTweens {
    /// Kill the handles a new transition replaces. The initial animation survives.
    pub fn kill_transition<T: TweenScheduler + ?Sized>(&mut self, tweens: &mut T) {
        for handle in [
            self.caption.take(),
            self.mesh_z.take(),
            self.depth.take(),
            self.pulse.take(),
            self.spin.take(),
        ]
        .into_iter()
        .flatten()
        {
            tweens.kill(handle);
        }
    }

    /// Kill the startup animation.
    pub fn kill_initial<T: TweenScheduler + ?Sized>(&mut self, tweens: &mut T) {
        for handle in self.initial.drain(..) {
            tweens.kill(handle);
        }
    }

    /// Kill everything.
    pub fn kill_all<T: TweenScheduler + ?Sized>(&mut self, tweens: &mut T) {
        self.kill_transition(tweens);
        self.kill_initial(tweens);
    }
}

/// Active scene index plus navigation gating.
#[derive(Debug, Clone)]
pub struct SceneController {
    index: usize,
    count: usize,
    debounce: Duration,
    last_accepted: Option<Instant>,
    unlocked: bool,
    /// Animations owned by the current transition.
    pub tweens: TransitionTweens,
}

impl SceneController {
    /// A controller over `count` scenes starting at scene 0.
    pub fn new(count: usize, debounce: Duration) -> Self {
        Self {
            index: 0,
            count: count.max(1),
            debounce,
            last_accepted: None,
            unlocked: false,
            tweens: TransitionTweens::default(),
        }
    }

    /// Active scene index.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of scenes.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether scene 1 has been reached at least once.
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Index one step in `direction` from the active scene, wrapping.
    pub fn neighbour(&self, direction: Direction) -> usize {
        match direction {
            Direction::Next => (self.index + 1) % self.count,
            Direction::Previous => (self.index + self.count - 1) % self.count,
        }
    }

    /// Request a step in `direction` at time `now`.
    ///
    /// `is_ready` reports whether a scene's asset is available. On
    /// acceptance the index and debounce clock are committed immediately.
    pub fn navigate(
        &mut self,
        direction: Direction,
        now: Instant,
        is_ready: impl Fn(usize) -> bool,
    ) -> NavigationOutcome {
        if let Some(last) = self.last_accepted {
            if now.saturating_duration_since(last) < self.debounce {
                return NavigationOutcome::Debounced;
            }
        }
        let to = self.neighbour(direction);
        if !is_ready(to) {
            return NavigationOutcome::NotReady(to);
        }

        let unlock = to == 1 && !self.unlocked;
        self.unlocked |= unlock;
        let from = self.index;
        self.index = to;
        self.last_accepted = Some(now);
        NavigationOutcome::Accepted(Transition { from, to, unlock })
    }
}

/// Caption crossfade: fade and turn out, swap the text, then a late bounce.
pub fn caption_timeline() -> Timeline {
    Timeline::new()
        .tween_at(0.0, Tween::new(TweenProperty::CaptionOpacity, 1.0, 0.0, 0.5))
        .tween_at(
            0.0,
            Tween::new(TweenProperty::CaptionRotation, 0.0, 180.0, 1.0).ease(Ease::Power2Out),
        )
        .cue_at(0.5, Cue::SwapCaption)
        .tween_at(
            2.8,
            Tween::new(TweenProperty::CaptionScale, 1.0, 1.3, 1.0)
                .ease(Ease::elastic_in())
                .repeat(1)
                .yoyo(true),
        )
}

/// Mesh push toward the camera and back.
pub fn mesh_pulse() -> Tween {
    Tween::new(TweenProperty::MeshZ, 0.0, 15.0, 4.0)
        .ease(Ease::elastic_in())
        .repeat(1)
        .yoyo(true)
        .repeat_delay(5.0)
}

/// Depth swell of a freshly activated scene.
pub fn depth_pulse(scene: &SceneDescriptor) -> Tween {
    Tween::new(TweenProperty::Depth, scene.depth, scene.max_depth(), 4.0)
        .ease(Ease::elastic_in())
        .repeat(1)
        .yoyo(true)
        .repeat_delay(5.0)
}

/// One-time spin played on first arrival at scene 1.
pub fn unlock_spin() -> Tween {
    Tween::new(TweenProperty::MeshSpin, 0.5, 0.0, 0.3)
}

/// Startup depth swell of scene 0.
pub fn initial_animation() -> [Tween; 2] {
    [
        Tween::new(TweenProperty::Depth, 0.0, 30.0, 2.0)
            .ease(Ease::elastic_in())
            .delay(2.0),
        Tween::new(TweenProperty::Depth, 30.0, 0.0, 2.0)
            .ease(Ease::elastic_in())
            .delay(4.0),
    ]
}

/// Depth burst started by a click on `scene`.
///
/// Scene 0 pulls back from rest to -500; every other scene swells from its
/// resting depth to its maximum. The burst always starts from the scene's
/// resting depth, never from wherever a cut-short animation left it.
pub fn click_pulse(scene: &SceneDescriptor) -> Tween {
    let (from, to) = if scene.index == 0 {
        (0.0, -500.0)
    } else {
        (scene.depth, scene.max_depth())
    };
    Tween::new(TweenProperty::Depth, from, to, 1.5)
        .ease(Ease::ExpoOut)
        .repeat(1)
        .yoyo(true)
        .repeat_delay(1.5)
}
