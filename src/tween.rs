//! Tween scheduling.
//!
//! Animated values (depth, mesh z, spin, caption state) are driven by
//! [`Tween`]s and [`Timeline`]s started on a [`TweenScheduler`]. Each start
//! returns a [`TweenHandle`] that can later be killed (stopped where it is)
//! or completed (jumped to its end). Kills are idempotent.
//!
//! The scheduler never touches the values itself: [`TweenScheduler::advance`]
//! returns the updates to apply, so the owner stays the single writer.
//!
//! ```ignore
//! let mut tweens = Tweener::new();
//! let handle = tweens.start(
//!     Tween::new(TweenProperty::Depth, 0.0, 30.0, 2.0)
//!         .ease(Ease::elastic_in())
//!         .delay(2.0),
//! );
//! for update in tweens.advance(1.0 / 60.0) {
//!     apply(update);
//! }
//! tweens.kill(handle);
//! ```

use std::f32::consts::TAU;

/// Easing curves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ease {
    Linear,
    /// Quadratic ease-out.
    Power1Out,
    /// Cubic ease-out.
    Power2Out,
    /// Exponential ease-out.
    ExpoOut,
    /// Elastic ease-in with overshoot `amplitude` and oscillation `period`.
    ElasticIn { amplitude: f32, period: f32 },
}

impl Ease {
    /// The elastic ease-in with amplitude 1 and period 0.3.
    pub fn elastic_in() -> Self {
        Ease::ElasticIn {
            amplitude: 1.0,
            period: 0.3,
        }
    }

    /// Map linear progress `p` in `[0, 1]` to eased progress.
    pub fn apply(self, p: f32) -> f32 {
        let p = p.clamp(0.0, 1.0);
        match self {
            Ease::Linear => p,
            Ease::Power1Out => 1.0 - (1.0 - p).powi(2),
            Ease::Power2Out => 1.0 - (1.0 - p).powi(3),
            Ease::ExpoOut => {
                if p >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * p)
                }
            }
            Ease::ElasticIn { amplitude, period } => 1.0 - elastic_out(1.0 - p, amplitude, period),
        }
    }
}

fn elastic_out(p: f32, amplitude: f32, period: f32) -> f32 {
    if p >= 1.0 {
        return 1.0;
    }
    let a = amplitude.max(1.0);
    let period = period / amplitude.min(1.0);
    let shift = period / TAU * (1.0 / a).asin();
    a * 2f32.powf(-10.0 * p) * ((p - shift) * TAU / period).sin() + 1.0
}

/// Animatable values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TweenProperty {
    /// Shader depth magnitude.
    Depth,
    /// Mesh translation along z.
    MeshZ,
    /// Extra mesh rotation about z.
    MeshSpin,
    CaptionOpacity,
    /// Caption rotation in degrees.
    CaptionRotation,
    CaptionScale,
}

/// Timeline callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Replace the visible caption with the pending one.
    SwapCaption,
}

/// A single property animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub property: TweenProperty,
    pub from: f32,
    pub to: f32,
    /// Length of one play-through in seconds.
    pub duration: f32,
    pub ease: Ease,
    /// Seconds before the first play-through starts.
    pub delay: f32,
    /// Extra play-throughs after the first.
    pub repeat: u32,
    /// Alternate direction on every repeat.
    pub yoyo: bool,
    /// Pause between play-throughs in seconds.
    pub repeat_delay: f32,
}

impl Tween {
    pub fn new(property: TweenProperty, from: f32, to: f32, duration: f32) -> Self {
        Self {
            property,
            from,
            to,
            duration,
            ease: Ease::Linear,
            delay: 0.0,
            repeat: 0,
            yoyo: false,
            repeat_delay: 0.0,
        }
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn repeat(mut self, repeat: u32) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    pub fn repeat_delay(mut self, repeat_delay: f32) -> Self {
        self.repeat_delay = repeat_delay;
        self
    }

    /// Seconds from start (including delay) to the final value.
    pub fn total_duration(&self) -> f32 {
        self.delay
            + self.duration * (self.repeat + 1) as f32
            + self.repeat_delay * self.repeat as f32
    }

    /// Value at `t` seconds after the tween was started.
    pub fn value_at(&self, t: f32) -> f32 {
        let t = t - self.delay;
        if t <= 0.0 {
            return self.from;
        }
        if t >= self.total_duration() - self.delay {
            return self.final_value();
        }
        let cycle = self.duration + self.repeat_delay;
        let iteration = if cycle > 0.0 {
            ((t / cycle).floor() as u32).min(self.repeat)
        } else {
            self.repeat
        };
        let within = t - cycle * iteration as f32;
        let progress = if self.duration > 0.0 {
            (within / self.duration).min(1.0)
        } else {
            1.0
        };
        let reversed = self.yoyo && iteration % 2 == 1;
        let eased = if reversed {
            self.ease.apply(1.0 - progress)
        } else {
            self.ease.apply(progress)
        };
        self.from + (self.to - self.from) * eased
    }

    /// The value left behind when the tween finishes.
    pub fn final_value(&self) -> f32 {
        if self.yoyo && self.repeat % 2 == 1 {
            self.from
        } else {
            self.to
        }
    }
}

/// One entry on a [`Timeline`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelineStep {
    Tween(Tween),
    Cue(Cue),
}

/// Steps placed at absolute offsets on a shared clock.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    steps: Vec<(f32, TimelineStep)>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `tween` starting `at` seconds into the timeline.
    pub fn tween_at(mut self, at: f32, tween: Tween) -> Self {
        self.steps.push((at, TimelineStep::Tween(tween)));
        self
    }

    /// Fire `cue` `at` seconds into the timeline.
    pub fn cue_at(mut self, at: f32, cue: Cue) -> Self {
        self.steps.push((at, TimelineStep::Cue(cue)));
        self
    }

    pub fn steps(&self) -> &[(f32, TimelineStep)] {
        &self.steps
    }

    /// Seconds until the last step finishes.
    pub fn total_duration(&self) -> f32 {
        self.steps
            .iter()
            .map(|(at, step)| match step {
                TimelineStep::Tween(t) => at + t.total_duration(),
                TimelineStep::Cue(_) => *at,
            })
            .fold(0.0, f32::max)
    }
}

/// Identifies a started tween or timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TweenHandle(u64);

/// Something the owner of the animated values must apply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenUpdate {
    Value { property: TweenProperty, value: f32 },
    Cue(Cue),
}

/// Starts, stops and advances animations.
pub trait TweenScheduler {
    /// Start a single tween.
    fn start(&mut self, tween: Tween) -> TweenHandle;

    /// Start a timeline.
    fn start_timeline(&mut self, timeline: Timeline) -> TweenHandle;

    /// Stop an animation where it is. Unknown or finished handles are ignored.
    fn kill(&mut self, handle: TweenHandle);

    /// Jump an animation to its end, returning its final values and pending cues.
    fn complete(&mut self, handle: TweenHandle) -> Vec<TweenUpdate>;

    /// Stop every animation.
    fn kill_all(&mut self);

    /// Whether `handle` is still running.
    fn is_active(&self, handle: TweenHandle) -> bool;

    /// Advance the clock by `dt` seconds.
    fn advance(&mut self, dt: f32) -> Vec<TweenUpdate>;
}

#[derive(Debug)]
struct Running {
    handle: TweenHandle,
    elapsed: f32,
    steps: Vec<(f32, TimelineStep, bool)>,
}

impl Running {
    fn step(&mut self, dt: f32, out: &mut Vec<TweenUpdate>) {
        self.elapsed += dt;
        for (at, step, done) in self.steps.iter_mut().filter(|(_, _, done)| !*done) {
            let local = self.elapsed - *at;
            match step {
                TimelineStep::Cue(cue) => {
                    if local >= 0.0 {
                        out.push(TweenUpdate::Cue(*cue));
                        *done = true;
                    }
                }
                TimelineStep::Tween(tween) => {
                    if local < tween.delay {
                        continue;
                    }
                    let finished = local >= tween.total_duration();
                    let value = if finished {
                        tween.final_value()
                    } else {
                        tween.value_at(local)
                    };
                    out.push(TweenUpdate::Value {
                        property: tween.property,
                        value,
                    });
                    *done = finished;
                }
            }
        }
    }

    fn finish(self, out: &mut Vec<TweenUpdate>) {
        for (_, step, done) in self.steps {
            if done {
                continue;
            }
            out.push(match step {
                TimelineStep::Cue(cue) => TweenUpdate::Cue(cue),
                TimelineStep::Tween(tween) => TweenUpdate::Value {
                    property: tween.property,
                    value: tween.final_value(),
                },
            });
        }
    }

    fn is_done(&self) -> bool {
        self.steps.iter().all(|(_, _, done)| *done)
    }
}

/// In-process [`TweenScheduler`].
#[derive(Debug, Default)]
pub struct Tweener {
    next_id: u64,
    running: Vec<Running>,
}

impl Tweener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of running animations.
    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    fn push(&mut self, steps: Vec<(f32, TimelineStep)>) -> TweenHandle {
        let handle = TweenHandle(self.next_id);
        self.next_id += 1;
        self.running.push(Running {
            handle,
            elapsed: 0.0,
            steps: steps.into_iter().map(|(at, s)| (at, s, false)).collect(),
        });
        handle
    }
}

impl TweenScheduler for Tweener {
    fn start(&mut self, tween: Tween) -> TweenHandle {
        self.push(vec![(0.0, TimelineStep::Tween(tween))])
    }

    fn start_timeline(&mut self, timeline: Timeline) -> TweenHandle {
        self.push(timeline.steps)
    }

    fn kill(&mut self, handle: TweenHandle) {
        self.running.retain(|r| r.handle != handle);
    }

    fn complete(&mut self, handle: TweenHandle) -> Vec<TweenUpdate> {
        let mut out = Vec::new();
        if let Some(pos) = self.running.iter().position(|r| r.handle == handle) {
            self.running.remove(pos).finish(&mut out);
        }
        out
    }

    fn kill_all(&mut self) {
        self.running.clear();
    }

    fn is_active(&self, handle: TweenHandle) -> bool {
        self.running.iter().any(|r| r.handle == handle)
    }

    fn advance(&mut self, dt: f32) -> Vec<TweenUpdate> {
        let mut out = Vec::new();
        for running in &mut self.running {
            running.step(dt, &mut out);
        }
        self.running.retain(|r| !r.is_done());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(updates: &[TweenUpdate], property: TweenProperty) -> Vec<f32> {
        updates
            .iter()
            .filter_map(|u| match u {
                TweenUpdate::Value { property: p, value } if *p == property => Some(*value),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_ease_endpoints() {
        for ease in [
            Ease::Linear,
            Ease::Power1Out,
            Ease::Power2Out,
            Ease::ExpoOut,
            Ease::elastic_in(),
        ] {
            assert!(ease.apply(0.0).abs() < 1e-5, "{:?}", ease);
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-5, "{:?}", ease);
        }
    }

    #[test]
    fn test_elastic_in_undershoots() {
        let ease = Ease::elastic_in();
        let min = (1..100)
            .map(|i| ease.apply(i as f32 / 100.0))
            .fold(f32::MAX, f32::min);
        assert!(min < 0.0);
    }

    #[test]
    fn test_power2_out_front_loaded() {
        assert!(Ease::Power2Out.apply(0.5) > 0.8);
        assert_eq!(Ease::Power2Out.apply(0.5), 0.875);
    }

    #[test]
    fn test_value_respects_delay() {
        let t = Tween::new(TweenProperty::Depth, 0.0, 10.0, 1.0).delay(2.0);
        assert_eq!(t.value_at(1.0), 0.0);
        assert_eq!(t.value_at(2.5), 5.0);
        assert_eq!(t.value_at(3.5), 10.0);
        assert_eq!(t.total_duration(), 3.0);
    }

    #[test]
    fn test_yoyo_returns_to_start() {
        let t = Tween::new(TweenProperty::MeshZ, 0.0, 15.0, 4.0)
            .repeat(1)
            .yoyo(true)
            .repeat_delay(5.0);
        assert_eq!(t.total_duration(), 13.0);
        assert_eq!(t.value_at(4.0), 15.0);
        // Holds the peak through the repeat delay
        assert_eq!(t.value_at(8.0), 15.0);
        assert_eq!(t.value_at(11.0), 7.5);
        assert_eq!(t.final_value(), 0.0);
        assert_eq!(t.value_at(20.0), 0.0);
    }

    #[test]
    fn test_advance_emits_only_while_active() {
        let mut tweens = Tweener::new();
        tweens.start(Tween::new(TweenProperty::Depth, 0.0, 30.0, 2.0).delay(2.0));

        assert!(tweens.advance(1.0).is_empty());
        let mid = tweens.advance(2.0);
        assert_eq!(values(&mid, TweenProperty::Depth), vec![15.0]);
        let end = tweens.advance(5.0);
        assert_eq!(values(&end, TweenProperty::Depth), vec![30.0]);
        assert!(tweens.is_empty());
        assert!(tweens.advance(1.0).is_empty());
    }

    #[test]
    fn test_kill_is_idempotent_and_silent() {
        let mut tweens = Tweener::new();
        let h = tweens.start(Tween::new(TweenProperty::MeshZ, 0.0, 1.0, 1.0));
        tweens.advance(0.5);
        tweens.kill(h);
        tweens.kill(h);
        assert!(!tweens.is_active(h));
        assert!(tweens.advance(1.0).is_empty());
    }

    #[test]
    fn test_complete_jumps_to_final_value() {
        let mut tweens = Tweener::new();
        let h = tweens.start(
            Tween::new(TweenProperty::Depth, 0.0, 30.0, 1.5)
                .repeat(1)
                .yoyo(true),
        );
        tweens.advance(0.2);
        let updates = tweens.complete(h);
        assert_eq!(values(&updates, TweenProperty::Depth), vec![0.0]);
        assert!(!tweens.is_active(h));
        assert!(tweens.complete(h).is_empty());
    }

    #[test]
    fn test_timeline_fires_cue_once_at_offset() {
        let mut tweens = Tweener::new();
        tweens.start_timeline(
            Timeline::new()
                .tween_at(0.0, Tween::new(TweenProperty::CaptionOpacity, 1.0, 0.0, 0.5))
                .cue_at(0.5, Cue::SwapCaption),
        );
        let first = tweens.advance(0.25);
        assert!(!first.contains(&TweenUpdate::Cue(Cue::SwapCaption)));
        let second = tweens.advance(0.3);
        assert_eq!(
            second
                .iter()
                .filter(|u| **u == TweenUpdate::Cue(Cue::SwapCaption))
                .count(),
            1
        );
        assert!(tweens.advance(0.3).is_empty());
    }

    #[test]
    fn test_timeline_total_duration() {
        let tl = Timeline::new()
            .tween_at(0.0, Tween::new(TweenProperty::CaptionRotation, 0.0, 180.0, 1.0))
            .tween_at(
                2.8,
                Tween::new(TweenProperty::CaptionScale, 1.0, 1.3, 1.0)
                    .repeat(1)
                    .yoyo(true),
            );
        assert!((tl.total_duration() - 4.8).abs() < 1e-5);
    }
}
