//! Time-based tweens over scene element properties.
//!
//! A tween interpolates one or more numeric [`Property`] values of a scene
//! element from the value they hold when the tween starts to a target value.
//! [`Tweens::start`] returns a [`TweenHandle`]; the caller polls
//! [`Tweens::is_complete`] to sequence work after a tween ends.
//!
//! # Example
//!
//! ```
//! use pixel_zoom::{ElementId, Property, SceneGraph, TweenSpec, Tweens};
//! # use pixel_zoom::{Sprite, TextureId, TextureRef};
//!
//! let mut scene = SceneGraph::new();
//! # scene.add_primary(Sprite::still(TextureRef::new(TextureId::new(0), 4, 4)));
//! let mut tweens = Tweens::new();
//!
//! let fade = tweens
//!     .start(&scene, ElementId::Primary, TweenSpec::new(0.6).to(Property::Alpha, 0.0))
//!     .unwrap();
//!
//! tweens.update(&mut scene, 0.6);
//! assert!(tweens.is_complete(fade));
//! ```

use std::collections::HashSet;

use log::{debug, warn};

use crate::scene::{ElementId, SceneGraph};

/// Easing functions for tweens.
///
/// These control the acceleration curve of an animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    /// Constant speed throughout.
    #[default]
    Linear,
    /// Start slow, accelerate.
    EaseIn,
    /// Start fast, decelerate.
    EaseOut,
    /// Start slow, speed up, then slow down (quadratic).
    EaseInOut,
}

impl Easing {
    /// Apply the easing function to a linear progress value (0.0 to 1.0).
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// A numeric property a tween can drive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    Alpha,
    ScaleX,
    ScaleY,
}

/// How often a tween runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Repeat {
    #[default]
    Once,
    /// Runs until killed. With `yoyo` every other cycle plays backwards.
    Forever { yoyo: bool },
}

/// Identifies a started tween.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TweenHandle(u64);

/// Description of a tween before it starts.
#[derive(Clone, Debug, PartialEq)]
pub struct TweenSpec {
    targets: Vec<(Property, f32)>,
    duration: f32,
    easing: Easing,
    repeat: Repeat,
}

impl TweenSpec {
    /// A linear, one-shot tween lasting `duration` seconds.
    pub fn new(duration: f32) -> Self {
        Self {
            targets: Vec::new(),
            duration,
            easing: Easing::Linear,
            repeat: Repeat::Once,
        }
    }

    /// Add a property and the value it should reach.
    pub fn to(mut self, property: Property, value: f32) -> Self {
        self.targets.push((property, value));
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Repeat forever, reversing direction each cycle.
    pub fn yoyo_forever(self) -> Self {
        self.repeat(Repeat::Forever { yoyo: true })
    }
}

#[derive(Debug)]
struct Channel {
    property: Property,
    from: f32,
    to: f32,
}

#[derive(Debug)]
struct ActiveTween {
    handle: TweenHandle,
    target: ElementId,
    channels: Vec<Channel>,
    duration: f32,
    easing: Easing,
    repeat: Repeat,
    elapsed: f32,
}

impl ActiveTween {
    /// Linear progress of the current cycle and whether the tween is done.
    fn progress(&self) -> (f32, bool) {
        if self.duration <= 0.0 {
            return (1.0, true);
        }

        match self.repeat {
            Repeat::Once => {
                let p = self.elapsed / self.duration;
                if p >= 1.0 { (1.0, true) } else { (p, false) }
            }
            Repeat::Forever { yoyo } => {
                let cycle = (self.elapsed / self.duration).floor();
                let local = (self.elapsed - cycle * self.duration) / self.duration;
                let reversed = yoyo && (cycle as u64) % 2 == 1;
                (if reversed { 1.0 - local } else { local }, false)
            }
        }
    }

    fn cycles(&self) -> u32 {
        if self.duration <= 0.0 {
            return 0;
        }
        (self.elapsed / self.duration).floor() as u32
    }
}

/// Runs all active tweens against a [`SceneGraph`].
#[derive(Debug, Default)]
pub struct Tweens {
    next_id: u64,
    active: Vec<ActiveTween>,
    completed: HashSet<TweenHandle>,
}

impl Tweens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a tween on `target`, capturing current values as start points.
    ///
    /// Returns `None` if the element is not in the scene.
    pub fn start(
        &mut self,
        scene: &SceneGraph,
        target: ElementId,
        spec: TweenSpec,
    ) -> Option<TweenHandle> {
        if !scene.contains(target) {
            warn!("tween target {:?} is not in the scene", target);
            return None;
        }

        let channels = spec
            .targets
            .iter()
            .filter_map(|&(property, to)| {
                scene.get(target, property).map(|from| Channel { property, from, to })
            })
            .collect();

        let handle = TweenHandle(self.next_id);
        self.next_id += 1;

        self.active.push(ActiveTween {
            handle,
            target,
            channels,
            duration: spec.duration.max(0.0),
            easing: spec.easing,
            repeat: spec.repeat,
            elapsed: 0.0,
        });

        Some(handle)
    }

    /// Advance every tween by `dt` seconds and write the values into `scene`.
    ///
    /// Returns the handles that finished during this update. A finishing
    /// tween writes its exact target values.
    pub fn update(&mut self, scene: &mut SceneGraph, dt: f32) -> Vec<TweenHandle> {
        let mut finished = Vec::new();
        let dt = dt.max(0.0);

        self.active.retain_mut(|tween| {
            if !scene.contains(tween.target) {
                debug!("dropping tween on removed element {:?}", tween.target);
                return false;
            }

            tween.elapsed += dt;
            let (progress, done) = tween.progress();
            let eased = tween.easing.apply(progress);

            for channel in &tween.channels {
                let value = if done {
                    channel.to
                } else {
                    channel.from + (channel.to - channel.from) * eased
                };
                scene.set(tween.target, channel.property, value);
            }

            if done {
                finished.push(tween.handle);
            }
            !done
        });

        self.completed.extend(finished.iter().copied());
        finished
    }

    /// `true` once the tween ran to its end. Killed tweens never complete.
    pub fn is_complete(&self, handle: TweenHandle) -> bool {
        self.completed.contains(&handle)
    }

    pub fn is_active(&self, handle: TweenHandle) -> bool {
        self.active.iter().any(|t| t.handle == handle)
    }

    /// Full cycles a running tween has gone through.
    pub fn cycles(&self, handle: TweenHandle) -> Option<u32> {
        self.active
            .iter()
            .find(|t| t.handle == handle)
            .map(ActiveTween::cycles)
    }

    /// Move the end value of one channel of a running tween.
    ///
    /// The start value is rescaled by the same ratio, so a scale tween keeps
    /// the same relative progress toward its new target. Returns `false` if
    /// the tween is no longer running or does not drive `property`.
    pub fn retarget(&mut self, handle: TweenHandle, property: Property, to: f32) -> bool {
        let channel = self
            .active
            .iter_mut()
            .find(|t| t.handle == handle)
            .and_then(|t| t.channels.iter_mut().find(|c| c.property == property));
        let Some(channel) = channel else {
            return false;
        };

        if channel.to != 0.0 {
            channel.from *= to / channel.to;
        }
        channel.to = to;
        true
    }

    /// Stop every tween on `target` without completing it.
    pub fn kill_target(&mut self, target: ElementId) -> usize {
        let before = self.active.len();
        self.active.retain(|t| t.target != target);
        before - self.active.len()
    }

    /// Stop all tweens.
    pub fn kill_all(&mut self) -> usize {
        let count = self.active.len();
        self.active.clear();
        count
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Color;
    use crate::scene::{Label, Sprite, TextureId, TextureRef};

    fn scene() -> SceneGraph {
        let mut scene = SceneGraph::new();
        let mut sprite = Sprite::still(TextureRef::new(TextureId::new(0), 4, 4));
        sprite.alpha = 0.0;
        sprite.scale = glam::Vec2::splat(8.0);
        scene.add_primary(sprite);
        let mut label = Label::new("click", 12.0, Color::WHITE);
        label.alpha = 0.0;
        scene.add_label(label);
        scene
    }

    #[test]
    fn easing_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::EaseIn,
            Easing::EaseOut,
            Easing::EaseInOut,
        ] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
        }
        assert_eq!(Easing::EaseInOut.apply(0.5), 0.5);
        assert!(Easing::EaseInOut.apply(0.25) < 0.25);
        assert!(Easing::EaseInOut.apply(0.75) > 0.75);
    }

    #[test]
    fn fade_in_interpolates_then_completes() {
        let mut scene = scene();
        let mut tweens = Tweens::new();
        let fade = tweens
            .start(
                &scene,
                ElementId::Primary,
                TweenSpec::new(0.6).to(Property::Alpha, 1.0),
            )
            .unwrap();

        tweens.update(&mut scene, 0.3);
        let alpha = scene.primary().unwrap().alpha;
        assert!((alpha - 0.5).abs() < 1e-5);
        assert!(!tweens.is_complete(fade));

        let done = tweens.update(&mut scene, 0.3);
        assert_eq!(done, vec![fade]);
        assert_eq!(scene.primary().unwrap().alpha, 1.0);
        assert!(tweens.is_complete(fade));
        assert!(!tweens.is_active(fade));
    }

    #[test]
    fn multi_channel_tween_lands_exactly_on_targets() {
        let mut scene = scene();
        let mut tweens = Tweens::new();
        let zoom = tweens
            .start(
                &scene,
                ElementId::Primary,
                TweenSpec::new(1.0)
                    .to(Property::ScaleX, 1.0)
                    .to(Property::ScaleY, 1.0)
                    .easing(Easing::EaseInOut),
            )
            .unwrap();

        for _ in 0..7 {
            tweens.update(&mut scene, 1.0 / 7.0);
        }
        tweens.update(&mut scene, 0.01);

        assert!(tweens.is_complete(zoom));
        assert_eq!(scene.primary().unwrap().scale, glam::Vec2::ONE);
    }

    #[test]
    fn yoyo_pulse_runs_until_target_removed() {
        let mut scene = scene();
        let mut tweens = Tweens::new();
        let pulse = tweens
            .start(
                &scene,
                ElementId::Label,
                TweenSpec::new(1.0).to(Property::Alpha, 1.0).yoyo_forever(),
            )
            .unwrap();

        // Top of the first cycle, then back down during the second
        tweens.update(&mut scene, 0.999);
        assert!(scene.label().unwrap().alpha > 0.99);
        tweens.update(&mut scene, 0.501);
        assert!((scene.label().unwrap().alpha - 0.5).abs() < 1e-3);

        for _ in 0..100 {
            tweens.update(&mut scene, 0.25);
        }
        assert!(tweens.is_active(pulse));
        assert!(tweens.cycles(pulse).unwrap() >= 25);

        scene.remove_label();
        tweens.update(&mut scene, 0.1);
        assert!(!tweens.is_active(pulse));
        assert!(!tweens.is_complete(pulse));
    }

    #[test]
    fn missing_target_is_rejected() {
        let mut scene = scene();
        scene.remove_label();
        let mut tweens = Tweens::new();
        let handle = tweens.start(
            &scene,
            ElementId::Label,
            TweenSpec::new(1.0).to(Property::Alpha, 1.0),
        );
        assert!(handle.is_none());
        assert_eq!(tweens.active_count(), 0);
    }

    #[test]
    fn retargeted_scale_keeps_progress_and_lands_on_new_target() {
        let mut scene = scene();
        let mut tweens = Tweens::new();
        let zoom = tweens
            .start(
                &scene,
                ElementId::Primary,
                TweenSpec::new(1.0).to(Property::ScaleX, 1.0),
            )
            .unwrap();

        // Halfway from 8 to 1
        tweens.update(&mut scene, 0.5);
        assert!((scene.primary().unwrap().scale.x - 4.5).abs() < 1e-5);

        // Doubling the target doubles the whole curve
        assert!(tweens.retarget(zoom, Property::ScaleX, 2.0));
        assert!(!tweens.retarget(zoom, Property::Alpha, 0.0));
        tweens.update(&mut scene, 0.0);
        assert!((scene.primary().unwrap().scale.x - 9.0).abs() < 1e-5);

        tweens.update(&mut scene, 0.5);
        assert!(tweens.is_complete(zoom));
        assert_eq!(scene.primary().unwrap().scale.x, 2.0);
        assert!(!tweens.retarget(zoom, Property::ScaleX, 3.0));
    }

    #[test]
    fn killed_tween_never_completes() {
        let mut scene = scene();
        let mut tweens = Tweens::new();
        let fade = tweens
            .start(
                &scene,
                ElementId::Label,
                TweenSpec::new(1.0).to(Property::Alpha, 1.0),
            )
            .unwrap();

        assert_eq!(tweens.kill_target(ElementId::Label), 1);
        tweens.update(&mut scene, 2.0);
        assert!(!tweens.is_complete(fade));
        assert_eq!(scene.label().unwrap().alpha, 0.0);
    }

    #[test]
    fn zero_duration_completes_on_first_update() {
        let mut scene = scene();
        let mut tweens = Tweens::new();
        let snap = tweens
            .start(
                &scene,
                ElementId::Primary,
                TweenSpec::new(0.0).to(Property::Alpha, 0.75),
            )
            .unwrap();
        tweens.update(&mut scene, 0.0);
        assert!(tweens.is_complete(snap));
        assert_eq!(scene.primary().unwrap().alpha, 0.75);
    }
}
