//! The click gate and the exit sequence it starts.
//!
//! ```text
//!   Armed ──first press──▶ Zooming ──zoom tween done──▶ Completed
//!     │                       │
//!     └────────stop()─────────┴──────────▶ Detached
//! ```
//!
//! The gate flips exactly once per session. Presses after the first are
//! ignored, so the exit zoom can never run twice.

use log::{debug, info, warn};

use crate::config::Timings;
use crate::scene::{ElementId, SceneGraph};
use crate::tween::{Property, TweenHandle, TweenSpec, Tweens};

/// Where the exit sequence currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitState {
    /// Waiting for the first press.
    Armed,
    /// The exit zoom is running.
    Zooming { zoom: TweenHandle },
    /// The zoom finished and the completion hook has been released.
    Completed,
    /// Input listener detached; nothing further happens.
    Detached,
}

/// Handles pointer input for one session.
#[derive(Debug)]
pub struct Interaction {
    state: ExitState,
    gate: bool,
    ignored_presses: u32,
}

impl Default for Interaction {
    fn default() -> Self {
        Self {
            state: ExitState::Armed,
            gate: false,
            ignored_presses: 0,
        }
    }
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ExitState {
        self.state
    }

    /// `true` once the first press was accepted. Never resets.
    pub fn is_triggered(&self) -> bool {
        self.gate
    }

    /// Presses that arrived after the gate closed.
    pub fn ignored_presses(&self) -> u32 {
        self.ignored_presses
    }

    /// Handle a pointer press.
    ///
    /// On the first press this fades the label out (if there is one) and
    /// starts the exit zoom, which divides the primary sprite's current
    /// scale by `zoom_factor`. Returns `true` if this press started the
    /// sequence.
    pub fn pointer_down(
        &mut self,
        scene: &SceneGraph,
        tweens: &mut Tweens,
        zoom_factor: f32,
        timings: &Timings,
    ) -> bool {
        if self.gate || self.state != ExitState::Armed {
            self.ignored_presses += 1;
            debug!("ignoring press in state {:?}", self.state);
            return false;
        }

        let Some(primary) = scene.primary() else {
            warn!("press before the primary sprite exists; staying armed");
            return false;
        };
        let scale = primary.scale;

        self.gate = true;

        if scene.contains(ElementId::Label) {
            tweens.kill_target(ElementId::Label);
            tweens.start(
                scene,
                ElementId::Label,
                TweenSpec::new(timings.label_fade_out).to(Property::Alpha, 0.0),
            );
        }

        let spec = TweenSpec::new(timings.exit_zoom)
            .to(Property::ScaleX, scale.x / zoom_factor)
            .to(Property::ScaleY, scale.y / zoom_factor)
            .easing(timings.exit_easing);

        match tweens.start(scene, ElementId::Primary, spec) {
            Some(zoom) => {
                info!("zooming out from {:.3}x{:.3}", scale.x, scale.y);
                self.state = ExitState::Zooming { zoom };
            }
            None => {
                // Unreachable while the primary exists; keep the gate closed
                self.state = ExitState::Completed;
            }
        }
        true
    }

    /// Check whether the exit zoom has finished.
    ///
    /// Returns `true` exactly once, on the poll that observes completion.
    pub fn poll(&mut self, tweens: &Tweens) -> bool {
        match self.state {
            ExitState::Zooming { zoom } if tweens.is_complete(zoom) => {
                self.state = ExitState::Completed;
                true
            }
            _ => false,
        }
    }

    /// Detach from input. Later presses are ignored and a running zoom will
    /// never report completion.
    pub fn detach(&mut self) {
        if self.state != ExitState::Detached {
            debug!("input detached in state {:?}", self.state);
            self.state = ExitState::Detached;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Color;
    use crate::scene::{Label, Sprite, TextureId, TextureRef};
    use glam::Vec2;

    fn scene(with_label: bool) -> SceneGraph {
        let mut scene = SceneGraph::new();
        let mut sprite = Sprite::still(TextureRef::new(TextureId::new(0), 32, 32));
        sprite.scale = Vec2::splat(80.0);
        scene.add_primary(sprite);
        if with_label {
            scene.add_label(Label::new("click", 28.0, Color::WHITE));
        }
        scene
    }

    #[test]
    fn first_press_triggers_second_is_ignored() {
        let mut scene = scene(true);
        let mut tweens = Tweens::new();
        let mut interaction = Interaction::new();
        let timings = Timings::default();

        assert!(interaction.pointer_down(&scene, &mut tweens, 8.0, &timings));
        assert!(interaction.is_triggered());
        let started = tweens.active_count();
        assert_eq!(started, 2);

        assert!(!interaction.pointer_down(&scene, &mut tweens, 8.0, &timings));
        assert_eq!(tweens.active_count(), started);
        assert_eq!(interaction.ignored_presses(), 1);

        tweens.update(&mut scene, 0.5);
        assert!(!interaction.poll(&tweens));
        tweens.update(&mut scene, 0.5);
        assert!(interaction.poll(&tweens));
        assert!(!interaction.poll(&tweens));
        assert_eq!(interaction.state(), ExitState::Completed);
        assert_eq!(scene.primary().unwrap().scale, Vec2::splat(10.0));
        assert_eq!(scene.label().unwrap().alpha, 0.0);

        // Still ignored after completion
        assert!(!interaction.pointer_down(&scene, &mut tweens, 8.0, &timings));
        assert!(interaction.is_triggered());
    }

    #[test]
    fn press_without_label_only_zooms() {
        let scene = scene(false);
        let mut tweens = Tweens::new();
        let mut interaction = Interaction::new();

        assert!(interaction.pointer_down(&scene, &mut tweens, 8.0, &Timings::default()));
        assert_eq!(tweens.active_count(), 1);
        assert!(matches!(interaction.state(), ExitState::Zooming { .. }));
    }

    #[test]
    fn press_before_mount_keeps_gate_open() {
        let scene = SceneGraph::new();
        let mut tweens = Tweens::new();
        let mut interaction = Interaction::new();

        assert!(!interaction.pointer_down(&scene, &mut tweens, 8.0, &Timings::default()));
        assert!(!interaction.is_triggered());
        assert_eq!(interaction.state(), ExitState::Armed);
    }

    #[test]
    fn detached_never_completes() {
        let mut scene = scene(false);
        let mut tweens = Tweens::new();
        let mut interaction = Interaction::new();

        interaction.pointer_down(&scene, &mut tweens, 8.0, &Timings::default());
        interaction.detach();
        tweens.update(&mut scene, 5.0);
        assert!(!interaction.poll(&tweens));
        assert_eq!(interaction.state(), ExitState::Detached);
    }

    #[test]
    fn detached_ignores_presses() {
        let scene = scene(false);
        let mut tweens = Tweens::new();
        let mut interaction = Interaction::new();

        interaction.detach();
        assert!(!interaction.pointer_down(&scene, &mut tweens, 8.0, &Timings::default()));
        assert_eq!(tweens.active_count(), 0);
    }
}
