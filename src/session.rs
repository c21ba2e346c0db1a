//! One run of the effect, independent of any GPU.
//!
//! A [`Session`] is mounted once the assets have resolved. It owns the scene
//! graph, the tween driver and the interaction state machine, and advances
//! all of them on [`Session::tick`]. The renderer only reads from it, which
//! keeps the whole sequence testable without a window.

use log::{debug, info};

use crate::config::{AppConfig, AssetSource, LabelConfig};
use crate::error::{Error, Result};
use crate::interaction::{ExitState, Interaction};
use crate::layout::{SurfaceInfo, base_scale, label_position, place_primary};
use crate::scene::{ElementId, FlipBook, Label, SceneGraph, Sprite, TextureRef};
use crate::tween::{Property, TweenHandle, TweenSpec, Tweens};

/// What the completion hook can see and change once the zoom has finished.
pub struct ZoomComplete<'a> {
    surface: SurfaceInfo,
    scene: &'a mut SceneGraph,
    tweens: &'a mut Tweens,
}

impl ZoomComplete<'_> {
    pub fn surface(&self) -> SurfaceInfo {
        self.surface
    }

    pub fn primary(&self) -> Option<&Sprite> {
        self.scene.primary()
    }

    pub fn primary_mut(&mut self) -> Option<&mut Sprite> {
        self.scene.primary_mut()
    }

    pub fn has_label(&self) -> bool {
        self.scene.contains(ElementId::Label)
    }

    /// Remove the label together with any tween still driving it.
    pub fn remove_label(&mut self) -> Option<Label> {
        self.tweens.kill_target(ElementId::Label);
        self.scene.remove_label()
    }

    pub fn scene(&self) -> &SceneGraph {
        self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        self.scene
    }

    pub fn tweens_mut(&mut self) -> &mut Tweens {
        self.tweens
    }
}

/// Called once, after the exit zoom completes.
pub type CompletionHook = Box<dyn FnOnce(&mut ZoomComplete<'_>)>;

/// Hook used when none is supplied: drop the label and log.
pub fn default_completion_hook() -> CompletionHook {
    Box::new(|done: &mut ZoomComplete<'_>| {
        if done.remove_label().is_some() {
            info!("zoom complete, label removed");
        } else {
            info!("zoom complete");
        }
    })
}

/// Scene, tweens and interaction for a single mounted effect.
pub struct Session {
    config: AppConfig,
    surface: SurfaceInfo,
    scene: SceneGraph,
    tweens: Tweens,
    interaction: Interaction,
    hook: Option<CompletionHook>,
    completions: u32,
    fade_in: Option<TweenHandle>,
    pulse: Option<TweenHandle>,
    elapsed: f32,
}

impl Session {
    /// Place the primary sprite (and label) and start their fade-ins.
    ///
    /// `frames` are the uploaded textures in playback order: one for a still
    /// image, the whole sequence for a flip-book.
    pub fn mount(
        config: AppConfig,
        frames: Vec<TextureRef>,
        surface: SurfaceInfo,
        hook: CompletionHook,
    ) -> Result<Self> {
        let mut sprite = match &config.source {
            AssetSource::Still { path } => {
                let texture = frames
                    .first()
                    .copied()
                    .ok_or_else(|| Error::NoFrames(path.clone()))?;
                Sprite::still(texture)
            }
            AssetSource::FrameSequence(seq) => {
                let book = FlipBook::new(frames, config.playback)
                    .ok_or_else(|| Error::NoFrames(seq.dir.clone()))?;
                Sprite::animated(book)
            }
        };

        let layout = place_primary(
            config.effective_placement(),
            &surface,
            sprite.texture_size(),
            config.effective_zoom(),
        );
        sprite.position = layout.position;
        sprite.scale = layout.scale;
        sprite.alpha = 0.0;

        let mut scene = SceneGraph::new();
        let mut tweens = Tweens::new();

        scene.add_primary(sprite);
        let fade_in = tweens.start(
            &scene,
            ElementId::Primary,
            TweenSpec::new(config.timings.sprite_fade_in).to(Property::Alpha, 1.0),
        );

        let pulse = config.label.as_ref().and_then(|label| {
            scene.add_label(build_label(label, &surface));
            tweens.start(
                &scene,
                ElementId::Label,
                TweenSpec::new(config.timings.label_pulse)
                    .to(Property::Alpha, 1.0)
                    .yoyo_forever(),
            )
        });

        info!(
            "mounted {} sprite at scale {:.3} on {}x{} surface",
            if config.source.is_animated() { "animated" } else { "still" },
            layout.scale.x,
            surface.width,
            surface.height,
        );

        Ok(Self {
            config,
            surface,
            scene,
            tweens,
            interaction: Interaction::new(),
            hook: Some(hook),
            completions: 0,
            fade_in,
            pulse,
            elapsed: 0.0,
        })
    }

    /// Forward a pointer press to the click gate.
    pub fn pointer_down(&mut self) -> bool {
        let triggered = self.interaction.pointer_down(
            &self.scene,
            &mut self.tweens,
            self.config.effective_zoom(),
            &self.config.timings,
        );
        if triggered {
            self.pulse = None;
        }
        triggered
    }

    /// Advance playback, tweens and the exit sequence by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.elapsed += dt;

        self.scene.update(dt);
        self.tweens.update(&mut self.scene, dt);

        if self.interaction.poll(&self.tweens) {
            self.complete();
        }
    }

    fn complete(&mut self) {
        let Some(hook) = self.hook.take() else {
            return;
        };

        let mut done = ZoomComplete {
            surface: self.surface,
            scene: &mut self.scene,
            tweens: &mut self.tweens,
        };
        hook(&mut done);
        self.completions += 1;
        debug!("completion hook ran after {:.2}s", self.elapsed);
    }

    /// Re-run placement for a new surface size.
    ///
    /// The zoom multiplier is kept while armed and dropped once the zoom has
    /// completed. A running exit zoom is retargeted to the new base scale.
    pub fn resize(&mut self, surface: SurfaceInfo) {
        self.surface = surface;
        let placement = self.config.effective_placement();
        let state = self.interaction.state();
        let multiplier = match state {
            ExitState::Armed => Some(self.config.effective_zoom()),
            ExitState::Completed => Some(1.0),
            ExitState::Zooming { .. } | ExitState::Detached => None,
        };

        if let Some(primary) = self.scene.primary_mut() {
            primary.position = surface.center();
            let base = base_scale(placement, &surface, primary.texture_size());
            if let Some(multiplier) = multiplier {
                primary.scale = glam::Vec2::splat(base * multiplier);
            }

            if let ExitState::Zooming { zoom } = state {
                self.tweens.retarget(zoom, Property::ScaleX, base);
                self.tweens.retarget(zoom, Property::ScaleY, base);
                debug!("exit zoom retargeted to scale {:.3}", base);
            }
        }

        if let (Some(label), Some(cfg)) = (self.scene.label_mut(), &self.config.label) {
            label.position = label_position(&surface, cfg.vertical_position);
        }
    }

    /// Cancel every tween and detach from input.
    pub fn stop(&mut self) {
        let cancelled = self.tweens.kill_all();
        self.interaction.detach();
        self.hook = None;
        info!("session stopped, {} tween(s) cancelled", cancelled);
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn surface(&self) -> SurfaceInfo {
        self.surface
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn tweens(&self) -> &Tweens {
        &self.tweens
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Handle of the primary sprite's fade-in.
    pub fn fade_in(&self) -> Option<TweenHandle> {
        self.fade_in
    }

    /// Handle of the label's idle pulse, until the first press.
    pub fn pulse(&self) -> Option<TweenHandle> {
        self.pulse
    }

    /// Times the completion hook has run (0 or 1).
    pub fn completions(&self) -> u32 {
        self.completions
    }

    pub fn is_complete(&self) -> bool {
        self.interaction.state() == ExitState::Completed
    }
}

fn build_label(config: &LabelConfig, surface: &SurfaceInfo) -> Label {
    let mut label = Label::new(config.text.clone(), config.font_size, config.color);
    label.position = label_position(surface, config.vertical_position);
    label.alpha = 0.0;
    label
}
