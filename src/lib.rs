//! # Pixel Zoom
//!
//! **A pixelated sprite that fades in, waits for a click, then zooms out.**
//!
//! A low-resolution image (or a looping flip-book) is shown magnified 8× with
//! nearest-neighbour sampling over a near-black backdrop. It fades in, an
//! optional label pulses underneath, and the first pointer press fades the
//! label and eases the sprite back down to its fitted scale.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pixel_zoom::AppConfig;
//!
//! fn main() -> pixel_zoom::Result<()> {
//!     pixel_zoom::run(AppConfig::still("assets/full.png").title("Zoom"))
//! }
//! ```
//!
//! ## Layers
//!
//! - [`Session`] holds the scene, the tweens and the click gate. It never
//!   touches the GPU and can be driven directly with [`Session::tick`].
//! - [`SurfaceManager`] owns the window and GPU context and draws a session.
//! - [`run`] wires both into a winit event loop and decodes assets on a
//!   background thread.

mod app;
mod assets;
mod config;
mod error;
mod font;
mod gpu;
mod input;
mod interaction;
mod layout;
pub mod scene;
mod session;
mod sprite_pass;
mod surface;
mod texture;
mod tween;

pub use app::{AppEvent, run, run_with_hook};
pub use assets::{AssetLoader, DecodedImage, load_source};
pub use config::{
    AppConfig, AssetSource, Color, FilterMode, FrameSequence, LabelConfig, Placement, Playback,
    SurfaceConfig, Timings,
};
pub use error::{Error, Result};
pub use font::{GlyphAtlas, GlyphInfo};
pub use gpu::GpuContext;
pub use input::{Input, PointerEvent};
pub use interaction::{ExitState, Interaction};
pub use layout::{
    PrimaryLayout, SurfaceInfo, base_scale, cover_scale, label_position, place_primary,
};
pub use scene::{
    Animatable, ElementId, FlipBook, Label, SceneGraph, Sprite, SpriteKind, TextureId, TextureRef,
};
pub use session::{CompletionHook, Session, ZoomComplete, default_completion_hook};
pub use sprite_pass::{SpritePass, Vertex2d};
pub use surface::SurfaceManager;
pub use texture::Texture;
pub use tween::{Easing, Property, Repeat, TweenHandle, TweenSpec, Tweens};

// Re-export glam math types for convenience
pub use glam::Vec2;
