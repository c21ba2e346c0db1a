//! Scene graph for the zoom effect.
//!
//! The scene holds exactly one primary [`Sprite`] (a still image or a
//! flip-book) and, in the labelled variant, one [`Label`]. Tweens address
//! these through [`ElementId`] and the [`Animatable`] trait.

mod element;
mod graph;

pub use element::{Animatable, FlipBook, Label, Sprite, SpriteKind, TextureId, TextureRef};
pub use graph::{ElementId, SceneGraph};
