//! Visual elements held by the scene graph.

use glam::Vec2;

use crate::config::{Color, Playback};
use crate::tween::Property;

/// Type-safe handle to a texture uploaded by the renderer.
///
/// The scene graph never touches GPU resources; it only remembers which
/// texture a sprite shows and how large that texture is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub(crate) usize);

impl TextureId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// A texture handle together with its pixel dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureRef {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
}

impl TextureRef {
    pub fn new(id: TextureId, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// Ordered frames played back at a fixed rate.
#[derive(Clone, Debug)]
pub struct FlipBook {
    frames: Vec<TextureRef>,
    speed: f32,
    looping: bool,
    cursor: f32,
    loops: u32,
    playing: bool,
}

impl FlipBook {
    /// Returns `None` for an empty frame list.
    pub fn new(frames: Vec<TextureRef>, playback: Playback) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }

        Some(Self {
            frames,
            speed: playback.speed,
            looping: playback.looping,
            cursor: 0.0,
            loops: 0,
            playing: true,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[TextureRef] {
        &self.frames
    }

    pub fn current_index(&self) -> usize {
        (self.cursor as usize).min(self.frames.len() - 1)
    }

    pub fn current(&self) -> &TextureRef {
        &self.frames[self.current_index()]
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Completed passes through the whole sequence.
    pub fn loops(&self) -> u32 {
        self.loops
    }

    /// Advance playback by `dt` seconds. `speed` is in frames per 60 Hz tick.
    pub fn advance(&mut self, dt: f32) {
        if !self.playing || dt <= 0.0 {
            return;
        }

        let len = self.frames.len() as f32;
        self.cursor += self.speed * dt * 60.0;

        if self.cursor >= len {
            if self.looping {
                self.loops += (self.cursor / len) as u32;
                self.cursor = self.cursor.rem_euclid(len);
            } else {
                self.cursor = len - 1.0;
                self.playing = false;
            }
        } else if self.cursor < 0.0 {
            // Negative speed plays backwards
            if self.looping {
                self.cursor = self.cursor.rem_euclid(len);
            } else {
                self.cursor = 0.0;
                self.playing = false;
            }
        }
    }
}

/// What a sprite draws.
#[derive(Clone, Debug)]
pub enum SpriteKind {
    Still(TextureRef),
    Animated(FlipBook),
}

/// The primary visual element.
#[derive(Clone, Debug)]
pub struct Sprite {
    pub kind: SpriteKind,
    /// Normalized pivot; `(0.5, 0.5)` is the center.
    pub anchor: Vec2,
    /// Pivot position in logical surface pixels.
    pub position: Vec2,
    pub scale: Vec2,
    pub alpha: f32,
}

impl Sprite {
    pub fn still(texture: TextureRef) -> Self {
        Self::with_kind(SpriteKind::Still(texture))
    }

    pub fn animated(flip_book: FlipBook) -> Self {
        Self::with_kind(SpriteKind::Animated(flip_book))
    }

    fn with_kind(kind: SpriteKind) -> Self {
        Self {
            kind,
            anchor: Vec2::splat(0.5),
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            alpha: 1.0,
        }
    }

    /// Texture currently shown.
    pub fn texture(&self) -> &TextureRef {
        match &self.kind {
            SpriteKind::Still(texture) => texture,
            SpriteKind::Animated(book) => book.current(),
        }
    }

    pub fn texture_size(&self) -> Vec2 {
        self.texture().size()
    }

    pub fn flip_book(&self) -> Option<&FlipBook> {
        match &self.kind {
            SpriteKind::Animated(book) => Some(book),
            SpriteKind::Still(_) => None,
        }
    }

    pub fn is_animated(&self) -> bool {
        matches!(self.kind, SpriteKind::Animated(_))
    }

    /// Screen-space corners `(top_left, bottom_right)` of the drawn quad.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let size = self.texture_size() * self.scale;
        let min = self.position - self.anchor * size;
        (min, min + size)
    }

    pub(crate) fn advance(&mut self, dt: f32) {
        if let SpriteKind::Animated(book) = &mut self.kind {
            book.advance(dt);
        }
    }
}

/// Decorative text line.
#[derive(Clone, Debug)]
pub struct Label {
    pub text: String,
    pub font_size: f32,
    pub color: Color,
    pub anchor: Vec2,
    pub position: Vec2,
    pub scale: Vec2,
    pub alpha: f32,
}

impl Label {
    pub fn new(text: impl Into<String>, font_size: f32, color: Color) -> Self {
        Self {
            text: text.into(),
            font_size,
            color,
            anchor: Vec2::splat(0.5),
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            alpha: 1.0,
        }
    }
}

/// Numeric properties a tween can drive.
pub trait Animatable {
    fn get(&self, property: Property) -> f32;
    fn set(&mut self, property: Property, value: f32);
}

impl Animatable for Sprite {
    fn get(&self, property: Property) -> f32 {
        match property {
            Property::Alpha => self.alpha,
            Property::ScaleX => self.scale.x,
            Property::ScaleY => self.scale.y,
        }
    }

    fn set(&mut self, property: Property, value: f32) {
        match property {
            Property::Alpha => self.alpha = value,
            Property::ScaleX => self.scale.x = value,
            Property::ScaleY => self.scale.y = value,
        }
    }
}

impl Animatable for Label {
    fn get(&self, property: Property) -> f32 {
        match property {
            Property::Alpha => self.alpha,
            Property::ScaleX => self.scale.x,
            Property::ScaleY => self.scale.y,
        }
    }

    fn set(&mut self, property: Property, value: f32) {
        match property {
            Property::Alpha => self.alpha = value,
            Property::ScaleX => self.scale.x = value,
            Property::ScaleY => self.scale.y = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(n: usize) -> Vec<TextureRef> {
        (0..n)
            .map(|i| TextureRef::new(TextureId::new(i), 16, 16))
            .collect()
    }

    #[test]
    fn empty_flip_book_is_rejected() {
        assert!(FlipBook::new(Vec::new(), Playback::default()).is_none());
    }

    #[test]
    fn flip_book_loops() {
        let playback = Playback {
            speed: 1.0,
            looping: true,
        };
        let mut book = FlipBook::new(frames(4), playback).unwrap();

        // One frame per 60 Hz tick
        book.advance(1.0 / 60.0);
        assert_eq!(book.current_index(), 1);

        // 5 more frames: wraps past the end
        book.advance(5.0 / 60.0);
        assert_eq!(book.current_index(), 2);
        assert_eq!(book.loops(), 1);
        assert!(book.is_playing());
    }

    #[test]
    fn non_looping_flip_book_stops_on_last_frame() {
        let playback = Playback {
            speed: 1.0,
            looping: false,
        };
        let mut book = FlipBook::new(frames(3), playback).unwrap();

        book.advance(1.0);
        assert_eq!(book.current_index(), 2);
        assert!(!book.is_playing());
    }

    #[test]
    fn animated_sprite_draws_current_frame_texture() {
        let playback = Playback {
            speed: 1.0,
            looping: true,
        };
        let mut sprite = Sprite::animated(FlipBook::new(frames(4), playback).unwrap());
        assert_eq!(sprite.texture().id, TextureId::new(0));

        // Frame ids index the renderer's texture table directly
        if let SpriteKind::Animated(book) = &mut sprite.kind {
            book.advance(2.5 / 60.0);
        }
        assert_eq!(sprite.texture().id.index(), 2);
    }

    #[test]
    fn bounds_follow_anchor_and_scale() {
        let mut sprite = Sprite::still(TextureRef::new(TextureId::new(0), 20, 20));
        sprite.position = Vec2::new(100.0, 100.0);
        sprite.scale = Vec2::splat(2.0);

        let (min, max) = sprite.bounds();
        assert_eq!(min, Vec2::new(80.0, 80.0));
        assert_eq!(max, Vec2::new(120.0, 120.0));
    }

    #[test]
    fn animatable_round_trips_properties() {
        let mut label = Label::new("hi", 12.0, Color::WHITE);
        label.set(Property::Alpha, 0.25);
        label.set(Property::ScaleY, 3.0);
        assert_eq!(label.get(Property::Alpha), 0.25);
        assert_eq!(label.scale, Vec2::new(1.0, 3.0));
    }
}
