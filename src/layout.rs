//! Surface dimensions and sprite placement.

use glam::Vec2;

use crate::config::Placement;

/// Logical size and pixel density of the drawing surface.
///
/// The scene is laid out in logical pixels; the renderer multiplies by
/// `scale_factor` to reach physical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceInfo {
    pub width: f32,
    pub height: f32,
    pub scale_factor: f32,
}

impl SurfaceInfo {
    /// Logical size at a density of 1.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scale_factor: 1.0,
        }
    }

    /// Derive logical size from a physical size and a scale factor.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        let scale_factor = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        Self {
            width: (width as f64 / scale_factor) as f32,
            height: (height as f64 / scale_factor) as f32,
            scale_factor: scale_factor as f32,
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.size() * 0.5
    }
}

/// Scale that makes a `texture`-sized image fill `surface`, cropping overflow.
///
/// Picks the width ratio when the surface is relatively wider than the
/// texture, the height ratio otherwise. Degenerate sizes yield `1.0`.
pub fn cover_scale(surface: Vec2, texture: Vec2) -> f32 {
    if surface.x <= 0.0 || surface.y <= 0.0 || texture.x <= 0.0 || texture.y <= 0.0 {
        return 1.0;
    }

    let texture_ratio = texture.x / texture.y;
    let surface_ratio = surface.x / surface.y;

    if surface_ratio > texture_ratio {
        surface.x / texture.x
    } else {
        surface.y / texture.y
    }
}

/// Scale before any zoom multiplier.
pub fn base_scale(placement: Placement, surface: &SurfaceInfo, texture: Vec2) -> f32 {
    match placement {
        Placement::Cover => cover_scale(surface.size(), texture),
        Placement::Centered => 1.0,
    }
}

/// Where the primary sprite sits and how large it is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrimaryLayout {
    pub position: Vec2,
    pub scale: Vec2,
}

/// Center the sprite and multiply its base scale by `zoom`.
pub fn place_primary(
    placement: Placement,
    surface: &SurfaceInfo,
    texture: Vec2,
    zoom: f32,
) -> PrimaryLayout {
    PrimaryLayout {
        position: surface.center(),
        scale: Vec2::splat(base_scale(placement, surface, texture) * zoom),
    }
}

/// Label pivot: horizontally centered, `vertical` of the way down.
pub fn label_position(surface: &SurfaceInfo, vertical: f32) -> Vec2 {
    Vec2::new(surface.width * 0.5, surface.height * vertical)
}
