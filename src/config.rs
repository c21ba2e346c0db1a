//! Configuration for the zoom effect.
//!
//! Everything the effect needs is carried by an explicit [`AppConfig`] value
//! that is handed to the surface and the session. Nothing is stored in
//! process-wide state.
//!
//! Two presets cover the usual variants:
//!
//! ```no_run
//! use pixel_zoom::AppConfig;
//!
//! // A still image, cover-fitted, with a pulsing "click" label.
//! let still = AppConfig::still("assets/full.png");
//!
//! // A 59-frame flip-book, centered, without a label.
//! let frames = AppConfig::flip_book("assets/frames").title("Flip-book");
//! ```

use std::path::{Path, PathBuf};

use crate::tween::Easing;

/// RGBA color, components in sRGB space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Build an opaque color from a `0xRRGGBB` value.
    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb(
            ((hex >> 16) & 0xff) as f32 / 255.0,
            ((hex >> 8) & 0xff) as f32 / 255.0,
            (hex & 0xff) as f32 / 255.0,
        )
    }

    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    /// Near-black backdrop behind the sprite.
    pub const BACKDROP: Color = Color::from_hex(0x111111);

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Clear color for an sRGB surface (wgpu expects linear values).
    pub(crate) fn to_wgpu(self) -> wgpu::Color {
        fn linear(c: f32) -> f64 {
            let c = c as f64;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }

        wgpu::Color {
            r: linear(self.r),
            g: linear(self.g),
            b: linear(self.b),
            a: self.a as f64,
        }
    }
}

/// How source texels are sampled when scaled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// Hard texel edges. Low-resolution art stays blocky.
    #[default]
    Nearest,
    /// Bilinear smoothing.
    Linear,
}

impl FilterMode {
    pub(crate) fn to_wgpu(self) -> wgpu::FilterMode {
        match self {
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
            FilterMode::Linear => wgpu::FilterMode::Linear,
        }
    }
}

/// Rendering defaults for the drawing surface.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceConfig {
    /// Fill for every pixel the sprite does not cover.
    pub background: Color,
    /// Sampler filter used for sprite textures.
    pub filter: FilterMode,
    /// Snap sprite quads to whole device pixels.
    pub round_pixels: bool,
    /// Device pixel ratio override. `None` follows the window's scale factor.
    pub pixel_density: Option<f64>,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            background: Color::BACKDROP,
            filter: FilterMode::Nearest,
            round_pixels: true,
            pixel_density: None,
        }
    }
}

/// An ordered flip-book whose frames follow a fixed naming pattern.
///
/// Frame `i` lives at `{dir}/{prefix}{i:02}{suffix}`. The suffix usually
/// carries a per-frame delay hint (`_delay-0.04s.png`) that is not
/// interpreted.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSequence {
    pub dir: PathBuf,
    pub prefix: String,
    pub count: usize,
    pub suffix: String,
}

impl FrameSequence {
    pub const DEFAULT_COUNT: usize = 59;
    pub const DEFAULT_PREFIX: &'static str = "frame_";
    pub const DEFAULT_SUFFIX: &'static str = "_delay-0.04s.png";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: Self::DEFAULT_PREFIX.to_string(),
            count: Self::DEFAULT_COUNT,
            suffix: Self::DEFAULT_SUFFIX.to_string(),
        }
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Path of a single frame.
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}{:02}{}", self.prefix, index, self.suffix))
    }

    /// All frame paths in playback order.
    pub fn paths(&self) -> Vec<PathBuf> {
        (0..self.count).map(|i| self.frame_path(i)).collect()
    }
}

/// Where the primary sprite's pixels come from.
#[derive(Clone, Debug, PartialEq)]
pub enum AssetSource {
    /// One still image.
    Still { path: PathBuf },
    /// A flip-book animation.
    FrameSequence(FrameSequence),
}

impl AssetSource {
    pub fn still(path: impl Into<PathBuf>) -> Self {
        AssetSource::Still { path: path.into() }
    }

    /// Paths to load, in order.
    pub fn paths(&self) -> Vec<PathBuf> {
        match self {
            AssetSource::Still { path } => vec![path.clone()],
            AssetSource::FrameSequence(seq) => seq.paths(),
        }
    }

    pub fn is_animated(&self) -> bool {
        matches!(self, AssetSource::FrameSequence(_))
    }
}

/// How the primary sprite is fitted before the zoom multiplier is applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Placement {
    /// Scale to fill the whole surface, cropping overflow.
    #[default]
    Cover,
    /// Native size, centered.
    Centered,
}

/// Playback settings for flip-book sprites.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Playback {
    /// Frames advanced per 60 Hz tick.
    pub speed: f32,
    pub looping: bool,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            speed: 0.5,
            looping: true,
        }
    }
}

/// The instructional text shown under the sprite.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelConfig {
    pub text: String,
    /// TTF/OTF file used to rasterize the text.
    pub font_path: PathBuf,
    pub font_size: f32,
    pub color: Color,
    /// Vertical position as a fraction of the surface height.
    pub vertical_position: f32,
}

impl LabelConfig {
    pub const DEFAULT_TEXT: &'static str = "Click anywhere to zoom out";
    pub const DEFAULT_FONT: &'static str = "assets/fonts/label.ttf";

    pub fn new(text: impl Into<String>, font_path: impl Into<PathBuf>) -> Self {
        Self {
            text: text.into(),
            font_path: font_path.into(),
            font_size: 28.0,
            color: Color::WHITE,
            vertical_position: 0.8,
        }
    }

    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TEXT, Self::DEFAULT_FONT)
    }
}

/// Durations (seconds) and curves of every tween in the sequence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timings {
    pub sprite_fade_in: f32,
    /// Half-period of the label pulse. The first half is the label's fade-in.
    pub label_pulse: f32,
    pub label_fade_out: f32,
    pub exit_zoom: f32,
    pub exit_easing: Easing,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            sprite_fade_in: 0.6,
            label_pulse: 1.0,
            label_fade_out: 0.5,
            exit_zoom: 1.0,
            exit_easing: Easing::EaseInOut,
        }
    }
}

/// Full configuration of one zoom session.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub surface: SurfaceConfig,
    pub source: AssetSource,
    pub placement: Placement,
    pub label: Option<LabelConfig>,
    pub playback: Playback,
    /// Multiplier applied at placement and divided out by the exit zoom.
    pub zoom_factor: f32,
    pub timings: Timings,
}

impl AppConfig {
    pub const DEFAULT_ZOOM: f32 = 8.0;

    /// Still image, cover-fitted, with the default label.
    pub fn still(path: impl Into<PathBuf>) -> Self {
        Self {
            title: "Pixel Zoom".to_string(),
            width: 1280,
            height: 720,
            surface: SurfaceConfig::default(),
            source: AssetSource::still(path),
            placement: Placement::Cover,
            label: Some(LabelConfig::default()),
            playback: Playback::default(),
            zoom_factor: Self::DEFAULT_ZOOM,
            timings: Timings::default(),
        }
    }

    /// Default 59-frame flip-book in `dir`, centered, without a label.
    pub fn flip_book(dir: impl AsRef<Path>) -> Self {
        Self {
            source: AssetSource::FrameSequence(FrameSequence::new(dir.as_ref())),
            placement: Placement::Centered,
            label: None,
            timings: Timings {
                sprite_fade_in: 0.8,
                ..Timings::default()
            },
            ..Self::still(PathBuf::new())
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn surface(mut self, surface: SurfaceConfig) -> Self {
        self.surface = surface;
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.surface.background = color;
        self
    }

    pub fn source(mut self, source: AssetSource) -> Self {
        self.source = source;
        self
    }

    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn label(mut self, label: LabelConfig) -> Self {
        self.label = Some(label);
        self
    }

    pub fn no_label(mut self) -> Self {
        self.label = None;
        self
    }

    pub fn playback(mut self, playback: Playback) -> Self {
        self.playback = playback;
        self
    }

    pub fn zoom_factor(mut self, zoom: f32) -> Self {
        self.zoom_factor = zoom;
        self
    }

    pub fn timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Placement actually used: flip-books are always centered.
    pub fn effective_placement(&self) -> Placement {
        if self.source.is_animated() {
            Placement::Centered
        } else {
            self.placement
        }
    }

    /// Zoom factor, falling back to 1 when the configured one is unusable.
    pub fn effective_zoom(&self) -> f32 {
        if self.zoom_factor.is_finite() && self.zoom_factor > 0.0 {
            self.zoom_factor
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_paths_are_zero_padded_and_ordered() {
        let seq = FrameSequence::new("frames");
        let paths = seq.paths();

        assert_eq!(paths.len(), 59);
        assert_eq!(paths[0], Path::new("frames/frame_00_delay-0.04s.png"));
        assert_eq!(paths[9], Path::new("frames/frame_09_delay-0.04s.png"));
        assert_eq!(paths[58], Path::new("frames/frame_58_delay-0.04s.png"));
    }

    #[test]
    fn flip_book_is_always_centered() {
        let config = AppConfig::flip_book("frames").placement(Placement::Cover);
        assert_eq!(config.effective_placement(), Placement::Centered);
        assert!(config.label.is_none());
    }

    #[test]
    fn still_preset_has_label_and_cover() {
        let config = AppConfig::still("full.png");
        assert_eq!(config.effective_placement(), Placement::Cover);
        assert_eq!(config.zoom_factor, 8.0);
        assert_eq!(config.label.as_ref().map(|l| l.vertical_position), Some(0.8));
    }

    #[test]
    fn invalid_zoom_falls_back_to_one() {
        assert_eq!(AppConfig::still("a.png").zoom_factor(0.0).effective_zoom(), 1.0);
        assert_eq!(AppConfig::still("a.png").zoom_factor(f32::NAN).effective_zoom(), 1.0);
        assert_eq!(AppConfig::still("a.png").zoom_factor(4.0).effective_zoom(), 4.0);
    }

    #[test]
    fn backdrop_hex() {
        let c = Color::from_hex(0x111111);
        assert!((c.r - 17.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.a, 1.0);
    }
}
