//! Glyph atlas for the instructional label.
//!
//! Printable ASCII is rasterized once with `fontdue` and packed row by row
//! into a single-channel bitmap. The renderer uploads the bitmap as an
//! `R8Unorm` texture and draws one quad per glyph.

use std::collections::HashMap;
use std::path::Path;

use fontdue::{Font, FontSettings};

use crate::error::{Error, Result};

/// Placement of a single glyph in the atlas.
#[derive(Clone, Copy, Debug)]
pub struct GlyphInfo {
    /// UV rectangle (x, y, width, height) normalized to [0, 1].
    pub uv: [f32; 4],
    pub width: u32,
    pub height: u32,
    /// Offset from the pen position to the glyph's left edge.
    pub offset_x: f32,
    /// Distance from the baseline to the glyph's bottom edge.
    pub offset_y: f32,
    pub advance: f32,
}

/// Pre-rasterized glyphs for one font at one pixel size.
pub struct GlyphAtlas {
    bitmap: Vec<u8>,
    width: u32,
    height: u32,
    glyphs: HashMap<char, GlyphInfo>,
    size: f32,
    ascent: f32,
    line_height: f32,
}

impl GlyphAtlas {
    /// Read a TTF/OTF file and rasterize it at `size` pixels.
    pub fn from_file(path: &Path, size: f32) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| Error::FontLoadFailure {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_bytes(&data, size).map_err(|reason| Error::FontLoadFailure {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Rasterize font data at `size` pixels.
    pub fn from_bytes(font_data: &[u8], size: f32) -> std::result::Result<Self, String> {
        let font = Font::from_bytes(font_data, FontSettings::default())
            .map_err(|e| e.to_string())?;

        let rasterized: Vec<(char, fontdue::Metrics, Vec<u8>)> = (32u8..=126u8)
            .map(|c| {
                let c = c as char;
                let (metrics, bitmap) = font.rasterize(c, size);
                (c, metrics, bitmap)
            })
            .collect();

        let padding = 1u32;
        let (width, height) = atlas_dimensions(&rasterized, padding);

        let mut bitmap = vec![0u8; (width * height) as usize];
        let mut glyphs = HashMap::new();
        let mut x = padding;
        let mut y = padding;
        let mut row_height = 0u32;

        for (c, metrics, glyph_bitmap) in &rasterized {
            let glyph_w = metrics.width as u32;
            let glyph_h = metrics.height as u32;

            if x + glyph_w + padding > width {
                x = padding;
                y += row_height + padding;
                row_height = 0;
            }

            for gy in 0..glyph_h {
                let src = (gy * glyph_w) as usize;
                let dst = ((y + gy) * width + x) as usize;
                bitmap[dst..dst + glyph_w as usize]
                    .copy_from_slice(&glyph_bitmap[src..src + glyph_w as usize]);
            }

            glyphs.insert(
                *c,
                GlyphInfo {
                    uv: [
                        x as f32 / width as f32,
                        y as f32 / height as f32,
                        glyph_w as f32 / width as f32,
                        glyph_h as f32 / height as f32,
                    ],
                    width: glyph_w,
                    height: glyph_h,
                    offset_x: metrics.xmin as f32,
                    offset_y: metrics.ymin as f32,
                    advance: metrics.advance_width,
                },
            );

            x += glyph_w + padding;
            row_height = row_height.max(glyph_h);
        }

        let line_metrics = font.horizontal_line_metrics(size);
        let ascent = line_metrics.map(|m| m.ascent).unwrap_or(size * 0.8);
        let line_height = line_metrics
            .map(|m| m.new_line_size)
            .unwrap_or(size * 1.2);

        Ok(Self {
            bitmap,
            width,
            height,
            glyphs,
            size,
            ascent,
            line_height,
        })
    }

    pub fn glyph(&self, c: char) -> Option<&GlyphInfo> {
        self.glyphs.get(&c)
    }

    pub fn bitmap(&self) -> &[u8] {
        &self.bitmap
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn ascent(&self) -> f32 {
        self.ascent
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Advance width of a string. Missing glyphs count half the font size.
    pub fn measure(&self, text: &str) -> f32 {
        text.chars()
            .map(|c| self.glyphs.get(&c).map_or(self.size * 0.5, |g| g.advance))
            .sum()
    }
}

/// Smallest power-of-two-ish atlas (starting at 256²) that fits every glyph.
fn atlas_dimensions(rasterized: &[(char, fontdue::Metrics, Vec<u8>)], padding: u32) -> (u32, u32) {
    let mut width = 256u32;
    let mut height = 256u32;

    loop {
        let mut x = padding;
        let mut y = padding;
        let mut row_height = 0u32;
        let mut fits = true;

        for (_, metrics, _) in rasterized {
            let glyph_w = metrics.width as u32;
            let glyph_h = metrics.height as u32;

            if glyph_w + 2 * padding > width {
                fits = false;
                break;
            }

            if x + glyph_w + padding > width {
                x = padding;
                y += row_height + padding;
                row_height = 0;
            }

            if y + glyph_h + padding > height {
                fits = false;
                break;
            }

            x += glyph_w + padding;
            row_height = row_height.max(glyph_h);
        }

        if fits {
            return (width, height);
        }

        // Double the smaller dimension
        if width <= height {
            width *= 2;
        } else {
            height *= 2;
        }
    }
}
