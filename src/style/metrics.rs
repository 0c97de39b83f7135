//! Text measurement: the metrics provider seam and the width cache.

use super::token::TextStyle;
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::Path;
use unicode_width::UnicodeWidthChar;

/// Zoom changes smaller than this keep cached widths
pub const ZOOM_EPSILON: f32 = 0.04;

/// Pixel size of a piece of text
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextSize {
    pub width: f32,
    pub height: f32,
}

/// Measures text in pixels at the current font and zoom.
pub trait TextMetrics {
    /// Size of `text` drawn in `style`
    fn measure(&self, style: TextStyle, text: &str) -> TextSize;

    /// Height of one visual line
    fn line_height(&self) -> f32;

    /// Current zoom factor, used to invalidate cached widths
    fn zoom(&self) -> f32 {
        1.0
    }
}

// =============================================================================
// WidthCache
// =============================================================================

/// Cache of measured widths keyed by style and exact string content.
#[derive(Debug, Clone, Default)]
pub struct WidthCache {
    widths: HashMap<(TextStyle, String), TextSize>,
    zoom: Option<f32>,
}

impl WidthCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Measure through the cache
    pub fn measure(&mut self, metrics: &dyn TextMetrics, style: TextStyle, text: &str) -> TextSize {
        self.sync_zoom(metrics.zoom());
        if let Some(size) = self.widths.get(&(style, text.to_owned())) {
            return *size;
        }
        let size = metrics.measure(style, text);
        self.widths.insert((style, text.to_owned()), size);
        size
    }

    /// Drop everything when the zoom moved by more than [`ZOOM_EPSILON`].
    pub fn sync_zoom(&mut self, zoom: f32) {
        match self.zoom {
            Some(old) if (old - zoom).abs() <= ZOOM_EPSILON => {}
            _ => {
                if self.zoom.is_some() {
                    tracing::debug!("zoom changed to {zoom}, clearing width cache");
                }
                self.widths.clear();
                self.zoom = Some(zoom);
            }
        }
    }

    pub fn clear(&mut self) {
        self.widths.clear();
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }
}

// =============================================================================
// MonospaceMetrics
// =============================================================================

/// Terminal-style metrics: every column is `char_width` pixels wide.
///
/// Column counts come from `unicode-width`, so wide CJK glyphs take two.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    pub char_width: f32,
    pub line_height: f32,
}

impl MonospaceMetrics {
    pub fn new(char_width: f32, line_height: f32) -> Self {
        Self {
            char_width,
            line_height,
        }
    }
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self::new(8.0, 16.0)
    }
}

impl TextMetrics for MonospaceMetrics {
    fn measure(&self, _style: TextStyle, text: &str) -> TextSize {
        let columns: usize = text
            .chars()
            .filter(|c| !c.is_control())
            .map(|c| c.width().unwrap_or(0))
            .sum();
        TextSize {
            width: columns as f32 * self.char_width,
            height: self.line_height,
        }
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }
}

// =============================================================================
// FontMetrics
// =============================================================================

/// Metrics from a real font file, rasterizer-accurate advance widths.
pub struct FontMetrics {
    font: fontdue::Font,
    px: f32,
    zoom: f32,
    line_height: f32,
}

impl std::fmt::Debug for FontMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontMetrics")
            .field("px", &self.px)
            .field("zoom", &self.zoom)
            .field("line_height", &self.line_height)
            .finish()
    }
}

impl FontMetrics {
    /// Parse a TTF/OTF font from memory
    pub fn from_bytes(bytes: &[u8], px: f32) -> Result<Self> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| anyhow!("failed to parse font: {e}"))?;
        let line_height = font
            .horizontal_line_metrics(px)
            .map_or(px * 1.2, |m| m.new_line_size);
        Ok(Self {
            font,
            px,
            zoom: 1.0,
            line_height,
        })
    }

    /// Load a font file from disk
    pub fn load(path: &Path, px: f32) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
        Self::from_bytes(&bytes, px)
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
    }

    /// Headings are drawn larger than body text
    fn scale(style: TextStyle) -> f32 {
        match style {
            TextStyle::Title => 1.6,
            TextStyle::Section => 1.4,
            TextStyle::Subsection => 1.25,
            TextStyle::Subsubsection => 1.1,
            _ => 1.0,
        }
    }
}

impl TextMetrics for FontMetrics {
    fn measure(&self, style: TextStyle, text: &str) -> TextSize {
        let px = self.px * self.zoom * Self::scale(style);
        let width = text
            .chars()
            .filter(|c| !c.is_control())
            .map(|c| self.font.metrics(c, px).advance_width)
            .sum();
        TextSize {
            width,
            height: self.line_height * self.zoom * Self::scale(style),
        }
    }

    fn line_height(&self) -> f32 {
        self.line_height * self.zoom
    }

    fn zoom(&self) -> f32 {
        self.zoom
    }
}
