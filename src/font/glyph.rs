use std::collections::BTreeMap;

/// Placement of a glyph mask relative to the pen position.
///
/// `y_offset` is the mask row that sits directly above the baseline, so row `r` is drawn
/// `y_offset - r + 1` scaled units above the pen. Fonts decoded from column-major sources use
/// `height - 1`, which anchors the bottom row just above the pen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphBounds {
    pub x_offset: i32,
    pub y_offset: i32,
    pub width: u32,
    pub height: u32,
}

/// One decoded character.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Glyph {
    pub code: u32,
    /// Row-major mask, MSB first, `ceil(width / 8)` bytes per row.
    pub bytes: Vec<u8>,
    pub bounds: GlyphBounds,
    /// Pen advance in unscaled pixels.
    pub x_advance: i32,
}

impl Glyph {
    pub fn bytes_per_row(&self) -> usize {
        self.bounds.width.div_ceil(8) as usize
    }

    /// Whether mask pixel `(col, row)` is set. Out-of-range pixels are unset.
    pub fn pixel(&self, col: u32, row: u32) -> bool {
        if col >= self.bounds.width || row >= self.bounds.height {
            return false;
        }
        let idx = row as usize * self.bytes_per_row() + (col / 8) as usize;
        self.bytes
            .get(idx)
            .is_some_and(|b| b & (0x80 >> (col % 8)) != 0)
    }

    /// Number of set pixels in the mask.
    pub fn ink_count(&self) -> usize {
        (0..self.bounds.height)
            .flat_map(|row| (0..self.bounds.width).map(move |col| (col, row)))
            .filter(|&(col, row)| self.pixel(col, row))
            .count()
    }
}

/// Font-wide metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontMeta {
    pub name: String,
    /// Nominal size in points (pixel height for bitmap sources).
    pub points: u32,
    pub bounds: GlyphBounds,
    pub ascent: i32,
    pub descent: i32,
    pub default_char: u32,
}

/// Immutable character-code → glyph lookup produced by one of the decoders.
///
/// A `FontPack` is only ever built complete: decoders return an error instead of a pack with
/// missing or partial glyphs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontPack {
    meta: FontMeta,
    glyphs: BTreeMap<u32, Glyph>,
}

impl FontPack {
    pub(crate) fn new(meta: FontMeta, glyphs: BTreeMap<u32, Glyph>) -> Self {
        Self { meta, glyphs }
    }

    pub(crate) fn rename(&mut self, name: &str) {
        self.meta.name = name.to_string();
    }

    pub fn meta(&self) -> &FontMeta {
        &self.meta
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn glyph(&self, code: u32) -> Option<&Glyph> {
        self.glyphs.get(&code)
    }

    pub fn has_char(&self, code: u32) -> bool {
        self.glyphs.contains_key(&code)
    }

    pub fn glyphs(&self) -> impl Iterator<Item = &Glyph> {
        self.glyphs.values()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}
