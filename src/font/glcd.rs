//! Classic fixed-width "glcdfont" binaries: one byte per column, LSB on top, no headers.

use crate::font::columnar::{ColumnarFontSpec, decode_columnar};
use crate::font::glyph::FontPack;
use crate::foundation::error::{SceneError, SceneResult};

/// Geometry of a glcd binary; the stock 5x7 font is the default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlcdOptions {
    pub char_width: u32,
    pub char_height: u32,
    pub first_char: u32,
    pub name: String,
}

impl Default for GlcdOptions {
    fn default() -> Self {
        Self {
            char_width: 5,
            char_height: 7,
            first_char: 0,
            name: "glcdfont".to_string(),
        }
    }
}

/// Decode a glcd binary. Glyphs share the column-major anchoring and spacing of
/// [`decode_columnar`].
pub fn decode_glcd(bytes: &[u8], opts: &GlcdOptions) -> SceneResult<FontPack> {
    if opts.char_width == 0 {
        return Err(SceneError::decode("glcd font has zero char width"));
    }
    if opts.char_height == 0 || opts.char_height > 8 {
        return Err(SceneError::decode(format!(
            "glcd char height must be 1..=8, got {}",
            opts.char_height
        )));
    }
    let stride = opts.char_width as usize;
    if bytes.is_empty() || !bytes.len().is_multiple_of(stride) {
        return Err(SceneError::decode(format!(
            "glcd font '{}' has {} bytes, not a multiple of {stride}",
            opts.name,
            bytes.len()
        )));
    }

    let spec = ColumnarFontSpec {
        data: bytes.chunks_exact(stride).map(<[u8]>::to_vec).collect(),
        char_height: opts.char_height,
        char_width: opts.char_width,
        first_char: opts.first_char,
        name: opts.name.clone(),
        char_count: None,
    };
    decode_columnar(&spec)
}

#[cfg(test)]
#[path = "../../tests/unit/font/glcd.rs"]
mod tests;
