//! Column-major byte-array fonts as exported by embedded display toolchains.
//!
//! Each character is a list of bytes organized in planes: the first byte of every column
//! (rows 0..8, LSB on top), then the second byte of every column (rows 8..16), and so on.

use std::collections::BTreeMap;

use crate::font::glyph::{FontMeta, FontPack, Glyph, GlyphBounds};
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::math::div_ceil8;

fn default_first_char() -> u32 {
    32
}

fn default_name() -> String {
    "ColumnarFont".to_string()
}

/// Declarative column-major font source.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnarFontSpec {
    /// One entry per character, in code order starting at `first_char`.
    pub data: Vec<Vec<u8>>,
    pub char_height: u32,
    pub char_width: u32,
    #[serde(default = "default_first_char")]
    pub first_char: u32,
    #[serde(default = "default_name")]
    pub name: String,
    /// Optional declared glyph count, checked against `data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char_count: Option<usize>,
}

/// Repack one character from column planes into a row-major MSB-first mask.
fn column_major_to_row_major(col_data: &[u8], width: u32, height: u32) -> Vec<u8> {
    let bytes_per_row = div_ceil8(width) as usize;
    let mut rows = vec![0u8; bytes_per_row * height as usize];
    for row in 0..height {
        let plane = (row / 8) as usize;
        let bit = row % 8;
        for col in 0..width {
            let src = col_data[plane * width as usize + col as usize];
            if (src >> bit) & 1 == 1 {
                let dst = row as usize * bytes_per_row + (col / 8) as usize;
                rows[dst] |= 0x80 >> (col % 8);
            }
        }
    }
    rows
}

/// Decode a column-major source into a [`FontPack`].
///
/// Fails without producing a pack when the declared geometry does not match the byte arrays.
pub fn decode_columnar(spec: &ColumnarFontSpec) -> SceneResult<FontPack> {
    let ColumnarFontSpec {
        data,
        char_height,
        char_width,
        first_char,
        name,
        char_count,
    } = spec;
    let (w, h) = (*char_width, *char_height);
    if w == 0 || h == 0 {
        return Err(SceneError::decode(format!(
            "columnar font '{name}' has empty glyph size {w}x{h}"
        )));
    }
    if let Some(n) = char_count
        && *n != data.len()
    {
        return Err(SceneError::decode(format!(
            "columnar font '{name}' declares {n} glyphs but has {}",
            data.len()
        )));
    }

    let (Ok(wi), Ok(hi)) = (i32::try_from(w), i32::try_from(h)) else {
        return Err(SceneError::decode(format!(
            "columnar font '{name}' glyph size {w}x{h} is out of range"
        )));
    };

    let expected = (w as usize)
        .checked_mul(div_ceil8(h) as usize)
        .ok_or_else(|| SceneError::decode("columnar glyph size overflow"))?;

    let mut glyphs = BTreeMap::new();
    for (i, char_data) in data.iter().enumerate() {
        if char_data.len() != expected {
            return Err(SceneError::decode(format!(
                "columnar font '{name}' glyph #{i} has {} bytes, expected {expected} for {w}x{h}",
                char_data.len()
            )));
        }
        let code = u32::try_from(i)
            .ok()
            .and_then(|i| first_char.checked_add(i))
            .ok_or_else(|| SceneError::decode(format!("columnar font '{name}' code overflow")))?;
        glyphs.insert(
            code,
            Glyph {
                code,
                bytes: column_major_to_row_major(char_data, w, h),
                bounds: GlyphBounds {
                    x_offset: 0,
                    y_offset: hi - 1,
                    width: w,
                    height: h,
                },
                x_advance: wi.saturating_add(1),
            },
        );
    }

    let meta = FontMeta {
        name: name.clone(),
        points: h,
        bounds: GlyphBounds {
            x_offset: 0,
            y_offset: 0,
            width: w,
            height: h,
        },
        ascent: hi,
        descent: 0,
        default_char: *first_char,
    };
    Ok(FontPack::new(meta, glyphs))
}

#[cfg(test)]
#[path = "../../tests/unit/font/columnar.rs"]
mod tests;
