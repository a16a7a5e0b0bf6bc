use std::borrow::Cow;

use crate::font::glyph::{FontPack, Glyph};
use crate::foundation::core::{Point, Rgba8, Size, clamp_i32};
use crate::raster::buffer::PixelBuffer;

/// Text substituted for characters a font cannot draw.
pub const PLACEHOLDER: &str = "[?]";

const SPECIMEN_MAX_CHARS: usize = 15;
const SPECIMEN_TARGET_HEIGHT: u32 = 20;
const SPECIMEN_HEIGHT: u32 = 32;

fn glyphs_of<'a>(font: &'a FontPack, text: &'a str) -> impl Iterator<Item = &'a Glyph> + 'a {
    text.chars().filter_map(|c| font.glyph(c as u32))
}

/// Pixel extent of `text` at `scale`.
///
/// Width sums the advances of known characters; height is the tallest known glyph. Unknown
/// characters contribute nothing.
pub fn measure(font: &FontPack, text: &str, scale: u32) -> Size {
    let scale = scale.max(1);
    let (advance, height) = glyphs_of(font, text).fold((0i64, 0u32), |(w, h), g| {
        (w + i64::from(g.x_advance), h.max(g.bounds.height))
    });
    Size::new(
        u32::try_from(advance.max(0))
            .unwrap_or(u32::MAX)
            .saturating_mul(scale),
        height.saturating_mul(scale),
    )
}

/// Paint `text` with its baseline pen at `origin`.
///
/// Mask pixel `(col, row)` of each glyph is filled as an `scale x scale` square at
/// `origin.x + (col + x_offset) * scale`, `origin.y + (row - y_offset) * scale - scale`.
/// Unknown characters are skipped without advancing the pen.
pub fn draw(
    buf: &mut PixelBuffer,
    font: &FontPack,
    text: &str,
    origin: Point,
    scale: u32,
    color: Rgba8,
) {
    let s = i64::from(scale.max(1));
    let mut pen_x = i64::from(origin.x);
    let pen_y = i64::from(origin.y);
    for g in glyphs_of(font, text) {
        for row in 0..g.bounds.height {
            for col in 0..g.bounds.width {
                if !g.pixel(col, row) {
                    continue;
                }
                let dx = (i64::from(col) + i64::from(g.bounds.x_offset)).saturating_mul(s);
                let dy = (i64::from(row) - i64::from(g.bounds.y_offset)).saturating_mul(s);
                let x = pen_x.saturating_add(dx);
                let y = pen_y.saturating_add(dy).saturating_sub(s);
                buf.fill_span(x, y, x.saturating_add(s), y.saturating_add(s), color);
            }
        }
        pen_x = pen_x.saturating_add(i64::from(g.x_advance).saturating_mul(s));
    }
}

/// `text` with every character `font` cannot draw replaced by [`PLACEHOLDER`].
///
/// This is what text layers paint: their own characters and nothing else.
pub fn with_placeholders<'a>(font: &FontPack, text: &'a str) -> Cow<'a, str> {
    if text.chars().all(|c| font.has_char(c as u32)) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        if font.has_char(c as u32) {
            out.push(c);
        } else {
            out.push_str(PLACEHOLDER);
        }
    }
    Cow::Owned(out)
}

/// Sample text for a font picker.
///
/// Unknown characters become [`PLACEHOLDER`]. When fewer than half of the characters are known,
/// a specimen of up to 15 characters the font does have is returned instead. `None` means the
/// font has nothing printable at all.
pub fn sanitize<'a>(font: &FontPack, text: &'a str) -> Option<Cow<'a, str>> {
    let total = text.chars().count();
    let known = text.chars().filter(|&c| font.has_char(c as u32)).count();
    if total > 0 && known * 2 >= total {
        return Some(with_placeholders(font, text));
    }

    let printable = (32u32..=126).filter_map(char::from_u32);
    let mut specimen: String = printable
        .filter(|&c| font.has_char(c as u32))
        .take(SPECIMEN_MAX_CHARS)
        .collect();
    if specimen.is_empty() {
        specimen = (0u32..256)
            .filter_map(char::from_u32)
            .filter(|&c| font.has_char(c as u32))
            .take(SPECIMEN_MAX_CHARS)
            .collect();
    }
    (!specimen.is_empty()).then_some(Cow::Owned(specimen))
}

/// Render a sample line sized for a font picker: scaled towards a 20 px glyph height and centered
/// vertically in a 32 px strip.
pub fn render_specimen(font: &FontPack, text: &str, color: Rgba8) -> Option<PixelBuffer> {
    let text = sanitize(font, text)?;
    let natural = measure(font, &text, 1);
    if natural.is_empty() {
        return None;
    }
    let scale = (SPECIMEN_TARGET_HEIGHT / natural.h).max(1);
    let size = measure(font, &text, scale);
    let mut buf = PixelBuffer::new(size.w.max(1), SPECIMEN_HEIGHT.max(size.h));
    let baseline = clamp_i32((i64::from(buf.height()) + i64::from(size.h)) / 2 - 2);
    draw(&mut buf, font, &text, Point::new(0, baseline), scale, color);
    Some(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/font/raster.rs"]
mod tests;
