//! Glyph Bitmap Distribution Format (BDF 2.1) text fonts.
//!
//! Only the subset needed for monochrome rasterization is understood; unknown keywords are
//! ignored.

use std::collections::BTreeMap;

use crate::font::glyph::{FontMeta, FontPack, Glyph, GlyphBounds};
use crate::foundation::error::{SceneError, SceneResult};

#[derive(Default)]
struct PendingGlyph {
    encoding: Option<i64>,
    dwidth: Option<i32>,
    bbx: Option<(u32, u32, i32, i32)>,
    rows: Vec<u8>,
    row_count: u32,
    in_bitmap: bool,
}

fn parse_num<T: std::str::FromStr>(tok: Option<&str>, line_no: usize, what: &str) -> SceneResult<T> {
    tok.and_then(|t| t.parse::<T>().ok()).ok_or_else(|| {
        SceneError::decode(format!("bdf line {line_no}: malformed {what}"))
    })
}

fn parse_hex_row(row: &str, bytes_per_row: usize, line_no: usize) -> SceneResult<Vec<u8>> {
    let row = row.trim();
    if row.len() < bytes_per_row * 2 || !row.len().is_multiple_of(2) {
        return Err(SceneError::decode(format!(
            "bdf line {line_no}: bitmap row '{row}' needs {bytes_per_row} bytes"
        )));
    }
    (0..bytes_per_row)
        .map(|i| {
            u8::from_str_radix(&row[i * 2..i * 2 + 2], 16).map_err(|_| {
                SceneError::decode(format!("bdf line {line_no}: invalid hex '{row}'"))
            })
        })
        .collect()
}

/// Decode BDF source text into a [`FontPack`].
pub fn decode_bdf(text: &str) -> SceneResult<FontPack> {
    let mut name = String::from("bdf");
    let mut points = 0u32;
    let mut font_bbx: Option<(u32, u32, i32, i32)> = None;
    let mut ascent: Option<i32> = None;
    let mut descent: Option<i32> = None;
    let mut default_char: Option<u32> = None;
    let mut glyphs = BTreeMap::new();
    let mut pending: Option<PendingGlyph> = None;

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(g) = pending.as_mut()
            && g.in_bitmap
            && line != "ENDCHAR"
        {
            let (w, h, _, _) = g.bbx.unwrap_or_default();
            if g.row_count >= h {
                return Err(SceneError::decode(format!(
                    "bdf line {line_no}: more than {h} bitmap rows"
                )));
            }
            g.rows
                .extend(parse_hex_row(line, w.div_ceil(8) as usize, line_no)?);
            g.row_count += 1;
            continue;
        }

        let mut toks = line.split_whitespace();
        let Some(keyword) = toks.next() else {
            continue;
        };
        match keyword {
            "FONT" => {
                name = line["FONT".len()..].trim().to_string();
            }
            "SIZE" => points = parse_num(toks.next(), line_no, "SIZE")?,
            "FONTBOUNDINGBOX" => {
                font_bbx = Some((
                    parse_num(toks.next(), line_no, "FONTBOUNDINGBOX")?,
                    parse_num(toks.next(), line_no, "FONTBOUNDINGBOX")?,
                    parse_num(toks.next(), line_no, "FONTBOUNDINGBOX")?,
                    parse_num(toks.next(), line_no, "FONTBOUNDINGBOX")?,
                ));
            }
            "FONT_ASCENT" => ascent = Some(parse_num(toks.next(), line_no, "FONT_ASCENT")?),
            "FONT_DESCENT" => descent = Some(parse_num(toks.next(), line_no, "FONT_DESCENT")?),
            "DEFAULT_CHAR" => {
                default_char = Some(parse_num(toks.next(), line_no, "DEFAULT_CHAR")?)
            }
            "STARTCHAR" => {
                if pending.is_some() {
                    return Err(SceneError::decode(format!(
                        "bdf line {line_no}: STARTCHAR before ENDCHAR"
                    )));
                }
                pending = Some(PendingGlyph::default());
            }
            "ENCODING" | "DWIDTH" | "BBX" | "BITMAP" => {
                let Some(g) = pending.as_mut() else {
                    return Err(SceneError::decode(format!(
                        "bdf line {line_no}: {keyword} outside STARTCHAR"
                    )));
                };
                match keyword {
                    "ENCODING" => g.encoding = Some(parse_num(toks.next(), line_no, "ENCODING")?),
                    "DWIDTH" => g.dwidth = Some(parse_num(toks.next(), line_no, "DWIDTH")?),
                    "BBX" => {
                        g.bbx = Some((
                            parse_num(toks.next(), line_no, "BBX")?,
                            parse_num(toks.next(), line_no, "BBX")?,
                            parse_num(toks.next(), line_no, "BBX")?,
                            parse_num(toks.next(), line_no, "BBX")?,
                        ));
                    }
                    _ => {
                        if g.bbx.is_none() {
                            g.bbx = font_bbx;
                        }
                        if g.bbx.is_none() {
                            return Err(SceneError::decode(format!(
                                "bdf line {line_no}: BITMAP without BBX"
                            )));
                        }
                        g.in_bitmap = true;
                    }
                }
            }
            "ENDCHAR" => {
                let Some(g) = pending.take() else {
                    return Err(SceneError::decode(format!(
                        "bdf line {line_no}: ENDCHAR without STARTCHAR"
                    )));
                };
                let Some(encoding) = g.encoding else {
                    return Err(SceneError::decode(format!(
                        "bdf line {line_no}: glyph without ENCODING"
                    )));
                };
                let Some((w, h, xoff, yoff)) = g.bbx else {
                    return Err(SceneError::decode(format!(
                        "bdf line {line_no}: glyph without BBX"
                    )));
                };
                if g.row_count != h {
                    return Err(SceneError::decode(format!(
                        "bdf line {line_no}: glyph {encoding} has {} rows, expected {h}",
                        g.row_count
                    )));
                }
                // Negative encodings are unencoded glyphs.
                let Ok(code) = u32::try_from(encoding) else {
                    continue;
                };
                let y_offset = i32::try_from(i64::from(h) + i64::from(yoff) - 1);
                let advance = i32::try_from(i64::from(w) + i64::from(xoff));
                let (Ok(y_offset), Ok(advance)) = (y_offset, advance) else {
                    return Err(SceneError::decode(format!(
                        "bdf line {line_no}: glyph {encoding} BBX is out of range"
                    )));
                };
                glyphs.insert(
                    code,
                    Glyph {
                        code,
                        bytes: g.rows,
                        bounds: GlyphBounds {
                            x_offset: xoff,
                            y_offset,
                            width: w,
                            height: h,
                        },
                        x_advance: g.dwidth.unwrap_or(advance),
                    },
                );
            }
            _ => {}
        }
    }

    if pending.is_some() {
        return Err(SceneError::decode("bdf source ends inside a glyph (missing ENDCHAR)"));
    }
    if glyphs.is_empty() {
        return Err(SceneError::decode("bdf source contains no glyphs"));
    }

    let (bw, bh, bx, by) = font_bbx.unwrap_or_default();
    let first_code = glyphs.keys().next().copied().unwrap_or_default();
    let meta = FontMeta {
        name,
        points: if points == 0 { bh } else { points },
        bounds: GlyphBounds {
            x_offset: bx,
            y_offset: by,
            width: bw,
            height: bh,
        },
        ascent: ascent.unwrap_or_else(|| {
            i32::try_from(i64::from(bh) + i64::from(by)).unwrap_or(i32::MAX)
        }),
        descent: descent.unwrap_or(by.saturating_neg()),
        default_char: default_char.unwrap_or(first_code),
    };
    Ok(FontPack::new(meta, glyphs))
}

#[cfg(test)]
#[path = "../../tests/unit/font/bdf.rs"]
mod tests;
