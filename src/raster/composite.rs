use crate::foundation::core::Rgba8;
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::math::{mul_div255_u8, opacity_u16};

pub type PremulRgba8 = [u8; 4];

/// Alpha at or above this value is "ink" after quantization (`255 / 2` rounded up).
pub const QUANTIZE_ALPHA_THRESHOLD: u8 = 128;

/// How a source buffer is combined with the destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendOp {
    /// Porter-Duff source-over.
    Over,
    /// Porter-Duff xor: coverage present in exactly one of source and destination survives.
    ///
    /// On monochrome ink this is the embedded "inverted" draw color, so two overlapping inverted
    /// shapes cancel.
    Xor,
}

pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let op = opacity_u16(opacity);
    if op == 0 || src[3] == 0 {
        return dst;
    }

    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

pub fn xor(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let op = opacity_u16(opacity);
    if op == 0 || src[3] == 0 {
        return dst;
    }

    let sa = mul_div255(u16::from(src[3]), op);
    let da = dst[3];
    let inv_sa = 255u16 - u16::from(sa);
    let inv_da = 255u16 - u16::from(da);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(mul_div255(u16::from(sa), inv_da), mul_div255(u16::from(da), inv_sa));
    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        out[i] = add_sat_u8(
            mul_div255(u16::from(sc), inv_da),
            mul_div255(u16::from(dst[i]), inv_sa),
        );
    }
    out
}

pub fn blend(dst: PremulRgba8, src: PremulRgba8, op: BlendOp, opacity: f32) -> PremulRgba8 {
    match op {
        BlendOp::Over => over(dst, src, opacity),
        BlendOp::Xor => xor(dst, src, opacity),
    }
}

pub fn blend_in_place(dst: &mut [u8], src: &[u8], op: BlendOp, opacity: f32) -> SceneResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(SceneError::validation(
            "blend_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = blend([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], op, opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Threshold every pixel to either opaque `foreground` or fully transparent.
pub fn quantize_in_place(data: &mut [u8], foreground: Rgba8) -> SceneResult<()> {
    if !data.len().is_multiple_of(4) {
        return Err(SceneError::validation(
            "quantize_in_place expects an rgba8 buffer",
        ));
    }
    let ink = [foreground.r, foreground.g, foreground.b, 255];
    for px in data.chunks_exact_mut(4) {
        if px[3] >= QUANTIZE_ALPHA_THRESHOLD {
            px.copy_from_slice(&ink);
        } else {
            px.copy_from_slice(&[0, 0, 0, 0]);
        }
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    mul_div255_u8(x, y)
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/raster/composite.rs"]
mod tests;
