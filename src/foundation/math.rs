pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Opacity in `[0, 1]` as an 8-bit multiplier.
pub(crate) fn opacity_u16(opacity: f32) -> u16 {
    ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16
}

/// Ceiling division for small positive extents (bytes per row, bytes per column).
pub(crate) fn div_ceil8(v: u32) -> u32 {
    v.div_ceil(8)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
