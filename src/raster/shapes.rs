//! Pixel-exact primitives matching what monochrome display drivers rasterize.
//!
//! Everything here paints solid color only; there is no anti-aliasing, so every pixel a shape
//! touches survives quantization unchanged.

use crate::foundation::core::{Point, Rect, Rgba8};
use crate::raster::buffer::PixelBuffer;

/// Bresenham line, both endpoints inclusive.
///
/// Segments reaching past the buffer are clipped first, so the walk is bounded by the buffer
/// size rather than the segment length.
pub fn draw_line(buf: &mut PixelBuffer, p1: Point, p2: Point, color: Rgba8) {
    let a = (i64::from(p1.x), i64::from(p1.y));
    let b = (i64::from(p2.x), i64::from(p2.y));
    line_wide(buf, a, b, color);
}

fn line_wide(buf: &mut PixelBuffer, a: (i64, i64), b: (i64, i64), color: Rgba8) {
    let Some(((mut x, mut y), (x1, y1))) = clip_segment(buf, a, b) else {
        return;
    };
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        buf.set_wide(x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Liang-Barsky clip of `a..b` against the buffer grown by one pixel.
///
/// Segments already inside are returned untouched so on-screen lines keep their exact pixels.
fn clip_segment(
    buf: &PixelBuffer,
    a: (i64, i64),
    b: (i64, i64),
) -> Option<((i64, i64), (i64, i64))> {
    let (w, h) = (i64::from(buf.width()), i64::from(buf.height()));
    let inside = |p: (i64, i64)| p.0 >= -1 && p.1 >= -1 && p.0 <= w && p.1 <= h;
    if inside(a) && inside(b) {
        return Some((a, b));
    }
    let (x0, y0) = (a.0 as f64, a.1 as f64);
    let (dx, dy) = ((b.0 - a.0) as f64, (b.1 - a.1) as f64);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in [
        (-dx, x0 + 1.0),
        (dx, w as f64 - x0),
        (-dy, y0 + 1.0),
        (dy, h as f64 - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    let at = |t: f64| ((x0 + t * dx).round() as i64, (y0 + t * dy).round() as i64);
    Some((at(t0), at(t1)))
}

fn hline(buf: &mut PixelBuffer, x0: i64, x1: i64, y: i64, color: Rgba8) {
    let (lo, hi) = (x0.min(x1), x0.max(x1));
    buf.fill_span(lo, y, hi + 1, y + 1, color);
}

/// Return `true` when the box `center ± (rx, ry)` overlaps the buffer.
fn touches(buf: &PixelBuffer, center: Point, rx: u32, ry: u32) -> bool {
    let (cx, cy) = (i64::from(center.x), i64::from(center.y));
    let (rx, ry) = (i64::from(rx), i64::from(ry));
    cx + rx >= 0
        && cy + ry >= 0
        && cx - rx < i64::from(buf.width())
        && cy - ry < i64::from(buf.height())
}

/// One-pixel outline of `rect`.
pub fn draw_frame(buf: &mut PixelBuffer, rect: Rect, color: Rgba8) {
    if rect.size.is_empty() {
        return;
    }
    let Rect { pos, size } = rect;
    buf.fill_rect(pos.x, pos.y, size.w, 1, color);
    buf.fill_rect(pos.x, rect.bottom() - 1, size.w, 1, color);
    buf.fill_rect(pos.x, pos.y, 1, size.h, color);
    buf.fill_rect(rect.right() - 1, pos.y, 1, size.h, color);
}

/// Solid `rect`.
pub fn draw_box(buf: &mut PixelBuffer, rect: Rect, color: Rgba8) {
    buf.fill_rect(rect.pos.x, rect.pos.y, rect.size.w, rect.size.h, color);
}

/// Largest distance from `c` to any column (or row) of a buffer `len` pixels long.
fn farthest(c: i64, len: u32) -> i64 {
    c.abs().max((i64::from(len) - 1 - c).abs())
}

/// Return `true` when every pixel of the buffer lies well inside the circle.
fn covers_buffer(buf: &PixelBuffer, center: Point, radius: u32) -> bool {
    let inner = i128::from(radius) - 2;
    if inner < 0 {
        return false;
    }
    let fx = i128::from(farthest(i64::from(center.x), buf.width()));
    let fy = i128::from(farthest(i64::from(center.y), buf.height()));
    fx * fx + fy * fy <= inner * inner
}

/// Walk one octant of a midpoint circle, reporting `(x, y)` offsets with `x <= y`.
///
/// The walk stops early once `x` passes `limit`.
fn circle_octant(radius: u32, limit: i64, mut visit: impl FnMut(i64, i64)) {
    let r = i64::from(radius);
    let mut f = 1 - r;
    let mut dd_x = 1;
    let mut dd_y = -2 * r;
    let mut x = 0;
    let mut y = r;
    visit(x, y);
    while x < y && x < limit {
        if f >= 0 {
            y -= 1;
            dd_y += 2;
            f += dd_y;
        }
        x += 1;
        dd_x += 2;
        f += dd_x;
        visit(x, y);
    }
}

/// Midpoint circle outline centered on `center`.
pub fn draw_circle(buf: &mut PixelBuffer, center: Point, radius: u32, color: Rgba8) {
    if !touches(buf, center, radius, radius) {
        return;
    }
    let (cx, cy) = (i64::from(center.x), i64::from(center.y));
    // Every plotted point has `cx ± x` as its column or `cy ± x` as its row.
    let limit = farthest(cx, buf.width()).max(farthest(cy, buf.height()));
    circle_octant(radius, limit, |x, y| {
        for (dx, dy) in [(x, y), (y, x)] {
            buf.set_wide(cx + dx, cy + dy, color);
            buf.set_wide(cx - dx, cy + dy, color);
            buf.set_wide(cx + dx, cy - dy, color);
            buf.set_wide(cx - dx, cy - dy, color);
        }
    });
}

/// Filled midpoint circle centered on `center`.
pub fn draw_disc(buf: &mut PixelBuffer, center: Point, radius: u32, color: Rgba8) {
    if !touches(buf, center, radius, radius) {
        return;
    }
    if covers_buffer(buf, center, radius) {
        buf.fill_span(0, 0, i64::from(buf.width()), i64::from(buf.height()), color);
        return;
    }
    let (cx, cy) = (i64::from(center.x), i64::from(center.y));
    circle_octant(radius, i64::MAX, |x, y| {
        hline(buf, cx - x, cx + x, cy + y, color);
        hline(buf, cx - x, cx + x, cy - y, color);
        hline(buf, cx - y, cx + y, cy + x, color);
        hline(buf, cx - y, cx + y, cy - x, color);
    });
}

/// Walk one quadrant of a midpoint ellipse, reporting `(x, y)` offsets.
fn ellipse_quadrant(rx: u32, ry: u32, mut visit: impl FnMut(i64, i64)) {
    let rx2 = f64::from(rx) * f64::from(rx);
    let ry2 = f64::from(ry) * f64::from(ry);
    let mut x: i64 = 0;
    let mut y: i64 = i64::from(ry);
    let mut px = 0.0;
    let mut py = 2.0 * rx2 * y as f64;

    let mut p = ry2 - rx2 * f64::from(ry) + 0.25 * rx2;
    while px < py {
        visit(x, y);
        x += 1;
        px += 2.0 * ry2;
        if p < 0.0 {
            p += ry2 + px;
        } else {
            y -= 1;
            py -= 2.0 * rx2;
            p += ry2 + px - py;
        }
    }

    let fx = x as f64 + 0.5;
    let fy = y as f64 - 1.0;
    p = ry2 * fx * fx + rx2 * fy * fy - rx2 * ry2;
    while y >= 0 {
        visit(x, y);
        y -= 1;
        py -= 2.0 * rx2;
        if p > 0.0 {
            p += rx2 - py;
        } else {
            x += 1;
            px += 2.0 * ry2;
            p += rx2 - py + px;
        }
    }
}

/// Midpoint ellipse outline; a zero radius degenerates into a line.
pub fn draw_ellipse(buf: &mut PixelBuffer, center: Point, rx: u32, ry: u32, color: Rgba8) {
    if rx == 0 || ry == 0 {
        degenerate_ellipse(buf, center, rx, ry, color);
        return;
    }
    if !touches(buf, center, rx, ry) {
        return;
    }
    let (cx, cy) = (i64::from(center.x), i64::from(center.y));
    ellipse_quadrant(rx, ry, |x, y| {
        buf.set_wide(cx + x, cy + y, color);
        buf.set_wide(cx - x, cy + y, color);
        buf.set_wide(cx + x, cy - y, color);
        buf.set_wide(cx - x, cy - y, color);
    });
}

/// Filled midpoint ellipse; a zero radius degenerates into a line.
pub fn draw_filled_ellipse(buf: &mut PixelBuffer, center: Point, rx: u32, ry: u32, color: Rgba8) {
    if rx == 0 || ry == 0 {
        degenerate_ellipse(buf, center, rx, ry, color);
        return;
    }
    if !touches(buf, center, rx, ry) {
        return;
    }
    let (cx, cy) = (i64::from(center.x), i64::from(center.y));
    ellipse_quadrant(rx, ry, |x, y| {
        hline(buf, cx - x, cx + x, cy + y, color);
        hline(buf, cx - x, cx + x, cy - y, color);
    });
}

fn degenerate_ellipse(buf: &mut PixelBuffer, center: Point, rx: u32, ry: u32, color: Rgba8) {
    let (cx, cy) = (i64::from(center.x), i64::from(center.y));
    let (rx, ry) = (i64::from(rx), i64::from(ry));
    line_wide(buf, (cx - rx, cy - ry), (cx + rx, cy + ry), color);
}

/// Paint every set bit of a row-major MSB-first monochrome mask at `origin`.
pub fn draw_mask(
    buf: &mut PixelBuffer,
    origin: Point,
    width: u32,
    height: u32,
    bytes: &[u8],
    color: Rgba8,
) {
    let stride = width.div_ceil(8) as usize;
    for row in 0..height as usize {
        for col in 0..width as usize {
            let Some(byte) = bytes.get(row * stride + col / 8) else {
                return;
            };
            if byte & (0x80 >> (col % 8)) != 0 {
                buf.set_wide(
                    i64::from(origin.x) + col as i64,
                    i64::from(origin.y) + row as i64,
                    color,
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/shapes.rs"]
mod tests;
