use crate::foundation::core::{Point, Rect, Rgba8, Size};
use crate::foundation::error::{SceneError, SceneResult};
use crate::raster::composite::{BlendOp, PremulRgba8, QUANTIZE_ALPHA_THRESHOLD, blend_in_place};

/// Owned premultiplied RGBA8 canvas, row-major and tightly packed.
///
/// Every layer owns one sized to the display; the compositor owns the output one. All writes
/// are clipped to the buffer bounds, so callers can paint with negative or oversized geometry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        Self {
            width,
            height,
            data: vec![0; len],
        }
    }

    /// Allocate a transparent buffer of `size`.
    pub fn with_size(size: Size) -> Self {
        Self::new(size.w, size.h)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Raw premultiplied RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Reallocate to `size`; contents are discarded.
    pub fn resize(&mut self, size: Size) {
        *self = Self::with_size(size);
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(((y as usize) * (self.width as usize) + (x as usize)) * 4)
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer.
    pub fn get(&self, x: i32, y: i32) -> Option<PremulRgba8> {
        let i = self.offset(x, y)?;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Return `true` when the pixel would survive quantization.
    pub fn is_set(&self, x: i32, y: i32) -> bool {
        self.get(x, y)
            .is_some_and(|px| px[3] >= QUANTIZE_ALPHA_THRESHOLD)
    }

    pub fn set(&mut self, x: i32, y: i32, color: Rgba8) {
        if let Some(i) = self.offset(x, y) {
            self.data[i..i + 4].copy_from_slice(&color.to_premul());
        }
    }

    /// [`PixelBuffer::set`] for coordinates that may not fit in `i32`.
    pub(crate) fn set_wide(&mut self, x: i64, y: i64, color: Rgba8) {
        if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
            self.set(x, y, color);
        }
    }

    /// Fill `[x, x + w) x [y, y + h)` clipped to the buffer.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgba8) {
        let (x, y) = (i64::from(x), i64::from(y));
        self.fill_span(x, y, x + i64::from(w), y + i64::from(h), color);
    }

    /// Fill `[x0, x1) x [y0, y1)` clipped to the buffer.
    pub(crate) fn fill_span(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgba8) {
        let x0 = x0.max(0);
        let y0 = y0.max(0);
        let x1 = x1.min(i64::from(self.width));
        let y1 = y1.min(i64::from(self.height));
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let px = color.to_premul();
        let stride = self.width as usize * 4;
        for row in y0 as usize..y1 as usize {
            let start = row * stride + x0 as usize * 4;
            let end = row * stride + x1 as usize * 4;
            for d in self.data[start..end].chunks_exact_mut(4) {
                d.copy_from_slice(&px);
            }
        }
    }

    /// Composite `src` (same size) onto this buffer.
    pub fn draw_buffer(&mut self, src: &PixelBuffer, op: BlendOp, opacity: f32) -> SceneResult<()> {
        if src.size() != self.size() {
            return Err(SceneError::validation(format!(
                "cannot composite {}x{} buffer onto {}x{}",
                src.width, src.height, self.width, self.height
            )));
        }
        blend_in_place(&mut self.data, &src.data, op, opacity)
    }

    /// Number of pixels that would survive quantization.
    pub fn count_set(&self) -> usize {
        self.data
            .chunks_exact(4)
            .filter(|px| px[3] >= QUANTIZE_ALPHA_THRESHOLD)
            .count()
    }

    /// Tight bounds of the pixels that would survive quantization.
    pub fn ink_bounds(&self) -> Option<Rect> {
        let mut lo: Option<Point> = None;
        let mut hi = Point::default();
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                if !self.is_set(x, y) {
                    continue;
                }
                let p = Point::new(x, y);
                lo = Some(lo.map_or(p, |l| l.min(p)));
                hi = hi.max(p);
            }
        }
        lo.map(|lo| Rect::from_corners(lo, hi))
    }

    /// Copy of the `region` clipped to the buffer; pixels outside read as transparent.
    pub fn crop(&self, region: Rect) -> PixelBuffer {
        let mut out = PixelBuffer::with_size(region.size);
        for y in 0..region.size.h {
            for x in 0..region.size.w {
                let sx = i64::from(region.pos.x) + i64::from(x);
                let sy = i64::from(region.pos.y) + i64::from(y);
                let src = i32::try_from(sx)
                    .ok()
                    .zip(i32::try_from(sy).ok())
                    .and_then(|(sx, sy)| self.get(sx, sy));
                if let (Some(px), Some(o)) = (src, out.offset(x as i32, y as i32)) {
                    out.data[o..o + 4].copy_from_slice(&px);
                }
            }
        }
        out
    }

    /// Nearest-neighbour upscale by integer factors; zero factors are treated as one.
    pub fn scaled(&self, sx: u32, sy: u32) -> PixelBuffer {
        let sx = sx.max(1);
        let sy = sy.max(1);
        if sx == 1 && sy == 1 {
            return self.clone();
        }
        let mut out = PixelBuffer::new(self.width.saturating_mul(sx), self.height.saturating_mul(sy));
        for y in 0..out.height {
            for x in 0..out.width {
                let si = (((y / sy) as usize) * (self.width as usize) + (x / sx) as usize) * 4;
                let di = ((y as usize) * (out.width as usize) + x as usize) * 4;
                out.data[di..di + 4].copy_from_slice(&self.data[si..si + 4]);
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/buffer.rs"]
mod tests;
