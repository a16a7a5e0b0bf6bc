use base64ct::{Base64, Encoding};

use crate::foundation::core::{Point, Rect, Rgba8};
use crate::foundation::error::{SceneError, SceneResult};
use crate::raster::buffer::PixelBuffer;
use crate::raster::shapes::draw_mask;

/// Packed monochrome image: row-major, MSB first, `ceil(width / 8)` bytes per row.
///
/// Icons, freehand paint and merged layers all store their pixels this way. In layer blobs the
/// bits are base64 encoded.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "BitmapRepr", into = "BitmapRepr")]
pub struct Bitmap {
    width: u32,
    height: u32,
    bits: Vec<u8>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct BitmapRepr {
    w: u32,
    h: u32,
    d: String,
}

impl TryFrom<BitmapRepr> for Bitmap {
    type Error = SceneError;

    fn try_from(repr: BitmapRepr) -> Result<Self, Self::Error> {
        let bits = Base64::decode_vec(&repr.d)
            .map_err(|e| SceneError::decode(format!("bitmap data is not base64: {e}")))?;
        Bitmap::from_bits(repr.w, repr.h, bits)
    }
}

impl From<Bitmap> for BitmapRepr {
    fn from(b: Bitmap) -> Self {
        Self {
            w: b.width,
            h: b.height,
            d: Base64::encode_string(&b.bits),
        }
    }
}

impl Bitmap {
    /// All-clear bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        let stride = width.div_ceil(8) as usize;
        Self {
            width,
            height,
            bits: vec![0; stride * height as usize],
        }
    }

    /// Wrap packed bits, checking the length against the geometry.
    pub fn from_bits(width: u32, height: u32, bits: Vec<u8>) -> SceneResult<Self> {
        let expected = width.div_ceil(8) as usize * height as usize;
        if bits.len() != expected {
            return Err(SceneError::decode(format!(
                "{width}x{height} bitmap needs {expected} bytes, got {}",
                bits.len()
            )));
        }
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    /// Threshold an RGBA image: a pixel is set when its luminance weighted by alpha reaches half
    /// intensity.
    pub fn from_image(img: &image::RgbaImage) -> Self {
        let mut out = Self::new(img.width(), img.height());
        for (x, y, px) in img.enumerate_pixels() {
            let [r, g, b, a] = px.0;
            let luma = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
            if luma * f32::from(a) / 255.0 >= 127.5 {
                out.set(x, y, true);
            }
        }
        out
    }

    /// Decode an encoded image (PNG, BMP, ...) and threshold it.
    pub fn decode_image(bytes: &[u8]) -> SceneResult<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| SceneError::decode(format!("image decode failed: {e}")))?;
        Ok(Self::from_image(&img.to_rgba8()))
    }

    /// Capture the pixels of `region` that survive quantization.
    pub fn from_buffer(buf: &PixelBuffer, region: Rect) -> Self {
        let mut out = Self::new(region.size.w, region.size.h);
        for y in 0..region.size.h {
            for x in 0..region.size.w {
                let bx = i64::from(region.pos.x) + i64::from(x);
                let by = i64::from(region.pos.y) + i64::from(y);
                let set = i32::try_from(bx)
                    .ok()
                    .zip(i32::try_from(by).ok())
                    .is_some_and(|(bx, by)| buf.is_set(bx, by));
                if set {
                    out.set(x, y, true);
                }
            }
        }
        out
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    fn index(&self, x: u32, y: u32) -> Option<(usize, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let stride = self.width.div_ceil(8) as usize;
        Some((y as usize * stride + (x / 8) as usize, 0x80 >> (x % 8)))
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.index(x, y)
            .is_some_and(|(i, mask)| self.bits[i] & mask != 0)
    }

    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        if let Some((i, mask)) = self.index(x, y) {
            if on {
                self.bits[i] |= mask;
            } else {
                self.bits[i] &= !mask;
            }
        }
    }

    pub fn count_set(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Paint every set bit with its top-left corner at `origin`.
    pub fn draw(&self, buf: &mut PixelBuffer, origin: Point, color: Rgba8) {
        draw_mask(buf, origin, self.width, self.height, &self.bits, color);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/bitmap.rs"]
mod tests;
