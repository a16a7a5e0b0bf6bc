use std::path::Path;

use image::ImageEncoder;
use xxhash_rust::xxh3::Xxh3;

use crate::foundation::core::Size;
use crate::foundation::error::{SceneError, SceneResult};
use crate::raster::buffer::PixelBuffer;

const XXH3_SEED: u64 = 0x5c1e_7a3d_90b2_44e1;

/// Stable content hash of a rendered frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameFingerprint {
    pub hi: u64,
    pub lo: u64,
}

/// Display-sized premultiplied RGBA8 output of the compositor.
///
/// After quantization every pixel is either fully transparent or the foreground color at full
/// opacity; overlays are the only source of partial alpha.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn from_buffer(buf: PixelBuffer) -> Self {
        let (width, height) = (buf.width(), buf.height());
        Self {
            width,
            height,
            data: buf.into_data(),
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// RGBA8 of pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Number of fully opaque pixels.
    pub fn count_opaque(&self) -> usize {
        self.data.chunks_exact(4).filter(|p| p[3] == 255).count()
    }

    pub fn fingerprint(&self) -> FrameFingerprint {
        let mut h = Xxh3::with_seed(XXH3_SEED);
        h.update(&self.width.to_le_bytes());
        h.update(&self.height.to_le_bytes());
        h.update(&self.data);
        let v = h.digest128();
        FrameFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }

    /// Nearest-neighbour upscale, used to honor non-square display pixels.
    pub fn scaled(&self, sx: u32, sy: u32) -> Frame {
        let sx = sx.max(1);
        let sy = sy.max(1);
        if sx == 1 && sy == 1 {
            return self.clone();
        }
        let (w, h) = (self.width.saturating_mul(sx), self.height.saturating_mul(sy));
        let mut data = vec![0u8; (w as usize) * (h as usize) * 4];
        for (i, out) in data.chunks_exact_mut(4).enumerate() {
            let (x, y) = ((i % w as usize) as u32, (i / w as usize) as u32);
            if let Some(px) = self.pixel(x / sx, y / sy) {
                out.copy_from_slice(&px);
            }
        }
        Frame {
            width: w,
            height: h,
            data,
        }
    }

    /// This frame flattened over an opaque background.
    pub fn on_background(&self, bg: [u8; 3]) -> Frame {
        let mut data = self.data.clone();
        for px in data.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            let inv = 255 - a;
            for c in 0..3 {
                let blended = u16::from(px[c]) + (u16::from(bg[c]) * inv + 127) / 255;
                px[c] = blended.min(255) as u8;
            }
            px[3] = 255;
        }
        Frame {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// Straight-alpha copy of the pixel data, as image files expect.
    pub fn straight_rgba(&self) -> Vec<u8> {
        let mut data = self.data.clone();
        for px in data.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in 0..3 {
                px[c] = ((u16::from(px[c]) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        data
    }

    /// PNG bytes of this frame.
    pub fn to_png(&self) -> SceneResult<Vec<u8>> {
        let mut out = Vec::new();
        image::codecs::png::PngEncoder::new(&mut out)
            .write_image(
                &self.straight_rgba(),
                self.width,
                self.height,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| SceneError::Other(anyhow::anyhow!("png encode failed: {e}")))?;
        Ok(out)
    }

    /// Write this frame as a PNG file.
    pub fn save_png(&self, path: &Path) -> SceneResult<()> {
        image::save_buffer_with_format(
            path,
            &self.straight_rgba(),
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| {
            SceneError::Other(anyhow::anyhow!("failed to write '{}': {e}", path.display()))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
