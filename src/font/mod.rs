pub mod bdf;
pub mod columnar;
pub mod glcd;
pub mod glyph;
pub mod library;
pub mod raster;

pub use bdf::decode_bdf;
pub use columnar::{ColumnarFontSpec, decode_columnar};
pub use glcd::{GlcdOptions, decode_glcd};
pub use glyph::{FontMeta, FontPack, Glyph, GlyphBounds};
pub use library::{FontFormat, FontLibrary, FontSizes, FontSource, PlatformFont};
pub use raster::{PLACEHOLDER, draw, measure, render_specimen, sanitize, with_placeholders};
