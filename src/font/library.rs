use std::sync::Arc;

use crate::font::bdf::decode_bdf;
use crate::font::columnar::{ColumnarFontSpec, decode_columnar};
use crate::font::glcd::{GlcdOptions, decode_glcd};
use crate::font::glyph::FontPack;
use crate::foundation::error::{SceneError, SceneResult};

/// Encoding of a font source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFormat {
    Columnar,
    Glcd,
    Bdf,
}

/// Raw font bytes or text, already fetched by whoever owns the catalog.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum FontSource {
    Columnar(ColumnarFontSpec),
    Glcd { bytes: Vec<u8> },
    Bdf { text: String },
}

impl FontSource {
    pub fn format(&self) -> FontFormat {
        match self {
            FontSource::Columnar(_) => FontFormat::Columnar,
            FontSource::Glcd { .. } => FontFormat::Glcd,
            FontSource::Bdf { .. } => FontFormat::Bdf,
        }
    }
}

/// Sizing hints from the catalog; only glcd sources need them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSizes {
    pub text_char_width: u32,
    pub text_char_height: u32,
    #[serde(default)]
    pub first_char: u32,
}

/// One catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlatformFont {
    pub name: String,
    #[serde(default)]
    pub title: String,
    pub source: FontSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<FontSizes>,
}

impl PlatformFont {
    pub fn format(&self) -> FontFormat {
        self.source.format()
    }

    /// Decode this entry; the pack is renamed to the catalog name.
    pub fn decode(&self) -> SceneResult<FontPack> {
        let mut pack = match &self.source {
            FontSource::Columnar(spec) => decode_columnar(spec)?,
            FontSource::Glcd { bytes } => {
                let mut opts = GlcdOptions {
                    name: self.name.clone(),
                    ..GlcdOptions::default()
                };
                if let Some(sizes) = self.options {
                    opts.char_width = sizes.text_char_width;
                    opts.char_height = sizes.text_char_height;
                    opts.first_char = sizes.first_char;
                }
                decode_glcd(bytes, &opts)?
            }
            FontSource::Bdf { text } => decode_bdf(text)?,
        };
        pack.rename(&self.name);
        Ok(pack)
    }
}

/// Decoded fonts keyed by name, in load order.
///
/// Every font is decoded at most once; text layers share the resulting pack.
#[derive(Clone, Debug, Default)]
pub struct FontLibrary {
    fonts: Vec<(String, Arc<FontPack>)>,
}

impl FontLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `font` unless a font with the same name is already loaded.
    pub fn load(&mut self, font: &PlatformFont) -> SceneResult<Arc<FontPack>> {
        if let Some(pack) = self.lookup(&font.name) {
            return Ok(pack);
        }
        let pack = Arc::new(font.decode().map_err(|e| match e {
            SceneError::Decode(msg) => SceneError::decode(format!("font '{}': {msg}", font.name)),
            other => other,
        })?);
        tracing::debug!(font = %font.name, glyphs = pack.len(), "font loaded");
        self.fonts.push((font.name.clone(), Arc::clone(&pack)));
        Ok(pack)
    }

    /// Register an already decoded pack under `name`, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, pack: FontPack) -> Arc<FontPack> {
        let name = name.into();
        let pack = Arc::new(pack);
        match self.fonts.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = Arc::clone(&pack),
            None => self.fonts.push((name, Arc::clone(&pack))),
        }
        pack
    }

    fn lookup(&self, name: &str) -> Option<Arc<FontPack>> {
        self.fonts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| Arc::clone(p))
    }

    /// Font named `name`, or the first loaded font when it is unknown.
    pub fn get(&self, name: &str) -> Option<Arc<FontPack>> {
        self.lookup(name)
            .or_else(|| self.fonts.first().map(|(_, p)| Arc::clone(p)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fonts.iter().any(|(n, _)| n == name)
    }

    /// Name of the fallback font.
    pub fn default_name(&self) -> Option<&str> {
        self.fonts.first().map(|(n, _)| n.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fonts.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/font/library.rs"]
mod tests;
