use crate::foundation::core::{Rgba8, Size};
use crate::foundation::error::SceneResult;
use crate::raster::buffer::PixelBuffer;
use crate::raster::composite::{BlendOp, quantize_in_place};
use crate::render::frame::Frame;
use crate::scene::layer::{Layer, LayerId};
use crate::scene::tree::SceneTree;

/// Overlay opacity used when none is configured.
pub const DEFAULT_OVERLAY_OPACITY: f32 = 0.3;

/// Flattens a scene tree into the two-tone output of a monochrome display.
///
/// The compositor only reads layer buffers; callers repaint layers (see
/// [`SceneTree::draw_all`]) before rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Compositor {
    pub foreground: Rgba8,
    pub overlay_opacity: f32,
}

impl Default for Compositor {
    fn default() -> Self {
        Self {
            foreground: Rgba8::WHITE,
            overlay_opacity: DEFAULT_OVERLAY_OPACITY,
        }
    }
}

/// Non-group layers that are visible together with every group above them, depth first.
pub fn flatten_visible(tree: &SceneTree) -> Vec<LayerId> {
    tree.all_layers()
        .into_iter()
        .filter(|id| tree.get(*id).is_some_and(|l| !l.is_group()))
        .filter(|id| tree.effective_visible(*id))
        .collect()
}

fn blend_op(layer: &Layer) -> BlendOp {
    if layer.inverted {
        BlendOp::Xor
    } else {
        BlendOp::Over
    }
}

impl Compositor {
    pub fn new(foreground: Rgba8, overlay_opacity: f32) -> Self {
        Self {
            foreground,
            overlay_opacity,
        }
    }

    /// Paint the normal layers in paint-index order and threshold the result.
    ///
    /// Layers without an index paint first; ties keep tree order.
    pub fn render_quantized(&self, tree: &SceneTree, display: Size) -> SceneResult<PixelBuffer> {
        let mut normal: Vec<&Layer> = flatten_visible(tree)
            .into_iter()
            .filter_map(|id| tree.get(id))
            .filter(|l| !l.modifiers.overlay)
            .collect();
        normal.sort_by_key(|l| l.index.unwrap_or(0));

        let mut out = PixelBuffer::with_size(display);
        for layer in normal {
            if !self.paintable(layer, display) {
                continue;
            }
            out.draw_buffer(layer.buffer(), blend_op(layer), 1.0)?;
        }
        quantize_in_place(out.data_mut(), self.foreground)?;
        Ok(out)
    }

    /// Full output: the quantized scene with overlay layers laid translucently on top.
    #[tracing::instrument(skip(self, tree, display_size), fields(layers = tree.len(), display = ?display_size))]
    pub fn render(&self, tree: &SceneTree, display_size: Size) -> SceneResult<Frame> {
        let display = display_size;
        let mut out = self.render_quantized(tree, display)?;
        for id in flatten_visible(tree) {
            let Some(layer) = tree.get(id) else {
                continue;
            };
            if !layer.modifiers.overlay || !self.paintable(layer, display) {
                continue;
            }
            out.draw_buffer(layer.buffer(), BlendOp::Over, self.overlay_opacity)?;
        }
        Ok(Frame::from_buffer(out))
    }

    fn paintable(&self, layer: &Layer, display: Size) -> bool {
        if layer.buffer().size() == display {
            return true;
        }
        tracing::warn!(
            uid = %layer.uid(),
            w = layer.buffer().width(),
            h = layer.buffer().height(),
            "skipping layer whose buffer does not match the display"
        );
        false
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
